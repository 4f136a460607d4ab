// Copyright (C) 2025 Paul Hampson
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License version 3 as  published by the
// Free Software Foundation.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE.  See the GNU General Public License for more
// details.
//
// You should have received a copy of the GNU General Public License along with
// this program.  If not, see <https://www.gnu.org/licenses/>.

use loadcell_messages::{decode_framed_message, frame_message, MAX_MESSAGE_SIZE};
use std::io::{Error as IoError, ErrorKind, Read, Result as IoResult, Write};

const PREFIX_BYTE_COUNT: usize = 2;

/// Sends a CBOR message with length-prefixed framing over serial
pub(crate) fn send_message<M>(serial: &mut Box<dyn serialport::SerialPort>, msg: &M) -> IoResult<()>
where
    M: minicbor::Encode<()> + minicbor::CborLen<()>,
{
    let mut buffer = [0u8; MAX_MESSAGE_SIZE + PREFIX_BYTE_COUNT];
    let framed_len = frame_message(msg, &mut buffer)
        .map_err(|e| IoError::new(ErrorKind::InvalidData, format!("Encode error: {:?}", e)))?;

    serial.write_all(&buffer[..framed_len])?;
    serial.flush()?;

    log::trace!("Sent message of {} bytes", framed_len - PREFIX_BYTE_COUNT);
    Ok(())
}

/// Receives one length-prefixed CBOR message. `buffer` must also have room for the prefix.
pub(crate) fn receive_message<'b, M>(
    serial: &mut Box<dyn serialport::SerialPort>,
    buffer: &'b mut [u8],
) -> IoResult<M>
where
    M: minicbor::Decode<'b, ()>,
{
    if buffer.len() < PREFIX_BYTE_COUNT {
        return Err(IoError::new(ErrorKind::InvalidInput, "Receive buffer too small"));
    }
    serial.read_exact(&mut buffer[..PREFIX_BYTE_COUNT])?;
    let message_len = u16::from_be_bytes([buffer[0], buffer[1]]) as usize;
    let frame_end = PREFIX_BYTE_COUNT + message_len;

    if frame_end > buffer.len() {
        return Err(IoError::new(
            ErrorKind::InvalidData,
            "Message too large",
        ));
    }

    serial.read_exact(&mut buffer[PREFIX_BYTE_COUNT..frame_end])?;
    log::trace!("Received message of {} bytes", message_len);

    let buffer: &'b [u8] = buffer;
    decode_framed_message::<M>(&buffer[..frame_end])
        .map(|(_, message)| message)
        .map_err(|e| IoError::new(ErrorKind::InvalidData, format!("Decode error: {:?}", e)))
}

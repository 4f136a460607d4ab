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

use defmt::{Format, trace};
use embassy_rp::usb::{Driver, Instance};
use embassy_usb::class::cdc_acm::{BufferedReceiver, Sender};
use embedded_io_async::{Read, Write};
use loadcell_messages::{FrameError, MAX_MESSAGE_SIZE, decode_framed_message, frame_message};
use minicbor::{CborLen, Decode, Encode};

const PREFIX_BYTE_COUNT: usize = 2;

/// Room for the largest message plus its length prefix.
pub const FRAME_BUFFER_SIZE: usize = MAX_MESSAGE_SIZE + PREFIX_BYTE_COUNT;

#[derive(Debug, Format)]
pub enum ReceiveError {
    ReadError,
    DecodeError,
    /// The oversized payload has been read and dropped.
    MessageTooLarge,
}

#[derive(Debug, Format)]
pub enum SendError {
    EncodeError,
    UsbError,
    MessageTooLarge,
}

/// Read a CBOR message from the buffered receiver with length-prefixed framing
///
/// Message format: [length_high_byte][length_low_byte][cbor_data...]
/// where length is the size of the CBOR data in bytes (big-endian u16)
pub async fn read_cbor_message<'d, 'b, T: Instance, M>(
    rx: &mut BufferedReceiver<'d, Driver<'d, T>>,
    buffer: &'b mut [u8; FRAME_BUFFER_SIZE],
) -> Result<M, ReceiveError>
where
    M: Decode<'b, ()>,
{
    trace!("Reading framing length prefix");
    rx.read_exact(&mut buffer[..PREFIX_BYTE_COUNT])
        .await
        .map_err(|_| ReceiveError::ReadError)?;

    let message_len = u16::from_be_bytes([buffer[0], buffer[1]]) as usize;
    if message_len > MAX_MESSAGE_SIZE {
        discard(rx, message_len, &mut buffer[PREFIX_BYTE_COUNT..]).await?;
        return Err(ReceiveError::MessageTooLarge);
    }

    let frame_end = PREFIX_BYTE_COUNT + message_len;
    trace!("Reading {} bytes for the message", message_len);
    rx.read_exact(&mut buffer[PREFIX_BYTE_COUNT..frame_end])
        .await
        .map_err(|_| ReceiveError::ReadError)?;

    let buffer: &'b [u8] = buffer;
    decode_framed_message::<M>(&buffer[..frame_end])
        .map(|(_, message)| message)
        .map_err(|_| ReceiveError::DecodeError)
}

async fn discard<'d, T: Instance>(
    rx: &mut BufferedReceiver<'d, Driver<'d, T>>,
    mut remaining: usize,
    scratch: &mut [u8],
) -> Result<(), ReceiveError> {
    while remaining > 0 {
        let chunk = remaining.min(scratch.len());
        rx.read_exact(&mut scratch[..chunk])
            .await
            .map_err(|_| ReceiveError::ReadError)?;
        remaining -= chunk;
    }
    Ok(())
}

/// Send a CBOR message through the CDC-ACM sender with length-prefixed framing
pub async fn send_cbor_message<'d, T: Instance, M>(
    tx: &mut Sender<'d, Driver<'d, T>>,
    msg: &M,
) -> Result<(), SendError>
where
    M: Encode<()> + CborLen<()>,
{
    let mut buffer = [0u8; FRAME_BUFFER_SIZE];
    let framed_len = frame_message(msg, &mut buffer).map_err(|e| match e {
        FrameError::BufferTooSmall(_) => SendError::MessageTooLarge,
        _ => SendError::EncodeError,
    })?;

    tx.write_all(&buffer[..framed_len])
        .await
        .map_err(|_| SendError::UsbError)
}

#![cfg_attr(not(test), no_std)]
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

use crate::general::hello::{Hello, HelloResp};
use crate::remote::function_call::{FunctionCall, FunctionResult};
use minicbor::{CborLen, Decode, Encode};

pub mod builder;
pub mod custom_data_types;
pub mod general;
pub mod remote;

/// Largest encoded message either side accepts, excluding the length prefix.
pub const MAX_MESSAGE_SIZE: usize = 256;

const PREFIX_BYTE_COUNT: usize = 2;

#[derive(Debug, PartialEq, Decode, Encode, CborLen)]
pub enum NodeMessages<'a> {
    #[n(0)] Hello(
        #[n(0)] Hello
    ),
    #[n(1)] HelloResp(
        #[n(0)] HelloResp
    ),
    #[n(2)] FunctionCall(#[b(0)] FunctionCall<'a>),
    #[n(3)] FunctionResult(#[n(0)] FunctionResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FrameError {
    /// The buffer is too small to hold the encoded message and length prefix, value is the
    /// expected length
    BufferTooSmall(usize),
    /// The CBOR encoding failed due to invalid data
    EncodingError,
    DecodingError,
}


/// Frame a CBOR message with a length prefix for sending across a data link.
///
/// Returns the number of bytes written on success, or a FrameError on failure.
///
/// # Errors
///
/// - `BufferTooSmall`: if the buffer is not large enough to hold the length prefix (2 bytes)
///   plus the encoded message
/// - `EncodingError`: if the CBOR encoding of the message failed
pub fn frame_message<M>(msg: &M, buffer: &mut [u8]) -> Result<usize, FrameError>
where
    M: minicbor::Encode<()> + minicbor::CborLen<()>,
{
    let encoded_len = minicbor::len(msg);
    let total_bytes_needed = encoded_len + PREFIX_BYTE_COUNT;

    if buffer.len() < total_bytes_needed {
        return Err(FrameError::BufferTooSmall(total_bytes_needed));
    }

    buffer[0..PREFIX_BYTE_COUNT].copy_from_slice(&(encoded_len as u16).to_be_bytes());

    minicbor::encode(msg, &mut buffer[PREFIX_BYTE_COUNT..total_bytes_needed])
        .map_err(|_| FrameError::EncodingError)?;

    Ok(total_bytes_needed)
}

/// Decode one length-prefixed message from the front of `buffer`.
///
/// Returns how many bytes the frame used together with the message.
pub fn decode_framed_message<'b, M>(
    buffer: &'b [u8],
) -> Result<(usize, M), FrameError>
where
    M: minicbor::Decode<'b, ()>,
{
    let message_len = framed_length(buffer)?;

    if buffer.len() < message_len + PREFIX_BYTE_COUNT {
        return Err(FrameError::BufferTooSmall(message_len + PREFIX_BYTE_COUNT));
    }

    let message_end = PREFIX_BYTE_COUNT + message_len;
    let message = minicbor::decode::<M>(&buffer[PREFIX_BYTE_COUNT..message_end])
        .map_err(|_| FrameError::DecodingError)?;

    Ok((message_end, message))
}

/// Read the payload length announced by a frame's prefix.
pub fn framed_length(buffer: &[u8]) -> Result<usize, FrameError> {
    if buffer.len() < PREFIX_BYTE_COUNT {
        return Err(FrameError::BufferTooSmall(PREFIX_BYTE_COUNT));
    }
    Ok(u16::from_be_bytes([buffer[0], buffer[1]]) as usize)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::NodeMessagesBuilder;
    use crate::custom_data_types::VersionNumber;

    #[test]
    fn function_call_survives_framing() {
        let call = NodeMessagesBuilder::new()
            .function_call()
            .name("calibrate")
            .argument("500")
            .build();
        let mut buffer = [0u8; MAX_MESSAGE_SIZE];

        let written = frame_message(&call, &mut buffer).unwrap();
        let (consumed, decoded) = decode_framed_message::<NodeMessages>(&buffer).unwrap();

        assert_eq!(consumed, written);
        assert_eq!(decoded, call);
        match decoded {
            NodeMessages::FunctionCall(call) => {
                assert_eq!(call.name, "calibrate");
                assert_eq!(call.argument, "500");
            }
            other => panic!("unexpected message {:?}", other),
        }
    }

    #[test]
    fn length_prefix_is_big_endian_payload_length() {
        let result = NodeMessagesBuilder::new().function_result(1);
        let mut buffer = [0u8; 32];

        let written = frame_message(&result, &mut buffer).unwrap();

        assert_eq!(framed_length(&buffer), Ok(written - 2));
        assert_eq!(buffer[0], 0);
    }

    #[test]
    fn frames_decode_back_to_back() {
        let hello_resp = NodeMessagesBuilder::new()
            .hello_resp()
            .version(VersionNumber::new(1, 2, 3))
            .build();
        let status = NodeMessagesBuilder::new().function_result(-1);
        let mut buffer = [0u8; 64];

        let first = frame_message(&hello_resp, &mut buffer).unwrap();
        let second = frame_message(&status, &mut buffer[first..]).unwrap();

        let (used, decoded) =
            decode_framed_message::<NodeMessages>(&buffer[..first + second]).unwrap();
        assert_eq!(used, first);
        assert_eq!(decoded, hello_resp);
        let (_, decoded) = decode_framed_message::<NodeMessages>(&buffer[first..]).unwrap();
        assert_eq!(decoded, status);
    }

    #[test]
    fn small_buffer_reports_needed_size() {
        let call = NodeMessagesBuilder::new()
            .function_call()
            .name("tare")
            .argument("")
            .build();
        let needed = minicbor::len(&call) + 2;
        let mut buffer = [0u8; 4];

        assert_eq!(
            frame_message(&call, &mut buffer),
            Err(FrameError::BufferTooSmall(needed))
        );
    }

    #[test]
    fn truncated_frame_is_rejected() {
        let hello = NodeMessagesBuilder::new().hello();
        let mut buffer = [0u8; 16];
        let written = frame_message(&hello, &mut buffer).unwrap();

        assert!(matches!(
            decode_framed_message::<NodeMessages>(&buffer[..written - 1]),
            Err(FrameError::BufferTooSmall(_))
        ));
        assert_eq!(
            decode_framed_message::<NodeMessages>(&buffer[..1]).unwrap_err(),
            FrameError::BufferTooSmall(2)
        );
    }

    #[test]
    fn garbage_payload_fails_to_decode() {
        let buffer = [0x00, 0x02, 0xff, 0xff];
        assert_eq!(
            decode_framed_message::<NodeMessages>(&buffer).unwrap_err(),
            FrameError::DecodingError
        );
    }
}

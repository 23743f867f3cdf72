//! Frame header encoder/validator.
//!
//! Every request and reply starts with a fixed 10-byte header.
//!
//! # Frame format
//!
//! ```text
//! <version:u16> <command_id:u16> <vendor:u32 = 21336> <total_length:u16> <AVP>...
//! ```
//!
//! - `version`: `0x8001` in requests, `0x0001` in replies
//! - `command_id`: host-assigned sequence number, echoed by the reader
//! - `total_length`: whole frame, header included

use tracing::warn;

use rfidlib_core::error::{Error, Result};

use crate::buffer::FrameBuffer;
use crate::codec;
use crate::protocol::{AVP_HEADER_LEN, HEADER_LEN, REPLY_VERSION, REQUEST_VERSION, VENDOR_ID};

/// Length assumed for a reply that announces `total_length == 0`: the
/// header plus a bare command echo.
pub const ZERO_LENGTH_REPLY: usize = HEADER_LEN + AVP_HEADER_LEN + 2;

/// A decoded frame header.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FrameHeader {
    pub version: u16,
    pub command_id: u16,
    pub vendor_id: u32,
    pub total_length: u16,
}

impl FrameHeader {
    pub fn parse(raw: &[u8; HEADER_LEN]) -> Self {
        FrameHeader {
            version: codec::get_u16(&raw[0..]),
            command_id: codec::get_u16(&raw[2..]),
            vendor_id: codec::get_u32(&raw[4..]),
            total_length: codec::get_u16(&raw[8..]),
        }
    }
}

/// Write a request header at the write cursor of `buf`.
///
/// # Panics
///
/// Panics if `buf` has fewer than [`HEADER_LEN`] spare bytes.
pub fn encode_header(buf: &mut FrameBuffer, command_id: u16, total_length: u16) {
    let out = buf.claim(HEADER_LEN);
    codec::put_u16(&mut out[0..], REQUEST_VERSION);
    codec::put_u16(&mut out[2..], command_id);
    codec::put_u32(&mut out[4..], VENDOR_ID);
    codec::put_u16(&mut out[8..], total_length);
}

/// Validate a reply header against the request it answers.
///
/// Returns the frame length the rest of the reply should be read to.
/// A zero length is taken as [`ZERO_LENGTH_REPLY`]; some firmware sends
/// it for bare acknowledgements.
pub fn validate_reply(raw: &[u8; HEADER_LEN], expected_id: u16) -> Result<usize> {
    let header = FrameHeader::parse(raw);

    let mut length = header.total_length as usize;
    if length == 0 {
        warn!(
            command_id = header.command_id,
            "reply announced zero length, assuming bare command echo"
        );
        length = ZERO_LENGTH_REPLY;
    }

    if header.version != REPLY_VERSION {
        return Err(Error::Communication(format!(
            "unexpected reply version 0x{:04X}",
            header.version
        )));
    }
    if header.vendor_id != VENDOR_ID {
        return Err(Error::Communication(format!(
            "unexpected vendor id {}",
            header.vendor_id
        )));
    }
    if header.command_id != expected_id {
        return Err(Error::Communication(format!(
            "reply id {} does not match request id {expected_id}",
            header.command_id
        )));
    }
    if length < HEADER_LEN {
        return Err(Error::Communication(format!(
            "reply length {length} shorter than header"
        )));
    }
    Ok(length)
}

//! AVP (attribute-value pair) encoder/decoder.
//!
//! Every field in a request or reply body is an AVP: a fixed header
//! followed by a payload whose shape is dictated by the attribute type.
//!
//! # AVP format
//!
//! ```text
//! <reserved:u16 = 0> <length:u16 = 6 + payload> <type:u16> <payload...>
//! ```
//!
//! All integers are big-endian. Text payloads carry a trailing NUL that
//! counts toward both the AVP length and the type's maximum.
//!
//! Decoding is tri-state so callers can probe for optional fields:
//!
//! - `Ok(Some(value))` -- the AVP at the read cursor has the expected type
//!   and a well-formed payload; the cursor moves past it.
//! - `Ok(None)` -- the AVP has a different type; the cursor does not move.
//! - `Err(Error::Protocol)` -- truncated, non-zero reserved bits, or a
//!   payload that does not fit the type's shape.

use rfidlib_core::error::{Error, Result};
use rfidlib_core::types::{
    MAX_FWREL_LENGTH, MAX_ID_LENGTH, MAX_LOGICAL_SOURCE_NAME, MAX_MODEL_LENGTH,
    MAX_READPOINT_NAME, MAX_SERIAL_LENGTH, MAX_TAG_VALUE, PC_LENGTH, XPC_LENGTH,
};

use crate::buffer::FrameBuffer;
use crate::codec;
use crate::protocol::{attr, AVP_HEADER_LEN};

/// Payload shape of an attribute type.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Shape {
    U16,
    U32,
    /// IEEE-754 single, sent as its bit pattern.
    F32,
    /// Two u32 words: seconds, microseconds.
    Timestamp,
    /// Exactly this many raw bytes.
    Fixed(usize),
    /// Up to `max` raw bytes.
    Bytes { max: usize },
    /// Raw bytes capped at `max` when sent. Replies are not capped: some
    /// custom tag commands return more.
    OpenBytes { max: usize },
    /// NUL-terminated text, NUL included in `max`.
    Text { max: usize },
}

/// Shape of `avp_type`, or `None` if the type carries no payload this
/// library understands.
pub fn shape_of(avp_type: u16) -> Option<Shape> {
    let shape = match avp_type {
        attr::COMMAND
        | attr::RESULT_CODE
        | attr::LENGTH
        | attr::TAGADDRESS
        | attr::TAGIDLEN
        | attr::BITMASK
        | attr::TAGTYPE
        | attr::MEMBANK
        | attr::RSSI
        | attr::G2NSI
        | attr::MODULATION
        | attr::BOOLEAN
        | attr::RFCHANNEL
        | attr::RFREGULATION => Shape::U16,
        attr::PROTOCOL_NAME
        | attr::POWER
        | attr::POWER_GET
        | attr::G2PWD
        | attr::CONFIGPARAMETER
        | attr::CONFIGVALUE
        | attr::PAYLOAD
        | attr::IOREGISTER
        | attr::READPOINT_STATUS
        | attr::BAUDRATE
        | attr::DATABITS
        | attr::STOPBITS
        | attr::PARITY
        | attr::FLOWCTRL => Shape::U32,
        attr::POWER_VSWR => Shape::F32,
        attr::TIMESTAMP => Shape::Timestamp,
        attr::XPC => Shape::Fixed(XPC_LENGTH),
        attr::PC => Shape::Fixed(PC_LENGTH),
        attr::SUBCMD => Shape::Fixed(1),
        attr::TAGID => Shape::Bytes { max: MAX_ID_LENGTH },
        attr::TAG_VALUE => Shape::OpenBytes { max: MAX_TAG_VALUE },
        attr::SOURCE_NAME => Shape::Text { max: MAX_LOGICAL_SOURCE_NAME },
        attr::READPOINT_NAME => Shape::Text { max: MAX_READPOINT_NAME },
        attr::READERINFO => Shape::Text {
            max: MAX_MODEL_LENGTH + 1 + MAX_SERIAL_LENGTH,
        },
        attr::GETFWRELEASE => Shape::Text { max: MAX_FWREL_LENGTH },
        _ => return None,
    };
    Some(shape)
}

/// A decoded or to-be-encoded AVP payload.
#[derive(Debug, Clone, PartialEq)]
pub enum AvpValue {
    U16(u16),
    U32(u32),
    F32(f32),
    Timestamp(u32, u32),
    Bytes(Vec<u8>),
    Text(String),
}

impl AvpValue {
    pub fn as_u16(&self) -> Option<u16> {
        match self {
            AvpValue::U16(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_u32(&self) -> Option<u32> {
        match self {
            AvpValue::U32(v) => Some(*v),
            _ => None,
        }
    }

    pub fn as_f32(&self) -> Option<f32> {
        match self {
            AvpValue::F32(v) => Some(*v),
            _ => None,
        }
    }

    /// Payload length on the wire.
    fn payload_len(&self) -> usize {
        match self {
            AvpValue::U16(_) => 2,
            AvpValue::U32(_) | AvpValue::F32(_) => 4,
            AvpValue::Timestamp(..) => 8,
            AvpValue::Bytes(b) => b.len(),
            AvpValue::Text(s) => s.len() + 1,
        }
    }
}

/// Size of the encoded AVP, header included.
pub fn encoded_len(value: &AvpValue) -> usize {
    AVP_HEADER_LEN + value.payload_len()
}

/// Check that `value` can be sent as `avp_type`.
///
/// Public operations run this on caller input so that [`encode`] never
/// sees a value it would reject.
pub fn check(avp_type: u16, value: &AvpValue) -> Result<()> {
    let shape = shape_of(avp_type).ok_or_else(|| {
        Error::InvalidParameter(format!("attribute 0x{avp_type:02X} cannot be encoded"))
    })?;
    let len = value.payload_len();
    let fits = match (shape, value) {
        (Shape::U16, AvpValue::U16(_)) => true,
        (Shape::U32, AvpValue::U32(_)) => true,
        (Shape::F32, AvpValue::F32(_)) => true,
        (Shape::Timestamp, AvpValue::Timestamp(..)) => true,
        (Shape::Fixed(n), AvpValue::Bytes(_)) => len == n,
        (Shape::Bytes { max }, AvpValue::Bytes(_)) => len <= max,
        (Shape::OpenBytes { max }, AvpValue::Bytes(_)) => len <= max,
        (Shape::Text { max }, AvpValue::Text(s)) => len <= max && !s.contains('\0'),
        _ => {
            return Err(Error::InvalidParameter(format!(
                "attribute 0x{avp_type:02X} expects {shape:?}, got {value:?}"
            )))
        }
    };
    if fits {
        Ok(())
    } else {
        Err(Error::InvalidParameter(format!(
            "attribute 0x{avp_type:02X} payload of {len} bytes does not fit {shape:?}"
        )))
    }
}

/// Append one AVP to `buf`.
///
/// # Panics
///
/// Panics if `value` does not fit the shape of `avp_type` (see [`check`])
/// or `buf` lacks room for it.
pub fn encode(buf: &mut FrameBuffer, avp_type: u16, value: &AvpValue) {
    if let Err(e) = check(avp_type, value) {
        panic!("AVP encode contract violated: {e}");
    }
    let payload_len = value.payload_len();
    let total = AVP_HEADER_LEN + payload_len;
    let out = buf.claim(total);
    codec::put_u16(&mut out[0..], 0);
    codec::put_u16(&mut out[2..], total as u16);
    codec::put_u16(&mut out[4..], avp_type);

    let payload = &mut out[AVP_HEADER_LEN..];
    match value {
        AvpValue::U16(v) => codec::put_u16(payload, *v),
        AvpValue::U32(v) => codec::put_u32(payload, *v),
        AvpValue::F32(v) => codec::put_f32(payload, *v),
        AvpValue::Timestamp(sec, usec) => {
            codec::put_u32(payload, *sec);
            codec::put_u32(&mut payload[4..], *usec);
        }
        AvpValue::Bytes(b) => payload.copy_from_slice(b),
        AvpValue::Text(s) => {
            payload[..s.len()].copy_from_slice(s.as_bytes());
            payload[s.len()] = 0;
        }
    }
}

/// Raw AVP header fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AvpHeader {
    pub reserved: u16,
    pub length: u16,
    pub avp_type: u16,
}

impl AvpHeader {
    /// Parse the first [`AVP_HEADER_LEN`] bytes of `raw`.
    pub fn parse(raw: &[u8]) -> Option<Self> {
        if raw.len() < AVP_HEADER_LEN {
            return None;
        }
        Some(AvpHeader {
            reserved: codec::get_u16(&raw[0..]),
            length: codec::get_u16(&raw[2..]),
            avp_type: codec::get_u16(&raw[4..]),
        })
    }
}

/// Decode the AVP at the read cursor if it has type `expected`.
pub fn decode(buf: &mut FrameBuffer, expected: u16) -> Result<Option<AvpValue>> {
    let unread = buf.unread();
    let header = AvpHeader::parse(unread).ok_or_else(|| {
        Error::Protocol(format!(
            "truncated AVP header: {} bytes left, expected 0x{expected:02X}",
            unread.len()
        ))
    })?;
    if header.avp_type != expected {
        return Ok(None);
    }
    if header.reserved != 0 {
        return Err(Error::Protocol(format!(
            "AVP 0x{expected:02X} has reserved bits 0x{:04X}",
            header.reserved
        )));
    }
    let total = header.length as usize;
    if total < AVP_HEADER_LEN || total > unread.len() {
        return Err(Error::Protocol(format!(
            "AVP 0x{expected:02X} length {total} out of range ({} bytes left)",
            unread.len()
        )));
    }
    let shape = shape_of(expected)
        .ok_or_else(|| Error::Protocol(format!("attribute 0x{expected:02X} is not decodable")))?;

    let payload = &unread[AVP_HEADER_LEN..total];
    let len = payload.len();
    let value = match shape {
        Shape::U16 if len == 2 => AvpValue::U16(codec::get_u16(payload)),
        Shape::U32 if len == 4 => AvpValue::U32(codec::get_u32(payload)),
        Shape::F32 if len == 4 => AvpValue::F32(codec::get_f32(payload)),
        Shape::Timestamp if len == 8 => {
            AvpValue::Timestamp(codec::get_u32(payload), codec::get_u32(&payload[4..]))
        }
        Shape::Fixed(n) if len == n => AvpValue::Bytes(payload.to_vec()),
        Shape::Bytes { max } if len <= max => AvpValue::Bytes(payload.to_vec()),
        Shape::OpenBytes { .. } => AvpValue::Bytes(payload.to_vec()),
        Shape::Text { max } if len <= max => {
            let text = payload.split(|&b| b == 0).next().unwrap_or_default();
            AvpValue::Text(String::from_utf8_lossy(text).into_owned())
        }
        _ => {
            return Err(Error::Protocol(format!(
                "AVP 0x{expected:02X} payload of {len} bytes does not fit {shape:?}"
            )))
        }
    };

    buf.take(total);
    Ok(Some(value))
}

//! Inventory flags, request building and batch reply decoding.
//!
//! A tag record is a fixed sequence of AVPs. Without `COMPACT` it opens
//! with source, read point, timestamp, tag type and ID length before the
//! ID; with `COMPACT` only the ID is sent and its length comes from the
//! AVP framing. Optional fields follow in the order RSSI, TID length
//! (plus TID when non-zero), XPC, PC, each present only when its flag was
//! set at inventory start.
//!
//! The same [`TagField`] sequence drives both the batch decoder here and
//! the streaming decoder in [`framed`](crate::framed).

use std::ops::{BitOr, BitOrAssign};

use rfidlib_core::error::{Error, Result};
use rfidlib_core::status::ResultCode;
use rfidlib_core::types::{MemBank, Protocol, Tag, MAX_ID_LENGTH, MAX_TID_SIZE};

use crate::avp::{self, AvpValue};
use crate::buffer::FrameBuffer;
use crate::protocol::attr;

// ---------------------------------------------------------------
// Flags
// ---------------------------------------------------------------

/// Inventory option bitmask as sent in the `BITMASK` AVP.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct InventoryFlags(u16);

impl InventoryFlags {
    pub const NONE: InventoryFlags = InventoryFlags(0);
    pub const RSSI: InventoryFlags = InventoryFlags(0x0001);
    pub const FRAMED: InventoryFlags = InventoryFlags(0x0002);
    pub const CONTINUOUS: InventoryFlags = InventoryFlags(0x0004);
    pub const COMPACT: InventoryFlags = InventoryFlags(0x0008);
    pub const TID: InventoryFlags = InventoryFlags(0x0010);
    pub const EVENT_TRIGGER: InventoryFlags = InventoryFlags(0x0020);
    pub const XPC: InventoryFlags = InventoryFlags(0x0040);
    pub const PC: InventoryFlags = InventoryFlags(0x0100);

    /// Bits the reader understands; others are dropped.
    pub const VALID_MASK: u16 = 0x017F;

    pub const fn from_bits(bits: u16) -> Self {
        InventoryFlags(bits & Self::VALID_MASK)
    }

    pub const fn bits(self) -> u16 {
        self.0
    }

    pub const fn contains(self, other: InventoryFlags) -> bool {
        self.0 & other.0 == other.0
    }

    pub const fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl BitOr for InventoryFlags {
    type Output = InventoryFlags;

    fn bitor(self, rhs: InventoryFlags) -> InventoryFlags {
        InventoryFlags(self.0 | rhs.0)
    }
}

impl BitOrAssign for InventoryFlags {
    fn bitor_assign(&mut self, rhs: InventoryFlags) {
        self.0 |= rhs.0;
    }
}

/// Decoded inventory options, kept on the reader for the length of a
/// streaming session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct InventorySession {
    pub rssi: bool,
    pub framed: bool,
    pub continuous: bool,
    pub compact: bool,
    pub tid: bool,
    pub event_trigger: bool,
    pub xpc: bool,
    pub pc: bool,
}

impl InventorySession {
    /// Decode and validate `flags`.
    ///
    /// `FRAMED` and `CONTINUOUS` must be set together, and
    /// `EVENT_TRIGGER` needs `FRAMED`.
    pub fn from_flags(flags: InventoryFlags) -> Result<Self> {
        let session = InventorySession {
            rssi: flags.contains(InventoryFlags::RSSI),
            framed: flags.contains(InventoryFlags::FRAMED),
            continuous: flags.contains(InventoryFlags::CONTINUOUS),
            compact: flags.contains(InventoryFlags::COMPACT),
            tid: flags.contains(InventoryFlags::TID),
            event_trigger: flags.contains(InventoryFlags::EVENT_TRIGGER),
            xpc: flags.contains(InventoryFlags::XPC),
            pc: flags.contains(InventoryFlags::PC),
        };
        if session.continuous != session.framed {
            return Err(Error::InvalidParameter(
                "framed and continuous must be set together".into(),
            ));
        }
        if session.event_trigger && !session.framed {
            return Err(Error::InvalidParameter("event trigger requires framed".into()));
        }
        Ok(session)
    }
}

// ---------------------------------------------------------------
// Request
// ---------------------------------------------------------------

/// Select mask restricting an inventory to matching tags.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TagMask {
    pub bank: MemBank,
    /// First bit of the mask within the bank.
    pub bit_address: u16,
    /// Number of mask bits; zero disables the mask.
    pub bit_length: u16,
    pub data: Vec<u8>,
}

/// Positional arguments for [`commands::INVENTORY`](crate::commands::INVENTORY).
pub fn request_args(
    source: &str,
    mask: Option<&TagMask>,
    flags: InventoryFlags,
) -> Result<Vec<Option<AvpValue>>> {
    let mut args = vec![Some(AvpValue::Text(source.to_string()))];

    match mask.filter(|m| m.bit_length > 0) {
        Some(mask) => {
            let needed = (mask.bit_length as usize).div_ceil(8);
            if needed > mask.data.len() {
                return Err(Error::InvalidParameter(format!(
                    "mask of {} bits needs {needed} bytes, got {}",
                    mask.bit_length,
                    mask.data.len()
                )));
            }
            args.push(Some(AvpValue::U16(mask.bank.raw())));
            args.push(Some(AvpValue::U16(mask.bit_length)));
            args.push(Some(AvpValue::Bytes(mask.data.clone())));
            args.push(Some(AvpValue::U16(mask.bit_address)));
        }
        None => args.extend([None, None, None, None]),
    }

    args.push((!flags.is_empty()).then(|| AvpValue::U16(flags.bits())));
    Ok(args)
}

// ---------------------------------------------------------------
// Tag record fields
// ---------------------------------------------------------------

/// One field of a tag record, in wire order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum TagField {
    Source,
    ReadPoint,
    Timestamp,
    Type,
    IdLength,
    Id,
    Rssi,
    TidLength,
    Tid,
    Xpc,
    Pc,
}

impl TagField {
    /// The field a record opens with.
    pub fn first(session: &InventorySession) -> TagField {
        if session.compact {
            TagField::Id
        } else {
            TagField::Source
        }
    }

    pub fn avp_type(self) -> u16 {
        match self {
            TagField::Source => attr::SOURCE_NAME,
            TagField::ReadPoint => attr::READPOINT_NAME,
            TagField::Timestamp => attr::TIMESTAMP,
            TagField::Type => attr::TAGTYPE,
            TagField::IdLength => attr::TAGIDLEN,
            TagField::Id => attr::TAGID,
            TagField::Rssi => attr::RSSI,
            TagField::TidLength => attr::LENGTH,
            TagField::Tid => attr::TAG_VALUE,
            TagField::Xpc => attr::XPC,
            TagField::Pc => attr::PC,
        }
    }

    /// The field after this one, or `None` once the record is complete.
    pub fn next(self, session: &InventorySession, tag: &Tag) -> Option<TagField> {
        match self {
            TagField::Source => Some(TagField::ReadPoint),
            TagField::ReadPoint => Some(TagField::Timestamp),
            TagField::Timestamp => Some(TagField::Type),
            TagField::Type => Some(TagField::IdLength),
            TagField::IdLength => Some(TagField::Id),
            TagField::TidLength if tag.tid_length > 0 => Some(TagField::Tid),
            _ => self.next_optional(session),
        }
    }

    fn next_optional(self, session: &InventorySession) -> Option<TagField> {
        [
            (TagField::Rssi, session.rssi),
            (TagField::TidLength, session.tid),
            (TagField::Xpc, session.xpc),
            (TagField::Pc, session.pc),
        ]
        .into_iter()
        .find(|&(field, enabled)| enabled && field > self)
        .map(|(field, _)| field)
    }

    /// Store a decoded value into `tag`.
    ///
    /// Rejects ID and TID lengths beyond what a tag can carry.
    pub fn store(self, tag: &mut Tag, value: AvpValue, session: &InventorySession) -> Result<()> {
        match (self, value) {
            (TagField::Source, AvpValue::Text(s)) => tag.logical_source = s,
            (TagField::ReadPoint, AvpValue::Text(s)) => tag.read_point = s,
            (TagField::Timestamp, AvpValue::Timestamp(sec, usec)) => tag.timestamp = (sec, usec),
            (TagField::Type, AvpValue::U16(t)) => tag.protocol = Protocol::from_raw(t.into()),
            (TagField::IdLength, AvpValue::U16(len)) => {
                if len as usize > MAX_ID_LENGTH {
                    return Err(Error::Protocol(format!("tag ID length {len} too long")));
                }
                tag.length = len;
            }
            (TagField::Id, AvpValue::Bytes(id)) => {
                if session.compact {
                    tag.length = id.len() as u16;
                }
                tag.id = id;
            }
            (TagField::Rssi, AvpValue::U16(rssi)) => tag.rssi = rssi as i16,
            (TagField::TidLength, AvpValue::U16(len)) => {
                if len as usize > MAX_TID_SIZE {
                    return Err(Error::Protocol(format!("TID length {len} too long")));
                }
                tag.tid_length = len;
            }
            (TagField::Tid, AvpValue::Bytes(tid)) => {
                if tid.len() > MAX_TID_SIZE {
                    return Err(Error::Protocol(format!("TID of {} bytes too long", tid.len())));
                }
                tag.tid = tid;
            }
            (TagField::Xpc, AvpValue::Bytes(b)) if b.len() == tag.xpc.len() => {
                tag.xpc.copy_from_slice(&b)
            }
            (TagField::Pc, AvpValue::Bytes(b)) if b.len() == tag.pc.len() => {
                tag.pc.copy_from_slice(&b)
            }
            (field, value) => {
                return Err(Error::Protocol(format!(
                    "{field:?} cannot hold {value:?}"
                )))
            }
        }
        Ok(())
    }
}

// ---------------------------------------------------------------
// Batch decode
// ---------------------------------------------------------------

/// Outcome of one batch inventory round.
///
/// The reader reports its status after the records, so a non-zero
/// `status` can arrive together with tags that were read before the
/// round went wrong.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InventoryReport {
    /// Tags seen, most recent first.
    pub tags: Vec<Tag>,
    pub status: ResultCode,
}

impl InventoryReport {
    pub fn is_ok(&self) -> bool {
        self.status.is_ok()
    }

    /// The tags, or [`Error::Device`] if the round did not complete.
    pub fn into_tags(self) -> Result<Vec<Tag>> {
        self.status.into_result()?;
        Ok(self.tags)
    }
}

/// Decode consecutive tag records from a batch inventory reply.
///
/// Stops at the first AVP that is not the next expected field, leaving
/// the cursor on it (normally the result code). A record cut short there
/// is dropped. Tags are returned newest first.
pub fn decode_tags(buf: &mut FrameBuffer, session: &InventorySession) -> Result<Vec<Tag>> {
    let mut tags = Vec::new();
    'records: loop {
        let mut tag = Tag::default();
        let mut field = Some(TagField::first(session));
        while let Some(current) = field {
            match avp::decode(buf, current.avp_type()) {
                Ok(Some(value)) => current.store(&mut tag, value, session)?,
                Ok(None) | Err(_) => break 'records,
            }
            field = current.next(session, &tag);
        }
        tags.push(tag);
    }
    tags.reverse();
    Ok(tags)
}

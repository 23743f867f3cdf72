//! CAEN RFID binary AVP protocol driver for rfidlib.
//!
//! This crate talks to CAEN RFID readers over the vendor's binary
//! attribute-value-pair protocol. It provides:
//!
//! - **Wire vocabulary** ([`protocol`]) -- frame constants, AVP type codes
//!   and command codes.
//! - **Codecs** ([`codec`], [`avp`], [`header`]) -- big-endian integers,
//!   typed AVP encode/decode with per-type payload shapes, and the 10-byte
//!   frame header with reply validation.
//! - **FrameBuffer** ([`buffer`]) -- the cursor-tracked byte buffer every
//!   transaction is built in and decoded from.
//! - **Engine** ([`engine`]) -- one request, one reply: command ids,
//!   flush, masked transmit, header-then-body receive.
//! - **Command table** ([`commands`]) -- request and reply layout of every
//!   reader operation, driven by one generic helper.
//! - **Inventory** ([`inventory`], [`framed`]) -- batch tag decoding and
//!   the streaming receiver for framed, continuous inventories.
//! - **CaenReader** ([`reader`]) and **CaenReaderBuilder** ([`builder`]).
//!
//! # Example
//!
//! ```
//! use rfidlib_caen::avp::AvpValue;
//! use rfidlib_caen::engine::build_request;
//! use rfidlib_caen::protocol::{attr, cmd};
//!
//! // Set RF power to 500 mW, command id 1.
//! let frame = build_request(1, cmd::SETPOWER, &[(attr::POWER, AvpValue::U32(500))]).unwrap();
//! assert_eq!(&frame.written()[..4], &[0x80, 0x01, 0x00, 0x01]);
//! assert_eq!(frame.written().len(), 26);
//! ```

pub mod avp;
pub mod buffer;
pub mod builder;
pub mod codec;
pub mod commands;
pub mod engine;
pub mod framed;
pub mod header;
pub mod inventory;
pub mod protocol;
pub mod reader;

pub use builder::CaenReaderBuilder;
pub use framed::InventoryEvent;
pub use inventory::{InventoryFlags, InventoryReport, InventorySession, TagMask};
pub use reader::CaenReader;

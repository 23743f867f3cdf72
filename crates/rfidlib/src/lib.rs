//! # rfidlib -- Host-side Control of UHF RFID Readers
//!
//! `rfidlib` is an asynchronous Rust library for driving UHF RFID readers
//! from a host computer: configuring antennas and RF, running tag
//! inventories, and reading or writing EPC C1G2 tag memory.
//!
//! ## Quick Start
//!
//! Add `rfidlib` to your `Cargo.toml`:
//!
//! ```toml
//! [dependencies]
//! rfidlib = { version = "0.1", features = ["caen"] }
//! tokio = { version = "1", features = ["full"] }
//! ```
//!
//! Wrap your link to the reader in a [`Transport`] and build a reader:
//!
//! ```no_run
//! use rfidlib::caen::{CaenReaderBuilder, InventoryFlags};
//!
//! # async fn example(transport: Box<dyn rfidlib::Transport>) -> anyhow::Result<()> {
//! let mut reader = CaenReaderBuilder::new()
//!     .build_with_transport(transport)
//!     .await?;
//!
//! let report = reader.inventory("Source_0", None, InventoryFlags::RSSI).await?;
//! for tag in report.into_tags()? {
//!     println!("{} rssi {}", tag.id_hex(), tag.rssi);
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Architecture
//!
//! The library is organized as a workspace of focused crates:
//!
//! | Crate                   | Purpose                                          |
//! |-------------------------|--------------------------------------------------|
//! | `rfidlib-core`          | [`Transport`] trait, [`Error`], [`ResultCode`], tag and reader types |
//! | `rfidlib-caen`          | CAEN RFID binary AVP protocol driver             |
//! | `rfidlib-test-harness`  | `MockTransport` for scripted, hardware-free tests |
//! | **`rfidlib`**           | This facade crate -- re-exports everything       |
//!
//! Physical links (serial, TCP, USB) are left to the application: anything
//! implementing [`Transport`] can carry the protocol.
//!
//! ## Feature Flags
//!
//! | Feature | Enables                                | Default |
//! |---------|----------------------------------------|---------|
//! | `caen`  | [`caen`] module (binary AVP protocol)  | yes     |
//!
//! ## Framed Inventory
//!
//! A framed, continuous inventory streams tags until it is aborted. Poll
//! it until the reader reports its final status:
//!
//! ```no_run
//! use rfidlib::caen::{CaenReader, InventoryEvent, InventoryFlags};
//! # async fn example(reader: &mut CaenReader) -> rfidlib::Result<()> {
//! let flags = InventoryFlags::FRAMED | InventoryFlags::CONTINUOUS;
//! reader.start_framed_inventory("Source_0", None, flags).await?;
//! loop {
//!     match reader.get_framed_tag().await? {
//!         InventoryEvent::Tag(tag) => println!("{}", tag.id_hex()),
//!         InventoryEvent::Quiet => continue,
//!         InventoryEvent::Finished(code) => {
//!             println!("done: {code}");
//!             break;
//!         }
//!     }
//! }
//! # Ok(())
//! # }
//! ```

pub use rfidlib_core::*;

/// CAEN RFID binary AVP protocol backend.
///
/// Provides [`CaenReader`](caen::CaenReader) and
/// [`CaenReaderBuilder`](caen::CaenReaderBuilder) for controlling CAEN
/// readers, plus the frame and AVP codecs they are built on.
#[cfg(feature = "caen")]
pub mod caen {
    pub use rfidlib_caen::*;
}

//! rfidlib-core: Core traits, types, and error definitions for rfidlib.
//!
//! This crate defines the reader-agnostic pieces every rfidlib driver
//! shares. Applications can depend on these types without pulling in a
//! specific protocol driver.
//!
//! # Key types
//!
//! - [`Transport`] -- byte-level communication channel
//! - [`Tag`] -- a decoded tag observation
//! - [`ResultCode`] -- device-reported status
//! - [`Error`] / [`Result`] -- error handling

pub mod error;
pub mod status;
pub mod transport;
pub mod types;

// Re-export key types at crate root for ergonomic `use rfidlib_core::*`.
pub use error::{Error, Result};
pub use status::ResultCode;
pub use transport::Transport;
pub use types::*;

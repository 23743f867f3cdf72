//! CaenReaderBuilder -- fluent builder for [`CaenReader`] instances.
//!
//! Separates timing configuration from construction. The physical link is
//! supplied by the caller as a ready [`Transport`].
//!
//! # Example
//!
//! ```no_run
//! use rfidlib_caen::builder::CaenReaderBuilder;
//! use std::time::Duration;
//!
//! # async fn example(transport: Box<dyn rfidlib_core::Transport>) -> rfidlib_core::Result<()> {
//! let mut reader = CaenReaderBuilder::new()
//!     .command_timeout(Duration::from_secs(2))
//!     .build_with_transport(transport)
//!     .await?;
//! println!("{}", reader.get_firmware_release().await?);
//! # Ok(())
//! # }
//! ```

use std::time::Duration;

use rfidlib_core::error::{Error, Result};
use rfidlib_core::transport::Transport;

use crate::engine::Engine;
use crate::reader::CaenReader;

/// Fluent builder for [`CaenReader`].
#[derive(Debug, Clone)]
pub struct CaenReaderBuilder {
    command_timeout: Duration,
    first_field_timeout: Duration,
    field_timeout: Duration,
    initial_command_id: u16,
}

impl Default for CaenReaderBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl CaenReaderBuilder {
    pub fn new() -> Self {
        CaenReaderBuilder {
            command_timeout: Duration::from_millis(5000),
            first_field_timeout: Duration::from_millis(500),
            field_timeout: Duration::from_millis(5000),
            initial_command_id: 0,
        }
    }

    /// Time allowed for each part of a reply: the header, then the body
    /// (default: 5000ms).
    pub fn command_timeout(mut self, timeout: Duration) -> Self {
        self.command_timeout = timeout;
        self
    }

    /// How long a framed inventory read waits for the start of the next
    /// record before reporting the stream quiet (default: 500ms).
    pub fn first_field_timeout(mut self, timeout: Duration) -> Self {
        self.first_field_timeout = timeout;
        self
    }

    /// Time allowed for each later field of a streamed record
    /// (default: 5000ms).
    pub fn field_timeout(mut self, timeout: Duration) -> Self {
        self.field_timeout = timeout;
        self
    }

    /// Seed for the command-id counter. The first request carries the
    /// next value.
    pub fn initial_command_id(mut self, id: u16) -> Self {
        self.initial_command_id = id;
        self
    }

    /// Build a [`CaenReader`] over a caller-provided transport.
    ///
    /// Pass a `MockTransport` from `rfidlib-test-harness` for testing.
    pub async fn build_with_transport(self, transport: Box<dyn Transport>) -> Result<CaenReader> {
        if !transport.is_connected() {
            return Err(Error::NotConnected);
        }
        let engine = Engine::new(transport, self.initial_command_id, self.command_timeout);
        Ok(CaenReader::new(
            engine,
            self.first_field_timeout,
            self.field_timeout,
        ))
    }
}

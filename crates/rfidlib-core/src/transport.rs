//! Transport trait for reader communication.
//!
//! The [`Transport`] trait abstracts over the physical link to an RFID
//! reader: RS-232, USB-CDC, or a TCP socket. Opening the link is the
//! embedding application's job; the protocol engine in `rfidlib-caen`
//! only needs to push bytes, pull bytes with a deadline, flush stale input,
//! and bracket a transmit with interrupt masking on bare-metal hosts.
//!
//! Deterministic unit tests use `MockTransport` from the
//! `rfidlib-test-harness` crate.

use async_trait::async_trait;
use std::time::Duration;

use crate::error::Result;

/// Asynchronous byte-level transport to a reader.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send raw bytes to the reader.
    ///
    /// Implementations should not return until every byte has been handed
    /// to the underlying link. The reader drops a frame whose bytes arrive
    /// with long gaps between them.
    async fn send(&mut self, data: &[u8]) -> Result<()>;

    /// Receive bytes from the reader into the provided buffer.
    ///
    /// Returns the number of bytes actually read, which may be fewer than
    /// `buf.len()`. Will wait up to `timeout` for data to arrive; returns
    /// [`Error::Timeout`](crate::error::Error::Timeout) if nothing is
    /// received within the deadline.
    async fn receive(&mut self, buf: &mut [u8], timeout: Duration) -> Result<usize>;

    /// Drop any bytes received but not yet read.
    async fn discard_unread(&mut self) -> Result<()>;

    /// Mask host interrupts ahead of a transmit.
    ///
    /// Only meaningful on bare-metal hosts where an interrupt handler can
    /// preempt the sender between bytes. Hosted transports leave the
    /// default no-op.
    fn disable_interrupts(&mut self) {}

    /// Undo [`disable_interrupts`](Self::disable_interrupts).
    fn enable_interrupts(&mut self) {}

    /// Close the transport connection.
    ///
    /// After calling `close()`, subsequent `send()` and `receive()` calls
    /// should return [`Error::NotConnected`](crate::error::Error::NotConnected).
    async fn close(&mut self) -> Result<()>;

    /// Check whether the transport is currently connected.
    fn is_connected(&self) -> bool;
}

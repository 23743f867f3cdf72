//! rfidlib-test-harness: Test utilities and mock transports for rfidlib.
//!
//! This crate provides [`MockTransport`] for deterministic unit testing of
//! protocol engines without requiring a real reader.

pub mod mock_transport;

pub use mock_transport::{MockLog, MockTransport, TransportEvent};

//! Mock transport for deterministic testing of protocol engines.
//!
//! [`MockTransport`] implements the [`Transport`] trait with pre-loaded
//! request/response pairs plus a free-running inbound byte queue. The
//! queue lets tests model a reader that streams tag records with no
//! request in front of them, and a link that stalls halfway through a
//! frame (an empty queue reads as a timeout).
//!
//! # Example
//!
//! ```
//! use rfidlib_test_harness::MockTransport;
//!
//! let mut mock = MockTransport::new();
//! // When the engine sends this request, queue this reply.
//! mock.expect(&[0x80, 0x01], &[0x00, 0x01]);
//! // Bytes the reader sends on its own.
//! mock.push_incoming(&[0x00, 0x00, 0x00, 0x08]);
//!
//! // Keep a handle on the call log before the mock is boxed away.
//! let log = mock.log();
//! assert!(log.events().is_empty());
//! ```

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;

use rfidlib_core::error::{Error, Result};
use rfidlib_core::transport::Transport;

/// A pre-loaded request/response pair for the mock transport.
#[derive(Debug, Clone)]
struct Expectation {
    /// The exact bytes we expect to be sent.
    request: Vec<u8>,
    /// The bytes queued for reading once the matching request is sent.
    response: Vec<u8>,
}

/// One call made on a [`MockTransport`], in the order it happened.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TransportEvent {
    Discard,
    DisableInterrupts,
    /// A `send()`, noting whether interrupts were masked at the time.
    Send { masked: bool },
    EnableInterrupts,
    /// A `receive()` that returned bytes.
    Receive,
}

/// Shared record of the calls made on a [`MockTransport`].
///
/// Cloning is cheap and every clone sees the same log, so a test can keep
/// one after handing the mock to an engine as `Box<dyn Transport>`.
#[derive(Debug, Clone, Default)]
pub struct MockLog {
    events: Arc<Mutex<Vec<TransportEvent>>>,
}

impl MockLog {
    fn lock(&self) -> MutexGuard<'_, Vec<TransportEvent>> {
        // A panicking test thread cannot leave the log half-written.
        self.events.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn record(&self, event: TransportEvent) {
        self.lock().push(event);
    }

    /// Every call so far, oldest first.
    pub fn events(&self) -> Vec<TransportEvent> {
        self.lock().clone()
    }

    /// How many times `discard_unread()` has been called.
    pub fn discard_count(&self) -> usize {
        self.count(|e| e == TransportEvent::Discard)
    }

    /// How many `send()` calls happened with interrupts masked.
    pub fn masked_sends(&self) -> usize {
        self.count(|e| e == TransportEvent::Send { masked: true })
    }

    fn count(&self, pred: impl Fn(TransportEvent) -> bool) -> usize {
        self.lock().iter().filter(|e| pred(**e)).count()
    }
}

/// A mock [`Transport`] for testing protocol engines without hardware.
///
/// Expectations are consumed in order. When `send()` is called, the sent
/// data is recorded and matched against the next expectation, and the
/// corresponding response is appended to the inbound queue. `receive()`
/// drains the queue and reports [`Error::Timeout`] once it is empty.
#[derive(Debug)]
pub struct MockTransport {
    expectations: VecDeque<Expectation>,
    /// Bytes available to `receive()`.
    incoming: VecDeque<u8>,
    connected: bool,
    /// Log of all bytes sent through this transport.
    sent_log: Vec<Vec<u8>>,
    log: MockLog,
    interrupts_masked: bool,
    require_masked: bool,
}

impl MockTransport {
    /// Create a new mock transport in the connected state.
    pub fn new() -> Self {
        MockTransport {
            expectations: VecDeque::new(),
            incoming: VecDeque::new(),
            connected: true,
            sent_log: Vec::new(),
            log: MockLog::default(),
            interrupts_masked: false,
            require_masked: false,
        }
    }

    /// Add an expected request/response pair.
    ///
    /// When `send()` is called with data matching `request`, `response` is
    /// queued for subsequent `receive()` calls. An empty response models a
    /// reader that never answers.
    pub fn expect(&mut self, request: &[u8], response: &[u8]) {
        self.expectations.push_back(Expectation {
            request: request.to_vec(),
            response: response.to_vec(),
        });
    }

    /// Queue bytes the reader sends without being asked.
    pub fn push_incoming(&mut self, data: &[u8]) {
        self.incoming.extend(data.iter().copied());
    }

    /// Return a reference to all data that has been sent through this transport.
    ///
    /// Each element is the byte slice from one `send()` call.
    pub fn sent_data(&self) -> &[Vec<u8>] {
        &self.sent_log
    }

    /// Return the number of expectations that have not yet been consumed.
    pub fn remaining_expectations(&self) -> usize {
        self.expectations.len()
    }

    /// Number of inbound bytes not yet read.
    pub fn unread_len(&self) -> usize {
        self.incoming.len()
    }

    /// A handle on this transport's call log that outlives boxing.
    pub fn log(&self) -> MockLog {
        self.log.clone()
    }

    /// How many times `discard_unread()` has been called.
    pub fn discard_count(&self) -> usize {
        self.log.discard_count()
    }

    /// How many `send()` calls happened with interrupts masked.
    pub fn masked_sends(&self) -> usize {
        self.log.masked_sends()
    }

    /// Fail any `send()` made while interrupts are not masked.
    pub fn require_masked_sends(&mut self, on: bool) {
        self.require_masked = on;
    }

    /// Whether interrupts are currently masked.
    pub fn interrupts_masked(&self) -> bool {
        self.interrupts_masked
    }

    /// Set the connected state of the mock transport.
    ///
    /// When set to `false`, subsequent `send()` and `receive()` calls will
    /// return [`Error::NotConnected`].
    pub fn set_connected(&mut self, connected: bool) {
        self.connected = connected;
    }
}

impl Default for MockTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&mut self, data: &[u8]) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }

        self.sent_log.push(data.to_vec());
        self.log.record(TransportEvent::Send {
            masked: self.interrupts_masked,
        });
        if !self.interrupts_masked && self.require_masked {
            return Err(Error::Transport("send with interrupts enabled".into()));
        }

        let expectation = self
            .expectations
            .pop_front()
            .ok_or_else(|| Error::Transport("no more expectations in mock transport".into()))?;
        if data != expectation.request.as_slice() {
            return Err(Error::Transport(format!(
                "unexpected send data: expected {:02X?}, got {:02X?}",
                expectation.request, data
            )));
        }
        self.incoming.extend(expectation.response);
        Ok(())
    }

    async fn receive(&mut self, buf: &mut [u8], _timeout: Duration) -> Result<usize> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        if self.incoming.is_empty() {
            return Err(Error::Timeout);
        }

        let n = self.incoming.len().min(buf.len());
        for (slot, byte) in buf.iter_mut().zip(self.incoming.drain(..n)) {
            *slot = byte;
        }
        self.log.record(TransportEvent::Receive);
        Ok(n)
    }

    async fn discard_unread(&mut self) -> Result<()> {
        if !self.connected {
            return Err(Error::NotConnected);
        }
        self.log.record(TransportEvent::Discard);
        self.incoming.clear();
        Ok(())
    }

    fn disable_interrupts(&mut self) {
        self.log.record(TransportEvent::DisableInterrupts);
        self.interrupts_masked = true;
    }

    fn enable_interrupts(&mut self) {
        self.log.record(TransportEvent::EnableInterrupts);
        self.interrupts_masked = false;
    }

    async fn close(&mut self) -> Result<()> {
        self.connected = false;
        self.incoming.clear();
        Ok(())
    }

    fn is_connected(&self) -> bool {
        self.connected
    }
}

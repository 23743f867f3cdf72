//! Transaction engine: one request, one reply.
//!
//! [`Engine`] owns the transport and the command-id counter. A
//! transaction builds the request frame, flushes stale input, transmits
//! with interrupts masked, then reads and validates the reply header
//! before pulling in the body. The returned [`Reply`] leaves the read
//! cursor just past the header.
//!
//! No step retries. Any failure is reported to the caller and the partial
//! reply is dropped.

use std::time::Duration;

use tokio::time::Instant;
use tracing::{debug, trace, warn};

use rfidlib_core::error::{Error, Result};
use rfidlib_core::status::ResultCode;
use rfidlib_core::transport::Transport;
use rfidlib_core::types::MAX_ID_LENGTH;

use crate::avp::{self, AvpHeader, AvpValue};
use crate::buffer::FrameBuffer;
use crate::codec;
use crate::header::{self, encode_header};
use crate::protocol::{attr, command_name, ABORT_BYTE, AVP_HEADER_LEN, HEADER_LEN};

/// Largest single AVP accepted while streaming: a header plus a
/// maximum-length tag ID.
pub const MAX_STREAM_AVP: usize = AVP_HEADER_LEN + MAX_ID_LENGTH;

/// Owns the link to one reader and the state shared by its transactions.
pub struct Engine {
    transport: Box<dyn Transport>,
    command_id: u16,
    command_timeout: Duration,
}

impl Engine {
    pub fn new(
        transport: Box<dyn Transport>,
        initial_command_id: u16,
        command_timeout: Duration,
    ) -> Self {
        Engine {
            transport,
            command_id: initial_command_id,
            command_timeout,
        }
    }

    /// The id the most recent request was sent with.
    pub fn command_id(&self) -> u16 {
        self.command_id
    }

    pub fn is_connected(&self) -> bool {
        self.transport.is_connected()
    }

    pub async fn close(&mut self) -> Result<()> {
        self.transport.close().await
    }


    /// Send `command` with `fields` and read back the reply.
    pub async fn transact(&mut self, command: u16, fields: &[(u16, AvpValue)]) -> Result<Reply> {
        for (avp_type, value) in fields {
            avp::check(*avp_type, value)?;
        }

        // The counter only advances once the frame exists, wrapping at 65536.
        let id = self.command_id.wrapping_add(1);
        let request = build_request(id, command, fields)?;
        self.command_id = id;
        debug!(
            command = command_name(command),
            command_id = id,
            len = request.write_pos(),
            "sending request"
        );
        let buf = self.send_receive(&request).await?;
        debug!(
            command = command_name(command),
            command_id = id,
            len = buf.write_pos(),
            "reply received"
        );
        Ok(Reply { buf, command })
    }

    /// Run one exchange for an already-built request frame.
    ///
    /// The reply must carry the command id found in the request header.
    pub async fn send_receive(&mut self, request: &FrameBuffer) -> Result<FrameBuffer> {
        let frame = request.written();
        if frame.len() < HEADER_LEN {
            return Err(Error::InvalidParameter(format!(
                "request of {} bytes has no header",
                frame.len()
            )));
        }
        let sent_id = codec::get_u16(&frame[2..]);

        self.transport.discard_unread().await?;

        trace!(data = ?frame, "tx");
        self.transport.disable_interrupts();
        let sent = self.transport.send(frame).await;
        self.transport.enable_interrupts();
        sent?;

        let mut raw = [0u8; HEADER_LEN];
        receive_exact(&mut *self.transport, &mut raw, self.command_timeout).await?;
        let total = header::validate_reply(&raw, sent_id)?;

        let mut reply = FrameBuffer::with_size(HEADER_LEN);
        reply.append(&raw);
        reply.grow(total)?;
        let body = receive_exact(&mut *self.transport, reply.unfilled_mut(), self.command_timeout);
        if let Err(e) = body.await {
            reply.release();
            return Err(e);
        }
        reply.commit(total - HEADER_LEN)?;
        reply.seek(HEADER_LEN)?;
        trace!(data = ?reply.written(), "rx");
        Ok(reply)
    }

    /// Receive one AVP straight off the transport, header first.
    ///
    /// Used while the reader streams tag records outside any reply frame.
    pub async fn receive_avp(&mut self, timeout: Duration) -> Result<FrameBuffer> {
        let mut buf = FrameBuffer::with_size(MAX_STREAM_AVP);
        let head = &mut buf.unfilled_mut()[..AVP_HEADER_LEN];
        receive_exact(&mut *self.transport, head, timeout).await?;
        buf.commit(AVP_HEADER_LEN)?;

        let header = AvpHeader::parse(buf.written())
            .ok_or_else(|| Error::Communication("short AVP header".into()))?;
        let total = header.length as usize;
        if header.reserved != 0 || total < AVP_HEADER_LEN {
            return Err(Error::Communication(format!(
                "bad streamed AVP header: reserved 0x{:04X}, length {total}",
                header.reserved
            )));
        }
        if total > MAX_STREAM_AVP {
            return Err(Error::Protocol(format!(
                "streamed AVP 0x{:04X} of {total} bytes exceeds {MAX_STREAM_AVP}",
                header.avp_type
            )));
        }

        let payload = total - AVP_HEADER_LEN;
        let body = &mut buf.unfilled_mut()[..payload];
        receive_exact(&mut *self.transport, body, timeout).await?;
        buf.commit(payload)?;
        trace!(avp_type = header.avp_type, len = total, "streamed AVP");
        Ok(buf)
    }

    /// Send the out-of-band abort byte.
    pub async fn send_abort(&mut self) -> Result<()> {
        debug!("sending inventory abort");
        self.transport.send(&[ABORT_BYTE]).await
    }
}

/// Assemble a request frame: header, command AVP, then `fields` in order.
pub fn build_request(
    command_id: u16,
    command: u16,
    fields: &[(u16, AvpValue)],
) -> Result<FrameBuffer> {
    let command_avp = AvpValue::U16(command);
    let total = HEADER_LEN
        + avp::encoded_len(&command_avp)
        + fields.iter().map(|(_, v)| avp::encoded_len(v)).sum::<usize>();
    let total_length = u16::try_from(total)
        .map_err(|_| Error::InvalidParameter(format!("request of {total} bytes is too long")))?;

    let mut buf = FrameBuffer::with_size(total);
    encode_header(&mut buf, command_id, total_length);
    avp::encode(&mut buf, attr::COMMAND, &command_avp);
    for (avp_type, value) in fields {
        avp::encode(&mut buf, *avp_type, value);
    }
    Ok(buf)
}

/// Fill `buf` completely, waiting at most `timeout` overall.
async fn receive_exact(
    transport: &mut dyn Transport,
    buf: &mut [u8],
    timeout: Duration,
) -> Result<()> {
    let deadline = Instant::now() + timeout;
    let mut filled = 0;
    while filled < buf.len() {
        let left = deadline.saturating_duration_since(Instant::now());
        if left.is_zero() {
            return Err(Error::Timeout);
        }
        let n = transport.receive(&mut buf[filled..], left).await?;
        if n == 0 {
            return Err(Error::ConnectionLost);
        }
        filled += n;
    }
    Ok(())
}

// ---------------------------------------------------------------
// Reply extraction
// ---------------------------------------------------------------

/// A validated reply frame, read cursor past the header.
#[derive(Debug)]
pub struct Reply {
    buf: FrameBuffer,
    command: u16,
}

impl Reply {
    /// Consume the mandatory command echo.
    pub fn expect_echo(&mut self) -> Result<()> {
        match avp::decode(&mut self.buf, attr::COMMAND)? {
            Some(AvpValue::U16(echo)) => {
                if echo != self.command {
                    warn!(
                        sent = command_name(self.command),
                        echo = command_name(echo),
                        "reply echoes a different command"
                    );
                }
                Ok(())
            }
            _ => Err(Error::Protocol(format!(
                "{} reply has no command echo",
                command_name(self.command)
            ))),
        }
    }

    /// Probe for an optional field.
    pub fn optional(&mut self, avp_type: u16) -> Result<Option<AvpValue>> {
        avp::decode(&mut self.buf, avp_type)
    }

    /// Consume the mandatory trailing result code.
    pub fn result_code(&mut self) -> Result<ResultCode> {
        match avp::decode(&mut self.buf, attr::RESULT_CODE)? {
            Some(AvpValue::U16(code)) => Ok(ResultCode::from_raw(code)),
            _ => Err(Error::Protocol(format!(
                "{} reply has no result code",
                command_name(self.command)
            ))),
        }
    }

    /// The underlying buffer, for decoders that walk repeated records.
    pub fn buffer_mut(&mut self) -> &mut FrameBuffer {
        &mut self.buf
    }
}

//! Streaming (framed, continuous) inventory receiver.
//!
//! Once a framed inventory is running the reader emits bare AVPs, one tag
//! record after another, outside any reply frame. Each call to
//! [`next_event`] pulls AVPs one at a time until it has either a complete
//! tag or the result code that closes the stream.
//!
//! The first AVP of a call waits only the short first-field timeout; if
//! nothing arrives the stream is idle and the call reports
//! [`InventoryEvent::Quiet`]. Later AVPs of the same record wait the long
//! field timeout and a timeout there is an error. An AVP that is not the
//! next expected tag field ends the record: it is read as the trailing
//! result code instead and any partial tag is dropped.

use std::time::Duration;

use tracing::debug;

use rfidlib_core::error::{Error, Result};
use rfidlib_core::status::ResultCode;
use rfidlib_core::types::Tag;

use crate::avp::{self, AvpValue};
use crate::buffer::FrameBuffer;
use crate::engine::Engine;
use crate::inventory::{InventorySession, TagField};
use crate::protocol::attr;

/// Outcome of one streaming receive.
#[derive(Debug, Clone, PartialEq)]
pub enum InventoryEvent {
    /// A complete tag record.
    Tag(Tag),
    /// The stream ended with this device status.
    Finished(ResultCode),
    /// Nothing arrived within the first-field timeout.
    Quiet,
}

/// Receiver state. Each variant carries what the record has so far.
#[derive(Debug)]
enum State {
    /// Waiting for the AVP holding `field`.
    Await { field: TagField, tag: Tag },
    /// An AVP is in hand; try it as `field`.
    Decode {
        field: TagField,
        tag: Tag,
        avp: FrameBuffer,
    },
    /// The record is over; `avp` must be the result code.
    Result { avp: FrameBuffer },
    Done(InventoryEvent),
}

/// Apply one AVP. `Await` and `Done` need the caller and pass through.
fn advance(state: State, session: &InventorySession) -> Result<State> {
    match state {
        State::Decode {
            field,
            mut tag,
            mut avp,
        } => match avp::decode(&mut avp, field.avp_type()) {
            Ok(Some(value)) => {
                field.store(&mut tag, value, session)?;
                Ok(match field.next(session, &tag) {
                    Some(next) => State::Await { field: next, tag },
                    None => State::Done(InventoryEvent::Tag(tag)),
                })
            }
            Ok(None) | Err(_) => Ok(State::Result { avp }),
        },
        State::Result { mut avp } => match avp::decode(&mut avp, attr::RESULT_CODE) {
            Ok(Some(AvpValue::U16(code))) => Ok(State::Done(InventoryEvent::Finished(
                ResultCode::from_raw(code),
            ))),
            _ => Err(Error::Protocol(
                "streamed record is neither a tag nor a result code".into(),
            )),
        },
        other => Ok(other),
    }
}

/// Receive the next tag or end-of-stream marker.
pub async fn next_event(
    engine: &mut Engine,
    session: &InventorySession,
    first_field_timeout: Duration,
    field_timeout: Duration,
) -> Result<InventoryEvent> {
    let avp = match engine.receive_avp(first_field_timeout).await {
        Ok(avp) => avp,
        Err(Error::Timeout) => {
            debug!("inventory stream quiet");
            return Ok(InventoryEvent::Quiet);
        }
        Err(e) => return Err(e),
    };

    let mut state = State::Decode {
        field: TagField::first(session),
        tag: Tag::default(),
        avp,
    };
    loop {
        state = match state {
            State::Await { field, tag } => {
                let avp = engine.receive_avp(field_timeout).await?;
                State::Decode { field, tag, avp }
            }
            State::Done(event) => {
                match &event {
                    InventoryEvent::Tag(tag) => debug!(id = %tag.id_hex(), "tag received"),
                    InventoryEvent::Finished(code) => debug!(%code, "inventory stream finished"),
                    InventoryEvent::Quiet => {}
                }
                return Ok(event);
            }
            other => advance(other, session)?,
        };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::tests::raw_avp;
    use crate::inventory::tests::record;
    use crate::inventory::InventoryFlags;
    use rfidlib_core::types::Protocol;
    use rfidlib_test_harness::MockTransport;

    const SHORT: Duration = Duration::from_millis(10);
    const LONG: Duration = Duration::from_millis(50);

    fn streaming(flags: InventoryFlags) -> InventorySession {
        InventorySession::from_flags(flags | InventoryFlags::FRAMED | InventoryFlags::CONTINUOUS)
            .unwrap()
    }

    fn engine_with(bytes: &[u8]) -> Engine {
        let mut mock = MockTransport::new();
        mock.push_incoming(bytes);
        Engine::new(Box::new(mock), 0, LONG)
    }

    #[tokio::test]
    async fn full_record_then_quiet() {
        let session = streaming(InventoryFlags::RSSI);
        let mut engine = engine_with(&record(&session, &[0x30; 12], &[]));

        let event = next_event(&mut engine, &session, SHORT, LONG).await.unwrap();
        let InventoryEvent::Tag(tag) = event else {
            panic!("expected a tag, got {event:?}");
        };
        assert_eq!(tag.id, vec![0x30; 12]);
        assert_eq!(tag.length, 12);
        assert_eq!(tag.logical_source, "Source_0");
        assert_eq!(tag.read_point, "Ant0");
        assert_eq!(tag.timestamp, (1_700_000_000, 42));
        assert_eq!(tag.protocol, Protocol::EpcC1G2);
        assert_eq!(tag.rssi, -60);

        let event = next_event(&mut engine, &session, SHORT, LONG).await.unwrap();
        assert_eq!(event, InventoryEvent::Quiet);
    }

    #[tokio::test]
    async fn compact_record_takes_length_from_framing() {
        let session = streaming(InventoryFlags::COMPACT | InventoryFlags::PC);
        let mut engine = engine_with(&record(&session, &[0xE2; 10], &[]));

        let event = next_event(&mut engine, &session, SHORT, LONG).await.unwrap();
        let InventoryEvent::Tag(tag) = event else {
            panic!("expected a tag, got {event:?}");
        };
        assert_eq!(tag.length, 10);
        assert_eq!(tag.pc, [0x30, 0x00]);
        assert!(tag.read_point.is_empty());
    }

    #[tokio::test]
    async fn tid_xpc_and_pc_are_collected() {
        let session =
            streaming(InventoryFlags::TID | InventoryFlags::XPC | InventoryFlags::PC);
        let mut engine = engine_with(&record(&session, &[0x01; 12], &[0xE2, 0x80, 0x11, 0x00]));

        let event = next_event(&mut engine, &session, SHORT, LONG).await.unwrap();
        let InventoryEvent::Tag(tag) = event else {
            panic!("expected a tag, got {event:?}");
        };
        assert_eq!(tag.tid_length, 4);
        assert_eq!(tag.tid, vec![0xE2, 0x80, 0x11, 0x00]);
        assert_eq!(tag.xpc, [1, 2, 3, 4]);
        assert_eq!(tag.pc, [0x30, 0x00]);
    }

    #[tokio::test]
    async fn consecutive_records_are_returned_one_per_call() {
        let session = streaming(InventoryFlags::COMPACT);
        let mut bytes = record(&session, &[0x01; 12], &[]);
        bytes.extend(record(&session, &[0x02; 12], &[]));
        bytes.extend(raw_avp(attr::RESULT_CODE, AvpValue::U16(0)));
        let mut engine = engine_with(&bytes);

        for expected in [0x01, 0x02] {
            match next_event(&mut engine, &session, SHORT, LONG).await.unwrap() {
                InventoryEvent::Tag(tag) => assert_eq!(tag.id, vec![expected; 12]),
                other => panic!("expected a tag, got {other:?}"),
            }
        }
        assert_eq!(
            next_event(&mut engine, &session, SHORT, LONG).await.unwrap(),
            InventoryEvent::Finished(ResultCode::OK)
        );
    }

    #[tokio::test]
    async fn result_code_ends_stream() {
        let session = streaming(InventoryFlags::NONE);
        let mut engine = engine_with(&raw_avp(attr::RESULT_CODE, AvpValue::U16(202)));

        let event = next_event(&mut engine, &session, SHORT, LONG).await.unwrap();
        assert_eq!(event, InventoryEvent::Finished(ResultCode::TAG_NOT_PRESENT));
    }

    #[tokio::test]
    async fn mid_record_timeout_is_an_error() {
        let session = streaming(InventoryFlags::NONE);
        let full = record(&session, &[0x01; 12], &[]);
        // source, read point and timestamp only
        let cut = full.len() - 8 - 8 - 18;
        let mut engine = engine_with(&full[..cut]);

        let err = next_event(&mut engine, &session, SHORT, LONG)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Timeout));
        assert!(err.is_communication());
    }

    #[tokio::test]
    async fn interrupted_record_reports_result_code() {
        let session = streaming(InventoryFlags::RSSI);
        let full = record(&session, &[0x01; 12], &[]);
        let mut bytes = full[..full.len() - 8].to_vec();
        bytes.extend(raw_avp(attr::RESULT_CODE, AvpValue::U16(0)));
        let mut engine = engine_with(&bytes);

        let event = next_event(&mut engine, &session, SHORT, LONG).await.unwrap();
        assert_eq!(event, InventoryEvent::Finished(ResultCode::OK));
    }

    #[tokio::test]
    async fn oversized_id_length_is_rejected() {
        let session = streaming(InventoryFlags::NONE);
        let mut bytes = Vec::new();
        bytes.extend(raw_avp(attr::SOURCE_NAME, AvpValue::Text("Source_0".into())));
        bytes.extend(raw_avp(attr::READPOINT_NAME, AvpValue::Text("Ant1".into())));
        bytes.extend(raw_avp(attr::TIMESTAMP, AvpValue::Timestamp(1, 2)));
        bytes.extend(raw_avp(attr::TAGTYPE, AvpValue::U16(3)));
        bytes.extend(raw_avp(attr::TAGIDLEN, AvpValue::U16(80)));
        let mut engine = engine_with(&bytes);

        let err = next_event(&mut engine, &session, SHORT, LONG)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn unexpected_first_avp_is_protocol_error() {
        let session = streaming(InventoryFlags::NONE);
        let mut engine = engine_with(&raw_avp(attr::POWER, AvpValue::U32(100)));

        let err = next_event(&mut engine, &session, SHORT, LONG)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn oversized_streamed_avp_is_protocol_error() {
        let session = streaming(InventoryFlags::NONE);
        // reserved 0, length 200, type TAGID
        let mut engine = engine_with(&[0x00, 0x00, 0x00, 0xC8, 0x00, 0x11]);

        let err = next_event(&mut engine, &session, SHORT, LONG)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }
}

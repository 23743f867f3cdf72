//! Framed inventory against a simulated reader.
//!
//! Demonstrates building a [`CaenReader`](rfidlib::caen::CaenReader),
//! reading the firmware release, then running a framed, continuous
//! inventory: tags are streamed one per call until the inventory is
//! aborted and the reader reports its final status.
//!
//! The reader here is a scripted `MockTransport`, so the example runs
//! without hardware. Swap in your own [`Transport`] to talk to a real
//! device.
//!
//! # Usage
//!
//! ```sh
//! RUST_LOG=rfidlib_caen=debug cargo run -p rfidlib --example framed_inventory
//! ```

use std::time::Duration;

use rfidlib::caen::avp::{self, AvpValue};
use rfidlib::caen::buffer::FrameBuffer;
use rfidlib::caen::codec;
use rfidlib::caen::engine::build_request;
use rfidlib::caen::protocol::{attr, cmd, HEADER_LEN, REPLY_VERSION, VENDOR_ID};
use rfidlib::caen::{CaenReaderBuilder, InventoryEvent, InventoryFlags};
use rfidlib::Transport;
use rfidlib_test_harness::MockTransport;
use tracing_subscriber::EnvFilter;

/// Encode one bare AVP.
fn avp_bytes(avp_type: u16, value: AvpValue) -> Vec<u8> {
    let mut buf = FrameBuffer::with_size(avp::encoded_len(&value));
    avp::encode(&mut buf, avp_type, &value);
    buf.written().to_vec()
}

/// Encode a reply frame the way the reader sends it.
fn reply_frame(command_id: u16, avps: &[(u16, AvpValue)]) -> Vec<u8> {
    let body: Vec<u8> = avps
        .iter()
        .flat_map(|(t, v)| avp_bytes(*t, v.clone()))
        .collect();
    let mut frame = vec![0u8; HEADER_LEN];
    codec::put_u16(&mut frame[0..], REPLY_VERSION);
    codec::put_u16(&mut frame[2..], command_id);
    codec::put_u32(&mut frame[4..], VENDOR_ID);
    codec::put_u16(&mut frame[8..], (HEADER_LEN + body.len()) as u16);
    frame.extend(body);
    frame
}

/// A reader that reports its firmware and streams two compact tags.
fn simulated_reader(flags: InventoryFlags) -> anyhow::Result<MockTransport> {
    let mut mock = MockTransport::new();

    mock.expect(
        build_request(1, cmd::GETFWRELEASE, &[])?.written(),
        &reply_frame(
            1,
            &[
                (attr::COMMAND, AvpValue::U16(cmd::GETFWRELEASE)),
                (attr::GETFWRELEASE, AvpValue::Text("3.1.0".into())),
                (attr::RESULT_CODE, AvpValue::U16(0)),
            ],
        ),
    );

    let start = build_request(
        2,
        cmd::INVENTORY,
        &[
            (attr::SOURCE_NAME, AvpValue::Text("Source_0".into())),
            (attr::BITMASK, AvpValue::U16(flags.bits())),
        ],
    )?;
    let mut stream = reply_frame(2, &[(attr::COMMAND, AvpValue::U16(cmd::INVENTORY))]);
    for (epc, rssi) in [([0xE2u8, 0x00, 0x68, 0x10], -52i16), ([0xE2, 0x00, 0x68, 0x11], -61)] {
        let mut id = vec![0x30, 0x08, 0x33, 0xB2, 0xDD, 0xD9, 0x01, 0x40];
        id.extend(epc);
        stream.extend(avp_bytes(attr::TAGID, AvpValue::Bytes(id)));
        stream.extend(avp_bytes(attr::RSSI, AvpValue::U16(rssi as u16)));
    }
    mock.expect(start.written(), &stream);

    mock.expect(&[0xAB], &avp_bytes(attr::RESULT_CODE, AvpValue::U16(0)));
    Ok(mock)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let flags = InventoryFlags::FRAMED
        | InventoryFlags::CONTINUOUS
        | InventoryFlags::COMPACT
        | InventoryFlags::RSSI;
    let transport: Box<dyn Transport> = Box::new(simulated_reader(flags)?);

    let mut reader = CaenReaderBuilder::new()
        .first_field_timeout(Duration::from_millis(100))
        .build_with_transport(transport)
        .await?;

    println!("Firmware: {}", reader.get_firmware_release().await?);

    reader.start_framed_inventory("Source_0", None, flags).await?;
    println!("Inventory started on Source_0\n");

    let mut seen = 0;
    loop {
        match reader.get_framed_tag().await? {
            InventoryEvent::Tag(tag) => {
                seen += 1;
                println!("{:>2}. {}  rssi {}", seen, tag.id_hex(), tag.rssi);
                if seen == 2 {
                    println!("\nAborting inventory...");
                    reader.abort_inventory().await?;
                }
            }
            InventoryEvent::Quiet => println!("(no tags)"),
            InventoryEvent::Finished(code) => {
                println!("Inventory finished: {}", code);
                break;
            }
        }
    }

    reader.disconnect().await?;
    Ok(())
}

//! CaenReader -- host-side handle for one CAEN RFID reader.
//!
//! Every operation is one transaction through the [`Engine`], described by
//! a row of the [`commands`] table. The reader also carries the inventory
//! flags of the last framed inventory so that
//! [`get_framed_tag`](CaenReader::get_framed_tag) knows which optional
//! fields each streamed record holds.
//!
//! All methods take `&mut self`: a reader runs one transaction at a time.
//! Share it across tasks behind a `tokio::sync::Mutex`.

use std::time::Duration;

use tracing::{debug, warn};

use rfidlib_core::error::{Error, Result};
use rfidlib_core::types::*;

use crate::avp::AvpValue;
use crate::commands::{self, CommandSpec};
use crate::engine::Engine;
use crate::framed::{self, InventoryEvent};
use crate::inventory::{self, InventoryFlags, InventoryReport, InventorySession, TagMask};

/// A connected CAEN RFID reader.
///
/// Constructed via [`CaenReaderBuilder`](crate::builder::CaenReaderBuilder).
pub struct CaenReader {
    engine: Engine,
    session: Option<InventorySession>,
    first_field_timeout: Duration,
    field_timeout: Duration,
}

/// Optional access password: zero means "not sent".
fn password(pwd: u32) -> Option<AvpValue> {
    (pwd != 0).then_some(AvpValue::U32(pwd))
}

fn text(s: &str) -> Option<AvpValue> {
    Some(AvpValue::Text(s.to_string()))
}

/// Source, ID length and ID fields identifying `tag`.
fn tag_args(tag: &Tag) -> [Option<AvpValue>; 3] {
    [
        text(&tag.logical_source),
        Some(AvpValue::U16(tag.id.len() as u16)),
        Some(AvpValue::Bytes(tag.id.clone())),
    ]
}

fn unexpected(spec: &CommandSpec, value: &AvpValue) -> Error {
    Error::Protocol(format!("{} reply carries {value:?}", spec.name))
}

impl CaenReader {
    pub(crate) fn new(engine: Engine, first_field_timeout: Duration, field_timeout: Duration) -> Self {
        CaenReader {
            engine,
            session: None,
            first_field_timeout,
            field_timeout,
        }
    }

    /// Antenna names the reader exposes.
    pub fn read_points(&self) -> &'static [&'static str] {
        &READ_POINTS
    }

    /// Logical source names the reader exposes.
    pub fn source_names(&self) -> &'static [&'static str] {
        &SOURCE_NAMES
    }

    /// The command id of the most recent request.
    pub fn command_id(&self) -> u16 {
        self.engine.command_id()
    }

    pub fn is_connected(&self) -> bool {
        self.engine.is_connected()
    }

    /// Flags of the framed inventory in progress, if one was started.
    pub fn inventory_session(&self) -> Option<&InventorySession> {
        self.session.as_ref()
    }

    /// Close the underlying transport.
    pub async fn disconnect(&mut self) -> Result<()> {
        debug!("disconnecting reader");
        self.engine.close().await
    }

    // ---------------------------------------------------------------
    // Table helpers
    // ---------------------------------------------------------------

    async fn set(&mut self, spec: &CommandSpec, args: &[Option<AvpValue>]) -> Result<()> {
        commands::execute(&mut self.engine, spec, args).await?;
        Ok(())
    }

    async fn query(&mut self, spec: &CommandSpec, args: &[Option<AvpValue>]) -> Result<AvpValue> {
        let values = commands::execute(&mut self.engine, spec, args).await?;
        commands::required(spec, values)
    }

    async fn query_u16(&mut self, spec: &CommandSpec, args: &[Option<AvpValue>]) -> Result<u16> {
        let value = self.query(spec, args).await?;
        value.as_u16().ok_or_else(|| unexpected(spec, &value))
    }

    async fn query_u32(&mut self, spec: &CommandSpec, args: &[Option<AvpValue>]) -> Result<u32> {
        let value = self.query(spec, args).await?;
        value.as_u32().ok_or_else(|| unexpected(spec, &value))
    }

    async fn query_text(&mut self, spec: &CommandSpec) -> Result<String> {
        let value = self.query(spec, &[]).await?;
        match value {
            AvpValue::Text(s) => Ok(s),
            other => Err(unexpected(spec, &other)),
        }
    }

    async fn query_bytes(&mut self, spec: &CommandSpec, args: &[Option<AvpValue>]) -> Result<Vec<u8>> {
        let value = self.query(spec, args).await?;
        match value {
            AvpValue::Bytes(b) => Ok(b),
            other => Err(unexpected(spec, &other)),
        }
    }

    // ---------------------------------------------------------------
    // Reader information
    // ---------------------------------------------------------------

    pub async fn get_firmware_release(&mut self) -> Result<String> {
        debug!("reading firmware release");
        self.query_text(&commands::GET_FIRMWARE_RELEASE).await
    }

    /// Model and serial number.
    pub async fn get_reader_info(&mut self) -> Result<ReaderInfo> {
        debug!("reading reader info");
        let raw = self.query_text(&commands::GET_READER_INFO).await?;
        Ok(ReaderInfo::parse(&raw))
    }

    // ---------------------------------------------------------------
    // Air protocol and RF
    // ---------------------------------------------------------------

    pub async fn set_protocol(&mut self, protocol: Protocol) -> Result<()> {
        debug!(%protocol, "setting air protocol");
        self.set(&commands::SET_PROTOCOL, &[Some(AvpValue::U32(protocol.raw()))])
            .await
    }

    pub async fn get_protocol(&mut self) -> Result<Protocol> {
        let raw = self.query_u32(&commands::GET_PROTOCOL, &[]).await?;
        Ok(Protocol::from_raw(raw))
    }

    /// Set the RF output power in milliwatts.
    pub async fn set_power(&mut self, power_mw: u32) -> Result<()> {
        debug!(power_mw, "setting power");
        self.set(&commands::SET_POWER, &[Some(AvpValue::U32(power_mw))])
            .await
    }

    /// RF output power in milliwatts.
    pub async fn get_power(&mut self) -> Result<u32> {
        self.query_u32(&commands::GET_POWER, &[]).await
    }

    pub async fn set_bitrate(&mut self, bitrate: Bitrate) -> Result<()> {
        debug!(bitrate = bitrate.0, "setting link profile");
        self.set(&commands::SET_BITRATE, &[Some(AvpValue::U16(bitrate.0))])
            .await
    }

    pub async fn get_bitrate(&mut self) -> Result<Bitrate> {
        self.query_u16(&commands::GET_BITRATE, &[]).await.map(Bitrate)
    }

    /// Enable or disable frequency hopping.
    pub async fn set_fhss_mode(&mut self, enabled: bool) -> Result<()> {
        debug!(enabled, "setting frequency hopping");
        self.set(&commands::SET_FHSS_MODE, &[Some(AvpValue::U16(enabled.into()))])
            .await
    }

    pub async fn get_fhss_mode(&mut self) -> Result<bool> {
        Ok(self.query_u16(&commands::GET_FHSS_MODE, &[]).await? != 0)
    }

    pub async fn set_rf_channel(&mut self, channel: u16) -> Result<()> {
        debug!(channel, "setting RF channel");
        self.set(&commands::SET_RF_CHANNEL, &[Some(AvpValue::U16(channel))])
            .await
    }

    pub async fn get_rf_channel(&mut self) -> Result<u16> {
        self.query_u16(&commands::GET_RF_CHANNEL, &[]).await
    }

    pub async fn set_rf_regulation(&mut self, regulation: RfRegulation) -> Result<()> {
        debug!(regulation = regulation.0, "setting RF regulation");
        self.set(
            &commands::SET_RF_REGULATION,
            &[Some(AvpValue::U16(regulation.0))],
        )
        .await
    }

    pub async fn get_rf_regulation(&mut self) -> Result<RfRegulation> {
        self.query_u16(&commands::GET_RF_REGULATION, &[])
            .await
            .map(RfRegulation)
    }

    // ---------------------------------------------------------------
    // Read points and logical sources
    // ---------------------------------------------------------------

    /// Attach antenna `read_point` to logical `source`.
    pub async fn add_read_point(&mut self, source: &str, read_point: &str) -> Result<()> {
        debug!(source, read_point, "adding read point");
        self.set(&commands::ADD_READ_POINT, &[text(source), text(read_point)])
            .await
    }

    pub async fn remove_read_point(&mut self, source: &str, read_point: &str) -> Result<()> {
        debug!(source, read_point, "removing read point");
        self.set(&commands::REMOVE_READ_POINT, &[text(source), text(read_point)])
            .await
    }

    pub async fn is_read_point_present(&mut self, read_point: &str, source: &str) -> Result<bool> {
        let present = self
            .query_u16(
                &commands::IS_READ_POINT_PRESENT,
                &[text(read_point), text(source)],
            )
            .await?;
        Ok(present != 0)
    }

    pub async fn get_read_point_status(&mut self, read_point: &str) -> Result<ReadPointStatus> {
        let raw = self
            .query_u32(&commands::GET_READ_POINT_STATUS, &[text(read_point)])
            .await?;
        Ok(ReadPointStatus::from_raw(raw))
    }

    /// Run the reader's impedance matching on `read_point`.
    ///
    /// Returns the VSWR measured afterwards.
    pub async fn match_read_point_impedance(&mut self, read_point: &str) -> Result<f32> {
        debug!(read_point, "matching read point impedance");
        let spec = &commands::MATCH_READ_POINT_IMPEDANCE;
        let value = self
            .query(
                spec,
                &[
                    text(read_point),
                    Some(AvpValue::U32(RP_MATCH_RF_ALGORITHM)),
                    Some(AvpValue::U32(0)),
                ],
            )
            .await?;
        value.as_f32().ok_or_else(|| unexpected(spec, &value))
    }

    pub async fn set_source_configuration(
        &mut self,
        source: &str,
        parameter: SourceParameter,
        value: u32,
    ) -> Result<()> {
        debug!(source, ?parameter, value, "configuring logical source");
        self.set(
            &commands::SET_SOURCE_CONFIGURATION,
            &[
                text(source),
                Some(AvpValue::U32(parameter.raw())),
                Some(AvpValue::U32(value)),
            ],
        )
        .await
    }

    pub async fn get_source_configuration(
        &mut self,
        source: &str,
        parameter: SourceParameter,
    ) -> Result<u32> {
        self.query_u32(
            &commands::GET_SOURCE_CONFIGURATION,
            &[text(source), Some(AvpValue::U32(parameter.raw()))],
        )
        .await
    }

    // ---------------------------------------------------------------
    // Reader serial port and I/O lines
    // ---------------------------------------------------------------

    /// Reconfigure the reader's own RS-232 port.
    pub async fn set_rs232(&mut self, settings: SerialSettings) -> Result<()> {
        debug!(baud = settings.baud_rate, "setting reader serial port");
        self.set(
            &commands::SET_RS232,
            &[
                Some(AvpValue::U32(settings.baud_rate)),
                Some(AvpValue::U32(settings.data_bits)),
                Some(AvpValue::U32(settings.stop_bits)),
                Some(AvpValue::U32(settings.parity as u32)),
                Some(AvpValue::U32(settings.flow_control as u32)),
            ],
        )
        .await
    }

    /// Drive the digital output lines.
    pub async fn set_io(&mut self, value: u32) -> Result<()> {
        debug!(value, "setting I/O register");
        self.set(&commands::SET_IO, &[Some(AvpValue::U32(value))]).await
    }

    pub async fn get_io(&mut self) -> Result<u32> {
        self.query_u32(&commands::GET_IO, &[]).await
    }

    /// Set which I/O lines are outputs (bit set) or inputs.
    pub async fn set_io_direction(&mut self, direction: u32) -> Result<()> {
        debug!(direction, "setting I/O direction");
        self.set(&commands::SET_IO_DIRECTION, &[Some(AvpValue::U32(direction))])
            .await
    }

    pub async fn get_io_direction(&mut self) -> Result<u32> {
        self.query_u32(&commands::GET_IO_DIRECTION, &[]).await
    }

    // ---------------------------------------------------------------
    // EPC C1G2 tag access
    // ---------------------------------------------------------------

    /// Read `length` bytes from `bank` of `tag` starting at byte `address`.
    pub async fn read_tag_data(
        &mut self,
        tag: &Tag,
        bank: MemBank,
        address: u16,
        length: u16,
        access_password: u32,
    ) -> Result<Vec<u8>> {
        debug!(id = %tag.id_hex(), ?bank, address, length, "reading tag data");
        let [source, id_len, id] = tag_args(tag);
        self.query_bytes(
            &commands::READ_TAG_DATA,
            &[
                source,
                id_len,
                id,
                Some(AvpValue::U16(bank.raw())),
                Some(AvpValue::U16(address)),
                Some(AvpValue::U16(length)),
                password(access_password),
            ],
        )
        .await
    }

    /// Write `data` into `bank` of `tag` starting at byte `address`.
    pub async fn write_tag_data(
        &mut self,
        tag: &Tag,
        bank: MemBank,
        address: u16,
        data: &[u8],
        access_password: u32,
    ) -> Result<()> {
        debug!(id = %tag.id_hex(), ?bank, address, len = data.len(), "writing tag data");
        let [source, id_len, id] = tag_args(tag);
        self.set(
            &commands::WRITE_TAG_DATA,
            &[
                source,
                id_len,
                id,
                Some(AvpValue::U16(bank.raw())),
                Some(AvpValue::U16(address)),
                Some(AvpValue::U16(data.len() as u16)),
                Some(AvpValue::Bytes(data.to_vec())),
                password(access_password),
            ],
        )
        .await
    }

    /// Apply a C1G2 lock `payload` to `tag`.
    pub async fn lock_tag(&mut self, tag: &Tag, payload: u32, access_password: u32) -> Result<()> {
        debug!(id = %tag.id_hex(), payload, "locking tag");
        let [source, id_len, id] = tag_args(tag);
        self.set(
            &commands::LOCK_TAG,
            &[
                source,
                id_len,
                id,
                Some(AvpValue::U32(payload)),
                password(access_password),
            ],
        )
        .await
    }

    /// Permanently disable `tag`. The kill password is always sent.
    pub async fn kill_tag(&mut self, tag: &Tag, kill_password: u32) -> Result<()> {
        debug!(id = %tag.id_hex(), "killing tag");
        let [source, id_len, id] = tag_args(tag);
        self.set(
            &commands::KILL_TAG,
            &[source, id_len, id, Some(AvpValue::U32(kill_password))],
        )
        .await
    }

    /// Program `tag.id` as the new EPC, with numbering system bits `nsi`.
    pub async fn program_id(&mut self, tag: &Tag, nsi: u16, access_password: u32) -> Result<()> {
        debug!(id = %tag.id_hex(), nsi, "programming tag ID");
        let [source, id_len, id] = tag_args(tag);
        self.set(
            &commands::PROGRAM_ID,
            &[
                source,
                id_len,
                id,
                Some(AvpValue::U16(nsi)),
                password(access_password),
            ],
        )
        .await
    }

    /// Send a vendor custom C1G2 command and return the tag's answer.
    ///
    /// `tag` singles out one tag; `None` addresses whichever answers.
    /// `tx_data` is omitted from the request when empty.
    pub async fn custom_command(
        &mut self,
        tag: Option<&Tag>,
        sub_command: u8,
        tx_data: &[u8],
        rx_length: u16,
        access_password: u32,
    ) -> Result<Vec<u8>> {
        debug!(sub_command, tx_len = tx_data.len(), rx_length, "custom tag command");
        let [source, id_len, id] = match tag {
            Some(tag) => tag_args(tag),
            None => [None, None, None],
        };
        let (tx_len, tx_value) = if tx_data.is_empty() {
            (None, None)
        } else {
            (
                Some(AvpValue::U16(tx_data.len() as u16)),
                Some(AvpValue::Bytes(tx_data.to_vec())),
            )
        };
        self.query_bytes(
            &commands::CUSTOM_COMMAND,
            &[
                source,
                id_len,
                id,
                Some(AvpValue::Bytes(vec![sub_command])),
                tx_len,
                tx_value,
                Some(AvpValue::U16(rx_length)),
                password(access_password),
            ],
        )
        .await
    }

    // ---------------------------------------------------------------
    // Inventory
    // ---------------------------------------------------------------

    /// Run one inventory round on `source`.
    ///
    /// The report carries the tags seen, most recent first, together with
    /// the reader's status. A non-zero status does not discard tags that
    /// were decoded before it; use [`InventoryReport::into_tags`] to treat
    /// it as an error.
    ///
    /// Framed inventories stream their results; start those with
    /// [`start_framed_inventory`](Self::start_framed_inventory).
    pub async fn inventory(
        &mut self,
        source: &str,
        mask: Option<&TagMask>,
        flags: InventoryFlags,
    ) -> Result<InventoryReport> {
        let session = InventorySession::from_flags(flags)?;
        if session.framed {
            return Err(Error::InvalidParameter(
                "framed inventory must be started with start_framed_inventory".into(),
            ));
        }
        debug!(source, flags = flags.bits(), "running inventory");
        let args = inventory::request_args(source, mask, flags)?;
        let mut reply = commands::send(&mut self.engine, &commands::INVENTORY, &args).await?;
        reply.expect_echo()?;
        let tags = inventory::decode_tags(reply.buffer_mut(), &session)?;
        let status = reply.result_code()?;
        if status.is_ok() {
            debug!(count = tags.len(), "inventory complete");
        } else {
            warn!(count = tags.len(), %status, "inventory ended with device error");
        }
        Ok(InventoryReport { tags, status })
    }

    /// Start a framed, continuous inventory on `source`.
    ///
    /// Returns once the reader acknowledges; tags then arrive through
    /// [`get_framed_tag`](Self::get_framed_tag) until the stream finishes.
    pub async fn start_framed_inventory(
        &mut self,
        source: &str,
        mask: Option<&TagMask>,
        flags: InventoryFlags,
    ) -> Result<()> {
        let session = InventorySession::from_flags(flags)?;
        if !session.framed {
            return Err(Error::InvalidParameter(
                "framed inventory needs the FRAMED and CONTINUOUS flags".into(),
            ));
        }
        debug!(source, flags = flags.bits(), "starting framed inventory");
        let args = inventory::request_args(source, mask, flags)?;
        let mut reply = commands::send(&mut self.engine, &commands::INVENTORY, &args).await?;
        reply.expect_echo()?;
        self.session = Some(session);
        Ok(())
    }

    /// Receive the next event of a running framed inventory.
    ///
    /// Call repeatedly until [`InventoryEvent::Finished`] arrives.
    /// [`InventoryEvent::Quiet`] means no tag arrived within the
    /// first-field timeout and the call may simply be repeated.
    pub async fn get_framed_tag(&mut self) -> Result<InventoryEvent> {
        let session = self.session.ok_or_else(|| {
            Error::InvalidParameter("no framed inventory has been started".into())
        })?;
        framed::next_event(
            &mut self.engine,
            &session,
            self.first_field_timeout,
            self.field_timeout,
        )
        .await
    }

    /// Ask the reader to stop a framed inventory.
    ///
    /// The stream still has to be drained with
    /// [`get_framed_tag`](Self::get_framed_tag) up to its result code.
    pub async fn abort_inventory(&mut self) -> Result<()> {
        self.engine.send_abort().await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::CaenReaderBuilder;
    use crate::engine::tests::{raw_avp, reply, reply_with_body, request};
    use crate::inventory::tests::record;
    use crate::protocol::{attr, cmd};
    use rfidlib_core::status::ResultCode;
    use rfidlib_test_harness::MockTransport;

    async fn make_test_reader(mock: MockTransport) -> CaenReader {
        CaenReaderBuilder::new()
            .command_timeout(Duration::from_millis(50))
            .first_field_timeout(Duration::from_millis(10))
            .field_timeout(Duration::from_millis(50))
            .build_with_transport(Box::new(mock))
            .await
            .unwrap()
    }

    fn ok(command: u16) -> [(u16, AvpValue); 2] {
        [
            (attr::COMMAND, AvpValue::U16(command)),
            (attr::RESULT_CODE, AvpValue::U16(0)),
        ]
    }

    /// Reply carrying one value between the echo and the result code.
    fn ok_with(command: u16, avp_type: u16, value: AvpValue) -> Vec<(u16, AvpValue)> {
        vec![
            (attr::COMMAND, AvpValue::U16(command)),
            (avp_type, value),
            (attr::RESULT_CODE, AvpValue::U16(0)),
        ]
    }

    fn test_tag() -> Tag {
        Tag {
            id: vec![0xE2, 0x00, 0x34, 0x12, 0x01, 0x23, 0x45, 0x67, 0x89, 0xAB, 0xCD, 0xEF],
            length: 12,
            logical_source: "Source_0".into(),
            ..Tag::default()
        }
    }

    fn tag_fields(tag: &Tag) -> Vec<(u16, AvpValue)> {
        vec![
            (attr::SOURCE_NAME, AvpValue::Text(tag.logical_source.clone())),
            (attr::TAGIDLEN, AvpValue::U16(tag.id.len() as u16)),
            (attr::TAGID, AvpValue::Bytes(tag.id.clone())),
        ]
    }

    // -----------------------------------------------------------------
    // Reader information
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn test_get_firmware_release() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(1, cmd::GETFWRELEASE, &[]),
            &reply(
                1,
                &ok_with(
                    cmd::GETFWRELEASE,
                    attr::GETFWRELEASE,
                    AvpValue::Text("1.2.3".into()),
                ),
            ),
        );

        let mut reader = make_test_reader(mock).await;
        assert_eq!(reader.get_firmware_release().await.unwrap(), "1.2.3");
        assert_eq!(reader.command_id(), 1);
    }

    #[tokio::test]
    async fn test_get_reader_info() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(1, cmd::GETRDRINFO, &[]),
            &reply(
                1,
                &ok_with(
                    cmd::GETRDRINFO,
                    attr::READERINFO,
                    AvpValue::Text("R1240I 000123".into()),
                ),
            ),
        );

        let mut reader = make_test_reader(mock).await;
        let info = reader.get_reader_info().await.unwrap();
        assert_eq!(info.model, "R1240I");
        assert_eq!(info.serial, "000123");
    }

    // -----------------------------------------------------------------
    // Power and RF
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn test_set_power() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(1, cmd::SETPOWER, &[(attr::POWER, AvpValue::U32(500))]),
            &reply(1, &ok(cmd::SETPOWER)),
        );

        let mut reader = make_test_reader(mock).await;
        reader.set_power(500).await.unwrap();
    }

    #[tokio::test]
    async fn test_set_power_device_error() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(1, cmd::SETPOWER, &[(attr::POWER, AvpValue::U32(5000))]),
            &reply(
                1,
                &[
                    (attr::COMMAND, AvpValue::U16(cmd::SETPOWER)),
                    (attr::RESULT_CODE, AvpValue::U16(183)),
                ],
            ),
        );

        let mut reader = make_test_reader(mock).await;
        let err = reader.set_power(5000).await.unwrap_err();
        assert_eq!(err.result_code(), Some(ResultCode::POWER_OUT_OF_RANGE));
    }

    #[tokio::test]
    async fn test_get_power() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(1, cmd::GETPOWER, &[]),
            &reply(1, &ok_with(cmd::GETPOWER, attr::POWER_GET, AvpValue::U32(316))),
        );

        let mut reader = make_test_reader(mock).await;
        assert_eq!(reader.get_power().await.unwrap(), 316);
    }

    #[tokio::test]
    async fn test_get_power_missing_value() {
        let mut mock = MockTransport::new();
        mock.expect(&request(1, cmd::GETPOWER, &[]), &reply(1, &ok(cmd::GETPOWER)));

        let mut reader = make_test_reader(mock).await;
        let err = reader.get_power().await.unwrap_err();
        assert!(matches!(err, Error::Protocol(_)));
    }

    #[tokio::test]
    async fn test_protocol_set_and_get() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(1, cmd::SETPROTOCOL, &[(attr::PROTOCOL_NAME, AvpValue::U32(3))]),
            &reply(1, &ok(cmd::SETPROTOCOL)),
        );
        mock.expect(
            &request(2, cmd::GETPROTOCOL, &[]),
            &reply(
                2,
                &ok_with(cmd::GETPROTOCOL, attr::PROTOCOL_NAME, AvpValue::U32(3)),
            ),
        );

        let mut reader = make_test_reader(mock).await;
        reader.set_protocol(Protocol::EpcC1G2).await.unwrap();
        assert_eq!(reader.get_protocol().await.unwrap(), Protocol::EpcC1G2);
        assert_eq!(reader.command_id(), 2);
    }

    #[tokio::test]
    async fn test_fhss_and_regulation() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(1, cmd::SETFHMODE, &[(attr::BOOLEAN, AvpValue::U16(1))]),
            &reply(1, &ok(cmd::SETFHMODE)),
        );
        mock.expect(
            &request(2, cmd::GETRFREGULATION, &[]),
            &reply(
                2,
                &ok_with(cmd::GETRFREGULATION, attr::RFREGULATION, AvpValue::U16(2)),
            ),
        );

        let mut reader = make_test_reader(mock).await;
        reader.set_fhss_mode(true).await.unwrap();
        assert_eq!(
            reader.get_rf_regulation().await.unwrap(),
            RfRegulation::FCC_US
        );
    }

    #[tokio::test]
    async fn test_get_bitrate() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(1, cmd::GETRFLINKPROFILE, &[]),
            &reply(
                1,
                &ok_with(cmd::GETRFLINKPROFILE, attr::MODULATION, AvpValue::U16(3)),
            ),
        );

        let mut reader = make_test_reader(mock).await;
        assert_eq!(reader.get_bitrate().await.unwrap(), Bitrate::TX40_RX160);
    }

    // -----------------------------------------------------------------
    // Read points and sources
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn test_add_read_point() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(
                1,
                cmd::ADDREADPOINT,
                &[
                    (attr::SOURCE_NAME, AvpValue::Text("Source_0".into())),
                    (attr::READPOINT_NAME, AvpValue::Text("Ant1".into())),
                ],
            ),
            &reply(1, &ok(cmd::ADDREADPOINT)),
        );

        let mut reader = make_test_reader(mock).await;
        reader.add_read_point("Source_0", "Ant1").await.unwrap();
    }

    #[tokio::test]
    async fn test_is_read_point_present() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(
                1,
                cmd::CHECKRPINSRC,
                &[
                    (attr::READPOINT_NAME, AvpValue::Text("Ant2".into())),
                    (attr::SOURCE_NAME, AvpValue::Text("Source_1".into())),
                ],
            ),
            &reply(1, &ok_with(cmd::CHECKRPINSRC, attr::BOOLEAN, AvpValue::U16(1))),
        );

        let mut reader = make_test_reader(mock).await;
        assert!(reader.is_read_point_present("Ant2", "Source_1").await.unwrap());
    }

    #[tokio::test]
    async fn test_get_read_point_status() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(
                1,
                cmd::CHECKANTENNA,
                &[(attr::READPOINT_NAME, AvpValue::Text("Ant0".into()))],
            ),
            &reply(
                1,
                &ok_with(cmd::CHECKANTENNA, attr::READPOINT_STATUS, AvpValue::U32(1)),
            ),
        );

        let mut reader = make_test_reader(mock).await;
        assert_eq!(
            reader.get_read_point_status("Ant0").await.unwrap(),
            ReadPointStatus::Poor
        );
    }

    #[tokio::test]
    async fn test_match_read_point_impedance() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(
                1,
                cmd::MATCHRFIMPEDANCE,
                &[
                    (attr::READPOINT_NAME, AvpValue::Text("Ant0".into())),
                    (attr::CONFIGPARAMETER, AvpValue::U32(14)),
                    (attr::CONFIGVALUE, AvpValue::U32(0)),
                ],
            ),
            &reply(
                1,
                &ok_with(cmd::MATCHRFIMPEDANCE, attr::POWER_VSWR, AvpValue::F32(1.25)),
            ),
        );

        let mut reader = make_test_reader(mock).await;
        assert_eq!(reader.match_read_point_impedance("Ant0").await.unwrap(), 1.25);
    }

    #[tokio::test]
    async fn test_get_source_configuration() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(
                1,
                cmd::GETSRCCONF,
                &[
                    (attr::SOURCE_NAME, AvpValue::Text("Source_0".into())),
                    (attr::CONFIGPARAMETER, AvpValue::U32(3)),
                ],
            ),
            &reply(1, &ok_with(cmd::GETSRCCONF, attr::CONFIGVALUE, AvpValue::U32(4))),
        );

        let mut reader = make_test_reader(mock).await;
        let q = reader
            .get_source_configuration("Source_0", SourceParameter::G2QValue)
            .await
            .unwrap();
        assert_eq!(q, 4);
    }

    #[tokio::test]
    async fn test_source_name_too_long() {
        let mock = MockTransport::new();
        let mut reader = make_test_reader(mock).await;
        let err = reader
            .add_read_point("a_logical_source_name_that_is_far_too_long", "Ant0")
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
        assert_eq!(reader.command_id(), 0);
    }

    #[test]
    fn static_name_tables() {
        let names = (READ_POINTS.len(), SOURCE_NAMES.len());
        assert_eq!(names, (4, 4));
    }

    // -----------------------------------------------------------------
    // Serial port and I/O
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn test_set_rs232() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(
                1,
                cmd::SETRS232,
                &[
                    (attr::BAUDRATE, AvpValue::U32(115_200)),
                    (attr::DATABITS, AvpValue::U32(8)),
                    (attr::STOPBITS, AvpValue::U32(1)),
                    (attr::PARITY, AvpValue::U32(0)),
                    (attr::FLOWCTRL, AvpValue::U32(0)),
                ],
            ),
            &reply(1, &ok(cmd::SETRS232)),
        );

        let mut reader = make_test_reader(mock).await;
        reader.set_rs232(SerialSettings::default()).await.unwrap();
    }

    #[tokio::test]
    async fn test_io_register() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(1, cmd::SETIODIR, &[(attr::IOREGISTER, AvpValue::U32(0x0F))]),
            &reply(1, &ok(cmd::SETIODIR)),
        );
        mock.expect(
            &request(2, cmd::GETIO, &[]),
            &reply(2, &ok_with(cmd::GETIO, attr::IOREGISTER, AvpValue::U32(0x05))),
        );

        let mut reader = make_test_reader(mock).await;
        reader.set_io_direction(0x0F).await.unwrap();
        assert_eq!(reader.get_io().await.unwrap(), 0x05);
    }

    // -----------------------------------------------------------------
    // Tag access
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn test_read_tag_data_without_password() {
        let tag = test_tag();
        let mut fields = tag_fields(&tag);
        fields.extend([
            (attr::MEMBANK, AvpValue::U16(2)),
            (attr::TAGADDRESS, AvpValue::U16(0)),
            (attr::LENGTH, AvpValue::U16(4)),
        ]);
        let mut mock = MockTransport::new();
        mock.expect(
            &request(1, cmd::G2READ, &fields),
            &reply(
                1,
                &ok_with(
                    cmd::G2READ,
                    attr::TAG_VALUE,
                    AvpValue::Bytes(vec![0xE2, 0x80, 0x11, 0x05]),
                ),
            ),
        );

        let mut reader = make_test_reader(mock).await;
        let data = reader
            .read_tag_data(&tag, MemBank::Tid, 0, 4, 0)
            .await
            .unwrap();
        assert_eq!(data, vec![0xE2, 0x80, 0x11, 0x05]);
    }

    #[tokio::test]
    async fn test_write_tag_data_with_password() {
        let tag = test_tag();
        let mut fields = tag_fields(&tag);
        fields.extend([
            (attr::MEMBANK, AvpValue::U16(3)),
            (attr::TAGADDRESS, AvpValue::U16(8)),
            (attr::LENGTH, AvpValue::U16(2)),
            (attr::TAG_VALUE, AvpValue::Bytes(vec![0xBE, 0xEF])),
            (attr::G2PWD, AvpValue::U32(0x1234_5678)),
        ]);
        let mut mock = MockTransport::new();
        mock.expect(&request(1, cmd::G2WRITE, &fields), &reply(1, &ok(cmd::G2WRITE)));

        let mut reader = make_test_reader(mock).await;
        reader
            .write_tag_data(&tag, MemBank::User, 8, &[0xBE, 0xEF], 0x1234_5678)
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_kill_tag_always_sends_password() {
        let tag = test_tag();
        let mut fields = tag_fields(&tag);
        fields.push((attr::G2PWD, AvpValue::U32(0)));
        let mut mock = MockTransport::new();
        mock.expect(
            &request(1, cmd::G2KILL, &fields),
            &reply(
                1,
                &[
                    (attr::COMMAND, AvpValue::U16(cmd::G2KILL)),
                    (attr::RESULT_CODE, AvpValue::U16(202)),
                ],
            ),
        );

        let mut reader = make_test_reader(mock).await;
        let err = reader.kill_tag(&tag, 0).await.unwrap_err();
        assert!(matches!(err, Error::Device(ResultCode::TAG_NOT_PRESENT)));
    }

    #[tokio::test]
    async fn test_lock_and_program_id() {
        let tag = test_tag();
        let mut lock = tag_fields(&tag);
        lock.push((attr::PAYLOAD, AvpValue::U32(0x000C_0008)));
        let mut program = tag_fields(&tag);
        program.push((attr::G2NSI, AvpValue::U16(0x3000)));
        let mut mock = MockTransport::new();
        mock.expect(&request(1, cmd::G2LOCK, &lock), &reply(1, &ok(cmd::G2LOCK)));
        mock.expect(
            &request(2, cmd::G2PROGRAMID, &program),
            &reply(2, &ok(cmd::G2PROGRAMID)),
        );

        let mut reader = make_test_reader(mock).await;
        reader.lock_tag(&tag, 0x000C_0008, 0).await.unwrap();
        reader.program_id(&tag, 0x3000, 0).await.unwrap();
    }

    #[tokio::test]
    async fn test_custom_command_without_tag() {
        let mut mock = MockTransport::new();
        mock.expect(
            &request(
                1,
                cmd::G2CUSTOM,
                &[
                    (attr::SUBCMD, AvpValue::Bytes(vec![0x01])),
                    (attr::LENGTH, AvpValue::U16(2)),
                    (attr::TAG_VALUE, AvpValue::Bytes(vec![0xAA, 0x55])),
                    (attr::LENGTH, AvpValue::U16(4)),
                ],
            ),
            &reply(
                1,
                &ok_with(
                    cmd::G2CUSTOM,
                    attr::TAG_VALUE,
                    AvpValue::Bytes(vec![1, 2, 3, 4]),
                ),
            ),
        );

        let mut reader = make_test_reader(mock).await;
        let answer = reader
            .custom_command(None, 0x01, &[0xAA, 0x55], 4, 0)
            .await
            .unwrap();
        assert_eq!(answer, vec![1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_tag_id_too_long() {
        let mock = MockTransport::new();
        let mut reader = make_test_reader(mock).await;
        let tag = Tag {
            id: vec![0; 65],
            logical_source: "Source_0".into(),
            ..Tag::default()
        };
        let err = reader.kill_tag(&tag, 1).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    // -----------------------------------------------------------------
    // Inventory
    // -----------------------------------------------------------------

    #[tokio::test]
    async fn test_batch_inventory() {
        let session = InventorySession::from_flags(InventoryFlags::RSSI).unwrap();
        let mut body = raw_avp(attr::COMMAND, AvpValue::U16(cmd::INVENTORY));
        body.extend(record(&session, &[0x01; 12], &[]));
        body.extend(record(&session, &[0x02; 12], &[]));
        body.extend(raw_avp(attr::RESULT_CODE, AvpValue::U16(0)));

        let mut mock = MockTransport::new();
        mock.expect(
            &request(
                1,
                cmd::INVENTORY,
                &[
                    (attr::SOURCE_NAME, AvpValue::Text("Source_0".into())),
                    (attr::BITMASK, AvpValue::U16(0x0001)),
                ],
            ),
            &reply_with_body(1, &body),
        );

        let mut reader = make_test_reader(mock).await;
        let report = reader
            .inventory("Source_0", None, InventoryFlags::RSSI)
            .await
            .unwrap();
        assert!(report.is_ok());
        let tags = report.into_tags().unwrap();
        assert_eq!(tags.len(), 2);
        assert_eq!(tags[0].id, vec![0x02; 12]);
        assert_eq!(tags[1].id, vec![0x01; 12]);
        assert_eq!(tags[0].rssi, -60);
    }

    #[tokio::test]
    async fn test_batch_inventory_device_error_keeps_tags() {
        let session = InventorySession::from_flags(InventoryFlags::NONE).unwrap();
        let mut body = raw_avp(attr::COMMAND, AvpValue::U16(cmd::INVENTORY));
        body.extend(record(&session, &[0x0A; 12], &[]));
        body.extend(raw_avp(attr::RESULT_CODE, AvpValue::U16(102)));

        let mut mock = MockTransport::new();
        mock.expect(
            &request(
                1,
                cmd::INVENTORY,
                &[(attr::SOURCE_NAME, AvpValue::Text("Source_0".into()))],
            ),
            &reply_with_body(1, &body),
        );

        let mut reader = make_test_reader(mock).await;
        let report = reader
            .inventory("Source_0", None, InventoryFlags::NONE)
            .await
            .unwrap();
        assert_eq!(report.status, ResultCode::UNKNOWN);
        assert_eq!(report.tags.len(), 1);
        assert_eq!(report.tags[0].id, vec![0x0A; 12]);
        assert!(matches!(
            report.into_tags(),
            Err(Error::Device(ResultCode::UNKNOWN))
        ));
    }

    #[tokio::test]
    async fn test_batch_inventory_with_mask() {
        let mask = TagMask {
            bank: MemBank::Epc,
            bit_address: 32,
            bit_length: 16,
            data: vec![0xE2, 0x00],
        };
        let mut mock = MockTransport::new();
        mock.expect(
            &request(
                1,
                cmd::INVENTORY,
                &[
                    (attr::SOURCE_NAME, AvpValue::Text("Source_0".into())),
                    (attr::MEMBANK, AvpValue::U16(1)),
                    (attr::LENGTH, AvpValue::U16(16)),
                    (attr::TAGID, AvpValue::Bytes(vec![0xE2, 0x00])),
                    (attr::TAGADDRESS, AvpValue::U16(32)),
                ],
            ),
            &reply(1, &ok(cmd::INVENTORY)),
        );

        let mut reader = make_test_reader(mock).await;
        let report = reader
            .inventory("Source_0", Some(&mask), InventoryFlags::NONE)
            .await
            .unwrap();
        assert!(report.tags.is_empty());
        assert_eq!(report.status, ResultCode::OK);
    }

    #[tokio::test]
    async fn test_inventory_rejects_framed_flags() {
        let mock = MockTransport::new();
        let mut reader = make_test_reader(mock).await;
        let flags = InventoryFlags::FRAMED | InventoryFlags::CONTINUOUS;
        let err = reader.inventory("Source_0", None, flags).await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));

        let err = reader
            .start_framed_inventory("Source_0", None, InventoryFlags::RSSI)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_framed_tag_before_start() {
        let mock = MockTransport::new();
        let mut reader = make_test_reader(mock).await;
        let err = reader.get_framed_tag().await.unwrap_err();
        assert!(matches!(err, Error::InvalidParameter(_)));
    }

    #[tokio::test]
    async fn test_framed_inventory_session() {
        let flags = InventoryFlags::FRAMED | InventoryFlags::CONTINUOUS | InventoryFlags::COMPACT;
        let session = InventorySession::from_flags(flags).unwrap();

        // The start acknowledgement is followed directly by streamed records.
        let mut start = reply(1, &[(attr::COMMAND, AvpValue::U16(cmd::INVENTORY))]);
        start.extend(record(&session, &[0x0A; 12], &[]));

        let mut mock = MockTransport::new();
        mock.expect(
            &request(
                1,
                cmd::INVENTORY,
                &[
                    (attr::SOURCE_NAME, AvpValue::Text("Source_0".into())),
                    (attr::BITMASK, AvpValue::U16(flags.bits())),
                ],
            ),
            &start,
        );
        mock.expect(&[0xAB], &raw_avp(attr::RESULT_CODE, AvpValue::U16(0)));

        let mut reader = make_test_reader(mock).await;
        reader
            .start_framed_inventory("Source_0", None, flags)
            .await
            .unwrap();
        assert_eq!(reader.inventory_session(), Some(&session));

        match reader.get_framed_tag().await.unwrap() {
            InventoryEvent::Tag(tag) => {
                assert_eq!(tag.id, vec![0x0A; 12]);
                assert_eq!(tag.length, 12);
            }
            other => panic!("expected a tag, got {other:?}"),
        }
        assert_eq!(reader.get_framed_tag().await.unwrap(), InventoryEvent::Quiet);

        reader.abort_inventory().await.unwrap();
        assert_eq!(
            reader.get_framed_tag().await.unwrap(),
            InventoryEvent::Finished(ResultCode::OK)
        );
    }

    #[tokio::test]
    async fn test_disconnect() {
        let mock = MockTransport::new();
        let mut reader = make_test_reader(mock).await;
        assert!(reader.is_connected());
        reader.disconnect().await.unwrap();
        assert!(!reader.is_connected());
    }
}

//! Declarative command table.
//!
//! Each simple reader operation is one [`CommandSpec`]: the command code,
//! the AVPs that go into the request, and the AVPs to pull from the reply
//! between the command echo and the result code. [`execute`] drives any
//! row through the [`Engine`].
//!
//! Arguments are positional: `args[i]` fills `request[i]`. A `None`
//! argument omits an optional field and is an error for a mandatory one.

use rfidlib_core::error::{Error, Result};

use crate::avp::AvpValue;
use crate::engine::{Engine, Reply};
use crate::protocol::{attr, cmd};

/// One request field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Field {
    pub avp: u16,
    pub optional: bool,
}

const fn req(avp: u16) -> Field {
    Field { avp, optional: false }
}

const fn opt(avp: u16) -> Field {
    Field { avp, optional: true }
}

/// Request and reply layout of one command.
#[derive(Debug, Clone, Copy)]
pub struct CommandSpec {
    pub name: &'static str,
    pub code: u16,
    pub request: &'static [Field],
    /// Fields expected between the echo and the result code, in order.
    pub reply: &'static [u16],
}

const TAG_FIELDS: [Field; 3] = [req(attr::SOURCE_NAME), req(attr::TAGIDLEN), req(attr::TAGID)];

// ---------------------------------------------------------------
// Reader information
// ---------------------------------------------------------------

pub const GET_FIRMWARE_RELEASE: CommandSpec = CommandSpec {
    name: "get_firmware_release",
    code: cmd::GETFWRELEASE,
    request: &[],
    reply: &[attr::GETFWRELEASE],
};

pub const GET_READER_INFO: CommandSpec = CommandSpec {
    name: "get_reader_info",
    code: cmd::GETRDRINFO,
    request: &[],
    reply: &[attr::READERINFO],
};

// ---------------------------------------------------------------
// Air protocol and RF
// ---------------------------------------------------------------

pub const SET_PROTOCOL: CommandSpec = CommandSpec {
    name: "set_protocol",
    code: cmd::SETPROTOCOL,
    request: &[req(attr::PROTOCOL_NAME)],
    reply: &[],
};

pub const GET_PROTOCOL: CommandSpec = CommandSpec {
    name: "get_protocol",
    code: cmd::GETPROTOCOL,
    request: &[],
    reply: &[attr::PROTOCOL_NAME],
};

pub const SET_POWER: CommandSpec = CommandSpec {
    name: "set_power",
    code: cmd::SETPOWER,
    request: &[req(attr::POWER)],
    reply: &[],
};

pub const GET_POWER: CommandSpec = CommandSpec {
    name: "get_power",
    code: cmd::GETPOWER,
    request: &[],
    reply: &[attr::POWER_GET],
};

pub const SET_BITRATE: CommandSpec = CommandSpec {
    name: "set_bitrate",
    code: cmd::SETRFLINKPROFILE,
    request: &[req(attr::MODULATION)],
    reply: &[],
};

pub const GET_BITRATE: CommandSpec = CommandSpec {
    name: "get_bitrate",
    code: cmd::GETRFLINKPROFILE,
    request: &[],
    reply: &[attr::MODULATION],
};

pub const SET_FHSS_MODE: CommandSpec = CommandSpec {
    name: "set_fhss_mode",
    code: cmd::SETFHMODE,
    request: &[req(attr::BOOLEAN)],
    reply: &[],
};

pub const GET_FHSS_MODE: CommandSpec = CommandSpec {
    name: "get_fhss_mode",
    code: cmd::GETFHMODE,
    request: &[],
    reply: &[attr::BOOLEAN],
};

pub const SET_RF_CHANNEL: CommandSpec = CommandSpec {
    name: "set_rf_channel",
    code: cmd::SETCHANNEL,
    request: &[req(attr::RFCHANNEL)],
    reply: &[],
};

pub const GET_RF_CHANNEL: CommandSpec = CommandSpec {
    name: "get_rf_channel",
    code: cmd::GETCHANNEL,
    request: &[],
    reply: &[attr::RFCHANNEL],
};

pub const SET_RF_REGULATION: CommandSpec = CommandSpec {
    name: "set_rf_regulation",
    code: cmd::SETRFREGULATION,
    request: &[req(attr::RFREGULATION)],
    reply: &[],
};

pub const GET_RF_REGULATION: CommandSpec = CommandSpec {
    name: "get_rf_regulation",
    code: cmd::GETRFREGULATION,
    request: &[],
    reply: &[attr::RFREGULATION],
};

// ---------------------------------------------------------------
// Read points and logical sources
// ---------------------------------------------------------------

pub const ADD_READ_POINT: CommandSpec = CommandSpec {
    name: "add_read_point",
    code: cmd::ADDREADPOINT,
    request: &[req(attr::SOURCE_NAME), req(attr::READPOINT_NAME)],
    reply: &[],
};

pub const REMOVE_READ_POINT: CommandSpec = CommandSpec {
    name: "remove_read_point",
    code: cmd::REMREADPOINT,
    request: &[req(attr::SOURCE_NAME), req(attr::READPOINT_NAME)],
    reply: &[],
};

pub const IS_READ_POINT_PRESENT: CommandSpec = CommandSpec {
    name: "is_read_point_present",
    code: cmd::CHECKRPINSRC,
    request: &[req(attr::READPOINT_NAME), req(attr::SOURCE_NAME)],
    reply: &[attr::BOOLEAN],
};

pub const GET_READ_POINT_STATUS: CommandSpec = CommandSpec {
    name: "get_read_point_status",
    code: cmd::CHECKANTENNA,
    request: &[req(attr::READPOINT_NAME)],
    reply: &[attr::READPOINT_STATUS],
};

pub const MATCH_READ_POINT_IMPEDANCE: CommandSpec = CommandSpec {
    name: "match_read_point_impedance",
    code: cmd::MATCHRFIMPEDANCE,
    request: &[
        req(attr::READPOINT_NAME),
        req(attr::CONFIGPARAMETER),
        req(attr::CONFIGVALUE),
    ],
    reply: &[attr::POWER_VSWR],
};

pub const SET_SOURCE_CONFIGURATION: CommandSpec = CommandSpec {
    name: "set_source_configuration",
    code: cmd::SETSRCCONF,
    request: &[
        req(attr::SOURCE_NAME),
        req(attr::CONFIGPARAMETER),
        req(attr::CONFIGVALUE),
    ],
    reply: &[],
};

pub const GET_SOURCE_CONFIGURATION: CommandSpec = CommandSpec {
    name: "get_source_configuration",
    code: cmd::GETSRCCONF,
    request: &[req(attr::SOURCE_NAME), req(attr::CONFIGPARAMETER)],
    reply: &[attr::CONFIGVALUE],
};

// ---------------------------------------------------------------
// Reader serial port and I/O lines
// ---------------------------------------------------------------

pub const SET_RS232: CommandSpec = CommandSpec {
    name: "set_rs232",
    code: cmd::SETRS232,
    request: &[
        req(attr::BAUDRATE),
        req(attr::DATABITS),
        req(attr::STOPBITS),
        req(attr::PARITY),
        req(attr::FLOWCTRL),
    ],
    reply: &[],
};

pub const SET_IO: CommandSpec = CommandSpec {
    name: "set_io",
    code: cmd::SETIO,
    request: &[req(attr::IOREGISTER)],
    reply: &[],
};

pub const GET_IO: CommandSpec = CommandSpec {
    name: "get_io",
    code: cmd::GETIO,
    request: &[],
    reply: &[attr::IOREGISTER],
};

pub const SET_IO_DIRECTION: CommandSpec = CommandSpec {
    name: "set_io_direction",
    code: cmd::SETIODIR,
    request: &[req(attr::IOREGISTER)],
    reply: &[],
};

pub const GET_IO_DIRECTION: CommandSpec = CommandSpec {
    name: "get_io_direction",
    code: cmd::GETIODIR,
    request: &[],
    reply: &[attr::IOREGISTER],
};

// ---------------------------------------------------------------
// EPC C1G2 tag access
// ---------------------------------------------------------------

pub const READ_TAG_DATA: CommandSpec = CommandSpec {
    name: "read_tag_data",
    code: cmd::G2READ,
    request: &[
        TAG_FIELDS[0],
        TAG_FIELDS[1],
        TAG_FIELDS[2],
        req(attr::MEMBANK),
        req(attr::TAGADDRESS),
        req(attr::LENGTH),
        opt(attr::G2PWD),
    ],
    reply: &[attr::TAG_VALUE],
};

pub const WRITE_TAG_DATA: CommandSpec = CommandSpec {
    name: "write_tag_data",
    code: cmd::G2WRITE,
    request: &[
        TAG_FIELDS[0],
        TAG_FIELDS[1],
        TAG_FIELDS[2],
        req(attr::MEMBANK),
        req(attr::TAGADDRESS),
        req(attr::LENGTH),
        req(attr::TAG_VALUE),
        opt(attr::G2PWD),
    ],
    reply: &[],
};

pub const LOCK_TAG: CommandSpec = CommandSpec {
    name: "lock_tag",
    code: cmd::G2LOCK,
    request: &[
        TAG_FIELDS[0],
        TAG_FIELDS[1],
        TAG_FIELDS[2],
        req(attr::PAYLOAD),
        opt(attr::G2PWD),
    ],
    reply: &[],
};

pub const KILL_TAG: CommandSpec = CommandSpec {
    name: "kill_tag",
    code: cmd::G2KILL,
    request: &[TAG_FIELDS[0], TAG_FIELDS[1], TAG_FIELDS[2], req(attr::G2PWD)],
    reply: &[],
};

pub const PROGRAM_ID: CommandSpec = CommandSpec {
    name: "program_id",
    code: cmd::G2PROGRAMID,
    request: &[
        TAG_FIELDS[0],
        TAG_FIELDS[1],
        TAG_FIELDS[2],
        req(attr::G2NSI),
        opt(attr::G2PWD),
    ],
    reply: &[],
};

pub const CUSTOM_COMMAND: CommandSpec = CommandSpec {
    name: "custom_command",
    code: cmd::G2CUSTOM,
    request: &[
        opt(attr::SOURCE_NAME),
        opt(attr::TAGIDLEN),
        opt(attr::TAGID),
        req(attr::SUBCMD),
        opt(attr::LENGTH),
        opt(attr::TAG_VALUE),
        req(attr::LENGTH),
        opt(attr::G2PWD),
    ],
    reply: &[attr::TAG_VALUE],
};

// ---------------------------------------------------------------
// Inventory
// ---------------------------------------------------------------

/// Inventory request layout. The reply is decoded by
/// [`inventory`](crate::inventory), not by [`execute`].
pub const INVENTORY: CommandSpec = CommandSpec {
    name: "inventory",
    code: cmd::INVENTORY,
    request: &[
        req(attr::SOURCE_NAME),
        opt(attr::MEMBANK),
        opt(attr::LENGTH),
        opt(attr::TAGID),
        opt(attr::TAGADDRESS),
        opt(attr::BITMASK),
    ],
    reply: &[],
};

/// Every table-driven command, for lookups and tests.
pub const ALL: &[&CommandSpec] = &[
    &GET_FIRMWARE_RELEASE,
    &GET_READER_INFO,
    &SET_PROTOCOL,
    &GET_PROTOCOL,
    &SET_POWER,
    &GET_POWER,
    &SET_BITRATE,
    &GET_BITRATE,
    &SET_FHSS_MODE,
    &GET_FHSS_MODE,
    &SET_RF_CHANNEL,
    &GET_RF_CHANNEL,
    &SET_RF_REGULATION,
    &GET_RF_REGULATION,
    &ADD_READ_POINT,
    &REMOVE_READ_POINT,
    &IS_READ_POINT_PRESENT,
    &GET_READ_POINT_STATUS,
    &MATCH_READ_POINT_IMPEDANCE,
    &SET_SOURCE_CONFIGURATION,
    &GET_SOURCE_CONFIGURATION,
    &SET_RS232,
    &SET_IO,
    &GET_IO,
    &SET_IO_DIRECTION,
    &GET_IO_DIRECTION,
    &READ_TAG_DATA,
    &WRITE_TAG_DATA,
    &LOCK_TAG,
    &KILL_TAG,
    &PROGRAM_ID,
    &CUSTOM_COMMAND,
    &INVENTORY,
];

/// Pair positional `args` with the request layout of `spec`.
pub fn request_fields(
    spec: &CommandSpec,
    args: &[Option<AvpValue>],
) -> Result<Vec<(u16, AvpValue)>> {
    if args.len() != spec.request.len() {
        return Err(Error::InvalidParameter(format!(
            "{} takes {} fields, got {}",
            spec.name,
            spec.request.len(),
            args.len()
        )));
    }
    let mut fields = Vec::with_capacity(args.len());
    for (field, arg) in spec.request.iter().zip(args) {
        match arg {
            Some(value) => fields.push((field.avp, value.clone())),
            None if field.optional => {}
            None => {
                return Err(Error::InvalidParameter(format!(
                    "{} is missing mandatory field 0x{:02X}",
                    spec.name, field.avp
                )))
            }
        }
    }
    Ok(fields)
}

/// Send the request for `spec` and return the raw reply.
pub async fn send(
    engine: &mut Engine,
    spec: &CommandSpec,
    args: &[Option<AvpValue>],
) -> Result<Reply> {
    let fields = request_fields(spec, args)?;
    engine.transact(spec.code, &fields).await
}

/// Run `spec` end to end.
///
/// Returns one entry per `spec.reply` field, `None` where the reader
/// omitted it. A non-zero result code becomes [`Error::Device`].
pub async fn execute(
    engine: &mut Engine,
    spec: &CommandSpec,
    args: &[Option<AvpValue>],
) -> Result<Vec<Option<AvpValue>>> {
    let mut reply = send(engine, spec, args).await?;
    reply.expect_echo()?;
    let mut values = Vec::with_capacity(spec.reply.len());
    for avp_type in spec.reply {
        values.push(reply.optional(*avp_type)?);
    }
    reply.result_code()?.into_result()?;
    Ok(values)
}

/// Take the single reply value of a query, failing if the reader
/// reported success without it.
pub fn required(spec: &CommandSpec, mut values: Vec<Option<AvpValue>>) -> Result<AvpValue> {
    values
        .pop()
        .flatten()
        .ok_or_else(|| Error::Protocol(format!("{} reply is missing its value", spec.name)))
}

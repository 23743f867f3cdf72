//! Device-reported result codes.
//!
//! Every reply from the reader ends with a `RESULT_CODE` AVP. Zero means
//! success; anything else is a device-side condition that is passed through
//! to the caller verbatim as [`Error::Device`](crate::Error::Device). The
//! library never interprets or retries on these.

use std::fmt;

use crate::error::{Error, Result};

/// A numeric result code returned by the reader.
///
/// Codes the reader firmware documents have named constants; any other
/// value is still representable and displays as "unknown device error".
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ResultCode(u16);

impl ResultCode {
    pub const OK: ResultCode = ResultCode(0);

    pub const CHANNEL_NAME_EXISTS: ResultCode = ResultCode(100);
    pub const ADDRESS_IN_USE: ResultCode = ResultCode(101);
    pub const UNKNOWN: ResultCode = ResultCode(102);
    pub const BAD_CHANNEL: ResultCode = ResultCode(103);
    pub const INVALID_SOURCE_NAME: ResultCode = ResultCode(104);
    pub const INVALID_CHANNEL_NAME: ResultCode = ResultCode(105);
    pub const TOO_MANY_CHANNELS: ResultCode = ResultCode(106);
    pub const TOO_MANY_SOURCES: ResultCode = ResultCode(107);
    pub const SOURCE_NOT_IN_CHANNEL: ResultCode = ResultCode(109);
    pub const BAD_TIMER_VALUE: ResultCode = ResultCode(110);
    pub const TRIGGER_NAME_EXISTS: ResultCode = ResultCode(111);
    pub const TOO_MANY_TRIGGERS: ResultCode = ResultCode(112);
    pub const BAD_TRIGGER: ResultCode = ResultCode(113);
    pub const BAD_ADDRESS: ResultCode = ResultCode(114);
    pub const INVALID_PROTOCOL: ResultCode = ResultCode(115);
    pub const BAD_PORT_ADDRESS: ResultCode = ResultCode(116);
    pub const CANNOT_CONNECT_TO_SERVER: ResultCode = ResultCode(117);
    pub const INVALID_TRIGGER_NAME: ResultCode = ResultCode(118);
    pub const INVALID_TIME: ResultCode = ResultCode(119);
    pub const SOURCE_NOT_FOUND: ResultCode = ResultCode(120);
    pub const TRIGGER_NOT_FOUND: ResultCode = ResultCode(121);
    pub const CHANNEL_NOT_FOUND: ResultCode = ResultCode(122);
    pub const BAD_READ_POINT: ResultCode = ResultCode(123);
    pub const CHANNEL_BUSY: ResultCode = ResultCode(124);
    pub const TRIGGER_BUSY: ResultCode = ResultCode(125);
    pub const INTERNAL_FILESYSTEM: ResultCode = ResultCode(126);
    pub const INVALID_COMMAND: ResultCode = ResultCode(127);
    pub const BAD_PARAMETER_VALUE: ResultCode = ResultCode(128);
    pub const NOTIFY_SERVER_NOT_READY: ResultCode = ResultCode(129);

    pub const POWER_OUT_OF_RANGE: ResultCode = ResultCode(183);

    pub const INVALID_PARAMETER: ResultCode = ResultCode(200);
    pub const LOGICAL_SOURCE_DISABLED: ResultCode = ResultCode(201);
    pub const TAG_NOT_PRESENT: ResultCode = ResultCode(202);
    pub const WRITING_TAG: ResultCode = ResultCode(203);
    pub const READING_TAG: ResultCode = ResultCode(204);
    pub const BAD_TAG_ADDRESS: ResultCode = ResultCode(205);
    pub const INVALID_FUNCTION: ResultCode = ResultCode(206);
    pub const SELECT_UNSELECT: ResultCode = ResultCode(207);
    pub const TAG_LOCKED: ResultCode = ResultCode(209);
    pub const UNSUPPORTED: ResultCode = ResultCode(210);
    pub const POWER: ResultCode = ResultCode(211);
    pub const NON_SPECIFIC: ResultCode = ResultCode(212);
    pub const KILL_TAG: ResultCode = ResultCode(213);
    pub const CHANNELS_FULL: ResultCode = ResultCode(214);
    pub const MATCH_READ_POINT: ResultCode = ResultCode(215);

    /// Wrap a raw code as received on the wire.
    pub const fn from_raw(code: u16) -> Self {
        ResultCode(code)
    }

    /// The raw wire value.
    pub const fn raw(self) -> u16 {
        self.0
    }

    pub fn is_ok(self) -> bool {
        self == ResultCode::OK
    }

    /// `Ok(())` for [`ResultCode::OK`], otherwise [`Error::Device`].
    pub fn into_result(self) -> Result<()> {
        if self.is_ok() {
            Ok(())
        } else {
            Err(Error::Device(self))
        }
    }

    /// Short human-readable description of the code.
    pub fn description(self) -> &'static str {
        match self.0 {
            0 => "success",
            100 => "channel name already exists",
            101 => "address already in use",
            102 => "unknown error",
            103 => "bad channel",
            104 => "invalid source name",
            105 => "invalid channel name",
            106 => "too many channels",
            107 => "too many sources",
            109 => "source not in channel",
            110 => "bad timer value",
            111 => "trigger name already exists",
            112 => "too many triggers",
            113 => "bad trigger",
            114 => "bad address",
            115 => "invalid protocol",
            116 => "bad port address",
            117 => "cannot connect to server",
            118 => "invalid trigger name",
            119 => "invalid time",
            120 => "source not found",
            121 => "trigger not found",
            122 => "channel not found",
            123 => "bad read point",
            124 => "channel busy",
            125 => "trigger busy",
            126 => "internal filesystem error",
            127 => "invalid command",
            128 => "bad parameter value",
            129 => "notify server not ready",
            183 => "power value out of range",
            200 => "invalid parameter",
            201 => "logical source disabled",
            202 => "tag not present",
            203 => "error writing tag",
            204 => "error reading tag",
            205 => "bad tag address",
            206 => "invalid function",
            207 => "select/unselect error",
            209 => "tag locked",
            210 => "unsupported",
            211 => "power error",
            212 => "non-specific tag error",
            213 => "kill tag error",
            214 => "channels full",
            215 => "read point impedance match failed",
            _ => "unknown device error",
        }
    }
}

impl fmt::Display for ResultCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({})", self.description(), self.0)
    }
}

impl From<u16> for ResultCode {
    fn from(code: u16) -> Self {
        ResultCode(code)
    }
}

//! Core types used throughout rfidlib.
//!
//! These are the reader-agnostic domain values: decoded tags, air
//! protocols, memory banks, serial port settings and the small enums the
//! reader exchanges as raw integers.

use std::fmt;

/// Maximum tag ID length in bytes (EPC up to 496 bits).
pub const MAX_ID_LENGTH: usize = 64;
/// Maximum TID length in bytes.
pub const MAX_TID_SIZE: usize = 64;
/// Maximum tag memory payload for a single read/write in bytes.
pub const MAX_TAG_VALUE: usize = 128;
/// XPC word length in bytes.
pub const XPC_LENGTH: usize = 4;
/// PC word length in bytes.
pub const PC_LENGTH: usize = 2;
/// Maximum read-point name length in bytes, terminating NUL included.
pub const MAX_READPOINT_NAME: usize = 5;
/// Maximum logical-source name length in bytes, terminating NUL included.
pub const MAX_LOGICAL_SOURCE_NAME: usize = 30;
/// Maximum firmware release string length in bytes.
pub const MAX_FWREL_LENGTH: usize = 30;
/// Maximum model string length in bytes.
pub const MAX_MODEL_LENGTH: usize = 20;
/// Maximum serial number string length in bytes.
pub const MAX_SERIAL_LENGTH: usize = 20;

/// Antenna ports exposed by the reader.
pub static READ_POINTS: [&str; 4] = ["Ant0", "Ant1", "Ant2", "Ant3"];

/// Logical sources configured on the reader.
pub static SOURCE_NAMES: [&str; 4] = ["Source_0", "Source_1", "Source_2", "Source_3"];

// ---------------------------------------------------------------
// Air protocol
// ---------------------------------------------------------------

/// Air interface protocol a reader speaks, or a tag was read with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Protocol {
    Iso18000_6B,
    EpcC1G1,
    Iso18000_6A,
    #[default]
    EpcC1G2,
    Multiprotocol,
    Epc119,
    /// A value this library does not know about.
    Unknown(u32),
}

impl Protocol {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => Protocol::Iso18000_6B,
            1 => Protocol::EpcC1G1,
            2 => Protocol::Iso18000_6A,
            3 => Protocol::EpcC1G2,
            4 => Protocol::Multiprotocol,
            5 => Protocol::Epc119,
            n => Protocol::Unknown(n),
        }
    }

    pub fn raw(self) -> u32 {
        match self {
            Protocol::Iso18000_6B => 0,
            Protocol::EpcC1G1 => 1,
            Protocol::Iso18000_6A => 2,
            Protocol::EpcC1G2 => 3,
            Protocol::Multiprotocol => 4,
            Protocol::Epc119 => 5,
            Protocol::Unknown(n) => n,
        }
    }
}

impl fmt::Display for Protocol {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Protocol::Iso18000_6B => write!(f, "ISO18000-6B"),
            Protocol::EpcC1G1 => write!(f, "EPC C1G1"),
            Protocol::Iso18000_6A => write!(f, "ISO18000-6A"),
            Protocol::EpcC1G2 => write!(f, "EPC C1G2"),
            Protocol::Multiprotocol => write!(f, "multiprotocol"),
            Protocol::Epc119 => write!(f, "EPC 1.19"),
            Protocol::Unknown(n) => write!(f, "protocol-{n}"),
        }
    }
}

// ---------------------------------------------------------------
// Tags
// ---------------------------------------------------------------

/// A tag observation decoded from an inventory reply or stream.
///
/// Optional fields (`rssi`, `tid`, `xpc`, `pc`) are left at their zero
/// value unless the inventory was started with the matching flag.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tag {
    /// Tag ID bytes (EPC for C1G2 tags).
    pub id: Vec<u8>,
    /// Tag ID length in bytes as reported by the reader.
    pub length: u16,
    /// Logical source that saw the tag. Empty in compact mode.
    pub logical_source: String,
    /// Antenna that saw the tag. Empty in compact mode.
    pub read_point: String,
    /// Reader timestamp as (seconds, microseconds).
    pub timestamp: (u32, u32),
    /// Air protocol the tag answered with.
    pub protocol: Protocol,
    /// Received signal strength, in the reader's units.
    pub rssi: i16,
    pub tid: Vec<u8>,
    pub tid_length: u16,
    pub xpc: [u8; XPC_LENGTH],
    pub pc: [u8; PC_LENGTH],
}

impl Tag {
    /// The tag ID as upper-case hex.
    pub fn id_hex(&self) -> String {
        self.id.iter().map(|b| format!("{b:02X}")).collect()
    }
}

/// Tag memory bank for C1G2 read/write/lock operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum MemBank {
    Reserved = 0,
    Epc = 1,
    Tid = 2,
    User = 3,
}

impl MemBank {
    pub fn raw(self) -> u16 {
        self as u16
    }
}

/// Antenna health reported by the reader.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReadPointStatus {
    Good,
    Poor,
    Bad,
    Unknown(u32),
}

impl ReadPointStatus {
    pub fn from_raw(raw: u32) -> Self {
        match raw {
            0 => ReadPointStatus::Good,
            1 => ReadPointStatus::Poor,
            2 => ReadPointStatus::Bad,
            n => ReadPointStatus::Unknown(n),
        }
    }
}

impl fmt::Display for ReadPointStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReadPointStatus::Good => write!(f, "good"),
            ReadPointStatus::Poor => write!(f, "poor"),
            ReadPointStatus::Bad => write!(f, "bad"),
            ReadPointStatus::Unknown(n) => write!(f, "status-{n}"),
        }
    }
}

/// Model and serial number of a reader.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ReaderInfo {
    pub model: String,
    pub serial: String,
}

impl ReaderInfo {
    /// Split the reader's `"<model> <serial>"` string at the first space.
    ///
    /// A string without a space is taken as the model alone.
    pub fn parse(raw: &str) -> Self {
        match raw.split_once(' ') {
            Some((model, serial)) => ReaderInfo {
                model: model.to_string(),
                serial: serial.to_string(),
            },
            None => ReaderInfo {
                model: raw.to_string(),
                serial: String::new(),
            },
        }
    }
}

// ---------------------------------------------------------------
// Logical source configuration
// ---------------------------------------------------------------

/// Logical source configuration parameter ids.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u32)]
pub enum SourceParameter {
    ReadCycle = 0,
    ObservedThreshold = 1,
    LostThreshold = 2,
    G2QValue = 3,
    G2Session = 4,
    G2Target = 5,
    G2Selected = 6,
    Iso18006BDesb = 7,
    DwellTime = 8,
    InventoryCount = 10,
    TidLength = 13,
    QuietTime = 15,
}

impl SourceParameter {
    pub fn raw(self) -> u32 {
        self as u32
    }
}

/// Configuration parameter id used when matching antenna impedance.
pub const RP_MATCH_RF_ALGORITHM: u32 = 14;

// ---------------------------------------------------------------
// RF settings
// ---------------------------------------------------------------

/// RF link profile (modulation and link rates) selector.
///
/// Several names share a value because older firmware used the short
/// names for the DSB-ASK FM0 profiles.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Bitrate(pub u16);

impl Bitrate {
    pub const TX10_RX40: Bitrate = Bitrate(1);
    pub const TX40_RX40: Bitrate = Bitrate(2);
    pub const TX40_RX160: Bitrate = Bitrate(3);
    pub const DSB_ASK_FM0_TX10_RX40: Bitrate = Bitrate(1);
    pub const DSB_ASK_FM0_TX40_RX40: Bitrate = Bitrate(2);
    pub const DSB_ASK_FM0_TX40_RX160: Bitrate = Bitrate(3);
    pub const DSB_ASK_FM0_TX160_RX400: Bitrate = Bitrate(4);
    pub const DSB_ASK_M2_TX40_RX160: Bitrate = Bitrate(5);
    pub const PR_ASK_M4_TX40_RX250: Bitrate = Bitrate(6);
    pub const PR_ASK_M4_TX40_RX300: Bitrate = Bitrate(7);
    pub const PR_ASK_M2_TX40_RX250: Bitrate = Bitrate(8);
    pub const DSB_ASK_M4_TX40_RX256: Bitrate = Bitrate(10);
    pub const PR_ASK_M4_TX40_RX320: Bitrate = Bitrate(11);
    pub const PR_ASK_FM0_TX40_RX640: Bitrate = Bitrate(12);
    pub const PR_ASK_M4_TX80_RX320: Bitrate = Bitrate(13);
    pub const PR_ASK_M4_TX40_RX256: Bitrate = Bitrate(14);
    pub const PR_ASK_M8_TX40_RX256: Bitrate = Bitrate(15);
    pub const PR_ASK_M2_TX133_RX640: Bitrate = Bitrate(16);
    pub const PR_ASK_M2_TX50_RX320: Bitrate = Bitrate(17);
    pub const PR_ASK_M4_TX50_RX320: Bitrate = Bitrate(18);
    pub const PR_ASK_M4_TX50_RX250: Bitrate = Bitrate(19);
    pub const PR_ASK_FM0_TX133_RX640: Bitrate = Bitrate(20);
    pub const PR_ASK_M2_TX66_RX320: Bitrate = Bitrate(21);
    pub const PR_ASK_M8_TX50_RX160: Bitrate = Bitrate(22);
    pub const PR_ASK_M4_TX133_RX640: Bitrate = Bitrate(23);
    pub const DSB_ASK_FM0_TX160_RX640: Bitrate = Bitrate(24);
    pub const DSB_ASK_M2_TX160_RX640: Bitrate = Bitrate(25);
}

/// Regional RF regulation the reader is configured for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct RfRegulation(pub u16);

impl RfRegulation {
    pub const ETSI_302208: RfRegulation = RfRegulation(0);
    pub const ETSI_300220: RfRegulation = RfRegulation(1);
    pub const FCC_US: RfRegulation = RfRegulation(2);
    pub const MALAYSIA: RfRegulation = RfRegulation(3);
    pub const JAPAN: RfRegulation = RfRegulation(4);
    pub const KOREA: RfRegulation = RfRegulation(5);
    pub const AUSTRALIA: RfRegulation = RfRegulation(6);
    pub const CHINA: RfRegulation = RfRegulation(7);
    pub const TAIWAN: RfRegulation = RfRegulation(8);
    pub const SINGAPORE: RfRegulation = RfRegulation(9);
    pub const BRAZIL: RfRegulation = RfRegulation(10);
    pub const JAPAN_STD_T106: RfRegulation = RfRegulation(11);
    pub const JAPAN_STD_T107: RfRegulation = RfRegulation(12);
    pub const PERU: RfRegulation = RfRegulation(13);
    pub const SOUTH_AFRICA: RfRegulation = RfRegulation(14);
    pub const CHILE: RfRegulation = RfRegulation(15);
}

// ---------------------------------------------------------------
// Reader serial port
// ---------------------------------------------------------------

/// Serial parity setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum Parity {
    #[default]
    None = 0,
    Odd = 1,
    Even = 2,
}

/// Serial flow control setting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
#[repr(u32)]
pub enum FlowControl {
    #[default]
    None = 0,
    Hardware = 1,
    XonXoff = 2,
}

/// RS-232 settings pushed to the reader's own serial port.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SerialSettings {
    pub baud_rate: u32,
    pub data_bits: u32,
    pub stop_bits: u32,
    pub parity: Parity,
    pub flow_control: FlowControl,
}

impl Default for SerialSettings {
    /// 115200 8N1, no flow control.
    fn default() -> Self {
        SerialSettings {
            baud_rate: 115_200,
            data_bits: 8,
            stop_bits: 1,
            parity: Parity::None,
            flow_control: FlowControl::None,
        }
    }
}

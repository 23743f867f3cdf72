//! Protocol vocabulary: frame constants, AVP attribute types and command
//! codes.
//!
//! These numbers are the reader firmware's contract and must match it bit
//! for bit. They are grouped into [`attr`] (AVP type codes) and [`cmd`]
//! (values carried in the `COMMAND` AVP).

/// Vendor id carried in every frame header.
pub const VENDOR_ID: u32 = 21336;

/// Protocol version the host puts in request headers.
pub const REQUEST_VERSION: u16 = 0x8001;

/// Protocol version the reader puts in reply headers.
pub const REPLY_VERSION: u16 = 0x0001;

/// Frame header size in bytes.
pub const HEADER_LEN: usize = 10;

/// AVP header size in bytes.
pub const AVP_HEADER_LEN: usize = 6;

/// Out-of-band byte that stops a continuous inventory.
pub const ABORT_BYTE: u8 = 0xAB;

/// AVP attribute type codes.
pub mod attr {
    pub const COMMAND: u16 = 0x01;
    pub const RESULT_CODE: u16 = 0x02;
    pub const EVTTYPE: u16 = 0x0E;
    pub const TAGIDLEN: u16 = 0x0F;
    pub const TIMESTAMP: u16 = 0x10;
    pub const TAGID: u16 = 0x11;
    pub const TAGTYPE: u16 = 0x12;
    pub const CHANNEL_NAME: u16 = 0x1E;
    pub const CHANNEL_ADDRESS: u16 = 0x1F;
    pub const TRIGGER_NAME: u16 = 0x20;
    pub const TRIGGER_TYPE: u16 = 0x21;
    pub const READPOINT_NAME: u16 = 0x22;
    pub const TAG_VALUE: u16 = 0x4D;
    pub const TAGADDRESS: u16 = 0x4E;
    pub const TESTMODE: u16 = 0x4F;
    pub const LENGTH: u16 = 0x50;
    pub const MODULATION: u16 = 0x51;
    pub const POWER_GET: u16 = 0x52;
    pub const POWER_VSWR: u16 = 0x53;
    pub const PROTOCOL_NAME: u16 = 0x54;
    pub const READPOINT: u16 = 0x55;
    pub const READPOINT_STATUS: u16 = 0x56;
    pub const BOOLEAN: u16 = 0x57;
    pub const IPADDRESS: u16 = 0x58;
    pub const IPNETMASK: u16 = 0x59;
    pub const IPGATEWAY: u16 = 0x5A;
    pub const DE_SBENA: u16 = 0x5B;
    pub const GETFWRELEASE: u16 = 0x5C;
    pub const EXBIT_STATUS: u16 = 0x5D;
    pub const G1PWD: u16 = 0x5E;
    pub const RFONOFF: u16 = 0x5F;
    pub const BAUDRATE: u16 = 0x60;
    pub const DATABITS: u16 = 0x61;
    pub const STOPBITS: u16 = 0x62;
    pub const PARITY: u16 = 0x63;
    pub const FLOWCTRL: u16 = 0x64;
    pub const DATETIME: u16 = 0x65;
    pub const SELUNSEL_OP: u16 = 0x66;
    pub const BITMASK: u16 = 0x67;
    pub const IOREGISTER: u16 = 0x69;
    pub const CONFIGPARAMETER: u16 = 0x6A;
    pub const CONFIGVALUE: u16 = 0x6B;
    pub const EVENTMODE: u16 = 0x6E;
    pub const MEMBANK: u16 = 0x71;
    pub const PAYLOAD: u16 = 0x72;
    pub const G2PWD: u16 = 0x73;
    pub const G2NSI: u16 = 0x74;
    pub const G2Q: u16 = 0x75;
    pub const READERINFO: u16 = 0x76;
    pub const RFREGULATION: u16 = 0x77;
    pub const RFCHANNEL: u16 = 0x78;
    pub const SUBCMD: u16 = 0x79;
    pub const RSSI: u16 = 0x7A;
    pub const OPTION: u16 = 0x7B;
    pub const XPC: u16 = 0x7C;
    pub const PC: u16 = 0x7D;
    pub const PHASE: u16 = 0x7E;
    pub const TERMINAL_TYPE: u16 = 0x7F;
    pub const BATTERY_LEVEL: u16 = 0x80;
    pub const LONG_LENGTH: u16 = 0x81;
    pub const LONG_ADDRESS: u16 = 0x82;
    pub const UINT16: u16 = 0x83;
    pub const POWER: u16 = 0x96;
    pub const SOURCE_NAME: u16 = 0xFB;
}

/// Command codes carried in the `COMMAND` AVP.
pub mod cmd {
    pub const RAWREADID: u16 = 0x12;
    pub const INVENTORY: u16 = 0x13;
    pub const ADDREADPOINT: u16 = 0x5F;
    pub const REMREADPOINT: u16 = 0x60;
    pub const SETPOWER: u16 = 0x64;
    pub const READTAG: u16 = 0x6E;
    pub const WRITETAG: u16 = 0x6F;
    pub const LOCKTAG: u16 = 0x70;
    pub const SETRFLINKPROFILE: u16 = 0x72;
    pub const GETPOWER: u16 = 0x73;
    pub const SETPROTOCOL: u16 = 0x74;
    pub const CHECKANTENNA: u16 = 0x76;
    pub const CHECKRPINSRC: u16 = 0x78;
    pub const GETPROTOCOL: u16 = 0x79;
    pub const SETDESB: u16 = 0x7B;
    pub const GETFWRELEASE: u16 = 0x7C;
    pub const GETDESB: u16 = 0x7D;
    pub const G1PROGRAMID: u16 = 0x7E;
    pub const G1KILLTAG: u16 = 0x7F;
    pub const RFONOFF: u16 = 0x80;
    pub const GETRFLINKPROFILE: u16 = 0x81;
    pub const BLOCKWRITETAG: u16 = 0x82;
    pub const SETRS232: u16 = 0x83;
    pub const SETDATETIME: u16 = 0x84;
    pub const GROUPSELUNSEL: u16 = 0x85;
    pub const GETIO: u16 = 0x86;
    pub const SETIO: u16 = 0x87;
    pub const SETIODIR: u16 = 0x88;
    pub const GETIODIR: u16 = 0x89;
    pub const SETSRCCONF: u16 = 0x8A;
    pub const GETSRCCONF: u16 = 0x8B;
    pub const GETEVENTMODE: u16 = 0x92;
    pub const E119PROGRAMID: u16 = 0x94;
    pub const G2PROGRAMID: u16 = 0x95;
    pub const G2READ: u16 = 0x96;
    pub const G2WRITE: u16 = 0x97;
    pub const G2LOCK: u16 = 0x98;
    pub const G2KILL: u16 = 0x99;
    pub const G2QUERY: u16 = 0x9A;
    pub const G2SETQ: u16 = 0x9B;
    pub const G2GETQ: u16 = 0x9C;
    pub const G2QUERYACK: u16 = 0x9D;
    pub const GETRDRINFO: u16 = 0x9E;
    pub const SETFHMODE: u16 = 0x9F;
    pub const GETFHMODE: u16 = 0xA0;
    pub const SETRFREGULATION: u16 = 0xA1;
    pub const GETRFREGULATION: u16 = 0xA2;
    pub const SETCHANNEL: u16 = 0xA3;
    pub const GETCHANNEL: u16 = 0xA4;
    pub const G2RESETSESSION: u16 = 0xA5;
    pub const G1SCROLLALLID: u16 = 0xA6;
    pub const GETCHANNELDATA: u16 = 0xA7;
    pub const G2CUSTOM: u16 = 0xA8;
    pub const GETCHANSTS: u16 = 0xA9;
    pub const GETRFCHANSTS: u16 = 0xAA;
    pub const SETEXTLBT: u16 = 0xAB;
    pub const SETADMINPWD: u16 = 0xAC;
    pub const LOGIN: u16 = 0xAD;
    pub const LOGOUT: u16 = 0xAE;
    pub const GETBUFFEREDDATA: u16 = 0xB0;
    pub const LOCKBLOCKPERMALOCK: u16 = 0xB1;
    pub const READBLOCKPERMALOCK: u16 = 0xB2;
    pub const SAVE_SETTINGS: u16 = 0xB3;
    pub const MATCHRFIMPEDANCE: u16 = 0xB4;
    pub const GETBATTERYLEVEL: u16 = 0xB6;
    pub const GETBUFFERSIZE: u16 = 0xB7;
    pub const CLEARBUFFER: u16 = 0xB8;
    pub const G2UNTRACEABLE: u16 = 0xB9;
    pub const G2AUTHENTICATE: u16 = 0xBA;
    pub const SETDAC: u16 = 0xBB;
    pub const GETADC: u16 = 0xBC;
    pub const SETREADPOINTPOWER: u16 = 0xBD;
    pub const GETREADPOINTPOWER: u16 = 0xBE;
    pub const G2BLOCKWRITE: u16 = 0xBF;
    pub const G2BLOCKPROGRAMID: u16 = 0xC0;
}

/// Human-readable name for a command code, for log output.
pub fn command_name(code: u16) -> &'static str {
    match code {
        cmd::RAWREADID => "RAWREADID",
        cmd::INVENTORY => "INVENTORY",
        cmd::ADDREADPOINT => "ADDREADPOINT",
        cmd::REMREADPOINT => "REMREADPOINT",
        cmd::SETPOWER => "SETPOWER",
        cmd::READTAG => "READTAG",
        cmd::WRITETAG => "WRITETAG",
        cmd::LOCKTAG => "LOCKTAG",
        cmd::SETRFLINKPROFILE => "SETRFLINKPROFILE",
        cmd::GETPOWER => "GETPOWER",
        cmd::SETPROTOCOL => "SETPROTOCOL",
        cmd::CHECKANTENNA => "CHECKANTENNA",
        cmd::CHECKRPINSRC => "CHECKRPINSRC",
        cmd::GETPROTOCOL => "GETPROTOCOL",
        cmd::SETDESB => "SETDESB",
        cmd::GETFWRELEASE => "GETFWRELEASE",
        cmd::GETDESB => "GETDESB",
        cmd::G1PROGRAMID => "G1PROGRAMID",
        cmd::G1KILLTAG => "G1KILLTAG",
        cmd::RFONOFF => "RFONOFF",
        cmd::GETRFLINKPROFILE => "GETRFLINKPROFILE",
        cmd::BLOCKWRITETAG => "BLOCKWRITETAG",
        cmd::SETRS232 => "SETRS232",
        cmd::SETDATETIME => "SETDATETIME",
        cmd::GROUPSELUNSEL => "GROUPSELUNSEL",
        cmd::GETIO => "GETIO",
        cmd::SETIO => "SETIO",
        cmd::SETIODIR => "SETIODIR",
        cmd::GETIODIR => "GETIODIR",
        cmd::SETSRCCONF => "SETSRCCONF",
        cmd::GETSRCCONF => "GETSRCCONF",
        cmd::GETEVENTMODE => "GETEVENTMODE",
        cmd::E119PROGRAMID => "E119PROGRAMID",
        cmd::G2PROGRAMID => "G2PROGRAMID",
        cmd::G2READ => "G2READ",
        cmd::G2WRITE => "G2WRITE",
        cmd::G2LOCK => "G2LOCK",
        cmd::G2KILL => "G2KILL",
        cmd::G2QUERY => "G2QUERY",
        cmd::G2SETQ => "G2SETQ",
        cmd::G2GETQ => "G2GETQ",
        cmd::G2QUERYACK => "G2QUERYACK",
        cmd::GETRDRINFO => "GETRDRINFO",
        cmd::SETFHMODE => "SETFHMODE",
        cmd::GETFHMODE => "GETFHMODE",
        cmd::SETRFREGULATION => "SETRFREGULATION",
        cmd::GETRFREGULATION => "GETRFREGULATION",
        cmd::SETCHANNEL => "SETCHANNEL",
        cmd::GETCHANNEL => "GETCHANNEL",
        cmd::G2RESETSESSION => "G2RESETSESSION",
        cmd::G1SCROLLALLID => "G1SCROLLALLID",
        cmd::GETCHANNELDATA => "GETCHANNELDATA",
        cmd::G2CUSTOM => "G2CUSTOM",
        cmd::GETCHANSTS => "GETCHANSTS",
        cmd::GETRFCHANSTS => "GETRFCHANSTS",
        cmd::SETEXTLBT => "SETEXTLBT",
        cmd::SETADMINPWD => "SETADMINPWD",
        cmd::LOGIN => "LOGIN",
        cmd::LOGOUT => "LOGOUT",
        cmd::GETBUFFEREDDATA => "GETBUFFEREDDATA",
        cmd::LOCKBLOCKPERMALOCK => "LOCKBLOCKPERMALOCK",
        cmd::READBLOCKPERMALOCK => "READBLOCKPERMALOCK",
        cmd::SAVE_SETTINGS => "SAVE_SETTINGS",
        cmd::MATCHRFIMPEDANCE => "MATCHRFIMPEDANCE",
        cmd::GETBATTERYLEVEL => "GETBATTERYLEVEL",
        cmd::GETBUFFERSIZE => "GETBUFFERSIZE",
        cmd::CLEARBUFFER => "CLEARBUFFER",
        cmd::G2UNTRACEABLE => "G2UNTRACEABLE",
        cmd::G2AUTHENTICATE => "G2AUTHENTICATE",
        cmd::SETDAC => "SETDAC",
        cmd::GETADC => "GETADC",
        cmd::SETREADPOINTPOWER => "SETREADPOINTPOWER",
        cmd::GETREADPOINTPOWER => "GETREADPOINTPOWER",
        cmd::G2BLOCKWRITE => "G2BLOCKWRITE",
        cmd::G2BLOCKPROGRAMID => "G2BLOCKPROGRAMID",
        _ => "UNKNOWN",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn wire_constants() {
        assert_eq!(VENDOR_ID, 0x5358);
        assert_eq!(HEADER_LEN, 10);
        assert_eq!(AVP_HEADER_LEN, 6);
        assert_eq!(ABORT_BYTE, 0xAB);
    }

    #[test]
    fn vocabulary_spot_checks() {
        assert_eq!(attr::POWER, 0x96);
        assert_eq!(attr::SOURCE_NAME, 0xFB);
        assert_eq!(attr::RESULT_CODE, 0x02);
        assert_eq!(cmd::INVENTORY, 0x13);
        assert_eq!(cmd::G2CUSTOM, 0xA8);
        assert_eq!(cmd::G2BLOCKPROGRAMID, 0xC0);
    }

    #[test]
    fn command_names() {
        assert_eq!(command_name(cmd::SETPOWER), "SETPOWER");
        assert_eq!(command_name(0xFF), "UNKNOWN");
    }
}

/// Open code enumerations carried in DMR headers.
///
/// Every code decodes: values without a name land in an `Unknown` variant
/// that keeps the raw bits, so logging and policy see them unchanged.
use core::fmt;

/// Full Link Control Opcode (low 6 bits of the first LC byte).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Flco {
    /// Group Voice Channel User
    GroupVoice,
    /// Unit to Unit Voice Channel User
    UnitToUnit,
    Unknown(u8),
}

impl Flco {
    pub const MASK: u8 = 0x3F;

    /// Decode from a raw LC byte. Protect and feature bits are masked off.
    pub const fn from_byte(byte: u8) -> Self {
        match byte & Self::MASK {
            0 => Flco::GroupVoice,
            3 => Flco::UnitToUnit,
            code => Flco::Unknown(code),
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            Flco::GroupVoice => 0,
            Flco::UnitToUnit => 3,
            Flco::Unknown(code) => code,
        }
    }

    /// Short name used in decoded header summaries.
    pub fn as_str(&self) -> &'static str {
        match self {
            Flco::GroupVoice => "grp",
            Flco::UnitToUnit => "u2u",
            Flco::Unknown(_) => "?",
        }
    }
}

impl fmt::Display for Flco {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Flco::Unknown(code) => write!(f, "unknown code {}", code),
            known => f.write_str(known.as_str()),
        }
    }
}

/// Service Access Point identifier of a data header (ETSI TS 102 361-1 9.3.18).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Sap {
    Udt,
    Tcp,
    Udp,
    Ip,
    Arp,
    Ppd,
    ShortData,
    Unknown(u8),
}

impl Sap {
    /// Decode from a 4-bit code. Bits above the nibble are ignored.
    pub const fn from_code(code: u8) -> Self {
        match code & 0x0F {
            0x0 => Sap::Udt,
            0x1 => Sap::Tcp,
            0x2 => Sap::Udp,
            0x3 => Sap::Ip,
            0x4 => Sap::Arp,
            0x5 => Sap::Ppd,
            0xA => Sap::ShortData,
            code => Sap::Unknown(code),
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            Sap::Udt => 0x0,
            Sap::Tcp => 0x1,
            Sap::Udp => 0x2,
            Sap::Ip => 0x3,
            Sap::Arp => 0x4,
            Sap::Ppd => 0x5,
            Sap::ShortData => 0xA,
            Sap::Unknown(code) => code,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Sap::Udt => "udt",
            Sap::Tcp => "tcp",
            Sap::Udp => "udp",
            Sap::Ip => "ip",
            Sap::Arp => "arp",
            Sap::Ppd => "ppd",
            Sap::ShortData => "sd",
            Sap::Unknown(_) => "?",
        }
    }
}

/// Slot data type, the high nibble of the second overhead byte
/// (ETSI TS 102 361-1 table 6.1).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataType {
    PiHeader,
    VoiceLcHeader,
    TerminatorWithLc,
    Csbk,
    MbcHeader,
    MbcContinuation,
    DataHeader,
    Rate12Data,
    Rate34Data,
    Idle,
    Rate1Data,
    Unknown(u8),
}

impl DataType {
    /// Decode from the overhead byte that carries the type in its high nibble.
    pub const fn from_overhead(byte: u8) -> Self {
        match byte >> 4 {
            0 => DataType::PiHeader,
            1 => DataType::VoiceLcHeader,
            2 => DataType::TerminatorWithLc,
            3 => DataType::Csbk,
            4 => DataType::MbcHeader,
            5 => DataType::MbcContinuation,
            6 => DataType::DataHeader,
            7 => DataType::Rate12Data,
            8 => DataType::Rate34Data,
            9 => DataType::Idle,
            10 => DataType::Rate1Data,
            code => DataType::Unknown(code),
        }
    }

    pub const fn code(self) -> u8 {
        match self {
            DataType::PiHeader => 0,
            DataType::VoiceLcHeader => 1,
            DataType::TerminatorWithLc => 2,
            DataType::Csbk => 3,
            DataType::MbcHeader => 4,
            DataType::MbcContinuation => 5,
            DataType::DataHeader => 6,
            DataType::Rate12Data => 7,
            DataType::Rate34Data => 8,
            DataType::Idle => 9,
            DataType::Rate1Data => 10,
            DataType::Unknown(code) => code,
        }
    }
}

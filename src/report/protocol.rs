//! # Wire Protocol Constants and Types
//!
//! Core protocol definitions for the Joy-Con / Pro Controller HID report
//! family: report ids, sub-command selectors, enum tables and the structured
//! values the decoder produces.
//!
//! Every raw-byte-keyed table is represented as an exhaustive enum with an
//! explicit `Unrecognized(raw)` variant, produced by a total `from_raw`
//! mapping. Offsets and table values match captured device traffic; they are
//! protocol constants, not configuration.

/// Nintendo USB/Bluetooth vendor id
pub const NINTENDO_VENDOR_ID: u16 = 0x057E;

/// Joy-Con (L) product id
pub const JOYCON_L_PRODUCT_ID: u16 = 0x2006;

/// Joy-Con (R) product id
pub const JOYCON_R_PRODUCT_ID: u16 = 0x2007;

/// Pro Controller product id
pub const PRO_CON_PRODUCT_ID: u16 = 0x2009;

/// Output report: generic sub-command
pub const OUTPUT_REPORT_SUBCOMMAND: u8 = 0x01;

/// Output report: rumble only
pub const OUTPUT_REPORT_RUMBLE: u8 = 0x10;

/// Output report: co-processor command
pub const OUTPUT_REPORT_MCU: u8 = 0x11;

/// Input report: sub-command ack/reply
pub const INPUT_REPORT_REPLY: u8 = 0x21;

/// Input report: standard full state
pub const INPUT_REPORT_STANDARD: u8 = 0x30;

/// Input report: standard state + co-processor frame
pub const INPUT_REPORT_MCU: u8 = 0x31;

/// Input report: simple HID state
pub const INPUT_REPORT_SIMPLE_HID: u8 = 0x3F;

/// Sub-command: request device information
pub const SUBCMD_DEVICE_INFO: u8 = 0x02;

/// Sub-command: set input report mode
pub const SUBCMD_INPUT_MODE: u8 = 0x03;

/// Sub-command: read serial flash
pub const SUBCMD_SPI_FLASH_READ: u8 = 0x10;

/// Sub-command: configure co-processor
pub const SUBCMD_MCU_CONFIG: u8 = 0x21;

/// Sub-command: suspend/resume co-processor
pub const SUBCMD_MCU_STATE: u8 = 0x22;

/// Sub-command: enable/disable the IMU
pub const SUBCMD_ENABLE_IMU: u8 = 0x40;

/// Co-processor sub-payload length (sub-command byte + arguments, zero padded).
/// The CRC-8 is computed over exactly this many bytes.
pub const MCU_SUBPAYLOAD_LEN: usize = 35;

/// Co-processor sub-report id offset inside input report `0x31`
pub const MCU_SUB_REPORT_OFFSET: usize = 48;

/// Co-processor sub-report: empty frame
pub const MCU_REPORT_EMPTY: u8 = 0x00;

/// Co-processor sub-report: status frame
pub const MCU_REPORT_STATUS: u8 = 0x01;

/// Co-processor sub-report: NFC frame
pub const MCU_REPORT_NFC: u8 = 0x2A;

/// Co-processor sub-report: empty frame (alternate id)
pub const MCU_REPORT_EMPTY_FF: u8 = 0xFF;

/// Addressable serial flash size (512 KiB)
pub const SPI_FLASH_SIZE: u32 = 0x8_0000;

/// Maximum bytes a single flash-read request may transfer
pub const SPI_READ_CHUNK_MAX: u8 = 0x1D;

/// Neutral rumble pattern (both channels at rest)
pub const DEFAULT_RUMBLE: [u8; 8] = [0x00, 0x01, 0x40, 0x40, 0x00, 0x01, 0x40, 0x40];

/// Controller model reported in the device-info reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ControllerKind {
    /// Joy-Con (L)
    JoyConLeft,
    /// Joy-Con (R)
    JoyConRight,
    /// Pro Controller
    ProController,
    /// Value not in the device-info table
    Unrecognized(u8),
}

impl ControllerKind {
    /// Maps the raw device-info byte to a controller model.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::JoyConLeft,
            2 => Self::JoyConRight,
            3 => Self::ProController,
            other => Self::Unrecognized(other),
        }
    }

    /// Per-model accelerometer offsets (x, y, z) in raw sensor units.
    ///
    /// Unrecognized models decode with zero offsets.
    #[must_use]
    pub fn accel_offsets(&self) -> [i16; 3] {
        match self {
            Self::JoyConLeft => [350, 0, 4081],
            Self::JoyConRight => [350, 0, -4081],
            Self::ProController => [-688, 0, 4038],
            Self::Unrecognized(_) => [0, 0, 0],
        }
    }

    /// Whether this model carries the left-side button block.
    #[must_use]
    pub fn has_left_side(&self) -> bool {
        matches!(self, Self::JoyConLeft | Self::ProController)
    }

    /// Whether this model carries the right-side button block.
    #[must_use]
    pub fn has_right_side(&self) -> bool {
        matches!(self, Self::JoyConRight | Self::ProController)
    }

    /// Whether this model has the NFC/IR co-processor.
    #[must_use]
    pub fn has_mcu(&self) -> bool {
        matches!(self, Self::JoyConRight | Self::ProController)
    }
}

/// Input report mode selected with sub-command `0x03`
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputMode {
    /// Simple HID reports (`0x3F`)
    SimpleHid,
    /// Standard full reports (`0x30`)
    Standard,
    /// Standard reports with co-processor data (`0x31`)
    Mcu,
}

impl InputMode {
    /// The sub-command argument byte for this mode.
    #[must_use]
    pub fn byte(&self) -> u8 {
        match self {
            Self::SimpleHid => 0x3F,
            Self::Standard => 0x30,
            Self::Mcu => 0x31,
        }
    }
}

/// Co-processor operating mode selected with the CRC-protected configure command
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McuMode {
    /// NFC tag reader mode
    Nfc,
    /// IR camera mode
    Ir,
}

impl McuMode {
    /// The configuration argument byte for this mode.
    #[must_use]
    pub fn byte(&self) -> u8 {
        match self {
            Self::Nfc => 0x04,
            Self::Ir => 0x05,
        }
    }
}

/// Battery charge level (high nibble of status byte, charging bit masked off)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BatteryLevel {
    Full,
    Medium,
    Low,
    Critical,
    Empty,
    /// Level bits not in the table
    Unrecognized(u8),
}

impl BatteryLevel {
    /// Maps the level bits (charging bit already masked off) to a charge level.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            8 => Self::Full,
            6 => Self::Medium,
            4 => Self::Low,
            2 => Self::Critical,
            0 => Self::Empty,
            other => Self::Unrecognized(other),
        }
    }
}

/// Connection type (low nibble of the status byte)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionKind {
    /// Bluetooth Joy-Con
    JoyCon,
    /// Pro Controller or charging grip
    ProControllerOrGrip,
    /// Docked Switch / USB
    SwitchUsb,
    /// Value not in the table
    Unrecognized(u8),
}

impl ConnectionKind {
    /// Maps the raw connection nibble to a connection type.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0xE => Self::JoyCon,
            0x0 => Self::ProControllerOrGrip,
            0x1 => Self::SwitchUsb,
            other => Self::Unrecognized(other),
        }
    }
}

/// Co-processor state reported in the status frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum McuState {
    Standby,
    Background,
    NfcMode,
    IrMode,
    Initializing,
    Unrecognized(u8),
}

impl McuState {
    /// Maps the raw state byte to a co-processor state.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            1 => Self::Standby,
            2 => Self::Background,
            4 => Self::NfcMode,
            5 => Self::IrMode,
            6 => Self::Initializing,
            other => Self::Unrecognized(other),
        }
    }
}

/// NFC command result code
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NfcResult {
    Ok,
    FunctionError,
    ResetRequired,
    ReadError,
    WriteError,
    ArgumentError,
    TimeoutError,
    InvalidUidError,
    UnknownError,
    T2tPasswordInvalidTagError,
    VerifyError,
    ActivationError,
    InvalidTagError,
    InvalidFormatError,
    AuthenticationError,
    SequenceError,
    CommandTimeoutError,
    MifareError,
    Unrecognized(u8),
}

impl NfcResult {
    /// Maps the raw result byte to a result code.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::Ok,
            0x3C => Self::FunctionError,
            0x3D => Self::ResetRequired,
            0x3E => Self::ReadError,
            0x3F => Self::WriteError,
            0x40 => Self::ArgumentError,
            0x41 => Self::TimeoutError,
            0x42 => Self::InvalidUidError,
            0x43 => Self::UnknownError,
            0x44 => Self::T2tPasswordInvalidTagError,
            0x45 => Self::VerifyError,
            0x46 => Self::ActivationError,
            0x47 => Self::InvalidTagError,
            0x48 => Self::InvalidFormatError,
            0x49 => Self::AuthenticationError,
            0x4A => Self::SequenceError,
            0x4B => Self::CommandTimeoutError,
            0x4C => Self::MifareError,
            other => Self::Unrecognized(other),
        }
    }
}

/// NFC payload content type
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NfcInputType {
    StateInfo,
    NtagReadData,
    PassThroughData,
    MifareData,
    Unrecognized(u8),
}

impl NfcInputType {
    /// Maps the raw input-type byte to a content type.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0x05 => Self::StateInfo,
            0x07 => Self::NtagReadData,
            0x0A => Self::PassThroughData,
            0x10 => Self::MifareData,
            other => Self::Unrecognized(other),
        }
    }
}

/// NFC front-end IC state machine position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NfcIcState {
    WaitingForCmd,
    TagPolling,
    TagReading,
    TagWriting,
    TagReadFinished,
    TagWriteFinished,
    PassThroughSending,
    Error,
    NfcDeactivated,
    TagDetected,
    FactoryMode,
    Initializing,
    PassThroughFinished,
    ResetIsRequired,
    HardwareFatalError,
    MifareSending,
    MifareFinished,
    MifareKeyWriting,
    MifareKeyWritingFinished,
    Unrecognized(u8),
}

impl NfcIcState {
    /// Maps the raw IC-state byte to a state.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0x00 => Self::WaitingForCmd,
            0x01 => Self::TagPolling,
            0x02 => Self::TagReading,
            0x03 => Self::TagWriting,
            0x04 => Self::TagReadFinished,
            0x05 => Self::TagWriteFinished,
            0x06 => Self::PassThroughSending,
            0x07 => Self::Error,
            0x08 => Self::NfcDeactivated,
            0x09 => Self::TagDetected,
            0x0A => Self::FactoryMode,
            0x0B => Self::Initializing,
            0x0C => Self::PassThroughFinished,
            0x0D => Self::ResetIsRequired,
            0x0E => Self::HardwareFatalError,
            0x0F => Self::MifareSending,
            0x10 => Self::MifareFinished,
            0x11 => Self::MifareKeyWriting,
            0x12 => Self::MifareKeyWritingFinished,
            other => Self::Unrecognized(other),
        }
    }
}

/// Detected tag IC family
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NfcTagIc {
    Ntag,
    Felica,
    Mifare,
    Unrecognized(u8),
}

impl NfcTagIc {
    /// Maps the raw tag-IC byte to an IC family.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            2 => Self::Ntag,
            3 => Self::Felica,
            4 => Self::Mifare,
            other => Self::Unrecognized(other),
        }
    }
}

/// NFC modulation type of the detected tag
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NfcType {
    TypeA,
    TypeB,
    TypeF,
    Iso15693,
    Unrecognized(u8),
}

impl NfcType {
    /// Maps the raw NFC-type byte to a modulation type.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::TypeA,
            1 => Self::TypeB,
            2 => Self::TypeF,
            6 => Self::Iso15693,
            other => Self::Unrecognized(other),
        }
    }
}

/// Simple HID stick direction (4-bit hat code, 8 directions + centered)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StickDirection {
    Up,
    UpRight,
    Right,
    DownRight,
    Down,
    DownLeft,
    Left,
    UpLeft,
    Neutral,
    Unrecognized(u8),
}

/// Hat-code direction vectors (x, y), y grows downward, index = raw code
const STICK_HAT_VECTORS: [(i8, i8); 9] = [
    (0, -24),
    (15, -15),
    (24, 0),
    (15, 15),
    (0, 24),
    (-15, 15),
    (-24, 0),
    (-15, -15),
    (0, 0),
];

impl StickDirection {
    /// Maps the raw hat code to a direction.
    #[must_use]
    pub fn from_raw(raw: u8) -> Self {
        match raw {
            0 => Self::Up,
            1 => Self::UpRight,
            2 => Self::Right,
            3 => Self::DownRight,
            4 => Self::Down,
            5 => Self::DownLeft,
            6 => Self::Left,
            7 => Self::UpLeft,
            8 => Self::Neutral,
            other => Self::Unrecognized(other),
        }
    }

    /// Direction vector (x, y) from the fixed 9-entry table.
    ///
    /// Unrecognized codes map to the neutral vector.
    #[must_use]
    pub fn vector(&self) -> (i8, i8) {
        let index = match self {
            Self::Up => 0,
            Self::UpRight => 1,
            Self::Right => 2,
            Self::DownRight => 3,
            Self::Down => 4,
            Self::DownLeft => 5,
            Self::Left => 6,
            Self::UpLeft => 7,
            Self::Neutral | Self::Unrecognized(_) => 8,
        };
        STICK_HAT_VECTORS[index]
    }
}

/// Button state from the three standard-report bitfield bytes.
///
/// Named flags cover the full button set; the raw bytes are retained so
/// callers can inspect bits outside the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ButtonState {
    // Right side (byte 0)
    pub y: bool,
    pub x: bool,
    pub b: bool,
    pub a: bool,
    pub sr_right: bool,
    pub sl_right: bool,
    pub r: bool,
    pub zr: bool,

    // Shared (byte 1)
    pub minus: bool,
    pub plus: bool,
    pub stick_r: bool,
    pub stick_l: bool,
    pub home: bool,
    pub capture: bool,
    pub charging_grip: bool,

    // Left side (byte 2)
    pub down: bool,
    pub up: bool,
    pub right: bool,
    pub left: bool,
    pub sr_left: bool,
    pub sl_left: bool,
    pub l: bool,
    pub zl: bool,

    /// Raw bitfield bytes as they appeared on the wire
    pub raw: [u8; 3],
}

impl ButtonState {
    /// Decodes the three button bitfield bytes.
    #[must_use]
    pub fn from_bytes(raw: [u8; 3]) -> Self {
        Self {
            y: raw[0] & 0x01 != 0,
            x: raw[0] & 0x02 != 0,
            b: raw[0] & 0x04 != 0,
            a: raw[0] & 0x08 != 0,
            sr_right: raw[0] & 0x10 != 0,
            sl_right: raw[0] & 0x20 != 0,
            r: raw[0] & 0x40 != 0,
            zr: raw[0] & 0x80 != 0,

            minus: raw[1] & 0x01 != 0,
            plus: raw[1] & 0x02 != 0,
            stick_r: raw[1] & 0x04 != 0,
            stick_l: raw[1] & 0x08 != 0,
            home: raw[1] & 0x10 != 0,
            capture: raw[1] & 0x20 != 0,
            charging_grip: raw[1] & 0x80 != 0,

            down: raw[2] & 0x01 != 0,
            up: raw[2] & 0x02 != 0,
            right: raw[2] & 0x04 != 0,
            left: raw[2] & 0x08 != 0,
            sr_left: raw[2] & 0x10 != 0,
            sl_left: raw[2] & 0x20 != 0,
            l: raw[2] & 0x40 != 0,
            zl: raw[2] & 0x80 != 0,

            raw,
        }
    }

    /// Whether any button bit is set.
    #[must_use]
    pub fn any_pressed(&self) -> bool {
        self.raw.iter().any(|&b| b != 0)
    }
}

/// One analog stick decoded from its 3-byte packed field
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct StickPosition {
    /// Raw 12-bit horizontal value
    pub raw_x: u16,
    /// Raw 12-bit vertical value
    pub raw_y: u16,
    /// Calibrated horizontal deflection, -1.0 to 1.0
    pub x: f32,
    /// Calibrated vertical deflection, -1.0 to 1.0
    pub y: f32,
}

/// One time-shifted IMU capture (three land in every standard report)
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct ImuSample {
    /// Accelerometer (x, y, z) in g, offset-corrected, 1 decimal
    pub accel: [f32; 3],
    /// Gyroscope (x, y, z) in deg/s, 1 decimal
    pub gyro: [f32; 3],
}

/// The shared prefix of reports `0x21`, `0x30` and `0x31`:
/// timer through analog sticks.
#[derive(Debug, Clone, PartialEq)]
pub struct StandardFrame {
    /// Report timer byte, increments per report
    pub timer: u8,
    /// Battery charge level
    pub battery: BatteryLevel,
    /// Whether the battery is charging
    pub charging: bool,
    /// Connection type
    pub connection: ConnectionKind,
    /// All button flags
    pub buttons: ButtonState,
    /// Left analog stick
    pub left_stick: StickPosition,
    /// Right analog stick
    pub right_stick: StickPosition,
}

/// Full standard input report (`0x30`)
#[derive(Debug, Clone, PartialEq)]
pub struct StandardInput {
    /// Timer through sticks
    pub frame: StandardFrame,
    /// Three IMU captures, oldest first (0 ms, 5 ms, 10 ms)
    pub imu: [ImuSample; 3],
}

/// Device-information reply payload (sub-command `0x02`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceInfo {
    /// Firmware major version
    pub firmware_major: u8,
    /// Firmware minor version
    pub firmware_minor: u8,
    /// Controller model
    pub controller: ControllerKind,
    /// Bluetooth MAC address
    pub mac: [u8; 6],
    /// Whether calibration/colors come from flash rather than defaults
    pub calibration_in_flash: bool,
}

impl DeviceInfo {
    /// Colon-separated lowercase hex rendering of the MAC address.
    #[must_use]
    pub fn mac_string(&self) -> String {
        self.mac
            .iter()
            .map(|b| format!("{:02x}", b))
            .collect::<Vec<_>>()
            .join(":")
    }
}

/// Flash-read reply payload (sub-command `0x10`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FlashReadReply {
    /// Head address the device actually read from
    pub address: u32,
    /// Number of payload bytes
    pub length: u8,
    /// Payload bytes (up to [`SPI_READ_CHUNK_MAX`])
    pub data: Vec<u8>,
}

/// Decoded sub-command reply payload
#[derive(Debug, Clone, PartialEq)]
pub enum ReplyPayload {
    DeviceInfo(DeviceInfo),
    FlashRead(FlashReadReply),
    /// Replied sub-command id not in the table
    Unrecognized { sub_command: u8 },
}

/// Sub-command ack/reply report (`0x21`)
#[derive(Debug, Clone, PartialEq)]
pub struct SubCommandReply {
    /// Standard prefix carried by every reply
    pub frame: StandardFrame,
    /// Raw ack byte
    pub ack: u8,
    /// Reply payload keyed by the replied sub-command id
    pub payload: ReplyPayload,
}

/// Co-processor status frame payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct McuStatus {
    /// Co-processor firmware major version
    pub firmware_major: u16,
    /// Co-processor firmware minor version
    pub firmware_minor: u16,
    /// Co-processor state
    pub state: McuState,
}

/// A detected NFC tag
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfcTag {
    /// Tag IC family
    pub ic: NfcTagIc,
    /// Modulation type
    pub kind: NfcType,
    /// Tag UID / IDm bytes
    pub uid: Vec<u8>,
}

impl NfcTag {
    /// Lowercase hex rendering of the UID.
    #[must_use]
    pub fn uid_hex(&self) -> String {
        self.uid.iter().map(|b| format!("{:02x}", b)).collect()
    }
}

/// NFC state frame payload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NfcStatus {
    /// Command result code
    pub result: NfcResult,
    /// Payload content type
    pub input_type: NfcInputType,
    /// Front-end IC state
    pub ic_state: NfcIcState,
    /// Detected tag, when present
    pub tag: Option<NfcTag>,
}

/// Co-processor frame embedded in input report `0x31`
#[derive(Debug, Clone, PartialEq)]
pub enum McuFrame {
    /// Empty frame (ids `0x00` and `0xFF`)
    Empty,
    Status(McuStatus),
    Nfc(NfcStatus),
    /// Sub-report id not in the table
    Unrecognized { sub_id: u8 },
}

/// Simple HID left-side buttons (`0x3F`, bytes 0-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimpleHidButtonsLeft {
    pub down: bool,
    pub right: bool,
    pub left: bool,
    pub up: bool,
    pub sl: bool,
    pub sr: bool,
    pub minus: bool,
    pub stick: bool,
    pub capture: bool,
    pub l: bool,
    pub zl: bool,
}

impl SimpleHidButtonsLeft {
    /// Decodes the two left-side button bytes.
    #[must_use]
    pub fn from_bytes(raw: [u8; 2]) -> Self {
        Self {
            down: raw[0] & 0x01 != 0,
            right: raw[0] & 0x02 != 0,
            left: raw[0] & 0x04 != 0,
            up: raw[0] & 0x08 != 0,
            sl: raw[0] & 0x10 != 0,
            sr: raw[0] & 0x20 != 0,
            minus: raw[1] & 0x01 != 0,
            stick: raw[1] & 0x04 != 0,
            capture: raw[1] & 0x20 != 0,
            l: raw[1] & 0x40 != 0,
            zl: raw[1] & 0x80 != 0,
        }
    }
}

/// Simple HID right-side buttons (`0x3F`, bytes 0-1)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct SimpleHidButtonsRight {
    pub a: bool,
    pub x: bool,
    pub b: bool,
    pub y: bool,
    pub sl: bool,
    pub sr: bool,
    pub plus: bool,
    pub stick: bool,
    pub home: bool,
    pub r: bool,
    pub zr: bool,
}

impl SimpleHidButtonsRight {
    /// Decodes the two right-side button bytes.
    #[must_use]
    pub fn from_bytes(raw: [u8; 2]) -> Self {
        Self {
            a: raw[0] & 0x01 != 0,
            x: raw[0] & 0x02 != 0,
            b: raw[0] & 0x04 != 0,
            y: raw[0] & 0x08 != 0,
            sl: raw[0] & 0x10 != 0,
            sr: raw[0] & 0x20 != 0,
            plus: raw[1] & 0x02 != 0,
            stick: raw[1] & 0x08 != 0,
            home: raw[1] & 0x10 != 0,
            r: raw[1] & 0x40 != 0,
            zr: raw[1] & 0x80 != 0,
        }
    }
}

/// Simple HID input report (`0x3F`)
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SimpleHidInput {
    /// Left-side buttons when the model carries that side
    pub left: Option<SimpleHidButtonsLeft>,
    /// Right-side buttons when the model carries that side
    pub right: Option<SimpleHidButtonsRight>,
    /// Stick hat direction
    pub stick: StickDirection,
}

/// One decoded input report of any shape
#[derive(Debug, Clone, PartialEq)]
pub enum InputReport {
    SubCommandReply(SubCommandReply),
    Standard(StandardInput),
    Mcu(McuFrame),
    SimpleHid(SimpleHidInput),
    /// Report id not in the table
    Unrecognized { report_id: u8 },
    /// Known report id but a buffer too short for its layout
    Truncated { report_id: u8, length: usize },
}

//! # Error Types
//!
//! Custom error types for Joy-Con Probe using `thiserror`.

use thiserror::Error;

/// Main error type for Joy-Con Probe
#[derive(Debug, Error)]
pub enum JoyconProbeError {
    /// Transport errors (device absent, closed, or the write failed)
    #[error("transport error: {0}")]
    Transport(String),

    /// Wire protocol framing errors
    #[error("protocol error: {0}")]
    Protocol(String),

    /// A rumble parameter outside the encodable range
    #[error("rumble parameter out of range: {0}")]
    OutOfRange(String),

    /// A flash-read sub-request exhausted its poll budget
    #[error("no reply for flash read at 0x{address:05x} ({length} bytes)")]
    NoReply { address: u32, length: u8 },

    /// A dump campaign was started while another one is active
    #[error("flash dump already in progress")]
    DumpInProgress,

    /// The active dump campaign was cancelled by the caller
    #[error("flash dump aborted")]
    DumpAborted,

    /// A dump campaign outside the addressable flash range
    #[error("flash range 0x{start:05x}+0x{length:x} out of bounds")]
    FlashRange { start: u32, length: u32 },

    /// Configuration errors
    #[error("configuration error: {0}")]
    Config(#[from] toml::de::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type alias for Joy-Con Probe
pub type Result<T> = std::result::Result<T, JoyconProbeError>;

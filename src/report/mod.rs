//! # Report Protocol Module
//!
//! Implementation of the controller's framed report protocol.
//!
//! This module handles:
//! - Output report framing (sub-command, rumble-only, co-processor shapes)
//! - Input report decoding (buttons, sticks, IMU, device info, NFC, flash)
//! - CRC-8 checksums for the co-processor sub-protocol
//! - Rumble frequency/amplitude encoding
//! - Bit-packed calibration unpacking

pub mod calibration;
pub mod crc;
pub mod decoder;
pub mod encoder;
pub mod protocol;
pub mod rumble;

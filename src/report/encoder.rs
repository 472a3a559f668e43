//! # Output Report Builder
//!
//! Assembles the three output-report shapes into transport-ready byte
//! buffers. The report id travels separately (the HID transport takes it as
//! its own parameter), so builders produce the payload that follows it.
//!
//! Co-processor reports carry a fixed-size sub-payload: the co-processor
//! sub-command byte plus arguments, zero-padded to exactly 35 bytes. The
//! CRC-8 is computed over those 35 bytes and appended; the CRC byte is never
//! part of its own input.

use super::crc::crc8;
use super::protocol::MCU_SUBPAYLOAD_LEN;
use crate::error::{JoyconProbeError, Result};

/// Generates the wrapping frame-sequence number every output report carries.
///
/// The device treats out-of-order sequence numbers as a desynchronization
/// signal, so exactly one value must be consumed per transmitted report.
/// One sequencer exists per connected device, owned by its session.
///
/// # Examples
///
/// ```
/// use joycon_probe::report::encoder::PacketSequencer;
///
/// let mut seq = PacketSequencer::new();
/// assert_eq!(seq.next(), 0);
/// assert_eq!(seq.next(), 1);
/// ```
#[derive(Debug, Default)]
pub struct PacketSequencer {
    counter: u8,
}

impl PacketSequencer {
    /// Creates a sequencer starting at 0.
    #[must_use]
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    /// Returns the next sequence number, wrapping from 15 back to 0.
    #[allow(clippy::should_implement_trait)]
    pub fn next(&mut self) -> u8 {
        let value = self.counter;
        self.counter = (self.counter + 1) & 0x0F;
        value
    }
}

/// Builds the payload of a generic sub-command report (`0x01`).
///
/// Layout: `[seq, rumble(8), sub_command, args...]`
///
/// # Examples
///
/// ```
/// use joycon_probe::report::encoder::build_subcommand_report;
/// use joycon_probe::report::protocol::DEFAULT_RUMBLE;
///
/// let buf = build_subcommand_report(5, &DEFAULT_RUMBLE, 0x30, &[0x01]);
/// assert_eq!(buf.len(), 11);
/// assert_eq!(buf[0], 5);
/// ```
#[must_use]
pub fn build_subcommand_report(
    seq: u8,
    rumble: &[u8; 8],
    sub_command: u8,
    args: &[u8],
) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + 8 + 1 + args.len());
    buf.push(seq);
    buf.extend_from_slice(rumble);
    buf.push(sub_command);
    buf.extend_from_slice(args);
    buf
}

/// Builds the payload of a rumble-only report (`0x10`).
///
/// Layout: `[seq, rumble(8)]`
#[must_use]
pub fn build_rumble_report(seq: u8, rumble: &[u8; 8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(1 + 8);
    buf.push(seq);
    buf.extend_from_slice(rumble);
    buf
}

/// The zero-padded 35-byte co-processor sub-payload.
fn mcu_subpayload(mcu_sub_command: u8, args: &[u8]) -> Result<[u8; MCU_SUBPAYLOAD_LEN]> {
    if args.len() > MCU_SUBPAYLOAD_LEN - 1 {
        return Err(JoyconProbeError::Protocol(format!(
            "co-processor arguments ({} bytes) exceed sub-payload capacity ({})",
            args.len(),
            MCU_SUBPAYLOAD_LEN - 1
        )));
    }

    let mut subpayload = [0u8; MCU_SUBPAYLOAD_LEN];
    subpayload[0] = mcu_sub_command;
    subpayload[1..1 + args.len()].copy_from_slice(args);
    Ok(subpayload)
}

/// Builds the payload of a CRC-protected co-processor sub-command report
/// (report id `0x01`).
///
/// Layout: `[seq, rumble(8), sub_command, mcu_command, subpayload(35), crc8]`
///
/// # Errors
///
/// `Protocol` when the arguments do not fit the 35-byte sub-payload.
pub fn build_mcu_subcommand_report(
    seq: u8,
    rumble: &[u8; 8],
    sub_command: u8,
    mcu_command: u8,
    mcu_sub_command: u8,
    args: &[u8],
) -> Result<Vec<u8>> {
    let subpayload = mcu_subpayload(mcu_sub_command, args)?;

    let mut buf = Vec::with_capacity(1 + 8 + 2 + MCU_SUBPAYLOAD_LEN + 1);
    buf.push(seq);
    buf.extend_from_slice(rumble);
    buf.push(sub_command);
    buf.push(mcu_command);
    buf.extend_from_slice(&subpayload);
    buf.push(crc8(&subpayload));
    Ok(buf)
}

/// Builds the payload of a CRC-protected co-processor command report
/// (report id `0x11`).
///
/// Layout: `[seq, rumble(8), mcu_command, subpayload(35), crc8]`
///
/// # Errors
///
/// `Protocol` when the arguments do not fit the 35-byte sub-payload.
pub fn build_mcu_command_report(
    seq: u8,
    rumble: &[u8; 8],
    mcu_command: u8,
    mcu_sub_command: u8,
    args: &[u8],
) -> Result<Vec<u8>> {
    let subpayload = mcu_subpayload(mcu_sub_command, args)?;

    let mut buf = Vec::with_capacity(1 + 8 + 1 + MCU_SUBPAYLOAD_LEN + 1);
    buf.push(seq);
    buf.extend_from_slice(rumble);
    buf.push(mcu_command);
    buf.extend_from_slice(&subpayload);
    buf.push(crc8(&subpayload));
    Ok(buf)
}

//! # Emulated Controller
//!
//! An in-process device side for exercising the codec without hardware.
//! Implements [`ReportSink`] and answers output reports the way the real
//! firmware does: sub-command acks with the standard reply prefix, device
//! information, and flash reads served from a synthetic 512 KiB image that
//! carries a serial number, factory calibration and colors at the real
//! addresses.
//!
//! Input reports are pushed through an unbounded channel, mirroring the
//! push-based delivery of a real HID transport. The binary drives its
//! diagnostic run against this emulator; the end-to-end dump tests use it as
//! the simulated device.

use async_trait::async_trait;
use std::io;
use tokio::sync::mpsc;
use tracing::{debug, warn};

use super::transport::ReportSink;
use crate::report::crc::crc8;
use crate::report::protocol::*;

/// Channel end the emulator pushes `(report_id, payload)` pairs into
pub type InputReportReceiver = mpsc::UnboundedReceiver<(u8, Vec<u8>)>;

/// Emulated device firmware version
const EMULATED_FIRMWARE: [u8; 2] = [3, 72];

/// Emulated Bluetooth MAC address
const EMULATED_MAC: [u8; 6] = [0x98, 0xB6, 0xE9, 0x46, 0x50, 0x6A];

/// Builds the synthetic flash image the emulator serves reads from.
fn synthetic_flash() -> Vec<u8> {
    let mut flash = vec![0u8; SPI_FLASH_SIZE as usize];

    // Pairing data: paired-host MAC + link key placeholder
    flash[0x2000..0x2006].copy_from_slice(&[0x7C, 0xBB, 0x8A, 0x01, 0x02, 0x03]);
    flash[0x2006..0x2016].copy_from_slice(&[0x5A; 16]);

    // Serial number
    flash[0x6000..0x6010].copy_from_slice(b"XBW00017B0C19345");

    // Factory IMU calibration
    flash[0x6020..0x6038].copy_from_slice(&[
        0xBE, 0xFF, 0x3E, 0x00, 0xF0, 0x01, 0x00, 0x40, 0x00, 0x40, 0x00, 0x40,
        0xFE, 0xFF, 0xFE, 0xFF, 0x08, 0x00, 0xE7, 0x3B, 0xE7, 0x3B, 0xE7, 0x3B,
    ]);

    // Factory stick calibration, left then right (9 bytes each)
    flash[0x603D..0x6046]
        .copy_from_slice(&[0x00, 0x07, 0x70, 0x00, 0x08, 0x80, 0x00, 0x07, 0x70]);
    flash[0x6046..0x604F]
        .copy_from_slice(&[0x00, 0x07, 0x70, 0x00, 0x08, 0x80, 0x00, 0x07, 0x70]);

    // Body / button colors
    flash[0x6050..0x605D].copy_from_slice(&[
        0x32, 0x32, 0x32, 0xFF, 0xFF, 0xFF, 0x32, 0x32, 0x32, 0xFF, 0xFF, 0xFF, 0x03,
    ]);

    flash
}

/// In-process emulated controller.
///
/// # Examples
///
/// ```
/// use joycon_probe::hid::emulator::EmulatedJoyCon;
/// use joycon_probe::report::protocol::ControllerKind;
///
/// let (device, _reports) = EmulatedJoyCon::new(ControllerKind::ProController);
/// assert_eq!(device.flash().len(), 0x8_0000);
/// ```
pub struct EmulatedJoyCon {
    model: ControllerKind,
    flash: Vec<u8>,
    timer: u8,
    respond_to_flash_reads: bool,
    input_tx: mpsc::UnboundedSender<(u8, Vec<u8>)>,
}

impl EmulatedJoyCon {
    /// Creates an emulated controller and the input-report channel it
    /// delivers on.
    #[must_use]
    pub fn new(model: ControllerKind) -> (Self, InputReportReceiver) {
        let (input_tx, input_rx) = mpsc::unbounded_channel();
        (
            Self {
                model,
                flash: synthetic_flash(),
                timer: 0,
                respond_to_flash_reads: true,
                input_tx,
            },
            input_rx,
        )
    }

    /// The emulator's flash image (tests compare dumps against this).
    #[must_use]
    pub fn flash(&self) -> &[u8] {
        &self.flash
    }

    /// When false, flash-read requests are swallowed so timeout paths can be
    /// exercised.
    pub fn set_respond_to_flash_reads(&mut self, respond: bool) {
        self.respond_to_flash_reads = respond;
    }

    fn next_timer(&mut self) -> u8 {
        self.timer = self.timer.wrapping_add(1);
        self.timer
    }

    fn model_byte(&self) -> u8 {
        match self.model {
            ControllerKind::JoyConLeft => 1,
            ControllerKind::JoyConRight => 2,
            ControllerKind::ProController => 3,
            ControllerKind::Unrecognized(raw) => raw,
        }
    }

    fn push(&self, report_id: u8, payload: Vec<u8>) -> io::Result<()> {
        self.input_tx
            .send((report_id, payload))
            .map_err(|_| io::Error::new(io::ErrorKind::BrokenPipe, "input channel closed"))
    }

    /// Builds a `0x21` reply: standard prefix, ack, replied sub-command id,
    /// payload from offset 14.
    fn push_reply(&mut self, ack: u8, sub_command: u8, data: &[u8]) -> io::Result<()> {
        let mut reply = vec![0u8; 49];
        reply[0] = self.next_timer();
        reply[1] = 0x8E; // full battery, Joy-Con connection

        // Sticks at rest
        reply[5..8].copy_from_slice(&[0x9F, 0x07, 0x8A]);
        reply[8..11].copy_from_slice(&[0xA0, 0xF8, 0x79]);

        reply[12] = ack;
        reply[13] = sub_command;

        let copy_len = data.len().min(reply.len() - 14);
        reply[14..14 + copy_len].copy_from_slice(&data[..copy_len]);

        self.push(INPUT_REPORT_REPLY, reply)
    }

    /// Builds a `0x31` co-processor status frame.
    fn push_mcu_status(&mut self, state: u8) -> io::Result<()> {
        let mut frame = vec![0u8; 64];
        frame[0] = self.next_timer();
        frame[1] = 0x8E;
        frame[MCU_SUB_REPORT_OFFSET] = MCU_REPORT_STATUS;
        frame[51..53].copy_from_slice(&u16::from(EMULATED_FIRMWARE[0]).to_be_bytes());
        frame[53..55].copy_from_slice(&u16::from(EMULATED_FIRMWARE[1]).to_be_bytes());
        frame[55] = state;
        self.push(INPUT_REPORT_MCU, frame)
    }

    /// Builds a `0x31` NFC frame reporting an idle polling state.
    fn push_nfc_polling(&mut self) -> io::Result<()> {
        let mut frame = vec![0u8; 64];
        frame[0] = self.next_timer();
        frame[1] = 0x8E;
        frame[MCU_SUB_REPORT_OFFSET] = MCU_REPORT_NFC;
        frame[49] = 0x00; // result Ok
        frame[50] = 0x05; // state info
        frame[55] = 0x01; // tag polling
        self.push(INPUT_REPORT_MCU, frame)
    }

    /// Handles one generic sub-command and replies like the firmware would.
    fn handle_subcommand(&mut self, sub_command: u8, args: &[u8]) -> io::Result<()> {
        match sub_command {
            SUBCMD_DEVICE_INFO => {
                // fw(2) + model + MAC(6) + pad + calibration-source flag
                let mut data = vec![
                    EMULATED_FIRMWARE[0],
                    EMULATED_FIRMWARE[1],
                    self.model_byte(),
                ];
                data.extend_from_slice(&EMULATED_MAC);
                data.push(0x01);
                data.push(0x01); // colors/calibration in flash
                self.push_reply(0x82, sub_command, &data)
            }
            SUBCMD_SPI_FLASH_READ => {
                if args.len() < 5 {
                    warn!("flash read request with short arguments");
                    return self.push_reply(0x80, sub_command, &[]);
                }
                if !self.respond_to_flash_reads {
                    debug!("swallowing flash read request");
                    return Ok(());
                }
                let address =
                    u32::from_le_bytes([args[0], args[1], args[2], args[3]]);
                let length = args[4];

                let mut data = args[..5].to_vec();
                let start = (address as usize).min(self.flash.len());
                let end = (start + usize::from(length)).min(self.flash.len());
                data.extend_from_slice(&self.flash[start..end]);
                data.resize(5 + usize::from(length), 0);
                self.push_reply(0x90, sub_command, &data)
            }
            SUBCMD_MCU_CONFIG => {
                self.push_reply(0xA0, sub_command, &[0x01, 0x00, 0xFF, 0x00, 0x03, 0x00, 0x05, 0x01])
            }
            SUBCMD_INPUT_MODE | SUBCMD_MCU_STATE | SUBCMD_ENABLE_IMU => {
                self.push_reply(0x80, sub_command, &[])
            }
            other => {
                debug!("emulator: unknown sub-command 0x{:02x}", other);
                self.push_reply(0x80, other, &[])
            }
        }
    }

    /// Handles one co-processor command carried by report `0x11`.
    fn handle_mcu_command(&mut self, mcu_command: u8) -> io::Result<()> {
        match mcu_command {
            0x01 => self.push_mcu_status(0x01), // standby
            0x02 => self.push_nfc_polling(),
            other => {
                debug!("emulator: unknown co-processor command 0x{:02x}", other);
                Ok(())
            }
        }
    }

    /// Verifies the CRC tail of a co-processor report. Mismatches are logged
    /// and the report still processed, matching the probe's own tolerance.
    fn check_mcu_crc(&self, subpayload: &[u8], received: u8) {
        let expected = crc8(subpayload);
        if expected != received {
            warn!(
                "co-processor CRC mismatch: expected 0x{:02x}, got 0x{:02x}",
                expected, received
            );
        }
    }
}

#[async_trait]
impl ReportSink for EmulatedJoyCon {
    async fn send_report(&mut self, report_id: u8, payload: &[u8]) -> io::Result<()> {
        // Every output shape starts with seq + 8 rumble bytes
        if payload.len() < 9 {
            warn!("emulator: output report 0x{:02x} too short", report_id);
            return Ok(());
        }

        match report_id {
            OUTPUT_REPORT_SUBCOMMAND => {
                if payload.len() < 10 {
                    return Ok(());
                }
                let sub_command = payload[9];
                if sub_command == SUBCMD_MCU_CONFIG
                    && payload.len() == 1 + 8 + 2 + MCU_SUBPAYLOAD_LEN + 1
                {
                    self.check_mcu_crc(
                        &payload[11..11 + MCU_SUBPAYLOAD_LEN],
                        payload[11 + MCU_SUBPAYLOAD_LEN],
                    );
                }
                self.handle_subcommand(sub_command, &payload[10..])
            }
            OUTPUT_REPORT_RUMBLE => Ok(()), // haptics only, nothing to answer
            OUTPUT_REPORT_MCU => {
                let mcu_command = payload[9];
                if payload.len() == 1 + 8 + 1 + MCU_SUBPAYLOAD_LEN + 1 {
                    self.check_mcu_crc(
                        &payload[10..10 + MCU_SUBPAYLOAD_LEN],
                        payload[10 + MCU_SUBPAYLOAD_LEN],
                    );
                }
                self.handle_mcu_command(mcu_command)
            }
            other => {
                debug!("emulator: ignoring output report 0x{:02x}", other);
                Ok(())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::decoder::InputReportDecoder;
    use crate::report::encoder::build_subcommand_report;

    #[tokio::test]
    async fn test_device_info_round_trip() {
        let (mut device, mut reports) = EmulatedJoyCon::new(ControllerKind::ProController);

        let request = build_subcommand_report(0, &DEFAULT_RUMBLE, SUBCMD_DEVICE_INFO, &[0x00]);
        device
            .send_report(OUTPUT_REPORT_SUBCOMMAND, &request)
            .await
            .unwrap();

        let (report_id, payload) = reports.recv().await.unwrap();
        assert_eq!(report_id, INPUT_REPORT_REPLY);

        let decoder = InputReportDecoder::new(ControllerKind::ProController);
        let InputReport::SubCommandReply(reply) = decoder.decode(report_id, &payload) else {
            panic!("expected reply");
        };
        assert_eq!(reply.ack, 0x82);
        let ReplyPayload::DeviceInfo(info) = reply.payload else {
            panic!("expected device info");
        };
        assert_eq!(info.controller, ControllerKind::ProController);
        assert_eq!(info.firmware_major, 3);
        assert!(info.calibration_in_flash);
    }

    #[tokio::test]
    async fn test_flash_read_round_trip() {
        let (mut device, mut reports) = EmulatedJoyCon::new(ControllerKind::JoyConRight);

        let mut args = 0x6000u32.to_le_bytes().to_vec();
        args.push(0x10);
        let request =
            build_subcommand_report(1, &DEFAULT_RUMBLE, SUBCMD_SPI_FLASH_READ, &args);
        device
            .send_report(OUTPUT_REPORT_SUBCOMMAND, &request)
            .await
            .unwrap();

        let (report_id, payload) = reports.recv().await.unwrap();
        let decoder = InputReportDecoder::new(ControllerKind::JoyConRight);
        let InputReport::SubCommandReply(reply) = decoder.decode(report_id, &payload) else {
            panic!("expected reply");
        };
        let ReplyPayload::FlashRead(read) = reply.payload else {
            panic!("expected flash read");
        };
        assert_eq!(read.address, 0x6000);
        assert_eq!(read.length, 0x10);
        assert_eq!(read.data, b"XBW00017B0C19345");
    }

    #[tokio::test]
    async fn test_flash_read_clamped_at_flash_end() {
        let (mut device, mut reports) = EmulatedJoyCon::new(ControllerKind::JoyConRight);

        let mut args = (SPI_FLASH_SIZE - 4).to_le_bytes().to_vec();
        args.push(0x10);
        let request =
            build_subcommand_report(2, &DEFAULT_RUMBLE, SUBCMD_SPI_FLASH_READ, &args);
        device
            .send_report(OUTPUT_REPORT_SUBCOMMAND, &request)
            .await
            .unwrap();

        let (report_id, payload) = reports.recv().await.unwrap();
        let decoder = InputReportDecoder::new(ControllerKind::JoyConRight);
        let InputReport::SubCommandReply(reply) = decoder.decode(report_id, &payload) else {
            panic!("expected reply");
        };
        // Reply still carries the requested length, zero-filled past the end
        let ReplyPayload::FlashRead(read) = reply.payload else {
            panic!("expected flash read");
        };
        assert_eq!(read.length, 0x10);
        assert_eq!(read.data.len(), 0x10);
    }

    #[tokio::test]
    async fn test_swallowed_flash_reads() {
        let (mut device, mut reports) = EmulatedJoyCon::new(ControllerKind::JoyConRight);
        device.set_respond_to_flash_reads(false);

        let mut args = 0x6000u32.to_le_bytes().to_vec();
        args.push(0x10);
        let request =
            build_subcommand_report(3, &DEFAULT_RUMBLE, SUBCMD_SPI_FLASH_READ, &args);
        device
            .send_report(OUTPUT_REPORT_SUBCOMMAND, &request)
            .await
            .unwrap();

        assert!(reports.try_recv().is_err(), "no reply expected");
    }

    #[tokio::test]
    async fn test_mcu_status_round_trip() {
        let (mut device, mut reports) = EmulatedJoyCon::new(ControllerKind::JoyConRight);

        let request = crate::report::encoder::build_mcu_command_report(
            0,
            &DEFAULT_RUMBLE,
            0x01,
            0x00,
            &[],
        )
        .unwrap();
        device
            .send_report(OUTPUT_REPORT_MCU, &request)
            .await
            .unwrap();

        let (report_id, payload) = reports.recv().await.unwrap();
        assert_eq!(report_id, INPUT_REPORT_MCU);

        let decoder = InputReportDecoder::new(ControllerKind::JoyConRight);
        let InputReport::Mcu(McuFrame::Status(status)) = decoder.decode(report_id, &payload)
        else {
            panic!("expected status frame");
        };
        assert_eq!(status.firmware_major, 3);
        assert_eq!(status.firmware_minor, 72);
        assert_eq!(status.state, McuState::Standby);
    }
}

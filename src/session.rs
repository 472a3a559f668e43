//! # Device Session
//!
//! One [`DeviceSession`] exists per connected controller. It owns the
//! output-report sink and the packet sequencer, so the wrapping sequence
//! number can never be shared across devices or skipped: every high-level
//! operation consumes exactly one sequencer value and submits exactly one
//! report.
//!
//! The operations mirror the diagnostic surface of the wire protocol:
//! device information, input-mode switching, IMU enable, co-processor
//! control, NFC polling, flash reads and rumble.

use tracing::debug;

use crate::error::{JoyconProbeError, Result};
use crate::hid::ReportSink;
use crate::report::encoder::{
    build_mcu_command_report, build_mcu_subcommand_report, build_rumble_report,
    build_subcommand_report, PacketSequencer,
};
use crate::report::protocol::*;
use crate::report::rumble::RumbleCommand;

/// Session state for one connected controller.
///
/// # Examples
///
/// ```no_run
/// use joycon_probe::hid::EmulatedJoyCon;
/// use joycon_probe::report::protocol::ControllerKind;
/// use joycon_probe::session::DeviceSession;
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// let (device, _reports) = EmulatedJoyCon::new(ControllerKind::ProController);
/// let mut session = DeviceSession::new(device, ControllerKind::ProController);
/// session.request_device_info().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct DeviceSession<S: ReportSink> {
    sink: S,
    sequencer: PacketSequencer,
    model: ControllerKind,
}

impl<S: ReportSink> DeviceSession<S> {
    /// Creates a session over an opened report sink.
    pub fn new(sink: S, model: ControllerKind) -> Self {
        Self {
            sink,
            sequencer: PacketSequencer::new(),
            model,
        }
    }

    /// The controller model this session talks to.
    #[must_use]
    pub fn model(&self) -> ControllerKind {
        self.model
    }

    /// Updates the model once a device-info reply identified the hardware.
    pub fn set_model(&mut self, model: ControllerKind) {
        self.model = model;
    }

    async fn submit(&mut self, report_id: u8, payload: &[u8]) -> Result<()> {
        self.sink
            .send_report(report_id, payload)
            .await
            .map_err(|e| {
                JoyconProbeError::Transport(format!(
                    "failed to send report 0x{:02x}: {}",
                    report_id, e
                ))
            })?;
        debug!("sent output report 0x{:02x} ({} bytes)", report_id, payload.len());
        Ok(())
    }

    /// Requests the device-information reply (sub-command `0x02`).
    pub async fn request_device_info(&mut self) -> Result<()> {
        let seq = self.sequencer.next();
        let buf = build_subcommand_report(seq, &DEFAULT_RUMBLE, SUBCMD_DEVICE_INFO, &[0x00]);
        self.submit(OUTPUT_REPORT_SUBCOMMAND, &buf).await
    }

    /// Switches the input report mode (sub-command `0x03`).
    pub async fn set_input_mode(&mut self, mode: InputMode) -> Result<()> {
        let seq = self.sequencer.next();
        let buf =
            build_subcommand_report(seq, &DEFAULT_RUMBLE, SUBCMD_INPUT_MODE, &[mode.byte()]);
        self.submit(OUTPUT_REPORT_SUBCOMMAND, &buf).await
    }

    /// Enables or disables the IMU (sub-command `0x40`).
    pub async fn set_imu_enabled(&mut self, enabled: bool) -> Result<()> {
        let seq = self.sequencer.next();
        let buf = build_subcommand_report(
            seq,
            &DEFAULT_RUMBLE,
            SUBCMD_ENABLE_IMU,
            &[u8::from(enabled)],
        );
        self.submit(OUTPUT_REPORT_SUBCOMMAND, &buf).await
    }

    /// Suspends or resumes the co-processor (sub-command `0x22`).
    pub async fn set_mcu_suspended(&mut self, suspended: bool) -> Result<()> {
        let seq = self.sequencer.next();
        let buf = build_subcommand_report(
            seq,
            &DEFAULT_RUMBLE,
            SUBCMD_MCU_STATE,
            &[u8::from(!suspended)],
        );
        self.submit(OUTPUT_REPORT_SUBCOMMAND, &buf).await
    }

    /// Requests a co-processor status frame (command `0x01` on report `0x11`).
    pub async fn request_mcu_state(&mut self) -> Result<()> {
        let seq = self.sequencer.next();
        let buf = build_mcu_command_report(seq, &DEFAULT_RUMBLE, 0x01, 0x00, &[])?;
        self.submit(OUTPUT_REPORT_MCU, &buf).await
    }

    /// Puts the co-processor into NFC or IR mode (CRC-protected sub-command
    /// `0x21`).
    pub async fn configure_mcu(&mut self, mode: McuMode) -> Result<()> {
        let seq = self.sequencer.next();
        let buf = build_mcu_subcommand_report(
            seq,
            &DEFAULT_RUMBLE,
            SUBCMD_MCU_CONFIG,
            0x21,
            0x00,
            &[mode.byte()],
        )?;
        self.submit(OUTPUT_REPORT_SUBCOMMAND, &buf).await
    }

    /// Starts NFC tag polling (co-processor command `0x02`/`0x01`).
    pub async fn start_nfc_polling(&mut self) -> Result<()> {
        let seq = self.sequencer.next();
        let buf = build_mcu_command_report(
            seq,
            &DEFAULT_RUMBLE,
            0x02,
            0x01,
            &[0x00, 0x00, 0x08, 0x05, 0x00, 0xFF, 0xFF, 0x00, 0x01],
        )?;
        self.submit(OUTPUT_REPORT_MCU, &buf).await
    }

    /// Stops NFC tag polling (co-processor command `0x02`/`0x02`).
    pub async fn stop_nfc_polling(&mut self) -> Result<()> {
        let seq = self.sequencer.next();
        let buf = build_mcu_command_report(
            seq,
            &DEFAULT_RUMBLE,
            0x02,
            0x02,
            &[0x00, 0x00, 0x08, 0x00],
        )?;
        self.submit(OUTPUT_REPORT_MCU, &buf).await
    }

    /// Requests one bounded flash read (sub-command `0x10`).
    ///
    /// # Errors
    ///
    /// `FlashRange` when the request exceeds the per-transfer limit or the
    /// addressable flash range.
    pub async fn request_flash_read(&mut self, address: u32, length: u8) -> Result<()> {
        if length > SPI_READ_CHUNK_MAX
            || u64::from(address) + u64::from(length) > u64::from(SPI_FLASH_SIZE)
        {
            return Err(JoyconProbeError::FlashRange {
                start: address,
                length: u32::from(length),
            });
        }

        let mut args = address.to_le_bytes().to_vec();
        args.push(length);

        let seq = self.sequencer.next();
        let buf = build_subcommand_report(seq, &DEFAULT_RUMBLE, SUBCMD_SPI_FLASH_READ, &args);
        self.submit(OUTPUT_REPORT_SUBCOMMAND, &buf).await
    }

    /// Sends one rumble command (report `0x10`).
    ///
    /// # Errors
    ///
    /// `OutOfRange` when any channel parameter violates its band limits;
    /// nothing is sent in that case.
    pub async fn send_rumble(&mut self, command: &RumbleCommand) -> Result<()> {
        let block = command.encode()?;
        let seq = self.sequencer.next();
        let buf = build_rumble_report(seq, &block);
        self.submit(OUTPUT_REPORT_RUMBLE, &buf).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::transport::mocks::MockReportSink;

    fn session(sink: MockReportSink) -> DeviceSession<MockReportSink> {
        DeviceSession::new(sink, ControllerKind::ProController)
    }

    #[tokio::test]
    async fn test_device_info_report_bytes() {
        let sink = MockReportSink::new();
        let mut session = session(sink.clone());

        session.request_device_info().await.unwrap();

        let sent = sink.get_sent_reports();
        assert_eq!(sent.len(), 1);
        let (report_id, payload) = &sent[0];
        assert_eq!(*report_id, OUTPUT_REPORT_SUBCOMMAND);

        let mut expected = vec![0u8];
        expected.extend_from_slice(&DEFAULT_RUMBLE);
        expected.extend_from_slice(&[SUBCMD_DEVICE_INFO, 0x00]);
        assert_eq!(payload, &expected);
    }

    #[tokio::test]
    async fn test_each_operation_consumes_one_sequence_number() {
        let sink = MockReportSink::new();
        let mut session = session(sink.clone());

        session.request_device_info().await.unwrap();
        session.set_input_mode(InputMode::Standard).await.unwrap();
        session.set_imu_enabled(true).await.unwrap();
        session.request_mcu_state().await.unwrap();
        session.send_rumble(&RumbleCommand::neutral()).await.unwrap();

        let sent = sink.get_sent_reports();
        let seqs: Vec<u8> = sent.iter().map(|(_, payload)| payload[0]).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_input_mode_bytes() {
        let sink = MockReportSink::new();
        let mut session = session(sink.clone());

        session.set_input_mode(InputMode::SimpleHid).await.unwrap();
        session.set_input_mode(InputMode::Mcu).await.unwrap();

        let sent = sink.get_sent_reports();
        assert_eq!(sent[0].1[10], 0x3F);
        assert_eq!(sent[1].1[10], 0x31);
    }

    #[tokio::test]
    async fn test_configure_mcu_is_crc_protected() {
        let sink = MockReportSink::new();
        let mut session = session(sink.clone());

        session.configure_mcu(McuMode::Nfc).await.unwrap();

        let sent = sink.get_sent_reports();
        let (report_id, payload) = &sent[0];
        assert_eq!(*report_id, OUTPUT_REPORT_SUBCOMMAND);
        assert_eq!(payload.len(), 1 + 8 + 2 + 35 + 1);
        assert_eq!(payload[9], SUBCMD_MCU_CONFIG);
        assert_eq!(payload[10], 0x21);
        assert_eq!(payload[12], 0x04); // NFC mode argument

        let crc = crate::report::crc::crc8(&payload[11..11 + 35]);
        assert_eq!(*payload.last().unwrap(), crc);
    }

    #[tokio::test]
    async fn test_nfc_polling_and_mcu_control_bytes() {
        let sink = MockReportSink::new();
        let mut session = session(sink.clone());

        session.configure_mcu(McuMode::Ir).await.unwrap();
        session.set_mcu_suspended(true).await.unwrap();
        session.set_mcu_suspended(false).await.unwrap();
        session.start_nfc_polling().await.unwrap();
        session.stop_nfc_polling().await.unwrap();

        let sent = sink.get_sent_reports();
        assert_eq!(sent[0].1[12], 0x05); // IR mode argument

        // Suspend carries 0x00, resume 0x01
        assert_eq!(sent[1].1[10], 0x00);
        assert_eq!(sent[2].1[10], 0x01);

        // Polling start/stop ride report 0x11 with co-processor command 0x02
        let (report_id, start) = &sent[3];
        assert_eq!(*report_id, OUTPUT_REPORT_MCU);
        assert_eq!(start[9], 0x02);
        assert_eq!(start[10], 0x01);
        let (_, stop) = &sent[4];
        assert_eq!(stop[10], 0x02);
    }

    #[tokio::test]
    async fn test_flash_read_request_bytes() {
        let sink = MockReportSink::new();
        let mut session = session(sink.clone());

        session.request_flash_read(0x6050, 0x0D).await.unwrap();

        let sent = sink.get_sent_reports();
        let payload = &sent[0].1;
        assert_eq!(payload[9], SUBCMD_SPI_FLASH_READ);
        assert_eq!(&payload[10..14], &0x6050u32.to_le_bytes());
        assert_eq!(payload[14], 0x0D);
    }

    #[tokio::test]
    async fn test_flash_read_request_validation() {
        let sink = MockReportSink::new();
        let mut session = session(sink.clone());

        // Over the per-transfer limit
        assert!(matches!(
            session.request_flash_read(0x6000, 0x1E).await,
            Err(JoyconProbeError::FlashRange { .. })
        ));
        // Crosses the flash upper bound
        assert!(matches!(
            session.request_flash_read(SPI_FLASH_SIZE - 2, 4).await,
            Err(JoyconProbeError::FlashRange { .. })
        ));
        assert!(sink.get_sent_reports().is_empty(), "nothing may be sent");
    }

    #[tokio::test]
    async fn test_rumble_out_of_range_sends_nothing() {
        let sink = MockReportSink::new();
        let mut session = session(sink.clone());

        let mut command = RumbleCommand::neutral();
        command.left.high_ampli = 1.5;
        assert!(matches!(
            session.send_rumble(&command).await,
            Err(JoyconProbeError::OutOfRange(_))
        ));
        assert!(sink.get_sent_reports().is_empty());
    }

    #[tokio::test]
    async fn test_transport_error_is_surfaced() {
        let sink = MockReportSink::new();
        sink.set_send_error(std::io::ErrorKind::BrokenPipe);
        let mut session = session(sink.clone());

        assert!(matches!(
            session.request_device_info().await,
            Err(JoyconProbeError::Transport(_))
        ));
    }
}

//! # Input Report Decoder
//!
//! Interprets the five known input-report shapes into structured values:
//! sub-command replies (`0x21`), standard state (`0x30`), co-processor
//! frames (`0x31`) and simple HID state (`0x3F`).
//!
//! Decoding is purely translational and total: unknown discriminators come
//! back as `Unrecognized`, buffers too short for their layout as
//! `Truncated`. Both are logged and recoverable, so one bad frame can never
//! stall the input pipeline. Field offsets are protocol constants.

use tracing::{debug, warn};

use super::calibration::StickCalibration;
use super::protocol::*;

/// Accelerometer raw-to-g conversion coefficient
const ACCEL_COEFF: f32 = 0.000244;

/// Gyroscope raw-to-deg/s conversion coefficient
const GYRO_COEFF: f32 = 0.06103;

/// Byte offset of the first IMU capture
const IMU_BASE_OFFSET: usize = 12;

/// Bytes between consecutive IMU captures
const IMU_SAMPLE_STRIDE: usize = 12;

/// Rounds a converted sensor value to one decimal.
fn round1(value: f32) -> f32 {
    (value * 10.0).round() / 10.0
}

/// Decodes input reports for one connected controller.
///
/// Holds the controller model (which selects accelerometer offsets and
/// simple-HID side presence) and per-stick calibration. Stateless beyond
/// that: each call reads a single report buffer and produces a value.
///
/// # Examples
///
/// ```
/// use joycon_probe::report::decoder::InputReportDecoder;
/// use joycon_probe::report::protocol::{ControllerKind, InputReport};
///
/// let decoder = InputReportDecoder::new(ControllerKind::ProController);
/// match decoder.decode(0x99, &[0x00; 16]) {
///     InputReport::Unrecognized { report_id } => assert_eq!(report_id, 0x99),
///     other => panic!("unexpected: {:?}", other),
/// }
/// ```
#[derive(Debug, Clone)]
pub struct InputReportDecoder {
    model: ControllerKind,
    left_cal: StickCalibration,
    right_cal: StickCalibration,
}

impl InputReportDecoder {
    /// Creates a decoder with the captured-hardware default calibration.
    #[must_use]
    pub fn new(model: ControllerKind) -> Self {
        Self {
            model,
            left_cal: StickCalibration::default_left(),
            right_cal: StickCalibration::default_right(),
        }
    }

    /// Creates a decoder with explicit per-stick calibration
    /// (typically unpacked from a flash dump).
    #[must_use]
    pub fn with_calibration(
        model: ControllerKind,
        left_cal: StickCalibration,
        right_cal: StickCalibration,
    ) -> Self {
        Self {
            model,
            left_cal,
            right_cal,
        }
    }

    /// The controller model this decoder was built for.
    #[must_use]
    pub fn model(&self) -> ControllerKind {
        self.model
    }

    /// Decodes one input report payload (report id stripped).
    ///
    /// Total: never panics, never fails; unknown ids and short buffers are
    /// reported as `Unrecognized` / `Truncated` and logged.
    #[must_use]
    pub fn decode(&self, report_id: u8, data: &[u8]) -> InputReport {
        let report = match report_id {
            INPUT_REPORT_REPLY => self.decode_reply(data),
            INPUT_REPORT_STANDARD => self.decode_standard(data),
            INPUT_REPORT_MCU => self.decode_mcu(data),
            INPUT_REPORT_SIMPLE_HID => self.decode_simple_hid(data),
            other => InputReport::Unrecognized { report_id: other },
        };

        match &report {
            InputReport::Unrecognized { report_id } => {
                warn!("unrecognized input report id 0x{:02x}", report_id);
            }
            InputReport::Truncated { report_id, length } => {
                warn!(
                    "input report 0x{:02x} truncated at {} bytes",
                    report_id, length
                );
            }
            _ => {}
        }

        report
    }

    /// Sub-command ack/reply (`0x21`): standard prefix + ack + keyed payload.
    fn decode_reply(&self, data: &[u8]) -> InputReport {
        if data.len() < 14 {
            return InputReport::Truncated {
                report_id: INPUT_REPORT_REPLY,
                length: data.len(),
            };
        }

        let frame = self.decode_standard_frame(data);
        let ack = data[12];
        let sub_command = data[13];

        let payload = match sub_command {
            SUBCMD_DEVICE_INFO => {
                if data.len() < 25 {
                    return InputReport::Truncated {
                        report_id: INPUT_REPORT_REPLY,
                        length: data.len(),
                    };
                }
                let mut mac = [0u8; 6];
                mac.copy_from_slice(&data[17..23]);
                ReplyPayload::DeviceInfo(DeviceInfo {
                    firmware_major: data[14],
                    firmware_minor: data[15],
                    controller: ControllerKind::from_raw(data[16]),
                    mac,
                    calibration_in_flash: data[24] == 1,
                })
            }
            SUBCMD_SPI_FLASH_READ => {
                if data.len() < 19 {
                    return InputReport::Truncated {
                        report_id: INPUT_REPORT_REPLY,
                        length: data.len(),
                    };
                }
                let address =
                    u32::from_le_bytes([data[14], data[15], data[16], data[17]]);
                let length = data[18];
                if data.len() < 19 + usize::from(length) {
                    return InputReport::Truncated {
                        report_id: INPUT_REPORT_REPLY,
                        length: data.len(),
                    };
                }
                ReplyPayload::FlashRead(FlashReadReply {
                    address,
                    length,
                    data: data[19..19 + usize::from(length)].to_vec(),
                })
            }
            other => {
                debug!("unrecognized sub-command reply 0x{:02x}", other);
                ReplyPayload::Unrecognized { sub_command: other }
            }
        };

        InputReport::SubCommandReply(SubCommandReply {
            frame,
            ack,
            payload,
        })
    }

    /// Standard report (`0x30`): prefix + three IMU captures.
    fn decode_standard(&self, data: &[u8]) -> InputReport {
        if data.len() < IMU_BASE_OFFSET + 3 * IMU_SAMPLE_STRIDE {
            return InputReport::Truncated {
                report_id: INPUT_REPORT_STANDARD,
                length: data.len(),
            };
        }

        let frame = self.decode_standard_frame(data);
        let imu = [
            self.decode_imu_sample(data, IMU_BASE_OFFSET),
            self.decode_imu_sample(data, IMU_BASE_OFFSET + IMU_SAMPLE_STRIDE),
            self.decode_imu_sample(data, IMU_BASE_OFFSET + 2 * IMU_SAMPLE_STRIDE),
        ];

        InputReport::Standard(StandardInput { frame, imu })
    }

    /// The shared timer-through-sticks prefix. Caller guarantees 11 bytes.
    fn decode_standard_frame(&self, data: &[u8]) -> StandardFrame {
        let status = data[1];
        let buttons = ButtonState::from_bytes([data[2], data[3], data[4]]);

        let left_stick =
            decode_stick([data[5], data[6], data[7]], &self.left_cal);
        let right_stick =
            decode_stick([data[8], data[9], data[10]], &self.right_cal);

        StandardFrame {
            timer: data[0],
            battery: BatteryLevel::from_raw((status >> 4) & 0x0E),
            charging: (status >> 4) & 0x01 != 0,
            connection: ConnectionKind::from_raw(status & 0x0F),
            buttons,
            left_stick,
            right_stick,
        }
    }

    /// One time-shifted IMU capture at `base`.
    fn decode_imu_sample(&self, data: &[u8], base: usize) -> ImuSample {
        let offsets = self.model.accel_offsets();
        let raw = |index: usize| {
            i16::from_le_bytes([data[base + index * 2], data[base + index * 2 + 1]])
        };

        let accel = [
            round1((i32::from(raw(0)) - i32::from(offsets[0])) as f32 * ACCEL_COEFF),
            round1((i32::from(raw(1)) - i32::from(offsets[1])) as f32 * ACCEL_COEFF),
            round1((i32::from(raw(2)) - i32::from(offsets[2])) as f32 * ACCEL_COEFF),
        ];
        let gyro = [
            round1(f32::from(raw(3)) * GYRO_COEFF),
            round1(f32::from(raw(4)) * GYRO_COEFF),
            round1(f32::from(raw(5)) * GYRO_COEFF),
        ];

        ImuSample { accel, gyro }
    }

    /// Co-processor frame (`0x31`): embedded sub-report keyed at offset 48.
    fn decode_mcu(&self, data: &[u8]) -> InputReport {
        if data.len() <= MCU_SUB_REPORT_OFFSET {
            return InputReport::Truncated {
                report_id: INPUT_REPORT_MCU,
                length: data.len(),
            };
        }

        let frame = match data[MCU_SUB_REPORT_OFFSET] {
            MCU_REPORT_EMPTY | MCU_REPORT_EMPTY_FF => McuFrame::Empty,
            MCU_REPORT_STATUS => {
                if data.len() < 56 {
                    return InputReport::Truncated {
                        report_id: INPUT_REPORT_MCU,
                        length: data.len(),
                    };
                }
                McuFrame::Status(McuStatus {
                    firmware_major: u16::from_be_bytes([data[51], data[52]]),
                    firmware_minor: u16::from_be_bytes([data[53], data[54]]),
                    state: McuState::from_raw(data[55]),
                })
            }
            MCU_REPORT_NFC => {
                if data.len() < 60 {
                    return InputReport::Truncated {
                        report_id: INPUT_REPORT_MCU,
                        length: data.len(),
                    };
                }

                let tag = if data[59] == 1 {
                    if data.len() < 64 {
                        return InputReport::Truncated {
                            report_id: INPUT_REPORT_MCU,
                            length: data.len(),
                        };
                    }
                    let uid_len = usize::from(data[63]);
                    if data.len() < 64 + uid_len {
                        return InputReport::Truncated {
                            report_id: INPUT_REPORT_MCU,
                            length: data.len(),
                        };
                    }
                    Some(NfcTag {
                        ic: NfcTagIc::from_raw(data[61]),
                        kind: NfcType::from_raw(data[62]),
                        uid: data[64..64 + uid_len].to_vec(),
                    })
                } else {
                    None
                };

                McuFrame::Nfc(NfcStatus {
                    result: NfcResult::from_raw(data[49]),
                    input_type: NfcInputType::from_raw(data[50]),
                    ic_state: NfcIcState::from_raw(data[55]),
                    tag,
                })
            }
            other => {
                debug!("unrecognized co-processor sub-report 0x{:02x}", other);
                McuFrame::Unrecognized { sub_id: other }
            }
        };

        InputReport::Mcu(frame)
    }

    /// Simple HID report (`0x3F`): side button bytes + hat code.
    fn decode_simple_hid(&self, data: &[u8]) -> InputReport {
        if data.len() < 3 {
            return InputReport::Truncated {
                report_id: INPUT_REPORT_SIMPLE_HID,
                length: data.len(),
            };
        }

        let left = self
            .model
            .has_left_side()
            .then(|| SimpleHidButtonsLeft::from_bytes([data[0], data[1]]));
        let right = self
            .model
            .has_right_side()
            .then(|| SimpleHidButtonsRight::from_bytes([data[0], data[1]]));

        InputReport::SimpleHid(SimpleHidInput {
            left,
            right,
            stick: StickDirection::from_raw(data[2]),
        })
    }
}

/// Decodes one 3-byte packed stick field against its calibration.
///
/// `raw_x = b0 | (b1 & 0x0F) << 8`, `raw_y = b1 >> 4 | b2 << 4`, both
/// center-relative and normalized asymmetrically. All-zero bytes mean the
/// stick field is absent from this report and decode as centered.
#[must_use]
pub fn decode_stick(bytes: [u8; 3], cal: &StickCalibration) -> StickPosition {
    if bytes == [0, 0, 0] {
        return StickPosition::default();
    }

    let raw_x = u16::from(bytes[0]) | (u16::from(bytes[1] & 0x0F) << 8);
    let raw_y = u16::from(bytes[1] >> 4) | (u16::from(bytes[2]) << 4);

    StickPosition {
        raw_x,
        raw_y,
        x: cal.normalize(raw_x, false),
        y: cal.normalize(raw_y, true),
    }
}

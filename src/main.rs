//! # Joy-Con Probe
//!
//! Diagnostic client for the Joy-Con / Pro Controller HID wire protocol.
//!
//! This binary exercises the full codec against the built-in emulated
//! controller: device identification, input-mode switching, IMU enable, a
//! rumble pulse, a co-processor status query and a chunked flash dump of the
//! well-known regions, with every decoded value logged. Point it at a real
//! transport by implementing [`joycon_probe::hid::ReportSink`] in the
//! embedding application.

use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{info, warn};

use joycon_probe::config::Config;
use joycon_probe::dump::{FlashDumper, FlashRegion};
use joycon_probe::hid::{EmulatedJoyCon, InputReportReceiver};
use joycon_probe::report::calibration::StickCalibration;
use joycon_probe::report::decoder::InputReportDecoder;
use joycon_probe::report::protocol::{
    ControllerKind, InputMode, InputReport, McuFrame, ReplyPayload,
};
use joycon_probe::session::DeviceSession;

/// How long to wait for a single expected reply during the query phase
const REPLY_TIMEOUT: Duration = Duration::from_millis(500);

/// Default configuration path when none is given on the command line
const DEFAULT_CONFIG_PATH: &str = "config/default.toml";

/// Waits for the next pushed input report.
async fn next_report(reports: &mut InputReportReceiver) -> Result<(u8, Vec<u8>)> {
    tokio::time::timeout(REPLY_TIMEOUT, reports.recv())
        .await
        .context("timed out waiting for input report")?
        .context("input report channel closed")
}

#[tokio::main]
async fn main() -> Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::INFO.into()),
        )
        .init();

    info!("Joy-Con Probe v{} starting...", env!("CARGO_PKG_VERSION"));

    let config_path = std::env::args()
        .nth(1)
        .unwrap_or_else(|| DEFAULT_CONFIG_PATH.to_string());
    let config = Config::load_or_default(&config_path)
        .with_context(|| format!("failed to load configuration from {}", config_path))?;

    // The emulated controller stands in for a real HID transport
    let (device, mut reports) = EmulatedJoyCon::new(ControllerKind::ProController);
    let mut session = DeviceSession::new(device, ControllerKind::ProController);
    let mut decoder = InputReportDecoder::new(session.model());

    // ---- Device identification ----
    session.request_device_info().await?;
    let (report_id, payload) = next_report(&mut reports).await?;
    if let InputReport::SubCommandReply(reply) = decoder.decode(report_id, &payload) {
        if let ReplyPayload::DeviceInfo(device_info) = reply.payload {
            info!(
                "device: {:?}, firmware {}.{}, MAC {}, calibration source: {}",
                device_info.controller,
                device_info.firmware_major,
                device_info.firmware_minor,
                device_info.mac_string(),
                if device_info.calibration_in_flash { "flash" } else { "defaults" },
            );
            session.set_model(device_info.controller);
            decoder = InputReportDecoder::new(device_info.controller);
        }
    }

    // ---- Standard input mode with IMU ----
    session.set_input_mode(InputMode::Standard).await?;
    next_report(&mut reports).await?; // ack
    session.set_imu_enabled(true).await?;
    next_report(&mut reports).await?; // ack

    // ---- Rumble pulse from configuration ----
    session.send_rumble(&config.rumble.command()).await?;
    info!("rumble pulse sent");

    // ---- Co-processor status ----
    if session.model().has_mcu() {
        session.request_mcu_state().await?;
        let (report_id, payload) = next_report(&mut reports).await?;
        if let InputReport::Mcu(McuFrame::Status(status)) = decoder.decode(report_id, &payload) {
            info!(
                "co-processor: firmware {}.{}, state {:?}",
                status.firmware_major, status.firmware_minor, status.state
            );
        }
    }

    // ---- Flash dump of the well-known regions ----
    let dumper = FlashDumper::with_timing(
        Duration::from_millis(config.dump.poll_interval_ms),
        config.dump.poll_budget,
    );

    // Input dispatch: decoded flash replies feed the dumper, everything else
    // is logged as it arrives
    let dispatch = {
        let dumper = dumper.clone();
        let decoder = decoder.clone();
        tokio::spawn(async move {
            while let Some((report_id, payload)) = reports.recv().await {
                match decoder.decode(report_id, &payload) {
                    InputReport::SubCommandReply(reply) => {
                        if let ReplyPayload::FlashRead(read) = reply.payload {
                            dumper.handle_reply(&read);
                        }
                    }
                    other => info!("input report: {:?}", other),
                }
            }
        })
    };

    let regions = [
        FlashRegion::SerialNumber,
        FlashRegion::PairingData,
        FlashRegion::FactoryImuCalibration,
        FlashRegion::FactoryStickCalibration,
        FlashRegion::BodyColors,
    ];

    let dump_result = tokio::select! {
        result = async {
            for region in regions {
                dumper.dump_region(&mut session, region).await?;
                info!("dumped {:?}", region);
            }
            Ok::<(), joycon_probe::error::JoyconProbeError>(())
        } => result,
        _ = tokio::signal::ctrl_c() => {
            dumper.abort();
            warn!("interrupted, dump campaign aborted");
            Ok(())
        }
    };
    if let Err(e) = dump_result {
        warn!("flash dump failed: {}", e);
    }

    // ---- Decode what the dump produced ----
    let serial = dumper.read_image(
        FlashRegion::SerialNumber.address(),
        FlashRegion::SerialNumber.length(),
    );
    info!("serial number: {}", String::from_utf8_lossy(&serial));

    let stick_records = dumper.read_image(
        FlashRegion::FactoryStickCalibration.address(),
        FlashRegion::FactoryStickCalibration.length(),
    );
    let left_cal = StickCalibration::from_factory_record(&stick_records[..9]);
    let right_cal = StickCalibration::from_factory_record(&stick_records[9..]);
    info!("left stick calibration: {:?}", left_cal);
    info!("right stick calibration: {:?}", right_cal);

    dispatch.abort();
    info!("diagnostic run complete");
    Ok(())
}

//! # HID Transport Module
//!
//! Transport abstraction for framed HID reports.
//!
//! This module handles:
//! - The output-report sink trait the codec writes through
//! - Push-based input-report delivery (channel of `(report_id, payload)`)
//! - An in-process emulated controller for diagnostics and tests
//!
//! A real HID backend (hidapi, WebHID, kernel hidraw) is supplied by the
//! embedding application; everything here is transport-agnostic.

pub mod emulator;
pub mod transport;

pub use emulator::{EmulatedJoyCon, InputReportReceiver};
pub use transport::ReportSink;

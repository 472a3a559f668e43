//! Trait abstraction for the HID report sink to enable testing

use async_trait::async_trait;
use std::io;

/// Trait for the output-report submission path.
///
/// Input reports travel the other way, push-based: the transport delivers
/// each arriving `(report_id, payload)` pair on a channel the caller drains
/// (see the emulator for the in-process shape). There is no request/response
/// correlation at this layer.
#[async_trait]
pub trait ReportSink: Send {
    /// Write one output report to the device
    async fn send_report(&mut self, report_id: u8, payload: &[u8]) -> io::Result<()>;
}

#[cfg(test)]
pub mod mocks {
    use super::*;
    use std::sync::{Arc, Mutex};

    /// Mock report sink for testing
    #[derive(Clone)]
    pub struct MockReportSink {
        pub sent_reports: Arc<Mutex<Vec<(u8, Vec<u8>)>>>,
        pub send_error: Arc<Mutex<Option<io::ErrorKind>>>,
    }

    impl MockReportSink {
        pub fn new() -> Self {
            Self {
                sent_reports: Arc::new(Mutex::new(Vec::new())),
                send_error: Arc::new(Mutex::new(None)),
            }
        }

        pub fn get_sent_reports(&self) -> Vec<(u8, Vec<u8>)> {
            self.sent_reports.lock().unwrap().clone()
        }

        pub fn set_send_error(&self, error: io::ErrorKind) {
            *self.send_error.lock().unwrap() = Some(error);
        }
    }

    #[async_trait]
    impl ReportSink for MockReportSink {
        async fn send_report(&mut self, report_id: u8, payload: &[u8]) -> io::Result<()> {
            if let Some(error) = *self.send_error.lock().unwrap() {
                return Err(io::Error::new(error, "Mock send error"));
            }
            self.sent_reports
                .lock()
                .unwrap()
                .push((report_id, payload.to_vec()));
            Ok(())
        }
    }
}

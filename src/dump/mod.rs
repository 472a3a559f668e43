//! # Flash Dump Module
//!
//! Drives chunked reads of the controller's serial flash and assembles the
//! replies into a contiguous memory image.
//!
//! The transport offers no request/response correlation, so the dumper
//! correlates itself: every sub-request enqueues an `{address, length}`
//! expectation, and the input dispatch feeds decoded flash-read replies back
//! through [`FlashDumper::handle_reply`]. Sub-requests are strictly
//! serialized; the device cannot pipeline flash reads. At most one campaign
//! runs at a time (single-flight flag, checked-and-set atomically).
//!
//! The wait-for-reply loop is the only suspension point: a bounded number of
//! poll iterations separated by a fixed interval, driven by `tokio::time` so
//! the paused test clock exercises the timeout path without wall-clock
//! delays.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tokio::time;
use tracing::{debug, info, warn};

use crate::error::{JoyconProbeError, Result};
use crate::hid::ReportSink;
use crate::report::protocol::{FlashReadReply, SPI_FLASH_SIZE, SPI_READ_CHUNK_MAX};
use crate::session::DeviceSession;

/// Upper bound on one caller-specified campaign (64 KiB)
pub const DUMP_MAX_LEN: u32 = 0x1_0000;

/// Interval between expectation-queue polls
pub const DEFAULT_POLL_INTERVAL: Duration = Duration::from_millis(10);

/// Poll iterations before a sub-request is declared unanswered (~1 s)
pub const DEFAULT_POLL_BUDGET: u32 = 100;

/// Well-known flash regions the diagnostic surface exposes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlashRegion {
    /// Device serial number
    SerialNumber,
    /// Paired-host data
    PairingData,
    /// Factory IMU calibration
    FactoryImuCalibration,
    /// Factory stick calibration, left then right
    FactoryStickCalibration,
    /// Body and button colors
    BodyColors,
    /// User stick calibration
    UserStickCalibration,
    /// User IMU calibration
    UserImuCalibration,
}

impl FlashRegion {
    /// Start address of this region.
    #[must_use]
    pub fn address(&self) -> u32 {
        match self {
            Self::SerialNumber => 0x6000,
            Self::PairingData => 0x2000,
            Self::FactoryImuCalibration => 0x6020,
            Self::FactoryStickCalibration => 0x603D,
            Self::BodyColors => 0x6050,
            Self::UserStickCalibration => 0x8010,
            Self::UserImuCalibration => 0x8026,
        }
    }

    /// Length of this region in bytes.
    #[must_use]
    pub fn length(&self) -> u32 {
        match self {
            Self::SerialNumber => 0x10,
            Self::PairingData => 0x16,
            Self::FactoryImuCalibration => 0x18,
            Self::FactoryStickCalibration => 0x12,
            Self::BodyColors => 0x0D,
            Self::UserStickCalibration => 0x16,
            Self::UserImuCalibration => 0x1A,
        }
    }
}

/// The assembled flash memory image.
///
/// Created once, zero-filled, never resized; mutated only by successfully
/// matched flash-read replies.
#[derive(Debug)]
pub struct FlashImage {
    bytes: Vec<u8>,
}

impl FlashImage {
    fn new() -> Self {
        Self {
            bytes: vec![0u8; SPI_FLASH_SIZE as usize],
        }
    }

    /// Writes reply bytes at their reported address, clamped to the image.
    fn write(&mut self, address: u32, data: &[u8]) {
        let start = (address as usize).min(self.bytes.len());
        let end = (start + data.len()).min(self.bytes.len());
        self.bytes[start..end].copy_from_slice(&data[..end - start]);
    }

    /// Reads a range out of the image, clamped to the image.
    #[must_use]
    fn read(&self, address: u32, length: u32) -> Vec<u8> {
        let start = (address as usize).min(self.bytes.len());
        let end = (start + length as usize).min(self.bytes.len());
        self.bytes[start..end].to_vec()
    }
}

/// One outstanding sub-request awaiting its reply
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct PendingRead {
    address: u32,
    length: u8,
}

#[derive(Debug)]
struct DumpInner {
    pending: VecDeque<PendingRead>,
    image: FlashImage,
}

/// Shared dump state: single-flight flag, abort flag, expectation FIFO and
/// the image.
#[derive(Debug)]
struct DumpState {
    active: AtomicBool,
    aborted: AtomicBool,
    inner: Mutex<DumpInner>,
}

/// Orchestrates flash-read campaigns against one controller.
///
/// Cloning shares the underlying state: the input dispatch holds one clone
/// to feed replies in, the campaign driver holds another.
///
/// # Examples
///
/// ```no_run
/// use joycon_probe::dump::{FlashDumper, FlashRegion};
/// use joycon_probe::hid::EmulatedJoyCon;
/// use joycon_probe::report::protocol::ControllerKind;
/// use joycon_probe::session::DeviceSession;
///
/// # #[tokio::main]
/// # async fn main() -> anyhow::Result<()> {
/// let (device, _reports) = EmulatedJoyCon::new(ControllerKind::ProController);
/// let mut session = DeviceSession::new(device, ControllerKind::ProController);
/// let dumper = FlashDumper::new();
/// dumper.dump_region(&mut session, FlashRegion::SerialNumber).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct FlashDumper {
    state: Arc<DumpState>,
    poll_interval: Duration,
    poll_budget: u32,
}

impl FlashDumper {
    /// Creates a dumper with the protocol-default 10 ms / 100-iteration
    /// timing.
    #[must_use]
    pub fn new() -> Self {
        Self::with_timing(DEFAULT_POLL_INTERVAL, DEFAULT_POLL_BUDGET)
    }

    /// Creates a dumper with explicit poll timing.
    #[must_use]
    pub fn with_timing(poll_interval: Duration, poll_budget: u32) -> Self {
        Self {
            state: Arc::new(DumpState {
                active: AtomicBool::new(false),
                aborted: AtomicBool::new(false),
                inner: Mutex::new(DumpInner {
                    pending: VecDeque::new(),
                    image: FlashImage::new(),
                }),
            }),
            poll_interval,
            poll_budget,
        }
    }

    /// Whether a campaign currently holds the single-flight flag.
    #[must_use]
    pub fn is_active(&self) -> bool {
        self.state.active.load(Ordering::Acquire)
    }

    /// Cancels the active campaign, if any. The campaign driver notices at
    /// its next poll iteration, returns `DumpAborted` and releases the
    /// single-flight flag; the partially-filled image is left as-is.
    pub fn abort(&self) {
        if self.is_active() {
            info!("aborting active flash dump campaign");
            self.state.aborted.store(true, Ordering::Release);
        }
    }

    /// Reads assembled bytes out of the image.
    #[must_use]
    pub fn read_image(&self, address: u32, length: u32) -> Vec<u8> {
        self.state.inner.lock().unwrap().image.read(address, length)
    }

    /// Feeds one decoded flash-read reply in from the input dispatch.
    ///
    /// A reply matching the front expectation writes its bytes into the
    /// image at the reply's own reported address and completes that
    /// sub-request. Anything else is logged and ignored.
    pub fn handle_reply(&self, reply: &FlashReadReply) -> bool {
        let mut inner = self.state.inner.lock().unwrap();
        match inner.pending.front() {
            Some(pending)
                if pending.address == reply.address && pending.length == reply.length =>
            {
                inner.pending.pop_front();
                inner.image.write(reply.address, &reply.data);
                debug!(
                    "flash read 0x{:05x}+{} fulfilled",
                    reply.address, reply.length
                );
                true
            }
            _ => {
                warn!(
                    "unmatched flash read reply at 0x{:05x} ({} bytes)",
                    reply.address, reply.length
                );
                false
            }
        }
    }

    /// Dumps one well-known region. Identical machinery to
    /// [`FlashDumper::dump_range`].
    pub async fn dump_region<S: ReportSink>(
        &self,
        session: &mut DeviceSession<S>,
        region: FlashRegion,
    ) -> Result<()> {
        self.dump_range(session, region.address(), region.length())
            .await
    }

    /// Runs one dump campaign over `[start, start + length)`.
    ///
    /// Splits the range into sub-requests of at most 0x1D bytes, clamped at
    /// the flash upper bound, and serializes them: sub-request n+1 is never
    /// issued before n's reply arrived or timed out.
    ///
    /// # Errors
    ///
    /// - `DumpInProgress` when another campaign is active (no-op: neither
    ///   the active campaign nor the image is touched)
    /// - `FlashRange` when the range is empty, past the flash end, or over
    ///   the per-campaign maximum
    /// - `NoReply` when a sub-request exhausts its poll budget; the campaign
    ///   stops, earlier-filled bytes stay intact
    /// - `DumpAborted` when [`FlashDumper::abort`] was called
    /// - `Transport` when a request could not be submitted
    pub async fn dump_range<S: ReportSink>(
        &self,
        session: &mut DeviceSession<S>,
        start: u32,
        length: u32,
    ) -> Result<()> {
        if length == 0 || length > DUMP_MAX_LEN || start >= SPI_FLASH_SIZE {
            return Err(JoyconProbeError::FlashRange { start, length });
        }

        // Single-flight: exactly one campaign may hold the flag
        if self
            .state
            .active
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .is_err()
        {
            warn!("flash dump rejected: campaign already active");
            return Err(JoyconProbeError::DumpInProgress);
        }
        self.state.aborted.store(false, Ordering::Release);

        let end = (start.saturating_add(length)).min(SPI_FLASH_SIZE);
        info!("flash dump campaign 0x{:05x}..0x{:05x}", start, end);

        let result = self.run_campaign(session, start, end).await;

        if result.is_err() {
            self.state.inner.lock().unwrap().pending.clear();
        }
        self.state.active.store(false, Ordering::Release);

        match &result {
            Ok(()) => info!("flash dump campaign complete"),
            Err(e) => warn!("flash dump campaign failed: {}", e),
        }
        result
    }

    async fn run_campaign<S: ReportSink>(
        &self,
        session: &mut DeviceSession<S>,
        start: u32,
        end: u32,
    ) -> Result<()> {
        let mut address = start;
        while address < end {
            if self.state.aborted.load(Ordering::Acquire) {
                return Err(JoyconProbeError::DumpAborted);
            }

            let chunk = (end - address).min(u32::from(SPI_READ_CHUNK_MAX)) as u8;

            self.state
                .inner
                .lock()
                .unwrap()
                .pending
                .push_back(PendingRead {
                    address,
                    length: chunk,
                });

            session.request_flash_read(address, chunk).await?;
            self.wait_for_reply(address, chunk).await?;

            address += u32::from(chunk);
        }
        Ok(())
    }

    /// Polls the expectation queue until it empties or the budget runs out.
    async fn wait_for_reply(&self, address: u32, length: u8) -> Result<()> {
        for _ in 0..self.poll_budget {
            if self.state.aborted.load(Ordering::Acquire) {
                return Err(JoyconProbeError::DumpAborted);
            }
            if self.state.inner.lock().unwrap().pending.is_empty() {
                return Ok(());
            }
            time::sleep(self.poll_interval).await;
        }

        // The reply may have landed during the final interval
        if self.state.inner.lock().unwrap().pending.is_empty() {
            return Ok(());
        }

        Err(JoyconProbeError::NoReply { address, length })
    }
}

impl Default for FlashDumper {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hid::transport::mocks::MockReportSink;
    use crate::hid::EmulatedJoyCon;
    use crate::report::decoder::InputReportDecoder;
    use crate::report::protocol::{ControllerKind, InputReport, ReplyPayload};
    use std::sync::atomic::AtomicUsize;

    /// Spawns the input dispatch loop: decode every pushed report, feed
    /// flash-read replies into the dumper, count them.
    fn spawn_dispatch(
        mut reports: crate::hid::InputReportReceiver,
        dumper: FlashDumper,
        reply_count: Arc<AtomicUsize>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            let decoder = InputReportDecoder::new(ControllerKind::ProController);
            while let Some((report_id, payload)) = reports.recv().await {
                if let InputReport::SubCommandReply(reply) = decoder.decode(report_id, &payload)
                {
                    if let ReplyPayload::FlashRead(read) = reply.payload {
                        dumper.handle_reply(&read);
                        reply_count.fetch_add(1, Ordering::SeqCst);
                    }
                }
            }
        })
    }

    // ==================== End-to-end Tests ====================

    #[tokio::test]
    async fn test_dump_campaign_end_to_end() {
        let (device, reports) = EmulatedJoyCon::new(ControllerKind::ProController);
        let expected = device.flash()[0x6000..0x60AA].to_vec();
        let mut session = DeviceSession::new(device, ControllerKind::ProController);

        let dumper = FlashDumper::new();
        let reply_count = Arc::new(AtomicUsize::new(0));
        let dispatch = spawn_dispatch(reports, dumper.clone(), reply_count.clone());

        dumper.dump_range(&mut session, 0x6000, 0xAA).await.unwrap();

        // ceil(0xAA / 0x1D) = 6 serialized sub-requests
        assert_eq!(reply_count.load(Ordering::SeqCst), 6);
        assert_eq!(dumper.read_image(0x6000, 0xAA), expected);
        assert!(!dumper.is_active(), "session must return to idle");

        dispatch.abort();
    }

    #[tokio::test]
    async fn test_dump_region_serial_number() {
        let (device, reports) = EmulatedJoyCon::new(ControllerKind::ProController);
        let mut session = DeviceSession::new(device, ControllerKind::ProController);

        let dumper = FlashDumper::new();
        let dispatch = spawn_dispatch(reports, dumper.clone(), Arc::new(AtomicUsize::new(0)));

        dumper
            .dump_region(&mut session, FlashRegion::SerialNumber)
            .await
            .unwrap();

        assert_eq!(
            dumper.read_image(FlashRegion::SerialNumber.address(), 0x10),
            b"XBW00017B0C19345".to_vec()
        );

        dispatch.abort();
    }

    #[tokio::test]
    async fn test_dump_clamps_at_flash_upper_bound() {
        let (device, reports) = EmulatedJoyCon::new(ControllerKind::ProController);
        let mut session = DeviceSession::new(device, ControllerKind::ProController);

        let dumper = FlashDumper::new();
        let reply_count = Arc::new(AtomicUsize::new(0));
        let dispatch = spawn_dispatch(reports, dumper.clone(), reply_count.clone());

        // Requested range crosses the end of flash; reads stop at the bound
        dumper
            .dump_range(&mut session, SPI_FLASH_SIZE - 10, 0x40)
            .await
            .unwrap();

        assert_eq!(reply_count.load(Ordering::SeqCst), 1);
        assert_eq!(dumper.read_image(SPI_FLASH_SIZE - 10, 10).len(), 10);

        dispatch.abort();
    }

    // ==================== Validation Tests ====================

    #[tokio::test]
    async fn test_dump_range_validation() {
        let sink = MockReportSink::new();
        let mut session = DeviceSession::new(sink.clone(), ControllerKind::ProController);
        let dumper = FlashDumper::new();

        assert!(matches!(
            dumper.dump_range(&mut session, 0x6000, 0).await,
            Err(JoyconProbeError::FlashRange { .. })
        ));
        assert!(matches!(
            dumper.dump_range(&mut session, SPI_FLASH_SIZE, 0x10).await,
            Err(JoyconProbeError::FlashRange { .. })
        ));
        assert!(matches!(
            dumper.dump_range(&mut session, 0, DUMP_MAX_LEN + 1).await,
            Err(JoyconProbeError::FlashRange { .. })
        ));
        assert!(sink.get_sent_reports().is_empty());
        assert!(!dumper.is_active());
    }

    // ==================== Single-flight Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_single_flight_rejects_second_campaign() {
        // First campaign runs against a sink that never answers
        let sink = MockReportSink::new();
        let mut session = DeviceSession::new(sink, ControllerKind::ProController);
        let dumper = FlashDumper::new();

        let first = {
            let dumper = dumper.clone();
            tokio::spawn(async move { dumper.dump_range(&mut session, 0x6000, 0x10).await })
        };
        tokio::task::yield_now().await;
        assert!(dumper.is_active());

        // Seed a recognizable byte so we can prove the image survives
        dumper.handle_reply(&FlashReadReply {
            address: 0x6000,
            length: 0x10,
            data: vec![0xAB; 0x10],
        });
        let before = dumper.read_image(0x6000, 0x10);

        // Second campaign start is a no-op rejection
        let sink2 = MockReportSink::new();
        let mut session2 = DeviceSession::new(sink2.clone(), ControllerKind::ProController);
        assert!(matches!(
            dumper.dump_range(&mut session2, 0x2000, 0x10).await,
            Err(JoyconProbeError::DumpInProgress)
        ));
        assert!(sink2.get_sent_reports().is_empty(), "no request may be sent");
        assert_eq!(dumper.read_image(0x6000, 0x10), before, "image untouched");

        // First campaign completes (the seeded reply fulfilled it)
        first.await.unwrap().unwrap();
        assert!(!dumper.is_active());
    }

    // ==================== Timeout Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_timeout_aborts_with_no_reply() {
        let (mut device, reports) = EmulatedJoyCon::new(ControllerKind::ProController);
        device.set_respond_to_flash_reads(false);
        let mut session = DeviceSession::new(device, ControllerKind::ProController);

        let dumper = FlashDumper::new();
        let dispatch = spawn_dispatch(reports, dumper.clone(), Arc::new(AtomicUsize::new(0)));

        // Seed earlier bytes to prove they survive the failed campaign
        {
            let mut inner = dumper.state.inner.lock().unwrap();
            inner.image.write(0x5FF0, &[0x77; 4]);
        }

        let result = dumper.dump_range(&mut session, 0x6000, 0x10).await;
        assert!(matches!(
            result,
            Err(JoyconProbeError::NoReply {
                address: 0x6000,
                length: 0x10
            })
        ));

        assert!(!dumper.is_active(), "single-flight flag must be released");
        assert_eq!(dumper.read_image(0x5FF0, 4), vec![0x77; 4]);
        // A fresh campaign can start afterwards
        assert!(matches!(
            dumper.dump_range(&mut session, 0x6000, 0).await,
            Err(JoyconProbeError::FlashRange { .. })
        ));

        dispatch.abort();
    }

    // ==================== Abort Tests ====================

    #[tokio::test(start_paused = true)]
    async fn test_abort_cancels_campaign() {
        let sink = MockReportSink::new();
        let mut session = DeviceSession::new(sink, ControllerKind::ProController);
        let dumper = FlashDumper::new();

        let campaign = {
            let dumper = dumper.clone();
            tokio::spawn(async move { dumper.dump_range(&mut session, 0x6000, 0x100).await })
        };
        tokio::task::yield_now().await;
        assert!(dumper.is_active());

        dumper.abort();
        let result = campaign.await.unwrap();
        assert!(matches!(result, Err(JoyconProbeError::DumpAborted)));
        assert!(!dumper.is_active());
    }

    #[tokio::test]
    async fn test_abort_when_idle_is_noop() {
        let dumper = FlashDumper::new();
        dumper.abort();
        assert!(!dumper.is_active());
    }

    // ==================== Reply Matching Tests ====================

    #[tokio::test]
    async fn test_unmatched_reply_is_ignored() {
        let dumper = FlashDumper::new();
        let reply = FlashReadReply {
            address: 0x6000,
            length: 4,
            data: vec![1, 2, 3, 4],
        };
        assert!(!dumper.handle_reply(&reply), "no expectation outstanding");
        assert_eq!(dumper.read_image(0x6000, 4), vec![0, 0, 0, 0]);
    }

    #[test]
    fn test_region_table() {
        assert_eq!(FlashRegion::SerialNumber.address(), 0x6000);
        assert_eq!(FlashRegion::SerialNumber.length(), 0x10);
        assert_eq!(FlashRegion::FactoryStickCalibration.address(), 0x603D);
        assert_eq!(FlashRegion::FactoryStickCalibration.length(), 0x12);
        assert_eq!(FlashRegion::UserImuCalibration.address(), 0x8026);
    }
}

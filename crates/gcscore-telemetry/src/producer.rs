use std::sync::atomic::{AtomicBool, AtomicU32, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use tracing::{debug, info, warn};

use crate::config::DEFAULT_SEED;
use crate::error::{Result, TelemetryError};
use crate::ring::TelemetryRingBuffer;
use crate::sample::{SampleKind, TelemetrySample};
use crate::stats::StatsAggregator;

const THREAD_NAME: &str = "gcscore-telemetry";

/// Supplies the three generic values of each produced sample.
pub trait SampleSource: Send + 'static {
    fn values(&mut self, kind: SampleKind) -> [f32; 3];
}

/// Seeded uniform values in `[-100, 100)`.
#[derive(Debug, Clone)]
pub struct SyntheticSource {
    rng: fastrand::Rng,
}

impl SyntheticSource {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: fastrand::Rng::with_seed(seed),
        }
    }

    fn next_value(&mut self) -> f32 {
        self.rng.f32() * 200.0 - 100.0
    }
}

impl Default for SyntheticSource {
    fn default() -> Self {
        Self::new(DEFAULT_SEED)
    }
}

impl SampleSource for SyntheticSource {
    fn values(&mut self, _kind: SampleKind) -> [f32; 3] {
        [self.next_value(), self.next_value(), self.next_value()]
    }
}

#[derive(Default)]
struct Worker {
    source: Option<Box<dyn SampleSource>>,
    handle: Option<JoinHandle<Box<dyn SampleSource>>>,
}

struct Shared {
    running: AtomicBool,
    seq: AtomicU32,
    ring: Arc<TelemetryRingBuffer>,
    stats: Arc<StatsAggregator>,
    interval: Duration,
    epoch: Instant,
}

/// Background thread feeding samples into a ring buffer and aggregator.
///
/// `start` and `stop` are idempotent. `stop` joins the thread, so no sample
/// is produced after it returns. The sequence number and the sample source
/// carry over from one run to the next.
pub struct TelemetryProducer {
    shared: Arc<Shared>,
    worker: Mutex<Worker>,
}

impl TelemetryProducer {
    pub fn new(
        ring: Arc<TelemetryRingBuffer>,
        stats: Arc<StatsAggregator>,
        interval: Duration,
        source: Box<dyn SampleSource>,
    ) -> Result<Self> {
        if interval.is_zero() {
            return Err(TelemetryError::InvalidInterval);
        }
        Ok(Self {
            shared: Arc::new(Shared {
                running: AtomicBool::new(false),
                seq: AtomicU32::new(0),
                ring,
                stats,
                interval,
                epoch: Instant::now(),
            }),
            worker: Mutex::new(Worker {
                source: Some(source),
                handle: None,
            }),
        })
    }

    /// Spawn the producer thread. Returns `Ok(false)` if it was already running.
    pub fn start(&self) -> Result<bool> {
        if self.shared.running.load(Ordering::Acquire) {
            return Ok(false);
        }

        let mut worker = self.lock_worker();
        if self.shared.running.swap(true, Ordering::AcqRel) {
            return Ok(false);
        }

        let source = worker
            .source
            .take()
            .unwrap_or_else(|| Box::new(SyntheticSource::default()) as Box<dyn SampleSource>);
        self.shared.stats.mark_start();

        let shared = Arc::clone(&self.shared);
        let spawned = thread::Builder::new()
            .name(THREAD_NAME.to_string())
            .spawn(move || run(&shared, source));

        match spawned {
            Ok(handle) => {
                worker.handle = Some(handle);
                info!(interval = ?self.shared.interval, "telemetry producer started");
                Ok(true)
            }
            Err(err) => {
                self.shared.running.store(false, Ordering::Release);
                Err(TelemetryError::Spawn(err))
            }
        }
    }

    /// Stop and join the producer thread. Returns `false` if it was not running.
    pub fn stop(&self) -> bool {
        if !self.shared.running.load(Ordering::Acquire) {
            return false;
        }

        let mut worker = self.lock_worker();
        if !self.shared.running.swap(false, Ordering::AcqRel) {
            return false;
        }

        if let Some(handle) = worker.handle.take() {
            handle.thread().unpark();
            match handle.join() {
                Ok(source) => worker.source = Some(source),
                Err(_) => warn!("telemetry producer thread panicked; source reset"),
            }
        }
        info!(
            produced = self.shared.seq.load(Ordering::Relaxed),
            "telemetry producer stopped"
        );
        true
    }

    pub fn is_running(&self) -> bool {
        self.shared.running.load(Ordering::Acquire)
    }

    /// Sequence number of the most recently produced sample (0 before the first).
    pub fn last_sequence(&self) -> u32 {
        self.shared.seq.load(Ordering::Acquire)
    }

    /// Replace the sample source. Takes effect on the next start.
    pub fn set_source(&self, source: Box<dyn SampleSource>) {
        self.lock_worker().source = Some(source);
    }

    fn lock_worker(&self) -> MutexGuard<'_, Worker> {
        self.worker.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Drop for TelemetryProducer {
    fn drop(&mut self) {
        self.stop();
    }
}

impl std::fmt::Debug for TelemetryProducer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryProducer")
            .field("running", &self.is_running())
            .field("last_sequence", &self.last_sequence())
            .field("interval", &self.shared.interval)
            .finish()
    }
}

fn run(shared: &Shared, mut source: Box<dyn SampleSource>) -> Box<dyn SampleSource> {
    debug!("producer loop entered");
    let mut deadline = Instant::now();

    while shared.running.load(Ordering::Acquire) {
        let seq = shared.seq.load(Ordering::Relaxed).wrapping_add(1);
        let kind = SampleKind::for_sequence(seq);
        let monotonic_ns = u64::try_from(shared.epoch.elapsed().as_nanos()).unwrap_or(u64::MAX);
        let sample = TelemetrySample::new(seq, kind, monotonic_ns, source.values(kind));

        shared.ring.push(sample);
        shared.stats.record(kind);
        shared.seq.store(seq, Ordering::Release);

        deadline += shared.interval;
        let now = Instant::now();
        if deadline < now {
            deadline = now;
        }
        while shared.running.load(Ordering::Acquire) {
            let now = Instant::now();
            if now >= deadline {
                break;
            }
            thread::park_timeout(deadline - now);
        }
    }

    debug!("producer loop exited");
    source
}

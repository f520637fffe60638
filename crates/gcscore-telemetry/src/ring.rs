use std::sync::atomic::{fence, AtomicU32, AtomicU64, AtomicU8, Ordering};

use crate::error::{Result, TelemetryError};
use crate::sample::{SampleKind, TelemetrySample};

/// One buffer slot. `stamp` is odd while a write is in progress and
/// `2 * (write + 1)` once write number `write` has landed.
#[derive(Default)]
struct Slot {
    stamp: AtomicU64,
    seq: AtomicU32,
    kind: AtomicU8,
    monotonic_ns: AtomicU64,
    values: [AtomicU32; 3],
}

impl Slot {
    fn store(&self, write: u64, sample: &TelemetrySample) {
        self.stamp.store(write.wrapping_mul(2) | 1, Ordering::Relaxed);
        fence(Ordering::Release);
        self.seq.store(sample.seq, Ordering::Relaxed);
        self.kind.store(sample.kind.into(), Ordering::Relaxed);
        self.monotonic_ns
            .store(sample.monotonic_ns, Ordering::Relaxed);
        self.values[0].store(sample.v1.to_bits(), Ordering::Relaxed);
        self.values[1].store(sample.v2.to_bits(), Ordering::Relaxed);
        self.values[2].store(sample.v3.to_bits(), Ordering::Relaxed);
        self.stamp
            .store(complete_stamp(write), Ordering::Release);
    }

    /// Read write number `write`, or `None` if the slot holds another write
    /// or was overwritten mid-read.
    fn load(&self, write: u64) -> Option<TelemetrySample> {
        let expected = complete_stamp(write);
        if self.stamp.load(Ordering::Acquire) != expected {
            return None;
        }

        let seq = self.seq.load(Ordering::Relaxed);
        let kind = self.kind.load(Ordering::Relaxed);
        let monotonic_ns = self.monotonic_ns.load(Ordering::Relaxed);
        let values = [
            f32::from_bits(self.values[0].load(Ordering::Relaxed)),
            f32::from_bits(self.values[1].load(Ordering::Relaxed)),
            f32::from_bits(self.values[2].load(Ordering::Relaxed)),
        ];

        fence(Ordering::Acquire);
        if self.stamp.load(Ordering::Relaxed) != expected {
            return None;
        }

        let kind = SampleKind::try_from(kind).ok()?;
        Some(TelemetrySample::new(seq, kind, monotonic_ns, values))
    }
}

fn complete_stamp(write: u64) -> u64 {
    write.wrapping_add(1).wrapping_mul(2)
}

/// Fixed-capacity circular buffer of telemetry samples.
///
/// Built for one writer and any number of concurrent readers. Neither side
/// takes a lock. A reader that races a full wraparound skips the slots being
/// rewritten, so [`latest`](Self::latest) may return fewer samples than
/// requested but never a torn one.
pub struct TelemetryRingBuffer {
    slots: Box<[Slot]>,
    head: AtomicU64,
    count: AtomicU64,
}

impl TelemetryRingBuffer {
    /// Allocate a buffer of `capacity` slots. It never reallocates.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(TelemetryError::InvalidCapacity);
        }
        Ok(Self {
            slots: (0..capacity).map(|_| Slot::default()).collect(),
            head: AtomicU64::new(0),
            count: AtomicU64::new(0),
        })
    }

    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Live samples, saturating at capacity.
    pub fn len(&self) -> usize {
        self.count.load(Ordering::Acquire) as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Total pushes since construction.
    pub fn pushed(&self) -> u64 {
        self.head.load(Ordering::Acquire)
    }

    /// Store `sample`, overwriting the oldest slot once full.
    ///
    /// Only one thread may push at a time; readers need no coordination.
    pub fn push(&self, sample: TelemetrySample) {
        let write = self.head.fetch_add(1, Ordering::AcqRel);
        self.slot(write).store(write, &sample);

        let capacity = self.slots.len() as u64;
        // `Err` means the count already sits at capacity.
        let _ = self
            .count
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |count| {
                (count < capacity).then_some(count + 1)
            });
    }

    /// Up to `max` most recent samples, newest first.
    pub fn latest(&self, max: usize) -> Vec<TelemetrySample> {
        let count = self.count.load(Ordering::Acquire);
        let head = self.head.load(Ordering::Acquire);
        let n = (max as u64).min(count).min(head);

        let mut out = Vec::with_capacity(n as usize);
        for i in 0..n {
            let write = head - 1 - i;
            if let Some(sample) = self.slot(write).load(write) {
                out.push(sample);
            }
        }
        out
    }

    fn slot(&self, write: u64) -> &Slot {
        &self.slots[(write % self.slots.len() as u64) as usize]
    }
}

impl std::fmt::Debug for TelemetryRingBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TelemetryRingBuffer")
            .field("capacity", &self.capacity())
            .field("len", &self.len())
            .field("pushed", &self.pushed())
            .finish()
    }
}

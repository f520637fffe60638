use serde::{Deserialize, Serialize};

/// Telemetry sample type tag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u8", try_from = "u8")]
#[repr(u8)]
pub enum SampleKind {
    Heartbeat = 0,
    Attitude = 1,
    Gps = 2,
    Battery = 3,
}

impl SampleKind {
    pub const ALL: [SampleKind; 4] = [
        SampleKind::Heartbeat,
        SampleKind::Attitude,
        SampleKind::Gps,
        SampleKind::Battery,
    ];

    /// Kind assigned to the sample with sequence number `seq`.
    pub fn for_sequence(seq: u32) -> Self {
        Self::ALL[(seq % 4) as usize]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            Self::Heartbeat => "heartbeat",
            Self::Attitude => "attitude",
            Self::Gps => "gps",
            Self::Battery => "battery",
        }
    }
}

impl From<SampleKind> for u8 {
    fn from(kind: SampleKind) -> Self {
        kind as u8
    }
}

impl TryFrom<u8> for SampleKind {
    type Error = String;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::ALL
            .get(usize::from(value))
            .copied()
            .ok_or_else(|| format!("unknown sample kind {value}"))
    }
}

/// One immutable telemetry sample.
///
/// Serializes as `{seq, type, v1, v2, v3}`; the timestamp stays internal.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TelemetrySample {
    pub seq: u32,
    #[serde(rename = "type")]
    pub kind: SampleKind,
    /// Nanoseconds on the producer's monotonic clock.
    #[serde(skip)]
    pub monotonic_ns: u64,
    pub v1: f32,
    pub v2: f32,
    pub v3: f32,
}

impl TelemetrySample {
    pub fn new(seq: u32, kind: SampleKind, monotonic_ns: u64, values: [f32; 3]) -> Self {
        Self {
            seq,
            kind,
            monotonic_ns,
            v1: values[0],
            v2: values[1],
            v3: values[2],
        }
    }
}

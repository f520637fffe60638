//! Telemetry pipeline for the ground-station core.
//!
//! A [`TelemetryProducer`] thread pushes one [`TelemetrySample`] per interval
//! into a [`TelemetryRingBuffer`] and counts it in a [`StatsAggregator`]. UI
//! threads poll [`TelemetryEngine::latest_batch`] and
//! [`TelemetryEngine::stats`] without ever blocking the producer.

pub mod config;
pub mod engine;
pub mod error;
pub mod producer;
pub mod ring;
pub mod sample;
pub mod stats;

pub use config::{TelemetryConfig, DEFAULT_CAPACITY, DEFAULT_INTERVAL, DEFAULT_SEED};
pub use engine::{EngineStats, EngineStatus, TelemetryEngine};
pub use error::{Result, TelemetryError};
pub use producer::{SampleSource, SyntheticSource, TelemetryProducer};
pub use ring::TelemetryRingBuffer;
pub use sample::{SampleKind, TelemetrySample};
pub use stats::{StatsAggregator, StatsSnapshot};

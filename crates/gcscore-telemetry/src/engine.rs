use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::config::TelemetryConfig;
use crate::error::Result;
use crate::producer::{SampleSource, SyntheticSource, TelemetryProducer};
use crate::ring::TelemetryRingBuffer;
use crate::sample::TelemetrySample;
use crate::stats::{StatsAggregator, StatsSnapshot};

/// Producer state reported alongside the stats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct EngineStatus {
    pub running: bool,
}

/// `{"engine":{"running":..},"stats":{"total":..,"approxRate":..}}`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct EngineStats {
    pub engine: EngineStatus,
    pub stats: StatsSnapshot,
}

/// Ring buffer, aggregator, and producer wired together.
#[derive(Debug)]
pub struct TelemetryEngine {
    config: TelemetryConfig,
    ring: Arc<TelemetryRingBuffer>,
    stats: Arc<StatsAggregator>,
    producer: TelemetryProducer,
}

impl TelemetryEngine {
    pub fn new(config: TelemetryConfig) -> Result<Self> {
        let source = Box::new(SyntheticSource::new(config.seed));
        Self::with_source(config, source)
    }

    pub fn with_source(config: TelemetryConfig, source: Box<dyn SampleSource>) -> Result<Self> {
        let ring = Arc::new(TelemetryRingBuffer::new(config.capacity)?);
        let stats = Arc::new(StatsAggregator::new());
        let producer =
            TelemetryProducer::new(Arc::clone(&ring), Arc::clone(&stats), config.interval, source)?;
        Ok(Self {
            config,
            ring,
            stats,
            producer,
        })
    }

    pub fn config(&self) -> &TelemetryConfig {
        &self.config
    }

    /// Start producing. `Ok(false)` when already running.
    pub fn start(&self) -> Result<bool> {
        self.producer.start()
    }

    /// Stop producing and wait for the producer to exit. `false` when already stopped.
    pub fn stop(&self) -> bool {
        self.producer.stop()
    }

    pub fn is_running(&self) -> bool {
        self.producer.is_running()
    }

    pub fn stats(&self) -> EngineStats {
        EngineStats {
            engine: EngineStatus {
                running: self.is_running(),
            },
            stats: self.stats.snapshot_now(),
        }
    }

    pub fn stats_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.stats())?)
    }

    /// Up to `max` most recent samples, newest first.
    pub fn latest_batch(&self, max: usize) -> Vec<TelemetrySample> {
        self.ring.latest(max)
    }

    pub fn latest_batch_json(&self, max: usize) -> Result<String> {
        Ok(serde_json::to_string(&self.latest_batch(max))?)
    }

    pub fn ring(&self) -> &Arc<TelemetryRingBuffer> {
        &self.ring
    }

    pub fn aggregator(&self) -> &Arc<StatsAggregator> {
        &self.stats
    }

    pub fn producer(&self) -> &TelemetryProducer {
        &self.producer
    }
}

#[cfg(test)]
mod tests {
    use std::time::{Duration, Instant};

    use super::*;
    use crate::error::TelemetryError;
    use crate::sample::SampleKind;

    fn fast_engine() -> TelemetryEngine {
        TelemetryEngine::new(TelemetryConfig {
            capacity: 16,
            interval: Duration::from_millis(1),
            ..TelemetryConfig::default()
        })
        .unwrap()
    }

    #[test]
    fn idle_engine_stats_json() {
        let engine = TelemetryEngine::new(TelemetryConfig::default()).unwrap();
        let value: serde_json::Value = serde_json::from_str(&engine.stats_json().unwrap()).unwrap();
        assert_eq!(
            value,
            serde_json::json!({"engine": {"running": false}, "stats": {"total": 0, "approxRate": 0.0}})
        );
        assert_eq!(engine.latest_batch_json(5).unwrap(), "[]");
    }

    #[test]
    fn zero_capacity_rejected() {
        let result = TelemetryEngine::new(TelemetryConfig {
            capacity: 0,
            ..TelemetryConfig::default()
        });
        assert!(matches!(result, Err(TelemetryError::InvalidCapacity)));
    }

    #[test]
    fn batch_is_bounded_and_newest_first() {
        let engine = fast_engine();
        engine.start().unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while engine.ring().pushed() < 40 {
            assert!(Instant::now() < deadline);
            std::thread::sleep(Duration::from_millis(2));
        }
        assert!(engine.stats().engine.running);
        engine.stop();

        let batch = engine.latest_batch(100);
        assert_eq!(batch.len(), 16);
        assert!(batch.windows(2).all(|w| w[0].seq == w[1].seq + 1));

        let stats = engine.stats();
        assert!(!stats.engine.running);
        assert_eq!(stats.stats.total, engine.ring().pushed());
        assert!(stats.stats.approx_rate > 0.0);
    }

    #[test]
    fn custom_source_values_reach_batch() {
        struct Fixed;
        impl SampleSource for Fixed {
            fn values(&mut self, kind: SampleKind) -> [f32; 3] {
                [f32::from(u8::from(kind)), 1.0, 2.0]
            }
        }

        let engine = TelemetryEngine::with_source(
            TelemetryConfig {
                capacity: 8,
                interval: Duration::from_millis(1),
                ..TelemetryConfig::default()
            },
            Box::new(Fixed),
        )
        .unwrap();
        engine.start().unwrap();
        let deadline = Instant::now() + Duration::from_secs(5);
        while engine.ring().pushed() < 4 {
            assert!(Instant::now() < deadline);
            std::thread::sleep(Duration::from_millis(1));
        }
        engine.stop();

        let json: serde_json::Value =
            serde_json::from_str(&engine.latest_batch_json(1).unwrap()).unwrap();
        let item = &json[0];
        assert_eq!(item["v1"], item["type"].as_f64().unwrap());
        assert_eq!(item["v2"], 1.0);
        assert_eq!(item["v3"], 2.0);
    }

    #[test]
    fn drop_stops_producer() {
        let engine = fast_engine();
        engine.start().unwrap();
        let ring = Arc::clone(engine.ring());
        drop(engine);
        let pushed = ring.pushed();
        std::thread::sleep(Duration::from_millis(20));
        assert_eq!(ring.pushed(), pushed);
    }
}

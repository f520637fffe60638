use gcscore_telemetry::{EngineStats, TelemetryConfig, TelemetryEngine, TelemetrySample};
use gcscore_vehicle::{CommandSink, LinkConfig, StateObserver, VehicleLink, VehicleState};
use tracing::debug;

use crate::error::Result;

/// Configuration for a [`GcsContext`].
#[derive(Debug, Clone, Default)]
pub struct ContextConfig {
    pub link: LinkConfig,
    pub telemetry: TelemetryConfig,
}

/// One ground-station core instance: a vehicle link and a telemetry engine.
///
/// Every entry point the host calls goes through a context; there is no
/// process-wide instance. Dropping the context stops telemetry and the link.
#[derive(Debug)]
pub struct GcsContext {
    link: VehicleLink,
    telemetry: TelemetryEngine,
}

impl GcsContext {
    /// Create a context with default configuration.
    pub fn new() -> Result<Self> {
        Self::with_config(ContextConfig::default())
    }

    pub fn with_config(config: ContextConfig) -> Result<Self> {
        let telemetry = TelemetryEngine::new(config.telemetry)?;
        let link = VehicleLink::with_config(config.link);
        debug!("gcs context created");
        Ok(Self { link, telemetry })
    }

    pub fn link(&self) -> &VehicleLink {
        &self.link
    }

    pub fn telemetry(&self) -> &TelemetryEngine {
        &self.telemetry
    }

    // --- inbound bytes ---

    /// Feed one transport byte to the decoder.
    pub fn submit(&self, byte: u8) {
        self.link.submit(byte);
    }

    /// Feed a buffer of transport bytes; returns frames completed.
    pub fn process_message(&self, bytes: &[u8]) -> usize {
        self.link.process_message(bytes)
    }

    // --- connection ---

    pub fn start_connection(&self, host: &str, port: Option<u16>) -> Result<()> {
        Ok(self.link.start_connection(host, port)?)
    }

    pub fn stop_connection(&self) {
        self.link.stop_connection();
    }

    pub fn is_connected(&self) -> bool {
        self.link.is_connected()
    }

    // --- commands ---

    pub fn arm_disarm(&self, arm: bool) -> Result<Vec<u8>> {
        Ok(self.link.arm_disarm(arm)?.to_vec())
    }

    pub fn return_to_launch(&self) -> Result<Vec<u8>> {
        Ok(self.link.return_to_launch()?.to_vec())
    }

    pub fn takeoff(&self, altitude: Option<f32>) -> Result<Vec<u8>> {
        Ok(self.link.takeoff(altitude)?.to_vec())
    }

    pub fn set_mode(&self, mode: &str) -> Result<Vec<u8>> {
        Ok(self.link.set_mode(mode)?.to_vec())
    }

    pub fn set_command_sink(&self, sink: Box<dyn CommandSink>) {
        self.link.set_command_sink(sink);
    }

    // --- state ---

    pub fn register_state_observer(&self, observer: StateObserver) {
        self.link.register_state_observer(observer);
    }

    pub fn clear_state_observer(&self) {
        self.link.clear_state_observer();
    }

    pub fn vehicle_state(&self) -> VehicleState {
        self.link.state()
    }

    pub fn vehicle_state_json(&self) -> Result<String> {
        Ok(serde_json::to_string(&self.vehicle_state())?)
    }

    // --- telemetry ---

    /// `Ok(false)` when already running.
    pub fn start_telemetry(&self) -> Result<bool> {
        Ok(self.telemetry.start()?)
    }

    /// Blocks until the producer has exited. `false` when already stopped.
    pub fn stop_telemetry(&self) -> bool {
        self.telemetry.stop()
    }

    pub fn is_telemetry_running(&self) -> bool {
        self.telemetry.is_running()
    }

    pub fn stats(&self) -> EngineStats {
        self.telemetry.stats()
    }

    pub fn stats_json(&self) -> Result<String> {
        Ok(self.telemetry.stats_json()?)
    }

    pub fn latest_batch(&self, max: usize) -> Vec<TelemetrySample> {
        self.telemetry.latest_batch(max)
    }

    pub fn latest_batch_json(&self, max: usize) -> Result<String> {
        Ok(self.telemetry.latest_batch_json(max)?)
    }
}

impl Drop for GcsContext {
    fn drop(&mut self) {
        self.telemetry.stop();
        self.link.clear_state_observer();
        self.link.stop_connection();
        debug!("gcs context dropped");
    }
}

use std::fmt;
use std::io::Write;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use bytes::Bytes;
use gcscore_frame::{DecoderStats, Frame, FrameDecoder};
use tracing::{debug, info, warn};

use crate::command::{CommandEncoder, CommandRequest, DEFAULT_TAKEOFF_ALTITUDE};
use crate::config::LinkConfig;
use crate::dispatcher::{DispatchStats, MessageDispatcher};
use crate::error::{Result, VehicleError};
use crate::state::{StateObserver, VehicleState, VehicleStateStore};

/// Receives every encoded outbound command frame.
pub trait CommandSink: Send {
    fn send_frame(&mut self, frame: &[u8]) -> std::io::Result<()>;
}

impl<W: Write + Send> CommandSink for W {
    fn send_frame(&mut self, frame: &[u8]) -> std::io::Result<()> {
        self.write_all(frame)?;
        self.flush()
    }
}

/// Remote endpoint recorded by [`VehicleLink::start_connection`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Endpoint {
    pub host: String,
    pub port: u16,
}

/// One vehicle connection: inbound decoding, state, and outbound commands.
///
/// Bytes arrive through [`submit`](Self::submit) or
/// [`process_message`](Self::process_message) from whatever transport the host
/// owns. Completed frames are dispatched after the decoder lock is released,
/// so observers may call back into the link.
pub struct VehicleLink {
    config: LinkConfig,
    decoder: Mutex<FrameDecoder>,
    dispatcher: MessageDispatcher,
    encoder: CommandEncoder,
    sink: Mutex<Option<Box<dyn CommandSink>>>,
    endpoint: Mutex<Option<Endpoint>>,
}

impl VehicleLink {
    pub fn new() -> Self {
        Self::with_config(LinkConfig::default())
    }

    pub fn with_config(config: LinkConfig) -> Self {
        Self {
            decoder: Mutex::new(FrameDecoder::with_config(config.frame.clone())),
            dispatcher: MessageDispatcher::new(Arc::new(VehicleStateStore::new())),
            encoder: CommandEncoder::new(config.gcs_system_id, config.gcs_component_id),
            sink: Mutex::new(None),
            endpoint: Mutex::new(None),
            config,
        }
    }

    pub fn config(&self) -> &LinkConfig {
        &self.config
    }

    // --- inbound ---

    /// Feed one transport byte.
    pub fn submit(&self, byte: u8) {
        let frame = lock(&self.decoder).submit(byte);
        if let Some(frame) = frame {
            self.dispatch(&frame);
        }
    }

    /// Feed a buffer of transport bytes, in order.
    ///
    /// Returns the number of frames completed.
    pub fn process_message(&self, bytes: &[u8]) -> usize {
        let frames = lock(&self.decoder).decode_all(bytes);
        for frame in &frames {
            self.dispatch(frame);
        }
        frames.len()
    }

    fn dispatch(&self, frame: &Frame) {
        let outcome = self.dispatcher.dispatch(frame);
        debug!(
            message_id = frame.message_id(),
            sequence = frame.header.sequence,
            ?outcome,
            "frame dispatched"
        );
    }

    pub fn decoder_stats(&self) -> DecoderStats {
        lock(&self.decoder).stats()
    }

    pub fn dispatch_stats(&self) -> DispatchStats {
        self.dispatcher.stats()
    }

    // --- state ---

    pub fn state(&self) -> VehicleState {
        self.dispatcher.store().read()
    }

    pub fn state_store(&self) -> &Arc<VehicleStateStore> {
        self.dispatcher.store()
    }

    /// Register the state observer, replacing any previous one.
    pub fn register_state_observer(&self, observer: StateObserver) {
        self.dispatcher.store().set_observer(observer);
    }

    pub fn clear_state_observer(&self) {
        self.dispatcher.store().clear_observer();
    }

    // --- connection lifecycle ---

    /// Mark the link as connected to `host:port`.
    ///
    /// Bytes are supplied by the host's transport; this records the endpoint
    /// and sets `connected` in the vehicle state. A `port` of `None` uses the
    /// configured default.
    pub fn start_connection(&self, host: &str, port: Option<u16>) -> Result<()> {
        let host = host.trim();
        if host.is_empty() {
            return Err(VehicleError::InvalidArgument("host must not be empty".into()));
        }
        let port = port.unwrap_or(self.config.default_port);
        if port == 0 {
            return Err(VehicleError::InvalidArgument("port must be non-zero".into()));
        }

        *lock(&self.endpoint) = Some(Endpoint {
            host: host.to_string(),
            port,
        });
        self.dispatcher.store().modify(|state| {
            let changed = !state.connected;
            state.connected = true;
            changed
        });
        info!(host, port, "vehicle link started");
        Ok(())
    }

    /// Clear `connected`, whether it was set by `start_connection` or by a
    /// heartbeat. No-op when not connected.
    pub fn stop_connection(&self) {
        let stopped = self.dispatcher.store().modify(|state| {
            let changed = state.connected;
            state.connected = false;
            changed
        });
        if !stopped {
            return;
        }
        lock(&self.endpoint).take();
        lock(&self.decoder).reset();
        info!("vehicle link stopped");
    }

    /// The `connected` flag of the vehicle state.
    pub fn is_connected(&self) -> bool {
        self.dispatcher.store().read().connected
    }

    pub fn endpoint(&self) -> Option<Endpoint> {
        lock(&self.endpoint).clone()
    }

    // --- outbound ---

    /// Install the sink that receives encoded command frames.
    pub fn set_command_sink(&self, sink: Box<dyn CommandSink>) {
        *lock(&self.sink) = Some(sink);
    }

    pub fn clear_command_sink(&self) {
        lock(&self.sink).take();
    }

    /// Encode `request` for the vehicle last seen in a heartbeat and pass it
    /// to the sink, if one is installed. Returns the encoded frame.
    pub fn send_command(&self, request: CommandRequest) -> Result<Bytes> {
        let (target_system, target_component) = {
            let state = self.dispatcher.store().read();
            (state.system_id, state.component_id)
        };
        let frame = self
            .encoder
            .encode(&request, target_system, target_component)?;

        if let Some(sink) = lock(&self.sink).as_mut() {
            sink.send_frame(&frame)?;
        }
        debug!(
            command = request.command_id(),
            target_system, target_component, "command encoded"
        );
        Ok(frame)
    }

    pub fn arm_disarm(&self, arm: bool) -> Result<Bytes> {
        self.send_command(CommandRequest::ArmDisarm(arm))
    }

    pub fn return_to_launch(&self) -> Result<Bytes> {
        self.send_command(CommandRequest::ReturnToLaunch)
    }

    /// Take off to `altitude` metres, or the default of 10 m.
    pub fn takeoff(&self, altitude: Option<f32>) -> Result<Bytes> {
        let altitude = altitude.unwrap_or(DEFAULT_TAKEOFF_ALTITUDE);
        if !altitude.is_finite() {
            return Err(VehicleError::InvalidArgument(format!(
                "takeoff altitude must be finite, got {altitude}"
            )));
        }
        self.send_command(CommandRequest::Takeoff(altitude))
    }

    /// Mode changes have no defined encoding; always `Unsupported`.
    pub fn set_mode(&self, mode: &str) -> Result<Bytes> {
        warn!(mode, "set_mode has no command encoding");
        Err(VehicleError::Unsupported(format!("set_mode({mode})")))
    }
}

impl Default for VehicleLink {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for VehicleLink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VehicleLink")
            .field("connected", &self.is_connected())
            .field("endpoint", &self.endpoint())
            .field("decoder", &self.decoder_stats())
            .field("dispatch", &self.dispatch_stats())
            .finish_non_exhaustive()
    }
}

fn lock<T: ?Sized>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex.lock().unwrap_or_else(PoisonError::into_inner)
}

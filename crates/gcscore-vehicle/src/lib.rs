//! Vehicle-side state for the ground-station core.
//!
//! Completed frames from `gcscore-frame` are folded into one shared
//! [`VehicleState`] by the [`MessageDispatcher`]; outbound commands are built by
//! the [`CommandEncoder`]. [`VehicleLink`] owns all of it for a single vehicle.

pub mod command;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod link;
pub mod state;

pub use command::{
    command_long_payload, CommandEncoder, CommandRequest, CMD_COMPONENT_ARM_DISARM,
    CMD_NAV_RETURN_TO_LAUNCH, CMD_NAV_TAKEOFF, DEFAULT_TAKEOFF_ALTITUDE,
};
pub use config::{LinkConfig, DEFAULT_PORT, GCS_COMPONENT_ID, GCS_SYSTEM_ID};
pub use dispatcher::{mode_name, DispatchOutcome, DispatchStats, MessageDispatcher};
pub use error::{Result, VehicleError};
pub use link::{CommandSink, Endpoint, VehicleLink};
pub use state::{StateObserver, VehicleState, VehicleStateStore, MODE_UNKNOWN};

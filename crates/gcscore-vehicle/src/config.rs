use gcscore_frame::FrameConfig;

/// System id this ground station uses in outbound frames.
pub const GCS_SYSTEM_ID: u8 = 255;

/// Component id this ground station uses in outbound frames.
pub const GCS_COMPONENT_ID: u8 = 0;

/// Conventional MAVLink UDP port.
pub const DEFAULT_PORT: u16 = 14550;

/// Configuration for a [`VehicleLink`](crate::VehicleLink).
#[derive(Debug, Clone)]
pub struct LinkConfig {
    /// Source system id stamped on outbound commands. Default: 255.
    pub gcs_system_id: u8,
    /// Source component id stamped on outbound commands. Default: 0.
    pub gcs_component_id: u8,
    /// Port assumed when a caller passes none. Default: 14550.
    pub default_port: u16,
    /// Inbound decoder settings.
    pub frame: FrameConfig,
}

impl Default for LinkConfig {
    fn default() -> Self {
        Self {
            gcs_system_id: GCS_SYSTEM_ID,
            gcs_component_id: GCS_COMPONENT_ID,
            default_port: DEFAULT_PORT,
            frame: FrameConfig::default(),
        }
    }
}

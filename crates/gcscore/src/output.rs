use std::io::IsTerminal;

use clap::ValueEnum;
use comfy_table::{presets::UTF8_FULL, ContentArrangement, Table};
use gcscore::frame::{message_name, DecoderStats, Frame};
use gcscore::telemetry::{EngineStats, TelemetrySample};
use gcscore::vehicle::{DispatchStats, VehicleState};
use serde::Serialize;

#[derive(Clone, Debug, Copy, ValueEnum)]
pub enum OutputFormat {
    Json,
    Table,
    Pretty,
}

impl OutputFormat {
    pub fn default_for_stdout() -> Self {
        if std::io::stdout().is_terminal() {
            Self::Table
        } else {
            Self::Json
        }
    }
}

#[derive(Serialize)]
pub struct FrameSummary {
    pub sequence: u8,
    pub system_id: u8,
    pub component_id: u8,
    pub message_id: u8,
    pub message: &'static str,
    pub payload_len: usize,
    /// `None` when the message id has no CRC_EXTRA.
    pub verified: Option<bool>,
}

impl From<&Frame> for FrameSummary {
    fn from(frame: &Frame) -> Self {
        Self {
            sequence: frame.header.sequence,
            system_id: frame.header.system_id,
            component_id: frame.header.component_id,
            message_id: frame.header.message_id,
            message: message_name(frame.header.message_id),
            payload_len: frame.payload.len(),
            verified: frame.verify(),
        }
    }
}

#[derive(Serialize)]
pub struct DecodeCounters {
    pub frames_decoded: u64,
    pub checksum_failures: u64,
    pub unverified_frames: u64,
    pub dropped_unknown: u64,
    pub bytes_discarded: u64,
    pub applied: u64,
    pub ignored: u64,
    pub malformed: u64,
}

impl DecodeCounters {
    pub fn new(decoder: DecoderStats, dispatch: DispatchStats) -> Self {
        Self {
            frames_decoded: decoder.frames_decoded,
            checksum_failures: decoder.checksum_failures,
            unverified_frames: decoder.unverified_frames,
            dropped_unknown: decoder.dropped_unknown,
            bytes_discarded: decoder.bytes_discarded,
            applied: dispatch.applied,
            ignored: dispatch.ignored,
            malformed: dispatch.malformed,
        }
    }
}

#[derive(Serialize)]
pub struct DecodeReport {
    pub frames: Vec<FrameSummary>,
    pub counters: DecodeCounters,
    pub state: VehicleState,
}

#[derive(Serialize)]
pub struct EncodeReport {
    pub command: String,
    pub command_id: u16,
    pub target_system: u8,
    pub target_component: u8,
    pub sequence: u8,
    pub len: usize,
    pub hex: String,
}

#[derive(Serialize)]
pub struct TelemetryReport {
    #[serde(flatten)]
    pub stats: EngineStats,
    pub batch: Vec<TelemetrySample>,
}

pub fn print_decode(report: &DecodeReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut frames = table(vec!["SEQ", "SYS", "COMP", "MSG", "LEN", "CRC"]);
            for frame in &report.frames {
                frames.add_row(vec![
                    frame.sequence.to_string(),
                    frame.system_id.to_string(),
                    frame.component_id.to_string(),
                    format!("{} ({})", frame.message, frame.message_id),
                    frame.payload_len.to_string(),
                    verified_label(frame.verified).to_string(),
                ]);
            }
            println!("{frames}");

            let mut summary = table(vec!["FIELD", "VALUE"]);
            for (field, value) in state_rows(&report.state)
                .into_iter()
                .chain(counter_rows(&report.counters))
            {
                summary.add_row(vec![field.to_string(), value]);
            }
            println!("{summary}");
        }
        OutputFormat::Pretty => {
            for frame in &report.frames {
                println!(
                    "frame seq={} sys={} comp={} msg={} ({}) len={} crc={}",
                    frame.sequence,
                    frame.system_id,
                    frame.component_id,
                    frame.message,
                    frame.message_id,
                    frame.payload_len,
                    verified_label(frame.verified)
                );
            }
            for (field, value) in state_rows(&report.state)
                .into_iter()
                .chain(counter_rows(&report.counters))
            {
                println!("{field}: {value}");
            }
        }
    }
}

pub fn print_encode(report: &EncodeReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut out = table(vec!["COMMAND", "ID", "TARGET", "SEQ", "LEN", "HEX"]);
            out.add_row(vec![
                report.command.clone(),
                report.command_id.to_string(),
                format!("{}/{}", report.target_system, report.target_component),
                report.sequence.to_string(),
                report.len.to_string(),
                report.hex.clone(),
            ]);
            println!("{out}");
        }
        OutputFormat::Pretty => println!(
            "command={} id={} target={}/{} seq={} len={} hex={}",
            report.command,
            report.command_id,
            report.target_system,
            report.target_component,
            report.sequence,
            report.len,
            report.hex
        ),
    }
}

pub fn print_telemetry(report: &TelemetryReport, format: OutputFormat) {
    match format {
        OutputFormat::Json => print_json(report),
        OutputFormat::Table => {
            let mut stats = table(vec!["RUNNING", "TOTAL", "RATE (/s)"]);
            stats.add_row(vec![
                report.stats.engine.running.to_string(),
                report.stats.stats.total.to_string(),
                format!("{:.2}", report.stats.stats.approx_rate),
            ]);
            println!("{stats}");

            let mut batch = table(vec!["SEQ", "TYPE", "V1", "V2", "V3"]);
            for sample in &report.batch {
                batch.add_row(vec![
                    sample.seq.to_string(),
                    sample.kind.as_str().to_string(),
                    format!("{:.3}", sample.v1),
                    format!("{:.3}", sample.v2),
                    format!("{:.3}", sample.v3),
                ]);
            }
            println!("{batch}");
        }
        OutputFormat::Pretty => {
            println!(
                "running={} total={} rate={:.2}/s",
                report.stats.engine.running,
                report.stats.stats.total,
                report.stats.stats.approx_rate
            );
            for sample in &report.batch {
                println!(
                    "seq={} type={} v1={:.3} v2={:.3} v3={:.3}",
                    sample.seq,
                    sample.kind.as_str(),
                    sample.v1,
                    sample.v2,
                    sample.v3
                );
            }
        }
    }
}

fn print_json<T: Serialize>(value: &T) {
    println!(
        "{}",
        serde_json::to_string(value).unwrap_or_else(|_| "{}".to_string())
    );
}

fn table(header: Vec<&str>) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(header);
    table
}

fn verified_label(verified: Option<bool>) -> &'static str {
    match verified {
        Some(true) => "ok",
        Some(false) => "bad",
        None => "unverified",
    }
}

fn state_rows(state: &VehicleState) -> Vec<(&'static str, String)> {
    vec![
        ("connected", state.connected.to_string()),
        ("armed", state.armed.to_string()),
        ("mode", state.mode.clone()),
        (
            "source",
            format!("{}/{}", state.system_id, state.component_id),
        ),
        (
            "position",
            format!(
                "{:.7}, {:.7} @ {:.1} m",
                state.latitude, state.longitude, state.altitude
            ),
        ),
        (
            "attitude",
            format!(
                "roll {:.1} pitch {:.1} yaw {:.1} hdg {:.0}",
                state.roll, state.pitch, state.yaw, state.heading
            ),
        ),
        (
            "speed",
            format!("ground {:.1} air {:.1}", state.ground_speed, state.air_speed),
        ),
        (
            "battery",
            format!(
                "{:.2} V {:.2} A {}%",
                state.battery_voltage, state.battery_current, state.battery_remaining
            ),
        ),
        (
            "gps",
            format!(
                "fix {} sats {}",
                state.gps_fix_type, state.gps_num_satellites
            ),
        ),
    ]
}

fn counter_rows(counters: &DecodeCounters) -> Vec<(&'static str, String)> {
    vec![
        ("frames_decoded", counters.frames_decoded.to_string()),
        ("checksum_failures", counters.checksum_failures.to_string()),
        ("unverified_frames", counters.unverified_frames.to_string()),
        ("dropped_unknown", counters.dropped_unknown.to_string()),
        ("bytes_discarded", counters.bytes_discarded.to_string()),
        ("applied", counters.applied.to_string()),
        ("ignored", counters.ignored.to_string()),
        ("malformed", counters.malformed.to_string()),
    ]
}

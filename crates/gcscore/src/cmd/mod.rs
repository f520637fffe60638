use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Subcommand, ValueEnum};

use crate::exit::{CliError, CliResult, USAGE};
use crate::output::OutputFormat;

pub mod decode;
pub mod encode;
pub mod telemetry;
pub mod version;

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Decode a captured byte stream and print frames and resulting vehicle state.
    Decode(DecodeArgs),
    /// Encode a vehicle command frame.
    Encode(EncodeArgs),
    /// Run the telemetry pipeline and print stats and the latest samples.
    Telemetry(TelemetryArgs),
    /// Show version information.
    Version(VersionArgs),
}

pub fn run(command: Command, format: OutputFormat) -> CliResult<i32> {
    match command {
        Command::Decode(args) => decode::run(args, format),
        Command::Encode(args) => encode::run(args, format),
        Command::Telemetry(args) => telemetry::run(args, format),
        Command::Version(args) => version::run(args),
    }
}

#[derive(Args, Debug)]
pub struct DecodeArgs {
    /// Capture file to read, or `-` for stdin.
    pub input: PathBuf,
    /// Treat the input as hex text (whitespace ignored).
    #[arg(long)]
    pub hex: bool,
    /// Accept frames whose checksum does not match.
    #[arg(long)]
    pub no_verify: bool,
    /// Drop frames with message ids outside the catalogue.
    #[arg(long)]
    pub drop_unknown: bool,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum CommandKind {
    Arm,
    Disarm,
    Takeoff,
    Rtl,
}

#[derive(Args, Debug)]
pub struct EncodeArgs {
    /// Command to encode.
    #[arg(value_enum)]
    pub command: CommandKind,
    /// Takeoff altitude in metres.
    #[arg(long, default_value_t = 10.0)]
    pub altitude: f32,
    /// Target system id.
    #[arg(long, default_value_t = 1)]
    pub target_system: u8,
    /// Target component id.
    #[arg(long, default_value_t = 1)]
    pub target_component: u8,
    /// Also write the raw frame to this file.
    #[arg(long, value_name = "FILE")]
    pub out: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct TelemetryArgs {
    /// How long to run (e.g. 2s, 500ms). Ctrl-C stops early.
    #[arg(long, default_value = "1s")]
    pub duration: String,
    /// Time between samples (e.g. 50ms).
    #[arg(long, default_value = "50ms")]
    pub interval: String,
    /// Ring buffer capacity.
    #[arg(long, default_value_t = gcscore::telemetry::DEFAULT_CAPACITY)]
    pub capacity: usize,
    /// Number of most recent samples to print.
    #[arg(long, default_value_t = 10)]
    pub count: usize,
    /// Seed for the synthetic sample source.
    #[arg(long, default_value_t = gcscore::telemetry::DEFAULT_SEED)]
    pub seed: u64,
}

#[derive(Args, Debug)]
pub struct VersionArgs {
    /// Show extended build provenance.
    #[arg(long)]
    pub extended: bool,
}

pub(crate) fn parse_duration(input: &str) -> CliResult<Duration> {
    let input = input.trim();
    if input.is_empty() {
        return Err(CliError::new(USAGE, "duration must not be empty"));
    }

    let (number, unit) = if let Some(num) = input.strip_suffix("ms") {
        (num, "ms")
    } else if let Some(num) = input.strip_suffix('s') {
        (num, "s")
    } else {
        (input, "s")
    };

    let value: u64 = number
        .parse()
        .map_err(|_| CliError::new(USAGE, format!("invalid duration value: {input}")))?;

    if value == 0 {
        return Err(CliError::new(USAGE, "duration must be greater than zero"));
    }

    match unit {
        "ms" => Ok(Duration::from_millis(value)),
        _ => Ok(Duration::from_secs(value)),
    }
}

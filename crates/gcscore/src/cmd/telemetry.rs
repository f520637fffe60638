use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use gcscore::telemetry::TelemetryConfig;
use gcscore::{ContextConfig, GcsContext};

use crate::cmd::{parse_duration, TelemetryArgs};
use crate::exit::{gcs_error, CliError, CliResult, INTERNAL, SUCCESS};
use crate::output::{print_telemetry, OutputFormat, TelemetryReport};

const POLL_INTERVAL: Duration = Duration::from_millis(10);

pub fn run(args: TelemetryArgs, format: OutputFormat) -> CliResult<i32> {
    let duration = parse_duration(&args.duration)?;
    let interval = parse_duration(&args.interval)?;

    let ctx = GcsContext::with_config(ContextConfig {
        telemetry: TelemetryConfig {
            capacity: args.capacity,
            interval,
            seed: args.seed,
        },
        ..ContextConfig::default()
    })
    .map_err(|err| gcs_error("telemetry setup failed", err))?;

    let running = Arc::new(AtomicBool::new(true));
    install_ctrlc_handler(running.clone())?;

    ctx.start_telemetry()
        .map_err(|err| gcs_error("telemetry start failed", err))?;

    let deadline = Instant::now() + duration;
    while running.load(Ordering::SeqCst) && Instant::now() < deadline {
        std::thread::sleep(POLL_INTERVAL.min(deadline.saturating_duration_since(Instant::now())));
    }
    ctx.stop_telemetry();

    let report = TelemetryReport {
        stats: ctx.stats(),
        batch: ctx.latest_batch(args.count),
    };
    print_telemetry(&report, format);
    Ok(SUCCESS)
}

fn install_ctrlc_handler(running: Arc<AtomicBool>) -> CliResult<()> {
    ctrlc::set_handler(move || {
        running.store(false, Ordering::SeqCst);
    })
    .map_err(|err| CliError::new(INTERNAL, format!("signal handler setup failed: {err}")))
}

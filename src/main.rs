//! Motion Recorder - Main Entry Point
//!
//! Headless recorder: runs the simulated sensors for a fixed duration,
//! prints live readings, then exports the session.

use anyhow::Context;
use clap::Parser;
use motion_recorder::{
    config::RecorderConfig, AcquisitionCoordinator, Channel, HttpSink, SimulatedSensors,
};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// How long to wait for outstanding collector requests before exiting
const SINK_DRAIN_TIMEOUT: Duration = Duration::from_secs(2);

#[derive(Debug, Parser)]
#[command(name = "motion-recorder", version, about)]
struct Args {
    /// Configuration file (defaults to the app data directory)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Recording duration in seconds
    #[arg(long, default_value_t = 10.0)]
    duration: f64,

    /// Collector base URL
    #[arg(long)]
    server_url: Option<String>,

    /// Simulated delivery rate per channel
    #[arg(long)]
    rate_hz: Option<u32>,

    /// Directory to export into
    #[arg(long)]
    export_dir: Option<PathBuf>,

    /// Forward every Nth sample per channel
    #[arg(long)]
    interval: Option<u32>,
}

impl Args {
    fn apply(&self, mut config: RecorderConfig) -> RecorderConfig {
        if let Some(url) = &self.server_url {
            config = config.with_server_url(url.clone());
        }
        if let Some(dir) = &self.export_dir {
            config = config.with_export_dir(dir.clone());
        }
        if let Some(interval) = self.interval {
            config = config.with_forward_interval(interval);
        }
        if let Some(rate) = self.rate_hz {
            config.simulation.rate_hz = rate;
        }
        config
    }
}

fn format_reading(channel: Channel, values: Option<[f64; 3]>) -> String {
    match values {
        Some([a, b, c]) => {
            let [na, nb, nc] = channel.component_names();
            format!(
                "{:<5} {}={:+.3} {}={:+.3} {}={:+.3}",
                channel.tag(),
                na,
                a,
                nb,
                b,
                nc,
                c
            )
        }
        None => format!("{:<5} --", channel.tag()),
    }
}

fn recording_duration(secs: f64) -> anyhow::Result<Duration> {
    match Duration::try_from_secs_f64(secs) {
        Ok(duration) => Ok(duration),
        Err(e) => anyhow::bail!("Invalid --duration {}: {}", secs, e),
    }
}

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new("info,motion_recorder=debug")),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let args = Args::parse();
    tracing::info!("Starting Motion Recorder");

    let duration = recording_duration(args.duration)?;
    let config = args.apply(RecorderConfig::load_or_default(args.config.as_deref()));
    let sink = Arc::new(HttpSink::new(&config.sink).context("Failed to create collector sink")?);
    let sensors = Arc::new(SimulatedSensors::from_settings(&config.simulation));
    let coordinator = AcquisitionCoordinator::new(config, sensors, sink.clone());

    coordinator.start();

    let started = Instant::now();
    while started.elapsed() < duration {
        let remaining = duration.saturating_sub(started.elapsed());
        std::thread::sleep(Duration::from_secs(1).min(remaining));
        let readings = coordinator.live_readings();
        println!(
            "[{:>5.1}s] {} records",
            started.elapsed().as_secs_f64(),
            coordinator.record_count()
        );
        for channel in Channel::ALL {
            let values = readings[channel.index()].map(|s| s.values);
            println!("  {}", format_reading(channel, values));
        }
    }

    coordinator.stop();
    if !sink.wait_idle(SINK_DRAIN_TIMEOUT) {
        tracing::warn!("Collector requests still pending at shutdown");
    }
    let stats = sink.stats();
    tracing::info!(
        "Collector: {} sent, {} failed, {} skipped",
        stats.sent,
        stats.failed,
        stats.skipped
    );

    match coordinator.export_file() {
        Some(path) => println!("Exported to {}", path.display()),
        None => anyhow::bail!("Export failed, no file written"),
    }

    Ok(())
}

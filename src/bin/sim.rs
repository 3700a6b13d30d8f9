//! Runs the tracker loop on the host: replayed NMEA for GPS, a loopback
//! radio, and a directory standing in for the SD card.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use log::info;
use sigtrack::sim::{HostPlatform, LoopbackRadio, SimSensors};
use sigtrack::store::FileStore;
use sigtrack::{DeviceConfig, Shutdown, TrackerLoop, WakeReason};

#[derive(Debug, Parser)]
#[command(name = "sigtrack-sim", version, about)]
struct Cli {
    /// Directory holding the persisted records
    #[arg(long, default_value = "sim-state")]
    state_dir: PathBuf,

    /// Recorded receiver output, one sentence per line
    #[arg(long)]
    nmea_file: Option<PathBuf>,

    /// Config the backend replies with to downlink requests; none times out
    #[arg(long)]
    reply_hex: Option<String>,

    /// Boots to run before exiting. A light-sleep config never ends its boot.
    #[arg(long, default_value_t = 3)]
    boots: u32,

    /// Time compression applied to every delay
    #[arg(long, default_value_t = 60)]
    speedup: u32,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    roll: f32,

    #[arg(long, default_value_t = 0.0, allow_hyphen_values = true)]
    pitch: f32,

    #[arg(long, default_value_t = 3.7)]
    volt: f32,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let cli = Cli::parse();

    let reply = cli
        .reply_hex
        .as_deref()
        .map(DeviceConfig::from_hex)
        .transpose()
        .context("invalid --reply-hex")?;

    let mut nmea: Vec<String> = match &cli.nmea_file {
        Some(path) => fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?
            .lines()
            .map(str::to_owned)
            .collect(),
        None => Vec::new(),
    };

    let mut wake = WakeReason::PowerOn;

    for boot in 1..=cli.boots {
        info!("Boot {}/{}", boot, cli.boots);

        let store = FileStore::open(&cli.state_dir)
            .with_context(|| format!("failed to open {}", cli.state_dir.display()))?;
        let mut sensors = SimSensors::new(nmea);
        sensors.roll = cli.roll;
        sensors.pitch = cli.pitch;
        sensors.volt = cli.volt;

        let shutdown = TrackerLoop::boot(
            &mut sensors,
            LoopbackRadio::new(reply),
            HostPlatform::new(wake, cli.speedup),
            store,
        )
        .run();

        nmea = sensors.into_remaining().into();

        wake = match shutdown {
            Shutdown::DeepSleep { minutes } => {
                info!("Deep sleep for {}min", minutes);
                WakeReason::Timer
            }
            Shutdown::Restart => {
                info!("Board reset");
                WakeReason::PowerOn
            }
        };
    }

    Ok(())
}

//! Offline tool for the tracker's wire records: decodes captured uplinks and
//! config replies, and encodes config files into downlink payloads.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{anyhow, bail, Context, Result};
use clap::{Parser, ValueEnum};
use sigtrack::wire::{DEVICE_CONFIG_HEX_LEN, SENSOR_REPORT_HEX_LEN};
use sigtrack::{DeviceConfig, SensorReport};

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum ParserMode {
    /// Decode an uplink report or a config record given as hex
    DecodeData,
    /// Encode a `KEY = value` config file as a downlink payload
    EncodeConfig,
}

#[derive(Debug, Parser)]
#[command(name = "sigtrack-parser", version, about)]
struct Cli {
    #[arg(long, value_enum, default_value_t = ParserMode::DecodeData)]
    parser_mode: ParserMode,

    /// 24 hex digits for a sensor report, 16 for a config
    #[arg(long)]
    hex_string: Option<String>,

    /// Config file to encode
    #[arg(long)]
    in_file: Option<PathBuf>,

    /// Where to write a decoded config as a `KEY = value` file
    #[arg(long)]
    out_file: Option<PathBuf>,
}

/// Decoded record as printed; a config additionally goes to `out_file`
fn decode_data(hex: Option<&str>, out_file: Option<&Path>) -> Result<String> {
    let hex = hex
        .ok_or_else(|| anyhow!("--hex-string is required in decode-data mode"))?
        .trim();

    match hex.len() {
        SENSOR_REPORT_HEX_LEN => {
            let report = SensorReport::from_hex(hex).context("invalid sensor report")?;
            log::info!("Decoded {}", report.to_hex());
            Ok(report.to_string())
        }
        DEVICE_CONFIG_HEX_LEN => {
            let config = DeviceConfig::from_hex(hex).context("invalid config")?;
            log::info!("Decoded {}", config);
            let text = config.to_key_values();

            if let Some(path) = out_file {
                fs::write(path, &text)
                    .with_context(|| format!("failed to write {}", path.display()))?;
                log::info!("Config written to {}", path.display());
            }

            Ok(text.trim_end().to_owned())
        }
        len => bail!(
            "hex string has {len} characters, expected {SENSOR_REPORT_HEX_LEN} (sensor report) \
             or {DEVICE_CONFIG_HEX_LEN} (config)"
        ),
    }
}

fn encode_config(in_file: Option<&Path>) -> Result<String> {
    let path = in_file.ok_or_else(|| anyhow!("--in-file is required in encode-config mode"))?;

    let text = fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let config = DeviceConfig::from_key_values(&text)
        .with_context(|| format!("invalid config file {}", path.display()))?;

    log::info!("Encoded {}", config);
    Ok(format!("Config HEX: {}", config.to_hex()))
}

fn run(cli: &Cli) -> Result<String> {
    match cli.parser_mode {
        ParserMode::DecodeData => decode_data(cli.hex_string.as_deref(), cli.out_file.as_deref()),
        ParserMode::EncodeConfig => encode_config(cli.in_file.as_deref()),
    }
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    match run(&Cli::parse()) {
        Ok(output) => println!("{output}"),
        Err(e) => {
            log::error!("{e:#}");
            eprintln!("sigtrack-parser: {e:#}");
            std::process::exit(1);
        }
    }
}

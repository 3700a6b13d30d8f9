//! Fixed binary records exchanged with the backend.
//!
//! Both records travel as raw bytes over the radio and as hex strings
//! everywhere else (store records, backend payload field, tooling).

use heapless::String;

mod config;
mod error;
#[cfg(feature = "std")]
mod keyval;
mod report;

pub use config::{DeviceConfig, DEVICE_CONFIG_HEX_LEN, DEVICE_CONFIG_LEN};
pub use error::{Malformed, WireError};
#[cfg(feature = "std")]
pub use keyval::KeyValueError;
pub use report::{SensorReport, WakeReason, SENSOR_REPORT_HEX_LEN, SENSOR_REPORT_LEN};

pub fn decode_sensor_report(bytes: &[u8]) -> Result<SensorReport, WireError> {
    SensorReport::try_from(bytes)
}

pub fn encode_sensor_report(report: &SensorReport) -> [u8; SENSOR_REPORT_LEN] {
    report.to_bytes()
}

pub fn decode_device_config(bytes: &[u8]) -> Result<DeviceConfig, WireError> {
    DeviceConfig::try_from(bytes)
}

pub fn encode_device_config(config: &DeviceConfig) -> [u8; DEVICE_CONFIG_LEN] {
    config.to_bytes()
}

/// Parse exactly `N` bytes out of `2 * N` hex characters.
fn bytes_from_hex<const N: usize>(hex: &str) -> Result<[u8; N], WireError> {
    let hex = hex.trim();
    if hex.len() != 2 * N {
        return Err(WireError::MalformedPayload(Malformed::HexLength {
            expected: 2 * N,
            actual: hex.len(),
        }));
    }

    let mut bytes = [0u8; N];
    hex::decode_to_slice(hex, &mut bytes)
        .map_err(|_| WireError::MalformedPayload(Malformed::HexDigit))?;

    Ok(bytes)
}

/// Lowercase hex; empty unless `H` is at least twice the input length.
fn hex_string<const H: usize>(bytes: &[u8]) -> String<H> {
    let mut buf = [0u8; H];
    let Some(digits) = buf.get_mut(..2 * bytes.len()) else {
        return String::new();
    };

    hex::encode_to_slice(bytes, digits)
        .ok()
        .and_then(|()| core::str::from_utf8(digits).ok())
        .and_then(|text| String::try_from(text).ok())
        .unwrap_or_default()
}

use core::fmt;

use heapless::String;

use super::{bytes_from_hex, hex_string, WireError};
use crate::consts::MS_PER_MINUTE;

pub const DEVICE_CONFIG_LEN: usize = 8;
pub const DEVICE_CONFIG_HEX_LEN: usize = 2 * DEVICE_CONFIG_LEN;

/// Device behaviour, set by the backend through downlink replies.
///
/// Every field is kept verbatim so that decode/encode is exact; in particular
/// `deep_sleep` stays a raw byte and only the value `1` selects deep sleep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct DeviceConfig {
    /// Hours between downlink requests; 0 requests one every cycle
    pub downlink_hr: u8,
    /// Minutes slept between cycles
    pub sleep_min: u16,
    pub deep_sleep: u8,
    /// Budget for acquiring a GPS fix
    pub gps_wait_sec: u8,
    /// One-shot command, 0 is a no-op
    pub command: u8,
    pub reserved: u16,
}

impl DeviceConfig {
    /// Matches [`crate::consts::FALLBACK_CONFIG_HEX`]
    pub const FALLBACK: Self = Self {
        downlink_hr: 1,
        sleep_min: 1,
        deep_sleep: 0,
        gps_wait_sec: 30,
        command: 1,
        reserved: 0,
    };

    pub fn to_bytes(&self) -> [u8; DEVICE_CONFIG_LEN] {
        let sleep_min = self.sleep_min.to_be_bytes();
        let reserved = self.reserved.to_be_bytes();

        [
            self.downlink_hr,
            sleep_min[0],
            sleep_min[1],
            self.deep_sleep,
            self.gps_wait_sec,
            self.command,
            reserved[0],
            reserved[1],
        ]
    }

    pub fn from_hex(hex: &str) -> Result<Self, WireError> {
        let bytes: [u8; DEVICE_CONFIG_LEN] = bytes_from_hex(hex)?;
        Self::try_from(&bytes[..])
    }

    pub fn to_hex(&self) -> String<DEVICE_CONFIG_HEX_LEN> {
        hex_string(&self.to_bytes())
    }

    pub fn is_deep_sleep(&self) -> bool {
        self.deep_sleep == 1
    }

    pub fn sleep_ms(&self) -> u32 {
        u32::from(self.sleep_min) * MS_PER_MINUTE
    }
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self::FALLBACK
    }
}

impl TryFrom<&[u8]> for DeviceConfig {
    type Error = WireError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        let bytes: &[u8; DEVICE_CONFIG_LEN] = bytes
            .try_into()
            .map_err(|_| WireError::length(DEVICE_CONFIG_LEN, bytes.len()))?;

        Ok(Self {
            downlink_hr: bytes[0],
            sleep_min: u16::from_be_bytes([bytes[1], bytes[2]]),
            deep_sleep: bytes[3],
            gps_wait_sec: bytes[4],
            command: bytes[5],
            reserved: u16::from_be_bytes([bytes[6], bytes[7]]),
        })
    }
}

impl fmt::Display for DeviceConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "downlink every {}h, sleep {}min ({}, deep_sleep={}), gps wait {}s, command {}, reserved {}",
            self.downlink_hr,
            self.sleep_min,
            if self.is_deep_sleep() { "deep" } else { "light" },
            self.deep_sleep,
            self.gps_wait_sec,
            self.command,
            self.reserved
        )
    }
}

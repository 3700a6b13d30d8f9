use log::{info, warn};

use super::providers::{Platform, Rgb};
use crate::consts::{LOCATE_BLINKS, LOCATE_BLINK_MS};

/// One-shot action requested through a downlink config
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    Noop,
    /// Blink the indicator so the device can be found
    Locate,
    Unknown(u8),
}

impl From<u8> for Command {
    fn from(code: u8) -> Self {
        match code {
            0 => Self::Noop,
            1 => Self::Locate,
            other => Self::Unknown(other),
        }
    }
}

impl Command {
    /// Safe to repeat: a duplicate downlink only repeats the effect
    pub fn execute<P: Platform>(self, platform: &mut P) {
        info!("Executing *once* command: {:?}", self);

        match self {
            Self::Noop => {}
            Self::Locate => blink(platform, LOCATE_BLINKS),
            Self::Unknown(code) => warn!("Unknown command {}, ignoring", code),
        }
    }
}

fn blink<P: Platform>(platform: &mut P, times: u8) {
    info!("Blinking locator indicator");

    for _ in 0..times {
        platform.set_led(Rgb::WHITE);
        platform.delay_ms(LOCATE_BLINK_MS);
        platform.set_led(Rgb::OFF);
        platform.delay_ms(LOCATE_BLINK_MS);
    }
}

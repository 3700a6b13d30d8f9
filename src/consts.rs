/// Config used when the store holds no (readable) config record.
/// Short timers and light sleep, suitable for bench testing.
pub const FALLBACK_CONFIG_HEX: &str = "010001001e010000";

/// Store record names
pub const CONFIG_RECORD: &str = "config.txt";
pub const MINUTES_RECORD: &str = "mins_since_dl.txt";

/// Largest downlink reply the radio is asked for
pub const RX_BUFFER_SIZE: usize = 32;

/// Pause between GPS fix attempts while the wait budget lasts
pub const GPS_POLL_INTERVAL_MS: u32 = 1_000;

/// Boot indicator duration
pub const BOOT_LED_MS: u32 = 2_000;

/// Pause before powering down, so the red indicator is visible
pub const DEEP_SLEEP_PAUSE_MS: u32 = 3_000;

/// Pause before a restart after a failed downlink request
pub const DOWNLINK_RESTART_DELAY_MS: u32 = 5_000;
/// Pause before a restart after a failed uplink
pub const UPLINK_RESTART_DELAY_MS: u32 = 3_000;

/// Locate command: number of blinks and half-period
pub const LOCATE_BLINKS: u8 = 5;
pub const LOCATE_BLINK_MS: u32 = 1_000;

pub const MS_PER_MINUTE: u32 = 60_000;

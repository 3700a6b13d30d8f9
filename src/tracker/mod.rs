//! The per-wake control loop.
//!
//! Each cycle either asks the backend for a new config (downlink) or reports
//! a sensor sample (uplink), then books the sleep time against the persisted
//! minute counter and sleeps. Which of the two happens is derived from the
//! persisted state alone, so a deep sleep that throws away everything in RAM
//! resumes correctly from the store.

use core::fmt;

use log::{debug, error, info, warn};

use crate::consts::{
    BOOT_LED_MS, DEEP_SLEEP_PAUSE_MS, DOWNLINK_RESTART_DELAY_MS, GPS_POLL_INTERVAL_MS,
    RX_BUFFER_SIZE, UPLINK_RESTART_DELAY_MS,
};
use crate::store::{PersistedState, PersistentCounter, Store};
use crate::wire::{DeviceConfig, SensorReport, WakeReason};

mod command;
pub mod providers;

pub use command::Command;
pub use providers::{Platform, Radio, RadioError, Rgb, Sensors};


#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Mode {
    /// Request a config from the backend
    Downlink,
    /// Report a sensor sample
    Uplink,
}

/// Why the loop stopped. The caller powers the board down accordingly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Shutdown {
    /// Power down for `minutes`; the next boot starts from the store
    DeepSleep { minutes: u16 },
    /// Reset the board
    Restart,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerError {
    /// The radio refused a payload; only a restart recovers it
    RadioTransmit { mode: Mode, error: RadioError },
}

impl fmt::Display for TrackerError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::RadioTransmit { mode, error } => write!(f, "{mode:?} send: {error}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for TrackerError {}

/// Downlink is due once `downlink_hr` hours have been booked since the last one
pub fn select_mode(state: &PersistedState) -> Mode {
    let due_minutes = u32::from(state.config.downlink_hr) * 60;

    if state.minutes_since_downlink >= due_minutes {
        Mode::Downlink
    } else {
        Mode::Uplink
    }
}

pub struct TrackerLoop<S, R, P, St> {
    sensors: S,
    radio: R,
    platform: P,
    counter: PersistentCounter<St>,
    /// Captured once per boot and sent with every uplink
    wake: WakeReason,
}

impl<S, R, P, St> TrackerLoop<S, R, P, St>
where
    S: Sensors,
    R: Radio,
    P: Platform,
    St: Store,
{
    pub fn boot(sensors: S, radio: R, mut platform: P, store: St) -> Self {
        platform.set_led(Rgb::GREEN);
        platform.delay_ms(BOOT_LED_MS);
        platform.set_led(Rgb::OFF);

        let wake = platform.wake_reason();
        info!("Wakeup reason: {:?} ({})", wake, wake.code());

        Self {
            sensors,
            radio,
            platform,
            counter: PersistentCounter::new(store),
            wake,
        }
    }

    pub fn load_state(&mut self) -> PersistedState {
        let state = self.counter.load();
        info!("Device configuration: {}", state.config);
        state
    }

    /// Cycle until a deep sleep or a radio failure ends this boot.
    ///
    /// Light sleep keeps looping in place with the in-memory state and the
    /// provider sessions; deep sleep and restart consume the loop.
    pub fn run(mut self) -> Shutdown {
        let mut state = self.load_state();

        loop {
            state = match self.run_cycle(state) {
                Ok(state) => state,
                Err(e) => return self.restart(e),
            };

            if state.config.is_deep_sleep() {
                return self.deep_sleep(&state.config);
            }

            info!("Starting {}min normal sleep", state.config.sleep_min);
            self.platform.delay_ms(state.config.sleep_ms());
        }
    }

    /// One wake cycle up to, but not including, the sleep itself
    pub fn run_cycle(&mut self, mut state: PersistedState) -> Result<PersistedState, TrackerError> {
        let mode = select_mode(&state);
        debug!(
            "{} min since downlink, downlink every {}h: {:?}",
            state.minutes_since_downlink, state.config.downlink_hr, mode
        );

        match mode {
            Mode::Downlink => self.downlink(&mut state)?,
            Mode::Uplink => {
                self.uplink(&state)?;
            }
        }

        let sleep_min = state.config.sleep_min;
        match self.counter.add_minutes(&mut state, sleep_min) {
            Ok(()) => info!("Minutes since downlink: {}", state.minutes_since_downlink),
            Err(e) => warn!("Could not persist minute counter: {}", e),
        }

        Ok(state)
    }

    /// Send the current config as a request and adopt the reply if it differs.
    /// The minute counter restarts whether or not anything was adopted.
    pub fn downlink(&mut self, state: &mut PersistedState) -> Result<(), TrackerError> {
        self.radio.set_receive_mode(true);

        let request = state.config.to_bytes();
        info!(
            "Sending downlink request, payload: {} Length: {}B",
            state.config.to_hex(),
            request.len()
        );

        self.platform.set_led(Rgb::BLUE);
        self.radio
            .send(&request)
            .map_err(|error| TrackerError::RadioTransmit {
                mode: Mode::Downlink,
                error,
            })?;

        let mut buf = [0u8; RX_BUFFER_SIZE];
        let reply = self.radio.receive(&mut buf);
        self.platform.set_led(Rgb::OFF);

        match reply {
            Ok(len) => self.apply_reply(state, &buf[..len.min(buf.len())]),
            Err(e) => warn!("No downlink reply: {}", e),
        }

        match self.counter.reset_minutes(state) {
            Ok(()) => info!("Reset minutes since downlink to 0"),
            Err(e) => warn!("Could not persist minute counter: {}", e),
        }

        Ok(())
    }

    /// Sample the sensors and transmit one report
    pub fn uplink(&mut self, state: &PersistedState) -> Result<SensorReport, TrackerError> {
        self.radio.set_receive_mode(false);

        let (lat, lng) = self.acquire_fix(state.config.gps_wait_sec);
        let report = SensorReport {
            lat,
            lng,
            roll: self.sensors.roll(),
            pitch: self.sensors.pitch(),
            volt: self.sensors.battery_voltage(),
            wake: self.wake.code(),
        };
        info!(
            "GPS:({}, {}) | Roll:{} | Pitch:{} | V:{}",
            report.lat, report.lng, report.roll, report.pitch, report.volt
        );

        let payload = report.to_bytes();
        info!("Payload: {} Length: {}B", report.to_hex(), payload.len());

        self.platform.set_led(Rgb::BLUE);
        self.radio
            .send(&payload)
            .map_err(|error| TrackerError::RadioTransmit {
                mode: Mode::Uplink,
                error,
            })?;
        self.platform.set_led(Rgb::OFF);
        info!("Sent uplink");

        Ok(report)
    }

    /// Poll for a fix for at most `wait_secs`, then settle for `(0, 0)`
    pub fn acquire_fix(&mut self, wait_secs: u8) -> (f32, f32) {
        let budget_ms = u64::from(wait_secs) * 1_000;
        let started = self.platform.uptime_ms();

        loop {
            if let Some(fix) = self.sensors.coordinates() {
                return fix;
            }

            let elapsed = self.platform.uptime_ms().saturating_sub(started);
            if elapsed >= budget_ms {
                warn!("No GPS fix within {}s, reporting (0, 0)", wait_secs);
                return (0.0, 0.0);
            }

            let remaining = budget_ms - elapsed;
            debug!("No GPS position. Giving up in {}ms", remaining);
            // Bounded by GPS_POLL_INTERVAL_MS, so the cast cannot truncate
            self.platform
                .delay_ms(remaining.min(u64::from(GPS_POLL_INTERVAL_MS)) as u32);
        }
    }

    pub fn sensors(&self) -> &S {
        &self.sensors
    }

    pub fn radio(&self) -> &R {
        &self.radio
    }

    pub fn platform(&self) -> &P {
        &self.platform
    }

    pub fn store(&self) -> &St {
        self.counter.store()
    }

    fn apply_reply(&mut self, state: &mut PersistedState, reply: &[u8]) {
        let config = match DeviceConfig::try_from(reply) {
            Ok(config) => config,
            Err(e) => {
                warn!("Discarding downlink reply: {}", e);
                return;
            }
        };
        info!("Config HEX received: {}", config.to_hex());

        if config == state.config {
            info!("Received config matches current one. Ignoring.");
            return;
        }

        state.config = config;
        info!("Updated device configuration: {}", config);

        if let Err(e) = self.counter.save_config(&config) {
            warn!("Could not persist config: {}", e);
        }

        if config.command != 0 {
            Command::from(config.command).execute(&mut self.platform);
        }
    }

    fn deep_sleep(mut self, config: &DeviceConfig) -> Shutdown {
        info!("Pausing before deep sleep");
        self.platform.set_led(Rgb::RED);
        self.platform.delay_ms(DEEP_SLEEP_PAUSE_MS);

        self.counter.release();
        info!("Starting {}min deep sleep", config.sleep_min);

        Shutdown::DeepSleep {
            minutes: config.sleep_min,
        }
    }

    fn restart(mut self, e: TrackerError) -> Shutdown {
        error!("{}. Resetting board", e);

        let TrackerError::RadioTransmit { mode, .. } = e;
        let delay = match mode {
            Mode::Downlink => DOWNLINK_RESTART_DELAY_MS,
            Mode::Uplink => UPLINK_RESTART_DELAY_MS,
        };
        self.platform.delay_ms(delay);

        Shutdown::Restart
    }
}

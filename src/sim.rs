//! Host stand-ins for the tracker's providers, for running the loop off-board.

use std::collections::VecDeque;
use std::thread;
use std::time::{Duration, Instant};

use log::{debug, info};

use crate::gnss::GnssReceiver;
use crate::tracker::{Platform, Radio, RadioError, Rgb, Sensors};
use crate::wire::{DeviceConfig, WakeReason};

/// Replays recorded receiver output, one line per position poll
pub struct SimSensors {
    nmea: VecDeque<String>,
    receiver: GnssReceiver,
    pub roll: f32,
    pub pitch: f32,
    pub volt: f32,
}

impl SimSensors {
    pub fn new(nmea: impl IntoIterator<Item = String>) -> Self {
        Self {
            nmea: nmea.into_iter().collect(),
            receiver: GnssReceiver::new(),
            roll: 0.0,
            pitch: 0.0,
            volt: 3.7,
        }
    }

    /// Lines not yet replayed
    pub fn remaining(&self) -> usize {
        self.nmea.len()
    }

    /// Hand the unreplayed lines to the next boot
    pub fn into_remaining(self) -> VecDeque<String> {
        self.nmea
    }
}

impl Sensors for SimSensors {
    fn coordinates(&mut self) -> Option<(f32, f32)> {
        if let Some(mut line) = self.nmea.pop_front() {
            line.push_str("\r\n");
            self.receiver.feed(line.as_bytes());
        }

        self.receiver.latest().map(|fix| fix.coordinates())
    }

    fn roll(&mut self) -> f32 {
        self.roll
    }

    fn pitch(&mut self) -> f32 {
        self.pitch
    }

    fn battery_voltage(&mut self) -> f32 {
        self.volt
    }
}

/// Logs what would go on air and answers downlink requests with a fixed reply
#[derive(Debug, Default)]
pub struct LoopbackRadio {
    reply: Option<DeviceConfig>,
    receive_mode: bool,
    sent: usize,
}

impl LoopbackRadio {
    /// `None` makes every downlink time out
    pub fn new(reply: Option<DeviceConfig>) -> Self {
        Self {
            reply,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> usize {
        self.sent
    }
}

impl Radio for LoopbackRadio {
    fn set_receive_mode(&mut self, enabled: bool) {
        debug!("Radio receive mode: {}", enabled);
        self.receive_mode = enabled;
    }

    fn send(&mut self, payload: &[u8]) -> Result<(), RadioError> {
        info!("TX {}B: {}", payload.len(), hex::encode(payload));
        self.sent += 1;
        Ok(())
    }

    fn receive(&mut self, buf: &mut [u8]) -> Result<usize, RadioError> {
        let reply = match self.reply {
            Some(config) if self.receive_mode => config.to_bytes(),
            _ => return Err(RadioError::Timeout),
        };

        let len = reply.len().min(buf.len());
        buf[..len].copy_from_slice(&reply[..len]);
        info!("RX {}B: {}", len, hex::encode(&buf[..len]));
        Ok(len)
    }
}

/// Wall clock compressed by `speedup`: a delay of `ms` sleeps `ms / speedup`
#[derive(Debug)]
pub struct HostPlatform {
    started: Instant,
    speedup: u32,
    wake: WakeReason,
    led: Rgb,
}

impl HostPlatform {
    pub fn new(wake: WakeReason, speedup: u32) -> Self {
        Self {
            started: Instant::now(),
            speedup: speedup.max(1),
            wake,
            led: Rgb::OFF,
        }
    }

    pub fn led(&self) -> Rgb {
        self.led
    }
}

impl Platform for HostPlatform {
    fn delay_ms(&mut self, ms: u32) {
        thread::sleep(Duration::from_millis(u64::from(ms)) / self.speedup);
    }

    fn uptime_ms(&self) -> u64 {
        let elapsed = self.started.elapsed().as_millis();
        u64::try_from(elapsed.saturating_mul(u128::from(self.speedup))).unwrap_or(u64::MAX)
    }

    fn set_led(&mut self, color: Rgb) {
        if color != self.led {
            debug!("LED #{:06x}", color.0);
        }
        self.led = color;
    }

    fn wake_reason(&self) -> WakeReason {
        self.wake
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{FileStore, StoreKey};
    use crate::tracker::{Shutdown, TrackerLoop};

    const FIX: &str = "$GPRMC,081836,A,3751.65,S,14507.36,E,000.0,360.0,130998,011.3,E*62";

    #[test]
    fn replayed_fix_reaches_sensors() {
        let mut sensors = SimSensors::new(["garbage".to_owned(), FIX.to_owned()]);

        assert_eq!(sensors.coordinates(), None);
        let (lat, lng) = sensors.coordinates().unwrap();

        assert!((lat + 37.86).abs() < 0.01);
        assert!((lng - 145.12).abs() < 0.01);
        // Exhausted replay keeps the last fix
        assert!(sensors.coordinates().is_some());
        assert_eq!(sensors.remaining(), 0);
    }

    #[test]
    fn loopback_only_answers_in_receive_mode() {
        let mut radio = LoopbackRadio::new(Some(DeviceConfig::FALLBACK));
        let mut buf = [0u8; 32];

        assert_eq!(radio.receive(&mut buf), Err(RadioError::Timeout));

        radio.set_receive_mode(true);
        assert_eq!(radio.receive(&mut buf), Ok(8));
        assert_eq!(&buf[..8], &DeviceConfig::FALLBACK.to_bytes());
    }

    #[test]
    fn uptime_is_scaled() {
        let mut platform = HostPlatform::new(WakeReason::PowerOn, 1_000);

        platform.delay_ms(2_000);

        assert!(platform.uptime_ms() >= 2_000);
    }

    #[test]
    fn boots_over_file_store() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join(StoreKey::Config.record_name()), "01000a0100000000").unwrap();
        std::fs::write(dir.path().join(StoreKey::MinutesSinceDownlink.record_name()), "60").unwrap();
        let store = FileStore::open(dir.path()).unwrap();
        let reply = DeviceConfig::from_hex("02001e0100000000").unwrap();
        let mut radio = LoopbackRadio::new(Some(reply));

        let shutdown = TrackerLoop::boot(
            SimSensors::new([FIX.to_owned()]),
            &mut radio,
            HostPlatform::new(WakeReason::Timer, 1_000),
            store,
        )
        .run();

        // Downlink was due: the reply is adopted and its sleep booked
        assert_eq!(shutdown, Shutdown::DeepSleep { minutes: 30 });
        assert_eq!(radio.sent(), 1);
        assert_eq!(
            std::fs::read_to_string(dir.path().join(StoreKey::Config.record_name())).unwrap(),
            "02001e0100000000"
        );
        assert_eq!(
            std::fs::read_to_string(dir.path().join(StoreKey::MinutesSinceDownlink.record_name()))
                .unwrap(),
            "30"
        );
    }
}

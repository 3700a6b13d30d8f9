use core::fmt::Write;

use heapless::String;
use log::{debug, info, warn};

use super::{StorageError, Store, StoreKey, RECORD_BUFFER_SIZE};
use crate::wire::DeviceConfig;

/// Everything the tracker remembers across sleep cycles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PersistedState {
    pub config: DeviceConfig,
    pub minutes_since_downlink: u32,
}

impl Default for PersistedState {
    fn default() -> Self {
        Self {
            config: DeviceConfig::FALLBACK,
            minutes_since_downlink: 0,
        }
    }
}

/// Minutes-since-downlink counter and config mirror over a [`Store`].
///
/// Reads never fail from the caller's point of view: anything missing or
/// unreadable is replaced by its default, which is written back right away
/// so the next boot sees the same values.
pub struct PersistentCounter<S> {
    store: S,
}

impl<S: Store> PersistentCounter<S> {
    pub fn new(store: S) -> Self {
        Self { store }
    }

    pub fn load(&mut self) -> PersistedState {
        let config = match self.read_config() {
            Ok(Some(config)) => {
                info!("Read {}: {}", StoreKey::Config.record_name(), config.to_hex());
                config
            }
            Ok(None) => {
                warn!("{} missing", StoreKey::Config.record_name());
                self.init_config()
            }
            Err(e) => {
                warn!("{} unusable: {}", StoreKey::Config.record_name(), e);
                self.init_config()
            }
        };

        let minutes_since_downlink = match self.read_minutes() {
            Ok(Some(minutes)) => {
                info!(
                    "Read {}: {}",
                    StoreKey::MinutesSinceDownlink.record_name(),
                    minutes
                );
                minutes
            }
            Ok(None) => {
                warn!("{} missing", StoreKey::MinutesSinceDownlink.record_name());
                self.init_minutes()
            }
            Err(e) => {
                warn!(
                    "{} unusable: {}",
                    StoreKey::MinutesSinceDownlink.record_name(),
                    e
                );
                self.init_minutes()
            }
        };

        PersistedState {
            config,
            minutes_since_downlink,
        }
    }

    /// Write both records. Both are attempted; the first failure is returned.
    pub fn save(&mut self, state: &PersistedState) -> Result<(), StorageError> {
        let config = self.save_config(&state.config);
        let minutes = self.save_minutes(state.minutes_since_downlink);
        config.and(minutes)
    }

    pub fn save_config(&mut self, config: &DeviceConfig) -> Result<(), StorageError> {
        self.store
            .write(StoreKey::Config, config.to_hex().as_bytes())?;
        debug!("Wrote {} to {}", config.to_hex(), StoreKey::Config.record_name());
        Ok(())
    }

    pub fn save_minutes(&mut self, minutes: u32) -> Result<(), StorageError> {
        let mut text: String<10> = String::new();
        // u32::MAX has 10 digits
        let _ = write!(text, "{minutes}");

        self.store
            .write(StoreKey::MinutesSinceDownlink, text.as_bytes())?;
        debug!(
            "Wrote {} to {}",
            minutes,
            StoreKey::MinutesSinceDownlink.record_name()
        );
        Ok(())
    }

    pub fn add_minutes(
        &mut self,
        state: &mut PersistedState,
        minutes: u16,
    ) -> Result<(), StorageError> {
        state.minutes_since_downlink = state
            .minutes_since_downlink
            .saturating_add(u32::from(minutes));
        self.save_minutes(state.minutes_since_downlink)
    }

    pub fn reset_minutes(&mut self, state: &mut PersistedState) -> Result<(), StorageError> {
        state.minutes_since_downlink = 0;
        self.save_minutes(0)
    }

    /// Hand the medium back before power-down
    pub fn release(&mut self) {
        self.store.release();
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    fn read_config(&mut self) -> Result<Option<DeviceConfig>, StorageError> {
        let mut buf = [0u8; RECORD_BUFFER_SIZE];

        match self.store.read(StoreKey::Config, &mut buf)? {
            None => Ok(None),
            Some(record) => {
                let hex = core::str::from_utf8(record).map_err(|_| StorageError::Corrupt)?;
                DeviceConfig::from_hex(hex)
                    .map(Some)
                    .map_err(|_| StorageError::Corrupt)
            }
        }
    }

    fn read_minutes(&mut self) -> Result<Option<u32>, StorageError> {
        let mut buf = [0u8; RECORD_BUFFER_SIZE];

        match self.store.read(StoreKey::MinutesSinceDownlink, &mut buf)? {
            None => Ok(None),
            Some(record) => core::str::from_utf8(record)
                .ok()
                .and_then(|text| text.trim().parse::<u32>().ok())
                .map(Some)
                .ok_or(StorageError::Corrupt),
        }
    }

    fn init_config(&mut self) -> DeviceConfig {
        let config = DeviceConfig::FALLBACK;
        match self.save_config(&config) {
            Ok(()) => info!(
                "Init {} with defaults: {}",
                StoreKey::Config.record_name(),
                config.to_hex()
            ),
            Err(e) => warn!("Could not persist default config: {}", e),
        }
        config
    }

    fn init_minutes(&mut self) -> u32 {
        match self.save_minutes(0) {
            Ok(()) => info!(
                "Init {} with defaults: 0",
                StoreKey::MinutesSinceDownlink.record_name()
            ),
            Err(e) => warn!("Could not persist minute counter: {}", e),
        }
        0
    }
}

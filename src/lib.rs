#![cfg_attr(not(feature = "std"), no_std)]

//! Tracker firmware core: the uplink/downlink wire records, the persisted
//! minute counter, and the per-wake control loop that ties them to the
//! sensor, radio and platform providers.

pub mod consts;
pub mod gnss;
pub mod store;
pub mod tracker;
pub mod wire;

#[cfg(feature = "std")]
pub mod sim;

pub use store::{PersistedState, PersistentCounter, Store, StoreKey, StorageError};
pub use tracker::{Mode, Shutdown, TrackerError, TrackerLoop};
pub use wire::{DeviceConfig, SensorReport, WakeReason, WireError};

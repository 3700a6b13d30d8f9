//! Durable state surviving deep sleep and power loss.

use core::fmt;

use crate::consts::{CONFIG_RECORD, MINUTES_RECORD};

mod counter;
#[cfg(feature = "std")]
mod file;
mod memory;

pub use counter::{PersistedState, PersistentCounter};
#[cfg(feature = "std")]
pub use file::FileStore;
pub use memory::MemoryStore;

/// Largest record a store is expected to hold
pub const RECORD_BUFFER_SIZE: usize = 32;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StoreKey {
    /// Hex form of the device config
    Config,
    /// Decimal minutes since the last downlink
    MinutesSinceDownlink,
}

impl StoreKey {
    pub fn record_name(self) -> &'static str {
        match self {
            Self::Config => CONFIG_RECORD,
            Self::MinutesSinceDownlink => MINUTES_RECORD,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageError {
    /// Medium missing or not mounted
    Unavailable,
    /// Record exists but cannot be interpreted
    Corrupt,
    #[cfg(feature = "std")]
    Io(std::io::ErrorKind),
}

impl fmt::Display for StorageError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Unavailable => write!(f, "storage unavailable"),
            Self::Corrupt => write!(f, "corrupt record"),
            #[cfg(feature = "std")]
            Self::Io(kind) => write!(f, "storage I/O error: {kind}"),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for StorageError {}

#[cfg(feature = "std")]
impl From<std::io::Error> for StorageError {
    fn from(e: std::io::Error) -> Self {
        StorageError::Io(e.kind())
    }
}

/// Key-value medium holding the two persisted records.
///
/// A missing record is not an error. `write` replaces the whole record and
/// must leave either the old or the new content behind if interrupted.
pub trait Store {
    /// Copy the record into `buf` and return the filled part
    fn read<'b>(&mut self, key: StoreKey, buf: &'b mut [u8])
        -> Result<Option<&'b [u8]>, StorageError>;

    fn write(&mut self, key: StoreKey, data: &[u8]) -> Result<(), StorageError>;

    /// Called before power-down; the store is not used again until boot
    fn release(&mut self) {}
}

impl<S: Store + ?Sized> Store for &mut S {
    fn read<'b>(
        &mut self,
        key: StoreKey,
        buf: &'b mut [u8],
    ) -> Result<Option<&'b [u8]>, StorageError> {
        (**self).read(key, buf)
    }

    fn write(&mut self, key: StoreKey, data: &[u8]) -> Result<(), StorageError> {
        (**self).write(key, data)
    }

    fn release(&mut self) {
        (**self).release()
    }
}

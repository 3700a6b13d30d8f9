use heapless::Vec;

use super::{StorageError, Store, StoreKey, RECORD_BUFFER_SIZE};

type Record = Vec<u8, RECORD_BUFFER_SIZE>;

/// RAM-backed store, the analogue of RTC memory that survives deep sleep
/// but not power loss.
#[derive(Debug, Default, Clone)]
pub struct MemoryStore {
    config: Option<Record>,
    minutes: Option<Record>,
    released: bool,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Preload a record; content longer than a record slot is truncated
    pub fn with_record(mut self, key: StoreKey, data: &[u8]) -> Self {
        let len = data.len().min(RECORD_BUFFER_SIZE);
        *self.slot(key) = Vec::from_slice(&data[..len]).ok();
        self
    }

    pub fn record(&self, key: StoreKey) -> Option<&[u8]> {
        match key {
            StoreKey::Config => self.config.as_deref(),
            StoreKey::MinutesSinceDownlink => self.minutes.as_deref(),
        }
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    fn slot(&mut self, key: StoreKey) -> &mut Option<Record> {
        match key {
            StoreKey::Config => &mut self.config,
            StoreKey::MinutesSinceDownlink => &mut self.minutes,
        }
    }
}

impl Store for MemoryStore {
    fn read<'b>(
        &mut self,
        key: StoreKey,
        buf: &'b mut [u8],
    ) -> Result<Option<&'b [u8]>, StorageError> {
        self.released = false;

        match self.record(key) {
            None => Ok(None),
            Some(data) if data.len() > buf.len() => Err(StorageError::Corrupt),
            Some(data) => {
                let len = data.len();
                buf[..len].copy_from_slice(data);
                Ok(Some(&buf[..len]))
            }
        }
    }

    fn write(&mut self, key: StoreKey, data: &[u8]) -> Result<(), StorageError> {
        let record = Vec::from_slice(data).map_err(|_| StorageError::Corrupt)?;
        *self.slot(key) = Some(record);
        Ok(())
    }

    fn release(&mut self) {
        self.released = true;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_record_reads_as_none() {
        let mut store = MemoryStore::new();
        let mut buf = [0u8; RECORD_BUFFER_SIZE];

        assert_eq!(store.read(StoreKey::Config, &mut buf), Ok(None));
    }

    #[test]
    fn write_replaces_record() {
        let mut store = MemoryStore::new().with_record(StoreKey::MinutesSinceDownlink, b"120");
        store.write(StoreKey::MinutesSinceDownlink, b"5").unwrap();

        let mut buf = [0u8; RECORD_BUFFER_SIZE];
        assert_eq!(
            store.read(StoreKey::MinutesSinceDownlink, &mut buf),
            Ok(Some(&b"5"[..]))
        );
    }

    #[test]
    fn oversized_write_is_rejected() {
        let mut store = MemoryStore::new();

        assert_eq!(
            store.write(StoreKey::Config, &[b'0'; RECORD_BUFFER_SIZE + 1]),
            Err(StorageError::Corrupt)
        );
        assert_eq!(store.record(StoreKey::Config), None);
    }
}

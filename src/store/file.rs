use std::fs::{self, File};
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};

use log::{debug, warn};

use super::{StorageError, Store, StoreKey};

/// One file per record inside a directory, standing in for the SD card.
///
/// Writes go to a sibling temp file which is synced and renamed over the
/// record, so a restart mid-write leaves the previous record intact.
#[derive(Debug)]
pub struct FileStore {
    dir: PathBuf,
}

impl FileStore {
    /// Use `dir` as the mount point, creating it if needed
    pub fn open(dir: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let dir = dir.into();
        fs::create_dir_all(&dir)?;
        Ok(Self { dir })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path(&self, key: StoreKey) -> PathBuf {
        self.dir.join(key.record_name())
    }
}

impl Store for FileStore {
    fn read<'b>(
        &mut self,
        key: StoreKey,
        buf: &'b mut [u8],
    ) -> Result<Option<&'b [u8]>, StorageError> {
        let data = match fs::read(self.path(key)) {
            Ok(data) => data,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };

        if data.len() > buf.len() {
            return Err(StorageError::Corrupt);
        }

        buf[..data.len()].copy_from_slice(&data);
        Ok(Some(&buf[..data.len()]))
    }

    fn write(&mut self, key: StoreKey, data: &[u8]) -> Result<(), StorageError> {
        let target = self.path(key);
        let staging = self.dir.join(format!("{}.tmp", key.record_name()));

        let mut file = File::create(&staging)?;
        file.write_all(data)?;
        file.sync_all()?;
        drop(file);

        fs::rename(&staging, &target)?;

        // Make the rename itself durable; not every platform allows syncing a directory
        if let Err(e) = File::open(&self.dir).and_then(|dir| dir.sync_all()) {
            debug!("Directory sync skipped: {}", e);
        }

        Ok(())
    }

    fn release(&mut self) {
        debug!("Releasing store at {}", self.dir.display());
        if let Err(e) = File::open(&self.dir).and_then(|dir| dir.sync_all()) {
            warn!("Final sync of {} failed: {}", self.dir.display(), e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{PersistedState, PersistentCounter, RECORD_BUFFER_SIZE};

    #[test]
    fn records_are_plain_text_files() {
        let dir = tempfile::tempdir().unwrap();
        let mut counter = PersistentCounter::new(FileStore::open(dir.path()).unwrap());

        let mut state = counter.load();
        counter.add_minutes(&mut state, 15).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join("config.txt")).unwrap(),
            "010001001e010000"
        );
        assert_eq!(
            fs::read_to_string(dir.path().join("mins_since_dl.txt")).unwrap(),
            "15"
        );
        assert!(!dir.path().join("mins_since_dl.txt.tmp").exists());
    }

    #[test]
    fn state_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let state = PersistedState {
            minutes_since_downlink: 90,
            ..PersistedState::default()
        };

        PersistentCounter::new(FileStore::open(dir.path()).unwrap())
            .save(&state)
            .unwrap();

        let mut reopened = PersistentCounter::new(FileStore::open(dir.path()).unwrap());
        assert_eq!(reopened.load(), state);
    }

    #[test]
    fn stale_staging_file_does_not_shadow_record() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("mins_since_dl.txt"), "30").unwrap();
        // Leftover from a write interrupted before its rename
        fs::write(dir.path().join("mins_since_dl.txt.tmp"), "9").unwrap();

        let mut counter = PersistentCounter::new(FileStore::open(dir.path()).unwrap());

        assert_eq!(counter.load().minutes_since_downlink, 30);
    }

    #[test]
    fn missing_file_is_none_and_oversized_is_corrupt() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::open(dir.path().join("sd")).unwrap();
        let mut buf = [0u8; RECORD_BUFFER_SIZE];

        assert_eq!(store.read(StoreKey::Config, &mut buf), Ok(None));

        fs::write(store.path(StoreKey::Config), [b'f'; RECORD_BUFFER_SIZE + 1]).unwrap();
        assert_eq!(
            store.read(StoreKey::Config, &mut buf),
            Err(StorageError::Corrupt)
        );
    }
}

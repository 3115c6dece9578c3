//! File Storage Module
//!
//! Disk-backed [`StoragePort`]: one file per key inside a cache directory.
//! Files are named by the SHA-256 of the key so names stay short whatever
//! the key length. The first line of each file holds the key itself (URL-safe
//! base64) and the rest is the stored value.

use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use base64::{engine::general_purpose::URL_SAFE_NO_PAD, Engine as _};
use sha2::{Digest, Sha256};
use tracing::debug;

use crate::cache::storage::{check_quota, StoragePort};
use crate::error::StorageError;

const FILE_EXTENSION: &str = "entry";

/// Persists cache values as files under a directory.
#[derive(Debug, Clone)]
pub struct FileStorage {
    dir: PathBuf,
    quota: Option<usize>,
}

impl FileStorage {
    /// Creates a store rooted at `dir`. The directory is created on first write.
    pub fn new(dir: impl Into<PathBuf>, quota: Option<usize>) -> Self {
        Self {
            dir: dir.into(),
            quota,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, key: &str) -> PathBuf {
        let digest = Sha256::digest(key.as_bytes());
        self.dir.join(format!("{:x}.{}", digest, FILE_EXTENSION))
    }

    /// Reads `path` and splits it into key and value.
    ///
    /// Returns None for files that are not entries written by this store.
    fn read_entry(path: &Path) -> Result<Option<(String, String)>, StorageError> {
        if path.extension().and_then(|e| e.to_str()) != Some(FILE_EXTENSION) {
            return Ok(None);
        }
        let contents = match fs::read(path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(None),
            Err(e) => return Err(e.into()),
        };
        Ok(parse_entry(&contents))
    }

    /// Total key + value bytes currently on disk.
    pub fn used_bytes(&self) -> Result<usize, StorageError> {
        Ok(self
            .entries()?
            .iter()
            .map(|(key, value)| key.len() + value.len())
            .sum())
    }

    fn entries(&self) -> Result<Vec<(String, String)>, StorageError> {
        let dir_entries = match fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for dir_entry in dir_entries {
            let path = dir_entry?.path();
            match Self::read_entry(&path)? {
                Some(entry) => entries.push(entry),
                None => debug!("Ignoring foreign file in cache dir: {}", path.display()),
            }
        }
        Ok(entries)
    }
}

fn parse_entry(contents: &[u8]) -> Option<(String, String)> {
    let newline = contents.iter().position(|&b| b == b'\n')?;
    let key = String::from_utf8(URL_SAFE_NO_PAD.decode(&contents[..newline]).ok()?).ok()?;
    // Non UTF-8 content is surfaced as a value the codec will reject
    let value = String::from_utf8(contents[newline + 1..].to_vec()).unwrap_or_default();
    Some((key, value))
}

impl StoragePort for FileStorage {
    fn get(&self, key: &str) -> Result<Option<String>, StorageError> {
        match Self::read_entry(&self.path_for(key))? {
            Some((stored_key, value)) if stored_key == key => Ok(Some(value)),
            _ => Ok(None),
        }
    }

    fn set(&mut self, key: &str, value: &str) -> Result<(), StorageError> {
        fs::create_dir_all(&self.dir)?;
        let path = self.path_for(key);

        if self.quota.is_some() {
            let replaced = self.get(key)?.map_or(0, |v| key.len() + v.len());
            check_quota(self.quota, self.used_bytes()?, replaced, key, value)?;
        }

        let contents = format!("{}\n{}", URL_SAFE_NO_PAD.encode(key), value);
        fs::write(path, contents)?;
        Ok(())
    }

    fn remove(&mut self, key: &str) -> Result<(), StorageError> {
        match fs::remove_file(self.path_for(key)) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn keys(&self) -> Result<Vec<String>, StorageError> {
        Ok(self.entries()?.into_iter().map(|(key, _)| key).collect())
    }
}

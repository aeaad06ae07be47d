//! Durable key -> bytes local file storage (C6).
//!
//! Keys are snapshot hashes; values are opaque serialized blobs. Writes are
//! synced to disk before returning. Overwriting an existing key is an error
//! unless the caller explicitly asks to replace it.

use std::path::{Path, PathBuf};

use sysinfo::{DiskExt, System, SystemExt};

#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    #[error("key already exists: {0}")]
    KeyAlreadyExists(String),
    #[error("key not found: {0}")]
    KeyNotFound(String),
    #[error("background task failed: {0}")]
    TaskJoin(String),
}

#[derive(Clone)]
pub struct LocalFileStorage {
    root: PathBuf,
}

impl LocalFileStorage {
    pub fn new(root: impl Into<PathBuf>) -> Result<Self, StorageError> {
        let root = root.into();
        std::fs::create_dir_all(&root)?;
        Ok(Self { root })
    }

    fn path_for(&self, key: &str) -> PathBuf {
        self.root.join(key)
    }

    /// Fails with [`StorageError::KeyAlreadyExists`] if `key` is already
    /// present; use [`Self::write_replacing`] to overwrite deliberately.
    pub async fn write(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.write_inner(key, bytes, false).await
    }

    pub async fn write_replacing(&self, key: &str, bytes: Vec<u8>) -> Result<(), StorageError> {
        self.write_inner(key, bytes, true).await
    }

    async fn write_inner(&self, key: &str, bytes: Vec<u8>, replace: bool) -> Result<(), StorageError> {
        let path = self.path_for(key);
        let key_owned = key.to_string();
        tokio::task::spawn_blocking(move || write_durable(&path, &bytes, replace, key_owned))
            .await
            .map_err(|e| StorageError::TaskJoin(e.to_string()))?
    }

    pub async fn read(&self, key: &str) -> Result<Vec<u8>, StorageError> {
        let path = self.path_for(key);
        let key_owned = key.to_string();
        tokio::task::spawn_blocking(move || {
            std::fs::read(&path).map_err(|e| {
                if e.kind() == std::io::ErrorKind::NotFound {
                    StorageError::KeyNotFound(key_owned)
                } else {
                    StorageError::Io(e)
                }
            })
        })
        .await
        .map_err(|e| StorageError::TaskJoin(e.to_string()))?
    }

    pub async fn list(&self) -> Result<Vec<String>, StorageError> {
        let root = self.root.clone();
        tokio::task::spawn_blocking(move || list_keys(&root))
            .await
            .map_err(|e| StorageError::TaskJoin(e.to_string()))?
    }

    /// Bytes free on the filesystem backing `root`.
    pub fn get_usable_space(&self) -> u64 {
        usable_space_for(&self.root)
    }

    /// Total bytes currently occupied by stored values.
    pub fn get_occupied_space(&self) -> u64 {
        occupied_space_for(&self.root)
    }
}

fn write_durable(path: &Path, bytes: &[u8], replace: bool, key: String) -> Result<(), StorageError> {
    use std::io::Write;

    if !replace && path.exists() {
        return Err(StorageError::KeyAlreadyExists(key));
    }
    let mut file = std::fs::File::create(path)?;
    file.write_all(bytes)?;
    file.sync_all()?;
    Ok(())
}

fn list_keys(root: &Path) -> Result<Vec<String>, StorageError> {
    let mut keys = Vec::new();
    for entry in std::fs::read_dir(root)? {
        let entry = entry?;
        if entry.file_type()?.is_file() {
            if let Some(name) = entry.file_name().to_str() {
                keys.push(name.to_string());
            }
        }
    }
    Ok(keys)
}

fn occupied_space_for(root: &Path) -> u64 {
    let Ok(entries) = std::fs::read_dir(root) else {
        return 0;
    };
    entries
        .filter_map(|e| e.ok())
        .filter_map(|e| e.metadata().ok())
        .filter(|m| m.is_file())
        .map(|m| m.len())
        .sum()
}

fn usable_space_for(root: &Path) -> u64 {
    let mut sys = System::new();
    sys.refresh_disks_list();
    sys.refresh_disks();

    let canonical = root.canonicalize().unwrap_or_else(|_| root.to_path_buf());

    let mut best: Option<(u64, usize)> = None;
    for disk in sys.disks() {
        let mount = disk.mount_point();
        if canonical.starts_with(mount) {
            let len = mount.as_os_str().len();
            if best.map(|(_, l)| len > l).unwrap_or(true) {
                best = Some((disk.available_space(), len));
            }
        }
    }
    best.map(|(space, _)| space).unwrap_or(0)
}

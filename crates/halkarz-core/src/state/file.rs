// # File Seen Store
//
// File-based implementation of SeenStore with crash recovery.
//
// ## Purpose
//
// Keeps the seen set across restarts so listings already reported are not
// reported again.
//
// ## Crash Recovery
//
// - Atomic writes: new content goes to `<file name>.tmp`, then is renamed over
//   the store file, so a reader never sees a partial file
// - Backup: the previous file is copied to `<file name>.backup` before each
//   rename
// - Recovery: an unparseable store falls back to the backup, then to an empty
//   set
//
// ## File Format
//
// ```json
// [
//   "Alfa Holding_1-2 Ekim 2025",
//   "Beta Gıda_8-9 Ekim 2025"
// ]
// ```

use async_trait::async_trait;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;

use crate::Error;
use crate::state::SeenSet;
use crate::traits::SeenStore;

/// Why a store file could not be loaded
enum LoadFailure {
    /// The file exists but could not be read
    Unreadable(std::io::Error),
    /// The file was read but is not a JSON array of strings
    Corrupt(serde_json::Error),
}

/// File-based seen store with crash recovery
///
/// # Example
///
/// ```rust,no_run
/// use halkarz_core::state::{FileSeenStore, SeenSet};
/// use halkarz_core::traits::SeenStore;
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let store = FileSeenStore::new("/var/lib/halkarz/sent_halkarz.json").await?;
///
///     let mut seen = store.load().await;
///     seen.mark_seen("Alfa Holding_1-2 Ekim 2025");
///     store.persist(&seen).await?;
///
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct FileSeenStore {
    path: PathBuf,
}

impl FileSeenStore {
    /// Open a file seen store, creating parent directories if needed
    ///
    /// A store that cannot be created or opened stops startup, so it is
    /// reported as a configuration error. Later write failures are not fatal.
    pub async fn new<P: AsRef<Path>>(path: P) -> Result<Self, Error> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            fs::create_dir_all(parent).await.map_err(|e| {
                Error::config(format!(
                    "Failed to create seen-store directory {}: {}",
                    parent.display(),
                    e
                ))
            })?;
        }

        let store = Self { path };
        store.check_writable().await?;
        Ok(store)
    }

    /// Fail fast when the store could never be written
    async fn check_writable(&self) -> Result<(), Error> {
        let unusable = |target: &Path, e: std::io::Error| {
            Error::config(format!(
                "Seen store {} cannot be opened: {}",
                target.display(),
                e
            ))
        };

        if self.path.is_file() {
            fs::OpenOptions::new()
                .append(true)
                .open(&self.path)
                .await
                .map_err(|e| unusable(&self.path, e))?;
        }

        let temp_path = Self::temp_path(&self.path);
        fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .await
            .map_err(|e| unusable(&temp_path, e))?;
        if let Err(e) = fs::remove_file(&temp_path).await {
            tracing::warn!("Failed to remove {}: {}", temp_path.display(), e);
        }

        Ok(())
    }

    /// Path of the store file
    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn read_set(path: &Path) -> Result<Option<SeenSet>, LoadFailure> {
        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(path)
            .await
            .map_err(LoadFailure::Unreadable)?;
        let identities: Vec<String> =
            serde_json::from_str(&content).map_err(LoadFailure::Corrupt)?;

        Ok(Some(identities.into_iter().collect()))
    }

    async fn load_from_backup(&self) -> SeenSet {
        let backup_path = Self::backup_path(&self.path);
        match Self::read_set(&backup_path).await {
            Ok(Some(set)) => {
                tracing::info!("Recovered seen set from backup: {} identities", set.len());
                set
            }
            Ok(None) => {
                tracing::warn!("No backup file found. Starting with empty seen set.");
                SeenSet::new()
            }
            Err(_) => {
                tracing::error!("Backup also unusable. Starting with empty seen set.");
                SeenSet::new()
            }
        }
    }

    async fn write_set(&self, set: &SeenSet) -> Result<(), Error> {
        let json = serde_json::to_string_pretty(&set.sorted())
            .map_err(|e| Error::storage(format!("Failed to serialize seen set: {}", e)))?;

        let temp_path = Self::temp_path(&self.path);
        {
            let mut file = fs::File::create(&temp_path).await.map_err(|e| {
                Error::storage(format!(
                    "Failed to create temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.write_all(json.as_bytes()).await.map_err(|e| {
                Error::storage(format!(
                    "Failed to write to temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;

            file.sync_all().await.map_err(|e| {
                Error::storage(format!(
                    "Failed to sync temp file {}: {}",
                    temp_path.display(),
                    e
                ))
            })?;
        }

        if self.path.exists() {
            let backup_path = Self::backup_path(&self.path);
            if let Err(e) = fs::copy(&self.path, &backup_path).await {
                tracing::warn!("Failed to create backup: {}", e);
            }
        }

        fs::rename(&temp_path, &self.path).await.map_err(|e| {
            Error::storage(format!(
                "Failed to rename {} to {}: {}",
                temp_path.display(),
                self.path.display(),
                e
            ))
        })?;

        tracing::trace!(
            "Seen set written to {} ({} identities)",
            self.path.display(),
            set.len()
        );
        Ok(())
    }

    fn temp_path(path: &Path) -> PathBuf {
        Self::sibling(path, ".tmp")
    }

    fn backup_path(path: &Path) -> PathBuf {
        Self::sibling(path, ".backup")
    }

    /// `<dir>/<file name><suffix>`, never the store path itself
    fn sibling(path: &Path, suffix: &str) -> PathBuf {
        let mut name = path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(suffix);
        path.with_file_name(name)
    }
}

#[async_trait]
impl SeenStore for FileSeenStore {
    async fn load(&self) -> SeenSet {
        match Self::read_set(&self.path).await {
            Ok(Some(set)) => {
                tracing::debug!("Loaded seen set: {} identities", set.len());
                set
            }
            Ok(None) => {
                tracing::debug!("Seen store does not exist yet: {}", self.path.display());
                SeenSet::new()
            }
            Err(LoadFailure::Corrupt(e)) => {
                tracing::warn!(
                    "Seen store {} appears corrupted: {}. Attempting recovery from backup.",
                    self.path.display(),
                    e
                );
                self.load_from_backup().await
            }
            Err(LoadFailure::Unreadable(e)) => {
                tracing::error!(
                    "Failed to read seen store {}: {}. Starting with empty seen set.",
                    self.path.display(),
                    e
                );
                SeenSet::new()
            }
        }
    }

    async fn persist(&self, set: &SeenSet) -> Result<(), Error> {
        self.write_set(set).await
    }
}

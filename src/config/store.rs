//! Versioned settings store with change notification and external-edit reload.

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, PoisonError, RwLock};
use std::time::{Duration, Instant, SystemTime};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{info, warn};

use super::error::ConfigError;
use super::settings::Settings;

/// Minimum interval between two checks of the settings file on disk.
pub const RELOAD_CHECK_INTERVAL: Duration = Duration::from_millis(500);

/// Immutable settings value tagged with a monotonically increasing version.
#[derive(Debug, Clone)]
pub struct ConfigSnapshot {
    /// Incremented by every accepted change
    pub version: u64,
    /// The settings of this version
    pub settings: Settings,
}

#[derive(Debug)]
struct ReloadState {
    /// Modification time of the file when it was last read or written
    loaded_at: Option<SystemTime>,
    /// When the file was last checked for external edits
    last_check: Instant,
    /// Whether the previous reload attempt failed to parse
    last_failed: bool,
}

/// Holder of the current [`ConfigSnapshot`].
///
/// Writers replace the whole snapshot; readers clone an `Arc` and keep a
/// consistent view for as long as they need it. Every accepted change marks
/// the store dirty (persistence requested) and is announced to subscribers
/// as the new version number.
#[derive(Debug)]
pub struct ConfigStore {
    path: Option<PathBuf>,
    current: RwLock<Arc<ConfigSnapshot>>,
    dirty: AtomicBool,
    reload: Mutex<ReloadState>,
    subscribers: Mutex<Vec<Sender<u64>>>,
}

impl ConfigStore {
    /// Store without a backing file.
    pub fn in_memory(settings: Settings) -> Self {
        Self::with_path(None, settings, None)
    }

    fn with_path(path: Option<PathBuf>, settings: Settings, loaded_at: Option<SystemTime>) -> Self {
        Self {
            path,
            current: RwLock::new(Arc::new(ConfigSnapshot {
                version: 0,
                settings,
            })),
            dirty: AtomicBool::new(false),
            reload: Mutex::new(ReloadState {
                loaded_at,
                last_check: Instant::now(),
                last_failed: false,
            }),
            subscribers: Mutex::new(Vec::new()),
        }
    }

    /// Open the settings file at `path`.
    ///
    /// A missing file is created with default settings. A file that exists
    /// but does not parse or validate is an error.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref().to_path_buf();

        if !path.exists() {
            info!("Settings file {} not found, writing defaults", path.display());
            let store = Self::with_path(Some(path), Settings::default(), None);
            store.save()?;
            return Ok(store);
        }

        let settings = Settings::from_file(&path)?;
        let loaded_at = modified_time(&path);
        info!("Loaded settings from {}", path.display());
        Ok(Self::with_path(Some(path), settings, loaded_at))
    }

    /// Open the settings file, falling back to defaults when it is invalid.
    ///
    /// The invalid file is left untouched until the next explicit change.
    pub fn open_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::open(path) {
            Ok(store) => store,
            Err(e) => {
                warn!(
                    "Failed to load settings from {}: {}. Using defaults.",
                    path.display(),
                    e
                );
                let loaded_at = modified_time(path);
                Self::with_path(Some(path.to_path_buf()), Settings::default(), loaded_at)
            }
        }
    }

    /// Path of the backing file, if any.
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Current snapshot.
    pub fn snapshot(&self) -> Arc<ConfigSnapshot> {
        Arc::clone(&self.current.read().unwrap_or_else(PoisonError::into_inner))
    }

    /// Version of the current snapshot.
    pub fn version(&self) -> u64 {
        self.snapshot().version
    }

    /// Whether a change is waiting to be persisted.
    pub fn is_dirty(&self) -> bool {
        self.dirty.load(Ordering::Acquire)
    }

    /// Receive the version number of every subsequent change.
    pub fn subscribe(&self) -> Receiver<u64> {
        let (tx, rx) = unbounded();
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(tx);
        rx
    }

    /// Apply `edit` to a copy of the current settings and publish the result.
    ///
    /// Returns the new version.
    pub fn update<F>(&self, edit: F) -> u64
    where
        F: FnOnce(&mut Settings),
    {
        let version = self.replace_with(|settings| edit(settings));
        self.dirty.store(true, Ordering::Release);
        version
    }

    fn replace_with<F>(&self, edit: F) -> u64
    where
        F: FnOnce(&mut Settings),
    {
        let version = {
            let mut current = self.current.write().unwrap_or_else(PoisonError::into_inner);
            let mut settings = current.settings.clone();
            edit(&mut settings);
            let version = current.version + 1;
            *current = Arc::new(ConfigSnapshot { version, settings });
            version
        };
        self.notify(version);
        version
    }

    fn notify(&self, version: u64) {
        self.subscribers
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .retain(|tx| tx.send(version).is_ok());
    }

    /// Write the current settings to the backing file.
    ///
    /// A store without a file only clears its dirty flag.
    pub fn save(&self) -> Result<(), ConfigError> {
        self.dirty.store(false, Ordering::Release);
        let Some(path) = &self.path else {
            return Ok(());
        };

        let text = self.snapshot().settings.to_toml_string()?;
        if let Err(e) = std::fs::write(path, text) {
            self.dirty.store(true, Ordering::Release);
            return Err(e.into());
        }

        let mut reload = self.reload.lock().unwrap_or_else(PoisonError::into_inner);
        reload.loaded_at = modified_time(path);
        Ok(())
    }

    /// Persist pending changes and pick up external edits.
    ///
    /// Equivalent to [`check_reload_at`](Self::check_reload_at) with the
    /// current instant.
    pub fn check_reload(&self) -> bool {
        self.check_reload_at(Instant::now())
    }

    /// Persist pending changes and, at most every [`RELOAD_CHECK_INTERVAL`],
    /// reload the file if it was modified by someone else.
    ///
    /// Returns true when an external edit was applied. Save and parse
    /// failures are logged and never propagate: a broken file is ignored
    /// (warned about once) until it parses again.
    pub fn check_reload_at(&self, now: Instant) -> bool {
        if self.is_dirty() {
            if let Err(e) = self.save() {
                warn!("Failed to save settings: {}", e);
            }
        }

        let Some(path) = &self.path else {
            return false;
        };

        let mut reload = self.reload.lock().unwrap_or_else(PoisonError::into_inner);
        if now.saturating_duration_since(reload.last_check) < RELOAD_CHECK_INTERVAL {
            return false;
        }
        reload.last_check = now;

        let Some(modified) = modified_time(path) else {
            return false;
        };
        if reload.loaded_at.is_some_and(|loaded| modified <= loaded) {
            return false;
        }

        match Settings::from_file(path) {
            Ok(edited) => {
                reload.loaded_at = Some(modified);
                reload.last_failed = false;
                drop(reload);

                let version = self.replace_with(|settings| settings.apply_external_edit(edited));
                info!("Reloaded settings from {} (version {})", path.display(), version);
                true
            }
            Err(e) => {
                if !reload.last_failed {
                    warn!(
                        "Failed to reload settings from {}: {}. Ignoring changes.",
                        path.display(),
                        e
                    );
                }
                reload.last_failed = true;
                false
            }
        }
    }
}

fn modified_time(path: &Path) -> Option<SystemTime> {
    std::fs::metadata(path).and_then(|m| m.modified()).ok()
}

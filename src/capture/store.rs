use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use log::debug;
use uuid::Uuid;

use super::error::PersistError;
use super::persist::save_capture;
use super::spectrum::{CapturedSpectrum, CAPTURE_PALETTE};

#[derive(Debug, Default)]
struct Inner {
    captures: Vec<Arc<CapturedSpectrum>>,
    next_color: usize,
}

/// Ordered list of captures guarded by one lock.
#[derive(Debug, Default)]
pub struct CaptureStore {
    inner: Mutex<Inner>,
}

impl CaptureStore {
    /// Empty store.
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Append a capture, assigning the next palette color if it has none.
    pub fn add(&self, mut capture: CapturedSpectrum) -> Uuid {
        let mut inner = self.lock();
        if capture.color().is_empty() {
            let color = CAPTURE_PALETTE[inner.next_color % CAPTURE_PALETTE.len()];
            inner.next_color += 1;
            capture.set_color(color.to_string());
        }
        let id = capture.id();
        debug!("Adding capture '{}' ({})", capture.name(), id);
        inner.captures.push(Arc::new(capture));
        id
    }

    /// Remove every temporary capture; returns how many were removed.
    pub fn purge_temporary(&self) -> usize {
        let mut inner = self.lock();
        let before = inner.captures.len();
        inner.captures.retain(|c| !c.is_temporary());
        before - inner.captures.len()
    }

    /// Remove one capture. Returns false if it does not exist.
    pub fn remove(&self, id: Uuid) -> bool {
        let mut inner = self.lock();
        let before = inner.captures.len();
        inner.captures.retain(|c| c.id() != id);
        inner.captures.len() != before
    }

    /// Remove everything.
    pub fn clear(&self) {
        self.lock().captures.clear();
    }

    /// Change a capture's label.
    pub fn rename(&self, id: Uuid, name: impl Into<String>) -> bool {
        let name = name.into();
        self.modify(id, |c| c.set_name(name))
    }

    /// Change a capture's color.
    pub fn set_color(&self, id: Uuid, color: impl Into<String>) -> bool {
        let color = color.into();
        self.modify(id, |c| c.set_color(color))
    }

    fn modify(&self, id: Uuid, edit: impl FnOnce(&mut CapturedSpectrum)) -> bool {
        let mut inner = self.lock();
        match inner.captures.iter_mut().find(|c| c.id() == id) {
            Some(capture) => {
                edit(Arc::make_mut(capture));
                true
            }
            None => false,
        }
    }

    /// Look up a capture.
    pub fn get(&self, id: Uuid) -> Option<Arc<CapturedSpectrum>> {
        self.lock().captures.iter().find(|c| c.id() == id).cloned()
    }

    /// Current captures in insertion order.
    pub fn snapshot(&self) -> Vec<Arc<CapturedSpectrum>> {
        self.lock().captures.clone()
    }

    /// Run `f` over the captures while holding the lock.
    pub fn with_captures<R>(&self, f: impl FnOnce(&[Arc<CapturedSpectrum>]) -> R) -> R {
        f(&self.lock().captures)
    }

    /// Number of captures.
    pub fn len(&self) -> usize {
        self.lock().captures.len()
    }

    /// Returns true if there are no captures.
    pub fn is_empty(&self) -> bool {
        self.lock().captures.is_empty()
    }

    /// Save one capture to `path`.
    pub fn save(&self, id: Uuid, path: &Path) -> Result<(), PersistError> {
        let capture = self.get(id).ok_or(PersistError::NotFound(id))?;
        save_capture(&capture, path)
    }
}

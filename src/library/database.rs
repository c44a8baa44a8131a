use std::path::Path;

use log::{info, warn};

use super::element::{ReferenceElement, ReferenceLine};
use super::error::LibraryError;

/// File name prefix of element files.
pub const LIBRARY_FILE_PREFIX: &str = "LIBS-";

/// File name suffix of element files.
pub const LIBRARY_FILE_SUFFIX: &str = ".json";

/// All reference elements loaded from one directory.
///
/// Immutable once built; share it behind an `Arc` and swap the whole value
/// after a refresh.
#[derive(Debug, Clone, Default)]
pub struct ElementLibrary {
    elements: Vec<ReferenceElement>,
}

impl ElementLibrary {
    /// Build a library from already-loaded elements.
    pub fn from_elements(elements: Vec<ReferenceElement>) -> Self {
        Self { elements }
    }

    /// Load every `LIBS-*.json` file in `dir`.
    ///
    /// Files that fail to parse or validate are skipped with a warning; only
    /// an unreadable directory is an error. Elements are ordered by file name.
    pub fn load_dir(dir: &Path) -> Result<Self, LibraryError> {
        let mut paths: Vec<_> = std::fs::read_dir(dir)?
            .filter_map(|entry| entry.ok().map(|e| e.path()))
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .is_some_and(|n| {
                        n.starts_with(LIBRARY_FILE_PREFIX) && n.ends_with(LIBRARY_FILE_SUFFIX)
                    })
            })
            .collect();
        paths.sort();

        let mut elements = Vec::with_capacity(paths.len());
        for path in paths {
            match ReferenceElement::load(&path) {
                Ok(element) => elements.push(element),
                Err(e) => warn!("Skipping reference file {}: {}", path.display(), e),
            }
        }

        info!(
            "Loaded {} reference elements from {}",
            elements.len(),
            dir.display()
        );
        Ok(Self { elements })
    }

    /// All elements.
    pub fn elements(&self) -> &[ReferenceElement] {
        &self.elements
    }

    /// Number of elements.
    pub fn len(&self) -> usize {
        self.elements.len()
    }

    /// Returns true if no element is loaded.
    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    /// Every (element, line) pair in load order.
    pub fn lines(&self) -> impl Iterator<Item = (&ReferenceElement, &ReferenceLine)> {
        self.elements
            .iter()
            .flat_map(|e| e.lines.iter().map(move |l| (e, l)))
    }

    /// Find the element named `name` or owning a line named `name`.
    pub fn get(&self, name: &str) -> Option<&ReferenceElement> {
        self.elements
            .iter()
            .find(|e| e.name == name || e.lines.iter().any(|l| l.name() == name))
    }
}

//! # Reference Library
//!
//! Theoretical emission spectra per chemical element, used as matching
//! references. Each element file holds one native wavelength axis shared by
//! several emission-line intensity series (e.g. `Fe I`, `Fe II`):
//!
//! ```json
//! {
//!   "Name": "Fe",
//!   "Wavelengths": [300.0, 300.5, 301.0],
//!   "Elements": [
//!     { "Name": "Fe I",  "Intensities": [0.0, 12.5, 3.1] },
//!     { "Name": "Fe II", "Intensities": [0.4, 0.0, 7.9] }
//!   ]
//! }
//! ```
//!
//! Files follow the naming convention `LIBS-<element>.json` and are loaded
//! once; a refresh replaces the whole [`ElementLibrary`].

mod database;
mod element;
mod error;

#[cfg(test)]
mod tests;

pub use database::{ElementLibrary, LIBRARY_FILE_PREFIX, LIBRARY_FILE_SUFFIX};
pub use element::{ReferenceElement, ReferenceLine, SpectralWindow};
pub use error::LibraryError;

//! Cubic calibration polynomials.
//!
//! Every calibration curve in the front end (pixel → wavelength, wavelength →
//! intensity scale, wavelength → intensity offset) is a polynomial of order 3:
//!
//! ```text
//! calc(x) = c0 + c1·x + c2·x² + c3·x³
//! ```

use serde::{Deserialize, Serialize};

/// Number of coefficients carried by a [`Polynomial`] (orders 0 through 3).
pub const POLYNOMIAL_TERMS: usize = 4;

/// Immutable cubic polynomial with a human-readable description.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Polynomial {
    /// Coefficients ordered from the constant term upwards
    pub coefficients: [f64; POLYNOMIAL_TERMS],
    /// Free-form description of what the polynomial maps
    #[serde(default)]
    pub description: String,
}

impl Polynomial {
    /// Create a polynomial from its four coefficients.
    pub fn new(c0: f64, c1: f64, c2: f64, c3: f64, description: impl Into<String>) -> Self {
        Self {
            coefficients: [c0, c1, c2, c3],
            description: description.into(),
        }
    }

    /// The identity map `calc(x) = x`.
    pub fn identity(description: impl Into<String>) -> Self {
        Self::new(0.0, 1.0, 0.0, 0.0, description)
    }

    /// Constant polynomial `calc(x) = value`.
    pub fn constant(value: f64, description: impl Into<String>) -> Self {
        Self::new(value, 0.0, 0.0, 0.0, description)
    }

    /// Build from a coefficient slice of any length.
    ///
    /// Missing higher orders are zero; orders above 3 are ignored.
    pub fn from_slice(coefficients: &[f64], description: impl Into<String>) -> Self {
        let mut c = [0.0; POLYNOMIAL_TERMS];
        for (dst, src) in c.iter_mut().zip(coefficients) {
            *dst = *src;
        }
        Self {
            coefficients: c,
            description: description.into(),
        }
    }

    /// Return a copy with replaced coefficients, keeping the description.
    pub fn with_coefficients(&self, coefficients: &[f64]) -> Self {
        Self::from_slice(coefficients, self.description.clone())
    }

    /// Evaluate the polynomial at `x`.
    #[inline]
    pub fn calc(&self, x: f64) -> f64 {
        let [c0, c1, c2, c3] = self.coefficients;
        c0 + x * c1 + x * x * c2 + x * x * x * c3
    }

    /// Whether this is exactly the identity map.
    pub fn is_identity(&self) -> bool {
        self.coefficients == [0.0, 1.0, 0.0, 0.0]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_default_lambda_map() {
        let p = Polynomial::new(450.0, 0.2, 0.0, 0.0, "lambda");
        assert_eq!(p.calc(10.0), 452.0);
    }

    #[test]
    fn test_cubic_terms() {
        let p = Polynomial::new(1.0, 2.0, 3.0, 4.0, "");
        // 1 + 2·2 + 3·4 + 4·8
        assert_eq!(p.calc(2.0), 49.0);
    }

    #[test]
    fn test_from_slice_pads_and_truncates() {
        let short = Polynomial::from_slice(&[5.0, 1.0], "short");
        assert_eq!(short.coefficients, [5.0, 1.0, 0.0, 0.0]);

        let long = Polynomial::from_slice(&[1.0, 2.0, 3.0, 4.0, 5.0], "long");
        assert_eq!(long.coefficients, [1.0, 2.0, 3.0, 4.0]);
    }

    #[test]
    fn test_identity() {
        let p = Polynomial::identity("id");
        assert!(p.is_identity());
        assert_eq!(p.calc(1234.5), 1234.5);
    }

    proptest! {
        #[test]
        fn test_calc_at_zero_is_constant_term(
            c0 in -1e6f64..1e6,
            c1 in -1e3f64..1e3,
            c2 in -1.0f64..1.0,
            c3 in -1e-3f64..1e-3,
        ) {
            let p = Polynomial::new(c0, c1, c2, c3, "");
            prop_assert_eq!(p.calc(0.0), c0);
        }
    }
}

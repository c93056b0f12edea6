//! Conversion of raw model output to an SI density
//!
//! The model prints density in g/cm³ as `<mantissa>e<exponent>`. Since
//! 1 g/cm³ = 1000 kg/m³, conversion adds 3 to the base-10 exponent.

use super::AtmosphereDensity;
use crate::errors::{DensityError, ResolveResult};

/// Fallback density (kg/m³) used when the model output is unusable
pub const SENTINEL_DENSITY: f64 = 1.0e-13;

/// g/cm³ → kg/m³ as a base-10 exponent shift
const UNIT_EXPONENT_SHIFT: i32 = 3;

/// Characters of the exponent read after the marker
const EXPONENT_WIDTH: usize = 3;

const NON_FINITE_TOKENS: [&str; 4] = ["inf", "-inf", "+inf", "nan"];

/// Model output text → [`AtmosphereDensity`]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DensityResultNormalizer {
    /// kg/m³
    sentinel: f64,

    /// Character index the `e` must sit at; `None` means right after the mantissa
    marker_column: Option<usize>,
}

impl Default for DensityResultNormalizer {
    fn default() -> Self {
        Self::new(SENTINEL_DENSITY, None)
    }
}

impl DensityResultNormalizer {
    /// `marker_column` pins the exponent marker to a fixed character index;
    /// `None` expects it straight after the leading mantissa.
    pub fn new(sentinel: f64, marker_column: Option<usize>) -> Self {
        Self {
            sentinel,
            marker_column,
        }
    }

    /// Density returned for unusable output, kg/m³
    pub fn sentinel(&self) -> f64 {
        self.sentinel
    }

    /// Fixed exponent-marker index, if any
    pub fn marker_column(&self) -> Option<usize> {
        self.marker_column
    }

    /// Convert raw model text to kg/m³
    ///
    /// Returns a sentinel density (flagged `substituted`) for non-finite or
    /// unrecognised output. Fails only when text that looks like a density
    /// cannot be read as one.
    pub fn normalize(&self, raw: &str) -> ResolveResult<AtmosphereDensity> {
        let text = raw.trim();

        if text.is_empty() || NON_FINITE_TOKENS.iter().any(|t| text.eq_ignore_ascii_case(t)) {
            return Ok(AtmosphereDensity::sentinel(self.sentinel));
        }
        let split = match text.find('e') {
            Some(split) if self.has_marker(text) => split,
            _ => return Ok(AtmosphereDensity::sentinel(self.sentinel)),
        };
        let mantissa = &text[..split];
        let exponent_text: String = text[split + 1..].chars().take(EXPONENT_WIDTH).collect();

        let exponent = leading_integer(&exponent_text).ok_or_else(|| {
            DensityError::malformed_density(raw, format!("exponent '{exponent_text}' has no digits"))
        })?;

        let converted = format!("{}E{}", mantissa, exponent + UNIT_EXPONENT_SHIFT);
        let rho: f64 = converted.parse().map_err(|_| {
            DensityError::malformed_density(raw, format!("'{converted}' is not a number"))
        })?;

        if !rho.is_finite() {
            return Ok(AtmosphereDensity::sentinel(self.sentinel));
        }
        if rho < 0.0 {
            return Err(DensityError::malformed_density(raw, "density is negative"));
        }

        Ok(AtmosphereDensity::new(rho))
    }

    fn has_marker(&self, text: &str) -> bool {
        let column = match self.marker_column {
            Some(column) => column,
            None => {
                let end = text
                    .find(|c: char| !(c.is_ascii_digit() || matches!(c, '.' | '+' | '-')))
                    .unwrap_or(text.len());
                if end == 0 {
                    return false;
                }
                end
            }
        };
        text.as_bytes().get(column) == Some(&b'e')
    }
}

/// Signed integer at the start of `text`, ignoring whatever follows it
///
/// `-5x` reads as -5 and ` 12` as 12; no leading digits gives `None`.
fn leading_integer(text: &str) -> Option<i32> {
    let text = text.trim_start();
    let sign_len = usize::from(text.starts_with(['+', '-']));
    let digits_len = text[sign_len..]
        .find(|c: char| !c.is_ascii_digit())
        .unwrap_or(text.len() - sign_len);
    if digits_len == 0 {
        return None;
    }
    text[..sign_len + digits_len].parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_exponent_shift() {
        let density = DensityResultNormalizer::default().normalize("1.234e-11").unwrap();
        assert_relative_eq!(density.rho, 1.234e-8, max_relative = 1e-12);
        assert!(!density.substituted);
    }

    #[test]
    fn test_model_width_output() {
        let normalizer = DensityResultNormalizer::default();
        let density = normalizer.normalize("3.841201e-12\n").unwrap();
        assert_relative_eq!(density.rho, 3.841201e-9, max_relative = 1e-12);

        let density = normalizer.normalize("2.5e+02").unwrap();
        assert_relative_eq!(density.rho, 2.5e5, max_relative = 1e-12);
    }

    #[test]
    fn test_sentinel_cases() {
        let normalizer = DensityResultNormalizer::default();
        for raw in ["inf", "INF", "-inf", "nan", "", "   ", "density", "1.234E-11", "e-11"] {
            let density = normalizer.normalize(raw).unwrap();
            assert!(density.substituted, "{raw:?} should be substituted");
            assert_eq!(density.rho, SENTINEL_DENSITY);
        }
    }

    #[test]
    fn test_overflow_is_sentinel() {
        let density = DensityResultNormalizer::default().normalize("9.9e999").unwrap();
        assert!(density.substituted);
    }

    #[test]
    fn test_fixed_marker_column() {
        let normalizer = DensityResultNormalizer::new(2.0e-13, Some(8));

        let density = normalizer.normalize("1.234567e-11").unwrap();
        assert_relative_eq!(density.rho, 1.234567e-8, max_relative = 1e-12);

        // Marker present but not at column 8
        let density = normalizer.normalize("1.234e-11").unwrap();
        assert!(density.substituted);
        assert_eq!(density.rho, 2.0e-13);
    }

    #[test]
    fn test_exponent_trailing_garbage_ignored() {
        let normalizer = DensityResultNormalizer::default();

        let density = normalizer.normalize("1.0e-5x").unwrap();
        assert_relative_eq!(density.rho, 1.0e-2, max_relative = 1e-12);

        let density = normalizer.normalize("3.5e-1?").unwrap();
        assert_relative_eq!(density.rho, 3.5e2, max_relative = 1e-12);

        assert_eq!(leading_integer("-11"), Some(-11));
        assert_eq!(leading_integer("+05"), Some(5));
        assert_eq!(leading_integer("-5x"), Some(-5));
        assert_eq!(leading_integer("-x1"), None);
        assert_eq!(leading_integer(""), None);
    }

    #[test]
    fn test_malformed() {
        let normalizer = DensityResultNormalizer::default();

        let result = normalizer.normalize("1.234e-x1");
        assert!(matches!(result, Err(DensityError::MalformedDensity { .. })));

        let result = normalizer.normalize("1.2.3e-11");
        assert!(matches!(result, Err(DensityError::MalformedDensity { .. })));

        let result = normalizer.normalize("-1.0e-11");
        assert!(matches!(result, Err(DensityError::MalformedDensity { .. })));
    }
}

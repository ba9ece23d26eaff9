//! Error types for curve and surface construction.

use thiserror::Error;

/// Errors that can occur while building or transforming curves and surfaces.
///
/// Evaluation itself never fails: out-of-domain parameters are clamped and
/// numerical routines return best-effort estimates. Errors are reserved for
/// definitions that make every later evaluation meaningless.
#[derive(Debug, Error, Clone, PartialEq)]
pub enum CurveError {
    /// Knot vector violates ordering, span, or multiplicity invariants.
    #[error("malformed knot vector: {reason}")]
    MalformedKnotVector {
        /// Description of what's wrong with the knot vector.
        reason: String,
    },

    /// Split parameter cannot be located within a valid knot span.
    #[error("cannot split at t={t}: {reason}")]
    InvalidSplitParameter {
        /// The split parameter.
        t: f64,
        /// Reason why the split is invalid.
        reason: String,
    },

    /// Structural mismatch between inputs (point counts, dimensions, degree).
    #[error("invalid configuration: {reason}")]
    InvalidConfiguration {
        /// Description of the mismatch.
        reason: String,
    },

    /// Parameter lies outside the knot range.
    #[error("parameter {t} is outside the knot range [{min}, {max}]")]
    InvalidParameter {
        /// The offending parameter.
        t: f64,
        /// First knot.
        min: f64,
        /// Last knot.
        max: f64,
    },
}

impl CurveError {
    /// Create a malformed knot vector error.
    #[must_use]
    pub fn malformed_knots(reason: impl Into<String>) -> Self {
        Self::MalformedKnotVector {
            reason: reason.into(),
        }
    }

    /// Create an invalid split error.
    #[must_use]
    pub fn invalid_split(t: f64, reason: impl Into<String>) -> Self {
        Self::InvalidSplitParameter {
            t,
            reason: reason.into(),
        }
    }

    /// Create an invalid configuration error.
    #[must_use]
    pub fn invalid_configuration(reason: impl Into<String>) -> Self {
        Self::InvalidConfiguration {
            reason: reason.into(),
        }
    }

    /// Check if this is a malformed knot vector error.
    #[must_use]
    pub fn is_malformed_knots(&self) -> bool {
        matches!(self, Self::MalformedKnotVector { .. })
    }

    /// Check if this is an invalid split error.
    #[must_use]
    pub fn is_invalid_split(&self) -> bool {
        matches!(self, Self::InvalidSplitParameter { .. })
    }

    /// Check if this is an invalid configuration error.
    #[must_use]
    pub fn is_invalid_configuration(&self) -> bool {
        matches!(self, Self::InvalidConfiguration { .. })
    }

    /// Check if this is a parameter out of range error.
    #[must_use]
    pub fn is_invalid_parameter(&self) -> bool {
        matches!(self, Self::InvalidParameter { .. })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = CurveError::malformed_knots("not monotonic");
        assert!(err.to_string().contains("not monotonic"));

        let err = CurveError::invalid_split(0.25, "no span");
        assert!(err.to_string().contains("0.25"));

        let err = CurveError::InvalidParameter {
            t: 1.5,
            min: 0.0,
            max: 1.0,
        };
        assert!(err.to_string().contains("1.5"));
        assert!(err.to_string().contains("[0, 1]"));
    }

    #[test]
    fn test_error_predicates() {
        let err = CurveError::malformed_knots("equal ends");
        assert!(err.is_malformed_knots());
        assert!(!err.is_invalid_split());

        let err = CurveError::invalid_configuration("too few points");
        assert!(err.is_invalid_configuration());
        assert!(!err.is_invalid_parameter());

        let err = CurveError::invalid_split(f64::NAN, "not a number");
        assert!(err.is_invalid_split());
    }
}

//! Error taxonomy for indicator construction and batch processing.
//!
//! Configuration and shape errors are fatal and reported synchronously.
//! Numerical edge cases (zero range, zero variance) are not errors: they are
//! resolved locally to documented fallback values. Insufficient data is not
//! an error either; it is reported through `is_ready() == false`.

use crate::access::PriceAspect;
use thiserror::Error;

/// Invalid parameter combination, naming the offending field(s).
#[derive(Debug, Clone, PartialEq, Error)]
#[error("invalid configuration [{}]: {reason}", fields.join(", "))]
pub struct ConfigError {
    pub fields: Vec<&'static str>,
    pub reason: String,
}

impl ConfigError {
    pub fn new(field: &'static str, reason: impl Into<String>) -> Self {
        Self {
            fields: vec![field],
            reason: reason.into(),
        }
    }

    pub fn fields(fields: &[&'static str], reason: impl Into<String>) -> Self {
        Self {
            fields: fields.to_vec(),
            reason: reason.into(),
        }
    }

    /// True if `field` is among the offending fields.
    pub fn names(&self, field: &str) -> bool {
        self.fields.iter().any(|f| *f == field)
    }
}

/// Errors raised by indicator construction and updates.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IndicatorError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("output buffer length {outputs} does not match input length {inputs}")]
    ShapeMismatch { inputs: usize, outputs: usize },

    #[error("input slot '{slot}' requires {aspect:?}, which the record does not provide")]
    MissingAspect {
        slot: &'static str,
        aspect: PriceAspect,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn config_error_names_all_fields() {
        let err = ConfigError::fields(&["fast_period", "slow_period"], "fast must be < slow");
        let msg = err.to_string();
        assert!(msg.contains("fast_period"));
        assert!(msg.contains("slow_period"));
        assert!(err.names("slow_period"));
        assert!(!err.names("signal_period"));
    }

    #[test]
    fn config_error_converts_into_indicator_error() {
        let err: IndicatorError = ConfigError::new("period", "must be >= 1").into();
        assert!(matches!(err, IndicatorError::Config(_)));
    }
}

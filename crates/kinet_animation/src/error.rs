//! Animation error types

use thiserror::Error;

/// Errors raised while configuring animations and widgets
///
/// Everything here is detected at construction time; a running animation
/// never fails.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AnimationError {
    /// A duration, factor, curve parameter or dimension is out of range
    #[error("Invalid animation configuration: {0}")]
    InvalidConfiguration(String),
}

impl AnimationError {
    pub fn invalid(msg: impl Into<String>) -> Self {
        AnimationError::InvalidConfiguration(msg.into())
    }
}

/// Result type for animation configuration
pub type Result<T> = std::result::Result<T, AnimationError>;

/// Reject non-finite or non-positive values
pub fn ensure_positive(name: &str, value: f32) -> Result<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(AnimationError::invalid(format!(
            "{name} must be a positive finite number, got {value}"
        )))
    }
}

/// Reject non-finite values
pub fn ensure_finite(name: &str, value: f32) -> Result<()> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AnimationError::invalid(format!(
            "{name} must be finite, got {value}"
        )))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_guards() {
        assert!(ensure_positive("speed", 50.0).is_ok());
        assert!(ensure_positive("speed", 0.0).is_err());
        assert!(ensure_positive("speed", f32::NAN).is_err());
        assert!(ensure_finite("offset", -3.0).is_ok());
        assert!(ensure_finite("offset", f32::INFINITY).is_err());
    }

    #[test]
    fn test_message() {
        let err = ensure_positive("duration_ms", -1.0).unwrap_err();
        assert_eq!(
            err.to_string(),
            "Invalid animation configuration: duration_ms must be a positive finite number, got -1"
        );
    }
}

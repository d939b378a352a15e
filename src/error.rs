//! Unified error hierarchy for planrs
//!
//! The scheduling engine is total over malformed-but-plausible input:
//! missing slots, out-of-range dates, and inconsistent cross-references all
//! resolve to `None` rather than errors. The only structural failure the
//! engine itself reports is a malformed plan.

use thiserror::Error;

/// Top-level error type for all planrs operations
#[derive(Debug, Error)]
pub enum PlanError {
    /// Plan fails structural validation and cannot be scheduled
    #[error("Malformed plan: {reason}")]
    MalformedPlan { reason: String },

    /// Plan or completion JSON could not be deserialized
    #[error("Decode error: {0}")]
    Decode(#[from] serde_json::Error),

    /// IO errors (CLI shell only)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Configuration errors (CLI shell only)
    #[error("Configuration error: {0}")]
    Configuration(String),
}

/// Result type alias for planrs operations
pub type Result<T> = std::result::Result<T, PlanError>;

impl PlanError {
    /// Whether the caller should render a fallback view instead of data
    pub fn is_malformed_plan(&self) -> bool {
        matches!(self, PlanError::MalformedPlan { .. })
    }

    /// Get user-friendly error message
    pub fn user_message(&self) -> String {
        match self {
            PlanError::MalformedPlan { reason } => {
                format!("This training plan could not be read: {}", reason)
            }
            PlanError::Decode(_) => {
                "The plan file is not valid JSON. Please re-export it.".to_string()
            }
            _ => self.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_malformed_plan_detection() {
        let err = PlanError::MalformedPlan {
            reason: "week 3 has no day slots".to_string(),
        };
        assert!(err.is_malformed_plan());
        assert!(err.user_message().contains("could not be read"));

        let err = PlanError::Configuration("missing timezone".to_string());
        assert!(!err.is_malformed_plan());
    }
}

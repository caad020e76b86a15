//! Step outcome type
//!
//! Every flow step reports success or failure through this one type, with an
//! optional human-readable detail carried alongside. Ambiguous return shapes
//! are not representable: a step either succeeded or it did not.

/// Outcome of a single flow step
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StepOutcome {
    /// Step succeeded, optionally carrying auxiliary data
    Success { detail: Option<String> },

    /// Step failed, optionally carrying a reason
    Failure { detail: Option<String> },
}

impl StepOutcome {
    /// A plain success with no payload
    pub fn success() -> Self {
        Self::Success { detail: None }
    }

    /// A success carrying auxiliary data
    pub fn success_with(detail: impl Into<String>) -> Self {
        Self::Success {
            detail: Some(detail.into()),
        }
    }

    /// A plain failure with no reason
    pub fn failure() -> Self {
        Self::Failure { detail: None }
    }

    /// A failure carrying a reason
    pub fn failure_with(detail: impl Into<String>) -> Self {
        Self::Failure {
            detail: Some(detail.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success { .. })
    }

    /// The auxiliary data, if any
    pub fn detail(&self) -> Option<&str> {
        match self {
            Self::Success { detail } | Self::Failure { detail } => detail.as_deref(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_success_and_failure() {
        assert!(StepOutcome::success().is_success());
        assert!(!StepOutcome::failure().is_success());
        assert_eq!(StepOutcome::success().detail(), None);
    }

    #[test]
    fn test_detail_carried() {
        let outcome = StepOutcome::success_with("generated text");
        assert!(outcome.is_success());
        assert_eq!(outcome.detail(), Some("generated text"));

        let outcome = StepOutcome::failure_with("rate limited");
        assert!(!outcome.is_success());
        assert_eq!(outcome.detail(), Some("rate limited"));
    }
}

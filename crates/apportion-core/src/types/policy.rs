//! Validation policies shared by the allocators.

use serde::{Deserialize, Serialize};

/// How a weight set must behave before allocation may run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum WeightRule {
    /// Weights are non-negative and total 1.0 within a tolerance of
    /// 0.001. The safer default: output is only meaningful against a
    /// complete weight set.
    #[default]
    SumToOne,

    /// Weights are non-negative with a positive total; they are
    /// consumed as normalized shares of that total.
    PositiveTotal,
}

impl WeightRule {
    /// Returns a human-readable name for the rule.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::SumToOne => "Sum To One",
            Self::PositiveTotal => "Positive Total",
        }
    }
}

impl std::fmt::Display for WeightRule {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// What to do with rows that fail the active mode's field requirements.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum RowPolicy {
    /// The first invalid row aborts the run, naming the row and field.
    #[default]
    RequireComplete,

    /// Invalid rows are dropped before validation and play no further
    /// part: no weight contribution, no allocation.
    SkipInvalid,
}

impl RowPolicy {
    /// Returns a human-readable name for the policy.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::RequireComplete => "Require Complete",
            Self::SkipInvalid => "Skip Invalid",
        }
    }
}

impl std::fmt::Display for RowPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        assert_eq!(WeightRule::default(), WeightRule::SumToOne);
        assert_eq!(RowPolicy::default(), RowPolicy::RequireComplete);
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", WeightRule::SumToOne), "Sum To One");
        assert_eq!(format!("{}", RowPolicy::SkipInvalid), "Skip Invalid");
    }

    #[test]
    fn test_serde() {
        let rule = WeightRule::PositiveTotal;
        let json = serde_json::to_string(&rule).unwrap();
        let parsed: WeightRule = serde_json::from_str(&json).unwrap();
        assert_eq!(rule, parsed);
    }
}

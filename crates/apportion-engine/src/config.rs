//! Engine configuration.
//!
//! Every policy choice the allocators expose lives here, with the
//! documented default selected by `Default`.

use serde::{Deserialize, Serialize};

use apportion_core::{RowPolicy, WeightRule};
use apportion_math::search::{DEFAULT_BISECT_ITERATIONS, DEFAULT_MAX_DOUBLINGS};

/// Default slack on the margin-cap invariant.
pub const DEFAULT_TOLERANCE: f64 = 1e-6;

/// Conventional class label for the single-dial instrument.
pub const DEFAULT_DIAL_CLASS: &str = "equity";

/// Tuning for the margin search.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SearchSettings {
    /// Bisection iterations; each halves the scale bracket.
    pub bisect_iterations: u32,
    /// Doubling allowance when expanding the bracket upper end.
    pub max_doublings: u32,
    /// Slack allowed on the cap invariant and the gap close.
    pub tolerance: f64,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            bisect_iterations: DEFAULT_BISECT_ITERATIONS,
            max_doublings: DEFAULT_MAX_DOUBLINGS,
            tolerance: DEFAULT_TOLERANCE,
        }
    }
}

impl SearchSettings {
    /// Creates search settings.
    #[must_use]
    pub fn new(bisect_iterations: u32, max_doublings: u32, tolerance: f64) -> Self {
        Self {
            bisect_iterations,
            max_doublings,
            tolerance,
        }
    }

    /// Sets the bisection iteration count.
    #[must_use]
    pub fn with_bisect_iterations(mut self, iterations: u32) -> Self {
        self.bisect_iterations = iterations;
        self
    }

    /// Sets the doubling allowance.
    #[must_use]
    pub fn with_max_doublings(mut self, doublings: u32) -> Self {
        self.max_doublings = doublings;
        self
    }

    /// Sets the cap slack.
    #[must_use]
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }
}

/// How the margin budget is spread across instruments.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MarginPolicy {
    /// Scale total notional, pinning instruments at their minimum stake
    /// when their proportional share falls below it, and search the
    /// scale so total margin meets the cap.
    Waterfall {
        /// Weight validation applied before the search.
        weight_rule: WeightRule,
    },

    /// Every instrument except one designated by class sits at minimum
    /// stake; the designated instrument absorbs the residual budget.
    /// Weights are not consumed by this policy.
    SingleDial {
        /// Class label matched case-insensitively against rows.
        dial_class: String,
    },
}

impl Default for MarginPolicy {
    fn default() -> Self {
        Self::Waterfall {
            weight_rule: WeightRule::default(),
        }
    }
}

/// Configuration for [`crate::margin::allocate_margin`].
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct MarginConfig {
    /// The allocation policy.
    pub policy: MarginPolicy,
    /// Row handling. Defaults to `RequireComplete`: a budget calculation
    /// is not meaningful with silently dropped legs.
    pub rows: RowPolicy,
    /// Search tuning.
    pub search: SearchSettings,
}

impl MarginConfig {
    /// Waterfall allocation under the given weight rule.
    #[must_use]
    pub fn waterfall(weight_rule: WeightRule) -> Self {
        Self {
            policy: MarginPolicy::Waterfall { weight_rule },
            ..Self::default()
        }
    }

    /// Single-dial allocation. Review-style flows tolerate ragged
    /// tables, so this preset skips invalid rows.
    #[must_use]
    pub fn single_dial(dial_class: impl Into<String>) -> Self {
        Self {
            policy: MarginPolicy::SingleDial {
                dial_class: dial_class.into(),
            },
            rows: RowPolicy::SkipInvalid,
            search: SearchSettings::default(),
        }
    }

    /// Sets the row policy.
    #[must_use]
    pub fn with_rows(mut self, rows: RowPolicy) -> Self {
        self.rows = rows;
        self
    }

    /// Sets the search tuning.
    #[must_use]
    pub fn with_search(mut self, search: SearchSettings) -> Self {
        self.search = search;
        self
    }
}

/// Order in which an initial build spends the deposit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum BuildOrder {
    /// Heaviest target weight first; ties keep input order.
    #[default]
    WeightDescending,

    /// Exactly the order rows were supplied.
    InputOrder,
}

impl BuildOrder {
    /// Returns a human-readable name for the order.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::WeightDescending => "Weight Descending",
            Self::InputOrder => "Input Order",
        }
    }
}

impl std::fmt::Display for BuildOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// How top-up candidates are ranked.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Hash, Serialize, Deserialize)]
pub enum GapMetric {
    /// Gap as a fraction of target value. Favors the most
    /// under-represented position relative to its own target.
    #[default]
    Relative,

    /// Gap in currency. Favors the largest absolute shortfall.
    Absolute,
}

impl GapMetric {
    /// Returns a human-readable name for the metric.
    #[must_use]
    pub fn name(&self) -> &'static str {
        match self {
            Self::Relative => "Relative Gap",
            Self::Absolute => "Absolute Gap",
        }
    }
}

impl std::fmt::Display for GapMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.name())
    }
}

/// Configuration for [`crate::cash::allocate_cash`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct DcaConfig {
    /// Weight validation applied to the valid rows.
    pub weight_rule: WeightRule,
    /// Row handling. Defaults to `SkipInvalid`.
    pub rows: RowPolicy,
    /// Spending order for an initial build.
    pub build_order: BuildOrder,
    /// Candidate ranking for a top-up review.
    pub gap_metric: GapMetric,
}

impl Default for DcaConfig {
    fn default() -> Self {
        Self {
            weight_rule: WeightRule::SumToOne,
            rows: RowPolicy::SkipInvalid,
            build_order: BuildOrder::WeightDescending,
            gap_metric: GapMetric::Relative,
        }
    }
}

impl DcaConfig {
    /// Sets the weight rule.
    #[must_use]
    pub fn with_weight_rule(mut self, rule: WeightRule) -> Self {
        self.weight_rule = rule;
        self
    }

    /// Sets the row policy.
    #[must_use]
    pub fn with_rows(mut self, rows: RowPolicy) -> Self {
        self.rows = rows;
        self
    }

    /// Sets the build order.
    #[must_use]
    pub fn with_build_order(mut self, order: BuildOrder) -> Self {
        self.build_order = order;
        self
    }

    /// Sets the gap metric.
    #[must_use]
    pub fn with_gap_metric(mut self, metric: GapMetric) -> Self {
        self.gap_metric = metric;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_search_defaults() {
        let search = SearchSettings::default();
        assert_eq!(search.bisect_iterations, 80);
        assert_eq!(search.max_doublings, 60);
        assert!((search.tolerance - 1e-6).abs() < f64::EPSILON);
    }

    #[test]
    fn test_search_builders() {
        let search = SearchSettings::default()
            .with_bisect_iterations(40)
            .with_max_doublings(20)
            .with_tolerance(1e-9);
        assert_eq!(search.bisect_iterations, 40);
        assert_eq!(search.max_doublings, 20);
        assert!((search.tolerance - 1e-9).abs() < f64::EPSILON);
    }

    #[test]
    fn test_margin_config_defaults() {
        let config = MarginConfig::default();
        assert_eq!(
            config.policy,
            MarginPolicy::Waterfall {
                weight_rule: WeightRule::SumToOne,
            }
        );
        assert_eq!(config.rows, RowPolicy::RequireComplete);
    }

    #[test]
    fn test_single_dial_preset_skips_invalid_rows() {
        let config = MarginConfig::single_dial(DEFAULT_DIAL_CLASS);
        assert_eq!(
            config.policy,
            MarginPolicy::SingleDial {
                dial_class: "equity".to_string(),
            }
        );
        assert_eq!(config.rows, RowPolicy::SkipInvalid);
    }

    #[test]
    fn test_dca_defaults() {
        let config = DcaConfig::default();
        assert_eq!(config.weight_rule, WeightRule::SumToOne);
        assert_eq!(config.rows, RowPolicy::SkipInvalid);
        assert_eq!(config.build_order, BuildOrder::WeightDescending);
        assert_eq!(config.gap_metric, GapMetric::Relative);
    }

    #[test]
    fn test_config_serde_round_trip() {
        let config = MarginConfig::single_dial("commodity")
            .with_search(SearchSettings::default().with_bisect_iterations(32));
        let json = serde_json::to_string(&config).unwrap();
        let parsed: MarginConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, config);

        let dca = DcaConfig::default().with_gap_metric(GapMetric::Absolute);
        let json = serde_json::to_string(&dca).unwrap();
        let parsed: DcaConfig = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, dca);
    }
}

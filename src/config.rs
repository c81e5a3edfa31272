// Copyright 2025 Cowboy AI, LLC.

//! Planning policy: the thresholds behind advisory findings

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

use crate::errors::{FinanceError, FinanceResult};

/// Hard ceiling on emergency-fund coverage months; no policy may exceed it
pub const MAX_EMERGENCY_MONTHS: u32 = 24;

/// Thresholds and defaults used by profile health checks, goal evaluation
/// and plan validation.
///
/// Missing fields fall back to [`PlanningPolicy::default`] when loaded from
/// JSON.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
#[serde(default)]
pub struct PlanningPolicy {
    /// Net savings below this share of income is flagged (0.10 = 10%)
    pub minimum_savings_ratio: f64,
    /// Share of the expected progress that still counts as "mostly on track"
    pub mostly_on_track_factor: f64,
    /// Emergency-fund shortfall above this share of the requirement is flagged
    pub emergency_shortfall_warning_ratio: f64,
    /// Coverage months for a newly created plan's emergency fund
    pub default_emergency_months: u32,
    /// Upper bound accepted for emergency-fund coverage months, at most
    /// [`MAX_EMERGENCY_MONTHS`]
    pub max_emergency_months: u32,
}

impl Default for PlanningPolicy {
    fn default() -> Self {
        Self {
            minimum_savings_ratio: 0.10,
            mostly_on_track_factor: 0.80,
            emergency_shortfall_warning_ratio: 0.50,
            default_emergency_months: 3,
            max_emergency_months: MAX_EMERGENCY_MONTHS,
        }
    }
}

impl PlanningPolicy {
    /// Parse a policy from JSON and validate it
    pub fn from_json_str(json: &str) -> FinanceResult<Self> {
        let policy: PlanningPolicy = serde_json::from_str(json)?;
        policy.validate()?;
        Ok(policy)
    }

    /// Check that every ratio lies in [0, 1], the month limit stays within
    /// [`MAX_EMERGENCY_MONTHS`] and the default fits the limit
    pub fn validate(&self) -> FinanceResult<()> {
        let ratios = [
            ("minimum_savings_ratio", self.minimum_savings_ratio),
            ("mostly_on_track_factor", self.mostly_on_track_factor),
            (
                "emergency_shortfall_warning_ratio",
                self.emergency_shortfall_warning_ratio,
            ),
        ];
        for (name, value) in ratios {
            if !value.is_finite() || !(0.0..=1.0).contains(&value) {
                return Err(FinanceError::Configuration(format!(
                    "{name} must be within [0, 1], got {value}"
                )));
            }
        }

        if self.max_emergency_months > MAX_EMERGENCY_MONTHS {
            return Err(FinanceError::Configuration(format!(
                "max_emergency_months cannot exceed {MAX_EMERGENCY_MONTHS}, got {}",
                self.max_emergency_months
            )));
        }

        if self.default_emergency_months > self.max_emergency_months {
            return Err(FinanceError::Configuration(format!(
                "default_emergency_months ({}) exceeds max_emergency_months ({})",
                self.default_emergency_months, self.max_emergency_months
            )));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_policy_is_valid() {
        let policy = PlanningPolicy::default();
        assert!(policy.validate().is_ok());
        assert_eq!(policy.default_emergency_months, 3);
        assert_eq!(policy.max_emergency_months, 24);
    }

    #[test]
    fn partial_json_falls_back_to_defaults() {
        let policy = PlanningPolicy::from_json_str(r#"{ "minimum_savings_ratio": 0.2 }"#).unwrap();

        assert_eq!(policy.minimum_savings_ratio, 0.2);
        assert_eq!(policy.mostly_on_track_factor, 0.8);
        assert_eq!(policy.max_emergency_months, 24);
    }

    #[test]
    fn out_of_range_ratio_is_rejected() {
        let err = PlanningPolicy::from_json_str(r#"{ "mostly_on_track_factor": 1.5 }"#).unwrap_err();
        assert!(matches!(err, FinanceError::Configuration(_)));
    }

    #[test]
    fn default_months_above_max_is_rejected() {
        let policy = PlanningPolicy {
            default_emergency_months: 30,
            ..PlanningPolicy::default()
        };
        assert!(policy.validate().is_err());
    }

    #[test]
    fn month_limit_cannot_exceed_the_ceiling() {
        let loose = PlanningPolicy {
            max_emergency_months: 60,
            ..PlanningPolicy::default()
        };
        assert!(matches!(loose.validate(), Err(FinanceError::Configuration(_))));

        let err = PlanningPolicy::from_json_str(r#"{ "max_emergency_months": 25 }"#).unwrap_err();
        assert!(matches!(err, FinanceError::Configuration(_)));

        let tighter = PlanningPolicy {
            max_emergency_months: 12,
            ..PlanningPolicy::default()
        };
        assert!(tighter.validate().is_ok());
    }

    #[test]
    fn malformed_json_is_a_configuration_error() {
        let err = PlanningPolicy::from_json_str("{ not json").unwrap_err();
        assert!(matches!(err, FinanceError::Configuration(_)));
    }
}

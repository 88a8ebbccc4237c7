use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use crate::error::PortfolioError;
use crate::types::Weight;
use crate::PortfolioResult;

/// Default per-stock weight cap.
pub const DEFAULT_MAX_WEIGHT: Weight = dec!(0.10);

/// Default half-width of the portfolio beta band.
pub const DEFAULT_BETA_TOLERANCE: Decimal = dec!(0.05);

/// Tunable constants of the LP formulation.
///
/// Missing fields fall back to the documented defaults, so `{}` is a valid
/// configuration file.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FormulationConfig {
    /// Upper bound on every individual weight.
    pub max_weight: Weight,
    /// Allowed deviation of portfolio beta from the target beta.
    pub beta_tolerance: Decimal,
}

impl Default for FormulationConfig {
    fn default() -> Self {
        Self {
            max_weight: DEFAULT_MAX_WEIGHT,
            beta_tolerance: DEFAULT_BETA_TOLERANCE,
        }
    }
}

impl FormulationConfig {
    pub fn validate(&self) -> PortfolioResult<()> {
        if self.max_weight <= Decimal::ZERO || self.max_weight > Decimal::ONE {
            return Err(PortfolioError::InvalidInput {
                field: "max_weight".into(),
                reason: format!("Must be in (0, 1], got {}", self.max_weight),
            });
        }
        if self.beta_tolerance < Decimal::ZERO {
            return Err(PortfolioError::InvalidInput {
                field: "beta_tolerance".into(),
                reason: format!("Must be non-negative, got {}", self.beta_tolerance),
            });
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_defaults_match_documented_constants() {
        let cfg = FormulationConfig::default();
        assert_eq!(cfg.max_weight, dec!(0.10));
        assert_eq!(cfg.beta_tolerance, dec!(0.05));
        assert!(cfg.validate().is_ok());
    }

    #[test]
    fn test_empty_json_uses_defaults() {
        let cfg: FormulationConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(cfg, FormulationConfig::default());
    }

    #[test]
    fn test_partial_json_overrides_one_field() {
        let cfg: FormulationConfig = serde_json::from_str(r#"{"max_weight": "0.25"}"#).unwrap();
        assert_eq!(cfg.max_weight, dec!(0.25));
        assert_eq!(cfg.beta_tolerance, dec!(0.05));
    }

    #[test]
    fn test_rejects_zero_cap() {
        let cfg = FormulationConfig {
            max_weight: Decimal::ZERO,
            ..Default::default()
        };
        assert!(matches!(
            cfg.validate(),
            Err(PortfolioError::InvalidInput { ref field, .. }) if field == "max_weight"
        ));
    }

    #[test]
    fn test_rejects_negative_beta_tolerance() {
        let cfg = FormulationConfig {
            beta_tolerance: dec!(-0.01),
            ..Default::default()
        };
        assert!(cfg.validate().is_err());
    }
}

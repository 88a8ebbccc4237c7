use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::solver::{SolveOutcome, SolveStatus};
use super::universe::{weighted_metric, Metric, ReturnColumn, Stock};
use crate::types::{Percent, Score, Weight};

/// Weights at or below this are solver noise, not positions.
pub const NEGLIGIBLE_WEIGHT: Weight = dec!(0.000000000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// A visible position joined back to its stock attributes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Holding {
    pub name: String,
    pub weight: Weight,
    pub expected_return: Percent,
    pub volatility: Percent,
    pub beta: Decimal,
    pub esg: Score,
}

/// Visible holdings, heaviest first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Allocation {
    pub holdings: Vec<Holding>,
}

/// Portfolio-level statistics over the full solved weight vector.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioMetrics {
    pub expected_return: Percent,
    /// Weighted average of stock volatilities (no correlation effects).
    pub volatility: Percent,
    pub esg: Score,
    pub beta: Decimal,
    pub total_weight: Weight,
    pub num_holdings: usize,
}

/// Structured result of one portfolio request.
///
/// `allocation` and `metrics` are present only for `Optimal`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PortfolioReport {
    pub status: SolveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub allocation: Option<Allocation>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metrics: Option<PortfolioMetrics>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Turn a solve outcome into a report over `universe`.
pub fn project(
    universe: &[Stock],
    return_column: ReturnColumn,
    outcome: &SolveOutcome,
) -> PortfolioReport {
    let weights = match (&outcome.status, &outcome.weights) {
        (SolveStatus::Optimal, Some(w)) if w.len() == universe.len() => w,
        (SolveStatus::Optimal, _) => {
            log::warn!(
                "optimal outcome does not carry one weight per stock ({} stocks)",
                universe.len()
            );
            return PortfolioReport::status_only(
                SolveStatus::SolverError,
                Some("solved weights do not match the universe".into()),
            );
        }
        (status, _) => return PortfolioReport::status_only(*status, outcome.message.clone()),
    };

    let mut holdings: Vec<Holding> = universe
        .iter()
        .zip(weights)
        .filter(|(_, w)| **w > NEGLIGIBLE_WEIGHT)
        .map(|(s, w)| Holding {
            name: s.name.clone(),
            weight: *w,
            expected_return: s.expected_return(return_column),
            volatility: s.volatility,
            beta: s.beta,
            esg: s.esg,
        })
        .collect();
    // Stable: equal weights keep universe order.
    holdings.sort_by(|a, b| b.weight.cmp(&a.weight));

    let metrics = PortfolioMetrics {
        expected_return: weighted_metric(universe, weights, Metric::Return(return_column)),
        volatility: weighted_metric(universe, weights, Metric::Volatility),
        esg: weighted_metric(universe, weights, Metric::Esg),
        beta: weighted_metric(universe, weights, Metric::Beta),
        total_weight: weights.iter().sum(),
        num_holdings: holdings.len(),
    };

    PortfolioReport {
        status: SolveStatus::Optimal,
        objective_value: outcome.objective_value,
        allocation: Some(Allocation { holdings }),
        metrics: Some(metrics),
        message: outcome.message.clone(),
    }
}

impl PortfolioReport {
    pub fn status_only(status: SolveStatus, message: Option<String>) -> Self {
        PortfolioReport {
            status,
            objective_value: None,
            allocation: None,
            metrics: None,
            message,
        }
    }
}

impl Allocation {
    pub fn weight_of(&self, name: &str) -> Option<Weight> {
        self.holdings.iter().find(|h| h.name == name).map(|h| h.weight)
    }
}

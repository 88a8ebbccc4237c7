use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::types::{Percent, Score};

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// One tradable instrument of the candidate universe.
///
/// Aliases accept the column headers of the source spreadsheet
/// (`Name`, `1yret`, `5yret`, `10yret`, `Volatility`, `Beta`, `ESG`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Stock {
    #[serde(alias = "Name")]
    pub name: String,
    /// Trailing 1-year return, percent.
    #[serde(alias = "1yret")]
    pub return_1y: Percent,
    /// Annualised 5-year return, percent.
    #[serde(alias = "5yret")]
    pub return_5y: Percent,
    /// Annualised 10-year return, percent.
    #[serde(alias = "10yret")]
    pub return_10y: Percent,
    /// Non-negative.
    #[serde(alias = "Volatility")]
    pub volatility: Percent,
    #[serde(alias = "Beta")]
    pub beta: Decimal,
    /// Non-negative.
    #[serde(alias = "ESG")]
    pub esg: Score,
}

/// Which historical return series stands in for expected return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReturnColumn {
    #[serde(rename = "return_1y")]
    OneYear,
    #[serde(rename = "return_5y")]
    FiveYear,
    #[serde(rename = "return_10y")]
    TenYear,
}

/// A per-stock attribute that enters the formulation linearly.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    Return(ReturnColumn),
    Volatility,
    Beta,
    Esg,
}

// ---------------------------------------------------------------------------
// Impls
// ---------------------------------------------------------------------------

impl Stock {
    pub fn expected_return(&self, column: ReturnColumn) -> Percent {
        match column {
            ReturnColumn::OneYear => self.return_1y,
            ReturnColumn::FiveYear => self.return_5y,
            ReturnColumn::TenYear => self.return_10y,
        }
    }

    pub fn metric(&self, metric: Metric) -> Decimal {
        match metric {
            Metric::Return(column) => self.expected_return(column),
            Metric::Volatility => self.volatility,
            Metric::Beta => self.beta,
            Metric::Esg => self.esg,
        }
    }
}

impl ReturnColumn {
    /// Header of the column in the source data.
    pub fn source_column(&self) -> &'static str {
        match self {
            ReturnColumn::OneYear => "1yret",
            ReturnColumn::FiveYear => "5yret",
            ReturnColumn::TenYear => "10yret",
        }
    }
}

/// The metric as a coefficient vector, aligned with universe order.
pub fn metric_vector(universe: &[Stock], metric: Metric) -> Vec<Decimal> {
    universe.iter().map(|s| s.metric(metric)).collect()
}

/// Weighted sum of a metric over the universe.
///
/// `weights` must be aligned with `universe`; extra entries on either side are
/// ignored.
pub fn weighted_metric(universe: &[Stock], weights: &[Decimal], metric: Metric) -> Decimal {
    universe
        .iter()
        .zip(weights)
        .map(|(s, w)| s.metric(metric) * *w)
        .sum()
}

//! Explanations for an empty feasible region.
//!
//! Each target is checked alone against what budget and cap permit. The checks
//! are necessary conditions only: a request can pass all of them and still be
//! infeasible because targets conflict with each other.

use rust_decimal::Decimal;
use serde::Serialize;

use super::preferences::Preferences;
use super::universe::{metric_vector, Metric, Stock};
use crate::config::FormulationConfig;
use crate::types::Weight;

/// Smallest and largest value a linear metric can take on the budget/cap
/// polytope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MetricRange {
    pub min: Decimal,
    pub max: Decimal,
}

/// `None` when `values.len() * cap < 1`, i.e. the budget cannot be met at all.
pub fn attainable_range(values: &[Decimal], cap: Weight) -> Option<MetricRange> {
    if cap <= Decimal::ZERO || Decimal::from(values.len()) * cap < Decimal::ONE {
        return None;
    }
    let mut sorted = values.to_vec();
    sorted.sort();
    Some(MetricRange {
        min: greedy_fill(sorted.iter(), cap),
        max: greedy_fill(sorted.iter().rev(), cap),
    })
}

/// Fill weights up to `cap` in iteration order until the budget is spent.
fn greedy_fill<'a>(values: impl Iterator<Item = &'a Decimal>, cap: Weight) -> Decimal {
    let mut remaining = Decimal::ONE;
    let mut total = Decimal::ZERO;
    for v in values {
        if remaining <= Decimal::ZERO {
            break;
        }
        let w = cap.min(remaining);
        total += w * *v;
        remaining -= w;
    }
    total
}

/// Human-readable reasons why `preferences` cannot be met on `universe`.
pub fn diagnose(
    universe: &[Stock],
    preferences: &Preferences,
    config: &FormulationConfig,
) -> Vec<String> {
    let mut out = Vec::new();
    let cap = config.max_weight;
    let n = universe.len();

    if n == 0 {
        out.push("Universe is empty".to_string());
        return out;
    }
    if Decimal::from(n) * cap < Decimal::ONE {
        out.push(format!(
            "Budget unreachable: {} stocks at a cap of {} cover only {} of the portfolio",
            n,
            cap,
            Decimal::from(n) * cap
        ));
        return out;
    }

    let t = preferences.targets();
    let range = |metric: Metric| attainable_range(&metric_vector(universe, metric), cap);

    if let Some(r) = range(Metric::Return(t.return_column())) {
        if r.max < t.min_return() {
            out.push(format!(
                "Return floor {} ({}) exceeds the best attainable return {}",
                t.min_return(),
                t.return_column().source_column(),
                r.max.round_dp(4)
            ));
        }
    }
    if let Some(r) = range(Metric::Volatility) {
        if r.min > t.max_volatility() {
            out.push(format!(
                "Volatility ceiling {} is below the lowest attainable volatility {}",
                t.max_volatility(),
                r.min.round_dp(4)
            ));
        }
    }
    if let Some(r) = range(Metric::Esg) {
        if r.max < t.min_esg() {
            out.push(format!(
                "ESG floor {} exceeds the best attainable ESG score {}",
                t.min_esg(),
                r.max.round_dp(4)
            ));
        }
    }
    if let Some(r) = range(Metric::Beta) {
        let lo = t.target_beta() - config.beta_tolerance;
        let hi = t.target_beta() + config.beta_tolerance;
        if r.max < lo || r.min > hi {
            out.push(format!(
                "Beta band [{}, {}] lies outside the attainable beta range [{}, {}]",
                lo,
                hi,
                r.min.round_dp(4),
                r.max.round_dp(4)
            ));
        }
    }

    out
}

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::preferences::Preferences;
use super::universe::{metric_vector, Metric, Stock};
use crate::config::FormulationConfig;
use crate::error::PortfolioError;
use crate::types::Weight;
use crate::PortfolioResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Linear objective over the weight vector; always maximised.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Objective {
    pub coefficients: Vec<Decimal>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Comparison {
    /// activity == rhs
    Eq,
    /// activity <= rhs
    Le,
    /// activity >= rhs
    Ge,
}

/// Business meaning of a constraint row.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintKind {
    Budget,
    ReturnFloor,
    VolatilityCeiling,
    EsgFloor,
    BetaFloor,
    BetaCeiling,
}

/// `coefficients · w  <comparison>  rhs`
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinearConstraint {
    pub kind: ConstraintKind,
    pub coefficients: Vec<Decimal>,
    pub comparison: Comparison,
    pub rhs: Decimal,
}

/// Feasible region: box bounds shared by every weight plus linear rows.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConstraintSet {
    pub lower_bound: Weight,
    pub upper_bound: Weight,
    pub rows: Vec<LinearConstraint>,
}

/// A complete LP ready for a backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Formulation {
    pub objective: Objective,
    pub constraints: ConstraintSet,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build the allocation LP for `universe` under `preferences`.
///
/// Variables: one weight per stock, in universe order, bounded to
/// `[0, config.max_weight]`.
///
/// Rows:
///   sum(w) == 1
///   r · w >= min_return
///   vol · w <= max_volatility
///   esg · w >= min_esg
///   target_beta - tol <= beta · w <= target_beta + tol
///
/// Objective: maximise r · w, where r is the return column chosen by the
/// horizon.
pub fn build(
    universe: &[Stock],
    preferences: &Preferences,
    config: &FormulationConfig,
) -> PortfolioResult<Formulation> {
    if universe.is_empty() {
        return Err(PortfolioError::EmptyUniverse);
    }
    config.validate()?;

    let targets = preferences.targets();
    let n = universe.len();
    let returns = metric_vector(universe, Metric::Return(targets.return_column()));
    let beta = metric_vector(universe, Metric::Beta);

    let rows = vec![
        LinearConstraint {
            kind: ConstraintKind::Budget,
            coefficients: vec![Decimal::ONE; n],
            comparison: Comparison::Eq,
            rhs: Decimal::ONE,
        },
        LinearConstraint {
            kind: ConstraintKind::ReturnFloor,
            coefficients: returns.clone(),
            comparison: Comparison::Ge,
            rhs: targets.min_return(),
        },
        LinearConstraint {
            kind: ConstraintKind::VolatilityCeiling,
            coefficients: metric_vector(universe, Metric::Volatility),
            comparison: Comparison::Le,
            rhs: targets.max_volatility(),
        },
        LinearConstraint {
            kind: ConstraintKind::EsgFloor,
            coefficients: metric_vector(universe, Metric::Esg),
            comparison: Comparison::Ge,
            rhs: targets.min_esg(),
        },
        LinearConstraint {
            kind: ConstraintKind::BetaFloor,
            coefficients: beta.clone(),
            comparison: Comparison::Ge,
            rhs: targets.target_beta() - config.beta_tolerance,
        },
        LinearConstraint {
            kind: ConstraintKind::BetaCeiling,
            coefficients: beta,
            comparison: Comparison::Le,
            rhs: targets.target_beta() + config.beta_tolerance,
        },
    ];

    log::debug!(
        "built allocation LP: {} variables, {} rows, cap {}",
        n,
        rows.len(),
        config.max_weight
    );

    Ok(Formulation {
        objective: Objective {
            coefficients: returns,
        },
        constraints: ConstraintSet {
            lower_bound: Decimal::ZERO,
            upper_bound: config.max_weight,
            rows,
        },
    })
}

// ---------------------------------------------------------------------------
// Evaluation helpers
// ---------------------------------------------------------------------------

impl Objective {
    pub fn value(&self, weights: &[Decimal]) -> Decimal {
        dot(&self.coefficients, weights)
    }
}

impl LinearConstraint {
    /// Left-hand side evaluated at `weights`.
    pub fn activity(&self, weights: &[Decimal]) -> Decimal {
        dot(&self.coefficients, weights)
    }

    /// Distance to the boundary; negative when violated.
    pub fn slack(&self, weights: &[Decimal]) -> Decimal {
        let activity = self.activity(weights);
        match self.comparison {
            Comparison::Eq => -(activity - self.rhs).abs(),
            Comparison::Le => self.rhs - activity,
            Comparison::Ge => activity - self.rhs,
        }
    }

    pub fn is_satisfied_by(&self, weights: &[Decimal], tolerance: Decimal) -> bool {
        self.slack(weights) >= -tolerance
    }
}

impl Formulation {
    pub fn num_variables(&self) -> usize {
        self.objective.coefficients.len()
    }

    /// Rows (and box bounds, reported as `None`) violated by more than
    /// `tolerance` at `weights`.
    pub fn violations(
        &self,
        weights: &[Decimal],
        tolerance: Decimal,
    ) -> Vec<(Option<ConstraintKind>, Decimal)> {
        let mut out = Vec::new();
        for w in weights {
            if *w < self.constraints.lower_bound - tolerance
                || *w > self.constraints.upper_bound + tolerance
            {
                out.push((None, *w));
            }
        }
        for row in &self.constraints.rows {
            if !row.is_satisfied_by(weights, tolerance) {
                out.push((Some(row.kind), row.activity(weights)));
            }
        }
        out
    }
}

fn dot(a: &[Decimal], b: &[Decimal]) -> Decimal {
    a.iter().zip(b).map(|(x, y)| *x * *y).sum()
}

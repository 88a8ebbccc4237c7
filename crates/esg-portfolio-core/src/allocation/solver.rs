use highs::{HighsModelStatus, RowProblem, Sense};
use rust_decimal::prelude::{FromPrimitive, ToPrimitive};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::constraints::{Comparison, Formulation};
use crate::types::Weight;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Terminal status of one solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SolveStatus {
    Optimal,
    Infeasible,
    Unbounded,
    SolverError,
}

/// What a backend hands back: its status mapped onto [`SolveStatus`] and,
/// when optimal, one primal value per column.
#[derive(Debug, Clone, PartialEq)]
pub struct BackendSolution {
    pub status: SolveStatus,
    pub columns: Vec<f64>,
    pub detail: Option<String>,
}

/// Result of handing a [`Formulation`] to a backend.
///
/// `weights` and `objective_value` are present only when `status` is
/// `Optimal`; `weights` is aligned with the universe the formulation was
/// built from.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SolveOutcome {
    pub status: SolveStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub objective_value: Option<Decimal>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub weights: Option<Vec<Weight>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// An LP solver able to maximise a [`Formulation`].
pub trait LpBackend {
    fn name(&self) -> &str;

    /// `Err` is reserved for failures unrelated to problem structure
    /// (model rejected, numerical breakdown, unrepresentable input).
    fn solve_lp(&self, formulation: &Formulation) -> Result<BackendSolution, String>;
}

/// HiGHS simplex/IPM backend, run quietly.
#[derive(Debug, Clone, Default)]
pub struct HighsBackend;

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Solve with the default HiGHS backend.
pub fn solve(formulation: &Formulation) -> SolveOutcome {
    solve_with(&HighsBackend, formulation)
}

/// Solve with any backend. Never fails: backend errors become
/// `SolveStatus::SolverError`.
pub fn solve_with(backend: &dyn LpBackend, formulation: &Formulation) -> SolveOutcome {
    let n = formulation.num_variables();
    let solution = match backend.solve_lp(formulation) {
        Ok(s) => s,
        Err(msg) => {
            log::warn!("{} failed: {}", backend.name(), msg);
            return SolveOutcome::failed(SolveStatus::SolverError, Some(msg));
        }
    };

    if solution.status != SolveStatus::Optimal {
        log::warn!(
            "{} finished with status {:?} ({} variables)",
            backend.name(),
            solution.status,
            n
        );
        return SolveOutcome::failed(solution.status, solution.detail);
    }

    if solution.columns.len() != n {
        let msg = format!(
            "{} returned {} values for {} variables",
            backend.name(),
            solution.columns.len(),
            n
        );
        log::warn!("{}", msg);
        return SolveOutcome::failed(SolveStatus::SolverError, Some(msg));
    }

    let lower = formulation.constraints.lower_bound;
    let upper = formulation.constraints.upper_bound;
    let mut weights = Vec::with_capacity(n);
    for (i, value) in solution.columns.iter().enumerate() {
        match Decimal::from_f64(*value) {
            // Bounds hold only to solver tolerance.
            Some(w) => weights.push(w.max(lower).min(upper)),
            None => {
                let msg = format!("{} returned non-finite weight {} at {}", backend.name(), value, i);
                log::warn!("{}", msg);
                return SolveOutcome::failed(SolveStatus::SolverError, Some(msg));
            }
        }
    }

    let objective_value = formulation.objective.value(&weights);
    log::info!(
        "{} solved {} variables: objective {}",
        backend.name(),
        n,
        objective_value.round_dp(6)
    );

    SolveOutcome {
        status: SolveStatus::Optimal,
        objective_value: Some(objective_value),
        weights: Some(weights),
        message: solution.detail,
    }
}

impl SolveOutcome {
    fn failed(status: SolveStatus, message: Option<String>) -> Self {
        SolveOutcome {
            status,
            objective_value: None,
            weights: None,
            message,
        }
    }

    pub fn is_optimal(&self) -> bool {
        self.status == SolveStatus::Optimal
    }
}

// ---------------------------------------------------------------------------
// HiGHS
// ---------------------------------------------------------------------------

impl LpBackend for HighsBackend {
    fn name(&self) -> &str {
        "HiGHS"
    }

    fn solve_lp(&self, formulation: &Formulation) -> Result<BackendSolution, String> {
        let lower = to_f64(formulation.constraints.lower_bound, "lower bound")?;
        let upper = to_f64(formulation.constraints.upper_bound, "upper bound")?;

        let mut problem = RowProblem::default();
        let mut cols = Vec::with_capacity(formulation.num_variables());
        for c in &formulation.objective.coefficients {
            cols.push(problem.add_column(to_f64(*c, "objective")?, lower..=upper));
        }

        for row in &formulation.constraints.rows {
            let rhs = to_f64(row.rhs, "right-hand side")?;
            let mut factors = Vec::with_capacity(cols.len());
            for (col, c) in cols.iter().zip(&row.coefficients) {
                factors.push((*col, to_f64(*c, "coefficient")?));
            }
            match row.comparison {
                Comparison::Eq => problem.add_row(rhs..=rhs, factors),
                Comparison::Le => problem.add_row(..=rhs, factors),
                Comparison::Ge => problem.add_row(rhs.., factors),
            };
        }

        let mut model = problem
            .try_optimise(Sense::Maximise)
            .map_err(|s| format!("model rejected: {s:?}"))?;
        model.make_quiet();
        let solved = model
            .try_solve()
            .map_err(|s| format!("solve aborted: {s:?}"))?;

        let highs_status = solved.status();
        let status = map_status(highs_status);
        let columns = if status == SolveStatus::Optimal {
            solved.get_solution().columns().to_vec()
        } else {
            Vec::new()
        };

        Ok(BackendSolution {
            status,
            columns,
            detail: match status {
                SolveStatus::Optimal => None,
                _ => Some(format!("HiGHS model status {highs_status:?}")),
            },
        })
    }
}

/// Every column is boxed, so "unbounded or infeasible" can only mean
/// infeasible here.
fn map_status(status: HighsModelStatus) -> SolveStatus {
    match status {
        HighsModelStatus::Optimal => SolveStatus::Optimal,
        HighsModelStatus::Infeasible | HighsModelStatus::UnboundedOrInfeasible => {
            SolveStatus::Infeasible
        }
        HighsModelStatus::Unbounded => SolveStatus::Unbounded,
        _ => SolveStatus::SolverError,
    }
}

fn to_f64(value: Decimal, what: &str) -> Result<f64, String> {
    value
        .to_f64()
        .ok_or_else(|| format!("{what} {value} is not representable as f64"))
}

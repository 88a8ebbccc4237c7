use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::time::Instant;

use super::constraints::{build, Formulation};
use super::diagnostics::diagnose;
use super::preferences::{resolve, PreferenceSource, Preferences, RawChoices};
use super::projection::{project, PortfolioReport};
use super::solver::{solve_with, HighsBackend, LpBackend, SolveOutcome, SolveStatus};
use super::universe::Stock;
use crate::config::FormulationConfig;
use crate::error::PortfolioError;
use crate::types::{with_metadata, ComputationOutput};
use crate::PortfolioResult;

/// Post-solve constraint check tolerance.
const VERIFY_TOLERANCE: Decimal = dec!(0.000001);

/// Distance below the cap at which a weight counts as capped.
const CAP_TOLERANCE: Decimal = dec!(0.000000001);

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Self-contained request, as read from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PortfolioInput {
    pub universe: Vec<Stock>,
    pub preferences: RawChoices,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub config: Option<FormulationConfig>,
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Build, solve and project one portfolio with default configuration and
/// the HiGHS backend.
///
/// `source` is consulted only when `preferences` is `None`.
pub fn get_portfolio(
    universe: &[Stock],
    preferences: Option<Preferences>,
    source: &mut dyn PreferenceSource,
) -> PortfolioResult<PortfolioReport> {
    get_portfolio_with(
        universe,
        preferences,
        source,
        &FormulationConfig::default(),
        &HighsBackend,
    )
}

/// [`get_portfolio`] with explicit configuration and backend.
///
/// Only caller errors (`EmptyUniverse`, `InvalidPreferenceChoice`, invalid
/// configuration, failed acquisition) are `Err`; every solver result,
/// including infeasibility, comes back as a report status.
pub fn get_portfolio_with(
    universe: &[Stock],
    preferences: Option<Preferences>,
    source: &mut dyn PreferenceSource,
    config: &FormulationConfig,
    backend: &dyn LpBackend,
) -> PortfolioResult<PortfolioReport> {
    if universe.is_empty() {
        return Err(PortfolioError::EmptyUniverse);
    }
    let preferences = match preferences {
        Some(p) => p,
        None => resolve(&source.acquire()?)?,
    };
    let (_, _, report) = run(universe, &preferences, config, backend)?;
    Ok(report)
}

/// Full request with the standard output envelope: assumptions, warnings
/// (diagnostics for non-optimal outcomes, verification and concentration
/// notes for optimal ones) and timing.
pub fn optimize_portfolio(
    input: &PortfolioInput,
) -> PortfolioResult<ComputationOutput<PortfolioReport>> {
    optimize_portfolio_with(input, &HighsBackend)
}

pub fn optimize_portfolio_with(
    input: &PortfolioInput,
    backend: &dyn LpBackend,
) -> PortfolioResult<ComputationOutput<PortfolioReport>> {
    let start = Instant::now();
    let mut warnings: Vec<String> = Vec::new();

    if input.universe.is_empty() {
        return Err(PortfolioError::EmptyUniverse);
    }
    let preferences = resolve(&input.preferences)?;
    let config = input.config.clone().unwrap_or_default();
    let universe = &input.universe;

    let (formulation, outcome, report) = run(universe, &preferences, &config, backend)?;

    match report.status {
        SolveStatus::Optimal => {
            if let Some(ref alloc) = report.allocation {
                let capped = alloc
                    .holdings
                    .iter()
                    .filter(|h| h.weight >= config.max_weight - CAP_TOLERANCE)
                    .count();
                if capped > 0 {
                    warnings.push(format!(
                        "{} of {} holdings sit at the {} weight cap",
                        capped,
                        alloc.holdings.len(),
                        config.max_weight
                    ));
                }
            }
            warnings.extend(verify(&formulation, &outcome));
            warnings.push(
                "Volatility is a weighted average of stock volatilities; correlation is ignored"
                    .to_string(),
            );
        }
        SolveStatus::Infeasible => {
            let reasons = diagnose(universe, &preferences, &config);
            if reasons.is_empty() {
                warnings.push(
                    "Each target is attainable on its own; their combination is not".to_string(),
                );
            }
            warnings.extend(reasons);
        }
        SolveStatus::Unbounded | SolveStatus::SolverError => {
            warnings.extend(diagnose(universe, &preferences, &config));
        }
    }

    let targets = preferences.targets();
    let elapsed = start.elapsed().as_micros() as u64;
    Ok(with_metadata(
        "Linear programme: maximise expected return subject to budget, cap, return, volatility, ESG and beta constraints",
        &serde_json::json!({
            "n_stocks": universe.len(),
            "backend": backend.name(),
            "preferences": preferences,
            "return_column": targets.return_column(),
            "min_return": targets.min_return().to_string(),
            "max_volatility": targets.max_volatility().to_string(),
            "target_beta": targets.target_beta().to_string(),
            "beta_tolerance": config.beta_tolerance.to_string(),
            "min_esg": targets.min_esg().to_string(),
            "max_weight": config.max_weight.to_string(),
        }),
        warnings,
        elapsed,
        report,
    ))
}

// ---------------------------------------------------------------------------
// Internals
// ---------------------------------------------------------------------------

fn run(
    universe: &[Stock],
    preferences: &Preferences,
    config: &FormulationConfig,
    backend: &dyn LpBackend,
) -> PortfolioResult<(Formulation, SolveOutcome, PortfolioReport)> {
    let formulation = build(universe, preferences, config)?;
    let outcome = solve_with(backend, &formulation);
    let report = project(universe, preferences.targets().return_column(), &outcome);
    Ok((formulation, outcome, report))
}

/// Re-evaluate every constraint on the full solved weight vector.
fn verify(formulation: &Formulation, outcome: &SolveOutcome) -> Vec<String> {
    let Some(ref weights) = outcome.weights else {
        return Vec::new();
    };
    formulation
        .violations(weights, VERIFY_TOLERANCE)
        .into_iter()
        .map(|(kind, value)| match kind {
            Some(k) => format!("Solved portfolio violates {:?} (activity {})", k, value.round_dp(8)),
            None => format!("Solved weight {} lies outside the variable bounds", value.round_dp(8)),
        })
        .collect()
}

use napi::Result as NapiResult;
use napi_derive::napi;
use serde::Serialize;

use esg_portfolio_core::allocation::portfolio::{optimize_portfolio, PortfolioInput};
use esg_portfolio_core::allocation::preferences::{self, Preferences, RawChoices, Targets};

/// Convert any Display error into a napi::Error.
fn to_napi_error(e: impl std::fmt::Display) -> napi::Error {
    napi::Error::from_reason(e.to_string())
}

// ---------------------------------------------------------------------------
// Allocation
// ---------------------------------------------------------------------------

/// `{"universe": [...], "preferences": {...}, "config": {...}?}` in, the
/// report envelope out. Infeasible targets come back as a status, not an error.
#[napi]
pub fn get_portfolio(input_json: String) -> NapiResult<String> {
    let input: PortfolioInput = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let output = optimize_portfolio(&input).map_err(to_napi_error)?;
    serde_json::to_string(&output).map_err(to_napi_error)
}

// ---------------------------------------------------------------------------
// Preferences
// ---------------------------------------------------------------------------

#[derive(Serialize)]
struct Resolved {
    preferences: Preferences,
    targets: Targets,
}

#[napi]
pub fn resolve_preferences(input_json: String) -> NapiResult<String> {
    let raw: RawChoices = serde_json::from_str(&input_json).map_err(to_napi_error)?;
    let prefs = preferences::resolve(&raw).map_err(to_napi_error)?;
    let output = Resolved {
        preferences: prefs,
        targets: prefs.targets(),
    };
    serde_json::to_string(&output).map_err(to_napi_error)
}

#[napi]
pub fn preference_tiers() -> NapiResult<String> {
    serde_json::to_string(&preferences::tier_table()).map_err(to_napi_error)
}

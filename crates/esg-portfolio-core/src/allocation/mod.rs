//! Preference-driven allocation as a linear programme.
//!
//! Pipeline: [`preferences::resolve`] → [`constraints::build`] →
//! [`solver::solve`] → [`projection::project`], each stage passing an
//! immutable value to the next. [`portfolio::get_portfolio`] runs all four.

pub mod constraints;
pub mod diagnostics;
pub mod portfolio;
pub mod preferences;
pub mod projection;
pub mod solver;
pub mod universe;

pub use portfolio::{get_portfolio, optimize_portfolio, PortfolioInput};
pub use preferences::{resolve, PreferenceSource, Preferences, RawChoices};
pub use projection::PortfolioReport;
pub use solver::{SolveOutcome, SolveStatus};
pub use universe::{ReturnColumn, Stock};

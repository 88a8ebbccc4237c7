use clap::Args;
use serde::Serialize;
use serde_json::Value;

use esg_portfolio_core::allocation::preferences::{self, Preferences, RawChoices, Targets};

/// The four preference answers; each is 1, 2 or 3.
#[derive(Args, Debug, Clone, Default)]
pub struct ChoiceArgs {
    /// Investment horizon: 1 = short (1y), 2 = medium (5y), 3 = long (10y)
    #[arg(long, allow_hyphen_values = true)]
    pub horizon: Option<i64>,

    /// Risk tier: 1 = low, 2 = medium, 3 = high
    #[arg(long, allow_hyphen_values = true)]
    pub risk: Option<i64>,

    /// Beta tier: 1 = defensive, 2 = neutral, 3 = aggressive
    #[arg(long, allow_hyphen_values = true)]
    pub beta: Option<i64>,

    /// Sustainability tier: 1 = low, 2 = medium, 3 = high
    #[arg(long, allow_hyphen_values = true)]
    pub esg: Option<i64>,
}

/// Arguments for the preference table
#[derive(Args)]
pub struct PreferencesArgs {
    #[command(flatten)]
    pub choices: ChoiceArgs,
}

#[derive(Debug, Serialize)]
struct ResolvedOutput {
    preferences: Preferences,
    targets: Targets,
}

impl ChoiceArgs {
    /// All four answers, if every flag was given.
    pub fn complete(&self) -> Option<RawChoices> {
        Some(RawChoices {
            horizon: self.horizon?,
            risk: self.risk?,
            beta: self.beta?,
            esg: self.esg?,
        })
    }

    pub fn is_empty(&self) -> bool {
        self.horizon.is_none() && self.risk.is_none() && self.beta.is_none() && self.esg.is_none()
    }
}

pub fn run_preferences(args: PreferencesArgs) -> Result<Value, Box<dyn std::error::Error>> {
    if args.choices.is_empty() {
        return Ok(serde_json::to_value(preferences::tier_table())?);
    }
    let raw = args
        .choices
        .complete()
        .ok_or("Provide all of --horizon, --risk, --beta and --esg, or none for the table")?;
    let prefs = preferences::resolve(&raw)?;
    let output = ResolvedOutput {
        preferences: prefs,
        targets: prefs.targets(),
    };
    Ok(serde_json::to_value(output)?)
}

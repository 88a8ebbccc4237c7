use clap::Args;
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::Value;
use std::io;

use esg_portfolio_core::allocation::portfolio::{optimize_portfolio, PortfolioInput};
use esg_portfolio_core::allocation::preferences::{PreferenceSource, RawChoices};
use esg_portfolio_core::allocation::universe::Stock;
use esg_portfolio_core::FormulationConfig;

use super::preferences::ChoiceArgs;
use crate::input;
use crate::input::prompt::PromptSource;

/// Arguments for portfolio optimisation
#[derive(Args)]
pub struct OptimizeArgs {
    /// Stock universe: CSV with Name,1yret,5yret,10yret,Volatility,Beta,ESG headers, or JSON
    #[arg(long)]
    pub input: Option<String>,

    #[command(flatten)]
    pub choices: ChoiceArgs,

    /// Formulation config file (JSON, or YAML with a .yaml/.yml extension)
    #[arg(long)]
    pub config: Option<String>,

    /// Per-stock weight cap, overrides the config file
    #[arg(long)]
    pub max_weight: Option<Decimal>,

    /// Half-width of the portfolio beta band, overrides the config file
    #[arg(long)]
    pub beta_tolerance: Option<Decimal>,
}

/// JSON accepted on stdin when no --input is given: either a bare array of
/// stocks or an object carrying the universe and optionally the answers.
#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum PipedRequest {
    Full {
        universe: Vec<Stock>,
        #[serde(default)]
        preferences: Option<RawChoices>,
        #[serde(default)]
        config: Option<FormulationConfig>,
    },
    Universe(Vec<Stock>),
}

pub fn run_optimize(args: OptimizeArgs) -> Result<Value, Box<dyn std::error::Error>> {
    let (universe, piped_choices, piped_config) = load_request(&args.input)?;
    let config = resolve_config(&args, piped_config)?;
    let given = merge_choices(&args.choices, piped_choices);

    let preferences = match given.complete() {
        Some(raw) => raw,
        None => {
            if !input::stdin::is_interactive() {
                return Err(
                    "Preferences missing: pass --horizon, --risk, --beta and --esg \
                     (stdin is not a terminal, so they cannot be prompted)"
                        .into(),
                );
            }
            let stdin = io::stdin();
            let mut source = PromptSource::new(stdin.lock(), io::stderr(), given);
            source.acquire()?
        }
    };

    let request = PortfolioInput {
        universe,
        preferences,
        config: Some(config),
    };
    let result = optimize_portfolio(&request)?;
    Ok(serde_json::to_value(result)?)
}

type Request = (Vec<Stock>, Option<RawChoices>, Option<FormulationConfig>);

fn load_request(path: &Option<String>) -> Result<Request, Box<dyn std::error::Error>> {
    if let Some(ref path) = path {
        return Ok((input::universe::read_universe(path)?, None, None));
    }
    let Some(data) = input::stdin::read_stdin()? else {
        return Err("Provide --input <universe.csv|universe.json> or pipe JSON via stdin".into());
    };
    let request: PipedRequest = serde_json::from_value(data)?;
    let (universe, choices, config) = match request {
        PipedRequest::Full {
            universe,
            preferences,
            config,
        } => (universe, preferences, config),
        PipedRequest::Universe(universe) => (universe, None, None),
    };
    input::universe::validate(&universe)?;
    Ok((universe, choices, config))
}

/// File (or piped) config first, then flag overrides.
fn resolve_config(
    args: &OptimizeArgs,
    piped: Option<FormulationConfig>,
) -> Result<FormulationConfig, Box<dyn std::error::Error>> {
    let mut config = match args.config {
        Some(ref path) => input::file::read_structured(path)?,
        None => piped.unwrap_or_default(),
    };
    if let Some(cap) = args.max_weight {
        config.max_weight = cap;
    }
    if let Some(tol) = args.beta_tolerance {
        config.beta_tolerance = tol;
    }
    config.validate()?;
    Ok(config)
}

/// Flags win over answers carried in piped JSON.
fn merge_choices(flags: &ChoiceArgs, piped: Option<RawChoices>) -> ChoiceArgs {
    let Some(p) = piped else {
        return flags.clone();
    };
    ChoiceArgs {
        horizon: flags.horizon.or(Some(p.horizon)),
        risk: flags.risk.or(Some(p.risk)),
        beta: flags.beta.or(Some(p.beta)),
        esg: flags.esg.or(Some(p.esg)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use std::fs;

    fn args(input: Option<String>) -> OptimizeArgs {
        OptimizeArgs {
            input,
            choices: ChoiceArgs {
                horizon: Some(3),
                risk: Some(1),
                beta: Some(1),
                esg: Some(3),
            },
            config: None,
            max_weight: None,
            beta_tolerance: None,
        }
    }

    #[test]
    fn test_flags_override_piped_choices() {
        let flags = ChoiceArgs {
            horizon: Some(1),
            ..Default::default()
        };
        let piped = RawChoices {
            horizon: 3,
            risk: 2,
            beta: 2,
            esg: 2,
        };
        let merged = merge_choices(&flags, Some(piped));
        assert_eq!(merged.horizon, Some(1));
        assert_eq!(merged.risk, Some(2));
        assert!(merged.complete().is_some());
    }

    #[test]
    fn test_flag_overrides_config() {
        let mut a = args(None);
        a.max_weight = Some(dec!(0.2));
        let cfg = resolve_config(&a, Some(FormulationConfig::default())).unwrap();
        assert_eq!(cfg.max_weight, dec!(0.2));
        assert_eq!(cfg.beta_tolerance, dec!(0.05));
    }

    #[test]
    fn test_invalid_override_rejected() {
        let mut a = args(None);
        a.beta_tolerance = Some(dec!(-0.1));
        assert!(resolve_config(&a, None).is_err());
    }

    #[test]
    fn test_piped_request_shapes() {
        let full: PipedRequest = serde_json::from_str(
            r#"{"universe": [], "preferences": {"horizon":1,"risk":1,"beta":1,"esg":1}}"#,
        )
        .unwrap();
        assert!(matches!(full, PipedRequest::Full { preferences: Some(_), .. }));

        let bare: PipedRequest = serde_json::from_str("[]").unwrap();
        assert!(matches!(bare, PipedRequest::Universe(_)));
    }

    #[test]
    fn test_optimize_csv_end_to_end() {
        let mut sheet = String::from("Name,1yret,5yret,10yret,Volatility,Beta,ESG\n");
        for i in 1..=12 {
            sheet.push_str(&format!("S{i:02},{i},{i},{i},0.5,0.8,7\n"));
        }
        let path = std::env::temp_dir().join(format!("esgp-ladder-{}.csv", std::process::id()));
        fs::write(&path, sheet).unwrap();

        let value = run_optimize(args(Some(path.display().to_string()))).unwrap();
        fs::remove_file(&path).ok();

        assert_eq!(value["result"]["status"], "OPTIMAL");
        let holdings = value["result"]["allocation"]["holdings"].as_array().unwrap();
        assert_eq!(holdings.len(), 10);
        assert_eq!(value["assumptions"]["return_column"], "return_10y");
    }
}

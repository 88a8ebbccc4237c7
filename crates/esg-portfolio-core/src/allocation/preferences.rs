use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};

use super::universe::ReturnColumn;
use crate::error::PortfolioError;
use crate::types::{Percent, Score};
use crate::PortfolioResult;

// ---------------------------------------------------------------------------
// Types
// ---------------------------------------------------------------------------

/// Investment horizon; selects the historical return series.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Horizon {
    Short,
    Medium,
    Long,
}

/// Risk appetite; sets the return floor and the volatility ceiling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum RiskTier {
    Low,
    Medium,
    High,
}

/// Desired market sensitivity; sets the centre of the beta band.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum BetaTier {
    Defensive,
    Neutral,
    Aggressive,
}

/// Sustainability requirement; sets the ESG floor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EsgTier {
    Low,
    Medium,
    High,
}

/// The four answers exactly as collected, each expected in {1, 2, 3}.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RawChoices {
    pub horizon: i64,
    pub risk: i64,
    pub beta: i64,
    pub esg: i64,
}

/// Validated categorical preferences.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Preferences {
    pub horizon: Horizon,
    pub risk_tier: RiskTier,
    pub beta_tier: BetaTier,
    pub esg_tier: EsgTier,
}

/// Numeric targets derived from [`Preferences`].
///
/// Only obtainable through [`Preferences::targets`], so the values always
/// match the tier tables.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Targets {
    return_column: ReturnColumn,
    min_return: Percent,
    max_volatility: Percent,
    target_beta: Decimal,
    min_esg: Score,
}

/// One row of the tier table, for display.
#[derive(Debug, Clone, Serialize)]
pub struct TierOption {
    pub question: &'static str,
    pub choice: u8,
    pub label: &'static str,
    pub effect: String,
}

/// Caller-supplied acquisition of raw choices (prompting, config, UI).
pub trait PreferenceSource {
    fn acquire(&mut self) -> PortfolioResult<RawChoices>;
}

// ---------------------------------------------------------------------------
// Public API
// ---------------------------------------------------------------------------

/// Resolve four raw answers into validated preferences.
///
/// Fails with [`PortfolioError::InvalidPreferenceChoice`] naming the first
/// answer outside {1, 2, 3}.
pub fn resolve(raw: &RawChoices) -> PortfolioResult<Preferences> {
    Ok(Preferences {
        horizon: Horizon::from_choice(raw.horizon)?,
        risk_tier: RiskTier::from_choice(raw.risk)?,
        beta_tier: BetaTier::from_choice(raw.beta)?,
        esg_tier: EsgTier::from_choice(raw.esg)?,
    })
}

/// Every answer of every question with its numeric effect.
pub fn tier_table() -> Vec<TierOption> {
    let mut rows = Vec::with_capacity(12);
    for h in [Horizon::Short, Horizon::Medium, Horizon::Long] {
        rows.push(TierOption {
            question: Horizon::QUESTION,
            choice: h.choice(),
            label: h.label(),
            effect: format!("return column = {}", h.return_column().source_column()),
        });
    }
    for r in [RiskTier::Low, RiskTier::Medium, RiskTier::High] {
        let (min_return, max_volatility) = r.bounds();
        rows.push(TierOption {
            question: RiskTier::QUESTION,
            choice: r.choice(),
            label: r.label(),
            effect: format!("min return = {min_return}, max volatility = {max_volatility}"),
        });
    }
    for b in [BetaTier::Defensive, BetaTier::Neutral, BetaTier::Aggressive] {
        rows.push(TierOption {
            question: BetaTier::QUESTION,
            choice: b.choice(),
            label: b.label(),
            effect: format!("target beta = {}", b.target_beta()),
        });
    }
    for e in [EsgTier::Low, EsgTier::Medium, EsgTier::High] {
        rows.push(TierOption {
            question: EsgTier::QUESTION,
            choice: e.choice(),
            label: e.label(),
            effect: format!("min ESG = {}", e.min_esg()),
        });
    }
    rows
}

// ---------------------------------------------------------------------------
// Tier tables
// ---------------------------------------------------------------------------

fn invalid(question: &str, value: i64) -> PortfolioError {
    PortfolioError::InvalidPreferenceChoice {
        question: question.into(),
        value,
    }
}

impl Horizon {
    pub const QUESTION: &'static str = "horizon";

    pub fn from_choice(value: i64) -> PortfolioResult<Self> {
        match value {
            1 => Ok(Horizon::Short),
            2 => Ok(Horizon::Medium),
            3 => Ok(Horizon::Long),
            _ => Err(invalid(Self::QUESTION, value)),
        }
    }

    pub fn choice(&self) -> u8 {
        match self {
            Horizon::Short => 1,
            Horizon::Medium => 2,
            Horizon::Long => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Horizon::Short => "Short term (1 year)",
            Horizon::Medium => "Medium term (5 years)",
            Horizon::Long => "Long term (10 years)",
        }
    }

    pub fn return_column(&self) -> ReturnColumn {
        match self {
            Horizon::Short => ReturnColumn::OneYear,
            Horizon::Medium => ReturnColumn::FiveYear,
            Horizon::Long => ReturnColumn::TenYear,
        }
    }
}

impl RiskTier {
    pub const QUESTION: &'static str = "risk";

    pub fn from_choice(value: i64) -> PortfolioResult<Self> {
        match value {
            1 => Ok(RiskTier::Low),
            2 => Ok(RiskTier::Medium),
            3 => Ok(RiskTier::High),
            _ => Err(invalid(Self::QUESTION, value)),
        }
    }

    pub fn choice(&self) -> u8 {
        match self {
            RiskTier::Low => 1,
            RiskTier::Medium => 2,
            RiskTier::High => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            RiskTier::Low => "Low risk",
            RiskTier::Medium => "Medium risk",
            RiskTier::High => "High risk",
        }
    }

    /// (min_return, max_volatility)
    pub fn bounds(&self) -> (Percent, Percent) {
        match self {
            RiskTier::Low => (dec!(6), dec!(1)),
            RiskTier::Medium => (dec!(10), dec!(5)),
            RiskTier::High => (dec!(15), dec!(10)),
        }
    }
}

impl BetaTier {
    pub const QUESTION: &'static str = "beta";

    pub fn from_choice(value: i64) -> PortfolioResult<Self> {
        match value {
            1 => Ok(BetaTier::Defensive),
            2 => Ok(BetaTier::Neutral),
            3 => Ok(BetaTier::Aggressive),
            _ => Err(invalid(Self::QUESTION, value)),
        }
    }

    pub fn choice(&self) -> u8 {
        match self {
            BetaTier::Defensive => 1,
            BetaTier::Neutral => 2,
            BetaTier::Aggressive => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            BetaTier::Defensive => "Defensive (less volatile than the market)",
            BetaTier::Neutral => "Neutral (moves with the market)",
            BetaTier::Aggressive => "Aggressive (amplifies market moves)",
        }
    }

    pub fn target_beta(&self) -> Decimal {
        match self {
            BetaTier::Defensive => dec!(0.8),
            BetaTier::Neutral => dec!(1.0),
            BetaTier::Aggressive => dec!(1.2),
        }
    }
}

impl EsgTier {
    pub const QUESTION: &'static str = "esg";

    pub fn from_choice(value: i64) -> PortfolioResult<Self> {
        match value {
            1 => Ok(EsgTier::Low),
            2 => Ok(EsgTier::Medium),
            3 => Ok(EsgTier::High),
            _ => Err(invalid(Self::QUESTION, value)),
        }
    }

    pub fn choice(&self) -> u8 {
        match self {
            EsgTier::Low => 1,
            EsgTier::Medium => 2,
            EsgTier::High => 3,
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            EsgTier::Low => "Low sustainability focus",
            EsgTier::Medium => "Medium sustainability focus",
            EsgTier::High => "High sustainability focus",
        }
    }

    pub fn min_esg(&self) -> Score {
        match self {
            EsgTier::Low => dec!(1),
            EsgTier::Medium => dec!(3),
            EsgTier::High => dec!(6),
        }
    }
}

impl Preferences {
    pub fn targets(&self) -> Targets {
        let (min_return, max_volatility) = self.risk_tier.bounds();
        Targets {
            return_column: self.horizon.return_column(),
            min_return,
            max_volatility,
            target_beta: self.beta_tier.target_beta(),
            min_esg: self.esg_tier.min_esg(),
        }
    }

    pub fn raw(&self) -> RawChoices {
        RawChoices {
            horizon: self.horizon.choice() as i64,
            risk: self.risk_tier.choice() as i64,
            beta: self.beta_tier.choice() as i64,
            esg: self.esg_tier.choice() as i64,
        }
    }
}

impl Targets {
    pub fn return_column(&self) -> ReturnColumn {
        self.return_column
    }

    pub fn min_return(&self) -> Percent {
        self.min_return
    }

    pub fn max_volatility(&self) -> Percent {
        self.max_volatility
    }

    pub fn target_beta(&self) -> Decimal {
        self.target_beta
    }

    pub fn min_esg(&self) -> Score {
        self.min_esg
    }
}

impl PreferenceSource for RawChoices {
    fn acquire(&mut self) -> PortfolioResult<RawChoices> {
        Ok(*self)
    }
}

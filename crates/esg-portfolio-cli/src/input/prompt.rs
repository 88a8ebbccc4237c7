use colored::Colorize;
use std::io::{BufRead, Write};

use esg_portfolio_core::allocation::preferences::{
    tier_table, BetaTier, EsgTier, Horizon, PreferenceSource, RawChoices, RiskTier,
};
use esg_portfolio_core::{PortfolioError, PortfolioResult};

use crate::commands::preferences::ChoiceArgs;

const MAX_ATTEMPTS: usize = 3;

/// Asks for every answer not already given on the command line.
///
/// Questions go to `writer` (stderr in the binary) so stdout stays clean for
/// the report.
pub struct PromptSource<R, W> {
    reader: R,
    writer: W,
    given: ChoiceArgs,
}

impl<R: BufRead, W: Write> PromptSource<R, W> {
    pub fn new(reader: R, writer: W, given: ChoiceArgs) -> Self {
        Self {
            reader,
            writer,
            given,
        }
    }

    fn answer(
        &mut self,
        given: Option<i64>,
        question: &str,
        heading: &str,
        valid: fn(i64) -> bool,
    ) -> PortfolioResult<i64> {
        if let Some(v) = given {
            return Ok(v);
        }

        self.say(&format!("\n{}", heading.bold()))?;
        for row in tier_table().iter().filter(|r| r.question == question) {
            self.say(&format!("  {}) {}  [{}]", row.choice, row.label, row.effect))?;
        }

        for _ in 0..MAX_ATTEMPTS {
            write!(self.writer, "Choose 1, 2 or 3: ").map_err(io_err)?;
            self.writer.flush().map_err(io_err)?;

            let mut line = String::new();
            let read = self.reader.read_line(&mut line).map_err(io_err)?;
            if read == 0 {
                return Err(PortfolioError::PreferenceAcquisition(format!(
                    "input closed before answering {question}"
                )));
            }
            match line.trim().parse::<i64>() {
                Ok(v) if valid(v) => return Ok(v),
                _ => self.say(&format!("{} '{}'", "invalid answer".yellow(), line.trim()))?,
            }
        }

        Err(PortfolioError::PreferenceAcquisition(format!(
            "no valid answer for {question} after {MAX_ATTEMPTS} attempts"
        )))
    }

    fn say(&mut self, text: &str) -> PortfolioResult<()> {
        writeln!(self.writer, "{}", text).map_err(io_err)
    }
}

impl<R: BufRead, W: Write> PreferenceSource for PromptSource<R, W> {
    fn acquire(&mut self) -> PortfolioResult<RawChoices> {
        let given = self.given.clone();
        Ok(RawChoices {
            horizon: self.answer(
                given.horizon,
                Horizon::QUESTION,
                "What is your investment horizon?",
                |v| Horizon::from_choice(v).is_ok(),
            )?,
            risk: self.answer(
                given.risk,
                RiskTier::QUESTION,
                "How much risk are you willing to take?",
                |v| RiskTier::from_choice(v).is_ok(),
            )?,
            beta: self.answer(
                given.beta,
                BetaTier::QUESTION,
                "How should the portfolio move relative to the market?",
                |v| BetaTier::from_choice(v).is_ok(),
            )?,
            esg: self.answer(
                given.esg,
                EsgTier::QUESTION,
                "How important is sustainability (ESG)?",
                |v| EsgTier::from_choice(v).is_ok(),
            )?,
        })
    }
}

fn io_err(e: std::io::Error) -> PortfolioError {
    PortfolioError::PreferenceAcquisition(e.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::io::Cursor;

    fn source(input: &str, given: ChoiceArgs) -> PromptSource<Cursor<Vec<u8>>, Vec<u8>> {
        PromptSource::new(Cursor::new(input.as_bytes().to_vec()), Vec::new(), given)
    }

    #[test]
    fn test_prompts_all_four() {
        let mut src = source("3\n1\n1\n3\n", ChoiceArgs::default());
        let raw = src.acquire().unwrap();
        assert_eq!(
            raw,
            RawChoices {
                horizon: 3,
                risk: 1,
                beta: 1,
                esg: 3
            }
        );
        let transcript = String::from_utf8(src.writer).unwrap();
        assert!(transcript.contains("return column = 10yret"));
    }

    #[test]
    fn test_given_answers_are_not_asked() {
        let given = ChoiceArgs {
            horizon: Some(2),
            risk: Some(2),
            beta: None,
            esg: Some(1),
        };
        let mut src = source("3\n", given);
        let raw = src.acquire().unwrap();
        assert_eq!((raw.horizon, raw.risk, raw.beta, raw.esg), (2, 2, 3, 1));
        let transcript = String::from_utf8(src.writer).unwrap();
        assert!(!transcript.contains("investment horizon"));
    }

    #[test]
    fn test_retries_after_invalid_answer() {
        let mut src = source("x\n4\n2\n1\n1\n1\n", ChoiceArgs::default());
        let raw = src.acquire().unwrap();
        assert_eq!(raw.horizon, 2);
    }

    #[test]
    fn test_gives_up_after_three_invalid_answers() {
        let mut src = source("0\n9\nabc\n", ChoiceArgs::default());
        let err = src.acquire().unwrap_err();
        assert!(matches!(err, PortfolioError::PreferenceAcquisition(_)));
    }

    #[test]
    fn test_closed_input_is_an_error() {
        let mut src = source("1\n", ChoiceArgs::default());
        assert!(src.acquire().is_err());
    }
}

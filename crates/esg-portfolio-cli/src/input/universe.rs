use rust_decimal::Decimal;
use std::collections::HashSet;
use std::io::Read;

use esg_portfolio_core::allocation::universe::Stock;

use super::file;

/// Load a stock universe from CSV (`.csv`) or JSON (anything else).
///
/// CSV files need the headers `Name, 1yret, 5yret, 10yret, Volatility, Beta,
/// ESG`; extra columns are ignored. JSON is an array of stock objects using
/// either those headers or the snake_case field names.
pub fn read_universe(path: &str) -> Result<Vec<Stock>, Box<dyn std::error::Error>> {
    let stocks = if file::has_extension(path, &["csv"]) {
        let canonical = file::resolve_path(path)?;
        let f = std::fs::File::open(&canonical)
            .map_err(|e| format!("Failed to read '{}': {}", canonical.display(), e))?;
        parse_csv(f).map_err(|e| format!("Failed to parse '{}': {}", canonical.display(), e))?
    } else {
        file::read_json(path)?
    };
    validate(&stocks)?;
    log::info!("loaded {} stocks from {}", stocks.len(), path);
    Ok(stocks)
}

pub fn parse_csv<R: Read>(reader: R) -> Result<Vec<Stock>, csv::Error> {
    let mut rdr = csv::ReaderBuilder::new().trim(csv::Trim::All).from_reader(reader);
    rdr.deserialize().collect()
}

/// Source-data checks the optimiser relies on but does not perform.
pub fn validate(stocks: &[Stock]) -> Result<(), String> {
    let mut seen = HashSet::new();
    for (row, s) in stocks.iter().enumerate() {
        if s.name.trim().is_empty() {
            return Err(format!("Row {}: empty Name", row + 1));
        }
        if !seen.insert(s.name.as_str()) {
            return Err(format!("Row {}: duplicate Name '{}'", row + 1, s.name));
        }
        if s.volatility < Decimal::ZERO {
            return Err(format!(
                "Row {}: Volatility of '{}' is negative ({})",
                row + 1,
                s.name,
                s.volatility
            ));
        }
        if s.esg < Decimal::ZERO {
            return Err(format!(
                "Row {}: ESG of '{}' is negative ({})",
                row + 1,
                s.name,
                s.esg
            ));
        }
    }
    Ok(())
}

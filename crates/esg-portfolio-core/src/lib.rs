pub mod allocation;
pub mod config;
pub mod error;
pub mod types;

pub use config::FormulationConfig;
pub use error::PortfolioError;
pub use types::*;

/// Standard result type for all esg-portfolio operations
pub type PortfolioResult<T> = Result<T, PortfolioError>;

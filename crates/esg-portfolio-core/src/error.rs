use thiserror::Error;

#[derive(Debug, Error)]
pub enum PortfolioError {
    #[error("Invalid preference choice for {question}: {value} (expected 1, 2 or 3)")]
    InvalidPreferenceChoice { question: String, value: i64 },

    #[error("Empty universe: at least one candidate stock is required")]
    EmptyUniverse,

    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Preference acquisition failed: {0}")]
    PreferenceAcquisition(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for PortfolioError {
    fn from(e: serde_json::Error) -> Self {
        PortfolioError::SerializationError(e.to_string())
    }
}

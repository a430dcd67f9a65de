use thiserror::Error;

#[derive(Debug, Error)]
pub enum LandedCostError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid configuration: {field} — {reason}")]
    InvalidConfiguration { field: String, reason: String },

    #[error("Arithmetic overflow in {context}")]
    ArithmeticOverflow { context: String },

    #[error("Insufficient data: {0}")]
    InsufficientData(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl From<serde_json::Error> for LandedCostError {
    fn from(e: serde_json::Error) -> Self {
        LandedCostError::SerializationError(e.to_string())
    }
}

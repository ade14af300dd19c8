use thiserror::Error;

#[derive(Debug, Error)]
pub enum FinanceError {
    #[error("Invalid input: {field} — {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Invalid schedule after {periods} periods: {reason}")]
    InvalidSchedule { periods: u32, reason: String },

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Date error: {0}")]
    DateError(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl FinanceError {
    pub(crate) fn invalid_input(field: &str, reason: impl Into<String>) -> Self {
        FinanceError::InvalidInput {
            field: field.to_string(),
            reason: reason.into(),
        }
    }

    /// True for every error caused by the caller's input rather than by the
    /// schedule it describes.
    pub fn is_input_error(&self) -> bool {
        matches!(
            self,
            FinanceError::InvalidInput { .. }
                | FinanceError::DateError(_)
                | FinanceError::SerializationError(_)
        )
    }
}

impl From<serde_json::Error> for FinanceError {
    fn from(e: serde_json::Error) -> Self {
        FinanceError::SerializationError(e.to_string())
    }
}

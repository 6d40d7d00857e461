use thiserror::Error;

/// Message shown to the user for any missing or invalid loan input.
pub const INVALID_INPUT_MESSAGE: &str = "Please enter valid values.";

/// Message shown to the user when the export target cannot be written.
pub const EXPORT_FAILED_MESSAGE: &str = "Failed to open file for writing.";

#[derive(Debug, Error)]
pub enum AmortizationError {
    #[error("Invalid input: {field}: {reason}")]
    InvalidInput { field: String, reason: String },

    #[error("Export to '{path}' failed: {source}")]
    Export {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("Import error: {0}")]
    Import(String),

    #[error("CSV error: {0}")]
    Csv(String),

    #[error("Division by zero in {context}")]
    DivisionByZero { context: String },

    #[error("Serialization error: {0}")]
    SerializationError(String),
}

impl AmortizationError {
    pub(crate) fn invalid(field: &str, reason: impl Into<String>) -> Self {
        AmortizationError::InvalidInput {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Static human-readable text for the presentation layer.
    pub fn user_message(&self) -> &'static str {
        match self {
            AmortizationError::Export { .. } => EXPORT_FAILED_MESSAGE,
            _ => INVALID_INPUT_MESSAGE,
        }
    }

    /// True for the refusal returned when loan inputs cannot produce a schedule.
    pub fn is_invalid_input(&self) -> bool {
        matches!(self, AmortizationError::InvalidInput { .. })
    }
}

impl From<serde_json::Error> for AmortizationError {
    fn from(e: serde_json::Error) -> Self {
        AmortizationError::SerializationError(e.to_string())
    }
}

#[cfg(feature = "export")]
impl From<csv::Error> for AmortizationError {
    fn from(e: csv::Error) -> Self {
        AmortizationError::Csv(e.to_string())
    }
}

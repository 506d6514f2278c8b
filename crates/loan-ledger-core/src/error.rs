use thiserror::Error;

/// Failure to turn an English amount phrase into a number.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseError {
    #[error("amount text is empty")]
    Empty,

    #[error("no number words found in '{0}'")]
    NoNumberWords(String),

    #[error("unrecognised word '{0}'")]
    UnknownWord(String),

    #[error("cents value {0} must be below 100")]
    CentsOutOfRange(String),

    #[error("amount overflows decimal range")]
    Overflow,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum CalculationError {
    #[error("Unparseable amount in {field}: {source}")]
    Parse {
        field: String,
        #[source]
        source: ParseError,
    },

    #[error("Invalid input: {field} — {reason}")]
    Input { field: String, reason: String },

    #[error("Out of range: {field} — {reason}")]
    Range { field: String, reason: String },
}

impl CalculationError {
    /// Name of the raw input field the failure is attributed to.
    pub fn field(&self) -> &str {
        match self {
            CalculationError::Parse { field, .. }
            | CalculationError::Input { field, .. }
            | CalculationError::Range { field, .. } => field,
        }
    }
}

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ScopeError {
    #[error("range '{input}' must have the form START:END")]
    MissingSeparator { input: String },

    #[error("invalid line number '{value}' in range '{input}'")]
    InvalidLineNumber { input: String, value: String },

    #[error("invalid fraction '{value}' in range '{input}' (use 0.25 or 25%)")]
    InvalidFraction { input: String, value: String },
}

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum RuleError {
    #[error("unknown rule '{name}' (expected one of: {expected})")]
    UnknownRule { name: String, expected: String },
}

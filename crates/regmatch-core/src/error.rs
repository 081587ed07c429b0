use thiserror::Error;

#[derive(Debug, Error, PartialEq)]
pub enum RuleError {
    #[error("rule has an empty id")]
    MissingId,

    #[error("rule {rule}: threshold `{key}` must be a number, got {value}")]
    NonNumericThreshold {
        rule: String,
        key: String,
        value: String,
    },

    #[error("rule {rule}: threshold `{key}` names no attribute")]
    EmptyThresholdAttribute { rule: String, key: String },
}

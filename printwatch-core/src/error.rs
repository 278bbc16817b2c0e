use thiserror::Error;

/// Errors surfaced by the state engine.
///
/// Every variant is local and recoverable: a rejected fragment leaves the
/// accumulated state untouched and the next fragment proceeds normally.
#[derive(Debug, Error)]
pub enum MergeError {
    /// The fragment is not a JSON object. Nothing was applied.
    #[error("telemetry fragment is not a JSON object")]
    NotAnObject,

    /// The fragment carries an `ams` section that is not a JSON object.
    /// Nothing was applied, including the flat fields of the same fragment.
    #[error("ams section is not a JSON object")]
    InvalidAms,

    /// The transport payload could not be parsed as JSON at all.
    #[error("telemetry payload is not valid JSON: {0}")]
    InvalidPayload(#[from] serde_json::Error),
}

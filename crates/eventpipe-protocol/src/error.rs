use crate::version::Version;
use thiserror::Error;

/// The three decode errors that are allowed to escape a batch flush (see
/// SPEC_FULL.md §7). Anything else encountered while decoding is either
/// folded into `Skip` or logged and treated as a null field.
#[derive(Debug, Error, PartialEq)]
pub enum DecodeError {
    #[error("invalid payload: {0}")]
    InvalidPayload(String),

    #[error("invalid version: {version}")]
    InvalidVersion { version: i64 },

    #[error("unexpected operation {operation:?} for protocol version {version}")]
    UnexpectedOperation { operation: String, version: Version },
}

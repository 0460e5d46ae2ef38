//! Activity snapshot codec.
//!
//! # Responsibility
//! - Encode the full ordered activity list into one compact JSON blob.
//! - Decode a stored blob back into the ordered list.
//!
//! # Invariants
//! - Order is preserved in both directions.
//! - Decoding is all-or-nothing; a partial list is never returned.

use crate::model::activity::Activity;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

#[derive(Debug)]
pub enum CodecError {
    Encode(serde_json::Error),
    Decode(serde_json::Error),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Encode(err) => write!(f, "failed to encode activities: {err}"),
            Self::Decode(err) => write!(f, "failed to decode activities: {err}"),
        }
    }
}

impl Error for CodecError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Encode(err) | Self::Decode(err) => Some(err),
        }
    }
}

pub fn encode_activities(activities: &[Activity]) -> CodecResult<Vec<u8>> {
    serde_json::to_vec(activities).map_err(CodecError::Encode)
}

pub fn decode_activities(bytes: &[u8]) -> CodecResult<Vec<Activity>> {
    serde_json::from_slice(bytes).map_err(CodecError::Decode)
}

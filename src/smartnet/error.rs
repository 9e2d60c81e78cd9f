//! Decode path errors

use thiserror::Error;

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    /// OSW payload too short to hold address, group and command
    #[error("malformed OSW message: {len} payload bytes, need {expected}")]
    Malformed { len: usize, expected: usize },
}

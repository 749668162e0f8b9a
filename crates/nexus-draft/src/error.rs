// Error types for draft validation.

use thiserror::Error;

use crate::draft::slot::{Phase, Side};

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DraftError {
    #[error("draft is complete; no further actions are accepted")]
    DraftComplete,

    #[error("champion `{champion}` is already picked or banned")]
    ChampionUnavailable { champion: String },

    #[error("slot {slot} expects a {expected} action, got {got}")]
    PhaseMismatch {
        slot: usize,
        expected: Phase,
        got: Phase,
    },

    #[error("slot {slot} belongs to {expected}, got {got}")]
    TurnMismatch {
        slot: usize,
        expected: Side,
        got: Side,
    },

    #[error("champion name must not be blank")]
    BlankChampion,

    #[error("draft state does not match the schedule: {message}")]
    InconsistentState { message: String },

    #[error("invalid draft format: {message}")]
    InvalidFormat { message: String },
}

impl DraftError {
    /// Whether this error rejects a draft action or a queried draft state,
    /// as opposed to a malformed schedule definition.
    pub fn is_invalid_action(&self) -> bool {
        !matches!(self, DraftError::InvalidFormat { .. })
    }

    pub(crate) fn inconsistent(message: impl Into<String>) -> Self {
        DraftError::InconsistentState {
            message: message.into(),
        }
    }
}

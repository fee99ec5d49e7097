//! Engine errors and pairing warnings.

use crate::models::game::MatchId;
use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors returned by bracket operations. A failed operation leaves the bracket unchanged.
#[derive(Clone, Debug, Eq, PartialEq, Error)]
pub enum BracketError {
    /// Malformed participant list: duplicates, too few entries, unknown method.
    #[error("Invalid seeding input: {0}")]
    InvalidSeedingInput(String),

    /// Format or configuration combination that is not implemented.
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    #[error("Match {0} not found")]
    MatchNotFound(MatchId),

    /// At least one side is still waiting on another match.
    #[error("Match {0} needs both participants before a result can be reported")]
    BothSlotsRequired(MatchId),

    /// Tie, or no side reached the best-of majority.
    #[error("Invalid score {score_a}-{score_b} for a best-of-{best_of}")]
    InvalidScore {
        score_a: u32,
        score_b: u32,
        best_of: u32,
    },

    #[error("Bracket has {completed} reported results, reset allows at most {threshold}")]
    BracketInProgress { completed: usize, threshold: usize },

    /// The match is already decided or was cancelled.
    #[error("Match {0} is already closed")]
    MatchClosed(MatchId),

    #[error("Round {round} still has undecided matches")]
    RoundIncomplete { round: u32 },

    #[error("All {rounds} rounds have already been generated")]
    RoundsExhausted { rounds: u32 },
}

impl BracketError {
    /// Stable variant name, used by the controller in error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            BracketError::InvalidSeedingInput(_) => "invalid_seeding_input",
            BracketError::UnsupportedFormat(_) => "unsupported_format",
            BracketError::MatchNotFound(_) => "match_not_found",
            BracketError::BothSlotsRequired(_) => "both_slots_required",
            BracketError::InvalidScore { .. } => "invalid_score",
            BracketError::BracketInProgress { .. } => "bracket_in_progress",
            BracketError::MatchClosed(_) => "match_closed",
            BracketError::RoundIncomplete { .. } => "round_incomplete",
            BracketError::RoundsExhausted { .. } => "rounds_exhausted",
        }
    }
}

pub type BracketResult<T> = Result<T, BracketError>;

/// Swiss anomalies. The operation that raised one still succeeds.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum PairingWarning {
    /// Every remaining participant already had a bye this event.
    RepeatByeRequired {
        round: u32,
        participant: ParticipantId,
    },
    /// No repeat-free pairing existed; this pair meets again.
    RepeatPairingRequired {
        round: u32,
        first: ParticipantId,
        second: ParticipantId,
    },
}

impl std::fmt::Display for PairingWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PairingWarning::RepeatByeRequired { round, participant } => {
                write!(f, "Round {}: {} receives a second bye", round, participant)
            }
            PairingWarning::RepeatPairingRequired {
                round,
                first,
                second,
            } => write!(f, "Round {}: {} and {} meet again", round, first, second),
        }
    }
}

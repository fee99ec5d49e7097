//! Data structures for brackets: participants, matches, the bracket aggregate and errors.

mod bracket;
mod error;
mod game;
mod participant;

pub use bracket::{
    pair_key, Bracket, BracketConfig, BracketFormat, Progress, Round, SwissRecord, SwissState,
};
pub use error::{BracketError, BracketResult, PairingWarning};
pub use game::{Advance, BracketSection, Match, MatchId, MatchStatus, Score, Side, Slot};
pub use participant::{Participant, ParticipantId};

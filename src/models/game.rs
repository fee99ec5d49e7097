//! Match, Slot, Side, Score and the match status machine.

use crate::models::participant::ParticipantId;
use serde::{Deserialize, Serialize};

/// Identifier of a match within one bracket. Sequential, starting at 1.
pub type MatchId = u32;

/// One of the two sides of a match.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Side {
    #[default]
    A,
    B,
}

impl Side {
    pub fn other(self) -> Self {
        match self {
            Side::A => Side::B,
            Side::B => Side::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            Side::A => 0,
            Side::B => 1,
        }
    }
}

/// Which part of the bracket a match belongs to.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketSection {
    /// Single elimination, round robin and Swiss matches.
    #[default]
    Main,
    Upper,
    Lower,
    GrandFinal,
    GrandFinalReset,
    /// Bronze match fed by the two semifinal losers (single elimination only).
    ThirdPlace,
}

/// Occupant of one side of a match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "ref", rename_all = "snake_case")]
pub enum Slot {
    Participant(ParticipantId),
    WinnerOf(MatchId),
    LoserOf(MatchId),
    /// No opponent: the other side advances automatically.
    Bye,
}

impl Slot {
    pub fn participant(&self) -> Option<ParticipantId> {
        match self {
            Slot::Participant(id) => Some(*id),
            _ => None,
        }
    }

    pub fn is_placeholder(&self) -> bool {
        matches!(self, Slot::WinnerOf(_) | Slot::LoserOf(_))
    }
}

/// Lifecycle of a match: `Pending -> InProgress -> Completed | Forfeited | Cancelled`.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MatchStatus {
    #[default]
    Pending,
    InProgress,
    Completed,
    Forfeited,
    /// Never played (a grand-final reset that turned out not to be required).
    Cancelled,
}

impl MatchStatus {
    /// True once no further result can be recorded.
    pub fn is_closed(self) -> bool {
        matches!(
            self,
            MatchStatus::Completed | MatchStatus::Forfeited | MatchStatus::Cancelled
        )
    }
}

/// Games won by each side in a best-of series.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Score {
    pub a: u32,
    pub b: u32,
}

impl Score {
    pub fn new(a: u32, b: u32) -> Self {
        Self { a, b }
    }

    pub fn of(&self, side: Side) -> u32 {
        match side {
            Side::A => self.a,
            Side::B => self.b,
        }
    }

    /// Games won by `side` minus games won by the other side.
    pub fn differential(&self, side: Side) -> i64 {
        i64::from(self.of(side)) - i64::from(self.of(side.other()))
    }
}

/// Where a match outcome is sent: a side of a downstream match.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Advance {
    pub match_id: MatchId,
    pub side: Side,
}

impl Advance {
    pub fn new(match_id: MatchId, side: Side) -> Self {
        Self { match_id, side }
    }
}

/// A single match in a bracket.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: MatchId,
    /// Round number within its section (1-based).
    pub round: u32,
    /// Position within the round (1-based).
    pub position: u32,
    pub section: BracketSection,
    /// Side A and side B.
    pub slots: [Slot; 2],
    pub best_of: u32,
    pub status: MatchStatus,
    /// None until decided; stays None for a match between two byes.
    pub winner: Option<ParticipantId>,
    /// None for bye resolutions.
    pub score: Option<Score>,
    /// Downstream match receiving the winner (elimination formats).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub winner_to: Option<Advance>,
    /// Downstream match receiving the loser (double elimination, third place).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub loser_to: Option<Advance>,
}

impl Match {
    pub fn new(
        id: MatchId,
        round: u32,
        position: u32,
        section: BracketSection,
        slots: [Slot; 2],
        best_of: u32,
    ) -> Self {
        Self {
            id,
            round,
            position,
            section,
            slots,
            best_of,
            status: MatchStatus::Pending,
            winner: None,
            score: None,
            winner_to: None,
            loser_to: None,
        }
    }

    pub fn slot(&self, side: Side) -> Slot {
        self.slots[side.index()]
    }

    pub fn participant(&self, side: Side) -> Option<ParticipantId> {
        self.slot(side).participant()
    }

    /// Both sides hold concrete participants.
    pub fn is_ready(&self) -> bool {
        self.slots.iter().all(|s| s.participant().is_some())
    }

    /// A match with at least one bye slot is never played.
    pub fn is_bye(&self) -> bool {
        self.slots.iter().any(|s| *s == Slot::Bye)
    }

    pub fn involves(&self, id: ParticipantId) -> bool {
        self.side_of(id).is_some()
    }

    pub fn side_of(&self, id: ParticipantId) -> Option<Side> {
        if self.participant(Side::A) == Some(id) {
            Some(Side::A)
        } else if self.participant(Side::B) == Some(id) {
            Some(Side::B)
        } else {
            None
        }
    }

    pub fn winning_side(&self) -> Option<Side> {
        let winner = self.winner?;
        self.side_of(winner)
    }

    /// The participant who lost a decided match. None for byes and undecided matches.
    pub fn loser(&self) -> Option<ParticipantId> {
        let side = self.winning_side()?;
        self.participant(side.other())
    }

    /// A real (non-bye) result was recorded on this match.
    pub fn has_result(&self) -> bool {
        matches!(self.status, MatchStatus::Completed | MatchStatus::Forfeited) && !self.is_bye()
    }

    /// Games needed to win a best-of series.
    pub fn wins_needed(&self) -> u32 {
        self.best_of / 2 + 1
    }
}

//! Bracket aggregate: format, configuration, rounds, matches and Swiss state.

use crate::models::error::{BracketError, BracketResult, PairingWarning};
use crate::models::game::{BracketSection, Match, MatchId, MatchStatus};
use crate::models::participant::{Participant, ParticipantId};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::str::FromStr;

/// Structural format of a bracket. Fixed for the lifetime of the bracket.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BracketFormat {
    SingleElimination,
    DoubleElimination,
    RoundRobin,
    Swiss,
}

impl FromStr for BracketFormat {
    type Err = BracketError;

    /// Unknown names are an error; there is no fallback format.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "single_elimination" => Ok(BracketFormat::SingleElimination),
            "double_elimination" => Ok(BracketFormat::DoubleElimination),
            "round_robin" => Ok(BracketFormat::RoundRobin),
            "swiss" => Ok(BracketFormat::Swiss),
            other => Err(BracketError::UnsupportedFormat(format!(
                "unknown bracket format '{}'",
                other
            ))),
        }
    }
}

impl std::fmt::Display for BracketFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            BracketFormat::SingleElimination => "single_elimination",
            BracketFormat::DoubleElimination => "double_elimination",
            BracketFormat::RoundRobin => "round_robin",
            BracketFormat::Swiss => "swiss",
        };
        f.write_str(name)
    }
}

/// Per-bracket settings. Every field has a default so partial JSON is accepted.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct BracketConfig {
    /// Games per match; must be odd.
    #[serde(default = "default_best_of")]
    pub best_of: u32,
    /// Single elimination: play a match between the semifinal losers.
    #[serde(default)]
    pub third_place_match: bool,
    /// Swiss: number of rounds instead of `ceil(log2(n))`.
    #[serde(default)]
    pub swiss_rounds: Option<u32>,
    /// Reset is refused once more than this many real results exist.
    #[serde(default)]
    pub reset_threshold: usize,
    /// Round robin points model.
    #[serde(default = "default_points_per_win")]
    pub points_per_win: u32,
    #[serde(default)]
    pub points_per_loss: u32,
}

fn default_best_of() -> u32 {
    3
}

fn default_points_per_win() -> u32 {
    1
}

impl Default for BracketConfig {
    fn default() -> Self {
        Self {
            best_of: default_best_of(),
            third_place_match: false,
            swiss_rounds: None,
            reset_threshold: 0,
            points_per_win: default_points_per_win(),
            points_per_loss: 0,
        }
    }
}

impl BracketConfig {
    pub fn best_of(best_of: u32) -> Self {
        Self {
            best_of,
            ..Self::default()
        }
    }

    /// Reject combinations the builders cannot honor.
    pub fn validate(&self, format: BracketFormat) -> BracketResult<()> {
        if self.best_of == 0 || self.best_of % 2 == 0 {
            return Err(BracketError::UnsupportedFormat(format!(
                "best-of-{} has no majority; use an odd number of games",
                self.best_of
            )));
        }
        if self.third_place_match && format != BracketFormat::SingleElimination {
            return Err(BracketError::UnsupportedFormat(format!(
                "third place match is only available for single elimination, not {}",
                format
            )));
        }
        if self.swiss_rounds.is_some() && format != BracketFormat::Swiss {
            return Err(BracketError::UnsupportedFormat(format!(
                "round override is only available for swiss, not {}",
                format
            )));
        }
        if self.swiss_rounds == Some(0) {
            return Err(BracketError::UnsupportedFormat(
                "swiss needs at least one round".to_string(),
            ));
        }
        Ok(())
    }
}

/// An ordered group of matches, for display and scheduling.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Round {
    pub number: u32,
    pub section: BracketSection,
    pub name: String,
    pub match_ids: Vec<MatchId>,
    /// Round robin with an odd count: the participant sitting this round out.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub bye: Option<ParticipantId>,
}

impl Round {
    pub fn new(number: u32, section: BracketSection, name: impl Into<String>) -> Self {
        Self {
            number,
            section,
            name: name.into(),
            match_ids: Vec::new(),
            bye: None,
        }
    }
}

/// Running Swiss record for one participant.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SwissRecord {
    pub participant: ParticipantId,
    /// Byes included.
    pub wins: u32,
    pub losses: u32,
    pub byes: u32,
}

/// Swiss-only state: tallies and who has already met whom.
#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize, Deserialize)]
pub struct SwissState {
    pub total_rounds: u32,
    /// In seed order.
    pub records: Vec<SwissRecord>,
    /// Unordered pairs that have been paired, stored as (smaller, larger).
    pub history: BTreeSet<(ParticipantId, ParticipantId)>,
}

impl SwissState {
    pub fn new(participants: &[Participant], total_rounds: u32) -> Self {
        Self {
            total_rounds,
            records: participants
                .iter()
                .map(|p| SwissRecord {
                    participant: p.id,
                    ..SwissRecord::default()
                })
                .collect(),
            history: BTreeSet::new(),
        }
    }

    pub fn record(&self, id: ParticipantId) -> Option<&SwissRecord> {
        self.records.iter().find(|r| r.participant == id)
    }

    pub fn record_mut(&mut self, id: ParticipantId) -> Option<&mut SwissRecord> {
        self.records.iter_mut().find(|r| r.participant == id)
    }

    pub fn have_met(&self, a: ParticipantId, b: ParticipantId) -> bool {
        self.history.contains(&pair_key(a, b))
    }

    pub fn remember_pair(&mut self, a: ParticipantId, b: ParticipantId) {
        self.history.insert(pair_key(a, b));
    }
}

/// Order-independent key for a pair of participants.
pub fn pair_key(a: ParticipantId, b: ParticipantId) -> (ParticipantId, ParticipantId) {
    if a <= b {
        (a, b)
    } else {
        (b, a)
    }
}

/// Completed versus total playable matches.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    pub completed: usize,
    pub total: usize,
    pub percent: u32,
}

/// The aggregate. `matches[i].id == i + 1` always holds.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Bracket {
    pub format: BracketFormat,
    pub config: BracketConfig,
    /// In seed order: seed 1 first.
    pub participants: Vec<Participant>,
    pub rounds: Vec<Round>,
    pub matches: Vec<Match>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub swiss: Option<SwissState>,
    #[serde(default)]
    pub warnings: Vec<PairingWarning>,
}

impl Bracket {
    /// Empty bracket; builders fill in rounds and matches.
    pub fn new(format: BracketFormat, participants: Vec<Participant>, config: BracketConfig) -> Self {
        Self {
            format,
            config,
            participants,
            rounds: Vec::new(),
            matches: Vec::new(),
            swiss: None,
            warnings: Vec::new(),
        }
    }

    pub fn get_match(&self, id: MatchId) -> BracketResult<&Match> {
        let idx = (id as usize).checked_sub(1).ok_or(BracketError::MatchNotFound(id))?;
        self.matches.get(idx).ok_or(BracketError::MatchNotFound(id))
    }

    pub fn get_match_mut(&mut self, id: MatchId) -> BracketResult<&mut Match> {
        let idx = (id as usize).checked_sub(1).ok_or(BracketError::MatchNotFound(id))?;
        self.matches.get_mut(idx).ok_or(BracketError::MatchNotFound(id))
    }

    /// Next free match id.
    pub fn next_match_id(&self) -> MatchId {
        self.matches.len() as MatchId + 1
    }

    /// 1-based seed of a participant.
    pub fn seed_of(&self, id: ParticipantId) -> Option<u32> {
        self.participants
            .iter()
            .position(|p| p.id == id)
            .map(|i| i as u32 + 1)
    }

    pub fn participant_ids(&self) -> Vec<ParticipantId> {
        self.participants.iter().map(|p| p.id).collect()
    }

    pub fn rounds_in(&self, section: BracketSection) -> impl Iterator<Item = &Round> {
        self.rounds.iter().filter(move |r| r.section == section)
    }

    pub fn matches_in(&self, section: BracketSection) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(move |m| m.section == section)
    }

    /// Matches that are actually played (no bye slot).
    pub fn playable_matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(|m| !m.is_bye())
    }

    pub fn bye_matches(&self) -> impl Iterator<Item = &Match> {
        self.matches.iter().filter(|m| m.is_bye())
    }

    /// Matches whose participants are known and that still need a result.
    pub fn ready_matches(&self) -> Vec<&Match> {
        self.matches
            .iter()
            .filter(|m| m.is_ready() && !m.status.is_closed())
            .collect()
    }

    /// Number of matches decided by a reported result or forfeit (byes excluded).
    pub fn reported_results(&self) -> usize {
        self.matches.iter().filter(|m| m.has_result()).count()
    }

    pub fn progress(&self) -> Progress {
        let total = self
            .playable_matches()
            .filter(|m| m.status != MatchStatus::Cancelled)
            .count();
        let completed = self.reported_results();
        let percent = if total == 0 {
            100
        } else {
            (completed * 100 / total) as u32
        };
        Progress {
            completed,
            total,
            percent,
        }
    }

    /// Every match is closed and, for Swiss, every round has been generated.
    pub fn is_complete(&self) -> bool {
        let all_closed = self.matches.iter().all(|m| m.status.is_closed());
        match &self.swiss {
            Some(swiss) => all_closed && self.rounds.len() as u32 >= swiss.total_rounds,
            None => all_closed,
        }
    }

    /// Highest round number generated so far in the main section.
    pub fn current_round(&self) -> u32 {
        self.rounds_in(BracketSection::Main)
            .map(|r| r.number)
            .max()
            .unwrap_or(0)
    }
}

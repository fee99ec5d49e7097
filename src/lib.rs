//! Bracket engine: seeding, bracket building, result progression and standings for
//! single elimination, double elimination, round robin and Swiss events.

pub mod logic;
pub mod models;

pub use logic::{
    bracket_size, build_bracket, compute_standings, forfeit, generate_next_round, report_result,
    reset_bracket, resolve_byes, seed_participants, seeding_order, start_match, validate_bracket,
    ByePlan, SeedingMethod, Standing,
};
pub use models::{
    pair_key, Advance, Bracket, BracketConfig, BracketError, BracketFormat, BracketResult,
    BracketSection, Match, MatchId, MatchStatus, PairingWarning, Participant, ParticipantId,
    Progress, Round, Score, Side, Slot, SwissRecord, SwissState,
};

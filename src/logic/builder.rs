//! Build a bracket for any format, plus helpers the format builders share.

use crate::logic::double_elimination::build_double_elimination;
use crate::logic::round_robin::build_round_robin;
use crate::logic::seeding::validate_participants;
use crate::logic::single_elimination::build_single_elimination;
use crate::logic::swiss::build_swiss;
use crate::models::{
    Advance, Bracket, BracketConfig, BracketFormat, BracketResult, BracketSection, Match, MatchId,
    Participant, Slot,
};

/// Build the initial bracket for `participants`, which must already be in seed order.
///
/// Bye matches are resolved before returning, so round-2 slots of bye recipients are
/// already filled in.
pub fn build_bracket(
    format: BracketFormat,
    participants: Vec<Participant>,
    config: BracketConfig,
) -> BracketResult<Bracket> {
    let n = participants.len();
    let bracket = match format {
        BracketFormat::SingleElimination => build_single_elimination(participants, config)?,
        BracketFormat::DoubleElimination => build_double_elimination(participants, config)?,
        BracketFormat::RoundRobin => build_round_robin(participants, config)?,
        BracketFormat::Swiss => build_swiss(participants, config)?,
    };
    log::info!(
        "built {} bracket: {} participants, {} rounds, {} matches ({} byes)",
        format,
        n,
        bracket.rounds.len(),
        bracket.matches.len(),
        bracket.bye_matches().count()
    );
    Ok(bracket)
}

/// Participants and config every format builder checks before laying anything out.
pub(crate) fn check_inputs(
    format: BracketFormat,
    participants: &[Participant],
    config: &BracketConfig,
) -> BracketResult<()> {
    validate_participants(participants)?;
    config.validate(format)
}

/// Append a match to `bracket` and return its id.
pub(crate) fn push_match(
    bracket: &mut Bracket,
    round: u32,
    position: u32,
    section: BracketSection,
    slots: [Slot; 2],
) -> MatchId {
    let id = bracket.next_match_id();
    let best_of = bracket.config.best_of;
    bracket
        .matches
        .push(Match::new(id, round, position, section, slots, best_of));
    id
}

/// Send the winner of `from` to `to`.
pub(crate) fn link_winner(bracket: &mut Bracket, from: MatchId, to: Advance) -> BracketResult<()> {
    bracket.get_match_mut(from)?.winner_to = Some(to);
    Ok(())
}

/// Send the loser of `from` to `to`.
pub(crate) fn link_loser(bracket: &mut Bracket, from: MatchId, to: Advance) -> BracketResult<()> {
    bracket.get_match_mut(from)?.loser_to = Some(to);
    Ok(())
}

/// Participant id for a 1-based seed.
pub(crate) fn seed_slot(bracket: &Bracket, seed: usize) -> Slot {
    bracket
        .participants
        .get(seed - 1)
        .map(|p| Slot::Participant(p.id))
        .unwrap_or(Slot::Bye)
}

/// Display name of an elimination round, counted from the final backwards.
pub(crate) fn elimination_round_name(round: u32, total_rounds: u32) -> String {
    match total_rounds + 1 - round {
        1 => "Final".to_string(),
        2 => "Semifinals".to_string(),
        3 => "Quarterfinals".to_string(),
        4 => "Round of 16".to_string(),
        5 => "Round of 32".to_string(),
        6 => "Round of 64".to_string(),
        _ => format!("Round {}", round),
    }
}

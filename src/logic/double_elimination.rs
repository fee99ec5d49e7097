//! Double elimination: upper bracket, lower bracket, grand final and its reset.

use crate::logic::builder::{check_inputs, link_loser, link_winner, push_match};
use crate::logic::byes::resolve_byes;
use crate::logic::progression::settle_byes;
use crate::logic::single_elimination::build_tree;
use crate::models::{
    Advance, Bracket, BracketConfig, BracketFormat, BracketResult, BracketSection, MatchId,
    Participant, Round, Side, Slot,
};

/// Build a double elimination bracket.
///
/// The lower bracket has `2 * (upper_rounds - 1)` rounds. Round 1 pairs the upper round-1
/// losers; after that even rounds take in the losers of the next upper round and odd
/// rounds halve the field. The grand final is followed by a reset match that is only
/// played when the lower bracket champion wins the first grand final.
pub fn build_double_elimination(
    participants: Vec<Participant>,
    config: BracketConfig,
) -> BracketResult<Bracket> {
    check_inputs(BracketFormat::DoubleElimination, &participants, &config)?;
    let plan = resolve_byes(participants.len())?;
    let mut bracket = Bracket::new(BracketFormat::DoubleElimination, participants, config);

    let upper = build_tree(&mut bracket, &plan, BracketSection::Upper)?;
    let upper_final = upper[upper.len() - 1][0];
    let lower = build_lower(&mut bracket, &upper)?;

    let lower_champion_slot = match lower.last() {
        Some(round) => Slot::WinnerOf(round[0]),
        // two participants: the upper final loser goes straight to the grand final
        None => Slot::LoserOf(upper_final),
    };
    let grand_final = push_match(
        &mut bracket,
        1,
        1,
        BracketSection::GrandFinal,
        [Slot::WinnerOf(upper_final), lower_champion_slot],
    );
    link_winner(&mut bracket, upper_final, Advance::new(grand_final, Side::A))?;
    match lower.last() {
        Some(round) => link_winner(&mut bracket, round[0], Advance::new(grand_final, Side::B))?,
        None => link_loser(&mut bracket, upper_final, Advance::new(grand_final, Side::B))?,
    }
    let mut round = Round::new(1, BracketSection::GrandFinal, "Grand Final");
    round.match_ids.push(grand_final);
    bracket.rounds.push(round);

    // upper champion stays on side A in the reset
    let reset = push_match(
        &mut bracket,
        1,
        1,
        BracketSection::GrandFinalReset,
        [Slot::LoserOf(grand_final), Slot::WinnerOf(grand_final)],
    );
    link_loser(&mut bracket, grand_final, Advance::new(reset, Side::A))?;
    link_winner(&mut bracket, grand_final, Advance::new(reset, Side::B))?;
    let mut round = Round::new(1, BracketSection::GrandFinalReset, "Grand Final Reset");
    round.match_ids.push(reset);
    bracket.rounds.push(round);

    settle_byes(&mut bracket)?;
    Ok(bracket)
}

/// Lay out the lower bracket fed by the upper `tree`; returns match ids per lower round.
fn build_lower(bracket: &mut Bracket, upper: &[Vec<MatchId>]) -> BracketResult<Vec<Vec<MatchId>>> {
    let upper_rounds = upper.len();
    if upper_rounds < 2 {
        return Ok(Vec::new());
    }
    let total = 2 * (upper_rounds as u32 - 1);
    let mut lower: Vec<Vec<MatchId>> = Vec::with_capacity(total as usize);

    // round 1: upper round-1 losers play each other
    let mut round = Round::new(1, BracketSection::Lower, lower_round_name(1, total));
    for (pos, feeders) in upper[0].chunks_exact(2).enumerate() {
        let id = push_match(
            bracket,
            1,
            pos as u32 + 1,
            BracketSection::Lower,
            [Slot::LoserOf(feeders[0]), Slot::LoserOf(feeders[1])],
        );
        link_loser(bracket, feeders[0], Advance::new(id, Side::A))?;
        link_loser(bracket, feeders[1], Advance::new(id, Side::B))?;
        round.match_ids.push(id);
    }
    lower.push(round.match_ids.clone());
    bracket.rounds.push(round);

    for wave in 1..upper_rounds {
        // drop-in round: lower survivors meet the losers of upper round `wave + 1`
        let number = lower.len() as u32 + 1;
        let survivors = lower[lower.len() - 1].clone();
        let dropping = &upper[wave];
        let mut round = Round::new(number, BracketSection::Lower, lower_round_name(number, total));
        for (i, &survivor) in survivors.iter().enumerate() {
            let dropped = dropping[drop_position(wave, i, dropping.len())];
            let id = push_match(
                bracket,
                number,
                i as u32 + 1,
                BracketSection::Lower,
                [Slot::WinnerOf(survivor), Slot::LoserOf(dropped)],
            );
            link_winner(bracket, survivor, Advance::new(id, Side::A))?;
            link_loser(bracket, dropped, Advance::new(id, Side::B))?;
            round.match_ids.push(id);
        }
        lower.push(round.match_ids.clone());
        bracket.rounds.push(round);

        if wave + 1 == upper_rounds {
            break;
        }

        // internal round: lower survivors play each other
        let number = lower.len() as u32 + 1;
        let survivors = lower[lower.len() - 1].clone();
        let mut round = Round::new(number, BracketSection::Lower, lower_round_name(number, total));
        for (pos, feeders) in survivors.chunks_exact(2).enumerate() {
            let id = push_match(
                bracket,
                number,
                pos as u32 + 1,
                BracketSection::Lower,
                [Slot::WinnerOf(feeders[0]), Slot::WinnerOf(feeders[1])],
            );
            link_winner(bracket, feeders[0], Advance::new(id, Side::A))?;
            link_winner(bracket, feeders[1], Advance::new(id, Side::B))?;
            round.match_ids.push(id);
        }
        lower.push(round.match_ids.clone());
        bracket.rounds.push(round);
    }

    Ok(lower)
}

/// Which upper match's loser meets lower survivor `i` in drop-in wave `wave`.
///
/// Alternating between reversing and swapping halves keeps players who met in the
/// upper bracket apart for as long as the structure allows.
fn drop_position(wave: usize, i: usize, count: usize) -> usize {
    if wave % 2 == 1 {
        count - 1 - i
    } else {
        (i + count / 2) % count
    }
}

fn lower_round_name(number: u32, total: u32) -> String {
    if number == total {
        "Lower Final".to_string()
    } else {
        format!("Lower Round {}", number)
    }
}

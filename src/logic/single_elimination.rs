//! Single elimination: one loss and you are out.

use crate::logic::builder::{
    check_inputs, elimination_round_name, link_loser, link_winner, push_match, seed_slot,
};
use crate::logic::byes::{resolve_byes, ByePlan};
use crate::logic::progression::settle_byes;
use crate::models::{
    Advance, Bracket, BracketConfig, BracketFormat, BracketResult, BracketSection, MatchId,
    Participant, Round, Side, Slot,
};

/// Build a single elimination bracket, with an optional third place match.
///
/// Round 1 follows standard bracket order; every later match waits on the winners of
/// two adjacent matches from the round before.
pub fn build_single_elimination(
    participants: Vec<Participant>,
    config: BracketConfig,
) -> BracketResult<Bracket> {
    check_inputs(BracketFormat::SingleElimination, &participants, &config)?;
    let plan = resolve_byes(participants.len())?;
    let mut bracket = Bracket::new(BracketFormat::SingleElimination, participants, config);

    let tree = build_tree(&mut bracket, &plan, BracketSection::Main)?;

    if bracket.config.third_place_match && tree.len() >= 2 {
        let semis = &tree[tree.len() - 2];
        let third = push_match(
            &mut bracket,
            1,
            1,
            BracketSection::ThirdPlace,
            [Slot::LoserOf(semis[0]), Slot::LoserOf(semis[1])],
        );
        link_loser(&mut bracket, semis[0], Advance::new(third, Side::A))?;
        link_loser(&mut bracket, semis[1], Advance::new(third, Side::B))?;

        let mut round = Round::new(1, BracketSection::ThirdPlace, "Third Place Match");
        round.match_ids.push(third);
        bracket.rounds.push(round);
    }

    settle_byes(&mut bracket)?;
    Ok(bracket)
}

/// Lay out a full knockout tree in `section` and return match ids per round.
///
/// Also used for the upper half of a double elimination bracket.
pub(crate) fn build_tree(
    bracket: &mut Bracket,
    plan: &ByePlan,
    section: BracketSection,
) -> BracketResult<Vec<Vec<MatchId>>> {
    let total_rounds = plan.rounds();
    let prefix = match section {
        BracketSection::Upper => "Upper ",
        _ => "",
    };
    let mut tree: Vec<Vec<MatchId>> = Vec::with_capacity(total_rounds as usize);

    let mut first = Round::new(
        1,
        section,
        format!("{}{}", prefix, elimination_round_name(1, total_rounds)),
    );
    for (pos, (high, low)) in plan.first_round.iter().enumerate() {
        let slots = [
            seed_slot(bracket, *high),
            low.map(|seed| seed_slot(bracket, seed)).unwrap_or(Slot::Bye),
        ];
        let id = push_match(bracket, 1, pos as u32 + 1, section, slots);
        first.match_ids.push(id);
    }
    tree.push(first.match_ids.clone());
    bracket.rounds.push(first);

    for number in 2..=total_rounds {
        let mut round = Round::new(
            number,
            section,
            format!("{}{}", prefix, elimination_round_name(number, total_rounds)),
        );
        let previous = tree[tree.len() - 1].clone();
        for (pos, feeders) in previous.chunks_exact(2).enumerate() {
            let id = push_match(
                bracket,
                number,
                pos as u32 + 1,
                section,
                [Slot::WinnerOf(feeders[0]), Slot::WinnerOf(feeders[1])],
            );
            link_winner(bracket, feeders[0], Advance::new(id, Side::A))?;
            link_winner(bracket, feeders[1], Advance::new(id, Side::B))?;
            round.match_ids.push(id);
        }
        tree.push(round.match_ids.clone());
        bracket.rounds.push(round);
    }

    Ok(tree)
}

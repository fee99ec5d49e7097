//! Round robin: everyone plays everyone exactly once.

use crate::logic::builder::{check_inputs, push_match};
use crate::models::{
    Bracket, BracketConfig, BracketFormat, BracketResult, BracketSection, Participant, Round, Slot,
};

/// Build a round robin with the circle method.
///
/// Seed 1 stays fixed while the others rotate one position per round. With an odd
/// count a phantom entry is added; whoever draws it sits the round out and no match is
/// created, so the total stays `n * (n - 1) / 2`.
pub fn build_round_robin(
    participants: Vec<Participant>,
    config: BracketConfig,
) -> BracketResult<Bracket> {
    check_inputs(BracketFormat::RoundRobin, &participants, &config)?;
    let mut bracket = Bracket::new(BracketFormat::RoundRobin, participants, config);
    let ids = bracket.participant_ids();

    let mut ring: Vec<Option<usize>> = (0..ids.len()).map(Some).collect();
    if ring.len() % 2 == 1 {
        ring.push(None);
    }
    let size = ring.len();

    for r in 0..size - 1 {
        let number = r as u32 + 1;
        let mut round = Round::new(number, BracketSection::Main, format!("Round {}", number));
        let mut position = 1;
        for i in 0..size / 2 {
            match (ring[i], ring[size - 1 - i]) {
                (Some(a), Some(b)) => {
                    // swap sides of the fixed seed every other round
                    let (a, b) = if i == 0 && r % 2 == 1 { (b, a) } else { (a, b) };
                    let id = push_match(
                        &mut bracket,
                        number,
                        position,
                        BracketSection::Main,
                        [Slot::Participant(ids[a]), Slot::Participant(ids[b])],
                    );
                    round.match_ids.push(id);
                    position += 1;
                }
                (Some(rest), None) | (None, Some(rest)) => round.bye = Some(ids[rest]),
                (None, None) => {}
            }
        }
        bracket.rounds.push(round);
        ring[1..].rotate_right(1);
    }

    Ok(bracket)
}

//! Swiss system: a fixed number of rounds, each paired within score groups.

use crate::logic::builder::{check_inputs, push_match};
use crate::logic::byes::bracket_size;
use crate::models::{
    Bracket, BracketConfig, BracketError, BracketFormat, BracketResult, BracketSection,
    MatchStatus, PairingWarning, Participant, ParticipantId, Round, Slot, SwissState,
};

/// Upper bound on search steps before falling back to pairing with repeats.
const PAIRING_SEARCH_BUDGET: usize = 50_000;

/// Default round count: `ceil(log2(n))`.
pub fn default_rounds(n: usize) -> u32 {
    bracket_size(n).trailing_zeros()
}

/// Build a Swiss bracket with round 1 paired top half against bottom half.
///
/// Seed `i` meets seed `i + ceil(n / 2)`. With an odd count the seed left over is
/// seed `ceil(n / 2)`, who takes the round-1 bye.
pub fn build_swiss(participants: Vec<Participant>, config: BracketConfig) -> BracketResult<Bracket> {
    check_inputs(BracketFormat::Swiss, &participants, &config)?;
    let n = participants.len();
    let total_rounds = config.swiss_rounds.unwrap_or_else(|| default_rounds(n));
    let mut bracket = Bracket::new(BracketFormat::Swiss, participants, config);
    bracket.swiss = Some(SwissState::new(&bracket.participants, total_rounds));

    let ids = bracket.participant_ids();
    let half = (n + 1) / 2;
    let pairs: Vec<(ParticipantId, ParticipantId)> =
        (0..n / 2).map(|i| (ids[i], ids[i + half])).collect();
    let bye = (n % 2 == 1).then(|| ids[half - 1]);

    add_round(&mut bracket, 1, &pairs, bye)?;
    Ok(bracket)
}

/// Pair the next Swiss round from the current records.
///
/// Requires every match of the current round to be decided. Returns the warnings raised
/// while pairing; they are also appended to `bracket.warnings`.
pub fn generate_next_round(bracket: &mut Bracket) -> BracketResult<Vec<PairingWarning>> {
    if bracket.format != BracketFormat::Swiss {
        return Err(BracketError::UnsupportedFormat(format!(
            "next round generation is only available for swiss, not {}",
            bracket.format
        )));
    }
    let swiss = bracket
        .swiss
        .as_ref()
        .ok_or_else(|| BracketError::UnsupportedFormat("bracket has no swiss state".to_string()))?;

    let current = bracket.current_round();
    if current >= swiss.total_rounds {
        return Err(BracketError::RoundsExhausted {
            rounds: swiss.total_rounds,
        });
    }
    let undecided = bracket
        .matches
        .iter()
        .any(|m| m.round == current && !m.status.is_closed());
    if undecided {
        return Err(BracketError::RoundIncomplete { round: current });
    }

    let number = current + 1;
    let standings = pairing_order(bracket, swiss);
    let mut warnings = Vec::new();

    let mut pool = standings;
    let bye = if pool.len() % 2 == 1 {
        let (chosen, warning) = choose_bye(&pool, swiss, number);
        warnings.extend(warning);
        pool.retain(|id| *id != chosen);
        Some(chosen)
    } else {
        None
    };

    let pairs = match pair_without_repeats(&pool, swiss) {
        Some(pairs) => pairs,
        None => {
            let (pairs, repeats) = pair_allowing_repeats(&pool, swiss, number);
            warnings.extend(repeats);
            pairs
        }
    };

    add_round(bracket, number, &pairs, bye)?;
    for warning in &warnings {
        log::warn!("{}", warning);
    }
    bracket.warnings.extend(warnings.iter().copied());
    log::info!(
        "generated swiss round {}: {} matches{}",
        number,
        pairs.len(),
        if bye.is_some() { " and a bye" } else { "" }
    );
    Ok(warnings)
}

/// Participants sorted by current score, highest first; seed breaks ties.
fn pairing_order(bracket: &Bracket, swiss: &SwissState) -> Vec<ParticipantId> {
    let mut order: Vec<(u32, usize, ParticipantId)> = swiss
        .records
        .iter()
        .map(|r| {
            let seed = bracket.seed_of(r.participant).unwrap_or(u32::MAX) as usize;
            (r.wins, seed, r.participant)
        })
        .collect();
    order.sort_by(|a, b| b.0.cmp(&a.0).then(a.1.cmp(&b.1)));
    order.into_iter().map(|(_, _, id)| id).collect()
}

/// Lowest-ranked participant without a bye; if everyone has had one, the lowest-ranked
/// participant gets a second one and a warning is raised.
fn choose_bye(
    order: &[ParticipantId],
    swiss: &SwissState,
    round: u32,
) -> (ParticipantId, Option<PairingWarning>) {
    let fresh = order
        .iter()
        .rev()
        .find(|id| swiss.record(**id).map_or(true, |r| r.byes == 0));
    match fresh {
        Some(id) => (*id, None),
        None => {
            let id = order[order.len() - 1];
            (
                id,
                Some(PairingWarning::RepeatByeRequired {
                    round,
                    participant: id,
                }),
            )
        }
    }
}

/// Pair in order, each participant with the nearest later one they have not met.
///
/// An odd score group leaves its last member to pair with the top of the next group.
/// Backtracks when a choice strands someone; gives up after the search budget.
///
/// `None` means either that no repeat-free pairing exists or that the budget ran out
/// first. The caller then pairs with repeats, so a `RepeatPairingRequired` warning can
/// come from an exhausted search as well as from a real impossibility.
fn pair_without_repeats(
    order: &[ParticipantId],
    swiss: &SwissState,
) -> Option<Vec<(ParticipantId, ParticipantId)>> {
    fn search(
        remaining: &[ParticipantId],
        swiss: &SwissState,
        budget: &mut usize,
        out: &mut Vec<(ParticipantId, ParticipantId)>,
    ) -> bool {
        let Some((&first, rest)) = remaining.split_first() else {
            return true;
        };
        if *budget == 0 {
            return false;
        }
        *budget -= 1;

        for (idx, &candidate) in rest.iter().enumerate() {
            if swiss.have_met(first, candidate) {
                continue;
            }
            let left: Vec<ParticipantId> = rest
                .iter()
                .enumerate()
                .filter(|(i, _)| *i != idx)
                .map(|(_, id)| *id)
                .collect();
            out.push((first, candidate));
            if search(&left, swiss, budget, out) {
                return true;
            }
            out.pop();
        }
        false
    }

    let mut budget = PAIRING_SEARCH_BUDGET;
    let mut out = Vec::with_capacity(order.len() / 2);
    search(order, swiss, &mut budget, &mut out).then_some(out)
}

/// Greedy pairing that accepts rematches, flagging each one.
fn pair_allowing_repeats(
    order: &[ParticipantId],
    swiss: &SwissState,
    round: u32,
) -> (Vec<(ParticipantId, ParticipantId)>, Vec<PairingWarning>) {
    let mut remaining = order.to_vec();
    let mut pairs = Vec::with_capacity(order.len() / 2);
    let mut warnings = Vec::new();

    while remaining.len() >= 2 {
        let first = remaining.remove(0);
        let idx = remaining
            .iter()
            .position(|c| !swiss.have_met(first, *c))
            .unwrap_or(0);
        let second = remaining.remove(idx);
        if swiss.have_met(first, second) {
            warnings.push(PairingWarning::RepeatPairingRequired {
                round,
                first,
                second,
            });
        }
        pairs.push((first, second));
    }
    (pairs, warnings)
}

/// Append a round: one match per pair, plus a bye match that is decided immediately.
fn add_round(
    bracket: &mut Bracket,
    number: u32,
    pairs: &[(ParticipantId, ParticipantId)],
    bye: Option<ParticipantId>,
) -> BracketResult<()> {
    let mut round = Round::new(number, BracketSection::Main, format!("Round {}", number));
    let mut position = 1;

    for &(a, b) in pairs {
        let id = push_match(
            bracket,
            number,
            position,
            BracketSection::Main,
            [Slot::Participant(a), Slot::Participant(b)],
        );
        round.match_ids.push(id);
        position += 1;
        if let Some(swiss) = bracket.swiss.as_mut() {
            swiss.remember_pair(a, b);
        }
    }

    if let Some(id) = bye {
        let match_id = push_match(
            bracket,
            number,
            position,
            BracketSection::Main,
            [Slot::Participant(id), Slot::Bye],
        );
        let m = bracket.get_match_mut(match_id)?;
        m.status = MatchStatus::Completed;
        m.winner = Some(id);
        round.match_ids.push(match_id);

        if let Some(record) = bracket.swiss.as_mut().and_then(|s| s.record_mut(id)) {
            record.wins += 1;
            record.byes += 1;
        }
        log::debug!("round {}: bye to {}", number, id);
    }

    bracket.rounds.push(round);
    Ok(())
}

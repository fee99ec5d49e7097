//! Match lifecycle: start, report, forfeit, propagation and reset.
//!
//! Every public operation here works on a copy and only replaces the bracket once the
//! whole change went through, so a failed call leaves the bracket as it was.

use crate::logic::builder::build_bracket;
use crate::models::{
    Advance, Bracket, BracketError, BracketResult, BracketSection, Match, MatchId, MatchStatus,
    Score, Side, Slot,
};
use std::collections::VecDeque;

/// Mark a ready match as being played.
///
/// Calling it again on a match already in progress is accepted.
pub fn start_match(bracket: &mut Bracket, match_id: MatchId) -> BracketResult<()> {
    let m = bracket.get_match_mut(match_id)?;
    if m.status.is_closed() {
        return Err(BracketError::MatchClosed(match_id));
    }
    if !m.is_ready() {
        return Err(BracketError::BothSlotsRequired(match_id));
    }
    if m.status == MatchStatus::Pending {
        m.status = MatchStatus::InProgress;
        log::debug!("match {} started", match_id);
    }
    Ok(())
}

/// Record the result of a match and move the participants on.
///
/// A regular result needs the winner to reach exactly the best-of majority with the
/// loser below it. With `forfeit` set the higher score wins whatever the numbers are,
/// and the match ends as forfeited. Ties are always rejected.
pub fn report_result(
    bracket: &mut Bracket,
    match_id: MatchId,
    score_a: u32,
    score_b: u32,
    forfeit: bool,
) -> BracketResult<()> {
    let m = check_open(bracket, match_id)?;
    let score = Score::new(score_a, score_b);
    let winner = if forfeit {
        higher_side(score).ok_or(invalid_score(m, score))?
    } else {
        validate_score(m, score)?
    };
    let status = if forfeit {
        MatchStatus::Forfeited
    } else {
        MatchStatus::Completed
    };

    let mut next = bracket.clone();
    decide(&mut next, match_id, winner, score, status)?;
    *bracket = next;
    Ok(())
}

/// `forfeiting_side` gives up the match; the other side wins by the minimum majority.
pub fn forfeit(bracket: &mut Bracket, match_id: MatchId, forfeiting_side: Side) -> BracketResult<()> {
    let m = check_open(bracket, match_id)?;
    let winner = forfeiting_side.other();
    let needed = m.wins_needed();
    let score = match winner {
        Side::A => Score::new(needed, 0),
        Side::B => Score::new(0, needed),
    };

    let mut next = bracket.clone();
    decide(&mut next, match_id, winner, score, MatchStatus::Forfeited)?;
    *bracket = next;
    Ok(())
}

/// Throw away all results and rebuild the bracket from its participants and config.
///
/// Refused once more real results exist than `config.reset_threshold` allows.
pub fn reset_bracket(bracket: &mut Bracket) -> BracketResult<()> {
    let completed = bracket.reported_results();
    let threshold = bracket.config.reset_threshold;
    if completed > threshold {
        return Err(BracketError::BracketInProgress {
            completed,
            threshold,
        });
    }

    let rebuilt = build_bracket(
        bracket.format,
        bracket.participants.clone(),
        bracket.config.clone(),
    )?;
    *bracket = rebuilt;
    log::info!(
        "{} bracket reset ({} results discarded)",
        bracket.format,
        completed
    );
    Ok(())
}

/// Auto-complete every bye match whose other side is known, following cascades.
pub(crate) fn settle_byes(bracket: &mut Bracket) -> BracketResult<()> {
    let mut queue = VecDeque::new();
    for m in bracket.matches.iter_mut() {
        if settle_if_bye(m) {
            queue.push_back(m.id);
        }
    }
    drain(bracket, queue)
}

/// Return the match if a result may be recorded on it.
fn check_open(bracket: &Bracket, match_id: MatchId) -> BracketResult<&Match> {
    let m = bracket.get_match(match_id)?;
    if m.status.is_closed() {
        return Err(BracketError::MatchClosed(match_id));
    }
    if !m.is_ready() {
        return Err(BracketError::BothSlotsRequired(match_id));
    }
    Ok(m)
}

/// Winning side of a regular best-of score.
fn validate_score(m: &Match, score: Score) -> BracketResult<Side> {
    let needed = m.wins_needed();
    match (score.a == needed, score.b == needed) {
        (true, false) if score.b < needed => Ok(Side::A),
        (false, true) if score.a < needed => Ok(Side::B),
        _ => Err(invalid_score(m, score)),
    }
}

fn higher_side(score: Score) -> Option<Side> {
    match score.a.cmp(&score.b) {
        std::cmp::Ordering::Greater => Some(Side::A),
        std::cmp::Ordering::Less => Some(Side::B),
        std::cmp::Ordering::Equal => None,
    }
}

fn invalid_score(m: &Match, score: Score) -> BracketError {
    BracketError::InvalidScore {
        score_a: score.a,
        score_b: score.b,
        best_of: m.best_of,
    }
}

/// Close a match for `winner` and propagate.
fn decide(
    bracket: &mut Bracket,
    match_id: MatchId,
    winner: Side,
    score: Score,
    status: MatchStatus,
) -> BracketResult<()> {
    let m = bracket.get_match_mut(match_id)?;
    let winner_id = m.participant(winner);
    let loser_id = m.participant(winner.other());
    m.winner = winner_id;
    m.score = Some(score);
    m.status = status;
    log::debug!(
        "match {} decided {}-{} ({:?})",
        match_id,
        score.a,
        score.b,
        status
    );

    if let Some(swiss) = bracket.swiss.as_mut() {
        if let Some(record) = winner_id.and_then(|id| swiss.record_mut(id)) {
            record.wins += 1;
        }
        if let Some(record) = loser_id.and_then(|id| swiss.record_mut(id)) {
            record.losses += 1;
        }
    }

    drain(bracket, VecDeque::from([match_id]))
}

/// Send outcomes of each decided match in `queue` downstream until nothing changes.
fn drain(bracket: &mut Bracket, mut queue: VecDeque<MatchId>) -> BracketResult<()> {
    while let Some(id) = queue.pop_front() {
        let m = bracket.get_match(id)?;
        let winner = m.winner.map_or(Slot::Bye, Slot::Participant);
        let loser = m.loser().map_or(Slot::Bye, Slot::Participant);
        let (winner_to, loser_to) = (m.winner_to, m.loser_to);

        if m.section == BracketSection::GrandFinal {
            if m.winning_side() == Some(Side::A) {
                if let Some(to) = winner_to {
                    bracket.get_match_mut(to.match_id)?.status = MatchStatus::Cancelled;
                }
                log::info!("upper bracket champion won the grand final, no reset needed");
                continue;
            }
            log::info!("lower bracket champion won the grand final, reset required");
        }

        if let Some(to) = winner_to {
            place(bracket, to, winner, &mut queue)?;
        }
        if let Some(to) = loser_to {
            place(bracket, to, loser, &mut queue)?;
        }
    }
    Ok(())
}

fn place(
    bracket: &mut Bracket,
    to: Advance,
    slot: Slot,
    queue: &mut VecDeque<MatchId>,
) -> BracketResult<()> {
    let target = bracket.get_match_mut(to.match_id)?;
    target.slots[to.side.index()] = slot;
    log::debug!("match {} side {:?} <- {:?}", to.match_id, to.side, slot);
    if settle_if_bye(target) {
        queue.push_back(to.match_id);
    }
    Ok(())
}

/// Complete a pending bye match once its other side is no longer a placeholder.
fn settle_if_bye(m: &mut Match) -> bool {
    if m.status != MatchStatus::Pending
        || !m.is_bye()
        || m.slots.iter().any(Slot::is_placeholder)
    {
        return false;
    }
    m.winner = m.slots.iter().find_map(Slot::participant);
    m.status = MatchStatus::Completed;
    match m.winner {
        Some(id) => log::debug!("match {}: bye, {} advances", m.id, id),
        None => log::debug!("match {}: empty on both sides", m.id),
    }
    true
}

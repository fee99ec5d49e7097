//! Structural audit of a bracket. Used by tests and by the controller after loading.

use crate::models::{
    pair_key, Bracket, BracketFormat, MatchStatus, PairingWarning, ParticipantId, Side, Slot,
};
use std::collections::{HashMap, HashSet};

/// List everything structurally wrong with `bracket`. Empty means consistent.
pub fn validate_bracket(bracket: &Bracket) -> Vec<String> {
    let mut issues = Vec::new();

    for (i, m) in bracket.matches.iter().enumerate() {
        if m.id as usize != i + 1 {
            issues.push(format!("match at index {} has id {}", i, m.id));
        }
    }

    for round in &bracket.rounds {
        for id in &round.match_ids {
            if bracket.get_match(*id).is_err() {
                issues.push(format!("round '{}' lists unknown match {}", round.name, id));
            }
        }
    }

    check_links(bracket, &mut issues);
    check_results(bracket, &mut issues);

    match bracket.format {
        BracketFormat::RoundRobin => check_round_robin(bracket, &mut issues),
        BracketFormat::Swiss => check_swiss(bracket, &mut issues),
        _ => {}
    }

    issues
}

/// Every advance target is used once and agrees with the placeholder it fills.
fn check_links(bracket: &Bracket, issues: &mut Vec<String>) {
    let mut targets: HashSet<(u32, Side)> = HashSet::new();

    for m in &bracket.matches {
        let links = [(m.winner_to, Slot::WinnerOf(m.id)), (m.loser_to, Slot::LoserOf(m.id))];
        for (to, expected) in links {
            let Some(to) = to else { continue };
            if !targets.insert((to.match_id, to.side)) {
                issues.push(format!(
                    "match {} side {:?} is fed by more than one match",
                    to.match_id, to.side
                ));
            }
            match bracket.get_match(to.match_id) {
                Ok(target) => {
                    let slot = target.slot(to.side);
                    if slot.is_placeholder() && slot != expected {
                        issues.push(format!(
                            "match {} side {:?} holds {:?}, expected {:?}",
                            to.match_id, to.side, slot, expected
                        ));
                    }
                }
                Err(_) => issues.push(format!("match {} advances to unknown match {}", m.id, to.match_id)),
            }
        }

        for side in [Side::A, Side::B] {
            let link = match m.slot(side) {
                Slot::WinnerOf(source) => bracket.get_match(source).ok().and_then(|s| s.winner_to),
                Slot::LoserOf(source) => bracket.get_match(source).ok().and_then(|s| s.loser_to),
                _ => continue,
            };
            if link.map(|l| (l.match_id, l.side)) != Some((m.id, side)) {
                issues.push(format!(
                    "match {} side {:?} waits on {:?}, which does not advance here",
                    m.id,
                    side,
                    m.slot(side)
                ));
            }
        }
    }
}

fn check_results(bracket: &Bracket, issues: &mut Vec<String>) {
    for m in &bracket.matches {
        match m.status {
            MatchStatus::Completed | MatchStatus::Forfeited => {
                if m.slots.iter().any(Slot::is_placeholder) {
                    issues.push(format!("match {} is decided but still has a placeholder", m.id));
                }
                if let Some(winner) = m.winner {
                    if !m.involves(winner) {
                        issues.push(format!("match {} winner {} is not in the match", m.id, winner));
                    }
                } else if m.slots.iter().any(|s| s.participant().is_some()) {
                    issues.push(format!("match {} is decided without a winner", m.id));
                }
            }
            MatchStatus::Pending | MatchStatus::InProgress | MatchStatus::Cancelled => {
                if m.winner.is_some() {
                    issues.push(format!("match {} has a winner but is {:?}", m.id, m.status));
                }
            }
        }
    }
}

/// Pairs seen across all real matches, with how often each occurred.
fn pair_counts(bracket: &Bracket) -> HashMap<(ParticipantId, ParticipantId), usize> {
    let mut counts = HashMap::new();
    for m in &bracket.matches {
        if let [Slot::Participant(a), Slot::Participant(b)] = m.slots {
            *counts.entry(pair_key(a, b)).or_insert(0) += 1;
        }
    }
    counts
}

fn check_round_robin(bracket: &Bracket, issues: &mut Vec<String>) {
    let counts = pair_counts(bracket);
    let ids = bracket.participant_ids();
    for (i, a) in ids.iter().enumerate() {
        for b in &ids[i + 1..] {
            match counts.get(&pair_key(*a, *b)).copied().unwrap_or(0) {
                1 => {}
                n => issues.push(format!("{} and {} meet {} times", a, b, n)),
            }
        }
    }
}

fn check_swiss(bracket: &Bracket, issues: &mut Vec<String>) {
    let flagged: HashSet<(ParticipantId, ParticipantId)> = bracket
        .warnings
        .iter()
        .filter_map(|w| match w {
            PairingWarning::RepeatPairingRequired { first, second, .. } => {
                Some(pair_key(*first, *second))
            }
            PairingWarning::RepeatByeRequired { .. } => None,
        })
        .collect();

    for (pair, n) in pair_counts(bracket) {
        if n > 1 && !flagged.contains(&pair) {
            issues.push(format!("{} and {} meet {} times without a warning", pair.0, pair.1, n));
        }
    }
}

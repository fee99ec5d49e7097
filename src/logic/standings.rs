//! Standings derived from match history. Nothing here is stored; every call recomputes.

use crate::models::{
    Bracket, BracketFormat, BracketSection, Match, MatchStatus, ParticipantId, Side,
};
use serde::{Deserialize, Serialize};
use std::cmp::Reverse;
use std::collections::HashMap;

/// One row of the standings table.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct Standing {
    /// 1-based, unique.
    pub rank: u32,
    pub participant: ParticipantId,
    pub seed: u32,
    /// Swiss wins include byes.
    pub wins: u32,
    pub losses: u32,
    pub points: u32,
    pub game_differential: i64,
    /// Swiss only: sum of opponents' scores.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub buchholz: Option<u32>,
    /// Swiss only: sum of beaten opponents' scores. Not used for ordering.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sonneborn_berger: Option<u32>,
    /// Elimination only: deepest stage reached, higher is further.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub furthest_stage: Option<u32>,
    /// Elimination only: final placing such as "1st" or "5th-8th", once settled.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub placement: Option<String>,
}

impl Bracket {
    /// Winner of a completed bracket.
    pub fn champion(&self) -> Option<ParticipantId> {
        if !self.is_complete() {
            return None;
        }
        compute_standings(self).first().map(|s| s.participant)
    }
}

/// Rank every participant of `bracket`.
pub fn compute_standings(bracket: &Bracket) -> Vec<Standing> {
    let history = History::collect(bracket);
    let mut rows: Vec<Standing> = bracket
        .participants
        .iter()
        .enumerate()
        .map(|(i, p)| {
            let record = history.record(p.id);
            Standing {
                rank: 0,
                participant: p.id,
                seed: i as u32 + 1,
                wins: record.wins,
                losses: record.losses,
                points: record.wins,
                game_differential: record.game_differential,
                buchholz: None,
                sonneborn_berger: None,
                furthest_stage: None,
                placement: None,
            }
        })
        .collect();

    let mut elimination_keys = None;
    match bracket.format {
        BracketFormat::SingleElimination | BracketFormat::DoubleElimination => {
            elimination_keys = Some(rank_elimination(bracket, &history, &mut rows));
        }
        BracketFormat::RoundRobin => {
            let config = &bracket.config;
            for row in rows.iter_mut() {
                row.points = row.wins * config.points_per_win + row.losses * config.points_per_loss;
            }
            rank_by(&mut rows, |r| (r.points, r.game_differential), &history);
        }
        BracketFormat::Swiss => {
            for row in rows.iter_mut() {
                let record = history.record(row.participant);
                row.buchholz = Some(record.opponents.iter().map(|o| history.score(*o)).sum());
                row.sonneborn_berger = Some(record.beaten.iter().map(|o| history.score(*o)).sum());
            }
            rank_by(&mut rows, |r| (r.points, r.buchholz), &history);
        }
    }

    for (i, row) in rows.iter_mut().enumerate() {
        row.rank = i as u32 + 1;
    }
    if let Some(keys) = elimination_keys {
        label_placements(bracket, &history, &keys, &mut rows);
    }
    rows
}

#[derive(Clone, Debug, Default)]
struct Record {
    wins: u32,
    losses: u32,
    game_differential: i64,
    opponents: Vec<ParticipantId>,
    beaten: Vec<ParticipantId>,
    /// Lost a match with nowhere left to go.
    eliminated: bool,
}

/// Tallies gathered in one pass over the matches.
struct History {
    records: HashMap<ParticipantId, Record>,
    /// (winner, loser) -> number of wins.
    head_to_head: HashMap<(ParticipantId, ParticipantId), u32>,
}

impl History {
    fn collect(bracket: &Bracket) -> Self {
        let mut records: HashMap<ParticipantId, Record> = HashMap::new();
        let mut head_to_head = HashMap::new();

        for m in &bracket.matches {
            if m.is_bye() {
                // Swiss byes count as a win; elimination byes are not games
                if bracket.format == BracketFormat::Swiss {
                    if let Some(id) = m.winner {
                        records.entry(id).or_default().wins += 1;
                    }
                }
                continue;
            }
            let Some((winner, loser, side)) = decided(m) else {
                continue;
            };
            let eliminated = match m.loser_to {
                None => true,
                Some(to) => bracket
                    .get_match(to.match_id)
                    .map_or(true, |t| t.status == MatchStatus::Cancelled),
            };
            let differential = m.score.map_or(0, |s| s.differential(side));

            let w = records.entry(winner).or_default();
            w.wins += 1;
            w.game_differential += differential;
            w.opponents.push(loser);
            w.beaten.push(loser);

            let l = records.entry(loser).or_default();
            l.losses += 1;
            l.game_differential -= differential;
            l.opponents.push(winner);
            l.eliminated |= eliminated;

            *head_to_head.entry((winner, loser)).or_insert(0) += 1;
        }

        Self {
            records,
            head_to_head,
        }
    }

    fn record(&self, id: ParticipantId) -> Record {
        self.records.get(&id).cloned().unwrap_or_default()
    }

    /// Match score used by the Swiss tiebreaks.
    fn score(&self, id: ParticipantId) -> u32 {
        self.records.get(&id).map_or(0, |r| r.wins)
    }

    fn wins_within(&self, id: ParticipantId, group: &[ParticipantId]) -> u32 {
        group
            .iter()
            .filter_map(|other| self.head_to_head.get(&(id, *other)))
            .sum()
    }
}

/// Winner, loser and winning side of a match with a real result.
fn decided(m: &Match) -> Option<(ParticipantId, ParticipantId, Side)> {
    if !m.has_result() {
        return None;
    }
    let side = m.winning_side()?;
    Some((m.participant(side)?, m.participant(side.other())?, side))
}

/// Sort by `key` descending; participants tied on it are split by wins against each
/// other, then by seed.
fn rank_by<K, F>(rows: &mut [Standing], key: F, history: &History)
where
    K: Ord,
    F: Fn(&Standing) -> K,
{
    rows.sort_by(|a, b| key(b).cmp(&key(a)).then(a.seed.cmp(&b.seed)));

    let mut start = 0;
    while start < rows.len() {
        let mut end = start + 1;
        while end < rows.len() && key(&rows[end]) == key(&rows[start]) {
            end += 1;
        }
        if end - start > 1 {
            let group: Vec<ParticipantId> = rows[start..end].iter().map(|r| r.participant).collect();
            rows[start..end]
                .sort_by_cached_key(|r| (Reverse(history.wins_within(r.participant, &group)), r.seed));
        }
        start = end;
    }
}

/// How deep into the bracket a match sits.
///
/// Upper round `r` of a double elimination bracket lines up with lower round
/// `2 * (r - 1)`, where its losers drop in.
fn stage(bracket: &Bracket, m: &Match) -> Option<u32> {
    let lower_rounds = bracket.rounds_in(BracketSection::Lower).count() as u32;
    let base = lower_rounds.max(1);
    match m.section {
        BracketSection::Main => Some(m.round),
        BracketSection::Upper => Some((2 * m.round.saturating_sub(1)).max(1)),
        BracketSection::Lower => Some(m.round),
        BracketSection::GrandFinal => Some(base + 1),
        BracketSection::GrandFinalReset => Some(base + 2),
        BracketSection::ThirdPlace => None,
    }
}

/// Winner of the deepest decided match, once nothing is left to play.
fn elimination_champion(bracket: &Bracket) -> Option<(ParticipantId, u32)> {
    if !bracket.is_complete() {
        return None;
    }
    bracket
        .matches
        .iter()
        .filter(|m| m.has_result())
        .filter_map(|m| Some((m.winner?, stage(bracket, m)?)))
        .max_by_key(|(_, s)| *s)
}

/// Sort key pieces for an elimination participant: furthest stage, still alive, bonus.
fn elimination_key(bracket: &Bracket, history: &History, id: ParticipantId) -> EliminationKey {
    let mut furthest = bracket
        .matches
        .iter()
        .filter(|m| m.involves(id))
        .filter_map(|m| stage(bracket, m))
        .max()
        .unwrap_or(0);
    if let Some((champion, top)) = elimination_champion(bracket) {
        if champion == id {
            furthest = top + 1;
        }
    }
    let bonus = bracket
        .matches_in(BracketSection::ThirdPlace)
        .filter(|m| m.has_result() && m.winner == Some(id))
        .count() as u32;
    (furthest, !history.record(id).eliminated, bonus)
}

type EliminationKey = (u32, bool, u32);

fn rank_elimination(
    bracket: &Bracket,
    history: &History,
    rows: &mut [Standing],
) -> HashMap<ParticipantId, EliminationKey> {
    let keys: HashMap<ParticipantId, EliminationKey> = rows
        .iter()
        .map(|r| (r.participant, elimination_key(bracket, history, r.participant)))
        .collect();
    for row in rows.iter_mut() {
        row.furthest_stage = keys.get(&row.participant).map(|k| k.0);
    }
    rows.sort_by(|a, b| {
        let ka = keys.get(&a.participant);
        let kb = keys.get(&b.participant);
        kb.cmp(&ka).then(a.seed.cmp(&b.seed))
    });
    keys
}

/// Placing labels. Eliminated participants sharing a sort key share a range label;
/// once the bracket is complete everyone gets one.
fn label_placements(
    bracket: &Bracket,
    history: &History,
    keys: &HashMap<ParticipantId, EliminationKey>,
    rows: &mut [Standing],
) {
    let complete = bracket.is_complete();
    let settled = |r: &Standing| complete || history.record(r.participant).eliminated;
    let key = |r: &Standing| keys.get(&r.participant).copied();

    let mut start = 0;
    while start < rows.len() {
        if !settled(&rows[start]) {
            start += 1;
            continue;
        }
        let mut end = start + 1;
        while end < rows.len() && settled(&rows[end]) && key(&rows[end]) == key(&rows[start]) {
            end += 1;
        }
        let label = placement_label(rows[start].rank, rows[end - 1].rank);
        for row in rows[start..end].iter_mut() {
            row.placement = Some(label.clone());
        }
        start = end;
    }
}

fn placement_label(first: u32, last: u32) -> String {
    if first == last {
        ordinal(first)
    } else {
        format!("{}-{}", ordinal(first), ordinal(last))
    }
}

fn ordinal(n: u32) -> String {
    let suffix = match (n % 10, n % 100) {
        (_, 11..=13) => "th",
        (1, _) => "st",
        (2, _) => "nd",
        (3, _) => "rd",
        _ => "th",
    };
    format!("{}{}", n, suffix)
}

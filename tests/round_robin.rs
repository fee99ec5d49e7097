//! Integration tests for round robin scheduling and standings.

use bracket_engine::{
    build_bracket, compute_standings, report_result, validate_bracket, Bracket, BracketConfig,
    BracketFormat, Participant, ParticipantId, Side, Slot,
};
use std::collections::HashSet;
use uuid::Uuid;

fn participants(n: u128) -> Vec<Participant> {
    (1..=n).map(|i| Participant::new(Uuid::from_u128(i), 0)).collect()
}

fn seed(i: u128) -> Uuid {
    Uuid::from_u128(i)
}

fn round_robin(n: u128, config: BracketConfig) -> Bracket {
    build_bracket(BracketFormat::RoundRobin, participants(n), config).unwrap()
}

/// Report the match between `winner` and `loser`, 1-0 in a best-of-1.
fn win(b: &mut Bracket, winner: ParticipantId, loser: ParticipantId) {
    let m = b
        .matches
        .iter()
        .find(|m| m.involves(winner) && m.involves(loser))
        .unwrap();
    let (id, a_wins) = (m.id, m.participant(Side::A) == Some(winner));
    let (sa, sb) = if a_wins { (1, 0) } else { (0, 1) };
    report_result(b, id, sa, sb, false).unwrap();
}

#[test]
fn six_participants_play_fifteen_matches() {
    let b = round_robin(6, BracketConfig::default());
    assert_eq!(b.matches.len(), 15);
    assert_eq!(b.rounds.len(), 5);
    for p in &b.participants {
        assert_eq!(b.matches.iter().filter(|m| m.involves(p.id)).count(), 5);
    }
    assert!(validate_bracket(&b).is_empty());
}

#[test]
fn nobody_plays_twice_in_a_round() {
    let b = round_robin(8, BracketConfig::default());
    for round in &b.rounds {
        let mut seen = HashSet::new();
        for id in &round.match_ids {
            for slot in b.get_match(*id).unwrap().slots {
                if let Slot::Participant(p) = slot {
                    assert!(seen.insert(p), "{} plays twice in {}", p, round.name);
                }
            }
        }
    }
}

#[test]
fn odd_count_rotates_the_sit_out() {
    let b = round_robin(5, BracketConfig::default());
    assert_eq!(b.matches.len(), 10);
    assert_eq!(b.rounds.len(), 5);
    let sitting: HashSet<_> = b.rounds.iter().filter_map(|r| r.bye).collect();
    assert_eq!(sitting.len(), 5);
    assert!(b.rounds.iter().all(|r| r.match_ids.len() == 2));
}

#[test]
fn head_to_head_splits_equal_points() {
    let mut b = round_robin(4, BracketConfig::best_of(1));
    let (s1, s2, s3, s4) = (seed(1), seed(2), seed(3), seed(4));
    win(&mut b, s2, s1);
    win(&mut b, s1, s3);
    win(&mut b, s1, s4);
    win(&mut b, s3, s2);
    win(&mut b, s2, s4);
    win(&mut b, s4, s3);
    assert!(b.is_complete());

    let order: Vec<_> = compute_standings(&b).iter().map(|s| s.participant).collect();
    assert_eq!(order, vec![s2, s1, s4, s3]);
}

#[test]
fn points_model_is_configurable() {
    let config = BracketConfig {
        best_of: 1,
        points_per_win: 3,
        points_per_loss: 1,
        ..BracketConfig::default()
    };
    let mut b = round_robin(3, config);
    win(&mut b, seed(1), seed(2));
    win(&mut b, seed(1), seed(3));
    win(&mut b, seed(3), seed(2));

    let standings = compute_standings(&b);
    let points: Vec<_> = standings.iter().map(|s| (s.participant, s.points)).collect();
    assert_eq!(points, vec![(seed(1), 6), (seed(3), 4), (seed(2), 2)]);
    assert_eq!(b.champion(), Some(seed(1)));
}

#[test]
fn game_differential_breaks_ties_before_head_to_head() {
    let mut b = round_robin(3, BracketConfig::best_of(5));
    let find = |b: &Bracket, x: u128, y: u128| {
        b.matches
            .iter()
            .find(|m| m.involves(seed(x)) && m.involves(seed(y)))
            .map(|m| (m.id, m.participant(Side::A) == Some(seed(x))))
            .unwrap()
    };
    // cycle: 1 beats 2 narrowly, 2 beats 3 narrowly, 3 beats 1 heavily
    for (x, y, wx, wy) in [(1, 2, 3, 2), (2, 3, 3, 2), (3, 1, 3, 0)] {
        let (id, x_is_a) = find(&b, x, y);
        let (sa, sb) = if x_is_a { (wx, wy) } else { (wy, wx) };
        report_result(&mut b, id, sa, sb, false).unwrap();
    }

    let standings = compute_standings(&b);
    let order: Vec<_> = standings.iter().map(|s| s.participant).collect();
    assert_eq!(order, vec![seed(3), seed(2), seed(1)]);
    assert_eq!(standings[0].game_differential, 2);
    assert_eq!(standings[1].game_differential, 0);
    assert_eq!(standings[2].game_differential, -2);
}

#[test]
fn format_builders_check_their_inputs() {
    use bracket_engine::logic::{
        build_double_elimination, build_round_robin, build_single_elimination, build_swiss,
    };
    use bracket_engine::BracketError;

    let err = build_round_robin(Vec::new(), BracketConfig::default()).unwrap_err();
    assert!(matches!(err, BracketError::InvalidSeedingInput(_)));
    let err = build_swiss(participants(1), BracketConfig::default()).unwrap_err();
    assert!(matches!(err, BracketError::InvalidSeedingInput(_)));
    let err = build_double_elimination(Vec::new(), BracketConfig::default()).unwrap_err();
    assert!(matches!(err, BracketError::InvalidSeedingInput(_)));

    let err = build_single_elimination(participants(4), BracketConfig::best_of(2)).unwrap_err();
    assert!(matches!(err, BracketError::UnsupportedFormat(_)));
    let third_place = BracketConfig {
        third_place_match: true,
        ..BracketConfig::default()
    };
    let err = build_round_robin(participants(4), third_place).unwrap_err();
    assert!(matches!(err, BracketError::UnsupportedFormat(_)));
}

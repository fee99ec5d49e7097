//! Integration tests for standings across formats.

use bracket_engine::{
    build_bracket, compute_standings, report_result, Bracket, BracketConfig, BracketFormat,
    Participant,
};
use uuid::Uuid;

fn participants(n: u128) -> Vec<Participant> {
    (1..=n).map(|i| Participant::new(Uuid::from_u128(i), 0)).collect()
}

fn seed(i: u128) -> Uuid {
    Uuid::from_u128(i)
}

fn single(n: u128, config: BracketConfig) -> Bracket {
    build_bracket(BracketFormat::SingleElimination, participants(n), config).unwrap()
}

/// Side A wins everything that can be played.
fn play_out(b: &mut Bracket) {
    loop {
        let next = b.ready_matches().first().map(|m| m.id);
        match next {
            Some(id) => report_result(b, id, 2, 0, false).unwrap(),
            None => break,
        }
    }
}

fn placements(b: &Bracket) -> Vec<(Uuid, Option<String>)> {
    compute_standings(b)
        .into_iter()
        .map(|s| (s.participant, s.placement))
        .collect()
}

#[test]
fn single_elimination_places_by_elimination_round() {
    let mut b = single(8, BracketConfig::default());
    play_out(&mut b);

    let expected = [
        (1, "1st"),
        (2, "2nd"),
        (3, "3rd-4th"),
        (4, "3rd-4th"),
        (5, "5th-8th"),
        (6, "5th-8th"),
        (7, "5th-8th"),
        (8, "5th-8th"),
    ];
    let got = placements(&b);
    for ((id, label), (s, want)) in got.iter().zip(expected) {
        assert_eq!(*id, seed(s));
        assert_eq!(label.as_deref(), Some(want));
    }

    let standings = compute_standings(&b);
    assert_eq!(standings[0].furthest_stage, Some(4));
    assert_eq!(standings[0].wins, 3);
    assert_eq!(standings[7].furthest_stage, Some(1));
    assert!(standings.iter().enumerate().all(|(i, s)| s.rank == i as u32 + 1));
}

#[test]
fn third_place_match_splits_the_semifinal_losers() {
    let config = BracketConfig {
        third_place_match: true,
        ..BracketConfig::default()
    };
    let mut b = single(4, config);
    play_out(&mut b);

    // semifinal losers 4 and 3 meet with 4 on side A
    let got = placements(&b);
    let expected = [(1, "1st"), (2, "2nd"), (4, "3rd"), (3, "4th")];
    for ((id, label), (s, want)) in got.iter().zip(expected) {
        assert_eq!(*id, seed(s));
        assert_eq!(label.as_deref(), Some(want));
    }
}

#[test]
fn unfinished_bracket_only_labels_the_eliminated() {
    let mut b = single(8, BracketConfig::default());
    for id in b.rounds[0].match_ids.clone() {
        report_result(&mut b, id, 2, 0, false).unwrap();
    }

    let got = placements(&b);
    for (id, label) in &got[..4] {
        assert!(label.is_none(), "{} is still alive", id);
    }
    for (_, label) in &got[4..] {
        assert_eq!(label.as_deref(), Some("5th-8th"));
    }
    assert_eq!(b.champion(), None);
}

#[test]
fn bye_is_not_counted_as_a_win_in_elimination() {
    let mut b = single(3, BracketConfig::default());
    play_out(&mut b);
    let standings = compute_standings(&b);
    assert_eq!(standings[0].participant, seed(1));
    assert_eq!(standings[0].wins, 1);
}

#[test]
fn standings_are_idempotent() {
    let mut b = build_bracket(
        BracketFormat::RoundRobin,
        participants(5),
        BracketConfig::default(),
    )
    .unwrap();
    report_result(&mut b, 1, 2, 1, false).unwrap();
    report_result(&mut b, 2, 0, 2, false).unwrap();
    assert_eq!(compute_standings(&b), compute_standings(&b));
}

//! Integration tests for single elimination building and progression.

use bracket_engine::{
    build_bracket, report_result, validate_bracket, Bracket, BracketConfig, BracketError,
    BracketFormat, BracketSection, MatchStatus, Participant, Slot,
};
use uuid::Uuid;

/// Participants already in seed order: seed `i` has id `i`.
fn participants(n: u128) -> Vec<Participant> {
    (1..=n).map(|i| Participant::new(Uuid::from_u128(i), 0)).collect()
}

fn seed(i: u128) -> Uuid {
    Uuid::from_u128(i)
}

fn next_ready(b: &Bracket) -> Option<u32> {
    b.ready_matches().first().map(|m| m.id)
}

fn single(n: u128) -> Bracket {
    build_bracket(BracketFormat::SingleElimination, participants(n), BracketConfig::default()).unwrap()
}

#[test]
fn seven_participants() {
    let b = single(7);
    assert_eq!(b.rounds.len(), 3);
    assert_eq!(b.rounds[0].match_ids.len(), 4);
    assert_eq!(b.playable_matches().count(), 6);

    let byes: Vec<_> = b.bye_matches().collect();
    assert_eq!(byes.len(), 1);
    assert_eq!(byes[0].round, 1);
    assert_eq!(byes[0].status, MatchStatus::Completed);
    assert_eq!(byes[0].winner, Some(seed(1)));

    // seed 1 already waits in round 2
    let second = b.get_match(b.rounds[1].match_ids[0]).unwrap();
    assert_eq!(second.slots[0], Slot::Participant(seed(1)));
    assert!(second.slots[1].is_placeholder());
    assert!(validate_bracket(&b).is_empty());
}

#[test]
fn round_one_follows_bracket_order() {
    let b = single(8);
    let pairs: Vec<(Slot, Slot)> = b.rounds[0]
        .match_ids
        .iter()
        .map(|id| {
            let m = b.get_match(*id).unwrap();
            (m.slots[0], m.slots[1])
        })
        .collect();
    let expected = [(1, 8), (4, 5), (2, 7), (3, 6)];
    for ((a, b), (sa, sb)) in pairs.iter().zip(expected) {
        assert_eq!(*a, Slot::Participant(seed(sa)));
        assert_eq!(*b, Slot::Participant(seed(sb)));
    }
}

#[test]
fn round_names() {
    let b = single(8);
    let names: Vec<&str> = b.rounds.iter().map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Quarterfinals", "Semifinals", "Final"]);

    let b = single(2);
    assert_eq!(b.matches.len(), 1);
    assert_eq!(b.rounds[0].name, "Final");
}

#[test]
fn winners_fill_round_two_and_nothing_else() {
    let mut b = single(8);
    let before = b.clone();
    for id in b.rounds[0].match_ids.clone() {
        report_result(&mut b, id, 2, 1, false).unwrap();
    }

    let round_two = b.rounds[1].match_ids.clone();
    assert_eq!(round_two.len(), 2);
    let expected = [(1, 4), (2, 3)];
    for (id, (a, c)) in round_two.iter().zip(expected) {
        let m = b.get_match(*id).unwrap();
        assert!(m.is_ready());
        assert_eq!(m.slots, [Slot::Participant(seed(a)), Slot::Participant(seed(c))]);
        assert_eq!(m.status, MatchStatus::Pending);
    }

    let final_id = b.rounds[2].match_ids[0];
    assert_eq!(b.get_match(final_id).unwrap(), before.get_match(final_id).unwrap());
    assert_eq!(b.reported_results(), 4);
}

#[test]
fn final_cannot_be_reported_early() {
    let mut b = single(8);
    let final_id = b.rounds[2].match_ids[0];
    let before = b.clone();
    assert_eq!(
        report_result(&mut b, final_id, 2, 0, false),
        Err(BracketError::BothSlotsRequired(final_id))
    );
    assert_eq!(b, before);
}

#[test]
fn third_place_match_takes_the_semifinal_losers() {
    let config = BracketConfig {
        third_place_match: true,
        ..BracketConfig::default()
    };
    let mut b = build_bracket(BracketFormat::SingleElimination, participants(4), config).unwrap();
    assert_eq!(b.matches.len(), 4);
    let third = b.matches_in(BracketSection::ThirdPlace).next().unwrap().id;

    report_result(&mut b, 1, 2, 0, false).unwrap(); // 1 beats 4
    report_result(&mut b, 2, 0, 2, false).unwrap(); // 3 beats 2

    let m = b.get_match(third).unwrap();
    assert_eq!(m.slots, [Slot::Participant(seed(4)), Slot::Participant(seed(2))]);
    assert!(validate_bracket(&b).is_empty());
}

#[test]
fn third_place_with_three_participants_is_a_bye() {
    let config = BracketConfig {
        third_place_match: true,
        ..BracketConfig::default()
    };
    let mut b = build_bracket(BracketFormat::SingleElimination, participants(3), config).unwrap();
    let third = b.matches_in(BracketSection::ThirdPlace).next().unwrap().id;
    assert_eq!(b.get_match(third).unwrap().status, MatchStatus::Pending);

    // the other semifinal: 2 v 3
    let semi = b.rounds[0].match_ids[1];
    report_result(&mut b, semi, 2, 0, false).unwrap();
    let m = b.get_match(third).unwrap();
    assert_eq!(m.status, MatchStatus::Completed);
    assert_eq!(m.winner, Some(seed(3)));
    assert_eq!(b.playable_matches().count(), 2);
}

#[test]
fn third_place_is_rejected_for_other_formats() {
    let config = BracketConfig {
        third_place_match: true,
        ..BracketConfig::default()
    };
    let err = build_bracket(BracketFormat::RoundRobin, participants(4), config).unwrap_err();
    assert!(matches!(err, BracketError::UnsupportedFormat(_)));
}

#[test]
fn even_best_of_is_rejected() {
    let err = build_bracket(
        BracketFormat::SingleElimination,
        participants(4),
        BracketConfig::best_of(4),
    )
    .unwrap_err();
    assert!(matches!(err, BracketError::UnsupportedFormat(_)));
}

#[test]
fn playing_out_produces_a_champion() {
    let mut b = single(6);
    while let Some(id) = next_ready(&b) {
        report_result(&mut b, id, 2, 0, false).unwrap();
    }
    assert!(b.is_complete());
    assert_eq!(b.champion(), Some(seed(1)));
    assert_eq!(b.progress().percent, 100);
    assert!(validate_bracket(&b).is_empty());
}

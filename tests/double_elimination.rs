//! Integration tests for double elimination: lower bracket drops and the grand final reset.

use bracket_engine::{
    build_bracket, compute_standings, report_result, validate_bracket, Bracket, BracketConfig,
    BracketFormat, BracketSection, MatchId, MatchStatus, Participant, Side, Slot,
};
use uuid::Uuid;

fn participants(n: u128) -> Vec<Participant> {
    (1..=n).map(|i| Participant::new(Uuid::from_u128(i), 0)).collect()
}

fn seed(i: u128) -> Uuid {
    Uuid::from_u128(i)
}

fn double(n: u128) -> Bracket {
    build_bracket(BracketFormat::DoubleElimination, participants(n), BracketConfig::default()).unwrap()
}

fn section_id(b: &Bracket, section: BracketSection) -> MatchId {
    b.matches_in(section).next().unwrap().id
}

/// First match that can be reported, other than `skip`.
fn next_ready(b: &Bracket, skip: Option<MatchId>) -> Option<(MatchId, BracketSection)> {
    b.ready_matches()
        .into_iter()
        .find(|m| Some(m.id) != skip)
        .map(|m| (m.id, m.section))
}

/// Report every ready match with side A winning, except the grand final which goes to
/// `grand_final_winner`.
fn play(b: &mut Bracket, grand_final_winner: Side) {
    while let Some((id, section)) = next_ready(b, None) {
        let (a, c) = match (section, grand_final_winner) {
            (BracketSection::GrandFinal, Side::B) => (1, 2),
            _ => (2, 1),
        };
        report_result(b, id, a, c, false).unwrap();
    }
}

#[test]
fn eight_participants_layout() {
    let b = double(8);
    assert_eq!(b.matches_in(BracketSection::Upper).count(), 7);
    assert_eq!(b.rounds_in(BracketSection::Lower).count(), 4);
    assert_eq!(b.matches_in(BracketSection::Lower).count(), 6);
    assert_eq!(b.matches_in(BracketSection::GrandFinal).count(), 1);
    assert_eq!(b.matches_in(BracketSection::GrandFinalReset).count(), 1);
    assert_eq!(b.matches.len(), 7 + 6 + 2);
    assert!(validate_bracket(&b).is_empty());

    let names: Vec<&str> = b.rounds_in(BracketSection::Lower).map(|r| r.name.as_str()).collect();
    assert_eq!(names, vec!["Lower Round 1", "Lower Round 2", "Lower Round 3", "Lower Final"]);
}

#[test]
fn upper_losers_drop_into_the_lower_bracket() {
    let mut b = double(4);
    // upper round 1: 1 v 4, 2 v 3
    report_result(&mut b, 1, 2, 0, false).unwrap();
    report_result(&mut b, 2, 0, 2, false).unwrap();

    let lower_first = b.rounds_in(BracketSection::Lower).next().unwrap().match_ids[0];
    let m = b.get_match(lower_first).unwrap();
    assert_eq!(m.slots, [Slot::Participant(seed(4)), Slot::Participant(seed(2))]);
}

#[test]
fn odd_count_cascades_byes_into_the_lower_bracket() {
    let b = double(5);
    assert_eq!(b.playable_matches().count(), 4 + 3 + 2);
    assert!(validate_bracket(&b).is_empty());

    // seeds 2 and 3 both had byes, so their lower-bracket match is empty on both sides
    let empty = b
        .matches_in(BracketSection::Lower)
        .find(|m| m.slots == [Slot::Bye, Slot::Bye])
        .unwrap();
    assert_eq!(empty.status, MatchStatus::Completed);
    assert_eq!(empty.winner, None);
}

#[test]
fn upper_champion_winning_the_grand_final_cancels_the_reset() {
    let mut b = double(8);
    play(&mut b, Side::A);

    let reset = section_id(&b, BracketSection::GrandFinalReset);
    assert_eq!(b.get_match(reset).unwrap().status, MatchStatus::Cancelled);
    assert!(b.is_complete());
    assert_eq!(b.champion(), Some(seed(1)));

    let progress = b.progress();
    assert_eq!(progress.total, 14);
    assert_eq!(progress.completed, 14);
    assert!(validate_bracket(&b).is_empty());
}

#[test]
fn lower_champion_winning_the_grand_final_forces_a_reset() {
    let mut b = double(8);
    let grand_final = section_id(&b, BracketSection::GrandFinal);
    let reset = section_id(&b, BracketSection::GrandFinalReset);

    // play everything up to the grand final
    while let Some((id, _)) = next_ready(&b, Some(grand_final)) {
        report_result(&mut b, id, 2, 1, false).unwrap();
    }
    let gf = b.get_match(grand_final).unwrap();
    assert!(gf.is_ready());
    let lower_champion = gf.participant(Side::B).unwrap();
    assert_eq!(gf.participant(Side::A), Some(seed(1)));

    report_result(&mut b, grand_final, 1, 2, false).unwrap();
    let m = b.get_match(reset).unwrap();
    assert_eq!(
        m.slots,
        [Slot::Participant(seed(1)), Slot::Participant(lower_champion)]
    );
    assert_eq!(m.status, MatchStatus::Pending);
    assert!(!b.is_complete());

    report_result(&mut b, reset, 0, 2, false).unwrap();
    assert!(b.is_complete());
    assert_eq!(b.champion(), Some(lower_champion));

    let standings = compute_standings(&b);
    assert_eq!(standings[0].participant, lower_champion);
    assert_eq!(standings[0].placement.as_deref(), Some("1st"));
    assert_eq!(standings[1].participant, seed(1));
    assert_eq!(standings[1].placement.as_deref(), Some("2nd"));
}

#[test]
fn two_participants_meet_again_in_the_grand_final() {
    let mut b = double(2);
    assert_eq!(b.playable_matches().count(), 3);
    report_result(&mut b, 1, 0, 2, false).unwrap();

    let gf = b.matches_in(BracketSection::GrandFinal).next().unwrap();
    assert_eq!(gf.slots, [Slot::Participant(seed(2)), Slot::Participant(seed(1))]);

    play(&mut b, Side::A);
    assert_eq!(b.champion(), Some(seed(2)));
}

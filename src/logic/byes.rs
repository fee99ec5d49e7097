//! Bye placement for elimination brackets.
//!
//! The bracket grows to the next power of two. Seeds past the participant count are
//! byes; standard bracket order pairs seed `s` with `size + 1 - s`, so the byes land on
//! the top seeds and never face each other.

use crate::models::{BracketError, BracketResult};
use serde::{Deserialize, Serialize};

/// Where the byes of an elimination bracket go.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ByePlan {
    pub participants: usize,
    pub bracket_size: usize,
    /// Seeds (1-based, ascending) that advance without playing round 1.
    pub byes: Vec<usize>,
    /// Round 1 in bracket order: `(seed, Some(opponent seed))` or `(seed, None)` for a bye.
    pub first_round: Vec<(usize, Option<usize>)>,
}

impl ByePlan {
    pub fn bye_count(&self) -> usize {
        self.bracket_size - self.participants
    }

    /// Rounds needed to reduce the bracket to one winner.
    pub fn rounds(&self) -> u32 {
        self.bracket_size.trailing_zeros()
    }
}

/// Smallest power of two that holds `n` participants.
pub fn bracket_size(n: usize) -> usize {
    n.max(1).next_power_of_two()
}

/// Standard bracket order of seeds for a power-of-two `size`: 1, size, …
///
/// For 8: `[1, 8, 4, 5, 2, 7, 3, 6]`. Adjacent entries meet in round 1.
pub fn seeding_order(size: usize) -> Vec<usize> {
    let mut order = vec![1];
    while order.len() < size {
        let mirror = order.len() * 2 + 1;
        order = order.iter().flat_map(|&s| [s, mirror - s]).collect();
    }
    order
}

/// Plan round 1 for `n` participants.
pub fn resolve_byes(n: usize) -> BracketResult<ByePlan> {
    if n < 2 {
        return Err(BracketError::InvalidSeedingInput(format!(
            "need at least 2 participants, got {}",
            n
        )));
    }
    let size = bracket_size(n);
    let order = seeding_order(size);

    let first_round: Vec<(usize, Option<usize>)> = order
        .chunks_exact(2)
        .map(|pair| {
            let (high, low) = (pair[0].min(pair[1]), pair[0].max(pair[1]));
            (high, (low <= n).then_some(low))
        })
        .collect();

    let mut byes: Vec<usize> = first_round
        .iter()
        .filter(|(_, opponent)| opponent.is_none())
        .map(|(seed, _)| *seed)
        .collect();
    byes.sort_unstable();

    Ok(ByePlan {
        participants: n,
        bracket_size: size,
        byes,
        first_round,
    })
}

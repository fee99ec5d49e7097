//! Seeding: order participants into an initial ranking before a bracket is built.

use crate::models::{BracketError, BracketResult, Participant};
use rand::seq::SliceRandom;
use rand::Rng;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::str::FromStr;

/// How the initial ranking is produced.
#[derive(Clone, Copy, Debug, Default, Eq, Hash, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SeedingMethod {
    /// Highest rating first; ties keep input order.
    #[default]
    Rating,
    /// Fisher-Yates shuffle with the caller's RNG.
    Random,
    /// Input order, as arranged by an operator.
    Manual,
    /// Input order, as delivered by an upstream seed list.
    SeedOrder,
    /// Rating order split into four tiers, then dealt out one tier at a time.
    Balanced,
}

impl FromStr for SeedingMethod {
    type Err = BracketError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "rating" => Ok(SeedingMethod::Rating),
            "random" => Ok(SeedingMethod::Random),
            "manual" => Ok(SeedingMethod::Manual),
            "seed-order" => Ok(SeedingMethod::SeedOrder),
            "balanced" => Ok(SeedingMethod::Balanced),
            other => Err(BracketError::InvalidSeedingInput(format!(
                "unknown seeding method '{}'",
                other
            ))),
        }
    }
}

const BALANCED_TIERS: usize = 4;

/// Order `participants` with `method`. `rng` is only consulted by [`SeedingMethod::Random`].
///
/// Fails with `InvalidSeedingInput` for fewer than two participants or duplicate ids.
pub fn seed_participants<R: Rng + ?Sized>(
    participants: Vec<Participant>,
    method: SeedingMethod,
    rng: &mut R,
) -> BracketResult<Vec<Participant>> {
    validate_participants(&participants)?;

    let seeded = match method {
        SeedingMethod::Rating => by_rating(participants),
        SeedingMethod::Random => {
            let mut shuffled = participants;
            shuffled.shuffle(rng);
            shuffled
        }
        SeedingMethod::Manual | SeedingMethod::SeedOrder => participants,
        SeedingMethod::Balanced => balanced(by_rating(participants)),
    };
    log::debug!("seeded {} participants by {:?}", seeded.len(), method);
    Ok(seeded)
}

/// At least two participants and no repeated id.
pub fn validate_participants(participants: &[Participant]) -> BracketResult<()> {
    if participants.len() < 2 {
        return Err(BracketError::InvalidSeedingInput(format!(
            "need at least 2 participants, got {}",
            participants.len()
        )));
    }
    let mut seen = HashSet::with_capacity(participants.len());
    for p in participants {
        if !seen.insert(p.id) {
            return Err(BracketError::InvalidSeedingInput(format!(
                "participant {} appears more than once",
                p.id
            )));
        }
    }
    Ok(())
}

fn by_rating(mut participants: Vec<Participant>) -> Vec<Participant> {
    // sort_by is stable: equal ratings keep input order
    participants.sort_by(|a, b| b.rating.cmp(&a.rating));
    participants
}

fn balanced(rated: Vec<Participant>) -> Vec<Participant> {
    let tier_size = (rated.len() / BALANCED_TIERS).max(1);
    let tiers: Vec<&[Participant]> = rated.chunks(tier_size).collect();
    let deepest = tiers.iter().map(|t| t.len()).max().unwrap_or(0);

    let mut out = Vec::with_capacity(rated.len());
    for pos in 0..deepest {
        for tier in &tiers {
            if let Some(p) = tier.get(pos) {
                out.push(*p);
            }
        }
    }
    out
}

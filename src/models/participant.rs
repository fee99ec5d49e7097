//! Participant: an opaque id plus the rating or seed value used for ordering.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Unique identifier for a participant (team or player). Owned by the caller.
pub type ParticipantId = Uuid;

/// A participant as handed to the engine. Immutable once a bracket is built.
#[derive(Clone, Copy, Debug, Eq, Hash, PartialEq, Serialize, Deserialize)]
pub struct Participant {
    pub id: ParticipantId,
    /// Rating (higher is stronger) or explicit seed value, depending on the seeding method.
    #[serde(default)]
    pub rating: i64,
}

impl Participant {
    pub fn new(id: ParticipantId, rating: i64) -> Self {
        Self { id, rating }
    }

    /// Participant with a fresh random id.
    pub fn random(rating: i64) -> Self {
        Self::new(Uuid::new_v4(), rating)
    }
}

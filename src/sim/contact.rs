//! Contact classification
//!
//! The host reports unordered pairs. Only pairs that include the player
//! matter; the other side decides the outcome, whichever slot it came in.

use serde::{Deserialize, Serialize};

use crate::host::{ContactPair, EntityHandle, EntityKind};

/// What a player contact means for the session
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ContactOutcome {
    /// Money bag grabbed
    Money(EntityHandle),
    /// Bonus bag grabbed
    Bonus(EntityHandle),
    /// Cop car hit - run over
    Caught(EntityHandle),
}

impl ContactOutcome {
    /// The entity that gets removed
    pub fn entity(&self) -> EntityHandle {
        match *self {
            ContactOutcome::Money(h) | ContactOutcome::Bonus(h) | ContactOutcome::Caught(h) => h,
        }
    }
}

/// Classify a contact pair; `None` for pairs the game doesn't care about
pub fn classify(pair: &ContactPair) -> Option<ContactOutcome> {
    let [a, b] = pair.sides();
    let other = match (a.kind, b.kind) {
        (EntityKind::Player, EntityKind::Player) => return None,
        (EntityKind::Player, _) => b,
        (_, EntityKind::Player) => a,
        _ => return None,
    };
    if !other.kind.is_spawned() {
        return None;
    }
    match other.kind {
        EntityKind::Money => Some(ContactOutcome::Money(other)),
        EntityKind::Bonus => Some(ContactOutcome::Bonus(other)),
        EntityKind::Cop => Some(ContactOutcome::Caught(other)),
        _ => None,
    }
}

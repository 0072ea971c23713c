use crate::state::{Hp, PlayerId};

use super::RosterError;

/// Session-scoped snapshot of an attackable player.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Opponent {
    pub id: PlayerId,
    pub display_name: String,
    pub hp: Hp,
}

impl Opponent {
    pub fn new(id: PlayerId, display_name: impl Into<String>, hp: Hp) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            hp,
        }
    }
}

/// Ordered set of opponents, unique by id.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Roster {
    opponents: Vec<Opponent>,
}

impl Roster {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a roster, keeping the first occurrence of duplicated ids.
    pub fn from_opponents(opponents: impl IntoIterator<Item = Opponent>) -> Self {
        let mut roster = Self::new();
        for opponent in opponents {
            // Duplicates from overlapping sources are expected here.
            let _ = roster.insert(opponent);
        }
        roster
    }

    pub fn insert(&mut self, opponent: Opponent) -> Result<(), RosterError> {
        if self.contains(opponent.id) {
            return Err(RosterError::AlreadyOpponent(opponent.id));
        }
        self.opponents.push(opponent);
        Ok(())
    }

    pub fn contains(&self, id: PlayerId) -> bool {
        self.opponents.iter().any(|o| o.id == id)
    }

    pub fn get(&self, id: PlayerId) -> Option<&Opponent> {
        self.opponents.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: PlayerId) -> Option<&mut Opponent> {
        self.opponents.iter_mut().find(|o| o.id == id)
    }

    pub fn len(&self) -> usize {
        self.opponents.len()
    }

    pub fn is_empty(&self) -> bool {
        self.opponents.is_empty()
    }

    /// True when the roster is non-empty and nobody has HP left.
    pub fn all_defeated(&self) -> bool {
        !self.opponents.is_empty() && self.opponents.iter().all(|o| o.hp.is_defeated())
    }

    pub fn ids(&self) -> impl Iterator<Item = PlayerId> + '_ {
        self.opponents.iter().map(|o| o.id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Opponent> {
        self.opponents.iter()
    }

    pub(crate) fn restore_all(&mut self) {
        for opponent in &mut self.opponents {
            opponent.hp = Hp::MAX;
        }
    }
}

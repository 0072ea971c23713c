use crate::combat::DamageRange;
use crate::state::PlayerId;

/// Rule parameters shared by the resolver and the session controller.
#[derive(Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct GameConfig {
    /// Range each damage roll is drawn from.
    pub damage: DamageRange,
    /// Probability that a resolved attack triggers a counter-attack.
    pub retaliation_chance: f64,
    /// Maximum number of social-graph contacts pulled into a roster.
    pub roster_size: usize,
    /// Two players that are always each other's opponents.
    ///
    /// Bootstrap/demo convenience; `None` disables it.
    pub mutual_pair: Option<(PlayerId, PlayerId)>,
}

impl GameConfig {
    pub const DEFAULT_RETALIATION_CHANCE: f64 = 0.5;
    pub const DEFAULT_ROSTER_SIZE: usize = 5;

    pub fn new() -> Self {
        Self {
            damage: DamageRange::default(),
            retaliation_chance: Self::DEFAULT_RETALIATION_CHANCE,
            roster_size: Self::DEFAULT_ROSTER_SIZE,
            mutual_pair: None,
        }
    }

    pub fn with_mutual_pair(mut self, a: PlayerId, b: PlayerId) -> Self {
        self.mutual_pair = Some((a, b));
        self
    }

    /// The paired partner of `player`, if the pairing rule names it.
    pub fn paired_opponent(&self, player: PlayerId) -> Option<PlayerId> {
        match self.mutual_pair {
            Some((a, b)) if a == player && b != player => Some(b),
            Some((a, b)) if b == player && a != player => Some(a),
            _ => None,
        }
    }
}

impl Default for GameConfig {
    fn default() -> Self {
        Self::new()
    }
}

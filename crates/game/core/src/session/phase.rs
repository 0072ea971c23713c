use strum::{Display, IntoStaticStr};

/// Lifecycle of a player's game session.
///
/// ```text
/// Loading ──► Active ──► GameOver ──(reset)──► Active
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Display, IntoStaticStr)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "snake_case")
)]
#[strum(serialize_all = "snake_case")]
pub enum SessionPhase {
    /// Player HP and the opponent roster are being fetched.
    #[default]
    Loading,
    /// Attacks are permitted.
    Active,
    /// Player defeated, or every opponent defeated. A reset is pending.
    GameOver,
}

impl SessionPhase {
    pub const fn is_active(self) -> bool {
        matches!(self, Self::Active)
    }

    pub const fn is_game_over(self) -> bool {
        matches!(self, Self::GameOver)
    }
}

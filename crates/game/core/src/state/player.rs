use std::fmt;
use std::str::FromStr;

/// Identifier of a player in the social directory.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(transparent)
)]
pub struct PlayerId(pub u64);

impl PlayerId {
    pub const fn new(raw: u64) -> Self {
        Self(raw)
    }

    #[inline]
    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for PlayerId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Self)
    }
}

impl From<u64> for PlayerId {
    fn from(raw: u64) -> Self {
        Self(raw)
    }
}

/// Hit points, always within `[0, Hp::MAX]`.
///
/// Every constructor clamps, so a value of this type can be persisted or
/// compared without further range checks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(from = "i64", into = "u32")
)]
pub struct Hp(u32);

impl Hp {
    pub const MAX: Self = Self(100);
    pub const ZERO: Self = Self(0);

    /// Clamp an arbitrary integer into the HP domain.
    pub fn clamped(value: i64) -> Self {
        Self(value.clamp(0, Self::MAX.0 as i64) as u32)
    }

    #[inline]
    pub const fn get(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_defeated(self) -> bool {
        self.0 == 0
    }

    /// HP after taking `damage`, floored at zero.
    pub fn after_damage(self, damage: u32) -> Self {
        Self(self.0.saturating_sub(damage))
    }
}

impl Default for Hp {
    fn default() -> Self {
        Self::MAX
    }
}

impl From<i64> for Hp {
    fn from(value: i64) -> Self {
        Self::clamped(value)
    }
}

impl From<Hp> for u32 {
    fn from(hp: Hp) -> Self {
        hp.0
    }
}

impl fmt::Display for Hp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Attacker or target as seen by the resolution engine.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(
    feature = "serde",
    derive(serde::Serialize, serde::Deserialize),
    serde(rename_all = "camelCase")
)]
pub struct Combatant {
    pub id: PlayerId,
    pub display_name: String,
}

impl Combatant {
    pub fn new(id: PlayerId, display_name: impl Into<String>) -> Self {
        Self {
            id,
            display_name: display_name.into(),
        }
    }

    /// Name used when the directory could not resolve the player.
    pub fn fallback_name(id: PlayerId) -> String {
        format!("fid:{}", id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hp_clamps_into_domain() {
        assert_eq!(Hp::clamped(-5), Hp::ZERO);
        assert_eq!(Hp::clamped(250), Hp::MAX);
        assert_eq!(Hp::clamped(42).get(), 42);
    }

    #[test]
    fn damage_floors_at_zero() {
        assert_eq!(Hp::clamped(15).after_damage(20), Hp::ZERO);
        assert_eq!(Hp::MAX.after_damage(25).get(), 75);
        assert!(Hp::ZERO.after_damage(10).is_defeated());
    }

    #[test]
    fn player_id_parses_trimmed_integers() {
        assert_eq!(" 42 ".parse::<PlayerId>().ok(), Some(PlayerId(42)));
        assert!("abc".parse::<PlayerId>().is_err());
    }
}

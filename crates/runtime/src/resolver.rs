//! Attack resolution engine.
//!
//! Rolls damage, commits HP and log changes through the [`GameStore`], rolls
//! for a counter-attack, and only then publishes an [`AttackEvent`]. Nothing
//! downstream of the publish can affect what was committed.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{SecondsFormat, Utc};
use game_core::{AttackEntry, Combatant, Dice, GameConfig, Hp, RETALIATION_WEAPON};
use serde::{Deserialize, Serialize};

use crate::events::{AttackEvent, Event, EventBus};
use crate::repository::{GameStore, Result};

/// Result of one resolved attack.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AttackOutcome {
    pub damage: u32,
    pub target_hp: Hp,
    /// The target is at 0 HP after this attack.
    pub defeated: bool,
    pub announcement: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retaliation: Option<Retaliation>,
}

/// Counter-attack dealt back to the attacker.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Retaliation {
    pub damage: u32,
    pub attacker_hp: Hp,
    pub announcement: String,
}

/// Current time as an RFC 3339 UTC timestamp with millisecond precision.
pub fn timestamp_now() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

fn attack_announcement(attacker: &str, target: &str, weapon: &str, damage: u32, defeated: bool) -> String {
    let mut text = format!("{attacker} attacked {target} with {weapon} for {damage} damage!");
    if defeated {
        text.push_str(&format!(" {target} has been defeated!"));
    }
    text
}

fn retaliation_announcement(attacker: &str, target: &str, damage: u32) -> String {
    format!("{target} retaliated against {attacker} with a {RETALIATION_WEAPON} for {damage} damage!")
}

/// Shared, cloneable attack resolver.
#[derive(Clone)]
pub struct AttackResolver {
    store: Arc<dyn GameStore>,
    dice: Arc<Mutex<Box<dyn Dice>>>,
    config: GameConfig,
    event_bus: EventBus,
}

impl AttackResolver {
    pub fn new(
        store: Arc<dyn GameStore>,
        dice: Box<dyn Dice>,
        config: GameConfig,
        event_bus: EventBus,
    ) -> Self {
        Self {
            store,
            dice: Arc::new(Mutex::new(dice)),
            config,
            event_bus,
        }
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    fn roll_damage(&self) -> u32 {
        let mut dice = self.dice.lock().unwrap_or_else(PoisonError::into_inner);
        dice.damage(self.config.damage)
    }

    fn roll_retaliation(&self) -> bool {
        let mut dice = self.dice.lock().unwrap_or_else(PoisonError::into_inner);
        dice.retaliates(self.config.retaliation_chance)
    }

    /// Resolve `attacker` hitting `target` with `weapon`.
    ///
    /// No precondition on the target's HP: attacking a defeated target logs
    /// another entry and leaves HP at 0. Every store write commits on its
    /// own; a later failure does not undo an earlier one.
    pub async fn resolve(
        &self,
        attacker: &Combatant,
        target: &Combatant,
        weapon: &str,
    ) -> Result<AttackOutcome> {
        let damage = self.roll_damage();
        let target_hp = self.store.apply_damage(target.id, damage).await?;
        self.store
            .append_attack(
                target.id,
                &AttackEntry::new(&attacker.display_name, weapon, damage, timestamp_now()),
            )
            .await?;

        let defeated = target_hp.is_defeated();
        let announcement = attack_announcement(
            &attacker.display_name,
            &target.display_name,
            weapon,
            damage,
            defeated,
        );
        tracing::debug!(
            "{} hit {} for {} (target hp {})",
            attacker.id,
            target.id,
            damage,
            target_hp
        );

        let retaliation = if self.roll_retaliation() {
            self.retaliate(attacker, target).await?
        } else {
            None
        };

        let outcome = AttackOutcome {
            damage,
            target_hp,
            defeated,
            announcement,
            retaliation,
        };

        self.event_bus.publish(Event::Attack(AttackEvent::Resolved {
            attacker: attacker.clone(),
            target: target.clone(),
            outcome: outcome.clone(),
        }));

        Ok(outcome)
    }

    async fn retaliate(&self, attacker: &Combatant, target: &Combatant) -> Result<Option<Retaliation>> {
        if self.store.hp(attacker.id).await?.is_defeated() {
            tracing::debug!("Attacker {} already defeated, no retaliation", attacker.id);
            return Ok(None);
        }

        let damage = self.roll_damage();
        let attacker_hp = self.store.apply_damage(attacker.id, damage).await?;
        self.store
            .append_attack(
                attacker.id,
                &AttackEntry::new(&target.display_name, RETALIATION_WEAPON, damage, timestamp_now()),
            )
            .await?;

        tracing::debug!(
            "{} retaliated against {} for {} (attacker hp {})",
            target.id,
            attacker.id,
            damage,
            attacker_hp
        );

        Ok(Some(Retaliation {
            damage,
            attacker_hp,
            announcement: retaliation_announcement(&attacker.display_name, &target.display_name, damage),
        }))
    }
}

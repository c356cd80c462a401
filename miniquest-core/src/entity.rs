//! Combatants: the player character and enemies.
//!
//! An [`Entity`] combines base stats, an [`Inventory`], an ability set and
//! timed effects. Derived stats are always rebuilt from scratch by
//! [`Entity::recompute_stats`] whenever a contributing input changes.

use crate::abilities::{
    AbilityDef, AbilityEffect, AbilityKind, ActiveCondition, ConditionKind, Stat, TimedModifier,
};
use crate::dice::Dice;
use crate::inventory::Inventory;
use crate::messages::MessageLog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;
use tracing::{debug, info};

/// Income needed for the first level-up.
pub const DEFAULT_TARGET: i32 = 20;

/// Base crit threshold on a d100 after modifiers.
pub const CRIT_CHANCE: i32 = 10;

/// Errors from using an ability.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SkillError {
    #[error("You do not know any ability called '{0}'.")]
    UnknownAbility(String),

    #[error("{0} cannot be used in combat.")]
    NotActive(String),

    #[error("Not enough weave to use {ability} (needs {cost}, have {available}).")]
    InsufficientWeave {
        ability: String,
        cost: i32,
        available: i32,
    },
}

/// Per-level stat growth from a background.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct StatGains {
    #[serde(default)]
    pub attack: f64,
    #[serde(default)]
    pub defense: f64,
    #[serde(default)]
    pub speed: f64,
    #[serde(default)]
    pub health: f64,
}

/// An ability granted on reaching a level.
#[derive(Debug, Clone, PartialEq)]
pub struct AbilityUnlock {
    /// Level at which the ability is learned.
    pub level: u32,
    pub ability: AbilityDef,
}

/// Background-driven growth, present on player characters.
#[derive(Debug, Clone, PartialEq)]
pub struct Progression {
    /// Background name, kept for saves and descriptions.
    pub background: String,
    /// Fixed per-level gains. `None` means the volatile policy applies.
    pub stat_gains: Option<StatGains>,
    /// Pending and past unlocks, ordered by level.
    pub unlocks: Vec<AbilityUnlock>,
}

fn ceil(value: f64) -> i32 {
    value.ceil() as i32
}

fn halve_down(value: i32) -> i32 {
    value.div_euclid(2)
}

/// A player or enemy.
#[derive(Debug, Clone)]
pub struct Entity {
    /// Display name, also used as the save file stem for players.
    pub name: String,
    /// Current level, starting at 1.
    pub level: u32,
    /// Income threshold for the next level.
    pub target: i32,

    /// Attack before modifiers.
    pub base_attack: f64,
    /// Defense before modifiers.
    pub base_defense: f64,
    /// Speed before modifiers.
    pub base_speed: f64,
    /// Health accumulated from level-ups on top of the per-level base.
    pub health_bonus: i32,

    // Rebuilt by recompute_stats.
    /// Sum of timed, passive and trinket attack bonuses.
    pub attack_mod: f64,
    /// Sum of timed, passive and trinket defense bonuses.
    pub defense_mod: f64,
    /// Sum of timed, passive and trinket speed bonuses.
    pub speed_mod: f64,
    /// Flat bonus added to both ends of the attack roll.
    pub damage: i32,
    /// Flat reduction applied to incoming attacks.
    pub mitigation: i32,
    /// Improves critical chance and critical damage.
    pub finesse: i32,
    pub max_health: i32,
    /// Always `2 * level + 1`.
    pub max_weave: i32,

    /// Zero or below means dead.
    pub current_health: i32,
    /// Spent by active abilities. Never negative.
    pub current_weave: i32,

    /// Known abilities of every kind.
    pub abilities: Vec<AbilityDef>,
    /// Conditions ticking on this entity, at most one per kind.
    pub conditions: BTreeMap<ConditionKind, ActiveCondition>,
    /// Timed stat changes, at most one per stat.
    pub stat_modifiers: BTreeMap<Stat, TimedModifier>,
    /// Enemies carry an empty one.
    pub inventory: Inventory,
    /// Players level up and never receive night scaling.
    pub is_player: bool,
    /// Background growth. `None` for enemies.
    pub progression: Option<Progression>,
}

impl Entity {
    /// A fresh entity at full health.
    pub fn new(name: impl Into<String>, attack: f64, defense: f64, speed: f64, level: u32) -> Self {
        let mut entity = Self {
            name: name.into(),
            level: level.max(1),
            target: DEFAULT_TARGET,
            base_attack: attack,
            base_defense: defense,
            base_speed: speed,
            health_bonus: 0,
            attack_mod: 0.0,
            defense_mod: 0.0,
            speed_mod: 0.0,
            damage: 0,
            mitigation: 0,
            finesse: 0,
            max_health: 0,
            max_weave: 0,
            current_health: 0,
            current_weave: 0,
            abilities: Vec::new(),
            conditions: BTreeMap::new(),
            stat_modifiers: BTreeMap::new(),
            inventory: Inventory::default(),
            is_player: false,
            progression: None,
        };
        entity.recompute_stats();
        entity.restore_full();
        entity
    }

    pub fn as_player(mut self) -> Self {
        self.is_player = true;
        self
    }

    pub fn with_inventory(mut self, inventory: Inventory) -> Self {
        self.inventory = inventory;
        self.recompute_stats();
        self.restore_full();
        self
    }

    pub fn with_abilities(mut self, abilities: Vec<AbilityDef>) -> Self {
        self.abilities = abilities;
        self.recompute_stats();
        self.restore_full();
        self
    }

    pub fn with_progression(mut self, progression: Progression) -> Self {
        self.progression = Some(progression);
        self
    }

    // ========================================================================
    // Derived stats
    // ========================================================================

    pub fn attack(&self) -> f64 {
        self.base_attack + self.attack_mod
    }

    pub fn defense(&self) -> f64 {
        self.base_defense + self.defense_mod
    }

    pub fn speed(&self) -> f64 {
        self.base_speed + self.speed_mod
    }

    pub fn stat(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Attack => self.attack(),
            Stat::Defense => self.defense(),
            Stat::Speed => self.speed(),
        }
    }

    fn base_stat(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Attack => self.base_attack,
            Stat::Defense => self.base_defense,
            Stat::Speed => self.base_speed,
        }
    }

    fn mod_mut(&mut self, stat: Stat) -> &mut f64 {
        match stat {
            Stat::Attack => &mut self.attack_mod,
            Stat::Defense => &mut self.defense_mod,
            Stat::Speed => &mut self.speed_mod,
        }
    }

    fn base_mut(&mut self, stat: Stat) -> &mut f64 {
        match stat {
            Stat::Attack => &mut self.base_attack,
            Stat::Defense => &mut self.base_defense,
            Stat::Speed => &mut self.base_speed,
        }
    }

    /// Rebuild every derived stat from base stats, timed modifiers,
    /// passive abilities and equipment, then clamp the pools.
    pub fn recompute_stats(&mut self) {
        self.attack_mod = 0.0;
        self.defense_mod = 0.0;
        self.speed_mod = 0.0;

        let timed: Vec<(Stat, f64)> = self
            .stat_modifiers
            .iter()
            .map(|(stat, modifier)| (*stat, modifier.amount))
            .collect();
        for (stat, amount) in timed {
            *self.mod_mut(stat) += amount;
        }

        let passives: Vec<(Stat, f64, f64)> = self
            .abilities
            .iter()
            .filter_map(|ability| match ability.effect {
                AbilityEffect::StatBonus {
                    stat,
                    flat,
                    percent,
                } => Some((stat, flat, percent)),
                _ => None,
            })
            .collect();
        for (stat, flat, percent) in passives {
            let bonus = flat + self.base_stat(stat) * percent / 100.0;
            *self.mod_mut(stat) += bonus;
        }

        let items = self.inventory.get_stat_modifiers();
        self.damage = halve_down(items.damage);
        self.mitigation = halve_down(items.mitigation);
        self.finesse = halve_down(items.finesse);
        self.attack_mod += f64::from(items.attack);
        self.defense_mod += f64::from(items.defense);
        self.speed_mod += f64::from(items.speed);

        let level = self.level as i32;
        self.max_health = (5 * level + self.health_bonus + ceil(self.defense() / 2.0)).max(1);
        self.max_weave = 2 * level + 1;

        self.current_health = self.current_health.min(self.max_health);
        self.current_weave = self.current_weave.clamp(0, self.max_weave);
    }

    /// Recompute stats and run the leveling check.
    pub fn update_stats(&mut self, dice: &mut dyn Dice, log: &mut MessageLog) {
        self.recompute_stats();
        self.accounting(dice, log);
    }

    // ========================================================================
    // Health and weave
    // ========================================================================

    pub fn is_dead(&self) -> bool {
        self.current_health <= 0
    }

    /// Full heal and full weave.
    pub fn restore_full(&mut self) {
        self.current_health = self.max_health;
        self.current_weave = self.max_weave;
    }

    /// Heal up to max health, returning the amount actually restored.
    pub fn heal(&mut self, amount: i32) -> i32 {
        let before = self.current_health;
        self.current_health = (self.current_health + amount.max(0)).min(self.max_health);
        self.current_health - before
    }

    // ========================================================================
    // Attack resolution
    // ========================================================================

    /// Roll outgoing damage, including a possible critical hit.
    pub fn roll_attack(&self, dice: &mut dyn Dice, log: &mut MessageLog) -> i32 {
        let attack = self.attack();
        let low = ceil(attack / 2.0) + self.damage;
        let high = (ceil(attack * 2.0) + self.damage).max(low);
        let rolled = dice.roll_range(low, high).max(1);
        debug!(entity = %self.name, low, high, rolled, "attack roll");
        self.roll_crit(rolled, dice, log)
    }

    /// Turn `damage` into a critical hit when the percentile roll, reduced
    /// by speed and finesse, lands at or under [`CRIT_CHANCE`].
    pub fn roll_crit(&self, damage: i32, dice: &mut dyn Dice, log: &mut MessageLog) -> i32 {
        let finesse = f64::from(self.finesse);
        let modifier = ceil(self.speed() / 4.0 + finesse / 2.0);
        let roll = dice.roll_d100() - modifier;
        if roll > CRIT_CHANCE {
            return damage;
        }
        let total = ceil(f64::from(damage) * 1.5) + ceil(self.attack() / 4.0 + finesse / 2.0);
        debug!(entity = %self.name, roll, damage, total, "critical hit");
        log.push(format!("{} lands a mortal wound!", self.name));
        total
    }

    /// Apply incoming damage after defense and mitigation. Returns the
    /// damage actually taken.
    pub fn take_damage(&mut self, damage: i32, log: &mut MessageLog) -> i32 {
        let reduction = ceil(self.defense() / 2.0 + f64::from(self.mitigation));
        let taken = (damage - reduction).max(0);
        self.current_health -= taken;
        log.push(format!("{} takes {} damage.", self.name, taken));
        taken
    }

    // ========================================================================
    // Leveling
    // ========================================================================

    pub fn has_ability(&self, id: &str) -> bool {
        self.abilities.iter().any(|a| a.id == id)
    }

    pub fn has_first_strike(&self) -> bool {
        self.abilities.iter().any(AbilityDef::is_first_strike)
    }

    fn has_volatile_gain(&self) -> bool {
        self.abilities.iter().any(AbilityDef::is_volatile)
    }

    /// Level up once if income has reached the target. Returns whether a
    /// level was gained. Never gains more than one level per call.
    pub fn accounting(&mut self, dice: &mut dyn Dice, log: &mut MessageLog) -> bool {
        if self.inventory.income() < self.target {
            return false;
        }
        self.target = self.target.saturating_mul(2);
        self.level += 1;

        let gains = self.progression.as_ref().and_then(|p| p.stat_gains);
        if self.has_volatile_gain() {
            let major = Stat::ALL[dice.choose_index(Stat::ALL.len())];
            for stat in Stat::ALL {
                *self.base_mut(stat) += if stat == major { 3.0 } else { 1.0 };
            }
            log.push(format!("{}'s {} surges!", self.name, major));
        } else if let Some(gains) = gains {
            self.base_attack += f64::from(ceil(gains.attack));
            self.base_defense += f64::from(ceil(gains.defense));
            self.base_speed += f64::from(ceil(gains.speed));
        } else {
            for stat in Stat::ALL {
                *self.base_mut(stat) += 1.0;
            }
        }
        self.health_bonus += gains.map(|g| ceil(g.health)).unwrap_or(1);

        let level = self.level;
        let unlocked: Vec<AbilityDef> = self
            .progression
            .as_ref()
            .map(|p| {
                p.unlocks
                    .iter()
                    .filter(|u| u.level == level)
                    .map(|u| u.ability.clone())
                    .collect()
            })
            .unwrap_or_default();
        for ability in unlocked {
            if !self.has_ability(&ability.id) {
                log.push(format!("{} has learned {}!", self.name, ability.name));
                self.abilities.push(ability);
            }
        }

        self.recompute_stats();
        self.restore_full();
        info!(entity = %self.name, level = self.level, target = self.target, "level up");
        log.push(format!("{} has reached level {}!", self.name, self.level));
        true
    }

    // ========================================================================
    // Enemy scaling
    // ========================================================================

    /// Multiply an enemy's base stats by its level.
    pub fn scale_to_level(&mut self) {
        if self.is_player {
            return;
        }
        let factor = f64::from(self.level);
        self.base_attack *= factor;
        self.base_defense *= factor;
        self.base_speed *= factor;
        self.recompute_stats();
    }

    /// Empower an enemy spawned at night. No effect on players or when
    /// `modifier <= 1.0`.
    pub fn apply_night_scaling(&mut self, modifier: f64, log: &mut MessageLog) -> bool {
        if self.is_player || modifier <= 1.0 {
            return false;
        }
        self.base_attack = (self.base_attack * modifier).ceil();
        self.base_defense = (self.base_defense * modifier).ceil();
        self.recompute_stats();
        log.push(format!("The encroaching darkness empowers {}!", self.name));
        true
    }

    // ========================================================================
    // Conditions and timed modifiers
    // ========================================================================

    /// Apply a condition, refreshing it if already present.
    pub fn add_condition(
        &mut self,
        kind: ConditionKind,
        duration: u32,
        potency: i32,
        source: impl Into<String>,
    ) {
        let source = source.into();
        self.conditions
            .entry(kind)
            .and_modify(|existing| {
                existing.duration = existing.duration.max(duration);
                existing.potency = existing.potency.max(potency);
                existing.source.clone_from(&source);
            })
            .or_insert(ActiveCondition {
                duration,
                potency,
                source,
            });
        self.recompute_stats();
    }

    pub fn has_condition(&self, kind: ConditionKind) -> bool {
        self.conditions.contains_key(&kind)
    }

    /// Add a timed stat change, replacing any existing one on that stat.
    pub fn add_stat_modifier(
        &mut self,
        stat: Stat,
        amount: f64,
        duration: u32,
        source: impl Into<String>,
    ) {
        self.stat_modifiers.insert(
            stat,
            TimedModifier {
                amount,
                duration,
                source: source.into(),
            },
        );
        self.recompute_stats();
    }

    /// Tick every condition. Harmful ones ignore mitigation.
    pub fn process_conditions_at_turn_start(&mut self, log: &mut MessageLog) {
        let ticks: Vec<(ConditionKind, i32)> = self
            .conditions
            .iter()
            .map(|(kind, condition)| (*kind, condition.potency))
            .collect();
        for (kind, potency) in ticks {
            if kind.is_harmful() {
                self.current_health -= potency.max(0);
                log.push(format!(
                    "{} suffers {} damage from being {}.",
                    self.name,
                    potency.max(0),
                    kind
                ));
            } else {
                let healed = self.heal(potency);
                log.push(format!("{} regenerates {} health.", self.name, healed));
            }
        }
    }

    /// Count down conditions and timed modifiers, dropping expired ones.
    pub fn process_conditions_at_turn_end(&mut self, log: &mut MessageLog) {
        let mut changed = false;

        let mut expired = Vec::new();
        for (kind, condition) in self.conditions.iter_mut() {
            condition.duration = condition.duration.saturating_sub(1);
            if condition.duration == 0 {
                expired.push(*kind);
            }
        }
        for kind in expired {
            self.conditions.remove(&kind);
            log.push(format!("{} is no longer {}.", self.name, kind));
            changed = true;
        }

        let mut faded = Vec::new();
        for (stat, modifier) in self.stat_modifiers.iter_mut() {
            modifier.duration = modifier.duration.saturating_sub(1);
            if modifier.duration == 0 {
                faded.push(*stat);
            }
        }
        for stat in faded {
            self.stat_modifiers.remove(&stat);
            log.push(format!("{}'s {} returns to normal.", self.name, stat));
            changed = true;
        }

        if changed {
            self.recompute_stats();
        }
    }

    /// Remove every condition and timed modifier.
    pub fn clear_effects(&mut self) {
        self.conditions.clear();
        self.stat_modifiers.clear();
        self.recompute_stats();
    }

    // ========================================================================
    // Abilities
    // ========================================================================

    /// Find a known ability by id or display name.
    pub fn find_ability(&self, query: &str) -> Option<&AbilityDef> {
        let query = query.trim();
        self.abilities
            .iter()
            .find(|a| a.id.eq_ignore_ascii_case(query) || a.name.eq_ignore_ascii_case(query))
    }

    /// Abilities usable on a combat turn.
    pub fn active_abilities(&self) -> impl Iterator<Item = &AbilityDef> {
        self.abilities
            .iter()
            .filter(|a| a.kind == AbilityKind::ActiveCombat)
    }

    /// Check that an ability can be used right now without changing anything.
    pub fn validate_skill(&self, query: &str) -> Result<&AbilityDef, SkillError> {
        let ability = self
            .find_ability(query)
            .ok_or_else(|| SkillError::UnknownAbility(query.trim().to_string()))?;
        if ability.kind != AbilityKind::ActiveCombat {
            return Err(SkillError::NotActive(ability.name.clone()));
        }
        if ability.cost.weave > self.current_weave {
            return Err(SkillError::InsufficientWeave {
                ability: ability.name.clone(),
                cost: ability.cost.weave,
                available: self.current_weave,
            });
        }
        Ok(ability)
    }

    /// Use an active ability against `target`. Nothing changes on error.
    pub fn use_skill(
        &mut self,
        query: &str,
        target: &mut Entity,
        dice: &mut dyn Dice,
        log: &mut MessageLog,
    ) -> Result<(), SkillError> {
        let ability = self.validate_skill(query)?.clone();
        self.current_weave -= ability.cost.weave;
        debug!(entity = %self.name, ability = %ability.id, "ability used");

        match ability.effect {
            AbilityEffect::Damage { dice: expr } => {
                let amount = expr.roll(dice).max(0);
                target.current_health -= amount;
                log.push(format!(
                    "{} uses {} on {}, dealing {} damage.",
                    self.name, ability.name, target.name, amount
                ));
            }
            AbilityEffect::Inflict {
                condition,
                duration,
                potency,
            } => {
                target.add_condition(condition, duration, potency, ability.id.clone());
                log.push(format!(
                    "{} uses {}. {} is {}!",
                    self.name, ability.name, target.name, condition
                ));
            }
            AbilityEffect::Heal { dice: expr } => {
                let healed = self.heal(expr.roll(dice));
                log.push(format!(
                    "{} uses {} and recovers {} health.",
                    self.name, ability.name, healed
                ));
            }
            AbilityEffect::Empower {
                stat,
                amount,
                duration,
            } => {
                self.add_stat_modifier(stat, amount, duration, ability.id.clone());
                log.push(format!(
                    "{} uses {}: {} +{} for {} turns.",
                    self.name, ability.name, stat, amount, duration
                ));
            }
            AbilityEffect::StatBonus { .. }
            | AbilityEffect::FirstStrike
            | AbilityEffect::VolatileStatGain => {
                return Err(SkillError::NotActive(ability.name));
            }
        }
        Ok(())
    }

    /// The first affordable active ability whose effect would land: no
    /// re-applying a condition or stat boost that is still running, no
    /// healing at full health.
    pub fn pick_combat_ability(&self, target: &Entity) -> Option<&AbilityDef> {
        self.active_abilities().find(|ability| {
            ability.cost.weave <= self.current_weave
                && match ability.effect {
                    AbilityEffect::Inflict { condition, .. } => !target.has_condition(condition),
                    AbilityEffect::Empower { stat, .. } => !self.stat_modifiers.contains_key(&stat),
                    AbilityEffect::Heal { .. } => self.current_health < self.max_health,
                    AbilityEffect::Damage { .. } => true,
                    AbilityEffect::StatBonus { .. }
                    | AbilityEffect::FirstStrike
                    | AbilityEffect::VolatileStatGain => false,
                }
        })
    }

    // ========================================================================
    // Description
    // ========================================================================

    pub fn status_line(&self) -> String {
        format!(
            "{} level {}: Health {}/{}, Attack {}, Defense {}, Speed {}",
            self.name,
            self.level,
            self.current_health,
            self.max_health,
            ceil(self.attack()),
            ceil(self.defense()),
            ceil(self.speed()),
        )
    }

    /// Log the status line and equipment.
    pub fn describe(&self, log: &mut MessageLog) {
        log.push(self.status_line());
        let equipped = self.inventory.equipped();
        if let Some(held) = &equipped.held {
            log.push(format!(
                "You are currently wielding a {} as your weapon.",
                held.name
            ));
        }
        if let Some(body) = &equipped.body {
            log.push(format!("You are currently wearing {} for armor.", body.name));
        }
        if !equipped.trinkets.is_empty() {
            let names: Vec<&str> = equipped.trinkets.iter().map(|t| t.name.as_str()).collect();
            log.push(format!(
                "You are currently wearing {} as your trinkets.",
                names.join(", ")
            ));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dice::DiceExpr;
    use crate::inventory::ItemSource;
    use crate::items::{Item, ItemKind, ItemStats};
    use crate::testing::ScriptedDice;

    fn hero() -> Entity {
        Entity::new("Hero", 3.0, 3.0, 3.0, 1).as_player()
    }

    #[test]
    fn test_new_entity_derived_stats() {
        let e = hero();
        // 5 * 1 + ceil(3 / 2)
        assert_eq!(e.max_health, 7);
        assert_eq!(e.current_health, 7);
        assert_eq!(e.max_weave, 3);
        assert_eq!(e.attack(), 3.0);
    }

    #[test]
    fn test_recompute_is_idempotent() {
        let mut e = hero();
        let bonus = AbilityDef::new(
            "thick_skin",
            "Thick Skin",
            AbilityKind::Passive,
            AbilityEffect::StatBonus {
                stat: Stat::Defense,
                flat: 1.0,
                percent: 100.0,
            },
        );
        e = e.with_abilities(vec![bonus]);
        let first = (e.defense(), e.max_health);
        e.recompute_stats();
        e.recompute_stats();
        assert_eq!((e.defense(), e.max_health), first);
        // percent is taken against base: 3 + 1 + 3
        assert_eq!(e.defense(), 7.0);
    }

    #[test]
    fn test_gear_is_halved_down() {
        let mut e = hero();
        let axe = Item::new("Axe", ItemKind::Weapon, ItemStats::gear(5, 0, 3)).unwrap();
        e.inventory.add_to_stored_items(axe).unwrap();
        e.inventory.equip_item("Axe", ItemSource::Carried).unwrap();
        e.recompute_stats();
        assert_eq!(e.damage, 2);
        assert_eq!(e.finesse, 1);
    }

    #[test]
    fn test_roll_attack_range_and_floor() {
        let e = hero();
        let mut log = MessageLog::default();
        // low = ceil(1.5) = 2, high = 6; d100 of 100 avoids the crit
        let mut dice = ScriptedDice::new([99, 100]);
        assert_eq!(e.roll_attack(&mut dice, &mut log), 6);

        // a degenerate range draws nothing, so only the d100 is queued
        let weak = Entity::new("Weak", 0.0, 0.0, 0.0, 1);
        let mut dice = ScriptedDice::new([100]);
        assert_eq!(weak.roll_attack(&mut dice, &mut log), 1);
        assert!(log.is_empty());
    }

    #[test]
    fn test_crit_arithmetic() {
        let e = hero();
        let mut log = MessageLog::default();
        // modifier = ceil(3/4 + 0) = 1; roll 11 - 1 = 10 crits
        let mut dice = ScriptedDice::new([11]);
        // ceil(4 * 1.5) + ceil(3/4) = 6 + 1
        assert_eq!(e.roll_crit(4, &mut dice, &mut log), 7);
        assert!(log.contains("Hero lands a mortal wound!"));

        let mut dice = ScriptedDice::new([12]);
        assert_eq!(e.roll_crit(4, &mut dice, &mut log), 4);
    }

    #[test]
    fn test_take_damage_mitigated_and_floored() {
        let mut e = hero();
        let mut log = MessageLog::default();
        // reduction = ceil(1.5 + 0) = 2
        assert_eq!(e.take_damage(5, &mut log), 3);
        assert_eq!(e.current_health, 4);
        assert_eq!(e.take_damage(1, &mut log), 0);
        assert_eq!(log.drain().last().map(String::as_str), Some("Hero takes 0 damage."));
    }

    #[test]
    fn test_accounting_one_level_per_call() {
        let mut e = hero();
        let mut log = MessageLog::default();
        let mut dice = ScriptedDice::default();
        e.inventory.add_income(1_000);
        assert!(e.accounting(&mut dice, &mut log));
        assert_eq!(e.level, 2);
        assert_eq!(e.target, 40);
        assert!(e.accounting(&mut dice, &mut log));
        assert_eq!(e.level, 3);
        assert_eq!(e.target, 80);
        // fallback policy gives +1 to everything per level
        assert_eq!(e.base_attack, 5.0);
        assert_eq!(e.health_bonus, 2);
        assert_eq!(e.current_health, e.max_health);
    }

    #[test]
    fn test_accounting_below_target_is_noop() {
        let mut e = hero();
        let mut log = MessageLog::default();
        let mut dice = ScriptedDice::default();
        e.inventory.add_income(19);
        assert!(!e.accounting(&mut dice, &mut log));
        assert_eq!(e.level, 1);
    }

    #[test]
    fn test_volatile_gain_picks_major() {
        let volatile = AbilityDef::new(
            "volatile_stat_gain",
            "Volatile Growth",
            AbilityKind::PassiveLeveling,
            AbilityEffect::VolatileStatGain,
        );
        let mut e = hero().with_abilities(vec![volatile]);
        e.inventory.add_income(20);
        let mut dice = ScriptedDice::new([2]);
        let mut log = MessageLog::default();
        e.accounting(&mut dice, &mut log);
        assert_eq!(e.base_speed, 6.0);
        assert_eq!(e.base_attack, 4.0);
        assert_eq!(e.base_defense, 4.0);
    }

    #[test]
    fn test_background_gains_round_up_and_unlock() {
        let rally = AbilityDef::new(
            "rally",
            "Rally",
            AbilityKind::ActiveCombat,
            AbilityEffect::Heal {
                dice: DiceExpr::flat(2),
            },
        );
        let mut e = hero().with_progression(Progression {
            background: "Warrior".into(),
            stat_gains: Some(StatGains {
                attack: 0.5,
                defense: 1.2,
                speed: 0.0,
                health: 2.5,
            }),
            unlocks: vec![AbilityUnlock {
                level: 2,
                ability: rally,
            }],
        });
        e.inventory.add_income(20);
        let mut log = MessageLog::default();
        e.accounting(&mut ScriptedDice::default(), &mut log);
        assert_eq!(e.base_attack, 4.0);
        assert_eq!(e.base_defense, 5.0);
        assert_eq!(e.base_speed, 3.0);
        assert_eq!(e.health_bonus, 3);
        assert!(e.has_ability("rally"));
        assert!(log.contains("Hero has learned Rally!"));
    }

    #[test]
    fn test_night_scaling_enemy_only() {
        let mut log = MessageLog::default();
        let mut enemy = Entity::new("Wolf", 1.5, 1.0, 2.0, 1);
        assert!(enemy.apply_night_scaling(2.0, &mut log));
        assert_eq!(enemy.base_attack, 3.0);
        assert_eq!(enemy.base_defense, 2.0);
        assert_eq!(enemy.base_speed, 2.0);
        assert!(log.contains("The encroaching darkness empowers Wolf!"));

        let mut player = hero();
        assert!(!player.apply_night_scaling(2.0, &mut log));
        assert!(!enemy.apply_night_scaling(1.0, &mut log));
    }

    #[test]
    fn test_scale_to_level() {
        let mut enemy = Entity::new("Ghoul", 2.0, 1.0, 3.0, 3);
        enemy.scale_to_level();
        assert_eq!(
            (enemy.base_attack, enemy.base_defense, enemy.base_speed),
            (6.0, 3.0, 9.0)
        );
    }

    #[test]
    fn test_conditions_tick_and_expire() {
        let mut e = hero();
        let mut log = MessageLog::default();
        e.add_condition(ConditionKind::Burning, 2, 2, "ember");
        assert!(e.has_condition(ConditionKind::Burning));

        e.process_conditions_at_turn_start(&mut log);
        assert_eq!(e.current_health, 5);
        e.process_conditions_at_turn_end(&mut log);
        assert!(e.has_condition(ConditionKind::Burning));

        e.process_conditions_at_turn_start(&mut log);
        e.process_conditions_at_turn_end(&mut log);
        assert!(!e.has_condition(ConditionKind::Burning));
        assert!(log.contains("Hero is no longer burning."));
    }

    #[test]
    fn test_timed_modifier_expires() {
        let mut e = hero();
        let mut log = MessageLog::default();
        e.add_stat_modifier(Stat::Attack, 2.0, 1, "rally");
        assert_eq!(e.attack(), 5.0);
        e.process_conditions_at_turn_end(&mut log);
        assert_eq!(e.attack(), 3.0);
    }

    #[test]
    fn test_use_skill_validates_first() {
        let ember = AbilityDef::new(
            "ember",
            "Ember",
            AbilityKind::ActiveCombat,
            AbilityEffect::Inflict {
                condition: ConditionKind::Burning,
                duration: 2,
                potency: 1,
            },
        )
        .with_weave_cost(5);
        let mut e = hero().with_abilities(vec![ember]);
        let mut target = Entity::new("Wolf", 1.0, 1.0, 1.0, 1);
        let mut log = MessageLog::default();
        let mut dice = ScriptedDice::default();

        let err = e.use_skill("ember", &mut target, &mut dice, &mut log);
        assert_eq!(
            err,
            Err(SkillError::InsufficientWeave {
                ability: "Ember".into(),
                cost: 5,
                available: 3
            })
        );
        assert_eq!(e.current_weave, 3);
        assert!(!target.has_condition(ConditionKind::Burning));

        assert!(matches!(
            e.use_skill("fireball", &mut target, &mut dice, &mut log),
            Err(SkillError::UnknownAbility(_))
        ));
    }

    #[test]
    fn test_use_skill_damage_and_weave() {
        let bolt = AbilityDef::new(
            "bolt",
            "Bolt",
            AbilityKind::ActiveCombat,
            AbilityEffect::Damage {
                dice: DiceExpr::parse("1d4+1").unwrap(),
            },
        )
        .with_weave_cost(2);
        let mut e = hero().with_abilities(vec![bolt]);
        let mut target = Entity::new("Wolf", 1.0, 1.0, 1.0, 1);
        let before = target.current_health;
        let mut log = MessageLog::default();
        let mut dice = ScriptedDice::new([3]);
        e.use_skill("Bolt", &mut target, &mut dice, &mut log).unwrap();
        assert_eq!(target.current_health, before - 4);
        assert_eq!(e.current_weave, 1);
    }

    #[test]
    fn test_describe_lines() {
        let mut e = hero();
        let charm = Item::new("Charm", ItemKind::Trinket, ItemStats::trinket(1, 0, 0)).unwrap();
        e.inventory.add_to_stored_items(charm).unwrap();
        e.inventory.equip_item("Charm", ItemSource::Carried).unwrap();
        e.recompute_stats();
        let mut log = MessageLog::default();
        e.describe(&mut log);
        let lines = log.drain();
        assert_eq!(lines[0], "Hero level 1: Health 7/7, Attack 4, Defense 3, Speed 3");
        assert_eq!(lines[1], "You are currently wearing Charm as your trinkets.");
    }
}

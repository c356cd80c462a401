//! A single encounter between the player and one enemy.
//!
//! [`Combat`] only tracks whose turn it is and resolves individual attacks.
//! Deciding when the encounter ends is left to the caller.
//!
//! The combatants and the loot table are not stored here. The world owns
//! the player and its [`LootTable`], the enemy lives beside the `Combat` in
//! [`crate::world::Encounter`], and each resolver borrows the entities it
//! needs for one call.

use crate::dice::Dice;
use crate::entity::Entity;
use crate::items::Item;
use crate::loot::LootTable;
use crate::messages::MessageLog;
use tracing::debug;

/// A combatant's side.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Side {
    Player,
    Enemy,
}

impl Side {
    pub fn other(self) -> Side {
        match self {
            Side::Player => Side::Enemy,
            Side::Enemy => Side::Player,
        }
    }
}

/// How an encounter finished.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    Victory,
    Defeat,
    Fled,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CombatPhase {
    AwaitingTurn(Side),
    Ended(Outcome),
}

/// Turn state for one encounter.
#[derive(Debug, Clone)]
pub struct Combat {
    area: String,
    order: [Side; 2],
    phase: CombatPhase,
    round: u32,
}

impl Combat {
    /// Start an encounter in `area`, deciding who acts first.
    ///
    /// A first-strike ability on exactly one side wins outright. Otherwise
    /// the higher derived speed goes first, and the player wins ties.
    pub fn new(area: impl Into<String>, player: &Entity, enemy: &Entity) -> Self {
        let first = Self::first_side(player, enemy);
        Self {
            area: area.into(),
            order: [first, first.other()],
            phase: CombatPhase::AwaitingTurn(first),
            round: 1,
        }
    }

    fn first_side(player: &Entity, enemy: &Entity) -> Side {
        match (player.has_first_strike(), enemy.has_first_strike()) {
            (true, false) => Side::Player,
            (false, true) => Side::Enemy,
            _ if enemy.speed() > player.speed() => Side::Enemy,
            _ => Side::Player,
        }
    }

    pub fn area(&self) -> &str {
        &self.area
    }

    pub fn order(&self) -> [Side; 2] {
        self.order
    }

    pub fn first(&self) -> Side {
        self.order[0]
    }

    pub fn phase(&self) -> CombatPhase {
        self.phase
    }

    pub fn round(&self) -> u32 {
        self.round
    }

    pub fn is_running(&self) -> bool {
        matches!(self.phase, CombatPhase::AwaitingTurn(_))
    }

    pub fn is_turn(&self, side: Side) -> bool {
        self.phase == CombatPhase::AwaitingTurn(side)
    }

    /// Hand the turn to the other side.
    pub fn end_turn(&mut self) {
        if let CombatPhase::AwaitingTurn(side) = self.phase {
            if side == self.order[1] {
                self.round += 1;
            }
            self.phase = CombatPhase::AwaitingTurn(side.other());
        }
    }

    pub fn finish(&mut self, outcome: Outcome) {
        debug!(area = %self.area, ?outcome, rounds = self.round, "combat ended");
        self.phase = CombatPhase::Ended(outcome);
    }

    /// Log the turn order.
    pub fn announce_order(&self, player: &Entity, enemy: &Entity, log: &mut MessageLog) {
        let (first, second) = match self.first() {
            Side::Player => (player, enemy),
            Side::Enemy => (enemy, player),
        };
        log.push(format!(
            "{} acts first with speed {}! {} acts second with speed {}!",
            first.name,
            first.speed().ceil(),
            second.name,
            second.speed().ceil()
        ));
    }

    /// The player hits the enemy.
    pub fn execute_player_attack(
        attacker: &Entity,
        defender: &mut Entity,
        dice: &mut dyn Dice,
        log: &mut MessageLog,
    ) -> i32 {
        let damage = attacker.roll_attack(dice, log);
        log.push(format!("You deal {damage} damage!"));
        let taken = defender.take_damage(damage, log);
        log.push(format!(
            "{} has {} health.",
            defender.name, defender.current_health
        ));
        taken
    }

    /// The enemy hits the player.
    pub fn execute_enemy_attack(
        attacker: &Entity,
        defender: &mut Entity,
        dice: &mut dyn Dice,
        log: &mut MessageLog,
    ) -> i32 {
        let damage = attacker.roll_attack(dice, log);
        log.push(format!("{} deals {} damage to you!", attacker.name, damage));
        let taken = defender.take_damage(damage, log);
        log.push(format!("You have {} health left.", defender.current_health));
        taken
    }

    /// The enemy's action: an ability when one would land, otherwise an
    /// attack.
    pub fn execute_enemy_action(
        enemy: &mut Entity,
        player: &mut Entity,
        dice: &mut dyn Dice,
        log: &mut MessageLog,
    ) {
        let chosen = enemy.pick_combat_ability(player).map(|a| a.id.clone());
        if let Some(id) = chosen {
            match enemy.use_skill(&id, player, dice, log) {
                Ok(()) => return,
                Err(err) => debug!(enemy = %enemy.name, %err, "enemy ability rejected"),
            }
        }
        Self::execute_enemy_attack(enemy, player, dice, log);
    }

    pub fn check_death(entity: &Entity) -> bool {
        entity.is_dead()
    }

    /// Roll a drop for this encounter's area. Does not touch the inventory.
    pub fn generate_loot(
        &self,
        player: &Entity,
        table: &LootTable,
        dice: &mut dyn Dice,
    ) -> Option<Item> {
        table.get_drop(&self.area, &player.inventory, dice)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::abilities::{AbilityDef, AbilityEffect, AbilityKind};
    use crate::dice::DiceExpr;
    use crate::testing::ScriptedDice;

    fn first_strike() -> AbilityDef {
        AbilityDef::new(
            "first_strike",
            "First Strike",
            AbilityKind::Passive,
            AbilityEffect::FirstStrike,
        )
    }

    #[test]
    fn test_faster_side_first() {
        let player = Entity::new("Hero", 3.0, 3.0, 3.0, 1).as_player();
        let enemy = Entity::new("Wolf", 2.0, 1.0, 4.0, 1);
        assert_eq!(Combat::new("Old road", &player, &enemy).first(), Side::Enemy);

        let slow = Entity::new("Slug", 2.0, 1.0, 1.0, 1);
        assert_eq!(Combat::new("Old road", &player, &slow).first(), Side::Player);
    }

    #[test]
    fn test_speed_tie_goes_to_player() {
        let player = Entity::new("Hero", 3.0, 3.0, 3.0, 1).as_player();
        let enemy = Entity::new("Bandit", 2.0, 1.0, 3.0, 1);
        let combat = Combat::new("Old road", &player, &enemy);
        assert_eq!(combat.order(), [Side::Player, Side::Enemy]);
    }

    #[test]
    fn test_first_strike_beats_speed() {
        let player = Entity::new("Hero", 3.0, 3.0, 1.0, 1).as_player();
        let enemy = Entity::new("Wolf", 2.0, 1.0, 9.0, 1);
        let player = player.with_abilities(vec![first_strike()]);
        assert_eq!(Combat::new("x", &player, &enemy).first(), Side::Player);

        // both have it: fall back to speed
        let enemy = enemy.with_abilities(vec![first_strike()]);
        assert_eq!(Combat::new("x", &player, &enemy).first(), Side::Enemy);
    }

    #[test]
    fn test_turns_alternate_and_count_rounds() {
        let player = Entity::new("Hero", 3.0, 3.0, 3.0, 1).as_player();
        let enemy = Entity::new("Bandit", 2.0, 1.0, 3.0, 1);
        let mut combat = Combat::new("Old road", &player, &enemy);
        assert!(combat.is_turn(Side::Player));
        combat.end_turn();
        assert!(combat.is_turn(Side::Enemy));
        assert_eq!(combat.round(), 1);
        combat.end_turn();
        assert_eq!(combat.round(), 2);
        combat.finish(Outcome::Fled);
        assert!(!combat.is_running());
        combat.end_turn();
        assert_eq!(combat.phase(), CombatPhase::Ended(Outcome::Fled));
    }

    #[test]
    fn test_attack_logs_from_player_perspective() {
        let player = Entity::new("Hero", 3.0, 3.0, 3.0, 1).as_player();
        let mut enemy = Entity::new("Bandit", 2.0, 1.0, 3.0, 1);
        let mut log = MessageLog::default();
        let mut dice = ScriptedDice::new([4, 100, 3, 100]);

        let dealt = Combat::execute_player_attack(&player, &mut enemy, &mut dice, &mut log);
        // bandit reduction = ceil(1 / 2) = 1
        assert_eq!(dealt, 3);
        let mut hero = player.clone();
        Combat::execute_enemy_attack(&enemy, &mut hero, &mut dice, &mut log);

        let lines = log.drain();
        assert_eq!(lines[0], "You deal 4 damage!");
        assert_eq!(lines[1], "Bandit takes 3 damage.");
        assert!(lines.contains(&"Bandit deals 3 damage to you!".to_string()));
        assert!(lines.contains(&format!("You have {} health left.", hero.current_health)));
    }

    #[test]
    fn test_enemy_heals_only_when_hurt() {
        let mend = AbilityDef::new(
            "mend",
            "Mend",
            AbilityKind::ActiveCombat,
            AbilityEffect::Heal {
                dice: DiceExpr::flat(2),
            },
        )
        .with_weave_cost(1);
        let mut enemy = Entity::new("Shaman", 2.0, 1.0, 3.0, 1).with_abilities(vec![mend]);
        let mut hero = Entity::new("Hero", 3.0, 3.0, 3.0, 1).as_player();
        let mut log = MessageLog::default();
        let mut dice = ScriptedDice::new([2, 100]);

        // full health: a plain attack
        Combat::execute_enemy_action(&mut enemy, &mut hero, &mut dice, &mut log);
        assert!(log.contains("Shaman deals 2 damage to you!"));
        assert_eq!(enemy.current_weave, enemy.max_weave);

        enemy.current_health -= 3;
        Combat::execute_enemy_action(&mut enemy, &mut hero, &mut dice, &mut log);
        assert!(log.contains("Shaman uses Mend and recovers 2 health."));
        assert_eq!(enemy.current_weave, enemy.max_weave - 1);
    }
}

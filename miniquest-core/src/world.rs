//! The game world: player, map, clock and the command state machine.
//!
//! The front end sends one command string at a time to
//! [`World::handle_player_choice`], reads the returned [`NextState`] to
//! decide what to show, and drains narrative with
//! [`World::drain_messages`].

use crate::character_builder::{BuilderError, CharacterBuilder};
use crate::combat::{Combat, Outcome, Side};
use crate::config::WorldConfig;
use crate::content::{GameContent, Location};
use crate::day_cycle::DayCycle;
use crate::dice::Dice;
use crate::entity::Entity;
use crate::inventory::ItemSource;
use crate::items::Item;
use crate::loot::LootTable;
use crate::messages::MessageLog;
use crate::persist::{PersistError, SavedGame, WorldSnapshot};
use std::fmt;
use std::path::{Path, PathBuf};
use tracing::{debug, error, info};

/// What the front end should show after a command.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NextState {
    AreaDescription,
    TravelOptions,
    PlayerCombatTurn,
    LootDecision,
    PlayerDefeatedMustFlee,
    ReturnedToCampAfterDefeat,
    Prepare,
}

impl NextState {
    pub fn as_str(&self) -> &'static str {
        match self {
            NextState::AreaDescription => "area_description",
            NextState::TravelOptions => "travel_options",
            NextState::PlayerCombatTurn => "player_combat_turn",
            NextState::LootDecision => "loot_decision",
            NextState::PlayerDefeatedMustFlee => "player_defeated_must_flee",
            NextState::ReturnedToCampAfterDefeat => "returned_to_camp_after_defeat",
            NextState::Prepare => "prepare",
        }
    }
}

impl fmt::Display for NextState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Which commands the world currently accepts.
#[derive(Debug, Clone, PartialEq)]
pub enum Mode {
    FreePlay,
    /// Choosing a destination from a snapshot of the area's connections.
    TravelSelection { options: Vec<String> },
    PlayerCombatTurn,
    /// Defeated; only the flee acknowledgement is accepted.
    MustFlee,
    LootDecision { item: Item },
}

/// The live encounter.
#[derive(Debug, Clone)]
pub struct Encounter {
    pub combat: Combat,
    pub enemy: Entity,
}

fn is(command: &str, expected: &str) -> bool {
    command.eq_ignore_ascii_case(expected)
}

/// Split `"Equip Rusty sword"` into `("equip", "Rusty sword")`.
fn split_command(command: &str) -> (String, &str) {
    match command.split_once(char::is_whitespace) {
        Some((verb, rest)) => (verb.to_lowercase(), rest.trim()),
        None => (command.to_lowercase(), ""),
    }
}

/// Root game state.
pub struct World {
    config: WorldConfig,
    content: GameContent,
    loot: LootTable,
    player: Entity,
    current_area: String,
    camp: String,
    day: DayCycle,
    encounter: Option<Encounter>,
    mode: Mode,
    log: MessageLog,
    dice: Box<dyn Dice>,
}

impl fmt::Debug for World {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("World")
            .field("player", &self.player.name)
            .field("current_area", &self.current_area)
            .field("camp", &self.camp)
            .field("hour", &self.day.hour)
            .field("mode", &self.mode)
            .finish_non_exhaustive()
    }
}

impl World {
    /// Start a new game with an already-built player.
    pub fn new(
        player: Entity,
        content: GameContent,
        config: WorldConfig,
        dice: Box<dyn Dice>,
    ) -> Self {
        let mut world = Self::assemble(player, content, config, dice);
        world.log.push("Welcome to Miniquest!");
        let start = world.config.starting_location.clone();
        if !world.relocate(&start) {
            if let Some(first) = world.content.locations().first() {
                world.current_area = first.name.clone();
            }
        }
        world
    }

    /// Build a character and start a new game with it.
    pub fn create(
        builder: CharacterBuilder,
        content: GameContent,
        config: WorldConfig,
        dice: Box<dyn Dice>,
    ) -> Result<Self, BuilderError> {
        let player = builder.build(&content, &config)?;
        let mut world = Self::new(player, content, config, dice);
        let p = &world.player;
        let summary = format!(
            "Current Stats: Lvl {}, HP {}/{}, Atk {}, Def {}, Spd {}",
            p.level,
            p.current_health,
            p.max_health,
            p.attack().ceil(),
            p.defense().ceil(),
            p.speed().ceil()
        );
        let created = format!("You have created a new character: {}!", p.name);
        info!(player = %p.name, "character created");
        world.log.push(created);
        world.log.push(summary);
        Ok(world)
    }

    fn assemble(
        player: Entity,
        content: GameContent,
        config: WorldConfig,
        dice: Box<dyn Dice>,
    ) -> Self {
        let day = DayCycle::new(
            config.exhaustion_hour,
            config.night_start_hour,
            config.night_modifier,
        );
        Self {
            loot: content.loot_table(),
            log: MessageLog::new(config.message_log_capacity),
            current_area: config.starting_location.clone(),
            camp: config.starting_camp.clone(),
            player,
            content,
            config,
            day,
            encounter: None,
            mode: Mode::FreePlay,
            dice,
        }
    }

    /// Rebuild a world from a saved snapshot.
    pub(crate) fn from_snapshot_parts(
        player: Entity,
        current_area: String,
        camp: String,
        day: DayCycle,
        content: GameContent,
        config: WorldConfig,
        dice: Box<dyn Dice>,
    ) -> Self {
        let mut world = Self::assemble(player, content, config, dice);
        world.current_area = current_area;
        world.camp = camp;
        world.day = day;
        world
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn player(&self) -> &Entity {
        &self.player
    }

    pub fn player_mut(&mut self) -> &mut Entity {
        &mut self.player
    }

    pub fn config(&self) -> &WorldConfig {
        &self.config
    }

    pub fn content(&self) -> &GameContent {
        &self.content
    }

    pub fn current_area(&self) -> &str {
        &self.current_area
    }

    pub fn camp(&self) -> &str {
        &self.camp
    }

    pub fn is_at_camp(&self) -> bool {
        self.current_area == self.camp
    }

    pub fn day_cycle(&self) -> &DayCycle {
        &self.day
    }

    pub fn mode(&self) -> &Mode {
        &self.mode
    }

    pub fn encounter(&self) -> Option<&Encounter> {
        self.encounter.as_ref()
    }

    pub fn is_player_combat_turn(&self) -> bool {
        self.mode == Mode::PlayerCombatTurn
    }

    pub fn in_travel_selection_mode(&self) -> bool {
        matches!(self.mode, Mode::TravelSelection { .. })
    }

    pub fn in_loot_decision_mode(&self) -> bool {
        matches!(self.mode, Mode::LootDecision { .. })
    }

    pub fn player_must_flee_combat(&self) -> bool {
        self.mode == Mode::MustFlee
    }

    pub fn pending_loot_item(&self) -> Option<&Item> {
        match &self.mode {
            Mode::LootDecision { item } => Some(item),
            _ => None,
        }
    }

    pub fn location(&self) -> Option<&Location> {
        self.content.location(&self.current_area)
    }

    /// Take every pending narrative line.
    pub fn drain_messages(&mut self) -> Vec<String> {
        self.log.drain()
    }

    /// Connections of the current area.
    pub fn get_travel_options(&self) -> Vec<String> {
        self.location()
            .map(|l| l.connections.clone())
            .unwrap_or_default()
    }

    /// Free actions available here.
    pub fn location_options(&self) -> Vec<&'static str> {
        let mut options = vec!["Fight", "Travel", "Rest"];
        if self.is_at_camp() {
            options.push("Prepare");
        }
        options
    }

    pub fn current_area_description(&self) -> Option<&str> {
        self.location().map(|l| l.description.as_str())
    }

    // ========================================================================
    // Command dispatch
    // ========================================================================

    /// Apply one player command.
    pub fn handle_player_choice(&mut self, choice: &str) -> NextState {
        let choice = choice.trim();
        self.log.push(format!("You chose: {choice}"));
        debug!(choice, mode = ?self.mode, "handling player choice");

        match self.mode {
            Mode::PlayerCombatTurn => self.handle_combat_choice(choice),
            Mode::MustFlee => {
                if is(choice, "Flee") || is(choice, "Flee Battle") {
                    self.mode = Mode::FreePlay;
                    self.player_defeated_retreat();
                    NextState::ReturnedToCampAfterDefeat
                } else {
                    self.log.push("You are too weak to do anything but flee.");
                    NextState::PlayerDefeatedMustFlee
                }
            }
            Mode::LootDecision { .. } => self.handle_loot_choice(choice),
            Mode::TravelSelection { .. } => self.handle_travel_choice(choice),
            Mode::FreePlay => self.handle_free_action(choice),
        }
    }

    fn handle_free_action(&mut self, choice: &str) -> NextState {
        let (verb, argument) = split_command(choice);
        match (verb.as_str(), argument.is_empty()) {
            ("fight", true) => {
                let has_enemies = self.location().is_some_and(|l| !l.enemies.is_empty());
                if has_enemies {
                    self.initiate_combat()
                } else {
                    self.log.push("There are no enemies here to fight...");
                    NextState::AreaDescription
                }
            }
            ("travel", true) => {
                self.log.push("Where would you like to travel?");
                self.mode = Mode::TravelSelection {
                    options: self.get_travel_options(),
                };
                NextState::TravelOptions
            }
            ("rest", true) => {
                self.rest();
                NextState::AreaDescription
            }
            ("prepare", true) => self.prepare(),
            ("equip" | "unequip" | "drop" | "sell", false) => self.handle_camp_command(&verb, argument),
            _ => {
                self.log.push(format!(
                    "'{choice}' is not a valid action or you cannot do that here."
                ));
                NextState::AreaDescription
            }
        }
    }

    // ========================================================================
    // Travel and camp
    // ========================================================================

    /// Resolve a destination picked from the travel menu.
    pub fn handle_travel_choice(&mut self, destination: &str) -> NextState {
        let Mode::TravelSelection { options } = &self.mode else {
            return NextState::AreaDescription;
        };

        if is(destination, "Stay") {
            self.log.push("You decide not to travel at this time.");
            self.mode = Mode::FreePlay;
            self.display_current_area();
            return NextState::AreaDescription;
        }

        let Some(target) = options
            .iter()
            .find(|o| o.eq_ignore_ascii_case(destination))
            .cloned()
        else {
            self.log
                .push(format!("You cannot travel to '{destination}' from here."));
            self.log.push("Please choose a valid destination or 'Stay'.");
            return NextState::TravelOptions;
        };

        self.mode = Mode::FreePlay;
        if !self.relocate(&target) {
            return NextState::AreaDescription;
        }
        self.log.push(format!("You traveled to {target}."));
        self.advance_time(1);
        self.display_current_area();
        NextState::AreaDescription
    }

    /// Move to `name`, updating the camp assignment and stowing carried
    /// items when the destination is the camp. Unknown names are logged
    /// and leave the current area unchanged.
    fn relocate(&mut self, name: &str) -> bool {
        if self.content.location(name).is_none() {
            error!(area = name, "relocation target missing from content");
            self.log.push(format!("Error: Area '{name}' not found."));
            return false;
        }
        self.current_area = name.to_string();
        if let Some(camp) = self.config.camp_for(name) {
            self.camp = camp.to_string();
        }
        self.stow_at_camp();
        debug!(area = name, camp = %self.camp, "relocated");
        true
    }

    /// Nothing stays in the pack while the player stands at camp.
    fn stow_at_camp(&mut self) {
        if !self.is_at_camp() {
            return;
        }
        let moved = self.player.inventory.transfer_carried_to_strongbox();
        if moved > 0 {
            self.log
                .push(format!("You stow {moved} item(s) in your strongbox."));
        }
    }

    fn display_current_area(&mut self) {
        self.player.recompute_stats();
        let description = self
            .location()
            .map(|l| l.description.clone())
            .unwrap_or_default();
        self.log
            .push(format!("Current location: {}", self.current_area));
        self.log.push(description);
    }

    /// Advance the clock, ending the day on exhaustion.
    fn advance_time(&mut self, hours: u32) {
        if self.day.increment_hour(hours, &mut self.log) {
            self.rest();
        }
    }

    /// Voluntary rest: new day, full recovery, back to camp.
    pub fn rest(&mut self) {
        self.day.reset_day(&mut self.log);
        self.player.clear_effects();
        self.player.restore_full();
        let camp = self.camp.clone();
        self.relocate(&camp);
        self.log.push(format!(
            "You rested and recovered. You are now at your camp: {}.",
            self.current_area
        ));
    }

    /// Involuntary return to camp after a defeat.
    pub fn player_defeated_retreat(&mut self) {
        self.log.push("You had to flee back to safety.");
        self.player.clear_effects();
        self.player.restore_full();
        let camp = self.camp.clone();
        self.relocate(&camp);
        self.day.reset_day(&mut self.log);
        self.log.push(format!(
            "You find yourself back at your camp: {}.",
            self.current_area
        ));
        self.log
            .push("A new day begins, offering a chance to recover from your ordeal.");
    }

    fn prepare(&mut self) -> NextState {
        if !self.is_at_camp() {
            self.log.push("You can only prepare at your camp.");
            return NextState::AreaDescription;
        }
        self.log.push("You enter your camp and begin to prepare.");
        self.player.describe(&mut self.log);
        let inventory = &self.player.inventory;
        let list = |items: &[Item]| {
            if items.is_empty() {
                "nothing".to_string()
            } else {
                items
                    .iter()
                    .map(|i| i.name.as_str())
                    .collect::<Vec<_>>()
                    .join(", ")
            }
        };
        let carried = format!("Pack: {}", list(inventory.carried()));
        let strongbox = format!("Strongbox: {}", list(inventory.strongbox()));
        self.log.push(carried);
        self.log.push(strongbox);
        NextState::Prepare
    }

    fn handle_camp_command(&mut self, verb: &str, item: &str) -> NextState {
        if !self.is_at_camp() {
            self.log.push("You can only manage your gear at your camp.");
            return NextState::AreaDescription;
        }
        let source = self
            .player
            .inventory
            .locate_stored(item)
            .unwrap_or(ItemSource::Carried);
        let inventory = &mut self.player.inventory;

        let result = match verb {
            "equip" => inventory.equip_item(item, source).map(|outcome| {
                let mut lines = vec![format!("You equip the {}.", outcome.equipped)];
                if let Some(old) = outcome.displaced {
                    lines.push(format!("The {old} is placed in your strongbox."));
                }
                lines
            }),
            "unequip" => inventory
                .unequip(item)
                .map(|old| vec![format!("You place the {} in your strongbox.", old.name)]),
            "drop" => inventory
                .drop_item(item, source)
                .map(|dropped| vec![format!("You discard the {}.", dropped.name)]),
            _ => inventory
                .sell(item, source)
                .map(|worth| vec![format!("You sell the {item} for {worth}.")]),
        };

        match result {
            Ok(lines) => {
                for line in lines {
                    self.log.push(line);
                }
                self.player.update_stats(self.dice.as_mut(), &mut self.log);
            }
            Err(err) => self.log.push(err.to_string()),
        }
        NextState::Prepare
    }

    // ========================================================================
    // Combat
    // ========================================================================

    /// Spawn an enemy from the current area and start the encounter.
    pub fn initiate_combat(&mut self) -> NextState {
        self.player.describe(&mut self.log);
        let Some(enemy) = self.generate_enemy() else {
            self.log
                .push("Combat cannot start as no enemy was generated.");
            return NextState::AreaDescription;
        };

        let combat = Combat::new(self.current_area.clone(), &self.player, &enemy);
        combat.announce_order(&self.player, &enemy, &mut self.log);
        let first = combat.first();
        info!(enemy = %enemy.name, area = %self.current_area, ?first, "combat started");
        self.encounter = Some(Encounter { combat, enemy });

        match first {
            Side::Player => self.begin_player_turn(),
            Side::Enemy => self.process_enemy_turn(),
        }
    }

    fn generate_enemy(&mut self) -> Option<Entity> {
        let pool = self.location()?.enemies.clone();
        if pool.is_empty() {
            self.log.push("No enemies to generate in this area.");
            return None;
        }
        let name = &pool[self.dice.choose_index(pool.len())];
        let Some(mut enemy) = self.content.create_enemy(name) else {
            error!(enemy = %name, "enemy template missing");
            self.log
                .push(format!("Error: Could not find enemy template for '{name}'."));
            return None;
        };
        enemy.scale_to_level();
        enemy.apply_night_scaling(self.day.get_enemy_night_modifier(), &mut self.log);
        enemy.recompute_stats();
        enemy.restore_full();
        enemy.describe(&mut self.log);
        self.log.push(format!("A {} appeared!", enemy.name));
        Some(enemy)
    }

    fn handle_combat_choice(&mut self, choice: &str) -> NextState {
        let (verb, argument) = split_command(choice);
        match (verb.as_str(), argument) {
            ("attack", "") => self.player_attack_action(),
            ("flee", "") => self.player_flee_action(),
            ("use", ability) if !ability.is_empty() => self.player_use_action(ability),
            _ => {
                self.log
                    .push(format!("'{choice}' is not a valid combat action now."));
                NextState::PlayerCombatTurn
            }
        }
    }

    fn begin_player_turn(&mut self) -> NextState {
        self.player.process_conditions_at_turn_start(&mut self.log);
        if self.player.is_dead() {
            return self.player_defeated();
        }
        self.mode = Mode::PlayerCombatTurn;
        self.log.push("--- Your Turn ---");
        self.log.push("It's your turn!");
        NextState::PlayerCombatTurn
    }

    fn player_attack_action(&mut self) -> NextState {
        let Some(encounter) = self.encounter.as_mut() else {
            return self.combat_missing();
        };
        Combat::execute_player_attack(
            &self.player,
            &mut encounter.enemy,
            self.dice.as_mut(),
            &mut self.log,
        );
        self.end_player_action()
    }

    fn player_use_action(&mut self, ability: &str) -> NextState {
        let Some(encounter) = self.encounter.as_mut() else {
            return self.combat_missing();
        };
        match self.player.use_skill(
            ability,
            &mut encounter.enemy,
            self.dice.as_mut(),
            &mut self.log,
        ) {
            Ok(()) => self.end_player_action(),
            Err(err) => {
                self.log.push(err.to_string());
                NextState::PlayerCombatTurn
            }
        }
    }

    fn end_player_action(&mut self) -> NextState {
        self.player.process_conditions_at_turn_end(&mut self.log);
        let Some(encounter) = self.encounter.as_mut() else {
            return self.combat_missing();
        };
        if Combat::check_death(&encounter.enemy) {
            return self.player_victory();
        }
        encounter.combat.end_turn();
        self.process_enemy_turn()
    }

    fn process_enemy_turn(&mut self) -> NextState {
        self.mode = Mode::FreePlay;
        let Some(encounter) = self.encounter.as_mut() else {
            return self.combat_missing();
        };
        let enemy = &mut encounter.enemy;
        self.log.push(format!("--- {}'s Turn ---", enemy.name));

        enemy.process_conditions_at_turn_start(&mut self.log);
        if Combat::check_death(enemy) {
            return self.player_victory();
        }
        Combat::execute_enemy_action(enemy, &mut self.player, self.dice.as_mut(), &mut self.log);
        enemy.process_conditions_at_turn_end(&mut self.log);

        if Combat::check_death(&self.player) {
            return self.player_defeated();
        }
        encounter.combat.end_turn();
        self.begin_player_turn()
    }

    fn player_victory(&mut self) -> NextState {
        let Some(encounter) = self.encounter.take() else {
            return self.combat_missing();
        };
        let Encounter { mut combat, enemy } = encounter;
        self.log.push(format!("You have defeated {}!", enemy.name));
        let drop = combat.generate_loot(&self.player, &self.loot, self.dice.as_mut());
        combat.finish(Outcome::Victory);
        self.end_combat();
        self.advance_time(1);

        match drop {
            Some(item) => {
                self.log.push(format!("You found {}", item.summary()));
                self.mode = Mode::LootDecision { item };
                NextState::LootDecision
            }
            None => NextState::AreaDescription,
        }
    }

    fn player_defeated(&mut self) -> NextState {
        if let Some(mut encounter) = self.encounter.take() {
            encounter.combat.finish(Outcome::Defeat);
        }
        self.log
            .push("You have been overcome and cannot continue fighting.");
        self.end_combat();
        self.advance_time(1);
        self.mode = Mode::MustFlee;
        NextState::PlayerDefeatedMustFlee
    }

    fn player_flee_action(&mut self) -> NextState {
        self.log.push("You attempt to flee...");
        if let Some(mut encounter) = self.encounter.take() {
            encounter.combat.finish(Outcome::Fled);
        }
        self.log.push("You successfully fled from combat!");
        self.end_combat();
        self.advance_time(1);
        self.display_current_area();
        NextState::AreaDescription
    }

    fn end_combat(&mut self) {
        self.encounter = None;
        self.mode = Mode::FreePlay;
        self.player.clear_effects();
    }

    fn combat_missing(&mut self) -> NextState {
        error!("combat command without an active encounter");
        self.log.push("Error: Combat is not active.");
        self.end_combat();
        NextState::AreaDescription
    }

    // ========================================================================
    // Loot
    // ========================================================================

    fn handle_loot_choice(&mut self, choice: &str) -> NextState {
        let Mode::LootDecision { item } = &self.mode else {
            return NextState::AreaDescription;
        };
        let item = item.clone();

        if is(choice, "Take") || is(choice, "Take Item") {
            match self.player.inventory.add_to_stored_items(item.clone()) {
                Ok(()) => {
                    self.log.push(format!("You take the {}.", item.name));
                    self.stow_at_camp();
                }
                Err(err) => {
                    self.log.push(err.to_string());
                    self.log.push(format!("You leave the {} behind.", item.name));
                }
            }
        } else if is(choice, "Drop") || is(choice, "Drop Loot") {
            self.log.push(format!("You discard the {}.", item.name));
        } else if is(choice, "Leave") {
            self.log.push(format!("You decide to leave the {}.", item.name));
        } else {
            self.log.push(format!(
                "'{choice}' is not a valid choice. Take, Drop or Leave the {}.",
                item.name
            ));
            return NextState::LootDecision;
        }

        self.mode = Mode::FreePlay;
        self.display_current_area();
        NextState::AreaDescription
    }

    // ========================================================================
    // Persistence
    // ========================================================================

    pub fn snapshot(&self) -> WorldSnapshot {
        WorldSnapshot::capture(&self.player, &self.current_area, &self.camp, &self.day)
    }

    /// Save to `<save_dir>/<player name>.json`. Only allowed in free play.
    pub fn save(&mut self) -> Result<PathBuf, PersistError> {
        let path = crate::persist::save_path(&self.config.save_dir, &self.player.name);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        self.save_to(&path)?;
        Ok(path)
    }

    /// Save to an explicit path. Only allowed in free play.
    pub fn save_to(&mut self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        if self.mode != Mode::FreePlay || self.encounter.is_some() {
            return Err(PersistError::NotAllowed(
                "You cannot save right now.".to_string(),
            ));
        }
        let path = path.as_ref();
        SavedGame::new(self.snapshot()).save_json(path)?;
        info!(path = %path.display(), "game saved");
        self.log.push(format!("Game saved to {}.", path.display()));
        Ok(())
    }

    /// Load a saved game, resolving every reference against `content`.
    pub fn load(
        path: impl AsRef<Path>,
        content: GameContent,
        config: WorldConfig,
        dice: Box<dyn Dice>,
    ) -> Result<Self, PersistError> {
        let path = path.as_ref();
        let saved = SavedGame::load_json(path)?;
        let mut world = saved.state.restore(content, config, dice)?;
        info!(path = %path.display(), player = %world.player.name, "game loaded");
        world.log.push(format!("Welcome back, {}!", world.player.name));
        world.display_current_area();
        Ok(world)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{test_world, ScriptedDice};

    #[test]
    fn test_state_tokens() {
        assert_eq!(NextState::AreaDescription.to_string(), "area_description");
        assert_eq!(
            NextState::ReturnedToCampAfterDefeat.as_str(),
            "returned_to_camp_after_defeat"
        );
    }

    #[test]
    fn test_new_world_starts_at_camp() {
        let mut world = test_world(ScriptedDice::default());
        assert_eq!(world.current_area(), "Lastholm");
        assert!(world.is_at_camp());
        assert_eq!(world.location_options(), ["Fight", "Travel", "Rest", "Prepare"]);
        assert_eq!(world.drain_messages()[0], "Welcome to Miniquest!");
    }

    #[test]
    fn test_fight_without_enemies() {
        let mut world = test_world(ScriptedDice::default());
        assert_eq!(world.handle_player_choice("Fight"), NextState::AreaDescription);
        assert!(world
            .drain_messages()
            .contains(&"There are no enemies here to fight...".to_string()));
    }

    #[test]
    fn test_invalid_free_action() {
        let mut world = test_world(ScriptedDice::default());
        world.drain_messages();
        assert_eq!(world.handle_player_choice("Dance"), NextState::AreaDescription);
        assert_eq!(
            world.drain_messages(),
            vec![
                "You chose: Dance".to_string(),
                "'Dance' is not a valid action or you cannot do that here.".to_string()
            ]
        );
    }

    #[test]
    fn test_camp_commands_need_camp() {
        let mut world = test_world(ScriptedDice::default());
        world.handle_player_choice("Travel");
        world.handle_player_choice("Old road");
        assert_eq!(world.current_area(), "Old road");
        assert!(!world.is_at_camp());
        assert_eq!(world.location_options(), ["Fight", "Travel", "Rest"]);
        assert_eq!(
            world.handle_player_choice("Equip Rusty sword"),
            NextState::AreaDescription
        );
        assert_eq!(world.handle_player_choice("Prepare"), NextState::AreaDescription);
    }

    #[test]
    fn test_save_refused_outside_free_play() {
        let mut world = test_world(ScriptedDice::default());
        world.handle_player_choice("Travel");
        let dir = tempfile::tempdir().unwrap();
        assert!(matches!(
            world.save_to(dir.path().join("x.json")),
            Err(PersistError::NotAllowed(_))
        ));
    }
}

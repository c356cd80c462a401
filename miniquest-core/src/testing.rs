//! Testing utilities.
//!
//! - [`ScriptedDice`] for deterministic rolls
//! - fixtures for a player, content and a ready world

use crate::character_builder::CharacterBuilder;
use crate::config::WorldConfig;
use crate::content::GameContent;
use crate::dice::Dice;
use crate::entity::Entity;
use crate::world::World;
use std::collections::VecDeque;

/// Dice that return queued values in order.
///
/// A degenerate range (`high <= low`) returns `low` without consuming a
/// value. Queued values are clamped into the requested range, and an empty
/// queue yields the low end.
#[derive(Debug, Clone, Default)]
pub struct ScriptedDice {
    queue: VecDeque<i32>,
}

impl ScriptedDice {
    pub fn new(values: impl IntoIterator<Item = i32>) -> Self {
        Self {
            queue: values.into_iter().collect(),
        }
    }

    pub fn push(&mut self, value: i32) {
        self.queue.push_back(value);
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }
}

impl Dice for ScriptedDice {
    fn roll_range(&mut self, low: i32, high: i32) -> i32 {
        if high <= low {
            return low;
        }
        match self.queue.pop_front() {
            Some(value) => value.clamp(low, high),
            None => low,
        }
    }
}

/// The builtin content.
pub fn test_content() -> GameContent {
    GameContent::builtin()
}

/// A plain level 1 player with 3/3/3 stats and no abilities.
pub fn test_player() -> Entity {
    Entity::new("Tester", 3.0, 3.0, 3.0, 1).as_player()
}

/// A new world with a Warrior named "Tester" at the default start.
pub fn test_world(dice: ScriptedDice) -> World {
    test_world_with(WorldConfig::default(), dice)
}

pub fn test_world_with(config: WorldConfig, dice: ScriptedDice) -> World {
    let content = test_content();
    let player = CharacterBuilder::new()
        .name("Tester")
        .background("Warrior")
        .build(&content, &config)
        .unwrap_or_else(|_| test_player());
    World::new(player, content, config, Box::new(dice))
}

//! Player character creation.
//!
//! A character is a name plus a background. The background fixes the
//! starting stats and abilities and decides how the character grows.

use crate::abilities::AbilityDef;
use crate::config::WorldConfig;
use crate::content::{Background, GameContent};
use crate::entity::{AbilityUnlock, Entity, Progression};
use crate::inventory::Inventory;
use thiserror::Error;

/// Name used when the player leaves it blank.
pub const DEFAULT_NAME: &str = "Nameless Adventurer";

/// Error from character building.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BuilderError {
    #[error("Background selection is required")]
    MissingBackground,

    #[error("Unknown background '{0}'")]
    UnknownBackground(String),

    #[error("Background '{background}' references unknown ability '{ability}'")]
    UnknownAbility { background: String, ability: String },
}

/// Step-by-step player creation.
#[derive(Debug, Clone, Default)]
pub struct CharacterBuilder {
    name: Option<String>,
    background: Option<String>,
}

impl CharacterBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    pub fn background(mut self, background: impl Into<String>) -> Self {
        self.background = Some(background.into());
        self
    }

    /// Build the player entity, resolving the background and its abilities
    /// against `content`.
    pub fn build(self, content: &GameContent, config: &WorldConfig) -> Result<Entity, BuilderError> {
        let name = self
            .name
            .map(|n| n.trim().to_string())
            .filter(|n| !n.is_empty())
            .unwrap_or_else(|| DEFAULT_NAME.to_string());
        let background_name = self.background.ok_or(BuilderError::MissingBackground)?;
        let background = content
            .background(&background_name)
            .ok_or_else(|| BuilderError::UnknownBackground(background_name.clone()))?;

        let resolve = |id: &str| -> Result<AbilityDef, BuilderError> {
            content
                .ability(id)
                .cloned()
                .ok_or_else(|| BuilderError::UnknownAbility {
                    background: background.name.clone(),
                    ability: id.to_string(),
                })
        };

        let abilities = background
            .abilities
            .iter()
            .map(|id| resolve(id))
            .collect::<Result<Vec<_>, _>>()?;
        let unlocks = background
            .ability_unlocks
            .iter()
            .map(|u| {
                resolve(&u.ability).map(|ability| AbilityUnlock {
                    level: u.level,
                    ability,
                })
            })
            .collect::<Result<Vec<_>, _>>()?;

        let inventory = Inventory::new(config.carry_capacity.clone(), config.max_trinkets);
        Ok(player_from_background(name, background, abilities, unlocks, inventory))
    }
}

fn player_from_background(
    name: String,
    background: &Background,
    abilities: Vec<AbilityDef>,
    unlocks: Vec<AbilityUnlock>,
    inventory: Inventory,
) -> Entity {
    Entity::new(name, background.attack, background.defense, background.speed, 1)
        .as_player()
        .with_inventory(inventory)
        .with_abilities(abilities)
        .with_progression(Progression {
            background: background.name.clone(),
            stat_gains: background.stat_gains,
            unlocks,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_build_warrior() {
        let content = GameContent::builtin();
        let hero = CharacterBuilder::new()
            .name("Thorin")
            .background("warrior")
            .build(&content, &WorldConfig::default())
            .unwrap();
        assert!(hero.is_player);
        assert_eq!(hero.name, "Thorin");
        assert_eq!(hero.base_attack, 5.0);
        // battle_hardened adds a point of defense
        assert_eq!(hero.defense(), 5.0);
        assert_eq!(hero.current_health, hero.max_health);
        let progression = hero.progression.as_ref().unwrap();
        assert_eq!(progression.background, "Warrior");
        assert_eq!(progression.unlocks[0].ability.id, "rallying_cry");
    }

    #[test]
    fn test_blank_name_defaults() {
        let content = GameContent::builtin();
        let hero = CharacterBuilder::new()
            .name("   ")
            .background("Scholar")
            .build(&content, &WorldConfig::default())
            .unwrap();
        assert_eq!(hero.name, DEFAULT_NAME);
        assert!(hero.progression.unwrap().stat_gains.is_none());
    }

    #[test]
    fn test_errors() {
        let content = GameContent::builtin();
        let config = WorldConfig::default();
        assert_eq!(
            CharacterBuilder::new().name("A").build(&content, &config).unwrap_err(),
            BuilderError::MissingBackground
        );
        assert_eq!(
            CharacterBuilder::new()
                .background("Bard")
                .build(&content, &config)
                .unwrap_err(),
            BuilderError::UnknownBackground("Bard".into())
        );
    }

    #[test]
    fn test_capacities_come_from_config() {
        let content = GameContent::builtin();
        let config = WorldConfig::default().with_max_trinkets(3);
        let hero = CharacterBuilder::new()
            .background("Rogue")
            .build(&content, &config)
            .unwrap();
        assert_eq!(hero.inventory.max_trinkets(), 3);
        assert!(hero.has_first_strike());
    }
}

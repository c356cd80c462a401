//! Save and load.
//!
//! Saves are JSON. Items, abilities and backgrounds are stored by name and
//! resolved against the loaded content on restore, so a save made with one
//! content set can only be loaded where those names still exist.

use crate::config::WorldConfig;
use crate::content::GameContent;
use crate::day_cycle::DayCycle;
use crate::dice::Dice;
use crate::entity::{AbilityUnlock, Entity, Progression};
use crate::inventory::{Equipped, Inventory};
use crate::items::{Item, ItemKind};
use crate::world::World;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;
use uuid::Uuid;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Save references unknown {kind} '{name}'")]
    UnknownReference { kind: &'static str, name: String },

    #[error("{0}")]
    NotAllowed(String),
}

/// Current save file version.
pub const SAVE_VERSION: u32 = 1;

/// A saved game.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedGame {
    /// Format version, checked against [`SAVE_VERSION`] on load.
    pub version: u32,

    /// Seconds since the Unix epoch.
    pub saved_at: String,

    /// Fresh for every write.
    pub save_id: Uuid,

    /// Listing summary, readable without parsing `state`.
    pub metadata: SaveMetadata,

    /// The game itself.
    pub state: WorldSnapshot,
}

/// Summary shown in save listings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub character_name: String,

    #[serde(default)]
    pub background: Option<String>,

    pub level: u32,

    /// Area the player stood in when saving.
    pub location: String,

    /// Hour of the saved day.
    pub hour: u32,

    /// Duplicated from the parent for peek access.
    #[serde(default)]
    pub saved_at: String,
}

impl SavedGame {
    pub fn new(state: WorldSnapshot) -> Self {
        let saved_at = chrono_now();
        let metadata = SaveMetadata {
            character_name: state.player.name.clone(),
            background: state.player.background.clone(),
            level: state.player.level,
            location: state.current_area.clone(),
            hour: state.day.hour,
            saved_at: saved_at.clone(),
        };
        Self {
            version: SAVE_VERSION,
            saved_at,
            save_id: Uuid::new_v4(),
            metadata,
            state,
        }
    }

    pub fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = std::fs::read_to_string(path)?;
        let saved: Self = serde_json::from_str(&content)?;
        check_version(saved.version)?;
        Ok(saved)
    }

    /// Read only the metadata of a save file.
    pub fn peek_metadata(path: impl AsRef<Path>) -> Result<SaveMetadata, PersistError> {
        let content = std::fs::read_to_string(path)?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: SaveMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;
        check_version(partial.version)?;
        Ok(partial.metadata)
    }
}

fn check_version(found: u32) -> Result<(), PersistError> {
    if found == SAVE_VERSION {
        Ok(())
    } else {
        Err(PersistError::VersionMismatch {
            expected: SAVE_VERSION,
            found,
        })
    }
}

/// A save file found on disk.
#[derive(Debug, Clone)]
pub struct SaveInfo {
    pub path: PathBuf,
    pub metadata: SaveMetadata,
}

/// List readable saves in `dir`, sorted by character name. Creates `dir`
/// if missing.
pub fn list_saves(dir: impl AsRef<Path>) -> Result<Vec<SaveInfo>, PersistError> {
    let dir = dir.as_ref();
    std::fs::create_dir_all(dir)?;

    let mut saves = Vec::new();
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if path.extension().is_some_and(|e| e == "json") {
            if let Ok(metadata) = SavedGame::peek_metadata(&path) {
                saves.push(SaveInfo { path, metadata });
            }
        }
    }
    saves.sort_by(|a, b| {
        a.metadata
            .character_name
            .cmp(&b.metadata.character_name)
            .then_with(|| a.path.cmp(&b.path))
    });
    Ok(saves)
}

/// Save file path for a character name.
pub fn save_path(base_dir: impl AsRef<Path>, name: &str) -> PathBuf {
    let sanitized = name
        .trim()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>();
    let sanitized = if sanitized.is_empty() {
        "save".to_string()
    } else {
        sanitized
    };
    base_dir.as_ref().join(format!("{sanitized}.json"))
}

/// Seconds since the Unix epoch.
fn chrono_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", now.as_secs())
}

// ============================================================================
// Snapshots
// ============================================================================

/// Everything needed to resume free play.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorldSnapshot {
    pub player: EntitySnapshot,
    /// Must name a location in the loaded content.
    pub current_area: String,
    /// Must name a location in the loaded content.
    pub camp: String,
    pub day: DayCycle,
}

/// Persisted player state. Derived stats are informational only and are
/// rebuilt on restore.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EntitySnapshot {
    pub name: String,
    pub level: u32,
    pub target: i32,
    pub base_attack: f64,
    pub base_defense: f64,
    pub base_speed: f64,
    pub health_bonus: i32,
    pub current_health: i32,
    pub current_weave: i32,
    /// Ability ids, resolved against content on restore.
    pub abilities: Vec<String>,
    /// Background name; its unlock table is rebuilt from content.
    pub background: Option<String>,
    pub inventory: InventorySnapshot,

    #[serde(default)]
    pub attack_mod: f64,
    #[serde(default)]
    pub defense_mod: f64,
    #[serde(default)]
    pub speed_mod: f64,
    #[serde(default)]
    pub max_health: i32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct InventorySnapshot {
    pub held: Option<String>,
    pub body: Option<String>,
    pub trinkets: Vec<String>,
    pub carried: Vec<String>,
    pub strongbox: Vec<String>,
    pub owned: Vec<String>,
    pub discarded: usize,
    pub capacities: BTreeMap<ItemKind, usize>,
    pub max_trinkets: usize,
    pub income: i32,
}

fn names(items: &[Item]) -> Vec<String> {
    items.iter().map(|i| i.name.clone()).collect()
}

impl InventorySnapshot {
    pub fn capture(inventory: &Inventory) -> Self {
        let equipped = inventory.equipped();
        Self {
            held: equipped.held.as_ref().map(|i| i.name.clone()),
            body: equipped.body.as_ref().map(|i| i.name.clone()),
            trinkets: names(&equipped.trinkets),
            carried: names(inventory.carried()),
            strongbox: names(inventory.strongbox()),
            owned: inventory.owned().to_vec(),
            discarded: inventory.discarded(),
            capacities: inventory.capacities().clone(),
            max_trinkets: inventory.max_trinkets(),
            income: inventory.income(),
        }
    }

    fn restore(&self, content: &GameContent) -> Result<Inventory, PersistError> {
        let item = |name: &String| {
            content
                .item(name)
                .cloned()
                .ok_or_else(|| PersistError::UnknownReference {
                    kind: "item",
                    name: name.clone(),
                })
        };
        let all = |list: &[String]| list.iter().map(item).collect::<Result<Vec<_>, _>>();

        let equipped = Equipped {
            held: self.held.as_ref().map(item).transpose()?,
            body: self.body.as_ref().map(item).transpose()?,
            trinkets: all(&self.trinkets)?,
        };
        Ok(Inventory::from_parts(
            equipped,
            all(&self.carried)?,
            all(&self.strongbox)?,
            self.owned.clone(),
            self.discarded,
            self.capacities.clone(),
            self.max_trinkets,
            self.income,
        ))
    }
}

impl EntitySnapshot {
    pub fn capture(entity: &Entity) -> Self {
        Self {
            name: entity.name.clone(),
            level: entity.level,
            target: entity.target,
            base_attack: entity.base_attack,
            base_defense: entity.base_defense,
            base_speed: entity.base_speed,
            health_bonus: entity.health_bonus,
            current_health: entity.current_health,
            current_weave: entity.current_weave,
            abilities: entity.abilities.iter().map(|a| a.id.clone()).collect(),
            background: entity.progression.as_ref().map(|p| p.background.clone()),
            inventory: InventorySnapshot::capture(&entity.inventory),
            attack_mod: entity.attack_mod,
            defense_mod: entity.defense_mod,
            speed_mod: entity.speed_mod,
            max_health: entity.max_health,
        }
    }

    /// Rebuild the player, resolving names against `content`.
    pub fn restore(&self, content: &GameContent) -> Result<Entity, PersistError> {
        let ability = |id: &str| {
            content
                .ability(id)
                .cloned()
                .ok_or_else(|| PersistError::UnknownReference {
                    kind: "ability",
                    name: id.to_string(),
                })
        };
        let abilities = self
            .abilities
            .iter()
            .map(|id| ability(id))
            .collect::<Result<Vec<_>, _>>()?;

        let progression = match &self.background {
            None => None,
            Some(name) => {
                let background =
                    content
                        .background(name)
                        .ok_or_else(|| PersistError::UnknownReference {
                            kind: "background",
                            name: name.clone(),
                        })?;
                let unlocks = background
                    .ability_unlocks
                    .iter()
                    .map(|u| {
                        ability(&u.ability).map(|ability| AbilityUnlock {
                            level: u.level,
                            ability,
                        })
                    })
                    .collect::<Result<Vec<_>, _>>()?;
                Some(Progression {
                    background: background.name.clone(),
                    stat_gains: background.stat_gains,
                    unlocks,
                })
            }
        };

        let mut entity = Entity::new(
            self.name.clone(),
            self.base_attack,
            self.base_defense,
            self.base_speed,
            self.level,
        )
        .as_player();
        entity.target = self.target;
        entity.health_bonus = self.health_bonus;
        entity.abilities = abilities;
        entity.inventory = self.inventory.restore(content)?;
        entity.progression = progression;
        entity.current_health = self.current_health;
        entity.current_weave = self.current_weave;
        entity.recompute_stats();
        Ok(entity)
    }
}

impl WorldSnapshot {
    pub fn capture(player: &Entity, current_area: &str, camp: &str, day: &DayCycle) -> Self {
        Self {
            player: EntitySnapshot::capture(player),
            current_area: current_area.to_string(),
            camp: camp.to_string(),
            day: day.clone(),
        }
    }

    /// Rebuild a world in free play.
    pub fn restore(
        &self,
        content: GameContent,
        config: WorldConfig,
        dice: Box<dyn Dice>,
    ) -> Result<World, PersistError> {
        for area in [&self.current_area, &self.camp] {
            if content.location(area).is_none() {
                return Err(PersistError::UnknownReference {
                    kind: "location",
                    name: area.clone(),
                });
            }
        }
        let player = self.player.restore(&content)?;
        Ok(World::from_snapshot_parts(
            player,
            self.current_area.clone(),
            self.camp.clone(),
            self.day.clone(),
            content,
            config,
            dice,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::test_player;
    use tempfile::TempDir;

    fn snapshot() -> WorldSnapshot {
        let player = test_player();
        WorldSnapshot::capture(&player, "Lastholm", "Lastholm", &DayCycle::default())
    }

    #[test]
    fn test_save_path_is_sanitized() {
        let path = save_path("saves", "Sir Bob/../x");
        assert_eq!(path, PathBuf::from("saves/Sir_Bob____x.json"));
        assert_eq!(save_path("saves", "  "), PathBuf::from("saves/save.json"));
    }

    #[test]
    fn test_save_and_peek() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("hero.json");
        let saved = SavedGame::new(snapshot());
        saved.save_json(&path).unwrap();

        let metadata = SavedGame::peek_metadata(&path).unwrap();
        assert_eq!(metadata.character_name, "Tester");
        assert_eq!(metadata.location, "Lastholm");
        assert_eq!(metadata, saved.metadata);

        let loaded = SavedGame::load_json(&path).unwrap();
        assert_eq!(loaded.save_id, saved.save_id);
        assert_eq!(loaded.state, saved.state);
    }

    #[test]
    fn test_version_mismatch() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("old.json");
        let mut saved = SavedGame::new(snapshot());
        saved.version = 99;
        saved.save_json(&path).unwrap();
        assert!(matches!(
            SavedGame::load_json(&path),
            Err(PersistError::VersionMismatch {
                expected: 1,
                found: 99
            })
        ));
    }

    #[test]
    fn test_list_saves_skips_garbage() {
        let dir = TempDir::new().unwrap();
        SavedGame::new(snapshot())
            .save_json(dir.path().join("b.json"))
            .unwrap();
        std::fs::write(dir.path().join("a.json"), "not json").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "hi").unwrap();

        let saves = list_saves(dir.path()).unwrap();
        assert_eq!(saves.len(), 1);
        assert!(saves[0].path.ends_with("b.json"));
    }

    #[test]
    fn test_list_saves_creates_dir() {
        let dir = TempDir::new().unwrap();
        let nested = dir.path().join("nested");
        assert!(list_saves(&nested).unwrap().is_empty());
        assert!(nested.is_dir());
    }

    #[test]
    fn test_unknown_item_on_restore() {
        let mut snap = snapshot();
        snap.player.inventory.strongbox.push("Moon blade".into());
        let err = snap.player.restore(&GameContent::builtin()).unwrap_err();
        assert!(matches!(
            err,
            PersistError::UnknownReference { kind: "item", ref name } if name == "Moon blade"
        ));
    }
}

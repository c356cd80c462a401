//! World configuration.

use crate::day_cycle::{DEFAULT_EXHAUSTION_HOUR, DEFAULT_NIGHT_MODIFIER, DEFAULT_NIGHT_START_HOUR};
use crate::inventory::{default_capacities, DEFAULT_MAX_TRINKETS};
use crate::items::ItemKind;
use crate::messages::DEFAULT_CAPACITY;
use crate::persist::PersistError;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Where the player starts and first makes camp.
pub const DEFAULT_STARTING_LOCATION: &str = "Lastholm";

/// Visiting a key location makes the mapped location the player's camp.
/// Locations not listed leave the current camp unchanged.
pub fn default_camp_map() -> BTreeMap<String, String> {
    [
        ("Lastholm", "Lastholm"),
        ("Aethelwood", "Aethelwood"),
        ("Scorlends", "Scorlends"),
        ("Shadowsun", "Shadowsun"),
        ("Shadowed residential blocks", "Broken hearth"),
        ("Petrified grove", "Quiet glade"),
        ("Scavenger's ridge", "Iron spring"),
        ("Magma veins", "Last anvil"),
    ]
    .into_iter()
    .map(|(location, camp)| (location.to_string(), camp.to_string()))
    .collect()
}

/// Tunables for a [`World`](crate::world::World). Every field has a
/// default, so a config file only needs the keys it changes.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WorldConfig {
    /// Lines kept in the message log before the oldest are dropped.
    pub message_log_capacity: usize,

    /// Maximum carried items per kind. Kinds not listed are unlimited.
    pub carry_capacity: BTreeMap<ItemKind, usize>,

    /// Trinkets that can be worn at once.
    pub max_trinkets: usize,

    /// Hour at which the day ends and the player is sent to camp.
    pub exhaustion_hour: u32,
    /// First hour of night. Enemies spawned from then on are empowered.
    pub night_start_hour: u32,
    /// Multiplier applied to enemy attack and defense at night.
    pub night_modifier: f64,

    /// Where a new character begins.
    pub starting_location: String,
    /// Camp assigned to a new character.
    pub starting_camp: String,

    /// Location name to camp name.
    pub camp_map: BTreeMap<String, String>,

    /// Directory for save files.
    pub save_dir: PathBuf,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            message_log_capacity: DEFAULT_CAPACITY,
            carry_capacity: default_capacities(),
            max_trinkets: DEFAULT_MAX_TRINKETS,
            exhaustion_hour: DEFAULT_EXHAUSTION_HOUR,
            night_start_hour: DEFAULT_NIGHT_START_HOUR,
            night_modifier: DEFAULT_NIGHT_MODIFIER,
            starting_location: DEFAULT_STARTING_LOCATION.to_string(),
            starting_camp: DEFAULT_STARTING_LOCATION.to_string(),
            camp_map: default_camp_map(),
            save_dir: PathBuf::from("saves"),
        }
    }
}

impl WorldConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Read a (possibly partial) JSON config file.
    pub fn from_json_file(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    pub fn with_message_log_capacity(mut self, capacity: usize) -> Self {
        self.message_log_capacity = capacity;
        self
    }

    pub fn with_carry_capacity(mut self, kind: ItemKind, capacity: usize) -> Self {
        self.carry_capacity.insert(kind, capacity);
        self
    }

    pub fn with_max_trinkets(mut self, max: usize) -> Self {
        self.max_trinkets = max;
        self
    }

    pub fn with_exhaustion_hour(mut self, hour: u32) -> Self {
        self.exhaustion_hour = hour;
        self
    }

    pub fn with_night_start_hour(mut self, hour: u32) -> Self {
        self.night_start_hour = hour;
        self
    }

    pub fn with_night_modifier(mut self, modifier: f64) -> Self {
        self.night_modifier = modifier;
        self
    }

    pub fn with_starting_location(mut self, location: impl Into<String>) -> Self {
        self.starting_location = location.into();
        self
    }

    pub fn with_starting_camp(mut self, camp: impl Into<String>) -> Self {
        self.starting_camp = camp.into();
        self
    }

    pub fn with_camp(mut self, location: impl Into<String>, camp: impl Into<String>) -> Self {
        self.camp_map.insert(location.into(), camp.into());
        self
    }

    pub fn with_save_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.save_dir = dir.into();
        self
    }

    /// Camp assigned by visiting `location`, if any.
    pub fn camp_for(&self, location: &str) -> Option<&str> {
        self.camp_map.get(location).map(String::as_str)
    }
}

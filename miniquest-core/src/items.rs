//! Item templates.
//!
//! Items are immutable templates loaded once from the content catalog.
//! Inventories hold clones; two items are the same item iff their names
//! match, which is what the ownership and loot-uniqueness rules rely on.

use crate::content::ContentError;
use crate::inventory::EquipSlot;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Spawn tag meaning "may drop anywhere".
pub const GLOBAL_SPAWN: &str = "global";

/// The five item categories.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemKind {
    Weapon,
    Armor,
    Crafting,
    Wealth,
    Trinket,
}

impl ItemKind {
    pub const ALL: [ItemKind; 5] = [
        ItemKind::Weapon,
        ItemKind::Armor,
        ItemKind::Crafting,
        ItemKind::Wealth,
        ItemKind::Trinket,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            ItemKind::Weapon => "weapon",
            ItemKind::Armor => "armor",
            ItemKind::Crafting => "crafting",
            ItemKind::Wealth => "wealth",
            ItemKind::Trinket => "trinket",
        }
    }

    /// Slot this kind can be equipped into, if any.
    pub fn slot(&self) -> Option<EquipSlot> {
        match self {
            ItemKind::Weapon => Some(EquipSlot::Held),
            ItemKind::Armor => Some(EquipSlot::Body),
            ItemKind::Trinket => Some(EquipSlot::Trinket),
            ItemKind::Crafting | ItemKind::Wealth => None,
        }
    }
}

impl fmt::Display for ItemKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ItemKind {
    type Err = ContentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let lower = s.trim().to_lowercase();
        ItemKind::ALL
            .into_iter()
            .find(|kind| kind.name() == lower)
            .ok_or_else(|| ContentError::UnknownItemKind(s.to_string()))
    }
}

/// Type-dependent stat block.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ItemStats {
    /// Weapons, armor and crafting materials.
    Gear {
        damage: i32,
        mitigation: i32,
        finesse: i32,
    },
    Trinket {
        attack: i32,
        defense: i32,
        speed: i32,
    },
    Wealth {
        worth: i32,
    },
}

impl ItemStats {
    pub fn gear(damage: i32, mitigation: i32, finesse: i32) -> Self {
        ItemStats::Gear {
            damage,
            mitigation,
            finesse,
        }
    }

    pub fn trinket(attack: i32, defense: i32, speed: i32) -> Self {
        ItemStats::Trinket {
            attack,
            defense,
            speed,
        }
    }

    pub fn wealth(worth: i32) -> Self {
        ItemStats::Wealth { worth }
    }

    fn fits(&self, kind: ItemKind) -> bool {
        matches!(
            (kind, self),
            (
                ItemKind::Weapon | ItemKind::Armor | ItemKind::Crafting,
                ItemStats::Gear { .. }
            ) | (ItemKind::Trinket, ItemStats::Trinket { .. })
                | (ItemKind::Wealth, ItemStats::Wealth { .. })
        )
    }
}

/// An item template.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Item {
    /// Unique across the catalog; lookups ignore case.
    pub name: String,
    pub kind: ItemKind,
    /// Flavor text shown when the item is found.
    pub description: String,
    /// Stat block, always matching `kind`.
    pub stats: ItemStats,
    /// Areas where the item can drop, or just `"global"`.
    pub spawn_locations: Vec<String>,
    /// Optional reference for front ends that draw icons.
    pub icon: Option<String>,
}

impl Item {
    /// Build a validated item. The stat block must match the kind.
    pub fn new(
        name: impl Into<String>,
        kind: ItemKind,
        stats: ItemStats,
    ) -> Result<Self, ContentError> {
        let name = name.into();
        let trimmed = name.trim();
        if trimmed.is_empty() {
            return Err(ContentError::Invalid("item with an empty name".to_string()));
        }
        if !stats.fits(kind) {
            return Err(ContentError::Invalid(format!(
                "item '{trimmed}' is a {kind} but carries a mismatched stat block"
            )));
        }
        Ok(Self {
            name: trimmed.to_string(),
            kind,
            description: String::new(),
            stats,
            spawn_locations: vec![GLOBAL_SPAWN.to_string()],
            icon: None,
        })
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Restrict spawning to the given areas. An empty list means global.
    pub fn with_spawn_locations(mut self, locations: Vec<String>) -> Self {
        self.spawn_locations = if locations.is_empty() {
            vec![GLOBAL_SPAWN.to_string()]
        } else {
            locations
        };
        self
    }

    pub fn with_icon(mut self, icon: impl Into<String>) -> Self {
        self.icon = Some(icon.into());
        self
    }

    pub fn is_global(&self) -> bool {
        self.spawn_locations.len() == 1 && self.spawn_locations[0] == GLOBAL_SPAWN
    }

    /// Whether this item may drop in `area`.
    pub fn spawns_in(&self, area: &str) -> bool {
        self.is_global() || self.spawn_locations.iter().any(|loc| loc == area)
    }

    pub fn is_equipable(&self) -> bool {
        self.kind.slot().is_some()
    }

    pub fn worth(&self) -> i32 {
        match self.stats {
            ItemStats::Wealth { worth } => worth,
            _ => 0,
        }
    }

    /// Coarse description of a wealth item's value.
    pub fn appraise(&self) -> &'static str {
        match self.worth() {
            w if w <= 0 => "worthless",
            1 => "low",
            2..=3 => "moderate",
            4..=5 => "high",
            6..=9 => "very high",
            10..=13 => "extremely high",
            _ => "priceless",
        }
    }

    /// One-line summary of the stat block.
    pub fn summary(&self) -> String {
        match self.stats {
            ItemStats::Gear {
                damage,
                mitigation,
                finesse,
            } if self.kind != ItemKind::Crafting => format!(
                "{} ({}): Damage +{damage}, Mitigation +{mitigation}, Finesse +{finesse}",
                self.name, self.kind
            ),
            ItemStats::Gear { .. } => format!(
                "{} ({}): This can be used to improve weapons or armor.",
                self.name, self.kind
            ),
            ItemStats::Trinket {
                attack,
                defense,
                speed,
            } => format!(
                "{} ({}): Attack +{attack}, Defense +{defense}, Speed +{speed}",
                self.name, self.kind
            ),
            ItemStats::Wealth { .. } => format!(
                "{} ({}): Appraised as having {} value.",
                self.name,
                self.kind,
                self.appraise()
            ),
        }
    }
}

impl PartialEq for Item {
    fn eq(&self, other: &Self) -> bool {
        self.name == other.name
    }
}

impl Eq for Item {}

impl fmt::Display for Item {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)
    }
}

//! Static game content: locations, enemies, items, backgrounds, abilities
//! and lore.
//!
//! A [`ContentCatalog`] produces raw records. [`GameContent`] validates
//! them once at startup and serves lookups for the rest of the session.
//! Two catalogs ship with the crate: [`BuiltinContent`] (compiled-in
//! tables) and [`JsonContent`] (one JSON file per record on disk).

use crate::abilities::{AbilityDef, AbilityEffect, AbilityKind, ConditionKind, Stat};
use crate::dice::DiceExpr;
use crate::entity::{Entity, StatGains};
use crate::items::{Item, ItemKind, ItemStats, GLOBAL_SPAWN};
use crate::loot::LootTable;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::{debug, warn};

/// Errors raised while loading or validating content.
#[derive(Debug, Error)]
pub enum ContentError {
    #[error("Content directory not found: {0}")]
    MissingDirectory(PathBuf),

    #[error("Failed to read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Malformed record {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Unknown item type: {0}")]
    UnknownItemKind(String),

    #[error("Unknown {kind} '{name}'")]
    UnknownReference { kind: &'static str, name: String },

    #[error("Invalid content: {0}")]
    Invalid(String),
}

// ============================================================================
// Records
// ============================================================================

/// A node of the travel graph.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Location {
    pub name: String,
    #[serde(default)]
    pub description: String,
    /// Names of directly reachable locations, in menu order.
    #[serde(default)]
    pub connections: Vec<String>,
    /// Enemy template names that can spawn here. Empty means a safe area.
    #[serde(default)]
    pub enemies: Vec<String>,
}

impl Location {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            connections: Vec::new(),
            enemies: Vec::new(),
        }
    }

    pub fn with_connections(mut self, connections: &[&str]) -> Self {
        self.connections = connections.iter().map(|c| c.to_string()).collect();
        self
    }

    pub fn with_enemies(mut self, enemies: &[&str]) -> Self {
        self.enemies = enemies.iter().map(|e| e.to_string()).collect();
        self
    }

    /// Case-insensitive lookup of a connection, returning its canonical name.
    pub fn connection(&self, name: &str) -> Option<&str> {
        let name = name.trim();
        self.connections
            .iter()
            .find(|c| c.eq_ignore_ascii_case(name))
            .map(String::as_str)
    }
}

/// Immutable enemy stat block, cloned into a fresh [`Entity`] per encounter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnemyTemplate {
    pub name: String,
    /// Per-level attack; scaled by `level` at spawn.
    pub attack: f64,
    /// Per-level defense; scaled by `level` at spawn.
    pub defense: f64,
    /// Per-level speed; scaled by `level` at spawn.
    pub speed: f64,
    #[serde(default = "default_level")]
    pub level: u32,
    /// Ability ids. Active ones are used on the enemy's turn.
    #[serde(default)]
    pub abilities: Vec<String>,
}

fn default_level() -> u32 {
    1
}

impl EnemyTemplate {
    pub fn new(name: impl Into<String>, attack: f64, defense: f64, speed: f64, level: u32) -> Self {
        Self {
            name: name.into(),
            attack,
            defense,
            speed,
            level,
            abilities: Vec::new(),
        }
    }

    pub fn with_abilities(mut self, abilities: &[&str]) -> Self {
        self.abilities = abilities.iter().map(|a| a.to_string()).collect();
        self
    }
}

/// On-disk item shape; the stat map is interpreted by `type`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ItemRecord {
    pub name: String,
    /// One of weapon, armor, crafting, trinket or wealth.
    #[serde(rename = "type")]
    pub kind: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub stats: BTreeMap<String, i32>,
    #[serde(default)]
    pub spawn_locations: Vec<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

impl TryFrom<ItemRecord> for Item {
    type Error = ContentError;

    fn try_from(record: ItemRecord) -> Result<Self, Self::Error> {
        let kind: ItemKind = record.kind.parse()?;
        let stat = |key: &str| record.stats.get(key).copied().unwrap_or(0);
        let stats = match kind {
            ItemKind::Weapon | ItemKind::Armor | ItemKind::Crafting => {
                ItemStats::gear(stat("damage"), stat("mitigation"), stat("finesse"))
            }
            ItemKind::Trinket => ItemStats::trinket(stat("attack"), stat("defense"), stat("speed")),
            ItemKind::Wealth => ItemStats::wealth(stat("worth")),
        };
        let mut item = Item::new(record.name, kind, stats)?
            .with_description(record.description)
            .with_spawn_locations(record.spawn_locations);
        item.icon = record.icon;
        Ok(item)
    }
}

/// `{ "level": 3, "ability": "rallying_cry" }`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnlockRecord {
    pub level: u32,
    pub ability: String,
}

/// A starting archetype for new characters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Background {
    pub name: String,
    #[serde(default)]
    pub description: String,

    /// Starting attack.
    pub attack: f64,
    /// Starting defense.
    pub defense: f64,
    /// Starting speed.
    pub speed: f64,

    /// Ability ids known from level 1.
    #[serde(default)]
    pub abilities: Vec<String>,

    /// Growth per level. Omit to use volatile growth.
    #[serde(default)]
    pub stat_gains: Option<StatGains>,

    /// Abilities learned at later levels.
    #[serde(default)]
    pub ability_unlocks: Vec<UnlockRecord>,
}

/// A lore entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GrimoireEntry {
    /// Grouping heading, such as "Places".
    pub category: String,
    pub title: String,
    /// The lore text.
    pub content: String,
}

impl GrimoireEntry {
    pub fn new(category: &str, title: &str, content: &str) -> Self {
        Self {
            category: category.to_string(),
            title: title.to_string(),
            content: content.to_string(),
        }
    }
}

// ============================================================================
// Catalogs
// ============================================================================

/// Source of raw content records.
pub trait ContentCatalog {
    fn locations(&self) -> Vec<Location>;
    fn enemies(&self) -> Vec<EnemyTemplate>;
    fn items(&self) -> Vec<Item>;
    fn backgrounds(&self) -> Vec<Background>;
    fn abilities(&self) -> Vec<AbilityDef>;

    fn grimoire(&self) -> Vec<GrimoireEntry> {
        Vec::new()
    }
}

/// Content compiled into the binary.
#[derive(Debug, Clone, Copy, Default)]
pub struct BuiltinContent;

impl ContentCatalog for BuiltinContent {
    fn locations(&self) -> Vec<Location> {
        LOCATIONS.clone()
    }

    fn enemies(&self) -> Vec<EnemyTemplate> {
        ENEMIES.clone()
    }

    fn items(&self) -> Vec<Item> {
        ITEMS.clone()
    }

    fn backgrounds(&self) -> Vec<Background> {
        BACKGROUNDS.clone()
    }

    fn abilities(&self) -> Vec<AbilityDef> {
        ABILITIES.clone()
    }

    fn grimoire(&self) -> Vec<GrimoireEntry> {
        GRIMOIRE.clone()
    }
}

/// Content read from a directory tree of JSON records.
#[derive(Debug, Default)]
pub struct JsonContent {
    pub locations: Vec<Location>,
    pub enemies: Vec<EnemyTemplate>,
    pub items: Vec<Item>,
    pub backgrounds: Vec<Background>,
    pub abilities: Vec<AbilityDef>,
    pub grimoire: Vec<GrimoireEntry>,
    /// Records that were skipped.
    pub errors: Vec<ContentError>,
}

impl JsonContent {
    /// Load every `*.json` record under `dir/{locations,enemies,items,
    /// backgrounds,abilities,grimoire}`. Bad records are skipped and kept in
    /// `errors`; only a missing root directory fails the whole load.
    pub fn load_dir(dir: impl AsRef<Path>) -> Result<Self, ContentError> {
        let dir = dir.as_ref();
        if !dir.is_dir() {
            return Err(ContentError::MissingDirectory(dir.to_path_buf()));
        }

        let mut content = Self::default();
        content.locations = read_records(&dir.join("locations"), &mut content.errors);
        content.enemies = read_records(&dir.join("enemies"), &mut content.errors);
        content.backgrounds = read_records(&dir.join("backgrounds"), &mut content.errors);
        content.abilities = read_records(&dir.join("abilities"), &mut content.errors);
        content.grimoire = read_records(&dir.join("grimoire"), &mut content.errors);

        let records: Vec<(PathBuf, ItemRecord)> =
            read_records_with_paths(&dir.join("items"), &mut content.errors);
        for (path, record) in records {
            match Item::try_from(record) {
                Ok(item) => content.items.push(item),
                Err(err) => {
                    warn!(path = %path.display(), error = %err, "skipping item");
                    content.errors.push(err);
                }
            }
        }

        debug!(
            locations = content.locations.len(),
            enemies = content.enemies.len(),
            items = content.items.len(),
            skipped = content.errors.len(),
            "content directory loaded"
        );
        Ok(content)
    }
}

fn read_records<T: DeserializeOwned>(dir: &Path, errors: &mut Vec<ContentError>) -> Vec<T> {
    read_records_with_paths(dir, errors)
        .into_iter()
        .map(|(_, record)| record)
        .collect()
}

fn read_records_with_paths<T: DeserializeOwned>(
    dir: &Path,
    errors: &mut Vec<ContentError>,
) -> Vec<(PathBuf, T)> {
    let entries = match fs::read_dir(dir) {
        Ok(entries) => entries,
        Err(_) => {
            debug!(dir = %dir.display(), "no records directory");
            return Vec::new();
        }
    };

    let mut paths: Vec<PathBuf> = entries
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.extension().is_some_and(|ext| ext == "json"))
        .collect();
    paths.sort();

    let mut records = Vec::new();
    for path in paths {
        let parsed = fs::read_to_string(&path)
            .map_err(|source| ContentError::Io {
                path: path.clone(),
                source,
            })
            .and_then(|text| {
                serde_json::from_str::<T>(&text).map_err(|source| ContentError::Json {
                    path: path.clone(),
                    source,
                })
            });
        match parsed {
            Ok(record) => records.push((path, record)),
            Err(err) => {
                warn!(error = %err, "skipping content record");
                errors.push(err);
            }
        }
    }
    records
}

impl ContentCatalog for JsonContent {
    fn locations(&self) -> Vec<Location> {
        self.locations.clone()
    }

    fn enemies(&self) -> Vec<EnemyTemplate> {
        self.enemies.clone()
    }

    fn items(&self) -> Vec<Item> {
        self.items.clone()
    }

    fn backgrounds(&self) -> Vec<Background> {
        self.backgrounds.clone()
    }

    fn abilities(&self) -> Vec<AbilityDef> {
        self.abilities.clone()
    }

    fn grimoire(&self) -> Vec<GrimoireEntry> {
        self.grimoire.clone()
    }
}

// ============================================================================
// Validated content
// ============================================================================

/// Validated, indexed content shared by the whole session.
#[derive(Debug, Clone, Default)]
pub struct GameContent {
    locations: Vec<Location>,
    enemies: Vec<EnemyTemplate>,
    items: Vec<Item>,
    backgrounds: Vec<Background>,
    abilities: BTreeMap<String, AbilityDef>,
    grimoire: Vec<GrimoireEntry>,
}

impl GameContent {
    /// The compiled-in content.
    pub fn builtin() -> Self {
        // The builtin tables are known to contain locations.
        Self::from_catalog(&BuiltinContent).unwrap_or_default()
    }

    /// Validate a catalog. Invalid records are logged and skipped; a
    /// catalog with no locations at all is an error.
    pub fn from_catalog(catalog: &dyn ContentCatalog) -> Result<Self, ContentError> {
        let mut abilities = BTreeMap::new();
        for ability in catalog.abilities() {
            match ability.validate() {
                Ok(()) => {
                    abilities.insert(ability.id.clone(), ability);
                }
                Err(err) => warn!(error = %err, "skipping ability"),
            }
        }

        let mut locations: Vec<Location> = Vec::new();
        for location in catalog.locations() {
            if locations.iter().any(|l| l.name == location.name) {
                warn!(location = %location.name, "duplicate location ignored");
                continue;
            }
            locations.push(location);
        }
        if locations.is_empty() {
            return Err(ContentError::Invalid("catalog has no locations".to_string()));
        }

        let enemies = catalog
            .enemies()
            .into_iter()
            .map(|mut enemy| {
                enemy.abilities.retain(|id| {
                    let known = abilities.contains_key(id);
                    if !known {
                        warn!(enemy = %enemy.name, ability = %id, "unknown enemy ability dropped");
                    }
                    known
                });
                enemy
            })
            .collect();

        let mut items: Vec<Item> = Vec::new();
        for item in catalog.items() {
            if items.contains(&item) {
                warn!(item = %item.name, "duplicate item ignored");
                continue;
            }
            items.push(item);
        }

        let mut grimoire = catalog.grimoire();
        grimoire.sort_by_key(|entry| (entry.category.to_lowercase(), entry.title.to_lowercase()));

        Ok(Self {
            locations,
            enemies,
            items,
            backgrounds: catalog.backgrounds(),
            abilities,
            grimoire,
        })
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn location(&self, name: &str) -> Option<&Location> {
        self.locations.iter().find(|l| l.name == name)
    }

    pub fn enemy(&self, name: &str) -> Option<&EnemyTemplate> {
        self.enemies.iter().find(|e| e.name == name)
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Exact name match, falling back to case-insensitive.
    pub fn item(&self, name: &str) -> Option<&Item> {
        self.items
            .iter()
            .find(|i| i.name == name)
            .or_else(|| self.items.iter().find(|i| i.name.eq_ignore_ascii_case(name)))
    }

    pub fn backgrounds(&self) -> &[Background] {
        &self.backgrounds
    }

    pub fn background(&self, name: &str) -> Option<&Background> {
        let name = name.trim();
        self.backgrounds
            .iter()
            .find(|b| b.name.eq_ignore_ascii_case(name))
    }

    pub fn ability(&self, id: &str) -> Option<&AbilityDef> {
        self.abilities.get(id)
    }

    /// Lore entries sorted by category, then title.
    pub fn grimoire(&self) -> &[GrimoireEntry] {
        &self.grimoire
    }

    pub fn loot_table(&self) -> LootTable {
        LootTable::new(self.items.clone())
    }

    /// A fresh enemy built from its template, or `None` if unknown.
    pub fn create_enemy(&self, name: &str) -> Option<Entity> {
        let template = self.enemy(name)?;
        let abilities = template
            .abilities
            .iter()
            .filter_map(|id| self.ability(id).cloned())
            .collect();
        Some(
            Entity::new(
                template.name.clone(),
                template.attack,
                template.defense,
                template.speed,
                template.level,
            )
            .with_abilities(abilities),
        )
    }
}

// ============================================================================
// Builtin tables
// ============================================================================

fn item(name: &str, kind: ItemKind, stats: ItemStats, spawns: &[&str], description: &str) -> Item {
    Item {
        name: name.to_string(),
        kind,
        description: description.to_string(),
        stats,
        spawn_locations: if spawns.is_empty() {
            vec![GLOBAL_SPAWN.to_string()]
        } else {
            spawns.iter().map(|s| s.to_string()).collect()
        },
        icon: Some(format!("{}.png", name.to_lowercase().replace(' ', "_"))),
    }
}

fn unlock(level: u32, ability: &str) -> UnlockRecord {
    UnlockRecord {
        level,
        ability: ability.to_string(),
    }
}

lazy_static::lazy_static! {
    /// The world map.
    pub static ref LOCATIONS: Vec<Location> = vec![
        Location::new(
            "Lastholm",
            "The last walled town before the wilds. Lanterns burn along the palisade and the gate is always watched.",
        )
        .with_connections(&["Old road", "Aethelwood", "Scorlends", "Shadowsun"]),
        Location::new(
            "Old road",
            "Cracked flagstones wind between toppled milestones. Travellers rarely walk it alone.",
        )
        .with_connections(&["Lastholm", "Shadowed residential blocks"])
        .with_enemies(&["Bandit", "Wolf"]),
        Location::new(
            "Shadowed residential blocks",
            "Empty houses lean against each other. Something shuffles behind the shutters.",
        )
        .with_connections(&["Old road", "Broken hearth"])
        .with_enemies(&["Ghoul", "Rat swarm"]),
        Location::new(
            "Broken hearth",
            "A half-collapsed inn whose great fireplace still draws. Survivors keep a strongbox here.",
        )
        .with_connections(&["Shadowed residential blocks"]),
        Location::new(
            "Aethelwood",
            "Old trees with silver bark crowd the path. The air hums faintly.",
        )
        .with_connections(&["Lastholm", "Petrified grove"])
        .with_enemies(&["Wolf", "Dryad husk"]),
        Location::new(
            "Petrified grove",
            "Trees turned to grey stone mid-sway. Splinters of rock crunch underfoot.",
        )
        .with_connections(&["Aethelwood", "Quiet glade"])
        .with_enemies(&["Dryad husk"]),
        Location::new(
            "Quiet glade",
            "A ring of living grass where no wind blows. A good place to rest.",
        )
        .with_connections(&["Petrified grove"]),
        Location::new(
            "Scorlends",
            "Scorched plains of ash and glass. Heat ripples over everything.",
        )
        .with_connections(&["Lastholm", "Scavenger's ridge", "Magma veins"])
        .with_enemies(&["Scavenger", "Ember wight"]),
        Location::new(
            "Scavenger's ridge",
            "A spine of scrap heaps picked over by desperate hands.",
        )
        .with_connections(&["Scorlends", "Iron spring"])
        .with_enemies(&["Scavenger"]),
        Location::new(
            "Iron spring",
            "Rust-red water bubbles from the rock. A lean-to shelters a locked chest.",
        )
        .with_connections(&["Scavenger's ridge"]),
        Location::new(
            "Magma veins",
            "Glowing seams split the ground. Things crawl in the light.",
        )
        .with_connections(&["Scorlends", "Last anvil"])
        .with_enemies(&["Magma crawler", "Ember wight"]),
        Location::new(
            "Last anvil",
            "A forge built over a lava vent, tended by no one you can see.",
        )
        .with_connections(&["Magma veins"]),
        Location::new(
            "Shadowsun",
            "Beneath a sun that gives no warmth, long shadows move on their own.",
        )
        .with_connections(&["Lastholm"])
        .with_enemies(&["Ghoul", "Ember wight"]),
    ];

    /// Enemy stat blocks.
    pub static ref ENEMIES: Vec<EnemyTemplate> = vec![
        EnemyTemplate::new("Bandit", 2.0, 1.0, 3.0, 1),
        EnemyTemplate::new("Wolf", 2.0, 1.0, 4.0, 1),
        EnemyTemplate::new("Rat swarm", 1.0, 1.0, 5.0, 1),
        EnemyTemplate::new("Ghoul", 3.0, 2.0, 2.0, 2).with_abilities(&["poisoned_blade"]),
        EnemyTemplate::new("Dryad husk", 2.0, 3.0, 1.0, 2),
        EnemyTemplate::new("Scavenger", 3.0, 2.0, 3.0, 2),
        EnemyTemplate::new("Ember wight", 3.0, 2.0, 3.0, 3).with_abilities(&["first_strike"]),
        EnemyTemplate::new("Magma crawler", 4.0, 4.0, 1.0, 3),
    ];

    /// Item templates.
    pub static ref ITEMS: Vec<Item> = vec![
        item("Rusty sword", ItemKind::Weapon, ItemStats::gear(2, 0, 1), &[],
            "Pitted and dull, but it still has an edge."),
        item("Hunter's bow", ItemKind::Weapon, ItemStats::gear(3, 0, 2), &["Aethelwood", "Old road"],
            "A short bow of silver-barked wood."),
        item("Tattered cloth", ItemKind::Armor, ItemStats::gear(0, 1, 0), &[],
            "Layers of rags. Better than nothing."),
        item("Leather jerkin", ItemKind::Armor, ItemStats::gear(0, 2, 1), &["Old road", "Shadowed residential blocks"],
            "Supple leather stitched with care."),
        item("Scale mail", ItemKind::Armor, ItemStats::gear(0, 4, 0), &["Scorlends", "Magma veins"],
            "Overlapping plates scavenged from the ash."),
        item("Iron ingot", ItemKind::Crafting, ItemStats::gear(0, 0, 0), &["Scavenger's ridge", "Magma veins"],
            "A bar of good iron, ready for the forge."),
        item("Grove seed", ItemKind::Crafting, ItemStats::gear(0, 0, 0), &["Petrified grove"],
            "A stone seed that is warm to the touch."),
        item("Silver locket", ItemKind::Wealth, ItemStats::wealth(3), &[],
            "A tarnished locket with a faded portrait."),
        item("Gold ring", ItemKind::Wealth, ItemStats::wealth(8), &["Shadowed residential blocks", "Shadowsun"],
            "Heavy, plain and unmistakably gold."),
        item("Wolf fang charm", ItemKind::Trinket, ItemStats::trinket(1, 0, 1), &["Old road", "Aethelwood"],
            "A fang on a leather thong. It makes you feel quicker."),
        item("Ashen idol", ItemKind::Trinket, ItemStats::trinket(0, 2, 0), &["Scorlends", "Shadowsun"],
            "A small figure carved from compacted ash."),
    ];

    /// Ability definitions.
    pub static ref ABILITIES: Vec<AbilityDef> = vec![
        AbilityDef::new("first_strike", "First Strike", AbilityKind::Passive, AbilityEffect::FirstStrike)
            .with_description("Always acts first in combat."),
        AbilityDef::new("volatile_stat_gain", "Volatile Growth", AbilityKind::PassiveLeveling, AbilityEffect::VolatileStatGain)
            .with_description("On level up one random stat grows sharply."),
        AbilityDef::new(
            "battle_hardened",
            "Battle Hardened",
            AbilityKind::Passive,
            AbilityEffect::StatBonus { stat: Stat::Defense, flat: 1.0, percent: 0.0 },
        )
        .with_description("Years of fighting have toughened your hide."),
        AbilityDef::new(
            "thick_skin",
            "Thick Skin",
            AbilityKind::Passive,
            AbilityEffect::StatBonus { stat: Stat::Defense, flat: 0.0, percent: 25.0 },
        )
        .with_description("Defense grows by a quarter of its base."),
        AbilityDef::new(
            "arcane_insight",
            "Arcane Insight",
            AbilityKind::Passive,
            AbilityEffect::StatBonus { stat: Stat::Attack, flat: 1.0, percent: 10.0 },
        )
        .with_description("Understanding the weave sharpens every blow."),
        AbilityDef::new(
            "rallying_cry",
            "Rallying Cry",
            AbilityKind::ActiveCombat,
            AbilityEffect::Empower { stat: Stat::Attack, amount: 2.0, duration: 3 },
        )
        .with_weave_cost(2)
        .with_description("A shout that steadies your arm."),
        AbilityDef::new(
            "poisoned_blade",
            "Poisoned Blade",
            AbilityKind::ActiveCombat,
            AbilityEffect::Inflict { condition: ConditionKind::Poisoned, duration: 3, potency: 1 },
        )
        .with_weave_cost(2)
        .with_description("A coated edge that keeps hurting."),
        AbilityDef::new(
            "ember",
            "Ember",
            AbilityKind::ActiveCombat,
            AbilityEffect::Inflict { condition: ConditionKind::Burning, duration: 2, potency: 2 },
        )
        .with_weave_cost(2)
        .with_description("Sets the target alight."),
        AbilityDef::new(
            "second_wind",
            "Second Wind",
            AbilityKind::ActiveCombat,
            AbilityEffect::Heal { dice: DiceExpr { count: 1, sides: 4, modifier: 1 } },
        )
        .with_weave_cost(2)
        .with_description("Catch your breath mid-fight."),
    ];

    /// Starting archetypes.
    pub static ref BACKGROUNDS: Vec<Background> = vec![
        Background {
            name: "Warrior".to_string(),
            description: "Trained with blade and shield.".to_string(),
            attack: 5.0,
            defense: 4.0,
            speed: 2.0,
            abilities: vec!["battle_hardened".to_string()],
            stat_gains: Some(StatGains { attack: 1.0, defense: 1.0, speed: 0.5, health: 2.0 }),
            ability_unlocks: vec![unlock(3, "rallying_cry")],
        },
        Background {
            name: "Rogue".to_string(),
            description: "Quick hands and quicker feet.".to_string(),
            attack: 4.0,
            defense: 2.0,
            speed: 5.0,
            abilities: vec!["first_strike".to_string()],
            stat_gains: Some(StatGains { attack: 1.0, defense: 0.5, speed: 1.0, health: 1.0 }),
            ability_unlocks: vec![unlock(2, "poisoned_blade")],
        },
        Background {
            name: "Scholar".to_string(),
            description: "Reads the weave where others see only air.".to_string(),
            attack: 3.0,
            defense: 3.0,
            speed: 3.0,
            abilities: vec!["volatile_stat_gain".to_string(), "ember".to_string()],
            stat_gains: None,
            ability_unlocks: vec![unlock(3, "arcane_insight")],
        },
        Background {
            name: "Survivor".to_string(),
            description: "Hard to kill, harder to keep down.".to_string(),
            attack: 3.0,
            defense: 5.0,
            speed: 2.0,
            abilities: vec!["second_wind".to_string()],
            stat_gains: Some(StatGains { attack: 0.5, defense: 1.0, speed: 0.5, health: 3.0 }),
            ability_unlocks: vec![unlock(4, "thick_skin")],
        },
    ];

    /// Lore.
    pub static ref GRIMOIRE: Vec<GrimoireEntry> = vec![
        GrimoireEntry::new("Places", "Lastholm", "Founded by those who refused to leave when the roads went dark."),
        GrimoireEntry::new("Places", "Aethelwood", "The silver trees are said to remember every traveller."),
        GrimoireEntry::new("Creatures", "Ember wight", "Ash given shape by old grudges. It strikes before you see it."),
        GrimoireEntry::new("Creatures", "Ghoul", "Its claws carry a rot that lingers in the blood."),
        GrimoireEntry::new("Lore", "The weave", "The thread of power that scholars pull to bend the world."),
    ];
}

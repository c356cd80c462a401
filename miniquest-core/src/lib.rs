//! Rules engine for Miniquest, a small text RPG.
//!
//! This crate provides:
//! - Characters with derived stats, inventory, abilities and leveling
//! - Turn-based single-enemy combat and loot
//! - A day/night clock, travel and camps
//! - Content loading from built-in tables or a JSON directory
//! - JSON save files
//!
//! # Quick Start
//!
//! ```
//! use miniquest_core::{CharacterBuilder, GameContent, RngDice, World, WorldConfig};
//!
//! let builder = CharacterBuilder::new().name("Thorin").background("Warrior");
//! let mut world = World::create(
//!     builder,
//!     GameContent::builtin(),
//!     WorldConfig::default(),
//!     Box::new(RngDice::seeded(7)),
//! )
//! .unwrap();
//!
//! let next = world.handle_player_choice("Travel");
//! assert_eq!(next.as_str(), "travel_options");
//! for line in world.drain_messages() {
//!     println!("{line}");
//! }
//! ```

pub mod abilities;
pub mod character_builder;
pub mod combat;
pub mod config;
pub mod content;
pub mod day_cycle;
pub mod dice;
pub mod entity;
pub mod inventory;
pub mod items;
pub mod loot;
pub mod messages;
pub mod persist;
pub mod testing;
pub mod world;

// Primary public API
pub use character_builder::{BuilderError, CharacterBuilder};
pub use config::WorldConfig;
pub use content::{ContentCatalog, ContentError, GameContent, JsonContent};
pub use dice::{Dice, RngDice};
pub use entity::Entity;
pub use persist::{list_saves, PersistError, SavedGame};
pub use world::{Mode, NextState, World};

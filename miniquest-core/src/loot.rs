//! Loot drops.

use crate::dice::Dice;
use crate::inventory::Inventory;
use crate::items::{Item, ItemKind};
use tracing::debug;

/// Every droppable item template.
#[derive(Debug, Clone, Default)]
pub struct LootTable {
    items: Vec<Item>,
}

impl LootTable {
    pub fn new(items: Vec<Item>) -> Self {
        Self { items }
    }

    pub fn items(&self) -> &[Item] {
        &self.items
    }

    /// Candidates for `area`, minus trinkets the owner has ever held.
    pub fn eligible<'a>(&'a self, area: &'a str, owner: &'a Inventory) -> impl Iterator<Item = &'a Item> + 'a {
        self.items
            .iter()
            .filter(move |item| item.spawns_in(area))
            .filter(move |item| item.kind != ItemKind::Trinket || !owner.has_owned(&item.name))
    }

    /// Pick a drop for `area`, or `None` when nothing is eligible.
    pub fn get_drop(&self, area: &str, owner: &Inventory, dice: &mut dyn Dice) -> Option<Item> {
        let pool: Vec<&Item> = self.eligible(area, owner).collect();
        if pool.is_empty() {
            debug!(area, "no eligible loot");
            return None;
        }
        let drop = pool[dice.choose_index(pool.len())].clone();
        debug!(area, item = %drop.name, pool = pool.len(), "loot rolled");
        Some(drop)
    }
}

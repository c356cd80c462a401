//! Equipped slots, capacity-limited carried items and the camp strongbox.

use crate::items::{Item, ItemKind, ItemStats};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Default number of trinkets that can be worn at once.
pub const DEFAULT_MAX_TRINKETS: usize = 2;

/// Default carried-item limits. Armor is not capped.
pub fn default_capacities() -> BTreeMap<ItemKind, usize> {
    BTreeMap::from([
        (ItemKind::Weapon, 1),
        (ItemKind::Crafting, 3),
        (ItemKind::Wealth, 5),
        (ItemKind::Trinket, 2),
    ])
}

/// Rule violations. All of them leave the inventory unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum InventoryError {
    #[error("You cannot carry any more {kind} items (limit {capacity}).")]
    CapacityReached { kind: ItemKind, capacity: usize },

    #[error("You cannot equip {0}.")]
    NotEquipable(String),

    #[error("There is no {item} in your {place}.")]
    NotFound { item: String, place: ItemSource },

    #[error("You must unequip {0} before dropping it.")]
    CannotDropEquipped(String),

    #[error("{0} is already equipped.")]
    AlreadyEquipped(String),

    #[error("You are not using {0}.")]
    NotEquipped(String),

    #[error("No merchant will pay for {0}.")]
    NotWealth(String),
}

/// Where an item currently sits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ItemSource {
    Carried,
    Strongbox,
    Equipped,
}

impl fmt::Display for ItemSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ItemSource::Carried => "pack",
            ItemSource::Strongbox => "strongbox",
            ItemSource::Equipped => "equipment",
        })
    }
}

/// Equipment slots.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EquipSlot {
    Held,
    Body,
    Trinket,
}

/// What is currently worn.
#[derive(Debug, Clone, Default)]
pub struct Equipped {
    /// The weapon slot.
    pub held: Option<Item>,
    /// The armor slot.
    pub body: Option<Item>,
    /// Oldest first.
    pub trinkets: Vec<Item>,
}

impl Equipped {
    pub fn iter(&self) -> impl Iterator<Item = &Item> {
        self.held
            .iter()
            .chain(self.body.iter())
            .chain(self.trinkets.iter())
    }

    pub fn count(&self) -> usize {
        self.iter().count()
    }
}

/// Aggregate stat contribution of equipped items.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatModifiers {
    /// Raw weapon and armor damage. Halved when folded into an entity.
    pub damage: i32,
    /// Raw mitigation, halved likewise.
    pub mitigation: i32,
    /// Raw finesse, halved likewise.
    pub finesse: i32,
    /// Trinket attack, applied in full.
    pub attack: i32,
    /// Trinket defense, applied in full.
    pub defense: i32,
    /// Trinket speed, applied in full.
    pub speed: i32,
}

/// Result of a successful equip.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EquipOutcome {
    /// Name of the item now worn.
    pub equipped: String,
    pub slot: EquipSlot,
    /// Item pushed out of the slot into the strongbox.
    pub displaced: Option<String>,
}

/// A character's belongings.
#[derive(Debug, Clone)]
pub struct Inventory {
    equipped: Equipped,
    carried: Vec<Item>,
    strongbox: Vec<Item>,
    owned: Vec<String>,
    discarded: usize,
    capacities: BTreeMap<ItemKind, usize>,
    max_trinkets: usize,
    income: i32,
}

impl Default for Inventory {
    fn default() -> Self {
        Self::new(default_capacities(), DEFAULT_MAX_TRINKETS)
    }
}

fn same_name(item: &Item, name: &str) -> bool {
    item.name.eq_ignore_ascii_case(name.trim())
}

impl Inventory {
    pub fn new(capacities: BTreeMap<ItemKind, usize>, max_trinkets: usize) -> Self {
        Self {
            equipped: Equipped::default(),
            carried: Vec::new(),
            strongbox: Vec::new(),
            owned: Vec::new(),
            discarded: 0,
            capacities,
            max_trinkets: max_trinkets.max(1),
            income: 0,
        }
    }

    /// Reassemble an inventory from persisted parts.
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn from_parts(
        equipped: Equipped,
        carried: Vec<Item>,
        strongbox: Vec<Item>,
        owned: Vec<String>,
        discarded: usize,
        capacities: BTreeMap<ItemKind, usize>,
        max_trinkets: usize,
        income: i32,
    ) -> Self {
        Self {
            equipped,
            carried,
            strongbox,
            owned,
            discarded,
            capacities,
            max_trinkets: max_trinkets.max(1),
            income,
        }
    }

    // ========================================================================
    // Accessors
    // ========================================================================

    pub fn equipped(&self) -> &Equipped {
        &self.equipped
    }

    pub fn carried(&self) -> &[Item] {
        &self.carried
    }

    pub fn strongbox(&self) -> &[Item] {
        &self.strongbox
    }

    /// Every item ever acquired, by name, in acquisition order.
    pub fn owned(&self) -> &[String] {
        &self.owned
    }

    pub fn has_owned(&self, name: &str) -> bool {
        self.owned.iter().any(|owned| owned == name)
    }

    /// Items intentionally removed (dropped or sold).
    pub fn discarded(&self) -> usize {
        self.discarded
    }

    pub fn capacities(&self) -> &BTreeMap<ItemKind, usize> {
        &self.capacities
    }

    pub fn max_trinkets(&self) -> usize {
        self.max_trinkets
    }

    pub fn income(&self) -> i32 {
        self.income
    }

    pub fn add_income(&mut self, amount: i32) {
        self.income += amount;
    }

    /// Items held anywhere: equipped, carried or in the strongbox.
    pub fn item_count(&self) -> usize {
        self.equipped.count() + self.carried.len() + self.strongbox.len()
    }

    pub fn carried_count(&self, kind: ItemKind) -> usize {
        self.carried.iter().filter(|item| item.kind == kind).count()
    }

    pub fn is_equipped(&self, name: &str) -> bool {
        self.equipped.iter().any(|item| same_name(item, name))
    }

    /// Look up an item by case-insensitive name.
    pub fn find(&self, name: &str, source: ItemSource) -> Option<&Item> {
        match source {
            ItemSource::Carried => self.carried.iter().find(|i| same_name(i, name)),
            ItemSource::Strongbox => self.strongbox.iter().find(|i| same_name(i, name)),
            ItemSource::Equipped => self.equipped.iter().find(|i| same_name(i, name)),
        }
    }

    /// First non-equipped location holding `name`, carried before strongbox.
    pub fn locate_stored(&self, name: &str) -> Option<ItemSource> {
        [ItemSource::Carried, ItemSource::Strongbox]
            .into_iter()
            .find(|source| self.find(name, *source).is_some())
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Whether another item of this kind fits in the pack.
    pub fn can_carry_item(&self, item: &Item) -> bool {
        match self.capacities.get(&item.kind) {
            Some(&capacity) => self.carried_count(item.kind) < capacity,
            None => true,
        }
    }

    /// Pick up an item into the pack and record it as owned.
    pub fn add_to_stored_items(&mut self, item: Item) -> Result<(), InventoryError> {
        if !self.can_carry_item(&item) {
            return Err(InventoryError::CapacityReached {
                kind: item.kind,
                capacity: self.capacities.get(&item.kind).copied().unwrap_or(0),
            });
        }
        self.owned.push(item.name.clone());
        self.carried.push(item);
        Ok(())
    }

    fn take_from(&mut self, name: &str, source: ItemSource) -> Result<Item, InventoryError> {
        let list = match source {
            ItemSource::Carried => &mut self.carried,
            ItemSource::Strongbox => &mut self.strongbox,
            ItemSource::Equipped => {
                return Err(InventoryError::NotFound {
                    item: name.to_string(),
                    place: source,
                })
            }
        };
        let index = list
            .iter()
            .position(|item| same_name(item, name))
            .ok_or_else(|| InventoryError::NotFound {
                item: name.to_string(),
                place: source,
            })?;
        Ok(list.remove(index))
    }

    /// Equip an item from the pack or the strongbox.
    ///
    /// Whatever occupied the slot goes to the strongbox. A full trinket
    /// row evicts its oldest trinket to the strongbox first.
    pub fn equip_item(
        &mut self,
        name: &str,
        source: ItemSource,
    ) -> Result<EquipOutcome, InventoryError> {
        if source == ItemSource::Equipped {
            return Err(InventoryError::AlreadyEquipped(name.to_string()));
        }
        let candidate = self.find(name, source).ok_or_else(|| InventoryError::NotFound {
            item: name.to_string(),
            place: source,
        })?;
        let Some(slot) = candidate.kind.slot() else {
            return Err(InventoryError::NotEquipable(candidate.name.clone()));
        };
        if slot == EquipSlot::Trinket
            && self
                .equipped
                .trinkets
                .iter()
                .any(|t| same_name(t, &candidate.name))
        {
            return Err(InventoryError::AlreadyEquipped(candidate.name.clone()));
        }

        let item = self.take_from(name, source)?;
        let equipped = item.name.clone();
        let displaced = match slot {
            EquipSlot::Held => self.equipped.held.replace(item),
            EquipSlot::Body => self.equipped.body.replace(item),
            EquipSlot::Trinket => {
                let evicted = if self.equipped.trinkets.len() >= self.max_trinkets {
                    Some(self.equipped.trinkets.remove(0))
                } else {
                    None
                };
                self.equipped.trinkets.push(item);
                evicted
            }
        };
        let displaced = displaced.map(|old| {
            let name = old.name.clone();
            self.strongbox.push(old);
            name
        });

        Ok(EquipOutcome {
            equipped,
            slot,
            displaced,
        })
    }

    /// Take an equipped item off and put it in the strongbox.
    pub fn unequip(&mut self, name: &str) -> Result<Item, InventoryError> {
        let removed = if self.equipped.held.as_ref().is_some_and(|i| same_name(i, name)) {
            self.equipped.held.take()
        } else if self.equipped.body.as_ref().is_some_and(|i| same_name(i, name)) {
            self.equipped.body.take()
        } else {
            self.equipped
                .trinkets
                .iter()
                .position(|i| same_name(i, name))
                .map(|index| self.equipped.trinkets.remove(index))
        };
        let item = removed.ok_or_else(|| InventoryError::NotEquipped(name.to_string()))?;
        self.strongbox.push(item.clone());
        Ok(item)
    }

    /// Throw an item away for good.
    pub fn drop_item(&mut self, name: &str, source: ItemSource) -> Result<Item, InventoryError> {
        if source == ItemSource::Equipped
            || (self.find(name, source).is_none() && self.is_equipped(name))
        {
            return Err(InventoryError::CannotDropEquipped(name.to_string()));
        }
        let item = self.take_from(name, source)?;
        self.discarded += 1;
        Ok(item)
    }

    /// Sell a wealth item, returning the worth added to income.
    pub fn sell(&mut self, name: &str, source: ItemSource) -> Result<i32, InventoryError> {
        let item = self.find(name, source).ok_or_else(|| {
            if self.is_equipped(name) {
                InventoryError::NotWealth(name.to_string())
            } else {
                InventoryError::NotFound {
                    item: name.to_string(),
                    place: source,
                }
            }
        })?;
        let ItemStats::Wealth { worth } = item.stats else {
            return Err(InventoryError::NotWealth(item.name.clone()));
        };
        self.take_from(name, source)?;
        self.discarded += 1;
        self.income += worth;
        Ok(worth)
    }

    /// Move everything in the pack to the strongbox. Returns how many moved.
    pub fn transfer_carried_to_strongbox(&mut self) -> usize {
        let moved = self.carried.len();
        self.strongbox.append(&mut self.carried);
        moved
    }

    /// Sum the stat contributions of equipped items.
    ///
    /// Held and body items supply damage, mitigation and finesse; trinkets
    /// supply attack, defense and speed.
    pub fn get_stat_modifiers(&self) -> StatModifiers {
        let mut mods = StatModifiers::default();
        for item in self.equipped.held.iter().chain(self.equipped.body.iter()) {
            if let ItemStats::Gear {
                damage,
                mitigation,
                finesse,
            } = item.stats
            {
                mods.damage += damage;
                mods.mitigation += mitigation;
                mods.finesse += finesse;
            }
        }
        for trinket in &self.equipped.trinkets {
            if let ItemStats::Trinket {
                attack,
                defense,
                speed,
            } = trinket.stats
            {
                mods.attack += attack;
                mods.defense += defense;
                mods.speed += speed;
            }
        }
        mods
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::items::ItemStats;

    fn weapon(name: &str, damage: i32) -> Item {
        Item::new(name, ItemKind::Weapon, ItemStats::gear(damage, 0, 1)).unwrap()
    }

    fn trinket(name: &str) -> Item {
        Item::new(name, ItemKind::Trinket, ItemStats::trinket(1, 1, 1)).unwrap()
    }

    fn coin(name: &str, worth: i32) -> Item {
        Item::new(name, ItemKind::Wealth, ItemStats::wealth(worth)).unwrap()
    }

    fn conserved(inv: &Inventory) -> bool {
        inv.item_count() + inv.discarded() == inv.owned().len()
    }

    #[test]
    fn test_weapon_capacity_rejects_extras() {
        let mut inv = Inventory::default();
        let results: Vec<_> = ["Axe", "Sword", "Mace", "Spear"]
            .iter()
            .map(|name| inv.add_to_stored_items(weapon(name, 2)))
            .collect();
        assert_eq!(inv.carried_count(ItemKind::Weapon), 1);
        assert_eq!(results.iter().filter(|r| r.is_err()).count(), 3);
        assert_eq!(
            results[1],
            Err(InventoryError::CapacityReached {
                kind: ItemKind::Weapon,
                capacity: 1
            })
        );
        assert_eq!(inv.owned(), ["Axe"]);
    }

    #[test]
    fn test_uncapped_kind_always_fits() {
        let mut inv = Inventory::default();
        for i in 0..10 {
            let armor =
                Item::new(format!("Mail {i}"), ItemKind::Armor, ItemStats::gear(0, 1, 0)).unwrap();
            inv.add_to_stored_items(armor).unwrap();
        }
        assert_eq!(inv.carried().len(), 10);
    }

    #[test]
    fn test_equip_displaces_to_strongbox() {
        let mut inv = Inventory::default();
        inv.add_to_stored_items(weapon("Axe", 2)).unwrap();
        inv.equip_item("axe", ItemSource::Carried).unwrap();
        inv.add_to_stored_items(weapon("Sword", 4)).unwrap();

        let outcome = inv.equip_item("Sword", ItemSource::Carried).unwrap();
        assert_eq!(outcome.displaced.as_deref(), Some("Axe"));
        assert_eq!(inv.equipped().held.as_ref().unwrap().name, "Sword");
        assert_eq!(inv.strongbox()[0].name, "Axe");
        assert!(conserved(&inv));
    }

    #[test]
    fn test_trinket_fifo_eviction() {
        let mut inv = Inventory::new(default_capacities(), 2);
        for name in ["First", "Second"] {
            inv.add_to_stored_items(trinket(name)).unwrap();
            inv.equip_item(name, ItemSource::Carried).unwrap();
        }
        inv.add_to_stored_items(trinket("Third")).unwrap();
        let outcome = inv.equip_item("Third", ItemSource::Carried).unwrap();

        assert_eq!(outcome.displaced.as_deref(), Some("First"));
        let names: Vec<_> = inv.equipped().trinkets.iter().map(|t| t.name.as_str()).collect();
        assert_eq!(names, ["Second", "Third"]);
        assert!(inv.find("First", ItemSource::Strongbox).is_some());
    }

    #[test]
    fn test_equip_failures_leave_state() {
        let mut inv = Inventory::default();
        inv.add_to_stored_items(coin("Ring", 3)).unwrap();
        assert_eq!(
            inv.equip_item("Ring", ItemSource::Carried),
            Err(InventoryError::NotEquipable("Ring".into()))
        );
        assert!(matches!(
            inv.equip_item("Ring", ItemSource::Strongbox),
            Err(InventoryError::NotFound { .. })
        ));
        assert_eq!(inv.carried().len(), 1);
    }

    #[test]
    fn test_drop_equipped_rejected() {
        let mut inv = Inventory::default();
        inv.add_to_stored_items(weapon("Axe", 2)).unwrap();
        inv.equip_item("Axe", ItemSource::Carried).unwrap();
        assert_eq!(
            inv.drop_item("Axe", ItemSource::Carried),
            Err(InventoryError::CannotDropEquipped("Axe".into()))
        );
        inv.unequip("Axe").unwrap();
        inv.drop_item("Axe", ItemSource::Strongbox).unwrap();
        assert_eq!(inv.item_count(), 0);
        assert!(conserved(&inv));
    }

    #[test]
    fn test_sell_adds_income() {
        let mut inv = Inventory::default();
        inv.add_to_stored_items(coin("Gold ring", 7)).unwrap();
        inv.add_to_stored_items(weapon("Axe", 1)).unwrap();
        assert_eq!(inv.sell("Gold ring", ItemSource::Carried), Ok(7));
        assert_eq!(inv.income(), 7);
        assert_eq!(
            inv.sell("Axe", ItemSource::Carried),
            Err(InventoryError::NotWealth("Axe".into()))
        );
        assert!(conserved(&inv));
    }

    #[test]
    fn test_transfer_to_strongbox() {
        let mut inv = Inventory::default();
        inv.add_to_stored_items(weapon("Axe", 1)).unwrap();
        inv.add_to_stored_items(coin("Coin", 1)).unwrap();
        assert_eq!(inv.transfer_carried_to_strongbox(), 2);
        assert!(inv.carried().is_empty());
        assert_eq!(inv.strongbox().len(), 2);
        // pack space is free again
        assert!(inv.can_carry_item(&weapon("Sword", 1)));
    }

    #[test]
    fn test_stat_modifiers_sum() {
        let mut inv = Inventory::default();
        inv.add_to_stored_items(weapon("Axe", 3)).unwrap();
        inv.equip_item("Axe", ItemSource::Carried).unwrap();
        let armor = Item::new("Mail", ItemKind::Armor, ItemStats::gear(0, 2, 1)).unwrap();
        inv.add_to_stored_items(armor).unwrap();
        inv.equip_item("Mail", ItemSource::Carried).unwrap();
        for name in ["A", "B"] {
            inv.add_to_stored_items(trinket(name)).unwrap();
            inv.equip_item(name, ItemSource::Carried).unwrap();
        }
        assert_eq!(
            inv.get_stat_modifiers(),
            StatModifiers {
                damage: 3,
                mitigation: 2,
                finesse: 2,
                attack: 2,
                defense: 2,
                speed: 2,
            }
        );
    }
}

//! Property tests for the rules that must hold for any input.

use miniquest_core::combat::Combat;
use miniquest_core::day_cycle::DayCycle;
use miniquest_core::inventory::{default_capacities, Inventory, ItemSource};
use miniquest_core::items::{Item, ItemKind, ItemStats};
use miniquest_core::loot::LootTable;
use miniquest_core::messages::MessageLog;
use miniquest_core::testing::ScriptedDice;
use miniquest_core::{Entity, RngDice};
use proptest::prelude::*;

fn item(index: usize) -> Item {
    let name = format!("Item {index}");
    let (kind, stats) = match index % 5 {
        0 => (ItemKind::Weapon, ItemStats::gear(2, 0, 1)),
        1 => (ItemKind::Armor, ItemStats::gear(0, 2, 0)),
        2 => (ItemKind::Crafting, ItemStats::gear(0, 0, 0)),
        3 => (ItemKind::Wealth, ItemStats::wealth(index as i32)),
        _ => (ItemKind::Trinket, ItemStats::trinket(1, 1, 0)),
    };
    Item::new(name, kind, stats).unwrap()
}

fn total(inventory: &Inventory) -> usize {
    inventory.item_count() + inventory.discarded()
}

proptest! {
    #[test]
    fn pools_stay_bounded(
        attack in 0.0f64..20.0,
        defense in 0.0f64..20.0,
        speed in 0.0f64..20.0,
        level in 1u32..10,
        hits in proptest::collection::vec(-5i32..30, 0..10),
        income in 0i32..200,
    ) {
        let mut entity = Entity::new("Prop", attack, defense, speed, level).as_player();
        let mut log = MessageLog::default();
        let mut dice = ScriptedDice::default();
        for hit in hits {
            entity.take_damage(hit, &mut log);
            entity.heal(hit / 2);
            entity.current_weave -= 1;
            entity.inventory.add_income(income);
            entity.update_stats(&mut dice, &mut log);
            prop_assert!(entity.current_health <= entity.max_health);
            prop_assert!(entity.current_weave <= entity.max_weave);
            prop_assert!(entity.current_weave >= 0);
            prop_assert_eq!(entity.is_dead(), entity.current_health <= 0);
        }
    }

    #[test]
    fn take_damage_never_heals(damage in -50i32..50, defense in 0.0f64..30.0) {
        let mut entity = Entity::new("Prop", 3.0, defense, 3.0, 1);
        let before = entity.current_health;
        let taken = entity.take_damage(damage, &mut MessageLog::default());
        prop_assert!(taken >= 0);
        prop_assert_eq!(entity.current_health, before - taken);
    }

    #[test]
    fn carried_counts_respect_capacity(indices in proptest::collection::vec(0usize..40, 0..40)) {
        let mut inventory = Inventory::default();
        for index in indices {
            let _ = inventory.add_to_stored_items(item(index));
            for (kind, capacity) in default_capacities() {
                prop_assert!(inventory.carried_count(kind) <= capacity);
            }
        }
    }

    #[test]
    fn items_are_conserved(ops in proptest::collection::vec((0u8..6, 0usize..15), 0..60)) {
        let mut inventory = Inventory::default();
        for (op, index) in ops {
            let name = format!("Item {index}");
            let _ = match op {
                0 => inventory.add_to_stored_items(item(index)).map(|_| ()),
                1 => inventory.equip_item(&name, ItemSource::Carried).map(|_| ()),
                2 => inventory.equip_item(&name, ItemSource::Strongbox).map(|_| ()),
                3 => inventory.unequip(&name).map(|_| ()),
                4 => inventory.drop_item(&name, ItemSource::Strongbox).map(|_| ()),
                _ => {
                    inventory.transfer_carried_to_strongbox();
                    inventory.sell(&name, ItemSource::Strongbox).map(|_| ())
                }
            };
            prop_assert_eq!(total(&inventory), inventory.owned().len());
            prop_assert!(inventory.equipped().trinkets.len() <= inventory.max_trinkets());
        }
    }

    #[test]
    fn owned_trinkets_never_drop_again(seed in any::<u64>(), owned in proptest::collection::vec(0usize..20, 0..6)) {
        let table = LootTable::new((0..20).map(item).collect());
        let mut inventory = Inventory::new(default_capacities(), 2);
        for index in &owned {
            inventory.add_to_stored_items(item(*index)).unwrap();
            inventory.transfer_carried_to_strongbox();
        }
        let mut dice = RngDice::seeded(seed);
        for _ in 0..20 {
            if let Some(drop) = table.get_drop("anywhere", &inventory, &mut dice) {
                prop_assert!(drop.kind != ItemKind::Trinket || !inventory.has_owned(&drop.name));
            }
        }
    }

    #[test]
    fn accounting_gains_one_level_per_call(calls in 1usize..6) {
        let mut entity = Entity::new("Prop", 3.0, 3.0, 3.0, 1).as_player();
        entity.inventory.add_income(i32::MAX / 2);
        let mut log = MessageLog::default();
        let mut dice = ScriptedDice::default();
        for _ in 0..calls {
            let (level, target) = (entity.level, entity.target);
            prop_assert!(entity.accounting(&mut dice, &mut log));
            prop_assert_eq!(entity.level, level + 1);
            prop_assert!(entity.target > target);
        }
    }

    #[test]
    fn exhaustion_ends_each_day_once(exhaustion in 1u32..24, night in 0u32..24, steps in 1u32..4) {
        let mut day = DayCycle::new(exhaustion, night, 2.0);
        let mut log = MessageLog::default();
        for _ in 0..2 {
            let mut ended = 0;
            for _ in 0..(2 * exhaustion) {
                if day.increment_hour(steps, &mut log) {
                    ended += 1;
                }
                prop_assert_eq!(day.is_night(), day.hour >= night);
            }
            prop_assert_eq!(ended, 1);
            day.reset_day(&mut log);
        }
    }

    #[test]
    fn duel_always_has_one_loser(seed in any::<u64>()) {
        let mut player = Entity::new("Hero", 3.0, 3.0, 3.0, 1).as_player();
        let mut enemy = Entity::new("Bandit", 2.0, 1.0, 3.0, 1);
        let mut dice = RngDice::seeded(seed);
        let mut log = MessageLog::default();
        let mut rounds = 0;
        while !player.is_dead() && !enemy.is_dead() {
            Combat::execute_player_attack(&player, &mut enemy, &mut dice, &mut log);
            if !enemy.is_dead() {
                Combat::execute_enemy_attack(&enemy, &mut player, &mut dice, &mut log);
            }
            rounds += 1;
            prop_assert!(rounds <= 10);
        }
        prop_assert!(player.is_dead() != enemy.is_dead());
    }
}

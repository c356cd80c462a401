//! QA tests for save/load.
//!
//! These tests verify that game state is properly saved and restored.

use miniquest_core::persist::{save_path, PersistError, SavedGame};
use miniquest_core::testing::ScriptedDice;
use miniquest_core::{list_saves, CharacterBuilder, GameContent, NextState, World, WorldConfig};
use tempfile::TempDir;

fn new_world(name: &str, config: WorldConfig) -> World {
    World::create(
        CharacterBuilder::new().name(name).background("Warrior"),
        GameContent::builtin(),
        config,
        Box::new(ScriptedDice::default()),
    )
    .unwrap()
}

fn load(path: &std::path::Path, config: WorldConfig) -> Result<World, PersistError> {
    World::load(
        path,
        GameContent::builtin(),
        config,
        Box::new(ScriptedDice::default()),
    )
}

// =============================================================================
// TEST 1: Basic save and load
// =============================================================================

#[test]
fn test_save_and_load_round_trip() {
    let temp_dir = TempDir::new().unwrap();
    let config = WorldConfig::default().with_save_dir(temp_dir.path());
    let mut world = new_world("Thorin Ironforge", config.clone());

    let sword = world.content().item("Rusty sword").cloned().unwrap();
    world.player_mut().inventory.add_to_stored_items(sword).unwrap();
    world.handle_player_choice("Equip Rusty sword");
    world.player_mut().inventory.add_income(5);
    world.handle_player_choice("Travel");
    world.handle_player_choice("Aethelwood");

    let path = world.save().unwrap();
    assert_eq!(path, save_path(temp_dir.path(), "Thorin Ironforge"));
    assert!(path.ends_with("Thorin_Ironforge.json"));

    let mut loaded = load(&path, config).unwrap();
    assert_eq!(loaded.snapshot(), world.snapshot());
    assert_eq!(loaded.current_area(), "Aethelwood");
    assert_eq!(loaded.camp(), "Aethelwood");
    assert_eq!(loaded.day_cycle().hour, 1);

    let player = loaded.player();
    assert_eq!(player.damage, 1);
    assert_eq!(player.inventory.income(), 5);
    assert!(player.inventory.is_equipped("Rusty sword"));
    assert_eq!(
        player.progression.as_ref().unwrap().unlocks[0].ability.id,
        "rallying_cry"
    );

    let lines = loaded.drain_messages();
    assert!(lines.contains(&"Welcome back, Thorin Ironforge!".to_string()));
    assert_eq!(loaded.handle_player_choice("Travel"), NextState::TravelOptions);
}

// =============================================================================
// TEST 2: Save restrictions
// =============================================================================

#[test]
fn test_cannot_save_mid_combat() {
    let temp_dir = TempDir::new().unwrap();
    let config = WorldConfig::default().with_save_dir(temp_dir.path());
    let mut world = new_world("Thorin", config);
    world.handle_player_choice("Travel");
    world.handle_player_choice("Aethelwood");
    // an empty dice queue picks the wolf, which is faster and opens
    assert_eq!(world.handle_player_choice("Fight"), NextState::PlayerCombatTurn);

    assert!(matches!(world.save(), Err(PersistError::NotAllowed(_))));
    assert!(list_saves(temp_dir.path()).unwrap().is_empty());
}

// =============================================================================
// TEST 3: Save listings
// =============================================================================

#[test]
fn test_list_saves_sorted_by_name() {
    let temp_dir = TempDir::new().unwrap();
    let config = WorldConfig::default().with_save_dir(temp_dir.path());
    for name in ["Zed", "Anna"] {
        new_world(name, config.clone()).save().unwrap();
    }

    let saves = list_saves(temp_dir.path()).unwrap();
    let names: Vec<&str> = saves
        .iter()
        .map(|s| s.metadata.character_name.as_str())
        .collect();
    assert_eq!(names, ["Anna", "Zed"]);
    assert_eq!(saves[0].metadata.background.as_deref(), Some("Warrior"));
    assert_eq!(saves[0].metadata.location, "Lastholm");
    assert_eq!(saves[0].metadata.level, 1);
}

// =============================================================================
// TEST 4: Content mismatch
// =============================================================================

#[test]
fn test_unknown_reference_fails_load() {
    let temp_dir = TempDir::new().unwrap();
    let config = WorldConfig::default().with_save_dir(temp_dir.path());
    let path = new_world("Thorin", config.clone()).save().unwrap();

    let mut saved = SavedGame::load_json(&path).unwrap();
    saved.state.player.abilities.push("dragon_breath".to_string());
    saved.save_json(&path).unwrap();

    match load(&path, config.clone()) {
        Err(PersistError::UnknownReference { kind, name }) => {
            assert_eq!(kind, "ability");
            assert_eq!(name, "dragon_breath");
        }
        other => panic!("expected unknown reference, got {other:?}"),
    }

    let mut saved = SavedGame::load_json(&path).unwrap();
    saved.state.player.abilities.pop();
    saved.state.current_area = "Atlantis".to_string();
    saved.save_json(&path).unwrap();
    assert!(matches!(
        load(&path, config),
        Err(PersistError::UnknownReference { kind: "location", .. })
    ));
}

#[test]
fn test_missing_file() {
    let temp_dir = TempDir::new().unwrap();
    let result = load(&temp_dir.path().join("nope.json"), WorldConfig::default());
    assert!(matches!(result, Err(PersistError::Io(_))));
}

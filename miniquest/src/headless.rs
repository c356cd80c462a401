//! Line-oriented headless mode.
//!
//! Every input line is one player command. Lines starting with `#` are
//! meta commands (save, load, status, quit). Narrative goes to stdout,
//! diagnostics to stderr.

use miniquest_core::persist::save_path;
use miniquest_core::{
    list_saves, CharacterBuilder, Dice, GameContent, JsonContent, NextState, RngDice, World,
    WorldConfig,
};
use std::error::Error;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use tracing::{info, warn};

/// Options collected from the command line.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct HeadlessOptions {
    pub config: Option<PathBuf>,
    pub content: Option<PathBuf>,
    pub name: Option<String>,
    pub background: Option<String>,
    pub load: Option<PathBuf>,
    pub save_dir: Option<PathBuf>,
    pub seed: Option<u64>,
}

/// Parse `--flag value` pairs. Unknown flags are ignored.
pub fn parse_options(args: &[String]) -> Result<HeadlessOptions, String> {
    let mut options = HeadlessOptions::default();

    let mut i = 1;
    while i < args.len() {
        let flag = args[i].as_str();
        let takes_value = matches!(
            flag,
            "--config" | "--content" | "--name" | "--background" | "--load" | "--save-dir" | "--seed"
        );
        if takes_value {
            let value = args
                .get(i + 1)
                .ok_or_else(|| format!("{flag} needs a value"))?
                .clone();
            match flag {
                "--config" => options.config = Some(value.into()),
                "--content" => options.content = Some(value.into()),
                "--name" => options.name = Some(value),
                "--background" => options.background = Some(value),
                "--load" => options.load = Some(value.into()),
                "--save-dir" => options.save_dir = Some(value.into()),
                _ => {
                    let seed = value
                        .parse()
                        .map_err(|_| format!("--seed expects a number, got '{value}'"))?;
                    options.seed = Some(seed);
                }
            }
            i += 1;
        }
        i += 1;
    }

    Ok(options)
}

fn make_dice(seed: Option<u64>) -> Box<dyn Dice> {
    match seed {
        Some(seed) => Box::new(RngDice::seeded(seed)),
        None => Box::new(RngDice::from_entropy()),
    }
}

fn load_content(options: &HeadlessOptions) -> Result<GameContent, Box<dyn Error>> {
    let Some(dir) = &options.content else {
        return Ok(GameContent::builtin());
    };
    let catalog = JsonContent::load_dir(dir)?;
    if !catalog.errors.is_empty() {
        warn!(count = catalog.errors.len(), dir = %dir.display(), "some content records were skipped");
    }
    Ok(GameContent::from_catalog(&catalog)?)
}

fn load_config(options: &HeadlessOptions) -> Result<WorldConfig, Box<dyn Error>> {
    let mut config = match &options.config {
        Some(path) => WorldConfig::from_json_file(path)?,
        None => WorldConfig::default(),
    };
    if let Some(dir) = &options.save_dir {
        config = config.with_save_dir(dir);
    }
    Ok(config)
}

/// Run the game on stdin/stdout until `#quit` or end of input.
pub fn run_headless(options: HeadlessOptions) -> Result<(), Box<dyn Error>> {
    let config = load_config(&options)?;
    let content = load_content(&options)?;

    let mut world = match &options.load {
        Some(path) => World::load(path, content.clone(), config.clone(), make_dice(options.seed))?,
        None => {
            let mut builder = CharacterBuilder::new()
                .background(options.background.as_deref().unwrap_or("Warrior"));
            if let Some(name) = &options.name {
                builder = builder.name(name);
            }
            World::create(builder, content.clone(), config.clone(), make_dice(options.seed))?
        }
    };
    info!(player = %world.player().name, "headless session started");

    println!("=== Miniquest Headless Mode ===");
    print_messages(&mut world);
    print_prompt(&world, NextState::AreaDescription);

    let stdin = io::stdin();
    let mut stdout = io::stdout();

    for line in stdin.lock().lines() {
        let line = match line {
            Ok(l) => l,
            Err(e) => {
                eprintln!("Error reading input: {e}");
                break;
            }
        };

        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        if let Some(command) = line.strip_prefix('#') {
            let (verb, argument) = command
                .trim()
                .split_once(char::is_whitespace)
                .map(|(v, a)| (v, a.trim()))
                .unwrap_or((command.trim(), ""));
            match verb {
                "quit" | "exit" => {
                    println!("Goodbye!");
                    break;
                }
                "save" => {
                    let result = if argument.is_empty() {
                        world.save()
                    } else {
                        world.save_to(argument).map(|()| PathBuf::from(argument))
                    };
                    match result {
                        Ok(path) => println!("[SAVED] {}", path.display()),
                        Err(e) => println!("[ERROR] Save failed: {e}"),
                    }
                }
                "load" => {
                    let path = if argument.is_empty() {
                        save_path(&config.save_dir, &world.player().name)
                    } else {
                        PathBuf::from(argument)
                    };
                    match World::load(&path, content.clone(), config.clone(), make_dice(options.seed)) {
                        Ok(loaded) => {
                            world = loaded;
                            println!("[LOADED] {}", path.display());
                            print_messages(&mut world);
                            print_prompt(&world, NextState::AreaDescription);
                        }
                        Err(e) => println!("[ERROR] Load failed: {e}"),
                    }
                }
                "saves" => match list_saves(&config.save_dir) {
                    Ok(saves) if saves.is_empty() => println!("[SAVES] none"),
                    Ok(saves) => {
                        println!("[SAVES]");
                        for save in saves {
                            let m = save.metadata;
                            println!(
                                "  {} (level {} {}) at {}: {}",
                                m.character_name,
                                m.level,
                                m.background.as_deref().unwrap_or("adventurer"),
                                m.location,
                                save.path.display()
                            );
                        }
                    }
                    Err(e) => println!("[ERROR] Could not list saves: {e}"),
                },
                "status" => print_status(&world),
                "grimoire" => {
                    println!("[GRIMOIRE]");
                    for entry in world.content().grimoire() {
                        println!("  {} / {}: {}", entry.category, entry.title, entry.content);
                    }
                }
                "help" => print_commands(),
                _ => println!("[ERROR] Unknown command. Type #help for help."),
            }
            stdout.flush().ok();
            continue;
        }

        let next = world.handle_player_choice(line);
        print_messages(&mut world);
        print_prompt(&world, next);
        stdout.flush().ok();
    }

    Ok(())
}

fn print_messages(world: &mut World) {
    for message in world.drain_messages() {
        println!("{message}");
    }
}

fn print_prompt(world: &World, next: NextState) {
    let choices = match next {
        NextState::AreaDescription | NextState::ReturnedToCampAfterDefeat => {
            world.location_options().join(", ")
        }
        NextState::TravelOptions => {
            let mut options = world.get_travel_options();
            options.push("Stay".to_string());
            options.join(", ")
        }
        NextState::PlayerCombatTurn => {
            let mut options = vec!["Attack".to_string(), "Flee".to_string()];
            options.extend(
                world
                    .player()
                    .active_abilities()
                    .map(|a| format!("Use {}", a.name)),
            );
            options.join(", ")
        }
        NextState::LootDecision => "Take, Drop, Leave".to_string(),
        NextState::PlayerDefeatedMustFlee => "Flee".to_string(),
        NextState::Prepare => format!(
            "Equip <item>, Unequip <item>, Drop <item>, Sell <item>, {}",
            world.location_options().join(", ")
        ),
    };
    println!("[{next}] {choices}");
}

fn print_status(world: &World) {
    let player = world.player();
    println!("[STATUS]");
    println!("  {}", player.status_line());
    println!("  Weave: {}/{}", player.current_weave, player.max_weave);
    println!("  Location: {} (camp: {})", world.current_area(), world.camp());
    println!(
        "  Hour: {}{}",
        world.day_cycle().hour,
        if world.day_cycle().is_night() { " (night)" } else { "" }
    );
    println!(
        "  Income: {}/{}",
        player.inventory.income(),
        player.target
    );
    if let Some(encounter) = world.encounter() {
        println!("  Fighting: {}", encounter.enemy.status_line());
    }
}

fn print_commands() {
    println!("[HELP]");
    println!("  #quit          - Exit the game");
    println!("  #save [path]   - Save the game (free play only)");
    println!("  #load [path]   - Load a saved game");
    println!("  #saves         - List saved games");
    println!("  #status        - Show current game status");
    println!("  #grimoire      - Show lore entries");
    println!("  #help          - Show this help");
    println!("  (anything else is sent as a player command)");
}

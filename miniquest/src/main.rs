//! Miniquest, a small text RPG played one command per line.
//!
//! ```bash
//! cargo run -p miniquest -- --name "Thorin" --background warrior
//! ```
//!
//! Set `RUST_LOG=miniquest_core=debug` to trace rolls and state changes on
//! stderr.

mod headless;

use tracing_subscriber::EnvFilter;

fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Diagnostics go to stderr so stdout stays the game transcript.
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")))
        .with_writer(std::io::stderr)
        .init();

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--help" || a == "-h") {
        print_help();
        return Ok(());
    }

    let options = headless::parse_options(&args)?;
    headless::run_headless(options)
}

fn print_help() {
    println!("Miniquest - a small text RPG");
    println!();
    println!("USAGE:");
    println!("    miniquest [OPTIONS]");
    println!();
    println!("OPTIONS:");
    println!("    --name <NAME>          Character name");
    println!("    --background <NAME>    Warrior, Rogue, Scholar or Survivor (default: Warrior)");
    println!("    --load <FILE>          Resume a saved game instead of creating a character");
    println!("    --config <FILE>        JSON world configuration");
    println!("    --content <DIR>        Load content from a JSON directory tree");
    println!("    --save-dir <DIR>       Where saves are written (default: saves)");
    println!("    --seed <N>             Seed the dice for a reproducible session");
    println!("    -h, --help             Show this help");
    println!();
    println!("Type #help in game for meta commands.");
}

/// CLI tool for drawing karaoke prompts
use karaoke_prompts::{builtin_catalog, diagnostic};
use karaoke_prompts::{
    parse_catalog, KaraokeError, LoadError, RevealState, Session, SessionOptions, Snapshot,
    Timing,
};
use std::env;
use std::fs;
use std::process;
use std::sync::Arc;

fn print_usage() {
    eprintln!("Usage:");
    eprintln!("  karaoke-prompts [options]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --catalog <file>   Catalog file to draw from (default: built-in catalog)");
    eprintln!("  --seed <n>         Seed for deterministic draws (default: random)");
    eprintln!("  --rounds <n>       Number of draws to play (default: 1)");
    eprintln!("  --special          Draw special prompts only");
    eprintln!("  --fast             Play the reveal at ten times the normal speed");
    eprintln!("  --json             Print every state change as a JSON line");
    eprintln!("  --list             Print the special prompt list at the end");
    eprintln!("  --help             Show this help message");
    eprintln!();
    eprintln!("Examples:");
    eprintln!("  karaoke-prompts                        # One standard draw");
    eprintln!("  karaoke-prompts --special --rounds 3   # Three special prompts");
    eprintln!("  RUST_LOG=debug karaoke-prompts --seed 42");
}

#[derive(Default)]
struct Args {
    catalog: Option<String>,
    seed: Option<u64>,
    rounds: usize,
    special: bool,
    fast: bool,
    json: bool,
    list: bool,
}

fn parse_args() -> Args {
    let mut args = Args {
        rounds: 1,
        ..Args::default()
    };
    let mut iter = env::args().skip(1);

    while let Some(arg) = iter.next() {
        match arg.as_str() {
            "--help" | "-h" => {
                print_usage();
                process::exit(0);
            }
            "--catalog" => args.catalog = Some(value(&mut iter, "--catalog")),
            "--seed" => {
                let raw = value(&mut iter, "--seed");
                args.seed = Some(raw.parse().unwrap_or_else(|e| {
                    eprintln!("Error parsing seed '{}': {}", raw, e);
                    process::exit(1);
                }));
            }
            "--rounds" => {
                let raw = value(&mut iter, "--rounds");
                args.rounds = raw.parse().unwrap_or_else(|e| {
                    eprintln!("Error parsing rounds '{}': {}", raw, e);
                    process::exit(1);
                });
            }
            "--special" => args.special = true,
            "--fast" => args.fast = true,
            "--json" => args.json = true,
            "--list" => args.list = true,
            other => {
                eprintln!("Unknown argument: {}", other);
                print_usage();
                process::exit(1);
            }
        }
    }
    args
}

fn value(iter: &mut impl Iterator<Item = String>, flag: &str) -> String {
    iter.next().unwrap_or_else(|| {
        eprintln!("Missing value for {}", flag);
        process::exit(1);
    })
}

/// Read the catalog source and the name it is reported under
fn read_source(path: Option<&str>) -> Result<(String, String), KaraokeError> {
    let Some(path) = path else {
        return Ok(("default".to_string(), builtin_catalog::DEFAULT.to_string()));
    };
    let source = fs::read_to_string(path)
        .map_err(|e| LoadError::IoError(format!("reading '{}': {}", path, e)))?;
    Ok((path.to_string(), source))
}

/// Print what changed between two snapshots of the same session
fn print_change(previous: &Snapshot, current: &Snapshot) {
    match &current.state {
        RevealState::Idle => {}
        RevealState::Spinning => println!("♪ spinning..."),
        RevealState::Slowing => println!("♪ slowing..."),
        RevealState::Revealed(indices) => {
            let before = previous.revealed_indices();
            for &index in indices.iter().filter(|i| !before.contains(*i)) {
                let item = &current.result[index];
                match item.category() {
                    Some(category) => println!("  [{}] {}", category, item.value),
                    None if item.is_special() => println!("  [special] {}", item.value),
                    None => println!("  {}", item.value),
                }
            }
        }
    }
}

async fn play(args: &Args, source: &str) -> Result<(), KaraokeError> {
    let catalog = Arc::new(parse_catalog(source)?);
    let mut options = match args.seed {
        Some(seed) => SessionOptions::seeded(seed),
        None => SessionOptions::from_entropy(),
    };
    if args.fast {
        options = options.with_timing(Timing::default().scaled(0.1));
    }
    let session = Session::new(catalog, options);
    let mut events = session.subscribe();

    for round in 1..=args.rounds {
        let cycle = if args.special {
            session.generate_special_only()?
        } else {
            session.generate_standard()?
        };

        if !args.json {
            println!("Round {}", round);
        }
        let mut previous = Snapshot {
            state: RevealState::Idle,
            ..session.snapshot()
        };
        loop {
            let current = events.borrow_and_update().clone();
            if current.cycle == cycle && current != previous {
                if args.json {
                    match serde_json::to_string(&current) {
                        Ok(line) => println!("{}", line),
                        Err(e) => eprintln!("Error serializing state: {}", e),
                    }
                } else {
                    print_change(&previous, &current);
                }
                if current.is_complete() {
                    break;
                }
                previous = current;
            }
            if events.changed().await.is_err() {
                break;
            }
        }
    }

    if args.list {
        let list = session.special_list();
        let used = list.iter().filter(|entry| entry.used).count();
        println!("Special prompts ({}/{} remaining)", list.len() - used, list.len());
        for entry in list {
            let mark = if entry.used { "x" } else { " " };
            println!("  [{}] {}", mark, entry.prompt);
        }
    }
    Ok(())
}

#[tokio::main]
async fn main() {
    env_logger::init();
    let args = parse_args();

    let (source_name, source) = read_source(args.catalog.as_deref()).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        process::exit(1);
    });

    if let Err(e) = play(&args, &source).await {
        eprint!("{}", diagnostic::report_error(&source_name, &source, &e));
        process::exit(1);
    }
}

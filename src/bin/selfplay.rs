//! Self-play game generation CLI.
//!
//! Plays Go games between two copies of a randomly initialized evaluator and
//! writes one JSON record per game.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]
//!
//! Options:
//!   --config FILE       JSON config; missing fields keep their defaults
//!   --games N           Number of games to play (default: 1)
//!   --board-size N      Board width, 1-19 (default: 9)
//!   --hidden-layers N   Hidden layer count (default: 7)
//!   --channels N        Units per hidden layer (default: 64)
//!   --seed N            Weight seed (default: entropy)
//!   --threads N         Forward-pass threads, 0 for all cores (default: 0)
//!   --recommender NAME  best_raw or fuzzy_local (default: fuzzy_local)
//!   --max-moves N       Move cap per phase (default: 1000)
//!   --sequential        Run each layer on one thread
//!   --output FILE       Output file path (default: stdout)
//!   --quiet             Suppress progress and summary output
//!
//! Logging follows `RUST_LOG` (default `info`, or `warn` with `--quiet`).

use std::env;
use std::fs::{self, File};
use std::io::{self, BufWriter, Write};
use std::process;
use std::str::FromStr;
use std::time::Instant;

use hoshi::recommend::RecommenderKind;
use hoshi::selfplay::{self, SelfPlayConfig};

fn fail(message: &str) -> ! {
    eprintln!("{}", message);
    print_usage();
    process::exit(1);
}

fn value<T: FromStr>(args: &[String], i: usize, flag: &str) -> T {
    match args.get(i).map(|raw| raw.parse()) {
        Some(Ok(value)) => value,
        Some(Err(_)) => fail(&format!("invalid {} value: {}", flag, args[i])),
        None => fail(&format!("{} needs a value", flag)),
    }
}

fn load_config(path: &str) -> SelfPlayConfig {
    let text = fs::read_to_string(path)
        .unwrap_or_else(|e| fail(&format!("cannot read config {}: {}", path, e)));
    serde_json::from_str(&text).unwrap_or_else(|e| fail(&format!("invalid config {}: {}", path, e)))
}

fn main() {
    let args: Vec<String> = env::args().collect();
    let mut config = SelfPlayConfig::default();
    let mut output_path: Option<String> = None;
    let mut quiet = false;

    // The config file is the base that the other flags override.
    if let Some(i) = args.iter().position(|a| a == "--config") {
        let path: String = value(&args, i + 1, "--config");
        config = load_config(&path);
    }

    let mut i = 1;
    while i < args.len() {
        match args[i].as_str() {
            "--config" => {
                i += 1;
            }
            "--games" => {
                i += 1;
                config.games = value(&args, i, "--games");
            }
            "--board-size" => {
                i += 1;
                config.evaluator.board_size = value(&args, i, "--board-size");
            }
            "--hidden-layers" => {
                i += 1;
                config.evaluator.hidden_layers = value(&args, i, "--hidden-layers");
            }
            "--channels" => {
                i += 1;
                config.evaluator.channels = value(&args, i, "--channels");
            }
            "--seed" => {
                i += 1;
                config.evaluator.seed = Some(value(&args, i, "--seed"));
            }
            "--threads" => {
                i += 1;
                config.evaluator.threads = value(&args, i, "--threads");
            }
            "--recommender" => {
                i += 1;
                let name: String = value(&args, i, "--recommender");
                config.recommender = match name.as_str() {
                    "best_raw" => RecommenderKind::BestRaw,
                    "fuzzy_local" => RecommenderKind::FuzzyLocal,
                    other => fail(&format!("unknown recommender: {}", other)),
                };
            }
            "--max-moves" => {
                i += 1;
                config.max_moves = value(&args, i, "--max-moves");
            }
            "--sequential" => {
                config.parallel = false;
            }
            "--output" => {
                i += 1;
                output_path = Some(value(&args, i, "--output"));
            }
            "--quiet" => {
                quiet = true;
            }
            "--help" | "-h" => {
                print_usage();
                return;
            }
            other => fail(&format!("Unknown argument: {}", other)),
        }
        i += 1;
    }

    env_logger::Builder::from_env(
        env_logger::Env::default().default_filter_or(if quiet { "warn" } else { "info" }),
    )
    .init();

    if !quiet {
        eprintln!(
            "Self-play: {} games, {}x{} board, {} hidden layers x {} channels, {:?} recommender",
            config.games,
            config.evaluator.board_size,
            config.evaluator.board_size,
            config.evaluator.hidden_layers,
            config.evaluator.channels,
            config.recommender
        );
    }

    let start = Instant::now();
    let mut out: Box<dyn Write> = match &output_path {
        Some(path) => match File::create(path) {
            Ok(file) => Box::new(BufWriter::new(file)),
            Err(e) => fail(&format!("failed to create {}: {}", path, e)),
        },
        None => Box::new(BufWriter::new(io::stdout().lock())),
    };

    let mut games = Vec::with_capacity(config.games);
    let result = selfplay::run_self_play_with_callback(&config, |game| {
        selfplay::write_game_json(&game, &mut out)?;
        games.push(game);
        Ok(())
    })
    .and_then(|()| Ok(out.flush()?));
    if let Err(e) = result {
        eprintln!("self-play failed: {}", e);
        process::exit(1);
    }

    if !quiet {
        eprintln!(
            "Completed {} games in {:.1}s",
            games.len(),
            start.elapsed().as_secs_f64()
        );
        selfplay::print_summary(&games);
        if let Some(path) = output_path {
            eprintln!("Wrote {} games to {}", games.len(), path);
        }
    }
}

fn print_usage() {
    eprintln!("Usage: selfplay [OPTIONS]");
    eprintln!();
    eprintln!("Options:");
    eprintln!("  --config FILE       JSON config; missing fields keep their defaults");
    eprintln!("  --games N           Number of games to play (default: 1)");
    eprintln!("  --board-size N      Board width, 1-19 (default: 9)");
    eprintln!("  --hidden-layers N   Hidden layer count (default: 7)");
    eprintln!("  --channels N        Units per hidden layer (default: 64)");
    eprintln!("  --seed N            Weight seed (default: entropy)");
    eprintln!("  --threads N         Forward-pass threads, 0 for all cores (default: 0)");
    eprintln!("  --recommender NAME  best_raw or fuzzy_local (default: fuzzy_local)");
    eprintln!("  --max-moves N       Move cap per phase (default: 1000)");
    eprintln!("  --sequential        Run each layer on one thread");
    eprintln!("  --output FILE       Output file path (default: stdout)");
    eprintln!("  --quiet             Suppress progress and summary output");
    eprintln!("  --help              Show this help");
}

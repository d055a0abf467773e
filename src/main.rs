//! Renju engine command line
//!
//! Requests and responses are JSON, one object per request.

use std::fs;
use std::io::{self, BufRead, Read, Write};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use log::warn;

use renju::config::{Difficulty, DifficultyTable, EngineConfig};
use renju::headless::{run_multiple_games, HeadlessOptions, PlayerConfig};
use renju::{Engine, EngineWorker, MoveRequest};

#[derive(Debug, Parser)]
#[command(name = "renju", version, about = "Renju CPU engine")]
struct Cli {
    /// TOML file overriding the built-in difficulty table
    #[arg(short, long, global = true)]
    table: Option<PathBuf>,

    /// Fixed seed for reproducible play
    #[arg(short, long, global = true)]
    seed: Option<u64>,

    /// Answer book moves immediately instead of simulating thought
    #[arg(long, global = true, default_value = "false")]
    no_delay: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
#[command(rename_all = "lower")]
enum Command {
    /// Answer one JSON request read from a file or stdin.
    Think {
        /// Request file; stdin when omitted
        input: Option<PathBuf>,
    },

    /// Answer line-delimited JSON requests from stdin until EOF.
    Serve,

    /// Play a match between two difficulty levels.
    SelfPlay {
        #[arg(short, long, default_value = "hard")]
        a: Difficulty,

        #[arg(short, long, default_value = "normal")]
        b: Difficulty,

        #[arg(short, long, default_value = "10")]
        games: usize,

        #[arg(long, default_value = "225")]
        max_moves: usize,

        /// Print the report as JSON
        #[arg(long, default_value = "false")]
        json: bool,
    },

    /// Print the active difficulty table as TOML.
    Difficulties,
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("warn")).init();
    let cli = Cli::parse();

    let table = match &cli.table {
        Some(path) => DifficultyTable::load(path)
            .with_context(|| format!("loading difficulty table {}", path.display()))?,
        None => DifficultyTable::default(),
    };
    let config = EngineConfig {
        seed: cli.seed,
        simulate_thinking: !cli.no_delay,
        ..EngineConfig::default()
    };

    match cli.command {
        Command::Think { input } => think(Engine::new(config, table), input),
        Command::Serve => serve(Engine::new(config, table)),
        Command::SelfPlay {
            a,
            b,
            games,
            max_moves,
            json,
        } => {
            let options = HeadlessOptions {
                max_moves,
                seed: cli.seed,
            };
            let report = run_multiple_games(
                &PlayerConfig::from_difficulty(&table, a),
                &PlayerConfig::from_difficulty(&table, b),
                games,
                &options,
            );
            if json {
                println!("{}", serde_json::to_string_pretty(&report)?);
            } else {
                println!("{report}");
            }
            Ok(())
        }
        Command::Difficulties => {
            print!("{}", table.to_toml_string().context("serializing difficulty table")?);
            Ok(())
        }
    }
}

fn think(mut engine: Engine, input: Option<PathBuf>) -> Result<()> {
    let text = match input {
        Some(path) => fs::read_to_string(&path).with_context(|| format!("reading {}", path.display()))?,
        None => {
            let mut text = String::new();
            io::stdin().read_to_string(&mut text).context("reading request from stdin")?;
            text
        }
    };
    let request: MoveRequest = serde_json::from_str(&text).context("parsing move request")?;
    let response = engine.handle(&request);
    println!("{}", serde_json::to_string(&response)?);
    Ok(())
}

fn serve(engine: Engine) -> Result<()> {
    let worker = EngineWorker::spawn(engine).context("starting engine worker")?;
    let stdout = io::stdout();
    let mut out = stdout.lock();

    for line in io::stdin().lock().lines() {
        let line = line.context("reading stdin")?;
        if line.trim().is_empty() {
            continue;
        }
        let request: MoveRequest = match serde_json::from_str(&line) {
            Ok(request) => request,
            Err(err) => {
                warn!("skipping malformed request: {err}");
                continue;
            }
        };
        let response = worker.think(request)?;
        writeln!(out, "{}", serde_json::to_string(&response)?)?;
        out.flush()?;
    }
    Ok(())
}

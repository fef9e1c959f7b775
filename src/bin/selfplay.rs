//! Self-play CLI.
//!
//! Plays bot-only Ludo games headless and prints one JSON line per game.
//!
//! Usage:
//!   cargo run --release --bin selfplay -- [OPTIONS]

use std::time::Instant;

use clap::{Parser, ValueEnum};
use ludo_engine::bot::{HeuristicBot, MovePolicy, RandomBot};
use ludo_engine::core::{EngineConfig, PlayerMap, Roster};
use ludo_engine::session::GameSession;
use ludo_engine::EngineError;
use tracing::{info, warn};

#[derive(Parser)]
#[command(name = "selfplay")]
#[command(about = "Headless bot-vs-bot Ludo games")]
struct Args {
    /// Number of games to play
    #[arg(short, long, default_value = "10")]
    games: u32,

    /// Seated players (2-4)
    #[arg(short, long, default_value = "4", value_parser = clap::value_parser!(u8).range(2..=4))]
    players: u8,

    /// Base seed; game `n` uses `seed + n`
    #[arg(long, default_value = "42")]
    seed: u64,

    /// Roll limit per game before it is abandoned
    #[arg(long, default_value = "5000")]
    max_rolls: usize,

    /// Policy for every seat
    #[arg(long, default_value = "heuristic")]
    bot: BotKind,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum BotKind {
    Heuristic,
    Random,
}

impl BotKind {
    fn build(self, config: &EngineConfig, seed: u64) -> Box<dyn MovePolicy> {
        match self {
            BotKind::Heuristic => Box::new(HeuristicBot::new(config.bot.clone())),
            BotKind::Random => Box::new(RandomBot::new(seed)),
        }
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let args = Args::parse();

    let filter = if args.verbose { "debug" } else { "warn" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let start = Instant::now();
    let mut wins: PlayerMap<u32> = PlayerMap::default();
    let mut abandoned = 0;

    for game in 0..args.games {
        let seed = args.seed.wrapping_add(u64::from(game));
        match play_game(&args, seed).await {
            Ok((line, first)) => {
                println!("{line}");
                match first {
                    Some(player) => wins[player] += 1,
                    None => abandoned += 1,
                }
            }
            Err(e) => warn!(game, seed, error = %e, "game failed"),
        }
    }

    info!(
        games = args.games,
        abandoned,
        elapsed_ms = start.elapsed().as_millis() as u64,
        "self-play finished"
    );
    for (player, count) in wins.iter().filter(|(_, c)| **c > 0) {
        eprintln!("{player}: {count} wins");
    }
    Ok(())
}

async fn play_game(
    args: &Args,
    seed: u64,
) -> Result<(String, Option<ludo_engine::PlayerId>), EngineError> {
    let config = EngineConfig::headless(seed);
    let mut session = GameSession::new(config.clone())?;
    let roster = Roster::standard(args.players as usize, args.players as usize)?;
    let players: Vec<_> = roster.players().collect();
    session.start(roster)?;

    for (i, player) in players.iter().enumerate() {
        let policy = args.bot.build(&config, seed.wrapping_add(i as u64 + 1));
        session.set_policy(*player, Some(policy))?;
    }

    let summary = session.autoplay(args.max_rolls).await?;
    let line = serde_json::json!({
        "seed": seed,
        "players": players,
        "bot": format!("{:?}", args.bot).to_lowercase(),
        "rolls": summary.rolls,
        "completed": summary.completed,
        "standings": summary.standings,
    });
    let winner = if summary.completed {
        summary.standings.first().copied()
    } else {
        None
    };
    Ok((line.to_string(), winner))
}

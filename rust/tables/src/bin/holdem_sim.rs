//! Bot-driven simulation across concurrent games.
//!
//! Usage: cargo run -p holdem-tables --bin holdem-sim -- --games 4 --hands 200

use std::collections::HashMap;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use holdem_engine::action::ActionRequest;
use holdem_engine::errors::GameError;
use holdem_tables::bots::{create_bot, Bot, BotKind};
use holdem_tables::config::{self, ValueSource};
use holdem_tables::registry::{CreateGame, GameRegistry, SeatRequest, TableSnapshot};
use holdem_tables::{GameId, TableError};

#[derive(Debug, Parser)]
#[command(name = "holdem-sim", about = "Play bot-only hold'em games and check chip totals")]
struct Args {
    /// Games run at the same time
    #[arg(long, default_value_t = 1, value_parser = clap::value_parser!(u32).range(1..=64))]
    games: u32,
    /// Hands per game; a game ends early when one player has every chip
    #[arg(long, default_value_t = 100)]
    hands: u32,
    /// Seats per game
    #[arg(long, default_value_t = 4, value_parser = clap::value_parser!(u8).range(2..=10))]
    players: u8,
    /// Base seed; game `i` uses `seed + i`
    #[arg(long)]
    seed: Option<u64>,
    /// Bot types assigned to seats in rotation
    #[arg(long, value_enum, value_delimiter = ',', default_values = ["aggressive", "caller"])]
    bots: Vec<BotKind>,
}

#[derive(Debug)]
struct GameOutcome {
    game_id: GameId,
    hands_played: u32,
    expected_total: u64,
    final_state: TableSnapshot,
}

impl GameOutcome {
    fn chips_on_table(&self) -> u64 {
        self.final_state.seats.iter().map(|s| s.chips).sum::<u64>() + self.final_state.pot
    }
}

#[tokio::main]
async fn main() -> ExitCode {
    if let Err(e) = holdem_tables::init_logging() {
        eprintln!("Warning: logging not initialised: {}", e);
    }

    let args = Args::parse();
    match run(args).await {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::from(1),
        Err(e) => {
            eprintln!("Error: {}", e);
            ExitCode::from(2)
        }
    }
}

async fn run(args: Args) -> Result<bool, TableError> {
    let resolved = config::load_with_sources()?;
    let cfg = resolved.config;
    if resolved.sources.turn_timeout_ms != ValueSource::Default {
        tracing::info!(turn_timeout_ms = cfg.turn_timeout_ms, "turn timeout overridden");
    }
    let mut settings = cfg.game_settings();
    settings.max_players = settings.max_players.max(usize::from(args.players));

    let registry = Arc::new(GameRegistry::from_config(&cfg)?);
    let sweeper = registry.spawn_sweeper(cfg.idle_ttl());

    let base_seed = args.seed.unwrap_or_else(rand::random);
    let mut tasks = tokio::task::JoinSet::new();
    for g in 0..u64::from(args.games) {
        let seed = base_seed.wrapping_add(g);
        let seats: Vec<SeatRequest> = (0..args.players)
            .map(|i| SeatRequest::new(format!("g{}p{}", g, i), format!("Bot {}", i)))
            .collect();
        let bots: HashMap<String, Box<dyn Bot>> = seats
            .iter()
            .enumerate()
            .map(|(i, s)| {
                let kind = args.bots[i % args.bots.len()];
                (s.id.clone(), create_bot(kind, seed.wrapping_mul(31).wrapping_add(i as u64)))
            })
            .collect();
        let id = registry.create_game(CreateGame {
            settings: settings.clone(),
            seed: Some(seed),
            players: seats,
        })?;
        let expected_total = settings.starting_chips * u64::from(args.players);
        let registry = Arc::clone(&registry);
        let hands = args.hands;
        tasks.spawn(async move {
            play_game(&registry, id, bots, hands, expected_total).await
        });
    }

    let mut all_balanced = true;
    let mut finished = 0;
    loop {
        tokio::select! {
            joined = tasks.join_next() => {
                let Some(joined) = joined else { break };
                let outcome = match joined {
                    Ok(result) => result?,
                    Err(e) => {
                        eprintln!("Error: game task failed: {}", e);
                        all_balanced = false;
                        continue;
                    }
                };
                finished += 1;
                all_balanced &= report(&outcome);
                registry.close_game(&outcome.game_id, "simulation finished")?;
            }
            _ = tokio::signal::ctrl_c() => {
                eprintln!("Interrupted after {} finished games", finished);
                tasks.abort_all();
                break;
            }
        }
    }
    sweeper.abort();

    println!(
        "{} games, {} hands recorded, chips {}",
        finished,
        registry.history().total_hands()?,
        if all_balanced { "conserved" } else { "NOT conserved" }
    );
    Ok(all_balanced)
}

async fn play_game(
    registry: &GameRegistry,
    id: GameId,
    mut bots: HashMap<String, Box<dyn Bot>>,
    hands: u32,
    expected_total: u64,
) -> Result<GameOutcome, TableError> {
    let table = registry.get(&id)?;
    let mut hands_played = 0;

    for _ in 0..hands {
        match table.start_hand() {
            Ok(_) => {}
            Err(TableError::Game(GameError::NotEnoughPlayers { .. })) => break,
            Err(e) => return Err(e),
        }
        hands_played += 1;

        loop {
            // Decide under the table lock so the view cannot change underneath.
            let next = table.with_engine(|engine| {
                let player = engine.current_player()?.id().to_string();
                let request = bots.get_mut(&player)?.decide(engine, &player);
                Some((player, request))
            })?;
            let Some((player, request)) = next else {
                break;
            };

            if let Err(e) = table.act(&player, request) {
                if !e.is_rejection() {
                    return Err(e);
                }
                tracing::warn!(game_id = %id, player = %player, ?request, error = %e, "bot move rejected, folding");
                // The turn may have moved on already; a second rejection is fine.
                let _ = table.act(&player, ActionRequest::fold());
            }
            tokio::task::yield_now().await;
        }
    }

    Ok(GameOutcome {
        game_id: id,
        hands_played,
        expected_total,
        final_state: table.snapshot()?,
    })
}

fn report(outcome: &GameOutcome) -> bool {
    let total = outcome.chips_on_table();
    println!(
        "game {} after {} hands:",
        outcome.game_id, outcome.hands_played
    );
    for seat in &outcome.final_state.seats {
        println!("  {:<10} {:>8}", seat.name, seat.chips);
    }
    let balanced = total == outcome.expected_total;
    if !balanced {
        eprintln!(
            "  chip total {} does not match the {} dealt out",
            total, outcome.expected_total
        );
    }
    balanced
}

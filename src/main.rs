use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use clap::{Parser, Subcommand};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use swingers::api::{build_router, state::AppState};
use swingers::calculate::{standings, RatingEngine};
use swingers::config::AppConfig;
use swingers::models::{PlayerId, Roster};
use swingers::schedule::{LeftoverPolicy, PairingScheduler};
use swingers::storage::{JsonlStore, MemoryStore, StorageConfig, TournamentStore};
use swingers::tournament::{schedule_rng, Tournament};

#[derive(Parser)]
#[command(name = "swingers")]
#[command(about = "Rotating-partner doubles tournaments with windowed player ratings")]
#[command(version)]
struct Cli {
    /// Path to configuration file
    #[arg(long, default_value = "./config.toml")]
    config: PathBuf,

    /// Data directory path (overrides the config file)
    #[arg(long)]
    data_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    log_level: Option<String>,

    /// Output logs as JSON
    #[arg(long)]
    json_logs: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Start the API server
    Serve {
        /// Bind address
        #[arg(long)]
        host: Option<String>,

        /// Port number
        #[arg(long)]
        port: Option<u16>,

        /// Keep everything in memory instead of the data directory
        #[arg(long)]
        ephemeral: bool,
    },

    /// Generate and print a schedule without starting a tournament
    Schedule {
        /// Player names
        #[arg(required = true, num_args = 1..)]
        players: Vec<String>,

        /// Number of rounds
        #[arg(long, short)]
        rounds: usize,

        /// Shuffle seed, for a reproducible schedule
        #[arg(long)]
        seed: Option<u64>,

        /// Bench the leftover pair and count it as a sit-out
        #[arg(long)]
        sit_out_leftover: bool,

        /// Print the schedule as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show all-time player standings
    Standings,

    /// Show finished tournaments, newest first
    History {
        /// Only tournaments created before this time (RFC 3339)
        #[arg(long)]
        before: Option<DateTime<Utc>>,

        /// Tournaments per page
        #[arg(long)]
        page_size: Option<usize>,
    },

    /// Show one player's rating breakdown
    Rating {
        /// Player name or ID
        player: String,
    },
}

fn load_config(cli: &Cli) -> Result<AppConfig> {
    let mut config = if cli.config.exists() {
        AppConfig::from_file(&cli.config)
            .with_context(|| format!("loading {}", cli.config.display()))?
    } else {
        AppConfig::default()
    };

    if let Some(dir) = &cli.data_dir {
        config.data_dir = dir.clone();
    }
    if let Some(level) = &cli.log_level {
        config.log_level = level.clone();
    }
    Ok(config)
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;

    // Initialize tracing
    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&config.log_level));

    if cli.json_logs {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer().json())
            .init();
    } else {
        tracing_subscriber::registry()
            .with(filter)
            .with(tracing_subscriber::fmt::layer())
            .init();
    }

    tracing::info!("Starting swingers v{}", env!("CARGO_PKG_VERSION"));

    let store = JsonlStore::new(StorageConfig::new(config.data_dir.clone()));
    let engine = RatingEngine::new(config.rating.window_days);

    match cli.command {
        Commands::Serve {
            host,
            port,
            ephemeral,
        } => {
            let host = host.unwrap_or_else(|| config.server.host.clone());
            let port = port.unwrap_or(config.server.port);

            let store: Arc<dyn TournamentStore> = if ephemeral {
                tracing::warn!("Ephemeral mode: results are lost on shutdown");
                Arc::new(MemoryStore::new())
            } else {
                tracing::info!("Data directory: {}", config.data_dir.display());
                Arc::new(store)
            };

            let app = build_router(AppState::new(store, config));
            let addr = format!("{}:{}", host, port);
            let listener = tokio::net::TcpListener::bind(&addr).await?;
            tracing::info!("Listening on http://{}", addr);
            axum::serve(listener, app).await?;
        }
        Commands::Schedule {
            players,
            rounds,
            seed,
            sit_out_leftover,
            json,
        } => {
            let policy = if sit_out_leftover {
                LeftoverPolicy::SitOut
            } else {
                config.tournament.leftover_policy
            };
            let roster = Roster::new(players)?;
            let mut rng = schedule_rng(seed);
            let tournament = Tournament::generate(
                &config.tournament.default_name,
                roster,
                rounds,
                &PairingScheduler::new(policy),
                &mut rng,
            )?;

            if json {
                println!("{}", serde_json::to_string_pretty(&tournament)?);
                return Ok(());
            }

            for (i, round) in tournament.rounds.iter().enumerate() {
                println!("Round {}", i + 1);
                for m in &round.matches {
                    println!(
                        "  {} & {}  vs  {} & {}",
                        m.team1.p1, m.team1.p2, m.team2.p1, m.team2.p2
                    );
                }
                if !round.bench.is_empty() {
                    println!("  Sitting out: {}", round.bench.join(", "));
                }
            }
            if tournament.rounds.len() < rounds {
                println!(
                    "\nOnly {} of {} rounds could be scheduled.",
                    tournament.rounds.len(),
                    rounds
                );
            }
        }
        Commands::Standings => {
            let now = Utc::now();
            let profiles = store.player_profiles().await?;
            let history = store
                .tournament_history(Some(engine.window_start(now)))
                .await?;
            let rows = standings(&engine, &profiles, &history, now);

            if rows.is_empty() {
                println!("No finished tournaments yet.");
                return Ok(());
            }

            println!(
                "{:<20} {:>8} {:>6} {:>8} {:>8}",
                "Player", "Rating", "Played", "Match %", "Game %"
            );
            for row in &rows {
                println!(
                    "{:<20} {:>8.2} {:>6} {:>7}% {:>7}%",
                    row.name,
                    row.rating.final_rating,
                    row.tournaments_played,
                    row.match_winrate,
                    row.game_winrate
                );
            }
        }
        Commands::History { before, page_size } => {
            let page_size = page_size.unwrap_or(config.rating.history_page_size);
            let page = store.history_page(before, page_size).await?;

            if page.tournaments.is_empty() {
                println!("No tournaments found.");
                return Ok(());
            }

            for record in &page.tournaments {
                println!(
                    "{}  {} ({} players)",
                    record.created_at.format("%Y-%m-%d %H:%M"),
                    record.name,
                    record.participants()
                );
                for (rank, result) in record.results.iter().take(3).enumerate() {
                    println!(
                        "    {}. {}  {} wins, {:+}",
                        rank + 1,
                        result.name,
                        result.result.match_wins,
                        result.win_loss_diff
                    );
                }
            }
            if let Some(next) = page.next_before {
                println!("\nMore: --before {}", next.to_rfc3339());
            }
        }
        Commands::Rating { player } => {
            let directory = store.player_directory().await?;
            let id = directory
                .get(&player)
                .cloned()
                .unwrap_or_else(|| PlayerId::from(player.as_str()));
            let profile = store.load_profile(&id).await?.record;

            let now = Utc::now();
            let history = store
                .tournament_history(Some(engine.window_start(now)))
                .await?;
            let rating = engine.rating(&id, &history, now);

            println!("{} ({})", profile.name, profile.id);
            println!("Rating: {:.2}", rating.final_rating);
            println!("  {}", rating.breakdown());
        }
    }

    Ok(())
}

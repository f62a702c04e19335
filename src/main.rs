mod analysis;
mod cache;
mod config;
mod display;
mod error;
mod model;
mod store;

use analysis::head_to_head::{EntityKind, HeadToHeadMatrix};
use analysis::profile::{player_profile, rivalry};
use analysis::ranking::{
    character_leaderboard, form, hall_of_fame, leaderboard, most_played_characters,
    recent_matches, MatchLimit, FORM_LENGTH,
};
use analysis::record::{character_records, player_records};
use analysis::streak::chronological;
use analysis::summary::{overview, session_podium};
use cache::DatasetCache;
use clap::{Parser, Subcommand};
use config::Config;
use display::output::{
    display_characters, display_error, display_hall_of_fame, display_info, display_leaderboard,
    display_matrix, display_overview, display_player_profile, display_rivalry, display_session,
    display_success,
};
use error::AppError;
use indicatif::{ProgressBar, ProgressStyle};
use model::{Dataset, Directory};
use std::collections::HashMap;
use std::path::PathBuf;
use store::client::FirestoreClient;
use store::fetch_dataset;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(name = "smash-tracker")]
#[command(
    about = "Statistics for Super Smash Bros. matches played with friends",
    long_about = None
)]
struct Cli {
    /// Load a JSON snapshot (written by `export`) instead of the document store
    #[arg(long, global = true)]
    data: Option<PathBuf>,

    /// Ignore the on-disk cache and fetch everything again
    #[arg(long, global = true)]
    refresh: bool,

    /// Log level (overridden by RUST_LOG)
    #[arg(long, global = true, default_value = "warn")]
    log_level: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Totals and LAN/online split
    Overview,
    /// Player ranking with recent form
    Leaderboard,
    /// Character usage and win rates
    Characters {
        #[arg(short, long, default_value = "20")]
        top: usize,
    },
    /// Profile of one player (id, name or nickname)
    Player {
        player: String,
        /// Number of recent matches to list, or "all"
        #[arg(short, long, default_value = "10")]
        matches: MatchLimit,
    },
    /// Head-to-head rivalry between two players
    Matchup {
        a: String,
        b: String,
        #[arg(short, long, default_value = "all")]
        matches: MatchLimit,
    },
    /// Player against player table
    Matrix,
    /// Character against character table for the most played characters
    CharacterMatrix {
        #[arg(short, long, default_value = "10")]
        top: usize,
    },
    /// Hall of fame
    Records,
    /// Podium and matches of one session
    Session { id: String },
    /// Write the loaded dataset to a JSON snapshot
    Export { path: PathBuf },
}

fn main() {
    let cli = Cli::parse();

    let filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&cli.log_level));
    tracing_subscriber::registry()
        .with(filter)
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    if let Err(e) = run(cli) {
        display_error(&e.to_string());
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), AppError> {
    let config = Config::from_env()?;
    let dataset = load_dataset(&cli, &config)?;
    let directory = Directory::new(&dataset);

    match cli.command {
        Command::Overview => display_overview(&overview(&dataset)),
        Command::Leaderboard => {
            let board = leaderboard(&player_records(&dataset.matches), &directory);
            let forms: HashMap<String, Vec<bool>> = board
                .iter()
                .map(|entry| (entry.id.clone(), form(&dataset.matches, &entry.id, FORM_LENGTH)))
                .collect();
            display_leaderboard(&board, &forms);
        }
        Command::Characters { top } => {
            let records = character_records(&dataset.matches);
            let board = character_leaderboard(&records, &directory, top);
            display_characters(&board);
        }
        Command::Player { player, matches } => {
            let id = resolve_player(&directory, &player)?;
            let profile =
                player_profile(&dataset, &id, &config.thresholds, config.min_matchup_games);
            let history = recent_matches(&dataset.matches, &id, matches);
            display_player_profile(&profile, &history, &directory);
        }
        Command::Matchup { a, b, matches } => {
            let a = resolve_player(&directory, &a)?;
            let b = resolve_player(&directory, &b)?;
            let view = rivalry(&dataset, &a, &b, &config.thresholds);
            let history = recent_matches(&view.matches, &view.a, matches);
            display_rivalry(&view, &history, &directory);
        }
        Command::Matrix => {
            require_matches(&dataset)?;
            let ids = leaderboard(&player_records(&dataset.matches), &directory)
                .into_iter()
                .map(|entry| entry.id)
                .collect();
            let matrix = HeadToHeadMatrix::build(&dataset.matches, EntityKind::Player, ids);
            display_matrix("⚔️  HEAD TO HEAD", &matrix, |id| directory.player_name(id));
        }
        Command::CharacterMatrix { top } => {
            require_matches(&dataset)?;
            let ids = most_played_characters(&character_records(&dataset.matches), top);
            let matrix = HeadToHeadMatrix::build(&dataset.matches, EntityKind::Character, ids);
            display_matrix("🎮 CHARACTER MATCHUPS", &matrix, |id| directory.character_name(id));
        }
        Command::Records => {
            require_matches(&dataset)?;
            display_hall_of_fame(&hall_of_fame(&dataset));
        }
        Command::Session { id } => {
            let session = dataset
                .session(&id)
                .ok_or_else(|| AppError::SessionNotFound(id.clone()))?;
            let matches = dataset.matches_in_session(&id);
            let podium = session_podium(&dataset, &id);
            display_session(session, &podium, &chronological(&matches), &directory);
        }
        Command::Export { path } => {
            cache::write_snapshot(&path, &dataset)?;
            display_success(&format!(
                "Exported {} sessions and {} matches to {}",
                dataset.sessions.len(),
                dataset.matches.len(),
                path.display()
            ));
        }
    }

    Ok(())
}

fn resolve_player(directory: &Directory, query: &str) -> Result<String, AppError> {
    directory
        .find_player_id(query)
        .ok_or_else(|| AppError::PlayerNotFound(query.to_string()))
}

fn require_matches(dataset: &Dataset) -> Result<(), AppError> {
    if dataset.matches.is_empty() {
        return Err(AppError::NoMatches);
    }
    Ok(())
}

fn load_dataset(cli: &Cli, config: &Config) -> Result<Dataset, AppError> {
    if let Some(path) = &cli.data {
        info!("Loading snapshot from {}", path.display());
        return cache::read_snapshot(path);
    }

    let project = config.require_project()?;
    let source = config.store_source()?;

    if !cli.refresh {
        match DatasetCache::load(project) {
            Ok(Some(cached)) if cached.is_fresh_for(&source, config.cache_max_age_mins) => {
                display_info(&format!(
                    "Using cached data from {} (--refresh to update)",
                    cached.fetched_at.format("%Y-%m-%d %H:%M")
                ));
                return Ok(cached.dataset);
            }
            Ok(Some(cached)) if cached.source != source => {
                info!("Cache was fetched from {}, not {}", cached.source, source);
            }
            Ok(_) => {}
            Err(e) => warn!("Ignoring unreadable cache: {}", e),
        }
    }

    display_info(&format!("Fetching data from project {}", project));
    let client = FirestoreClient::new(config)?;

    let pb = ProgressBar::new(0);
    if let Ok(style) = ProgressStyle::with_template("{spinner} {msg} [{bar:30}] {pos}/{len}") {
        pb.set_style(style);
    }
    pb.set_message("Fetching sessions");
    let dataset = fetch_dataset(&client, |done, total| {
        pb.set_length(total as u64);
        pb.set_position(done as u64);
    });
    pb.finish_and_clear();
    let dataset = dataset?;

    display_success(&format!(
        "Loaded {} sessions and {} matches",
        dataset.sessions.len(),
        dataset.matches.len()
    ));

    let cache = DatasetCache::new(project, &source, dataset);
    if let Err(e) = cache.save() {
        warn!("Could not write cache: {}", e);
    }
    Ok(cache.dataset)
}

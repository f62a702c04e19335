pub mod client;
pub mod models;
pub mod value;

use crate::error::AppError;
use crate::model::{Character, Dataset, Match, Player, Session};
use tracing::info;

/// Read access to the four collections the tracker is built on.
pub trait DocumentStore {
    fn list_players(&self) -> Result<Vec<Player>, AppError>;
    fn list_characters(&self) -> Result<Vec<Character>, AppError>;
    fn list_sessions(&self) -> Result<Vec<Session>, AppError>;
    fn list_matches(&self, session: &Session) -> Result<Vec<Match>, AppError>;
}

/// Loads the whole dataset before any aggregation runs. `on_progress` is
/// called with `(sessions_done, sessions_total)` after each session's matches.
pub fn fetch_dataset(
    store: &dyn DocumentStore,
    mut on_progress: impl FnMut(usize, usize),
) -> Result<Dataset, AppError> {
    let players = store.list_players()?;
    let characters = store.list_characters()?;
    let sessions = store.list_sessions()?;

    let mut matches = Vec::new();
    for (idx, session) in sessions.iter().enumerate() {
        matches.extend(store.list_matches(session)?);
        on_progress(idx + 1, sessions.len());
    }

    info!(
        "Fetched {} players, {} characters, {} sessions, {} matches",
        players.len(),
        characters.len(),
        sessions.len(),
        matches.len()
    );

    Ok(Dataset {
        players,
        characters,
        sessions,
        matches,
    })
}

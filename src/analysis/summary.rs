use super::ranking::{leaderboard, RankedEntry};
use super::record::player_records;
use crate::model::{Dataset, Directory, SessionKind};
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct KindCount {
    pub sessions: usize,
    pub matches: usize,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overview {
    pub sessions: usize,
    pub matches: usize,
    pub players: usize,
    pub characters_played: usize,
    pub local: KindCount,
    pub online: KindCount,
}

pub fn overview(dataset: &Dataset) -> Overview {
    let characters_played: HashSet<&str> = dataset
        .matches
        .iter()
        .flat_map(|m| m.sides())
        .filter_map(|side| side.character.as_ref().map(|c| c.id.as_str()))
        .collect();

    let kinds: HashMap<&str, SessionKind> = dataset
        .sessions
        .iter()
        .map(|s| (s.id.as_str(), s.kind))
        .collect();

    let mut summary = Overview {
        sessions: dataset.sessions.len(),
        matches: dataset.matches.len(),
        players: dataset.players.len(),
        characters_played: characters_played.len(),
        ..Default::default()
    };

    for session in &dataset.sessions {
        match session.kind {
            SessionKind::Local => summary.local.sessions += 1,
            SessionKind::Online => summary.online.sessions += 1,
        }
    }
    for m in &dataset.matches {
        // orphaned matches count as local, the default kind
        match kinds.get(m.session_id.as_str()).copied().unwrap_or_default() {
            SessionKind::Local => summary.local.matches += 1,
            SessionKind::Online => summary.online.matches += 1,
        }
    }

    summary
}

/// Leaderboard restricted to one session's matches.
pub fn session_podium(dataset: &Dataset, session_id: &str) -> Vec<RankedEntry> {
    let matches = dataset.matches_in_session(session_id);
    let directory = Directory::new(dataset);
    leaderboard(&player_records(&matches), &directory)
}

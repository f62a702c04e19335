use crate::model::Match;
use std::collections::HashMap;
use std::hash::Hash;
use tracing::debug;

/// Win/loss tally for a player, a character, or any other key.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WinLoss {
    pub wins: u32,
    pub losses: u32,
    pub total: u32,
}

impl WinLoss {
    #[cfg(test)]
    pub fn new(wins: u32, losses: u32) -> Self {
        WinLoss {
            wins,
            losses,
            total: wins + losses,
        }
    }

    pub fn record(&mut self, won: bool) {
        if won {
            self.wins += 1;
        } else {
            self.losses += 1;
        }
        self.total += 1;
    }

    /// Percentage in `0.0..=100.0`, zero when nothing was played.
    pub fn winrate(&self) -> f64 {
        if self.total == 0 {
            0.0
        } else {
            (self.wins as f64 / self.total as f64) * 100.0
        }
    }
}

pub struct RecordTracker<K> {
    records: HashMap<K, WinLoss>,
}

impl<K: Eq + Hash> RecordTracker<K> {
    pub fn new() -> Self {
        RecordTracker {
            records: HashMap::new(),
        }
    }

    pub fn add_result(&mut self, key: K, won: bool) {
        self.records.entry(key).or_default().record(won);
    }

    pub fn into_records(self) -> HashMap<K, WinLoss> {
        self.records
    }
}

/// Zero record for entities that never played.
pub fn record_for(records: &HashMap<String, WinLoss>, id: &str) -> WinLoss {
    records.get(id).copied().unwrap_or_default()
}

pub fn player_records(matches: &[Match]) -> HashMap<String, WinLoss> {
    let mut tracker = RecordTracker::new();
    let mut skipped = 0;

    for m in matches {
        match m.decided() {
            Some(decided) => {
                tracker.add_result(decided.winner.player.id.clone(), true);
                tracker.add_result(decided.loser.player.id.clone(), false);
            }
            None => skipped += 1,
        }
    }

    if skipped > 0 {
        debug!("Skipped {} undecided matches while tallying players", skipped);
    }
    tracker.into_records()
}

/// Mirror matches credit the same character with both the win and the loss.
pub fn character_records(matches: &[Match]) -> HashMap<String, WinLoss> {
    let mut tracker = RecordTracker::new();

    for decided in matches.iter().filter_map(Match::decided) {
        if let Some(character) = &decided.winner.character {
            tracker.add_result(character.id.clone(), true);
        }
        if let Some(character) = &decided.loser.character {
            tracker.add_result(character.id.clone(), false);
        }
    }

    tracker.into_records()
}

/// Keyed by `(player_id, character_id)`.
pub fn player_character_records(matches: &[Match]) -> HashMap<(String, String), WinLoss> {
    let mut tracker = RecordTracker::new();

    for decided in matches.iter().filter_map(Match::decided) {
        for (side, won) in [(decided.winner, true), (decided.loser, false)] {
            if let Some(character) = &side.character {
                tracker.add_result((side.player.id.clone(), character.id.clone()), won);
            }
        }
    }

    tracker.into_records()
}

/// The player's record against each opponent they faced.
pub fn opponent_records(matches: &[Match], player_id: &str) -> HashMap<String, WinLoss> {
    let mut tracker = RecordTracker::new();

    for decided in matches.iter().filter_map(Match::decided) {
        if decided.winner.player.id == player_id {
            tracker.add_result(decided.loser.player.id.clone(), true);
        } else if decided.loser.player.id == player_id {
            tracker.add_result(decided.winner.player.id.clone(), false);
        }
    }

    tracker.into_records()
}

/// How many times the player picked each character, decided or not.
pub fn character_usage(matches: &[Match], player_id: &str) -> HashMap<String, u32> {
    let mut usage = HashMap::new();

    for m in matches {
        let character = m.side_of(player_id).and_then(|side| side.character.as_ref());
        if let Some(character) = character {
            *usage.entry(character.id.clone()).or_insert(0) += 1;
        }
    }

    usage
}

/// Per-character records of one player, keyed by character id.
pub fn characters_of_player(
    records: &HashMap<(String, String), WinLoss>,
    player_id: &str,
) -> HashMap<String, WinLoss> {
    records
        .iter()
        .filter(|((player, _), _)| player == player_id)
        .map(|((_, character), record)| (character.clone(), *record))
        .collect()
}

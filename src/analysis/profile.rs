//! View models combining the reducers for a single player or a single rivalry.

use super::badges::{
    evaluate_player, evaluate_rivalry, Badge, BadgeThresholds, PlayerBadgeInput, RivalryBadgeInput,
};
use super::head_to_head::{head_to_head, EntityKind, HeadToHead};
use super::ranking::{
    best_matchups, favorite_character, leaderboard, worst_matchups, FavoriteCharacter,
    MatchupEntry, MATCHUP_LIMIT,
};
use super::record::{
    character_usage, characters_of_player, opponent_records, player_character_records,
    player_records, record_for, WinLoss,
};
use super::streak::{player_streak, rivalry_streak, RivalryStreak, StreakRecord};
use crate::model::{Dataset, Directory, Match};
use chrono::{DateTime, Utc};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq)]
pub struct CharacterLine {
    pub id: String,
    pub name: String,
    pub record: WinLoss,
}

fn character_lines(
    records: HashMap<String, WinLoss>,
    directory: &Directory,
) -> Vec<CharacterLine> {
    let mut lines: Vec<CharacterLine> = records
        .into_iter()
        .map(|(id, record)| CharacterLine {
            name: directory.character_name(&id),
            id,
            record,
        })
        .collect();
    lines.sort_by(|a, b| b.record.total.cmp(&a.record.total).then_with(|| a.id.cmp(&b.id)));
    lines
}

#[derive(Debug, Clone)]
pub struct PlayerProfile {
    pub id: String,
    pub name: String,
    pub record: WinLoss,
    pub rank: Option<usize>,
    pub ranked_players: usize,
    pub streak: StreakRecord,
    pub characters: Vec<CharacterLine>,
    pub best_matchups: Vec<MatchupEntry>,
    pub worst_matchups: Vec<MatchupEntry>,
    pub favorite: Option<FavoriteCharacter>,
    pub badges: Vec<Badge>,
}

/// Everything shown on a player's page. A player without matches gets a zero
/// record and empty sections.
pub fn player_profile(
    dataset: &Dataset,
    player_id: &str,
    thresholds: &BadgeThresholds,
    min_matchup_games: u32,
) -> PlayerProfile {
    let directory = Directory::new(dataset);
    let matches = &dataset.matches;

    let records = player_records(matches);
    let board = leaderboard(&records, &directory);
    let rank = board.iter().find(|e| e.id == player_id).map(|e| e.rank);
    let record = record_for(&records, player_id);
    let streak = player_streak(matches, player_id);

    let characters = character_lines(
        characters_of_player(&player_character_records(matches), player_id),
        &directory,
    );
    let opponents = opponent_records(matches, player_id);
    let usage = character_usage(matches, player_id);
    let favorite = favorite_character(&usage, &directory);

    let badges = evaluate_player(
        &PlayerBadgeInput {
            record,
            streak,
            main_character: favorite.as_ref().map(|f| (f.name.clone(), f.count)),
            distinct_characters: usage.len(),
            rank,
            ranked_players: board.len(),
        },
        thresholds,
    );

    PlayerProfile {
        id: player_id.to_string(),
        name: directory.player_name(player_id),
        record,
        rank,
        ranked_players: board.len(),
        streak,
        characters,
        best_matchups: best_matchups(&opponents, &directory, min_matchup_games, MATCHUP_LIMIT),
        worst_matchups: worst_matchups(&opponents, &directory, min_matchup_games, MATCHUP_LIMIT),
        favorite,
        badges,
    }
}

#[derive(Debug, Clone)]
pub struct Rivalry {
    pub a: String,
    pub b: String,
    pub name_a: String,
    pub name_b: String,
    /// Record of `a` against `b`.
    pub record: HeadToHead,
    pub streak: RivalryStreak,
    pub characters_a: Vec<CharacterLine>,
    pub characters_b: Vec<CharacterLine>,
    pub last_played: Option<DateTime<Utc>>,
    pub matches: Vec<Match>,
    pub badges: Vec<Badge>,
}

impl Rivalry {
    /// Display name of either side, `None` for an id outside the rivalry.
    pub fn name_of(&self, id: &str) -> Option<&str> {
        if id == self.a {
            Some(&self.name_a)
        } else if id == self.b {
            Some(&self.name_b)
        } else {
            None
        }
    }
}

pub fn rivalry(dataset: &Dataset, a: &str, b: &str, thresholds: &BadgeThresholds) -> Rivalry {
    let directory = Directory::new(dataset);
    let matches = dataset.matches_between(a, b);

    let record = head_to_head(&matches, EntityKind::Player, a, b).unwrap_or_default();
    let streak = rivalry_streak(&matches, a, b);
    let per_character = player_character_records(&matches);
    let (name_a, name_b) = (directory.player_name(a), directory.player_name(b));

    let badges = evaluate_rivalry(
        &RivalryBadgeInput {
            name_a: name_a.clone(),
            name_b: name_b.clone(),
            record,
            streak: streak.clone(),
        },
        thresholds,
    );

    Rivalry {
        a: a.to_string(),
        b: b.to_string(),
        name_a,
        name_b,
        record,
        streak,
        characters_a: character_lines(characters_of_player(&per_character, a), &directory),
        characters_b: character_lines(characters_of_player(&per_character, b), &directory),
        last_played: matches.iter().filter_map(Match::timestamp).max(),
        matches,
        badges,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::ranking::MIN_MATCHUP_GAMES;
    use crate::model::fixtures::{game, player};

    fn dataset() -> Dataset {
        Dataset {
            players: vec![player("a", "Alice"), player("b", "Bob"), player("idle", "Idle")],
            matches: vec![
                game("a", "mario", "b", "link", "a", 1),
                game("a", "mario", "b", "link", "a", 2),
                game("a", "mario", "b", "link", "a", 3),
                game("b", "link", "a", "fox", "a", 4),
                game("b", "link", "a", "mario", "a", 5),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_player_profile() {
        let data = dataset();
        let profile = player_profile(&data, "a", &BadgeThresholds::default(), MIN_MATCHUP_GAMES);

        assert_eq!(profile.name, "Alice");
        assert_eq!(profile.record, WinLoss::new(5, 0));
        assert_eq!(profile.rank, Some(1));
        assert_eq!(profile.ranked_players, 2);
        assert_eq!(profile.streak.current_wins, 5);
        assert_eq!(profile.characters[0].id, "mario");
        assert_eq!(profile.characters[0].record, WinLoss::new(4, 0));
        assert_eq!(profile.best_matchups[0].opponent_id, "b");
        assert_eq!(profile.favorite.as_ref().map(|f| f.count), Some(4));

        let ids: Vec<&str> = profile.badges.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["on-fire", "record-streak", "champion"]);
    }

    #[test]
    fn test_profile_without_matches() {
        let data = dataset();
        let profile = player_profile(&data, "idle", &BadgeThresholds::default(), MIN_MATCHUP_GAMES);

        assert_eq!(profile.record, WinLoss::default());
        assert_eq!(profile.rank, None);
        assert!(profile.characters.is_empty());
        assert!(profile.badges.is_empty());
    }

    #[test]
    fn test_rivalry() {
        let data = dataset();
        let view = rivalry(&data, "b", "a", &BadgeThresholds::default());

        assert_eq!(view.record, WinLoss::new(0, 5));
        assert_eq!(view.streak.max_b, 5);
        assert_eq!(view.characters_a[0].id, "link");
        assert_eq!(view.characters_b.len(), 2);
        assert_eq!(view.matches.len(), 5);
        assert!(view.last_played.is_some());

        let ids: Vec<&str> = view.badges.iter().map(|b| b.id).collect();
        assert_eq!(ids, vec!["domination", "nemesis", "fire-streak"]);
    }

    #[test]
    fn test_rivalry_streak_holder_name() {
        let data = dataset();
        let view = rivalry(&data, "b", "a", &BadgeThresholds::default());

        let holder = view.streak.current_holder.as_deref().unwrap();
        assert_eq!(view.name_of(holder), Some("Alice"));
        assert_eq!(view.name_of("b"), Some("Bob"));
        assert_eq!(view.name_of("idle"), None);
    }

    #[test]
    fn test_rivalry_without_encounters() {
        let data = dataset();
        let view = rivalry(&data, "a", "idle", &BadgeThresholds::default());
        assert_eq!(view.record.total, 0);
        assert!(view.last_played.is_none());
        assert!(view.badges.is_empty());
    }
}

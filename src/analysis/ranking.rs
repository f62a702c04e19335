use super::record::{character_records, player_records, WinLoss};
use super::streak::{chronological, longest_win_streak, LongestStreak};
use crate::model::{Dataset, Directory, Match};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::str::FromStr;

/// Opponents need at least this many games to count as a matchup.
pub const MIN_MATCHUP_GAMES: u32 = 3;
pub const MATCHUP_LIMIT: usize = 5;
pub const FORM_LENGTH: usize = 5;
/// Winrate records only consider entities with this many matches.
pub const RECORD_MIN_MATCHES: u32 = 10;

#[derive(Debug, Clone, PartialEq)]
pub struct RankedEntry {
    pub rank: usize,
    pub id: String,
    pub name: String,
    pub record: WinLoss,
}

fn by_winrate(a: &(&String, &WinLoss), b: &(&String, &WinLoss)) -> Ordering {
    b.1.winrate()
        .partial_cmp(&a.1.winrate())
        .unwrap_or(Ordering::Equal)
        .then_with(|| b.1.wins.cmp(&a.1.wins))
        .then_with(|| a.0.cmp(b.0))
}

fn by_usage(a: &(&String, &WinLoss), b: &(&String, &WinLoss)) -> Ordering {
    b.1.total
        .cmp(&a.1.total)
        .then_with(|| b.1.winrate().partial_cmp(&a.1.winrate()).unwrap_or(Ordering::Equal))
        .then_with(|| a.0.cmp(b.0))
}

fn ranked(
    records: &HashMap<String, WinLoss>,
    order: fn(&(&String, &WinLoss), &(&String, &WinLoss)) -> Ordering,
    name_of: impl Fn(&str) -> String,
) -> Vec<RankedEntry> {
    let mut entries: Vec<(&String, &WinLoss)> =
        records.iter().filter(|(_, r)| r.total > 0).collect();
    entries.sort_by(order);

    entries
        .into_iter()
        .enumerate()
        .map(|(idx, (id, record))| RankedEntry {
            rank: idx + 1,
            id: id.clone(),
            name: name_of(id),
            record: *record,
        })
        .collect()
}

/// Players with at least one decided match, best winrate first, then most wins.
pub fn leaderboard(records: &HashMap<String, WinLoss>, directory: &Directory) -> Vec<RankedEntry> {
    ranked(records, by_winrate, |id| directory.player_name(id))
}

/// Characters by number of matches played.
pub fn character_leaderboard(
    records: &HashMap<String, WinLoss>,
    directory: &Directory,
    top: usize,
) -> Vec<RankedEntry> {
    let mut entries = ranked(records, by_usage, |id| directory.character_name(id));
    entries.truncate(top);
    entries
}

/// Character ids of the `top` most played characters.
pub fn most_played_characters(records: &HashMap<String, WinLoss>, top: usize) -> Vec<String> {
    let mut entries: Vec<(&String, &WinLoss)> =
        records.iter().filter(|(_, r)| r.total > 0).collect();
    entries.sort_by(by_usage);
    entries.into_iter().take(top).map(|(id, _)| id.clone()).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub struct MatchupEntry {
    pub opponent_id: String,
    pub opponent_name: String,
    pub record: WinLoss,
}

fn matchups(
    opponents: &HashMap<String, WinLoss>,
    directory: &Directory,
    min_matches: u32,
    limit: usize,
    best_first: bool,
) -> Vec<MatchupEntry> {
    let mut entries: Vec<MatchupEntry> = opponents
        .iter()
        .filter(|(_, record)| record.total >= min_matches)
        .map(|(id, record)| MatchupEntry {
            opponent_id: id.clone(),
            opponent_name: directory.player_name(id),
            record: *record,
        })
        .collect();

    entries.sort_by(|a, b| {
        let rates = a.record.winrate().partial_cmp(&b.record.winrate()).unwrap_or(Ordering::Equal);
        let rates = if best_first { rates.reverse() } else { rates };
        rates
            .then_with(|| b.record.total.cmp(&a.record.total))
            .then_with(|| a.opponent_id.cmp(&b.opponent_id))
    });
    entries.truncate(limit);
    entries
}

/// Opponents the player beats most often.
pub fn best_matchups(
    opponents: &HashMap<String, WinLoss>,
    directory: &Directory,
    min_matches: u32,
    limit: usize,
) -> Vec<MatchupEntry> {
    matchups(opponents, directory, min_matches, limit, true)
}

/// Opponents the player struggles against.
pub fn worst_matchups(
    opponents: &HashMap<String, WinLoss>,
    directory: &Directory,
    min_matches: u32,
    limit: usize,
) -> Vec<MatchupEntry> {
    matchups(opponents, directory, min_matches, limit, false)
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FavoriteCharacter {
    pub id: String,
    pub name: String,
    pub count: u32,
}

pub fn favorite_character(
    usage: &HashMap<String, u32>,
    directory: &Directory,
) -> Option<FavoriteCharacter> {
    usage
        .iter()
        .max_by(|(a_id, a), (b_id, b)| a.cmp(b).then_with(|| b_id.cmp(a_id)))
        .map(|(id, count)| FavoriteCharacter {
            id: id.clone(),
            name: directory.character_name(id),
            count: *count,
        })
}

/// Last `n` decided results of the player, most recent first.
pub fn form(matches: &[Match], player_id: &str, n: usize) -> Vec<bool> {
    chronological(matches)
        .into_iter()
        .rev()
        .filter_map(|m| m.result_for(player_id))
        .take(n)
        .collect()
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchLimit {
    Count(usize),
    All,
}

impl FromStr for MatchLimit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s.eq_ignore_ascii_case("all") {
            return Ok(MatchLimit::All);
        }
        s.parse::<usize>()
            .map(MatchLimit::Count)
            .map_err(|_| format!("expected a number or \"all\", got \"{}\"", s))
    }
}

/// Matches involving the player, newest first.
pub fn recent_matches<'a>(
    matches: &'a [Match],
    player_id: &str,
    limit: MatchLimit,
) -> Vec<&'a Match> {
    let mut history: Vec<&Match> = matches.iter().filter(|m| m.involves(player_id)).collect();
    history.sort_by(|a, b| b.timestamp().cmp(&a.timestamp()));

    if let MatchLimit::Count(n) = limit {
        history.truncate(n);
    }
    history
}

#[derive(Debug, Clone, Default, PartialEq)]
pub struct HallOfFame {
    pub best_winrate: Option<RankedEntry>,
    pub most_wins: Option<RankedEntry>,
    pub most_matches: Option<RankedEntry>,
    pub most_played_character: Option<RankedEntry>,
    pub best_character: Option<RankedEntry>,
    pub longest_streak: Option<LongestStreak>,
}

/// Single best entry by `key`, ties going to the smaller id.
fn top_by(
    records: &HashMap<String, WinLoss>,
    name_of: impl Fn(&str) -> String,
    min_matches: u32,
    key: fn(&WinLoss) -> f64,
) -> Option<RankedEntry> {
    records
        .iter()
        .filter(|(_, r)| r.total >= min_matches.max(1))
        .max_by(|(a_id, a), (b_id, b)| {
            key(a)
                .partial_cmp(&key(b))
                .unwrap_or(Ordering::Equal)
                .then_with(|| b_id.cmp(a_id))
        })
        .map(|(id, record)| RankedEntry {
            rank: 1,
            id: id.clone(),
            name: name_of(id),
            record: *record,
        })
}

/// Standout records across the whole dataset. Winrate records require
/// `RECORD_MIN_MATCHES` decided matches.
pub fn hall_of_fame(dataset: &Dataset) -> HallOfFame {
    let directory = Directory::new(dataset);
    let players = player_records(&dataset.matches);
    let characters = character_records(&dataset.matches);
    let player_name = |id: &str| directory.player_name(id);
    let character_name = |id: &str| directory.character_name(id);

    HallOfFame {
        best_winrate: top_by(&players, player_name, RECORD_MIN_MATCHES, WinLoss::winrate),
        most_wins: top_by(&players, player_name, 1, |r| r.wins as f64),
        most_matches: top_by(&players, player_name, 1, |r| r.total as f64),
        most_played_character: top_by(&characters, character_name, 1, |r| r.total as f64),
        best_character: top_by(&characters, character_name, RECORD_MIN_MATCHES, WinLoss::winrate),
        longest_streak: longest_win_streak(&dataset.matches, &directory),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::record::{character_usage, opponent_records};
    use crate::model::fixtures::{game, player};
    use crate::model::Dataset;

    fn dataset() -> Dataset {
        Dataset {
            players: vec![player("a", "Alice"), player("b", "Bob"), player("c", "Cleo")],
            matches: vec![
                game("a", "mario", "b", "link", "a", 1),
                game("a", "mario", "b", "link", "a", 2),
                game("a", "mario", "b", "link", "b", 3),
                game("a", "fox", "c", "link", "c", 4),
                game("a", "fox", "c", "link", "c", 5),
                game("a", "fox", "c", "kirby", "c", 6),
                game("b", "link", "c", "kirby", "b", 7),
            ],
            ..Default::default()
        }
    }

    #[test]
    fn test_leaderboard_order() {
        let data = dataset();
        let directory = Directory::new(&data);
        let board = leaderboard(&player_records(&data.matches), &directory);

        let names: Vec<&str> = board.iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["Cleo", "Bob", "Alice"]);
        assert_eq!(board[0].rank, 1);
        assert_eq!(board[0].record, WinLoss::new(3, 1));
    }

    #[test]
    fn test_leaderboard_tie_breaks_on_wins() {
        let matches = vec![
            game("a", "mario", "b", "link", "a", 1),
            game("c", "fox", "d", "kirby", "c", 2),
            game("c", "fox", "d", "kirby", "c", 3),
        ];
        let data = Dataset::default();
        let directory = Directory::new(&data);
        let board = leaderboard(&player_records(&matches), &directory);

        assert_eq!(board[0].id, "c");
        assert_eq!(board[1].id, "a");
        assert_eq!(board.len(), 4);
    }

    #[test]
    fn test_leaderboard_skips_players_without_matches() {
        let mut records = HashMap::new();
        records.insert("idle".to_string(), WinLoss::default());
        let data = Dataset::default();
        assert!(leaderboard(&records, &Directory::new(&data)).is_empty());
    }

    #[test]
    fn test_character_leaderboard() {
        let data = dataset();
        let directory = Directory::new(&data);
        let records = character_records(&data.matches);

        let board = character_leaderboard(&records, &directory, 2);
        assert_eq!(board.len(), 2);
        assert_eq!(board[0].id, "link");
        assert_eq!(board[0].record.total, 6);
        assert_eq!(most_played_characters(&records, 1), vec!["link".to_string()]);
    }

    #[test]
    fn test_best_and_worst_matchups() {
        let data = dataset();
        let directory = Directory::new(&data);
        let opponents = opponent_records(&data.matches, "a");

        let best = best_matchups(&opponents, &directory, MIN_MATCHUP_GAMES, MATCHUP_LIMIT);
        let worst = worst_matchups(&opponents, &directory, MIN_MATCHUP_GAMES, MATCHUP_LIMIT);
        assert_eq!(best[0].opponent_name, "Bob");
        assert_eq!(worst[0].opponent_name, "Cleo");

        let strict = best_matchups(&opponents, &directory, 4, MATCHUP_LIMIT);
        assert!(strict.is_empty());
    }

    #[test]
    fn test_form_is_newest_first() {
        let data = dataset();
        assert_eq!(form(&data.matches, "a", FORM_LENGTH), vec![false, false, false, false, true]);
        assert!(form(&[], "a", FORM_LENGTH).is_empty());
    }

    #[test]
    fn test_recent_matches_limit() {
        let data = dataset();
        let recent = recent_matches(&data.matches, "b", MatchLimit::Count(2));
        assert_eq!(recent.len(), 2);
        assert_eq!(recent[0].id, "m7");
        assert_eq!(recent_matches(&data.matches, "b", MatchLimit::All).len(), 4);
    }

    #[test]
    fn test_match_limit_parse() {
        assert_eq!("all".parse::<MatchLimit>(), Ok(MatchLimit::All));
        assert_eq!("10".parse::<MatchLimit>(), Ok(MatchLimit::Count(10)));
        assert!("ten".parse::<MatchLimit>().is_err());
    }

    #[test]
    fn test_favorite_character() {
        let data = dataset();
        let directory = Directory::new(&data);
        let usage = character_usage(&data.matches, "a");

        let favorite = favorite_character(&usage, &directory).unwrap();
        assert_eq!(favorite.count, 3);
        // mario and fox tie, the smaller id wins
        assert_eq!(favorite.id, "fox");
        assert!(favorite_character(&HashMap::new(), &directory).is_none());
    }

    #[test]
    fn test_hall_of_fame() {
        let mut matches = Vec::new();
        for minute in 0..10 {
            let winner = if minute < 7 { "a" } else { "b" };
            matches.push(game("a", "mario", "b", "link", winner, minute));
        }
        matches.push(game("c", "fox", "b", "link", "c", 20));
        let data = Dataset {
            players: vec![player("a", "Alice"), player("b", "Bob"), player("c", "Cleo")],
            matches,
            ..Default::default()
        };

        let fame = hall_of_fame(&data);
        // Cleo is unbeaten but below the match threshold
        assert_eq!(fame.best_winrate.as_ref().map(|e| e.id.as_str()), Some("a"));
        assert_eq!(fame.most_wins.as_ref().map(|e| e.record.wins), Some(7));
        assert_eq!(fame.most_matches.as_ref().map(|e| e.name.as_str()), Some("Bob"));
        assert_eq!(fame.most_played_character.as_ref().map(|e| e.id.as_str()), Some("link"));
        assert_eq!(fame.best_character.as_ref().map(|e| e.id.as_str()), Some("mario"));
        assert_eq!(fame.longest_streak.as_ref().map(|s| s.length), Some(7));
    }

    #[test]
    fn test_hall_of_fame_empty() {
        assert_eq!(hall_of_fame(&Dataset::default()), HallOfFame::default());
    }
}

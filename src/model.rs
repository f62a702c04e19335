use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Player {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub favorite_characters: Vec<String>,
}

impl Player {
    /// Nickname when set, otherwise the display name.
    pub fn label(&self) -> &str {
        match self.nickname.as_deref() {
            Some(nick) if !nick.trim().is_empty() => nick,
            _ => &self.name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Character {
    pub id: String,
    pub name: String,
    pub number: u32,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub icon: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum SessionKind {
    #[default]
    #[serde(rename = "lan", alias = "local")]
    Local,
    #[serde(rename = "online", alias = "remote")]
    Online,
}

impl SessionKind {
    /// Unknown or missing kinds fall back to a local session.
    pub fn parse(raw: Option<&str>) -> Self {
        match raw.map(|s| s.trim().to_ascii_lowercase()).as_deref() {
            Some("online") | Some("remote") => SessionKind::Online,
            _ => SessionKind::Local,
        }
    }
}

impl fmt::Display for SessionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            SessionKind::Local => write!(f, "LAN"),
            SessionKind::Online => write!(f, "Online"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Session {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub kind: SessionKind,
    #[serde(default)]
    pub date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub players: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CharacterRef {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchSide {
    pub player: PlayerRef,
    #[serde(default)]
    pub character: Option<CharacterRef>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Match {
    pub id: String,
    pub session_id: String,
    #[serde(default)]
    pub player1: Option<MatchSide>,
    #[serde(default)]
    pub player2: Option<MatchSide>,
    #[serde(default)]
    pub winner: Option<PlayerRef>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub played_at: Option<DateTime<Utc>>,
    #[serde(default)]
    pub created_at: Option<DateTime<Utc>>,
}

/// Winner and loser sides of a match whose outcome is unambiguous.
#[derive(Debug, Clone, Copy)]
pub struct Decided<'a> {
    pub winner: &'a MatchSide,
    pub loser: &'a MatchSide,
}

impl Match {
    /// Resolves the outcome. `None` when a side or the winner is missing (an
    /// empty id counts as missing), when both sides are the same player, or
    /// when the winner is neither side.
    pub fn decided(&self) -> Option<Decided<'_>> {
        let p1 = self.player1.as_ref().filter(|s| !s.player.id.is_empty())?;
        let p2 = self.player2.as_ref().filter(|s| !s.player.id.is_empty())?;
        if p1.player.id == p2.player.id {
            return None;
        }
        let winner = self.winner.as_ref().filter(|w| !w.id.is_empty())?;

        if winner.id == p1.player.id {
            Some(Decided { winner: p1, loser: p2 })
        } else if winner.id == p2.player.id {
            Some(Decided { winner: p2, loser: p1 })
        } else {
            None
        }
    }

    pub fn sides(&self) -> impl Iterator<Item = &MatchSide> {
        self.player1.iter().chain(self.player2.iter())
    }

    pub fn involves(&self, player_id: &str) -> bool {
        self.sides().any(|side| side.player.id == player_id)
    }

    pub fn side_of(&self, player_id: &str) -> Option<&MatchSide> {
        self.sides().find(|side| side.player.id == player_id)
    }

    pub fn opponent_of(&self, player_id: &str) -> Option<&MatchSide> {
        match (&self.player1, &self.player2) {
            (Some(p1), Some(p2)) if p1.player.id == player_id => Some(p2),
            (Some(p1), Some(p2)) if p2.player.id == player_id => Some(p1),
            _ => None,
        }
    }

    /// `Some(true)` if the player won, `Some(false)` if they lost, `None` when
    /// they did not take part or the match is undecided.
    pub fn result_for(&self, player_id: &str) -> Option<bool> {
        let decided = self.decided()?;
        if decided.winner.player.id == player_id {
            Some(true)
        } else if decided.loser.player.id == player_id {
            Some(false)
        } else {
            None
        }
    }

    /// Result timestamp, falling back to the creation timestamp.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        self.played_at.or(self.created_at)
    }

    pub fn parsed_score(&self) -> Option<Score> {
        self.score.as_deref().and_then(Score::parse)
    }
}

/// A best-of score such as `3-1`. Never used to decide who won.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Score {
    pub left: u32,
    pub right: u32,
}

impl Score {
    pub fn parse(raw: &str) -> Option<Self> {
        let (left, right) = raw.trim().split_once('-')?;
        Some(Score {
            left: left.trim().parse().ok()?,
            right: right.trim().parse().ok()?,
        })
    }

    /// Higher number first, as seen from the winner.
    pub fn winner_first(&self) -> String {
        format!("{}-{}", self.left.max(self.right), self.left.min(self.right))
    }

    pub fn from_perspective(&self, won: bool) -> String {
        let (high, low) = (self.left.max(self.right), self.left.min(self.right));
        if won {
            format!("{}-{}", high, low)
        } else {
            format!("{}-{}", low, high)
        }
    }
}

/// Everything the aggregation needs, fetched in one go.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Dataset {
    pub players: Vec<Player>,
    pub characters: Vec<Character>,
    pub sessions: Vec<Session>,
    pub matches: Vec<Match>,
}

impl Dataset {
    pub fn session(&self, session_id: &str) -> Option<&Session> {
        self.sessions.iter().find(|s| s.id == session_id)
    }

    pub fn matches_in_session(&self, session_id: &str) -> Vec<Match> {
        self.matches
            .iter()
            .filter(|m| m.session_id == session_id)
            .cloned()
            .collect()
    }

    /// Matches where both given players faced each other.
    pub fn matches_between(&self, a: &str, b: &str) -> Vec<Match> {
        self.matches
            .iter()
            .filter(|m| m.involves(a) && m.involves(b) && a != b)
            .cloned()
            .collect()
    }
}

/// Name lookup over the reference tables, falling back to the snapshots
/// embedded in matches for deleted players and characters.
pub struct Directory<'a> {
    players: HashMap<&'a str, &'a Player>,
    characters: HashMap<&'a str, &'a Character>,
    player_snapshots: HashMap<&'a str, &'a str>,
    character_snapshots: HashMap<&'a str, &'a str>,
}

impl<'a> Directory<'a> {
    pub fn new(dataset: &'a Dataset) -> Self {
        let mut player_snapshots = HashMap::new();
        let mut character_snapshots = HashMap::new();

        for side in dataset.matches.iter().flat_map(|m| m.sides()) {
            if !side.player.name.is_empty() {
                player_snapshots.insert(side.player.id.as_str(), side.player.name.as_str());
            }
            if let Some(character) = &side.character {
                if !character.name.is_empty() {
                    character_snapshots.insert(character.id.as_str(), character.name.as_str());
                }
            }
        }

        Directory {
            players: dataset.players.iter().map(|p| (p.id.as_str(), p)).collect(),
            characters: dataset.characters.iter().map(|c| (c.id.as_str(), c)).collect(),
            player_snapshots,
            character_snapshots,
        }
    }

    pub fn player(&self, id: &str) -> Option<&'a Player> {
        self.players.get(id).copied()
    }

    pub fn character(&self, id: &str) -> Option<&'a Character> {
        self.characters.get(id).copied()
    }

    pub fn player_name(&self, id: &str) -> String {
        if let Some(player) = self.player(id) {
            return player.label().to_string();
        }
        self.player_snapshots
            .get(id)
            .map(|name| name.to_string())
            .unwrap_or_else(|| id.to_string())
    }

    pub fn character_name(&self, id: &str) -> String {
        if let Some(character) = self.character(id) {
            return character.name.clone();
        }
        self.character_snapshots
            .get(id)
            .map(|name| name.to_string())
            .unwrap_or_else(|| id.to_string())
    }

    /// Accepts either an id or a (case-insensitive) name or nickname.
    pub fn find_player_id(&self, query: &str) -> Option<String> {
        if self.players.contains_key(query) || self.player_snapshots.contains_key(query) {
            return Some(query.to_string());
        }
        let needle = query.to_lowercase();
        self.players
            .values()
            .find(|p| {
                p.name.to_lowercase() == needle
                    || p.nickname
                        .as_deref()
                        .map(str::to_lowercase)
                        .as_deref()
                        == Some(needle.as_str())
            })
            .map(|p| p.id.clone())
            .or_else(|| {
                self.player_snapshots
                    .iter()
                    .find(|(_, name)| name.to_lowercase() == needle)
                    .map(|(id, _)| id.to_string())
            })
    }
}


#[cfg(test)]
mod tests {
    use super::fixtures::*;
    use super::*;

    #[test]
    fn test_decided_resolves_winner_and_loser() {
        let m = game("a", "mario", "b", "link", "b", 0);
        let decided = m.decided().unwrap();
        assert_eq!(decided.winner.player.id, "b");
        assert_eq!(decided.loser.player.id, "a");
    }

    #[test]
    fn test_decided_rejects_foreign_winner() {
        let m = game("a", "mario", "b", "link", "c", 0);
        assert!(m.decided().is_none());
        assert_eq!(m.result_for("a"), None);
    }

    #[test]
    fn test_decided_rejects_self_match() {
        let m = game("a", "mario", "a", "link", "a", 0);
        assert!(m.decided().is_none());
    }

    #[test]
    fn test_decided_rejects_missing_side() {
        let mut m = game("a", "mario", "b", "link", "a", 0);
        m.player2 = None;
        assert!(m.decided().is_none());
        assert!(m.involves("a"));
        assert!(m.opponent_of("a").is_none());
    }

    #[test]
    fn test_decided_treats_empty_ids_as_absent() {
        let mut m = game("a", "mario", "b", "link", "a", 0);
        m.player1.as_mut().unwrap().player.id = String::new();
        m.winner.as_mut().unwrap().id = String::new();
        assert!(m.decided().is_none());

        let mut m = game("a", "mario", "b", "link", "b", 0);
        m.winner.as_mut().unwrap().id = String::new();
        assert!(m.decided().is_none());
        assert_eq!(m.result_for("b"), None);
    }

    #[test]
    fn test_snapshot_with_empty_id_is_not_ranked() {
        let mut blank = game("a", "mario", "b", "link", "a", 0);
        blank.player1.as_mut().unwrap().player.id = String::new();
        blank.winner.as_mut().unwrap().id = String::new();
        let json = serde_json::to_string(&Dataset {
            matches: vec![blank],
            ..Default::default()
        })
        .unwrap();

        let dataset: Dataset = serde_json::from_str(&json).unwrap();
        let records = crate::analysis::record::player_records(&dataset.matches);
        assert!(records.is_empty());
    }

    #[test]
    fn test_score_display() {
        let score = Score::parse("2-3").unwrap();
        assert_eq!(score.winner_first(), "3-2");
        assert_eq!(score.from_perspective(false), "2-3");
        assert!(Score::parse("3 - 1").is_some());
        assert!(Score::parse("abc").is_none());
    }

    #[test]
    fn test_session_kind_parse() {
        assert_eq!(SessionKind::parse(Some("online")), SessionKind::Online);
        assert_eq!(SessionKind::parse(Some("remote")), SessionKind::Online);
        assert_eq!(SessionKind::parse(Some("lan")), SessionKind::Local);
        assert_eq!(SessionKind::parse(None), SessionKind::Local);
        assert_eq!(SessionKind::parse(Some("weird")), SessionKind::Local);
    }

    #[test]
    fn test_directory_falls_back_to_snapshot() {
        let dataset = Dataset {
            players: vec![player("a", "Alice")],
            matches: vec![game("a", "mario", "ghost", "link", "a", 0)],
            ..Default::default()
        };
        let directory = Directory::new(&dataset);

        assert_eq!(directory.player_name("a"), "Alice");
        assert_eq!(directory.player_name("ghost"), "GHOST");
        assert_eq!(directory.player_name("nobody"), "nobody");
        assert_eq!(directory.character_name("link"), "LINK");
        assert_eq!(directory.find_player_id("alice"), Some("a".to_string()));
        assert_eq!(directory.find_player_id("ghost"), Some("ghost".to_string()));
    }
}

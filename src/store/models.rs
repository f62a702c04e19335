use crate::model::{
    Character, CharacterRef, Match, MatchSide, Player, PlayerRef, Session, SessionKind,
};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

// users/{id}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerDoc {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub nickname: Option<String>,
    #[serde(default)]
    pub favorite_characters: Vec<String>,
}

impl From<PlayerDoc> for Player {
    fn from(doc: PlayerDoc) -> Self {
        Player {
            name: present(doc.name).unwrap_or_else(|| doc.id.clone()),
            id: doc.id,
            nickname: present(doc.nickname),
            favorite_characters: doc.favorite_characters,
        }
    }
}

// characters/{id}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterDoc {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    /// Roster index, stored either as a number or as a padded string ("01").
    #[serde(default)]
    pub number: Option<Value>,
    #[serde(default)]
    pub series: Option<String>,
    #[serde(default)]
    pub images: Option<ImagesDoc>,
}

#[derive(Debug, Deserialize)]
pub struct ImagesDoc {
    #[serde(default)]
    pub icon: Option<String>,
}

impl From<CharacterDoc> for Character {
    fn from(doc: CharacterDoc) -> Self {
        let number = match doc.number {
            Some(Value::Number(n)) => n.as_u64().unwrap_or(0) as u32,
            Some(Value::String(s)) => s.trim().parse().unwrap_or(0),
            _ => 0,
        };

        Character {
            name: present(doc.name).unwrap_or_else(|| doc.id.clone()),
            id: doc.id,
            number,
            series: present(doc.series),
            icon: doc.images.and_then(|images| present(images.icon)),
        }
    }
}

// sessions/{id}
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionDoc {
    pub id: String,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub session_type: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    /// Seeded sessions list participants under `players`.
    #[serde(default)]
    pub players: Vec<String>,
    /// Sessions created from the app use `playerIds`.
    #[serde(default)]
    pub player_ids: Vec<String>,
}

impl From<SessionDoc> for Session {
    fn from(doc: SessionDoc) -> Self {
        Session {
            name: present(doc.name).unwrap_or_else(|| doc.id.clone()),
            id: doc.id,
            kind: SessionKind::parse(doc.session_type.as_deref()),
            date: parse_timestamp(doc.date.as_deref()),
            created_at: parse_timestamp(doc.created_at.as_deref()),
            players: if doc.players.is_empty() {
                doc.player_ids
            } else {
                doc.players
            },
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct RefDoc {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SideDoc {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub character: Option<RefDoc>,
}

// sessions/{id}/matches/{id}
//
// Matches written by the app nest each side (`player1.character.id`); the
// original seed data used flat fields (`player1Id`, `player1Character`). Both
// are accepted, the nested layout taking precedence.
#[derive(Debug, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchDoc {
    pub id: String,
    #[serde(default)]
    pub player1: Option<SideDoc>,
    #[serde(default)]
    pub player2: Option<SideDoc>,
    #[serde(default)]
    pub winner: Option<RefDoc>,
    #[serde(default)]
    pub score: Option<String>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,

    #[serde(default)]
    pub player1_id: Option<String>,
    #[serde(default)]
    pub player1_name: Option<String>,
    #[serde(default)]
    pub player1_character: Option<String>,
    #[serde(default)]
    pub player2_id: Option<String>,
    #[serde(default)]
    pub player2_name: Option<String>,
    #[serde(default)]
    pub player2_character: Option<String>,
    #[serde(default)]
    pub winner_id: Option<String>,
    #[serde(default)]
    pub timestamp: Option<String>,
}

fn present(value: Option<String>) -> Option<String> {
    value.filter(|s| !s.trim().is_empty())
}

pub fn parse_timestamp(raw: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = raw?.trim();
    DateTime::parse_from_rfc3339(raw)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

fn character_ref(doc: Option<RefDoc>) -> Option<CharacterRef> {
    let doc = doc?;
    let id = present(doc.id)?;
    Some(CharacterRef {
        name: present(doc.name).unwrap_or_default(),
        id,
    })
}

fn nested_side(doc: Option<SideDoc>) -> Option<MatchSide> {
    let doc = doc?;
    let id = present(doc.id)?;
    Some(MatchSide {
        player: PlayerRef {
            name: present(doc.name).unwrap_or_default(),
            id,
        },
        character: character_ref(doc.character),
    })
}

fn flat_side(
    id: Option<String>,
    name: Option<String>,
    character: Option<String>,
) -> Option<MatchSide> {
    let id = present(id)?;
    Some(MatchSide {
        player: PlayerRef {
            name: present(name).unwrap_or_default(),
            id,
        },
        character: present(character).map(|id| CharacterRef {
            id,
            name: String::new(),
        }),
    })
}

impl MatchDoc {
    pub fn into_match(self, session_id: &str) -> Match {
        let player1 = nested_side(self.player1)
            .or_else(|| flat_side(self.player1_id, self.player1_name, self.player1_character));
        let player2 = nested_side(self.player2)
            .or_else(|| flat_side(self.player2_id, self.player2_name, self.player2_character));

        let winner_id = self
            .winner
            .as_ref()
            .and_then(|w| present(w.id.clone()))
            .or_else(|| present(self.winner_id));
        // Flat records carry no winner name, borrow it from the matching side
        let winner = winner_id.map(|id| {
            let name = self
                .winner
                .and_then(|w| present(w.name))
                .or_else(|| {
                    [&player1, &player2]
                        .into_iter()
                        .flatten()
                        .find(|side| side.player.id == id)
                        .map(|side| side.player.name.clone())
                })
                .unwrap_or_default();
            PlayerRef { id, name }
        });

        Match {
            id: self.id,
            session_id: session_id.to_string(),
            player1,
            player2,
            winner,
            score: present(self.score),
            played_at: parse_timestamp(self.date.as_deref()),
            created_at: parse_timestamp(self.created_at.as_deref())
                .or_else(|| parse_timestamp(self.timestamp.as_deref())),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_match_document() {
        let doc: MatchDoc = serde_json::from_value(json!({
            "id": "m1",
            "player1": {
                "id": "raz3ll",
                "name": "Raz3LL",
                "character": { "id": "mario", "name": "Mario" }
            },
            "player2": {
                "id": "lsa",
                "name": "Lsa",
                "character": { "id": "link", "name": "Link" }
            },
            "winner": { "id": "lsa", "name": "Lsa" },
            "score": "2-3",
            "date": "2024-03-01T20:00:00.000Z",
            "createdAt": "2024-03-01T20:00:01Z"
        }))
        .unwrap();

        let m = doc.into_match("s1");
        assert_eq!(m.session_id, "s1");
        assert_eq!(m.player1.as_ref().unwrap().character.as_ref().unwrap().name, "Mario");
        assert_eq!(m.decided().unwrap().winner.player.id, "lsa");
        assert!(m.played_at.is_some());
        assert!(m.created_at.is_some());
    }

    #[test]
    fn test_legacy_flat_match_document() {
        let doc: MatchDoc = serde_json::from_value(json!({
            "id": "m2",
            "player1Id": "shiro",
            "player1Name": "Shiro",
            "player1Character": "pikachu",
            "player2Id": "akro",
            "player2Name": "Akro",
            "player2Character": "samus",
            "winnerId": "akro",
            "score": "2-3",
            "timestamp": "2024-03-01T21:00:00Z"
        }))
        .unwrap();

        let m = doc.into_match("s1");
        let winner = m.winner.clone().unwrap();
        assert_eq!(winner.id, "akro");
        assert_eq!(winner.name, "Akro");
        assert_eq!(m.player1.as_ref().unwrap().character.as_ref().unwrap().id, "pikachu");
        assert!(m.played_at.is_none());
        assert!(m.created_at.is_some());
        assert!(m.decided().is_some());
    }

    #[test]
    fn test_incomplete_match_document() {
        let doc: MatchDoc = serde_json::from_value(json!({
            "id": "m3",
            "player1": { "id": "", "name": "Nobody" },
            "player2": { "id": "lsa" },
            "winner": { "id": "lsa" }
        }))
        .unwrap();

        let m = doc.into_match("s1");
        assert!(m.player1.is_none());
        assert!(m.decided().is_none());
        assert!(m.score.is_none());
    }

    #[test]
    fn test_reference_documents() {
        let player: Player = serde_json::from_value::<PlayerDoc>(json!({
            "id": "lsa",
            "name": "Lsa",
            "nickname": "",
            "favoriteCharacters": ["palutena"]
        }))
        .unwrap()
        .into();
        assert_eq!(player.nickname, None);
        assert_eq!(player.favorite_characters, vec!["palutena".to_string()]);

        let character: Character = serde_json::from_value::<CharacterDoc>(json!({
            "id": "donkey-kong",
            "name": "Donkey Kong",
            "number": "02",
            "images": { "icon": "https://example.com/dk.png" }
        }))
        .unwrap()
        .into();
        assert_eq!(character.number, 2);
        assert!(character.icon.is_some());

        let session: Session = serde_json::from_value::<SessionDoc>(json!({
            "id": "s9",
            "name": "Friday night",
            "sessionType": "online",
            "players": ["lsa", "akro"]
        }))
        .unwrap()
        .into();
        assert_eq!(session.kind, SessionKind::Online);
        assert_eq!(session.players.len(), 2);

        let session: Session = serde_json::from_value::<SessionDoc>(json!({
            "id": "s10",
            "name": "Created from the app",
            "playerIds": ["lsa", "akro", "shiro"]
        }))
        .unwrap()
        .into();
        assert_eq!(session.kind, SessionKind::Local);
        assert_eq!(session.players, vec!["lsa", "akro", "shiro"]);
    }

    #[test]
    fn test_parse_timestamp() {
        assert!(parse_timestamp(Some("2024-03-01T20:00:00.123Z")).is_some());
        assert!(parse_timestamp(Some("2024-03-01T20:00:00+02:00")).is_some());
        assert!(parse_timestamp(Some("yesterday")).is_none());
        assert!(parse_timestamp(None).is_none());
    }
}

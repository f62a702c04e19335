use super::record::WinLoss;
use crate::model::{Match, MatchSide};
use std::collections::{HashMap, HashSet};

/// Record of the first entity against the second.
pub type HeadToHead = WinLoss;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Player,
    Character,
}

fn side_key(side: &MatchSide, kind: EntityKind) -> Option<&str> {
    match kind {
        EntityKind::Player => Some(side.player.id.as_str()),
        EntityKind::Character => side.character.as_ref().map(|c| c.id.as_str()),
    }
}

/// Decided encounters between `a` and `b`, wins credited to `a`.
/// `None` on the diagonal.
pub fn head_to_head(matches: &[Match], kind: EntityKind, a: &str, b: &str) -> Option<HeadToHead> {
    if a == b {
        return None;
    }

    let mut record = HeadToHead::default();
    for decided in matches.iter().filter_map(Match::decided) {
        let winner = side_key(decided.winner, kind);
        let loser = side_key(decided.loser, kind);

        match (winner, loser) {
            (Some(w), Some(l)) if w == a && l == b => record.record(true),
            (Some(w), Some(l)) if w == b && l == a => record.record(false),
            _ => {}
        }
    }

    Some(record)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixCell {
    NotApplicable,
    Record(HeadToHead),
}

pub struct HeadToHeadMatrix {
    ids: Vec<String>,
    cells: HashMap<(String, String), HeadToHead>,
}

impl HeadToHeadMatrix {
    /// Single pass over the matches, restricted to the given ids.
    pub fn build(matches: &[Match], kind: EntityKind, ids: Vec<String>) -> Self {
        let members: HashSet<&str> = ids.iter().map(String::as_str).collect();
        let mut cells: HashMap<(String, String), HeadToHead> = HashMap::new();

        for decided in matches.iter().filter_map(Match::decided) {
            let winner = side_key(decided.winner, kind);
            let loser = side_key(decided.loser, kind);
            let (Some(w), Some(l)) = (winner, loser) else {
                continue;
            };
            if w == l || !members.contains(w) || !members.contains(l) {
                continue;
            }

            cells
                .entry((w.to_string(), l.to_string()))
                .or_default()
                .record(true);
            cells
                .entry((l.to_string(), w.to_string()))
                .or_default()
                .record(false);
        }

        HeadToHeadMatrix { ids, cells }
    }

    pub fn ids(&self) -> &[String] {
        &self.ids
    }

    pub fn cell(&self, a: &str, b: &str) -> MatrixCell {
        if a == b {
            return MatrixCell::NotApplicable;
        }
        let record = self
            .cells
            .get(&(a.to_string(), b.to_string()))
            .copied()
            .unwrap_or_default();
        MatrixCell::Record(record)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::game;

    fn sample() -> Vec<Match> {
        vec![
            game("a", "mario", "b", "link", "a", 0),
            game("a", "mario", "b", "link", "a", 1),
            game("b", "link", "a", "mario", "b", 2),
            game("a", "fox", "c", "link", "c", 3),
            game("b", "mario", "c", "fox", "ghost", 4),
        ]
    }

    #[test]
    fn test_head_to_head_scenario() {
        let record = head_to_head(&sample(), EntityKind::Player, "a", "b").unwrap();
        assert_eq!(record, WinLoss::new(2, 1));
    }

    #[test]
    fn test_head_to_head_symmetry() {
        let matches = sample();
        let ids = ["a", "b", "c", "ghost"];
        for kind in [EntityKind::Player, EntityKind::Character] {
            for a in ids {
                for b in ids.iter().filter(|b| **b != a) {
                    let ab = head_to_head(&matches, kind, a, b).unwrap();
                    let ba = head_to_head(&matches, kind, b, a).unwrap();
                    assert_eq!(ab.wins, ba.losses);
                    assert_eq!(ab.losses, ba.wins);
                    assert_eq!(ab.total, ba.total);
                }
            }
        }
    }

    #[test]
    fn test_no_encounter_is_zero_record() {
        let record = head_to_head(&sample(), EntityKind::Player, "b", "nobody").unwrap();
        assert_eq!(record, WinLoss::new(0, 0));
    }

    #[test]
    fn test_diagonal_is_not_computed() {
        assert!(head_to_head(&sample(), EntityKind::Player, "a", "a").is_none());
    }

    #[test]
    fn test_character_head_to_head() {
        let record = head_to_head(&sample(), EntityKind::Character, "mario", "link").unwrap();
        assert_eq!(record, WinLoss::new(2, 1));

        // b on mario vs c on fox has a foreign winner and is ignored
        let record = head_to_head(&sample(), EntityKind::Character, "mario", "fox").unwrap();
        assert_eq!(record.total, 0);
    }

    #[test]
    fn test_matrix_matches_pairwise() {
        let matches = sample();
        let ids: Vec<String> = ["a", "b", "c"].iter().map(|s| s.to_string()).collect();
        let matrix = HeadToHeadMatrix::build(&matches, EntityKind::Player, ids.clone());

        for a in &ids {
            for b in &ids {
                match matrix.cell(a, b) {
                    MatrixCell::NotApplicable => assert_eq!(a, b),
                    MatrixCell::Record(record) => {
                        assert_eq!(Some(record), head_to_head(&matches, EntityKind::Player, a, b));
                    }
                }
            }
        }
    }

    #[test]
    fn test_matrix_ignores_non_members() {
        let matrix = HeadToHeadMatrix::build(
            &sample(),
            EntityKind::Character,
            vec!["mario".to_string(), "fox".to_string()],
        );
        assert_eq!(matrix.cell("mario", "fox"), MatrixCell::Record(WinLoss::default()));
        assert_eq!(matrix.ids().len(), 2);
    }

    mod proptests {
        use super::*;
        use crate::model::fixtures::{arb_matches, PLAYER_POOL};
        use proptest::prelude::*;

        proptest! {
            /// One side's wins are the other side's losses.
            #[test]
            fn prop_head_to_head_is_symmetric(matches in arb_matches()) {
                for a in PLAYER_POOL {
                    for b in PLAYER_POOL {
                        let forward = head_to_head(&matches, EntityKind::Player, a, b);
                        let backward = head_to_head(&matches, EntityKind::Player, b, a);
                        if a == b {
                            prop_assert_eq!(forward, None);
                            continue;
                        }
                        let (forward, backward) = (forward.unwrap(), backward.unwrap());
                        prop_assert_eq!(forward.wins, backward.losses);
                        prop_assert_eq!(forward.losses, backward.wins);
                        prop_assert_eq!(forward.total, backward.total);
                    }
                }
            }

            /// The single-pass matrix agrees with pairwise lookups.
            #[test]
            fn prop_matrix_matches_pairwise(matches in arb_matches()) {
                let ids: Vec<String> = PLAYER_POOL.iter().map(|id| id.to_string()).collect();
                let matrix = HeadToHeadMatrix::build(&matches, EntityKind::Player, ids);

                for a in PLAYER_POOL {
                    for b in PLAYER_POOL {
                        let expected = match head_to_head(&matches, EntityKind::Player, a, b) {
                            Some(record) => MatrixCell::Record(record),
                            None => MatrixCell::NotApplicable,
                        };
                        prop_assert_eq!(matrix.cell(a, b), expected);
                    }
                }
            }
        }
    }
}

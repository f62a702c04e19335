use crate::model::{Directory, Match};
use std::collections::HashMap;

/// Oldest first. Matches without a timestamp sort as earliest and ties keep
/// their input order.
pub fn chronological(matches: &[Match]) -> Vec<&Match> {
    let mut ordered: Vec<&Match> = matches.iter().collect();
    ordered.sort_by_key(|m| m.timestamp());
    ordered
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StreakRecord {
    pub current_wins: u32,
    pub current_losses: u32,
    pub max_wins: u32,
    pub max_losses: u32,
}

impl StreakRecord {
    pub fn push(&mut self, won: bool) {
        if won {
            self.current_wins += 1;
            self.current_losses = 0;
            self.max_wins = self.max_wins.max(self.current_wins);
        } else {
            self.current_losses += 1;
            self.current_wins = 0;
            self.max_losses = self.max_losses.max(self.current_losses);
        }
    }

    /// Positive for a running win streak, negative for a losing one.
    pub fn current(&self) -> i64 {
        if self.current_wins > 0 {
            self.current_wins as i64
        } else {
            -(self.current_losses as i64)
        }
    }
}

pub fn player_streak(matches: &[Match], player_id: &str) -> StreakRecord {
    let mut record = StreakRecord::default();
    for m in chronological(matches) {
        if let Some(won) = m.result_for(player_id) {
            record.push(won);
        }
    }
    record
}

/// Streaks for every player in a single chronological pass.
pub fn streaks_by_player(matches: &[Match]) -> HashMap<String, StreakRecord> {
    let mut streaks: HashMap<String, StreakRecord> = HashMap::new();

    for decided in chronological(matches).into_iter().filter_map(Match::decided) {
        streaks
            .entry(decided.winner.player.id.clone())
            .or_default()
            .push(true);
        streaks
            .entry(decided.loser.player.id.clone())
            .or_default()
            .push(false);
    }

    streaks
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LongestStreak {
    pub player_id: String,
    pub player_name: String,
    pub length: u32,
}

/// Longest win streak across all players, ties going to the smaller id.
pub fn longest_win_streak(matches: &[Match], directory: &Directory) -> Option<LongestStreak> {
    let streaks = streaks_by_player(matches);
    let (player_id, record) = streaks
        .iter()
        .filter(|(_, record)| record.max_wins > 0)
        .max_by(|(a_id, a), (b_id, b)| a.max_wins.cmp(&b.max_wins).then_with(|| b_id.cmp(a_id)))?;

    Some(LongestStreak {
        player_id: player_id.clone(),
        player_name: directory.player_name(player_id),
        length: record.max_wins,
    })
}

/// Streaks inside a two-player rivalry: a win by one side resets the other.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RivalryStreak {
    pub current_holder: Option<String>,
    pub current_count: u32,
    pub max_a: u32,
    pub max_b: u32,
}

pub fn rivalry_streak(matches: &[Match], a: &str, b: &str) -> RivalryStreak {
    let (mut run_a, mut run_b) = (0u32, 0u32);
    let mut streak = RivalryStreak::default();

    for m in chronological(matches) {
        let Some(decided) = m.decided() else {
            continue;
        };
        let (winner, loser) = (&decided.winner.player.id, &decided.loser.player.id);

        if winner == a && loser == b {
            run_a += 1;
            run_b = 0;
            streak.max_a = streak.max_a.max(run_a);
        } else if winner == b && loser == a {
            run_b += 1;
            run_a = 0;
            streak.max_b = streak.max_b.max(run_b);
        }
    }

    if run_a > 0 {
        streak.current_holder = Some(a.to_string());
        streak.current_count = run_a;
    } else if run_b > 0 {
        streak.current_holder = Some(b.to_string());
        streak.current_count = run_b;
    }

    streak
}

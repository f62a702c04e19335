//! Achievement badges.
//!
//! Each rule is an independent pure predicate. Rules run in the order they are
//! listed and every satisfied rule contributes one badge, so the same input
//! always yields the same list.

use super::head_to_head::HeadToHead;
use super::record::WinLoss;
use super::streak::{RivalryStreak, StreakRecord};
use std::fmt;

pub const RECORD_STREAK: u32 = 3;
pub const MAIN_MIN_MATCHES: u32 = 5;
pub const DOMINANT_MIN_MATCHES: u32 = 10;
pub const DOMINANT_WINRATE: f64 = 70.0;
pub const ACTIVE_MIN_MATCHES: u32 = 50;
pub const VERSATILE_CHARACTERS: usize = 10;
pub const UNDERDOG_MIN_MATCHES: u32 = 10;
pub const UNDERDOG_WINRATE: f64 = 40.0;
pub const BALANCED_MIN_MATCHES: u32 = 10;
pub const BALANCED_LOW: f64 = 45.0;
pub const BALANCED_HIGH: f64 = 55.0;
pub const RIVALRY_MIN_MATCHES: u32 = 5;
pub const NEMESIS_WINRATE: f64 = 60.0;
pub const BALANCED_GAP: f64 = 10.0;
pub const BALANCED_RIVALRY_MIN_MATCHES: u32 = 10;
pub const FIRE_STREAK: u32 = 5;
pub const ACTIVE_RIVALRY_MATCHES: u32 = 20;
pub const LEGENDARY_RIVALRY_MATCHES: u32 = 50;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BadgeThresholds {
    pub record_streak: u32,
    pub main_min_matches: u32,
    pub dominant_min_matches: u32,
    pub dominant_winrate: f64,
    pub active_min_matches: u32,
    pub versatile_characters: usize,
    pub underdog_min_matches: u32,
    pub underdog_winrate: f64,
    pub balanced_min_matches: u32,
    pub balanced_low: f64,
    pub balanced_high: f64,
    pub rivalry_min_matches: u32,
    pub nemesis_winrate: f64,
    pub balanced_gap: f64,
    pub balanced_rivalry_min_matches: u32,
    pub fire_streak: u32,
    pub active_rivalry_matches: u32,
    pub legendary_rivalry_matches: u32,
}

impl Default for BadgeThresholds {
    fn default() -> Self {
        BadgeThresholds {
            record_streak: RECORD_STREAK,
            main_min_matches: MAIN_MIN_MATCHES,
            dominant_min_matches: DOMINANT_MIN_MATCHES,
            dominant_winrate: DOMINANT_WINRATE,
            active_min_matches: ACTIVE_MIN_MATCHES,
            versatile_characters: VERSATILE_CHARACTERS,
            underdog_min_matches: UNDERDOG_MIN_MATCHES,
            underdog_winrate: UNDERDOG_WINRATE,
            balanced_min_matches: BALANCED_MIN_MATCHES,
            balanced_low: BALANCED_LOW,
            balanced_high: BALANCED_HIGH,
            rivalry_min_matches: RIVALRY_MIN_MATCHES,
            nemesis_winrate: NEMESIS_WINRATE,
            balanced_gap: BALANCED_GAP,
            balanced_rivalry_min_matches: BALANCED_RIVALRY_MIN_MATCHES,
            fire_streak: FIRE_STREAK,
            active_rivalry_matches: ACTIVE_RIVALRY_MATCHES,
            legendary_rivalry_matches: LEGENDARY_RIVALRY_MATCHES,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum BadgeValue {
    Count(u32),
    Percent(f64),
    Rank(usize),
    Label(String),
}

impl fmt::Display for BadgeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BadgeValue::Count(n) => write!(f, "{}", n),
            BadgeValue::Percent(p) => write!(f, "{:.0}%", p),
            BadgeValue::Rank(r) => write!(f, "#{}", r),
            BadgeValue::Label(s) => write!(f, "{}", s),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Badge {
    pub id: &'static str,
    pub title: String,
    pub description: String,
    pub value: Option<BadgeValue>,
}

impl Badge {
    fn new(id: &'static str, title: &str, description: String, value: Option<BadgeValue>) -> Self {
        Badge {
            id,
            title: title.to_string(),
            description,
            value,
        }
    }
}

type Rule<I> = fn(&I, &BadgeThresholds) -> Option<Badge>;

fn evaluate<I>(rules: &[Rule<I>], input: &I, thresholds: &BadgeThresholds) -> Vec<Badge> {
    rules.iter().filter_map(|rule| rule(input, thresholds)).collect()
}

fn plural(n: u32) -> &'static str {
    if n > 1 {
        "s"
    } else {
        ""
    }
}

#[derive(Debug, Clone, Default)]
pub struct PlayerBadgeInput {
    pub record: WinLoss,
    pub streak: StreakRecord,
    /// Name and pick count of the most used character.
    pub main_character: Option<(String, u32)>,
    pub distinct_characters: usize,
    /// 1-based leaderboard position, `None` when unranked.
    pub rank: Option<usize>,
    pub ranked_players: usize,
}

const PLAYER_RULES: &[Rule<PlayerBadgeInput>] = &[
    on_fire,
    record_streak,
    main_character,
    dominant,
    active,
    versatile,
    champion,
    persevering,
    balanced,
];

pub fn evaluate_player(input: &PlayerBadgeInput, thresholds: &BadgeThresholds) -> Vec<Badge> {
    evaluate(PLAYER_RULES, input, thresholds)
}

fn on_fire(input: &PlayerBadgeInput, _: &BadgeThresholds) -> Option<Badge> {
    let n = input.streak.current_wins;
    (n > 0).then(|| {
        Badge::new(
            "on-fire",
            "On fire!",
            format!("{} win{} in a row and counting", n, plural(n)),
            Some(BadgeValue::Count(n)),
        )
    })
}

fn record_streak(input: &PlayerBadgeInput, t: &BadgeThresholds) -> Option<Badge> {
    let n = input.streak.max_wins;
    (n >= t.record_streak).then(|| {
        Badge::new(
            "record-streak",
            "Record streak",
            format!("Best run: {} consecutive wins", n),
            Some(BadgeValue::Count(n)),
        )
    })
}

fn main_character(input: &PlayerBadgeInput, t: &BadgeThresholds) -> Option<Badge> {
    let (name, count) = input.main_character.as_ref()?;
    (*count >= t.main_min_matches).then(|| {
        Badge::new(
            "main",
            "Main",
            format!("{} ({} matches)", name, count),
            Some(BadgeValue::Label(name.clone())),
        )
    })
}

fn dominant(input: &PlayerBadgeInput, t: &BadgeThresholds) -> Option<Badge> {
    let record = input.record;
    (record.total >= t.dominant_min_matches && record.winrate() >= t.dominant_winrate).then(|| {
        Badge::new(
            "dominant",
            "Dominant",
            format!("{:.1}% winrate over {} matches", record.winrate(), record.total),
            Some(BadgeValue::Percent(record.winrate())),
        )
    })
}

fn active(input: &PlayerBadgeInput, t: &BadgeThresholds) -> Option<Badge> {
    let total = input.record.total;
    (total >= t.active_min_matches).then(|| {
        Badge::new(
            "active",
            "Active player",
            format!("{} matches played", total),
            Some(BadgeValue::Count(total)),
        )
    })
}

fn versatile(input: &PlayerBadgeInput, t: &BadgeThresholds) -> Option<Badge> {
    let n = input.distinct_characters;
    (n >= t.versatile_characters).then(|| {
        Badge::new(
            "versatile",
            "Versatile",
            format!("{} different characters played", n),
            Some(BadgeValue::Count(n as u32)),
        )
    })
}

fn champion(input: &PlayerBadgeInput, _: &BadgeThresholds) -> Option<Badge> {
    (input.rank == Some(1) && input.ranked_players > 1).then(|| {
        Badge::new(
            "champion",
            "Champion",
            "Top of the leaderboard".to_string(),
            Some(BadgeValue::Rank(1)),
        )
    })
}

fn persevering(input: &PlayerBadgeInput, t: &BadgeThresholds) -> Option<Badge> {
    let record = input.record;
    (record.total >= t.underdog_min_matches && record.winrate() < t.underdog_winrate).then(|| {
        Badge::new(
            "persevering",
            "Persevering",
            "Keeps playing through the losses".to_string(),
            None,
        )
    })
}

fn balanced(input: &PlayerBadgeInput, t: &BadgeThresholds) -> Option<Badge> {
    let record = input.record;
    let winrate = record.winrate();
    let close = winrate >= t.balanced_low && winrate <= t.balanced_high;
    (record.total >= t.balanced_min_matches && close).then(|| {
        Badge::new(
            "balanced",
            "Balanced",
            format!("Every match is close ({:.1}%)", winrate),
            Some(BadgeValue::Percent(winrate)),
        )
    })
}

#[derive(Debug, Clone, Default)]
pub struct RivalryBadgeInput {
    pub name_a: String,
    pub name_b: String,
    /// Record of `a` against `b`.
    pub record: HeadToHead,
    pub streak: RivalryStreak,
}

impl RivalryBadgeInput {
    fn winrates(&self) -> (f64, f64) {
        let a = self.record.winrate();
        let b = if self.record.total == 0 { 0.0 } else { 100.0 - a };
        (a, b)
    }
}

const RIVALRY_RULES: &[Rule<RivalryBadgeInput>] = &[
    domination,
    nemesis,
    balanced_rivalry,
    fire_streak_a,
    fire_streak_b,
    active_rivalry,
    legendary_rivalry,
];

pub fn evaluate_rivalry(input: &RivalryBadgeInput, thresholds: &BadgeThresholds) -> Vec<Badge> {
    evaluate(RIVALRY_RULES, input, thresholds)
}

/// The side whose winrate reaches `threshold`, checking `a` first.
fn leading_side(
    input: &RivalryBadgeInput,
    threshold: f64,
    min_matches: u32,
) -> Option<(&str, &str, f64)> {
    if input.record.total < min_matches {
        return None;
    }
    let (rate_a, rate_b) = input.winrates();
    if rate_a >= threshold {
        Some((input.name_a.as_str(), input.name_b.as_str(), rate_a))
    } else if rate_b >= threshold {
        Some((input.name_b.as_str(), input.name_a.as_str(), rate_b))
    } else {
        None
    }
}

fn domination(input: &RivalryBadgeInput, t: &BadgeThresholds) -> Option<Badge> {
    let (leader, _, rate) = leading_side(input, t.dominant_winrate, t.rivalry_min_matches)?;
    Some(Badge::new(
        "domination",
        "Domination",
        format!("{} dominates this matchup with {:.0}% of the wins", leader, rate),
        Some(BadgeValue::Percent(rate)),
    ))
}

fn nemesis(input: &RivalryBadgeInput, t: &BadgeThresholds) -> Option<Badge> {
    let (leader, victim, _) = leading_side(input, t.nemesis_winrate, t.rivalry_min_matches)?;
    Some(Badge::new(
        "nemesis",
        "Nemesis",
        format!("{} is {}'s nemesis", leader, victim),
        None,
    ))
}

fn balanced_rivalry(input: &RivalryBadgeInput, t: &BadgeThresholds) -> Option<Badge> {
    let (rate_a, rate_b) = input.winrates();
    let close = (rate_a - rate_b).abs() <= t.balanced_gap;
    (input.record.total >= t.balanced_rivalry_min_matches && close).then(|| {
        Badge::new(
            "balanced-rivalry",
            "Balanced rivalry",
            format!("Tight matchup between {} and {}", input.name_a, input.name_b),
            None,
        )
    })
}

fn fire_streak(name: &str, max: u32, t: &BadgeThresholds) -> Option<Badge> {
    (max >= t.fire_streak).then(|| {
        Badge::new(
            "fire-streak",
            "Fire streak",
            format!("{} chained {} consecutive wins", name, max),
            Some(BadgeValue::Count(max)),
        )
    })
}

fn fire_streak_a(input: &RivalryBadgeInput, t: &BadgeThresholds) -> Option<Badge> {
    fire_streak(&input.name_a, input.streak.max_a, t)
}

fn fire_streak_b(input: &RivalryBadgeInput, t: &BadgeThresholds) -> Option<Badge> {
    fire_streak(&input.name_b, input.streak.max_b, t)
}

fn active_rivalry(input: &RivalryBadgeInput, t: &BadgeThresholds) -> Option<Badge> {
    let total = input.record.total;
    (total >= t.active_rivalry_matches).then(|| {
        Badge::new(
            "active-rivalry",
            "Active matchup",
            format!("{} matches played between these two", total),
            Some(BadgeValue::Count(total)),
        )
    })
}

fn legendary_rivalry(input: &RivalryBadgeInput, t: &BadgeThresholds) -> Option<Badge> {
    (input.record.total >= t.legendary_rivalry_matches).then(|| {
        Badge::new(
            "legendary-rivalry",
            "Legendary matchup",
            format!("Over {} matches played, a true rivalry", t.legendary_rivalry_matches),
            None,
        )
    })
}

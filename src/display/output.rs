use crate::analysis::badges::Badge;
use crate::analysis::head_to_head::{HeadToHeadMatrix, MatrixCell};
use crate::analysis::profile::{CharacterLine, PlayerProfile, Rivalry};
use crate::analysis::ranking::{HallOfFame, MatchupEntry, RankedEntry};
use crate::analysis::record::WinLoss;
use crate::analysis::streak::StreakRecord;
use crate::analysis::summary::Overview;
use crate::model::{Directory, Match, MatchSide, Session};
use colored::*;
use std::collections::HashMap;
use tabled::{builder::Builder, settings::Style, Table, Tabled};

#[derive(Tabled)]
struct RankRow {
    #[tabled(rename = "#")]
    rank: String,
    name: String,
    record: String,
    win_rate: String,
    matches: String,
}

#[derive(Tabled)]
struct LeaderboardRow {
    #[tabled(rename = "#")]
    rank: String,
    player: String,
    record: String,
    win_rate: String,
    form: String,
}

#[derive(Tabled)]
struct CharacterRow {
    character: String,
    record: String,
    win_rate: String,
}

#[derive(Tabled)]
struct MatchupRow {
    opponent: String,
    record: String,
    win_rate: String,
}

#[derive(Tabled)]
struct MatchRow {
    date: String,
    player_1: String,
    player_2: String,
    winner: String,
    score: String,
}

#[derive(Tabled)]
struct HistoryRow {
    date: String,
    opponent: String,
    played: String,
    against: String,
    result: String,
    score: String,
}

#[derive(Tabled)]
struct FameRow {
    record: String,
    holder: String,
    value: String,
}

fn header(title: &str) {
    println!("\n{}", title.bold().cyan());
    println!("{}\n", "=".repeat(60).cyan());
}

fn record_text(record: &WinLoss) -> String {
    format!("{}W / {}L", record.wins, record.losses)
}

fn winrate_text(record: &WinLoss) -> String {
    format!("{:.1}%", record.winrate())
}

fn form_text(form: &[bool]) -> String {
    if form.is_empty() {
        return "-".to_string();
    }
    form.iter()
        .map(|won| if *won { "W".green().to_string() } else { "L".red().to_string() })
        .collect::<Vec<_>>()
        .join(" ")
}

fn streak_text(streak: &StreakRecord) -> String {
    match streak.current() {
        n if n > 0 => format!("{} wins", n).green().to_string(),
        n if n < 0 => format!("{} losses", -n).red().to_string(),
        _ => "-".to_string(),
    }
}

fn match_date(m: &Match) -> String {
    m.timestamp()
        .map(|t| t.format("%Y-%m-%d %H:%M").to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn side_text(side: Option<&MatchSide>, directory: &Directory) -> String {
    match side {
        Some(side) => match &side.character {
            Some(character) => format!(
                "{} ({})",
                directory.player_name(&side.player.id),
                directory.character_name(&character.id)
            ),
            None => directory.player_name(&side.player.id),
        },
        None => "?".to_string(),
    }
}

fn match_rows(matches: &[&Match], directory: &Directory) -> Vec<MatchRow> {
    matches
        .iter()
        .map(|m| MatchRow {
            date: match_date(m),
            player_1: side_text(m.player1.as_ref(), directory),
            player_2: side_text(m.player2.as_ref(), directory),
            winner: match m.decided() {
                Some(decided) => {
                    directory.player_name(&decided.winner.player.id).green().to_string()
                }
                None => "undecided".yellow().to_string(),
            },
            score: m
                .parsed_score()
                .map(|s| s.winner_first())
                .or_else(|| m.score.clone())
                .unwrap_or_else(|| "-".to_string()),
        })
        .collect()
}

fn print_table<T: Tabled>(rows: Vec<T>) {
    let mut table = Table::new(rows);
    table.with(Style::rounded());
    println!("{}", table);
}

fn rank_rows(entries: &[RankedEntry]) -> Vec<RankRow> {
    entries
        .iter()
        .map(|entry| RankRow {
            rank: format!("#{}", entry.rank),
            name: entry.name.clone(),
            record: record_text(&entry.record),
            win_rate: winrate_text(&entry.record),
            matches: entry.record.total.to_string(),
        })
        .collect()
}

fn character_rows(lines: &[CharacterLine]) -> Vec<CharacterRow> {
    lines
        .iter()
        .map(|line| CharacterRow {
            character: line.name.clone(),
            record: record_text(&line.record),
            win_rate: winrate_text(&line.record),
        })
        .collect()
}

fn matchup_rows(entries: &[MatchupEntry]) -> Vec<MatchupRow> {
    entries
        .iter()
        .map(|entry| MatchupRow {
            opponent: entry.opponent_name.clone(),
            record: record_text(&entry.record),
            win_rate: winrate_text(&entry.record),
        })
        .collect()
}

fn display_badges(badges: &[Badge]) {
    if badges.is_empty() {
        return;
    }
    println!("\n{}", "Badges".bold().yellow());
    for badge in badges {
        match &badge.value {
            Some(value) => println!(
                "  {} {} [{}]: {}",
                "★".yellow(),
                badge.title.bold(),
                value,
                badge.description
            ),
            None => println!("  {} {}: {}", "★".yellow(), badge.title.bold(), badge.description),
        }
    }
}

pub fn display_overview(overview: &Overview) {
    header("📊 OVERVIEW");

    if overview.matches == 0 {
        println!("{}", "No matches recorded yet".yellow());
        return;
    }

    println!("{} {}", "Sessions:".bold(), overview.sessions);
    println!("{} {}", "Matches:".bold(), overview.matches);
    println!("{} {}", "Players:".bold(), overview.players);
    println!("{} {}", "Characters played:".bold(), overview.characters_played);
    println!(
        "\n{} {} sessions, {} matches",
        "🏠 LAN:".bold(),
        overview.local.sessions,
        overview.local.matches
    );
    println!(
        "{} {} sessions, {} matches\n",
        "🌐 Online:".bold(),
        overview.online.sessions,
        overview.online.matches
    );
}

pub fn display_leaderboard(entries: &[RankedEntry], forms: &HashMap<String, Vec<bool>>) {
    header("🏆 LEADERBOARD");

    if entries.is_empty() {
        println!("{}", "No decided matches yet".yellow());
        return;
    }

    let rows: Vec<LeaderboardRow> = entries
        .iter()
        .map(|entry| LeaderboardRow {
            rank: format!("#{}", entry.rank),
            player: entry.name.clone(),
            record: record_text(&entry.record),
            win_rate: winrate_text(&entry.record),
            form: forms.get(&entry.id).map(|f| form_text(f)).unwrap_or_else(|| "-".to_string()),
        })
        .collect();
    print_table(rows);
    println!("\n{}", "Form: last results, most recent first\n".dimmed());
}

pub fn display_characters(entries: &[RankedEntry]) {
    header("🎮 CHARACTERS");

    if entries.is_empty() {
        println!("{}", "No characters played yet".yellow());
        return;
    }
    print_table(rank_rows(entries));
    println!();
}

pub fn display_player_profile(profile: &PlayerProfile, history: &[&Match], directory: &Directory) {
    header(&format!("👤 {}", profile.name));

    let rank = match profile.rank {
        Some(rank) => format!("#{} of {}", rank, profile.ranked_players),
        None => "unranked".to_string(),
    };
    println!("{} {}", "Rank:".bold(), rank);
    println!(
        "{} {} W / {} L ({:.1}% WR)",
        "📈 Overall:".bold(),
        profile.record.wins.to_string().green(),
        profile.record.losses.to_string().red(),
        profile.record.winrate()
    );
    println!(
        "{} {} (best {} wins, worst {} losses)",
        "Streak:".bold(),
        streak_text(&profile.streak),
        profile.streak.max_wins,
        profile.streak.max_losses
    );
    if let Some(favorite) = &profile.favorite {
        println!("{} {} ({} matches)", "Main:".bold(), favorite.name, favorite.count);
    }

    if !profile.characters.is_empty() {
        println!("\n{}", "Characters".bold().yellow());
        print_table(character_rows(&profile.characters));
    }
    if !profile.best_matchups.is_empty() {
        println!("\n{}", "Best matchups".bold().green());
        print_table(matchup_rows(&profile.best_matchups));
    }
    if !profile.worst_matchups.is_empty() {
        println!("\n{}", "Worst matchups".bold().red());
        print_table(matchup_rows(&profile.worst_matchups));
    }

    display_badges(&profile.badges);

    if !history.is_empty() {
        println!("\n{}", format!("Last {} matches", history.len()).bold().yellow());
        let rows: Vec<HistoryRow> = history
            .iter()
            .map(|m| history_row(m, &profile.id, directory))
            .collect();
        print_table(rows);
    }
    println!();
}

fn history_row(m: &Match, player_id: &str, directory: &Directory) -> HistoryRow {
    let character_of = |side: Option<&MatchSide>| {
        side.and_then(|s| s.character.as_ref())
            .map(|c| directory.character_name(&c.id))
            .unwrap_or_else(|| "-".to_string())
    };
    let won = m.result_for(player_id);

    HistoryRow {
        date: match_date(m),
        opponent: m
            .opponent_of(player_id)
            .map(|side| directory.player_name(&side.player.id))
            .unwrap_or_else(|| "?".to_string()),
        played: character_of(m.side_of(player_id)),
        against: character_of(m.opponent_of(player_id)),
        result: match won {
            Some(true) => "WIN".green().to_string(),
            Some(false) => "LOSS".red().to_string(),
            None => "-".yellow().to_string(),
        },
        score: match (m.parsed_score(), won) {
            (Some(score), Some(won)) => score.from_perspective(won),
            _ => m.score.clone().unwrap_or_else(|| "-".to_string()),
        },
    }
}

pub fn display_rivalry(rivalry: &Rivalry, history: &[&Match], directory: &Directory) {
    header(&format!("⚔️  {} vs {}", rivalry.name_a, rivalry.name_b));

    if rivalry.record.total == 0 {
        println!("{}", "These players have not faced each other yet".yellow());
        return;
    }

    println!(
        "{} {} {} - {} {} ({} matches)",
        "Score:".bold(),
        rivalry.name_a,
        rivalry.record.wins.to_string().green(),
        rivalry.record.losses.to_string().red(),
        rivalry.name_b,
        rivalry.record.total
    );
    println!("{} {:.1}% for {}", "Win rate:".bold(), rivalry.record.winrate(), rivalry.name_a);

    if let Some(holder) = &rivalry.streak.current_holder {
        println!(
            "{} {} has won the last {}",
            "Streak:".bold(),
            rivalry.name_of(holder).unwrap_or(holder),
            rivalry.streak.current_count
        );
    }
    println!(
        "{} {} {}, {} {}",
        "Best streaks:".bold(),
        rivalry.name_a,
        rivalry.streak.max_a,
        rivalry.name_b,
        rivalry.streak.max_b
    );
    if let Some(last) = rivalry.last_played {
        println!("{} {}", "Last played:".bold(), last.format("%Y-%m-%d"));
    }

    if !rivalry.characters_a.is_empty() {
        println!("\n{}", format!("{}'s characters", rivalry.name_a).bold().yellow());
        print_table(character_rows(&rivalry.characters_a));
    }
    if !rivalry.characters_b.is_empty() {
        println!("\n{}", format!("{}'s characters", rivalry.name_b).bold().yellow());
        print_table(character_rows(&rivalry.characters_b));
    }

    display_badges(&rivalry.badges);

    if !history.is_empty() {
        println!("\n{}", "History".bold().yellow());
        print_table(match_rows(history, directory));
    }
    println!();
}

/// Row entity's record against each column entity.
pub fn display_matrix(title: &str, matrix: &HeadToHeadMatrix, name_of: impl Fn(&str) -> String) {
    header(title);

    if matrix.ids().is_empty() {
        println!("{}", "Nothing to compare yet".yellow());
        return;
    }

    let mut builder = Builder::default();
    let mut columns = vec![String::new()];
    columns.extend(matrix.ids().iter().map(|id| name_of(id)));
    builder.push_record(columns);

    for row in matrix.ids() {
        let mut cells = vec![name_of(row)];
        for column in matrix.ids() {
            cells.push(match matrix.cell(row, column) {
                MatrixCell::NotApplicable => "-".to_string(),
                MatrixCell::Record(record) if record.total == 0 => String::new(),
                MatrixCell::Record(record) => format!("{}-{}", record.wins, record.losses),
            });
        }
        builder.push_record(cells);
    }

    let mut table = builder.build();
    table.with(Style::rounded());
    println!("{}", table);
    println!("\n{}", "Read across: row wins - row losses against the column\n".dimmed());
}

fn rate_and_total(record: &WinLoss) -> String {
    format!("{:.1}% ({} matches)", record.winrate(), record.total)
}

pub fn display_hall_of_fame(fame: &HallOfFame) {
    header("🏅 RECORDS");

    let mut rows = Vec::new();
    let mut push = |label: &str, entry: &Option<RankedEntry>, value: fn(&WinLoss) -> String| {
        if let Some(entry) = entry {
            rows.push(FameRow {
                record: label.to_string(),
                holder: entry.name.clone(),
                value: value(&entry.record),
            });
        }
    };

    push("Best win rate", &fame.best_winrate, rate_and_total);
    push("Most wins", &fame.most_wins, |r| r.wins.to_string());
    push("Most matches", &fame.most_matches, |r| r.total.to_string());
    push("Most played character", &fame.most_played_character, |r| r.total.to_string());
    push("Best character", &fame.best_character, rate_and_total);

    if let Some(streak) = &fame.longest_streak {
        rows.push(FameRow {
            record: "Longest win streak".to_string(),
            holder: streak.player_name.clone(),
            value: streak.length.to_string(),
        });
    }

    if rows.is_empty() {
        println!("{}", "No records yet".yellow());
        return;
    }
    print_table(rows);
    println!();
}

pub fn display_session(
    session: &Session,
    podium: &[RankedEntry],
    matches: &[&Match],
    directory: &Directory,
) {
    header(&format!("📅 {}", session.name));

    println!("{} {}", "Type:".bold(), session.kind);
    if let Some(date) = session.date.or(session.created_at) {
        println!("{} {}", "Date:".bold(), date.format("%Y-%m-%d"));
    }
    println!("{} {}", "Matches:".bold(), matches.len());

    if !podium.is_empty() {
        println!("\n{}", "Podium".bold().yellow());
        print_table(rank_rows(podium));
    }
    if !matches.is_empty() {
        println!("\n{}", "Matches".bold().yellow());
        print_table(match_rows(matches, directory));
    }
    println!();
}

pub fn display_error(error: &str) {
    eprintln!("{} {}", "❌ Error:".red().bold(), error);
}

pub fn display_info(message: &str) {
    println!("{} {}", "ℹ️".cyan(), message);
}

pub fn display_success(message: &str) {
    println!("{} {}", "✓".green(), message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::fixtures::{game, player};
    use crate::model::Dataset;

    #[test]
    fn test_form_text() {
        colored::control::set_override(false);
        assert_eq!(form_text(&[true, false, true]), "W L W");
        assert_eq!(form_text(&[]), "-");
    }

    #[test]
    fn test_history_row_from_loser_perspective() {
        colored::control::set_override(false);
        let dataset = Dataset {
            players: vec![player("a", "Alice"), player("b", "Bob")],
            matches: vec![game("a", "mario", "b", "link", "a", 0)],
            ..Default::default()
        };
        let directory = Directory::new(&dataset);

        let row = history_row(&dataset.matches[0], "b", &directory);
        assert_eq!(row.opponent, "Alice");
        assert_eq!(row.played, "LINK");
        assert_eq!(row.against, "MARIO");
        assert_eq!(row.result, "LOSS");
        assert_eq!(row.score, "1-3");
    }

    #[test]
    fn test_record_text() {
        let record = WinLoss::new(7, 3);
        assert_eq!(record_text(&record), "7W / 3L");
        assert_eq!(winrate_text(&record), "70.0%");
    }
}

//! Plain-text rendering of the board, history pages and lookups.

use chrono::{DateTime, Local, Utc};
use std::collections::HashMap;
use std::fmt::Write;

use crate::board::{BoardView, RoundPage};
use crate::data_fetcher::models::{Event, EventStatus, MatchDetail, StandingsRow, TeamInfo};
use crate::error::AppError;

const RULE: &str = "────────────────────────────────────────────────────────";

fn local_time(at: DateTime<Utc>) -> String {
    at.with_timezone(&Local).format("%a %d.%m. %H:%M").to_string()
}

fn status_tag(status: EventStatus) -> &'static str {
    match status {
        EventStatus::NotStarted => "",
        EventStatus::InProgress => "LIVE",
        EventStatus::Finished => "FT",
    }
}

/// One line per event: kickoff, teams, score and a status tag.
pub fn format_event_line(event: &Event) -> String {
    format!(
        "{:<16} {:>22} {:^7} {:<22} {}",
        local_time(event.kickoff),
        event.home,
        event.score_text(),
        event.away,
        status_tag(event.status)
    )
    .trim_end()
    .to_string()
}

fn push_section(out: &mut String, title: &str, events: &[Event]) {
    let _ = writeln!(out, "\n{title} ({})", events.len());
    if events.is_empty() {
        let _ = writeln!(out, "  no matches");
    }
    for event in events {
        let _ = writeln!(out, "  {}", format_event_line(event));
    }
}

/// The board as shown in live and once mode.
/// `from - to` line shown above a window.
pub fn format_date_range(from: &str, to: &str) -> String {
    format!("{from} - {to}")
}

/// One-line fetch error, with a hint when trying again may help.
pub fn format_fetch_error(error: &AppError) -> String {
    if error.is_retryable() {
        format!("Error: {error} (temporary, try again shortly)")
    } else if error.is_client_error() {
        format!("Error: {error} (check --leagues and --season)")
    } else {
        format!("Error: {error}")
    }
}

pub fn format_board(view: &BoardView) -> String {
    let mut out = String::new();

    let leagues = view
        .filters
        .as_ref()
        .map(|f| f.competitions.join(", ").to_uppercase())
        .unwrap_or_default();
    let season = view
        .filters
        .as_ref()
        .and_then(|f| f.season)
        .map(|s| format!(" {s}/{}", (s + 1) % 100))
        .unwrap_or_default();
    let _ = writeln!(out, "{leagues}{season}");
    let _ = writeln!(out, "{RULE}");

    if let Some(window) = &view.window
        && let (Some(from), Some(to)) = (&window.date_from, &window.date_to)
    {
        let _ = writeln!(out, "{}", format_date_range(from, to));
    }
    if view.loading {
        let _ = writeln!(out, "Loading...");
    }
    if let Some(error) = &view.last_error {
        let _ = writeln!(out, "Error: {error}");
    }

    match &view.window {
        Some(window) => out.push_str(&format_sections(&window.live, &window.upcoming, &window.recent)),
        None if !view.loading => {
            let _ = writeln!(out, "\nNo data");
        }
        None => {}
    }

    if let Some(updated) = view.last_updated {
        let _ = writeln!(out, "\nUpdated {}", updated.with_timezone(&Local).format("%H:%M:%S"));
    }
    out
}

/// Live, upcoming and recent sections.
pub fn format_sections(live: &[Event], upcoming: &[Event], recent: &[Event]) -> String {
    let mut out = String::new();
    push_section(&mut out, "LIVE", live);
    push_section(&mut out, "UPCOMING", upcoming);
    // Most recent results first
    let newest_first: Vec<Event> = recent.iter().rev().cloned().collect();
    push_section(&mut out, "RECENT", &newest_first);
    out
}

/// A history page, newest round first, with navigation hints.
pub fn format_round_page(page: &RoundPage) -> String {
    let mut out = String::new();
    if page.is_empty() {
        let _ = writeln!(out, "No finished rounds");
    }
    for group in &page.rounds {
        let _ = writeln!(out, "\nRound {}", group.round);
        for event in &group.events {
            let _ = writeln!(out, "  {}", format_event_line(event));
        }
    }
    let mut hints = Vec::new();
    if page.has_newer {
        hints.push(format!("newer: --page {}", page.index.saturating_sub(1)));
    }
    if page.has_older {
        hints.push(format!("older: --page {}", page.index + 1));
    }
    if !hints.is_empty() {
        let _ = writeln!(out, "\n{}", hints.join("   "));
    }
    out
}

fn team_name(team: Option<&TeamInfo>) -> &str {
    team.and_then(|t| t.team_name.as_deref()).unwrap_or("Unknown")
}

/// Match details: teams, final score, goals, venue.
pub fn format_match_detail(detail: &MatchDetail) -> String {
    let mut out = String::new();
    let home = team_name(detail.team1.as_ref());
    let away = team_name(detail.team2.as_ref());
    let score = detail
        .final_score()
        .map(|(h, a)| format!("{h}:{a}"))
        .unwrap_or_else(|| "-:-".to_string());
    let _ = writeln!(out, "{home} {score} {away}");
    let _ = writeln!(out, "{RULE}");

    if let Some(group) = detail.group.as_ref().and_then(|g| g.group_name.as_deref()) {
        let league = detail.league_shortcut.as_deref().unwrap_or_default();
        let _ = writeln!(out, "{} {group}", league.to_uppercase());
    }
    if let Some(kickoff) = detail
        .match_date_time_utc
        .as_deref()
        .and_then(crate::data_fetcher::models::parse_kickoff)
    {
        let _ = writeln!(out, "Kickoff: {}", local_time(kickoff));
    }
    let _ = writeln!(
        out,
        "Status: {}",
        if detail.match_is_finished { "finished" } else { "not finished" }
    );

    for result in detail.results_in_order() {
        let _ = writeln!(
            out,
            "{}: {}:{}",
            result.result_name.as_deref().unwrap_or("Result"),
            result.points_team1.unwrap_or_default(),
            result.points_team2.unwrap_or_default()
        );
    }

    let goals = detail.goals_by_minute();
    if !goals.is_empty() {
        let _ = writeln!(out, "\nGoals");
    }
    for goal in goals {
        let mut notes = Vec::new();
        if goal.is_penalty == Some(true) {
            notes.push("pen.");
        }
        if goal.is_own_goal == Some(true) {
            notes.push("o.g.");
        }
        if goal.is_overtime == Some(true) {
            notes.push("et");
        }
        let minute = goal
            .match_minute
            .map(|m| format!("{m}'"))
            .unwrap_or_else(|| "?'".to_string());
        let _ = writeln!(
            out,
            "  {:>4} {}:{} {} {}",
            minute,
            goal.score_team1.unwrap_or_default(),
            goal.score_team2.unwrap_or_default(),
            goal.goal_getter_name.as_deref().unwrap_or("Unknown"),
            notes.join(" ")
        );
    }

    if let Some(location) = &detail.location {
        let venue = [
            location.location_stadium.as_deref(),
            location.location_city.as_deref(),
        ]
        .into_iter()
        .flatten()
        .collect::<Vec<_>>()
        .join(", ");
        if !venue.is_empty() {
            let _ = writeln!(out, "\nVenue: {venue}");
        }
    }
    if let Some(viewers) = detail.number_of_viewers.filter(|v| *v > 0) {
        let _ = writeln!(out, "Attendance: {viewers}");
    }
    out
}

/// League table; `icons` fills in missing crest URLs by team id.
pub fn format_table(rows: &[StandingsRow], icons: &HashMap<i64, String>) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>3} {:<28} {:>3} {:>3} {:>3} {:>3} {:>7} {:>4} {:>4}",
        "#", "Team", "P", "W", "D", "L", "Goals", "+/-", "Pts"
    );
    let _ = writeln!(out, "{RULE}");
    for (position, row) in rows.iter().enumerate() {
        let _ = writeln!(
            out,
            "{:>3} {:<28} {:>3} {:>3} {:>3} {:>3} {:>7} {:>4} {:>4}",
            position + 1,
            row.team_name.as_deref().unwrap_or("Unknown"),
            row.matches,
            row.won,
            row.draw,
            row.lost,
            format!("{}:{}", row.goals, row.opponent_goals),
            row.goal_diff,
            row.points
        );
        let icon = row.team_icon_url.clone().or_else(|| {
            row.team_info_id
                .and_then(|id| icons.get(&id).cloned())
        });
        if let Some(icon) = icon.filter(|url| !url.is_empty()) {
            let _ = writeln!(out, "    {icon}");
        }
    }
    out
}

/// Team roster of a league season.
pub fn format_teams(teams: &[TeamInfo]) -> String {
    let mut out = String::new();
    for team in teams {
        let _ = writeln!(
            out,
            "{:>6}  {:<30} {:<12} {}",
            team.team_id.map(|id| id.to_string()).unwrap_or_default(),
            team.team_name.as_deref().unwrap_or("Unknown"),
            team.short_name.as_deref().unwrap_or_default(),
            team.team_icon_url.as_deref().unwrap_or_default()
        );
    }
    if teams.is_empty() {
        let _ = writeln!(out, "No teams");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::RoundCursor;
    use crate::testing_utils::TestDataBuilder;
    use serde_json::json;

    #[test]
    fn test_date_range_is_ascii() {
        let line = format_date_range("2024-11-23", "2024-12-07");
        assert_eq!(line, "2024-11-23 - 2024-12-07");
        assert!(line.is_ascii());
    }

    #[test]
    fn test_fetch_error_hints() {
        let unavailable = AppError::upstream_status(503, "maintenance", "http://x/board");
        assert!(format_fetch_error(&unavailable).ends_with("(temporary, try again shortly)"));

        let not_found = AppError::upstream_status(404, "unknown league", "http://x/board");
        assert!(format_fetch_error(&not_found).ends_with("(check --leagues and --season)"));

        let malformed = AppError::api_malformed_json("expected value", "http://x/board");
        let line = format_fetch_error(&malformed);
        assert!(line.starts_with("Error: "));
        assert!(!line.contains("try again"));
    }

    #[test]
    fn test_event_line_contains_teams_and_score() {
        let event = TestDataBuilder::create_live_event(1, "Bayern", "Dortmund", (2, 1));
        let line = format_event_line(&event);
        assert!(line.contains("Bayern"));
        assert!(line.contains("2:1"));
        assert!(line.ends_with("LIVE"));

        let scheduled = TestDataBuilder::create_basic_event(2, "Köln", "Mainz");
        assert!(format_event_line(&scheduled).contains("-:-"));
    }

    #[test]
    fn test_round_page_hints() {
        let mut cursor = RoundCursor::new(TestDataBuilder::create_history(1..=4, 1), 2);
        let first = format_round_page(&cursor.page());
        assert!(first.contains("Round 4"));
        assert!(first.contains("older: --page 1"));
        assert!(!first.contains("newer"));

        cursor.older();
        let second = format_round_page(&cursor.page());
        assert!(second.contains("Round 1"));
        assert!(second.contains("newer: --page 0"));
    }

    #[test]
    fn test_match_detail_rendering() {
        let detail: MatchDetail = serde_json::from_value(json!({
            "matchID": 9,
            "leagueShortcut": "bl1",
            "matchIsFinished": true,
            "team1": {"teamName": "Bayern"},
            "team2": {"teamName": "Dortmund"},
            "group": {"groupName": "12. Spieltag"},
            "matchResults": [
                {"resultName": "Halbzeit", "resultTypeID": 1, "resultOrderID": 1, "pointsTeam1": 1, "pointsTeam2": 0},
                {"resultName": "Endergebnis", "resultTypeID": 2, "resultOrderID": 2, "pointsTeam1": 2, "pointsTeam2": 1}
            ],
            "goals": [
                {"matchMinute": 70, "scoreTeam1": 2, "scoreTeam2": 1, "goalGetterName": "Kane", "isPenalty": true},
                {"matchMinute": 12, "scoreTeam1": 1, "scoreTeam2": 0, "goalGetterName": "Musiala"}
            ],
            "location": {"locationCity": "München", "locationStadium": "Allianz Arena"}
        }))
        .unwrap();

        let text = format_match_detail(&detail);
        assert!(text.starts_with("Bayern 2:1 Dortmund"));
        assert!(text.contains("BL1 12. Spieltag"));
        assert!(text.find("Musiala").unwrap() < text.find("Kane").unwrap());
        assert!(text.contains("pen."));
        assert!(text.contains("Allianz Arena, München"));
    }

    #[test]
    fn test_table_uses_icon_index_fallback() {
        let rows = vec![StandingsRow {
            team_info_id: Some(40),
            team_name: Some("Bayern".to_string()),
            points: 30,
            ..Default::default()
        }];
        let icons = HashMap::from([(40, "https://i/40.png".to_string())]);
        let text = format_table(&rows, &icons);
        assert!(text.contains("Bayern"));
        assert!(text.contains("https://i/40.png"));
    }
}

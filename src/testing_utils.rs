use chrono::{DateTime, Duration, TimeZone, Utc};
use serde_json::{Value, json};

use crate::data_fetcher::models::{Event, EventStatus, Score};

/// Test utilities for creating mock events and board payloads
pub struct TestDataBuilder;

impl TestDataBuilder {
    /// Parses an RFC 3339 kickoff, panicking on bad test input
    pub fn kickoff(raw: &str) -> DateTime<Utc> {
        DateTime::parse_from_rfc3339(raw)
            .map(|dt| dt.with_timezone(&Utc))
            .unwrap_or_else(|e| panic!("bad test kickoff '{raw}': {e}"))
    }

    /// Kickoff for a round: rounds are a week apart starting 2024-08-23
    pub fn round_kickoff(round: u32) -> DateTime<Utc> {
        let start = Utc
            .with_ymd_and_hms(2024, 8, 23, 18, 30, 0)
            .single()
            .unwrap_or_else(Utc::now);
        start + Duration::weeks(i64::from(round.saturating_sub(1)))
    }

    /// Creates a basic scheduled event
    pub fn create_basic_event(id: i64, home: &str, away: &str) -> Event {
        Event {
            id,
            competition: "bl1".to_string(),
            season: 2024,
            round: 1,
            home: home.to_string(),
            away: away.to_string(),
            score: None,
            kickoff: Self::round_kickoff(1),
            status: EventStatus::NotStarted,
        }
    }

    /// Creates a finished event in `round` with the given final score
    pub fn finished_event(id: i64, round: u32, home_goals: u32, away_goals: u32) -> Event {
        Event {
            round,
            score: Some(Score {
                home: home_goals,
                away: away_goals,
            }),
            kickoff: Self::round_kickoff(round),
            status: EventStatus::Finished,
            ..Self::create_basic_event(id, &format!("Home {id}"), &format!("Away {id}"))
        }
    }

    /// Creates a live event
    pub fn create_live_event(id: i64, home: &str, away: &str, score: (u32, u32)) -> Event {
        Event {
            score: Some(Score {
                home: score.0,
                away: score.1,
            }),
            status: EventStatus::InProgress,
            ..Self::create_basic_event(id, home, away)
        }
    }

    /// Board wire row for an event
    pub fn wire_event(event: &Event) -> Value {
        let status = match event.status {
            EventStatus::NotStarted => "SCHEDULED",
            EventStatus::InProgress => "LIVE",
            EventStatus::Finished => "FINISHED",
        };
        json!({
            "id": event.id,
            "league_shortcut": event.competition,
            "league_season": event.season,
            "group_order_id": event.round,
            "team1_name": event.home,
            "team2_name": event.away,
            "kickoff_utc": event.kickoff.to_rfc3339(),
            "status": status,
            "score_team1": event.score.map(|s| s.home),
            "score_team2": event.score.map(|s| s.away),
        })
    }

    /// Full board payload with the three partitions
    pub fn board_payload(live: &[Event], upcoming: &[Event], recent: &[Event]) -> Value {
        let rows = |events: &[Event]| events.iter().map(Self::wire_event).collect::<Vec<_>>();
        json!({
            "date_from": "2024-08-16",
            "date_to": "2024-08-30",
            "leagues": ["bl1"],
            "live": rows(live),
            "upcoming": rows(upcoming),
            "recent": rows(recent),
        })
    }

    /// Finished events for every round in `rounds`, `per_round` each
    pub fn create_history(rounds: std::ops::RangeInclusive<u32>, per_round: i64) -> Vec<Event> {
        rounds
            .flat_map(|round| {
                (0..per_round).map(move |n| Self::finished_event(i64::from(round) * 100 + n, round, 1, 1))
            })
            .collect()
    }
}

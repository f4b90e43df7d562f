use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::warn;

/// Lifecycle of a single event.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum EventStatus {
    NotStarted,
    InProgress,
    Finished,
}

impl EventStatus {
    /// Parses the canonical names and the board backend's spellings.
    /// Anything unrecognised (including the backend's `UNKNOWN`) is treated
    /// as not started.
    pub fn parse(raw: &str) -> Self {
        match raw.trim().to_ascii_uppercase().as_str() {
            "IN_PROGRESS" | "LIVE" => EventStatus::InProgress,
            "FINISHED" => EventStatus::Finished,
            _ => EventStatus::NotStarted,
        }
    }
}

impl fmt::Display for EventStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            EventStatus::NotStarted => "NOT_STARTED",
            EventStatus::InProgress => "IN_PROGRESS",
            EventStatus::Finished => "FINISHED",
        };
        f.write_str(s)
    }
}

/// Score pair. Both sides are always present together.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Score {
    pub home: u32,
    pub away: u32,
}

impl fmt::Display for Score {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.home, self.away)
    }
}

/// A single live, upcoming or past event as shown on the board.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    pub id: i64,
    pub competition: String,
    pub season: i32,
    pub round: u32,
    pub home: String,
    pub away: String,
    pub score: Option<Score>,
    pub kickoff: DateTime<Utc>,
    pub status: EventStatus,
}

impl Event {
    pub fn is_finished(&self) -> bool {
        self.status == EventStatus::Finished
    }

    /// "3:1" or "-:-" when no score is known yet.
    pub fn score_text(&self) -> String {
        self.score
            .map(|s| s.to_string())
            .unwrap_or_else(|| "-:-".to_string())
    }
}

/// Match summary as served by the board backend. Every field is optional so
/// that partial rows can be inspected before being accepted.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawEvent {
    #[serde(default)]
    pub id: Option<i64>,
    #[serde(default)]
    pub league_shortcut: Option<String>,
    #[serde(default)]
    pub league_season: Option<i32>,
    #[serde(default)]
    pub group_order_id: Option<i64>,
    #[serde(default)]
    pub team1_name: Option<String>,
    #[serde(default)]
    pub team2_name: Option<String>,
    #[serde(default)]
    pub kickoff_utc: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub score_team1: Option<i64>,
    #[serde(default)]
    pub score_team2: Option<i64>,
}

/// Parses an upstream timestamp into UTC.
///
/// Accepts RFC 3339 (with `Z` or an offset) and naive ISO timestamps, which
/// are taken to be UTC already.
pub fn parse_kickoff(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.with_timezone(&Utc));
    }
    ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"]
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(raw, fmt).ok())
        .map(|naive| naive.and_utc())
}

fn score_side(value: Option<i64>) -> Option<u32> {
    value.and_then(|v| u32::try_from(v).ok())
}

impl RawEvent {
    /// Converts the wire row into an [`Event`].
    ///
    /// Returns `None` when the row has no id or no parsable kickoff time.
    /// A half-populated score is dropped rather than guessed.
    pub fn into_event(self) -> Option<Event> {
        let id = self.id?;
        let kickoff = match self.kickoff_utc.as_deref().and_then(parse_kickoff) {
            Some(kickoff) => kickoff,
            None => {
                warn!("Dropping event {id}: missing or invalid kickoff_utc {:?}", self.kickoff_utc);
                return None;
            }
        };

        let score = match (score_side(self.score_team1), score_side(self.score_team2)) {
            (Some(home), Some(away)) => Some(Score { home, away }),
            _ => None,
        };

        Some(Event {
            id,
            competition: self.league_shortcut.unwrap_or_default().to_lowercase(),
            season: self.league_season.unwrap_or_default(),
            round: self
                .group_order_id
                .and_then(|r| u32::try_from(r).ok())
                .unwrap_or(0),
            home: self.team1_name.unwrap_or_else(|| "Unknown".to_string()),
            away: self.team2_name.unwrap_or_else(|| "Unknown".to_string()),
            score,
            kickoff,
            status: self
                .status
                .as_deref()
                .map(EventStatus::parse)
                .unwrap_or(EventStatus::NotStarted),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn raw(id: i64) -> RawEvent {
        RawEvent {
            id: Some(id),
            league_shortcut: Some("BL1".to_string()),
            league_season: Some(2024),
            group_order_id: Some(12),
            team1_name: Some("Bayern".to_string()),
            team2_name: Some("Dortmund".to_string()),
            kickoff_utc: Some("2024-11-30T17:30:00Z".to_string()),
            status: Some("FINISHED".to_string()),
            score_team1: Some(1),
            score_team2: Some(1),
        }
    }

    #[test]
    fn test_status_spellings() {
        assert_eq!(EventStatus::parse("LIVE"), EventStatus::InProgress);
        assert_eq!(EventStatus::parse("in_progress"), EventStatus::InProgress);
        assert_eq!(EventStatus::parse("SCHEDULED"), EventStatus::NotStarted);
        assert_eq!(EventStatus::parse("UNKNOWN"), EventStatus::NotStarted);
        assert_eq!(EventStatus::parse("FINISHED"), EventStatus::Finished);
    }

    #[test]
    fn test_into_event_full_row() {
        let event = raw(7).into_event().unwrap();
        assert_eq!(event.id, 7);
        assert_eq!(event.competition, "bl1");
        assert_eq!(event.round, 12);
        assert_eq!(event.score, Some(Score { home: 1, away: 1 }));
        assert_eq!(
            event.kickoff,
            Utc.with_ymd_and_hms(2024, 11, 30, 17, 30, 0).unwrap()
        );
        assert!(event.is_finished());
    }

    #[test]
    fn test_half_score_is_dropped() {
        let mut row = raw(1);
        row.score_team2 = None;
        let event = row.into_event().unwrap();
        assert_eq!(event.score, None);
        assert_eq!(event.score_text(), "-:-");
    }

    #[test]
    fn test_missing_kickoff_rejects_row() {
        let mut row = raw(1);
        row.kickoff_utc = Some("yesterday".to_string());
        assert!(row.into_event().is_none());
    }

    #[test]
    fn test_missing_id_rejects_row() {
        let mut row = raw(1);
        row.id = None;
        assert!(row.into_event().is_none());
    }

    #[test]
    fn test_naive_timestamp_is_utc() {
        let parsed = parse_kickoff("2024-08-18T15:30:00").unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 8, 18, 15, 30, 0).unwrap());

        let offset = parse_kickoff("2024-08-18T17:30:00+02:00").unwrap();
        assert_eq!(offset, parsed);
    }
}

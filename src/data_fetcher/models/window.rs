//! Board window query and its normalized result.
//!
//! The canonical response shape is
//!
//! ```json
//! {
//!   "date_from": "2024-11-23", "date_to": "2024-12-07",
//!   "leagues": ["bl1"],
//!   "live": [ ... ], "upcoming": [ ... ], "recent": [ ... ]
//! }
//! ```
//!
//! Anything else degrades to empty partitions: a non-object payload, a
//! missing or `null` field, or a field that is not an array. Rows inside a
//! partition that cannot be decoded are dropped one by one.

use crate::constants::window::MAX_DAYS;
use crate::error::AppError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::{debug, warn};

use super::event::{Event, RawEvent};

/// Parameters of one primary window fetch.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct WindowQuery {
    pub competitions: Vec<String>,
    pub season: Option<i32>,
    pub days_back: u32,
    pub days_ahead: u32,
}

impl WindowQuery {
    /// Builds a validated query.
    ///
    /// Competition codes are trimmed, lower-cased and de-duplicated while
    /// keeping their order.
    ///
    /// # Errors
    /// `AppError::Validation` when no competition remains or either day
    /// count exceeds the supported window.
    pub fn new<S: AsRef<str>>(
        competitions: &[S],
        season: Option<i32>,
        days_back: u32,
        days_ahead: u32,
    ) -> Result<Self, AppError> {
        let mut codes: Vec<String> = Vec::with_capacity(competitions.len());
        for code in competitions {
            let code = code.as_ref().trim().to_lowercase();
            if !code.is_empty() && !codes.contains(&code) {
                codes.push(code);
            }
        }

        if codes.is_empty() {
            return Err(AppError::validation("competition set must not be empty"));
        }
        if days_back > MAX_DAYS {
            return Err(AppError::validation(format!(
                "days_back must be within 0..={MAX_DAYS}, got {days_back}"
            )));
        }
        if days_ahead > MAX_DAYS {
            return Err(AppError::validation(format!(
                "days_ahead must be within 0..={MAX_DAYS}, got {days_ahead}"
            )));
        }

        Ok(Self {
            competitions: codes,
            season,
            days_back,
            days_ahead,
        })
    }

    /// Competition codes joined the way the upstream expects them.
    pub fn competitions_param(&self) -> String {
        self.competitions.join(",")
    }
}

/// Latest snapshot of live, upcoming and recent events for a query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Window {
    pub query: WindowQuery,
    /// Start of the server-side date range, for display only.
    pub date_from: Option<String>,
    /// End of the server-side date range, for display only.
    pub date_to: Option<String>,
    /// Competitions the server actually resolved.
    pub competitions: Vec<String>,
    pub live: Vec<Event>,
    pub upcoming: Vec<Event>,
    pub recent: Vec<Event>,
}

impl Window {
    /// An empty window for a query, used before the first fetch lands.
    pub fn empty(query: WindowQuery) -> Self {
        Self {
            query,
            date_from: None,
            date_to: None,
            competitions: Vec::new(),
            live: Vec::new(),
            upcoming: Vec::new(),
            recent: Vec::new(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.live.is_empty() && self.upcoming.is_empty() && self.recent.is_empty()
    }

    pub fn total_events(&self) -> usize {
        self.live.len() + self.upcoming.len() + self.recent.len()
    }
}

fn decode_partition(payload: &Value, field: &str) -> Vec<Event> {
    let rows = match payload.get(field) {
        Some(Value::Array(rows)) => rows,
        Some(Value::Null) | None => {
            debug!("Window field '{field}' missing or null, using empty list");
            return Vec::new();
        }
        Some(other) => {
            warn!("Window field '{field}' is not a list ({other}), using empty list");
            return Vec::new();
        }
    };

    let mut events: Vec<Event> = rows
        .iter()
        .filter_map(|row| match serde_json::from_value::<RawEvent>(row.clone()) {
            Ok(raw) => raw.into_event(),
            Err(e) => {
                warn!("Dropping undecodable row in '{field}': {e}");
                None
            }
        })
        .collect();
    events.sort_by_key(|e| (e.kickoff, e.id));
    events
}

fn decode_string(payload: &Value, field: &str) -> Option<String> {
    payload
        .get(field)
        .and_then(Value::as_str)
        .map(str::to_string)
        .filter(|s| !s.is_empty())
}

fn decode_competitions(payload: &Value) -> Vec<String> {
    let Some(Value::Array(items)) = payload.get("leagues") else {
        return Vec::new();
    };
    items
        .iter()
        .filter_map(|item| match item {
            Value::String(code) => Some(code.clone()),
            Value::Object(obj) => ["id", "shortcut", "league_shortcut"]
                .iter()
                .find_map(|k| obj.get(*k).and_then(Value::as_str))
                .map(str::to_string),
            _ => None,
        })
        .collect()
}

/// Normalizes a raw board payload into a [`Window`].
///
/// This never fails: the partitions of a malformed payload are simply empty.
/// Events within each partition are ordered chronologically.
pub fn decode_window(query: WindowQuery, payload: &Value) -> Window {
    if !payload.is_object() {
        warn!("Board payload is not an object, treating window as empty");
        return Window::empty(query);
    }

    Window {
        query,
        date_from: decode_string(payload, "date_from"),
        date_to: decode_string(payload, "date_to"),
        competitions: decode_competitions(payload),
        live: decode_partition(payload, "live"),
        upcoming: decode_partition(payload, "upcoming"),
        recent: decode_partition(payload, "recent"),
    }
}

pub mod event;
pub mod openliga;
pub mod window;

pub use event::{Event, EventStatus, RawEvent, Score, parse_kickoff};
pub use openliga::{Goal, Location, MatchDetail, MatchGroup, MatchResult, StandingsRow, TeamInfo};
pub use window::{Window, WindowQuery, decode_window};

//! Board orchestration: filters, refresh cadence, history paging.

pub mod controller;
pub mod filters;
pub mod pagination;
pub mod scheduler;
pub mod source;

pub use controller::{BoardController, BoardSettings, BoardView, RefreshCounters};
pub use filters::{FilterSet, FilterSnapshot};
pub use pagination::{RoundCursor, RoundGroup, RoundPage};
pub use scheduler::{RefreshFn, RefreshScheduler};
pub use source::{BoardSource, HttpBoardSource};

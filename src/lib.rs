//! Football match board library
//!
//! This library keeps a board of live, upcoming and recent matches fresh for
//! a set of competitions. It fetches board windows from the board API,
//! refreshes them on a cadence, pages finished matches by round, and serves
//! OpenLigaDB lookups (match details, team rosters, league tables) through a
//! deduplicating TTL cache.
//!
//! # Examples
//!
//! ```rust,no_run
//! use matchboard::board::BoardController;
//! use matchboard::config::Config;
//! use matchboard::data_fetcher::api::create_http_client_with_timeout;
//! use matchboard::display::format_board;
//! use matchboard::error::AppError;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), AppError> {
//!     let config = Config::load().await?;
//!     let client = create_http_client_with_timeout(config.http_timeout_seconds)?;
//!
//!     let controller = BoardController::from_config(&config, client);
//!     controller.apply_filters(controller.defaults().clone());
//!     controller.settle().await;
//!
//!     print!("{}", format_board(&controller.view()));
//!     Ok(())
//! }
//! ```

pub mod board;
pub mod config;
pub mod constants;
pub mod data_fetcher;
pub mod display;
pub mod error;
pub mod testing_utils;

// Re-export commonly used types for convenience
pub use board::{BoardController, BoardSettings, BoardView, FilterSet, RoundPage};
pub use config::Config;
pub use data_fetcher::api::{OpenLigaClient, fetch_history, fetch_window};
pub use data_fetcher::cache::{CacheInfo, CacheStats, FetchOptions, TtlStore};
pub use data_fetcher::models::{Event, EventStatus, Window, WindowQuery};
pub use error::AppError;

/// Current version of the library
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");

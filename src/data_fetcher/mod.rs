pub mod api;
pub mod cache;
pub mod models;

pub use api::{OpenLigaClient, fetch_history, fetch_window};
pub use cache::{FetchOptions, TtlStore};
pub use models::{Event, EventStatus, Window, WindowQuery};

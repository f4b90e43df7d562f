mod fetch_utils;
pub mod http_client;
pub mod openliga_api;
pub mod urls;
pub mod window_api;

pub use http_client::create_http_client_with_timeout;
pub use openliga_api::{OpenLigaClient, build_team_icon_index};
pub use urls::*;
pub use window_api::{fetch_history, fetch_window};

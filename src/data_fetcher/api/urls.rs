//! URL building utilities for the board API and OpenLigaDB

use reqwest::Url;

use crate::data_fetcher::models::WindowQuery;
use crate::error::AppError;

fn parse_base(base: &str) -> Result<Url, AppError> {
    Url::parse(base.trim_end_matches('/'))
        .map_err(|e| AppError::config_error(format!("Invalid API base '{base}': {e}")))
}

/// Appends path segments to `base`, percent-encoding each one.
fn with_segments(base: &str, segments: &[&str]) -> Result<Url, AppError> {
    let mut url = parse_base(base)?;
    url.path_segments_mut()
        .map_err(|_| AppError::config_error(format!("API base '{base}' cannot take a path")))?
        .pop_if_empty()
        .extend(segments);
    Ok(url)
}

/// Builds the board window URL.
///
/// # Example
/// ```
/// use matchboard::data_fetcher::api::build_board_url;
/// use matchboard::data_fetcher::models::WindowQuery;
///
/// let query = WindowQuery::new(&["bl1", "bl2"], Some(2024), 7, 3).unwrap();
/// let url = build_board_url("http://localhost:8000/api", &query).unwrap();
/// assert_eq!(
///     url,
///     "http://localhost:8000/api/board?leagues=bl1%2Cbl2&season=2024&days_back=7&days_ahead=3"
/// );
/// ```
pub fn build_board_url(api_base: &str, query: &WindowQuery) -> Result<String, AppError> {
    let mut url = with_segments(api_base, &["board"])?;
    {
        let mut pairs = url.query_pairs_mut();
        pairs.append_pair("leagues", &query.competitions_param());
        if let Some(season) = query.season {
            pairs.append_pair("season", &season.to_string());
        }
        pairs.append_pair("days_back", &query.days_back.to_string());
        pairs.append_pair("days_ahead", &query.days_ahead.to_string());
    }
    Ok(url.into())
}

/// `{base}/getmatchdata/{match_id}`
pub fn build_match_detail_url(openliga_base: &str, match_id: i64) -> Result<String, AppError> {
    with_segments(openliga_base, &["getmatchdata", &match_id.to_string()]).map(String::from)
}

/// `{base}/getavailableteams/{league}/{season}`
pub fn build_teams_url(openliga_base: &str, league: &str, season: i32) -> Result<String, AppError> {
    with_segments(
        openliga_base,
        &["getavailableteams", league, &season.to_string()],
    )
    .map(String::from)
}

/// `{base}/getbltable/{league}/{season}`
pub fn build_table_url(openliga_base: &str, league: &str, season: i32) -> Result<String, AppError> {
    with_segments(openliga_base, &["getbltable", league, &season.to_string()]).map(String::from)
}

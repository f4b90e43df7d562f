//! Board window and history fetches against the primary API

use reqwest::Client;
use tracing::{info, instrument, warn};

use super::fetch_utils::fetch_json;
use super::urls::build_board_url;
use crate::constants::history::FALLBACK_DAYS_BACK;
use crate::constants::window::MAX_DAYS;
use crate::data_fetcher::models::{Event, Window, WindowQuery, decode_window};
use crate::error::AppError;

/// Fetches the live/upcoming/recent window for `query`.
///
/// Every call goes to the network; windows are never cached. A payload with
/// missing or malformed partitions yields empty partitions rather than an
/// error.
#[instrument(skip(client), fields(leagues = %query.competitions_param()))]
pub async fn fetch_window(
    client: &Client,
    api_base: &str,
    query: &WindowQuery,
) -> Result<Window, AppError> {
    let url = build_board_url(api_base, query)?;
    let payload = fetch_json(client, &url).await?;
    let window = decode_window(query.clone(), &payload);
    info!(
        "Fetched window: live={}, upcoming={}, recent={}",
        window.live.len(),
        window.upcoming.len(),
        window.recent.len()
    );
    Ok(window)
}

/// Fetches finished events for history pagination.
///
/// Requests `days_back` days of the past with no look-ahead and keeps the
/// `recent` partition. When that deep request fails with a status or
/// transport error, one bounded request of [`FALLBACK_DAYS_BACK`] days is
/// made before giving up. Parse failures are not retried.
#[instrument(skip(client, competitions))]
pub async fn fetch_history<S: AsRef<str>>(
    client: &Client,
    api_base: &str,
    competitions: &[S],
    season: Option<i32>,
    days_back: u32,
) -> Result<Vec<Event>, AppError> {
    let days_back = days_back.min(MAX_DAYS);
    let query = WindowQuery::new(competitions, season, days_back, 0)?;

    match fetch_window(client, api_base, &query).await {
        Ok(window) => Ok(window.recent),
        Err(e) if days_back > FALLBACK_DAYS_BACK && (e.status().is_some() || e.is_transport()) => {
            warn!(
                "History request for {days_back} days failed ({e}), retrying with {FALLBACK_DAYS_BACK} days"
            );
            let bounded = WindowQuery {
                days_back: FALLBACK_DAYS_BACK,
                ..query
            };
            fetch_window(client, api_base, &bounded)
                .await
                .map(|window| window.recent)
        }
        Err(e) if e.is_parse() => {
            warn!("History response for {days_back} days could not be decoded: {e}");
            Err(e)
        }
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::api::http_client::create_test_http_client;
    use crate::data_fetcher::models::EventStatus;
    use serde_json::json;
    use wiremock::matchers::{method, path, query_param, query_param_is_missing};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn board_payload() -> serde_json::Value {
        json!({
            "date_from": "2024-11-23",
            "date_to": "2024-12-07",
            "leagues": ["bl1"],
            "live": [{
                "id": 3, "league_shortcut": "bl1", "league_season": 2024,
                "group_order_id": 12, "team1_name": "A", "team2_name": "B",
                "kickoff_utc": "2024-11-30T14:30:00Z", "status": "LIVE",
                "score_team1": 1, "score_team2": 0
            }],
            "upcoming": [
                {"id": 5, "league_shortcut": "bl1", "league_season": 2024, "group_order_id": 13,
                 "team1_name": "C", "team2_name": "D", "kickoff_utc": "2024-12-06T19:30:00Z",
                 "status": "SCHEDULED"},
                {"id": 4, "league_shortcut": "bl1", "league_season": 2024, "group_order_id": 13,
                 "team1_name": "E", "team2_name": "F", "kickoff_utc": "2024-12-06T19:30:00Z",
                 "status": "SCHEDULED"}
            ],
            "recent": null
        })
    }

    #[tokio::test]
    async fn test_fetch_window_serializes_query_and_decodes() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/api/board"))
            .and(query_param("leagues", "bl1,bl2"))
            .and(query_param("season", "2024"))
            .and(query_param("days_back", "7"))
            .and(query_param("days_ahead", "3"))
            .respond_with(ResponseTemplate::new(200).set_body_json(board_payload()))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_http_client();
        let query = WindowQuery::new(&["BL1", " bl2 "], Some(2024), 7, 3).unwrap();
        let window = fetch_window(&client, &format!("{}/api", server.uri()), &query)
            .await
            .unwrap();

        assert_eq!(window.live.len(), 1);
        assert_eq!(window.live[0].status, EventStatus::InProgress);
        assert_eq!(
            window.upcoming.iter().map(|e| e.id).collect::<Vec<_>>(),
            vec![4, 5]
        );
        assert!(window.recent.is_empty());
        assert_eq!(window.date_from.as_deref(), Some("2024-11-23"));
    }

    #[tokio::test]
    async fn test_fetch_window_omits_absent_season() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/board"))
            .and(query_param_is_missing("season"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([])))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_http_client();
        let query = WindowQuery::new(&["bl1"], None, 7, 7).unwrap();
        let window = fetch_window(&client, &server.uri(), &query).await.unwrap();
        assert!(window.is_empty());
    }

    #[tokio::test]
    async fn test_fetch_window_is_never_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(board_payload()))
            .expect(2)
            .mount(&server)
            .await;

        let client = create_test_http_client();
        let query = WindowQuery::new(&["bl1"], None, 7, 7).unwrap();
        fetch_window(&client, &server.uri(), &query).await.unwrap();
        fetch_window(&client, &server.uri(), &query).await.unwrap();
    }

    #[tokio::test]
    async fn test_history_falls_back_to_bounded_window() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("days_back", "120"))
            .respond_with(ResponseTemplate::new(422).set_body_string("window too large"))
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(query_param("days_back", "30"))
            .and(query_param("days_ahead", "0"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "recent": [{
                    "id": 1, "league_shortcut": "bl1", "league_season": 2024,
                    "group_order_id": 10, "team1_name": "A", "team2_name": "B",
                    "kickoff_utc": "2024-11-09T14:30:00Z", "status": "FINISHED",
                    "score_team1": 2, "score_team2": 2
                }]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_http_client();
        let events = fetch_history(&client, &server.uri(), &["bl1"], Some(2024), 120)
            .await
            .unwrap();
        assert_eq!(events.len(), 1);
        assert_eq!(events[0].round, 10);
    }

    #[tokio::test]
    async fn test_history_surfaces_failure_after_fallback() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(500).set_body_string("boom"))
            .expect(2)
            .mount(&server)
            .await;

        let client = create_test_http_client();
        let err = fetch_history(&client, &server.uri(), &["bl1"], None, 120)
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));
    }

    #[tokio::test]
    async fn test_history_does_not_retry_parse_failures() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
            .expect(1)
            .mount(&server)
            .await;

        let client = create_test_http_client();
        let err = fetch_history(&client, &server.uri(), &["bl1"], None, 120)
            .await
            .unwrap_err();
        assert!(err.is_parse());
    }

    #[tokio::test]
    async fn test_empty_competitions_rejected_before_network() {
        let client = create_test_http_client();
        let empty: [&str; 0] = [];
        let err = fetch_history(&client, "http://127.0.0.1:9", &empty, None, 30)
            .await
            .unwrap_err();
        assert!(matches!(err, AppError::Validation(_)));
    }
}

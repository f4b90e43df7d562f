//! Cached OpenLigaDB lookups: match details, team rosters and league tables.

use reqwest::Client;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use super::fetch_utils::fetch;
use super::urls::{build_match_detail_url, build_table_url, build_teams_url};
use crate::data_fetcher::cache::{CacheInfo, CacheKey, Clock, FetchOptions, SystemClock, TtlStore};
use crate::data_fetcher::models::{MatchDetail, StandingsRow, TeamInfo};
use crate::error::AppError;

/// Client for the secondary lookups.
///
/// Each lookup kind has its own [`TtlStore`], so repeated reads within the
/// TTL are served from memory and concurrent reads of the same key share a
/// single request. Cloning is cheap and clones share the stores.
#[derive(Debug, Clone)]
pub struct OpenLigaClient {
    client: Client,
    base: Arc<str>,
    details: Arc<TtlStore<MatchDetail>>,
    teams: Arc<TtlStore<Vec<TeamInfo>>>,
    tables: Arc<TtlStore<Vec<StandingsRow>>>,
}

impl OpenLigaClient {
    pub fn new(client: Client, base: &str, ttl: Duration) -> Self {
        Self::with_clock(client, base, ttl, Arc::new(SystemClock))
    }

    /// Builds a client whose caches age entries with `clock`.
    pub fn with_clock(client: Client, base: &str, ttl: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            client,
            base: Arc::from(base.trim_end_matches('/')),
            details: Arc::new(TtlStore::with_clock("match_details", ttl, clock.clone())),
            teams: Arc::new(TtlStore::with_clock("teams", ttl, clock.clone())),
            tables: Arc::new(TtlStore::with_clock("tables", ttl, clock)),
        }
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    /// Full record of one match.
    #[instrument(skip(self))]
    pub async fn get_match_details(
        &self,
        match_id: i64,
        options: FetchOptions,
    ) -> Result<MatchDetail, AppError> {
        let url = build_match_detail_url(&self.base, match_id)?;
        let key = CacheKey::MatchDetail(match_id).to_string();
        let client = self.client.clone();
        self.details
            .get_or_fetch(
                &key,
                move || async move { fetch::<MatchDetail>(&client, &url).await },
                options,
            )
            .await
    }

    /// Teams taking part in `league` during `season`.
    #[instrument(skip(self))]
    pub async fn get_available_teams(
        &self,
        league: &str,
        season: i32,
        options: FetchOptions,
    ) -> Result<Vec<TeamInfo>, AppError> {
        let url = build_teams_url(&self.base, league, season)?;
        let key = CacheKey::Teams {
            league: league.to_string(),
            season,
        }
        .to_string();
        let client = self.client.clone();
        self.teams
            .get_or_fetch(
                &key,
                move || async move { fetch::<Vec<TeamInfo>>(&client, &url).await },
                options,
            )
            .await
    }

    /// Standings of `league` in `season`.
    #[instrument(skip(self))]
    pub async fn get_league_table(
        &self,
        league: &str,
        season: i32,
        options: FetchOptions,
    ) -> Result<Vec<StandingsRow>, AppError> {
        let url = build_table_url(&self.base, league, season)?;
        let key = CacheKey::Table {
            league: league.to_string(),
            season,
        }
        .to_string();
        let client = self.client.clone();
        self.tables
            .get_or_fetch(
                &key,
                move || async move { fetch::<Vec<StandingsRow>>(&client, &url).await },
                options,
            )
            .await
    }

    /// Team id to icon URL for `league` and `season`, built from the cached
    /// roster.
    pub async fn team_icon_index(
        &self,
        league: &str,
        season: i32,
        options: FetchOptions,
    ) -> Result<HashMap<i64, String>, AppError> {
        let teams = self.get_available_teams(league, season, options).await?;
        Ok(build_team_icon_index(&teams))
    }

    /// Per-store cache snapshots, for `--debug` output.
    pub async fn cache_info(&self) -> Vec<(&'static str, CacheInfo)> {
        vec![
            (self.details.name(), self.details.info().await),
            (self.teams.name(), self.teams.info().await),
            (self.tables.name(), self.tables.info().await),
        ]
    }
}

/// Maps team ids to icon URLs, skipping teams that lack either.
pub fn build_team_icon_index(teams: &[TeamInfo]) -> HashMap<i64, String> {
    teams
        .iter()
        .filter_map(|team| {
            let id = team.team_id?;
            let icon = team.team_icon_url.as_deref().filter(|url| !url.is_empty())?;
            Some((id, icon.to_string()))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::data_fetcher::api::http_client::create_test_http_client;
    use crate::data_fetcher::cache::ManualClock;
    use serde_json::json;
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const TTL: Duration = Duration::from_secs(300);

    fn client_for(server: &MockServer) -> (OpenLigaClient, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new());
        let client = OpenLigaClient::with_clock(
            create_test_http_client(),
            &server.uri(),
            TTL,
            clock.clone(),
        );
        (client, clock)
    }

    #[tokio::test]
    async fn test_match_details_cached_within_ttl() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getmatchdata/66001"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "matchID": 66001,
                "team1": {"teamId": 40, "teamName": "Bayern"},
                "team2": {"teamId": 7, "teamName": "Dortmund"},
                "matchResults": [{"resultTypeID": 2, "pointsTeam1": 2, "pointsTeam2": 1}]
            })))
            .expect(2)
            .mount(&server)
            .await;

        let (client, clock) = client_for(&server);
        let first = client
            .get_match_details(66001, FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(first.final_score(), Some((2, 1)));

        clock.advance(TTL - Duration::from_secs(1));
        client
            .get_match_details(66001, FetchOptions::default())
            .await
            .unwrap();

        clock.advance(Duration::from_secs(2));
        client
            .get_match_details(66001, FetchOptions::default())
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_concurrent_lookups_share_one_request() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getbltable/bl1/2024"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!([{"teamInfoId": 40, "teamName": "Bayern", "points": 30}]))
                    .set_delay(Duration::from_millis(100)),
            )
            .expect(1)
            .mount(&server)
            .await;

        let (client, _clock) = client_for(&server);
        let lookups = (0..5).map(|_| {
            let client = client.clone();
            async move { client.get_league_table("bl1", 2024, FetchOptions::default()).await }
        });
        let results = futures::future::join_all(lookups).await;
        for table in results {
            let table = table.unwrap();
            assert_eq!(table[0].points, 30);
        }
    }

    #[tokio::test]
    async fn test_failed_lookup_not_cached() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getavailableteams/bl1/2024"))
            .respond_with(ResponseTemplate::new(500).set_body_string("upstream down"))
            .up_to_n_times(1)
            .expect(1)
            .mount(&server)
            .await;
        Mock::given(method("GET"))
            .and(path("/getavailableteams/bl1/2024"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!([
                {"teamId": 40, "teamName": "Bayern", "teamIconUrl": "https://i/40.png"},
                {"teamID": 7, "teamIconURL": "https://i/7.png"},
                {"teamId": 99}
            ])))
            .expect(1)
            .mount(&server)
            .await;

        let (client, _clock) = client_for(&server);
        let err = client
            .get_available_teams("bl1", 2024, FetchOptions::default())
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(500));

        let icons = client
            .team_icon_index("bl1", 2024, FetchOptions::default())
            .await
            .unwrap();
        assert_eq!(icons.len(), 2);
        assert_eq!(icons.get(&7).map(String::as_str), Some("https://i/7.png"));
    }

    #[tokio::test]
    async fn test_force_refetches() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(path("/getmatchdata/1"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"matchID": 1})))
            .expect(2)
            .mount(&server)
            .await;

        let (client, _clock) = client_for(&server);
        client
            .get_match_details(1, FetchOptions::default())
            .await
            .unwrap();
        client
            .get_match_details(1, FetchOptions::forced())
            .await
            .unwrap();

        let info = client.cache_info().await;
        assert_eq!(info[0].1.entries, 1);
        assert_eq!(info[0].1.stats.fetches, 2);
    }
}

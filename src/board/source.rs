//! Where the board controller gets its data from.

use futures::FutureExt;
use futures::future::BoxFuture;
use reqwest::Client;
use std::sync::Arc;

use super::filters::FilterSet;
use crate::data_fetcher::api::{fetch_history, fetch_window};
use crate::data_fetcher::models::{Event, Window, WindowQuery};
use crate::error::AppError;

/// Window and history loads used by the controller.
pub trait BoardSource: Send + Sync + 'static {
    /// Fetches the live/upcoming/recent window.
    fn window(&self, query: WindowQuery) -> BoxFuture<'static, Result<Window, AppError>>;

    /// Fetches finished events reaching `days_back` days into the past.
    fn history(
        &self,
        filters: FilterSet,
        days_back: u32,
    ) -> BoxFuture<'static, Result<Vec<Event>, AppError>>;
}

/// [`BoardSource`] backed by the board HTTP API.
#[derive(Debug, Clone)]
pub struct HttpBoardSource {
    client: Client,
    api_base: Arc<str>,
}

impl HttpBoardSource {
    pub fn new(client: Client, api_base: &str) -> Self {
        Self {
            client,
            api_base: Arc::from(api_base.trim_end_matches('/')),
        }
    }
}

impl BoardSource for HttpBoardSource {
    fn window(&self, query: WindowQuery) -> BoxFuture<'static, Result<Window, AppError>> {
        let client = self.client.clone();
        let api_base = Arc::clone(&self.api_base);
        async move { fetch_window(&client, &api_base, &query).await }.boxed()
    }

    fn history(
        &self,
        filters: FilterSet,
        days_back: u32,
    ) -> BoxFuture<'static, Result<Vec<Event>, AppError>> {
        let client = self.client.clone();
        let api_base = Arc::clone(&self.api_base);
        async move {
            fetch_history(
                &client,
                &api_base,
                &filters.competitions,
                filters.season,
                days_back,
            )
            .await
        }
        .boxed()
    }
}

use std::sync::Arc;
use std::time::Duration;

use sgsearch_config::{Config, Location};
use tokio::task::JoinHandle;

use crate::normalize::normalize;
use crate::transport::{GraphQlTransport, Transport, DEFAULT_TIMEOUT};
use crate::types::*;
use crate::{Result, SearchError};

/// Dispatches searches through a [`Transport`] and normalizes what comes back.
///
/// Cloning is cheap; clones share the transport. Each call builds its own query
/// and result set, so concurrent searches never observe each other.
pub struct SearchClient<T = GraphQlTransport> {
    transport: Arc<T>,
}

impl<T> Clone for SearchClient<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl SearchClient<GraphQlTransport> {
    pub fn new(location: &Location) -> Self {
        Self::with_timeout(location, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(location: &Location, timeout: Duration) -> Self {
        let transport = GraphQlTransport::new(location, timeout);
        tracing::info!(
            endpoint = transport.endpoint(),
            authenticated = transport.is_authenticated(),
            "Search client ready"
        );
        Self::with_transport(transport)
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let location = sgsearch_auth::resolve_location(&config.location)?;
        Ok(Self::with_timeout(
            &location,
            Duration::from_secs(config.location.timeout_secs),
        ))
    }
}

impl<T: Transport + 'static> SearchClient<T> {
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    pub async fn search(&self, query: &str, pattern_type: PatternType) -> Result<Search> {
        self.execute(SearchQuery::new(query, pattern_type)).await
    }

    pub async fn search_default(&self, query: &str) -> Result<Search> {
        self.search(query, PatternType::Literal).await
    }

    pub async fn literal_search(&self, query: &str, case_sensitive: bool) -> Result<Search> {
        self.execute(SearchQuery::literal(query).with_case_sensitive(case_sensitive))
            .await
    }

    pub async fn regex_search(&self, query: &str) -> Result<Search> {
        self.search(query, PatternType::Regexp).await
    }

    pub async fn structural_search(&self, query: &str) -> Result<Search> {
        self.search(query, PatternType::Structural).await
    }

    /// Issues exactly one transport call. Either the whole normalized result set
    /// or the error comes back; nothing partial.
    pub async fn execute(&self, query: SearchQuery) -> Result<Search> {
        let dispatched = query.dispatched_query();
        tracing::debug!(query = %dispatched, pattern_type = %query.pattern_type, "Dispatching search");

        let raw = self.transport.execute(&query).await?;
        let results = normalize(&raw);
        tracing::debug!(raw = raw.len(), results = results.len(), "Search completed");

        Ok(Search {
            query: dispatched,
            results,
        })
    }

    /// Callback form of [`SearchClient::search`]. Runs on the current tokio runtime
    /// and calls exactly one of the continuations, once. Aborting the returned
    /// handle cancels the request and neither continuation runs.
    ///
    /// An unrecognized result type also reaches `on_error`; check
    /// [`SearchError::is_contract_violation`] to tell it apart from transport failures.
    pub fn search_with<S, E>(
        &self,
        query: &str,
        pattern_type: PatternType,
        on_success: S,
        on_error: E,
    ) -> JoinHandle<()>
    where
        S: FnOnce(Search) + Send + 'static,
        E: FnOnce(SearchError) + Send + 'static,
    {
        let client = self.clone();
        let query = SearchQuery::new(query, pattern_type);
        tokio::spawn(async move {
            match client.execute(query).await {
                Ok(search) => on_success(search),
                Err(e) => on_error(e),
            }
        })
    }
}

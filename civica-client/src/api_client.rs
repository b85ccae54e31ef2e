//! HTTP gateways for the three query surfaces.
//!
//! Thin adapters from [`QueryPayload`] to the query service's GET
//! endpoints. Every failure, transport or service, is flattened into a
//! [`GatewayError`]; the session controller shows a retriable banner and
//! never inspects service error bodies.

use crate::config::ClientConfig;
use crate::error::ClientError;
use async_trait::async_trait;
use civica_core::{CommentSummary, DocketSummary, SiteHit};
use civica_session::{GatewayError, QueryGateway, QueryPayload, ResultPage};
use serde::Deserialize;
use std::time::Duration;
use tracing::warn;

/// Wire shape of a result page.
#[derive(Debug, Deserialize)]
struct PageEnvelope<T> {
    records: Vec<T>,
    #[serde(default)]
    total: Option<u64>,
}

#[derive(Clone)]
pub struct RestClient {
    client: reqwest::Client,
    base_url: String,
}

impl RestClient {
    pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
        let timeout = Duration::from_millis(config.request_timeout_ms);
        let client = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url: config.api_base_url.trim_end_matches('/').to_string(),
        })
    }

    async fn fetch_page<T>(
        &self,
        path: &str,
        payload: &QueryPayload,
    ) -> Result<ResultPage<T>, GatewayError>
    where
        T: serde::de::DeserializeOwned,
    {
        let url = format!("{}{}", self.base_url, path);
        let response = self
            .client
            .get(url)
            .query(&query_pairs(payload))
            .send()
            .await
            .map_err(|err| {
                warn!(path, error = %err, "query service request failed");
                GatewayError::Transport(err.to_string())
            })?;

        let status = response.status();
        if !status.is_success() {
            warn!(path, status = status.as_u16(), "query service error status");
            return Err(GatewayError::Service(format!("HTTP {}", status.as_u16())));
        }

        let envelope: PageEnvelope<T> = response
            .json()
            .await
            .map_err(|err| GatewayError::Service(format!("malformed response: {err}")))?;
        Ok(ResultPage {
            records: envelope.records,
            total: envelope.total,
        })
    }
}

/// Flatten a payload into request query parameters. Order matches the
/// location-string convention so service logs read like shared links.
fn query_pairs(payload: &QueryPayload) -> Vec<(String, String)> {
    let mut pairs = Vec::with_capacity(payload.facets.len() + 4);
    if let Some(query) = &payload.query {
        pairs.push(("q".to_string(), query.clone()));
    }
    for (key, value) in &payload.facets {
        pairs.push((key.clone(), value.clone()));
    }
    pairs.push(("sort".to_string(), payload.sort.as_str().to_string()));
    pairs.push(("limit".to_string(), payload.limit.to_string()));
    pairs.push(("offset".to_string(), payload.offset.to_string()));
    pairs
}

macro_rules! surface_gateway {
    ($(#[$doc:meta])* $name:ident, $record:ty, $path:literal) => {
        $(#[$doc])*
        #[derive(Clone)]
        pub struct $name {
            rest: RestClient,
        }

        impl $name {
            pub fn new(config: &ClientConfig) -> Result<Self, ClientError> {
                Ok(Self {
                    rest: RestClient::new(config)?,
                })
            }
        }

        #[async_trait]
        impl QueryGateway for $name {
            type Record = $record;

            async fn fetch(
                &self,
                payload: QueryPayload,
            ) -> Result<ResultPage<Self::Record>, GatewayError> {
                self.rest.fetch_page($path, &payload).await
            }
        }
    };
}

surface_gateway! {
    /// Docket browse surface.
    DocketGateway, DocketSummary, "/api/v1/dockets"
}

surface_gateway! {
    /// Comment search surface.
    CommentGateway, CommentSummary, "/api/v1/comments/search"
}

surface_gateway! {
    /// Generic site search surface.
    SiteGateway, SiteHit, "/api/v1/search"
}

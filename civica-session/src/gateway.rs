//! The remote query service boundary.
//!
//! The controller hands the gateway a normalized payload and gets back one
//! ordered page of records. Service internals (ranking, permissions) live
//! on the other side of this trait.

use crate::filter::FilterModel;
use crate::session::{FetchTicket, RecordKey};
use async_trait::async_trait;
use civica_core::SortKey;
use serde::Serialize;
use thiserror::Error;

/// Normalized filter payload for one fetch: the filter model flattened to
/// what the service accepts, with the page window taken from the ticket.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueryPayload {
    pub query: Option<String>,
    pub facets: Vec<(String, String)>,
    pub sort: SortKey,
    pub limit: u32,
    pub offset: u32,
}

impl QueryPayload {
    pub fn new(filters: &FilterModel, ticket: FetchTicket) -> Self {
        Self {
            query: filters.query().map(str::to_string),
            facets: filters
                .facets()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            sort: filters.sort(),
            limit: ticket.limit,
            offset: ticket.offset,
        }
    }
}

/// One page of results. `total` is present only on surfaces whose service
/// reports it; everywhere else the session keeps its own estimate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResultPage<R> {
    pub records: Vec<R>,
    pub total: Option<u64>,
}

impl<R> ResultPage<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records,
            total: None,
        }
    }

    pub fn with_total(records: Vec<R>, total: u64) -> Self {
        Self {
            records,
            total: Some(total),
        }
    }
}

/// Any transport or service failure, flattened. The controller never
/// interprets structured error codes; it shows a retriable banner.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum GatewayError {
    #[error("query service unreachable: {0}")]
    Transport(String),

    #[error("query service error: {0}")]
    Service(String),
}

/// The remote query service for one surface.
#[async_trait]
pub trait QueryGateway: Send + Sync {
    type Record: RecordKey + Send + 'static;

    async fn fetch(&self, payload: QueryPayload) -> Result<ResultPage<Self::Record>, GatewayError>;
}

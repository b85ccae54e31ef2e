//! Session state and result accumulation for one query surface.
//!
//! A [`SearchSession`] is owned by exactly one page instance. Every
//! dispatched fetch carries a [`FetchTicket`]; a response is applied only
//! if its ticket still matches the session's current generation and
//! sub-sequence. Responses therefore land in dispatch-intent order, never
//! arrival order: a slow response to an abandoned query cannot overwrite
//! the current result set.

use crate::filter::FilterModel;
use crate::gateway::ResultPage;
use civica_core::{CommentSummary, DocketSummary, SiteHit};
use tracing::debug;

/// Stable identity of a result record, used to deduplicate accumulation.
pub trait RecordKey {
    fn record_key(&self) -> &str;
}

impl RecordKey for DocketSummary {
    fn record_key(&self) -> &str {
        self.id.as_str()
    }
}

impl RecordKey for CommentSummary {
    fn record_key(&self) -> &str {
        self.id.as_str()
    }
}

impl RecordKey for SiteHit {
    fn record_key(&self) -> &str {
        &self.id
    }
}

/// Whether a response replaces the result set or extends it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadMode {
    Replace,
    Append,
}

/// Tag attached to one dispatched fetch.
///
/// `generation` changes on every new search; `seq` advances within a
/// generation for load-more pages. Both must match for the response to be
/// applied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FetchTicket {
    pub generation: u64,
    pub seq: u64,
    pub mode: LoadMode,
    pub limit: u32,
    pub offset: u32,
}

/// Runtime state of one search/browse page.
#[derive(Debug, Clone)]
pub struct SearchSession<R> {
    filters: FilterModel,
    results: Vec<R>,
    loading: bool,
    error: Option<String>,
    has_more: bool,
    total: u64,
    generation: u64,
    seq: u64,
}

impl<R: RecordKey> SearchSession<R> {
    pub fn new(filters: FilterModel) -> Self {
        Self {
            filters,
            results: Vec::new(),
            loading: false,
            error: None,
            has_more: true,
            total: 0,
            generation: 0,
            seq: 0,
        }
    }

    pub fn filters(&self) -> &FilterModel {
        &self.filters
    }

    pub fn results(&self) -> &[R] {
        &self.results
    }

    pub fn loading(&self) -> bool {
        self.loading
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    pub fn has_more(&self) -> bool {
        self.has_more
    }

    /// Estimated size of the full result set. Exact only when the gateway
    /// reported a total.
    pub fn total(&self) -> u64 {
        self.total
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    /// Dispatch a new search. The offset of the dispatched filters is
    /// forced to zero; prior results stay visible until the matching
    /// response arrives, so a refinement never flashes an empty list.
    pub fn search(&mut self, mut filters: FilterModel) -> FetchTicket {
        filters.set_offset(0);
        self.begin(filters, LoadMode::Replace)
    }

    /// Dispatch a search that honors the offset already present in the
    /// filters. Used for inbound navigation (deep links into page N).
    pub fn restore(&mut self, filters: FilterModel) -> FetchTicket {
        self.begin(filters, LoadMode::Replace)
    }

    /// Dispatch the next page of the current search, if one may exist.
    /// Refused while a fetch is in flight.
    pub fn load_more(&mut self) -> Option<FetchTicket> {
        if self.loading || !self.has_more {
            return None;
        }
        self.seq += 1;
        self.loading = true;
        self.error = None;
        Some(FetchTicket {
            generation: self.generation,
            seq: self.seq,
            mode: LoadMode::Append,
            limit: self.filters.limit(),
            offset: self.filters.offset() + self.results.len() as u32,
        })
    }

    /// Apply a successful response. Discarded unconditionally when the
    /// ticket no longer matches the current generation and sub-sequence.
    pub fn on_response(&mut self, ticket: FetchTicket, page: ResultPage<R>) {
        if self.is_stale(ticket) {
            debug!(
                generation = ticket.generation,
                seq = ticket.seq,
                current_generation = self.generation,
                current_seq = self.seq,
                "discarding stale response"
            );
            return;
        }
        self.loading = false;
        self.has_more = page.records.len() as u32 == ticket.limit;
        if ticket.mode == LoadMode::Replace {
            self.results.clear();
        }
        for record in page.records {
            if !self
                .results
                .iter()
                .any(|r| r.record_key() == record.record_key())
            {
                self.results.push(record);
            }
        }
        self.total = page
            .total
            .unwrap_or(self.filters.offset() as u64 + self.results.len() as u64);
    }

    /// Apply a failed fetch. Prior results are deliberately left in place:
    /// a failed refinement or load-more keeps showing what the user already
    /// had, next to the error banner.
    pub fn on_error(&mut self, ticket: FetchTicket, message: impl Into<String>) {
        if self.is_stale(ticket) {
            debug!(
                generation = ticket.generation,
                seq = ticket.seq,
                "discarding stale error"
            );
            return;
        }
        self.loading = false;
        self.error = Some(message.into());
    }

    /// Clear accumulated state and invalidate any in-flight fetch.
    pub fn reset(&mut self) {
        self.results.clear();
        self.error = None;
        self.has_more = true;
        self.total = 0;
        self.loading = false;
        self.generation += 1;
        self.seq = 0;
    }

    fn begin(&mut self, filters: FilterModel, mode: LoadMode) -> FetchTicket {
        self.filters = filters;
        self.generation += 1;
        self.seq = 0;
        self.loading = true;
        self.error = None;
        FetchTicket {
            generation: self.generation,
            seq: self.seq,
            mode,
            limit: self.filters.limit(),
            offset: self.filters.offset(),
        }
    }

    fn is_stale(&self, ticket: FetchTicket) -> bool {
        ticket.generation != self.generation || ticket.seq != self.seq
    }
}

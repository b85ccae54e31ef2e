//! Read-only projections over the session for rendering.
//!
//! Everything here is recomputed on read from the session and filter
//! model; nothing is cached or mutated.

use crate::filter::FilterModel;
use crate::session::{RecordKey, SearchSession};
use std::fmt;

/// Which filter field a chip clears.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChipField {
    Query,
    Facet(&'static str),
}

/// One active-filter chip: a label for display and the field its removal
/// action clears.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterChip {
    pub field: ChipField,
    pub label: String,
}

/// One chip per non-default query/facet value, in display order (query
/// first, then facets in schema order).
pub fn active_chips(model: &FilterModel) -> Vec<FilterChip> {
    let mut chips = Vec::new();
    if let Some(query) = model.query() {
        chips.push(FilterChip {
            field: ChipField::Query,
            label: format!("\u{201c}{query}\u{201d}"),
        });
    }
    for (key, value) in model.facets() {
        chips.push(FilterChip {
            field: ChipField::Facet(key),
            label: format!("{}: {value}", key.replace('_', " ")),
        });
    }
    chips
}

/// The model with one chip's field cleared. The caller follows this with
/// `reset()` + `search()` on the session.
pub fn without(model: &FilterModel, field: ChipField) -> FilterModel {
    let mut cleared = model.clone();
    match field {
        ChipField::Query => cleared.clear_query(),
        ChipField::Facet(key) => cleared.clear_facet(key),
    }
    cleared.set_offset(0);
    cleared
}

/// Parts of a "showing X-Y of ~N" line.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageSummary {
    pub from: u64,
    pub to: u64,
    pub total: u64,
    /// The total is the session's estimate, not a service-reported count.
    pub approximate: bool,
}

impl fmt::Display for PageSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let tilde = if self.approximate { "~" } else { "" };
        write!(
            f,
            "showing {}-{} of {}{}",
            self.from, self.to, tilde, self.total
        )
    }
}

/// Pagination summary for a session with visible rows; `None` while there
/// is nothing to summarize.
pub fn page_summary<R: RecordKey>(session: &SearchSession<R>) -> Option<PageSummary> {
    let shown = session.results().len() as u64;
    if shown == 0 {
        return None;
    }
    let from = session.filters().offset() as u64 + 1;
    let to = session.filters().offset() as u64 + shown;
    Some(PageSummary {
        from,
        to,
        total: session.total(),
        // The accumulated count is exact only once the last page arrived.
        approximate: session.has_more(),
    })
}

/// Why a completed search shows no rows, so the copy can guide the user.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EmptyState {
    /// Filters are set and nothing matched: offer clearing them.
    NoMatches,
    /// No filters and still nothing: the collection itself is empty.
    NothingYet,
}

/// The empty-state variant to render, or `None` when the session has rows,
/// is still loading, or is showing an error instead.
pub fn empty_state<R: RecordKey>(session: &SearchSession<R>) -> Option<EmptyState> {
    if !session.results().is_empty() || session.loading() || session.error().is_some() {
        return None;
    }
    if session.filters().has_active_filters() {
        Some(EmptyState::NoMatches)
    } else {
        Some(EmptyState::NothingYet)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::COMMENT_SEARCH;
    use crate::gateway::ResultPage;
    use civica_core::{CommentId, CommentSummary, CommenterType, DocketId};
    use chrono::NaiveDate;

    fn comment(n: u32) -> CommentSummary {
        CommentSummary {
            id: CommentId::parse(&format!("EPA-2024-0412-{n:04}")).unwrap(),
            docket_id: DocketId::parse("EPA-2024-0412").unwrap(),
            commenter: "A. Resident".to_string(),
            commenter_type: CommenterType::Individual,
            position: None,
            snippet: "…".to_string(),
            posted_on: NaiveDate::from_ymd_opt(2024, 6, 2).unwrap(),
        }
    }

    fn comments(range: std::ops::Range<u32>) -> Vec<CommentSummary> {
        range.map(comment).collect()
    }

    fn model() -> FilterModel {
        FilterModel::new(&COMMENT_SEARCH)
    }

    #[test]
    fn chips_cover_query_and_facets_in_order() {
        let mut m = model();
        m.set_query("wetlands");
        m.set_facet("commenter_type", "organization");
        m.set_facet("agency", "EPA");

        let chips = active_chips(&m);
        assert_eq!(chips.len(), 3);
        assert_eq!(chips[0].field, ChipField::Query);
        assert_eq!(chips[1].field, ChipField::Facet("agency"));
        assert_eq!(chips[2].field, ChipField::Facet("commenter_type"));
        assert_eq!(chips[2].label, "commenter type: organization");
    }

    #[test]
    fn no_chips_for_default_model() {
        assert!(active_chips(&model()).is_empty());
    }

    #[test]
    fn sort_and_limit_never_become_chips() {
        let mut m = model();
        m.set_sort(civica_core::SortKey::Relevance);
        m.set_limit(50);
        m.set_offset(30);
        assert!(active_chips(&m).is_empty());
    }

    #[test]
    fn without_clears_one_field_and_rewinds_offset() {
        let mut m = model();
        m.set_query("wetlands");
        m.set_facet("agency", "EPA");
        m.set_offset(40);

        let cleared = without(&m, ChipField::Facet("agency"));
        assert_eq!(cleared.facet("agency"), None);
        assert_eq!(cleared.query(), Some("wetlands"));
        assert_eq!(cleared.offset(), 0);

        let cleared = without(&m, ChipField::Query);
        assert_eq!(cleared.query(), None);
        assert_eq!(cleared.facet("agency"), Some("EPA"));
    }

    #[test]
    fn page_summary_reflects_window_and_estimate() {
        let mut session = SearchSession::new(model());
        assert_eq!(page_summary(&session), None);

        let ticket = session.search(model());
        let page: Vec<CommentSummary> = comments(0..10);
        session.on_response(ticket, ResultPage::new(page));

        let summary = page_summary(&session).unwrap();
        assert_eq!((summary.from, summary.to, summary.total), (1, 10, 10));
        assert!(summary.approximate);
        assert_eq!(summary.to_string(), "showing 1-10 of ~10");
    }

    #[test]
    fn page_summary_exact_once_last_page_arrived() {
        let mut session = SearchSession::new(model());
        let ticket = session.search(model());
        session.on_response(ticket, ResultPage::new(comments(0..4)));

        let summary = page_summary(&session).unwrap();
        assert!(!summary.approximate);
        assert_eq!(summary.to_string(), "showing 1-4 of 4");
    }

    #[test]
    fn deep_linked_page_summary_starts_at_offset() {
        let mut session = SearchSession::new(model());
        let ticket = session.restore(model().with_offset(20));
        session.on_response(ticket, ResultPage::new(comments(20..30)));

        let summary = page_summary(&session).unwrap();
        assert_eq!((summary.from, summary.to), (21, 30));
    }

    #[test]
    fn empty_state_distinguishes_filtered_from_unfiltered() {
        let mut filtered = model();
        filtered.set_facet("position", "oppose");
        let mut session: SearchSession<CommentSummary> = SearchSession::new(filtered.clone());
        let ticket = session.search(filtered);
        session.on_response(ticket, ResultPage::new(Vec::new()));
        assert_eq!(empty_state(&session), Some(EmptyState::NoMatches));

        let mut session: SearchSession<CommentSummary> = SearchSession::new(model());
        let ticket = session.search(model());
        session.on_response(ticket, ResultPage::new(Vec::new()));
        assert_eq!(empty_state(&session), Some(EmptyState::NothingYet));
    }

    #[test]
    fn empty_state_suppressed_while_loading_or_errored() {
        let mut session: SearchSession<CommentSummary> = SearchSession::new(model());
        let ticket = session.search(model());
        assert_eq!(empty_state(&session), None); // loading

        session.on_error(ticket, "down");
        assert_eq!(empty_state(&session), None); // error banner instead
    }
}

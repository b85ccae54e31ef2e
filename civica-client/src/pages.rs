//! Page controllers: one per query surface.
//!
//! A controller owns the session, the address synchronizer, the debouncer
//! and a gateway handle, and is driven by a single mpsc event loop. Fetches
//! run as spawned tasks that report back over the same channel, tagged with
//! their ticket; the session decides whether the response still matters.
//! Dropping the controller drops the channel sender side it hands out, the
//! pending debounce entry, and with them every way a late response could
//! touch a dead page.

use crate::api_client::{CommentGateway, DocketGateway, SiteGateway};
use crate::config::ClientConfig;
use crate::error::ClientError;
use civica_core::SortKey;
use civica_session::derive::{without, ChipField};
use civica_session::{
    AddressBar, AddressSync, DebouncedInput, FetchTicket, FilterModel, GatewayError,
    QueryGateway, QueryPayload, ResultPage, SearchSession, SurfaceSchema, COMMENT_SEARCH,
    DOCKET_BROWSE, SITE_SEARCH,
};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;

/// Everything that can happen to a page.
#[derive(Debug)]
pub enum PageEvent<R> {
    /// A keystroke in the free-text input.
    Edited(String),
    /// Explicit search submission.
    Submit,
    /// A discrete facet control changed.
    FacetSet { key: String, value: String },
    FacetCleared(String),
    SortChanged(SortKey),
    /// Removal action of an active-filter chip.
    ChipRemoved(ChipField),
    /// The "clear all filters" affordance.
    FiltersCleared,
    LoadMore,
    /// The "try again" affordance on the error banner.
    Retry,
    /// The location changed; may be the echo of our own write.
    Navigated(String),
    /// Event-loop tick; drives the debouncer.
    Tick,
    /// Stop the event loop. Needed because the controller keeps a sender
    /// for fetch tasks, so the channel never closes on its own.
    Shutdown,
    /// A spawned fetch completed.
    Fetched {
        ticket: FetchTicket,
        outcome: Result<ResultPage<R>, GatewayError>,
    },
}

pub struct PageController<G: QueryGateway + 'static, B: AddressBar> {
    session: SearchSession<G::Record>,
    sync: AddressSync<B>,
    debounce: DebouncedInput,
    gateway: Arc<G>,
    events: mpsc::Sender<PageEvent<G::Record>>,
}

impl<G: QueryGateway + 'static, B: AddressBar> PageController<G, B> {
    pub fn new(
        schema: &'static SurfaceSchema,
        gateway: Arc<G>,
        bar: B,
        quiet: Duration,
        events: mpsc::Sender<PageEvent<G::Record>>,
    ) -> Self {
        Self {
            session: SearchSession::new(FilterModel::new(schema)),
            sync: AddressSync::new(schema, bar),
            debounce: DebouncedInput::new(quiet),
            gateway,
            events,
        }
    }

    /// Dispatch the initial fetch for whatever the location already says.
    /// A deep-linked offset is honored as-is.
    pub fn start(&mut self) {
        let model = self.sync.current();
        let ticket = self.session.restore(model);
        self.dispatch(ticket);
    }

    pub fn session(&self) -> &SearchSession<G::Record> {
        &self.session
    }

    pub fn sync(&self) -> &AddressSync<B> {
        &self.sync
    }

    pub fn handle_event(&mut self, event: PageEvent<G::Record>, now: Instant) {
        match event {
            PageEvent::Edited(text) => self.debounce.note_edit(text, now),
            PageEvent::Tick => {
                if let Some(text) = self.debounce.take_if_elapsed(now) {
                    self.apply_query(&text);
                }
            }
            PageEvent::Submit => match self.debounce.cancel() {
                Some(text) => self.apply_query(&text),
                None => self.apply_search(self.session.filters().clone()),
            },
            PageEvent::FacetSet { key, value } => {
                let mut model = self.model_with_pending_text();
                model.set_facet(&key, &value);
                self.apply_search(model);
            }
            PageEvent::FacetCleared(key) => {
                let mut model = self.model_with_pending_text();
                model.clear_facet(&key);
                self.apply_search(model);
            }
            PageEvent::SortChanged(sort) => {
                let mut model = self.model_with_pending_text();
                model.set_sort(sort);
                self.apply_search(model);
            }
            PageEvent::ChipRemoved(field) => {
                self.debounce.cancel();
                let model = without(self.session.filters(), field);
                self.session.reset();
                self.sync.publish(&model);
                let ticket = self.session.search(model);
                self.dispatch(ticket);
            }
            PageEvent::FiltersCleared => {
                self.debounce.cancel();
                let model = FilterModel::new(self.session.filters().schema());
                self.session.reset();
                self.sync.publish(&model);
                let ticket = self.session.search(model);
                self.dispatch(ticket);
            }
            PageEvent::LoadMore => {
                self.debounce.cancel();
                if let Some(ticket) = self.session.load_more() {
                    self.dispatch(ticket);
                }
            }
            PageEvent::Retry => {
                let ticket = self.session.restore(self.session.filters().clone());
                self.dispatch(ticket);
            }
            PageEvent::Navigated(query) => {
                if let Some(model) = self.sync.on_navigation(&query) {
                    let ticket = self.session.restore(model);
                    self.dispatch(ticket);
                }
            }
            PageEvent::Fetched { ticket, outcome } => match outcome {
                Ok(page) => self.session.on_response(ticket, page),
                Err(err) => self.session.on_error(ticket, err.to_string()),
            },
            // Meaningful only to the event loop.
            PageEvent::Shutdown => {}
        }
    }

    /// Drive the page until [`PageEvent::Shutdown`] arrives or every
    /// external sender is dropped.
    pub async fn run(mut self, mut events: mpsc::Receiver<PageEvent<G::Record>>, tick: Duration) {
        let mut ticker = tokio::time::interval(tick);
        loop {
            tokio::select! {
                _ = ticker.tick() => self.handle_event(PageEvent::Tick, Instant::now()),
                event = events.recv() => match event {
                    Some(PageEvent::Shutdown) | None => break,
                    Some(event) => self.handle_event(event, Instant::now()),
                },
            }
        }
    }

    fn apply_query(&mut self, text: &str) {
        let mut model = self.session.filters().clone();
        model.set_query(text);
        self.apply_search(model);
    }

    fn apply_search(&mut self, mut model: FilterModel) {
        model.set_offset(0);
        self.sync.publish(&model);
        let ticket = self.session.search(model);
        self.dispatch(ticket);
    }

    /// Current filters with any half-typed query text folded in, so a
    /// discrete control change does not drop what the user was typing.
    fn model_with_pending_text(&mut self) -> FilterModel {
        let mut model = self.session.filters().clone();
        if let Some(text) = self.debounce.cancel() {
            model.set_query(&text);
        }
        model
    }

    fn dispatch(&self, ticket: FetchTicket) {
        let payload = QueryPayload::new(self.session.filters(), ticket);
        let gateway = Arc::clone(&self.gateway);
        let events = self.events.clone();
        tokio::spawn(async move {
            let outcome = gateway.fetch(payload).await;
            // The page may have been torn down; a closed channel is fine.
            let _ = events.send(PageEvent::Fetched { ticket, outcome }).await;
        });
    }
}

impl<B: AddressBar> PageController<DocketGateway, B> {
    pub fn docket_browse(
        config: &ClientConfig,
        bar: B,
        events: mpsc::Sender<PageEvent<civica_core::DocketSummary>>,
    ) -> Result<Self, ClientError> {
        Ok(Self::new(
            &DOCKET_BROWSE,
            Arc::new(DocketGateway::new(config)?),
            bar,
            Duration::from_millis(config.debounce_quiet_ms),
            events,
        ))
    }
}

impl<B: AddressBar> PageController<CommentGateway, B> {
    pub fn comment_search(
        config: &ClientConfig,
        bar: B,
        events: mpsc::Sender<PageEvent<civica_core::CommentSummary>>,
    ) -> Result<Self, ClientError> {
        Ok(Self::new(
            &COMMENT_SEARCH,
            Arc::new(CommentGateway::new(config)?),
            bar,
            Duration::from_millis(config.debounce_quiet_ms),
            events,
        ))
    }
}

impl<B: AddressBar> PageController<SiteGateway, B> {
    pub fn site_search(
        config: &ClientConfig,
        bar: B,
        events: mpsc::Sender<PageEvent<civica_core::SiteHit>>,
    ) -> Result<Self, ClientError> {
        Ok(Self::new(
            &SITE_SEARCH,
            Arc::new(SiteGateway::new(config)?),
            bar,
            Duration::from_millis(config.debounce_quiet_ms),
            events,
        ))
    }
}

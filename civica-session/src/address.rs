//! Keeping the addressable location and the filter model consistent.
//!
//! The location behaves like mutable state shared with browser history, so
//! it is treated strictly as two one-way channels: outbound "intent"
//! writes, and inbound "navigation" events. An outbound write records the
//! exact string it wrote and suppresses the single echo notification it
//! causes, which is what prevents the write → notify → parse → dispatch →
//! write feedback loop.

use crate::facet::SurfaceSchema;
use crate::filter::{parse_query_string, to_query_string, FilterModel};

/// The browser's addressable location, reduced to its query string.
///
/// Implementations wrap whatever host environment the controller is
/// embedded in; [`InMemoryAddressBar`] serves tests and headless use.
pub trait AddressBar {
    /// Current query string (no leading `?`).
    fn read(&self) -> String;

    /// Rewrite the query string. This is the outbound path; it must not be
    /// reported back through [`AddressSync::on_navigation`] by the caller
    /// wiring (and if it is, the synchronizer suppresses it).
    fn write(&mut self, query: &str);
}

/// In-memory address bar with a back/forward history, for tests and
/// embedding without a real browser.
#[derive(Debug)]
pub struct InMemoryAddressBar {
    /// Never empty: `position` always indexes a valid entry.
    history: Vec<String>,
    position: usize,
}

impl Default for InMemoryAddressBar {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryAddressBar {
    pub fn new() -> Self {
        Self {
            history: vec![String::new()],
            position: 0,
        }
    }

    /// Navigate back, returning the restored query string.
    pub fn back(&mut self) -> Option<String> {
        if self.position == 0 {
            return None;
        }
        self.position -= 1;
        Some(self.history[self.position].clone())
    }

    /// Navigate forward, returning the restored query string.
    pub fn forward(&mut self) -> Option<String> {
        if self.position + 1 >= self.history.len() {
            return None;
        }
        self.position += 1;
        Some(self.history[self.position].clone())
    }
}

impl AddressBar for InMemoryAddressBar {
    fn read(&self) -> String {
        self.history[self.position].clone()
    }

    fn write(&mut self, query: &str) {
        // A write creates a new history entry, dropping any forward stack.
        self.history.truncate(self.position + 1);
        self.history.push(query.to_string());
        self.position += 1;
    }
}

/// Bidirectional mapping between the filter model and the location.
#[derive(Debug)]
pub struct AddressSync<B: AddressBar> {
    bar: B,
    schema: &'static SurfaceSchema,
    last_written: Option<String>,
}

impl<B: AddressBar> AddressSync<B> {
    pub fn new(schema: &'static SurfaceSchema, bar: B) -> Self {
        Self {
            bar,
            schema,
            last_written: None,
        }
    }

    pub fn bar(&self) -> &B {
        &self.bar
    }

    pub fn bar_mut(&mut self) -> &mut B {
        &mut self.bar
    }

    /// Outbound: rewrite the location to reflect a user-driven filter
    /// change.
    pub fn publish(&mut self, model: &FilterModel) {
        let query = to_query_string(model);
        if self.bar.read() == query {
            return;
        }
        self.last_written = Some(query.clone());
        self.bar.write(&query);
    }

    /// Inbound: a location change was observed. Returns the parsed filter
    /// model for externally-initiated navigation, or `None` when the
    /// change is the echo of this synchronizer's own last write.
    ///
    /// Malformed query strings degrade to defaults inside `parse`; a bad
    /// link never produces an error here.
    pub fn on_navigation(&mut self, query: &str) -> Option<FilterModel> {
        if self.last_written.take().is_some_and(|written| written == query) {
            return None;
        }
        Some(parse_query_string(self.schema, query))
    }

    /// Parse the location as it stands, for initial page load.
    pub fn current(&self) -> FilterModel {
        parse_query_string(self.schema, &self.bar.read())
    }
}

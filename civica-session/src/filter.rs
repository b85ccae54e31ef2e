//! The filter model: one validated search/browse intent.
//!
//! `parse` is total. Malformed or out-of-range location values fall back to
//! defaults (or are dropped), never error; a shared link with a mangled
//! query string still lands on a usable page. `serialize` omits every field
//! equal to its default so the location string stays minimal and shareable.
//!
//! Round-trip law: `parse(&serialize(&f)) == f` for any `f` built through
//! this API.

use crate::facet::{SurfaceSchema, MAX_LIMIT, MAX_QUERY_LEN};
use civica_core::SortKey;
use std::str::FromStr;

/// Canonical, validated representation of one search/browse intent.
///
/// Facet values only enter through [`FilterModel::set_facet`] or
/// [`parse`], both of which run the surface schema's normalization, so a
/// constructed model never holds an out-of-domain value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterModel {
    schema: &'static SurfaceSchema,
    query: Option<String>,
    /// Pairs in schema declaration order.
    facets: Vec<(&'static str, String)>,
    sort: SortKey,
    limit: u32,
    offset: u32,
}

impl FilterModel {
    pub fn new(schema: &'static SurfaceSchema) -> Self {
        Self {
            schema,
            query: None,
            facets: Vec::new(),
            sort: schema.default_sort,
            limit: schema.default_limit,
            offset: 0,
        }
    }

    pub fn schema(&self) -> &'static SurfaceSchema {
        self.schema
    }

    pub fn query(&self) -> Option<&str> {
        self.query.as_deref()
    }

    pub fn facet(&self, key: &str) -> Option<&str> {
        self.facets
            .iter()
            .find(|(k, _)| *k == key)
            .map(|(_, v)| v.as_str())
    }

    pub fn facets(&self) -> impl Iterator<Item = (&'static str, &str)> {
        self.facets.iter().map(|(k, v)| (*k, v.as_str()))
    }

    pub fn sort(&self) -> SortKey {
        self.sort
    }

    pub fn limit(&self) -> u32 {
        self.limit
    }

    pub fn offset(&self) -> u32 {
        self.offset
    }

    /// Set the free-text query: trimmed, truncated to [`MAX_QUERY_LEN`]
    /// characters, blank treated as no query.
    pub fn set_query(&mut self, raw: &str) {
        let truncated: String = raw.trim().chars().take(MAX_QUERY_LEN).collect();
        // Truncation can expose new trailing whitespace; re-trim so the
        // stored value is a fixed point of parse.
        let truncated = truncated.trim_end();
        if truncated.is_empty() {
            self.query = None;
        } else {
            self.query = Some(truncated.to_string());
        }
    }

    pub fn clear_query(&mut self) {
        self.query = None;
    }

    /// Set a facet value. Returns `false` (leaving the facet absent) when
    /// the key is not declared by the surface or the value is outside the
    /// facet's domain.
    pub fn set_facet(&mut self, key: &str, raw: &str) -> bool {
        let Some(def) = self.schema.facet(key) else {
            return false;
        };
        let Some(value) = def.kind.normalize(raw) else {
            self.remove_facet(def.key);
            return false;
        };
        if let Some(slot) = self.facets.iter_mut().find(|(k, _)| *k == def.key) {
            slot.1 = value;
        } else {
            self.facets.push((def.key, value));
            self.sort_facets_by_schema_order();
        }
        true
    }

    pub fn clear_facet(&mut self, key: &str) {
        self.remove_facet(key);
    }

    /// Set the sort order; sorts the surface does not allow are ignored.
    pub fn set_sort(&mut self, sort: SortKey) -> bool {
        if self.schema.allows_sort(sort) {
            self.sort = sort;
            true
        } else {
            false
        }
    }

    pub fn set_limit(&mut self, limit: u32) {
        self.limit = limit.clamp(1, MAX_LIMIT);
    }

    pub fn set_offset(&mut self, offset: u32) {
        self.offset = offset;
    }

    pub fn with_offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Whether any user-facing filter (query or facet) is set. Sort, limit
    /// and offset are presentation knobs, not filters.
    pub fn has_active_filters(&self) -> bool {
        self.query.is_some() || !self.facets.is_empty()
    }

    fn remove_facet(&mut self, key: &str) {
        self.facets.retain(|(k, _)| *k != key);
    }

    fn sort_facets_by_schema_order(&mut self) {
        let order = |key: &str| {
            self.schema
                .facets
                .iter()
                .position(|def| def.key == key)
                .unwrap_or(usize::MAX)
        };
        self.facets.sort_by_key(|(k, _)| order(k));
    }
}

/// Parse location parameters into a filter model. Total: every malformed
/// field degrades to its default.
pub fn parse(schema: &'static SurfaceSchema, pairs: &[(String, String)]) -> FilterModel {
    let mut model = FilterModel::new(schema);
    for (key, value) in pairs {
        match key.as_str() {
            "q" => model.set_query(value),
            "sort" => {
                if let Ok(sort) = SortKey::from_str(value.trim()) {
                    model.set_sort(sort);
                }
            }
            "limit" => {
                if let Ok(limit) = value.trim().parse::<i64>() {
                    model.set_limit(limit.clamp(1, MAX_LIMIT as i64) as u32);
                }
            }
            "offset" => {
                if let Ok(offset) = value.trim().parse::<i64>() {
                    model.set_offset(offset.clamp(0, u32::MAX as i64) as u32);
                }
            }
            facet_key => {
                // First occurrence wins; later duplicates are ignored.
                if model.facet(facet_key).is_none() {
                    model.set_facet(facet_key, value);
                }
            }
        }
    }
    model
}

/// Serialize a filter model to location parameters, omitting defaults.
pub fn serialize(model: &FilterModel) -> Vec<(String, String)> {
    let mut pairs = Vec::new();
    if let Some(query) = model.query() {
        pairs.push(("q".to_string(), query.to_string()));
    }
    for (key, value) in model.facets() {
        pairs.push((key.to_string(), value.to_string()));
    }
    if model.sort() != model.schema().default_sort {
        pairs.push(("sort".to_string(), model.sort().as_str().to_string()));
    }
    if model.limit() != model.schema().default_limit {
        pairs.push(("limit".to_string(), model.limit().to_string()));
    }
    if model.offset() != 0 {
        pairs.push(("offset".to_string(), model.offset().to_string()));
    }
    pairs
}

/// Parse a raw percent-encoded query string (no leading `?`).
pub fn parse_query_string(schema: &'static SurfaceSchema, raw: &str) -> FilterModel {
    let pairs: Vec<(String, String)> = url::form_urlencoded::parse(raw.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    parse(schema, &pairs)
}

/// Serialize to a percent-encoded query string (no leading `?`).
pub fn to_query_string(model: &FilterModel) -> String {
    let mut out = url::form_urlencoded::Serializer::new(String::new());
    for (key, value) in serialize(model) {
        out.append_pair(&key, &value);
    }
    out.finish()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::{COMMENT_SEARCH, DOCKET_BROWSE, SITE_SEARCH};

    fn pairs(raw: &[(&str, &str)]) -> Vec<(String, String)> {
        raw.iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn new_model_is_all_defaults() {
        let model = FilterModel::new(&DOCKET_BROWSE);
        assert_eq!(model.query(), None);
        assert_eq!(model.facets().count(), 0);
        assert_eq!(model.sort(), SortKey::Newest);
        assert_eq!(model.limit(), 20);
        assert_eq!(model.offset(), 0);
        assert!(!model.has_active_filters());
        assert!(serialize(&model).is_empty());
    }

    #[test]
    fn parse_reads_every_recognized_key() {
        let model = parse(
            &COMMENT_SEARCH,
            &pairs(&[
                ("q", "wetland permits"),
                ("agency", "EPA"),
                ("state", "ca"),
                ("position", "oppose"),
                ("sort", "oldest"),
                ("limit", "25"),
                ("offset", "50"),
            ]),
        );
        assert_eq!(model.query(), Some("wetland permits"));
        assert_eq!(model.facet("agency"), Some("EPA"));
        assert_eq!(model.facet("state"), Some("CA"));
        assert_eq!(model.facet("position"), Some("oppose"));
        assert_eq!(model.sort(), SortKey::Oldest);
        assert_eq!(model.limit(), 25);
        assert_eq!(model.offset(), 50);
    }

    #[test]
    fn parse_clamps_limit_and_offset() {
        let model = parse(
            &DOCKET_BROWSE,
            &pairs(&[("limit", "999"), ("offset", "-5")]),
        );
        assert_eq!(model.limit(), MAX_LIMIT);
        assert_eq!(model.offset(), 0);
    }

    #[test]
    fn parse_drops_malformed_values_silently() {
        let model = parse(
            &COMMENT_SEARCH,
            &pairs(&[
                ("q", "   "),
                ("state", "California"),
                ("date_from", "last tuesday"),
                ("comment_id", "<script>"),
                ("sort", "bestest"),
                ("limit", "lots"),
                ("unknown_key", "whatever"),
            ]),
        );
        assert_eq!(model, FilterModel::new(&COMMENT_SEARCH));
    }

    #[test]
    fn parse_honors_first_duplicate_only() {
        let model = parse(
            &DOCKET_BROWSE,
            &pairs(&[("status", "open"), ("status", "closed")]),
        );
        assert_eq!(model.facet("status"), Some("open"));
    }

    #[test]
    fn invalid_comment_id_is_absent_not_forwarded() {
        let model = parse(&COMMENT_SEARCH, &pairs(&[("comment_id", "not/an/id")]));
        assert_eq!(model.facet("comment_id"), None);
        assert!(!model.has_active_filters());
    }

    #[test]
    fn query_is_trimmed_and_truncated() {
        let mut model = FilterModel::new(&SITE_SEARCH);
        model.set_query(&format!("  {}  ", "x".repeat(MAX_QUERY_LEN + 100)));
        assert_eq!(model.query().map(|q| q.chars().count()), Some(MAX_QUERY_LEN));
        model.set_query("   ");
        assert_eq!(model.query(), None);
    }

    #[test]
    fn set_sort_rejects_undeclared_sorts() {
        let mut model = FilterModel::new(&DOCKET_BROWSE);
        assert!(!model.set_sort(SortKey::Relevance));
        assert_eq!(model.sort(), SortKey::Newest);
        assert!(model.set_sort(SortKey::ClosingSoon));
        assert_eq!(model.sort(), SortKey::ClosingSoon);
    }

    #[test]
    fn facets_keep_schema_declaration_order() {
        let mut model = FilterModel::new(&DOCKET_BROWSE);
        model.set_facet("date_from", "2024-01-01");
        model.set_facet("agency", "EPA");
        model.set_facet("status", "open");
        let keys: Vec<_> = model.facets().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["agency", "status", "date_from"]);
    }

    #[test]
    fn set_facet_with_invalid_value_clears_previous() {
        let mut model = FilterModel::new(&DOCKET_BROWSE);
        assert!(model.set_facet("state", "WA"));
        assert!(!model.set_facet("state", "Washington"));
        assert_eq!(model.facet("state"), None);
    }

    #[test]
    fn serialize_omits_defaults_and_round_trips() {
        let mut model = FilterModel::new(&COMMENT_SEARCH);
        model.set_query("noise ordinance");
        model.set_facet("docket_id", "DOT-2023-0011");
        model.set_sort(SortKey::Relevance);
        model.set_offset(30);

        let pairs = serialize(&model);
        assert_eq!(
            pairs,
            vec![
                ("q".to_string(), "noise ordinance".to_string()),
                ("docket_id".to_string(), "DOT-2023-0011".to_string()),
                ("sort".to_string(), "relevance".to_string()),
                ("offset".to_string(), "30".to_string()),
            ]
        );
        assert_eq!(parse(&COMMENT_SEARCH, &pairs), model);
    }

    #[test]
    fn query_string_round_trips_with_percent_encoding() {
        let mut model = FilterModel::new(&SITE_SEARCH);
        model.set_query("clean water & air");
        let qs = to_query_string(&model);
        assert_eq!(qs, "q=clean+water+%26+air");
        assert_eq!(parse_query_string(&SITE_SEARCH, &qs), model);
    }

    #[test]
    fn garbage_query_string_degrades_to_defaults() {
        let model = parse_query_string(&DOCKET_BROWSE, "%%%===&&&;;;");
        assert_eq!(model, FilterModel::new(&DOCKET_BROWSE));
    }
}

#[cfg(test)]
mod prop_tests {
    use super::*;
    use crate::facet::{COMMENT_SEARCH, DOCKET_BROWSE, SITE_SEARCH};
    use proptest::prelude::*;

    fn arb_schema() -> impl Strategy<Value = &'static SurfaceSchema> {
        prop_oneof![
            Just(&DOCKET_BROWSE),
            Just(&COMMENT_SEARCH),
            Just(&SITE_SEARCH),
        ]
    }

    /// Build a valid model by driving the public mutators with arbitrary
    /// raw input; whatever survives normalization is by construction valid.
    fn arb_model() -> impl Strategy<Value = FilterModel> {
        (
            arb_schema(),
            proptest::option::of("[ -~]{0,80}"),
            prop::collection::vec(("[a-z_]{1,16}", "[ -~]{0,40}"), 0..6),
            0u8..6,
            1u32..200,
            0u32..500,
        )
            .prop_map(|(schema, query, raw_facets, sort_idx, limit, offset)| {
                let mut model = FilterModel::new(schema);
                if let Some(q) = query {
                    model.set_query(&q);
                }
                for (key, value) in raw_facets {
                    model.set_facet(&key, &value);
                }
                let sorts = schema.sorts;
                model.set_sort(sorts[sort_idx as usize % sorts.len()]);
                model.set_limit(limit);
                model.set_offset(offset);
                model
            })
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(256))]

        /// Round-trip law: parse(serialize(f)) == f for any valid model.
        #[test]
        fn prop_parse_serialize_round_trip(model in arb_model()) {
            let pairs = serialize(&model);
            prop_assert_eq!(parse(model.schema(), &pairs), model);
        }

        /// Same law through full percent-encoded query strings.
        #[test]
        fn prop_query_string_round_trip(model in arb_model()) {
            let qs = to_query_string(&model);
            prop_assert_eq!(parse_query_string(model.schema(), &qs), model);
        }

        /// parse is total: arbitrary pairs never panic and always yield a
        /// clamped, in-domain model.
        #[test]
        fn prop_parse_never_panics_and_clamps(
            schema in arb_schema(),
            raw in prop::collection::vec(("[ -~]{0,24}", "[ -~]{0,64}"), 0..12),
        ) {
            let model = parse(schema, &raw);
            prop_assert!(model.limit() >= 1 && model.limit() <= MAX_LIMIT);
            prop_assert!(schema.allows_sort(model.sort()));
            if let Some(q) = model.query() {
                prop_assert!(q.chars().count() <= MAX_QUERY_LEN);
                prop_assert_eq!(q, q.trim());
            }
            for (key, _) in model.facets() {
                prop_assert!(schema.facet(key).is_some());
            }
        }

        /// Serialization never emits a pair for a default field.
        #[test]
        fn prop_serialize_is_minimal(model in arb_model()) {
            let pairs = serialize(&model);
            for (key, _) in &pairs {
                match key.as_str() {
                    "sort" => prop_assert!(model.sort() != model.schema().default_sort),
                    "limit" => prop_assert!(model.limit() != model.schema().default_limit),
                    "offset" => prop_assert!(model.offset() != 0),
                    "q" => prop_assert!(model.query().is_some()),
                    facet => prop_assert!(model.facet(facet).is_some()),
                }
            }
        }
    }
}

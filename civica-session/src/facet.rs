//! Declarative facet schemas for the three query surfaces.
//!
//! Every structured filter dimension is declared once (key, kind, allowed
//! domain) and consumed uniformly by `filter::parse` and
//! `filter::serialize`. There is no per-field validation code anywhere
//! else; adding a facet to a surface means adding one entry to its table.

use chrono::NaiveDate;
use civica_core::{is_record_id, SortKey, US_STATES};
use once_cell::sync::Lazy;
use regex::Regex;

/// Hard ceiling on the page size any surface may request.
pub const MAX_LIMIT: u32 = 50;

/// Free-text queries are truncated to this many characters.
pub const MAX_QUERY_LEN: usize = 500;

/// Upper bound on tags carried by a single tag-set facet value.
pub const MAX_TAGS: usize = 10;

static TAG_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[a-z0-9][a-z0-9-]{0,39}$").expect("valid regex"));

/// The validated domain of one facet.
#[derive(Debug, Clone, Copy)]
pub enum FacetKind {
    /// Case-insensitive membership in a fixed allow-list; stored in the
    /// list's canonical casing.
    Enum(&'static [&'static str]),
    /// `YYYY-MM-DD`.
    Date,
    /// Agency-prefixed record identifier (docket or comment).
    Identifier,
    /// Free-form text up to `max_len` characters.
    Text { max_len: usize },
    /// Comma-separated set of lowercase tags, deduplicated, order kept.
    Tags,
}

impl FacetKind {
    /// Normalize a raw value into its canonical stored form.
    ///
    /// Returns `None` for anything outside the facet's domain; the caller
    /// treats that as "value absent", never as an error.
    pub fn normalize(&self, raw: &str) -> Option<String> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        match self {
            FacetKind::Enum(allowed) => allowed
                .iter()
                .find(|v| v.eq_ignore_ascii_case(trimmed))
                .map(|v| (*v).to_string()),
            FacetKind::Date => NaiveDate::parse_from_str(trimmed, "%Y-%m-%d")
                .ok()
                .map(|d| d.format("%Y-%m-%d").to_string()),
            FacetKind::Identifier => is_record_id(trimmed).then(|| trimmed.to_string()),
            FacetKind::Text { max_len } => {
                (trimmed.chars().count() <= *max_len).then(|| trimmed.to_string())
            }
            FacetKind::Tags => {
                let mut tags: Vec<String> = Vec::new();
                for part in trimmed.split(',') {
                    let tag = part.trim().to_ascii_lowercase();
                    if tag.is_empty() {
                        continue;
                    }
                    if !TAG_RE.is_match(&tag) {
                        return None;
                    }
                    if !tags.contains(&tag) {
                        tags.push(tag);
                    }
                }
                tags.truncate(MAX_TAGS);
                if tags.is_empty() {
                    None
                } else {
                    Some(tags.join(","))
                }
            }
        }
    }
}

/// One structured filter dimension of a surface.
#[derive(Debug, Clone, Copy)]
pub struct FacetDef {
    pub key: &'static str,
    pub kind: FacetKind,
}

/// Everything one query surface declares: its facets, its allowed sort
/// orders, and its defaults.
#[derive(Debug)]
pub struct SurfaceSchema {
    pub name: &'static str,
    pub facets: &'static [FacetDef],
    pub sorts: &'static [SortKey],
    pub default_sort: SortKey,
    pub default_limit: u32,
}

impl SurfaceSchema {
    pub fn facet(&self, key: &str) -> Option<&FacetDef> {
        self.facets.iter().find(|def| def.key == key)
    }

    pub fn allows_sort(&self, sort: SortKey) -> bool {
        self.sorts.contains(&sort)
    }
}

impl PartialEq for SurfaceSchema {
    fn eq(&self, other: &Self) -> bool {
        std::ptr::eq(self, other) || self.name == other.name
    }
}

impl Eq for SurfaceSchema {}

const STATUS_VALUES: &[&str] = &["open", "closed", "upcoming"];
const COMMENTER_TYPE_VALUES: &[&str] = &["individual", "organization", "agency"];
const POSITION_VALUES: &[&str] = &["support", "oppose", "neutral"];
const SITE_KIND_VALUES: &[&str] = &["docket", "comment", "page"];

/// Browse open comment periods.
pub static DOCKET_BROWSE: SurfaceSchema = SurfaceSchema {
    name: "docket-browse",
    facets: &[
        FacetDef {
            key: "agency",
            kind: FacetKind::Text { max_len: 120 },
        },
        FacetDef {
            key: "state",
            kind: FacetKind::Enum(US_STATES),
        },
        FacetDef {
            key: "status",
            kind: FacetKind::Enum(STATUS_VALUES),
        },
        FacetDef {
            key: "tags",
            kind: FacetKind::Tags,
        },
        FacetDef {
            key: "date_from",
            kind: FacetKind::Date,
        },
        FacetDef {
            key: "date_to",
            kind: FacetKind::Date,
        },
    ],
    sorts: &[
        SortKey::Newest,
        SortKey::Oldest,
        SortKey::ClosingSoon,
        SortKey::NameAsc,
        SortKey::NameDesc,
    ],
    default_sort: SortKey::Newest,
    default_limit: 20,
};

/// Search submitted comments.
pub static COMMENT_SEARCH: SurfaceSchema = SurfaceSchema {
    name: "comment-search",
    facets: &[
        FacetDef {
            key: "agency",
            kind: FacetKind::Text { max_len: 120 },
        },
        FacetDef {
            key: "state",
            kind: FacetKind::Enum(US_STATES),
        },
        FacetDef {
            key: "commenter_type",
            kind: FacetKind::Enum(COMMENTER_TYPE_VALUES),
        },
        FacetDef {
            key: "position",
            kind: FacetKind::Enum(POSITION_VALUES),
        },
        FacetDef {
            key: "docket_id",
            kind: FacetKind::Identifier,
        },
        FacetDef {
            key: "comment_id",
            kind: FacetKind::Identifier,
        },
        FacetDef {
            key: "date_from",
            kind: FacetKind::Date,
        },
        FacetDef {
            key: "date_to",
            kind: FacetKind::Date,
        },
    ],
    sorts: &[SortKey::Newest, SortKey::Oldest, SortKey::Relevance],
    default_sort: SortKey::Newest,
    default_limit: 10,
};

/// Generic site-wide search results.
pub static SITE_SEARCH: SurfaceSchema = SurfaceSchema {
    name: "site-search",
    facets: &[FacetDef {
        key: "kind",
        kind: FacetKind::Enum(SITE_KIND_VALUES),
    }],
    sorts: &[SortKey::Newest, SortKey::Oldest, SortKey::Relevance],
    default_sort: SortKey::Newest,
    default_limit: 20,
};

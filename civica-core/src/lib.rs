//! Civica Core - Domain Types
//!
//! Pure data structures shared by the session controller and the HTTP
//! client: record identifiers, result-record shapes, and the enumerated
//! vocabularies (status, commenter type, position, sort keys). No behavior
//! beyond construction and shape validation lives here.

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

pub mod error;

pub use error::ValidationError;

// ============================================================================
// IDENTIFIERS
// ============================================================================

/// Maximum length of a docket or comment identifier.
pub const MAX_RECORD_ID_LEN: usize = 64;

/// Record identifiers carry an agency prefix followed by one or more
/// hyphen-separated segments, e.g. `EPA-2024-0412` or `DOT-2023-0011-4502`.
static RECORD_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[A-Za-z0-9_]+(?:-[A-Za-z0-9_]+)+$").expect("valid regex"));

/// Whether a string has the agency-prefixed record-identifier shape.
pub fn is_record_id(raw: &str) -> bool {
    !raw.is_empty() && raw.len() <= MAX_RECORD_ID_LEN && RECORD_ID_RE.is_match(raw)
}

macro_rules! record_id {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(try_from = "String", into = "String")]
        pub struct $name(String);

        impl $name {
            /// Parse an identifier, rejecting anything outside the
            /// agency-prefixed shape.
            pub fn parse(raw: &str) -> Result<Self, ValidationError> {
                if is_record_id(raw) {
                    Ok(Self(raw.to_string()))
                } else {
                    Err(ValidationError::InvalidIdentifier {
                        value: raw.to_string(),
                    })
                }
            }

            pub fn as_str(&self) -> &str {
                &self.0
            }
        }

        impl TryFrom<String> for $name {
            type Error = ValidationError;

            fn try_from(raw: String) -> Result<Self, Self::Error> {
                Self::parse(&raw)
            }
        }

        impl From<$name> for String {
            fn from(id: $name) -> String {
                id.0
            }
        }

        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                Self::parse(raw)
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

record_id! {
    /// Identifier of a comment period (docket), e.g. `EPA-2024-0412`.
    DocketId
}

record_id! {
    /// Identifier of a submitted comment, e.g. `EPA-2024-0412-0087`.
    CommentId
}

// ============================================================================
// ENUMS
// ============================================================================

/// Lifecycle status of a comment period.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocketStatus {
    /// Accepting comments now
    Open,
    /// Comment window has ended
    Closed,
    /// Announced but not yet accepting comments
    Upcoming,
}

/// Who submitted a comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CommenterType {
    Individual,
    Organization,
    Agency,
}

/// Declared stance of a comment toward the proposal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Position {
    Support,
    Oppose,
    Neutral,
}

/// Result ordering. Each query surface allows a subset of these.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum SortKey {
    Newest,
    Oldest,
    ClosingSoon,
    Relevance,
    NameAsc,
    NameDesc,
}

macro_rules! string_enum {
    ($name:ident { $($variant:ident => $text:literal),+ $(,)? }) => {
        impl FromStr for $name {
            type Err = ValidationError;

            fn from_str(raw: &str) -> Result<Self, Self::Err> {
                match raw {
                    $($text => Ok(Self::$variant),)+
                    _ => Err(ValidationError::InvalidValue {
                        field: stringify!($name),
                        value: raw.to_string(),
                    }),
                }
            }
        }

        impl $name {
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $text,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }
    };
}

string_enum!(DocketStatus {
    Open => "open",
    Closed => "closed",
    Upcoming => "upcoming",
});

string_enum!(CommenterType {
    Individual => "individual",
    Organization => "organization",
    Agency => "agency",
});

string_enum!(Position {
    Support => "support",
    Oppose => "oppose",
    Neutral => "neutral",
});

string_enum!(SortKey {
    Newest => "newest",
    Oldest => "oldest",
    ClosingSoon => "closing-soon",
    Relevance => "relevance",
    NameAsc => "name-asc",
    NameDesc => "name-desc",
});

/// Two-letter postal codes accepted by the state/jurisdiction facet.
pub const US_STATES: &[&str] = &[
    "AL", "AK", "AZ", "AR", "CA", "CO", "CT", "DE", "DC", "FL", "GA", "HI", "ID", "IL", "IN",
    "IA", "KS", "KY", "LA", "ME", "MD", "MA", "MI", "MN", "MS", "MO", "MT", "NE", "NV", "NH",
    "NJ", "NM", "NY", "NC", "ND", "OH", "OK", "OR", "PA", "RI", "SC", "SD", "TN", "TX", "UT",
    "VT", "VA", "WA", "WV", "WI", "WY", "AS", "GU", "MP", "PR", "VI",
];

// ============================================================================
// RESULT RECORDS
// ============================================================================

/// One docket row on the browse surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DocketSummary {
    pub id: DocketId,
    pub title: String,
    pub agency: String,
    pub status: DocketStatus,
    pub comment_count: u64,
    pub opens_on: NaiveDate,
    /// Absent for dockets with no announced closing date.
    pub closes_on: Option<NaiveDate>,
}

/// One comment row on the comment-search surface, with a highlighted snippet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommentSummary {
    pub id: CommentId,
    pub docket_id: DocketId,
    pub commenter: String,
    pub commenter_type: CommenterType,
    pub position: Option<Position>,
    pub snippet: String,
    pub posted_on: NaiveDate,
}

/// One row on the generic site-search surface.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SiteHit {
    pub id: String,
    pub kind: SiteHitKind,
    pub title: String,
    pub snippet: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SiteHitKind {
    Docket,
    Comment,
    Page,
}

string_enum!(SiteHitKind {
    Docket => "docket",
    Comment => "comment",
    Page => "page",
});

// ============================================================================
// TESTS
// ============================================================================

//! Query session controller for the Civica portal.
//!
//! Keeps one page's search/browse intent consistent across four mutable
//! surfaces: the free-text input, the structured facet filters, the
//! addressable location, and the accumulating result set fetched from the
//! remote query service.

pub mod address;
pub mod debounce;
pub mod derive;
pub mod facet;
pub mod filter;
pub mod gateway;
pub mod session;

pub use address::{AddressBar, AddressSync, InMemoryAddressBar};
pub use debounce::{DebouncedInput, DEFAULT_QUIET};
pub use facet::{FacetDef, FacetKind, SurfaceSchema, COMMENT_SEARCH, DOCKET_BROWSE, SITE_SEARCH};
pub use filter::FilterModel;
pub use gateway::{GatewayError, QueryGateway, QueryPayload, ResultPage};
pub use session::{FetchTicket, LoadMode, RecordKey, SearchSession};

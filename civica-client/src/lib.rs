//! Civica client: configuration, HTTP gateways, and page controllers.

pub mod api_client;
pub mod config;
pub mod error;
pub mod pages;
pub mod telemetry;

pub use api_client::{CommentGateway, DocketGateway, RestClient, SiteGateway};
pub use config::{ClientConfig, ConfigError};
pub use error::ClientError;
pub use pages::{PageController, PageEvent};

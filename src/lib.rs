//! An async client for the Toptranslation REST API.
//!
//! Connects to the translation-ordering service: create orders, upload and
//! attach documents, and follow quotes and invoices. Configuration is merged
//! from an INI profile, environment proxies and programmatic overrides; all
//! requests pass through one rate-limited pipeline with bounded retries for
//! transient upstream failures.
//!
//! # Example
//!
//! ```rust,no_run
//! use toptranslation_api::{Client, Orders, CreateOrder};
//!
//! # async fn run() -> Result<(), toptranslation_api::Error> {
//! let client = Client::builder("my-app/1.0").build()?;
//!
//! let order = client
//!     .create_order(CreateOrder {
//!         name: Some("Manual".to_string()),
//!         reference: Some("R-1042".to_string()),
//!         ..CreateOrder::default()
//!     })
//!     .await?;
//! println!("created {}", order["data"]["identifier"]);
//! # Ok(())
//! # }
//! ```
//!
//! The capability traits ([`Orders`], [`Documents`], [`Quotes`],
//! [`Invoices`]) must be in scope for their operations to be callable; the
//! crate root re-exports all of them.

pub mod clients;
pub mod config;
pub mod error;
pub mod resources;

pub use config::{bind_identifier, Config, ConfigBuilder, Endpoint, ENDPOINTS, VERSION};
pub use error::{ClientError, Error};
pub use resources::{
    AddDocument, Client, ClientBuilder, Content, CreateOrder, Documents, Invoices, ListOrders,
    Orders, Quotes, UpdateOrder,
};

pub use clients::{ApiError, Call, OAuthError, RateLimiter, RetryPolicy};

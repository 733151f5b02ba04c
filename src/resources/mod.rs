//! The client facade and its capability traits.
//!
//! [`Client`] is a single type composed from four capability traits —
//! [`Orders`], [`Documents`], [`Quotes`] and [`Invoices`] — that all share
//! one pipeline [`Core`]. Each operation selects a logical endpoint, merges
//! the base parameter set (carrying the access token for authenticated
//! clients) with call-specific fields, and delegates to the pipeline.
//!
//! Unset optional fields are deliberately passed through as JSON `null` in
//! request bodies rather than being stripped, preserving the caller's
//! original optionality on the wire.

mod documents;
mod invoices;
mod orders;
mod quotes;

pub use documents::{AddDocument, Documents};
pub use invoices::Invoices;
pub use orders::{CreateOrder, ListOrders, Orders, UpdateOrder};
pub use quotes::Quotes;

use std::sync::Arc;

use serde::Serialize;
use serde_json::Value;

use crate::clients::{
    Body, Call, Core, Dispatcher, Method, Params, RateLimiter, RawResponse, RetryPolicy,
    ROOT_FIELD,
};
use crate::config::{Config, Endpoint};
use crate::error::{ClientError, Error};

/// An in-order sequence of decoded items from a list operation.
pub type Content = std::vec::IntoIter<Value>;

/// How `upload_token` authenticates, selected once at construction.
#[derive(Debug, Clone)]
enum UploadTokenFlow {
    /// Anonymous token request (no access token configured).
    Anonymous,
    /// Token request carrying the configured access token in the body.
    WithToken(String),
}

/// A client for the Toptranslation API.
///
/// # Example
///
/// ```rust,no_run
/// use toptranslation_api::{Client, Orders, ListOrders};
///
/// # async fn run() -> Result<(), toptranslation_api::Error> {
/// let client = Client::builder("my-app/1.0")
///     .site("toptranslation")
///     .build()?;
///
/// for order in client.list_orders(ListOrders::default()).await? {
///     println!("{order}");
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Client {
    core: Core,
    upload_token_flow: UploadTokenFlow,
}

// Verify Client is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Client>();
};

impl Client {
    /// Creates a builder. `user_agent` identifies the calling application
    /// and must be non-empty.
    #[must_use]
    pub fn builder(user_agent: impl Into<String>) -> ClientBuilder {
        ClientBuilder::new(user_agent)
    }

    /// Returns the resolved configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        self.core.config()
    }

    pub(crate) fn core(&self) -> &Core {
        &self.core
    }

    /// Returns the base parameter set merged into every authenticated call.
    #[must_use]
    pub(crate) fn base_params(&self) -> Params {
        let mut params = Params::new();
        if let Some(token) = self.core.config().access_token() {
            params.insert(
                "access_token".to_string(),
                Value::String(token.to_string()),
            );
        }
        params
    }

    /// Performs a raw call against an absolute URL, bypassing decoding.
    pub async fn request_raw(&self, url: &str, call: &Call) -> Result<RawResponse, Error> {
        self.core.request_raw(url, call).await
    }

    /// Performs a call against an absolute URL and parses the response as
    /// JSON.
    pub async fn request_json(&self, url: &str, call: &Call) -> Result<Value, Error> {
        self.core.request_json(url, call).await
    }

    /// Performs a call and yields the decoded items unwrapped from the
    /// `data` root field (falling back to the whole payload).
    pub async fn get_content(&self, url: &str, call: &Call) -> Result<Content, Error> {
        self.core.get_content(url, call, ROOT_FIELD).await
    }

    /// Retrieves the available locales, in ISO 639 notation.
    pub async fn get_locales(&self) -> Result<Content, Error> {
        let url = self.core.config().url(Endpoint::GetLocales);
        self.core
            .get_content(&url, &Call::new().method(Method::Get), ROOT_FIELD)
            .await
    }

    /// Creates a short-lived upload token for the document store.
    ///
    /// Tokens expire, so request one right before the upload takes place.
    pub async fn upload_token(&self) -> Result<String, Error> {
        let url = self.core.config().url(Endpoint::UploadToken);
        let call = match &self.upload_token_flow {
            UploadTokenFlow::Anonymous => Call::new().method(Method::Post),
            UploadTokenFlow::WithToken(token) => {
                let mut data = Params::new();
                data.insert(
                    "access_token".to_string(),
                    Value::String(token.clone()),
                );
                Call::new().method(Method::Post).data(Body::Fields(data))
            }
        };
        let payload = self.core.request_json(&url, &call).await?;
        payload
            .pointer("/data/upload_token")
            .and_then(Value::as_str)
            .map(ToString::to_string)
            .ok_or_else(|| {
                ClientError::UnexpectedPayload {
                    field: "data.upload_token",
                }
                .into()
            })
    }
}

/// Serializes a parameter struct and merges its fields into a mapping.
/// `None` fields become `null` entries and are kept.
pub(crate) fn merge_fields<T: Serialize>(params: &mut Params, value: &T) -> Result<(), Error> {
    if let Value::Object(fields) = serde_json::to_value(value)? {
        params.extend(fields);
    }
    Ok(())
}

/// Builder for [`Client`].
#[derive(Debug)]
pub struct ClientBuilder {
    user_agent: String,
    site: String,
    config: Option<Config>,
    rate_limiter: Option<Arc<RateLimiter>>,
    retry: RetryPolicy,
    use_oauth: bool,
}

impl ClientBuilder {
    fn new(user_agent: impl Into<String>) -> Self {
        Self {
            user_agent: user_agent.into(),
            site: "toptranslation".to_string(),
            config: None,
            rate_limiter: None,
            retry: RetryPolicy::default(),
            use_oauth: false,
        }
    }

    /// Selects the profile/site name resolved from the settings file.
    /// Ignored when a prebuilt configuration is supplied.
    #[must_use]
    pub fn site(mut self, site: impl Into<String>) -> Self {
        self.site = site.into();
        self
    }

    /// Uses a prebuilt configuration instead of resolving one.
    #[must_use]
    pub fn config(mut self, config: Config) -> Self {
        self.config = Some(config);
        self
    }

    /// Injects a rate limiter. Defaults to the process-wide shared
    /// instance, so all clients honor one remote-side request budget.
    #[must_use]
    pub fn rate_limiter(mut self, limiter: Arc<RateLimiter>) -> Self {
        self.rate_limiter = Some(limiter);
        self
    }

    /// Sets the retry policy for retryable upstream statuses.
    #[must_use]
    pub const fn retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }

    /// Enables OAuth mode: a bearer header is attached and API URLs are
    /// rewritten to the configured OAuth base.
    #[must_use]
    pub const fn use_oauth(mut self, use_oauth: bool) -> Self {
        self.use_oauth = use_oauth;
        self
    }

    /// Builds the client.
    ///
    /// # Errors
    ///
    /// Fails fast with [`ClientError::InvalidUserAgent`] for an empty user
    /// agent, or with a configuration error when resolution fails.
    pub fn build(self) -> Result<Client, Error> {
        let user_agent = Config::user_agent(&self.user_agent)?;
        let config = match self.config {
            Some(config) => config,
            None => Config::builder(&self.site).build()?,
        };
        let limiter = self.rate_limiter.unwrap_or_else(RateLimiter::global);
        let dispatcher = Dispatcher::new(&config, limiter)?;

        let upload_token_flow = match config.access_token() {
            Some(token) => UploadTokenFlow::WithToken(token.to_string()),
            None => UploadTokenFlow::Anonymous,
        };

        Ok(Client {
            core: Core::new(config, dispatcher, user_agent, self.retry, self.use_oauth),
            upload_token_flow,
        })
    }
}

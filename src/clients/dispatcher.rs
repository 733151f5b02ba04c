//! Rate-limited request dispatching.
//!
//! [`RateLimiter`] enforces a minimum wall-clock interval between
//! consecutive requests sharing a rate-limit domain. It is an explicit
//! service object passed into the [`Dispatcher`] by handle; the process-wide
//! [`RateLimiter::global`] instance is shared by every client that does not
//! inject its own, so one remote-side request budget is honored regardless
//! of how many clients exist.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, OnceLock, PoisonError};
use std::time::Duration;

use reqwest::cookie::Jar;
use reqwest::redirect;
use tokio::time::Instant;

use crate::clients::request::{ApiRequest, Body, FileAttachment, Method};
use crate::clients::response::RawResponse;
use crate::config::Config;

/// The default rate-limit domain shared by all endpoints.
pub const GLOBAL_DOMAIN: &str = "global";

type LastCall = Arc<tokio::sync::Mutex<Option<Instant>>>;

/// Enforces a minimum interval between requests per rate-limit domain.
///
/// Admission to a domain's record is guarded by a synchronous mutex held
/// only long enough to fetch or create the record; the domain's own async
/// mutex is then held across the sleep *and* the network call, serializing
/// all calls sharing the domain. Throughput through one domain is therefore
/// at most one call per interval — deliberate backpressure against the
/// remote API. Waiters are admitted in whatever order the mutex grants, not
/// FIFO.
#[derive(Debug, Default)]
pub struct RateLimiter {
    domains: Mutex<HashMap<String, LastCall>>,
}

impl RateLimiter {
    /// Creates an isolated limiter.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the process-wide shared limiter.
    #[must_use]
    pub fn global() -> Arc<Self> {
        static GLOBAL: OnceLock<Arc<RateLimiter>> = OnceLock::new();
        Arc::clone(GLOBAL.get_or_init(|| Arc::new(Self::new())))
    }

    /// Runs `call` once the domain's interval has elapsed, holding the
    /// domain lock for the duration of the call.
    pub async fn run<F, T>(&self, domain: &str, interval: Duration, call: F) -> T
    where
        F: std::future::Future<Output = T>,
    {
        let record = {
            let mut domains = self
                .domains
                .lock()
                .unwrap_or_else(PoisonError::into_inner);
            Arc::clone(domains.entry(domain.to_string()).or_default())
        };

        let mut last_call = record.lock().await;
        if let Some(previous) = *last_call {
            let ready_at = previous + interval;
            let now = Instant::now();
            if ready_at > now {
                tokio::time::sleep(ready_at - now).await;
            }
        }
        *last_call = Some(Instant::now());
        call.await
    }
}

/// Executes prepared requests through the rate-limit gate.
///
/// Owns the transport client (redirect-following disabled, proxies honored)
/// and the per-client cookie jar. Returns raw responses without
/// interpretation; transport-level errors propagate to the caller
/// unretried.
#[derive(Debug)]
pub struct Dispatcher {
    http: reqwest::Client,
    limiter: Arc<RateLimiter>,
    cookies: Arc<Jar>,
}

impl Dispatcher {
    /// Creates a dispatcher for the given configuration.
    ///
    /// # Errors
    ///
    /// Returns a transport error when a configured proxy URL is invalid or
    /// the client cannot be constructed.
    pub fn new(config: &Config, limiter: Arc<RateLimiter>) -> Result<Self, reqwest::Error> {
        let cookies = Arc::new(Jar::default());
        let mut builder = reqwest::Client::builder()
            .use_rustls_tls()
            .redirect(redirect::Policy::none())
            .cookie_provider(Arc::clone(&cookies));

        if let Some(proxy) = config.http_proxy() {
            builder = builder.proxy(reqwest::Proxy::http(proxy)?);
        }
        if let Some(proxy) = config.https_proxy() {
            builder = builder.proxy(reqwest::Proxy::https(proxy)?);
        }

        Ok(Self {
            http: builder.build()?,
            limiter,
            cookies,
        })
    }

    /// Returns the per-client cookie jar. Response cookies are merged into
    /// it automatically by the transport.
    #[must_use]
    pub fn cookies(&self) -> &Arc<Jar> {
        &self.cookies
    }

    /// Sends a prepared request through the rate-limit gate.
    pub async fn send(
        &self,
        request: &ApiRequest,
        interval: Duration,
        timeout: Duration,
    ) -> Result<RawResponse, reqwest::Error> {
        self.limiter
            .run(GLOBAL_DOMAIN, interval, self.perform(request, timeout))
            .await
    }

    /// Eviction hook for cache handlers.
    ///
    /// The bundled dispatcher keeps no cache; returns the number of entries
    /// removed, which is always zero here.
    #[must_use]
    pub fn evict(&self, _urls: &[String]) -> usize {
        0
    }

    async fn perform(
        &self,
        request: &ApiRequest,
        timeout: Duration,
    ) -> Result<RawResponse, reqwest::Error> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Post => reqwest::Method::POST,
            Method::Patch => reqwest::Method::PATCH,
        };

        let mut builder = self.http.request(method, &request.url).timeout(timeout);

        for (key, value) in &request.headers {
            builder = builder.header(key, value);
        }

        let query: Vec<(&str, String)> = request
            .params
            .iter()
            .filter_map(|(key, value)| query_value(value).map(|value| (key.as_str(), value)))
            .collect();
        if !query.is_empty() {
            builder = builder.query(&query);
        }

        if let Some(auth) = &request.auth {
            builder = builder.basic_auth(&auth.username, auth.password.as_deref());
        }

        if request.files.is_empty() {
            match &request.data {
                Some(Body::Fields(fields)) => builder = builder.json(fields),
                Some(Body::Raw(raw)) => builder = builder.body(raw.clone()),
                Some(Body::Empty) | None => {}
            }
        } else {
            builder = builder.multipart(multipart_form(&request.data, &request.files));
        }

        let response = builder.send().await?;
        let status = response.status().as_u16();
        let headers = parse_headers(response.headers());
        let body = response.text().await.unwrap_or_default();

        Ok(RawResponse {
            status,
            headers,
            body,
        })
    }
}

/// Encodes a query value; `null` entries are omitted from the wire.
fn query_value(value: &serde_json::Value) -> Option<String> {
    match value {
        serde_json::Value::Null => None,
        serde_json::Value::String(text) => Some(text.clone()),
        other => Some(other.to_string()),
    }
}

fn multipart_form(
    data: &Option<Body>,
    files: &[FileAttachment],
) -> reqwest::multipart::Form {
    let mut form = reqwest::multipart::Form::new();
    if let Some(Body::Fields(fields)) = data {
        for (key, value) in fields {
            if let Some(text) = query_value(value) {
                form = form.text(key.clone(), text);
            }
        }
    }
    for file in files {
        form = form.part(
            file.field.clone(),
            reqwest::multipart::Part::bytes(file.contents.clone())
                .file_name(file.file_name.clone()),
        );
    }
    form
}

fn parse_headers(headers: &reqwest::header::HeaderMap) -> HashMap<String, Vec<String>> {
    let mut result: HashMap<String, Vec<String>> = HashMap::new();
    for (name, value) in headers {
        let key = name.as_str().to_lowercase();
        let value = value.to_str().unwrap_or_default().to_string();
        result.entry(key).or_default().push(value);
    }
    result
}

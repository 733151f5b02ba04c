//! Configuration resolution for the Toptranslation API client.
//!
//! A [`Config`] is an immutable value built once per client from three merged
//! sources, in precedence order: built-in defaults, the INI profile section
//! for a site name, proxy environment variables, and explicit builder
//! overrides (overrides win). It resolves logical endpoint names to absolute,
//! version-qualified URLs.
//!
//! # Example
//!
//! ```rust,no_run
//! use toptranslation_api::{Config, Endpoint};
//!
//! let config = Config::builder("toptranslation")
//!     .access_token("my-token")
//!     .build()
//!     .unwrap();
//!
//! let url = config.url(Endpoint::ListOrders);
//! assert!(url.starts_with("https://"));
//! ```

mod endpoints;
pub(crate) mod settings;

pub use endpoints::{bind_identifier, Endpoint, ENDPOINTS};

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use crate::error::ClientError;

/// Library version reported in the User-Agent header.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

const RUST_VERSION: &str = env!("CARGO_PKG_RUST_VERSION");

/// Immutable client configuration.
///
/// Built via [`Config::builder`]. All base URLs are absolute
/// (`scheme://host`); versioned endpoint URLs are composed from the fixed
/// path-template table in [`Endpoint`].
#[derive(Clone, Debug)]
pub struct Config {
    api_url: String,
    api_version: String,
    document_url: String,
    oauth_url: Option<String>,
    permalink_url: Option<String>,
    api_request_delay: Duration,
    cache_timeout: Duration,
    log_requests: u8,
    timeout: Duration,
    access_token: Option<String>,
    http_proxy: Option<String>,
    https_proxy: Option<String>,
}

// Verify Config is Send + Sync at compile time
const _: fn() = || {
    const fn assert_send_sync<T: Send + Sync>() {}
    assert_send_sync::<Config>();
};

impl Config {
    /// Creates a new builder for the given site/profile name.
    #[must_use]
    pub fn builder(site: impl Into<String>) -> ConfigBuilder {
        ConfigBuilder::new(site)
    }

    /// Returns the absolute API base URL.
    #[must_use]
    pub fn api_url(&self) -> &str {
        &self.api_url
    }

    /// Returns the `v`-prefixed API version segment.
    #[must_use]
    pub fn api_version(&self) -> &str {
        &self.api_version
    }

    /// Returns the absolute document-store base URL.
    #[must_use]
    pub fn document_url(&self) -> &str {
        &self.document_url
    }

    /// Returns the OAuth base URL, if configured.
    #[must_use]
    pub fn oauth_url(&self) -> Option<&str> {
        self.oauth_url.as_deref()
    }

    /// Returns the permalink base URL, if configured.
    #[must_use]
    pub fn permalink_url(&self) -> Option<&str> {
        self.permalink_url.as_deref()
    }

    /// Returns the minimum interval enforced between consecutive requests.
    #[must_use]
    pub const fn api_request_delay(&self) -> Duration {
        self.api_request_delay
    }

    /// Returns the response-cache timeout.
    ///
    /// The bundled dispatcher does not cache; the value is carried for cache
    /// handlers plugged in via the eviction extension point.
    #[must_use]
    pub const fn cache_timeout(&self) -> Duration {
        self.cache_timeout
    }

    /// Returns the diagnostic verbosity level.
    ///
    /// Level `>= 1` logs method and URL for every request, level `>= 2`
    /// additionally logs params, data, auth and the response status.
    #[must_use]
    pub const fn log_requests(&self) -> u8 {
        self.log_requests
    }

    /// Returns the timeout bounding a single network call.
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Returns the access token, if configured.
    #[must_use]
    pub fn access_token(&self) -> Option<&str> {
        self.access_token.as_deref()
    }

    /// Returns the HTTP proxy URL, if configured.
    #[must_use]
    pub fn http_proxy(&self) -> Option<&str> {
        self.http_proxy.as_deref()
    }

    /// Returns the HTTPS proxy URL, if configured.
    #[must_use]
    pub fn https_proxy(&self) -> Option<&str> {
        self.https_proxy.as_deref()
    }

    /// Resolves a logical endpoint to its absolute, version-qualified URL.
    ///
    /// The returned URL may still contain an `{identifier}` placeholder; use
    /// [`bind_identifier`] to substitute it.
    #[must_use]
    pub fn url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}/{}", self.api_url, self.api_version, endpoint.path())
    }

    /// Resolves a logical endpoint by name.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::UnknownEndpoint`] when the name is not in the
    /// endpoint table.
    pub fn url_by_name(&self, name: &str) -> Result<String, ClientError> {
        Ok(self.url(name.parse()?))
    }

    /// Resolves a document-store endpoint against the document-store base
    /// URL. Document-store paths carry no version segment.
    #[must_use]
    pub fn document_store_url(&self, endpoint: Endpoint) -> String {
        format!("{}/{}", self.document_url, endpoint.path())
    }

    /// Composes the User-Agent string for a caller-supplied application
    /// identifier.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::InvalidUserAgent`] when the identifier is
    /// empty.
    pub fn user_agent(app: &str) -> Result<String, ClientError> {
        if app.trim().is_empty() {
            return Err(ClientError::InvalidUserAgent);
        }
        Ok(format!(
            "{app} toptranslation-api/{VERSION} Rust/{RUST_VERSION}"
        ))
    }
}

/// Prefixes `https://` unless the value already carries a scheme.
fn ensure_scheme(domain: &str) -> String {
    if domain.contains("://") {
        domain.trim_end_matches('/').to_string()
    } else {
        format!("https://{}", domain.trim_end_matches('/'))
    }
}

fn parse_seconds(key: &'static str, value: &str) -> Result<Duration, ClientError> {
    let seconds: f64 = value.parse().map_err(|_| ClientError::InvalidSetting {
        key,
        reason: format!("'{value}' is not a number of seconds"),
    })?;
    if !seconds.is_finite() || seconds < 0.0 {
        return Err(ClientError::InvalidSetting {
            key,
            reason: format!("'{value}' is not a non-negative duration"),
        });
    }
    Ok(Duration::from_secs_f64(seconds))
}

/// Builder for [`Config`].
///
/// Explicit setters override the INI profile, which overrides the built-in
/// defaults. Proxy URLs additionally fall back to the `http_proxy` and
/// `https_proxy` environment variables.
#[derive(Debug)]
pub struct ConfigBuilder {
    site: String,
    file: Option<PathBuf>,
    overrides: HashMap<&'static str, String>,
}

impl ConfigBuilder {
    fn new(site: impl Into<String>) -> Self {
        Self {
            site: site.into(),
            file: None,
            overrides: HashMap::new(),
        }
    }

    /// Uses an explicit settings file instead of searching the default
    /// locations.
    #[must_use]
    pub fn file(mut self, path: impl Into<PathBuf>) -> Self {
        self.file = Some(path.into());
        self
    }

    /// Overrides the API domain (`host` or `scheme://host`).
    #[must_use]
    pub fn api_domain(mut self, domain: impl Into<String>) -> Self {
        self.overrides.insert("api_domain", domain.into());
        self
    }

    /// Overrides the API version (without the `v` prefix).
    #[must_use]
    pub fn api_version(mut self, version: impl Into<String>) -> Self {
        self.overrides.insert("api_version", version.into());
        self
    }

    /// Overrides the document-store domain.
    #[must_use]
    pub fn document_domain(mut self, domain: impl Into<String>) -> Self {
        self.overrides.insert("document_domain", domain.into());
        self
    }

    /// Overrides the OAuth domain used for bearer-token substitution.
    #[must_use]
    pub fn oauth_domain(mut self, domain: impl Into<String>) -> Self {
        self.overrides.insert("oauth_domain", domain.into());
        self
    }

    /// Overrides the permalink domain.
    #[must_use]
    pub fn permalink_domain(mut self, domain: impl Into<String>) -> Self {
        self.overrides.insert("permalink_domain", domain.into());
        self
    }

    /// Overrides the minimum interval between requests, in seconds.
    #[must_use]
    pub fn api_request_delay(mut self, seconds: f64) -> Self {
        self.overrides
            .insert("api_request_delay", seconds.to_string());
        self
    }

    /// Overrides the response-cache timeout, in seconds.
    #[must_use]
    pub fn cache_timeout(mut self, seconds: f64) -> Self {
        self.overrides.insert("cache_timeout", seconds.to_string());
        self
    }

    /// Overrides the diagnostic verbosity level.
    #[must_use]
    pub fn log_requests(mut self, level: u8) -> Self {
        self.overrides.insert("log_requests", level.to_string());
        self
    }

    /// Overrides the per-call network timeout, in seconds.
    #[must_use]
    pub fn timeout(mut self, seconds: f64) -> Self {
        self.overrides.insert("timeout", seconds.to_string());
        self
    }

    /// Sets the access token for authenticated calls.
    #[must_use]
    pub fn access_token(mut self, token: impl Into<String>) -> Self {
        self.overrides.insert("access_token", token.into());
        self
    }

    /// Overrides the HTTP proxy URL.
    #[must_use]
    pub fn http_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.overrides.insert("http_proxy", proxy.into());
        self
    }

    /// Overrides the HTTPS proxy URL.
    #[must_use]
    pub fn https_proxy(mut self, proxy: impl Into<String>) -> Self {
        self.overrides.insert("https_proxy", proxy.into());
        self
    }

    /// Resolves the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::ConfigFileNotFound`] when no settings file is
    /// found and the overrides do not supply the required domains,
    /// [`ClientError::MissingProfile`] when the file has no section for the
    /// site name, and [`ClientError::MissingSetting`] /
    /// [`ClientError::InvalidSetting`] for absent or malformed values.
    pub fn build(self) -> Result<Config, ClientError> {
        let mut merged: HashMap<String, String> = HashMap::from([
            ("api_request_delay".to_string(), "1.0".to_string()),
            ("cache_timeout".to_string(), "30".to_string()),
            ("log_requests".to_string(), "0".to_string()),
            ("timeout".to_string(), "45".to_string()),
        ]);

        let required_overridden = ["api_domain", "api_version", "document_domain"]
            .iter()
            .all(|key| self.overrides.contains_key(key));

        // An explicit file is always honored. Otherwise the default
        // locations are searched, except when the overrides already supply
        // every required domain, which keeps purely programmatic
        // construction independent of files on the host.
        let file = match &self.file {
            Some(path) => {
                if !path.exists() {
                    return Err(ClientError::ConfigFileNotFound {
                        searched: vec![path.clone()],
                    });
                }
                Some(path.clone())
            }
            None if required_overridden => None,
            None => Some(settings::find_settings_file().ok_or_else(|| {
                ClientError::ConfigFileNotFound {
                    searched: settings::default_locations(),
                }
            })?),
        };

        if let Some(path) = file {
            merged.extend(settings::load_profile(&path, &self.site)?);
        }

        for (key, value) in self.overrides {
            merged.insert(key.to_string(), value);
        }

        let take = |merged: &HashMap<String, String>, key: &'static str| {
            merged
                .get(key)
                .filter(|value| !value.is_empty())
                .cloned()
                .ok_or(ClientError::MissingSetting { key })
        };

        let api_domain = take(&merged, "api_domain")?;
        let api_version = take(&merged, "api_version")?;
        let document_domain = take(&merged, "document_domain")?;

        let optional = |key: &str| merged.get(key).filter(|value| !value.is_empty()).cloned();

        let log_requests: u8 = {
            let raw = take(&merged, "log_requests")?;
            raw.parse().map_err(|_| ClientError::InvalidSetting {
                key: "log_requests",
                reason: format!("'{raw}' is not a verbosity level"),
            })?
        };

        Ok(Config {
            api_url: ensure_scheme(&api_domain),
            api_version: format!("v{api_version}"),
            document_url: ensure_scheme(&document_domain),
            oauth_url: optional("oauth_domain").map(|domain| ensure_scheme(&domain)),
            permalink_url: optional("permalink_domain").map(|domain| ensure_scheme(&domain)),
            api_request_delay: parse_seconds(
                "api_request_delay",
                &take(&merged, "api_request_delay")?,
            )?,
            cache_timeout: parse_seconds("cache_timeout", &take(&merged, "cache_timeout")?)?,
            log_requests,
            timeout: parse_seconds("timeout", &take(&merged, "timeout")?)?,
            access_token: optional("access_token"),
            http_proxy: optional("http_proxy").or_else(|| settings::env_proxy("http")),
            https_proxy: optional("https_proxy").or_else(|| settings::env_proxy("https")),
        })
    }
}

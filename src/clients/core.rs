//! The request-dispatch pipeline.
//!
//! [`Core`] owns one configuration, one dispatcher and the session header
//! set, and runs every call through the same four stages: prepare the
//! request descriptor, dispatch through the rate-limit gate, decode the
//! response, and map errors. The resource facade is a thin enumeration of
//! endpoint selections over this pipeline.

use std::collections::HashMap;

use serde_json::Value;

use crate::clients::dispatcher::Dispatcher;
use crate::clients::errors::{ApiError, OAuthError};
use crate::clients::request::{ApiRequest, Body, Call, Method, Params};
use crate::clients::response::{decode, RawResponse};
use crate::config::Config;
use crate::error::Error;

/// Root field unwrapped by content listings when present.
pub const ROOT_FIELD: &str = "data";

/// Bounded retry behavior for retryable upstream statuses (502, 503, 504).
///
/// Retry is owned by this client boundary: the decode layer only signals
/// that a status is retryable, and the pipeline re-dispatches up to
/// `max_attempts` times before failing with
/// [`ApiError::RetriesExhausted`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Total number of attempts, including the first.
    pub max_attempts: u32,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self { max_attempts: 3 }
    }
}

/// The shared pipeline core behind a client.
#[derive(Debug)]
pub struct Core {
    config: Config,
    dispatcher: Dispatcher,
    default_headers: HashMap<String, String>,
    retry: RetryPolicy,
    use_oauth: bool,
}

impl Core {
    /// Assembles a core from its parts. `user_agent` must already be the
    /// composed header value (see [`Config::user_agent`]).
    #[must_use]
    pub fn new(
        config: Config,
        dispatcher: Dispatcher,
        user_agent: String,
        retry: RetryPolicy,
        use_oauth: bool,
    ) -> Self {
        let default_headers = HashMap::from([
            ("User-Agent".to_string(), user_agent),
            ("Accept".to_string(), "application/json".to_string()),
        ]);
        Self {
            config,
            dispatcher,
            default_headers,
            retry,
            use_oauth,
        }
    }

    /// Returns the configuration.
    #[must_use]
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Returns the dispatcher.
    #[must_use]
    pub fn dispatcher(&self) -> &Dispatcher {
        &self.dispatcher
    }

    /// Builds the request descriptor for a call.
    ///
    /// In OAuth mode the bearer header is computed before the session
    /// defaults are merged, so both survive (the key sets are disjoint) and
    /// the caller-level User-Agent is preserved. The method is inferred as
    /// POST when body data or files are present and no explicit method is
    /// given, otherwise GET.
    ///
    /// # Errors
    ///
    /// Returns [`OAuthError`] when OAuth mode is enabled without an access
    /// token or OAuth base URL. Malformed inputs otherwise surface later as
    /// transport or decode errors.
    pub fn prepare(&self, url: &str, call: &Call) -> Result<ApiRequest, Error> {
        let verbosity = self.config.log_requests();
        let mut url = url.to_string();
        let mut headers = HashMap::new();

        if self.use_oauth {
            let token = self.config.access_token().ok_or_else(|| OAuthError {
                message: "OAuth mode requires an access token".to_string(),
                url: url.clone(),
            })?;
            headers.insert("Authorization".to_string(), format!("bearer {token}"));

            let oauth_base = self.config.oauth_url().ok_or_else(|| OAuthError {
                message: "OAuth mode requires a configured oauth_domain".to_string(),
                url: url.clone(),
            })?;
            let prefixes = [Some(self.config.api_url()), self.config.permalink_url()];
            for prefix in prefixes.into_iter().flatten() {
                if url.starts_with(prefix) {
                    if verbosity >= 1 {
                        tracing::debug!("substituting {oauth_base} for {prefix} in url");
                    }
                    url = format!("{oauth_base}{}", &url[prefix.len()..]);
                    break;
                }
            }
        }

        for (key, value) in &self.default_headers {
            headers.insert(key.clone(), value.clone());
        }

        let method = call.effective_method();
        if verbosity >= 1 {
            tracing::debug!("{method}: {url}");
        }
        if verbosity >= 2 {
            if !call.params.is_empty() {
                tracing::debug!("params: {:?}", call.params);
            }
            if let Some(data) = &call.data {
                tracing::debug!("data: {data:?}");
            }
            if let Some(auth) = &call.auth {
                tracing::debug!("auth: {}", auth.username);
            }
        }

        let mut request = ApiRequest {
            method,
            url,
            headers,
            params: call.params.clone(),
            data: None,
            files: call.files.clone(),
            auth: call.auth.clone(),
        };

        if method == Method::Get {
            return Ok(request);
        }

        match call.data.clone() {
            Some(Body::Fields(fields)) => {
                request.data = Some(Body::Fields(self.body_fields(fields, call)));
            }
            Some(Body::Empty) => {
                request.data = Some(Body::Fields(self.body_fields(Params::new(), call)));
            }
            Some(Body::Raw(raw)) => {
                request
                    .headers
                    .entry("Content-Type".to_string())
                    .or_insert_with(|| "application/json".to_string());
                request.data = Some(Body::Raw(raw));
            }
            None => {}
        }

        Ok(request)
    }

    fn body_fields(&self, mut fields: Params, call: &Call) -> Params {
        if call.auth.is_none() && !fields.contains_key("api_type") {
            fields.insert("api_type".to_string(), Value::String("json".to_string()));
        }
        fields
    }

    /// Dispatches a call once and returns the raw response without
    /// interpretation.
    pub async fn request_raw(&self, url: &str, call: &Call) -> Result<RawResponse, Error> {
        let request = self.prepare(url, call)?;
        let response = self.dispatch(&request, call).await?;
        Ok(response)
    }

    /// Dispatches a call and decodes the response body, re-attempting
    /// swallowed retryable statuses up to the retry policy's bound.
    pub async fn request_text(&self, url: &str, call: &Call) -> Result<String, Error> {
        let request = self.prepare(url, call)?;
        let attempts = self.retry.max_attempts.max(1);
        let mut last_status = 0;

        for attempt in 1..=attempts {
            let response = self.dispatch(&request, call).await?;
            last_status = response.status;
            match decode(response).map_err(Error::Api)? {
                Some(text) => return Ok(text),
                None => {
                    if self.config.log_requests() >= 1 {
                        tracing::debug!(
                            "retryable status {last_status}, attempt {attempt} of {attempts}"
                        );
                    }
                }
            }
        }

        Err(Error::Api(ApiError::RetriesExhausted {
            status: last_status,
            attempts,
        }))
    }

    /// Dispatches a call and parses the decoded body as JSON.
    pub async fn request_json(&self, url: &str, call: &Call) -> Result<Value, Error> {
        let text = self.request_text(url, call).await?;
        Ok(serde_json::from_str(&text)?)
    }

    /// Dispatches a call and yields the decoded items in order, unwrapping
    /// `root_field` from the payload and falling back to the whole payload
    /// when that field is absent.
    pub async fn get_content(
        &self,
        url: &str,
        call: &Call,
        root_field: &str,
    ) -> Result<std::vec::IntoIter<Value>, Error> {
        let mut payload = self.request_json(url, call).await?;
        let root = match payload.get_mut(root_field) {
            Some(value) => value.take(),
            None => payload,
        };
        let items = match root {
            Value::Array(items) => items,
            other => vec![other],
        };
        Ok(items.into_iter())
    }

    async fn dispatch(&self, request: &ApiRequest, call: &Call) -> Result<RawResponse, Error> {
        let timeout = call.timeout.unwrap_or_else(|| self.config.timeout());
        let response = self
            .dispatcher
            .send(request, self.config.api_request_delay(), timeout)
            .await?;
        if self.config.log_requests() >= 2 {
            tracing::debug!("status: {}", response.status);
        }
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clients::dispatcher::RateLimiter;
    use serde_json::json;
    use std::sync::Arc;

    fn config() -> Config {
        Config::builder("test")
            .api_domain("api.example.com")
            .api_version("1")
            .document_domain("document.example.com")
            .oauth_domain("oauth.example.com")
            .access_token("token-123")
            .build()
            .unwrap()
    }

    fn core(use_oauth: bool) -> Core {
        let config = config();
        let dispatcher = Dispatcher::new(&config, Arc::new(RateLimiter::new())).unwrap();
        let user_agent = Config::user_agent("tests/1.0").unwrap();
        Core::new(config, dispatcher, user_agent, RetryPolicy::default(), use_oauth)
    }

    #[test]
    fn preparation_is_idempotent() {
        let core = core(false);
        let call = Call::new().param("page", json!(1));

        let first = core.prepare("https://api.example.com/v1/orders", &call).unwrap();
        let second = core.prepare("https://api.example.com/v1/orders", &call).unwrap();

        assert_eq!(first.method, second.method);
        assert_eq!(first.url, second.url);
        assert_eq!(first.headers, second.headers);
    }

    #[test]
    fn get_requests_skip_body_processing() {
        let core = core(false);
        let request = core
            .prepare("https://api.example.com/v1/orders", &Call::new())
            .unwrap();

        assert_eq!(request.method, Method::Get);
        assert!(request.data.is_none());
        assert!(request.headers.contains_key("User-Agent"));
    }

    #[test]
    fn mapping_bodies_get_api_type_injected() {
        let core = core(false);
        let mut fields = Params::new();
        fields.insert("name".to_string(), json!("Doc1"));
        let call = Call::new().data(Body::Fields(fields));

        let request = core
            .prepare("https://api.example.com/v1/orders", &call)
            .unwrap();
        match request.data.unwrap() {
            Body::Fields(fields) => {
                assert_eq!(fields.get("api_type"), Some(&json!("json")));
                assert_eq!(fields.get("name"), Some(&json!("Doc1")));
            }
            other => panic!("expected field body, got {other:?}"),
        }
    }

    #[test]
    fn api_type_is_not_injected_with_basic_auth() {
        use crate::clients::request::BasicAuth;

        let core = core(false);
        let call = Call::new().data(Body::Empty).auth(BasicAuth {
            username: "user".to_string(),
            password: Some("pass".to_string()),
        });

        let request = core
            .prepare("https://api.example.com/v1/orders", &call)
            .unwrap();
        match request.data.unwrap() {
            Body::Fields(fields) => assert!(fields.is_empty()),
            other => panic!("expected field body, got {other:?}"),
        }
    }

    #[test]
    fn empty_sentinel_normalizes_to_a_mapping() {
        let core = core(false);
        let call = Call::new().data(Body::Empty);

        let request = core
            .prepare("https://api.example.com/v1/orders", &call)
            .unwrap();
        assert!(matches!(request.data, Some(Body::Fields(_))));
    }

    #[test]
    fn raw_bodies_get_a_json_content_type() {
        let core = core(false);
        let call = Call::new().data(Body::Raw(r#"{"a":1}"#.to_string()));

        let request = core
            .prepare("https://api.example.com/v1/orders", &call)
            .unwrap();
        assert_eq!(
            request.headers.get("Content-Type").map(String::as_str),
            Some("application/json")
        );
    }

    #[test]
    fn oauth_mode_substitutes_domain_and_sets_bearer() {
        let core = core(true);
        let request = core
            .prepare("https://api.example.com/v1/orders", &Call::new())
            .unwrap();

        assert_eq!(request.url, "https://oauth.example.com/v1/orders");
        assert_eq!(
            request.headers.get("Authorization").map(String::as_str),
            Some("bearer token-123")
        );
        // caller-level User-Agent survives the merge
        assert!(request
            .headers
            .get("User-Agent")
            .unwrap()
            .starts_with("tests/1.0"));
    }

    #[test]
    fn oauth_mode_leaves_foreign_urls_alone() {
        let core = core(true);
        let request = core
            .prepare("https://elsewhere.example.com/v1/orders", &Call::new())
            .unwrap();
        assert_eq!(request.url, "https://elsewhere.example.com/v1/orders");
    }

    #[test]
    fn oauth_mode_without_token_fails_with_the_url() {
        let config = Config::builder("test")
            .api_domain("api.example.com")
            .api_version("1")
            .document_domain("document.example.com")
            .oauth_domain("oauth.example.com")
            .build()
            .unwrap();
        let dispatcher = Dispatcher::new(&config, Arc::new(RateLimiter::new())).unwrap();
        let user_agent = Config::user_agent("tests/1.0").unwrap();
        let core = Core::new(config, dispatcher, user_agent, RetryPolicy::default(), true);

        let result = core.prepare("https://api.example.com/v1/orders", &Call::new());
        assert!(matches!(result, Err(Error::OAuth(error)) if error.url.contains("/v1/orders")));
    }
}

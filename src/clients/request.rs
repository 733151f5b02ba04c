//! Request descriptor types.
//!
//! A [`Call`] carries the per-request options a caller hands to the pipeline
//! (params, body data, files, auth, optional explicit method). The core turns
//! it into an [`ApiRequest`], a fully-specified descriptor that is never
//! mutated after being handed to the dispatcher.

use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use serde_json::Value;

/// Parameter and body-field mappings, with `null` representable so unset
/// optional fields survive to the wire unchanged.
pub type Params = serde_json::Map<String, Value>;

/// HTTP methods used by the Toptranslation API.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Method {
    /// GET, for reads.
    Get,
    /// POST, for creates and actions.
    Post,
    /// PATCH, for updates.
    Patch,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Get => write!(f, "GET"),
            Self::Post => write!(f, "POST"),
            Self::Patch => write!(f, "PATCH"),
        }
    }
}

/// Request body data.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Body {
    /// Sentinel for "send a body, but with no fields"; normalized to an
    /// empty mapping during preparation.
    Empty,
    /// A field mapping, transmitted as JSON (or as multipart text parts when
    /// files are attached).
    Fields(Params),
    /// A raw, pre-encoded body; gets `Content-Type: application/json` unless
    /// a content type is already set.
    Raw(String),
}

/// HTTP basic-auth credentials.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BasicAuth {
    /// The user name.
    pub username: String,
    /// The password.
    pub password: Option<String>,
}

/// A file attached to a request, transmitted verbatim as a multipart part.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FileAttachment {
    /// The multipart field name.
    pub field: String,
    /// The file name reported to the server.
    pub file_name: String,
    /// The file contents.
    pub contents: Vec<u8>,
}

/// Per-request options handed to the pipeline.
///
/// # Example
///
/// ```rust
/// use toptranslation_api::clients::{Call, Method};
/// use serde_json::json;
///
/// let call = Call::new()
///     .method(Method::Get)
///     .param("page", json!(1));
/// ```
#[derive(Clone, Debug, Default)]
pub struct Call {
    /// Query parameters.
    pub params: Params,
    /// Body data, if any.
    pub data: Option<Body>,
    /// File attachments.
    pub files: Vec<FileAttachment>,
    /// Basic-auth credentials, if any.
    pub auth: Option<BasicAuth>,
    /// Explicit method; inferred when absent.
    pub method: Option<Method>,
    /// Per-call timeout override.
    pub timeout: Option<Duration>,
}

impl Call {
    /// Creates an empty set of options.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the explicit method.
    #[must_use]
    pub const fn method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }

    /// Sets all query parameters at once.
    #[must_use]
    pub fn params(mut self, params: Params) -> Self {
        self.params = params;
        self
    }

    /// Adds a single query parameter.
    #[must_use]
    pub fn param(mut self, key: impl Into<String>, value: Value) -> Self {
        self.params.insert(key.into(), value);
        self
    }

    /// Sets the body data.
    #[must_use]
    pub fn data(mut self, data: Body) -> Self {
        self.data = Some(data);
        self
    }

    /// Attaches a file.
    #[must_use]
    pub fn file(mut self, attachment: FileAttachment) -> Self {
        self.files.push(attachment);
        self
    }

    /// Sets basic-auth credentials.
    #[must_use]
    pub fn auth(mut self, auth: BasicAuth) -> Self {
        self.auth = Some(auth);
        self
    }

    /// Overrides the network timeout for this call.
    #[must_use]
    pub const fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    /// Resolves the effective method: the explicit one when given, otherwise
    /// POST when body data or files are present, otherwise GET.
    #[must_use]
    pub fn effective_method(&self) -> Method {
        match self.method {
            Some(method) => method,
            None if self.data.is_some() || !self.files.is_empty() => Method::Post,
            None => Method::Get,
        }
    }
}

/// A fully-specified request descriptor.
///
/// Constructed fresh per call by the core's preparation step and handed to
/// the dispatcher unchanged.
#[derive(Clone, Debug)]
pub struct ApiRequest {
    /// The resolved method.
    pub method: Method,
    /// The absolute target URL.
    pub url: String,
    /// Headers with unique keys.
    pub headers: HashMap<String, String>,
    /// Query parameters. `null` values are retained in the descriptor; the
    /// transport omits them from the encoded query string.
    pub params: Params,
    /// Normalized body data, if any.
    pub data: Option<Body>,
    /// File attachments.
    pub files: Vec<FileAttachment>,
    /// Basic-auth credentials, if any.
    pub auth: Option<BasicAuth>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn method_defaults_to_get() {
        assert_eq!(Call::new().effective_method(), Method::Get);
    }

    #[test]
    fn data_or_files_infer_post() {
        let with_data = Call::new().data(Body::Empty);
        assert_eq!(with_data.effective_method(), Method::Post);

        let with_file = Call::new().file(FileAttachment {
            field: "file".to_string(),
            file_name: "doc.txt".to_string(),
            contents: b"hello".to_vec(),
        });
        assert_eq!(with_file.effective_method(), Method::Post);
    }

    #[test]
    fn explicit_method_wins_over_inference() {
        let call = Call::new().data(Body::Empty).method(Method::Patch);
        assert_eq!(call.effective_method(), Method::Patch);
    }

    #[test]
    fn params_retain_null_values() {
        let call = Call::new()
            .param("identifier", json!("abc"))
            .param("state", Value::Null);
        assert_eq!(call.params.get("state"), Some(&Value::Null));
    }

    #[test]
    fn method_displays_in_wire_casing() {
        assert_eq!(Method::Get.to_string(), "GET");
        assert_eq!(Method::Post.to_string(), "POST");
        assert_eq!(Method::Patch.to_string(), "PATCH");
    }
}

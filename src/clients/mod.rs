//! The request-dispatch pipeline: request descriptors, the rate-limited
//! dispatcher, response decoding and the server-side error taxonomy.

mod core;
mod dispatcher;
mod errors;
mod request;
mod response;

pub use self::core::{Core, RetryPolicy, ROOT_FIELD};
pub use dispatcher::{Dispatcher, RateLimiter, GLOBAL_DOMAIN};
pub use errors::{error_for_type, ApiError, OAuthError, ERROR_TYPES};
pub use request::{ApiRequest, BasicAuth, Body, Call, FileAttachment, Method, Params};
pub use response::{decode, unescape_entities, RawResponse, RETRY_STATUS};

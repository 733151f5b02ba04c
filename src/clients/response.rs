//! Response decoding and error mapping.
//!
//! Upstream text may arrive HTML-escaped, so entities are unescaped before
//! any JSON parse. Retryable statuses (502, 503, 504) are swallowed here and
//! signalled to the caller-facing retry loop instead of surfacing as errors.

use std::collections::HashMap;

use crate::clients::errors::{error_for_type, ApiError};

/// Statuses signalling transient upstream failure; the caller may retry.
pub const RETRY_STATUS: [u16; 3] = [502, 503, 504];

/// A raw response as returned by the dispatcher, without interpretation.
#[derive(Clone, Debug)]
pub struct RawResponse {
    /// The HTTP status code.
    pub status: u16,
    /// Response headers, lowercase keys, possibly multi-valued.
    pub headers: HashMap<String, Vec<String>>,
    /// The response body text.
    pub body: String,
}

impl RawResponse {
    /// Returns `true` if the status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.status >= 200 && self.status <= 299
    }

    /// Returns `true` if the status signals a transient upstream failure.
    #[must_use]
    pub fn is_retryable(&self) -> bool {
        RETRY_STATUS.contains(&self.status)
    }
}

/// Decodes a dispatched response into body text ready for JSON parsing.
///
/// Returns `Ok(None)` when the status is retryable (502, 503, 504) — the
/// error is swallowed at this layer so the caller-facing retry loop may
/// re-attempt. All other failure statuses map to a typed [`ApiError`]
/// carrying the raw response. Successful bodies are entity-unescaped.
pub fn decode(response: RawResponse) -> Result<Option<String>, ApiError> {
    if response.is_retryable() {
        return Ok(None);
    }
    if !response.is_ok() {
        return Err(map_error(response));
    }
    Ok(Some(unescape_entities(&response.body)))
}

/// Maps a failed response to a typed error.
///
/// The server may declare an `error_type` marker in its JSON payload; the
/// static registry dispatches those to concrete subtypes. Responses without a
/// recognized marker fall back to classification by status code.
fn map_error(response: RawResponse) -> ApiError {
    let declared = serde_json::from_str::<serde_json::Value>(&response.body)
        .ok()
        .and_then(|payload| {
            payload
                .get("error_type")
                .and_then(serde_json::Value::as_str)
                .and_then(error_for_type)
        });

    if let Some(ctor) = declared {
        return ctor(response);
    }

    match response.status {
        403 => ApiError::Forbidden(response),
        404 => ApiError::NotFound(response),
        status => ApiError::Status { status, response },
    }
}

/// Unescapes HTML entities (`&name;`, `&#NN;`, `&#xNN;`) in response text.
///
/// Unknown entity names are left untouched.
#[must_use]
pub fn unescape_entities(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut rest = text;

    while let Some(start) = rest.find('&') {
        out.push_str(&rest[..start]);
        let tail = &rest[start..];
        match tail[1..].find(';') {
            // entity candidates are short; anything longer is literal text
            Some(end) if end > 0 && end <= 32 => {
                let name = &tail[1..=end];
                match resolve_entity(name) {
                    Some(ch) => out.push(ch),
                    None => out.push_str(&tail[..=end + 1]),
                }
                rest = &tail[end + 2..];
            }
            _ => {
                out.push('&');
                rest = &tail[1..];
            }
        }
    }
    out.push_str(rest);
    out
}

fn resolve_entity(name: &str) -> Option<char> {
    if let Some(digits) = name.strip_prefix("#x").or_else(|| name.strip_prefix("#X")) {
        return u32::from_str_radix(digits, 16).ok().and_then(char::from_u32);
    }
    if let Some(digits) = name.strip_prefix('#') {
        return digits.parse::<u32>().ok().and_then(char::from_u32);
    }
    named_entity(name)
}

/// The XML predefined entities plus the Latin-1 letters the upstream API is
/// known to emit.
fn named_entity(name: &str) -> Option<char> {
    let ch = match name {
        "amp" => '&',
        "lt" => '<',
        "gt" => '>',
        "quot" => '"',
        "apos" => '\'',
        "nbsp" => '\u{a0}',
        "szlig" => 'ß',
        "auml" => 'ä',
        "ouml" => 'ö',
        "uuml" => 'ü',
        "Auml" => 'Ä',
        "Ouml" => 'Ö',
        "Uuml" => 'Ü',
        "eacute" => 'é',
        "egrave" => 'è',
        "agrave" => 'à',
        "ccedil" => 'ç',
        "ntilde" => 'ñ',
        "euro" => '€',
        "pound" => '£',
        "copy" => '©',
        "reg" => '®',
        "deg" => '°',
        "hellip" => '…',
        "mdash" => '—',
        "ndash" => '–',
        "lsquo" => '\u{2018}',
        "rsquo" => '\u{2019}',
        "ldquo" => '\u{201c}',
        "rdquo" => '\u{201d}',
        _ => return None,
    };
    Some(ch)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn response(status: u16, body: &str) -> RawResponse {
        RawResponse {
            status,
            headers: HashMap::new(),
            body: body.to_string(),
        }
    }

    #[test]
    fn named_and_numeric_entities_round_trip() {
        assert_eq!(unescape_entities("Tom &amp; Jerry"), "Tom & Jerry");
        assert_eq!(unescape_entities("&#65;BC"), "ABC");
        assert_eq!(unescape_entities("&#x41;BC"), "ABC");
        assert_eq!(unescape_entities("M&uuml;nchen"), "München");
    }

    #[test]
    fn unknown_entities_pass_through() {
        assert_eq!(unescape_entities("&bogus;"), "&bogus;");
        assert_eq!(unescape_entities("a & b"), "a & b");
        assert_eq!(unescape_entities("trailing &"), "trailing &");
    }

    #[test]
    fn success_bodies_are_unescaped() {
        let text = decode(response(200, r#"{"name": "a &amp; b"}"#))
            .unwrap()
            .unwrap();
        assert_eq!(text, r#"{"name": "a & b"}"#);
    }

    #[test]
    fn retryable_statuses_are_swallowed() {
        for status in RETRY_STATUS {
            let result = decode(response(status, ""));
            assert!(matches!(result, Ok(None)), "status {status} must be swallowed");
        }
    }

    #[test]
    fn declared_error_type_wins_over_status() {
        let error = decode(response(400, r#"{"error_type": "not_found"}"#)).unwrap_err();
        assert!(matches!(error, ApiError::NotFound(_)));
    }

    #[test]
    fn status_fallback_classifies_403_and_404() {
        assert!(matches!(
            decode(response(403, "{}")).unwrap_err(),
            ApiError::Forbidden(_)
        ));
        assert!(matches!(
            decode(response(404, "{}")).unwrap_err(),
            ApiError::NotFound(_)
        ));
        assert!(matches!(
            decode(response(500, "{}")).unwrap_err(),
            ApiError::Status { status: 500, .. }
        ));
    }
}

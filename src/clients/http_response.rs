//! HTTP response types.
//!
//! [`HttpResponse::new`] parses the headers the rest of the crate relies on:
//! pagination (`Link`, `X-Page`, `X-Next-Page`, ...), rate limiting
//! (`Retry-After`, `RateLimit-Reset`) and the request id.

use chrono::{DateTime, TimeZone, Utc};
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

/// Pagination metadata reported with a list response.
///
/// Header values that are absent, empty or not numeric leave the matching
/// field as `None`; GitLab sends an empty `X-Next-Page` on the last page.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PaginationInfo {
    /// URL of the next page (`Link: <...>; rel="next"`).
    pub next_link: Option<String>,
    /// URL of the previous page (`Link: <...>; rel="prev"`).
    pub prev_link: Option<String>,
    /// `X-Page`.
    pub current_page: Option<u32>,
    /// `X-Next-Page`.
    pub next_page: Option<u32>,
    /// `X-Prev-Page`.
    pub prev_page: Option<u32>,
    /// `X-Per-Page`.
    pub per_page: Option<u32>,
    /// `X-Total`. Omitted by the server for very large collections.
    pub total: Option<u64>,
    /// `X-Total-Pages`.
    pub total_pages: Option<u32>,
}

impl PaginationInfo {
    /// Builds pagination info from lowercase response headers.
    #[must_use]
    pub fn from_headers(headers: &HashMap<String, Vec<String>>) -> Self {
        let mut info = headers
            .get("link")
            .map(|values| Self::parse_link_header(&values.join(",")))
            .unwrap_or_default();

        info.current_page = numeric_header(headers, "x-page");
        info.next_page = numeric_header(headers, "x-next-page");
        info.prev_page = numeric_header(headers, "x-prev-page");
        info.per_page = numeric_header(headers, "x-per-page");
        info.total = numeric_header(headers, "x-total");
        info.total_pages = numeric_header(headers, "x-total-pages");
        info
    }

    /// Parses the `next` and `prev` URLs from a Link header value.
    ///
    /// The format is `<url>; rel="next", <url>; rel="first"`.
    #[must_use]
    pub fn parse_link_header(header_value: &str) -> Self {
        let mut result = Self::default();

        for link in header_value.split(',') {
            let mut parts = link.trim().split(';');
            let Some(url) = parts
                .next()
                .map(str::trim)
                .and_then(|s| s.strip_prefix('<'))
                .and_then(|s| s.strip_suffix('>'))
            else {
                continue;
            };

            let rel = parts.find_map(|part| {
                part.trim()
                    .strip_prefix("rel=")
                    .map(|value| value.trim_matches('"'))
            });

            match rel {
                Some("next") => result.next_link = Some(url.to_string()),
                Some("prev" | "previous") => result.prev_link = Some(url.to_string()),
                _ => {}
            }
        }

        result
    }
}

fn first_header<'a>(headers: &'a HashMap<String, Vec<String>>, name: &str) -> Option<&'a str> {
    headers
        .get(name)
        .and_then(|values| values.first())
        .map(|value| value.trim())
        .filter(|value| !value.is_empty())
}

fn numeric_header<T: std::str::FromStr>(
    headers: &HashMap<String, Vec<String>>,
    name: &str,
) -> Option<T> {
    first_header(headers, name).and_then(|value| value.parse().ok())
}

/// Parses a `Retry-After` value given either as delta seconds or as an
/// HTTP date. Dates in the past yield a zero delay; delays too large for a
/// [`Duration`] saturate to [`Duration::MAX`].
#[must_use]
pub fn parse_retry_after(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let value = value.trim();
    if let Ok(seconds) = value.parse::<f64>() {
        if seconds.is_nan() || seconds < 0.0 {
            return None;
        }
        return Some(Duration::try_from_secs_f64(seconds).unwrap_or(Duration::MAX));
    }

    let at = DateTime::parse_from_rfc2822(value).ok()?.with_timezone(&Utc);
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}

/// Parses a `RateLimit-Reset` value (Unix epoch seconds) into a delay.
#[must_use]
pub fn parse_rate_limit_reset(value: &str, now: DateTime<Utc>) -> Option<Duration> {
    let epoch = value.trim().parse::<i64>().ok()?;
    let at = Utc.timestamp_opt(epoch, 0).single()?;
    Some((at - now).to_std().unwrap_or(Duration::ZERO))
}

/// A response from the GitLab API.
#[derive(Clone, Debug)]
pub struct HttpResponse {
    /// The HTTP status code.
    pub code: u16,
    /// Response headers, keyed by lowercase name.
    pub headers: HashMap<String, Vec<String>>,
    /// The decoded body. `Null` when the body was empty.
    pub body: Value,
    /// Pagination metadata.
    pub pagination: PaginationInfo,
    /// Server-requested delay before retrying, from `Retry-After` or
    /// `RateLimit-Reset`.
    pub retry_after: Option<Duration>,
}

impl HttpResponse {
    /// Creates a new `HttpResponse`, parsing pagination and rate-limit headers.
    #[must_use]
    pub fn new(code: u16, headers: HashMap<String, Vec<String>>, body: Value) -> Self {
        let now = Utc::now();
        let pagination = PaginationInfo::from_headers(&headers);
        let retry_after = first_header(&headers, "retry-after")
            .and_then(|value| parse_retry_after(value, now))
            .or_else(|| {
                first_header(&headers, "ratelimit-reset")
                    .and_then(|value| parse_rate_limit_reset(value, now))
            });

        Self {
            code,
            headers,
            body,
            pagination,
            retry_after,
        }
    }

    /// Returns `true` if the response status code is in the 2xx range.
    #[must_use]
    pub const fn is_ok(&self) -> bool {
        self.code >= 200 && self.code <= 299
    }

    /// Returns the first value of a header.
    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        first_header(&self.headers, &name.to_lowercase())
    }

    /// Returns the `X-Request-Id` header value, if present.
    #[must_use]
    pub fn request_id(&self) -> Option<&str> {
        first_header(&self.headers, "x-request-id")
    }

    /// Extracts a readable error message from the body.
    ///
    /// Uses the JSON `message` field, then `error`, then the raw body.
    #[must_use]
    pub fn error_message(&self) -> String {
        let field = ["message", "error"]
            .iter()
            .find_map(|key| self.body.get(key));

        match (field, &self.body) {
            (Some(Value::String(message)), _) => message.clone(),
            (Some(other), _) => other.to_string(),
            (None, Value::String(raw)) => raw.clone(),
            (None, Value::Null) => String::new(),
            (None, other) => other.to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn headers(pairs: &[(&str, &str)]) -> HashMap<String, Vec<String>> {
        pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), vec![(*v).to_string()]))
            .collect()
    }

    #[test]
    fn test_is_ok_only_for_2xx() {
        assert!(HttpResponse::new(200, HashMap::new(), json!({})).is_ok());
        assert!(HttpResponse::new(204, HashMap::new(), Value::Null).is_ok());
        assert!(!HttpResponse::new(404, HashMap::new(), json!({})).is_ok());
        assert!(!HttpResponse::new(500, HashMap::new(), json!({})).is_ok());
    }

    #[test]
    fn test_link_header_parsing() {
        let info = PaginationInfo::parse_link_header(
            r#"<https://gitlab.example.com/api/v4/projects?page=1>; rel="prev", <https://gitlab.example.com/api/v4/projects?page=3>; rel="next", <https://gitlab.example.com/api/v4/projects?page=1>; rel="first""#,
        );
        assert_eq!(
            info.next_link.as_deref(),
            Some("https://gitlab.example.com/api/v4/projects?page=3")
        );
        assert_eq!(
            info.prev_link.as_deref(),
            Some("https://gitlab.example.com/api/v4/projects?page=1")
        );
    }

    #[test]
    fn test_pagination_headers_parsed() {
        let response = HttpResponse::new(
            200,
            headers(&[
                ("x-page", "2"),
                ("x-next-page", "3"),
                ("x-prev-page", "1"),
                ("x-per-page", "10"),
                ("x-total", "25"),
                ("x-total-pages", "3"),
            ]),
            json!([]),
        );
        let info = response.pagination;
        assert_eq!(info.current_page, Some(2));
        assert_eq!(info.next_page, Some(3));
        assert_eq!(info.prev_page, Some(1));
        assert_eq!(info.per_page, Some(10));
        assert_eq!(info.total, Some(25));
        assert_eq!(info.total_pages, Some(3));
        assert!(info.next_link.is_none());
    }

    #[test]
    fn test_empty_or_malformed_pagination_headers_are_none() {
        let response = HttpResponse::new(
            200,
            headers(&[("x-next-page", ""), ("x-total", "lots"), ("x-page", "-1")]),
            json!([]),
        );
        assert_eq!(response.pagination.next_page, None);
        assert_eq!(response.pagination.total, None);
        assert_eq!(response.pagination.current_page, None);
    }

    #[test]
    fn test_retry_after_seconds() {
        let response = HttpResponse::new(429, headers(&[("retry-after", "2")]), json!({}));
        assert_eq!(response.retry_after, Some(Duration::from_secs(2)));
    }

    #[test]
    fn test_oversized_retry_after_saturates() {
        let response = HttpResponse::new(429, headers(&[("retry-after", "1e30")]), json!({}));
        assert_eq!(response.retry_after, Some(Duration::MAX));

        let now = Utc::now();
        assert_eq!(parse_retry_after("inf", now), Some(Duration::MAX));
        assert_eq!(parse_retry_after("NaN", now), None);
        assert_eq!(parse_retry_after("-3", now), None);
        assert_eq!(parse_retry_after("0.5", now), Some(Duration::from_millis(500)));
    }

    #[test]
    fn test_retry_after_http_date() {
        let now = Utc.with_ymd_and_hms(2015, 10, 21, 7, 27, 50).unwrap();
        let delay = parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT", now);
        assert_eq!(delay, Some(Duration::from_secs(10)));

        let later = Utc.with_ymd_and_hms(2015, 10, 21, 8, 0, 0).unwrap();
        assert_eq!(
            parse_retry_after("Wed, 21 Oct 2015 07:28:00 GMT", later),
            Some(Duration::ZERO)
        );
        assert_eq!(parse_retry_after("soon", now), None);
    }

    #[test]
    fn test_rate_limit_reset_epoch() {
        let now = Utc.timestamp_opt(1_700_000_000, 0).unwrap();
        assert_eq!(
            parse_rate_limit_reset("1700000005", now),
            Some(Duration::from_secs(5))
        );
        assert_eq!(parse_rate_limit_reset("x", now), None);
    }

    #[test]
    fn test_request_id_and_header_lookup() {
        let response = HttpResponse::new(
            200,
            headers(&[("x-request-id", "abc-123"), ("content-type", "application/json")]),
            json!({}),
        );
        assert_eq!(response.request_id(), Some("abc-123"));
        assert_eq!(response.header("Content-Type"), Some("application/json"));
    }

    #[test]
    fn test_error_message_extraction() {
        let with_message = HttpResponse::new(400, HashMap::new(), json!({"message": "bad"}));
        assert_eq!(with_message.error_message(), "bad");

        let with_error = HttpResponse::new(401, HashMap::new(), json!({"error": "invalid_token"}));
        assert_eq!(with_error.error_message(), "invalid_token");

        let structured = HttpResponse::new(
            422,
            HashMap::new(),
            json!({"message": {"name": ["is taken"]}}),
        );
        assert_eq!(structured.error_message(), r#"{"name":["is taken"]}"#);

        let raw = HttpResponse::new(502, HashMap::new(), Value::String("Bad Gateway".into()));
        assert_eq!(raw.error_message(), "Bad Gateway");
    }
}

//! Fixed response header set and CORS preflight handling.

use axum::body::Body;
use axum::extract::{Request, State};
use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use std::sync::Arc;

use crate::telemetry::SynthProfile;

use super::endpoint::{method_list, profile_methods};
use super::AppState;

const ALLOW_HEADERS: &str = "Content-Type, Authorization";
const CACHE_CONTROL: &str = "s-maxage=5, stale-while-revalidate=10";

/// Headers written onto every response for `profile`.
pub fn header_set(profile: &SynthProfile) -> Vec<(HeaderName, HeaderValue)> {
    let methods = method_list(&profile_methods(profile));
    let mut headers = vec![
        (header::ACCESS_CONTROL_ALLOW_ORIGIN, HeaderValue::from_static("*")),
        (
            header::ACCESS_CONTROL_ALLOW_METHODS,
            HeaderValue::from_str(&methods).unwrap_or_else(|_| HeaderValue::from_static("GET, OPTIONS")),
        ),
        (header::ACCESS_CONTROL_ALLOW_HEADERS, HeaderValue::from_static(ALLOW_HEADERS)),
        (header::CACHE_CONTROL, HeaderValue::from_static(CACHE_CONTROL)),
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("DENY")),
    ];

    if profile.extended_headers {
        headers.extend([
            (
                header::STRICT_TRANSPORT_SECURITY,
                HeaderValue::from_static("max-age=31536000; includeSubDomains"),
            ),
            (header::CONTENT_SECURITY_POLICY, HeaderValue::from_static("default-src 'none'")),
            (header::X_XSS_PROTECTION, HeaderValue::from_static("1; mode=block")),
            (
                header::REFERRER_POLICY,
                HeaderValue::from_static("strict-origin-when-cross-origin"),
            ),
        ]);
    } else {
        headers.push((
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000"),
        ));
    }
    headers
}

/// Answers preflight requests with an empty 200 and stamps the header set on
/// every other response, whatever produced it.
pub async fn apply_headers(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Response {
    let mut resp = if req.method() == Method::OPTIONS {
        crate::prom::record_request("preflight", 200);
        (StatusCode::OK, Body::empty()).into_response()
    } else {
        next.run(req).await
    };

    let headers = resp.headers_mut();
    for (name, value) in state.headers.iter() {
        headers.insert(name.clone(), value.clone());
    }
    resp
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::telemetry::profile::{BASIC, EXTENDED};

    fn find<'a>(set: &'a [(HeaderName, HeaderValue)], name: &HeaderName) -> Option<&'a str> {
        set.iter()
            .find(|(n, _)| n == name)
            .and_then(|(_, v)| v.to_str().ok())
    }

    #[test]
    fn basic_set() {
        let set = header_set(&BASIC);
        assert_eq!(find(&set, &header::ACCESS_CONTROL_ALLOW_ORIGIN), Some("*"));
        assert_eq!(find(&set, &header::ACCESS_CONTROL_ALLOW_METHODS), Some("GET, OPTIONS"));
        assert_eq!(find(&set, &header::STRICT_TRANSPORT_SECURITY), Some("max-age=31536000"));
        assert!(find(&set, &header::CONTENT_SECURITY_POLICY).is_none());
    }

    #[test]
    fn extended_set_adds_security_headers() {
        let set = header_set(&EXTENDED);
        assert_eq!(find(&set, &header::ACCESS_CONTROL_ALLOW_METHODS), Some("GET, POST, OPTIONS"));
        assert!(find(&set, &header::CONTENT_SECURITY_POLICY).is_some());
        assert!(find(&set, &header::X_XSS_PROTECTION).is_some());
        assert!(find(&set, &header::REFERRER_POLICY).is_some());
        assert_eq!(
            set.iter().filter(|(n, _)| n == header::STRICT_TRANSPORT_SECURITY).count(),
            1
        );
    }
}

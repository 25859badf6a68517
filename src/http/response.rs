//! Response shaping for the asset port.
//!
//! # Responsibilities
//! - Disable client caching on routed responses
//! - Build rendered-template and favicon responses
//! - Rewrite static-layer redirects back to the URL the client asked for
//! - Apply configured MIME overrides
//!
//! # Design Decisions
//! - Helpers operate on already-built responses, so the static layer stays
//!   unaware of routing

use axum::{
    body::{Body, Bytes},
    http::{header, HeaderMap, HeaderValue, Method, StatusCode},
    response::Response,
};
use std::collections::HashMap;
use std::path::Path;

/// `Cache-Control` value for every routed GET/HEAD response.
pub const NO_CACHE: &str = "no-cache, no-store, max-age=0";

/// `Cache-Control` value for the favicon.
pub const FAVICON_CACHE: &str = "public, max-age=86400";

pub fn set_no_cache(headers: &mut HeaderMap) {
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(NO_CACHE));
}

/// 200 response carrying a rendered template.
pub fn render_response(body: String) -> Response {
    let mut response = Response::new(Body::from(body));
    let headers = response.headers_mut();
    headers.insert(
        header::CONTENT_TYPE,
        HeaderValue::from_static("text/html; charset=utf-8"),
    );
    set_no_cache(headers);
    response
}

/// 400 for a routed target that cannot be expressed as a URI.
pub fn bad_target_response() -> Response {
    let mut response = Response::new(Body::from("Bad request target"));
    *response.status_mut() = StatusCode::BAD_REQUEST;
    set_no_cache(response.headers_mut());
    response
}

/// Favicon served from memory. HEAD gets headers only.
pub fn favicon_response(icon: &Bytes, method: &Method) -> Response {
    let body = if method == Method::HEAD {
        Body::empty()
    } else {
        Body::from(icon.clone())
    };

    let mut response = Response::new(body);
    let headers = response.headers_mut();
    headers.insert(header::CONTENT_TYPE, HeaderValue::from_static("image/x-icon"));
    headers.insert(header::CACHE_CONTROL, HeaderValue::from_static(FAVICON_CACHE));
    headers.insert(header::CONTENT_LENGTH, HeaderValue::from(icon.len()));
    response
}

/// Point a trailing-slash redirect for `effective_path` at `original_path`.
///
/// The static layer redirects `/public/docs` to `/public/docs/`; the client
/// asked for `/docs`, so it must be sent to `/docs/`.
pub fn restore_redirect(response: &mut Response, effective_path: &str, original_path: &str) {
    if !response.status().is_redirection() {
        return;
    }

    let Some(location) = response
        .headers()
        .get(header::LOCATION)
        .and_then(|value| value.to_str().ok())
    else {
        return;
    };

    let expected = format!("{}/", effective_path.trim_end_matches('/'));
    let Some(rest) = location.strip_prefix(&expected) else {
        return;
    };

    let restored = format!("{}/{}", original_path.trim_end_matches('/'), rest);
    match HeaderValue::from_str(&restored) {
        Ok(value) => {
            tracing::debug!(from = location, to = %restored, "Redirect restored");
            response.headers_mut().insert(header::LOCATION, value);
        }
        Err(e) => tracing::warn!(location = %restored, error = %e, "Unusable redirect target"),
    }
}

/// Replace `Content-Type` when the served path's extension is overridden.
pub fn apply_mime_override(
    response: &mut Response,
    path: &str,
    overrides: &HashMap<String, HeaderValue>,
) {
    if overrides.is_empty() || !response.status().is_success() {
        return;
    }

    let mime = Path::new(path)
        .extension()
        .and_then(|ext| ext.to_str())
        .and_then(|ext| overrides.get(&ext.to_ascii_lowercase()));

    if let Some(mime) = mime {
        response.headers_mut().insert(header::CONTENT_TYPE, mime.clone());
    }
}

//! Per-request broker context

use axum::{extract::Request, http::HeaderMap, middleware::Next, response::Response};
use regex::Regex;
use std::sync::OnceLock;

use servicebroker_core::RequestContext;

static REGION_HEADER: OnceLock<Regex> = OnceLock::new();

fn region_header() -> &'static Regex {
    REGION_HEADER.get_or_init(|| {
        Regex::new(r"(?i)^x(-*[a-z]*)-region$").expect("region header pattern is valid")
    })
}

/// Build the context from the first `X-*-Region` style header, if any
pub fn context_from_headers(headers: &HeaderMap) -> RequestContext {
    let region = headers
        .iter()
        .find(|(name, _)| region_header().is_match(name.as_str()))
        .map(|(_, value)| String::from_utf8_lossy(value.as_bytes()).into_owned());

    RequestContext { region }
}

/// Attach a [`RequestContext`] extension for the handlers
pub async fn attach_request_context(mut request: Request, next: Next) -> Response {
    let ctx = context_from_headers(request.headers());
    request.extensions_mut().insert(ctx);
    next.run(request).await
}

//! Router assembly: routes, security headers, CORS, rate limiting and the
//! request body limit.

use crate::errors::{AppError, INTERNAL_SERVER_ERROR};
use crate::handlers::{self, AppState};
use axum::{
    http::{header, HeaderName, HeaderValue, Method},
    response::{IntoResponse, Response},
    routing::{get, post},
    Router,
};
use std::any::Any;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_governor::{
    governor::GovernorConfigBuilder, key_extractor::PeerIpKeyExtractor, GovernorError,
    GovernorLayer,
};
use tower_http::{
    catch_panic::CatchPanicLayer,
    cors::{AllowOrigin, CorsLayer},
    limit::RequestBodyLimitLayer,
    set_header::SetResponseHeaderLayer,
    trace::TraceLayer,
};

/// Largest accepted request body.
pub const MAX_BODY_BYTES: usize = 10 * 1024;

/// Rate limit window: 100 requests per 15 minutes per client IP, i.e. a burst
/// of 100 refilled at one request every 9 seconds.
const RATE_LIMIT_BURST: u32 = 100;
const RATE_LIMIT_REPLENISH_SECS: u64 = 9;

const CSP_POLICY: &str = "default-src 'self';base-uri 'self';font-src 'self' https: data:;\
form-action 'self';frame-ancestors 'self';img-src 'self' data:;object-src 'none';script-src 'self';\
script-src-attr 'none';style-src 'self' https: 'unsafe-inline';upgrade-insecure-requests";

/// Response headers set on every response unless a handler already set them.
fn security_headers() -> Vec<(HeaderName, HeaderValue)> {
    vec![
        (
            header::CONTENT_SECURITY_POLICY,
            HeaderValue::from_static(CSP_POLICY),
        ),
        (
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ),
        (
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("same-origin"),
        ),
        (
            HeaderName::from_static("origin-agent-cluster"),
            HeaderValue::from_static("?1"),
        ),
        (header::REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        (
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=31536000; includeSubDomains"),
        ),
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_DNS_PREFETCH_CONTROL, HeaderValue::from_static("off")),
        (
            HeaderName::from_static("x-download-options"),
            HeaderValue::from_static("noopen"),
        ),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
        (
            HeaderName::from_static("x-permitted-cross-domain-policies"),
            HeaderValue::from_static("none"),
        ),
        (header::X_XSS_PROTECTION, HeaderValue::from_static("0")),
    ]
}

fn cors_layer(allowed_origin: &str) -> anyhow::Result<CorsLayer> {
    let origin = if allowed_origin == "*" {
        AllowOrigin::any()
    } else {
        let value = HeaderValue::from_str(allowed_origin)
            .map_err(|_| anyhow::anyhow!("ALLOWED_ORIGIN is not a valid header value"))?;
        AllowOrigin::exact(value)
    };

    Ok(CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::POST, Method::GET, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION]))
}

/// Answers rejected requests with the JSON error body, keeping the
/// `x-ratelimit-*` headers the limiter attached.
fn rate_limit_response(error: GovernorError) -> Response {
    match error {
        GovernorError::TooManyRequests { wait_time, headers } => {
            tracing::info!("Rate limit exceeded, quota resets in {}s", wait_time);
            let mut response = AppError::TooManyRequests.into_response();
            if let Some(headers) = headers {
                response.headers_mut().extend(headers);
            }
            response
        }
        GovernorError::UnableToExtractKey => {
            AppError::InternalError("Rate limiter could not determine the client IP".to_string())
                .into_response()
        }
        GovernorError::Other { code, msg, .. } => AppError::InternalError(format!(
            "Rate limiter error {}: {}",
            code,
            msg.unwrap_or_default()
        ))
        .into_response(),
    }
}

fn handle_panic(err: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = err.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = err.downcast_ref::<&str>() {
        s.to_string()
    } else {
        "unknown panic".to_string()
    };
    tracing::error!("Handler panicked: {}", detail);
    AppError::InternalError(INTERNAL_SERVER_ERROR.to_string()).into_response()
}

/// Builds the full application router.
///
/// Health checks bypass the rate limiter so that platform probes are never
/// throttled. The rate limiter keys on the peer address of the connection, so
/// the router must be served with connect info. Forwarding headers are ignored
/// because any client can set them.
pub fn build_app(state: Arc<AppState>, allowed_origin: &str) -> anyhow::Result<Router> {
    let governor_conf = Arc::new(
        GovernorConfigBuilder::default()
            .per_second(RATE_LIMIT_REPLENISH_SECS)
            .burst_size(RATE_LIMIT_BURST)
            .key_extractor(PeerIpKeyExtractor)
            .use_headers()
            .error_handler(rate_limit_response)
            .finish()
            .ok_or_else(|| anyhow::anyhow!("Invalid rate limiter configuration"))?,
    );

    let api_routes = Router::new()
        .route("/api/lead", post(handlers::submit_lead))
        .layer(
            ServiceBuilder::new()
                .layer(RequestBodyLimitLayer::new(MAX_BODY_BYTES))
                .layer(GovernorLayer {
                    config: governor_conf,
                }),
        );

    let mut app = Router::new()
        .route("/", get(handlers::health))
        .route("/health", get(handlers::health))
        .merge(api_routes)
        .fallback(handlers::not_found)
        .with_state(state);

    for (name, value) in security_headers() {
        app = app.layer(SetResponseHeaderLayer::if_not_present(name, value));
    }

    Ok(app
        .layer(CatchPanicLayer::custom(handle_panic))
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer(allowed_origin)?))
}

use std::sync::Arc;

use axum::http::{header, HeaderName, HeaderValue, Method, StatusCode};
use axum::middleware;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::Router;
use tower_governor::governor::GovernorConfigBuilder;
use tower_governor::key_extractor::SmartIpKeyExtractor;
use tower_governor::GovernorLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::set_header::SetResponseHeaderLayer;
use tower_http::trace::TraceLayer;

use crate::config::AppConfig;
use crate::errors::AppError;
use crate::handlers;
use crate::state::AppState;

pub fn router(state: Arc<AppState>) -> Router {
    let cors = cors_layer(&state.config.cors_origins);

    let api = Router::new()
        .route("/artifacts", get(handlers::artifacts::list_artifacts))
        .route("/artifacts/:id", get(handlers::artifacts::get_artifact))
        .route("/available-dates", get(handlers::bookings::get_available_dates))
        .route("/bookings", post(handlers::bookings::create_booking))
        .route("/inquiries", post(handlers::contact::submit_inquiry))
        .route("/submit-logbook", post(handlers::contact::submit_logbook));
    let api = rate_limited(api, &state.config);

    let mut app = Router::new()
        .route("/health", get(handlers::health::health))
        .nest("/api", api)
        .layer(cors)
        .with_state(Arc::clone(&state));

    for (name, value) in security_headers(&state.config.cors_origins) {
        app = app.layer(SetResponseHeaderLayer::if_not_present(name, value));
    }

    app.layer(TraceLayer::new_for_http())
}

fn cors_layer(origins: &[String]) -> CorsLayer {
    let origins: Vec<HeaderValue> = origins
        .iter()
        .filter_map(|o| match HeaderValue::from_str(o) {
            Ok(v) => Some(v),
            Err(_) => {
                tracing::warn!(origin = %o, "ignoring invalid CORS origin");
                None
            }
        })
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

/// Limits each client address to `rate_limit_max` requests per
/// `rate_limit_window`, refilling one request every `window / max`.
fn rate_limited(api: Router<Arc<AppState>>, config: &AppConfig) -> Router<Arc<AppState>> {
    let max = config.rate_limit_max.max(1);
    let governor = GovernorConfigBuilder::default()
        .key_extractor(SmartIpKeyExtractor)
        .period(config.rate_limit_window / max)
        .burst_size(max)
        .finish();

    let Some(governor) = governor else {
        tracing::warn!(
            max,
            window_secs = config.rate_limit_window.as_secs(),
            "invalid rate limit settings, requests will not be limited"
        );
        return api;
    };

    api.layer(GovernorLayer {
        config: Arc::new(governor),
    })
    .layer(middleware::map_response(rate_limit_body))
}

/// Replaces the limiter's plain-text rejection with the JSON error body,
/// keeping its retry headers.
async fn rate_limit_body(response: Response) -> Response {
    if response.status() != StatusCode::TOO_MANY_REQUESTS {
        return response;
    }

    let (parts, _) = response.into_parts();
    let mut limited =
        AppError::RateLimited("Too many requests, please try again later.".to_string())
            .into_response();
    for (name, value) in parts.headers.iter() {
        if name != header::CONTENT_TYPE && name != header::CONTENT_LENGTH {
            limited.headers_mut().insert(name.clone(), value.clone());
        }
    }
    limited
}

fn security_headers(origins: &[String]) -> Vec<(HeaderName, HeaderValue)> {
    let connect_src = std::iter::once("'self'")
        .chain(origins.iter().map(String::as_str))
        .collect::<Vec<_>>()
        .join(" ");
    let csp = format!(
        "default-src 'self'; script-src 'self' 'unsafe-eval' 'unsafe-inline'; \
         style-src 'self' 'unsafe-inline'; img-src 'self' data: https:; \
         connect-src {connect_src}; font-src 'self' https: data:; object-src 'none'; \
         media-src 'self'; frame-src 'self'; base-uri 'self'; form-action 'self'; \
         frame-ancestors 'self'; upgrade-insecure-requests"
    );
    let csp = HeaderValue::from_str(&csp).unwrap_or_else(|_| {
        tracing::warn!("CORS origins are not valid in a CSP header, using default-src only");
        HeaderValue::from_static("default-src 'self'")
    });

    vec![
        (header::CONTENT_SECURITY_POLICY, csp),
        (header::X_CONTENT_TYPE_OPTIONS, HeaderValue::from_static("nosniff")),
        (header::X_FRAME_OPTIONS, HeaderValue::from_static("SAMEORIGIN")),
        (header::REFERRER_POLICY, HeaderValue::from_static("no-referrer")),
        (
            header::STRICT_TRANSPORT_SECURITY,
            HeaderValue::from_static("max-age=15552000; includeSubDomains"),
        ),
        (header::X_DNS_PREFETCH_CONTROL, HeaderValue::from_static("off")),
        (
            HeaderName::from_static("cross-origin-resource-policy"),
            HeaderValue::from_static("cross-origin"),
        ),
        (
            HeaderName::from_static("cross-origin-opener-policy"),
            HeaderValue::from_static("same-origin"),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_csp_allows_configured_origins() {
        let headers = security_headers(&["https://museo.example".to_string()]);
        let (_, csp) = headers
            .iter()
            .find(|(name, _)| name == header::CONTENT_SECURITY_POLICY)
            .unwrap();
        let csp = csp.to_str().unwrap();
        assert!(csp.contains("connect-src 'self' https://museo.example;"));
        assert!(csp.contains("object-src 'none'"));
    }

    #[tokio::test]
    async fn test_rate_limit_body_rewrites_429() {
        let response = (
            StatusCode::TOO_MANY_REQUESTS,
            [(header::RETRY_AFTER, "9")],
            "Too Many Requests! Wait for 9s",
        )
            .into_response();

        let rewritten = rate_limit_body(response).await;
        assert_eq!(rewritten.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(rewritten.headers()[header::RETRY_AFTER], "9");
        assert_eq!(
            rewritten.headers()[header::CONTENT_TYPE],
            "application/json"
        );

        let body = axum::body::to_bytes(rewritten.into_body(), usize::MAX)
            .await
            .unwrap();
        let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
        assert_eq!(json["message"], "Too many requests, please try again later.");
    }

    #[tokio::test]
    async fn test_rate_limit_body_passes_other_responses() {
        let response = StatusCode::CREATED.into_response();
        assert_eq!(rate_limit_body(response).await.status(), StatusCode::CREATED);
    }
}

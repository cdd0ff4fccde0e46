use axum::{
    http::header::{HeaderValue, ACCEPT, CONTENT_TYPE},
    http::{HeaderName, Method, Request, Response},
    routing::get,
    Router,
};
use std::time::Duration;
use tower_http::{
    cors::{AllowOrigin, Any, CorsLayer},
    normalize_path::NormalizePath,
    request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};
use tracing::Span;

use crate::api::{ai, examiner, exams, handlers, leaderboard};
use crate::core::{config::Settings, state::AppState};

/// The served application. Trailing slashes are trimmed before routing, since a
/// `Router::layer` only sees requests that already matched a route.
pub(crate) type App = NormalizePath<Router>;

pub(crate) fn app(state: AppState) -> App {
    NormalizePath::trim_trailing_slash(router(state))
}

fn router(state: AppState) -> Router {
    let cors = build_cors_layer(state.settings());
    let prefix = state.settings().api().prefix.clone();
    let api = Router::new()
        .merge(ai::router())
        .merge(exams::router())
        .merge(leaderboard::router())
        .nest("/examiner", examiner::router());

    let request_id_header = HeaderName::from_static("x-request-id");
    let request_id_header_for_span = request_id_header.clone();
    let trace_layer = TraceLayer::new_for_http()
        .make_span_with(move |request: &Request<_>| {
            let request_id = request
                .headers()
                .get(&request_id_header_for_span)
                .and_then(|value| value.to_str().ok())
                .unwrap_or("-");
            tracing::info_span!(
                "request",
                method = %request.method(),
                uri = %request.uri(),
                request_id = %request_id
            )
        })
        .on_response(|response: &Response<axum::body::Body>, latency: Duration, _span: &Span| {
            let status_label = response.status().as_u16().to_string();
            metrics::counter!(
                "http_requests_total",
                "status" => status_label.clone()
            )
            .increment(1);
            metrics::histogram!(
                "http_request_duration_seconds",
                "status" => status_label
            )
            .record(latency.as_secs_f64());
        });

    let mut router: Router<AppState> = Router::new()
        .route("/", get(handlers::root))
        .route("/healthz", get(handlers::healthz).head(handlers::healthz));

    // `nest` rejects an empty path, so an unprefixed API is merged at the root.
    router = if prefix.is_empty() { router.merge(api) } else { router.nest(&prefix, api) };

    router = router
        .layer(PropagateRequestIdLayer::new(request_id_header.clone()))
        .layer(SetRequestIdLayer::new(request_id_header, MakeRequestUuid))
        .layer(trace_layer)
        .layer(cors);

    if state.settings().telemetry().prometheus_enabled {
        router = router.route("/metrics", get(handlers::metrics));
    }

    router.with_state(state)
}

fn build_cors_layer(settings: &Settings) -> CorsLayer {
    let origins = settings
        .cors()
        .origins
        .iter()
        .filter_map(|origin| HeaderValue::from_str(origin).ok())
        .collect::<Vec<_>>();

    let allow_origin =
        if origins.is_empty() { AllowOrigin::from(Any) } else { AllowOrigin::list(origins) };

    CorsLayer::new()
        .allow_methods([Method::GET, Method::POST, Method::DELETE])
        .allow_headers([CONTENT_TYPE, ACCEPT])
        .allow_origin(allow_origin)
}

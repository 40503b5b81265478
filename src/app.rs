use std::net::SocketAddr;

use axum::{
    http::{Request, Response},
    routing::get,
    Router,
};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{field, info, info_span, Span};

use crate::state::AppState;
use crate::{analysis, auth, meals, plans, profile, tracking};

/// Everything under `/api/v1`.
fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(|| async { "ok" }))
        .merge(auth::router())
        .merge(profile::router())
        .merge(analysis::router())
        .merge(meals::router())
        .merge(tracking::router())
        .merge(plans::router())
}

pub fn build_app(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", api_routes())
        .with_state(state)
        .layer(CorsLayer::permissive())
        .layer(
            TraceLayer::new_for_http()
                // Query strings stay out of the span; they carry client offsets and dates.
                .make_span_with(|req: &Request<_>| {
                    info_span!(
                        "http_request",
                        method = %req.method(),
                        path = %req.uri().path(),
                        status = field::Empty,
                        latency_ms = field::Empty
                    )
                })
                .on_response(|res: &Response<_>, latency: std::time::Duration, span: &Span| {
                    let status = res.status();
                    span.record("status", field::display(status));
                    span.record("latency_ms", latency.as_millis() as u64);
                    if status.is_server_error() {
                        tracing::error!(%status, "request failed");
                    } else {
                        tracing::debug!(%status, "request done");
                    }
                }),
        )
}

/// Serve until Ctrl-C, letting in-flight requests (and their meal-log
/// transactions) finish.
pub async fn serve(app: Router, addr: SocketAddr) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!(%addr, "listening");
    axum::serve(listener, app)
        .with_graceful_shutdown(async {
            if tokio::signal::ctrl_c().await.is_ok() {
                info!("shutdown requested");
            }
        })
        .await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use axum_test::TestServer;

    #[tokio::test]
    async fn health_is_public() {
        let server = TestServer::new(build_app(AppState::fake())).unwrap();
        let res = server.get("/api/v1/health").await;
        res.assert_status_ok();
        assert_eq!(res.text(), "ok");
    }

    #[tokio::test]
    async fn routes_live_under_api_v1() {
        let server = TestServer::new(build_app(AppState::fake())).unwrap();
        server
            .get("/health")
            .await
            .assert_status(StatusCode::NOT_FOUND);
    }
}

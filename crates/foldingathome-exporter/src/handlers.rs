//! HTTP routes: the metrics endpoint and a landing page.

use std::sync::Arc;

use axum::Router;
use axum::extract::State;
use axum::http::{StatusCode, header};
use axum::response::{Html, IntoResponse, Response};
use axum::routing::get;
use tower_http::compression::CompressionLayer;
use tracing::{debug, error};

use foldingathome_core::client::Connector;
use foldingathome_core::metrics::{MetricRecord, TEXT_CONTENT_TYPE, encode_text};

use crate::state::SharedState;

/// Builds the router.
///
/// Every path other than the metrics path serves the landing page, unless
/// metrics live at `/`.
pub(crate) fn router<C: Connector + 'static>(state: SharedState<C>) -> Router {
    let mut app = Router::new().route(&state.metrics_path, get(handle_metrics::<C>));
    if state.metrics_path != "/" {
        app = app.fallback(handle_index::<C>);
    }
    app.with_state(state).layer(CompressionLayer::new())
}

// ============================================================
// Metrics
// ============================================================

/// Polls the FAHClient and renders the result.
///
/// The poll does blocking socket I/O, so it runs on the blocking pool.
pub(crate) async fn handle_metrics<C: Connector + 'static>(
    State(state): State<SharedState<C>>,
) -> Response {
    let poll_state = Arc::clone(&state);
    let result = tokio::task::spawn_blocking(move || {
        let mut records: Vec<MetricRecord> = Vec::new();
        let report = poll_state.collector.collect(&mut records);
        debug!(
            up = report.up,
            records = records.len(),
            elapsed_ms = report.elapsed.as_millis() as u64,
            "poll finished"
        );
        encode_text(poll_state.collector.descriptors(), &records)
    })
    .await;

    match result {
        Ok(Ok(body)) => ([(header::CONTENT_TYPE, TEXT_CONTENT_TYPE)], body).into_response(),
        Ok(Err(e)) => {
            error!(error = %e, "failed to render metrics");
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
        Err(e) => {
            error!(error = %e, "metrics poll task failed");
            (StatusCode::INTERNAL_SERVER_ERROR, "poll failed").into_response()
        }
    }
}

// ============================================================
// Landing page
// ============================================================

pub(crate) async fn handle_index<C: Connector + 'static>(
    State(state): State<SharedState<C>>,
) -> Html<String> {
    Html(format!(
        "<html>\n\
         <head><title>Folding@home Exporter</title></head>\n\
         <body>\n\
         <h1>Folding@home Exporter</h1>\n\
         <p><a href=\"{}\">Metrics</a></p>\n\
         </body>\n\
         </html>\n",
        state.metrics_path
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::state::AppState;

    use axum::body::Body;
    use axum::http::Request;
    use foldingathome_core::client::MockConnector;
    use foldingathome_core::collector::Collector;
    use foldingathome_core::metrics::MetricDescriptors;
    use http_body_util::BodyExt;
    use tower::ServiceExt;

    fn app(connector: MockConnector, metrics_path: &str) -> Router {
        router(Arc::new(AppState {
            collector: Collector::new(connector, Arc::new(MetricDescriptors::new())),
            metrics_path: metrics_path.to_string(),
        }))
    }

    async fn get_text(app: Router, uri: &str) -> (StatusCode, Option<String>, String) {
        let response = app
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        let status = response.status();
        let content_type = response
            .headers()
            .get(header::CONTENT_TYPE)
            .map(|v| v.to_str().unwrap().to_string());
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, content_type, String::from_utf8(bytes.to_vec()).unwrap())
    }

    #[tokio::test]
    async fn test_metrics_typical_client() {
        let (status, content_type, body) =
            get_text(app(MockConnector::typical_client(), "/metrics"), "/metrics").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(TEXT_CONTENT_TYPE));
        assert!(body.contains("# TYPE foldingathome_up gauge"));
        assert!(body.contains("foldingathome_up 1"));
        assert!(body.contains(r#"foldingathome_version{version="7.6.9"} 1"#));
        assert!(body.contains("foldingathome_uptime_seconds 52262"));
    }

    #[tokio::test]
    async fn test_metrics_unreachable_client() {
        let (status, _, body) =
            get_text(app(MockConnector::unreachable(), "/metrics"), "/metrics").await;

        // An unreachable client is still a successful scrape.
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("foldingathome_up 0"));
        assert!(!body.contains("foldingathome_uptime_seconds"));
        assert!(!body.contains("foldingathome_slot_status"));
    }

    #[tokio::test]
    async fn test_custom_telemetry_path() {
        let app = app(MockConnector::idle_client(), "/fah");

        let (status, _, body) = get_text(app.clone(), "/fah").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains("foldingathome_slot_status"));

        let (status, _, body) = get_text(app, "/").await;
        assert_eq!(status, StatusCode::OK);
        assert!(body.contains(r#"<a href="/fah">Metrics</a>"#));
    }

    #[tokio::test]
    async fn test_unknown_paths_serve_landing_page() {
        let app = app(MockConnector::unreachable(), "/metrics");

        for uri in ["/", "/index.html", "/fah", "/metrics/extra"] {
            let (status, content_type, body) = get_text(app.clone(), uri).await;
            assert_eq!(status, StatusCode::OK, "{uri}");
            assert!(content_type.unwrap().starts_with("text/html"), "{uri}");
            assert!(body.contains(r#"<a href="/metrics">Metrics</a>"#), "{uri}");
            assert!(!body.contains("foldingathome_up"), "{uri}");
        }
    }

    #[tokio::test]
    async fn test_metrics_at_root() {
        let (status, content_type, body) =
            get_text(app(MockConnector::idle_client(), "/"), "/").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(content_type.as_deref(), Some(TEXT_CONTENT_TYPE));
        assert!(body.contains("foldingathome_up 1"));
    }

    #[tokio::test]
    async fn test_metrics_gzip() {
        let response = app(MockConnector::typical_client(), "/metrics")
            .oneshot(
                Request::builder()
                    .uri("/metrics")
                    .header(header::ACCEPT_ENCODING, "gzip")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            response.headers().get(header::CONTENT_ENCODING).unwrap(),
            "gzip"
        );
    }

    #[tokio::test]
    async fn test_each_scrape_polls_once() {
        let connector = MockConnector::typical_client();
        let app = app(connector.clone(), "/metrics");

        get_text(app.clone(), "/metrics").await;
        get_text(app, "/metrics").await;

        assert_eq!(connector.opened(), 2);
        assert_eq!(connector.closed(), 2);
    }
}

//! Router, shared state, and request handlers.

use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::header::{CONTENT_TYPE, USER_AGENT};
use axum::http::{HeaderMap, HeaderValue, Method};
use axum::response::Html;
use axum::routing::{get, post};
use axum::{Json, Router};
use scorehook_core::{SubmissionRecord, ValidatorOptions, report};
use scorehook_notify::{Notifier, NotifierConfig};
use serde::Serialize;
use serde_json::Value;
use tower_http::compression::CompressionLayer;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{info, warn};

use crate::error::ApiError;

/// Immutable per-process state shared by every request.
pub struct AppState {
    pub options: ValidatorOptions,
    pub notifier_config: NotifierConfig,
    pub notifier: Arc<dyn Notifier>,
}

#[derive(Debug, Serialize)]
pub struct SubmitResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

pub fn router(state: Arc<AppState>, origins: Vec<HeaderValue>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([Method::POST])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/", get(index))
        .route("/apiv3/", post(submit))
        .layer(cors)
        .layer(CompressionLayer::new())
        .with_state(state)
}

async fn index() -> Html<String> {
    Html(format!(
        r#"<h1 style="text-align: center;">Running scorehook v{}</h1>"#,
        env!("CARGO_PKG_VERSION")
    ))
}

/// Validate a submission, render its report, and hand it to the notifier.
pub async fn submit(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SubmitResponse>, ApiError> {
    let result = process(&state, &headers, &body).await;
    if let Err(e) = &result {
        warn!(error = %e, status = e.status_code().as_u16(), "submission rejected");
    }
    result.map(|()| {
        Json(SubmitResponse {
            success: true,
            error: None,
        })
    })
}

async fn process(state: &AppState, headers: &HeaderMap, body: &[u8]) -> Result<(), ApiError> {
    let data: Value = serde_json::from_slice(body)?;
    if !data.is_object() {
        return Err(ApiError::NotAnObject);
    }

    let user_agent = headers.get(USER_AGENT).and_then(|v| v.to_str().ok());
    let record = SubmissionRecord::from_value(&data, user_agent, &state.options)?;
    info!(
        name = %record.name(),
        authenticity = ?record.authenticity(),
        edition = ?record.edition(),
        "submission accepted"
    );

    let content = report::render(&record).map_err(ApiError::Report)?;
    let payload = state.notifier_config.payload(content, record.name());
    state.notifier.post(&payload).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use axum::http::StatusCode;
    use axum::response::IntoResponse;
    use scorehook_core::digest::encode_digest;
    use scorehook_notify::{NotifyError, NotifyPayload};
    use serde_json::json;

    use super::*;

    #[derive(Default)]
    struct RecordingNotifier {
        sent: Mutex<Vec<NotifyPayload>>,
    }

    #[async_trait::async_trait]
    impl Notifier for RecordingNotifier {
        async fn post(&self, payload: &NotifyPayload) -> Result<(), NotifyError> {
            self.sent.lock().unwrap().push(payload.clone());
            Ok(())
        }
    }

    struct RejectingNotifier;

    #[async_trait::async_trait]
    impl Notifier for RejectingNotifier {
        async fn post(&self, _payload: &NotifyPayload) -> Result<(), NotifyError> {
            Err(NotifyError::Rejected {
                status: 404,
                body: "Unknown Webhook".into(),
            })
        }
    }

    fn state_with(notifier: Arc<dyn Notifier>) -> Arc<AppState> {
        Arc::new(AppState {
            options: ValidatorOptions::default(),
            notifier_config: NotifierConfig {
                url: "https://hooks.example/abc".into(),
                avatar_url: "https://img.example/pfp.png".into(),
                title_prefix: "PCBValues".into(),
            },
            notifier,
        })
    }

    fn headers(ua: &str) -> HeaderMap {
        let mut headers = HeaderMap::new();
        headers.insert(USER_AGENT, HeaderValue::from_str(ua).unwrap());
        headers
    }

    fn body(value: Value) -> Bytes {
        Bytes::from(serde_json::to_vec(&value).unwrap())
    }

    #[tokio::test]
    async fn accepted_submission_is_delivered() {
        let recorder = Arc::new(RecordingNotifier::default());
        let state = state_with(recorder.clone());
        let values = [10.0, 20.25, 30.0, 40.0, 50.0, 60.0, 70.0];
        let payload = json!({
            "vals": values,
            "name": "Al*ice",
            "edition": "short",
            "digest": encode_digest(&values),
            "takes": 1,
        });

        let Json(resp) = submit(State(state), headers("Mozilla/5.0"), body(payload))
            .await
            .unwrap();
        assert!(resp.success);
        assert!(resp.error.is_none());

        let sent = recorder.sent.lock().unwrap();
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].username, "PCBValues - Al*ice");
        assert_eq!(sent[0].avatar_url, "https://img.example/pfp.png");
        assert!(sent[0].content.contains("**User:** Al\\*ice\n"));
        assert!(sent[0].content.contains("**Authenticity:** ✅ Authentic score\n"));
        assert!(sent[0].content.contains("**Edition:** 🤏 Short Edition\n"));
        assert!(sent[0].content.contains("**User Agent:** Mozilla/5.0\n"));
    }

    #[tokio::test]
    async fn invalid_scores_are_not_delivered() {
        let recorder = Arc::new(RecordingNotifier::default());
        let state = state_with(recorder.clone());

        let err = submit(
            State(state),
            HeaderMap::new(),
            body(json!({"vals": [1, 2, 3, 4, 5, 6]})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        assert_eq!(
            err.public_message(),
            "Incorrect number of value scores provided: 6, expected 7"
        );
        assert!(recorder.sent.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_bodies_rejected() {
        let state = state_with(Arc::new(RecordingNotifier::default()));

        let err = submit(State(state.clone()), HeaderMap::new(), Bytes::from_static(b"{nope"))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::InvalidJson(_)));

        let err = submit(State(state), HeaderMap::new(), body(json!([1, 2, 3])))
            .await
            .unwrap_err();
        assert!(matches!(err, ApiError::NotAnObject));
    }

    #[tokio::test]
    async fn sink_failure_reported_as_bad_gateway() {
        let state = state_with(Arc::new(RejectingNotifier));
        let err = submit(
            State(state),
            HeaderMap::new(),
            body(json!({"vals": [1, 2, 3, 4, 5, 6, 7]})),
        )
        .await
        .unwrap_err();
        let response = err.into_response();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn index_reports_version() {
        let Html(page) = index().await;
        assert!(page.contains(env!("CARGO_PKG_VERSION")));
    }

    #[test]
    fn router_builds_with_origins() {
        let state = state_with(Arc::new(RecordingNotifier::default()));
        let _router = router(
            state,
            vec![HeaderValue::from_static("https://pcbvalues.github.io")],
        );
    }
}

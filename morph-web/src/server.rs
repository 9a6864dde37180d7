//! Servidor Axum: anotação de textos avulsos via HTTP

use std::sync::Arc;
use std::time::Instant;

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
    routing::{get, post},
    Router,
};
use morph_core::conllu::{render_cleaned, render_conllu};
use morph_core::Annotator;
use serde::{Deserialize, Serialize};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

/// Estado compartilhado da aplicação
pub struct AppState {
    pub annotator: Box<dyn Annotator>,
}

#[derive(Deserialize)]
struct AnnotateRequest {
    text: String,
    #[serde(default)]
    include_features: Option<bool>,
}

#[derive(Serialize, Deserialize)]
pub struct AnnotateResponse {
    pub sentences: usize,
    pub total_tokens: usize,
    pub conllu: String,
    pub cleaned: String,
    pub processing_ms: u64,
}

pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health_handler))
        .route("/annotate", post(annotate_handler))
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn serve(address: &str, state: Arc<AppState>) -> anyhow::Result<()> {
    let listener = tokio::net::TcpListener::bind(address).await?;
    info!("Servidor de anotação iniciado em http://{address}");
    axum::serve(listener, router(state)).await?;
    Ok(())
}

async fn health_handler() -> impl IntoResponse {
    Json(serde_json::json!({"status": "ok"}))
}

/// Anotação via HTTP POST. O analisador é síncrono, então roda fora do runtime.
async fn annotate_handler(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnnotateRequest>,
) -> Response {
    if req.text.trim().is_empty() {
        return (
            StatusCode::BAD_REQUEST,
            Json(serde_json::json!({"error": "Texto vazio"})),
        )
            .into_response();
    }

    let include_features = req.include_features.unwrap_or(true);
    let start = Instant::now();
    let text = req.text;
    let worker = Arc::clone(&state);
    let outcome = tokio::task::spawn_blocking(move || worker.annotator.annotate(&text)).await;

    let sentences = match outcome {
        Ok(Ok(sentences)) => sentences,
        Ok(Err(e)) => {
            warn!(error = %e, "falha na anotação");
            return (
                StatusCode::UNPROCESSABLE_ENTITY,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response();
        }
        Err(e) => {
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(serde_json::json!({"error": e.to_string()})),
            )
                .into_response();
        }
    };

    Json(AnnotateResponse {
        sentences: sentences.len(),
        total_tokens: sentences.iter().map(|s| s.tokens().len()).sum(),
        conllu: render_conllu(&sentences, include_features),
        cleaned: render_cleaned(&sentences),
        processing_ms: start.elapsed().as_millis() as u64,
    })
    .into_response()
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{to_bytes, Body};
    use axum::http::Request;
    use morph_core::analyzer::{AnalyzerRecord, Candidate, StaticAnalyzer};
    use morph_core::converter::MystemTagConverter;
    use morph_core::pipeline::AnalyzerAnnotator;
    use tower::ServiceExt;

    fn app() -> Router {
        let records = vec![
            AnalyzerRecord::word(
                "Привет",
                vec![Candidate { lemma: "привет".to_string(), tag: "INTJ=".to_string() }],
            ),
            AnalyzerRecord::separator(" "),
            AnalyzerRecord::word(
                "мир",
                vec![Candidate { lemma: "мир".to_string(), tag: "S,муж,неод=им,ед".to_string() }],
            ),
        ];
        let annotator = AnalyzerAnnotator::new(
            StaticAnalyzer::new(records),
            MystemTagConverter::bundled().unwrap(),
        );
        router(Arc::new(AppState {
            annotator: Box::new(annotator),
        }))
    }

    fn post(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/annotate")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn test_health() {
        let response = app()
            .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
    }

    #[tokio::test]
    async fn test_annotate_returns_conllu() {
        let response = app()
            .oneshot(post(serde_json::json!({"text": "Привет, мир!"})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: AnnotateResponse = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(body.sentences, 1);
        assert_eq!(body.total_tokens, 3);
        assert_eq!(body.cleaned, "привет мир");
        assert!(body.conllu.contains("2\tмир\tмир\tNOUN\t_\tAnimacy=Inan|Case=Nom|Gender=Masc|Number=Sing"));
    }

    #[tokio::test]
    async fn test_annotate_without_features() {
        let response = app()
            .oneshot(post(serde_json::json!({"text": "Привет, мир!", "include_features": false})))
            .await
            .unwrap();
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let body: AnnotateResponse = serde_json::from_slice(&bytes).unwrap();
        assert!(body.conllu.contains("2\tмир\tмир\tNOUN\t_\t_\t0\troot\t_\t_"));
    }

    #[tokio::test]
    async fn test_empty_text_is_bad_request() {
        let response = app()
            .oneshot(post(serde_json::json!({"text": "   "})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_exhausted_stream_is_unprocessable() {
        let response = app()
            .oneshot(post(serde_json::json!({"text": "Привет, мир! Ещё текст."})))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    }
}

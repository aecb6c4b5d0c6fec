//! HTTP server implementation using Axum.

use axum::{
    Router,
    routing::{delete, get, post},
};
use examprep_core::config::ExamPrepConfig;
use examprep_core::error::Result;
use examprep_core::traits::ModelProvider;
use examprep_db::StudyDb;
use examprep_knowledge::{
    DocumentExtractor, IngestionPipeline, Retriever, StudyAssistant, TextExtractor,
};
use examprep_quiz::{QuestionGenerator, SessionService};
use std::path::PathBuf;
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

/// Shared state for the gateway server.
pub struct AppState {
    pub config: ExamPrepConfig,
    pub db: Arc<StudyDb>,
    pub provider: Arc<dyn ModelProvider>,
    pub ingestion: IngestionPipeline,
    pub assistant: StudyAssistant,
    pub generator: QuestionGenerator,
    pub sessions: SessionService,
    pub extractor: Arc<dyn TextExtractor>,
    /// Where raw uploads are written, already expanded.
    pub upload_dir: PathBuf,
}

impl AppState {
    /// Wire every pipeline to one store and one provider.
    pub fn new(
        config: ExamPrepConfig,
        db: Arc<StudyDb>,
        provider: Arc<dyn ModelProvider>,
        upload_dir: PathBuf,
    ) -> Result<Self> {
        let ingestion = IngestionPipeline::new(provider.clone(), config.ingestion)?;
        let assistant = StudyAssistant::new(
            Retriever::new(db.clone(), provider.clone()),
            provider.clone(),
        );
        let generator = QuestionGenerator::new(db.clone(), provider.clone(), config.generation)?;
        let sessions = SessionService::new(db.clone());
        Ok(Self {
            config,
            db,
            provider,
            ingestion,
            assistant,
            generator,
            sessions,
            extractor: Arc::new(DocumentExtractor),
            upload_dir,
        })
    }
}

/// Build the Axum router with all routes.
pub fn build_router(state: AppState) -> Router {
    build_router_from_arc(Arc::new(state))
}

pub fn build_router_from_arc(shared: Arc<AppState>) -> Router {
    let api = Router::new()
        .route("/api/v1/documents", get(super::routes::list_documents))
        .route("/api/v1/documents/upload", post(super::routes::upload_document))
        .route("/api/v1/documents/search", post(super::routes::search_documents))
        .route("/api/v1/documents/{id}", delete(super::routes::delete_document))
        .route("/api/v1/documents/{id}/access", post(super::routes::grant_access))
        .route("/api/v1/mcqs/generate", post(super::routes::generate_mcqs))
        .route("/api/v1/mcqs/session/start", post(super::routes::start_session))
        .route("/api/v1/mcqs/session/submit", post(super::routes::submit_session))
        .route("/api/v1/mcqs/{documentId}", get(super::routes::list_mcqs))
        .route("/api/v1/models", get(super::routes::list_models))
        .route("/health", get(super::routes::health_check));

    let cors = CorsLayer::new()
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::DELETE,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers(Any)
        .max_age(std::time::Duration::from_secs(3600));

    // EXAMPREP_CORS_ORIGINS=https://a.example,https://b.example
    let cors = if let Ok(origins_str) = std::env::var("EXAMPREP_CORS_ORIGINS") {
        let origins: Vec<_> = origins_str
            .split(',')
            .filter_map(|s| s.trim().parse::<axum::http::HeaderValue>().ok())
            .collect();
        cors.allow_origin(origins)
    } else {
        cors.allow_origin(Any)
    };

    api.layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

/// Start the HTTP server.
pub async fn start(state: AppState) -> anyhow::Result<()> {
    let addr = format!("{}:{}", state.config.gateway.host, state.config.gateway.port);
    let (docs, chunks) = {
        let docs = state.db.list_documents()?.len();
        let chunks: i64 = state.db.chunk_counts()?.values().sum();
        (docs, chunks)
    };
    if docs > 0 {
        tracing::info!("📚 Study library: {docs} documents, {chunks} chunks");
    }
    tracing::info!(
        "🤖 Model provider: {} (uploads in {})",
        state.provider.name(),
        state.upload_dir.display()
    );

    let app = build_router(state);
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    tracing::info!("🌐 Gateway server listening on http://{}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use examprep_core::testing::ScriptedProvider;
    use examprep_knowledge::testing::{sample_docx, sample_pdf};
    use serde_json::{Value, json};
    use tower::ServiceExt;

    const BOUNDARY: &str = "examprep-boundary";

    fn test_state(provider: ScriptedProvider) -> (Arc<AppState>, PathBuf) {
        let upload_dir = std::env::temp_dir().join(format!(
            "examprep-router-{}",
            uuid::Uuid::new_v4().simple()
        ));
        let state = AppState::new(
            ExamPrepConfig::default(),
            Arc::new(StudyDb::open_in_memory().unwrap()),
            Arc::new(provider),
            upload_dir.clone(),
        )
        .unwrap();
        (Arc::new(state), upload_dir)
    }

    fn multipart(fields: &[(&str, &str)], file: Option<(&str, &[u8])>) -> Request<Body> {
        let mut body: Vec<u8> = Vec::new();
        for (name, value) in fields {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"{name}\"\r\n\r\n{value}\r\n"
                )
                .as_bytes(),
            );
        }
        if let Some((file_name, content)) = file {
            body.extend_from_slice(
                format!(
                    "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"file\"; filename=\"{file_name}\"\r\n\
                     Content-Type: application/octet-stream\r\n\r\n"
                )
                .as_bytes(),
            );
            body.extend_from_slice(content);
            body.extend_from_slice(b"\r\n");
        }
        body.extend_from_slice(format!("--{BOUNDARY}--\r\n").as_bytes());
        Request::post("/api/v1/documents/upload")
            .header(
                "content-type",
                format!("multipart/form-data; boundary={BOUNDARY}"),
            )
            .body(Body::from(body))
            .unwrap()
    }

    fn post_json(uri: &str, body: Value) -> Request<Body> {
        Request::post(uri)
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn call(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
        let resp = app.clone().oneshot(req).await.unwrap();
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap_or(Value::Null))
    }

    #[tokio::test]
    async fn test_health_route() {
        let (state, _) = test_state(ScriptedProvider::new());
        let app = build_router_from_arc(state);
        let (status, body) = call(&app, Request::get("/health").body(Body::empty()).unwrap()).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "ok");
    }

    #[tokio::test]
    async fn test_upload_then_search() {
        let (state, upload_dir) =
            test_state(ScriptedProvider::new().reply("Akbar ruled from 1556 (page 1)."));
        let app = build_router_from_arc(state);

        let notes = "Akbar ruled the Mughal empire from 1556 to 1605.\n\n\
                     He introduced the mansabdari system.";
        let (status, body) = call(
            &app,
            multipart(&[("trainerId", "t1"), ("subject", "History"), ("topic", "")], Some(("notes.TXT", notes.as_bytes()))),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["success"], true);
        assert_eq!(body["document"]["fileType"], "txt");
        assert_eq!(body["document"]["subject"], "History");
        assert_eq!(body["document"]["topic"], Value::Null);
        assert!(body["document"]["chunksCount"].as_u64().unwrap() >= 1);
        let stored: Vec<_> = std::fs::read_dir(&upload_dir).unwrap().collect();
        assert_eq!(stored.len(), 1);

        let (status, listed) = call(
            &app,
            Request::get("/api/v1/documents?studentId=s1").body(Body::empty()).unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(listed["total"], 1);
        assert!(listed["documents"][0]["fileUrl"]
            .as_str()
            .unwrap()
            .starts_with("/uploads/documents/"));

        let (status, answer) = call(
            &app,
            post_json(
                "/api/v1/documents/search",
                json!({"query": "When did Akbar rule?", "studentId": "s1"}),
            ),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(answer["answer"], "Akbar ruled from 1556 (page 1).");
        assert_eq!(answer["sources"][0]["fileName"], "notes.TXT");

        let _ = std::fs::remove_dir_all(upload_dir);
    }

    #[tokio::test]
    async fn test_upload_rejections() {
        let (state, _) = test_state(ScriptedProvider::new());
        let app = build_router_from_arc(state);

        let (status, body) = call(&app, multipart(&[("trainerId", "t1")], None)).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "No file provided");

        let (status, body) = call(&app, multipart(&[], Some(("a.txt", b"text".as_slice())))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["error"], "Trainer ID is required");

        let (status, body) = call(&app, multipart(&[("trainerId", "t1")], Some(("a.exe", b"MZ".as_slice())))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body["error"],
            "Invalid file type. Only PDF, DOCX, and TXT files are allowed."
        );

        let (status, _) = call(
            &app,
            multipart(&[("trainerId", "t1"), ("visibility", "secret")], Some(("a.txt", b"text".as_slice()))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_pdf_and_docx_uploads() {
        let (state, upload_dir) = test_state(ScriptedProvider::new());
        let app = build_router_from_arc(state.clone());

        let pdf = sample_pdf(&["Akbar ruled from 1556.", "He introduced the mansabdari system."]);
        let (status, body) = call(
            &app,
            multipart(&[("trainerId", "t1")], Some(("mughals.pdf", pdf.as_slice()))),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["document"]["fileType"], "pdf");
        assert_eq!(body["document"]["chunksCount"], 2);
        let doc_id = body["document"]["id"].as_i64().unwrap();
        let chunks = state.db.chunks_for_document(doc_id).unwrap();
        assert_eq!(chunks[1].page_number, Some(2));

        let docx = sample_docx(&["Fundamental Rights", "Article 14 guarantees equality."]);
        let (status, body) = call(
            &app,
            multipart(&[("trainerId", "t1")], Some(("notes.docx", docx.as_slice()))),
        )
        .await;
        assert_eq!(status, StatusCode::OK, "{body}");
        assert_eq!(body["document"]["fileType"], "docx");
        assert_eq!(body["document"]["chunksCount"], 1);

        let _ = std::fs::remove_dir_all(upload_dir);
    }

    #[tokio::test]
    async fn test_failed_extraction_leaves_nothing() {
        let (state, upload_dir) = test_state(ScriptedProvider::new());
        let app = build_router_from_arc(state.clone());

        let (status, body) = call(&app, multipart(&[("trainerId", "t1")], Some(("scan.pdf", b"%PDF-1.4".as_slice())))).await;
        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert!(body["error"].as_str().unwrap().starts_with("Could not read PDF"));
        assert!(state.db.list_documents().unwrap().is_empty());
        let leftover = std::fs::read_dir(&upload_dir).map(|d| d.count()).unwrap_or(0);
        assert_eq!(leftover, 0);
    }

    #[tokio::test]
    async fn test_generate_route_reports_raw() {
        let (state, _) = test_state(ScriptedProvider::new().reply("```json\n{\"oops\": true}\n```"));
        state
            .db
            .insert_document_with_chunks(
                &examprep_core::types::NewDocument {
                    trainer_id: "t1".into(),
                    file_name: "a.txt".into(),
                    file_type: "txt".into(),
                    file_url: "/uploads/documents/1-a.txt".into(),
                    file_size: None,
                    subject: None,
                    topic: None,
                    description: None,
                    visibility: examprep_core::types::Visibility::Public,
                },
                &[examprep_core::types::ChunkDraft {
                    content: "Some facts.".into(),
                    embedding: vec![1.0],
                    page_number: None,
                    chunk_index: 0,
                }],
            )
            .unwrap();
        let app = build_router_from_arc(state);

        let (status, body) = call(&app, post_json("/api/v1/mcqs/generate", json!({"documentId": 1}))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body["error"], "Model returned invalid format");
        assert_eq!(body["raw"], "```json\n{\"oops\": true}\n```");
    }
}

//! API route handlers for the gateway.

use axum::{
    Json,
    extract::{Multipart, Path, Query, State},
};
use examprep_core::types::{DocumentSummary, NewDocument, Visibility};
use examprep_knowledge::access::filter_accessible;
use examprep_knowledge::extract::validate_file_type;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::sync::Arc;

use super::error::ApiError;
use super::server::AppState;

type ApiResult = Result<Json<Value>, ApiError>;

/// Public URL prefix recorded for stored uploads.
pub const UPLOAD_URL_PREFIX: &str = "/uploads/documents";

/// Non-empty string field.
fn string_field(body: &Value, key: &str) -> Option<String> {
    body.get(key)
        .and_then(Value::as_str)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

/// Positive id from a JSON number, or from a numeric string when
/// `allow_text` is set.
fn id_field(value: Option<&Value>, allow_text: bool) -> Option<i64> {
    let id = match value? {
        Value::String(s) if allow_text => s.trim().parse::<f64>().ok()?,
        Value::Number(n) => n.as_f64()?,
        _ => return None,
    };
    (id.is_finite() && id.fract() == 0.0 && id >= 1.0 && id < i64::MAX as f64).then_some(id as i64)
}

/// Optional whole number: `None` when absent or null, 400 when present but
/// negative, fractional or not numeric.
fn whole_number_field(body: &Value, key: &str) -> Result<Option<usize>, ApiError> {
    let n = match body.get(key) {
        None | Some(Value::Null) => return Ok(None),
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        Some(_) => None,
    };
    match n {
        Some(n) if n.is_finite() && n.fract() == 0.0 && n >= 0.0 => Ok(Some(n as usize)),
        _ => Err(ApiError::bad_request(format!(
            "{key} must be a non-negative integer"
        ))),
    }
}

fn path_id(raw: &str) -> Option<i64> {
    raw.trim().parse::<i64>().ok().filter(|id| *id > 0)
}

/// Unique stored name: `<millis>-<random>.<ext>`.
fn unique_file_name(ext: &str) -> String {
    let random = uuid::Uuid::new_v4().simple().to_string();
    format!(
        "{}-{}.{ext}",
        chrono::Utc::now().timestamp_millis(),
        &random[..9]
    )
}

/// Health check endpoint.
pub async fn health_check() -> Json<Value> {
    Json(json!({
        "status": "ok",
        "service": "examprep-gateway",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Models offered by the configured provider.
pub async fn list_models(State(state): State<Arc<AppState>>) -> ApiResult {
    let models = state.provider.list_models().await?;
    Ok(Json(json!({
        "provider": state.provider.name(),
        "models": models,
        "count": models.len(),
    })))
}

// ═══════════════════════════════════════════════════════
// Documents
// ═══════════════════════════════════════════════════════

#[derive(Default)]
struct UploadForm {
    file: Option<(String, Vec<u8>)>,
    trainer_id: Option<String>,
    subject: Option<String>,
    topic: Option<String>,
    description: Option<String>,
    visibility: Option<String>,
}

impl UploadForm {
    async fn read(mut multipart: Multipart) -> Result<Self, ApiError> {
        let mut form = Self::default();
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(|e| ApiError::bad_request(format!("Invalid multipart body: {e}")))?
        {
            let name = field.name().unwrap_or_default().to_string();
            if name == "file" {
                let file_name = field.file_name().unwrap_or_default().to_string();
                let bytes = field
                    .bytes()
                    .await
                    .map_err(|e| ApiError::bad_request(format!("Invalid file upload: {e}")))?;
                form.file = Some((file_name, bytes.to_vec()));
                continue;
            }
            let text = field
                .text()
                .await
                .map_err(|e| ApiError::bad_request(format!("Invalid form field '{name}': {e}")))?;
            let text = Some(text).filter(|t| !t.trim().is_empty());
            match name.as_str() {
                "trainerId" => form.trainer_id = text,
                "subject" => form.subject = text,
                "topic" => form.topic = text,
                "description" => form.description = text,
                "visibility" => form.visibility = text,
                _ => {}
            }
        }
        Ok(form)
    }
}

/// Store an upload, extract and chunk its text, embed and persist it.
pub async fn upload_document(
    State(state): State<Arc<AppState>>,
    multipart: Multipart,
) -> ApiResult {
    let form = UploadForm::read(multipart).await?;
    let Some((file_name, bytes)) = form.file else {
        return Err(ApiError::bad_request("No file provided"));
    };
    let Some(trainer_id) = form.trainer_id else {
        return Err(ApiError::bad_request("Trainer ID is required"));
    };
    let file_type = validate_file_type(&file_name)?;
    let visibility = match form.visibility.as_deref() {
        None => Visibility::Public,
        Some(v) => v.parse::<Visibility>().map_err(|_| {
            ApiError::bad_request("Invalid visibility. Use public, group, or private.")
        })?,
    };

    let stored_name = unique_file_name(&file_type);
    let stored_path = state.upload_dir.join(&stored_name);
    tokio::fs::create_dir_all(&state.upload_dir)
        .await
        .map_err(examprep_core::ExamPrepError::from)?;
    tokio::fs::write(&stored_path, &bytes)
        .await
        .map_err(examprep_core::ExamPrepError::from)?;
    tracing::info!("💾 Saved upload '{file_name}' as {}", stored_path.display());

    let new_doc = NewDocument {
        trainer_id,
        file_name,
        file_type: file_type.clone(),
        file_url: format!("{UPLOAD_URL_PREFIX}/{stored_name}"),
        file_size: Some(bytes.len() as i64),
        subject: form.subject,
        topic: form.topic,
        description: form.description,
        visibility,
    };

    let ingested = match state.extractor.extract(&file_type, &bytes) {
        Ok(pages) => {
            state
                .ingestion
                .ingest_document(&state.db, &new_doc, &pages)
                .await
        }
        Err(e) => Err(e),
    };
    let ingested = match ingested {
        Ok(ingested) => ingested,
        Err(e) => {
            if let Err(rm) = tokio::fs::remove_file(&stored_path).await {
                tracing::warn!("⚠️ Could not remove {}: {rm}", stored_path.display());
            }
            return Err(e.into());
        }
    };

    let doc = &ingested.document;
    Ok(Json(json!({
        "success": true,
        "document": {
            "id": doc.id,
            "fileName": doc.file_name,
            "fileType": doc.file_type,
            "subject": doc.subject,
            "topic": doc.topic,
            "chunksCount": ingested.chunks_count,
        }
    })))
}

/// List a trainer's uploads or the documents a student can read.
pub async fn list_documents(
    State(state): State<Arc<AppState>>,
    Query(params): Query<HashMap<String, String>>,
) -> ApiResult {
    let trainer_id = params.get("trainerId").filter(|s| !s.is_empty());
    let student_id = params.get("studentId").filter(|s| !s.is_empty());

    let documents = match (trainer_id, student_id) {
        (Some(trainer), None) => state.db.list_documents_by_trainer(trainer)?,
        (None, Some(student)) => {
            let records = state.db.access_records_for_student(student)?;
            filter_accessible(state.db.list_documents()?, student, &records)
        }
        _ => {
            return Err(ApiError::bad_request(
                "Either studentId or trainerId is required",
            ));
        }
    };

    let counts = state.db.chunk_counts()?;
    let documents: Vec<DocumentSummary> = documents
        .into_iter()
        .map(|document| DocumentSummary {
            chunks_count: counts.get(&document.id).copied().unwrap_or(0),
            document,
        })
        .collect();
    Ok(Json(json!({
        "total": documents.len(),
        "documents": documents,
    })))
}

/// Answer a student question from their readable documents.
pub async fn search_documents(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult {
    let Some(query) = string_field(&body, "query") else {
        return Err(ApiError::bad_request("Query is required and must be a string"));
    };
    let Some(student_id) = string_field(&body, "studentId") else {
        return Err(ApiError::bad_request("Student ID is required"));
    };
    let top_k = whole_number_field(&body, "topK")?
        .unwrap_or(state.config.retrieval.top_k)
        .max(1);

    let answer = state.assistant.answer(&query, &student_id, top_k).await?;
    Ok(Json(serde_json::to_value(answer).map_err(examprep_core::ExamPrepError::from)?))
}

/// Grant a student read access to a restricted document.
pub async fn grant_access(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
    Json(body): Json<Value>,
) -> ApiResult {
    let Some(document_id) = path_id(&id) else {
        return Err(ApiError::bad_request("Invalid documentId"));
    };
    let Some(student_id) = string_field(&body, "studentId") else {
        return Err(ApiError::bad_request("Student ID is required"));
    };
    if state.db.get_document(document_id)?.is_none() {
        return Err(ApiError::not_found("Document not found"));
    }
    let level = string_field(&body, "accessLevel").unwrap_or_else(|| "view".to_string());
    let granted_by = string_field(&body, "grantedBy");

    let access = state
        .db
        .grant_access(document_id, &student_id, &level, granted_by.as_deref())?;
    tracing::info!("🔑 Student {student_id} granted '{level}' on document {document_id}");
    Ok(Json(json!({ "success": true, "access": access })))
}

/// Delete a document with everything derived from it.
pub async fn delete_document(
    State(state): State<Arc<AppState>>,
    Path(id): Path<String>,
) -> ApiResult {
    let Some(document_id) = path_id(&id) else {
        return Err(ApiError::bad_request("Invalid documentId"));
    };
    let Some(doc) = state.db.get_document(document_id)? else {
        return Err(ApiError::not_found("Document not found"));
    };
    if !state.db.delete_document(document_id)? {
        return Err(ApiError::not_found("Document not found"));
    }
    if let Some(name) = doc
        .file_url
        .strip_prefix(UPLOAD_URL_PREFIX)
        .map(|n| n.trim_start_matches('/'))
        .filter(|n| !n.is_empty() && !n.contains(['/', '\\']))
        && let Err(e) = tokio::fs::remove_file(state.upload_dir.join(name)).await
    {
        tracing::warn!("⚠️ Stored file for document {document_id} not removed: {e}");
    }
    tracing::info!("🗑️ Deleted document {document_id} ({})", doc.file_name);
    Ok(Json(json!({ "success": true, "id": document_id })))
}

// ═══════════════════════════════════════════════════════
// MCQs & sessions
// ═══════════════════════════════════════════════════════

/// Generate questions for a document.
pub async fn generate_mcqs(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult {
    let Some(document_id) = id_field(body.get("documentId"), false) else {
        return Err(ApiError::bad_request("documentId (number) is required"));
    };
    let number = |key: &str| {
        body.get(key)
            .and_then(Value::as_f64)
            .filter(|f| f.is_finite() && *f != 0.0)
            .map(|f| f.trunc() as i64)
    };
    let mcqs = state
        .generator
        .generate(document_id, number("count"), number("maxChunks"))
        .await?;
    Ok(Json(json!({
        "success": true,
        "count": mcqs.len(),
        "mcqs": mcqs,
    })))
}

/// Stored questions for a document.
pub async fn list_mcqs(
    State(state): State<Arc<AppState>>,
    Path(document_id): Path<String>,
) -> ApiResult {
    let Some(document_id) = path_id(&document_id) else {
        return Err(ApiError::bad_request("Invalid documentId"));
    };
    let mcqs = state.generator.list(document_id)?;
    Ok(Json(json!({ "count": mcqs.len(), "mcqs": mcqs })))
}

pub async fn start_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult {
    let Some(student_id) = string_field(&body, "studentId") else {
        return Err(ApiError::bad_request("studentId (string) is required"));
    };
    let Some(document_id) = id_field(body.get("documentId"), true) else {
        return Err(ApiError::bad_request("documentId (number) is required"));
    };
    let session = state.sessions.start(&student_id, document_id)?;
    Ok(Json(json!({ "success": true, "session": session })))
}

pub async fn submit_session(
    State(state): State<Arc<AppState>>,
    Json(body): Json<Value>,
) -> ApiResult {
    let session_id = id_field(body.get("sessionId"), false);
    let answers = body
        .get("answers")
        .and_then(Value::as_array)
        .filter(|a| !a.is_empty());
    let (Some(session_id), Some(answers)) = (session_id, answers) else {
        return Err(ApiError::bad_request(
            "sessionId and non-empty answers are required",
        ));
    };

    let result = state
        .sessions
        .submit(session_id, answers, body.get("durationSeconds"))?;
    Ok(Json(json!({
        "success": true,
        "attempted": result.attempted,
        "correct": result.correct,
        "incorrect": result.incorrect,
        "score": result.score,
    })))
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;
    use examprep_core::config::ExamPrepConfig;
    use examprep_core::testing::ScriptedProvider;
    use examprep_core::traits::ModelProvider;
    use examprep_core::types::{ChunkDraft, Difficulty, McqDraft};
    use examprep_db::StudyDb;

    fn state_with(provider: ScriptedProvider) -> Arc<AppState> {
        let db = Arc::new(StudyDb::open_in_memory().unwrap());
        let provider: Arc<dyn ModelProvider> = Arc::new(provider);
        let upload_dir = std::env::temp_dir().join(format!(
            "examprep-test-uploads-{}",
            uuid::Uuid::new_v4().simple()
        ));
        Arc::new(AppState::new(ExamPrepConfig::default(), db, provider, upload_dir).unwrap())
    }

    fn seed_document(state: &AppState, visibility: Visibility, chunks: usize) -> i64 {
        let drafts: Vec<ChunkDraft> = (0..chunks)
            .map(|i| ChunkDraft {
                content: format!("The Preamble was adopted in 1949, fact {i}."),
                embedding: vec![1.0, 0.0],
                page_number: Some(2),
                chunk_index: i as i64,
            })
            .collect();
        state
            .db
            .insert_document_with_chunks(
                &NewDocument {
                    trainer_id: "t1".into(),
                    file_name: "polity.txt".into(),
                    file_type: "txt".into(),
                    file_url: format!("{UPLOAD_URL_PREFIX}/1-abc.txt"),
                    file_size: Some(64),
                    subject: Some("Polity".into()),
                    topic: None,
                    description: None,
                    visibility,
                },
                &drafts,
            )
            .unwrap()
            .id
    }

    fn mcq_reply() -> String {
        json!({"mcqs": [
            {"question": "When was the Preamble adopted?", "options": ["1947","1949","1950","1952"],
             "correctAnswer": 1, "explanation": "Fact 0.", "difficulty": "easy"},
            {"question": "Broken", "options": ["a"]}
        ]})
        .to_string()
    }

    #[tokio::test]
    async fn test_health_check() {
        let json = health_check().await.0;
        assert_eq!(json["status"], "ok");
    }

    #[tokio::test]
    async fn test_list_models() {
        let state = state_with(ScriptedProvider::new());
        let json = list_models(State(state)).await.unwrap().0;
        assert_eq!(json["provider"], "scripted");
        assert_eq!(json["count"], 2);
    }

    #[tokio::test]
    async fn test_list_documents_views() {
        let state = state_with(ScriptedProvider::new());
        let public = seed_document(&state, Visibility::Public, 2);
        let private = seed_document(&state, Visibility::Private, 1);

        let query = |k: &str, v: &str| Query(HashMap::from([(k.to_string(), v.to_string())]));

        let trainer = list_documents(State(state.clone()), query("trainerId", "t1"))
            .await
            .unwrap()
            .0;
        assert_eq!(trainer["total"], 2);

        let student = list_documents(State(state.clone()), query("studentId", "s1"))
            .await
            .unwrap()
            .0;
        assert_eq!(student["total"], 1);
        assert_eq!(student["documents"][0]["id"], public);
        assert_eq!(student["documents"][0]["chunksCount"], 2);
        assert_eq!(student["documents"][0]["visibility"], "public");

        state.db.grant_access(private, "s1", "view", None).unwrap();
        let student = list_documents(State(state.clone()), query("studentId", "s1"))
            .await
            .unwrap()
            .0;
        assert_eq!(student["total"], 2);

        let err = list_documents(State(state), Query(HashMap::new()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_search_validation_and_canned_answer() {
        let state = state_with(ScriptedProvider::new());
        let err = search_documents(State(state.clone()), Json(json!({"query": 5, "studentId": "s1"})))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Query is required and must be a string");

        let err = search_documents(State(state.clone()), Json(json!({"query": "hi"})))
            .await
            .unwrap_err();
        assert_eq!(err.message, "Student ID is required");

        let json = search_documents(State(state), Json(json!({"query": "hi", "studentId": "s1"})))
            .await
            .unwrap()
            .0;
        assert_eq!(json["answer"], examprep_knowledge::search::NO_ACCESS_ANSWER);
        assert_eq!(json["sources"], json!([]));
        assert_eq!(json["relevantChunks"], json!([]));
    }

    #[tokio::test]
    async fn test_generate_and_list_mcqs() {
        let state = state_with(ScriptedProvider::new().reply(mcq_reply()));
        let doc = seed_document(&state, Visibility::Public, 3);

        let json = generate_mcqs(State(state.clone()), Json(json!({"documentId": doc, "count": 5})))
            .await
            .unwrap()
            .0;
        assert_eq!(json["success"], true);
        assert_eq!(json["count"], 1);
        assert_eq!(json["mcqs"][0]["correctAnswer"], 1);
        assert_eq!(json["mcqs"][0]["options"].as_array().unwrap().len(), 4);

        let listed = list_mcqs(State(state.clone()), Path(doc.to_string()))
            .await
            .unwrap()
            .0;
        assert_eq!(listed["count"], 1);

        let err = list_mcqs(State(state), Path("abc".into())).await.unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_generate_error_statuses() {
        let state = state_with(
            ScriptedProvider::new()
                .fail_next("upstream 500")
                .reply("not json at all"),
        );
        let doc = seed_document(&state, Visibility::Public, 1);
        let empty = seed_document(&state, Visibility::Public, 0);

        let call = |body: Value| generate_mcqs(State(state.clone()), Json(body));

        assert_eq!(call(json!({"documentId": "1"})).await.unwrap_err().status, StatusCode::BAD_REQUEST);
        assert_eq!(call(json!({"documentId": 999})).await.unwrap_err().status, StatusCode::NOT_FOUND);
        assert_eq!(call(json!({"documentId": empty})).await.unwrap_err().status, StatusCode::BAD_REQUEST);
        assert_eq!(call(json!({"documentId": doc})).await.unwrap_err().status, StatusCode::BAD_GATEWAY);

        let err = call(json!({"documentId": doc})).await.unwrap_err();
        assert_eq!(err.status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(err.raw.as_deref(), Some("not json at all"));
        assert!(state.db.mcqs_for_document(doc).unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_session_flow() {
        let state = state_with(ScriptedProvider::new());
        let doc = seed_document(&state, Visibility::Public, 1);
        let draft = McqDraft {
            question: "Q".into(),
            options: ["a".into(), "b".into(), "c".into(), "d".into()],
            correct_answer: 2,
            explanation: None,
            difficulty: Difficulty::Hard,
        };
        let mcqs = state.db.insert_mcqs(doc, &[draft.clone(), draft]).unwrap();

        let started = start_session(
            State(state.clone()),
            Json(json!({"studentId": "s1", "documentId": doc.to_string()})),
        )
        .await
        .unwrap()
        .0;
        let session_id = started["session"]["id"].as_i64().unwrap();
        assert_eq!(started["session"]["sessionType"], "mcq");

        let body = json!({
            "sessionId": session_id,
            "answers": [
                {"mcqId": mcqs[0].id, "selectedIndex": 2},
                {"questionId": mcqs[1].id, "selectedIndex": 0}
            ],
            "durationSeconds": 30.5
        });
        let scored = submit_session(State(state.clone()), Json(body.clone()))
            .await
            .unwrap()
            .0;
        assert_eq!(scored["attempted"], 2);
        assert_eq!(scored["correct"], 1);
        assert_eq!(scored["incorrect"], 1);
        assert_eq!(scored["score"], 50);

        let again = submit_session(State(state.clone()), Json(body)).await.unwrap_err();
        assert_eq!(again.status, StatusCode::CONFLICT);

        let empty = submit_session(
            State(state.clone()),
            Json(json!({"sessionId": session_id, "answers": []})),
        )
        .await
        .unwrap_err();
        assert_eq!(empty.status, StatusCode::BAD_REQUEST);

        let missing_doc = start_session(
            State(state),
            Json(json!({"studentId": "s1", "documentId": 4040})),
        )
        .await
        .unwrap_err();
        assert_eq!(missing_doc.status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_grant_and_delete() {
        let state = state_with(ScriptedProvider::new());
        let doc = seed_document(&state, Visibility::Group, 1);

        let granted = grant_access(
            State(state.clone()),
            Path(doc.to_string()),
            Json(json!({"studentId": "s9", "grantedBy": "t1"})),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(granted["access"]["accessLevel"], "view");
        assert_eq!(granted["access"]["grantedBy"], "t1");

        let err = grant_access(State(state.clone()), Path("77".into()), Json(json!({"studentId": "s9"})))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);

        delete_document(State(state.clone()), Path(doc.to_string()))
            .await
            .unwrap();
        assert!(state.db.get_document(doc).unwrap().is_none());
        assert!(state.db.access_records_for_student("s9").unwrap().is_empty());

        let err = delete_document(State(state), Path(doc.to_string()))
            .await
            .unwrap_err();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_id_coercion() {
        assert_eq!(id_field(Some(&json!(3)), false), Some(3));
        assert_eq!(id_field(Some(&json!(3.0)), false), Some(3));
        assert_eq!(id_field(Some(&json!("3")), false), None);
        assert_eq!(id_field(Some(&json!("3")), true), Some(3));
        assert_eq!(id_field(Some(&json!(0)), true), None);
        assert_eq!(id_field(Some(&json!(2.5)), false), None);
        assert_eq!(id_field(None, true), None);
        assert_eq!(path_id("12"), Some(12));
        assert_eq!(path_id("-1"), None);
    }

    #[test]
    fn test_whole_number_coercion() {
        let field = |v: Value| whole_number_field(&json!({"topK": v}), "topK");
        assert_eq!(field(json!(3)).unwrap(), Some(3));
        assert_eq!(field(json!(3.0)).unwrap(), Some(3));
        assert_eq!(field(json!("4")).unwrap(), Some(4));
        assert_eq!(field(json!(0)).unwrap(), Some(0));
        assert_eq!(field(Value::Null).unwrap(), None);
        assert_eq!(whole_number_field(&json!({}), "topK").unwrap(), None);
        assert_eq!(field(json!(-2)).unwrap_err().status, StatusCode::BAD_REQUEST);
        assert_eq!(field(json!(2.5)).unwrap_err().message, "topK must be a non-negative integer");
        assert!(field(json!("many")).is_err());
        assert!(field(json!([3])).is_err());
    }

    #[tokio::test]
    async fn test_search_rejects_bad_top_k() {
        let state = state_with(ScriptedProvider::new());
        let err = search_documents(
            State(state.clone()),
            Json(json!({"query": "hi", "studentId": "s1", "topK": -1})),
        )
        .await
        .unwrap_err();
        assert_eq!(err.status, StatusCode::BAD_REQUEST);

        let json = search_documents(
            State(state),
            Json(json!({"query": "hi", "studentId": "s1", "topK": 3.0})),
        )
        .await
        .unwrap()
        .0;
        assert_eq!(json["answer"], examprep_knowledge::search::NO_ACCESS_ANSWER);
    }

    #[test]
    fn test_unique_file_name() {
        let name = unique_file_name("pdf");
        assert!(name.ends_with(".pdf"));
        let (millis, rest) = name.split_once('-').unwrap();
        assert!(millis.parse::<i64>().is_ok());
        assert_eq!(rest.len(), "123456789.pdf".len());
        assert_ne!(name, unique_file_name("pdf"));
    }
}

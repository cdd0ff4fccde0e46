use std::collections::VecDeque;
use std::path::{Path, PathBuf};
use std::sync::{Arc, OnceLock};

use async_trait::async_trait;
use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request},
};
use tokio::sync::{Mutex, OwnedMutexGuard};
use uuid::Uuid;

use crate::api;
use crate::core::{config::Settings, state::AppState, time::now_utc};
use crate::db::backend::{CollectionBackend, StoreError};
use crate::db::memory::MemoryBackend;
use crate::db::models::{Exam, Question, Submission};
use crate::db::types::QuestionType;
use crate::repositories::exams::ExamRepository;
use crate::repositories::submissions::SubmissionRepository;
use crate::services::completion::{AiError, CompletionClient, CompletionRequest};

pub(crate) struct TestContext {
    pub(crate) state: AppState,
    pub(crate) app: api::router::App,
    pub(crate) completions: Arc<ScriptedCompletions>,
    _guard: OwnedMutexGuard<()>,
}

pub(crate) async fn env_lock() -> OwnedMutexGuard<()> {
    static LOCK: OnceLock<Arc<Mutex<()>>> = OnceLock::new();
    let lock = LOCK.get_or_init(|| Arc::new(Mutex::new(()))).clone();
    lock.lock_owned().await
}

pub(crate) fn set_test_env() {
    std::env::set_var("DASMOCK_ENV", "test");
    std::env::set_var("DASMOCK_STRICT_CONFIG", "0");
    std::env::set_var("STORAGE_BACKEND", "memory");
    std::env::set_var("PROMETHEUS_ENABLED", "0");
    std::env::remove_var("ENVIRONMENT");
    std::env::remove_var("DASMOCK_HOST");
    std::env::remove_var("DASMOCK_PORT");
    std::env::remove_var("API_PREFIX");
    std::env::remove_var("BACKEND_CORS_ORIGINS");
    std::env::remove_var("DATA_DIR");
    std::env::remove_var("EXAMINER_ID");
    std::env::remove_var("DEFAULT_EXAM_DURATION_MINUTES");
    std::env::remove_var("OPENAI_API_KEY");
    std::env::remove_var("OPENAI_BASE_URL");
    std::env::remove_var("AI_MARKING_MODEL");
    std::env::remove_var("AI_GENERATION_MODEL");
    std::env::remove_var("AI_MARKING_TEMPERATURE");
    std::env::remove_var("AI_GENERATION_TEMPERATURE");
    std::env::remove_var("AI_MAX_TOKENS");
    std::env::remove_var("AI_REQUEST_TIMEOUT");
}

pub(crate) async fn setup_test_context() -> TestContext {
    setup_test_context_with(Vec::new()).await
}

/// Context whose completion client replays `responses` in order.
pub(crate) async fn setup_test_context_with(
    responses: Vec<Result<String, AiError>>,
) -> TestContext {
    build_context(Arc::new(MemoryBackend::<Exam>::new()), responses).await
}

/// Context whose exam store fails every read and write.
pub(crate) async fn setup_failing_store_context() -> TestContext {
    build_context(Arc::new(FailingBackend), Vec::new()).await
}

async fn build_context(
    exams: Arc<dyn CollectionBackend<Exam>>,
    responses: Vec<Result<String, AiError>>,
) -> TestContext {
    let guard = env_lock().await;
    set_test_env();

    let settings = Settings::load().expect("settings");
    let completions = Arc::new(ScriptedCompletions::new(responses));
    let state = AppState::new(
        settings,
        ExamRepository::new(exams),
        SubmissionRepository::new(Arc::new(MemoryBackend::<Submission>::new())),
        completions.clone(),
    );
    let app = api::router::app(state.clone());

    TestContext { state, app, completions, _guard: guard }
}

/// Completion client that replays canned results and records every request it receives.
pub(crate) struct ScriptedCompletions {
    responses: Mutex<VecDeque<Result<String, AiError>>>,
    requests: Mutex<Vec<CompletionRequest>>,
}

impl ScriptedCompletions {
    pub(crate) fn new(responses: Vec<Result<String, AiError>>) -> Self {
        Self { responses: Mutex::new(responses.into()), requests: Mutex::new(Vec::new()) }
    }

    pub(crate) async fn requests(&self) -> Vec<CompletionRequest> {
        self.requests.lock().await.clone()
    }
}

#[async_trait]
impl CompletionClient for ScriptedCompletions {
    async fn complete(&self, request: CompletionRequest) -> Result<String, AiError> {
        self.requests.lock().await.push(request);
        self.responses.lock().await.pop_front().unwrap_or(Err(AiError::EmptyResponse))
    }

    fn is_configured(&self) -> bool {
        true
    }
}

/// Backend that fails every operation with an I/O error.
pub(crate) struct FailingBackend;

#[async_trait]
impl<T> CollectionBackend<T> for FailingBackend
where
    T: Send + Sync + 'static,
{
    async fn load(&self) -> Result<Vec<T>, StoreError> {
        Err(failure())
    }

    async fn persist(&self, _items: &[T]) -> Result<(), StoreError> {
        Err(failure())
    }

    fn describe(&self) -> String {
        "failing".to_string()
    }
}

fn failure() -> StoreError {
    StoreError::io(
        "unavailable.json",
        std::io::Error::new(std::io::ErrorKind::PermissionDenied, "permission denied"),
    )
}

pub(crate) fn marking_report_json(overall: f64) -> String {
    serde_json::json!({
        "criteria": {
            "relevance": {"score": 8, "comment": "On topic"},
            "grammar": {"score": 7, "comment": "Minor slips"},
            "near_answer": {"score": 6, "comment": "Close to the expected answer"},
            "sentences": {"score": 7, "comment": "Clear sentences"},
            "detail": {"score": 5, "comment": "Could use more detail"},
            "excellence": {"score": 6, "comment": "Solid"}
        },
        "overall": {"score": overall, "feedback": "Good effort"}
    })
    .to_string()
}

pub(crate) fn sample_exam(id: &str, created_by: &str) -> Exam {
    Exam {
        id: id.to_string(),
        title: format!("Exam {id}"),
        subject: "Integrated Science".to_string(),
        created_by: created_by.to_string(),
        created_at: now_utc(),
        updated_at: None,
        questions: vec![
            Question {
                id: format!("{id}_q1"),
                text: "Which organ pumps blood?".to_string(),
                kind: QuestionType::MultipleChoice,
                options: vec!["Heart".to_string(), "Lung".to_string()],
                correct_answer: Some("Heart".to_string()),
                marks: 2,
                section: Some("Section A".to_string()),
                sub_questions: Vec::new(),
            },
            Question {
                id: format!("{id}_q2"),
                text: "Explain diffusion.".to_string(),
                kind: QuestionType::Essay,
                options: Vec::new(),
                correct_answer: None,
                marks: 8,
                section: Some("Section B".to_string()),
                sub_questions: Vec::new(),
            },
        ],
        total_marks: 10,
        duration: 120,
    }
}

pub(crate) fn sample_submission(exam_id: &str, student_name: &str, score: u32) -> Submission {
    Submission {
        id: Uuid::new_v4().to_string(),
        exam_id: exam_id.to_string(),
        student_name: student_name.to_string(),
        score,
        submitted_at: now_utc(),
    }
}

pub(crate) fn scratch_dir() -> PathBuf {
    std::env::temp_dir().join(format!("dasmock-test-{}", Uuid::new_v4()))
}

pub(crate) fn remove_scratch_dir(dir: &Path) {
    let _ = std::fs::remove_dir_all(dir);
}

pub(crate) fn json_request(
    method: Method,
    uri: &str,
    body: Option<serde_json::Value>,
) -> Request<Body> {
    let builder = Request::builder().method(method).uri(uri);

    if let Some(body) = body {
        let bytes = serde_json::to_vec(&body).expect("serialize body");
        builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(bytes))
            .expect("request body")
    } else {
        builder.body(Body::empty()).expect("request body")
    }
}

pub(crate) async fn read_json(response: axum::response::Response<Body>) -> serde_json::Value {
    let body = to_bytes(response.into_body(), usize::MAX).await.expect("response body");
    serde_json::from_slice(&body).unwrap_or_else(|err| {
        let body_text = String::from_utf8_lossy(&body);
        panic!("json parse: {err}; body: {body_text}");
    })
}

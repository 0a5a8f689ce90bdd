//! HTTP gateway for the Student Companion.
//!
//! Serves the student selector, student profiles, the question endpoint,
//! the knowledge base probe, and the embedded web frontend.
//!
//! Built on Axum. Every request gets its own pipeline run; the only shared
//! state is the read-only directory and the two remote clients.

pub mod frontend;

use axum::extract::DefaultBodyLimit;
use axum::{
    Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::Json,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{AllowOrigin, CorsLayer};
use tracing::{error, info, warn};

use companion_agent::{Companion, Outcome, Stage};
use companion_config::AppConfig;
use companion_core::error::{DirectoryError, Error};

/// Shared application state for the gateway.
pub struct AppState {
    pub companion: Arc<Companion>,
    /// Query used by the probe endpoint when none is given.
    pub probe_query: String,
    /// Origin allowed by CORS, typically the gateway's own address.
    pub allowed_origin: Option<String>,
}

pub type SharedState = Arc<AppState>;

/// Build the router with every route and layer.
///
/// Layers applied:
/// - CORS limited to the gateway's own origin
/// - Request body size limit (1 MB)
/// - HTTP trace logging
pub fn build_router(state: SharedState) -> Router {
    let cors = cors_layer(state.allowed_origin.as_deref());

    Router::new()
        .route("/health", get(health_handler))
        .route("/v1/students", get(list_students_handler))
        .route("/v1/students/{key}", get(get_student_handler))
        .route("/v1/ask", post(ask_handler))
        .route("/v1/knowledge-base/probe", get(probe_handler))
        .with_state(state)
        .merge(frontend::frontend_router())
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(cors)
        .layer(tower_http::trace::TraceLayer::new_for_http())
}

fn cors_layer(origin: Option<&str>) -> CorsLayer {
    let layer = CorsLayer::new()
        .allow_methods([axum::http::Method::GET, axum::http::Method::POST])
        .allow_headers([axum::http::header::CONTENT_TYPE])
        .max_age(std::time::Duration::from_secs(3600));

    match origin.map(str::parse::<axum::http::HeaderValue>) {
        Some(Ok(value)) => layer.allow_origin(AllowOrigin::exact(value)),
        Some(Err(_)) => {
            warn!(origin = ?origin, "Ignoring invalid CORS origin");
            layer
        }
        None => layer,
    }
}

/// Start the gateway HTTP server.
///
/// Builds the directory, remote clients and pipeline once, then shares them
/// across all requests.
pub async fn start(config: AppConfig) -> Result<(), Box<dyn std::error::Error>> {
    let host = config.gateway.host.clone();
    let port = config.gateway.port;
    let addr = format!("{host}:{port}");

    let directory = Arc::new(config.load_directory()?);
    let backends = companion_providers::build_from_config(&config).await?;
    let companion = Arc::new(Companion::from_config(
        &config,
        directory,
        backends.runtime,
        backends.knowledge_base,
    ));

    let state = Arc::new(AppState {
        companion,
        probe_query: config.retrieval.probe_query.clone(),
        allowed_origin: Some(format!("http://{addr}")),
    });

    let app = build_router(state);

    info!(addr = %addr, "Gateway starting");
    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

// --- Handlers ---

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

#[derive(Serialize)]
struct HealthResponse {
    status: &'static str,
    version: &'static str,
    students: usize,
}

async fn health_handler(State(state): State<SharedState>) -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "ok",
        version: env!("CARGO_PKG_VERSION"),
        students: state.companion.directory().len(),
    })
}

#[derive(Serialize)]
struct StudentListResponse {
    students: Vec<companion_core::SelectorEntry>,
}

async fn list_students_handler(State(state): State<SharedState>) -> Json<StudentListResponse> {
    Json(StudentListResponse {
        students: state.companion.directory().selector().to_vec(),
    })
}

#[derive(Serialize)]
struct SubjectView {
    name: String,
    grade: u32,
    display: String,
}

#[derive(Serialize)]
struct StudentView {
    key: String,
    id: String,
    name: String,
    class: String,
    department: String,
    year: u32,
    subjects: Vec<SubjectView>,
    strengths: Vec<String>,
    weaknesses: Vec<String>,
    areas_for_improvement: Vec<String>,
    learning_style: companion_core::LearningStyle,
}

async fn get_student_handler(
    State(state): State<SharedState>,
    Path(key): Path<String>,
) -> Result<Json<StudentView>, ApiError> {
    let student = state
        .companion
        .directory()
        .get(&key)
        .map_err(|e| api_error(StatusCode::NOT_FOUND, e.to_string()))?;

    Ok(Json(StudentView {
        key,
        id: student.id.clone(),
        name: student.name.clone(),
        class: student.academic_details.class_label.clone(),
        department: student.academic_details.department.clone(),
        year: student.academic_details.year,
        subjects: student
            .subjects
            .iter()
            .map(|s| SubjectView {
                name: s.name.clone(),
                grade: s.grade,
                display: format!("{}/100", s.grade),
            })
            .collect(),
        strengths: student.strengths.clone(),
        weaknesses: student.weaknesses.clone(),
        areas_for_improvement: student.areas_for_improvement.clone(),
        learning_style: student.learning_style.clone(),
    }))
}

#[derive(Deserialize)]
struct AskRequest {
    student: String,
    question: String,
}

#[derive(Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
enum AskResponse {
    Answered {
        answer: String,
        material: String,
        stages: Vec<Stage>,
    },
    NotFound {
        message: String,
        stages: Vec<Stage>,
    },
}

async fn ask_handler(
    State(state): State<SharedState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<AskResponse>, ApiError> {
    if payload.question.trim().is_empty() {
        return Err(api_error(StatusCode::BAD_REQUEST, "question must not be empty"));
    }

    info!(
        student = %payload.student,
        question_len = payload.question.len(),
        "v1/ask request"
    );

    match state.companion.ask(&payload.student, &payload.question).await {
        Ok(result) => Ok(Json(match result.outcome {
            Outcome::Answered { answer, material } => AskResponse::Answered {
                answer,
                material,
                stages: result.stages,
            },
            Outcome::NoMaterialFound { message } => AskResponse::NotFound {
                message,
                stages: result.stages,
            },
        })),
        Err(Error::Directory(e @ DirectoryError::NotFound(_))) => {
            Err(api_error(StatusCode::NOT_FOUND, e.to_string()))
        }
        Err(e @ Error::Generation(_)) => {
            error!(error = %e, "Answer generation failed");
            Err(api_error(StatusCode::BAD_GATEWAY, e.to_string()))
        }
        Err(e) => {
            error!(error = %e, "Question failed");
            Err(api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string()))
        }
    }
}

#[derive(Deserialize)]
struct ProbeParams {
    query: Option<String>,
}

async fn probe_handler(
    State(state): State<SharedState>,
    Query(params): Query<ProbeParams>,
) -> Result<Json<serde_json::Value>, ApiError> {
    let query = params
        .query
        .filter(|q| !q.trim().is_empty())
        .unwrap_or_else(|| state.probe_query.clone());

    state
        .companion
        .retrieval()
        .probe(&query)
        .await
        .map(Json)
        .map_err(|e| {
            warn!(error = %e, "Knowledge base probe failed");
            api_error(StatusCode::BAD_GATEWAY, e.to_string())
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::Request;
    use companion_agent::{AgentGateway, RetrievalGateway};
    use companion_core::error::{GenerationError, RetrievalError};
    use companion_core::knowledge::{KnowledgeBase, RetrievalResult, RetrieveRequest};
    use companion_core::runtime::{
        AgentRuntime, CompletionEvent, CompletionStream, InvokeAgentRequest,
    };
    use companion_core::StudentDirectory;
    use http_body_util::BodyExt;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tower::ServiceExt;

    /// Agent runtime answering every call with the same text.
    struct MockRuntime {
        reply: Result<String, GenerationError>,
        calls: AtomicUsize,
    }

    #[async_trait::async_trait]
    impl AgentRuntime for MockRuntime {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn invoke_agent(
            &self,
            _request: InvokeAgentRequest,
        ) -> Result<CompletionStream, GenerationError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let text = self.reply.clone()?;
            let (tx, rx) = tokio::sync::mpsc::channel(1);
            tx.send(Ok(CompletionEvent::chunk(text))).await.unwrap();
            Ok(rx)
        }
    }

    struct MockKnowledgeBase {
        passages: Result<Vec<&'static str>, RetrievalError>,
    }

    #[async_trait::async_trait]
    impl KnowledgeBase for MockKnowledgeBase {
        fn name(&self) -> &str {
            "gateway_mock"
        }

        async fn retrieve(
            &self,
            _request: RetrieveRequest,
        ) -> Result<Vec<RetrievalResult>, RetrievalError> {
            Ok(self
                .passages
                .clone()?
                .into_iter()
                .map(RetrievalResult::text)
                .collect())
        }

        async fn probe(&self, query: &str) -> Result<serde_json::Value, RetrievalError> {
            let passages = self.passages.clone()?;
            Ok(serde_json::json!({ "query": query, "retrievalResults": passages }))
        }
    }

    fn test_app_with(
        reply: Result<String, GenerationError>,
        passages: Result<Vec<&'static str>, RetrievalError>,
    ) -> (Router, Arc<MockRuntime>) {
        let runtime = Arc::new(MockRuntime {
            reply,
            calls: AtomicUsize::new(0),
        });
        let companion = Companion::new(
            Arc::new(StudentDirectory::builtin()),
            AgentGateway::new(runtime.clone()),
            RetrievalGateway::new(Arc::new(MockKnowledgeBase { passages })),
        );
        let state = Arc::new(AppState {
            companion: Arc::new(companion),
            probe_query: "Module".into(),
            allowed_origin: Some("http://127.0.0.1:8501".into()),
        });
        (build_router(state), runtime)
    }

    fn test_app() -> Router {
        test_app_with(
            Ok(" Mock answer ".into()),
            Ok(vec!["EC2 is a compute service."]),
        )
        .0
    }

    async fn json_body(response: axum::response::Response) -> serde_json::Value {
        let body = response.into_body().collect().await.unwrap().to_bytes();
        serde_json::from_slice(&body).unwrap()
    }

    fn ask_request(body: serde_json::Value) -> Request<Body> {
        Request::builder()
            .method("POST")
            .uri("/v1/ask")
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    #[tokio::test]
    async fn health_endpoint() {
        let req = Request::builder().uri("/health").body(Body::empty()).unwrap();
        let response = test_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["status"], "ok");
        assert_eq!(json["students"], 2);
    }

    #[tokio::test]
    async fn lists_students_in_definition_order() {
        let req = Request::builder()
            .uri("/v1/students")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(
            json["students"],
            serde_json::json!([
                { "key": "emma", "display_name": "Emma" },
                { "key": "michael", "display_name": "Michael" }
            ])
        );
    }

    #[tokio::test]
    async fn student_profile_with_grades() {
        let req = Request::builder()
            .uri("/v1/students/michael")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["id"], "STU002");
        assert_eq!(json["class"], "12th Grade");
        assert_eq!(json["department"], "Arts & Literature");
        assert_eq!(json["subjects"][0]["name"], "Art");
        assert_eq!(json["subjects"][0]["display"], "95/100");
        assert_eq!(json["subjects"].as_array().unwrap().len(), 4);
        assert!(json["strengths"].as_array().unwrap().len() > 0);
        assert!(json["learning_style"]["type"].is_string());
    }

    #[tokio::test]
    async fn unknown_student_is_404() {
        let req = Request::builder()
            .uri("/v1/students/nobody")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
        assert!(json_body(response).await["error"]
            .as_str()
            .unwrap()
            .contains("nobody"));
    }

    #[tokio::test]
    async fn ask_returns_answer_and_material() {
        let (app, runtime) = test_app_with(
            Ok(" Mock answer ".into()),
            Ok(vec!["EC2 is a compute service.", "EC2 instances can be resized."]),
        );
        let response = app
            .oneshot(ask_request(serde_json::json!({
                "student": "emma",
                "question": "What is EC2?"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["status"], "answered");
        assert_eq!(json["answer"], "Mock answer");
        assert_eq!(
            json["material"],
            "EC2 is a compute service.\n\nEC2 instances can be resized."
        );
        assert_eq!(json["stages"].as_array().unwrap().last().unwrap(), "done");
        assert_eq!(runtime.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn ask_without_material_reports_not_found() {
        let (app, runtime) = test_app_with(Ok("unused".into()), Ok(vec![]));
        let response = app
            .oneshot(ask_request(serde_json::json!({
                "student": "emma",
                "question": "What is EC2?"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["status"], "not_found");
        assert_eq!(json["message"], companion_agent::NOT_FOUND_MESSAGE);
        assert_eq!(runtime.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn ask_generation_failure_is_502() {
        let (app, _) = test_app_with(
            Err(GenerationError::Throttled("Rate exceeded".into())),
            Ok(vec!["material"]),
        );
        let response = app
            .oneshot(ask_request(serde_json::json!({
                "student": "emma",
                "question": "What is EC2?"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
        assert!(json_body(response).await["error"]
            .as_str()
            .unwrap()
            .contains("Rate exceeded"));
    }

    #[tokio::test]
    async fn ask_unknown_student_is_404() {
        let response = test_app()
            .oneshot(ask_request(serde_json::json!({
                "student": "nobody",
                "question": "What is EC2?"
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn ask_blank_question_is_400() {
        let response = test_app()
            .oneshot(ask_request(serde_json::json!({
                "student": "emma",
                "question": "   "
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn probe_uses_default_query() {
        let req = Request::builder()
            .uri("/v1/knowledge-base/probe")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);

        let json = json_body(response).await;
        assert_eq!(json["query"], "Module");
        assert_eq!(json["retrievalResults"][0], "EC2 is a compute service.");
    }

    #[tokio::test]
    async fn probe_accepts_custom_query() {
        let req = Request::builder()
            .uri("/v1/knowledge-base/probe?query=IAM")
            .body(Body::empty())
            .unwrap();
        let response = test_app().oneshot(req).await.unwrap();
        assert_eq!(json_body(response).await["query"], "IAM");
    }

    #[tokio::test]
    async fn probe_failure_is_502() {
        let (app, _) = test_app_with(
            Ok("unused".into()),
            Err(RetrievalError::AuthenticationFailed("denied".into())),
        );
        let req = Request::builder()
            .uri("/v1/knowledge-base/probe")
            .body(Body::empty())
            .unwrap();
        let response = app.oneshot(req).await.unwrap();
        assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn oversized_body_rejected() {
        let question = "x".repeat(2 * 1024 * 1024);
        let response = test_app()
            .oneshot(ask_request(serde_json::json!({
                "student": "emma",
                "question": question
            })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::PAYLOAD_TOO_LARGE);
    }
}

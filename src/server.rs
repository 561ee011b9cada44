//! HTTP API for the tutor
//!
//! Serves the same session the CLI uses over a small JSON API, for use
//! inside the container image:
//! - GET  /api/health   - liveness and version
//! - POST /api/ask      - answer a question
//! - POST /api/quiz     - generate and persist a quiz
//! - GET  /api/quizzes  - recently generated quizzes
//! - POST /api/feedback - record answer feedback

use actix_web::{web, App, HttpResponse, HttpServer};
use serde::Deserialize;
use serde_json::json;
use tracing::info;

use tutor_core::{Error, LlmClient, VectorStore};

use crate::session::{TutorSession, DEFAULT_QUIZ_QUESTIONS};

pub const DEFAULT_PORT: u16 = 8501;

#[derive(Deserialize)]
struct AskRequest {
    question: String,
    #[serde(default = "default_true")]
    videos: bool,
}

#[derive(Deserialize)]
struct QuizRequest {
    topic: String,
    num_questions: Option<usize>,
}

#[derive(Deserialize)]
struct FeedbackRequest {
    query: String,
    response: String,
    helpful: bool,
}

#[derive(Deserialize)]
struct QuizzesQuery {
    limit: Option<usize>,
}

fn default_true() -> bool {
    true
}

/// Configure API routes
pub fn configure_routes<L, V>(cfg: &mut web::ServiceConfig)
where
    L: LlmClient + 'static,
    V: VectorStore + 'static,
{
    cfg.service(
        web::scope("/api")
            .route("/health", web::get().to(health_handler))
            .route("/ask", web::post().to(ask_handler::<L, V>))
            .route("/quiz", web::post().to(quiz_handler::<L, V>))
            .route("/quizzes", web::get().to(quizzes_handler::<L, V>))
            .route("/feedback", web::post().to(feedback_handler::<L, V>)),
    );
}

async fn health_handler() -> HttpResponse {
    HttpResponse::Ok().json(json!({
        "status": "healthy",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

async fn ask_handler<L: LlmClient + 'static, V: VectorStore + 'static>(
    session: web::Data<TutorSession<L, V>>,
    req: web::Json<AskRequest>,
) -> HttpResponse {
    if req.question.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "question must not be empty" }));
    }

    match session.ask(&req.question, req.videos).await {
        Ok(outcome) => {
            let sources: Vec<String> = outcome
                .answer
                .sources
                .iter()
                .map(|chunk| chunk.metadata.citation())
                .collect();
            HttpResponse::Ok().json(json!({
                "answer": outcome.answer.answer,
                "sources": sources,
                "low_confidence": outcome.answer.low_confidence,
                "videos": outcome.videos,
            }))
        }
        Err(e) => error_response(e),
    }
}

async fn quiz_handler<L: LlmClient + 'static, V: VectorStore + 'static>(
    session: web::Data<TutorSession<L, V>>,
    req: web::Json<QuizRequest>,
) -> HttpResponse {
    if req.topic.trim().is_empty() {
        return HttpResponse::BadRequest().json(json!({ "error": "topic must not be empty" }));
    }

    let num_questions = req.num_questions.unwrap_or(DEFAULT_QUIZ_QUESTIONS);
    match session.generate_quiz(&req.topic, num_questions).await {
        Ok(saved) => HttpResponse::Ok().json(saved),
        Err(e) => error_response(e),
    }
}

async fn quizzes_handler<L: LlmClient + 'static, V: VectorStore + 'static>(
    session: web::Data<TutorSession<L, V>>,
    query: web::Query<QuizzesQuery>,
) -> HttpResponse {
    match session.recent_quizzes(query.limit.unwrap_or(10)) {
        Ok(quizzes) => HttpResponse::Ok().json(quizzes),
        Err(e) => error_response(e),
    }
}

async fn feedback_handler<L: LlmClient + 'static, V: VectorStore + 'static>(
    session: web::Data<TutorSession<L, V>>,
    req: web::Json<FeedbackRequest>,
) -> HttpResponse {
    match session.record_feedback(&req.query, &req.response, req.helpful) {
        Ok(summary) => HttpResponse::Ok().json(json!({
            "status": "recorded",
            "helpful": summary.helpful,
            "total": summary.total,
        })),
        Err(e) => error_response(e),
    }
}

fn error_response(e: Error) -> HttpResponse {
    match e {
        Error::InvalidInput(_) => {
            HttpResponse::BadRequest().json(json!({ "error": e.to_string() }))
        }
        Error::Timeout(_) => {
            HttpResponse::GatewayTimeout().json(json!({ "error": e.to_string() }))
        }
        _ => HttpResponse::InternalServerError().json(json!({ "error": e.to_string() })),
    }
}

/// Run the HTTP server until shutdown.
pub async fn run<L, V>(
    session: TutorSession<L, V>,
    host: &str,
    port: u16,
) -> std::io::Result<()>
where
    L: LlmClient + 'static,
    V: VectorStore + 'static,
{
    let session = web::Data::new(session);
    info!("listening on {}:{}", host, port);

    HttpServer::new(move || {
        App::new()
            .app_data(session.clone())
            .configure(configure_routes::<L, V>)
    })
    .bind((host, port))?
    .run()
    .await
}

#[cfg(test)]
mod tests {
    use super::*;
    use actix_web::{test, App};
    use async_trait::async_trait;
    use std::sync::Arc;
    use tutor_core::{Completion, CompletionConfig, Result};
    use tutor_rag::PersistentVectorStore;

    struct CannedLlm;

    #[async_trait]
    impl LlmClient for CannedLlm {
        async fn connect(&mut self) -> Result<()> {
            Ok(())
        }

        async fn complete(&self, prompt: &str) -> Result<Completion> {
            self.complete_with_config(prompt, &CompletionConfig::default())
                .await
        }

        async fn complete_with_config(
            &self,
            _prompt: &str,
            _config: &CompletionConfig,
        ) -> Result<Completion> {
            Ok(Completion {
                text: "canned answer".to_string(),
                model_id: "canned".to_string(),
                tokens_used: None,
            })
        }

        fn model_id(&self) -> &str {
            "canned"
        }
    }

    async fn test_session(dir: &tempfile::TempDir) -> TutorSession<CannedLlm, PersistentVectorStore> {
        let mut store = PersistentVectorStore::new(dir.path().join("index.json"));
        store.connect().await.unwrap();
        TutorSession::new(Arc::new(CannedLlm), Arc::new(store), dir.path())
    }

    #[actix_web::test]
    async fn test_health_reports_version() {
        let dir = tempfile::tempdir().unwrap();
        let session = web::Data::new(test_session(&dir).await);
        let app = test::init_service(
            App::new()
                .app_data(session)
                .configure(configure_routes::<CannedLlm, PersistentVectorStore>),
        )
        .await;

        let req = test::TestRequest::get().uri("/api/health").to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    }

    #[actix_web::test]
    async fn test_ask_rejects_empty_question() {
        let dir = tempfile::tempdir().unwrap();
        let session = web::Data::new(test_session(&dir).await);
        let app = test::init_service(
            App::new()
                .app_data(session)
                .configure(configure_routes::<CannedLlm, PersistentVectorStore>),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask")
            .set_json(json!({ "question": "  " }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(resp.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn test_ask_on_empty_index_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let session = web::Data::new(test_session(&dir).await);
        let app = test::init_service(
            App::new()
                .app_data(session)
                .configure(configure_routes::<CannedLlm, PersistentVectorStore>),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/ask")
            .set_json(json!({ "question": "what is a derivative?" }))
            .to_request();
        let resp = test::call_service(&app, req).await;
        assert_eq!(
            resp.status(),
            actix_web::http::StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[actix_web::test]
    async fn test_feedback_is_recorded() {
        let dir = tempfile::tempdir().unwrap();
        let session = web::Data::new(test_session(&dir).await);
        let app = test::init_service(
            App::new()
                .app_data(session)
                .configure(configure_routes::<CannedLlm, PersistentVectorStore>),
        )
        .await;

        let req = test::TestRequest::post()
            .uri("/api/feedback")
            .set_json(json!({
                "query": "what is a derivative?",
                "response": "canned answer",
                "helpful": true,
            }))
            .to_request();
        let body: serde_json::Value = test::call_and_read_body_json(&app, req).await;
        assert_eq!(body["status"], "recorded");
        assert_eq!(body["helpful"], 1);
        assert_eq!(body["total"], 1);
        assert!(dir.path().join("feedback.json").exists());
    }
}

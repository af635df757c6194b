pub mod health;

use axum::{
    routing::{get, post},
    Router,
};

use crate::knowledge::handlers as knowledge;
use crate::report::handlers as report;
use crate::screening::handlers as screening;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Screening API
        .route("/api/v1/sessions", post(screening::handle_create_session))
        .route(
            "/api/v1/sessions/:id",
            get(screening::handle_get_session).delete(screening::handle_delete_session),
        )
        .route(
            "/api/v1/sessions/:id/profile",
            post(screening::handle_submit_profile),
        )
        .route(
            "/api/v1/sessions/:id/answers",
            post(screening::handle_answer),
        )
        .route(
            "/api/v1/sessions/:id/narrative",
            post(screening::handle_narrative),
        )
        // Report API
        .route(
            "/api/v1/sessions/:id/report",
            post(report::handle_generate_report),
        )
        .route(
            "/api/v1/sessions/:id/report.pdf",
            get(report::handle_report_pdf),
        )
        // Knowledge API
        .route(
            "/api/v1/knowledge/documents",
            post(knowledge::handle_upload_document),
        )
        .route("/api/v1/knowledge/ask", post(knowledge::handle_ask))
        .with_state(state)
}

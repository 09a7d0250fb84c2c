//! Records HTTP routes: students, subjects, grades.

pub mod grades;
pub mod students;
pub mod subjects;

#[cfg(test)]
mod tests;

use std::sync::Arc;

use axum::extract::OriginalUri;
use axum::http::{header, Method};
use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use crate::error::AppError;
use crate::response::{ApiResult, Reply};
use crate::store::SchoolStore;

/// Shared state for route handlers.
#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn SchoolStore>,
}

impl AppState {
    pub fn new(store: Arc<dyn SchoolStore>) -> Self {
        Self { store }
    }
}

/// Build the full application router: service root plus `/api`.
pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(root))
        .nest("/api", api_router())
        // Must follow every route so the nested ones get it too.
        .method_not_allowed_fallback(method_not_allowed)
        .fallback(unknown_route)
        .layer(TraceLayer::new_for_http())
        .layer(cors_layer())
        .with_state(state)
}

fn api_router() -> Router<AppState> {
    Router::new()
        // Students
        .route("/students", post(students::create).get(students::list))
        .route(
            "/students/{student_id}",
            get(students::get).put(students::update).delete(students::delete),
        )
        // Subjects
        .route("/subjects", post(subjects::create).get(subjects::list))
        .route(
            "/subjects/{subject_id}",
            get(subjects::get).put(subjects::update).delete(subjects::delete),
        )
        // Grades
        .route("/grades", post(grades::create))
        .route("/grades/{grade_id}", put(grades::update).delete(grades::delete))
        .route(
            "/grades/{grade_id}/student/{student_id}",
            get(grades::get_for_student),
        )
        .route("/grades/student/{student_id}", get(grades::list_for_student))
}

fn cors_layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE])
}

async fn unknown_route(OriginalUri(uri): OriginalUri) -> AppError {
    AppError::not_found(format!("no route for {}", uri.path()))
}

async fn method_not_allowed(method: Method, OriginalUri(uri): OriginalUri) -> AppError {
    AppError::MethodNotAllowed(format!("{method} is not allowed on {}", uri.path()))
}

async fn root() -> ApiResult<serde_json::Value> {
    Ok(Reply::ok(
        "School records API is running",
        serde_json::json!({
            "service": env!("CARGO_PKG_NAME"),
            "version": env!("CARGO_PKG_VERSION"),
        }),
    ))
}

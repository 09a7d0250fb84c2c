//! `/api/subjects` handlers.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;

use super::AppState;
use crate::models::subject::{Subject, SubjectRequest};
use crate::response::{ApiResult, Reply};
use crate::services::subject_service;

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<SubjectRequest>, JsonRejection>,
) -> ApiResult<Subject> {
    let Json(req) = body?;
    let subject = subject_service::create_subject(state.store.as_ref(), req).await?;
    Ok(Reply::created("Subject created successfully", subject))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Subject>> {
    let subjects = subject_service::list_subjects(state.store.as_ref()).await?;
    Ok(Reply::ok("Subjects retrieved successfully", subjects))
}

pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Subject> {
    let Path(subject_id) = path?;
    let subject = subject_service::get_subject(state.store.as_ref(), subject_id).await?;
    Ok(Reply::ok("Subject retrieved successfully", subject))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<SubjectRequest>, JsonRejection>,
) -> ApiResult<Subject> {
    let Path(subject_id) = path?;
    let Json(req) = body?;
    let subject = subject_service::update_subject(state.store.as_ref(), subject_id, req).await?;
    Ok(Reply::ok("Subject updated successfully", subject))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(subject_id) = path?;
    subject_service::delete_subject(state.store.as_ref(), subject_id).await?;
    Ok(Reply::ack("Subject deleted successfully"))
}

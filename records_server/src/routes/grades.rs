//! `/api/grades` handlers.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;

use super::AppState;
use crate::models::grade::{CreateGradeRequest, GradeView, UpdateGradeRequest};
use crate::response::{ApiResult, Reply};
use crate::services::grade_service;

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateGradeRequest>, JsonRejection>,
) -> ApiResult<GradeView> {
    let Json(req) = body?;
    let grade = grade_service::create_grade(state.store.as_ref(), req).await?;
    Ok(Reply::created("Grade created successfully", grade))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateGradeRequest>, JsonRejection>,
) -> ApiResult<GradeView> {
    let Path(grade_id) = path?;
    let Json(req) = body?;
    let grade = grade_service::update_grade(state.store.as_ref(), grade_id, req).await?;
    Ok(Reply::ok("Grade updated successfully", grade))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(grade_id) = path?;
    grade_service::delete_grade(state.store.as_ref(), grade_id).await?;
    Ok(Reply::ack("Grade deleted successfully"))
}

/// `GET /grades/{grade_id}/student/{student_id}`
pub async fn get_for_student(
    State(state): State<AppState>,
    path: Result<Path<(i64, i64)>, PathRejection>,
) -> ApiResult<GradeView> {
    let Path((grade_id, student_id)) = path?;
    let grade = grade_service::get_student_grade(state.store.as_ref(), grade_id, student_id).await?;
    Ok(Reply::ok("Grade retrieved successfully", grade))
}

/// `GET /grades/student/{student_id}`
pub async fn list_for_student(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Vec<GradeView>> {
    let Path(student_id) = path?;
    let grades = grade_service::list_student_grades(state.store.as_ref(), student_id).await?;
    Ok(Reply::ok("Grades retrieved successfully", grades))
}

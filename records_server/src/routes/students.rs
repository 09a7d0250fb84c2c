//! `/api/students` handlers.

use axum::extract::rejection::{JsonRejection, PathRejection};
use axum::extract::{Path, State};
use axum::Json;

use super::AppState;
use crate::models::student::{CreateStudentRequest, Student, UpdateStudentRequest};
use crate::response::{ApiResult, Reply};
use crate::services::student_service;

pub async fn create(
    State(state): State<AppState>,
    body: Result<Json<CreateStudentRequest>, JsonRejection>,
) -> ApiResult<Student> {
    let Json(req) = body?;
    let student = student_service::create_student(state.store.as_ref(), req).await?;
    Ok(Reply::created("Student created successfully", student))
}

pub async fn list(State(state): State<AppState>) -> ApiResult<Vec<Student>> {
    let students = student_service::list_students(state.store.as_ref()).await?;
    Ok(Reply::ok("Students retrieved successfully", students))
}

pub async fn get(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<Student> {
    let Path(student_id) = path?;
    let student = student_service::get_student(state.store.as_ref(), student_id).await?;
    Ok(Reply::ok("Student retrieved successfully", student))
}

pub async fn update(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
    body: Result<Json<UpdateStudentRequest>, JsonRejection>,
) -> ApiResult<Student> {
    let Path(student_id) = path?;
    let Json(req) = body?;
    let student = student_service::update_student(state.store.as_ref(), student_id, req).await?;
    Ok(Reply::ok("Student updated successfully", student))
}

pub async fn delete(
    State(state): State<AppState>,
    path: Result<Path<i64>, PathRejection>,
) -> ApiResult<()> {
    let Path(student_id) = path?;
    student_service::delete_student(state.store.as_ref(), student_id).await?;
    Ok(Reply::ack("Student deleted successfully"))
}

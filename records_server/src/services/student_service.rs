//! Student CRUD.

use crate::error::{AppError, AppResult};
use crate::models::student::{CreateStudentRequest, Student, UpdateStudentRequest};
use crate::store::{SchoolStore, StoreError};

fn not_found(student_id: i64) -> AppError {
    AppError::not_found(format!("student {student_id} not found"))
}

/// Duplicate emails are reported with the offending address.
fn email_conflict(err: StoreError, email: Option<&str>) -> AppError {
    match (err, email) {
        (StoreError::Duplicate(_), Some(email)) => {
            AppError::invalid(format!("a student with email '{email}' already exists"))
        }
        (err, _) => err.into(),
    }
}

/// Create a new student.
pub async fn create_student(
    store: &dyn SchoolStore,
    req: CreateStudentRequest,
) -> AppResult<Student> {
    let new_student = req.validate()?;
    let email = new_student.email.clone();
    let student = store
        .create_student(new_student)
        .await
        .map_err(|e| email_conflict(e, Some(&email)))?;

    crate::metrics::write_recorded("student", "create");
    tracing::info!(student_id = student.student_id, group = %student.group, "Student created");
    Ok(student)
}

/// List all students.
pub async fn list_students(store: &dyn SchoolStore) -> AppResult<Vec<Student>> {
    Ok(store.list_students().await?)
}

pub async fn get_student(store: &dyn SchoolStore, student_id: i64) -> AppResult<Student> {
    store
        .find_student(student_id)
        .await?
        .ok_or_else(|| not_found(student_id))
}

/// Replace the provided fields of a student.
pub async fn update_student(
    store: &dyn SchoolStore,
    student_id: i64,
    req: UpdateStudentRequest,
) -> AppResult<Student> {
    let changes = req.validate()?;
    let email = changes.email.clone();
    let student = store
        .update_student(student_id, changes)
        .await
        .map_err(|e| email_conflict(e, email.as_deref()))?
        .ok_or_else(|| not_found(student_id))?;

    crate::metrics::write_recorded("student", "update");
    tracing::info!(student_id, "Student updated");
    Ok(student)
}

/// Delete a student; its grades go with it.
pub async fn delete_student(store: &dyn SchoolStore, student_id: i64) -> AppResult<()> {
    if !store.delete_student(student_id).await? {
        return Err(not_found(student_id));
    }

    crate::metrics::write_recorded("student", "delete");
    tracing::info!(student_id, "Student deleted with its grades");
    Ok(())
}

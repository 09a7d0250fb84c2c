//! Grade creation, updates and per-student lookups.
//!
//! Parents are not pre-checked on create: the insert itself is rejected by
//! the store when the student or subject is missing, so there is no window
//! between check and write.

use crate::error::{AppError, AppResult};
use crate::models::grade::{CreateGradeRequest, GradeView, UpdateGradeRequest};
use crate::store::SchoolStore;

fn not_found(grade_id: i64) -> AppError {
    AppError::not_found(format!("grade {grade_id} not found"))
}

/// Record a grade and return it with its student and subject.
pub async fn create_grade(store: &dyn SchoolStore, req: CreateGradeRequest) -> AppResult<GradeView> {
    let new_grade = req.validate()?;
    let grade = store.create_grade(new_grade).await?;

    crate::metrics::write_recorded("grade", "create");
    tracing::info!(
        grade_id = grade.grade_id,
        student_id = grade.student_id,
        subject_id = grade.subject_id,
        "Grade created"
    );

    // A parent deleted right after the insert cascades the grade away too.
    store
        .grade_view(grade.grade_id)
        .await?
        .ok_or_else(|| not_found(grade.grade_id))
}

/// Replace the value of a grade.
pub async fn update_grade(
    store: &dyn SchoolStore,
    grade_id: i64,
    req: UpdateGradeRequest,
) -> AppResult<GradeView> {
    // An unknown grade is reported before a bad value.
    store
        .grade_view(grade_id)
        .await?
        .ok_or_else(|| not_found(grade_id))?;
    let score = req.validate()?;
    store
        .update_grade(grade_id, score)
        .await?
        .ok_or_else(|| not_found(grade_id))?;

    crate::metrics::write_recorded("grade", "update");
    tracing::info!(grade_id, grade = f64::from(score), "Grade updated");

    store
        .grade_view(grade_id)
        .await?
        .ok_or_else(|| not_found(grade_id))
}

pub async fn delete_grade(store: &dyn SchoolStore, grade_id: i64) -> AppResult<()> {
    if !store.delete_grade(grade_id).await? {
        return Err(not_found(grade_id));
    }

    crate::metrics::write_recorded("grade", "delete");
    tracing::info!(grade_id, "Grade deleted");
    Ok(())
}

/// Grade `grade_id`, only when it belongs to `student_id`.
pub async fn get_student_grade(
    store: &dyn SchoolStore,
    grade_id: i64,
    student_id: i64,
) -> AppResult<GradeView> {
    store
        .student_grade_view(grade_id, student_id)
        .await?
        .ok_or_else(|| {
            AppError::not_found(format!(
                "grade {grade_id} not found for student {student_id}"
            ))
        })
}

/// All grades of an existing student.
pub async fn list_student_grades(
    store: &dyn SchoolStore,
    student_id: i64,
) -> AppResult<Vec<GradeView>> {
    if store.find_student(student_id).await?.is_none() {
        return Err(AppError::not_found(format!("student {student_id} not found")));
    }
    Ok(store.student_grade_views(student_id).await?)
}

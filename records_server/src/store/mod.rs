//! Persistence seam for the records API.
//!
//! Handlers receive an `Arc<dyn SchoolStore>` through router state. Two
//! backends implement it: [`PgStore`] over a diesel-async pool, and
//! [`MemoryStore`] for local runs and tests. Both enforce the same rules:
//! unique student emails and subject names, grades only for existing parents,
//! and cascading deletes from either parent.

pub mod memory;
pub mod postgres;

use std::fmt;

use async_trait::async_trait;

use crate::models::grade::{Grade, GradeView, NewGrade, Score};
use crate::models::student::{NewStudent, Student, StudentChanges};
use crate::models::subject::{NewSubject, Subject};

pub use memory::MemoryStore;
pub use postgres::PgStore;

/// Parent entities a grade can reference.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Entity {
    Student,
    Subject,
}

impl fmt::Display for Entity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Student => f.write_str("student"),
            Self::Subject => f.write_str("subject"),
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    /// A unique field already holds this value; carries the field name.
    #[error("duplicate value for {0}")]
    Duplicate(String),
    /// The referenced parent row does not exist.
    #[error("{0} {1} does not exist")]
    MissingParent(Entity, i64),
    #[error(transparent)]
    Backend(#[from] anyhow::Error),
}

pub type StoreResult<T> = Result<T, StoreError>;

/// Single-row operations over students, subjects and grades.
///
/// Lookups return `Ok(None)` (or `false` for deletes) when no row matches;
/// only integrity violations and backend failures are errors.
#[async_trait]
pub trait SchoolStore: Send + Sync {
    async fn create_student(&self, new: NewStudent) -> StoreResult<Student>;

    /// All students ordered by id.
    async fn list_students(&self) -> StoreResult<Vec<Student>>;

    async fn find_student(&self, student_id: i64) -> StoreResult<Option<Student>>;

    async fn update_student(
        &self,
        student_id: i64,
        changes: StudentChanges,
    ) -> StoreResult<Option<Student>>;

    /// Removes the student and, by cascade, its grades.
    async fn delete_student(&self, student_id: i64) -> StoreResult<bool>;

    async fn create_subject(&self, new: NewSubject) -> StoreResult<Subject>;

    /// All subjects ordered by id.
    async fn list_subjects(&self) -> StoreResult<Vec<Subject>>;

    async fn find_subject(&self, subject_id: i64) -> StoreResult<Option<Subject>>;

    async fn rename_subject(&self, subject_id: i64, name: String) -> StoreResult<Option<Subject>>;

    /// Removes the subject and, by cascade, its grades.
    async fn delete_subject(&self, subject_id: i64) -> StoreResult<bool>;

    /// Inserts a grade in one step; a missing parent is reported as
    /// [`StoreError::MissingParent`] and nothing is written.
    async fn create_grade(&self, new: NewGrade) -> StoreResult<Grade>;

    async fn update_grade(&self, grade_id: i64, grade: Score) -> StoreResult<Option<Grade>>;

    async fn delete_grade(&self, grade_id: i64) -> StoreResult<bool>;

    async fn grade_view(&self, grade_id: i64) -> StoreResult<Option<GradeView>>;

    /// Grade `grade_id` only if it belongs to `student_id`.
    async fn student_grade_view(
        &self,
        grade_id: i64,
        student_id: i64,
    ) -> StoreResult<Option<GradeView>>;

    /// All grades of one student ordered by grade id; empty when there are none.
    async fn student_grade_views(&self, student_id: i64) -> StoreResult<Vec<GradeView>>;
}

//! Postgres store over a diesel-async deadpool.

use async_trait::async_trait;
use diesel::prelude::*;
use diesel::result::{DatabaseErrorKind, Error as DieselError};
use diesel_async::pooled_connection::deadpool::{Object, Pool};
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::{AsyncPgConnection, RunQueryDsl};

use super::{Entity, SchoolStore, StoreError, StoreResult};
use crate::migration::{self, FK_GRADES_STUDENT, FK_GRADES_SUBJECT};
use crate::models::grade::{Grade, GradeRow, GradeView, NewGrade, NewGradeRow, Score};
use crate::models::student::{NewStudent, Student, StudentChanges};
use crate::models::subject::{NewSubject, Subject};
use crate::schema::{grades, students, subjects};

pub type DieselPool = Pool<AsyncPgConnection>;

pub struct PgStore {
    pool: DieselPool,
}

impl PgStore {
    /// Build the pool. Connections are opened lazily on first checkout.
    pub fn connect(database_url: &str, max_size: usize) -> anyhow::Result<Self> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(database_url);
        let pool = Pool::builder(manager)
            .max_size(max_size)
            .build()
            .map_err(|e| anyhow::anyhow!("diesel pool: {e}"))?;
        Ok(Self { pool })
    }

    pub async fn migrate(&self) -> anyhow::Result<()> {
        let mut conn = self.conn().await?;
        migration::run_migration(&mut conn).await
    }

    async fn conn(&self) -> anyhow::Result<Object<AsyncPgConnection>> {
        self.pool
            .get()
            .await
            .map_err(|e| anyhow::anyhow!("diesel pool: {e}"))
    }
}

/// Unique violations become [`StoreError::Duplicate`]; everything else is a
/// backend failure.
fn classify(err: DieselError) -> StoreError {
    match err {
        DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, info) => {
            let field = match info.constraint_name() {
                Some("uq_students_email") => "email",
                Some("uq_subjects_name") => "name",
                Some(other) => other,
                None => "unique field",
            };
            StoreError::Duplicate(field.to_string())
        }
        other => StoreError::Backend(other.into()),
    }
}

fn classify_grade_insert(err: DieselError, new: &NewGrade) -> StoreError {
    if let DieselError::DatabaseError(DatabaseErrorKind::ForeignKeyViolation, info) = &err {
        match info.constraint_name() {
            Some(FK_GRADES_STUDENT) => {
                return StoreError::MissingParent(Entity::Student, new.student_id)
            }
            Some(FK_GRADES_SUBJECT) => {
                return StoreError::MissingParent(Entity::Subject, new.subject_id)
            }
            _ => {}
        }
    }
    classify(err)
}

fn into_view((row, student, subject): (GradeRow, Student, Subject)) -> StoreResult<GradeView> {
    Ok(GradeView {
        grade: Grade::try_from(row)?,
        student,
        subject,
    })
}

#[async_trait]
impl SchoolStore for PgStore {
    async fn create_student(&self, new: NewStudent) -> StoreResult<Student> {
        let mut conn = self.conn().await?;
        diesel::insert_into(students::table)
            .values(&new)
            .get_result::<Student>(&mut conn)
            .await
            .map_err(classify)
    }

    async fn list_students(&self) -> StoreResult<Vec<Student>> {
        let mut conn = self.conn().await?;
        students::table
            .order(students::student_id.asc())
            .load::<Student>(&mut conn)
            .await
            .map_err(classify)
    }

    async fn find_student(&self, student_id: i64) -> StoreResult<Option<Student>> {
        let mut conn = self.conn().await?;
        students::table
            .find(student_id)
            .first::<Student>(&mut conn)
            .await
            .optional()
            .map_err(classify)
    }

    async fn update_student(
        &self,
        student_id: i64,
        changes: StudentChanges,
    ) -> StoreResult<Option<Student>> {
        let mut conn = self.conn().await?;
        diesel::update(students::table.find(student_id))
            .set(&changes)
            .get_result::<Student>(&mut conn)
            .await
            .optional()
            .map_err(classify)
    }

    async fn delete_student(&self, student_id: i64) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(students::table.find(student_id))
            .execute(&mut conn)
            .await
            .map_err(classify)?;
        Ok(deleted > 0)
    }

    async fn create_subject(&self, new: NewSubject) -> StoreResult<Subject> {
        let mut conn = self.conn().await?;
        diesel::insert_into(subjects::table)
            .values(&new)
            .get_result::<Subject>(&mut conn)
            .await
            .map_err(classify)
    }

    async fn list_subjects(&self) -> StoreResult<Vec<Subject>> {
        let mut conn = self.conn().await?;
        subjects::table
            .order(subjects::subject_id.asc())
            .load::<Subject>(&mut conn)
            .await
            .map_err(classify)
    }

    async fn find_subject(&self, subject_id: i64) -> StoreResult<Option<Subject>> {
        let mut conn = self.conn().await?;
        subjects::table
            .find(subject_id)
            .first::<Subject>(&mut conn)
            .await
            .optional()
            .map_err(classify)
    }

    async fn rename_subject(&self, subject_id: i64, name: String) -> StoreResult<Option<Subject>> {
        let mut conn = self.conn().await?;
        diesel::update(subjects::table.find(subject_id))
            .set(subjects::name.eq(name))
            .get_result::<Subject>(&mut conn)
            .await
            .optional()
            .map_err(classify)
    }

    async fn delete_subject(&self, subject_id: i64) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(subjects::table.find(subject_id))
            .execute(&mut conn)
            .await
            .map_err(classify)?;
        Ok(deleted > 0)
    }

    async fn create_grade(&self, new: NewGrade) -> StoreResult<Grade> {
        let mut conn = self.conn().await?;
        let row = diesel::insert_into(grades::table)
            .values(NewGradeRow::from(new))
            .get_result::<GradeRow>(&mut conn)
            .await
            .map_err(|e| classify_grade_insert(e, &new))?;
        Ok(Grade::try_from(row)?)
    }

    async fn update_grade(&self, grade_id: i64, grade: Score) -> StoreResult<Option<Grade>> {
        let mut conn = self.conn().await?;
        let row = diesel::update(grades::table.find(grade_id))
            .set(grades::grade.eq(grade.to_decimal()))
            .get_result::<GradeRow>(&mut conn)
            .await
            .optional()
            .map_err(classify)?;
        Ok(row.map(Grade::try_from).transpose()?)
    }

    async fn delete_grade(&self, grade_id: i64) -> StoreResult<bool> {
        let mut conn = self.conn().await?;
        let deleted = diesel::delete(grades::table.find(grade_id))
            .execute(&mut conn)
            .await
            .map_err(classify)?;
        Ok(deleted > 0)
    }

    async fn grade_view(&self, grade_id: i64) -> StoreResult<Option<GradeView>> {
        let mut conn = self.conn().await?;
        grades::table
            .inner_join(students::table)
            .inner_join(subjects::table)
            .filter(grades::grade_id.eq(grade_id))
            .select((GradeRow::as_select(), Student::as_select(), Subject::as_select()))
            .first::<(GradeRow, Student, Subject)>(&mut conn)
            .await
            .optional()
            .map_err(classify)?
            .map(into_view)
            .transpose()
    }

    async fn student_grade_view(
        &self,
        grade_id: i64,
        student_id: i64,
    ) -> StoreResult<Option<GradeView>> {
        let mut conn = self.conn().await?;
        grades::table
            .inner_join(students::table)
            .inner_join(subjects::table)
            .filter(grades::grade_id.eq(grade_id))
            .filter(grades::student_id.eq(student_id))
            .select((GradeRow::as_select(), Student::as_select(), Subject::as_select()))
            .first::<(GradeRow, Student, Subject)>(&mut conn)
            .await
            .optional()
            .map_err(classify)?
            .map(into_view)
            .transpose()
    }

    async fn student_grade_views(&self, student_id: i64) -> StoreResult<Vec<GradeView>> {
        let mut conn = self.conn().await?;
        grades::table
            .inner_join(students::table)
            .inner_join(subjects::table)
            .filter(grades::student_id.eq(student_id))
            .order(grades::grade_id.asc())
            .select((GradeRow::as_select(), Student::as_select(), Subject::as_select()))
            .load::<(GradeRow, Student, Subject)>(&mut conn)
            .await
            .map_err(classify)?
            .into_iter()
            .map(into_view)
            .collect()
    }
}

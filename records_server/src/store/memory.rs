//! In-memory store with the same integrity rules as the Postgres schema.

use std::collections::BTreeMap;

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{Entity, SchoolStore, StoreError, StoreResult};
use crate::models::grade::{Grade, GradeView, NewGrade, Score};
use crate::models::student::{NewStudent, Student, StudentChanges};
use crate::models::subject::{NewSubject, Subject};

#[derive(Debug, Default)]
struct Tables {
    students: BTreeMap<i64, Student>,
    subjects: BTreeMap<i64, Subject>,
    grades: BTreeMap<i64, Grade>,
    next_student_id: i64,
    next_subject_id: i64,
    next_grade_id: i64,
}

impl Tables {
    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.students
            .values()
            .any(|s| s.email == email && Some(s.student_id) != except)
    }

    fn subject_name_taken(&self, name: &str, except: Option<i64>) -> bool {
        self.subjects
            .values()
            .any(|s| s.name == name && Some(s.subject_id) != except)
    }

    fn view(&self, grade: &Grade) -> Option<GradeView> {
        Some(GradeView {
            grade: grade.clone(),
            student: self.students.get(&grade.student_id)?.clone(),
            subject: self.subjects.get(&grade.subject_id)?.clone(),
        })
    }
}

/// Ids start at 1 and are never reused, like a `BIGSERIAL` column.
#[derive(Debug, Default)]
pub struct MemoryStore {
    tables: RwLock<Tables>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn next_id(counter: &mut i64) -> i64 {
    *counter += 1;
    *counter
}

#[async_trait]
impl SchoolStore for MemoryStore {
    async fn create_student(&self, new: NewStudent) -> StoreResult<Student> {
        let mut tables = self.tables.write().await;
        if tables.email_taken(&new.email, None) {
            return Err(StoreError::Duplicate("email".into()));
        }
        let student = Student {
            student_id: next_id(&mut tables.next_student_id),
            name: new.name,
            group: new.group,
            email: new.email,
        };
        tables.students.insert(student.student_id, student.clone());
        Ok(student)
    }

    async fn list_students(&self) -> StoreResult<Vec<Student>> {
        Ok(self.tables.read().await.students.values().cloned().collect())
    }

    async fn find_student(&self, student_id: i64) -> StoreResult<Option<Student>> {
        Ok(self.tables.read().await.students.get(&student_id).cloned())
    }

    async fn update_student(
        &self,
        student_id: i64,
        changes: StudentChanges,
    ) -> StoreResult<Option<Student>> {
        let mut tables = self.tables.write().await;
        if let Some(email) = &changes.email {
            if tables.students.contains_key(&student_id)
                && tables.email_taken(email, Some(student_id))
            {
                return Err(StoreError::Duplicate("email".into()));
            }
        }
        let Some(student) = tables.students.get_mut(&student_id) else {
            return Ok(None);
        };
        changes.apply(student);
        Ok(Some(student.clone()))
    }

    async fn delete_student(&self, student_id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.students.remove(&student_id).is_none() {
            return Ok(false);
        }
        tables.grades.retain(|_, g| g.student_id != student_id);
        Ok(true)
    }

    async fn create_subject(&self, new: NewSubject) -> StoreResult<Subject> {
        let mut tables = self.tables.write().await;
        if tables.subject_name_taken(&new.name, None) {
            return Err(StoreError::Duplicate("name".into()));
        }
        let subject = Subject {
            subject_id: next_id(&mut tables.next_subject_id),
            name: new.name,
        };
        tables.subjects.insert(subject.subject_id, subject.clone());
        Ok(subject)
    }

    async fn list_subjects(&self) -> StoreResult<Vec<Subject>> {
        Ok(self.tables.read().await.subjects.values().cloned().collect())
    }

    async fn find_subject(&self, subject_id: i64) -> StoreResult<Option<Subject>> {
        Ok(self.tables.read().await.subjects.get(&subject_id).cloned())
    }

    async fn rename_subject(&self, subject_id: i64, name: String) -> StoreResult<Option<Subject>> {
        let mut tables = self.tables.write().await;
        if tables.subjects.contains_key(&subject_id)
            && tables.subject_name_taken(&name, Some(subject_id))
        {
            return Err(StoreError::Duplicate("name".into()));
        }
        let Some(subject) = tables.subjects.get_mut(&subject_id) else {
            return Ok(None);
        };
        subject.name = name;
        Ok(Some(subject.clone()))
    }

    async fn delete_subject(&self, subject_id: i64) -> StoreResult<bool> {
        let mut tables = self.tables.write().await;
        if tables.subjects.remove(&subject_id).is_none() {
            return Ok(false);
        }
        tables.grades.retain(|_, g| g.subject_id != subject_id);
        Ok(true)
    }

    async fn create_grade(&self, new: NewGrade) -> StoreResult<Grade> {
        let mut tables = self.tables.write().await;
        if !tables.students.contains_key(&new.student_id) {
            return Err(StoreError::MissingParent(Entity::Student, new.student_id));
        }
        if !tables.subjects.contains_key(&new.subject_id) {
            return Err(StoreError::MissingParent(Entity::Subject, new.subject_id));
        }
        let grade = Grade {
            grade_id: next_id(&mut tables.next_grade_id),
            student_id: new.student_id,
            subject_id: new.subject_id,
            grade: new.grade,
        };
        tables.grades.insert(grade.grade_id, grade.clone());
        Ok(grade)
    }

    async fn update_grade(&self, grade_id: i64, grade: Score) -> StoreResult<Option<Grade>> {
        let mut tables = self.tables.write().await;
        Ok(tables.grades.get_mut(&grade_id).map(|g| {
            g.grade = grade;
            g.clone()
        }))
    }

    async fn delete_grade(&self, grade_id: i64) -> StoreResult<bool> {
        Ok(self.tables.write().await.grades.remove(&grade_id).is_some())
    }

    async fn grade_view(&self, grade_id: i64) -> StoreResult<Option<GradeView>> {
        let tables = self.tables.read().await;
        Ok(tables.grades.get(&grade_id).and_then(|g| tables.view(g)))
    }

    async fn student_grade_view(
        &self,
        grade_id: i64,
        student_id: i64,
    ) -> StoreResult<Option<GradeView>> {
        let tables = self.tables.read().await;
        Ok(tables
            .grades
            .get(&grade_id)
            .filter(|g| g.student_id == student_id)
            .and_then(|g| tables.view(g)))
    }

    async fn student_grade_views(&self, student_id: i64) -> StoreResult<Vec<GradeView>> {
        let tables = self.tables.read().await;
        Ok(tables
            .grades
            .values()
            .filter(|g| g.student_id == student_id)
            .filter_map(|g| tables.view(g))
            .collect())
    }
}

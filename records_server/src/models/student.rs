//! Student: an enrolled pupil with a unique email.

use std::sync::LazyLock;

use diesel::prelude::*;
use regex::Regex;
use serde::{Deserialize, Serialize};

use super::bounded_text;
use crate::error::{AppError, AppResult};
use crate::schema::students;

static EMAIL_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^[A-Za-z0-9._%+\-]+@[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?(?:\.[A-Za-z0-9](?:[A-Za-z0-9\-]*[A-Za-z0-9])?)*\.[A-Za-z]{2,}$")
        .expect("email pattern compiles")
});

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = students)]
pub struct Student {
    pub student_id: i64,
    pub name: String,
    pub group: String,
    pub email: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = students)]
pub struct NewStudent {
    pub name: String,
    pub group: String,
    pub email: String,
}

/// Partial replacement; `None` fields keep their stored value.
#[derive(Debug, Clone, Default, AsChangeset)]
#[diesel(table_name = students)]
pub struct StudentChanges {
    pub name: Option<String>,
    pub group: Option<String>,
    pub email: Option<String>,
}

impl StudentChanges {
    pub fn apply(self, student: &mut Student) {
        if let Some(name) = self.name {
            student.name = name;
        }
        if let Some(group) = self.group {
            student.group = group;
        }
        if let Some(email) = self.email {
            student.email = email;
        }
    }
}

/// Body of `POST /students`.
#[derive(Debug, Deserialize)]
pub struct CreateStudentRequest {
    pub name: String,
    pub group: String,
    pub email: String,
}

impl CreateStudentRequest {
    pub fn validate(self) -> AppResult<NewStudent> {
        Ok(NewStudent {
            name: valid_name(&self.name)?,
            group: valid_group(&self.group)?,
            email: valid_email(&self.email)?,
        })
    }
}

/// Body of `PUT /students/{id}`.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateStudentRequest {
    pub name: Option<String>,
    pub group: Option<String>,
    pub email: Option<String>,
}

impl UpdateStudentRequest {
    pub fn validate(self) -> AppResult<StudentChanges> {
        if self.name.is_none() && self.group.is_none() && self.email.is_none() {
            return Err(AppError::invalid(
                "at least one of name, group or email is required",
            ));
        }
        Ok(StudentChanges {
            name: self.name.as_deref().map(valid_name).transpose()?,
            group: self.group.as_deref().map(valid_group).transpose()?,
            email: self.email.as_deref().map(valid_email).transpose()?,
        })
    }
}

fn valid_name(name: &str) -> AppResult<String> {
    bounded_text("name", name, 2, 100)
}

fn valid_group(group: &str) -> AppResult<String> {
    bounded_text("group", group, 1, 10)
}

fn valid_email(email: &str) -> AppResult<String> {
    let email = bounded_text("email", email, 3, 100)?;
    if !EMAIL_RE.is_match(&email) {
        return Err(AppError::invalid(format!("email '{email}' is not a valid address")));
    }
    Ok(email)
}

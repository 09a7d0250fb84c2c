//! Subject: a course with a unique name.

use diesel::prelude::*;
use serde::{Deserialize, Serialize};

use super::bounded_text;
use crate::error::AppResult;
use crate::schema::subjects;

#[derive(Debug, Clone, PartialEq, Eq, Queryable, Selectable, Serialize, Deserialize)]
#[diesel(table_name = subjects)]
pub struct Subject {
    pub subject_id: i64,
    pub name: String,
}

#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = subjects)]
pub struct NewSubject {
    pub name: String,
}

/// Body of both `POST /subjects` and `PUT /subjects/{id}`.
#[derive(Debug, Deserialize)]
pub struct SubjectRequest {
    pub name: String,
}

impl SubjectRequest {
    pub fn validate(self) -> AppResult<NewSubject> {
        Ok(NewSubject {
            name: bounded_text("name", &self.name, 2, 100)?,
        })
    }
}

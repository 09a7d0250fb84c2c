//! Grade: one score linking a student to a subject.
//!
//! Scores are held as hundredths so the two fractional digits stored in the
//! `NUMERIC(5,2)` column survive every round trip exactly.

use std::str::FromStr;

use bigdecimal::{BigDecimal, RoundingMode, ToPrimitive};
use diesel::prelude::*;
use serde::{Deserialize, Serialize};
use serde_json::value::RawValue;

use super::student::Student;
use super::subject::Subject;
use crate::error::{AppError, AppResult};
use crate::schema::grades;

const MAX_HUNDREDTHS: i64 = 100 * 100;

/// A grade value in `[0, 100]` with two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize)]
#[serde(into = "f64")]
pub struct Score(i64);

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ScoreError {
    #[error("grade must be a number (got {0})")]
    NotANumber(String),
    #[error("grade must be a finite number")]
    NotFinite,
    #[error("grade must be between 0 and 100 (got {0})")]
    OutOfRange(String),
}

impl Score {
    pub fn from_hundredths(hundredths: i64) -> Option<Self> {
        (0..=MAX_HUNDREDTHS).contains(&hundredths).then_some(Self(hundredths))
    }

    pub fn hundredths(self) -> i64 {
        self.0
    }

    pub fn to_decimal(self) -> BigDecimal {
        BigDecimal::new(self.0.into(), 2)
    }

    pub fn from_decimal(value: &BigDecimal) -> Option<Self> {
        let hundredths = (value.clone() * BigDecimal::from(100i64)).round(0).to_i64()?;
        Self::from_hundredths(hundredths)
    }

    /// Round half away from zero to the nearest hundredth, then range-check.
    pub fn round_decimal(value: &BigDecimal) -> Result<Self, ScoreError> {
        let rounded = value.with_scale_round(2, RoundingMode::HalfUp);
        Self::from_decimal(&rounded).ok_or_else(|| ScoreError::OutOfRange(value.to_string()))
    }
}

/// Parses the decimal text of a number, e.g. the raw JSON literal.
impl FromStr for Score {
    type Err = ScoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let text = s.trim();
        let value =
            BigDecimal::from_str(text).map_err(|_| ScoreError::NotANumber(text.to_string()))?;
        Self::round_decimal(&value)
    }
}

impl TryFrom<f64> for Score {
    type Error = ScoreError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        if !value.is_finite() {
            return Err(ScoreError::NotFinite);
        }
        // Display yields the shortest decimal that reads back as `value`.
        value.to_string().parse()
    }
}

impl From<Score> for f64 {
    fn from(score: Score) -> Self {
        score.hundredths() as f64 / 100.0
    }
}

/// Row as stored in `grades`.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = grades)]
pub struct GradeRow {
    pub grade_id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub grade: BigDecimal,
}

#[derive(Debug, Insertable)]
#[diesel(table_name = grades)]
pub struct NewGradeRow {
    pub student_id: i64,
    pub subject_id: i64,
    pub grade: BigDecimal,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Grade {
    pub grade_id: i64,
    pub student_id: i64,
    pub subject_id: i64,
    pub grade: Score,
}

impl TryFrom<GradeRow> for Grade {
    type Error = anyhow::Error;

    fn try_from(row: GradeRow) -> Result<Self, Self::Error> {
        let grade = Score::from_decimal(&row.grade).ok_or_else(|| {
            anyhow::anyhow!("grade {} holds out-of-range value {}", row.grade_id, row.grade)
        })?;
        Ok(Self {
            grade_id: row.grade_id,
            student_id: row.student_id,
            subject_id: row.subject_id,
            grade,
        })
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct NewGrade {
    pub student_id: i64,
    pub subject_id: i64,
    pub grade: Score,
}

impl From<NewGrade> for NewGradeRow {
    fn from(new: NewGrade) -> Self {
        Self {
            student_id: new.student_id,
            subject_id: new.subject_id,
            grade: new.grade.to_decimal(),
        }
    }
}

/// A grade with its student and subject attached.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradeView {
    #[serde(flatten)]
    pub grade: Grade,
    pub student: Student,
    pub subject: Subject,
}

/// Body of `POST /grades`. `grade` keeps its JSON literal so it is rounded
/// in decimal, not after a trip through `f64`.
#[derive(Debug, Deserialize)]
pub struct CreateGradeRequest {
    pub student_id: i64,
    pub subject_id: i64,
    pub grade: Box<RawValue>,
}

impl CreateGradeRequest {
    pub fn validate(self) -> AppResult<NewGrade> {
        if self.student_id < 1 {
            return Err(AppError::invalid("student_id must be a positive integer"));
        }
        if self.subject_id < 1 {
            return Err(AppError::invalid("subject_id must be a positive integer"));
        }
        Ok(NewGrade {
            student_id: self.student_id,
            subject_id: self.subject_id,
            grade: valid_score(&self.grade)?,
        })
    }
}

/// Body of `PUT /grades/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateGradeRequest {
    pub grade: Box<RawValue>,
}

impl UpdateGradeRequest {
    pub fn validate(&self) -> AppResult<Score> {
        valid_score(&self.grade)
    }
}

fn valid_score(raw: &RawValue) -> AppResult<Score> {
    raw.get()
        .parse::<Score>()
        .map_err(|e| AppError::invalid(e.to_string()))
}

//! Records services: validation, store calls, logging.

pub mod grade_service;
pub mod student_service;
pub mod subject_service;

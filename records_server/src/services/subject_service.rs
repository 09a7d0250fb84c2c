//! Subject CRUD.

use crate::error::{AppError, AppResult};
use crate::models::subject::{Subject, SubjectRequest};
use crate::store::{SchoolStore, StoreError};

fn not_found(subject_id: i64) -> AppError {
    AppError::not_found(format!("subject {subject_id} not found"))
}

fn name_conflict(err: StoreError, name: &str) -> AppError {
    match err {
        StoreError::Duplicate(_) => {
            AppError::invalid(format!("a subject named '{name}' already exists"))
        }
        err => err.into(),
    }
}

pub async fn create_subject(store: &dyn SchoolStore, req: SubjectRequest) -> AppResult<Subject> {
    let new_subject = req.validate()?;
    let name = new_subject.name.clone();
    let subject = store
        .create_subject(new_subject)
        .await
        .map_err(|e| name_conflict(e, &name))?;

    crate::metrics::write_recorded("subject", "create");
    tracing::info!(subject_id = subject.subject_id, name = %subject.name, "Subject created");
    Ok(subject)
}

pub async fn list_subjects(store: &dyn SchoolStore) -> AppResult<Vec<Subject>> {
    Ok(store.list_subjects().await?)
}

pub async fn get_subject(store: &dyn SchoolStore, subject_id: i64) -> AppResult<Subject> {
    store
        .find_subject(subject_id)
        .await?
        .ok_or_else(|| not_found(subject_id))
}

pub async fn update_subject(
    store: &dyn SchoolStore,
    subject_id: i64,
    req: SubjectRequest,
) -> AppResult<Subject> {
    let name = req.validate()?.name;
    let subject = store
        .rename_subject(subject_id, name.clone())
        .await
        .map_err(|e| name_conflict(e, &name))?
        .ok_or_else(|| not_found(subject_id))?;

    crate::metrics::write_recorded("subject", "update");
    tracing::info!(subject_id, name = %subject.name, "Subject renamed");
    Ok(subject)
}

/// Delete a subject; its grades go with it.
pub async fn delete_subject(store: &dyn SchoolStore, subject_id: i64) -> AppResult<()> {
    if !store.delete_subject(subject_id).await? {
        return Err(not_found(subject_id));
    }

    crate::metrics::write_recorded("subject", "delete");
    tracing::info!(subject_id, "Subject deleted with its grades");
    Ok(())
}

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::{app, AppState};
use crate::store::MemoryStore;

fn test_app() -> Router {
    app(AppState::new(Arc::new(MemoryStore::new())))
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    let body = match body {
        Some(value) => {
            builder = builder.header(header::CONTENT_TYPE, "application/json");
            Body::from(value.to_string())
        }
        None => Body::empty(),
    };
    let response = app
        .clone()
        .oneshot(builder.body(body).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

async fn create_student(app: &Router, name: &str, email: &str) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/students",
        Some(json!({ "name": name, "group": "1A", "email": email })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["student_id"].as_i64().unwrap()
}

async fn create_subject(app: &Router, name: &str) -> i64 {
    let (status, body) = send(app, "POST", "/api/subjects", Some(json!({ "name": name }))).await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["subject_id"].as_i64().unwrap()
}

async fn create_grade(app: &Router, student_id: i64, subject_id: i64, grade: f64) -> i64 {
    let (status, body) = send(
        app,
        "POST",
        "/api/grades",
        Some(json!({ "student_id": student_id, "subject_id": subject_id, "grade": grade })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    body["data"]["grade_id"].as_i64().unwrap()
}

#[tokio::test]
async fn root_reports_service() {
    let app = test_app();
    let (status, body) = send(&app, "GET", "/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["version"], env!("CARGO_PKG_VERSION"));
}

#[tokio::test]
async fn student_round_trip() {
    let app = test_app();
    let (status, body) = send(
        &app,
        "POST",
        "/api/students",
        Some(json!({ "name": "Ana", "group": "1A", "email": "ana@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["message"], "Student created successfully");
    let id = body["data"]["student_id"].as_i64().unwrap();

    let (status, body) = send(&app, "GET", &format!("/api/students/{id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({ "student_id": id, "name": "Ana", "group": "1A", "email": "ana@x.com" })
    );

    let (status, body) = send(&app, "GET", "/api/students", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn duplicate_email_is_rejected() {
    let app = test_app();
    create_student(&app, "Ana", "ana@x.com").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/students",
        Some(json!({ "name": "Ana Dos", "group": "1B", "email": "ana@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Bad Request");
    assert!(body["message"].as_str().unwrap().contains("ana@x.com"));

    let (_, body) = send(&app, "GET", "/api/students", None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn malformed_requests_are_bad_requests() {
    let app = test_app();

    let (status, body) = send(&app, "POST", "/api/students", Some(json!({ "name": "Ana" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("invalid data"));

    let (status, body) = send(
        &app,
        "POST",
        "/api/students",
        Some(json!({ "name": "Ana", "group": "1A", "email": "not-an-email" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("email"));

    // No JSON content type.
    let (status, _) = send(&app, "POST", "/api/subjects", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(&app, "GET", "/api/students/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().starts_with("invalid id"));
}

#[tokio::test]
async fn missing_rows_are_not_found() {
    let app = test_app();
    for (method, uri) in [
        ("GET", "/api/students/7"),
        ("DELETE", "/api/students/7"),
        ("GET", "/api/subjects/7"),
        ("DELETE", "/api/subjects/7"),
        ("DELETE", "/api/grades/7"),
        ("GET", "/api/grades/7/student/1"),
        ("GET", "/api/grades/student/7"),
    ] {
        let (status, body) = send(&app, method, uri, None).await;
        assert_eq!(status, StatusCode::NOT_FOUND, "{method} {uri}");
        assert_eq!(body["error"], "Not Found");
    }

    let (status, _) = send(&app, "PUT", "/api/students/7", Some(json!({ "group": "2B" }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "PUT", "/api/grades/7", Some(json!({ "grade": 50 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn student_update_is_partial() {
    let app = test_app();
    let id = create_student(&app, "Ana", "ana@x.com").await;
    create_student(&app, "Eva", "eva@x.com").await;
    let uri = format!("/api/students/{id}");

    let (status, body) = send(&app, "PUT", &uri, Some(json!({ "group": "2B" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["name"], "Ana");
    assert_eq!(body["data"]["group"], "2B");

    let (status, _) = send(&app, "PUT", &uri, Some(json!({}))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&app, "PUT", &uri, Some(json!({ "email": "eva@x.com" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = send(
        &app,
        "PUT",
        &uri,
        Some(json!({ "name": "Ana Ruiz", "group": "3C", "email": "ana.ruiz@x.com" })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body["data"],
        json!({ "student_id": id, "name": "Ana Ruiz", "group": "3C", "email": "ana.ruiz@x.com" })
    );
}

#[tokio::test]
async fn subject_lifecycle() {
    let app = test_app();
    let id = create_subject(&app, "Matemáticas").await;
    create_subject(&app, "Historia").await;

    let (status, body) = send(&app, "POST", "/api/subjects", Some(json!({ "name": "Historia" }))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["message"].as_str().unwrap().contains("Historia"));

    let uri = format!("/api/subjects/{id}");
    let (status, body) = send(&app, "PUT", &uri, Some(json!({ "name": "Álgebra" }))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!({ "subject_id": id, "name": "Álgebra" }));

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({ "message": "Subject deleted successfully" }));

    let (_, body) = send(&app, "GET", "/api/subjects", None).await;
    assert_eq!(body["data"], json!([{ "subject_id": 2, "name": "Historia" }]));
}

#[tokio::test]
async fn grade_is_created_with_parents_attached() {
    let app = test_app();
    let student = create_student(&app, "Ana", "ana@x.com").await;
    let subject = create_subject(&app, "Física").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/grades",
        Some(json!({ "student_id": student, "subject_id": subject, "grade": 95.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    let data = &body["data"];
    assert_eq!(data["grade"], 95.5);
    assert_eq!(data["student"]["email"], "ana@x.com");
    assert_eq!(data["subject"], json!({ "subject_id": subject, "name": "Física" }));
}

#[tokio::test]
async fn out_of_range_grade_is_rejected_before_write() {
    let app = test_app();
    let student = create_student(&app, "Ana", "ana@x.com").await;
    let subject = create_subject(&app, "Física").await;

    for grade in [-1.0, 100.5, 250.0] {
        let (status, body) = send(
            &app,
            "POST",
            "/api/grades",
            Some(json!({ "student_id": student, "subject_id": subject, "grade": grade })),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{grade}");
        assert!(body["message"].as_str().unwrap().contains("between 0 and 100"));
    }

    let (status, body) = send(&app, "GET", &format!("/api/grades/student/{student}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn grade_for_missing_parent_is_not_found() {
    let app = test_app();
    let student = create_student(&app, "Ana", "ana@x.com").await;
    let subject = create_subject(&app, "Física").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/grades",
        Some(json!({ "student_id": 99, "subject_id": subject, "grade": 80 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "student 99 not found");

    let (status, body) = send(
        &app,
        "POST",
        "/api/grades",
        Some(json!({ "student_id": student, "subject_id": 99, "grade": 80 })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "subject 99 not found");

    let (_, body) = send(&app, "GET", &format!("/api/grades/student/{student}"), None).await;
    assert_eq!(body["data"], json!([]));
}

#[tokio::test]
async fn grade_update_keeps_two_decimals() {
    let app = test_app();
    let student = create_student(&app, "Ana", "ana@x.com").await;
    let other = create_student(&app, "Eva", "eva@x.com").await;
    let subject = create_subject(&app, "Física").await;
    let grade = create_grade(&app, student, subject, 70.0).await;

    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/grades/{grade}"),
        Some(json!({ "grade": 87.5 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["grade"], 87.5);

    let (status, body) = send(
        &app,
        "GET",
        &format!("/api/grades/{grade}/student/{student}"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["grade"], 87.5);
    assert_eq!(body["data"]["grade_id"], grade);

    let (status, _) = send(&app, "GET", &format!("/api/grades/{grade}/student/{other}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "PUT",
        &format!("/api/grades/{grade}"),
        Some(json!({ "grade": 101 })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn deleting_parents_cascades_to_grades() {
    let app = test_app();
    let ana = create_student(&app, "Ana", "ana@x.com").await;
    let eva = create_student(&app, "Eva", "eva@x.com").await;
    let math = create_subject(&app, "Math").await;
    let art = create_subject(&app, "Art").await;

    let ana_math = create_grade(&app, ana, math, 90.0).await;
    create_grade(&app, ana, art, 85.0).await;
    create_grade(&app, eva, math, 75.0).await;
    create_grade(&app, eva, art, 65.0).await;

    let (status, body) = send(&app, "DELETE", &format!("/api/students/{ana}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert!(body.get("data").is_none());

    let (status, _) = send(&app, "GET", &format!("/api/grades/{ana_math}/student/{ana}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    let (status, _) = send(&app, "GET", &format!("/api/grades/student/{ana}"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, body) = send(&app, "GET", &format!("/api/grades/student/{eva}"), None).await;
    assert_eq!(body["data"].as_array().unwrap().len(), 2);

    send(&app, "DELETE", &format!("/api/subjects/{art}"), None).await;
    let (_, body) = send(&app, "GET", &format!("/api/grades/student/{eva}"), None).await;
    let grades = body["data"].as_array().unwrap();
    assert_eq!(grades.len(), 1);
    assert_eq!(grades[0]["subject"]["name"], "Math");
}

#[tokio::test]
async fn grade_delete_acknowledges_once() {
    let app = test_app();
    let student = create_student(&app, "Ana", "ana@x.com").await;
    let subject = create_subject(&app, "Física").await;
    let grade = create_grade(&app, student, subject, 60.0).await;
    let uri = format!("/api/grades/{grade}");

    let (status, body) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Grade deleted successfully");

    let (status, _) = send(&app, "DELETE", &uri, None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    // The student is untouched by grade deletion.
    let (status, _) = send(&app, "GET", &format!("/api/students/{student}"), None).await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn unknown_grade_is_reported_before_bad_value() {
    let app = test_app();
    let (status, body) = send(&app, "PUT", "/api/grades/999", Some(json!({ "grade": 101 }))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["message"], "grade 999 not found");
}

#[tokio::test]
async fn grade_ties_round_half_away_from_zero() {
    let app = test_app();
    let student = create_student(&app, "Ana", "ana@x.com").await;
    let subject = create_subject(&app, "Física").await;

    let (status, body) = send(
        &app,
        "POST",
        "/api/grades",
        Some(json!({ "student_id": student, "subject_id": subject, "grade": 1.005 })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED, "{body}");
    assert_eq!(body["data"]["grade"], 1.01);

    let grade = body["data"]["grade_id"].as_i64().unwrap();
    let (status, body) = send(
        &app,
        "PUT",
        &format!("/api/grades/{grade}"),
        Some(json!({ "grade": 100.004 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["data"]["grade"], 100.0);
}

#[tokio::test]
async fn unmatched_requests_use_error_envelope() {
    let app = test_app();

    let (status, body) = send(&app, "GET", "/api/nothing", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"], "Not Found");
    assert_eq!(body["message"], "no route for /api/nothing");

    let (status, body) = send(&app, "GET", "/api/grades/5", None).await;
    assert_eq!(status, StatusCode::METHOD_NOT_ALLOWED);
    assert_eq!(body["error"], "Method Not Allowed");
    assert_eq!(body["message"], "GET is not allowed on /api/grades/5");
}

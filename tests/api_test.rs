//! HTTP tests: the real router over an in-memory SQLite database, driven
//! with `tower::ServiceExt::oneshot`.

mod common;

use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tower::ServiceExt;

use clinic_booking::api::{create_router, AppState};
use clinic_booking::domain::{Actor, ProcessPayment};
use clinic_booking::services::ServiceContainer;

use common::{spawn, unique_email, TestApp, MONDAY, PASSWORD};

fn router(app: &TestApp) -> Router {
    create_router(AppState::from_container(&app.services, app.database.clone()))
}

async fn send(
    router: &Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header(header::AUTHORIZATION, format!("Bearer {}", token));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

async fn login(router: &Router, email: &str) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    body["access_token"].as_str().unwrap().to_string()
}

async fn token_for(app: &TestApp, router: &Router, actor: Actor) -> String {
    let user = app.services.auth().current_user(actor).await.unwrap();
    login(router, &user.email).await
}

async fn register(router: &Router) -> String {
    let email = unique_email("http");
    let (status, body) = send(
        router,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "name": "Amina", "email": email, "password": PASSWORD })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["role"], "patient");
    email
}

#[tokio::test]
async fn test_health_pings_the_database() {
    let app = spawn().await;
    let router = router(&app);

    let (status, body) = send(&router, Method::GET, "/health", None, None).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["database"]["status"], "healthy");
}

#[tokio::test]
async fn test_register_login_and_me() {
    let app = spawn().await;
    let router = router(&app);

    let email = register(&router).await;
    let token = login(&router, &email).await;

    let (status, body) = send(&router, Method::GET, "/auth/me", Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], email);
    assert!(body.get("password_hash").is_none());
}

#[tokio::test]
async fn test_duplicate_registration_returns_conflict() {
    let app = spawn().await;
    let router = router(&app);
    let email = register(&router).await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "name": "Again", "email": email, "password": PASSWORD })),
    )
    .await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["code"], "CONFLICT");
}

#[tokio::test]
async fn test_invalid_payload_returns_validation_error() {
    let app = spawn().await;
    let router = router(&app);

    let (status, body) = send(
        &router,
        Method::POST,
        "/auth/register",
        None,
        Some(json!({ "name": "Amina", "email": "not-an-email", "password": "short" })),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_wrong_password_is_unauthorized() {
    let app = spawn().await;
    let router = router(&app);
    let email = register(&router).await;

    let (status, body) = send(
        &router,
        Method::POST,
        "/auth/login",
        None,
        Some(json!({ "email": email, "password": "wrong-password" })),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["error"]["code"], "INVALID_CREDENTIALS");
}

#[tokio::test]
async fn test_protected_routes_require_a_token() {
    let app = spawn().await;
    let router = router(&app);

    for uri in ["/auth/me", "/appointments/mine", "/admin/appointments", "/doctors/me/profile"] {
        let (status, _) = send(&router, Method::GET, uri, None, None).await;
        assert_eq!(status, StatusCode::UNAUTHORIZED, "{}", uri);
    }

    let (status, _) = send(
        &router,
        Method::GET,
        "/appointments/mine",
        Some("not-a-jwt"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_patient_is_forbidden_from_admin_routes() {
    let app = spawn().await;
    let router = router(&app);
    let email = register(&router).await;
    let token = login(&router, &email).await;

    let (status, body) = send(&router, Method::GET, "/admin/appointments", Some(&token), None).await;

    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

#[tokio::test]
async fn test_booking_over_http() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1200.0).await;
    let router = router(&app);
    let email = register(&router).await;
    let token = login(&router, &email).await;

    let slots_uri = format!(
        "/appointments/doctor/{}/available_slots?date={}&duration=30",
        profile.id, MONDAY
    );
    let (status, body) = send(&router, Method::GET, &slots_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["day_of_week"], "Monday");
    assert_eq!(body["slots"][0]["start_time"], "09:00");
    assert_eq!(body["slots"].as_array().unwrap().len(), 2);

    let request = json!({
        "doctor_id": profile.id,
        "date": MONDAY,
        "slot": "09:00",
        "reason": "Persistent headaches"
    });
    let (status, body) = send(
        &router,
        Method::POST,
        "/appointments/book",
        Some(&token),
        Some(request.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["status"], "pending");
    let appointment_id = body["id"].as_str().unwrap().to_string();

    let (status, body) = send(
        &router,
        Method::POST,
        "/appointments/book",
        Some(&token),
        Some(request),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["error"]["message"], "This time slot is already booked");

    let booked_uri = format!("/doctors/{}/booked_slots?date={}", profile.id, MONDAY);
    let (status, body) = send(&router, Method::GET, &booked_uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["booked"], json!(["09:00"]));

    let cancel_uri = format!("/appointments/cancel/{}", appointment_id);
    let (status, body) = send(&router, Method::PUT, &cancel_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "cancelled");

    let (status, body) = send(&router, Method::PUT, &cancel_uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "INVALID_TRANSITION");
}

#[tokio::test]
async fn test_public_directory() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 900.0).await;
    let router = router(&app);

    let (status, body) = send(&router, Method::GET, "/doctors", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
    assert_eq!(body[0]["consultation_fee"], 900.0);

    let uri = format!("/doctors/{}/availability", profile.id);
    let (status, body) = send(&router, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body[0]["day_of_week"], "Monday");
    assert_eq!(body[0]["start_time"], "09:00");
    assert_eq!(body[0]["end_time"], "10:00");

    let (status, body) = send(&router, Method::GET, "/specialities", None, None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);
}

#[tokio::test]
async fn test_unknown_appointment_is_not_found() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (doctor, _) = app.doctor(admin, 900.0).await;
    let router = router(&app);

    let user = app
        .services
        .auth()
        .current_user(doctor)
        .await
        .unwrap();
    let token = login(&router, &user.email).await;

    let uri = format!("/appointments/{}/approve", uuid::Uuid::new_v4());
    let (status, body) = send(&router, Method::PUT, &uri, Some(&token), None).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Appointment not found");
}

#[tokio::test]
async fn test_malformed_path_ids_return_validation_errors() {
    let app = spawn().await;
    let admin = app.admin().await;
    let router = router(&app);
    let token = token_for(&app, &router, admin).await;

    let cases = [
        (Method::GET, "/specialities/not-a-uuid"),
        (Method::GET, "/doctors/not-a-uuid/availability"),
        (Method::PUT, "/appointments/not-a-uuid/approve"),
        (Method::PUT, "/appointments/cancel/not-a-uuid"),
        (Method::GET, "/appointments/consultation/not-a-uuid"),
        (Method::GET, "/payments/appointment/not-a-uuid"),
        (Method::POST, "/admin/applications/not-a-uuid/reject"),
        (Method::DELETE, "/admin/appointments/not-a-uuid"),
    ];

    for (method, uri) in cases {
        let (status, body) = send(&router, method, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{}", uri);
    }
}

#[tokio::test]
async fn test_malformed_query_strings_return_validation_errors() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (_, profile) = app.doctor(admin, 1000.0).await;
    let router = router(&app);
    let email = register(&router).await;
    let token = login(&router, &email).await;

    let cases = [
        format!("/appointments/doctor/{}/available_slots", profile.id),
        format!(
            "/appointments/doctor/{}/available_slots?date={}&duration=half",
            profile.id, MONDAY
        ),
        format!("/doctors/{}/booked_slots", profile.id),
    ];

    for uri in &cases {
        let (status, body) = send(&router, Method::GET, uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{}", uri);
        assert_eq!(body["error"]["code"], "VALIDATION_ERROR", "{}", uri);
    }

    let uri = format!("/doctors/{}/booked_slots?date=10-06-2030", profile.id);
    let (status, body) = send(&router, Method::GET, &uri, None, None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_payment_lookup_over_http() {
    let app = spawn().await;
    let admin = app.admin().await;
    let (doctor, profile) = app.doctor(admin, 1500.0).await;
    let patient = app.patient().await;
    let stranger = app.patient().await;

    let booked = app.book(patient, profile.id, "09:00").await;
    app.services.appointments().approve(doctor, booked.id).await.unwrap();
    let router = router(&app);
    let uri = format!("/payments/appointment/{}", booked.id);

    let patient_token = token_for(&app, &router, patient).await;
    let (status, body) = send(&router, Method::GET, &uri, Some(&patient_token), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["error"]["message"], "Payment not found");

    let receipt = app
        .services
        .payments()
        .pay(
            patient,
            ProcessPayment {
                appointment_id: booked.id,
                payment_method: "card".into(),
            },
        )
        .await
        .unwrap();

    for viewer in [patient, doctor, admin] {
        let token = token_for(&app, &router, viewer).await;
        let (status, body) = send(&router, Method::GET, &uri, Some(&token), None).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["transaction_id"], receipt.payment.transaction_id.as_str());
        assert_eq!(body["amount"], 1500.0);
        assert_eq!(body["status"], "completed");
    }

    let token = token_for(&app, &router, stranger).await;
    let (status, body) = send(&router, Method::GET, &uri, Some(&token), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(body["error"]["code"], "FORBIDDEN");
}

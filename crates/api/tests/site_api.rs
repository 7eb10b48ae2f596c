mod common;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::{Duration, Utc};
use common::{
    body_json, delete_auth, get, get_auth, post_json, post_json_auth, put_json_auth,
    user_with_token, TEST_PASSWORD,
};
use serde_json::json;
use sqlx::PgPool;
use tower::ServiceExt;

async fn set_maintenance(app: axum::Router, admin: &str, on: bool) {
    let response = put_json_auth(
        app,
        "/api/v1/admin/settings",
        admin,
        json!({ "maintenance_mode": on }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["maintenance_mode"], on);
}

// ---------------------------------------------------------------------------
// Settings and maintenance mode
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_default_settings_enable_everything(pool: PgPool) {
    let app = common::build_test_app(pool);
    let response = get(app, "/api/v1/settings").await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["maintenance_mode"], false);
    assert_eq!(json["enable_weekly_poll"], true);
    assert_eq!(json["enable_user_registration"], true);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_settings_update_requires_manage_site(pool: PgPool) {
    let (_, editor) = user_with_token(&pool, "chief", "editor").await;
    let (_, student) = user_with_token(&pool, "kid", "student").await;
    let app = common::build_test_app(pool);

    let body = json!({ "maintenance_mode": true });
    let response = put_json_auth(app.clone(), "/api/v1/admin/settings", &editor, body.clone()).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = put_json_auth(app, "/api/v1/admin/settings", &student, body).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_maintenance_blocks_public_api(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let (_, student) = user_with_token(&pool, "kid", "student").await;
    let app = common::build_test_app(pool);

    set_maintenance(app.clone(), &admin, true).await;

    let response = get(app.clone(), "/api/v1/posts").await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body_json(response).await["code"], "MAINTENANCE");

    let response = get_auth(app.clone(), "/api/v1/me", &student).await;
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    // Admins keep full access.
    let response = get_auth(app.clone(), "/api/v1/posts", &admin).await;
    assert_eq!(response.status(), StatusCode::OK);

    // Health lives outside the API tree.
    let response = get(app, "/health").await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_maintenance_exempt_paths(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);

    set_maintenance(app.clone(), &admin, true).await;

    let response = get(app.clone(), "/api/v1/settings").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["maintenance_mode"], true);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/token",
        json!({ "username": "root", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    set_maintenance(app.clone(), &admin, false).await;
    let response = get(app, "/api/v1/posts").await;
    assert_eq!(response.status(), StatusCode::OK);
}

// ---------------------------------------------------------------------------
// Notifications, events, changelog, legal documents
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_notifications_render_markdown(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/notifications",
        &admin,
        json!({ "text": "School is **closed** tomorrow" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/notifications",
        &admin,
        json!({ "text": "Hidden", "enabled": false }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = get(app.clone(), "/api/v1/notifications").await;
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(
        items[0]["html_text"],
        "<p>School is <strong>closed</strong> tomorrow</p>"
    );

    let uri = format!("/api/v1/admin/notifications/{}", created["id"]);
    let response = delete_auth(app.clone(), &uri, &admin).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get(app, "/api/v1/notifications").await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_events_list_only_upcoming(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);
    let now = Utc::now();

    for (title, starts_at) in [
        ("Sports day", now + Duration::days(3)),
        ("Last year's prom", now - Duration::days(300)),
    ] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/admin/events",
            &admin,
            json!({ "title": title, "starts_at": starts_at }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get(app, "/api/v1/events").await;
    let json = body_json(response).await;
    let events = json["data"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "Sports day");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_event_end_before_start_rejected(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);
    let now = Utc::now();

    let response = post_json_auth(
        app,
        "/api/v1/admin/events",
        &admin,
        json!({
            "title": "Backwards",
            "starts_at": now + Duration::days(2),
            "ends_at": now + Duration::days(1),
        }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_event_update_checks_stored_start_and_clears_end(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);
    let now = Utc::now();

    let response = post_json_auth(
        app.clone(),
        "/api/v1/admin/events",
        &admin,
        json!({
            "title": "Science fair",
            "location": "Gym",
            "starts_at": now + Duration::days(5),
            "ends_at": now + Duration::days(6),
        }),
    )
    .await;
    let id = body_json(response).await["id"].as_i64().unwrap();
    let uri = format!("/api/v1/admin/events/{id}");

    // Only the end is sent; it is compared with the stored start.
    let response = put_json_auth(
        app.clone(),
        &uri,
        &admin,
        json!({ "ends_at": now + Duration::days(1) }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(app, &uri, &admin, json!({ "ends_at": null })).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["ends_at"].is_null());
    assert_eq!(json["location"], "Gym");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_changelog_starts_empty(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);

    let response = get(app.clone(), "/api/v1/changelog").await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["data"].is_null());

    let response = put_json_auth(
        app.clone(),
        "/api/v1/admin/changelog",
        &admin,
        json!({ "content": "v2: new poll page" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get(app, "/api/v1/changelog").await;
    assert_eq!(body_json(response).await["data"]["content"], "v2: new poll page");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_latest_legal_document_wins(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);

    for content in ["Terms v1", "Terms v2"] {
        let response = post_json_auth(
            app.clone(),
            "/api/v1/admin/legal/terms",
            &admin,
            json!({ "content": content }),
        )
        .await;
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = get(app.clone(), "/api/v1/legal/terms").await;
    assert_eq!(body_json(response).await["data"]["content"], "Terms v2");

    let response = get(app, "/api/v1/legal/privacy").await;
    assert!(body_json(response).await["data"].is_null());
}

// ---------------------------------------------------------------------------
// Contact and consent
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_contact_submission_flow(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/contact",
        json!({ "name": "Parent", "email": "parent@example.com", "message": "Hello!" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json(
        app.clone(),
        "/api/v1/contact",
        json!({ "name": "Parent", "email": "not-an-email", "message": "Hello!" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(app, "/api/v1/admin/contact", &admin).await;
    let json = body_json(response).await;
    let items = json["data"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert!(items[0]["user_id"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_consent_records_client_ip(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let app = common::build_test_app(pool);

    let request = Request::builder()
        .method("POST")
        .uri("/api/v1/consent")
        .header("content-type", "application/json")
        .header("x-forwarded-for", "203.0.113.7, 10.0.0.1")
        .body(Body::from(
            json!({ "consent_status": "ACCEPTED", "analytical_accepted": true }).to_string(),
        ))
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["ip_address"], "203.0.113.7");
    assert_eq!(json["policy_version"], "v1.0");

    let response = post_json(
        app.clone(),
        "/api/v1/consent",
        json!({ "consent_status": "MAYBE" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = get_auth(app, "/api/v1/admin/consent?status=ACCEPTED", &admin).await;
    assert_eq!(body_json(response).await["data"].as_array().unwrap().len(), 1);
}

// ---------------------------------------------------------------------------
// User administration
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_role_change_applies_to_new_tokens(pool: PgPool) {
    let (_, admin) = user_with_token(&pool, "root", "admin").await;
    let (student, _) = user_with_token(&pool, "kid", "student").await;
    let app = common::build_test_app(pool);

    let response = put_json_auth(
        app.clone(),
        &format!("/api/v1/admin/users/{}/role", student.id),
        &admin,
        json!({ "role": "author" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["role"], "author");

    let token = common::login_for_token(app.clone(), "kid", TEST_PASSWORD).await;
    let response = get_auth(app.clone(), "/api/v1/me", &token).await;
    let json = body_json(response).await;
    assert_eq!(json["role"], "author");
    assert_eq!(json["permissions"], json!(["view_only_posts"]));

    let response = put_json_auth(
        app,
        &format!("/api/v1/admin/users/{}/role", student.id),
        &admin,
        json!({ "role": "janitor" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_deactivate_user(pool: PgPool) {
    let (admin_user, admin) = user_with_token(&pool, "root", "admin").await;
    let (student, student_token) = user_with_token(&pool, "kid", "student").await;
    let app = common::build_test_app(pool);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/token",
        json!({ "username": "kid", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let refresh_token = body_json(response).await["refresh_token"]
        .as_str()
        .unwrap()
        .to_string();

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/admin/users/{}", admin_user.id),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = delete_auth(
        app.clone(),
        &format!("/api/v1/admin/users/{}", student.id),
        &admin,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    // Tokens issued before deactivation stop working immediately.
    let response = get_auth(app.clone(), "/api/v1/me", &student_token).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        app.clone(),
        "/api/v1/auth/token/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = post_json(
        app,
        "/api/v1/auth/token",
        json!({ "username": "kid", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

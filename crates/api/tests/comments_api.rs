mod common;

use axum::http::StatusCode;
use common::{body_json, delete_auth, get, get_auth, post_json_auth, user_with_token};
use schoolhub_db::models::category::CreateCategory;
use schoolhub_db::models::post::CreatePost;
use schoolhub_db::repositories::{CategoryRepo, PostRepo};
use serde_json::json;
use sqlx::PgPool;

/// Create a public post authored by a fresh admin and return its id.
async fn public_post(pool: &PgPool) -> i64 {
    let (admin, _) = user_with_token(pool, "root", "admin").await;
    let category = CategoryRepo::create(
        pool,
        &CreateCategory {
            full_name: "News".to_string(),
            short_name: "news".to_string(),
        },
    )
    .await
    .unwrap();
    PostRepo::create(
        pool,
        &CreatePost {
            title: "Open day".to_string(),
            category_id: category.id,
            banner: String::new(),
            hook: String::new(),
            content: "Come visit".to_string(),
            author_id: admin.id,
            published: true,
            allowed: true,
        },
    )
    .await
    .unwrap()
    .id
}

async fn comment(app: axum::Router, token: &str, post_id: i64, body: serde_json::Value) -> serde_json::Value {
    let response = post_json_auth(app, &format!("/api/v1/posts/{post_id}/comments"), token, body).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    body_json(response).await
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_create_and_list_comments(pool: PgPool) {
    let post_id = public_post(&pool).await;
    let (_, student) = user_with_token(&pool, "kid", "student").await;
    let app = common::build_test_app(pool);

    let created = comment(app.clone(), &student, post_id, json!({ "content": "  Great news!  " })).await;
    assert_eq!(created["content"], "Great news!");
    assert_eq!(created["username"], "kid");
    assert!(created["parent_id"].is_null());

    let response = get(app, &format!("/api/v1/posts/{post_id}/comments")).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_anonymous_cannot_comment(pool: PgPool) {
    let post_id = public_post(&pool).await;
    let app = common::build_test_app(pool);

    let response = common::post_json(
        app,
        &format!("/api/v1/posts/{post_id}/comments"),
        json!({ "content": "hello" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reply_to_reply_is_flattened(pool: PgPool) {
    let post_id = public_post(&pool).await;
    let (_, alice) = user_with_token(&pool, "alice", "student").await;
    let (_, bob) = user_with_token(&pool, "bob", "student").await;
    let app = common::build_test_app(pool);

    let top = comment(app.clone(), &alice, post_id, json!({ "content": "Top" })).await;
    let top_id = top["id"].as_i64().unwrap();

    let reply = comment(
        app.clone(),
        &bob,
        post_id,
        json!({ "content": "Reply", "parent_id": top_id }),
    )
    .await;
    assert_eq!(reply["parent_id"], top_id);
    assert_eq!(reply["parent_username"], "alice");

    let nested = comment(
        app,
        &alice,
        post_id,
        json!({ "content": "Reply to reply", "parent_id": reply["id"] }),
    )
    .await;
    assert_eq!(nested["parent_id"], top_id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_empty_comment_rejected(pool: PgPool) {
    let post_id = public_post(&pool).await;
    let (_, student) = user_with_token(&pool, "kid", "student").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        &format!("/api/v1/posts/{post_id}/comments"),
        &student,
        json!({ "content": "   " }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cannot_comment_on_withheld_post(pool: PgPool) {
    let post_id = public_post(&pool).await;
    PostRepo::set_allowed(&pool, post_id, false).await.unwrap().unwrap();
    let (_, student) = user_with_token(&pool, "kid", "student").await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        &format!("/api/v1/posts/{post_id}/comments"),
        &student,
        json!({ "content": "hello" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get(app, &format!("/api/v1/posts/{post_id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comment_rate_limit(pool: PgPool) {
    let post_id = public_post(&pool).await;
    let (_, student) = user_with_token(&pool, "kid", "student").await;
    let app = common::build_test_app(pool);

    for i in 0..5 {
        comment(app.clone(), &student, post_id, json!({ "content": format!("Comment {i}") })).await;
    }

    let response = post_json_auth(
        app,
        &format!("/api/v1/posts/{post_id}/comments"),
        &student,
        json!({ "content": "One too many" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    assert!(response.headers().contains_key("retry-after"));
    let json = body_json(response).await;
    assert_eq!(json["code"], "RATE_LIMITED");
    assert!(json["retry_after_secs"].as_i64().unwrap() >= 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_comment_rate_limit_holds_under_concurrent_posts(pool: PgPool) {
    let post_id = public_post(&pool).await;
    let (_, student) = user_with_token(&pool, "kid", "student").await;
    let app = common::build_test_app(pool.clone());

    let mut handles = Vec::new();
    for i in 0..20 {
        let app = app.clone();
        let token = student.clone();
        handles.push(tokio::spawn(async move {
            post_json_auth(
                app,
                &format!("/api/v1/posts/{post_id}/comments"),
                &token,
                json!({ "content": format!("Burst {i}") }),
            )
            .await
            .status()
        }));
    }

    let mut created = 0;
    let mut limited = 0;
    for handle in handles {
        match handle.await.unwrap() {
            StatusCode::CREATED => created += 1,
            StatusCode::TOO_MANY_REQUESTS => limited += 1,
            other => panic!("unexpected status {other}"),
        }
    }
    assert_eq!(created, 5);
    assert_eq!(limited, 15);

    let stored: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM comments WHERE post_id = $1")
        .bind(post_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(stored, 5);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_own_but_not_others(pool: PgPool) {
    let post_id = public_post(&pool).await;
    let (_, alice) = user_with_token(&pool, "alice", "student").await;
    let (_, bob) = user_with_token(&pool, "bob", "student").await;
    let (_, moderator) = user_with_token(&pool, "mod", "moderator").await;
    let app = common::build_test_app(pool);

    let first = comment(app.clone(), &alice, post_id, json!({ "content": "First" })).await;
    let second = comment(app.clone(), &alice, post_id, json!({ "content": "Second" })).await;

    let uri = format!("/api/v1/comments/{}", first["id"]);
    let response = delete_auth(app.clone(), &uri, &bob).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &uri, &alice).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let uri = format!("/api/v1/comments/{}", second["id"]);
    let response = delete_auth(app, &uri, &moderator).await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_comment_listing_requires_moderation(pool: PgPool) {
    let post_id = public_post(&pool).await;
    let (_, student) = user_with_token(&pool, "kid", "student").await;
    let (_, author) = user_with_token(&pool, "writer", "author").await;
    let (_, moderator) = user_with_token(&pool, "mod", "moderator").await;
    let app = common::build_test_app(pool);

    comment(app.clone(), &student, post_id, json!({ "content": "Hi" })).await;

    let response = get_auth(app.clone(), "/api/v1/admin/comments", &author).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(
        app,
        &format!("/api/v1/admin/comments?post_id={post_id}"),
        &moderator,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
}

//! Integration tests for comment threading queries and the rate-limit window.

mod common;

use assert_matches::assert_matches;
use chrono::Utc;
use sqlx::PgPool;
use schoolhub_core::comments::CommentRateLimit;
use schoolhub_db::models::comment::{Comment, CommentInsert, CreateComment};
use schoolhub_db::repositories::CommentRepo;

use common::{create_category, create_post, create_user};

fn comment(post_id: i64, user_id: i64, parent_id: Option<i64>, content: &str) -> CreateComment {
    CreateComment {
        post_id,
        user_id,
        parent_id,
        content: content.to_string(),
    }
}

/// Insert a comment with a limit no test reaches.
async fn insert(pool: &PgPool, input: &CreateComment) -> Comment {
    let limit = CommentRateLimit { max_comments: 1_000, window_secs: 60 };
    match CommentRepo::create_rate_limited(pool, input, &limit, Utc::now())
        .await
        .unwrap()
    {
        CommentInsert::Created(c) => c,
        other => panic!("expected a created comment, got {other:?}"),
    }
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_reply_counts_and_parent_username(pool: PgPool) {
    let alice = create_user(&pool, "alice", "student").await;
    let bob = create_user(&pool, "bob", "student").await;
    let cat = create_category(&pool, "news").await;
    let post = create_post(&pool, alice.id, cat.id, "Post", true, true).await;

    let top = insert(&pool, &comment(post.id, alice.id, None, "Top")).await;
    let reply = insert(&pool, &comment(post.id, bob.id, Some(top.id), "Reply")).await;
    assert_eq!(reply.parent_username.as_deref(), Some("alice"));
    assert_eq!(reply.reply_count, 0);

    let listed = CommentRepo::list_for_post(&pool, post.id).await.unwrap();
    assert_eq!(listed.len(), 2);
    // Newest first.
    assert_eq!(listed[0].id, reply.id);
    assert_eq!(listed[1].reply_count, 1);

    let parent = CommentRepo::find_parent_ref(&pool, reply.id).await.unwrap().unwrap();
    assert_eq!(parent.parent_id, Some(top.id));
    assert_eq!(parent.post_id, post.id);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_rate_limited_insert_stops_at_limit(pool: PgPool) {
    let alice = create_user(&pool, "alice", "student").await;
    let bob = create_user(&pool, "bob", "student").await;
    let cat = create_category(&pool, "news").await;
    let post = create_post(&pool, alice.id, cat.id, "Post", true, true).await;
    let limit = CommentRateLimit { max_comments: 3, window_secs: 60 };

    for i in 0..3 {
        let outcome = CommentRepo::create_rate_limited(
            &pool,
            &comment(post.id, alice.id, None, &format!("c{i}")),
            &limit,
            Utc::now(),
        )
        .await
        .unwrap();
        assert_matches!(outcome, CommentInsert::Created(_));
    }

    let outcome = CommentRepo::create_rate_limited(
        &pool,
        &comment(post.id, alice.id, None, "one too many"),
        &limit,
        Utc::now(),
    )
    .await
    .unwrap();
    assert_matches!(
        outcome,
        CommentInsert::RateLimited { retry_after_secs } if (1..=60).contains(&retry_after_secs)
    );
    assert_eq!(CommentRepo::list_for_post(&pool, post.id).await.unwrap().len(), 3);

    // The limit is per user.
    let outcome = CommentRepo::create_rate_limited(
        &pool,
        &comment(post.id, bob.id, None, "hi"),
        &limit,
        Utc::now(),
    )
    .await
    .unwrap();
    assert_matches!(outcome, CommentInsert::Created(_));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_cascades_to_replies(pool: PgPool) {
    let alice = create_user(&pool, "alice", "student").await;
    let cat = create_category(&pool, "news").await;
    let post = create_post(&pool, alice.id, cat.id, "Post", true, true).await;

    let top = insert(&pool, &comment(post.id, alice.id, None, "Top")).await;
    insert(&pool, &comment(post.id, alice.id, Some(top.id), "Reply")).await;

    assert!(CommentRepo::delete(&pool, top.id).await.unwrap());
    assert!(CommentRepo::list_for_post(&pool, post.id).await.unwrap().is_empty());
}

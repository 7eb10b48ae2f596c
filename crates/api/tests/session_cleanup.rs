mod common;

use std::time::Duration;

use chrono::Utc;
use schoolhub_api::background::session_cleanup;
use schoolhub_db::models::session::CreateSession;
use schoolhub_db::repositories::SessionRepo;
use sqlx::PgPool;
use tokio_util::sync::CancellationToken;

async fn session_count(pool: &PgPool) -> i64 {
    sqlx::query_scalar("SELECT COUNT(*) FROM user_sessions")
        .fetch_one(pool)
        .await
        .unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_cleanup_job_purges_on_start_and_stops_on_cancel(pool: PgPool) {
    let user = common::create_test_user(&pool, "kid", "student").await;
    for (hash, expires_at) in [
        ("expired", Utc::now() - chrono::Duration::hours(2)),
        ("live", Utc::now() + chrono::Duration::days(7)),
    ] {
        SessionRepo::create(
            &pool,
            &CreateSession {
                user_id: user.id,
                refresh_token_hash: hash.to_string(),
                expires_at,
                user_agent: None,
                ip_address: None,
            },
        )
        .await
        .unwrap();
    }

    let cancel = CancellationToken::new();
    let job = tokio::spawn(session_cleanup::run(pool.clone(), cancel.clone()));

    let mut remaining = session_count(&pool).await;
    for _ in 0..100 {
        if remaining == 1 {
            break;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
        remaining = session_count(&pool).await;
    }
    assert_eq!(remaining, 1);

    cancel.cancel();
    tokio::time::timeout(Duration::from_secs(5), job)
        .await
        .expect("job stops after cancellation")
        .unwrap();
}

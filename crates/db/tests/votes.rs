//! Integration tests for one-vote-per-user accounting on memes and songs.

mod common;

use sqlx::PgPool;
use schoolhub_db::models::meme::CreateMeme;
use schoolhub_db::models::song::CreateSongSuggestion;
use schoolhub_db::models::vote::VoteChange;
use schoolhub_db::repositories::{MemeRepo, SongRepo};

use common::create_user;

async fn create_meme(pool: &PgPool, user_id: i64) -> i64 {
    MemeRepo::create(
        pool,
        &CreateMeme {
            user_id,
            title: "Monday mood".to_string(),
            image_path: "memes/monday.png".to_string(),
        },
    )
    .await
    .unwrap()
    .id
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_meme_vote_once_and_unvote(pool: PgPool) {
    let owner = create_user(&pool, "owner", "student").await;
    let voter = create_user(&pool, "voter", "student").await;
    let meme_id = create_meme(&pool, owner.id).await;

    assert_eq!(
        MemeRepo::vote(&pool, meme_id, voter.id).await.unwrap(),
        VoteChange::Applied { votes: 1 }
    );
    assert_eq!(
        MemeRepo::vote(&pool, meme_id, voter.id).await.unwrap(),
        VoteChange::Unchanged
    );

    let seen = MemeRepo::find_by_id(&pool, meme_id, Some(voter.id))
        .await
        .unwrap()
        .unwrap();
    assert!(seen.has_voted);
    assert_eq!(seen.votes, 1);

    assert_eq!(
        MemeRepo::unvote(&pool, meme_id, voter.id).await.unwrap(),
        VoteChange::Applied { votes: 0 }
    );
    assert_eq!(
        MemeRepo::unvote(&pool, meme_id, voter.id).await.unwrap(),
        VoteChange::Unchanged
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_vote_on_missing_item(pool: PgPool) {
    let voter = create_user(&pool, "voter", "student").await;
    assert_eq!(
        MemeRepo::vote(&pool, 4242, voter.id).await.unwrap(),
        VoteChange::ItemMissing
    );
    assert_eq!(
        SongRepo::unvote(&pool, 4242, voter.id).await.unwrap(),
        VoteChange::ItemMissing
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_hidden_meme_visible_to_owner_only(pool: PgPool) {
    let owner = create_user(&pool, "owner", "student").await;
    let other = create_user(&pool, "other", "student").await;
    let moderator = create_user(&pool, "mod", "moderator").await;
    let meme_id = create_meme(&pool, owner.id).await;

    MemeRepo::set_approval(&pool, meme_id, false, moderator.id)
        .await
        .unwrap()
        .unwrap();

    assert!(MemeRepo::list_visible(&pool, None, 20, 0).await.unwrap().is_empty());
    assert!(MemeRepo::list_visible(&pool, Some(other.id), 20, 0)
        .await
        .unwrap()
        .is_empty());
    assert_eq!(
        MemeRepo::list_visible(&pool, Some(owner.id), 20, 0)
            .await
            .unwrap()
            .len(),
        1
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_song_pending_until_approved(pool: PgPool) {
    let owner = create_user(&pool, "owner", "student").await;
    let moderator = create_user(&pool, "mod", "moderator").await;

    let song = SongRepo::create(
        &pool,
        owner.id,
        &CreateSongSuggestion {
            title: "Bell tune".to_string(),
            link: "https://youtu.be/dQw4w9WgXcQ".to_string(),
            slot: "first_bell".to_string(),
            note: None,
        },
    )
    .await
    .unwrap();
    assert_eq!(song.status, "pending");

    assert!(SongRepo::list_visible(&pool, None, 20, 0).await.unwrap().is_empty());

    SongRepo::set_status(&pool, song.id, "approved", moderator.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(SongRepo::list_visible(&pool, None, 20, 0).await.unwrap().len(), 1);

    assert_eq!(
        SongRepo::vote(&pool, song.id, moderator.id).await.unwrap(),
        VoteChange::Applied { votes: 1 }
    );
    assert_eq!(SongRepo::bulk_delete(&pool, &[song.id, 777]).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_parallel_votes_by_one_user_count_once(pool: PgPool) {
    let owner = create_user(&pool, "owner", "student").await;
    let voter = create_user(&pool, "voter", "student").await;
    let meme_id = create_meme(&pool, owner.id).await;

    let tasks: Vec<_> = (0..10)
        .map(|_| {
            let pool = pool.clone();
            tokio::spawn(async move { MemeRepo::vote(&pool, meme_id, voter.id).await.unwrap() })
        })
        .collect();

    let mut applied = 0;
    for task in tasks {
        match task.await.unwrap() {
            VoteChange::Applied { votes } => {
                assert_eq!(votes, 1);
                applied += 1;
            }
            other => assert_eq!(other, VoteChange::Unchanged),
        }
    }
    assert_eq!(applied, 1);

    let meme = MemeRepo::find_by_id(&pool, meme_id, None).await.unwrap().unwrap();
    assert_eq!(meme.votes, 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_parallel_votes_match_distinct_voters(pool: PgPool) {
    let owner = create_user(&pool, "owner", "student").await;
    let meme_id = create_meme(&pool, owner.id).await;

    let mut voters = Vec::new();
    for i in 0..6 {
        voters.push(create_user(&pool, &format!("voter{i}"), "student").await.id);
    }

    // Every voter submits three times at once.
    let tasks: Vec<_> = voters
        .iter()
        .flat_map(|&user_id| std::iter::repeat(user_id).take(3))
        .map(|user_id| {
            let pool = pool.clone();
            tokio::spawn(async move { MemeRepo::vote(&pool, meme_id, user_id).await.unwrap() })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let meme = MemeRepo::find_by_id(&pool, meme_id, None).await.unwrap().unwrap();
    assert_eq!(meme.votes, voters.len() as i32);

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM meme_votes WHERE meme_id = $1")
        .bind(meme_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    assert_eq!(rows, voters.len() as i64);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_parallel_vote_and_unvote_keep_counter_in_sync(pool: PgPool) {
    let owner = create_user(&pool, "owner", "student").await;
    let meme_id = create_meme(&pool, owner.id).await;

    let mut voters = Vec::new();
    for i in 0..4 {
        voters.push(create_user(&pool, &format!("voter{i}"), "student").await.id);
    }

    let tasks: Vec<_> = voters
        .iter()
        .flat_map(|&user_id| [true, false, true].map(|up| (user_id, up)))
        .map(|(user_id, up)| {
            let pool = pool.clone();
            tokio::spawn(async move {
                if up {
                    MemeRepo::vote(&pool, meme_id, user_id).await.unwrap()
                } else {
                    MemeRepo::unvote(&pool, meme_id, user_id).await.unwrap()
                }
            })
        })
        .collect();
    for task in tasks {
        task.await.unwrap();
    }

    let rows: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM meme_votes WHERE meme_id = $1")
        .bind(meme_id)
        .fetch_one(&pool)
        .await
        .unwrap();
    let meme = MemeRepo::find_by_id(&pool, meme_id, None).await.unwrap().unwrap();
    assert_eq!(i64::from(meme.votes), rows);
}

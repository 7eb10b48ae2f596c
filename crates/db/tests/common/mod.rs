//! Fixture builders shared by the repository integration tests.

#![allow(dead_code)]

use sqlx::PgPool;
use schoolhub_db::models::category::{Category, CreateCategory};
use schoolhub_db::models::post::{CreatePost, Post};
use schoolhub_db::models::user::{CreateUser, User};
use schoolhub_db::repositories::{CategoryRepo, PostRepo, RoleRepo, UserRepo};

pub async fn create_user(pool: &PgPool, username: &str, role: &str) -> User {
    let role = RoleRepo::find_by_name(pool, role)
        .await
        .unwrap()
        .expect("seeded role");
    UserRepo::create_with_profile(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@school.test"),
            first_name: "Test".to_string(),
            last_name: "User".to_string(),
            password_hash: "not-a-real-hash".to_string(),
            role_id: role.id,
        },
    )
    .await
    .unwrap()
}

pub async fn create_category(pool: &PgPool, slug: &str) -> Category {
    CategoryRepo::create(
        pool,
        &CreateCategory {
            full_name: format!("Category {slug}"),
            short_name: slug.to_string(),
        },
    )
    .await
    .unwrap()
}

pub async fn create_post(
    pool: &PgPool,
    author_id: i64,
    category_id: i64,
    title: &str,
    published: bool,
    allowed: bool,
) -> Post {
    PostRepo::create(
        pool,
        &CreatePost {
            title: title.to_string(),
            category_id,
            banner: String::new(),
            hook: String::new(),
            content: format!("Body of {title}"),
            author_id,
            published,
            allowed,
        },
    )
    .await
    .unwrap()
}

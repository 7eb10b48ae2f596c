//! Repository for versioned text documents: changelog and legal documents.

use sqlx::PgPool;
use schoolhub_core::types::DbId;

use crate::models::content::{Changelog, LegalDocument, LegalKind};

const CHANGELOG_COLUMNS: &str = "id, content, updated_at";

const LEGAL_COLUMNS: &str = "id, author_id, content, date";

pub struct ContentRepo;

impl ContentRepo {
    /// The most recent changelog entry, if any.
    pub async fn latest_changelog(pool: &PgPool) -> Result<Option<Changelog>, sqlx::Error> {
        let query = format!(
            "SELECT {CHANGELOG_COLUMNS} FROM changelog ORDER BY updated_at DESC, id DESC LIMIT 1"
        );
        sqlx::query_as::<_, Changelog>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Store a new changelog version.
    pub async fn save_changelog(pool: &PgPool, content: &str) -> Result<Changelog, sqlx::Error> {
        let query = format!("INSERT INTO changelog (content) VALUES ($1) RETURNING {CHANGELOG_COLUMNS}");
        sqlx::query_as::<_, Changelog>(&query)
            .bind(content)
            .fetch_one(pool)
            .await
    }

    /// The newest published version of a legal document.
    pub async fn latest_legal(
        pool: &PgPool,
        kind: LegalKind,
    ) -> Result<Option<LegalDocument>, sqlx::Error> {
        let query = format!(
            "SELECT {LEGAL_COLUMNS} FROM {} ORDER BY date DESC, id DESC LIMIT 1",
            kind.table()
        );
        sqlx::query_as::<_, LegalDocument>(&query)
            .fetch_optional(pool)
            .await
    }

    /// Publish a new version of a legal document. Older versions are kept.
    pub async fn publish_legal(
        pool: &PgPool,
        kind: LegalKind,
        author_id: DbId,
        content: &str,
    ) -> Result<LegalDocument, sqlx::Error> {
        let query = format!(
            "INSERT INTO {} (author_id, content) VALUES ($1, $2) RETURNING {LEGAL_COLUMNS}",
            kind.table()
        );
        sqlx::query_as::<_, LegalDocument>(&query)
            .bind(author_id)
            .bind(content)
            .fetch_one(pool)
            .await
    }
}

//! Versioned text documents: changelog, terms of service, privacy policy.

use serde::Serialize;
use sqlx::FromRow;
use schoolhub_core::types::{DbId, Timestamp};

/// A row from the `changelog` table. Only the newest row is served.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Changelog {
    #[serde(skip)]
    pub id: DbId,
    pub content: String,
    pub updated_at: Timestamp,
}

/// A published version of a legal document.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LegalDocument {
    #[serde(skip)]
    pub id: DbId,
    #[serde(skip)]
    pub author_id: DbId,
    pub content: String,
    pub date: Timestamp,
}

/// Which legal document table to read or write.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegalKind {
    TermsOfService,
    PrivacyPolicy,
}

impl LegalKind {
    pub fn table(self) -> &'static str {
        match self {
            LegalKind::TermsOfService => "terms_of_service",
            LegalKind::PrivacyPolicy => "privacy_policies",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            LegalKind::TermsOfService => "TermsOfService",
            LegalKind::PrivacyPolicy => "PrivacyPolicy",
        }
    }
}

//! Poll question, option, and answer models.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use schoolhub_core::types::{DbId, Timestamp};

use super::nullable;

/// A row from the `poll_questions` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PollQuestion {
    pub id: DbId,
    pub title: String,
    pub subtitle: Option<String>,
    pub code: String,
    pub is_active: bool,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub created_at: Timestamp,
}

/// A row from the `poll_options` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PollOption {
    pub id: DbId,
    pub question_id: DbId,
    pub key: String,
    pub text: String,
    pub is_correct: bool,
}

/// Option as shown to voters: the correct flag is withheld.
#[derive(Debug, Clone, Serialize)]
pub struct PublicPollOption {
    pub id: DbId,
    pub key: String,
    pub text: String,
}

impl From<&PollOption> for PublicPollOption {
    fn from(opt: &PollOption) -> Self {
        Self {
            id: opt.id,
            key: opt.key.clone(),
            text: opt.text.clone(),
        }
    }
}

/// A question with its options.
#[derive(Debug, Clone, Serialize)]
pub struct PollQuestionWithOptions<O: Serialize> {
    #[serde(flatten)]
    pub question: PollQuestion,
    pub options: Vec<O>,
}

/// A row from the `poll_answers` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct PollAnswer {
    pub id: DbId,
    pub user_id: DbId,
    pub question_id: DbId,
    pub selected_option_id: DbId,
    pub created_at: Timestamp,
}

/// A user's latest answer joined with the selected and correct option keys.
#[derive(Debug, Clone, FromRow)]
pub struct AnswerOutcome {
    pub question_id: DbId,
    pub selected_key: String,
    pub selected_is_correct: bool,
    pub correct_key: Option<String>,
    pub created_at: Timestamp,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePollOption {
    pub key: String,
    pub text: String,
    #[serde(default)]
    pub is_correct: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePollQuestion {
    pub title: String,
    pub subtitle: Option<String>,
    #[serde(default)]
    pub code: String,
    pub is_active: Option<bool>,
    pub start_date: Option<Timestamp>,
    pub end_date: Option<Timestamp>,
    pub options: Vec<CreatePollOption>,
}

/// Update DTO. When `options` is present the whole option set is replaced.
#[derive(Debug, Clone, Deserialize)]
pub struct UpdatePollQuestion {
    pub title: Option<String>,
    /// `Some(None)` clears the subtitle.
    #[serde(default, deserialize_with = "nullable")]
    pub subtitle: Option<Option<String>>,
    pub code: Option<String>,
    pub is_active: Option<bool>,
    /// `Some(None)` removes the lower bound of the open period.
    #[serde(default, deserialize_with = "nullable")]
    pub start_date: Option<Option<Timestamp>>,
    /// `Some(None)` removes the upper bound of the open period.
    #[serde(default, deserialize_with = "nullable")]
    pub end_date: Option<Option<Timestamp>>,
    pub options: Option<Vec<CreatePollOption>>,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct LeaderboardEntry {
    pub id: DbId,
    pub username: String,
    pub correct_answers: i64,
}

#[derive(Debug, Clone, FromRow, Serialize)]
pub struct RecentParticipant {
    pub id: DbId,
    pub username: String,
    pub last_answered: Timestamp,
}

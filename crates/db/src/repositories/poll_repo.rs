//! Repository for poll questions, their options, and user answers.

use std::collections::HashMap;

use sqlx::{PgPool, Postgres, Transaction};
use schoolhub_core::types::{DbId, Timestamp};

use crate::models::poll::{
    AnswerOutcome, CreatePollOption, CreatePollQuestion, LeaderboardEntry, PollAnswer,
    PollOption, PollQuestion, PollQuestionWithOptions, RecentParticipant, UpdatePollQuestion,
};

const QUESTION_COLUMNS: &str =
    "id, title, subtitle, code, is_active, start_date, end_date, created_at";

const OPTION_COLUMNS: &str = "id, question_id, key, text, is_correct";

const ANSWER_COLUMNS: &str = "id, user_id, question_id, selected_option_id, created_at";

/// Provides CRUD operations for polls and poll answers.
pub struct PollRepo;

impl PollRepo {
    // ── Questions ────────────────────────────────────────────────────

    /// Insert a question and its options in one transaction.
    pub async fn create(
        pool: &PgPool,
        input: &CreatePollQuestion,
    ) -> Result<PollQuestionWithOptions<PollOption>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        let query = format!(
            "INSERT INTO poll_questions (title, subtitle, code, is_active, start_date, end_date)
             VALUES ($1, $2, $3, COALESCE($4, true), $5, $6)
             RETURNING {QUESTION_COLUMNS}"
        );
        let question = sqlx::query_as::<_, PollQuestion>(&query)
            .bind(&input.title)
            .bind(input.subtitle.is_some())
            .bind(input.subtitle.as_ref().and_then(|v| v.as_deref()))
            .bind(&input.code)
            .bind(input.is_active)
            .bind(input.start_date.is_some())
            .bind(input.start_date.flatten())
            .bind(input.end_date.is_some())
            .bind(input.end_date.flatten())
            .fetch_one(&mut *tx)
            .await?;

        let mut options = Vec::with_capacity(input.options.len());
        for option in &input.options {
            options.push(Self::insert_option(&mut tx, question.id, option).await?);
        }
        options.sort_by(|a, b| a.key.cmp(&b.key));

        tx.commit().await?;
        Ok(PollQuestionWithOptions { question, options })
    }

    /// Apply a partial update. When `options` is present the option set is
    /// replaced by key: existing keys are updated in place, missing keys are
    /// removed (along with answers that selected them), new keys are inserted.
    pub async fn update(
        pool: &PgPool,
        id: DbId,
        input: &UpdatePollQuestion,
    ) -> Result<Option<PollQuestionWithOptions<PollOption>>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        // Nullable columns take a "provided" flag so an explicit null clears them.
        let query = format!(
            "UPDATE poll_questions SET
                title = COALESCE($2, title),
                subtitle = CASE WHEN $3 THEN $4 ELSE subtitle END,
                code = COALESCE($5, code),
                is_active = COALESCE($6, is_active),
                start_date = CASE WHEN $7 THEN $8 ELSE start_date END,
                end_date = CASE WHEN $9 THEN $10 ELSE end_date END
             WHERE id = $1
             RETURNING {QUESTION_COLUMNS}"
        );
        let Some(question) = sqlx::query_as::<_, PollQuestion>(&query)
            .bind(id)
            .bind(&input.title)
            .bind(input.subtitle.is_some())
            .bind(input.subtitle.as_ref().and_then(|v| v.as_deref()))
            .bind(&input.code)
            .bind(input.is_active)
            .bind(input.start_date.is_some())
            .bind(input.start_date.flatten())
            .bind(input.end_date.is_some())
            .bind(input.end_date.flatten())
            .fetch_optional(&mut *tx)
            .await?
        else {
            return Ok(None);
        };

        if let Some(new_options) = &input.options {
            // Clear the correct flag first so the partial unique index does
            // not trip while flags move between options.
            sqlx::query("UPDATE poll_options SET is_correct = false WHERE question_id = $1")
                .bind(id)
                .execute(&mut *tx)
                .await?;

            let keys: Vec<&str> = new_options.iter().map(|o| o.key.as_str()).collect();
            sqlx::query("DELETE FROM poll_options WHERE question_id = $1 AND NOT (key = ANY($2))")
                .bind(id)
                .bind(&keys)
                .execute(&mut *tx)
                .await?;

            for option in new_options {
                let query = format!(
                    "INSERT INTO poll_options (question_id, key, text, is_correct)
                     VALUES ($1, $2, $3, $4)
                     ON CONFLICT (question_id, key)
                     DO UPDATE SET text = EXCLUDED.text, is_correct = EXCLUDED.is_correct
                     RETURNING {OPTION_COLUMNS}"
                );
                sqlx::query_as::<_, PollOption>(&query)
                    .bind(id)
                    .bind(&option.key)
                    .bind(&option.text)
                    .bind(option.is_correct)
                    .fetch_one(&mut *tx)
                    .await?;
            }
        }

        let query = format!(
            "SELECT {OPTION_COLUMNS} FROM poll_options WHERE question_id = $1 ORDER BY key ASC"
        );
        let options = sqlx::query_as::<_, PollOption>(&query)
            .bind(id)
            .fetch_all(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(PollQuestionWithOptions { question, options }))
    }

    async fn insert_option(
        tx: &mut Transaction<'_, Postgres>,
        question_id: DbId,
        option: &CreatePollOption,
    ) -> Result<PollOption, sqlx::Error> {
        let query = format!(
            "INSERT INTO poll_options (question_id, key, text, is_correct)
             VALUES ($1, $2, $3, $4)
             RETURNING {OPTION_COLUMNS}"
        );
        sqlx::query_as::<_, PollOption>(&query)
            .bind(question_id)
            .bind(&option.key)
            .bind(&option.text)
            .bind(option.is_correct)
            .fetch_one(&mut **tx)
            .await
    }

    pub async fn find_by_id(pool: &PgPool, id: DbId) -> Result<Option<PollQuestion>, sqlx::Error> {
        let query = format!("SELECT {QUESTION_COLUMNS} FROM poll_questions WHERE id = $1");
        sqlx::query_as::<_, PollQuestion>(&query)
            .bind(id)
            .fetch_optional(pool)
            .await
    }

    /// Find a question together with its options ordered by key.
    pub async fn find_with_options(
        pool: &PgPool,
        id: DbId,
    ) -> Result<Option<PollQuestionWithOptions<PollOption>>, sqlx::Error> {
        let Some(question) = Self::find_by_id(pool, id).await? else {
            return Ok(None);
        };
        let options = Self::options_for(pool, &[id]).await?;
        Ok(Some(PollQuestionWithOptions { question, options }))
    }

    /// List questions newest first, each with its options.
    pub async fn list(
        pool: &PgPool,
        limit: i64,
        offset: i64,
    ) -> Result<Vec<PollQuestionWithOptions<PollOption>>, sqlx::Error> {
        let query = format!(
            "SELECT {QUESTION_COLUMNS} FROM poll_questions
             ORDER BY created_at DESC, id DESC
             LIMIT $1 OFFSET $2"
        );
        let questions = sqlx::query_as::<_, PollQuestion>(&query)
            .bind(limit)
            .bind(offset)
            .fetch_all(pool)
            .await?;

        let ids: Vec<DbId> = questions.iter().map(|q| q.id).collect();
        let mut by_question: HashMap<DbId, Vec<PollOption>> = HashMap::new();
        for option in Self::options_for(pool, &ids).await? {
            by_question.entry(option.question_id).or_default().push(option);
        }

        Ok(questions
            .into_iter()
            .map(|question| PollQuestionWithOptions {
                options: by_question.remove(&question.id).unwrap_or_default(),
                question,
            })
            .collect())
    }

    /// Options for a batch of questions, ordered by question then key.
    pub async fn options_for(
        pool: &PgPool,
        question_ids: &[DbId],
    ) -> Result<Vec<PollOption>, sqlx::Error> {
        let query = format!(
            "SELECT {OPTION_COLUMNS} FROM poll_options
             WHERE question_id = ANY($1)
             ORDER BY question_id ASC, key ASC"
        );
        sqlx::query_as::<_, PollOption>(&query)
            .bind(question_ids)
            .fetch_all(pool)
            .await
    }

    pub async fn delete(pool: &PgPool, id: DbId) -> Result<bool, sqlx::Error> {
        let result = sqlx::query("DELETE FROM poll_questions WHERE id = $1")
            .bind(id)
            .execute(pool)
            .await?;
        Ok(result.rows_affected() > 0)
    }

    /// Delete every listed question. Unknown IDs are skipped.
    pub async fn bulk_delete(pool: &PgPool, ids: &[DbId]) -> Result<u64, sqlx::Error> {
        let result = sqlx::query("DELETE FROM poll_questions WHERE id = ANY($1)")
            .bind(ids)
            .execute(pool)
            .await?;
        Ok(result.rows_affected())
    }

    // ── Answers ──────────────────────────────────────────────────────

    /// The user's most recent answer with the selected and correct keys.
    pub async fn latest_answer_outcome(
        pool: &PgPool,
        user_id: DbId,
    ) -> Result<Option<AnswerOutcome>, sqlx::Error> {
        sqlx::query_as::<_, AnswerOutcome>(
            "SELECT a.question_id, so.key AS selected_key, so.is_correct AS selected_is_correct,
                    co.key AS correct_key, a.created_at
             FROM poll_answers a
             JOIN poll_options so ON so.id = a.selected_option_id
             LEFT JOIN poll_options co ON co.question_id = a.question_id AND co.is_correct
             WHERE a.user_id = $1
             ORDER BY a.created_at DESC, a.id DESC
             LIMIT 1",
        )
        .bind(user_id)
        .fetch_optional(pool)
        .await
    }

    /// The newest open question the user has not answered yet.
    pub async fn next_open_unanswered(
        pool: &PgPool,
        user_id: DbId,
        now: Timestamp,
    ) -> Result<Option<PollQuestion>, sqlx::Error> {
        let query = format!(
            "SELECT {QUESTION_COLUMNS} FROM poll_questions q
             WHERE q.is_active
               AND (q.start_date IS NULL OR q.start_date <= $2)
               AND (q.end_date IS NULL OR q.end_date > $2)
               AND NOT EXISTS (
                   SELECT 1 FROM poll_answers a
                   WHERE a.question_id = q.id AND a.user_id = $1
               )
             ORDER BY q.created_at DESC, q.id DESC
             LIMIT 1"
        );
        sqlx::query_as::<_, PollQuestion>(&query)
            .bind(user_id)
            .bind(now)
            .fetch_optional(pool)
            .await
    }

    /// Record an answer unless the user already answered since `window_start`.
    ///
    /// The user row is locked for the duration of the transaction so two
    /// concurrent answers in the same week cannot both pass the check.
    /// Returns `None` when the user is locked for the week; a second answer to
    /// the same question surfaces as a unique violation.
    pub async fn create_answer(
        pool: &PgPool,
        user_id: DbId,
        question_id: DbId,
        option_id: DbId,
        window_start: Timestamp,
    ) -> Result<Option<PollAnswer>, sqlx::Error> {
        let mut tx = pool.begin().await?;

        sqlx::query("SELECT id FROM users WHERE id = $1 FOR UPDATE")
            .bind(user_id)
            .execute(&mut *tx)
            .await?;

        let answered_this_week: bool = sqlx::query_scalar(
            "SELECT EXISTS(SELECT 1 FROM poll_answers WHERE user_id = $1 AND created_at >= $2)",
        )
        .bind(user_id)
        .bind(window_start)
        .fetch_one(&mut *tx)
        .await?;
        if answered_this_week {
            return Ok(None);
        }

        let query = format!(
            "INSERT INTO poll_answers (user_id, question_id, selected_option_id)
             VALUES ($1, $2, $3)
             RETURNING {ANSWER_COLUMNS}"
        );
        let answer = sqlx::query_as::<_, PollAnswer>(&query)
            .bind(user_id)
            .bind(question_id)
            .bind(option_id)
            .fetch_one(&mut *tx)
            .await?;

        tx.commit().await?;
        Ok(Some(answer))
    }

    // ── Statistics ───────────────────────────────────────────────────

    /// Users ranked by number of correct answers, ties broken by username.
    pub async fn leaderboard(pool: &PgPool, limit: i64) -> Result<Vec<LeaderboardEntry>, sqlx::Error> {
        sqlx::query_as::<_, LeaderboardEntry>(
            "SELECT u.id, u.username, COUNT(*) AS correct_answers
             FROM poll_answers a
             JOIN poll_options o ON o.id = a.selected_option_id
             JOIN users u ON u.id = a.user_id
             WHERE o.is_correct
             GROUP BY u.id, u.username
             ORDER BY correct_answers DESC, u.username ASC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }

    /// Users ranked by the time of their latest answer.
    pub async fn recent_participants(
        pool: &PgPool,
        limit: i64,
    ) -> Result<Vec<RecentParticipant>, sqlx::Error> {
        sqlx::query_as::<_, RecentParticipant>(
            "SELECT u.id, u.username, MAX(a.created_at) AS last_answered
             FROM poll_answers a
             JOIN users u ON u.id = a.user_id
             GROUP BY u.id, u.username
             ORDER BY last_answered DESC, u.username ASC
             LIMIT $1",
        )
        .bind(limit)
        .fetch_all(pool)
        .await
    }
}

// src/store/postgres.rs

use std::collections::BTreeMap;

use async_trait::async_trait;
use chrono::NaiveDate;
use sqlx::{FromRow, PgPool, types::Json};

use crate::{
    models::{
        attempt::{AttemptFilter, NewQuizAttempt, QuizAttempt},
        stats::{LanguageStats, StatsDelta, UserQuizAggregate},
        user::{NewUser, UpdateProfileRequest, User},
    },
    store::{AttemptRepository, StatsRepository, StoreError, UserRepository},
};

const USER_COLUMNS: &str = r#"
    id, username, email, password, first_name, last_name,
    branch, semester, roll_num, avatar_url,
    github, linkedin, instagram, reddit, discord,
    streak, last_login_date, created_at, updated_at
"#;

const ATTEMPT_COLUMNS: &str = r#"
    id, user_id, language, chapter_id, chapter_title,
    score, total_questions, correct_answers, wrong_answers, percentage,
    answers, attempted_at, time_spent_seconds
"#;

/// Helper struct for reading the `user_quiz_stats` row.
#[derive(FromRow)]
struct TotalsRow {
    total_attempts: i64,
    total_questions: i64,
    correct_answers: i64,
    wrong_answers: i64,
}

#[derive(FromRow)]
struct LanguageRow {
    language: String,
    attempts: i64,
    correct_answers: i64,
    wrong_answers: i64,
}

/// Postgres-backed repositories sharing one pool.
#[derive(Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn is_unique_violation(err: &sqlx::Error) -> bool {
    matches!(err, sqlx::Error::Database(db) if db.is_unique_violation())
}

#[async_trait]
impl UserRepository for PgStore {
    async fn create_user(&self, user: NewUser) -> Result<User, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO users (username, email, password, first_name, last_name)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(&user.username)
            .bind(&user.email)
            .bind(&user.password_hash)
            .bind(&user.first_name)
            .bind(&user.last_name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                if is_unique_violation(&e) {
                    StoreError::Conflict(format!(
                        "Username '{}' or email '{}' already exists",
                        user.username, user.email
                    ))
                } else {
                    tracing::error!("Failed to create user: {:?}", e);
                    StoreError::from(e)
                }
            })
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE id = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE email = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(email)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn find_by_username(&self, username: &str) -> Result<Option<User>, StoreError> {
        let sql = format!("SELECT {USER_COLUMNS} FROM users WHERE username = $1");
        Ok(sqlx::query_as::<_, User>(&sql)
            .bind(username)
            .fetch_optional(&self.pool)
            .await?)
    }

    async fn update_profile(&self, id: i64, update: &UpdateProfileRequest) -> Result<User, StoreError> {
        let sql = format!(
            r#"
            UPDATE users SET
                first_name = COALESCE($2, first_name),
                last_name = COALESCE($3, last_name),
                branch = COALESCE($4, branch),
                semester = COALESCE($5, semester),
                roll_num = COALESCE($6, roll_num),
                avatar_url = COALESCE($7, avatar_url),
                github = COALESCE($8, github),
                linkedin = COALESCE($9, linkedin),
                instagram = COALESCE($10, instagram),
                reddit = COALESCE($11, reddit),
                discord = COALESCE($12, discord),
                updated_at = NOW()
            WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        );

        sqlx::query_as::<_, User>(&sql)
            .bind(id)
            .bind(&update.first_name)
            .bind(&update.last_name)
            .bind(&update.branch)
            .bind(&update.semester)
            .bind(&update.roll_num)
            .bind(&update.avatar_url)
            .bind(&update.github)
            .bind(&update.linkedin)
            .bind(&update.instagram)
            .bind(&update.reddit)
            .bind(&update.discord)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)
    }

    async fn record_login(&self, id: i64, streak: i64, date: NaiveDate) -> Result<(), StoreError> {
        let result = sqlx::query("UPDATE users SET streak = $2, last_login_date = $3 WHERE id = $1")
            .bind(id)
            .bind(streak)
            .bind(date)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(StoreError::NotFound);
        }
        Ok(())
    }
}

#[async_trait]
impl AttemptRepository for PgStore {
    async fn append_attempt(&self, attempt: &NewQuizAttempt) -> Result<QuizAttempt, StoreError> {
        let sql = format!(
            r#"
            INSERT INTO quiz_attempts (
                user_id, language, chapter_id, chapter_title,
                score, total_questions, correct_answers, wrong_answers, percentage,
                answers, attempted_at, time_spent_seconds
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING {ATTEMPT_COLUMNS}
            "#
        );

        sqlx::query_as::<_, QuizAttempt>(&sql)
            .bind(attempt.user_id)
            .bind(&attempt.language)
            .bind(&attempt.chapter_id)
            .bind(&attempt.chapter_title)
            .bind(attempt.score)
            .bind(attempt.total_questions)
            .bind(attempt.correct_answers)
            .bind(attempt.wrong_answers)
            .bind(attempt.percentage)
            .bind(Json(&attempt.answers))
            .bind(attempt.attempted_at)
            .bind(attempt.time_spent_seconds)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                tracing::error!("Failed to insert quiz attempt: {:?}", e);
                StoreError::from(e)
            })
    }

    async fn list_attempts(
        &self,
        user_id: i64,
        filter: &AttemptFilter,
    ) -> Result<Vec<QuizAttempt>, StoreError> {
        let sql = format!(
            r#"
            SELECT {ATTEMPT_COLUMNS}
            FROM quiz_attempts
            WHERE user_id = $1
              AND ($2::TEXT IS NULL OR language = $2)
              AND ($3::TEXT IS NULL OR chapter_id = $3)
            ORDER BY attempted_at DESC, id DESC
            "#
        );

        Ok(sqlx::query_as::<_, QuizAttempt>(&sql)
            .bind(user_id)
            .bind(&filter.language)
            .bind(&filter.chapter_id)
            .fetch_all(&self.pool)
            .await?)
    }
}

#[async_trait]
impl StatsRepository for PgStore {
    /// Both upserts increment in place, so concurrent submissions cannot
    /// overwrite each other's totals.
    async fn apply_delta(&self, user_id: i64, delta: &StatsDelta) -> Result<(), StoreError> {
        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO user_quiz_stats (user_id, total_attempts, total_questions, correct_answers, wrong_answers)
            VALUES ($1, 1, $2, $3, $4)
            ON CONFLICT (user_id) DO UPDATE SET
                total_attempts = user_quiz_stats.total_attempts + EXCLUDED.total_attempts,
                total_questions = user_quiz_stats.total_questions + EXCLUDED.total_questions,
                correct_answers = user_quiz_stats.correct_answers + EXCLUDED.correct_answers,
                wrong_answers = user_quiz_stats.wrong_answers + EXCLUDED.wrong_answers,
                updated_at = NOW()
            "#,
        )
        .bind(user_id)
        .bind(delta.total_questions)
        .bind(delta.correct_answers)
        .bind(delta.wrong_answers)
        .execute(&mut *tx)
        .await?;

        sqlx::query(
            r#"
            INSERT INTO user_language_stats (user_id, language, attempts, correct_answers, wrong_answers)
            VALUES ($1, $2, 1, $3, $4)
            ON CONFLICT (user_id, language) DO UPDATE SET
                attempts = user_language_stats.attempts + EXCLUDED.attempts,
                correct_answers = user_language_stats.correct_answers + EXCLUDED.correct_answers,
                wrong_answers = user_language_stats.wrong_answers + EXCLUDED.wrong_answers
            "#,
        )
        .bind(user_id)
        .bind(&delta.language)
        .bind(delta.correct_answers)
        .bind(delta.wrong_answers)
        .execute(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(())
    }

    async fn get_aggregate(&self, user_id: i64) -> Result<Option<UserQuizAggregate>, StoreError> {
        let totals = sqlx::query_as::<_, TotalsRow>(
            r#"
            SELECT total_attempts, total_questions, correct_answers, wrong_answers
            FROM user_quiz_stats
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(totals) = totals else {
            return Ok(None);
        };

        let languages = sqlx::query_as::<_, LanguageRow>(
            r#"
            SELECT language, attempts, correct_answers, wrong_answers
            FROM user_language_stats
            WHERE user_id = $1
            "#,
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await?;

        let language_stats: BTreeMap<String, LanguageStats> = languages
            .into_iter()
            .map(|row| {
                (
                    row.language,
                    LanguageStats {
                        attempts: row.attempts,
                        correct_answers: row.correct_answers,
                        wrong_answers: row.wrong_answers,
                    },
                )
            })
            .collect();

        Ok(Some(UserQuizAggregate::from_totals(
            totals.total_attempts,
            totals.total_questions,
            totals.correct_answers,
            totals.wrong_answers,
            language_stats,
        )))
    }
}

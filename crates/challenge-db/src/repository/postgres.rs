//! # PostgreSQL Repository
//!
//! Production implementation of [`ChallengeRepository`].
//!
//! ## Key Operations
//! - Question of the day lookup by date
//! - Signup and login against `users`
//! - Latest-answer lookup (`ORDER BY created_at DESC LIMIT 1`)
//! - Transactional deletes

use std::sync::Arc;

use async_trait::async_trait;
use challenge_core::{Answer, Credentials, NewUser, PasswordPolicy, PlaintextPolicy, Question, User};
use chrono::NaiveDate;
use sqlx::PgPool;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{check_login, encode_tests, AnswerRow, ChallengeRepository, QuestionRow, ANSWER_COLUMNS, QUESTION_COLUMNS};
use crate::config::DbConfig;
use crate::error::{DbError, DbResult};
use crate::pool::connect_postgres;

/// PostgreSQL-backed repository.
///
/// ## Usage
/// ```rust,ignore
/// let repo = PgRepository::connect(&DbConfig::from_env()?).await?;
///
/// let question = repo.read_question().await?;
/// repo.verify_login(&Credentials::new("ada", "pw")).await?;
/// ```
#[derive(Debug, Clone)]
pub struct PgRepository {
    pool: PgPool,
    passwords: Arc<dyn PasswordPolicy>,
}

impl PgRepository {
    /// Wraps an existing pool. Passwords are stored as plaintext until
    /// [`with_password_policy`](Self::with_password_policy) says otherwise.
    pub fn new(pool: PgPool) -> Self {
        PgRepository {
            pool,
            passwords: Arc::new(PlaintextPolicy),
        }
    }

    /// Connects (fail fast), migrates, and wraps the pool.
    pub async fn connect(config: &DbConfig) -> DbResult<Self> {
        Ok(PgRepository::new(connect_postgres(config).await?))
    }

    /// Replaces the password policy used by signup and login.
    pub fn with_password_policy(mut self, policy: Arc<dyn PasswordPolicy>) -> Self {
        self.passwords = policy;
        self
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Closes the pool. Later operations fail with `ConnectionFailed`.
    pub async fn close(&self) {
        debug!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Runs a single DELETE inside its own transaction.
    ///
    /// Commits on success. On error the transaction is rolled back and the
    /// error returned; a failed rollback is only logged. If this future is
    /// dropped before finishing, the transaction rolls back on drop.
    async fn delete_in_transaction(&self, entity: &str, sql: &str, key: &str) -> DbResult<u64> {
        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

        match sqlx::query(sql).bind(key).execute(&mut *tx).await {
            Ok(result) => {
                tx.commit()
                    .await
                    .map_err(|e| DbError::TransactionFailed(e.to_string()))?;

                debug!(entity, key, rows = result.rows_affected(), "Deleted");
                Ok(result.rows_affected())
            }
            Err(err) => {
                if let Err(rollback_err) = tx.rollback().await {
                    warn!(entity, key, error = %rollback_err, "Rollback failed");
                }
                Err(err.into())
            }
        }
    }
}

#[async_trait]
impl ChallengeRepository for PgRepository {
    async fn create_question(&self, question: &Question) -> DbResult<()> {
        debug!(id = %question.id, date = %question.date, "Inserting question");

        let [params1, params2, params3] = encode_tests(question)?;
        let [t1, t2, t3] = &question.tests;

        sqlx::query(
            r#"
            INSERT INTO questions (
                id, title, description, date, level,
                params1, response1, params2, response2, params3, response3
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(question.id.to_string())
        .bind(&question.title)
        .bind(&question.description)
        .bind(question.date)
        .bind(&question.level)
        .bind(params1)
        .bind(&t1.response)
        .bind(params2)
        .bind(&t2.response)
        .bind(params3)
        .bind(&t3.response)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn read_question_on(&self, date: NaiveDate) -> DbResult<Question> {
        let sql = format!(
            "SELECT {} FROM questions WHERE date = $1 LIMIT 1",
            QUESTION_COLUMNS
        );

        let row: Option<QuestionRow> = sqlx::query_as(&sql)
            .bind(date)
            .fetch_optional(&self.pool)
            .await?;

        row.ok_or_else(|| DbError::not_found("Question", date))?
            .try_into()
    }

    async fn update_question(&self, question: &Question) -> DbResult<()> {
        debug!(id = %question.id, "Updating question");

        let [params1, params2, params3] = encode_tests(question)?;
        let [t1, t2, t3] = &question.tests;

        let result = sqlx::query(
            r#"
            UPDATE questions SET
                title = $2,
                description = $3,
                date = $4,
                level = $5,
                params1 = $6,
                response1 = $7,
                params2 = $8,
                response2 = $9,
                params3 = $10,
                response3 = $11
            WHERE id = $1
            "#,
        )
        .bind(question.id.to_string())
        .bind(&question.title)
        .bind(&question.description)
        .bind(question.date)
        .bind(&question.level)
        .bind(params1)
        .bind(&t1.response)
        .bind(params2)
        .bind(&t2.response)
        .bind(params3)
        .bind(&t3.response)
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Question", question.id));
        }

        Ok(())
    }

    async fn delete_question(&self, id: Uuid) -> DbResult<u64> {
        self.delete_in_transaction("question", "DELETE FROM questions WHERE id = $1", &id.to_string())
            .await
    }

    async fn create_user(&self, user: &NewUser) -> DbResult<User> {
        debug!(nickname = %user.nickname, "Inserting user");

        let password = self.passwords.protect(&user.password)?;

        let id: i64 = sqlx::query_scalar(
            "INSERT INTO users (nickname, email, password) VALUES ($1, $2, $3) RETURNING id",
        )
        .bind(&user.nickname)
        .bind(&user.email)
        .bind(password)
        .fetch_one(&self.pool)
        .await?;

        Ok(User {
            id,
            nickname: user.nickname.clone(),
            email: user.email.clone(),
        })
    }

    async fn read_user(&self, id: i64) -> DbResult<User> {
        sqlx::query_as::<_, User>("SELECT id, nickname, email FROM users WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    async fn update_user(&self, user: &User) -> DbResult<()> {
        debug!(id = user.id, nickname = %user.nickname, "Updating user");

        let result = sqlx::query("UPDATE users SET nickname = $2, email = $3 WHERE id = $1")
            .bind(user.id)
            .bind(&user.nickname)
            .bind(&user.email)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("User", user.id));
        }

        Ok(())
    }

    async fn delete_user(&self, nickname: &str) -> DbResult<u64> {
        self.delete_in_transaction("user", "DELETE FROM users WHERE nickname = $1", nickname)
            .await
    }

    async fn verify_login(&self, credentials: &Credentials) -> DbResult<()> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT password FROM users WHERE nickname = $1")
                .bind(&credentials.nickname)
                .fetch_optional(&self.pool)
                .await?;

        check_login(self.passwords.as_ref(), credentials, stored)
    }

    async fn create_answer(&self, answer: &Answer) -> DbResult<()> {
        debug!(
            id = %answer.id,
            nickname = %answer.nickname,
            question_id = %answer.question_id,
            status = %answer.status,
            "Inserting answer"
        );

        sqlx::query(
            "INSERT INTO answers (id, nickname, questionid, status, created_at) VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(answer.id.to_string())
        .bind(&answer.nickname)
        .bind(answer.question_id.to_string())
        .bind(answer.status.as_str())
        .bind(answer.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    async fn delete_answer(&self, id: Uuid) -> DbResult<u64> {
        self.delete_in_transaction("answer", "DELETE FROM answers WHERE id = $1", &id.to_string())
            .await
    }

    async fn verify_answer(&self, question_id: Uuid, nickname: &str) -> DbResult<Option<Answer>> {
        let sql = format!(
            "SELECT {} FROM answers WHERE questionid = $1 AND nickname = $2 \
             ORDER BY created_at DESC LIMIT 1",
            ANSWER_COLUMNS
        );

        let row: Option<AnswerRow> = sqlx::query_as(&sql)
            .bind(question_id.to_string())
            .bind(nickname)
            .fetch_optional(&self.pool)
            .await?;

        row.map(Answer::try_from).transpose()
    }
}

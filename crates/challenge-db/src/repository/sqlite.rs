//! # SQLite Repository
//!
//! Embedded implementation of [`ChallengeRepository`], used for local runs
//! and as the test database (`SqliteRepository::in_memory()`).
//!
//! Same contract and schema as the PostgreSQL backend; only placeholder
//! syntax and id generation differ.

use std::sync::Arc;

use async_trait::async_trait;
use challenge_core::{Answer, Credentials, NewUser, PasswordPolicy, PlaintextPolicy, Question, User};
use chrono::NaiveDate;
use sqlx::SqlitePool;
use tracing::{debug, warn};
use uuid::Uuid;

use super::{check_login, encode_tests, AnswerRow, ChallengeRepository, QuestionRow, ANSWER_COLUMNS, QUESTION_COLUMNS};
use crate::config::SqliteConfig;
use crate::error::{DbError, DbResult};
use crate::pool::connect_sqlite;

/// SQLite-backed repository.
///
/// ## Usage
/// ```rust,ignore
/// let repo = SqliteRepository::in_memory().await?;
/// repo.create_question(&question).await?;
/// ```
#[derive(Debug, Clone)]
pub struct SqliteRepository {
    pool: SqlitePool,
    passwords: Arc<dyn PasswordPolicy>,
}

impl SqliteRepository {
    /// Wraps an existing pool with the plaintext password policy.
    pub fn new(pool: SqlitePool) -> Self {
        SqliteRepository {
            pool,
            passwords: Arc::new(PlaintextPolicy),
        }
    }

    /// Opens (or creates) the configured database and migrates it.
    pub async fn connect(config: &SqliteConfig) -> DbResult<Self> {
        Ok(SqliteRepository::new(connect_sqlite(config).await?))
    }

    /// Fresh, migrated, isolated database. Perfect for tests.
    pub async fn in_memory() -> DbResult<Self> {
        SqliteRepository::connect(&SqliteConfig::in_memory()).await
    }

    /// Replaces the password policy used by signup and login.
    pub fn with_password_policy(mut self, policy: Arc<dyn PasswordPolicy>) -> Self {
        self.passwords = policy;
        self
    }

    /// Returns a reference to the connection pool.
    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Checks if the database can execute queries.
    pub async fn health_check(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Closes the pool.
    pub async fn close(&self) {
        debug!("Closing database connection pool");
        self.pool.close().await;
    }

    /// Runs a single DELETE inside its own transaction. See
    /// `PgRepository` for the rollback rules; they are identical.
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
impl ChallengeRepository for SqliteRepository {
    async fn create_question(&self, question: &Question) -> DbResult<()> {
        debug!(id = %question.id, date = %question.date, "Inserting question");

        let [params1, params2, params3] = encode_tests(question)?;
        let [t1, t2, t3] = &question.tests;

        sqlx::query(
            r#"
            INSERT INTO questions (
                id, title, description, date, level,
                params1, response1, params2, response2, params3, response3
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11)
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
            "SELECT {} FROM questions WHERE date = ?1 LIMIT 1",
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
                title = ?2,
                description = ?3,
                date = ?4,
                level = ?5,
                params1 = ?6,
                response1 = ?7,
                params2 = ?8,
                response2 = ?9,
                params3 = ?10,
                response3 = ?11
            WHERE id = ?1
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
        self.delete_in_transaction("question", "DELETE FROM questions WHERE id = ?1", &id.to_string())
            .await
    }

    async fn create_user(&self, user: &NewUser) -> DbResult<User> {
        debug!(nickname = %user.nickname, "Inserting user");

        let password = self.passwords.protect(&user.password)?;

        let result = sqlx::query("INSERT INTO users (nickname, email, password) VALUES (?1, ?2, ?3)")
            .bind(&user.nickname)
            .bind(&user.email)
            .bind(password)
            .execute(&self.pool)
            .await?;

        Ok(User {
            id: result.last_insert_rowid(),
            nickname: user.nickname.clone(),
            email: user.email.clone(),
        })
    }

    async fn read_user(&self, id: i64) -> DbResult<User> {
        sqlx::query_as::<_, User>("SELECT id, nickname, email FROM users WHERE id = ?1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("User", id))
    }

    async fn update_user(&self, user: &User) -> DbResult<()> {
        debug!(id = user.id, nickname = %user.nickname, "Updating user");

        let result = sqlx::query("UPDATE users SET nickname = ?2, email = ?3 WHERE id = ?1")
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
        self.delete_in_transaction("user", "DELETE FROM users WHERE nickname = ?1", nickname)
            .await
    }

    async fn verify_login(&self, credentials: &Credentials) -> DbResult<()> {
        let stored: Option<String> =
            sqlx::query_scalar("SELECT password FROM users WHERE nickname = ?1")
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
            "INSERT INTO answers (id, nickname, questionid, status, created_at) VALUES (?1, ?2, ?3, ?4, ?5)",
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
        self.delete_in_transaction("answer", "DELETE FROM answers WHERE id = ?1", &id.to_string())
            .await
    }

    async fn verify_answer(&self, question_id: Uuid, nickname: &str) -> DbResult<Option<Answer>> {
        let sql = format!(
            "SELECT {} FROM answers WHERE questionid = ?1 AND nickname = ?2 \
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

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::Ordering;

    use crate::repository::tests::CountingPolicy;
    use challenge_core::{AnswerStatus, Argon2Policy, TestCase};
    use chrono::{Duration, Local, TimeZone, Utc};

    fn question_on(date: NaiveDate) -> Question {
        Question::new(
            "Reverse",
            "Reverse the input string",
            date,
            "medium",
            [
                TestCase::new(["abc"], "cba"),
                TestCase::new(["a", "b,c"], "c,ba"),
                TestCase::new(Vec::<String>::new(), ""),
            ],
        )
    }

    #[tokio::test]
    async fn test_health_check() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        assert!(repo.health_check().await);

        repo.close().await;
        assert!(!repo.health_check().await);
    }

    #[tokio::test]
    async fn test_read_question_uses_local_today() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let today = Local::now().date_naive();

        repo.create_question(&question_on(today - Duration::days(1)))
            .await
            .unwrap();
        let todays = question_on(today);
        repo.create_question(&todays).await.unwrap();

        assert_eq!(repo.read_question().await.unwrap(), todays);
    }

    #[tokio::test]
    async fn test_duplicate_question_id_is_unique_violation() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let question = question_on(Local::now().date_naive());

        repo.create_question(&question).await.unwrap();
        let err = repo.create_question(&question).await.unwrap_err();
        assert!(err.is_unique_violation(), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_update_question_overwrites_every_field() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let mut question = question_on(date);
        repo.create_question(&question).await.unwrap();

        question.title = "Reverse words".to_string();
        question.level = "hard".to_string();
        question.date = date + Duration::days(1);
        question.tests[0] = TestCase::new(["hello world"], "world hello");
        repo.update_question(&question).await.unwrap();

        assert!(repo.read_question_on(date).await.unwrap_err().is_not_found());
        assert_eq!(repo.read_question_on(question.date).await.unwrap(), question);
    }

    #[tokio::test]
    async fn test_update_missing_rows_is_not_found() {
        let repo = SqliteRepository::in_memory().await.unwrap();

        let err = repo
            .update_question(&question_on(Local::now().date_naive()))
            .await
            .unwrap_err();
        assert!(err.is_not_found());

        let ghost = User {
            id: 999,
            nickname: "ghost".to_string(),
            email: "ghost@example.com".to_string(),
        };
        assert!(repo.update_user(&ghost).await.unwrap_err().is_not_found());
    }

    #[tokio::test]
    async fn test_update_user_renames_and_keeps_answers() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let question = question_on(Local::now().date_naive());
        repo.create_question(&question).await.unwrap();

        let mut user = repo
            .create_user(&NewUser::new("ada", "ada@example.com", "pw"))
            .await
            .unwrap();
        repo.create_answer(&Answer::new("ada", question.id, AnswerStatus::Pass))
            .await
            .unwrap();

        user.nickname = "lovelace".to_string();
        user.email = "lovelace@example.com".to_string();
        repo.update_user(&user).await.unwrap();

        assert_eq!(repo.read_user(user.id).await.unwrap(), user);
        let latest = repo.verify_answer(question.id, "lovelace").await.unwrap();
        assert_eq!(latest.map(|a| a.status), Some(AnswerStatus::Pass));
    }

    #[tokio::test]
    async fn test_deleting_question_removes_its_answers() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let question = question_on(Local::now().date_naive());
        repo.create_question(&question).await.unwrap();
        repo.create_user(&NewUser::new("ada", "ada@example.com", "pw"))
            .await
            .unwrap();
        let answer = Answer::new("ada", question.id, AnswerStatus::Fail);
        repo.create_answer(&answer).await.unwrap();

        assert_eq!(repo.delete_question(question.id).await.unwrap(), 1);
        assert_eq!(repo.verify_answer(question.id, "ada").await.unwrap(), None);
        assert_eq!(repo.delete_answer(answer.id).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_answer_for_unknown_user_is_foreign_key_violation() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let question = question_on(Local::now().date_naive());
        repo.create_question(&question).await.unwrap();

        let err = repo
            .create_answer(&Answer::new("nobody", question.id, AnswerStatus::Pass))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::ForeignKeyViolation { .. }), "got {:?}", err);
    }

    #[tokio::test]
    async fn test_argon2_policy_stores_hashes() {
        let repo = SqliteRepository::in_memory()
            .await
            .unwrap()
            .with_password_policy(Arc::new(Argon2Policy));

        repo.create_user(&NewUser::new("ada", "ada@example.com", "s3cret"))
            .await
            .unwrap();

        let stored: String = sqlx::query_scalar("SELECT password FROM users WHERE nickname = 'ada'")
            .fetch_one(repo.pool())
            .await
            .unwrap();
        assert_ne!(stored, "s3cret");

        repo.verify_login(&Credentials::new("ada", "s3cret"))
            .await
            .unwrap();
        assert!(matches!(
            repo.verify_login(&Credentials::new("ada", "nope")).await,
            Err(DbError::InvalidCredentials)
        ));
    }

    #[tokio::test]
    async fn test_unknown_nickname_still_runs_password_check() {
        let policy = Arc::new(CountingPolicy::default());
        let repo = SqliteRepository::in_memory()
            .await
            .unwrap()
            .with_password_policy(policy.clone());

        repo.create_user(&NewUser::new("ada", "ada@example.com", "pw"))
            .await
            .unwrap();

        let err = repo
            .verify_login(&Credentials::new("nobody", "pw"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidCredentials));
        assert_eq!(policy.verifications.load(Ordering::SeqCst), 1);

        let err = repo
            .verify_login(&Credentials::new("ada", "wrong"))
            .await
            .unwrap_err();
        assert!(matches!(err, DbError::InvalidCredentials));
        assert_eq!(policy.verifications.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_legacy_comma_joined_rows_still_read() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let id = Uuid::new_v4();
        let date = NaiveDate::from_ymd_opt(2025, 12, 24).unwrap();

        sqlx::query(
            "INSERT INTO questions (id, title, description, date, level, params1, response1, params2, response2, params3, response3) \
             VALUES (?1, 'Add', 'Add two numbers', ?2, 'easy', '1,2', '3', '10,20', '30', '', '0')",
        )
        .bind(id.to_string())
        .bind(date)
        .execute(repo.pool())
        .await
        .unwrap();

        let question = repo.read_question_on(date).await.unwrap();
        assert_eq!(question.id, id);
        assert_eq!(question.tests[0].params, vec!["1", "2"]);
        assert_eq!(question.tests[1].params, vec!["10", "20"]);
        assert_eq!(question.tests[2].params, vec![""]);
    }

    #[tokio::test]
    async fn test_answer_timestamps_round_trip() {
        let repo = SqliteRepository::in_memory().await.unwrap();
        let question = question_on(Local::now().date_naive());
        repo.create_question(&question).await.unwrap();
        repo.create_user(&NewUser::new("ada", "ada@example.com", "pw"))
            .await
            .unwrap();

        let mut answer = Answer::new("ada", question.id, AnswerStatus::Pass);
        answer.created_at = Utc.with_ymd_and_hms(2026, 10, 16, 9, 30, 15).unwrap();
        repo.create_answer(&answer).await.unwrap();

        let latest = repo.verify_answer(question.id, "ada").await.unwrap().unwrap();
        assert_eq!(latest, answer);
    }
}

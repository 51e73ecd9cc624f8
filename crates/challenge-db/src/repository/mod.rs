//! # Repository Module
//!
//! The data-access contract for questions, users and answers, plus its
//! PostgreSQL and SQLite implementations.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repository Pattern                                   │
//! │                                                                         │
//! │  HTTP handler                                                          │
//! │       │                                                                 │
//! │       │  repo.read_question().await?                                   │
//! │       ▼                                                                 │
//! │  Arc<dyn ChallengeRepository>                                          │
//! │  ├── PgRepository      (production)                                    │
//! │  └── SqliteRepository  (local runs, tests)                             │
//! │       │                                                                 │
//! │       │  SQL                                                            │
//! │       ▼                                                                 │
//! │  questions / users / answers                                           │
//! │                                                                         │
//! │  Deletes run inside a transaction: begin → DELETE → commit, with an    │
//! │  explicit rollback on error and an implicit one if the future is       │
//! │  dropped midway.                                                       │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Available Repositories
//!
//! - [`PgRepository`] - PostgreSQL backend
//! - [`SqliteRepository`] - SQLite backend

use async_trait::async_trait;
use challenge_core::params::{decode_params, encode_params};
use challenge_core::{Answer, Credentials, NewUser, PasswordPolicy, Question, TestCase, User};
use chrono::{DateTime, Local, NaiveDate, Utc};
use tracing::debug;
use uuid::Uuid;

use crate::error::{DbError, DbResult};

pub mod postgres;
pub mod sqlite;

pub use postgres::PgRepository;
pub use sqlite::SqliteRepository;

// =============================================================================
// Contract
// =============================================================================

/// CRUD operations for questions, users and answers.
///
/// Object safe, so the HTTP layer can hold an `Arc<dyn ChallengeRepository>`.
/// Every method runs to completion on the pool; dropping the returned future
/// is the only form of cancellation.
#[async_trait]
pub trait ChallengeRepository: Send + Sync {
    // ---- Questions ---------------------------------------------------------

    /// Inserts a question. An existing id is a `UniqueViolation`.
    async fn create_question(&self, question: &Question) -> DbResult<()>;

    /// Returns the question dated today (server-local date).
    ///
    /// ## Errors
    /// `DbError::NotFound` when nothing is scheduled for today.
    async fn read_question(&self) -> DbResult<Question> {
        self.read_question_on(Local::now().date_naive()).await
    }

    /// Returns the question dated `date`.
    async fn read_question_on(&self, date: NaiveDate) -> DbResult<Question>;

    /// Overwrites every field of an existing question.
    async fn update_question(&self, question: &Question) -> DbResult<()>;

    /// Deletes a question (and its answers). Returns rows removed; a
    /// missing id is `Ok(0)`.
    async fn delete_question(&self, id: Uuid) -> DbResult<u64>;

    // ---- Users -------------------------------------------------------------

    /// Registers a user and returns it with its generated id.
    async fn create_user(&self, user: &NewUser) -> DbResult<User>;

    async fn read_user(&self, id: i64) -> DbResult<User>;

    /// Updates nickname and email for `user.id`.
    async fn update_user(&self, user: &User) -> DbResult<()>;

    /// Deletes a user (and their answers) by nickname.
    async fn delete_user(&self, nickname: &str) -> DbResult<u64>;

    /// Checks a nickname/password pair.
    ///
    /// ## Errors
    /// `DbError::InvalidCredentials` for an unknown nickname and for a wrong
    /// password alike.
    async fn verify_login(&self, credentials: &Credentials) -> DbResult<()>;

    // ---- Answers -----------------------------------------------------------

    async fn create_answer(&self, answer: &Answer) -> DbResult<()>;

    async fn delete_answer(&self, id: Uuid) -> DbResult<u64>;

    /// Latest answer for `(question_id, nickname)`, or `None` if the user
    /// hasn't answered yet. Absence is not an error.
    async fn verify_answer(&self, question_id: Uuid, nickname: &str) -> DbResult<Option<Answer>>;
}

// =============================================================================
// Row Mapping (shared by both backends)
// =============================================================================

pub(crate) const QUESTION_COLUMNS: &str = "id, title, description, date, level, \
     params1, response1, params2, response2, params3, response3";

pub(crate) const ANSWER_COLUMNS: &str = "id, nickname, questionid, status, created_at";

/// A `questions` row as stored.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct QuestionRow {
    pub id: String,
    pub title: String,
    pub description: String,
    pub date: NaiveDate,
    pub level: String,
    pub params1: String,
    pub response1: String,
    pub params2: String,
    pub response2: String,
    pub params3: String,
    pub response3: String,
}

impl TryFrom<QuestionRow> for Question {
    type Error = DbError;

    fn try_from(row: QuestionRow) -> DbResult<Self> {
        Ok(Question {
            id: parse_id("question", &row.id)?,
            title: row.title,
            description: row.description,
            date: row.date,
            level: row.level,
            tests: [
                TestCase {
                    params: decode_params(&row.params1),
                    response: row.response1,
                },
                TestCase {
                    params: decode_params(&row.params2),
                    response: row.response2,
                },
                TestCase {
                    params: decode_params(&row.params3),
                    response: row.response3,
                },
            ],
        })
    }
}

/// Encoded `params1..params3` column values for a question.
pub(crate) fn encode_tests(question: &Question) -> DbResult<[String; 3]> {
    let [t1, t2, t3] = &question.tests;
    Ok([
        encode_params(&t1.params)?,
        encode_params(&t2.params)?,
        encode_params(&t3.params)?,
    ])
}

/// An `answers` row as stored.
#[derive(Debug, sqlx::FromRow)]
pub(crate) struct AnswerRow {
    pub id: String,
    pub nickname: String,
    pub questionid: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

impl TryFrom<AnswerRow> for Answer {
    type Error = DbError;

    fn try_from(row: AnswerRow) -> DbResult<Self> {
        Ok(Answer {
            id: parse_id("answer", &row.id)?,
            nickname: row.nickname,
            question_id: parse_id("question", &row.questionid)?,
            status: row.status.parse()?,
            created_at: row.created_at,
        })
    }
}

/// Decides a login from the stored password, if the nickname exists.
///
/// Both failure paths run one policy verification and return the same
/// error.
pub(crate) fn check_login(
    policy: &dyn PasswordPolicy,
    credentials: &Credentials,
    stored: Option<String>,
) -> DbResult<()> {
    let accepted = match stored {
        Some(stored) => policy.verify(&credentials.password, &stored),
        None => {
            policy.verify_unknown_user(&credentials.password);
            false
        }
    };

    if accepted {
        Ok(())
    } else {
        debug!(nickname = %credentials.nickname, "Login rejected");
        Err(DbError::InvalidCredentials)
    }
}

fn parse_id(entity: &str, raw: &str) -> DbResult<Uuid> {
    Uuid::parse_str(raw).map_err(|e| DbError::Internal(format!("invalid {} id '{}': {}", entity, raw, e)))
}

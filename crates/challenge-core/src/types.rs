//! # Domain Types
//!
//! Core domain types used throughout Daily Challenge.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │    Question     │   │      User       │   │     Answer      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id (UUID)      │   │  id (serial)    │   │  id (UUID)      │       │
//! │  │  date (day)     │◄──┤  nickname (UQ)  │◄──┤  nickname (FK)  │       │
//! │  │  tests [3]      │   │  email          │   │  question (FK)  │       │
//! │  └────────┬────────┘   └─────────────────┘   │  status         │       │
//! │           │                                  │  created_at     │       │
//! │  ┌────────▼────────┐                         └─────────────────┘       │
//! │  │    TestCase     │                                                    │
//! │  │  params: [str]  │                                                    │
//! │  │  response: str  │                                                    │
//! │  └─────────────────┘                                                    │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;
use crate::TESTS_PER_QUESTION;

// =============================================================================
// Question
// =============================================================================

/// One input/expected-output pair used to grade a submission.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TestCase {
    /// Ordered arguments passed to the submitted solution.
    pub params: Vec<String>,

    /// Expected output for `params`.
    pub response: String,
}

impl TestCase {
    pub fn new<I, S>(params: I, response: impl Into<String>) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TestCase {
            params: params.into_iter().map(Into::into).collect(),
            response: response.into(),
        }
    }
}

/// The question of the day.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    /// Unique identifier (UUID v4).
    pub id: Uuid,

    pub title: String,

    pub description: String,

    /// Calendar day this question is served on.
    pub date: NaiveDate,

    /// Difficulty label, stored verbatim.
    pub level: String,

    /// Grading cases, always exactly three.
    pub tests: [TestCase; TESTS_PER_QUESTION],
}

impl Question {
    /// Creates a question with a fresh id.
    pub fn new(
        title: impl Into<String>,
        description: impl Into<String>,
        date: NaiveDate,
        level: impl Into<String>,
        tests: [TestCase; TESTS_PER_QUESTION],
    ) -> Self {
        Question {
            id: Uuid::new_v4(),
            title: title.into(),
            description: description.into(),
            date,
            level: level.into(),
            tests,
        }
    }
}

// =============================================================================
// User
// =============================================================================

/// A registered user as returned by reads. Never carries the password.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::FromRow))]
pub struct User {
    /// Database-assigned identifier.
    pub id: i64,

    /// Login handle, unique across users.
    pub nickname: String,

    pub email: String,
}

/// Signup payload.
#[derive(Clone, Serialize, Deserialize)]
pub struct NewUser {
    pub nickname: String,
    pub email: String,
    pub password: String,
}

impl NewUser {
    pub fn new(
        nickname: impl Into<String>,
        email: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        NewUser {
            nickname: nickname.into(),
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for NewUser {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("NewUser")
            .field("nickname", &self.nickname)
            .field("email", &self.email)
            .field("password", &"***")
            .finish()
    }
}

/// Login payload.
#[derive(Clone, Serialize, Deserialize)]
pub struct Credentials {
    pub nickname: String,
    pub password: String,
}

impl Credentials {
    pub fn new(nickname: impl Into<String>, password: impl Into<String>) -> Self {
        Credentials {
            nickname: nickname.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("nickname", &self.nickname)
            .field("password", &"***")
            .finish()
    }
}

// =============================================================================
// Answer
// =============================================================================

/// Grading outcome of a submission.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnswerStatus {
    /// All test cases matched.
    Pass,
    /// At least one test case did not match.
    #[default]
    Fail,
}

impl AnswerStatus {
    /// Column value for this status.
    pub const fn as_str(&self) -> &'static str {
        match self {
            AnswerStatus::Pass => "pass",
            AnswerStatus::Fail => "fail",
        }
    }
}

impl fmt::Display for AnswerStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AnswerStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "pass" | "passed" => Ok(AnswerStatus::Pass),
            "fail" | "failed" => Ok(AnswerStatus::Fail),
            other => Err(CoreError::UnknownStatus(other.to_string())),
        }
    }
}

/// A user's submission for a question.
///
/// Submissions are append-only; the latest one per (question, nickname)
/// is authoritative.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Answer {
    pub id: Uuid,

    /// Submitting user (references `users.nickname`).
    pub nickname: String,

    /// Answered question (references `questions.id`).
    pub question_id: Uuid,

    pub status: AnswerStatus,

    pub created_at: DateTime<Utc>,
}

impl Answer {
    /// Creates an answer with a fresh id, timestamped now.
    pub fn new(nickname: impl Into<String>, question_id: Uuid, status: AnswerStatus) -> Self {
        Answer {
            id: Uuid::new_v4(),
            nickname: nickname.into(),
            question_id,
            status,
            created_at: Utc::now(),
        }
    }

    pub fn passed(&self) -> bool {
        self.status == AnswerStatus::Pass
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

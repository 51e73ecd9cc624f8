//! Repository contract shared by the backend test files.
//!
//! Every check creates its own nicknames and dates, so the same database
//! can be reused across runs.

use std::sync::Arc;

use challenge_core::{Answer, AnswerStatus, Credentials, NewUser, Question, TestCase, User};
use challenge_db::{ChallengeRepository, DbError};
use chrono::{Duration, NaiveDate, TimeZone, Utc};
use uuid::Uuid;

// =============================================================================
// Fixtures
// =============================================================================

/// A nickname no other test uses.
pub fn unique_nickname(prefix: &str) -> String {
    format!("{}-{}", prefix, Uuid::new_v4().simple())
}

/// A far-future date no other test is likely to use.
pub fn unique_date() -> NaiveDate {
    let offset = (Uuid::new_v4().as_u128() % 1_000_000) as i64;
    NaiveDate::from_ymd_opt(2100, 1, 1).unwrap() + Duration::days(offset)
}

pub fn question_on(date: NaiveDate) -> Question {
    Question::new(
        "Two Sum",
        "Return the indices of the two numbers that add up to target",
        date,
        "easy",
        [
            TestCase::new(["[2,7,11,15]", "9"], "[0,1]"),
            TestCase::new(["a,b", ",", ""], "x"),
            TestCase::new(["[3,3]", "6"], "[0,1]"),
        ],
    )
}

pub async fn seed_user(repo: &dyn ChallengeRepository, nickname: &str) -> User {
    repo.create_user(&NewUser::new(nickname, format!("{}@example.com", nickname), "pw"))
        .await
        .unwrap()
}

pub async fn seed_question(repo: &dyn ChallengeRepository) -> Question {
    let question = question_on(unique_date());
    repo.create_question(&question).await.unwrap();
    question
}

// =============================================================================
// Questions
// =============================================================================

pub async fn question_round_trip(repo: &dyn ChallengeRepository) {
    let question = seed_question(repo).await;

    let read = repo.read_question_on(question.date).await.unwrap();

    assert_eq!(read, question);
    assert_eq!(read.tests[0].params, vec!["[2,7,11,15]", "9"]);
    assert_eq!(read.tests[1].params, vec!["a,b", ",", ""]);
}

pub async fn missing_question_is_not_found(repo: &dyn ChallengeRepository) {
    let date = unique_date();

    let err = repo.read_question_on(date).await.unwrap_err();
    assert!(err.is_not_found(), "got {:?}", err);

    // The repository is still usable afterwards
    let question = question_on(date);
    repo.create_question(&question).await.unwrap();
    assert_eq!(repo.read_question_on(date).await.unwrap(), question);
}

pub async fn one_question_per_date(repo: &dyn ChallengeRepository) {
    let first = seed_question(repo).await;

    let err = repo
        .create_question(&question_on(first.date))
        .await
        .unwrap_err();
    assert!(err.is_unique_violation(), "got {:?}", err);

    assert_eq!(repo.read_question_on(first.date).await.unwrap().id, first.id);
}

pub async fn deletes_are_idempotent(repo: &dyn ChallengeRepository) {
    let question = seed_question(repo).await;
    let nickname = unique_nickname("ada");
    seed_user(repo, &nickname).await;
    let answer = Answer::new(nickname.as_str(), question.id, AnswerStatus::Pass);
    repo.create_answer(&answer).await.unwrap();

    assert_eq!(repo.delete_answer(answer.id).await.unwrap(), 1);
    assert_eq!(repo.delete_answer(answer.id).await.unwrap(), 0);

    assert_eq!(repo.delete_user(&nickname).await.unwrap(), 1);
    assert_eq!(repo.delete_user(&nickname).await.unwrap(), 0);

    assert_eq!(repo.delete_question(question.id).await.unwrap(), 1);
    assert_eq!(repo.delete_question(question.id).await.unwrap(), 0);

    assert_eq!(repo.delete_question(Uuid::new_v4()).await.unwrap(), 0);
}

// =============================================================================
// Users
// =============================================================================

pub async fn user_round_trip(repo: &dyn ChallengeRepository) {
    let nickname = unique_nickname("grace");

    let created = repo
        .create_user(&NewUser::new(nickname.as_str(), "grace@example.com", "cobol"))
        .await
        .unwrap();
    let read = repo.read_user(created.id).await.unwrap();

    assert_eq!(read, created);
    assert_eq!(read.nickname, nickname);
    assert_eq!(read.email, "grace@example.com");
}

pub async fn missing_user_is_not_found(repo: &dyn ChallengeRepository) {
    let err = repo.read_user(-1).await.unwrap_err();
    assert!(matches!(err, DbError::NotFound { ref entity, .. } if entity == "User"));
}

pub async fn login_failures_are_indistinguishable(repo: &dyn ChallengeRepository) {
    let nickname = unique_nickname("ada");
    repo.create_user(&NewUser::new(nickname.as_str(), "ada@example.com", "correct horse"))
        .await
        .unwrap();

    repo.verify_login(&Credentials::new(nickname.as_str(), "correct horse"))
        .await
        .unwrap();

    let wrong_password = repo
        .verify_login(&Credentials::new(nickname.as_str(), "battery staple"))
        .await
        .unwrap_err();
    let unknown_user = repo
        .verify_login(&Credentials::new(unique_nickname("nobody"), "correct horse"))
        .await
        .unwrap_err();

    assert!(matches!(wrong_password, DbError::InvalidCredentials));
    assert!(matches!(unknown_user, DbError::InvalidCredentials));
    assert_eq!(wrong_password.to_string(), unknown_user.to_string());
    assert_eq!(wrong_password.to_string(), "nickname or password wrong");
}

/// Signs up the same nickname from several tasks at once.
pub async fn concurrent_signups_admit_exactly_one(repo: Arc<dyn ChallengeRepository>) {
    const ATTEMPTS: usize = 4;
    let nickname = unique_nickname("linus");

    let handles: Vec<_> = (0..ATTEMPTS)
        .map(|i| {
            let repo = Arc::clone(&repo);
            let user = NewUser::new(nickname.as_str(), format!("{}@example.com", i), "pw");
            tokio::spawn(async move { repo.create_user(&user).await })
        })
        .collect();

    let mut successes = 0;
    let mut conflicts = 0;
    for handle in handles {
        match handle.await.unwrap() {
            Ok(_) => successes += 1,
            Err(e) if e.is_unique_violation() => conflicts += 1,
            Err(e) => panic!("unexpected error: {:?}", e),
        }
    }

    assert_eq!(successes, 1);
    assert_eq!(conflicts, ATTEMPTS - 1);
}

pub async fn renaming_onto_taken_nickname_is_unique_violation(repo: &dyn ChallengeRepository) {
    let taken = unique_nickname("ada");
    seed_user(repo, &taken).await;
    let mut grace = seed_user(repo, &unique_nickname("grace")).await;

    grace.nickname = taken;
    let err = repo.update_user(&grace).await.unwrap_err();
    assert!(err.is_unique_violation(), "got {:?}", err);
}

// =============================================================================
// Answers
// =============================================================================

pub async fn verify_answer_returns_latest(repo: &dyn ChallengeRepository) {
    let question = seed_question(repo).await;
    let nickname = unique_nickname("ada");
    seed_user(repo, &nickname).await;

    let base = Utc.with_ymd_and_hms(2026, 10, 16, 8, 0, 0).unwrap();
    let statuses = [AnswerStatus::Fail, AnswerStatus::Fail, AnswerStatus::Pass];
    let mut latest = None;

    for (i, status) in statuses.into_iter().enumerate() {
        let mut answer = Answer::new(nickname.as_str(), question.id, status);
        answer.created_at = base + Duration::minutes(i as i64 * 5);
        repo.create_answer(&answer).await.unwrap();
        latest = Some(answer);
    }

    // An older answer inserted last must not win
    let mut stale = Answer::new(nickname.as_str(), question.id, AnswerStatus::Fail);
    stale.created_at = base - Duration::hours(1);
    repo.create_answer(&stale).await.unwrap();

    let found = repo.verify_answer(question.id, &nickname).await.unwrap();
    assert_eq!(found, latest);
    assert!(found.unwrap().passed());
}

pub async fn verify_answer_without_submissions_is_none(repo: &dyn ChallengeRepository) {
    let question = seed_question(repo).await;
    let ada = unique_nickname("ada");
    let grace = unique_nickname("grace");
    seed_user(repo, &ada).await;
    seed_user(repo, &grace).await;
    repo.create_answer(&Answer::new(grace.as_str(), question.id, AnswerStatus::Pass))
        .await
        .unwrap();

    assert_eq!(repo.verify_answer(question.id, &ada).await.unwrap(), None);
    assert_eq!(repo.verify_answer(Uuid::new_v4(), &grace).await.unwrap(), None);
}

pub async fn deleting_user_removes_their_answers(repo: &dyn ChallengeRepository) {
    let question = seed_question(repo).await;
    let nickname = unique_nickname("ada");
    seed_user(repo, &nickname).await;
    repo.create_answer(&Answer::new(nickname.as_str(), question.id, AnswerStatus::Pass))
        .await
        .unwrap();

    repo.delete_user(&nickname).await.unwrap();

    assert_eq!(repo.verify_answer(question.id, &nickname).await.unwrap(), None);
    assert!(matches!(
        repo.verify_login(&Credentials::new(nickname.as_str(), "pw")).await,
        Err(DbError::InvalidCredentials)
    ));
}

pub async fn answers_need_existing_user_and_question(repo: &dyn ChallengeRepository) {
    let question = seed_question(repo).await;
    let nickname = unique_nickname("ada");
    seed_user(repo, &nickname).await;

    let err = repo
        .create_answer(&Answer::new(nickname.as_str(), Uuid::new_v4(), AnswerStatus::Pass))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ForeignKeyViolation { .. }), "got {:?}", err);

    let err = repo
        .create_answer(&Answer::new(unique_nickname("nobody"), question.id, AnswerStatus::Pass))
        .await
        .unwrap_err();
    assert!(matches!(err, DbError::ForeignKeyViolation { .. }), "got {:?}", err);
}

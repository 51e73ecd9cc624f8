//! # challenge-core: Domain Types for Daily Challenge
//!
//! Pure types and helpers shared by the storage layer and whatever HTTP
//! service sits in front of it. Nothing in here touches a database or the
//! network.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                     Daily Challenge Architecture                        │
//! │                                                                         │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                 HTTP service (not in this repo)                 │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │ Arc<dyn ChallengeRepository>          │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │              challenge-db (Postgres / SQLite)                   │   │
//! │  └─────────────────────────────┬───────────────────────────────────┘   │
//! │                                │                                        │
//! │  ┌─────────────────────────────▼───────────────────────────────────┐   │
//! │  │             ★ challenge-core (THIS CRATE) ★                     │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐      ┌───────────┐      ┌───────────┐          │   │
//! │  │   │   types   │      │  params   │      │   auth    │          │   │
//! │  │   │ Question  │      │  encode   │      │ Plaintext │          │   │
//! │  │   │ User      │      │  decode   │      │ Argon2    │          │   │
//! │  │   │ Answer    │      └───────────┘      └───────────┘          │   │
//! │  │   └───────────┘                                                 │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Domain types (Question, TestCase, User, Answer)
//! - [`params`] - Column encoding for test case parameter lists
//! - [`auth`] - Password storage/verification policies
//! - [`error`] - Domain error types
//!
//! ## Example Usage
//!
//! ```rust
//! use challenge_core::params::{decode_params, encode_params};
//!
//! let params = vec!["1".to_string(), "a,b".to_string()];
//! let column = encode_params(&params).unwrap();
//! assert_eq!(decode_params(&column), params);
//!
//! // Rows written by the old comma-joined format still decode
//! assert_eq!(decode_params("1,2,3"), vec!["1", "2", "3"]);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod auth;
pub mod error;
pub mod params;
pub mod types;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use auth::{Argon2Policy, PasswordPolicy, PlaintextPolicy};
pub use error::{CoreError, CoreResult};
pub use types::*;

/// Number of test cases embedded in every question.
///
/// The storage schema has one `paramsN`/`responseN` column pair per case.
pub const TESTS_PER_QUESTION: usize = 3;

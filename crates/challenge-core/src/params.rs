//! # Parameter List Encoding
//!
//! Each test case's parameter list lives in a single text column
//! (`params1`, `params2`, `params3`).
//!
//! ## Column Format
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  Vec<String>            encode_params            column text           │
//! │  ["1", "a,b", ""]  ───────────────────────►  ["1","a,b",""]            │
//! │                                                                         │
//! │  column text            decode_params            Vec<String>           │
//! │  ["1","a,b",""]    ───────────────────────►  ["1", "a,b", ""]          │
//! │  1,2,3 (legacy)    ───────────────────────►  ["1", "2", "3"]           │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! New rows are written as JSON arrays, so parameters may contain commas.
//! Rows written by the older comma-joined format are still readable.

use crate::error::CoreResult;

/// Separator used by the legacy comma-joined column format.
pub const LEGACY_DELIMITER: char = ',';

/// Encodes a parameter list for storage.
pub fn encode_params(params: &[String]) -> CoreResult<String> {
    Ok(serde_json::to_string(params)?)
}

/// Decodes a stored parameter list.
///
/// Text that is not a JSON string array is treated as a legacy row and
/// split on [`LEGACY_DELIMITER`]. An empty legacy column yields a single
/// empty parameter.
///
/// The two formats are told apart by content alone. A legacy row whose
/// text is itself a JSON string array (a single parameter such as
/// `["x"]`) decodes as that array, not as one literal parameter. Rows
/// like that need rewriting through [`encode_params`] before they can be
/// read back verbatim.
pub fn decode_params(raw: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(raw) {
        Ok(params) => params,
        Err(_) => raw.split(LEGACY_DELIMITER).map(str::to_string).collect(),
    }
}

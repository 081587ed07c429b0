//! Storage layer: JSON documents, rule sets, profiles, and match results on disk.

mod error;
pub mod extract;
pub mod files;
pub mod json;

pub use error::StoreError;
pub use extract::extract_text;
pub use files::{DataDir, FileRuleSource, JsonResultStore};
pub use json::{
    load_document, load_match_result, load_profile, load_rules, load_synonyms, read_json,
    save_document, save_rules, write_json,
};

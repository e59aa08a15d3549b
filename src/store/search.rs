//! Pattern search over cases and judges
//!
//! Matching is a literal, case-insensitive substring test in storage order.
//! Documents are scanned in Rust so Unicode case folding behaves the same for
//! every field (SQLite's LIKE only folds ASCII).

use super::{cases, judges, load_docs, Database, StoreError};
use crate::models::{Case, CaseView, Judge, JudgeView};

impl Database {
    /// Cases whose number, case id, petitioner/plaintiff or respondent/defendant contain `query`
    pub fn search_cases(&self, query: &str) -> Result<Vec<CaseView>, StoreError> {
        let needle = normalized_query(query, "Search query is required")?;
        self.with_conn(|conn| {
            let all: Vec<Case> = load_docs(conn, "SELECT doc FROM cases ORDER BY rowid", [])?;
            all.into_iter()
                .filter(|case| case_matches(case, &needle))
                .map(|case| cases::expand_case(conn, case))
                .collect()
        })
    }

    /// Every judge whose name contains `name`
    pub fn search_judges(&self, name: &str) -> Result<Vec<JudgeView>, StoreError> {
        let needle = normalized_query(name, "Judge name is required")?;
        self.with_conn(|conn| {
            let all: Vec<Judge> = load_docs(conn, "SELECT doc FROM judges ORDER BY rowid", [])?;
            all.into_iter()
                .filter(|judge| judge.name.to_lowercase().contains(&needle))
                .map(|judge| judges::expand_judge(conn, judge))
                .collect()
        })
    }
}

fn normalized_query(raw: &str, empty_message: &str) -> Result<String, StoreError> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(StoreError::validation(empty_message));
    }
    Ok(trimmed.to_lowercase())
}

/// Plaintiff/defendant mirror `parties`, so the four stored fields cover all six names.
fn case_matches(case: &Case, needle: &str) -> bool {
    [
        case.case_number.as_str(),
        case.case_id.as_str(),
        case.parties.petitioner.as_str(),
        case.parties.respondent.as_str(),
    ]
    .iter()
    .any(|field| field.to_lowercase().contains(needle))
}

//! Case collection: creation, merge updates, deletes and read-time joins

use super::{
    encode, hearings, judges, load_doc, load_docs, new_id, optional_text, parse_date_field,
    parse_enum, required, unique_violation, Database, ReferencePolicy, StoreError,
};
use crate::models::{
    Case, CaseRecord, CaseStatus, CaseType, CaseUpdate, CaseView, HearingRecord, HistoryEntry,
    NewCase, Parties, PartiesInput,
};
use chrono::Utc;
use rand::Rng;
use rusqlite::{params, Connection};
use tracing::{info, warn};

pub const CASE_ID_PREFIX: &str = "ECF-";

/// Generated ids are re-drawn this many times before a collision is reported.
const MAX_CASE_ID_ATTEMPTS: usize = 5;

/// `ECF-<unix millis>-<6 random digits>`
pub fn generate_case_id() -> String {
    let suffix: u32 = rand::thread_rng().gen_range(100_000..1_000_000);
    format!("{CASE_ID_PREFIX}{}-{suffix}", Utc::now().timestamp_millis())
}

impl Database {
    pub fn create_case(&self, input: NewCase) -> Result<CaseView, StoreError> {
        self.create_case_with(input, generate_case_id)
    }

    pub(crate) fn create_case_with(
        &self,
        input: NewCase,
        mut next_case_id: impl FnMut() -> String,
    ) -> Result<CaseView, StoreError> {
        let now = Utc::now();
        let parties = resolve_parties(
            input.parties,
            input.plaintiff_name,
            input.defendant_name,
            None,
        )?;
        let case_number = required(input.case_number, "caseNumber")?;
        let title = required(input.title, "title")?;
        let case_type = parse_case_type(&required(input.case_type, "caseType")?)?;
        let status = match optional_text(input.status) {
            Some(raw) => parse_case_status(&raw)?,
            None => CaseStatus::default(),
        };
        let filing_date = match optional_text(input.filing_date) {
            Some(raw) => parse_date_field(&raw, "filingDate")?,
            None => now,
        };
        let supplied_case_id = optional_text(input.case_id);
        let assigned_judge = optional_text(input.assigned_judge);

        self.with_conn(|conn| {
            if let Some(judge_id) = &assigned_judge {
                judges::require_judge(conn, judge_id)?;
            }

            let generated = supplied_case_id.is_none();
            let mut case = Case {
                id: new_id(),
                case_number,
                case_id: supplied_case_id.unwrap_or_else(&mut next_case_id),
                title,
                case_type,
                filing_date,
                status,
                parties,
                description: optional_text(input.description),
                assigned_judge: assigned_judge.clone(),
                hearing_dates: Vec::new(),
                history: vec![HistoryEntry {
                    date: now,
                    description: "Case filed".to_string(),
                }],
                created_at: now,
                updated_at: now,
            };

            insert_case(conn, &mut case, generated, &mut next_case_id)?;

            if let Some(judge_id) = &assigned_judge {
                judges::attach_case(conn, judge_id, &case.id)?;
            }

            info!(
                "📁 Case created: {} ({}, {})",
                case.case_number,
                case.case_id,
                case.case_type.as_str()
            );
            expand_case(conn, case)
        })
    }

    pub fn get_case(&self, id: &str) -> Result<CaseView, StoreError> {
        self.with_conn(|conn| {
            let case = load_case(conn, id)?.ok_or(StoreError::NotFound { entity: "Case" })?;
            expand_case(conn, case)
        })
    }

    /// All cases, newest first
    pub fn list_cases(&self) -> Result<Vec<CaseView>, StoreError> {
        self.with_conn(|conn| {
            let cases: Vec<Case> = load_docs(conn, "SELECT doc FROM cases ORDER BY rowid DESC", [])?;
            cases.into_iter().map(|c| expand_case(conn, c)).collect()
        })
    }

    pub fn update_case(&self, id: &str, update: CaseUpdate) -> Result<CaseView, StoreError> {
        self.with_tx(|conn| {
            let mut case = load_case(conn, id)?.ok_or(StoreError::NotFound { entity: "Case" })?;
            let now = Utc::now();

            if let Some(case_id) = optional_text(update.case_id) {
                if case_id != case.case_id {
                    return Err(StoreError::validation("caseId cannot be changed"));
                }
            }
            if let Some(number) = update.case_number {
                case.case_number = required(Some(number), "caseNumber")?;
            }
            if let Some(title) = update.title {
                case.title = required(Some(title), "title")?;
            }
            if let Some(raw) = update.case_type {
                case.case_type = parse_case_type(&raw)?;
            }
            if let Some(raw) = update.filing_date {
                case.filing_date = parse_date_field(&raw, "filingDate")?;
            }
            if update.parties.is_some()
                || update.plaintiff_name.is_some()
                || update.defendant_name.is_some()
            {
                case.parties = resolve_parties(
                    update.parties,
                    update.plaintiff_name,
                    update.defendant_name,
                    Some(&case.parties),
                )?;
            }
            if let Some(description) = update.description {
                case.description = optional_text(description);
            }
            if let Some(raw) = update.status {
                let status = parse_case_status(&raw)?;
                if status != case.status {
                    case.history.push(HistoryEntry {
                        date: now,
                        description: format!(
                            "Status changed from {} to {}",
                            case.status.as_str(),
                            status.as_str()
                        ),
                    });
                    case.status = status;
                }
            }
            for note in update.history.unwrap_or_default() {
                let date = match optional_text(note.date) {
                    Some(raw) => parse_date_field(&raw, "history.date")?,
                    None => now,
                };
                let description = required(Some(note.description), "history.description")?;
                case.history.push(HistoryEntry { date, description });
            }

            let newly_assigned = match update.assigned_judge {
                Some(judge) => {
                    let judge = optional_text(judge);
                    if let Some(judge_id) = &judge {
                        judges::require_judge(conn, judge_id)?;
                    }
                    let changed = judge != case.assigned_judge;
                    case.assigned_judge = judge;
                    if changed {
                        case.assigned_judge.clone()
                    } else {
                        None
                    }
                }
                None => None,
            };

            case.updated_at = now;
            save_case(conn, &case)?;

            if let Some(judge_id) = newly_assigned {
                judges::attach_case(conn, &judge_id, &case.id)?;
            }

            info!("📝 Case updated: {} ({})", case.case_number, case.id);
            expand_case(conn, case)
        })
    }

    pub fn delete_case(&self, id: &str) -> Result<(), StoreError> {
        let policy = self.policy;
        self.with_tx(|conn| {
            let removed = conn.execute("DELETE FROM cases WHERE id = ?1", params![id])?;
            if removed == 0 {
                return Err(StoreError::NotFound { entity: "Case" });
            }

            if policy == ReferencePolicy::Cleanup {
                let purged = hearings::purge_hearings(conn, "case_ref", id)?;
                let scrubbed = judges::detach_case_everywhere(conn, id)?;
                info!(
                    "🧹 Case {} cleanup: {} hearings removed, {} judges updated",
                    id, purged, scrubbed
                );
            }

            info!("🗑️  Case deleted: {}", id);
            Ok(())
        })
    }
}

// ===== Connection-level helpers =====

pub(crate) fn load_case(conn: &Connection, id: &str) -> Result<Option<Case>, StoreError> {
    load_doc(conn, "cases", id)
}

pub(crate) fn require_case(conn: &Connection, id: &str) -> Result<Case, StoreError> {
    load_case(conn, id)?.ok_or(StoreError::NotFound { entity: "Case" })
}

pub(crate) fn save_case(conn: &Connection, case: &Case) -> Result<(), StoreError> {
    let doc = encode(case)?;
    conn.execute(
        "UPDATE cases SET case_number = ?1, status = ?2, case_type = ?3, doc = ?4 WHERE id = ?5",
        params![
            case.case_number,
            case.status.as_str(),
            case.case_type.as_str(),
            doc,
            case.id
        ],
    )
    .map_err(map_case_conflict)?;
    Ok(())
}

fn insert_case(
    conn: &Connection,
    case: &mut Case,
    generated: bool,
    next_case_id: &mut impl FnMut() -> String,
) -> Result<(), StoreError> {
    let mut attempt = 1;
    loop {
        let doc = encode(case)?;
        let result = conn.execute(
            "INSERT INTO cases (id, case_number, case_id, status, case_type, doc)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                case.id,
                case.case_number,
                case.case_id,
                case.status.as_str(),
                case.case_type.as_str(),
                doc
            ],
        );

        match result {
            Ok(_) => return Ok(()),
            Err(err)
                if generated
                    && attempt < MAX_CASE_ID_ATTEMPTS
                    && unique_violation(&err) == Some("cases.case_id") =>
            {
                warn!(
                    "Generated case id {} collided (attempt {}), drawing another",
                    case.case_id, attempt
                );
                case.case_id = next_case_id();
                attempt += 1;
            }
            Err(err) => return Err(map_case_conflict(err)),
        }
    }
}

fn map_case_conflict(err: rusqlite::Error) -> StoreError {
    match unique_violation(&err) {
        Some("cases.case_number") => StoreError::Duplicate { field: "caseNumber" },
        Some("cases.case_id") => StoreError::Duplicate { field: "caseId" },
        _ => err.into(),
    }
}

/// Join the assigned judge and the hearings that still exist
pub(crate) fn expand_case(conn: &Connection, case: Case) -> Result<CaseView, StoreError> {
    let judge = match &case.assigned_judge {
        Some(judge_id) => judges::load_judge(conn, judge_id)?,
        None => None,
    };
    let mut hearings = Vec::with_capacity(case.hearing_dates.len());
    for hearing_id in &case.hearing_dates {
        if let Some(h) = hearings::load_hearing(conn, hearing_id)? {
            hearings.push(HearingRecord::from(h));
        }
    }
    Ok(CaseView {
        record: CaseRecord::from(case),
        judge,
        hearings,
    })
}

/// Canonical parties from either naming scheme; `parties` wins over the legacy plaintiff/defendant fields.
fn resolve_parties(
    parties: Option<PartiesInput>,
    plaintiff_name: Option<String>,
    defendant_name: Option<String>,
    current: Option<&Parties>,
) -> Result<Parties, StoreError> {
    let parties = parties.unwrap_or_default();
    let petitioner = optional_text(parties.petitioner)
        .or_else(|| optional_text(plaintiff_name))
        .or_else(|| current.map(|p| p.petitioner.clone()));
    let respondent = optional_text(parties.respondent)
        .or_else(|| optional_text(defendant_name))
        .or_else(|| current.map(|p| p.respondent.clone()));
    Ok(Parties {
        petitioner: required(petitioner, "parties.petitioner")?,
        respondent: required(respondent, "parties.respondent")?,
    })
}

fn parse_case_type(raw: &str) -> Result<CaseType, StoreError> {
    parse_enum(raw, "caseType", CaseType::parse, &CaseType::ALL.map(|t| t.as_str()))
}

fn parse_case_status(raw: &str) -> Result<CaseStatus, StoreError> {
    parse_enum(raw, "status", CaseStatus::parse, &CaseStatus::ALL.map(|s| s.as_str()))
}

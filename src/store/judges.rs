//! Judge collection

use super::{
    cases, encode, hearings, load_doc, load_docs, new_id, optional_text, parse_enum, required,
    unique_violation, Database, ReferencePolicy, StoreError,
};
use crate::models::{Availability, Case, CaseRecord, Judge, JudgeUpdate, JudgeView, NewJudge};
use chrono::Utc;
use rusqlite::{params, Connection};
use tracing::info;

impl Database {
    pub fn create_judge(&self, input: NewJudge) -> Result<JudgeView, StoreError> {
        let judge = Judge {
            id: new_id(),
            name: required(input.name, "name")?,
            email: parse_email(required(input.email, "email")?)?,
            phone: required(input.phone, "phone")?,
            court: required(input.court, "court")?,
            specialization: optional_text(input.specialization),
            experience: parse_experience(input.experience.unwrap_or(0))?,
            assigned_cases: input.assigned_cases.unwrap_or_default(),
            availability_status: match optional_text(input.availability_status) {
                Some(raw) => parse_availability(&raw)?,
                None => Availability::default(),
            },
            created_at: Utc::now(),
        };

        self.with_conn(|conn| {
            conn.execute(
                "INSERT INTO judges (id, email, availability, doc) VALUES (?1, ?2, ?3, ?4)",
                params![
                    judge.id,
                    judge.email,
                    judge.availability_status.as_str(),
                    encode(&judge)?
                ],
            )
            .map_err(map_judge_conflict)?;

            info!("⚖️  Judge created: {} <{}>", judge.name, judge.email);
            expand_judge(conn, judge)
        })
    }

    pub fn get_judge(&self, id: &str) -> Result<JudgeView, StoreError> {
        self.with_conn(|conn| expand_judge(conn, require_judge(conn, id)?))
    }

    /// All judges, newest first
    pub fn list_judges(&self) -> Result<Vec<JudgeView>, StoreError> {
        self.with_conn(|conn| {
            let judges: Vec<Judge> =
                load_docs(conn, "SELECT doc FROM judges ORDER BY rowid DESC", [])?;
            judges.into_iter().map(|j| expand_judge(conn, j)).collect()
        })
    }

    pub fn update_judge(&self, id: &str, update: JudgeUpdate) -> Result<JudgeView, StoreError> {
        self.with_conn(|conn| {
            let mut judge = require_judge(conn, id)?;

            if let Some(name) = update.name {
                judge.name = required(Some(name), "name")?;
            }
            if let Some(email) = update.email {
                judge.email = parse_email(required(Some(email), "email")?)?;
            }
            if let Some(phone) = update.phone {
                judge.phone = required(Some(phone), "phone")?;
            }
            if let Some(court) = update.court {
                judge.court = required(Some(court), "court")?;
            }
            if let Some(specialization) = update.specialization {
                judge.specialization = optional_text(specialization);
            }
            if let Some(experience) = update.experience {
                judge.experience = parse_experience(experience)?;
            }
            if let Some(raw) = update.availability_status {
                judge.availability_status = parse_availability(&raw)?;
            }
            if let Some(assigned) = update.assigned_cases {
                judge.assigned_cases = assigned;
            }

            save_judge(conn, &judge)?;
            info!("📝 Judge updated: {} ({})", judge.name, judge.id);
            expand_judge(conn, judge)
        })
    }

    pub fn delete_judge(&self, id: &str) -> Result<(), StoreError> {
        let policy = self.policy;
        self.with_tx(|conn| {
            let removed = conn.execute("DELETE FROM judges WHERE id = ?1", params![id])?;
            if removed == 0 {
                return Err(StoreError::NotFound { entity: "Judge" });
            }

            if policy == ReferencePolicy::Cleanup {
                let purged = hearings::purge_hearings(conn, "judge_ref", id)?;
                let mut unassigned = 0;
                let all: Vec<Case> = load_docs(conn, "SELECT doc FROM cases", [])?;
                for mut case in all {
                    if case.assigned_judge.as_deref() == Some(id) {
                        case.assigned_judge = None;
                        cases::save_case(conn, &case)?;
                        unassigned += 1;
                    }
                }
                info!(
                    "🧹 Judge {} cleanup: {} hearings removed, {} cases unassigned",
                    id, purged, unassigned
                );
            }

            info!("🗑️  Judge deleted: {}", id);
            Ok(())
        })
    }
}

pub(crate) fn load_judge(conn: &Connection, id: &str) -> Result<Option<Judge>, StoreError> {
    load_doc(conn, "judges", id)
}

pub(crate) fn require_judge(conn: &Connection, id: &str) -> Result<Judge, StoreError> {
    load_judge(conn, id)?.ok_or(StoreError::NotFound { entity: "Judge" })
}

fn save_judge(conn: &Connection, judge: &Judge) -> Result<(), StoreError> {
    conn.execute(
        "UPDATE judges SET email = ?1, availability = ?2, doc = ?3 WHERE id = ?4",
        params![
            judge.email,
            judge.availability_status.as_str(),
            encode(judge)?,
            judge.id
        ],
    )
    .map_err(map_judge_conflict)?;
    Ok(())
}

/// Append `case_id` to the judge's assigned cases unless it is already listed
pub(crate) fn attach_case(conn: &Connection, judge_id: &str, case_id: &str) -> Result<(), StoreError> {
    let mut judge = require_judge(conn, judge_id)?;
    if !judge.assigned_cases.iter().any(|c| c == case_id) {
        judge.assigned_cases.push(case_id.to_string());
        save_judge(conn, &judge)?;
    }
    Ok(())
}

/// Remove `case_id` from every judge that lists it; returns how many judges changed
pub(crate) fn detach_case_everywhere(conn: &Connection, case_id: &str) -> Result<usize, StoreError> {
    let judges: Vec<Judge> = load_docs(conn, "SELECT doc FROM judges", [])?;
    let mut changed = 0;
    for mut judge in judges {
        let before = judge.assigned_cases.len();
        judge.assigned_cases.retain(|c| c != case_id);
        if judge.assigned_cases.len() != before {
            save_judge(conn, &judge)?;
            changed += 1;
        }
    }
    Ok(changed)
}

pub(crate) fn expand_judge(conn: &Connection, judge: Judge) -> Result<JudgeView, StoreError> {
    let mut assigned = Vec::with_capacity(judge.assigned_cases.len());
    for case_id in &judge.assigned_cases {
        if let Some(case) = cases::load_case(conn, case_id)? {
            assigned.push(CaseRecord::from(case));
        }
    }
    Ok(JudgeView {
        judge,
        cases: assigned,
    })
}

fn map_judge_conflict(err: rusqlite::Error) -> StoreError {
    match unique_violation(&err) {
        Some("judges.email") => StoreError::Duplicate { field: "email" },
        _ => err.into(),
    }
}

fn parse_email(email: String) -> Result<String, StoreError> {
    match email.split_once('@') {
        Some((local, domain)) if !local.is_empty() && domain.contains('.') => {
            Ok(email.to_lowercase())
        }
        _ => Err(StoreError::validation("email must be a valid email address")),
    }
}

fn parse_experience(years: i64) -> Result<u32, StoreError> {
    u32::try_from(years)
        .map_err(|_| StoreError::validation("experience must be a non-negative number of years"))
}

fn parse_availability(raw: &str) -> Result<Availability, StoreError> {
    parse_enum(
        raw,
        "availabilityStatus",
        Availability::parse,
        &Availability::ALL.map(|a| a.as_str()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_judge(name: &str, email: &str) -> NewJudge {
        NewJudge {
            name: Some(name.to_string()),
            email: Some(email.to_string()),
            phone: Some("555-0100".to_string()),
            court: Some("High Court".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_judge_defaults() {
        let db = Database::in_memory(ReferencePolicy::Retain).unwrap();
        let view = db.create_judge(new_judge("Anna Kay", "Anna@Court.test")).unwrap();
        assert_eq!(view.judge.experience, 0);
        assert_eq!(view.judge.availability_status, Availability::Available);
        assert_eq!(view.judge.email, "anna@court.test");
        assert!(view.cases.is_empty());
    }

    #[test]
    fn test_duplicate_judge_email_rejected() {
        let db = Database::in_memory(ReferencePolicy::Retain).unwrap();
        db.create_judge(new_judge("A", "same@court.test")).unwrap();
        let err = db.create_judge(new_judge("B", "same@court.test")).unwrap_err();
        assert!(matches!(err, StoreError::Duplicate { field: "email" }));
    }

    #[test]
    fn test_negative_experience_rejected() {
        let db = Database::in_memory(ReferencePolicy::Retain).unwrap();
        let mut input = new_judge("A", "a@court.test");
        input.experience = Some(-3);
        assert!(matches!(db.create_judge(input), Err(StoreError::Validation(_))));
    }

    #[test]
    fn test_update_judge_is_partial() {
        let db = Database::in_memory(ReferencePolicy::Retain).unwrap();
        let created = db.create_judge(new_judge("A", "a@court.test")).unwrap();
        let update = JudgeUpdate {
            availability_status: Some("on-leave".to_string()),
            experience: Some(12),
            ..Default::default()
        };
        let updated = db.update_judge(&created.judge.id, update).unwrap();
        assert_eq!(updated.judge.availability_status, Availability::OnLeave);
        assert_eq!(updated.judge.experience, 12);
        assert_eq!(updated.judge.phone, "555-0100");
        assert_eq!(updated.judge.created_at, created.judge.created_at);
    }

    #[test]
    fn test_update_unknown_judge_not_found() {
        let db = Database::in_memory(ReferencePolicy::Retain).unwrap();
        let err = db.update_judge("ghost", JudgeUpdate::default()).unwrap_err();
        assert!(matches!(err, StoreError::NotFound { entity: "Judge" }));
    }
}

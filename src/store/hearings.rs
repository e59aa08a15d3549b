//! Hearing collection
//!
//! Creating a hearing appends its id to the owning case's `hearingDates`.
//! Listings by judge or case are ordered by hearing date, earliest first.

use super::{
    cases, encode, judges, load_doc, load_docs, new_id, optional_text, parse_date_field,
    parse_enum, required, Database, ReferencePolicy, StoreError,
};
use crate::models::{
    CaseRecord, Hearing, HearingRecord, HearingStatus, HearingUpdate, HearingView, NewHearing,
};
use chrono::{DateTime, Utc};
use rusqlite::{params, Connection};
use tracing::info;

impl Database {
    pub fn create_hearing(&self, input: NewHearing) -> Result<HearingView, StoreError> {
        let case_id = required(input.case_id, "caseId")?;
        let judge_id = required(input.judge_id, "judgeId")?;
        let raw_date = optional_text(input.hearing_date)
            .or_else(|| optional_text(input.date))
            .ok_or_else(|| StoreError::validation("hearingDate is required"))?;
        let hearing_date = parse_date_field(&raw_date, "hearingDate")?;
        let courtroom = required(input.courtroom, "courtroom")?;
        let status = match optional_text(input.status) {
            Some(raw) => parse_hearing_status(&raw)?,
            None => HearingStatus::default(),
        };

        self.with_conn(|conn| {
            let mut case = cases::require_case(conn, &case_id)?;
            judges::require_judge(conn, &judge_id)?;

            let hearing = Hearing {
                id: new_id(),
                case_id,
                judge_id,
                hearing_date,
                hearing_time: optional_text(input.hearing_time),
                courtroom,
                purpose: optional_text(input.purpose),
                status,
                notes: optional_text(input.notes),
                created_at: Utc::now(),
            };

            conn.execute(
                "INSERT INTO hearings (id, case_ref, judge_ref, hearing_ts, doc)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    hearing.id,
                    hearing.case_id,
                    hearing.judge_id,
                    hearing.hearing_date.timestamp_millis(),
                    encode(&hearing)?
                ],
            )?;

            case.hearing_dates.push(hearing.id.clone());
            cases::save_case(conn, &case)?;

            info!(
                "📅 Hearing scheduled: case {} in {} at {}",
                case.case_number,
                hearing.courtroom,
                hearing.hearing_date.to_rfc3339()
            );
            expand_hearing(conn, hearing)
        })
    }

    pub fn get_hearing(&self, id: &str) -> Result<HearingView, StoreError> {
        self.with_conn(|conn| expand_hearing(conn, require_hearing(conn, id)?))
    }

    /// All hearings, newest first
    pub fn list_hearings(&self) -> Result<Vec<HearingView>, StoreError> {
        self.with_conn(|conn| {
            let all: Vec<Hearing> =
                load_docs(conn, "SELECT doc FROM hearings ORDER BY rowid DESC", [])?;
            all.into_iter().map(|h| expand_hearing(conn, h)).collect()
        })
    }

    pub fn hearings_for_judge(&self, judge_id: &str) -> Result<Vec<HearingView>, StoreError> {
        self.hearings_by("judge_ref", judge_id)
    }

    pub fn hearings_for_case(&self, case_id: &str) -> Result<Vec<HearingView>, StoreError> {
        self.hearings_by("case_ref", case_id)
    }

    fn hearings_by(&self, column: &str, id: &str) -> Result<Vec<HearingView>, StoreError> {
        let sql = format!("SELECT doc FROM hearings WHERE {column} = ?1 ORDER BY hearing_ts, rowid");
        self.with_conn(|conn| {
            let found: Vec<Hearing> = load_docs(conn, &sql, params![id])?;
            found.into_iter().map(|h| expand_hearing(conn, h)).collect()
        })
    }

    /// Every field is parsed and every reference resolved before anything is
    /// written; the case move and the hearing row commit together.
    pub fn update_hearing(
        &self,
        id: &str,
        update: HearingUpdate,
    ) -> Result<HearingView, StoreError> {
        let case_id = update
            .case_id
            .map(|v| required(Some(v), "caseId"))
            .transpose()?;
        let judge_id = update
            .judge_id
            .map(|v| required(Some(v), "judgeId"))
            .transpose()?;
        let hearing_date = optional_text(update.hearing_date)
            .or(optional_text(update.date))
            .map(|raw| parse_date_field(&raw, "hearingDate"))
            .transpose()?;
        let courtroom = update
            .courtroom
            .map(|v| required(Some(v), "courtroom"))
            .transpose()?;
        let status = update
            .status
            .map(|raw| parse_hearing_status(&raw))
            .transpose()?;

        self.with_tx(|conn| {
            let mut hearing = require_hearing(conn, id)?;

            let moved_to = match case_id {
                Some(case_id) if case_id != hearing.case_id => {
                    Some(cases::require_case(conn, &case_id)?)
                }
                _ => None,
            };
            if let Some(judge_id) = judge_id {
                judges::require_judge(conn, &judge_id)?;
                hearing.judge_id = judge_id;
            }
            if let Some(date) = hearing_date {
                hearing.hearing_date = date;
            }
            if let Some(time) = update.hearing_time {
                hearing.hearing_time = optional_text(time);
            }
            if let Some(courtroom) = courtroom {
                hearing.courtroom = courtroom;
            }
            if let Some(purpose) = update.purpose {
                hearing.purpose = optional_text(purpose);
            }
            if let Some(status) = status {
                hearing.status = status;
            }
            if let Some(notes) = update.notes {
                hearing.notes = optional_text(notes);
            }

            if let Some(mut new_case) = moved_to {
                scrub_from_case(conn, &hearing.case_id, &hearing.id)?;
                if !new_case.hearing_dates.contains(&hearing.id) {
                    new_case.hearing_dates.push(hearing.id.clone());
                    cases::save_case(conn, &new_case)?;
                }
                hearing.case_id = new_case.id;
            }

            conn.execute(
                "UPDATE hearings SET case_ref = ?1, judge_ref = ?2, hearing_ts = ?3, doc = ?4
                 WHERE id = ?5",
                params![
                    hearing.case_id,
                    hearing.judge_id,
                    hearing.hearing_date.timestamp_millis(),
                    encode(&hearing)?,
                    hearing.id
                ],
            )?;

            info!("📝 Hearing updated: {} ({})", hearing.id, hearing.status.as_str());
            expand_hearing(conn, hearing)
        })
    }

    pub fn delete_hearing(&self, id: &str) -> Result<(), StoreError> {
        let policy = self.policy;
        self.with_tx(|conn| {
            let hearing = require_hearing(conn, id)?;
            conn.execute("DELETE FROM hearings WHERE id = ?1", params![id])?;

            if policy == ReferencePolicy::Cleanup {
                scrub_from_case(conn, &hearing.case_id, &hearing.id)?;
            }

            info!("🗑️  Hearing deleted: {}", id);
            Ok(())
        })
    }
}

/// Hearings dated strictly after `now`
pub(crate) fn count_upcoming(conn: &Connection, now: DateTime<Utc>) -> Result<u64, StoreError> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM hearings WHERE hearing_ts > ?1",
        params![now.timestamp_millis()],
        |row| row.get(0),
    )?;
    Ok(n as u64)
}

pub(crate) fn load_hearing(conn: &Connection, id: &str) -> Result<Option<Hearing>, StoreError> {
    load_doc(conn, "hearings", id)
}

fn require_hearing(conn: &Connection, id: &str) -> Result<Hearing, StoreError> {
    load_hearing(conn, id)?.ok_or(StoreError::NotFound { entity: "Hearing" })
}

fn scrub_from_case(conn: &Connection, case_id: &str, hearing_id: &str) -> Result<(), StoreError> {
    if let Some(mut case) = cases::load_case(conn, case_id)? {
        let before = case.hearing_dates.len();
        case.hearing_dates.retain(|h| h != hearing_id);
        if case.hearing_dates.len() != before {
            cases::save_case(conn, &case)?;
        }
    }
    Ok(())
}

/// Delete every hearing whose `column` (`case_ref` or `judge_ref`) equals `id`,
/// scrubbing each from its case. Returns the number removed.
pub(crate) fn purge_hearings(conn: &Connection, column: &str, id: &str) -> Result<usize, StoreError> {
    let sql = format!("SELECT doc FROM hearings WHERE {column} = ?1");
    let doomed: Vec<Hearing> = load_docs(conn, &sql, params![id])?;
    for hearing in &doomed {
        conn.execute("DELETE FROM hearings WHERE id = ?1", params![hearing.id])?;
        scrub_from_case(conn, &hearing.case_id, &hearing.id)?;
    }
    Ok(doomed.len())
}

pub(crate) fn expand_hearing(conn: &Connection, hearing: Hearing) -> Result<HearingView, StoreError> {
    let case = cases::load_case(conn, &hearing.case_id)?.map(CaseRecord::from);
    let judge = judges::load_judge(conn, &hearing.judge_id)?;
    Ok(HearingView {
        record: HearingRecord::from(hearing),
        case,
        judge,
    })
}

fn parse_hearing_status(raw: &str) -> Result<HearingStatus, StoreError> {
    parse_enum(
        raw,
        "status",
        HearingStatus::parse,
        &HearingStatus::ALL.map(|s| s.as_str()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::{NewCase, NewJudge, PartiesInput};

    struct Fixture {
        db: Database,
        case_id: String,
        judge_id: String,
    }

    fn fixture(policy: ReferencePolicy) -> Fixture {
        let db = Database::in_memory(policy).unwrap();
        let case = db
            .create_case(NewCase {
                case_number: Some("C-1".to_string()),
                title: Some("Smith v. Jones".to_string()),
                case_type: Some("Civil".to_string()),
                parties: Some(PartiesInput {
                    petitioner: Some("Smith".to_string()),
                    respondent: Some("Jones".to_string()),
                }),
                ..Default::default()
            })
            .unwrap();
        let judge = db
            .create_judge(NewJudge {
                name: Some("Anna Kay".to_string()),
                email: Some("anna@court.test".to_string()),
                phone: Some("555-0100".to_string()),
                court: Some("High Court".to_string()),
                ..Default::default()
            })
            .unwrap();
        Fixture {
            db,
            case_id: case.record.case.id,
            judge_id: judge.judge.id,
        }
    }

    fn new_hearing(f: &Fixture, date: &str) -> NewHearing {
        NewHearing {
            case_id: Some(f.case_id.clone()),
            judge_id: Some(f.judge_id.clone()),
            hearing_date: Some(date.to_string()),
            courtroom: Some("4B".to_string()),
            ..Default::default()
        }
    }

    #[test]
    fn test_create_hearing_links_case() {
        let f = fixture(ReferencePolicy::Retain);
        let view = f.db.create_hearing(new_hearing(&f, "2031-05-01")).unwrap();

        assert_eq!(view.record.hearing.status, HearingStatus::Scheduled);
        assert_eq!(view.case.as_ref().unwrap().case.case_number, "C-1");
        assert_eq!(view.judge.as_ref().unwrap().name, "Anna Kay");

        let case = f.db.get_case(&f.case_id).unwrap();
        assert_eq!(case.record.case.hearing_dates, vec![view.record.hearing.id.clone()]);
        assert_eq!(case.hearings.len(), 1);
    }

    #[test]
    fn test_date_alias_accepted() {
        let f = fixture(ReferencePolicy::Retain);
        let mut input = new_hearing(&f, "");
        input.hearing_date = None;
        input.date = Some("2031-06-01T09:30:00Z".to_string());
        let view = f.db.create_hearing(input).unwrap();
        assert_eq!(view.record.date.to_rfc3339(), "2031-06-01T09:30:00+00:00");
    }

    #[test]
    fn test_missing_references_are_not_found() {
        let f = fixture(ReferencePolicy::Retain);
        let mut no_case = new_hearing(&f, "2031-05-01");
        no_case.case_id = Some("ghost".to_string());
        assert!(matches!(
            f.db.create_hearing(no_case),
            Err(StoreError::NotFound { entity: "Case" })
        ));

        let mut no_judge = new_hearing(&f, "2031-05-01");
        no_judge.judge_id = Some("ghost".to_string());
        assert!(matches!(
            f.db.create_hearing(no_judge),
            Err(StoreError::NotFound { entity: "Judge" })
        ));
        assert!(f.db.list_hearings().unwrap().is_empty());
    }

    #[test]
    fn test_hearings_for_judge_sorted_by_date() {
        let f = fixture(ReferencePolicy::Retain);
        f.db.create_hearing(new_hearing(&f, "2031-07-01")).unwrap();
        f.db.create_hearing(new_hearing(&f, "2031-05-01")).unwrap();

        let dates: Vec<_> = f
            .db
            .hearings_for_judge(&f.judge_id)
            .unwrap()
            .into_iter()
            .map(|h| h.record.hearing.hearing_date.date_naive().to_string())
            .collect();
        assert_eq!(dates, vec!["2031-05-01", "2031-07-01"]);
        assert!(f.db.hearings_for_case("other").unwrap().is_empty());
    }

    #[test]
    fn test_retained_judge_delete_leaves_dangling_hearing() {
        let f = fixture(ReferencePolicy::Retain);
        let h = f.db.create_hearing(new_hearing(&f, "2031-05-01")).unwrap();
        f.db.delete_judge(&f.judge_id).unwrap();

        let view = f.db.get_hearing(&h.record.hearing.id).unwrap();
        assert!(view.judge.is_none());
        assert_eq!(view.record.hearing.judge_id, f.judge_id);
    }

    #[test]
    fn test_cleanup_case_delete_purges_hearings() {
        let f = fixture(ReferencePolicy::Cleanup);
        f.db.create_hearing(new_hearing(&f, "2031-05-01")).unwrap();
        f.db.delete_case(&f.case_id).unwrap();
        assert!(f.db.list_hearings().unwrap().is_empty());
    }

    #[test]
    fn test_cleanup_hearing_delete_scrubs_case() {
        let f = fixture(ReferencePolicy::Cleanup);
        let h = f.db.create_hearing(new_hearing(&f, "2031-05-01")).unwrap();
        f.db.delete_hearing(&h.record.hearing.id).unwrap();
        let case = f.db.get_case(&f.case_id).unwrap();
        assert!(case.record.case.hearing_dates.is_empty());
    }

    #[test]
    fn test_update_hearing_status_and_notes() {
        let f = fixture(ReferencePolicy::Retain);
        let h = f.db.create_hearing(new_hearing(&f, "2031-05-01")).unwrap();
        let update = HearingUpdate {
            status: Some("Postponed".to_string()),
            notes: Some(Some("Counsel unavailable".to_string())),
            ..Default::default()
        };
        let view = f.db.update_hearing(&h.record.hearing.id, update).unwrap();
        assert_eq!(view.record.hearing.status, HearingStatus::Postponed);
        assert_eq!(view.record.hearing.notes.as_deref(), Some("Counsel unavailable"));
        assert_eq!(view.record.hearing.courtroom, "4B");
    }

    #[test]
    fn test_delete_missing_hearing_is_not_found() {
        let f = fixture(ReferencePolicy::Retain);
        assert!(matches!(
            f.db.delete_hearing("nope"),
            Err(StoreError::NotFound { entity: "Hearing" })
        ));
    }

    fn second_case(db: &Database) -> String {
        db.create_case(NewCase {
            case_number: Some("C-2".to_string()),
            title: Some("Brown v. Green".to_string()),
            case_type: Some("Family".to_string()),
            parties: Some(PartiesInput {
                petitioner: Some("Brown".to_string()),
                respondent: Some("Green".to_string()),
            }),
            ..Default::default()
        })
        .unwrap()
        .record
        .case
        .id
    }

    #[test]
    fn test_move_hearing_between_cases() {
        let f = fixture(ReferencePolicy::Retain);
        let other = second_case(&f.db);
        let h = f.db.create_hearing(new_hearing(&f, "2031-05-01")).unwrap();
        let hearing_id = h.record.hearing.id;

        let update = HearingUpdate {
            case_id: Some(other.clone()),
            ..Default::default()
        };
        let view = f.db.update_hearing(&hearing_id, update).unwrap();
        assert_eq!(view.record.hearing.case_id, other);
        assert_eq!(view.case.unwrap().case.case_number, "C-2");

        let old = f.db.get_case(&f.case_id).unwrap();
        assert!(old.record.case.hearing_dates.is_empty());
        let new = f.db.get_case(&other).unwrap();
        assert_eq!(new.record.case.hearing_dates, vec![hearing_id.clone()]);
        assert_eq!(f.db.hearings_for_case(&other).unwrap().len(), 1);
        assert!(f.db.hearings_for_case(&f.case_id).unwrap().is_empty());
    }

    #[test]
    fn test_failed_move_leaves_both_cases_untouched() {
        let f = fixture(ReferencePolicy::Retain);
        let other = second_case(&f.db);
        let h = f.db.create_hearing(new_hearing(&f, "2031-05-01")).unwrap();
        let hearing_id = h.record.hearing.id;

        let bad_date = HearingUpdate {
            case_id: Some(other.clone()),
            hearing_date: Some("garbage".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            f.db.update_hearing(&hearing_id, bad_date),
            Err(StoreError::Validation(_))
        ));

        let ghost_judge = HearingUpdate {
            case_id: Some(other.clone()),
            judge_id: Some("ghost".to_string()),
            ..Default::default()
        };
        assert!(matches!(
            f.db.update_hearing(&hearing_id, ghost_judge),
            Err(StoreError::NotFound { entity: "Judge" })
        ));

        let hearing = f.db.get_hearing(&hearing_id).unwrap();
        assert_eq!(hearing.record.hearing.case_id, f.case_id);
        assert_eq!(hearing.record.hearing.judge_id, f.judge_id);
        let old = f.db.get_case(&f.case_id).unwrap();
        assert_eq!(old.record.case.hearing_dates, vec![hearing_id]);
        let new = f.db.get_case(&other).unwrap();
        assert!(new.record.case.hearing_dates.is_empty());
    }

    #[test]
    fn test_cleanup_judge_delete_purges_hearings_and_assignments() {
        let f = fixture(ReferencePolicy::Cleanup);
        f.db.update_case(
            &f.case_id,
            crate::models::CaseUpdate {
                assigned_judge: Some(Some(f.judge_id.clone())),
                ..Default::default()
            },
        )
        .unwrap();
        f.db.create_hearing(new_hearing(&f, "2031-05-01")).unwrap();

        f.db.delete_judge(&f.judge_id).unwrap();

        assert!(f.db.list_hearings().unwrap().is_empty());
        let case = f.db.get_case(&f.case_id).unwrap();
        assert!(case.record.case.assigned_judge.is_none());
        assert!(case.judge.is_none());
        assert!(case.record.case.hearing_dates.is_empty());
    }
}

//! Live aggregate counts
//!
//! Nothing is cached; every call counts the current rows while holding the
//! store connection, so all numbers in one response come from the same state.

use super::{hearings, Database, StoreError};
use crate::models::{Availability, CaseStatus, CaseType};
use chrono::{DateTime, Utc};
use rusqlite::Connection;
use serde::Serialize;
use std::collections::HashMap;

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct TypeCount {
    #[serde(rename = "type")]
    pub case_type: String,
    pub count: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CaseStats {
    pub total_cases: u64,
    pub pending_cases: u64,
    pub ongoing_cases: u64,
    pub closed_cases: u64,
    pub cases_by_type: Vec<TypeCount>,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct JudgeStats {
    pub total_judges: u64,
    pub available_judges: u64,
    pub busy_judges: u64,
    pub on_leave_judges: u64,
}

#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct HearingStats {
    pub total_hearings: u64,
    pub upcoming_hearings: u64,
}

/// Everything the admin dashboard shows, from one snapshot
#[derive(Debug, Clone, Serialize, PartialEq, Eq)]
pub struct DashboardStats {
    pub cases: CaseStats,
    pub judges: JudgeStats,
    pub hearings: HearingStats,
}

impl Database {
    pub fn case_stats(&self) -> Result<CaseStats, StoreError> {
        self.with_conn(case_stats)
    }

    pub fn judge_stats(&self) -> Result<JudgeStats, StoreError> {
        self.with_conn(judge_stats)
    }

    pub fn hearing_stats(&self) -> Result<HearingStats, StoreError> {
        self.hearing_stats_at(Utc::now())
    }

    pub fn hearing_stats_at(&self, now: DateTime<Utc>) -> Result<HearingStats, StoreError> {
        self.with_conn(|conn| hearing_stats(conn, now))
    }

    pub fn dashboard_stats(&self) -> Result<DashboardStats, StoreError> {
        let now = Utc::now();
        self.with_conn(|conn| {
            Ok(DashboardStats {
                cases: case_stats(conn)?,
                judges: judge_stats(conn)?,
                hearings: hearing_stats(conn, now)?,
            })
        })
    }
}

fn grouped(conn: &Connection, sql: &str) -> Result<HashMap<String, u64>, StoreError> {
    let mut stmt = conn.prepare(sql)?;
    let rows = stmt
        .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, i64>(1)?)))?
        .collect::<Result<Vec<_>, _>>()?;
    Ok(rows.into_iter().map(|(k, n)| (k, n as u64)).collect())
}

fn case_stats(conn: &Connection) -> Result<CaseStats, StoreError> {
    let by_status = grouped(conn, "SELECT status, COUNT(*) FROM cases GROUP BY status")?;
    let by_type = grouped(conn, "SELECT case_type, COUNT(*) FROM cases GROUP BY case_type")?;
    let status = |s: CaseStatus| by_status.get(s.as_str()).copied().unwrap_or(0);

    // Only types that actually occur, in enum order
    let cases_by_type = CaseType::ALL
        .iter()
        .filter_map(|t| {
            by_type.get(t.as_str()).map(|&count| TypeCount {
                case_type: t.as_str().to_string(),
                count,
            })
        })
        .collect();

    Ok(CaseStats {
        total_cases: by_status.values().sum(),
        pending_cases: status(CaseStatus::Pending),
        ongoing_cases: status(CaseStatus::Ongoing),
        closed_cases: status(CaseStatus::Closed),
        cases_by_type,
    })
}

fn judge_stats(conn: &Connection) -> Result<JudgeStats, StoreError> {
    let by_availability =
        grouped(conn, "SELECT availability, COUNT(*) FROM judges GROUP BY availability")?;
    let count = |a: Availability| by_availability.get(a.as_str()).copied().unwrap_or(0);

    Ok(JudgeStats {
        total_judges: by_availability.values().sum(),
        available_judges: count(Availability::Available),
        busy_judges: count(Availability::Busy),
        on_leave_judges: count(Availability::OnLeave),
    })
}

fn hearing_stats(conn: &Connection, now: DateTime<Utc>) -> Result<HearingStats, StoreError> {
    let total: i64 = conn.query_row("SELECT COUNT(*) FROM hearings", [], |row| row.get(0))?;
    Ok(HearingStats {
        total_hearings: total as u64,
        upcoming_hearings: hearings::count_upcoming(conn, now)?,
    })
}

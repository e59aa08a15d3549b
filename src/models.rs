//! Court Records Models
//! Mission: Define case, judge and hearing documents plus their read views

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Deserializer, Serialize};

/// Case categories accepted by the registry
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CaseType {
    Civil,
    Criminal,
    Family,
    Corporate,
}

impl CaseType {
    pub const ALL: [CaseType; 4] = [
        CaseType::Civil,
        CaseType::Criminal,
        CaseType::Family,
        CaseType::Corporate,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseType::Civil => "Civil",
            CaseType::Criminal => "Criminal",
            CaseType::Family => "Family",
            CaseType::Corporate => "Corporate",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Case lifecycle status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum CaseStatus {
    #[default]
    Pending,
    Ongoing,
    Closed,
}

impl CaseStatus {
    pub const ALL: [CaseStatus; 3] = [CaseStatus::Pending, CaseStatus::Ongoing, CaseStatus::Closed];

    pub fn as_str(&self) -> &'static str {
        match self {
            CaseStatus::Pending => "Pending",
            CaseStatus::Ongoing => "Ongoing",
            CaseStatus::Closed => "Closed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Judge availability
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Availability {
    #[default]
    #[serde(rename = "available")]
    Available,
    #[serde(rename = "busy")]
    Busy,
    #[serde(rename = "on-leave")]
    OnLeave,
}

impl Availability {
    pub const ALL: [Availability; 3] = [
        Availability::Available,
        Availability::Busy,
        Availability::OnLeave,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Availability::Available => "available",
            Availability::Busy => "busy",
            Availability::OnLeave => "on-leave",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Hearing outcome status
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum HearingStatus {
    #[default]
    Scheduled,
    Completed,
    Postponed,
}

impl HearingStatus {
    pub const ALL: [HearingStatus; 3] = [
        HearingStatus::Scheduled,
        HearingStatus::Completed,
        HearingStatus::Postponed,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            HearingStatus::Scheduled => "Scheduled",
            HearingStatus::Completed => "Completed",
            HearingStatus::Postponed => "Postponed",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|t| t.as_str() == s)
    }
}

/// Opposing sides of a case. Plaintiff/defendant are the same people under older field names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Parties {
    pub petitioner: String,
    pub respondent: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct HistoryEntry {
    pub date: DateTime<Utc>,
    pub description: String,
}

/// Stored case document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Case {
    pub id: String,
    pub case_number: String,
    pub case_id: String,
    pub title: String,
    pub case_type: CaseType,
    pub filing_date: DateTime<Utc>,
    pub status: CaseStatus,
    pub parties: Parties,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub assigned_judge: Option<String>,
    #[serde(default)]
    pub hearing_dates: Vec<String>,
    #[serde(default)]
    pub history: Vec<HistoryEntry>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Stored judge document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Judge {
    pub id: String,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub court: String,
    #[serde(default)]
    pub specialization: Option<String>,
    #[serde(default)]
    pub experience: u32,
    #[serde(default)]
    pub assigned_cases: Vec<String>,
    #[serde(default)]
    pub availability_status: Availability,
    pub created_at: DateTime<Utc>,
}

/// Stored hearing document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Hearing {
    pub id: String,
    pub case_id: String,
    pub judge_id: String,
    pub hearing_date: DateTime<Utc>,
    #[serde(default)]
    pub hearing_time: Option<String>,
    pub courtroom: String,
    #[serde(default)]
    pub purpose: Option<String>,
    #[serde(default)]
    pub status: HearingStatus,
    #[serde(default)]
    pub notes: Option<String>,
    pub created_at: DateTime<Utc>,
}

// ===== Read views =====

/// Case as returned to callers, with the legacy plaintiff/defendant names mirrored from `parties`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseRecord {
    #[serde(flatten)]
    pub case: Case,
    pub plaintiff_name: String,
    pub defendant_name: String,
}

impl From<Case> for CaseRecord {
    fn from(case: Case) -> Self {
        Self {
            plaintiff_name: case.parties.petitioner.clone(),
            defendant_name: case.parties.respondent.clone(),
            case,
        }
    }
}

/// Hearing as returned to callers; `date` always equals `hearingDate`
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingRecord {
    #[serde(flatten)]
    pub hearing: Hearing,
    pub date: DateTime<Utc>,
}

impl From<Hearing> for HearingRecord {
    fn from(hearing: Hearing) -> Self {
        Self {
            date: hearing.hearing_date,
            hearing,
        }
    }
}

/// Case with its judge and hearings joined at read time
#[derive(Debug, Clone, Serialize)]
pub struct CaseView {
    #[serde(flatten)]
    pub record: CaseRecord,
    pub judge: Option<Judge>,
    pub hearings: Vec<HearingRecord>,
}

/// Judge with its assigned cases joined at read time
#[derive(Debug, Clone, Serialize)]
pub struct JudgeView {
    #[serde(flatten)]
    pub judge: Judge,
    pub cases: Vec<CaseRecord>,
}

/// Hearing with its case and judge joined at read time
#[derive(Debug, Clone, Serialize)]
pub struct HearingView {
    #[serde(flatten)]
    pub record: HearingRecord,
    pub case: Option<CaseRecord>,
    pub judge: Option<Judge>,
}

// ===== Write payloads =====

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PartiesInput {
    pub petitioner: Option<String>,
    pub respondent: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct HistoryInput {
    pub date: Option<String>,
    pub description: String,
}

/// Case creation payload. Enum fields arrive as text so bad values surface as validation errors.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCase {
    pub case_number: Option<String>,
    pub case_id: Option<String>,
    pub title: Option<String>,
    pub case_type: Option<String>,
    pub filing_date: Option<String>,
    pub status: Option<String>,
    pub parties: Option<PartiesInput>,
    pub plaintiff_name: Option<String>,
    pub defendant_name: Option<String>,
    pub description: Option<String>,
    pub assigned_judge: Option<String>,
}

/// Partial case update. `Some(None)` clears a nullable field, `None` leaves it alone.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaseUpdate {
    pub case_number: Option<String>,
    pub case_id: Option<String>,
    pub title: Option<String>,
    pub case_type: Option<String>,
    pub filing_date: Option<String>,
    pub status: Option<String>,
    pub parties: Option<PartiesInput>,
    pub plaintiff_name: Option<String>,
    pub defendant_name: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub description: Option<Option<String>>,
    #[serde(default, deserialize_with = "double_option")]
    pub assigned_judge: Option<Option<String>>,
    pub history: Option<Vec<HistoryInput>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewJudge {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub court: Option<String>,
    pub specialization: Option<String>,
    pub experience: Option<i64>,
    pub availability_status: Option<String>,
    pub assigned_cases: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JudgeUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub court: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub specialization: Option<Option<String>>,
    pub experience: Option<i64>,
    pub availability_status: Option<String>,
    pub assigned_cases: Option<Vec<String>>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewHearing {
    pub case_id: Option<String>,
    pub judge_id: Option<String>,
    pub hearing_date: Option<String>,
    pub date: Option<String>,
    pub hearing_time: Option<String>,
    pub courtroom: Option<String>,
    pub purpose: Option<String>,
    pub status: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HearingUpdate {
    pub case_id: Option<String>,
    pub judge_id: Option<String>,
    pub hearing_date: Option<String>,
    pub date: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub hearing_time: Option<Option<String>>,
    pub courtroom: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub purpose: Option<Option<String>>,
    pub status: Option<String>,
    #[serde(default, deserialize_with = "double_option")]
    pub notes: Option<Option<String>>,
}

fn double_option<'de, D, T>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}

/// Parse a calendar value sent by the admin UI: RFC 3339 timestamps or bare `YYYY-MM-DD` dates (midnight UTC).
pub fn parse_date(raw: &str) -> Option<DateTime<Utc>> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Some(ts.with_timezone(&Utc));
    }
    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|dt| dt.and_utc())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_case() -> Case {
        let now = Utc::now();
        Case {
            id: "c1".to_string(),
            case_number: "C-1".to_string(),
            case_id: "ECF-1-123456".to_string(),
            title: "Smith v. Jones".to_string(),
            case_type: CaseType::Civil,
            filing_date: now,
            status: CaseStatus::Pending,
            parties: Parties {
                petitioner: "Smith".to_string(),
                respondent: "Jones".to_string(),
            },
            description: None,
            assigned_judge: None,
            hearing_dates: vec![],
            history: vec![],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn test_enum_wire_names() {
        assert_eq!(
            serde_json::to_string(&Availability::OnLeave).unwrap(),
            r#""on-leave""#
        );
        assert_eq!(Availability::parse("busy"), Some(Availability::Busy));
        assert_eq!(CaseType::parse("Corporate"), Some(CaseType::Corporate));
        assert_eq!(CaseType::parse("civil"), None);
        assert_eq!(CaseStatus::default(), CaseStatus::Pending);
        assert_eq!(HearingStatus::default(), HearingStatus::Scheduled);
    }

    #[test]
    fn test_case_record_mirrors_parties() {
        let json = serde_json::to_value(CaseRecord::from(sample_case())).unwrap();
        assert_eq!(json["plaintiffName"], "Smith");
        assert_eq!(json["defendantName"], "Jones");
        assert_eq!(json["parties"]["petitioner"], "Smith");
        assert_eq!(json["caseNumber"], "C-1");
    }

    #[test]
    fn test_hearing_record_emits_date_alias() {
        let when = parse_date("2031-05-01T10:00:00Z").unwrap();
        let hearing = Hearing {
            id: "h1".to_string(),
            case_id: "c1".to_string(),
            judge_id: "j1".to_string(),
            hearing_date: when,
            hearing_time: Some("10:00".to_string()),
            courtroom: "4B".to_string(),
            purpose: None,
            status: HearingStatus::Scheduled,
            notes: None,
            created_at: Utc::now(),
        };
        let json = serde_json::to_value(HearingRecord::from(hearing)).unwrap();
        assert_eq!(json["date"], json["hearingDate"]);
    }

    #[test]
    fn test_update_distinguishes_null_from_absent() {
        let cleared: CaseUpdate = serde_json::from_str(r#"{"assignedJudge": null}"#).unwrap();
        assert_eq!(cleared.assigned_judge, Some(None));

        let untouched: CaseUpdate = serde_json::from_str(r#"{"title": "x"}"#).unwrap();
        assert_eq!(untouched.assigned_judge, None);
    }

    #[test]
    fn test_parse_date_accepts_plain_dates() {
        let d = parse_date("2024-03-09").unwrap();
        assert_eq!(d.to_rfc3339(), "2024-03-09T00:00:00+00:00");
        assert!(parse_date("next tuesday").is_none());
    }
}

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use std::fmt;
use std::str::FromStr;

/// The six pipeline stages, in board order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum JobStatus {
    Saved,
    ToApply,
    Applied,
    Interview,
    Offer,
    Rejected,
}

impl JobStatus {
    pub const ALL: [JobStatus; 6] = [
        JobStatus::Saved,
        JobStatus::ToApply,
        JobStatus::Applied,
        JobStatus::Interview,
        JobStatus::Offer,
        JobStatus::Rejected,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Saved => "saved",
            JobStatus::ToApply => "to-apply",
            JobStatus::Applied => "applied",
            JobStatus::Interview => "interview",
            JobStatus::Offer => "offer",
            JobStatus::Rejected => "rejected",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            JobStatus::Saved => "Saved",
            JobStatus::ToApply => "To Apply",
            JobStatus::Applied => "Applied",
            JobStatus::Interview => "Interview",
            JobStatus::Offer => "Offer",
            JobStatus::Rejected => "Rejected",
        }
    }
}

impl fmt::Display for JobStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JobStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        JobStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or_else(|| {
                format!(
                    "unknown status '{}' (expected one of: saved, to-apply, applied, interview, offer, rejected)",
                    s
                )
            })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Job {
    pub job_id: String,
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub salary_range: Option<String>,
    pub status: JobStatus,
    #[serde(default)]
    pub notes: Option<String>,
    #[serde(default, deserialize_with = "flexible_datetime::option")]
    pub date_added: Option<DateTime<Utc>>,
    #[serde(default)]
    pub contact_person: Option<String>,
    #[serde(default)]
    pub resume_version: Option<String>,
    #[serde(default)]
    pub cover_letter: Option<String>,
    #[serde(default, deserialize_with = "flexible_datetime::option")]
    pub applied_date: Option<DateTime<Utc>>,
    #[serde(default, deserialize_with = "flexible_datetime::option")]
    pub interview_date: Option<DateTime<Utc>>,
    #[serde(default)]
    pub ai_match_score: Option<i64>,
    #[serde(default)]
    pub ai_keywords: Option<Vec<String>>,
    #[serde(default)]
    pub ai_summary: Option<Vec<String>>,
}

/// Payload for `POST /jobs` and each entry of `POST /jobs/bulk-save`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct NewJob {
    pub title: String,
    pub company: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
}

impl NewJob {
    pub fn new(title: impl Into<String>, company: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            company: company.into(),
            ..Default::default()
        }
    }

    /// Title and company are the only required fields.
    pub fn validate(&self) -> Result<(), String> {
        if self.title.trim().is_empty() || self.company.trim().is_empty() {
            return Err("Please enter job title and company".to_string());
        }
        Ok(())
    }
}

/// Partial update for `PATCH /jobs/{id}`. Unset fields are left out of the body.
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct JobUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_url: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub source: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub salary_range: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<JobStatus>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_person: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_match_score: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_keywords: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ai_summary: Option<Vec<String>>,
}

impl JobUpdate {
    pub fn status(status: JobStatus) -> Self {
        Self {
            status: Some(status),
            ..Default::default()
        }
    }

    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TaskType {
    Application,
    Networking,
    Skills,
}

impl TaskType {
    pub const ALL: [TaskType; 3] = [TaskType::Application, TaskType::Networking, TaskType::Skills];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskType::Application => "application",
            TaskType::Networking => "networking",
            TaskType::Skills => "skills",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TaskType::Application => "Applications",
            TaskType::Networking => "Networking",
            TaskType::Skills => "Skills Practice",
        }
    }
}

impl FromStr for TaskType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TaskType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| format!("unknown task type '{}' (expected application, networking or skills)", s))
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Task {
    pub task_id: String,
    pub task_type: TaskType,
    pub description: String,
    #[serde(default)]
    pub completed: bool,
    pub date: String,
    #[serde(default)]
    pub job_id: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewTask {
    pub task_type: TaskType,
    pub description: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub job_id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Reminder {
    pub reminder_id: String,
    pub job_id: String,
    pub message: String,
    #[serde(deserialize_with = "flexible_datetime::required")]
    pub reminder_date: DateTime<Utc>,
    #[serde(default)]
    pub completed: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct NewReminder {
    pub job_id: String,
    pub reminder_date: DateTime<Utc>,
    pub message: String,
}

fn default_applications() -> i64 {
    3
}

fn default_networking() -> i64 {
    2
}

fn default_skills() -> i64 {
    2
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Goals {
    #[serde(default = "default_applications")]
    pub applications_per_day: i64,
    #[serde(default = "default_networking")]
    pub networking_per_day: i64,
    #[serde(default = "default_skills")]
    pub skills_per_day: i64,
}

impl Default for Goals {
    fn default() -> Self {
        Self {
            applications_per_day: default_applications(),
            networking_per_day: default_networking(),
            skills_per_day: default_skills(),
        }
    }
}

impl Goals {
    pub fn target(&self, task_type: TaskType) -> i64 {
        match task_type {
            TaskType::Application => self.applications_per_day,
            TaskType::Networking => self.networking_per_day,
            TaskType::Skills => self.skills_per_day,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, PartialEq)]
pub struct GoalsUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub applications_per_day: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub networking_per_day: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skills_per_day: Option<i64>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct User {
    pub user_id: String,
    pub name: String,
    pub email: String,
    #[serde(default)]
    pub picture: Option<String>,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRequest {
    pub query: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub remote_only: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub experience_level: Option<String>,
    pub max_results: u32,
}

impl SearchRequest {
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            location: None,
            remote_only: false,
            experience_level: None,
            max_results: 20,
        }
    }
}

/// One hit from the remote job boards behind `POST /jobs/search`.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResult {
    pub title: String,
    pub company: String,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub job_url: Option<String>,
    // RemoteOK reports salary as a bare number
    #[serde(default, deserialize_with = "string_or_number")]
    pub salary_range: Option<String>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub is_remote: bool,
}

impl SearchResult {
    pub fn to_new_job(&self) -> NewJob {
        NewJob {
            title: self.title.clone(),
            company: self.company.clone(),
            location: self.location.clone(),
            job_url: self.job_url.clone().filter(|u| !u.is_empty()),
            source: self.source.clone(),
            description: self.description.clone(),
            salary_range: self.salary_range.clone(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub jobs: Vec<SearchResult>,
    #[serde(default)]
    pub count: usize,
}

#[derive(Debug, Clone, Deserialize)]
pub struct BulkSaveResponse {
    #[serde(default)]
    pub message: String,
    pub count: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Analysis {
    pub match_score: i64,
    #[serde(default)]
    pub keywords: Vec<String>,
    #[serde(default)]
    pub summary: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum EmailKind {
    Application,
    FollowUp,
    Networking,
}

fn string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) if !s.trim().is_empty() => Some(s),
        Some(serde_json::Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// The backend stores some timestamps with an offset and some without.
pub mod flexible_datetime {
    use super::*;
    use serde::de::Error;

    pub fn parse(s: &str) -> Option<DateTime<Utc>> {
        if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
            return Some(dt.with_timezone(&Utc));
        }
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%.f") {
            return Some(naive.and_utc());
        }
        NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .ok()
            .and_then(|d| d.and_hms_opt(0, 0, 0))
            .map(|naive| naive.and_utc())
    }

    pub fn option<'de, D>(deserializer: D) -> Result<Option<DateTime<Utc>>, D::Error>
    where
        D: Deserializer<'de>,
    {
        match Option::<String>::deserialize(deserializer)? {
            None => Ok(None),
            Some(s) => parse(&s)
                .map(Some)
                .ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", s))),
        }
    }

    pub fn required<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        parse(&s).ok_or_else(|| D::Error::custom(format!("invalid timestamp '{}'", s)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_wire_names() {
        assert_eq!(serde_json::to_value(JobStatus::ToApply).unwrap(), json!("to-apply"));
        let status: JobStatus = serde_json::from_value(json!("interview")).unwrap();
        assert_eq!(status, JobStatus::Interview);
        assert!(serde_json::from_value::<JobStatus>(json!("closed")).is_err());
    }

    #[test]
    fn test_status_from_str() {
        assert_eq!("offer".parse::<JobStatus>().unwrap(), JobStatus::Offer);
        assert!("Offer".parse::<JobStatus>().is_err());
        assert!("".parse::<JobStatus>().is_err());
    }

    #[test]
    fn test_job_from_backend_payload() {
        let job: Job = serde_json::from_value(json!({
            "job_id": "job_abc123",
            "user_id": "user_1",
            "title": "Backend Engineer",
            "company": "Acme",
            "location": null,
            "status": "saved",
            "date_added": "2024-03-01T10:00:00.123456+00:00",
            "ai_match_score": 82,
            "ai_keywords": ["Rust", "SQL"]
        }))
        .unwrap();
        assert_eq!(job.status, JobStatus::Saved);
        assert_eq!(job.ai_match_score, Some(82));
        assert_eq!(job.date_added.unwrap().to_rfc3339(), "2024-03-01T10:00:00.123456+00:00");
    }

    #[test]
    fn test_naive_timestamps_are_utc() {
        let parsed = flexible_datetime::parse("2024-03-01T10:00:00").unwrap();
        assert_eq!(parsed.to_rfc3339(), "2024-03-01T10:00:00+00:00");
        assert!(flexible_datetime::parse("2024-03-01").is_some());
        assert!(flexible_datetime::parse("yesterday").is_none());
    }

    #[test]
    fn test_job_update_skips_unset_fields() {
        let body = serde_json::to_value(JobUpdate::status(JobStatus::Interview)).unwrap();
        assert_eq!(body, json!({"status": "interview"}));
        assert!(JobUpdate::default().is_empty());
    }

    #[test]
    fn test_new_job_validation() {
        assert!(NewJob::new("Backend Engineer", "Acme").validate().is_ok());
        assert!(NewJob::new("  ", "Acme").validate().is_err());
        assert!(NewJob::new("Backend Engineer", "").validate().is_err());

        let body = serde_json::to_value(NewJob::new("Backend Engineer", "Acme")).unwrap();
        assert_eq!(body, json!({"title": "Backend Engineer", "company": "Acme"}));
    }

    #[test]
    fn test_search_result_numeric_salary() {
        let result: SearchResult = serde_json::from_value(json!({
            "title": "Rust Dev",
            "company": "Ferris Inc",
            "salary_range": 150000,
            "job_url": "",
            "is_remote": true
        }))
        .unwrap();
        assert_eq!(result.salary_range.as_deref(), Some("150000"));
        assert_eq!(result.to_new_job().job_url, None);

        let empty: SearchResult =
            serde_json::from_value(json!({"title": "A", "company": "B", "salary_range": ""})).unwrap();
        assert_eq!(empty.salary_range, None);
    }

    #[test]
    fn test_goals_defaults() {
        let goals: Goals = serde_json::from_value(json!({"applications_per_day": 5})).unwrap();
        assert_eq!(goals.target(TaskType::Application), 5);
        assert_eq!(goals.target(TaskType::Networking), 2);
        assert_eq!(goals.target(TaskType::Skills), 2);
    }

    #[test]
    fn test_email_kind_wire_names() {
        assert_eq!(serde_json::to_value(EmailKind::FollowUp).unwrap(), json!("follow_up"));
    }
}

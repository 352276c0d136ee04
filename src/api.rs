//! Blocking client for the job-tracker REST backend.
//!
//! All data lives server side; every view loads through this one client. The
//! session is carried as the `session_token` cookie, the same way a browser
//! would after sign-in. Reads are retried on transient failures; writes are
//! sent once.

use reqwest::blocking::{Client, RequestBuilder, Response};
use reqwest::header::{COOKIE, SET_COOKIE};
use reqwest::Url;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use std::thread;
use std::time::Duration;
use tracing::{debug, warn};

use crate::auth::{Identity, Session, SessionExchange};
use crate::board::JobUpdater;
use crate::error::ApiError;
use crate::models::{
    Analysis, BulkSaveResponse, EmailKind, Goals, GoalsUpdate, Job, JobUpdate, NewJob, NewReminder, NewTask,
    Reminder, SearchRequest, SearchResponse, Task, User,
};

const SESSION_COOKIE: &str = "session_token";
const MAX_READ_ATTEMPTS: u32 = 3;

#[derive(Debug, Serialize)]
struct SessionRequest<'a> {
    session_id: &'a str,
}

#[derive(Debug, Serialize)]
struct AnalysisRequest<'a> {
    job_description: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_resume: Option<&'a str>,
}

#[derive(Debug, Serialize)]
struct EmailRequest<'a> {
    job_title: &'a str,
    company: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    recipient_name: Option<&'a str>,
    email_type: EmailKind,
}

#[derive(Debug, Deserialize)]
struct CoverLetterResponse {
    cover_letter: String,
}

#[derive(Debug, Deserialize)]
struct EmailResponse {
    email: String,
}

#[derive(Debug, Clone)]
pub struct ApiClient {
    client: Client,
    base_url: Url,
    session_token: Option<String>,
    retry_delay: Duration,
}

impl ApiClient {
    /// `backend_url` is the server root; the `/api` prefix is added here.
    pub fn new(backend_url: &str, timeout: Duration) -> Result<Self, ApiError> {
        let mut base_url =
            Url::parse(backend_url).map_err(|e| ApiError::InvalidUrl(format!("{}: {}", backend_url, e)))?;
        base_url
            .path_segments_mut()
            .map_err(|_| ApiError::InvalidUrl(backend_url.to_string()))?
            .pop_if_empty()
            .push("api");
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            base_url,
            session_token: None,
            retry_delay: Duration::from_millis(500),
        })
    }

    pub fn with_session(mut self, token: Option<String>) -> Self {
        self.session_token = token;
        self
    }

    #[cfg(test)]
    pub fn with_retry_delay(mut self, delay: Duration) -> Self {
        self.retry_delay = delay;
        self
    }

    pub fn set_session(&mut self, token: Option<String>) {
        self.session_token = token;
    }

    /// Each segment is percent-encoded on its own, so an ID can never add path components.
    fn url(&self, segments: &[&str]) -> Url {
        let mut url = self.base_url.clone();
        // `new` only accepts base URLs, so the segments are always writable
        if let Ok(mut path) = url.path_segments_mut() {
            path.extend(segments);
        }
        url
    }

    fn authorized(&self, request: RequestBuilder) -> RequestBuilder {
        match &self.session_token {
            Some(token) => request.header(COOKIE, format!("{}={}", SESSION_COOKIE, token)),
            None => request,
        }
    }

    fn send(&self, request: RequestBuilder) -> Result<Response, ApiError> {
        let response = self.authorized(request).send()?;
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }
        let body = response.text().unwrap_or_default();
        Err(ApiError::from_status(status, &body))
    }

    fn decode<T: DeserializeOwned>(response: Response) -> Result<T, ApiError> {
        let body = response.text()?;
        Ok(serde_json::from_str(&body)?)
    }

    /// GET with exponential backoff on transient failures.
    fn get_json<T: DeserializeOwned>(&self, segments: &[&str], query: &[(&str, &str)]) -> Result<T, ApiError> {
        let url = self.url(segments);
        let path = url.path();
        let mut attempt = 0;
        loop {
            attempt += 1;
            debug!(path, attempt, "GET");
            let result = self
                .send(self.client.get(url.clone()).query(query))
                .and_then(Self::decode);
            match result {
                Err(e) if e.is_retryable() && attempt < MAX_READ_ATTEMPTS => {
                    let delay = self.retry_delay * 2u32.pow(attempt - 1);
                    warn!(path, attempt, error = %e, "read failed, retrying after {}ms", delay.as_millis());
                    thread::sleep(delay);
                }
                other => return other,
            }
        }
    }

    fn post_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, segments: &[&str], body: &B) -> Result<T, ApiError> {
        let url = self.url(segments);
        debug!(path = url.path(), "POST");
        self.send(self.client.post(url).json(body))
            .and_then(Self::decode)
    }

    fn patch_json<B: Serialize + ?Sized, T: DeserializeOwned>(&self, segments: &[&str], body: &B) -> Result<T, ApiError> {
        let url = self.url(segments);
        debug!(path = url.path(), "PATCH");
        self.send(self.client.patch(url).json(body))
            .and_then(Self::decode)
    }

    fn patch_flag(&self, segments: &[&str], completed: bool) -> Result<(), ApiError> {
        let url = self.url(segments);
        debug!(path = url.path(), completed, "PATCH");
        let flag = completed.to_string();
        self.send(self.client.patch(url).query(&[("completed", flag.as_str())]))?;
        Ok(())
    }

    fn delete(&self, segments: &[&str]) -> Result<(), ApiError> {
        let url = self.url(segments);
        debug!(path = url.path(), "DELETE");
        self.send(self.client.delete(url))?;
        Ok(())
    }

    // --- Auth ---

    pub fn create_session(&self, session_id: &str) -> Result<Session, ApiError> {
        let response = self.send(
            self.client
                .post(self.url(&["auth", "session"]))
                .json(&SessionRequest { session_id }),
        )?;
        let token = session_cookie(&response);
        let user: User = Self::decode(response)?;
        Ok(Session { user, token })
    }

    pub fn me(&self) -> Result<User, ApiError> {
        self.get_json(&["auth", "me"], &[])
    }

    pub fn logout(&self) -> Result<(), ApiError> {
        self.send(self.client.post(self.url(&["auth", "logout"])))?;
        Ok(())
    }

    // --- Jobs ---

    pub fn list_jobs(&self) -> Result<Vec<Job>, ApiError> {
        self.get_json(&["jobs"], &[])
    }

    pub fn get_job(&self, job_id: &str) -> Result<Job, ApiError> {
        self.get_json(&["jobs", job_id], &[])
    }

    pub fn create_job(&self, job: &NewJob) -> Result<Job, ApiError> {
        job.validate().map_err(ApiError::Validation)?;
        self.post_json(&["jobs"], job)
    }

    pub fn update_job(&self, job_id: &str, update: &JobUpdate) -> Result<Job, ApiError> {
        self.patch_json(&["jobs", job_id], update)
    }

    pub fn delete_job(&self, job_id: &str) -> Result<(), ApiError> {
        self.delete(&["jobs", job_id])
    }

    pub fn search_jobs(&self, request: &SearchRequest) -> Result<SearchResponse, ApiError> {
        self.post_json(&["jobs", "search"], request)
    }

    pub fn bulk_save(&self, jobs: &[NewJob]) -> Result<BulkSaveResponse, ApiError> {
        self.post_json(&["jobs", "bulk-save"], jobs)
    }

    // --- Goals ---

    pub fn goals(&self) -> Result<Goals, ApiError> {
        self.get_json(&["goals"], &[])
    }

    pub fn update_goals(&self, update: &GoalsUpdate) -> Result<Goals, ApiError> {
        self.patch_json(&["goals"], update)
    }

    // --- Tasks ---

    pub fn tasks_for(&self, date: &str) -> Result<Vec<Task>, ApiError> {
        self.get_json(&["tasks"], &[("date", date)])
    }

    pub fn create_task(&self, task: &NewTask, date: &str) -> Result<Task, ApiError> {
        if task.description.trim().is_empty() {
            return Err(ApiError::Validation("Please enter a task description".to_string()));
        }
        debug!(date, "POST /tasks");
        self.send(self.client.post(self.url(&["tasks"])).query(&[("date", date)]).json(task))
            .and_then(Self::decode)
    }

    pub fn set_task_completed(&self, task_id: &str, completed: bool) -> Result<(), ApiError> {
        self.patch_flag(&["tasks", task_id], completed)
    }

    pub fn delete_task(&self, task_id: &str) -> Result<(), ApiError> {
        self.delete(&["tasks", task_id])
    }

    // --- Reminders ---

    pub fn reminders(&self) -> Result<Vec<Reminder>, ApiError> {
        self.get_json(&["reminders"], &[])
    }

    pub fn create_reminder(&self, reminder: &NewReminder) -> Result<Reminder, ApiError> {
        if reminder.message.trim().is_empty() {
            return Err(ApiError::Validation("Please fill in all reminder fields".to_string()));
        }
        self.post_json(&["reminders"], reminder)
    }

    pub fn set_reminder_completed(&self, reminder_id: &str, completed: bool) -> Result<(), ApiError> {
        self.patch_flag(&["reminders", reminder_id], completed)
    }

    pub fn delete_reminder(&self, reminder_id: &str) -> Result<(), ApiError> {
        self.delete(&["reminders", reminder_id])
    }

    // --- AI ---

    pub fn analyze_job(&self, description: &str, resume: Option<&str>) -> Result<Analysis, ApiError> {
        self.post_json(
            &["ai", "analyze-job"],
            &AnalysisRequest {
                job_description: description,
                user_resume: resume,
            },
        )
    }

    pub fn generate_cover_letter(&self, description: &str, resume: Option<&str>) -> Result<String, ApiError> {
        let response: CoverLetterResponse = self.post_json(
            &["ai", "generate-cover-letter"],
            &AnalysisRequest {
                job_description: description,
                user_resume: resume,
            },
        )?;
        Ok(response.cover_letter)
    }

    pub fn generate_email(
        &self,
        job_title: &str,
        company: &str,
        recipient: Option<&str>,
        kind: EmailKind,
    ) -> Result<String, ApiError> {
        let response: EmailResponse = self.post_json(
            &["ai", "generate-email"],
            &EmailRequest {
                job_title,
                company,
                recipient_name: recipient,
                email_type: kind,
            },
        )?;
        Ok(response.email)
    }
}

fn session_cookie(response: &Response) -> Option<String> {
    response
        .headers()
        .get_all(SET_COOKIE)
        .iter()
        .filter_map(|value| value.to_str().ok())
        .filter_map(|cookie| cookie.split(';').next())
        .filter_map(|pair| pair.trim().split_once('='))
        .find(|(name, _)| *name == SESSION_COOKIE)
        .map(|(_, value)| value.to_string())
        .filter(|value| !value.is_empty())
}

impl JobUpdater for ApiClient {
    fn update_job(&self, job_id: &str, update: &JobUpdate) -> Result<Job, ApiError> {
        ApiClient::update_job(self, job_id, update)
    }
}

impl Identity for ApiClient {
    fn me(&self) -> Result<User, ApiError> {
        ApiClient::me(self)
    }
}

impl SessionExchange for ApiClient {
    fn exchange(&self, session_id: &str) -> Result<Session, ApiError> {
        self.create_session(session_id)
    }
}

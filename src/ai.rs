use anyhow::{anyhow, Context, Result};

use crate::api::ApiClient;
use crate::board::JobUpdater;
use crate::error::ApiError;
use crate::models::{Analysis, EmailKind, Job, JobUpdate};

// --- Provider trait ---

/// AI features served by the backend.
pub trait AiAssistant {
    fn analyze(&self, description: &str, resume: Option<&str>) -> Result<Analysis, ApiError>;
    fn cover_letter(&self, description: &str, resume: Option<&str>) -> Result<String, ApiError>;
    fn email(&self, title: &str, company: &str, recipient: Option<&str>, kind: EmailKind) -> Result<String, ApiError>;
}

impl AiAssistant for ApiClient {
    fn analyze(&self, description: &str, resume: Option<&str>) -> Result<Analysis, ApiError> {
        self.analyze_job(description, resume)
    }

    fn cover_letter(&self, description: &str, resume: Option<&str>) -> Result<String, ApiError> {
        self.generate_cover_letter(description, resume)
    }

    fn email(&self, title: &str, company: &str, recipient: Option<&str>, kind: EmailKind) -> Result<String, ApiError> {
        self.generate_email(title, company, recipient, kind)
    }
}

fn description(job: &Job) -> Result<&str> {
    job.description
        .as_deref()
        .filter(|d| !d.trim().is_empty())
        .ok_or_else(|| anyhow!("No job description to analyze"))
}

/// Scores a job and stores the match score, keywords and summary on it.
pub fn analyze_job(
    assistant: &dyn AiAssistant,
    updater: &dyn JobUpdater,
    job: &Job,
    resume: Option<&str>,
) -> Result<Analysis> {
    let analysis = assistant
        .analyze(description(job)?, resume)
        .context("Failed to analyze job")?;

    let update = JobUpdate {
        ai_match_score: Some(analysis.match_score),
        ai_keywords: Some(analysis.keywords.clone()),
        ai_summary: Some(analysis.summary.clone()),
        ..Default::default()
    };
    updater
        .update_job(&job.job_id, &update)
        .context("Failed to save analysis")?;

    Ok(analysis)
}

/// Analysis already stored on a job, if it was analyzed before.
pub fn stored_analysis(job: &Job) -> Option<Analysis> {
    job.ai_match_score.map(|match_score| Analysis {
        match_score,
        keywords: job.ai_keywords.clone().unwrap_or_default(),
        summary: job.ai_summary.clone().unwrap_or_default(),
    })
}

pub fn cover_letter(assistant: &dyn AiAssistant, job: &Job, resume: Option<&str>) -> Result<String> {
    let description = description(job).map_err(|_| anyhow!("No job description available"))?;
    assistant
        .cover_letter(description, resume)
        .context("Failed to generate cover letter")
}

/// Drafts an email about `job`, addressed to `recipient` or the job's contact person.
pub fn email_draft(assistant: &dyn AiAssistant, job: &Job, kind: EmailKind, recipient: Option<&str>) -> Result<String> {
    let recipient = recipient.or(job.contact_person.as_deref());
    assistant
        .email(&job.title, &job.company, recipient, kind)
        .context("Failed to generate email")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::board::tests::job;
    use crate::models::JobStatus;
    use std::cell::RefCell;

    #[derive(Default)]
    struct FakeAssistant {
        seen: RefCell<Vec<String>>,
    }

    impl AiAssistant for FakeAssistant {
        fn analyze(&self, description: &str, _resume: Option<&str>) -> Result<Analysis, ApiError> {
            self.seen.borrow_mut().push(description.to_string());
            Ok(Analysis {
                match_score: 84,
                keywords: vec!["Rust".to_string(), "Postgres".to_string()],
                summary: vec!["Backend role".to_string()],
            })
        }

        fn cover_letter(&self, description: &str, resume: Option<&str>) -> Result<String, ApiError> {
            Ok(format!("letter for {} / {}", description, resume.unwrap_or("-")))
        }

        fn email(&self, title: &str, company: &str, recipient: Option<&str>, kind: EmailKind) -> Result<String, ApiError> {
            Ok(format!("{:?} to {} re {} at {}", kind, recipient.unwrap_or("Hiring Manager"), title, company))
        }
    }

    #[derive(Default)]
    struct RecordingUpdater {
        updates: RefCell<Vec<JobUpdate>>,
    }

    impl JobUpdater for RecordingUpdater {
        fn update_job(&self, job_id: &str, update: &JobUpdate) -> Result<Job, ApiError> {
            self.updates.borrow_mut().push(update.clone());
            Ok(job(job_id, JobStatus::Saved))
        }
    }

    fn described(text: Option<&str>) -> Job {
        let mut j = job("job_1", JobStatus::Saved);
        j.description = text.map(str::to_string);
        j
    }

    #[test]
    fn test_analysis_is_written_back() {
        let assistant = FakeAssistant::default();
        let updater = RecordingUpdater::default();
        let analysis = analyze_job(&assistant, &updater, &described(Some("Build APIs")), None).unwrap();

        assert_eq!(analysis.match_score, 84);
        let updates = updater.updates.borrow();
        assert_eq!(updates.len(), 1);
        assert_eq!(updates[0].ai_match_score, Some(84));
        assert_eq!(updates[0].ai_keywords.as_ref().unwrap().len(), 2);
        assert!(updates[0].status.is_none());
    }

    #[test]
    fn test_missing_description_makes_no_calls() {
        let assistant = FakeAssistant::default();
        let updater = RecordingUpdater::default();

        let err = analyze_job(&assistant, &updater, &described(Some("   ")), None).unwrap_err();
        assert_eq!(err.to_string(), "No job description to analyze");
        assert!(assistant.seen.borrow().is_empty());
        assert!(updater.updates.borrow().is_empty());

        let err = cover_letter(&assistant, &described(None), None).unwrap_err();
        assert_eq!(err.to_string(), "No job description available");
    }

    #[test]
    fn test_stored_analysis() {
        let mut j = described(None);
        assert!(stored_analysis(&j).is_none());
        j.ai_match_score = Some(70);
        j.ai_keywords = Some(vec!["Go".to_string()]);
        let stored = stored_analysis(&j).unwrap();
        assert_eq!(stored.keywords, vec!["Go".to_string()]);
        assert!(stored.summary.is_empty());
    }

    #[test]
    fn test_email_falls_back_to_contact_person() {
        let assistant = FakeAssistant::default();
        let mut j = described(None);
        j.contact_person = Some("Sam".to_string());

        let draft = email_draft(&assistant, &j, EmailKind::FollowUp, None).unwrap();
        assert_eq!(draft, "FollowUp to Sam re Job job_1 at Acme");

        let draft = email_draft(&assistant, &j, EmailKind::Networking, Some("Lee")).unwrap();
        assert!(draft.starts_with("Networking to Lee"));
    }
}

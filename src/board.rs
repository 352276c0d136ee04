//! Kanban pipeline model.
//!
//! Jobs are grouped into one column per [`JobStatus`]. A drag gesture is a
//! small state machine: at most one job is "active" at a time, and dropping it
//! on a column resolves to either nothing or exactly one status update.

use tracing::{debug, warn};

use crate::error::ApiError;
use crate::models::{Job, JobStatus, JobUpdate};

/// The collaborator that persists a job change.
pub trait JobUpdater {
    fn update_job(&self, job_id: &str, update: &JobUpdate) -> Result<Job, ApiError>;
}

/// Partitions `jobs` into `statuses` order, keeping fetch order inside each column.
pub fn group_by_status<'a>(jobs: &'a [Job], statuses: &[JobStatus]) -> Vec<(JobStatus, Vec<&'a Job>)> {
    statuses
        .iter()
        .map(|status| {
            let column = jobs.iter().filter(|job| job.status == *status).collect();
            (*status, column)
        })
        .collect()
}

/// Resolves a drop to the job's new status.
///
/// `over` is the column the job was released on; `None` means empty space.
/// Returns `None` for unknown columns, unknown jobs, or a drop onto the job's
/// own column.
pub fn on_drop(job_id: &str, over: Option<&str>, jobs: &[Job]) -> Option<JobStatus> {
    let target: JobStatus = over?.parse().ok()?;
    let job = jobs.iter().find(|job| job.job_id == job_id)?;
    (job.status != target).then_some(target)
}

/// Pure reducer: the job list with `job_id` moved to `new_status`.
pub fn apply(jobs: &[Job], job_id: &str, new_status: JobStatus) -> Vec<Job> {
    jobs.iter()
        .map(|job| {
            if job.job_id == job_id {
                Job {
                    status: new_status,
                    ..job.clone()
                }
            } else {
                job.clone()
            }
        })
        .collect()
}

#[derive(Debug)]
pub enum DropOutcome {
    Ignored,
    Moved {
        job_id: String,
        from: JobStatus,
        to: JobStatus,
    },
    Reverted {
        job_id: String,
        to: JobStatus,
        error: ApiError,
    },
}

impl DropOutcome {
    pub fn notification(&self) -> Option<String> {
        match self {
            DropOutcome::Ignored => None,
            DropOutcome::Moved { to, .. } => Some(format!("Moved to {}", to.label())),
            DropOutcome::Reverted { .. } => Some("Failed to update job status".to_string()),
        }
    }
}

pub struct Board {
    jobs: Vec<Job>,
    active: Option<String>,
}

impl Board {
    pub fn new(jobs: Vec<Job>) -> Self {
        Self { jobs, active: None }
    }

    pub fn columns(&self) -> Vec<(JobStatus, Vec<&Job>)> {
        group_by_status(&self.jobs, &JobStatus::ALL)
    }

    pub fn column(&self, status: JobStatus) -> Vec<&Job> {
        self.jobs.iter().filter(|job| job.status == status).collect()
    }

    pub fn active(&self) -> Option<&str> {
        self.active.as_deref()
    }

    pub fn active_job(&self) -> Option<&Job> {
        let id = self.active.as_deref()?;
        self.jobs.iter().find(|job| job.job_id == id)
    }

    /// Starts dragging `job_id`. Refused while another drag is in progress.
    pub fn begin_drag(&mut self, job_id: &str) -> bool {
        if self.active.is_some() || !self.jobs.iter().any(|job| job.job_id == job_id) {
            return false;
        }
        self.active = Some(job_id.to_string());
        true
    }

    pub fn cancel_drag(&mut self) {
        self.active = None;
    }

    /// Releases the active job over `over`.
    ///
    /// A valid move is applied locally before the update call and rolled back
    /// if the call fails. The drag ends whatever the outcome.
    pub fn drop_on(&mut self, over: Option<&str>, updater: &dyn JobUpdater) -> DropOutcome {
        let Some(job_id) = self.active.take() else {
            return DropOutcome::Ignored;
        };
        let Some(new_status) = on_drop(&job_id, over, &self.jobs) else {
            debug!(job_id = %job_id, ?over, "drop ignored");
            return DropOutcome::Ignored;
        };
        let from = self
            .jobs
            .iter()
            .find(|job| job.job_id == job_id)
            .map(|job| job.status)
            .unwrap_or(new_status);

        let before = std::mem::take(&mut self.jobs);
        self.jobs = apply(&before, &job_id, new_status);

        match updater.update_job(&job_id, &JobUpdate::status(new_status)) {
            Ok(updated) => {
                if let Some(job) = self.jobs.iter_mut().find(|job| job.job_id == updated.job_id) {
                    *job = updated;
                }
                DropOutcome::Moved {
                    job_id,
                    from,
                    to: new_status,
                }
            }
            Err(error) => {
                warn!(job_id = %job_id, %error, "status update failed, reverting");
                self.jobs = before;
                DropOutcome::Reverted {
                    job_id,
                    to: new_status,
                    error,
                }
            }
        }
    }

    /// One-shot drag: grab `job_id` and drop it on `target`.
    pub fn move_job(&mut self, job_id: &str, target: &str, updater: &dyn JobUpdater) -> DropOutcome {
        if !self.begin_drag(job_id) {
            return DropOutcome::Ignored;
        }
        self.drop_on(Some(target), updater)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;
    use std::cell::RefCell;

    pub(crate) fn job(id: &str, status: JobStatus) -> Job {
        serde_json::from_value(serde_json::json!({
            "job_id": id,
            "title": format!("Job {}", id),
            "company": "Acme",
            "status": status,
        }))
        .unwrap()
    }

    #[derive(Default)]
    struct RecordingUpdater {
        calls: RefCell<Vec<(String, JobUpdate)>>,
        fail: bool,
    }

    impl JobUpdater for RecordingUpdater {
        fn update_job(&self, job_id: &str, update: &JobUpdate) -> Result<Job, ApiError> {
            self.calls.borrow_mut().push((job_id.to_string(), update.clone()));
            if self.fail {
                return Err(ApiError::Status {
                    status: 500,
                    message: "down".to_string(),
                });
            }
            Ok(job(job_id, update.status.unwrap_or(JobStatus::Saved)))
        }
    }

    fn sample() -> Vec<Job> {
        vec![
            job("a", JobStatus::Saved),
            job("b", JobStatus::Applied),
            job("c", JobStatus::Saved),
            job("d", JobStatus::Offer),
            job("e", JobStatus::Rejected),
        ]
    }

    #[test]
    fn test_group_by_status_partitions_every_job_once() {
        let jobs = sample();
        let groups = group_by_status(&jobs, &JobStatus::ALL);

        assert_eq!(groups.len(), 6);
        let mut seen: Vec<&str> = groups
            .iter()
            .flat_map(|(_, column)| column.iter().map(|j| j.job_id.as_str()))
            .collect();
        seen.sort();
        assert_eq!(seen, vec!["a", "b", "c", "d", "e"]);

        for (status, column) in &groups {
            assert!(column.iter().all(|j| j.status == *status));
        }
    }

    #[test]
    fn test_group_by_status_preserves_fetch_order() {
        let jobs = sample();
        let groups = group_by_status(&jobs, &JobStatus::ALL);
        let saved: Vec<&str> = groups[0].1.iter().map(|j| j.job_id.as_str()).collect();
        assert_eq!(groups[0].0, JobStatus::Saved);
        assert_eq!(saved, vec!["a", "c"]);
        assert!(groups[1].1.is_empty());
    }

    #[test]
    fn test_on_drop_rejects_invalid_and_same_column() {
        let jobs = sample();
        assert_eq!(on_drop("a", Some("closed"), &jobs), None);
        assert_eq!(on_drop("a", Some("saved"), &jobs), None);
        assert_eq!(on_drop("a", None, &jobs), None);
        assert_eq!(on_drop("zzz", Some("offer"), &jobs), None);
        assert_eq!(on_drop("a", Some("to-apply"), &jobs), Some(JobStatus::ToApply));
    }

    #[test]
    fn test_apply_only_touches_target() {
        let jobs = sample();
        let moved = apply(&jobs, "b", JobStatus::Interview);
        assert_eq!(moved.len(), jobs.len());
        assert_eq!(moved[1].status, JobStatus::Interview);
        assert_eq!(moved[0].status, JobStatus::Saved);
        assert_eq!(jobs[1].status, JobStatus::Applied);
    }

    #[test]
    fn test_drag_saved_to_interview_issues_one_update() {
        let updater = RecordingUpdater::default();
        let mut board = Board::new(sample());

        assert!(board.begin_drag("a"));
        let outcome = board.drop_on(Some("interview"), &updater);

        assert!(matches!(outcome, DropOutcome::Moved { from: JobStatus::Saved, to: JobStatus::Interview, .. }));
        assert_eq!(outcome.notification().as_deref(), Some("Moved to Interview"));

        let calls = updater.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].0, "a");
        assert_eq!(calls[0].1, JobUpdate::status(JobStatus::Interview));

        let locations: Vec<JobStatus> = board
            .columns()
            .into_iter()
            .filter(|(_, column)| column.iter().any(|j| j.job_id == "a"))
            .map(|(status, _)| status)
            .collect();
        assert_eq!(locations, vec![JobStatus::Interview]);
        assert!(board.active().is_none());
    }

    #[test]
    fn test_failed_update_reverts_grouping() {
        let updater = RecordingUpdater {
            fail: true,
            ..Default::default()
        };
        let mut board = Board::new(sample());

        let outcome = board.move_job("a", "offer", &updater);
        assert!(matches!(outcome, DropOutcome::Reverted { to: JobStatus::Offer, .. }));
        assert_eq!(outcome.notification().as_deref(), Some("Failed to update job status"));
        assert_eq!(board.column(JobStatus::Saved).len(), 2);
        assert_eq!(board.column(JobStatus::Offer).len(), 1);
        assert_eq!(updater.calls.borrow().len(), 1);
    }

    #[test]
    fn test_noop_drops_make_no_calls() {
        let updater = RecordingUpdater::default();
        let mut board = Board::new(sample());

        board.begin_drag("a");
        assert!(matches!(board.drop_on(None, &updater), DropOutcome::Ignored));
        board.begin_drag("a");
        assert!(matches!(board.drop_on(Some("saved"), &updater), DropOutcome::Ignored));
        board.begin_drag("a");
        assert!(matches!(board.drop_on(Some("archived"), &updater), DropOutcome::Ignored));
        assert!(matches!(board.drop_on(Some("offer"), &updater), DropOutcome::Ignored));

        assert!(updater.calls.borrow().is_empty());
    }

    #[test]
    fn test_single_active_drag() {
        let mut board = Board::new(sample());
        assert!(board.begin_drag("a"));
        assert!(!board.begin_drag("b"));
        assert_eq!(board.active_job().map(|j| j.job_id.as_str()), Some("a"));
        board.cancel_drag();
        assert!(board.begin_drag("b"));
        assert!(!Board::new(sample()).begin_drag("missing"));
    }
}

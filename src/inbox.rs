use anyhow::{anyhow, Result};

use crate::models::{Job, JobStatus, SearchResult};

const SAME_JOB_SIMILARITY: f64 = 0.92;

/// Case-insensitive substring match on title, company or location. A blank query matches everything;
/// otherwise the query is used as typed, surrounding spaces included.
pub fn matches_query(job: &Job, query: &str) -> bool {
    if query.trim().is_empty() {
        return true;
    }
    let query = query.to_lowercase();
    job.title.to_lowercase().contains(&query)
        || job.company.to_lowercase().contains(&query)
        || job
            .location
            .as_deref()
            .is_some_and(|loc| loc.to_lowercase().contains(&query))
}

/// Saved jobs matching `query`.
pub fn inbox_filter<'a>(jobs: &'a [Job], query: &str) -> Vec<&'a Job> {
    jobs.iter()
        .filter(|job| job.status == JobStatus::Saved && matches_query(job, query))
        .collect()
}

fn similar(a: &str, b: &str) -> bool {
    strsim::jaro_winkler(&a.trim().to_lowercase(), &b.trim().to_lowercase()) >= SAME_JOB_SIMILARITY
}

/// Whether a search hit looks like a job already being tracked, in any status.
pub fn already_saved(result: &SearchResult, jobs: &[Job]) -> bool {
    jobs.iter()
        .any(|job| similar(&job.title, &result.title) && similar(&job.company, &result.company))
}

/// Picks search results for saving: `all`, or 1-based indices like `1,3`.
pub fn select_results<'a>(results: &'a [SearchResult], selection: &str) -> Result<Vec<&'a SearchResult>> {
    let selection = selection.trim();
    if selection.eq_ignore_ascii_case("all") {
        return Ok(results.iter().collect());
    }

    let mut picked = Vec::new();
    for part in selection.split(',').map(str::trim).filter(|p| !p.is_empty()) {
        let index: usize = part
            .parse()
            .map_err(|_| anyhow!("Invalid result number '{}'", part))?;
        let result = index
            .checked_sub(1)
            .and_then(|i| results.get(i))
            .ok_or_else(|| anyhow!("No search result #{} (have {})", index, results.len()))?;
        if !picked.iter().any(|r: &&SearchResult| std::ptr::eq(*r, result)) {
            picked.push(result);
        }
    }
    Ok(picked)
}

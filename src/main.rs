mod ai;
mod api;
mod auth;
mod board;
mod config;
mod daily;
mod display;
mod error;
mod inbox;
mod models;
mod reminders;
mod session;
mod tui;

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Local, NaiveDate, TimeZone, Utc};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use api::ApiClient;
use auth::{AuthGate, AuthState, CallbackGuard, CallbackOutcome};
use board::{Board, DropOutcome};
use config::Config;
use daily::DailySummary;
use display::{checkbox, format_date, progress_bar, relative_date, truncate};
use error::ApiError;
use models::{
    flexible_datetime, EmailKind, GoalsUpdate, Job, JobStatus, JobUpdate, NewJob, NewReminder, NewTask,
    SearchRequest, SearchResult, TaskType, User,
};
use session::SessionStore;

#[derive(Parser)]
#[command(name = "jobtrail")]
#[command(about = "Job application tracker - pipeline board, daily goals, reminders and AI help")]
struct Cli {
    /// Backend URL (overrides JOBTRAIL_API_URL)
    #[arg(long, global = true)]
    api_url: Option<String>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Print the sign-in URL
    Login {
        /// Print only the URL
        #[arg(long)]
        print: bool,
    },

    /// Finish sign-in with the URL the browser was sent back to
    Callback {
        /// Redirect URL containing #session_id=...
        url: String,
    },

    /// Sign out and forget the local session
    Logout,

    /// Show the signed-in user
    Whoami,

    /// Manage tracked jobs
    Jobs {
        #[command(subcommand)]
        command: JobCommands,
    },

    /// Search job boards and optionally save results
    Search {
        /// Keywords, e.g. "rust engineer"
        query: String,

        #[arg(short, long)]
        location: Option<String>,

        /// Remote positions only
        #[arg(long)]
        remote: bool,

        /// Experience level (entry, mid, senior)
        #[arg(long)]
        level: Option<String>,

        /// Maximum number of results
        #[arg(short, long, default_value = "20")]
        max: u32,

        /// Save results: "all" or result numbers like "1,3"
        #[arg(long)]
        save: Option<String>,
    },

    /// Interactive pipeline board
    Board,

    /// Today's dashboard
    Today,

    /// Manage today's tasks
    Task {
        #[command(subcommand)]
        command: TaskCommands,
    },

    /// Manage follow-up reminders
    Reminder {
        #[command(subcommand)]
        command: ReminderCommands,
    },

    /// Show or set daily goals
    Goals {
        #[command(subcommand)]
        command: Option<GoalsCommands>,
    },

    /// AI analysis and writing help
    Ai {
        #[command(subcommand)]
        command: AiCommands,
    },
}

#[derive(Subcommand)]
enum JobCommands {
    /// List jobs (the saved inbox unless --status or --all is given)
    List {
        #[arg(short, long)]
        status: Option<JobStatus>,

        /// Every status
        #[arg(short, long)]
        all: bool,

        /// Filter by title, company or location
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Add a job to the saved column
    Add {
        #[arg(long)]
        title: String,

        #[arg(long)]
        company: String,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        salary: Option<String>,

        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        description: Option<String>,
    },

    /// Show job details
    Show { id: String },

    /// Edit job fields
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        company: Option<String>,

        #[arg(long)]
        location: Option<String>,

        #[arg(long)]
        salary: Option<String>,

        #[arg(long)]
        source: Option<String>,

        #[arg(long)]
        url: Option<String>,

        #[arg(long)]
        description: Option<String>,

        /// Contact person at the company
        #[arg(long)]
        contact: Option<String>,
    },

    /// Delete a job
    Delete { id: String },

    /// Move a job to another pipeline stage
    Move { id: String, status: JobStatus },

    /// Replace a job's notes
    Notes { id: String, text: String },
}

#[derive(Subcommand)]
enum TaskCommands {
    /// Add a task for today (application, networking, skills)
    Add {
        task_type: TaskType,

        description: String,

        /// Related job ID
        #[arg(long)]
        job: Option<String>,

        /// Day the task belongs to (YYYY-MM-DD, default today)
        #[arg(long)]
        date: Option<NaiveDate>,
    },

    /// Mark a task complete
    Done { id: String },

    /// Mark a task not complete
    Undo { id: String },

    /// Delete a task
    Delete { id: String },
}

#[derive(Subcommand)]
enum ReminderCommands {
    /// Today's open reminders
    List {
        /// Every open reminder, not just today's
        #[arg(short, long)]
        all: bool,
    },

    /// Add a reminder for a job
    Add {
        job: String,

        /// YYYY-MM-DD or an RFC 3339 timestamp
        date: String,

        message: String,
    },

    /// Mark a reminder complete
    Done { id: String },

    /// Delete a reminder
    Delete { id: String },
}

#[derive(Subcommand)]
enum GoalsCommands {
    /// Show daily goals
    Show,

    /// Change daily goals
    Set {
        #[arg(long)]
        applications: Option<i64>,

        #[arg(long)]
        networking: Option<i64>,

        #[arg(long)]
        skills: Option<i64>,
    },
}

#[derive(Subcommand)]
enum AiCommands {
    /// Score a job against your resume and store the result
    Analyze {
        job: String,

        #[arg(short, long)]
        resume: Option<PathBuf>,
    },

    /// Generate a cover letter
    CoverLetter {
        job: String,

        #[arg(short, long)]
        resume: Option<PathBuf>,
    },

    /// Draft an email about a job
    Email {
        job: String,

        #[arg(short, long, value_enum, default_value = "application")]
        kind: EmailKind,

        /// Recipient name (defaults to the job's contact person)
        #[arg(long)]
        to: Option<String>,
    },
}

fn main() {
    if let Err(e) = run() {
        let unauthorized = e
            .chain()
            .any(|cause| cause.downcast_ref::<ApiError>().is_some_and(ApiError::is_unauthorized));
        if unauthorized {
            eprintln!("✗ Not signed in. run: jobtrail login");
        } else {
            eprintln!("✗ {:#}", e);
        }
        std::process::exit(1);
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();
    let mut config = Config::from_env()?;
    if let Some(url) = cli.api_url {
        config.api_url = url;
    }

    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.log_level))
        }))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let store = SessionStore::open(&config.db_path)?;
    let mut api = ApiClient::new(&config.api_url, config.timeout)
        .context("Failed to create HTTP client")?
        .with_session(store.token()?);
    info!(api_url = %config.api_url, "jobtrail v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Commands::Login { print } => {
            let url = auth::login_url(&config.auth_url, &config.redirect_url)?;
            if print {
                println!("{}", url);
            } else {
                println!("Open this URL in your browser to sign in:\n\n  {}\n", url);
                println!("After signing in, copy the address you land on and run:");
                println!("  jobtrail callback '<url>'");
            }
        }

        Commands::Callback { url } => {
            let mut guard = CallbackGuard::resuming(store.last_callback()?);
            let outcome = guard.process(&url, &api);
            if let Some(session_id) = guard.processed_id() {
                store.record_callback(session_id)?;
            }
            match outcome {
                CallbackOutcome::SignedIn(session) => {
                    store.save(session.token.as_deref(), &session.user)?;
                    api.set_session(session.token.clone());
                    println!("Signed in as {} <{}>\n", session.user.name, session.user.email);
                    // The exchanged user is carried into the dashboard without another identity check.
                    let user = require_user(Some(session.user), &api)?;
                    show_today(&api, &user)?;
                }
                CallbackOutcome::AlreadyProcessed => {
                    println!("This sign-in link was already used. Check with: jobtrail whoami");
                }
                CallbackOutcome::Redirect(route) => {
                    return Err(anyhow!(
                        "Failed to sign in (back to {}). run: jobtrail login",
                        route
                    ));
                }
            }
        }

        Commands::Logout => {
            if let Err(e) = api.logout() {
                warn!(error = %e, "backend logout failed");
            }
            store.clear()?;
            println!("Signed out.");
        }

        Commands::Whoami => {
            let user = require_user(None, &api)?;
            println!("{} <{}>", user.name, user.email);
            println!("User ID: {}", user.user_id);
            if let Some(session) = store.current()? {
                println!("Session stored {} at {}", session.created_at, store.path().display());
            }
        }

        Commands::Jobs { command } => {
            require_user(None, &api)?;
            run_jobs(command, &api)?;
        }

        Commands::Search {
            query,
            location,
            remote,
            level,
            max,
            save,
        } => {
            require_user(None, &api)?;
            let request = SearchRequest {
                location,
                remote_only: remote,
                experience_level: level,
                max_results: max,
                ..SearchRequest::new(query)
            };
            let response = api.search_jobs(&request).context("Failed to search jobs")?;
            if response.jobs.is_empty() {
                println!("No jobs found.");
                return Ok(());
            }

            let tracked = api.list_jobs().context("Failed to load jobs")?;
            println!("Found {} job(s).\n", response.count);
            println!(
                "{:<4} {:<32} {:<20} {:<18} {:<7} {:<12} {:<24}",
                "#", "TITLE", "COMPANY", "LOCATION", "REMOTE", "SOURCE", "TAGS"
            );
            println!("{}", "-".repeat(122));
            for (i, result) in response.jobs.iter().enumerate() {
                println!("{}", search_row(i + 1, result, inbox::already_saved(result, &tracked)));
            }

            if let Some(selection) = save {
                let picked = inbox::select_results(&response.jobs, &selection)?;
                let (fresh, skipped): (Vec<_>, Vec<_>) = picked
                    .into_iter()
                    .partition(|result| !inbox::already_saved(result, &tracked));
                if fresh.is_empty() {
                    println!("\nNothing new to save.");
                } else {
                    let jobs: Vec<NewJob> = fresh.iter().map(|r| r.to_new_job()).collect();
                    let saved = api.bulk_save(&jobs).context("Failed to save jobs")?;
                    if saved.message.is_empty() {
                        println!("\nSaved {} job(s) to your inbox.", saved.count);
                    } else {
                        println!("\n{}", saved.message);
                    }
                }
                if !skipped.is_empty() {
                    println!("Skipped {} already tracked.", skipped.len());
                }
            }
        }

        Commands::Board => {
            require_user(None, &api)?;
            tui::run_board(&api)?;
        }

        Commands::Today => {
            let user = require_user(None, &api)?;
            show_today(&api, &user)?;
        }

        Commands::Task { command } => {
            require_user(None, &api)?;
            match command {
                TaskCommands::Add {
                    task_type,
                    description,
                    job,
                    date,
                } => {
                    let date = date.unwrap_or_else(|| Local::now().date_naive());
                    let task = NewTask {
                        task_type,
                        description,
                        job_id: job,
                    };
                    let created = api
                        .create_task(&task, &date.format("%Y-%m-%d").to_string())
                        .context("Failed to add task")?;
                    println!("Task added ({}).", created.task_id);
                }

                TaskCommands::Done { id } => {
                    api.set_task_completed(&id, true).context("Failed to update task")?;
                    println!("Task completed.");
                }

                TaskCommands::Undo { id } => {
                    api.set_task_completed(&id, false).context("Failed to update task")?;
                    println!("Task reopened.");
                }

                TaskCommands::Delete { id } => {
                    api.delete_task(&id).context("Failed to delete task")?;
                    println!("Task deleted.");
                }
            }
        }

        Commands::Reminder { command } => {
            require_user(None, &api)?;
            match command {
                ReminderCommands::List { all } => {
                    let all_reminders = api.reminders().context("Failed to load reminders")?;
                    let shown = if all {
                        reminders::open_reminders(&all_reminders)
                    } else {
                        reminders::todays_reminders(&all_reminders, Local::now().date_naive())
                    };
                    if shown.is_empty() {
                        println!("No reminders.");
                    } else {
                        let jobs = api.list_jobs().context("Failed to load jobs")?;
                        println!("{:<20} {:<14} {:<24} {:<30}", "ID", "DATE", "JOB", "MESSAGE");
                        println!("{}", "-".repeat(90));
                        for reminder in shown {
                            let job = jobs
                                .iter()
                                .find(|j| j.job_id == reminder.job_id)
                                .map(|j| j.title.as_str())
                                .unwrap_or("-");
                            println!(
                                "{:<20} {:<14} {:<24} {:<30}",
                                truncate(&reminder.reminder_id, 18),
                                format_date(&reminder.reminder_date),
                                truncate(job, 22),
                                truncate(&reminder.message, 40)
                            );
                        }
                    }
                }

                ReminderCommands::Add { job, date, message } => {
                    let reminder = NewReminder {
                        job_id: job,
                        reminder_date: parse_reminder_date(&date)?,
                        message,
                    };
                    let created = api.create_reminder(&reminder).context("Failed to add reminder")?;
                    println!(
                        "Reminder set for {} ({}).",
                        format_date(&created.reminder_date),
                        created.reminder_id
                    );
                }

                ReminderCommands::Done { id } => {
                    api.set_reminder_completed(&id, true)
                        .context("Failed to update reminder")?;
                    println!("Reminder completed.");
                }

                ReminderCommands::Delete { id } => {
                    api.delete_reminder(&id).context("Failed to delete reminder")?;
                    println!("Reminder deleted.");
                }
            }
        }

        Commands::Goals { command } => {
            require_user(None, &api)?;
            let goals = match command.unwrap_or(GoalsCommands::Show) {
                GoalsCommands::Show => api.goals().context("Failed to load goals")?,
                GoalsCommands::Set {
                    applications,
                    networking,
                    skills,
                } => {
                    let update = GoalsUpdate {
                        applications_per_day: applications,
                        networking_per_day: networking,
                        skills_per_day: skills,
                    };
                    let goals = api.update_goals(&update).context("Failed to update goals")?;
                    println!("Goals updated.");
                    goals
                }
            };
            println!("Daily goals:");
            for task_type in TaskType::ALL {
                println!("  {:<16} {}", task_type.label(), goals.target(task_type));
            }
        }

        Commands::Ai { command } => {
            require_user(None, &api)?;
            match command {
                AiCommands::Analyze { job, resume } => {
                    let job = api.get_job(&job).context("Failed to load job")?;
                    let resume = read_resume(resume.as_ref())?;
                    let analysis = ai::analyze_job(&api, &api, &job, resume.as_deref())?;
                    println!("{} at {}", job.title, job.company);
                    print_analysis(&analysis);
                }

                AiCommands::CoverLetter { job, resume } => {
                    let job = api.get_job(&job).context("Failed to load job")?;
                    let resume = read_resume(resume.as_ref())?;
                    let letter = ai::cover_letter(&api, &job, resume.as_deref())?;
                    println!("{}", letter);
                }

                AiCommands::Email { job, kind, to } => {
                    let job = api.get_job(&job).context("Failed to load job")?;
                    let email = ai::email_draft(&api, &job, kind, to.as_deref())?;
                    println!("{}", email);
                }
            }
        }
    }

    Ok(())
}

/// Runs the auth gate; a redirect becomes an error carrying the login hint.
fn require_user(nav_state: Option<User>, api: &ApiClient) -> Result<User> {
    match AuthGate::resolve(nav_state, api) {
        AuthState::Authenticated(user) => Ok(user),
        AuthState::Redirect(_) => Err(ApiError::Unauthorized.into()),
    }
}

fn run_jobs(command: JobCommands, api: &ApiClient) -> Result<()> {
    match command {
        JobCommands::List { status, all, query } => {
            let jobs = api.list_jobs().context("Failed to load jobs")?;
            let query = query.unwrap_or_default();
            let shown: Vec<&Job> = match (status, all) {
                (Some(status), _) => jobs
                    .iter()
                    .filter(|j| j.status == status && inbox::matches_query(j, &query))
                    .collect(),
                (None, true) => jobs.iter().filter(|j| inbox::matches_query(j, &query)).collect(),
                (None, false) => inbox::inbox_filter(&jobs, &query),
            };
            if shown.is_empty() {
                println!("No jobs found.");
            } else {
                print_jobs(&shown);
            }
        }

        JobCommands::Add {
            title,
            company,
            location,
            salary,
            source,
            url,
            description,
        } => {
            let job = NewJob {
                location,
                salary_range: salary,
                source,
                job_url: url,
                description,
                ..NewJob::new(title, company)
            };
            let created = api.create_job(&job).context("Failed to add job")?;
            println!("Job added to {} ({}).", created.status.label(), created.job_id);
        }

        JobCommands::Show { id } => {
            let job = api.get_job(&id).context("Failed to load job")?;
            print_job(&job);
            let all_reminders = api.reminders().context("Failed to load reminders")?;
            let open: Vec<_> = reminders::open_reminders(&all_reminders)
                .into_iter()
                .filter(|r| r.job_id == job.job_id)
                .collect();
            if !open.is_empty() {
                println!("\n--- Reminders ---");
                for reminder in open {
                    println!("  {}  {} ({})", format_date(&reminder.reminder_date), reminder.message, reminder.reminder_id);
                }
            }
        }

        JobCommands::Edit {
            id,
            title,
            company,
            location,
            salary,
            source,
            url,
            description,
            contact,
        } => {
            let update = JobUpdate {
                title,
                company,
                location,
                salary_range: salary,
                source,
                job_url: url,
                description,
                contact_person: contact,
                ..Default::default()
            };
            if update.is_empty() {
                return Err(anyhow!("Nothing to update. Pass at least one field, e.g. --title"));
            }
            api.update_job(&id, &update).context("Failed to update job")?;
            println!("Job updated.");
        }

        JobCommands::Delete { id } => {
            api.delete_job(&id).context("Failed to delete job")?;
            println!("Job deleted.");
        }

        JobCommands::Move { id, status } => {
            let job = api.get_job(&id).context("Failed to load job")?;
            let mut board = Board::new(vec![job]);
            match board.move_job(&id, status.as_str(), api) {
                DropOutcome::Ignored => println!("Already in {}.", status.label()),
                DropOutcome::Reverted { job_id, to, error } => {
                    return Err(anyhow::Error::new(error)
                        .context(format!("Failed to move {} to {}", job_id, to.label())));
                }
                DropOutcome::Moved { from, to, .. } => {
                    println!("Moved from {} to {}.", from.label(), to.label());
                }
            }
        }

        JobCommands::Notes { id, text } => {
            let update = JobUpdate {
                notes: Some(text),
                ..Default::default()
            };
            api.update_job(&id, &update).context("Failed to save notes")?;
            println!("Notes saved.");
        }
    }
    Ok(())
}

fn search_row(number: usize, result: &SearchResult, tracked: bool) -> String {
    format!(
        "{:<4} {:<32} {:<20} {:<18} {:<7} {:<12} {:<24}{}",
        number,
        truncate(&result.title, 30),
        truncate(&result.company, 18),
        truncate(result.location.as_deref().unwrap_or("-"), 16),
        if result.is_remote { "yes" } else { "-" },
        truncate(result.source.as_deref().unwrap_or("-"), 12),
        truncate(&result.tags.join(", "), 24),
        if tracked { " (saved)" } else { "" }
    )
}

fn print_jobs(jobs: &[&Job]) {
    println!("{:<18} {:<10} {:<30} {:<20} {:<16} {:<12}", "ID", "STATUS", "TITLE", "COMPANY", "LOCATION", "ADDED");
    println!("{}", "-".repeat(110));
    let now = Utc::now();
    for job in jobs {
        let added = job
            .date_added
            .as_ref()
            .map(|d| relative_date(d, now))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "{:<18} {:<10} {:<30} {:<20} {:<16} {:<12}",
            truncate(&job.job_id, 18),
            job.status.as_str(),
            truncate(&job.title, 28),
            truncate(&job.company, 18),
            truncate(job.location.as_deref().unwrap_or("-"), 14),
            added
        );
    }
}

fn print_job(job: &Job) {
    println!("{}", job.title);
    println!("Company: {}", job.company);
    println!("Status: {}", job.status.label());
    if let Some(location) = &job.location {
        println!("Location: {}", location);
    }
    if let Some(salary) = &job.salary_range {
        println!("Salary: {}", salary);
    }
    if let Some(source) = &job.source {
        println!("Source: {}", source);
    }
    if let Some(url) = &job.job_url {
        println!("URL: {}", url);
    }
    if let Some(contact) = &job.contact_person {
        println!("Contact: {}", contact);
    }
    if let Some(added) = &job.date_added {
        println!("Added: {}", format_date(added));
    }
    if let Some(applied) = &job.applied_date {
        println!("Applied: {}", format_date(applied));
    }
    if let Some(interview) = &job.interview_date {
        println!("Interview: {}", format_date(interview));
    }
    if let Some(notes) = job.notes.as_deref().filter(|n| !n.is_empty()) {
        println!("\n--- Notes ---\n{}", notes);
    }
    if let Some(description) = job.description.as_deref().filter(|d| !d.trim().is_empty()) {
        println!("\n--- Description ---\n{}", textwrap::fill(description, 80));
    }
    if let Some(analysis) = ai::stored_analysis(job) {
        println!("\n--- AI Analysis ---");
        print_analysis(&analysis);
    }
}

fn print_analysis(analysis: &models::Analysis) {
    println!("Match score: {}%", analysis.match_score);
    if !analysis.keywords.is_empty() {
        println!("Keywords: {}", analysis.keywords.join(", "));
    }
    for point in &analysis.summary {
        println!("  - {}", point);
    }
}

fn show_today(api: &ApiClient, user: &User) -> Result<()> {
    let today = Local::now().date_naive();
    let tasks = api
        .tasks_for(&today.format("%Y-%m-%d").to_string())
        .context("Failed to load tasks")?;
    let goals = api.goals().context("Failed to load goals")?;
    let all_reminders = api.reminders().context("Failed to load reminders")?;
    let jobs = api.list_jobs().context("Failed to load jobs")?;

    let first_name = user.name.split_whitespace().next().unwrap_or(&user.name);
    println!("Welcome back, {}!", first_name);
    println!("{}\n", today.format("%A, %B %-d, %Y"));

    let summary = DailySummary::new(&tasks, &goals);
    println!("{} {:.0}%  {}", progress_bar(summary.progress, 30), summary.progress, summary.headline());
    for category in &summary.categories {
        println!(
            "  {} {:<16} {}/{}",
            checkbox(category.met()),
            category.task_type.label(),
            category.completed,
            category.target
        );
    }

    if !tasks.is_empty() {
        println!("\nTasks:");
        for task in &tasks {
            println!(
                "  {} {:<12} {} ({})",
                checkbox(task.completed),
                task.task_type.as_str(),
                task.description,
                task.task_id
            );
        }
    }

    let due = reminders::todays_reminders(&all_reminders, today);
    if !due.is_empty() {
        println!("\nReminders for today:");
        for reminder in due {
            println!("  - {} ({})", reminder.message, reminder.reminder_id);
        }
    }

    println!("\nPipeline:");
    for (status, column) in board::group_by_status(&jobs, &JobStatus::ALL) {
        println!("  {:<10} {}", status.label(), column.len());
    }
    Ok(())
}

fn read_resume(path: Option<&PathBuf>) -> Result<Option<String>> {
    path.map(|p| {
        std::fs::read_to_string(p).with_context(|| format!("Failed to read resume file: {}", p.display()))
    })
    .transpose()
}

/// A bare date means 9:00 local time on that day.
fn parse_reminder_date(raw: &str) -> Result<DateTime<Utc>> {
    if let Ok(day) = NaiveDate::parse_from_str(raw, "%Y-%m-%d") {
        let at = day
            .and_hms_opt(9, 0, 0)
            .ok_or_else(|| anyhow!("Invalid date: {}", raw))?;
        return Local
            .from_local_datetime(&at)
            .earliest()
            .map(|dt| dt.with_timezone(&Utc))
            .ok_or_else(|| anyhow!("Invalid local time on {}", raw));
    }
    flexible_datetime::parse(raw)
        .ok_or_else(|| anyhow!("Invalid date '{}' (expected YYYY-MM-DD or an RFC 3339 timestamp)", raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parses() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_move_parses_status() {
        let cli = Cli::try_parse_from(["jobtrail", "jobs", "move", "job_1", "to-apply"]).unwrap();
        match cli.command {
            Commands::Jobs {
                command: JobCommands::Move { id, status },
            } => {
                assert_eq!(id, "job_1");
                assert_eq!(status, JobStatus::ToApply);
            }
            _ => panic!("expected jobs move"),
        }
        assert!(Cli::try_parse_from(["jobtrail", "jobs", "move", "job_1", "archived"]).is_err());
    }

    #[test]
    fn test_email_kind_flag() {
        let cli = Cli::try_parse_from(["jobtrail", "ai", "email", "job_1", "--kind", "follow-up"]).unwrap();
        assert!(matches!(
            cli.command,
            Commands::Ai {
                command: AiCommands::Email {
                    kind: EmailKind::FollowUp,
                    ..
                }
            }
        ));
    }

    #[test]
    fn test_search_row_shows_remote_and_tags() {
        let result: SearchResult = serde_json::from_value(serde_json::json!({
            "title": "Rust Engineer",
            "company": "Ferris",
            "source": "RemoteOK",
            "tags": ["rust", "backend"],
            "is_remote": true
        }))
        .unwrap();
        let row = search_row(2, &result, true);
        assert!(row.starts_with("2    Rust Engineer"));
        assert!(row.contains(" yes "));
        assert!(row.contains("rust, backend"));
        assert!(row.ends_with(" (saved)"));

        let onsite = SearchResult { is_remote: false, tags: Vec::new(), ..result };
        let row = search_row(1, &onsite, false);
        assert!(!row.contains(" yes "));
        assert!(!row.contains("(saved)"));
    }

    #[test]
    fn test_reminder_date_is_local_day() {
        let at = parse_reminder_date("2024-06-03").unwrap();
        assert_eq!(
            at.with_timezone(&Local).date_naive(),
            NaiveDate::from_ymd_opt(2024, 6, 3).unwrap()
        );
        assert!(parse_reminder_date("2024-06-03T10:00:00Z").is_ok());
        assert!(parse_reminder_date("next tuesday").is_err());
    }
}

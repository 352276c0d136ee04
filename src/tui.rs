use anyhow::{Context, Result};
use chrono::Utc;
use crossterm::{
    event::{self, Event, KeyCode, KeyEventKind},
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    ExecutableCommand,
};
use ratatui::{
    prelude::*,
    widgets::{Block, Borders, List, ListItem, ListState, Paragraph, Wrap},
};
use std::io::stdout;

use crate::api::ApiClient;
use crate::board::{Board, DropOutcome, JobUpdater};
use crate::display::{relative_date, truncate};
use crate::models::{Job, JobStatus};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Action {
    Continue,
    Reload,
    Quit,
}

struct Notice {
    text: String,
    error: bool,
}

struct BoardView {
    board: Board,
    column: usize,
    row: usize,
    notice: Option<Notice>,
}

impl BoardView {
    fn new(board: Board) -> Self {
        Self {
            board,
            column: 0,
            row: 0,
            notice: None,
        }
    }

    fn focused_status(&self) -> JobStatus {
        JobStatus::ALL[self.column]
    }

    fn selected_job(&self) -> Option<&Job> {
        self.board.column(self.focused_status()).get(self.row).copied()
    }

    fn clamp_row(&mut self) {
        let len = self.board.column(self.focused_status()).len();
        self.row = self.row.min(len.saturating_sub(1));
    }

    fn left(&mut self) {
        if self.column > 0 {
            self.column -= 1;
            self.clamp_row();
        }
    }

    fn right(&mut self) {
        if self.column < JobStatus::ALL.len() - 1 {
            self.column += 1;
            self.clamp_row();
        }
    }

    fn next(&mut self) {
        let len = self.board.column(self.focused_status()).len();
        if len > 0 && self.row < len - 1 {
            self.row += 1;
        }
    }

    fn prev(&mut self) {
        self.row = self.row.saturating_sub(1);
    }

    /// Grabs the selected card, or drops the grabbed one on the focused column.
    fn grab_or_drop(&mut self, updater: &dyn JobUpdater) {
        if self.board.active().is_none() {
            if let Some(id) = self.selected_job().map(|job| job.job_id.clone()) {
                self.board.begin_drag(&id);
                self.notice = None;
            }
            return;
        }

        let target = self.focused_status();
        let outcome = self.board.drop_on(Some(target.as_str()), updater);
        if let DropOutcome::Moved { job_id, .. } = &outcome {
            let column = self.board.column(target);
            self.row = column.iter().position(|job| &job.job_id == job_id).unwrap_or(0);
        }
        self.clamp_row();
        self.notice = outcome.notification().map(|text| Notice {
            error: matches!(outcome, DropOutcome::Reverted { .. }),
            text,
        });
    }

    fn handle_key(&mut self, code: KeyCode, updater: &dyn JobUpdater) -> Action {
        match code {
            KeyCode::Char('q') => return Action::Quit,
            KeyCode::Esc => {
                if self.board.active().is_some() {
                    self.board.cancel_drag();
                } else {
                    return Action::Quit;
                }
            }
            KeyCode::Left | KeyCode::Char('h') => self.left(),
            KeyCode::Right | KeyCode::Char('l') => self.right(),
            KeyCode::Down | KeyCode::Char('j') => self.next(),
            KeyCode::Up | KeyCode::Char('k') => self.prev(),
            KeyCode::Char(' ') | KeyCode::Enter => self.grab_or_drop(updater),
            KeyCode::Char('r') if self.board.active().is_none() => return Action::Reload,
            _ => {}
        }
        Action::Continue
    }
}

pub fn run_board(api: &ApiClient) -> Result<()> {
    let jobs = api.list_jobs().context("Failed to load jobs")?;
    let mut view = BoardView::new(Board::new(jobs));

    // Setup terminal
    enable_raw_mode()?;
    stdout().execute(EnterAlternateScreen)?;
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;

    let result = run_loop(&mut terminal, &mut view, api);

    // Restore terminal
    disable_raw_mode()?;
    stdout().execute(LeaveAlternateScreen)?;

    result
}

fn run_loop(
    terminal: &mut Terminal<CrosstermBackend<std::io::Stdout>>,
    view: &mut BoardView,
    api: &ApiClient,
) -> Result<()> {
    loop {
        terminal.draw(|frame| draw(frame, view))?;

        if let Event::Key(key) = event::read()? {
            if key.kind != KeyEventKind::Press {
                continue;
            }
            if view.board.active().is_some() && matches!(key.code, KeyCode::Char(' ') | KeyCode::Enter) {
                view.notice = Some(Notice {
                    text: "Updating...".to_string(),
                    error: false,
                });
                terminal.draw(|frame| draw(frame, view))?;
            }
            match view.handle_key(key.code, api) {
                Action::Quit => break,
                Action::Reload => match api.list_jobs() {
                    Ok(jobs) => {
                        view.board = Board::new(jobs);
                        view.clamp_row();
                        view.notice = None;
                    }
                    Err(e) => {
                        view.notice = Some(Notice {
                            text: format!("Failed to load jobs: {}", e),
                            error: true,
                        });
                    }
                },
                Action::Continue => {}
            }
        }
    }
    Ok(())
}

fn status_color(status: JobStatus) -> Color {
    match status {
        JobStatus::Saved => Color::Rgb(0xA8, 0xA2, 0x9E),
        JobStatus::ToApply => Color::Rgb(0xD9, 0x77, 0x06),
        JobStatus::Applied => Color::Rgb(0x0F, 0x76, 0x6E),
        JobStatus::Interview => Color::Rgb(0x7C, 0x3A, 0xED),
        JobStatus::Offer => Color::Rgb(0x05, 0x96, 0x69),
        JobStatus::Rejected => Color::Rgb(0xDC, 0x26, 0x26),
    }
}

fn draw(frame: &mut Frame, view: &BoardView) {
    let rows = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(8), Constraint::Length(1)])
        .split(frame.area());

    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Ratio(1, 6); 6])
        .split(rows[0]);

    let dragging = view.board.active();

    for (i, (status, jobs)) in view.board.columns().into_iter().enumerate() {
        let focused = i == view.column;
        let color = status_color(status);
        let width = (columns[i].width as usize).saturating_sub(4);

        let mut title = format!(" {} ({}) ", status.label(), jobs.len());
        if focused && dragging.is_some() {
            title.push_str("<- drop ");
        }
        let border_style = if focused {
            Style::default().fg(color).add_modifier(Modifier::BOLD)
        } else {
            Style::default().fg(Color::DarkGray)
        };
        let block = Block::default()
            .borders(Borders::ALL)
            .border_style(border_style)
            .title(Span::styled(title, Style::default().fg(color)));

        if jobs.is_empty() {
            let empty = Paragraph::new("Drop jobs here")
                .style(Style::default().fg(Color::DarkGray))
                .alignment(Alignment::Center)
                .block(block);
            frame.render_widget(empty, columns[i]);
            continue;
        }

        let items: Vec<ListItem> = jobs
            .iter()
            .map(|job| {
                let grabbed = dragging == Some(job.job_id.as_str());
                let marker = if grabbed { "> " } else { "  " };
                let title_style = if grabbed {
                    Style::default().add_modifier(Modifier::BOLD | Modifier::ITALIC)
                } else {
                    Style::default()
                };
                ListItem::new(vec![
                    Line::from(Span::styled(
                        format!("{}{}", marker, truncate(&job.title, width.saturating_sub(2))),
                        title_style,
                    )),
                    Line::from(Span::styled(
                        format!("  {}", truncate(&job.company, width.saturating_sub(2))),
                        Style::default().fg(Color::DarkGray),
                    )),
                ])
            })
            .collect();

        let list = List::new(items)
            .block(block)
            .highlight_style(Style::default().bg(Color::DarkGray).add_modifier(Modifier::BOLD));

        let mut list_state = ListState::default();
        if focused {
            list_state.select(Some(view.row.min(jobs.len() - 1)));
        }
        frame.render_stateful_widget(list, columns[i], &mut list_state);
    }

    let detail = Paragraph::new(build_detail(view))
        .block(Block::default().borders(Borders::ALL).title(" Detail "))
        .wrap(Wrap { trim: false });
    frame.render_widget(detail, rows[1]);

    let footer = match &view.notice {
        Some(notice) if notice.error => Paragraph::new(format!(" x {}", notice.text)).style(Style::default().fg(Color::Red)),
        Some(notice) => Paragraph::new(format!(" + {}", notice.text)).style(Style::default().fg(Color::Green)),
        None if dragging.is_some() => Paragraph::new(" h/l:choose column  space/enter:drop  esc:cancel")
            .style(Style::default().fg(Color::DarkGray)),
        None => Paragraph::new(" h/l:column  j/k:card  space/enter:grab  r:reload  q:quit")
            .style(Style::default().fg(Color::DarkGray)),
    };
    frame.render_widget(footer, rows[2]);
}

fn build_detail(view: &BoardView) -> Text<'_> {
    let Some(job) = view.board.active_job().or_else(|| view.selected_job()) else {
        return Text::raw("No job selected");
    };

    let mut lines: Vec<Line> = Vec::new();

    lines.push(Line::from(vec![
        Span::styled(job.title.as_str(), Style::default().add_modifier(Modifier::BOLD)),
        Span::raw(format!(" at {}", job.company)),
    ]));

    let mut facts = vec![format!("Status: {}", job.status.label())];
    if let Some(location) = &job.location {
        facts.push(location.clone());
    }
    if let Some(salary) = &job.salary_range {
        facts.push(salary.clone());
    }
    if let Some(added) = &job.date_added {
        facts.push(format!("Added {}", relative_date(added, Utc::now())));
    }
    if let Some(score) = job.ai_match_score {
        facts.push(format!("Match {}%", score));
    }
    lines.push(Line::from(Span::styled(
        facts.join("  |  "),
        Style::default().fg(status_color(job.status)),
    )));

    if let Some(text) = job.description.as_deref().filter(|d| !d.trim().is_empty()) {
        lines.push(Line::from(""));
        for line in textwrap::fill(text, 100).lines().take(4) {
            lines.push(Line::from(line.to_string()));
        }
    }

    Text::from(lines)
}

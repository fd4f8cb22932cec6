use std::collections::HashMap;

use chrono::{DateTime, Local, Utc};
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::components::{body_and_footer, money, render_confirmation, render_help, ListCursor};
use crate::models::{JobListing, JobStatus, PaymentStatus};
use crate::services::jobs;
use crate::services::time_tracker::{format_duration, TimeTracker, TrackerState};

pub struct JobsState {
    jobs: Vec<JobListing>,
    search: String,
    searching: bool,
    cursor: ListCursor,
    /// One stopwatch per job whose timer was opened; several may run at once
    trackers: HashMap<i32, TimeTracker>,
    /// Job shown in the timer panel and toggled by <Space>
    focused: Option<i32>,
    show_delete_confirmation: bool,
}

pub enum JobAction {
    Back,
    NewJob,
    EditJob(i32),
    DeleteJob(i32),
    SetStatus(i32, JobStatus),
    SetPayment(i32, PaymentStatus),
    /// Build the tracker for a job from its stored total
    OpenTracker { job_id: i32, total_seconds: i64 },
    ToggleTimer,
}

impl JobsState {
    pub fn new(jobs: Vec<JobListing>) -> Self {
        let cursor = ListCursor::new(jobs.len());
        Self {
            jobs,
            search: String::new(),
            searching: false,
            cursor,
            trackers: HashMap::new(),
            focused: None,
            show_delete_confirmation: false,
        }
    }

    /// Swap in a refetched list, keeping the trackers whose jobs still exist.
    pub fn replace_jobs(&mut self, jobs: Vec<JobListing>) {
        self.jobs = jobs;
        let jobs = &self.jobs;
        self.trackers
            .retain(|id, _| jobs.iter().any(|j| j.job.id == *id));
        if self.focused.is_some_and(|id| !self.trackers.contains_key(&id)) {
            self.focused = None;
        }
        let len = self.visible().len();
        self.cursor.clamp(len);
    }

    pub fn visible(&self) -> Vec<&JobListing> {
        jobs::filter(&self.jobs, &self.search)
    }

    pub fn selected_job(&self) -> Option<&JobListing> {
        let visible = self.visible();
        self.cursor.selected().and_then(|i| visible.get(i).copied())
    }

    /// Tracker shown in the timer panel
    pub fn tracker(&self) -> Option<&TimeTracker> {
        self.focused.and_then(|id| self.trackers.get(&id))
    }

    pub fn tracker_mut(&mut self) -> Option<&mut TimeTracker> {
        self.focused.and_then(|id| self.trackers.get_mut(&id))
    }

    /// Add or refresh a job's tracker and show it in the timer panel.
    pub fn set_tracker(&mut self, tracker: TimeTracker) {
        self.focused = Some(tracker.job_id());
        self.insert_tracker(tracker);
    }

    /// Add or refresh a job's tracker without moving the panel.
    pub fn insert_tracker(&mut self, tracker: TimeTracker) {
        self.trackers.insert(tracker.job_id(), tracker);
    }

    pub fn tracked_jobs(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self.trackers.keys().copied().collect();
        ids.sort_unstable();
        ids
    }

    /// Jobs with a session currently open, in id order
    pub fn running_jobs(&self) -> Vec<i32> {
        let mut ids: Vec<i32> = self
            .trackers
            .values()
            .filter(|t| t.is_running())
            .map(|t| t.job_id())
            .collect();
        ids.sort_unstable();
        ids
    }

    pub fn tick(&mut self, now: DateTime<Utc>) {
        for tracker in self.trackers.values_mut() {
            tracker.tick(now);
        }
    }

    fn job_mut(&mut self, id: i32) -> Option<&mut JobListing> {
        self.jobs.iter_mut().find(|j| j.job.id == id)
    }

    pub fn set_status(&mut self, id: i32, status: JobStatus) {
        if let Some(listing) = self.job_mut(id) {
            listing.job.status = status;
        }
    }

    pub fn set_payment(&mut self, id: i32, status: PaymentStatus) {
        if let Some(listing) = self.job_mut(id) {
            listing.job.payment_status = status;
        }
    }

    pub fn set_total(&mut self, id: i32, total_seconds: i64) {
        if let Some(listing) = self.job_mut(id) {
            listing.job.total_seconds = total_seconds;
        }
    }

    pub fn remove(&mut self, id: i32) {
        self.jobs.retain(|j| j.job.id != id);
        self.trackers.remove(&id);
        if self.focused == Some(id) {
            self.focused = None;
        }
        let len = self.visible().len();
        self.cursor.clamp(len);
    }

    fn set_search(&mut self, search: String) {
        self.search = search;
        let len = self.visible().len();
        self.cursor.reset(len);
    }

    fn elapsed_for(&self, listing: &JobListing) -> String {
        match self.trackers.get(&listing.job.id) {
            Some(tracker) if tracker.is_running() => format!("{} *", tracker.display()),
            Some(tracker) => tracker.display(),
            None => format_duration(listing.job.total_seconds),
        }
    }
}

pub fn render_jobs<B: Backend>(frame: &mut Frame<B>, state: &mut JobsState) {
    let (body, footer) = body_and_footer(frame.size());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(1),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(body);

    let search = Paragraph::new(format!(
        "{}{}",
        state.search,
        if state.searching { "|" } else { "" }
    ))
    .style(if state.searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    })
    .block(Block::default().title("Search").borders(Borders::ALL));
    frame.render_widget(search, chunks[0]);

    let items: Vec<ListItem> = state
        .visible()
        .into_iter()
        .map(|listing| {
            let job = &listing.job;
            let payment_style = match job.payment_status {
                PaymentStatus::Paid => Style::default().fg(Color::Green),
                PaymentStatus::Pending => Style::default().fg(Color::Yellow),
            };
            ListItem::new(Spans::from(vec![
                Span::styled(
                    format!("{:<28}", job.title),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(
                    " {:<20} {:>14} x{:<3} {:<12} ",
                    listing.client_name.as_deref().unwrap_or("-"),
                    money(job.value),
                    job.quantity,
                    job.status.label()
                )),
                Span::styled(format!("{:<8}", job.payment_status.as_str()), payment_style),
                Span::raw(format!(" {}", state.elapsed_for(listing))),
            ]))
        })
        .collect();

    let jobs_list = List::new(items)
        .block(
            Block::default()
                .title(format!("Jobs ({})", state.jobs.len()))
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(jobs_list, chunks[1], &mut state.cursor.state);

    let others_running = state
        .running_jobs()
        .into_iter()
        .filter(|id| Some(*id) != state.focused)
        .count();
    let mut tracker_line = match state.tracker() {
        Some(tracker) => {
            let title = state
                .jobs
                .iter()
                .find(|j| j.job.id == tracker.job_id())
                .map(|j| j.job.title.as_str())
                .unwrap_or_default();
            let (label, color) = match tracker.state() {
                TrackerState::Running { started_at } => (
                    format!(
                        "RUNNING since {}",
                        started_at.with_timezone(&Local).format("%H:%M")
                    ),
                    Color::Green,
                ),
                TrackerState::Stopped => ("stopped".to_string(), Color::Gray),
            };
            vec![
                Span::raw(format!("{}  ", title)),
                Span::styled(
                    tracker.display(),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::styled(format!("  {}", label), Style::default().fg(color)),
            ]
        }
        None => vec![Span::raw("<T> on a job opens its timer")],
    };
    if others_running > 0 {
        tracker_line.push(Span::styled(
            format!("  (+{} more running)", others_running),
            Style::default().fg(Color::Yellow),
        ));
    }
    let tracker_line = Spans::from(tracker_line);
    frame.render_widget(
        Paragraph::new(tracker_line).block(Block::default().title("Timer").borders(Borders::ALL)),
        chunks[2],
    );

    let help = if state.searching {
        "Type to filter | <Enter>/<Esc> Done"
    } else {
        "<N> New | <E> Edit | <D> Delete | <S> Status | <P> Paid | <T> Timer | <Space> Start/Stop | </> Search | <Esc> Back"
    };
    render_help(frame, footer, help);

    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            "Confirm Delete",
            &[
                "Are you sure you want to delete this job?",
                "Its time tracking history is deleted too.",
            ],
        );
    }
}

pub fn handle_input(state: &mut JobsState, key: KeyEvent) -> Option<JobAction> {
    if state.searching {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => state.searching = false,
            KeyCode::Backspace => {
                let mut search = state.search.clone();
                search.pop();
                state.set_search(search);
            }
            KeyCode::Char(c) => {
                let search = format!("{}{}", state.search, c);
                state.set_search(search);
            }
            _ => {}
        }
        return None;
    }

    if state.show_delete_confirmation {
        match key.code {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                let id = state.selected_job()?.job.id;
                state.remove(id);
                return Some(JobAction::DeleteJob(id));
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    let len = state.visible().len();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(JobAction::Back),
        KeyCode::Char('n') => return Some(JobAction::NewJob),
        KeyCode::Char('e') | KeyCode::Enter => {
            return state.selected_job().map(|j| JobAction::EditJob(j.job.id))
        }
        KeyCode::Char('d') => {
            if state.selected_job().is_some() {
                state.show_delete_confirmation = true;
            }
        }
        KeyCode::Char('s') => {
            let (id, status) = state.selected_job().map(|j| (j.job.id, j.job.status.next()))?;
            state.set_status(id, status);
            return Some(JobAction::SetStatus(id, status));
        }
        KeyCode::Char('p') => {
            let (id, status) = state
                .selected_job()
                .map(|j| (j.job.id, j.job.payment_status.toggled()))?;
            state.set_payment(id, status);
            return Some(JobAction::SetPayment(id, status));
        }
        KeyCode::Char('t') => {
            let (job_id, total_seconds) = state
                .selected_job()
                .map(|j| (j.job.id, j.job.total_seconds))?;
            if state.trackers.contains_key(&job_id) {
                state.focused = Some(job_id);
                return None;
            }
            return Some(JobAction::OpenTracker {
                job_id,
                total_seconds,
            });
        }
        KeyCode::Char(' ') => {
            if state.tracker().is_some() {
                return Some(JobAction::ToggleTimer);
            }
        }
        KeyCode::Char('/') => state.searching = true,
        KeyCode::Down => state.cursor.next(len),
        KeyCode::Up => state.cursor.previous(len),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Job;
    use crossterm::event::KeyModifiers;

    fn listing(id: i32, title: &str, client: Option<&str>) -> JobListing {
        let mut job = Job::new();
        job.id = id;
        job.title = title.to_string();
        JobListing {
            job,
            client_name: client.map(str::to_string),
        }
    }

    fn press(state: &mut JobsState, code: KeyCode) -> Option<JobAction> {
        handle_input(state, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn status_and_payment_update_locally() {
        let mut state = JobsState::new(vec![listing(3, "Retouch", Some("Foto Sul"))]);

        match press(&mut state, KeyCode::Char('s')) {
            Some(JobAction::SetStatus(3, JobStatus::Done)) => {}
            _ => panic!("expected a status change"),
        }
        assert_eq!(state.selected_job().unwrap().job.status, JobStatus::Done);

        match press(&mut state, KeyCode::Char('p')) {
            Some(JobAction::SetPayment(3, PaymentStatus::Paid)) => {}
            _ => panic!("expected a payment toggle"),
        }
        assert_eq!(
            state.selected_job().unwrap().job.payment_status,
            PaymentStatus::Paid
        );
    }

    #[test]
    fn search_matches_client_names() {
        let mut state = JobsState::new(vec![
            listing(1, "Album", Some("Casa Norte")),
            listing(2, "Retouch", Some("Foto Sul")),
        ]);
        press(&mut state, KeyCode::Char('/'));
        for c in "sul".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        assert_eq!(state.selected_job().unwrap().job.id, 2);
    }

    #[tokio::test]
    async fn every_running_tracker_ticks_and_survives_a_refetch() {
        use crate::db::{MemoryStore, Store};
        use chrono::{Duration, Local, TimeZone};

        let store = MemoryStore::new();
        let today = Local::now().date_naive();
        let mut ids = Vec::new();
        for title in ["Album", "Retouch"] {
            let mut job = Job::new();
            job.title = title.to_string();
            ids.push(store.save_job(&job, today).await.unwrap());
        }
        let mut state = JobsState::new(store.load_jobs().await.unwrap());

        let t0 = Utc.with_ymd_and_hms(2026, 3, 2, 9, 0, 0).unwrap();
        for id in &ids {
            let mut tracker = TimeTracker::load(&store, *id, 0).await.unwrap();
            tracker.start(&store, t0).await.unwrap();
            state.set_tracker(tracker);
        }
        state.tick(t0 + Duration::seconds(90));
        for id in &ids {
            assert_eq!(state.trackers[id].displayed_seconds(), 90);
        }
        assert_eq!(state.tracker().map(|t| t.job_id()), Some(ids[1]));

        state.replace_jobs(store.load_jobs().await.unwrap());
        assert_eq!(state.running_jobs(), ids);

        // A job deleted elsewhere takes its tracker and the panel with it
        store.delete_job(ids[1]).await.unwrap();
        state.replace_jobs(store.load_jobs().await.unwrap());
        assert_eq!(state.tracked_jobs(), vec![ids[0]]);
        assert!(state.tracker().is_none());
    }

    #[test]
    fn timer_key_needs_an_open_tracker() {
        let mut state = JobsState::new(vec![listing(1, "Album", None)]);
        assert!(press(&mut state, KeyCode::Char(' ')).is_none());
        assert!(matches!(
            press(&mut state, KeyCode::Char('t')),
            Some(JobAction::OpenTracker { job_id: 1, total_seconds: 0 })
        ));
    }
}

use chrono::{DateTime, Utc};
use tracing::{debug, info};

use crate::db::Store;
use crate::error::StudioResult;
use crate::models::TimeSession;

/// Whole seconds between start and end, never negative.
pub fn session_duration(started_at: DateTime<Utc>, ended_at: DateTime<Utc>) -> i64 {
    (ended_at - started_at).num_seconds().max(0)
}

/// Sum of the closed sessions' durations. Open sessions count as zero.
pub fn reconcile_total(sessions: &[TimeSession]) -> i64 {
    sessions
        .iter()
        .filter(|s| !s.is_open())
        .filter_map(|s| s.duration_seconds)
        .sum()
}

/// Format seconds as `HH:MM:SS`; hours are not wrapped at 24.
pub fn format_duration(seconds: i64) -> String {
    let seconds = seconds.max(0);
    format!(
        "{:02}:{:02}:{:02}",
        seconds / 3600,
        (seconds % 3600) / 60,
        seconds % 60
    )
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackerState {
    Stopped,
    Running { started_at: DateTime<Utc> },
}

/// Per-job stopwatch backed by the `time_tracking` table
#[derive(Debug, Clone)]
pub struct TimeTracker {
    job_id: i32,
    state: TrackerState,
    displayed_seconds: i64,
    last_tick: Option<DateTime<Utc>>,
}

impl TimeTracker {
    /// Build the tracker for a job, resuming an open session if there is one.
    pub async fn load(store: &dyn Store, job_id: i32, total_seconds: i64) -> StudioResult<Self> {
        let mut tracker = Self {
            job_id,
            state: TrackerState::Stopped,
            displayed_seconds: total_seconds,
            last_tick: None,
        };

        if let Some(open) = store.open_session(job_id).await? {
            debug!(job_id, session_id = open.id, "resuming open session");
            tracker.state = TrackerState::Running {
                started_at: open.started_at,
            };
            tracker.last_tick = Some(Utc::now());
        }

        Ok(tracker)
    }

    pub fn job_id(&self) -> i32 {
        self.job_id
    }

    pub fn state(&self) -> TrackerState {
        self.state
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, TrackerState::Running { .. })
    }

    pub fn displayed_seconds(&self) -> i64 {
        self.displayed_seconds
    }

    pub fn display(&self) -> String {
        format_duration(self.displayed_seconds)
    }

    pub async fn start(&mut self, store: &dyn Store, now: DateTime<Utc>) -> StudioResult<()> {
        let session = store.start_session(self.job_id, now).await?;
        info!(job_id = self.job_id, session_id = session.id, "time tracking started");

        self.state = TrackerState::Running {
            started_at: session.started_at,
        };
        self.last_tick = Some(now);
        Ok(())
    }

    /// Close the open session. Returns the reconciled job total, or `None`
    /// when there was nothing to stop. In that case the session was closed
    /// elsewhere and the display falls back to the closed sessions' sum.
    pub async fn stop(
        &mut self,
        store: &dyn Store,
        now: DateTime<Utc>,
    ) -> StudioResult<Option<i64>> {
        let Some(stopped) = store.stop_session(self.job_id, now).await? else {
            let sessions = store.load_sessions(self.job_id).await?;
            debug!(job_id = self.job_id, "no open session to stop");
            self.state = TrackerState::Stopped;
            self.last_tick = None;
            self.displayed_seconds = reconcile_total(&sessions);
            return Ok(None);
        };

        info!(
            job_id = self.job_id,
            duration = stopped.session.duration_seconds.unwrap_or_default(),
            total = stopped.job_total_seconds,
            "time tracking stopped"
        );

        self.state = TrackerState::Stopped;
        self.last_tick = None;
        self.displayed_seconds = stopped.job_total_seconds;
        Ok(Some(stopped.job_total_seconds))
    }

    /// Advance the displayed counter by one for every whole second since the last tick.
    pub fn tick(&mut self, now: DateTime<Utc>) {
        if !self.is_running() {
            return;
        }
        let Some(last) = self.last_tick else {
            self.last_tick = Some(now);
            return;
        };

        let elapsed = (now - last).num_seconds();
        if elapsed > 0 {
            self.displayed_seconds += elapsed;
            self.last_tick = Some(last + chrono::Duration::seconds(elapsed));
        }
    }
}

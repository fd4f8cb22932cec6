use serde::Serialize;

use super::finance::{self, MonthlyFlow};
use crate::db::Store;
use crate::error::StudioResult;
use crate::models::{EntryKind, EntryStatus, FinanceEntry, JobListing};

const RECENT_JOBS: usize = 5;

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct DashboardStats {
    pub total_clients: i64,
    pub total_jobs: usize,
    /// Paid income
    pub income: f64,
    /// Every expense, paid or not
    pub expenses: f64,
    pub receivable: f64,
    pub tracked_seconds: i64,
}

impl DashboardStats {
    pub fn balance(&self) -> f64 {
        self.income - self.expenses
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct Dashboard {
    pub stats: DashboardStats,
    pub recent_jobs: Vec<JobListing>,
    pub cash_flow: Vec<MonthlyFlow>,
}

pub fn compute_stats(
    total_clients: i64,
    jobs: &[JobListing],
    entries: &[FinanceEntry],
) -> DashboardStats {
    let sum = |pred: &dyn Fn(&FinanceEntry) -> bool| -> f64 {
        entries.iter().filter(|e| pred(e)).map(|e| e.amount).sum()
    };

    DashboardStats {
        total_clients,
        total_jobs: jobs.len(),
        income: sum(&|e| e.kind == EntryKind::Income && e.status == EntryStatus::Paid),
        expenses: sum(&|e| e.kind == EntryKind::Expense),
        receivable: sum(&|e| e.kind == EntryKind::Income && e.status == EntryStatus::Receivable),
        tracked_seconds: jobs.iter().map(|j| j.job.total_seconds).sum(),
    }
}

pub async fn load(store: &dyn Store) -> StudioResult<Dashboard> {
    let total_clients = store.count_clients().await?;
    let jobs = store.load_jobs().await?;
    let entries = store.load_finance().await?;

    Ok(Dashboard {
        stats: compute_stats(total_clients, &jobs, &entries),
        cash_flow: finance::monthly_cash_flow(&entries),
        recent_jobs: jobs.into_iter().take(RECENT_JOBS).collect(),
    })
}

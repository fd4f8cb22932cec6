use chrono::NaiveDate;

use crate::error::{StudioError, StudioResult};
use crate::models::{EntryKind, EntryStatus, FinanceEntry, Job, JobListing, PaymentStatus};

/// Ledger status an entry linked to a job carries for the job's payment status.
pub fn finance_status_for(payment: PaymentStatus) -> EntryStatus {
    match payment {
        PaymentStatus::Paid => EntryStatus::Paid,
        PaymentStatus::Pending => EntryStatus::Receivable,
    }
}

pub fn linked_description(title: &str) -> String {
    format!("Job: {}", title)
}

/// The income entry a job owns in the ledger, as it is first inserted.
pub fn linked_entry(job: &Job, today: NaiveDate) -> FinanceEntry {
    let mut entry = FinanceEntry::new(EntryKind::Income);
    entry.job_id = Some(job.id);
    entry.description = linked_description(&job.title);
    entry.amount = job.value;
    entry.status = finance_status_for(job.payment_status);
    entry.due_date = Some(today);
    entry
}

pub fn validate(job: &Job) -> StudioResult<()> {
    if job.title.trim().is_empty() {
        return Err(StudioError::validation("title is required"));
    }
    if job.value < 0.0 {
        return Err(StudioError::validation("value cannot be negative"));
    }
    if job.quantity < 1 {
        return Err(StudioError::validation("quantity must be at least 1"));
    }
    Ok(())
}

pub fn filter<'a>(jobs: &'a [JobListing], term: &str) -> Vec<&'a JobListing> {
    let term = term.trim();
    jobs.iter()
        .filter(|j| term.is_empty() || j.matches(term))
        .collect()
}

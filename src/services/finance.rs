use std::collections::BTreeMap;
use std::fmt;

use chrono::Datelike;
use serde::Serialize;

use crate::error::{StudioError, StudioResult};
use crate::models::{EntryKind, EntryStatus, FinanceEntry};

/// Kind filter on the finance screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum KindFilter {
    #[default]
    All,
    Income,
    Expense,
}

impl KindFilter {
    pub fn next(&self) -> Self {
        match self {
            KindFilter::All => KindFilter::Income,
            KindFilter::Income => KindFilter::Expense,
            KindFilter::Expense => KindFilter::All,
        }
    }

    fn accepts(&self, kind: EntryKind) -> bool {
        match self {
            KindFilter::All => true,
            KindFilter::Income => kind == EntryKind::Income,
            KindFilter::Expense => kind == EntryKind::Expense,
        }
    }
}

impl fmt::Display for KindFilter {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            KindFilter::All => "All",
            KindFilter::Income => "Income",
            KindFilter::Expense => "Expense",
        };
        f.write_str(label)
    }
}

pub fn filter<'a>(
    entries: &'a [FinanceEntry],
    term: &str,
    kind: KindFilter,
) -> Vec<&'a FinanceEntry> {
    let needle = term.trim().to_lowercase();
    entries
        .iter()
        .filter(|e| kind.accepts(e.kind))
        .filter(|e| {
            needle.is_empty()
                || e.description.to_lowercase().contains(&needle)
                || e
                    .category
                    .as_deref()
                    .is_some_and(|c| c.to_lowercase().contains(&needle))
        })
        .collect()
}

/// Paid totals over a set of entries
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize)]
pub struct Summary {
    pub income: f64,
    pub expenses: f64,
    pub balance: f64,
}

pub fn summarize<'a>(entries: impl IntoIterator<Item = &'a FinanceEntry>) -> Summary {
    let mut summary = Summary::default();
    for entry in entries {
        if entry.status != EntryStatus::Paid {
            continue;
        }
        match entry.kind {
            EntryKind::Income => summary.income += entry.amount,
            EntryKind::Expense => summary.expenses += entry.amount,
        }
    }
    summary.balance = summary.income - summary.expenses;
    summary
}

/// Income and expense sums for one calendar month
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MonthlyFlow {
    pub year: i32,
    pub month: u32,
    pub income: f64,
    pub expenses: f64,
}

impl MonthlyFlow {
    pub fn label(&self) -> String {
        format!("{:02}/{:02}", self.month, self.year % 100)
    }
}

/// Group entries by the month of their due date (creation date when undated), oldest first.
pub fn monthly_cash_flow(entries: &[FinanceEntry]) -> Vec<MonthlyFlow> {
    let mut months: BTreeMap<(i32, u32), (f64, f64)> = BTreeMap::new();
    for entry in entries {
        let date = entry
            .due_date
            .unwrap_or_else(|| entry.created_at.date_naive());
        let slot = months.entry((date.year(), date.month())).or_default();
        match entry.kind {
            EntryKind::Income => slot.0 += entry.amount,
            EntryKind::Expense => slot.1 += entry.amount,
        }
    }

    months
        .into_iter()
        .map(|((year, month), (income, expenses))| MonthlyFlow {
            year,
            month,
            income,
            expenses,
        })
        .collect()
}

pub fn validate(entry: &FinanceEntry) -> StudioResult<()> {
    if entry.description.trim().is_empty() {
        return Err(StudioError::validation("description is required"));
    }
    if entry.amount <= 0.0 {
        return Err(StudioError::validation("amount must be greater than zero"));
    }
    Ok(())
}

/// Switch a draft entry's kind, carrying the open status along with it.
pub fn switch_kind(entry: &mut FinanceEntry) {
    let was_default = entry.status == entry.kind.default_status();
    entry.kind = entry.kind.toggled();
    if was_default {
        entry.status = entry.kind.default_status();
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn entry(kind: EntryKind, amount: f64, status: EntryStatus) -> FinanceEntry {
        let mut e = FinanceEntry::new(kind);
        e.description = format!("{} {}", kind, amount);
        e.amount = amount;
        e.status = status;
        e
    }

    #[test]
    fn summary_counts_only_paid_entries() {
        let entries = vec![
            entry(EntryKind::Income, 1000.0, EntryStatus::Paid),
            entry(EntryKind::Income, 400.0, EntryStatus::Receivable),
            entry(EntryKind::Expense, 250.0, EntryStatus::Paid),
            entry(EntryKind::Expense, 90.0, EntryStatus::Payable),
        ];

        let summary = summarize(&entries);
        assert_eq!(summary.income, 1000.0);
        assert_eq!(summary.expenses, 250.0);
        assert_eq!(summary.balance, 750.0);
    }

    #[test]
    fn filter_combines_text_and_kind() {
        let mut rent = entry(EntryKind::Expense, 1200.0, EntryStatus::Payable);
        rent.description = "Studio rent".to_string();
        let mut gear = entry(EntryKind::Expense, 300.0, EntryStatus::Paid);
        gear.category = Some("Equipment".to_string());
        let job = entry(EntryKind::Income, 800.0, EntryStatus::Paid);
        let entries = vec![rent, gear, job];

        assert_eq!(filter(&entries, "", KindFilter::All).len(), 3);
        assert_eq!(filter(&entries, "", KindFilter::Income).len(), 1);
        assert_eq!(filter(&entries, "RENT", KindFilter::Expense).len(), 1);
        assert_eq!(filter(&entries, "equip", KindFilter::All).len(), 1);
        assert!(filter(&entries, "rent", KindFilter::Income).is_empty());
    }

    #[test]
    fn cash_flow_is_grouped_by_month_in_order() {
        let mut a = entry(EntryKind::Income, 500.0, EntryStatus::Paid);
        a.due_date = NaiveDate::from_ymd_opt(2024, 10, 3);
        let mut b = entry(EntryKind::Expense, 120.0, EntryStatus::Paid);
        b.due_date = NaiveDate::from_ymd_opt(2024, 9, 28);
        let mut c = entry(EntryKind::Income, 50.0, EntryStatus::Receivable);
        c.due_date = NaiveDate::from_ymd_opt(2024, 10, 30);

        let flow = monthly_cash_flow(&[a, b, c]);
        assert_eq!(flow.len(), 2);
        assert_eq!((flow[0].month, flow[0].income, flow[0].expenses), (9, 0.0, 120.0));
        assert_eq!((flow[1].month, flow[1].income, flow[1].expenses), (10, 550.0, 0.0));
        assert_eq!(flow[1].label(), "10/24");
    }

    #[test]
    fn switching_kind_flips_the_default_status() {
        let mut draft = FinanceEntry::new(EntryKind::Income);
        assert_eq!(draft.status, EntryStatus::Receivable);
        switch_kind(&mut draft);
        assert_eq!(draft.kind, EntryKind::Expense);
        assert_eq!(draft.status, EntryStatus::Payable);

        draft.status = EntryStatus::Paid;
        switch_kind(&mut draft);
        assert_eq!(draft.status, EntryStatus::Paid);
    }
}

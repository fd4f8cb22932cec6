use chrono::{DateTime, NaiveDate, Utc};
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryKind {
    Income,
    Expense,
}

text_enum!(EntryKind, "entry kind", {
    Income => "income",
    Expense => "expense",
});

impl EntryKind {
    /// Status a fresh entry of this kind starts with
    pub fn default_status(&self) -> EntryStatus {
        match self {
            EntryKind::Income => EntryStatus::Receivable,
            EntryKind::Expense => EntryStatus::Payable,
        }
    }

    pub fn toggled(&self) -> Self {
        match self {
            EntryKind::Income => EntryKind::Expense,
            EntryKind::Expense => EntryKind::Income,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum EntryStatus {
    Receivable,
    Payable,
    Paid,
}

text_enum!(EntryStatus, "entry status", {
    Receivable => "receivable",
    Payable => "payable",
    Paid => "paid",
});

impl EntryStatus {
    pub fn label(&self) -> &'static str {
        match self {
            EntryStatus::Receivable => "Receivable",
            EntryStatus::Payable => "Payable",
            EntryStatus::Paid => "Paid",
        }
    }
}

#[derive(sqlx::FromRow, Serialize, Debug, Clone)]
pub struct FinanceEntry {
    pub id: i32,
    #[sqlx(try_from = "String")]
    pub kind: EntryKind,
    pub job_id: Option<i32>,
    pub description: String,
    pub amount: f64,
    pub due_date: Option<NaiveDate>,
    pub paid_date: Option<NaiveDate>,
    #[sqlx(try_from = "String")]
    pub status: EntryStatus,
    pub category: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl FinanceEntry {
    pub fn new(kind: EntryKind) -> Self {
        let now = Utc::now();
        Self {
            id: 0,
            kind,
            job_id: None,
            description: String::new(),
            amount: 0.0,
            due_date: None,
            paid_date: None,
            status: kind.default_status(),
            category: None,
            created_at: now,
            updated_at: now,
        }
    }

    /// Flip between the open status for this kind and paid.
    pub fn toggled_status(&self) -> EntryStatus {
        match self.status {
            EntryStatus::Paid => self.kind.default_status(),
            _ => EntryStatus::Paid,
        }
    }

    /// Amount with a leading minus for expenses, as shown in listings.
    pub fn signed_amount(&self) -> f64 {
        match self.kind {
            EntryKind::Income => self.amount,
            EntryKind::Expense => -self.amount,
        }
    }
}

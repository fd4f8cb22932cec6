use crossterm::event::KeyEvent;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::components::form::{form_help, render_form, Field, FormEvent, FormState};
use crate::error::{StudioError, StudioResult};
use crate::models::{EntryKind, EntryStatus, FinanceEntry};
use crate::services::finance;

pub enum FinanceWizardAction {
    Cancel,
    Save(FinanceEntry),
}

#[derive(Clone, Copy)]
enum EntryField {
    Kind,
    Description,
    Amount,
    Category,
    DueDate,
    PaidDate,
    Status,
}

pub struct FinanceWizardState {
    entry: FinanceEntry,
    form: FormState,
    error: Option<String>,
}

fn position<T: PartialEq>(all: &[T], value: &T) -> Option<i32> {
    all.iter().position(|v| v == value).map(|i| i as i32)
}

fn kind_at(form: &FormState) -> EntryKind {
    form.choice(EntryField::Kind as usize)
        .and_then(|i| EntryKind::ALL.get(i as usize).copied())
        .unwrap_or(EntryKind::Income)
}

fn status_at(form: &FormState) -> EntryStatus {
    form.choice(EntryField::Status as usize)
        .and_then(|i| EntryStatus::ALL.get(i as usize).copied())
        .unwrap_or(EntryStatus::Receivable)
}

impl FinanceWizardState {
    pub fn new() -> Self {
        Self::from_existing(FinanceEntry::new(EntryKind::Income))
    }

    pub fn from_existing(entry: FinanceEntry) -> Self {
        let kinds = vec![(Some(0), "Income".to_string()), (Some(1), "Expense".to_string())];
        let statuses = EntryStatus::ALL
            .iter()
            .enumerate()
            .map(|(i, s)| (Some(i as i32), s.label().to_string()))
            .collect();

        let form = FormState::new(vec![
            Field::choice("Kind", kinds, position(EntryKind::ALL, &entry.kind)),
            Field::text("Description", entry.description.as_str()),
            Field::text("Amount", format!("{:.2}", entry.amount)),
            Field::optional("Category", entry.category.as_deref()),
            Field::date("Due date", entry.due_date),
            Field::date("Paid date", entry.paid_date),
            Field::choice("Status", statuses, position(EntryStatus::ALL, &entry.status)),
        ]);
        Self {
            entry,
            form,
            error: None,
        }
    }

    /// A new entry whose kind changes gets the other kind's default status.
    fn follow_kind_change(&mut self, previous: EntryKind) {
        let kind = kind_at(&self.form);
        if self.entry.id != 0 || kind == previous {
            return;
        }
        let mut scratch = FinanceEntry::new(previous);
        scratch.status = status_at(&self.form);
        finance::switch_kind(&mut scratch);
        self.form.set_choice(
            EntryField::Status as usize,
            position(EntryStatus::ALL, &scratch.status),
        );
    }

    pub fn build(&self) -> StudioResult<FinanceEntry> {
        let form = &self.form;
        let mut entry = self.entry.clone();
        entry.kind = kind_at(form);
        entry.description = form.text(EntryField::Description as usize);
        entry.amount = form
            .number(EntryField::Amount as usize)
            .ok_or_else(|| StudioError::validation("amount must be a number"))?;
        entry.category = form.optional_text(EntryField::Category as usize);
        entry.due_date = form.date(EntryField::DueDate as usize);
        entry.paid_date = form.date(EntryField::PaidDate as usize);
        entry.status = status_at(form);

        finance::validate(&entry)?;
        Ok(entry)
    }
}

pub fn render_finance_wizard<B: Backend>(f: &mut Frame<B>, state: &mut FinanceWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(9),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let mut title_text = if state.entry.id == 0 {
        "New financial entry".to_string()
    } else {
        "Edit financial entry".to_string()
    };
    if let Some(job_id) = state.entry.job_id {
        title_text.push_str(&format!(" (linked to job #{})", job_id));
    }
    f.render_widget(
        Paragraph::new(title_text)
            .style(Style::default().fg(Color::Cyan))
            .block(Block::default().borders(Borders::ALL)),
        chunks[0],
    );

    render_form(f, &state.form, chunks[1], "Entry Details");

    let (help, color) = match &state.error {
        Some(error) => (error.as_str(), Color::Red),
        None => (form_help(&state.form), Color::Gray),
    };
    f.render_widget(
        Paragraph::new(help)
            .style(Style::default().fg(color))
            .block(Block::default().borders(Borders::ALL)),
        chunks[2],
    );
}

pub fn handle_input(state: &mut FinanceWizardState, key: KeyEvent) -> Option<FinanceWizardAction> {
    let previous = kind_at(&state.form);
    let event = state.form.handle_key(key);
    state.follow_kind_change(previous);

    match event? {
        FormEvent::Cancel => Some(FinanceWizardAction::Cancel),
        FormEvent::Save => match state.build() {
            Ok(entry) => Some(FinanceWizardAction::Save(entry)),
            Err(e) => {
                state.error = Some(e.to_string());
                None
            }
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn press(state: &mut FinanceWizardState, code: KeyCode) -> Option<FinanceWizardAction> {
        handle_input(state, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn switching_kind_flips_the_default_status() {
        let mut state = FinanceWizardState::new();
        assert_eq!(status_at(&state.form), EntryStatus::Receivable);
        press(&mut state, KeyCode::Right);
        assert_eq!(kind_at(&state.form), EntryKind::Expense);
        assert_eq!(status_at(&state.form), EntryStatus::Payable);
    }

    #[test]
    fn existing_entries_keep_their_status() {
        let mut entry = FinanceEntry::new(EntryKind::Income);
        entry.id = 5;
        let mut state = FinanceWizardState::from_existing(entry);
        press(&mut state, KeyCode::Right);
        assert_eq!(status_at(&state.form), EntryStatus::Receivable);
    }

    #[test]
    fn amount_must_be_positive() {
        let mut state = FinanceWizardState::new();
        state
            .form
            .set_text(EntryField::Description as usize, "Software".to_string());
        assert!(state.build().is_err());
        state.form.set_text(EntryField::Amount as usize, "89,90".to_string());
        assert_eq!(state.build().unwrap().amount, 89.9);
    }
}

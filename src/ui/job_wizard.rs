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
use crate::models::{Client, Job, JobStatus, PaymentStatus};
use crate::services::jobs;

pub enum JobWizardAction {
    Cancel,
    Save(Job),
}

#[derive(Clone, Copy)]
enum JobField {
    Title,
    Client,
    Value,
    Quantity,
    Status,
    Payment,
    Notes,
}

pub struct JobWizardState {
    job: Job,
    form: FormState,
    error: Option<String>,
}

fn status_options() -> Vec<(Option<i32>, String)> {
    JobStatus::ALL
        .iter()
        .enumerate()
        .map(|(i, s)| (Some(i as i32), s.label().to_string()))
        .collect()
}

fn payment_options() -> Vec<(Option<i32>, String)> {
    PaymentStatus::ALL
        .iter()
        .enumerate()
        .map(|(i, s)| (Some(i as i32), s.as_str().to_string()))
        .collect()
}

fn option_index<T: PartialEq>(all: &[T], value: &T) -> Option<i32> {
    all.iter().position(|v| v == value).map(|i| i as i32)
}

impl JobWizardState {
    pub fn new(clients: &[Client]) -> Self {
        Self::from_existing(Job::new(), clients)
    }

    pub fn from_existing(job: Job, clients: &[Client]) -> Self {
        let mut client_options = vec![(None, "No client".to_string())];
        client_options.extend(clients.iter().map(|c| (Some(c.id), c.company_name.clone())));

        let form = FormState::new(vec![
            Field::text("Title", job.title.as_str()),
            Field::choice("Client", client_options, job.client_id),
            Field::text("Value", format!("{:.2}", job.value)),
            Field::text("Quantity", job.quantity.to_string()),
            Field::choice(
                "Status",
                status_options(),
                option_index(JobStatus::ALL, &job.status),
            ),
            Field::choice(
                "Payment",
                payment_options(),
                option_index(PaymentStatus::ALL, &job.payment_status),
            ),
            Field::optional("Notes", job.notes.as_deref()),
        ]);
        Self {
            job,
            form,
            error: None,
        }
    }

    pub fn build(&self) -> StudioResult<Job> {
        let form = &self.form;
        let mut job = self.job.clone();
        job.title = form.text(JobField::Title as usize);
        job.client_id = form.choice(JobField::Client as usize);
        job.value = form
            .number(JobField::Value as usize)
            .ok_or_else(|| StudioError::validation("value must be a number"))?;
        job.quantity = form
            .text(JobField::Quantity as usize)
            .parse()
            .map_err(|_| StudioError::validation("quantity must be a whole number"))?;
        if let Some(status) = form
            .choice(JobField::Status as usize)
            .and_then(|i| JobStatus::ALL.get(i as usize))
        {
            job.status = *status;
        }
        if let Some(payment) = form
            .choice(JobField::Payment as usize)
            .and_then(|i| PaymentStatus::ALL.get(i as usize))
        {
            job.payment_status = *payment;
        }
        job.notes = form.optional_text(JobField::Notes as usize);

        jobs::validate(&job)?;
        Ok(job)
    }
}

pub fn render_job_wizard<B: Backend>(f: &mut Frame<B>, state: &mut JobWizardState) {
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

    let title_text = if state.job.id == 0 { "New job" } else { "Edit job" };
    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, &state.form, chunks[1], "Job Details");

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

pub fn handle_input(state: &mut JobWizardState, key: KeyEvent) -> Option<JobWizardAction> {
    match state.form.handle_key(key)? {
        FormEvent::Cancel => Some(JobWizardAction::Cancel),
        FormEvent::Save => match state.build() {
            Ok(job) => Some(JobWizardAction::Save(job)),
            Err(e) => {
                state.error = Some(e.to_string());
                None
            }
        },
    }
}

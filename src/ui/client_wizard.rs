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
use crate::models::Client;

pub enum ClientWizardAction {
    Cancel,
    Save(Client),
}

#[derive(Clone, Copy)]
enum ClientField {
    CompanyName,
    TaxId,
    ContactPerson,
    PersonalTaxId,
    BirthDate,
    Address,
    City,
    State,
    Email,
    Phone,
}

pub struct ClientWizardState {
    client: Client,
    form: FormState,
    error: Option<String>,
}

impl ClientWizardState {
    pub fn new() -> Self {
        Self::from_existing(Client::new())
    }

    pub fn from_existing(client: Client) -> Self {
        let form = FormState::new(vec![
            Field::text("Company name", client.company_name.as_str()),
            Field::optional("CNPJ", client.tax_id.as_deref()),
            Field::optional("Contact person", client.contact_person.as_deref()),
            Field::optional("CPF", client.personal_tax_id.as_deref()),
            Field::date("Birth date", client.birth_date),
            Field::optional("Address", client.address.as_deref()),
            Field::optional("City", client.city.as_deref()),
            Field::optional("State (UF)", client.state.as_deref()),
            Field::optional("E-mail", client.email.as_deref()),
            Field::optional("Phone", client.phone.as_deref()),
        ]);
        Self {
            client,
            form,
            error: None,
        }
    }

    /// The edited client, or the first problem with the form.
    pub fn build(&self) -> StudioResult<Client> {
        let form = &self.form;
        let mut client = self.client.clone();
        client.company_name = form.text(ClientField::CompanyName as usize);
        client.tax_id = form.optional_text(ClientField::TaxId as usize);
        client.contact_person = form.optional_text(ClientField::ContactPerson as usize);
        client.personal_tax_id = form.optional_text(ClientField::PersonalTaxId as usize);
        client.birth_date = form.date(ClientField::BirthDate as usize);
        client.address = form.optional_text(ClientField::Address as usize);
        client.city = form.optional_text(ClientField::City as usize);
        client.state = form
            .optional_text(ClientField::State as usize)
            .map(|s| s.to_uppercase());
        client.email = form.optional_text(ClientField::Email as usize);
        client.phone = form.optional_text(ClientField::Phone as usize);

        if client.company_name.is_empty() {
            return Err(StudioError::validation("company name is required"));
        }
        if let Some(state) = &client.state {
            if state.len() != 2 || !state.chars().all(|c| c.is_ascii_uppercase()) {
                return Err(StudioError::validation("state must be a two-letter code"));
            }
        }
        Ok(client)
    }
}

pub fn render_client_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ClientWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(10),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.client.id == 0 {
        "New client"
    } else {
        "Edit client"
    };
    let title = Paragraph::new(title_text)
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(title, chunks[0]);

    render_form(f, &state.form, chunks[1], "Client Details");

    let (help, color) = match &state.error {
        Some(error) => (error.as_str(), Color::Red),
        None => (form_help(&state.form), Color::Gray),
    };
    let help = Paragraph::new(help)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL));
    f.render_widget(help, chunks[2]);
}

pub fn handle_input(state: &mut ClientWizardState, key: KeyEvent) -> Option<ClientWizardAction> {
    match state.form.handle_key(key)? {
        FormEvent::Cancel => Some(ClientWizardAction::Cancel),
        FormEvent::Save => match state.build() {
            Ok(client) => Some(ClientWizardAction::Save(client)),
            Err(e) => {
                state.error = Some(e.to_string());
                None
            }
        },
    }
}

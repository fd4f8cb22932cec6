use crossterm::event::KeyEvent;
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::components::{
    centered_rect,
    form::{form_help, render_form, Field, FormEvent, FormState},
};
use crate::services::auth;

pub enum ChangePasswordAction {
    Cancel,
    Submit { password: String, confirmation: String },
}

#[derive(Clone, Copy)]
enum PasswordField {
    New,
    Confirmation,
}

pub struct ChangePasswordState {
    form: FormState,
    error: Option<String>,
}

impl ChangePasswordState {
    pub fn new() -> Self {
        Self {
            form: FormState::new(vec![
                Field::secret("New password"),
                Field::secret("Confirm password"),
            ]),
            error: None,
        }
    }

    pub fn rejected(&mut self, message: String) {
        self.error = Some(message);
    }
}

pub fn render_change_password<B: Backend>(f: &mut Frame<B>, state: &mut ChangePasswordState) {
    let area = centered_rect(60, 40, f.size());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(4),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(area);

    f.render_widget(
        Paragraph::new("Change password")
            .style(Style::default().fg(Color::Cyan))
            .block(Block::default().borders(Borders::ALL)),
        chunks[0],
    );
    render_form(f, &state.form, chunks[1], "Password");

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

pub fn handle_input(
    state: &mut ChangePasswordState,
    key: KeyEvent,
) -> Option<ChangePasswordAction> {
    match state.form.handle_key(key)? {
        FormEvent::Cancel => Some(ChangePasswordAction::Cancel),
        FormEvent::Save => {
            let password = state.form.text(PasswordField::New as usize);
            let confirmation = state.form.text(PasswordField::Confirmation as usize);
            if let Err(e) = auth::validate_new_password(&password, &confirmation) {
                state.error = Some(e.to_string());
                return None;
            }
            state.error = None;
            Some(ChangePasswordAction::Submit {
                password,
                confirmation,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::{KeyCode, KeyModifiers};

    fn press(state: &mut ChangePasswordState, code: KeyCode) -> Option<ChangePasswordAction> {
        handle_input(state, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn type_field(state: &mut ChangePasswordState, text: &str) {
        press(state, KeyCode::Enter);
        for c in text.chars() {
            press(state, KeyCode::Char(c));
        }
        press(state, KeyCode::Enter);
    }

    #[test]
    fn mismatch_stays_on_the_screen() {
        let mut state = ChangePasswordState::new();
        type_field(&mut state, "retouch42");
        press(&mut state, KeyCode::Down);
        type_field(&mut state, "retouch43");
        assert!(press(&mut state, KeyCode::Char('s')).is_none());
        assert!(state.error.is_some());
    }

    #[test]
    fn matching_passwords_are_submitted() {
        let mut state = ChangePasswordState::new();
        type_field(&mut state, "retouch42");
        press(&mut state, KeyCode::Down);
        type_field(&mut state, "retouch42");
        assert!(matches!(
            press(&mut state, KeyCode::Char('s')),
            Some(ChangePasswordAction::Submit { .. })
        ));
    }
}

use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    widgets::{Block, Borders, Paragraph},
    Frame,
};

use super::components::{
    centered_rect,
    form::{render_form, Field, FormEvent, FormState},
};

#[derive(Clone, Copy)]
enum LoginField {
    Email,
    Password,
}

pub enum LoginAction {
    Submit { email: String, password: String },
    Quit,
}

pub struct LoginState {
    form: FormState,
    pub error: Option<String>,
}

impl LoginState {
    pub fn new() -> Self {
        Self {
            form: FormState::new(vec![Field::text("E-mail", ""), Field::secret("Password")]),
            error: None,
        }
    }

    /// Keep the e-mail, drop the password after a failed attempt.
    pub fn rejected(&mut self, message: String) {
        let email = self.form.text(LoginField::Email as usize);
        self.form = FormState::new(vec![Field::text("E-mail", email), Field::secret("Password")]);
        self.form.current = LoginField::Password as usize;
        self.error = Some(message);
    }
}

pub fn render_login<B: Backend>(frame: &mut Frame<B>, state: &mut LoginState) {
    let area = centered_rect(60, 50, frame.size());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Length(4),
            Constraint::Length(3),
            Constraint::Min(0),
        ])
        .split(area);

    let title = Paragraph::new("Studio Manager - Admin login")
        .style(Style::default().fg(Color::Cyan))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(title, chunks[0]);

    render_form(frame, &state.form, chunks[1], "Credentials");

    let (text, color) = match &state.error {
        Some(error) => (error.as_str(), Color::Red),
        None => ("Enter - Edit field | Up/Down - Navigate | S - Sign in | Esc - Quit", Color::Gray),
    };
    let help = Paragraph::new(text)
        .style(Style::default().fg(color))
        .block(Block::default().borders(Borders::ALL));
    frame.render_widget(help, chunks[2]);
}

pub fn handle_input(state: &mut LoginState, key: KeyEvent) -> Option<LoginAction> {
    if !state.form.editing && key.code == KeyCode::Char('q') {
        return Some(LoginAction::Quit);
    }

    match state.form.handle_key(key)? {
        FormEvent::Cancel => Some(LoginAction::Quit),
        FormEvent::Save => {
            let email = state.form.text(LoginField::Email as usize);
            let password = state.form.text(LoginField::Password as usize);
            if email.is_empty() || password.is_empty() {
                state.error = Some("e-mail and password are required".to_string());
                return None;
            }
            state.error = None;
            Some(LoginAction::Submit { email, password })
        }
    }
}

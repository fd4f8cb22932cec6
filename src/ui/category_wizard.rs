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
use crate::models::PortfolioCategory;
use crate::services::portfolio;

pub enum CategoryWizardAction {
    Cancel,
    Save(PortfolioCategory),
}

#[derive(Clone, Copy)]
enum CategoryField {
    Name,
    Slug,
    Position,
    Active,
}

pub struct CategoryWizardState {
    category: PortfolioCategory,
    form: FormState,
    /// Set once the slug is typed by hand; it then stops following the name
    slug_edited: bool,
    error: Option<String>,
}

impl CategoryWizardState {
    pub fn new(position: i32) -> Self {
        Self::from_existing(PortfolioCategory::new(position))
    }

    pub fn from_existing(category: PortfolioCategory) -> Self {
        let form = FormState::new(vec![
            Field::text("Name", category.name.as_str()),
            Field::text("Slug", category.slug.as_str()),
            Field::text("Position", category.position.to_string()),
            Field::toggle("Active", category.active),
        ]);
        Self {
            slug_edited: category.id != 0,
            category,
            form,
            error: None,
        }
    }

    fn sync_slug(&mut self, name_before: &str, slug_before: &str) {
        let slug = self.form.text(CategoryField::Slug as usize);
        if slug != slug_before {
            self.slug_edited = true;
            return;
        }
        let name = self.form.text(CategoryField::Name as usize);
        if !self.slug_edited && name != name_before {
            self.form
                .set_text(CategoryField::Slug as usize, portfolio::slugify(&name));
        }
    }

    pub fn build(&self) -> StudioResult<PortfolioCategory> {
        let mut category = self.category.clone();
        category.name = self.form.text(CategoryField::Name as usize);
        category.slug = self.form.text(CategoryField::Slug as usize);
        category.position = self
            .form
            .text(CategoryField::Position as usize)
            .parse()
            .map_err(|_| StudioError::validation("position must be a whole number"))?;
        category.active = self.form.toggle(CategoryField::Active as usize);

        portfolio::validate_category(&category)?;
        Ok(category)
    }
}

pub fn render_category_wizard<B: Backend>(f: &mut Frame<B>, state: &mut CategoryWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(2)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(6),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.category.id == 0 {
        "New category"
    } else {
        "Edit category"
    };
    f.render_widget(
        Paragraph::new(title_text)
            .style(Style::default().fg(Color::Cyan))
            .block(Block::default().borders(Borders::ALL)),
        chunks[0],
    );

    render_form(f, &state.form, chunks[1], "Category Details");

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
    state: &mut CategoryWizardState,
    key: KeyEvent,
) -> Option<CategoryWizardAction> {
    let name_before = state.form.text(CategoryField::Name as usize);
    let slug_before = state.form.text(CategoryField::Slug as usize);
    let event = state.form.handle_key(key);
    state.sync_slug(&name_before, &slug_before);

    match event? {
        FormEvent::Cancel => Some(CategoryWizardAction::Cancel),
        FormEvent::Save => match state.build() {
            Ok(category) => Some(CategoryWizardAction::Save(category)),
            Err(e) => {
                state.error = Some(e.to_string());
                None
            }
        },
    }
}

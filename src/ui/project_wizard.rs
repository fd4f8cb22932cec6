use std::path::PathBuf;

use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::components::form::{form_help, render_form, Field, FormEvent, FormState};
use super::components::ListCursor;
use crate::error::{StudioError, StudioResult};
use crate::models::{ImageDraft, PortfolioCategory, PortfolioProject, ProjectWithImages};
use crate::services::portfolio::{self, Direction as Move};

pub enum ProjectWizardAction {
    Cancel,
    Save(PortfolioProject, Vec<ImageDraft>),
    /// Upload a local file to the bucket and attach it
    UploadImage(PathBuf),
}

#[derive(Clone, Copy)]
enum ProjectField {
    Title,
    Category,
    ClientName,
    ProjectDate,
    Description,
    Position,
    Published,
}

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
enum Focus {
    Form,
    Images,
    /// Typing the path of a file to upload
    ImagePath,
}

pub struct ProjectWizardState {
    project: PortfolioProject,
    form: FormState,
    images: Vec<ImageDraft>,
    image_cursor: ListCursor,
    focus: Focus,
    image_path: String,
    error: Option<String>,
}

impl ProjectWizardState {
    pub fn new(categories: &[PortfolioCategory]) -> Self {
        Self::build_state(PortfolioProject::new(), Vec::new(), categories)
    }

    pub fn from_existing(item: ProjectWithImages, categories: &[PortfolioCategory]) -> Self {
        let images = item.images.iter().map(ImageDraft::from).collect();
        Self::build_state(item.project, images, categories)
    }

    fn build_state(
        project: PortfolioProject,
        images: Vec<ImageDraft>,
        categories: &[PortfolioCategory],
    ) -> Self {
        // Active categories, plus the current one so editing never detaches it
        let mut options = vec![(None, "No category".to_string())];
        options.extend(
            categories
                .iter()
                .filter(|c| c.active || Some(c.id) == project.category_id)
                .map(|c| {
                    let label = if c.active {
                        c.name.clone()
                    } else {
                        format!("{} (hidden)", c.name)
                    };
                    (Some(c.id), label)
                }),
        );

        let form = FormState::new(vec![
            Field::text("Title", project.title.as_str()),
            Field::choice("Category", options, project.category_id),
            Field::optional("Client", project.client_name.as_deref()),
            Field::date("Date", project.project_date),
            Field::optional("Description", project.description.as_deref()),
            Field::text("Position", project.position.to_string()),
            Field::toggle("Published", project.published),
        ]);
        let image_cursor = ListCursor::new(images.len());
        Self {
            project,
            form,
            images,
            image_cursor,
            focus: Focus::Form,
            image_path: String::new(),
            error: None,
        }
    }

    pub fn add_image(&mut self, image: ImageDraft) {
        self.images.push(image);
        self.image_cursor.select(self.images.len() - 1);
    }

    pub fn upload_failed(&mut self, message: String) {
        self.error = Some(message);
    }

    fn remove_selected_image(&mut self) {
        if let Some(index) = self.image_cursor.selected() {
            if index < self.images.len() {
                self.images.remove(index);
            }
        }
        self.image_cursor.clamp(self.images.len());
    }

    fn move_selected_image(&mut self, direction: Move) {
        if let Some(index) = self.image_cursor.selected() {
            let moved = portfolio::move_image(&mut self.images, index, direction);
            self.image_cursor.select(moved);
        }
    }

    pub fn build(&self) -> StudioResult<PortfolioProject> {
        let form = &self.form;
        let mut project = self.project.clone();
        project.title = form.text(ProjectField::Title as usize);
        project.category_id = form.choice(ProjectField::Category as usize);
        project.client_name = form.optional_text(ProjectField::ClientName as usize);
        project.project_date = form.date(ProjectField::ProjectDate as usize);
        project.description = form.optional_text(ProjectField::Description as usize);
        project.position = form
            .text(ProjectField::Position as usize)
            .parse()
            .map_err(|_| StudioError::validation("position must be a whole number"))?;
        project.published = form.toggle(ProjectField::Published as usize);

        portfolio::validate_project(&project)?;
        Ok(project)
    }

    fn save(&mut self) -> Option<ProjectWizardAction> {
        match self.build() {
            Ok(project) => Some(ProjectWizardAction::Save(project, self.images.clone())),
            Err(e) => {
                self.error = Some(e.to_string());
                None
            }
        }
    }
}

pub fn render_project_wizard<B: Backend>(f: &mut Frame<B>, state: &mut ProjectWizardState) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(9),
                Constraint::Min(4),
                Constraint::Length(3),
            ]
            .as_ref(),
        )
        .split(f.size());

    let title_text = if state.project.id == 0 {
        "New portfolio project"
    } else {
        "Edit portfolio project"
    };
    f.render_widget(
        Paragraph::new(title_text)
            .style(Style::default().fg(Color::Cyan))
            .block(Block::default().borders(Borders::ALL)),
        chunks[0],
    );

    render_form(f, &state.form, chunks[1], "Project Details");

    let items: Vec<ListItem> = state
        .images
        .iter()
        .enumerate()
        .map(|(i, image)| {
            let label = if i == 0 { " (cover)" } else { "" };
            ListItem::new(format!("{}. {}{}", i + 1, image.url, label))
        })
        .collect();
    let images_title = match state.focus {
        Focus::ImagePath => format!("Upload file: {}|", state.image_path),
        _ => format!("Images ({})", state.images.len()),
    };
    let border_style = if state.focus == Focus::Form {
        Style::default()
    } else {
        Style::default().fg(Color::Yellow)
    };
    let images = List::new(items)
        .block(
            Block::default()
                .title(images_title)
                .borders(Borders::ALL)
                .border_style(border_style),
        )
        .highlight_style(if state.focus == Focus::Form {
            Style::default()
        } else {
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD)
        });
    f.render_stateful_widget(images, chunks[2], &mut state.image_cursor.state);

    let help = match (&state.error, state.focus) {
        (Some(error), _) => error.as_str(),
        (None, Focus::Form) if !state.form.editing => {
            "Up/Down - Navigate | Enter - Edit/toggle | Left/Right - Choose | I - Images | S - Save | Esc - Cancel"
        }
        (None, Focus::Form) => form_help(&state.form),
        (None, Focus::Images) => {
            "<A> Add | <X> Remove | <K>/<J> Move up/down | <S> Save | <Esc> Back to form"
        }
        (None, Focus::ImagePath) => "Type a file path | <Enter> Upload | <Esc> Cancel",
    };
    let color = if state.error.is_some() {
        Color::Red
    } else {
        Color::Gray
    };
    f.render_widget(
        Paragraph::new(help)
            .style(Style::default().fg(color))
            .block(Block::default().borders(Borders::ALL)),
        chunks[3],
    );
}

pub fn handle_input(state: &mut ProjectWizardState, key: KeyEvent) -> Option<ProjectWizardAction> {
    state.error = None;
    match state.focus {
        Focus::ImagePath => match key.code {
            KeyCode::Esc => {
                state.image_path.clear();
                state.focus = Focus::Images;
            }
            KeyCode::Enter => {
                let path = state.image_path.trim().to_string();
                state.image_path.clear();
                state.focus = Focus::Images;
                if !path.is_empty() {
                    return Some(ProjectWizardAction::UploadImage(PathBuf::from(path)));
                }
            }
            KeyCode::Backspace => {
                state.image_path.pop();
            }
            KeyCode::Char(c) => state.image_path.push(c),
            _ => {}
        },
        Focus::Images => {
            let len = state.images.len();
            match key.code {
                KeyCode::Esc => state.focus = Focus::Form,
                KeyCode::Char('a') => state.focus = Focus::ImagePath,
                KeyCode::Char('x') | KeyCode::Delete => state.remove_selected_image(),
                KeyCode::Char('k') => state.move_selected_image(Move::Up),
                KeyCode::Char('j') => state.move_selected_image(Move::Down),
                KeyCode::Char('s') => return state.save(),
                KeyCode::Down => state.image_cursor.next(len),
                KeyCode::Up => state.image_cursor.previous(len),
                _ => {}
            }
        }
        Focus::Form => {
            if !state.form.editing && key.code == KeyCode::Char('i') {
                state.focus = Focus::Images;
                state.image_cursor.clamp(state.images.len());
                return None;
            }
            match state.form.handle_key(key)? {
                FormEvent::Cancel => return Some(ProjectWizardAction::Cancel),
                FormEvent::Save => return state.save(),
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    fn press(state: &mut ProjectWizardState, code: KeyCode) -> Option<ProjectWizardAction> {
        handle_input(state, KeyEvent::new(code, KeyModifiers::NONE))
    }

    fn draft(url: &str) -> ImageDraft {
        ImageDraft {
            url: url.to_string(),
            title: None,
        }
    }

    fn category(id: i32, name: &str, active: bool) -> PortfolioCategory {
        let mut category = PortfolioCategory::new(id);
        category.id = id;
        category.name = name.to_string();
        category.active = active;
        category
    }

    #[test]
    fn images_can_be_reordered_and_removed() {
        let mut state = ProjectWizardState::new(&[]);
        state.form.set_text(ProjectField::Title as usize, "Casa Azul".to_string());
        state.add_image(draft("a"));
        state.add_image(draft("b"));
        state.add_image(draft("c"));

        press(&mut state, KeyCode::Char('i'));
        // "c" is selected after the last add
        press(&mut state, KeyCode::Char('k'));
        press(&mut state, KeyCode::Char('k'));
        press(&mut state, KeyCode::Char('k'));
        let urls: Vec<&str> = state.images.iter().map(|i| i.url.as_str()).collect();
        assert_eq!(urls, ["c", "a", "b"]);

        press(&mut state, KeyCode::Char('x'));
        match press(&mut state, KeyCode::Char('s')) {
            Some(ProjectWizardAction::Save(project, images)) => {
                assert_eq!(project.title, "Casa Azul");
                assert_eq!(images, vec![draft("a"), draft("b")]);
            }
            _ => panic!("expected a save"),
        }
    }

    #[test]
    fn typed_path_becomes_an_upload() {
        let mut state = ProjectWizardState::new(&[]);
        press(&mut state, KeyCode::Char('i'));
        press(&mut state, KeyCode::Char('a'));
        for c in "/tmp/capa.jpg".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        match press(&mut state, KeyCode::Enter) {
            Some(ProjectWizardAction::UploadImage(path)) => {
                assert_eq!(path, PathBuf::from("/tmp/capa.jpg"))
            }
            _ => panic!("expected an upload"),
        }
    }

    #[test]
    fn only_active_categories_are_offered() {
        let categories = [category(1, "Casamentos", true), category(2, "Antigos", false)];
        let state = ProjectWizardState::new(&categories);
        let options = match &state.form.fields[ProjectField::Category as usize].value {
            crate::ui::components::form::FieldValue::Choice { options, .. } => options.len(),
            _ => 0,
        };
        assert_eq!(options, 2);

        let mut project = PortfolioProject::new();
        project.title = "Old".to_string();
        project.category_id = Some(2);
        let item = ProjectWithImages {
            project,
            category_name: Some("Antigos".to_string()),
            images: Vec::new(),
        };
        let state = ProjectWizardState::from_existing(item, &categories);
        assert_eq!(state.build().unwrap().category_id, Some(2));
    }
}

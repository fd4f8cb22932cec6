use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use super::components::{body_and_footer, render_confirmation, render_help, ListCursor};
use crate::models::ProjectWithImages;

// Represents the state of the portfolio project list
pub struct ProjectsState {
    projects: Vec<ProjectWithImages>,
    cursor: ListCursor,
    show_delete_confirmation: bool,
}

pub enum ProjectAction {
    Back,
    NewProject,
    EditProject(ProjectWithImages),
    DeleteProject(i32),
    /// Flipped locally; the store call saves the project with its images unchanged
    SetPublished(ProjectWithImages),
}

impl ProjectsState {
    pub fn new(projects: Vec<ProjectWithImages>) -> Self {
        let cursor = ListCursor::new(projects.len());
        Self {
            projects,
            cursor,
            show_delete_confirmation: false,
        }
    }

    pub fn selected_project(&self) -> Option<&ProjectWithImages> {
        self.cursor.selected().and_then(|i| self.projects.get(i))
    }

    pub fn remove(&mut self, id: i32) {
        self.projects.retain(|p| p.project.id != id);
        self.cursor.clamp(self.projects.len());
    }

    fn toggle_published(&mut self) -> Option<ProjectWithImages> {
        let index = self.cursor.selected()?;
        let item = self.projects.get_mut(index)?;
        item.project.published = !item.project.published;
        Some(item.clone())
    }
}

pub fn render_projects<B: Backend>(frame: &mut Frame<B>, state: &mut ProjectsState) {
    let (body, footer) = body_and_footer(frame.size());

    let items: Vec<ListItem> = state
        .projects
        .iter()
        .map(|item| {
            let project = &item.project;
            let (flag, color) = if project.published {
                ("published", Color::Green)
            } else {
                ("draft", Color::Yellow)
            };
            ListItem::new(Spans::from(vec![
                Span::raw(format!("{:>3}. ", project.position)),
                Span::styled(
                    format!("{:<32}", project.title),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(
                    " {:<22} {:<20} {:>3} img  ",
                    item.category_name.as_deref().unwrap_or("-"),
                    project.client_name.as_deref().unwrap_or("-"),
                    item.images.len()
                )),
                Span::styled(flag, Style::default().fg(color)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title(format!("Portfolio projects ({})", state.projects.len()))
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, body, &mut state.cursor.state);

    render_help(
        frame,
        footer,
        "<N> New | <E> Edit | <D> Delete | <P> Publish/unpublish | <Esc> Back",
    );

    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            "Confirm Delete",
            &[
                "Are you sure you want to delete this project?",
                "Its image list is deleted too.",
            ],
        );
    }
}

pub fn handle_input(state: &mut ProjectsState, key: KeyEvent) -> Option<ProjectAction> {
    if state.show_delete_confirmation {
        match key.code {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                let id = state.selected_project()?.project.id;
                state.remove(id);
                return Some(ProjectAction::DeleteProject(id));
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    let len = state.projects.len();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(ProjectAction::Back),
        KeyCode::Char('n') => return Some(ProjectAction::NewProject),
        KeyCode::Char('e') | KeyCode::Enter => {
            return state
                .selected_project()
                .cloned()
                .map(ProjectAction::EditProject)
        }
        KeyCode::Char('d') => {
            if state.selected_project().is_some() {
                state.show_delete_confirmation = true;
            }
        }
        KeyCode::Char('p') => return state.toggle_published().map(ProjectAction::SetPublished),
        KeyCode::Down => state.cursor.next(len),
        KeyCode::Up => state.cursor.previous(len),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::PortfolioProject;
    use crossterm::event::KeyModifiers;

    #[test]
    fn publish_toggle_flips_the_local_row() {
        let mut project = PortfolioProject::new();
        project.id = 8;
        let mut state = ProjectsState::new(vec![ProjectWithImages {
            project,
            category_name: None,
            images: Vec::new(),
        }]);

        let action = handle_input(&mut state, KeyEvent::new(KeyCode::Char('p'), KeyModifiers::NONE));
        match action {
            Some(ProjectAction::SetPublished(item)) => assert!(item.project.published),
            _ => panic!("expected a publish toggle"),
        }
        assert!(state.selected_project().unwrap().project.published);
    }
}

use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use super::components::{body_and_footer, render_confirmation, render_help, ListCursor};
use crate::models::PortfolioCategory;
use crate::services::portfolio;

pub struct CategoriesState {
    categories: Vec<PortfolioCategory>,
    cursor: ListCursor,
    show_delete_confirmation: bool,
}

pub enum CategoryAction {
    Back,
    /// Carries the position the new category starts at
    NewCategory(i32),
    EditCategory(PortfolioCategory),
    DeleteCategory(i32),
}

impl CategoriesState {
    pub fn new(categories: Vec<PortfolioCategory>) -> Self {
        let cursor = ListCursor::new(categories.len());
        Self {
            categories,
            cursor,
            show_delete_confirmation: false,
        }
    }

    pub fn selected_category(&self) -> Option<&PortfolioCategory> {
        self.cursor.selected().and_then(|i| self.categories.get(i))
    }

    pub fn remove(&mut self, id: i32) {
        self.categories.retain(|c| c.id != id);
        self.cursor.clamp(self.categories.len());
    }
}

pub fn render_categories<B: Backend>(frame: &mut Frame<B>, state: &mut CategoriesState) {
    let (body, footer) = body_and_footer(frame.size());

    let items: Vec<ListItem> = state
        .categories
        .iter()
        .map(|category| {
            let (flag, color) = if category.active {
                ("active", Color::Green)
            } else {
                ("hidden", Color::DarkGray)
            };
            ListItem::new(Spans::from(vec![
                Span::raw(format!("{:>3}. ", category.position)),
                Span::styled(
                    format!("{:<28}", category.name),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" /categoria/{:<28} ", category.slug)),
                Span::styled(flag, Style::default().fg(color)),
            ]))
        })
        .collect();

    let list = List::new(items)
        .block(
            Block::default()
                .title("Portfolio categories")
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, body, &mut state.cursor.state);

    render_help(frame, footer, "<N> New | <E> Edit | <D> Delete | <Esc> Back");

    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            "Confirm Delete",
            &[
                "Are you sure you want to delete this category?",
                "Its projects stay, without a category.",
            ],
        );
    }
}

pub fn handle_input(state: &mut CategoriesState, key: KeyEvent) -> Option<CategoryAction> {
    if state.show_delete_confirmation {
        match key.code {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                let id = state.selected_category()?.id;
                state.remove(id);
                return Some(CategoryAction::DeleteCategory(id));
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    let len = state.categories.len();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(CategoryAction::Back),
        KeyCode::Char('n') => {
            return Some(CategoryAction::NewCategory(
                portfolio::next_category_position(&state.categories),
            ))
        }
        KeyCode::Char('e') | KeyCode::Enter => {
            return state
                .selected_category()
                .map(|c| CategoryAction::EditCategory(c.clone()))
        }
        KeyCode::Char('d') => {
            if state.selected_category().is_some() {
                state.show_delete_confirmation = true;
            }
        }
        KeyCode::Down => state.cursor.next(len),
        KeyCode::Up => state.cursor.previous(len),
        _ => {}
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crossterm::event::KeyModifiers;

    #[test]
    fn new_category_goes_after_the_last() {
        let categories = (1..=2)
            .map(|i| {
                let mut category = PortfolioCategory::new(i);
                category.id = i;
                category
            })
            .collect();
        let mut state = CategoriesState::new(categories);
        let action = handle_input(&mut state, KeyEvent::new(KeyCode::Char('n'), KeyModifiers::NONE));
        assert!(matches!(action, Some(CategoryAction::NewCategory(3))));
    }
}

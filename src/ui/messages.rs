use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph, Wrap},
    Frame,
};

use super::components::{body_and_footer, render_confirmation, render_help, ListCursor};
use crate::models::Contact;
use crate::services::contacts::{self, ContactFilter};

pub struct MessagesState {
    contacts: Vec<Contact>,
    filter: ContactFilter,
    cursor: ListCursor,
    show_delete_confirmation: bool,
}

pub enum MessageAction {
    Back,
    SetRead(i32, bool),
    DeleteMessage(i32),
}

impl MessagesState {
    pub fn new(contacts: Vec<Contact>) -> Self {
        let cursor = ListCursor::new(contacts.len());
        Self {
            contacts,
            filter: ContactFilter::All,
            cursor,
            show_delete_confirmation: false,
        }
    }

    pub fn visible(&self) -> Vec<&Contact> {
        contacts::filter(&self.contacts, self.filter)
    }

    pub fn selected_message(&self) -> Option<&Contact> {
        let visible = self.visible();
        self.cursor.selected().and_then(|i| visible.get(i).copied())
    }

    pub fn unread_count(&self) -> usize {
        contacts::unread_count(&self.contacts)
    }

    pub fn set_read(&mut self, id: i32, read: bool) {
        if let Some(contact) = self.contacts.iter_mut().find(|c| c.id == id) {
            contact.read = read;
        }
        let len = self.visible().len();
        self.cursor.clamp(len);
    }

    pub fn remove(&mut self, id: i32) {
        self.contacts.retain(|c| c.id != id);
        let len = self.visible().len();
        self.cursor.clamp(len);
    }
}

pub fn render_messages<B: Backend>(frame: &mut Frame<B>, state: &mut MessagesState) {
    let (body, footer) = body_and_footer(frame.size());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Percentage(55), Constraint::Percentage(45)].as_ref())
        .split(body);

    let items: Vec<ListItem> = state
        .visible()
        .into_iter()
        .map(|contact| {
            let style = if contact.read {
                Style::default().fg(Color::Gray)
            } else {
                Style::default().add_modifier(Modifier::BOLD)
            };
            ListItem::new(Spans::from(vec![
                Span::raw(if contact.read { "  " } else { "* " }),
                Span::raw(format!("{} ", contact.created_at.format("%d/%m/%Y %H:%M"))),
                Span::styled(format!("{:<24} {}", contact.name, contact.email), style),
            ]))
        })
        .collect();

    let title = format!(
        "Messages - {} ({} unread)",
        state.filter.label(),
        state.unread_count()
    );
    let list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(list, chunks[0], &mut state.cursor.state);

    let detail = state
        .selected_message()
        .map(|c| c.message.clone())
        .unwrap_or_default();
    frame.render_widget(
        Paragraph::new(detail)
            .wrap(Wrap { trim: false })
            .block(Block::default().title("Message").borders(Borders::ALL)),
        chunks[1],
    );

    render_help(
        frame,
        footer,
        "<R> Read/unread | <F> All/unread | <D> Delete | <Esc> Back",
    );

    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            "Confirm Delete",
            &["Are you sure you want to delete this message?"],
        );
    }
}

pub fn handle_input(state: &mut MessagesState, key: KeyEvent) -> Option<MessageAction> {
    if state.show_delete_confirmation {
        match key.code {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                let id = state.selected_message()?.id;
                state.remove(id);
                return Some(MessageAction::DeleteMessage(id));
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    let len = state.visible().len();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(MessageAction::Back),
        KeyCode::Char('r') | KeyCode::Enter => {
            let (id, read) = state.selected_message().map(|c| (c.id, !c.read))?;
            state.set_read(id, read);
            return Some(MessageAction::SetRead(id, read));
        }
        KeyCode::Char('f') => {
            state.filter = state.filter.toggled();
            let len = state.visible().len();
            state.cursor.reset(len);
        }
        KeyCode::Char('d') => {
            if state.selected_message().is_some() {
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
    use chrono::Utc;
    use crossterm::event::KeyModifiers;

    fn contact(id: i32, read: bool) -> Contact {
        Contact {
            id,
            created_at: Utc::now(),
            name: format!("Visitor {}", id),
            email: "visitor@example.com".to_string(),
            message: "Olá".to_string(),
            read,
        }
    }

    fn press(state: &mut MessagesState, code: KeyCode) -> Option<MessageAction> {
        handle_input(state, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn marking_read_updates_the_unread_count() {
        let mut state = MessagesState::new(vec![contact(1, false), contact(2, false)]);
        assert_eq!(state.unread_count(), 2);
        assert!(matches!(
            press(&mut state, KeyCode::Char('r')),
            Some(MessageAction::SetRead(1, true))
        ));
        assert_eq!(state.unread_count(), 1);
    }

    #[test]
    fn unread_filter_hides_read_messages() {
        let mut state = MessagesState::new(vec![contact(1, true), contact(2, false)]);
        press(&mut state, KeyCode::Char('f'));
        assert_eq!(state.visible().len(), 1);
        assert_eq!(state.selected_message().unwrap().id, 2);

        press(&mut state, KeyCode::Char('d'));
        assert!(matches!(
            press(&mut state, KeyCode::Char('y')),
            Some(MessageAction::DeleteMessage(2))
        ));
        assert!(state.visible().is_empty());
    }
}

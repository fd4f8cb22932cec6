use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::components::{body_and_footer, render_confirmation, render_help, ListCursor};
use crate::models::Client;

// Represents the state of the client list screen
pub struct ClientsState {
    clients: Vec<Client>,
    search: String,
    searching: bool,
    cursor: ListCursor,
    show_delete_confirmation: bool,
}

impl ClientsState {
    pub fn new(clients: Vec<Client>) -> Self {
        let cursor = ListCursor::new(clients.len());
        Self {
            clients,
            search: String::new(),
            searching: false,
            cursor,
            show_delete_confirmation: false,
        }
    }

    /// Clients matching the search box, in store order
    pub fn visible(&self) -> Vec<&Client> {
        let term = self.search.trim();
        self.clients
            .iter()
            .filter(|c| term.is_empty() || c.matches(term))
            .collect()
    }

    pub fn selected_client(&self) -> Option<&Client> {
        let visible = self.visible();
        self.cursor.selected().and_then(|i| visible.get(i).copied())
    }

    pub fn selected_client_id(&self) -> Option<i32> {
        self.selected_client().map(|c| c.id)
    }

    /// Drop a client locally before the store confirms it.
    pub fn remove(&mut self, id: i32) {
        self.clients.retain(|c| c.id != id);
        let len = self.visible().len();
        self.cursor.clamp(len);
    }

    fn set_search(&mut self, search: String) {
        self.search = search;
        let len = self.visible().len();
        self.cursor.reset(len);
    }
}

pub enum ClientAction {
    Back,
    NewClient,
    EditClient(i32),
    DeleteClient(i32),
}

pub fn render_clients<B: Backend>(frame: &mut Frame<B>, state: &mut ClientsState) {
    let (body, footer) = body_and_footer(frame.size());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(3), Constraint::Min(1)].as_ref())
        .split(body);

    let search_style = if state.searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    };
    let search = Paragraph::new(format!(
        "{}{}",
        state.search,
        if state.searching { "|" } else { "" }
    ))
    .style(search_style)
    .block(Block::default().title("Search").borders(Borders::ALL));
    frame.render_widget(search, chunks[0]);

    let items: Vec<ListItem> = state
        .visible()
        .into_iter()
        .map(|client| {
            let mut spans = vec![Span::styled(
                format!("{:<32}", client.company_name),
                Style::default().add_modifier(Modifier::BOLD),
            )];
            spans.push(Span::raw(format!(
                " {:<18} {:<24} {:<16} {}",
                client.tax_id.as_deref().unwrap_or("-"),
                client.contact_person.as_deref().unwrap_or("-"),
                client.phone.as_deref().unwrap_or("-"),
                client.location().unwrap_or_default()
            )));
            ListItem::new(Spans::from(spans))
        })
        .collect();

    let title = format!("Clients ({})", state.clients.len());
    let clients_list = List::new(items)
        .block(Block::default().title(title).borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(clients_list, chunks[1], &mut state.cursor.state);

    let help = if state.searching {
        "Type to filter | <Enter>/<Esc> Done"
    } else if state.selected_client().is_some() {
        "<N> New | <E> Edit | <D> Delete | </> Search | <Esc> Back"
    } else {
        "<N> New | </> Search | <Esc> Back"
    };
    render_help(frame, footer, help);

    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            "Confirm Delete",
            &[
                "Are you sure you want to delete this client?",
                "Jobs keep their data but lose the client link.",
            ],
        );
    }
}

pub fn handle_input(state: &mut ClientsState, key: KeyEvent) -> Option<ClientAction> {
    if state.searching {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => state.searching = false,
            KeyCode::Backspace => {
                let mut search = state.search.clone();
                search.pop();
                state.set_search(search);
            }
            KeyCode::Char(c) => {
                let search = format!("{}{}", state.search, c);
                state.set_search(search);
            }
            _ => {}
        }
        return None;
    }

    if state.show_delete_confirmation {
        match key.code {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                let id = state.selected_client_id()?;
                state.remove(id);
                return Some(ClientAction::DeleteClient(id));
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    let len = state.visible().len();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(ClientAction::Back),
        KeyCode::Char('n') => return Some(ClientAction::NewClient),
        KeyCode::Char('e') | KeyCode::Enter => {
            return state.selected_client_id().map(ClientAction::EditClient)
        }
        KeyCode::Char('d') => {
            if state.selected_client().is_some() {
                state.show_delete_confirmation = true;
            }
        }
        KeyCode::Char('/') => state.searching = true,
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

    fn client(id: i32, name: &str) -> Client {
        let mut client = Client::new();
        client.id = id;
        client.company_name = name.to_string();
        client
    }

    fn press(state: &mut ClientsState, code: KeyCode) -> Option<ClientAction> {
        handle_input(state, KeyEvent::new(code, KeyModifiers::NONE))
    }

    #[test]
    fn search_narrows_the_selection() {
        let mut state = ClientsState::new(vec![client(1, "Foto Sul"), client(2, "Casa Norte")]);
        press(&mut state, KeyCode::Char('/'));
        for c in "norte".chars() {
            press(&mut state, KeyCode::Char(c));
        }
        press(&mut state, KeyCode::Enter);
        assert_eq!(state.visible().len(), 1);
        assert_eq!(state.selected_client_id(), Some(2));
    }

    #[test]
    fn confirmed_delete_removes_locally() {
        let mut state = ClientsState::new(vec![client(1, "Foto Sul"), client(2, "Casa Norte")]);
        press(&mut state, KeyCode::Char('d'));
        assert!(matches!(
            press(&mut state, KeyCode::Char('y')),
            Some(ClientAction::DeleteClient(1))
        ));
        assert_eq!(state.visible().len(), 1);
        assert_eq!(state.selected_client_id(), Some(2));
    }
}

use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::components::{body_and_footer, money, render_confirmation, render_help, ListCursor};
use crate::models::{EntryKind, EntryStatus, FinanceEntry};
use crate::services::finance::{self, KindFilter};

pub struct FinanceState {
    entries: Vec<FinanceEntry>,
    search: String,
    searching: bool,
    kind: KindFilter,
    cursor: ListCursor,
    show_delete_confirmation: bool,
}

pub enum FinanceAction {
    Back,
    NewEntry,
    EditEntry(i32),
    DeleteEntry(i32),
    SetStatus(i32, EntryStatus),
}

impl FinanceState {
    pub fn new(entries: Vec<FinanceEntry>) -> Self {
        let cursor = ListCursor::new(entries.len());
        Self {
            entries,
            search: String::new(),
            searching: false,
            kind: KindFilter::All,
            cursor,
            show_delete_confirmation: false,
        }
    }

    pub fn visible(&self) -> Vec<&FinanceEntry> {
        finance::filter(&self.entries, &self.search, self.kind)
    }

    pub fn selected_entry(&self) -> Option<&FinanceEntry> {
        let visible = self.visible();
        self.cursor.selected().and_then(|i| visible.get(i).copied())
    }

    pub fn set_status(&mut self, id: i32, status: EntryStatus) {
        if let Some(entry) = self.entries.iter_mut().find(|e| e.id == id) {
            entry.status = status;
        }
    }

    pub fn remove(&mut self, id: i32) {
        self.entries.retain(|e| e.id != id);
        let len = self.visible().len();
        self.cursor.clamp(len);
    }

    fn refilter(&mut self) {
        let len = self.visible().len();
        self.cursor.reset(len);
    }
}

pub fn render_finance<B: Backend>(frame: &mut Frame<B>, state: &mut FinanceState) {
    let (body, footer) = body_and_footer(frame.size());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Length(3),
                Constraint::Min(1),
            ]
            .as_ref(),
        )
        .split(body);

    let filters = Paragraph::new(format!(
        "{}{}   kind: {}",
        state.search,
        if state.searching { "|" } else { "" },
        state.kind
    ))
    .style(if state.searching {
        Style::default().fg(Color::Yellow)
    } else {
        Style::default()
    })
    .block(Block::default().title("Search").borders(Borders::ALL));
    frame.render_widget(filters, chunks[0]);

    let summary = finance::summarize(state.visible());
    let totals = Spans::from(vec![
        Span::styled("Paid income ", Style::default().fg(Color::Yellow)),
        Span::raw(money(summary.income)),
        Span::styled("   Paid expenses ", Style::default().fg(Color::Yellow)),
        Span::raw(money(summary.expenses)),
        Span::styled("   Balance ", Style::default().fg(Color::Yellow)),
        Span::styled(
            money(summary.balance),
            Style::default().fg(if summary.balance < 0.0 {
                Color::Red
            } else {
                Color::Green
            }),
        ),
    ]);
    frame.render_widget(
        Paragraph::new(totals).block(Block::default().title("Summary").borders(Borders::ALL)),
        chunks[1],
    );

    let items: Vec<ListItem> = state
        .visible()
        .into_iter()
        .map(|entry| {
            let amount_color = match entry.kind {
                EntryKind::Income => Color::Green,
                EntryKind::Expense => Color::Red,
            };
            ListItem::new(Spans::from(vec![
                Span::raw(format!(
                    "{:<10} ",
                    entry
                        .due_date
                        .map(|d| d.format("%d/%m/%Y").to_string())
                        .unwrap_or_else(|| "-".to_string())
                )),
                Span::styled(
                    format!("{:<34}", entry.description),
                    Style::default().add_modifier(Modifier::BOLD),
                ),
                Span::raw(format!(" {:<16} ", entry.category.as_deref().unwrap_or("-"))),
                Span::styled(
                    format!("{:>15}", money(entry.signed_amount())),
                    Style::default().fg(amount_color),
                ),
                Span::raw(format!("  {}", entry.status.label())),
            ]))
        })
        .collect();

    let entries_list = List::new(items)
        .block(
            Block::default()
                .title(format!("Finance ({})", state.entries.len()))
                .borders(Borders::ALL),
        )
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(entries_list, chunks[2], &mut state.cursor.state);

    let help = if state.searching {
        "Type to filter | <Enter>/<Esc> Done"
    } else {
        "<N> New | <E> Edit | <D> Delete | <P> Paid/open | <K> Kind filter | </> Search | <Esc> Back"
    };
    render_help(frame, footer, help);

    if state.show_delete_confirmation {
        render_confirmation(
            frame,
            "Confirm Delete",
            &["Are you sure you want to delete this entry?"],
        );
    }
}

pub fn handle_input(state: &mut FinanceState, key: KeyEvent) -> Option<FinanceAction> {
    if state.searching {
        match key.code {
            KeyCode::Enter | KeyCode::Esc => state.searching = false,
            KeyCode::Backspace => {
                state.search.pop();
                state.refilter();
            }
            KeyCode::Char(c) => {
                state.search.push(c);
                state.refilter();
            }
            _ => {}
        }
        return None;
    }

    if state.show_delete_confirmation {
        match key.code {
            KeyCode::Char('y') => {
                state.show_delete_confirmation = false;
                let id = state.selected_entry()?.id;
                state.remove(id);
                return Some(FinanceAction::DeleteEntry(id));
            }
            KeyCode::Char('n') | KeyCode::Esc => state.show_delete_confirmation = false,
            _ => {}
        }
        return None;
    }

    let len = state.visible().len();
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => return Some(FinanceAction::Back),
        KeyCode::Char('n') => return Some(FinanceAction::NewEntry),
        KeyCode::Char('e') | KeyCode::Enter => {
            return state.selected_entry().map(|e| FinanceAction::EditEntry(e.id))
        }
        KeyCode::Char('d') => {
            if state.selected_entry().is_some() {
                state.show_delete_confirmation = true;
            }
        }
        KeyCode::Char('p') => {
            let (id, status) = state.selected_entry().map(|e| (e.id, e.toggled_status()))?;
            state.set_status(id, status);
            return Some(FinanceAction::SetStatus(id, status));
        }
        KeyCode::Char('k') => {
            state.kind = state.kind.next();
            state.refilter();
        }
        KeyCode::Char('/') => state.searching = true,
        KeyCode::Down => state.cursor.next(len),
        KeyCode::Up => state.cursor.previous(len),
        _ => {}
    }
    None
}

use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::components::{body_and_footer, money, render_help, ListCursor};
use crate::services::dashboard::Dashboard;
use crate::services::time_tracker::format_duration;

/// Back-office sections reachable from the dashboard menu
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Section {
    Clients,
    Jobs,
    Finance,
    Categories,
    Projects,
    Messages,
    Analytics,
    ChangePassword,
}

impl Section {
    pub const ALL: [Section; 8] = [
        Section::Clients,
        Section::Jobs,
        Section::Finance,
        Section::Categories,
        Section::Projects,
        Section::Messages,
        Section::Analytics,
        Section::ChangePassword,
    ];

    pub fn title(&self) -> &'static str {
        match self {
            Section::Clients => "Clients",
            Section::Jobs => "Jobs",
            Section::Finance => "Finance",
            Section::Categories => "Portfolio categories",
            Section::Projects => "Portfolio projects",
            Section::Messages => "Messages",
            Section::Analytics => "Analytics",
            Section::ChangePassword => "Change password",
        }
    }
}

pub enum DashboardAction {
    Open(Section),
    Refresh,
    Logout,
}

pub struct DashboardState {
    dashboard: Dashboard,
    signed_in_as: String,
    menu: ListCursor,
}

impl DashboardState {
    pub fn new(dashboard: Dashboard, signed_in_as: String) -> Self {
        Self {
            dashboard,
            signed_in_as,
            menu: ListCursor::new(Section::ALL.len()),
        }
    }

    pub fn selected_section(&self) -> Option<Section> {
        self.menu.selected().and_then(|i| Section::ALL.get(i).copied())
    }
}

pub fn render_dashboard<B: Backend>(frame: &mut Frame<B>, state: &mut DashboardState) {
    let (body, footer) = body_and_footer(frame.size());
    let columns = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Length(28), Constraint::Min(20)].as_ref())
        .split(body);

    let items: Vec<ListItem> = Section::ALL
        .iter()
        .enumerate()
        .map(|(i, section)| ListItem::new(format!("{}. {}", i + 1, section.title())))
        .collect();
    let menu = List::new(items)
        .block(Block::default().title("Menu").borders(Borders::ALL))
        .highlight_style(
            Style::default()
                .bg(Color::Blue)
                .fg(Color::White)
                .add_modifier(Modifier::BOLD),
        );
    frame.render_stateful_widget(menu, columns[0], &mut state.menu.state);

    let panels = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(9),
            Constraint::Length(8),
            Constraint::Min(3),
        ])
        .split(columns[1]);

    let stats = &state.dashboard.stats;
    let stat = |label: &str, value: String| {
        Spans::from(vec![
            Span::styled(format!("{:<16}", label), Style::default().fg(Color::Yellow)),
            Span::raw(value),
        ])
    };
    let lines = vec![
        stat("Clients", stats.total_clients.to_string()),
        stat("Jobs", stats.total_jobs.to_string()),
        stat("Income (paid)", money(stats.income)),
        stat("Expenses", money(stats.expenses)),
        stat("Balance", money(stats.balance())),
        stat("Receivable", money(stats.receivable)),
        stat("Tracked time", format_duration(stats.tracked_seconds)),
    ];
    let title = format!("Dashboard - {}", state.signed_in_as);
    frame.render_widget(
        Paragraph::new(lines).block(Block::default().title(title).borders(Borders::ALL)),
        panels[0],
    );

    let recent: Vec<ListItem> = state
        .dashboard
        .recent_jobs
        .iter()
        .map(|listing| {
            ListItem::new(format!(
                "{:<30} {:<20} {:>14} {}",
                listing.job.title,
                listing.client_name.as_deref().unwrap_or("-"),
                money(listing.job.value),
                listing.job.status.label()
            ))
        })
        .collect();
    frame.render_widget(
        List::new(recent).block(Block::default().title("Recent jobs").borders(Borders::ALL)),
        panels[1],
    );

    let flow: Vec<ListItem> = state
        .dashboard
        .cash_flow
        .iter()
        .rev()
        .map(|month| {
            ListItem::new(format!(
                "{}  in {:>14}  out {:>14}",
                month.label(),
                money(month.income),
                money(month.expenses)
            ))
        })
        .collect();
    frame.render_widget(
        List::new(flow).block(Block::default().title("Monthly cash flow").borders(Borders::ALL)),
        panels[2],
    );

    render_help(
        frame,
        footer,
        "<Enter>/<1-8> Open | <R> Refresh | <L> Log out",
    );
}

pub fn handle_input(state: &mut DashboardState, key: KeyEvent) -> Option<DashboardAction> {
    let len = Section::ALL.len();
    match key.code {
        KeyCode::Down => state.menu.next(len),
        KeyCode::Up => state.menu.previous(len),
        KeyCode::Enter => return state.selected_section().map(DashboardAction::Open),
        KeyCode::Char(c @ '1'..='8') => {
            let index = c as usize - '1' as usize;
            return Section::ALL.get(index).copied().map(DashboardAction::Open);
        }
        KeyCode::Char('r') => return Some(DashboardAction::Refresh),
        KeyCode::Char('l') | KeyCode::Char('q') | KeyCode::Esc => {
            return Some(DashboardAction::Logout)
        }
        _ => {}
    }
    None
}

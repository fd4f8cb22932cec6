pub mod date_input;
pub mod form;

use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Color, Style},
    text::Spans,
    widgets::{Block, Borders, Clear, ListState, Paragraph, Wrap},
    Frame,
};

/// Selection over a list that wraps at both ends
#[derive(Default, Debug, Clone)]
pub struct ListCursor {
    pub state: ListState,
}

impl ListCursor {
    pub fn new(len: usize) -> Self {
        let mut cursor = Self::default();
        cursor.reset(len);
        cursor
    }

    /// Select the first row, or nothing when the list is empty.
    pub fn reset(&mut self, len: usize) {
        self.state.select(if len == 0 { None } else { Some(0) });
    }

    /// Keep the selection inside `0..len` after rows were removed.
    pub fn clamp(&mut self, len: usize) {
        match self.state.selected() {
            _ if len == 0 => self.state.select(None),
            Some(i) if i >= len => self.state.select(Some(len - 1)),
            None => self.state.select(Some(0)),
            _ => {}
        }
    }

    pub fn selected(&self) -> Option<usize> {
        self.state.selected()
    }

    pub fn select(&mut self, index: usize) {
        self.state.select(Some(index));
    }

    pub fn next(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(i) if i + 1 < len => i + 1,
            _ => 0,
        };
        self.state.select(Some(i));
    }

    pub fn previous(&mut self, len: usize) {
        if len == 0 {
            return;
        }
        let i = match self.state.selected() {
            Some(0) | None => len - 1,
            Some(i) => i - 1,
        };
        self.state.select(Some(i));
    }
}

/// Message shown under the current screen until the next key press
#[derive(Debug, Clone, PartialEq)]
pub enum Notice {
    Info(String),
    Error(String),
}

pub fn render_notice<B: Backend>(frame: &mut Frame<B>, notice: &Notice) {
    let size = frame.size();
    if size.height < 3 {
        return;
    }
    let area = Rect::new(size.x, size.y + size.height - 3, size.width, 3);
    let (title, text, color) = match notice {
        Notice::Info(text) => ("Info", text, Color::Green),
        Notice::Error(text) => ("Error", text, Color::Red),
    };

    let paragraph = Paragraph::new(text.as_str())
        .block(Block::default().title(title).borders(Borders::ALL))
        .style(Style::default().fg(color).bg(Color::Black))
        .wrap(Wrap { trim: true });
    frame.render_widget(Clear, area);
    frame.render_widget(paragraph, area);
}

pub fn render_confirmation<B: Backend>(frame: &mut Frame<B>, title: &str, lines: &[&str]) {
    let area = centered_rect(50, 25, frame.size());
    let mut text: Vec<Spans> = vec![Spans::from("")];
    for line in lines {
        text.push(Spans::from(*line));
        text.push(Spans::from(""));
    }
    text.push(Spans::from("<Y> Yes  <N> No"));

    let popup = Paragraph::new(text)
        .block(Block::default().title(title).borders(Borders::ALL))
        .style(Style::default().fg(Color::White).bg(Color::Black));
    frame.render_widget(Clear, area);
    frame.render_widget(popup, area);
}

/// Help line at the bottom of a screen
pub fn render_help<B: Backend>(frame: &mut Frame<B>, area: Rect, text: &str) {
    let help = Paragraph::new(text)
        .block(Block::default().borders(Borders::TOP))
        .style(Style::default().fg(Color::Gray));
    frame.render_widget(help, area);
}

/// Body plus a three-row footer
pub fn body_and_footer(area: Rect) -> (Rect, Rect) {
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(1), Constraint::Length(3)].as_ref())
        .split(area);
    (chunks[0], chunks[1])
}

pub fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

pub fn money(amount: f64) -> String {
    format!("R$ {:.2}", amount)
}

use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::{Constraint, Direction, Layout},
    style::{Color, Style},
    text::{Span, Spans},
    widgets::{BarChart, Block, Borders, List, ListItem, Paragraph},
    Frame,
};

use super::components::{body_and_footer, render_help};
use crate::services::analytics::{AnalyticsReport, WINDOW_DAYS};

pub struct AnalyticsState {
    report: AnalyticsReport,
}

pub enum AnalyticsAction {
    Back,
    Refresh,
}

impl AnalyticsState {
    pub fn new(report: AnalyticsReport) -> Self {
        Self { report }
    }
}

pub fn render_analytics<B: Backend>(frame: &mut Frame<B>, state: &mut AnalyticsState) {
    let (body, footer) = body_and_footer(frame.size());
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints(
            [
                Constraint::Length(3),
                Constraint::Min(8),
                Constraint::Length(8),
            ]
            .as_ref(),
        )
        .split(body);

    let report = &state.report;
    let totals = Spans::from(vec![
        Span::styled("Total views ", Style::default().fg(Color::Yellow)),
        Span::raw(report.total_views.to_string()),
        Span::styled(
            format!("   Last {} days ", WINDOW_DAYS),
            Style::default().fg(Color::Yellow),
        ),
        Span::raw(report.window_views.to_string()),
        Span::styled("   Daily average ", Style::default().fg(Color::Yellow)),
        Span::raw(report.daily_average.to_string()),
    ]);
    frame.render_widget(
        Paragraph::new(totals).block(Block::default().title("Analytics").borders(Borders::ALL)),
        chunks[0],
    );

    let labels: Vec<String> = report
        .daily
        .iter()
        .map(|day| day.date.format("%d").to_string())
        .collect();
    let data: Vec<(&str, u64)> = labels
        .iter()
        .zip(&report.daily)
        .map(|(label, day)| (label.as_str(), day.views as u64))
        .collect();
    let chart = BarChart::default()
        .block(
            Block::default()
                .title("Views per day")
                .borders(Borders::ALL),
        )
        .data(&data)
        .bar_width(3)
        .bar_gap(1)
        .bar_style(Style::default().fg(Color::Cyan))
        .value_style(Style::default().fg(Color::Black).bg(Color::Cyan));
    frame.render_widget(chart, chunks[1]);

    let pages: Vec<ListItem> = report
        .top_pages
        .iter()
        .map(|page| ListItem::new(format!("{:>6}  {}", page.count, page.path)))
        .collect();
    frame.render_widget(
        List::new(pages).block(Block::default().title("Top pages").borders(Borders::ALL)),
        chunks[2],
    );

    render_help(frame, footer, "<R> Refresh | <Esc> Back");
}

pub fn handle_input(_state: &mut AnalyticsState, key: KeyEvent) -> Option<AnalyticsAction> {
    match key.code {
        KeyCode::Char('q') | KeyCode::Esc => Some(AnalyticsAction::Back),
        KeyCode::Char('r') => Some(AnalyticsAction::Refresh),
        _ => None,
    }
}

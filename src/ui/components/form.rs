use chrono::NaiveDate;
use crossterm::event::{KeyCode, KeyEvent};
use tui::{
    backend::Backend,
    layout::Rect,
    style::{Color, Modifier, Style},
    text::{Span, Spans},
    widgets::{Block, Borders, List, ListItem},
    Frame,
};

use super::date_input::DateInputState;

#[derive(Clone, Debug)]
pub enum FieldValue {
    Text(String),
    /// Shown as asterisks
    Secret(String),
    Date(DateInputState),
    Toggle(bool),
    /// `(id, label)` pairs; index 0 is usually "none"
    Choice {
        options: Vec<(Option<i32>, String)>,
        index: usize,
    },
}

#[derive(Clone, Debug)]
pub struct Field {
    pub label: &'static str,
    pub value: FieldValue,
}

impl Field {
    pub fn text(label: &'static str, value: impl Into<String>) -> Self {
        Self {
            label,
            value: FieldValue::Text(value.into()),
        }
    }

    pub fn optional(label: &'static str, value: Option<&str>) -> Self {
        Self::text(label, value.unwrap_or_default())
    }

    pub fn secret(label: &'static str) -> Self {
        Self {
            label,
            value: FieldValue::Secret(String::new()),
        }
    }

    pub fn date(label: &'static str, value: Option<NaiveDate>) -> Self {
        Self {
            label,
            value: FieldValue::Date(DateInputState::new(value)),
        }
    }

    pub fn toggle(label: &'static str, value: bool) -> Self {
        Self {
            label,
            value: FieldValue::Toggle(value),
        }
    }

    /// Selects the option whose id equals `selected`, falling back to the first one.
    pub fn choice(
        label: &'static str,
        options: Vec<(Option<i32>, String)>,
        selected: Option<i32>,
    ) -> Self {
        let index = options
            .iter()
            .position(|(id, _)| *id == selected)
            .unwrap_or(0);
        Self {
            label,
            value: FieldValue::Choice { options, index },
        }
    }

    fn display(&self) -> String {
        match &self.value {
            FieldValue::Text(text) => text.clone(),
            FieldValue::Secret(text) => "*".repeat(text.chars().count()),
            FieldValue::Date(date) => date.get_display_string(),
            FieldValue::Toggle(on) => if *on { "[x]" } else { "[ ]" }.to_string(),
            FieldValue::Choice { options, index } => options
                .get(*index)
                .map(|(_, label)| format!("< {} >", label))
                .unwrap_or_default(),
        }
    }
}

/// What a key press meant for the form as a whole
#[derive(Debug, PartialEq, Eq)]
pub enum FormEvent {
    Save,
    Cancel,
}

#[derive(Clone, Debug)]
pub struct FormState {
    pub fields: Vec<Field>,
    pub current: usize,
    pub editing: bool,
}

impl FormState {
    pub fn new(fields: Vec<Field>) -> Self {
        Self {
            fields,
            current: 0,
            editing: false,
        }
    }

    pub fn next_field(&mut self) {
        self.current = (self.current + 1) % self.fields.len().max(1);
    }

    pub fn previous_field(&mut self) {
        let len = self.fields.len().max(1);
        self.current = (self.current + len - 1) % len;
    }

    fn toggle_editing(&mut self) {
        let Some(field) = self.fields.get_mut(self.current) else {
            return;
        };
        match &mut field.value {
            FieldValue::Toggle(on) => *on = !*on,
            FieldValue::Choice { options, index } => {
                *index = (*index + 1) % options.len().max(1);
            }
            FieldValue::Date(date) => {
                date.toggle_editing();
                self.editing = date.editing;
            }
            FieldValue::Text(_) | FieldValue::Secret(_) => self.editing = !self.editing,
        }
    }

    fn edit_current_field(&mut self, key: KeyCode) {
        let Some(field) = self.fields.get_mut(self.current) else {
            return;
        };
        match &mut field.value {
            FieldValue::Text(text) | FieldValue::Secret(text) => match key {
                KeyCode::Char(c) => text.push(c),
                KeyCode::Backspace => {
                    text.pop();
                }
                _ => {}
            },
            FieldValue::Date(date) => match key {
                KeyCode::Delete => {
                    date.clear();
                    self.editing = false;
                }
                other => date.handle_input(other),
            },
            FieldValue::Toggle(_) | FieldValue::Choice { .. } => {}
        }
    }

    fn cycle_choice(&mut self, forward: bool) {
        if let Some(Field {
            value: FieldValue::Choice { options, index },
            ..
        }) = self.fields.get_mut(self.current)
        {
            let len = options.len().max(1);
            *index = if forward {
                (*index + 1) % len
            } else {
                (*index + len - 1) % len
            };
        }
    }

    /// Apply one key press. Returns `Save`/`Cancel` when the key leaves the form.
    pub fn handle_key(&mut self, key: KeyEvent) -> Option<FormEvent> {
        if self.editing {
            match key.code {
                KeyCode::Enter | KeyCode::Esc => self.toggle_editing(),
                code => self.edit_current_field(code),
            }
            return None;
        }

        match key.code {
            KeyCode::Esc => return Some(FormEvent::Cancel),
            KeyCode::Char('s') => return Some(FormEvent::Save),
            KeyCode::Enter | KeyCode::Char(' ') => self.toggle_editing(),
            KeyCode::Up => self.previous_field(),
            KeyCode::Down | KeyCode::Tab => self.next_field(),
            KeyCode::Left => self.cycle_choice(false),
            KeyCode::Right => self.cycle_choice(true),
            KeyCode::Delete => {
                if let Some(Field {
                    value: FieldValue::Date(date),
                    ..
                }) = self.fields.get_mut(self.current)
                {
                    date.clear();
                }
            }
            _ => {}
        }
        None
    }

    pub fn text(&self, index: usize) -> String {
        match self.fields.get(index).map(|f| &f.value) {
            Some(FieldValue::Text(text)) => text.trim().to_string(),
            Some(FieldValue::Secret(text)) => text.clone(),
            _ => String::new(),
        }
    }

    /// Trimmed text, `None` when blank.
    pub fn optional_text(&self, index: usize) -> Option<String> {
        Some(self.text(index)).filter(|t| !t.is_empty())
    }

    pub fn set_text(&mut self, index: usize, value: String) {
        if let Some(Field {
            value: FieldValue::Text(text),
            ..
        }) = self.fields.get_mut(index)
        {
            *text = value;
        }
    }

    pub fn date(&self, index: usize) -> Option<NaiveDate> {
        match self.fields.get(index).map(|f| &f.value) {
            Some(FieldValue::Date(date)) => date.date,
            _ => None,
        }
    }

    pub fn toggle(&self, index: usize) -> bool {
        matches!(
            self.fields.get(index).map(|f| &f.value),
            Some(FieldValue::Toggle(true))
        )
    }

    pub fn choice(&self, index: usize) -> Option<i32> {
        match self.fields.get(index).map(|f| &f.value) {
            Some(FieldValue::Choice { options, index }) => {
                options.get(*index).and_then(|(id, _)| *id)
            }
            _ => None,
        }
    }

    pub fn set_choice(&mut self, field: usize, selected: Option<i32>) {
        if let Some(Field {
            value: FieldValue::Choice { options, index },
            ..
        }) = self.fields.get_mut(field)
        {
            if let Some(position) = options.iter().position(|(id, _)| *id == selected) {
                *index = position;
            }
        }
    }

    /// Decimal input accepting either `.` or `,` as separator; blank is zero.
    pub fn number(&self, index: usize) -> Option<f64> {
        let text = self.text(index).replace(',', ".");
        if text.is_empty() {
            return Some(0.0);
        }
        text.parse().ok()
    }
}

pub fn render_form<B: Backend>(frame: &mut Frame<B>, form: &FormState, area: Rect, title: &str) {
    let items: Vec<ListItem> = form
        .fields
        .iter()
        .enumerate()
        .map(|(i, field)| {
            let selected = i == form.current;
            let label_style = if selected {
                Style::default().fg(Color::Yellow)
            } else {
                Style::default()
            };
            let value = if selected && form.editing && !matches!(field.value, FieldValue::Date(_)) {
                Span::styled(
                    format!("{}|", field.display()),
                    Style::default().add_modifier(Modifier::BOLD),
                )
            } else {
                Span::raw(field.display())
            };

            ListItem::new(Spans::from(vec![
                Span::styled(format!("{}: ", field.label), label_style),
                value,
            ]))
        })
        .collect();

    let list = List::new(items).block(Block::default().borders(Borders::ALL).title(title));
    frame.render_widget(list, area);
}

pub fn form_help(form: &FormState) -> &'static str {
    if form.editing {
        "Enter/Esc - Finish editing | Left/Right - Date part | Del - Clear date"
    } else {
        "Up/Down - Navigate | Enter - Edit/toggle | Left/Right - Choose | S - Save | Esc - Cancel"
    }
}

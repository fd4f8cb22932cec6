use chrono::{Datelike, NaiveDate, Utc};
use crossterm::event::KeyCode;

#[derive(Clone, Copy, PartialEq, Debug)]
pub enum DatePart {
    Year,
    Month,
    Day,
}

/// Optional date typed part by part (`YYYY`, `MM`, `DD`)
#[derive(Clone, Debug)]
pub struct DateInputState {
    pub date: Option<NaiveDate>,
    pub editing: bool,
    pub date_part: DatePart,
    pub current_date_input: String,
}

impl DateInputState {
    pub fn new(date: Option<NaiveDate>) -> Self {
        Self {
            date,
            editing: false,
            date_part: DatePart::Year,
            current_date_input: String::new(),
        }
    }

    /// Entering edit mode on an empty date starts from today.
    pub fn toggle_editing(&mut self) {
        self.editing = !self.editing;
        if self.editing {
            self.date.get_or_insert_with(|| Utc::now().date_naive());
            self.date_part = DatePart::Year;
            self.current_date_input.clear();
        }
    }

    pub fn clear(&mut self) {
        self.date = None;
        self.editing = false;
        self.current_date_input.clear();
    }

    pub fn next_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Month,
            DatePart::Month => DatePart::Day,
            DatePart::Day => DatePart::Year,
        };
        self.current_date_input.clear();
    }

    pub fn previous_date_part(&mut self) {
        self.date_part = match self.date_part {
            DatePart::Year => DatePart::Day,
            DatePart::Month => DatePart::Year,
            DatePart::Day => DatePart::Month,
        };
        self.current_date_input.clear();
    }

    pub fn handle_input(&mut self, key: KeyCode) {
        if !self.editing {
            return;
        }
        let Some(date) = self.date else {
            return;
        };

        match key {
            KeyCode::Char(c) if c.is_ascii_digit() => {
                self.current_date_input.push(c);
                let (year, month, day) = (date.year(), date.month(), date.day());
                let wanted = match self.date_part {
                    DatePart::Year => 4,
                    DatePart::Month | DatePart::Day => 2,
                };
                if self.current_date_input.len() < wanted {
                    return;
                }

                let typed = self.current_date_input.parse::<u32>().unwrap_or_default();
                let updated = match self.date_part {
                    DatePart::Year if (1900..=2100).contains(&typed) => {
                        NaiveDate::from_ymd_opt(typed as i32, month, day.min(days_in_month(typed as i32, month)))
                    }
                    DatePart::Month if (1..=12).contains(&typed) => {
                        NaiveDate::from_ymd_opt(year, typed, day.min(days_in_month(year, typed)))
                    }
                    DatePart::Day if typed >= 1 && typed <= days_in_month(year, month) => {
                        NaiveDate::from_ymd_opt(year, month, typed)
                    }
                    _ => None,
                };
                if let Some(updated) = updated {
                    self.date = Some(updated);
                    self.next_date_part();
                }
                self.current_date_input.clear();
            }
            KeyCode::Backspace => {
                self.current_date_input.pop();
            }
            KeyCode::Right => self.next_date_part(),
            KeyCode::Left => self.previous_date_part(),
            _ => {}
        }
    }

    pub fn get_display_string(&self) -> String {
        let Some(date) = self.date else {
            return "(none)".to_string();
        };
        let date_str = date.format("%Y-%m-%d").to_string();
        if !self.editing {
            return date_str;
        }

        let current_input = if !self.current_date_input.is_empty() {
            format!("[{}]", self.current_date_input)
        } else {
            match self.date_part {
                DatePart::Year => "[YYYY]".to_string(),
                DatePart::Month => "[MM]".to_string(),
                DatePart::Day => "[DD]".to_string(),
            }
        };
        let (year, month, day) = (
            format!("{:04}", date.year()),
            format!("{:02}", date.month()),
            format!("{:02}", date.day()),
        );
        match self.date_part {
            DatePart::Year => format!("{}{}-{}-{}", year, current_input, month, day),
            DatePart::Month => format!("{}-{}{}-{}", year, month, current_input, day),
            DatePart::Day => format!("{}-{}-{}{}", year, month, day, current_input),
        }
    }
}

fn days_in_month(year: i32, month: u32) -> u32 {
    match month {
        1 | 3 | 5 | 7 | 8 | 10 | 12 => 31,
        4 | 6 | 9 | 11 => 30,
        2 => {
            if (year % 4 == 0 && year % 100 != 0) || (year % 400 == 0) {
                29
            } else {
                28
            }
        }
        _ => 30,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn type_digits(state: &mut DateInputState, digits: &str) {
        for c in digits.chars() {
            state.handle_input(KeyCode::Char(c));
        }
    }

    #[test]
    fn typing_each_part_moves_to_the_next() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2024, 1, 31));
        state.toggle_editing();
        type_digits(&mut state, "2023");
        assert_eq!(state.date_part, DatePart::Month);
        type_digits(&mut state, "02");
        // Jan 31 clamps to the end of February
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2023, 2, 28));
        type_digits(&mut state, "14");
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2023, 2, 14));
    }

    #[test]
    fn out_of_range_parts_are_ignored() {
        let mut state = DateInputState::new(NaiveDate::from_ymd_opt(2024, 4, 10));
        state.toggle_editing();
        state.next_date_part();
        type_digits(&mut state, "13");
        assert_eq!(state.date, NaiveDate::from_ymd_opt(2024, 4, 10));
        assert_eq!(state.date_part, DatePart::Month);
    }

    #[test]
    fn empty_date_starts_from_today_and_can_be_cleared() {
        let mut state = DateInputState::new(None);
        assert_eq!(state.get_display_string(), "(none)");
        state.toggle_editing();
        assert!(state.date.is_some());
        state.clear();
        assert_eq!(state.date, None);
        assert!(!state.editing);
    }
}

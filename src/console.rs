//! Line-based stand-in for the reminder window: three prompts to add a
//! reminder and a table that is reprinted whenever the store changes.

use std::fmt::Write as _;

use tokio::io::{self, AsyncBufReadExt, BufReader};

use crate::{
    error::ReminderError,
    reminder::Reminder,
    scheduling::{ReminderManager, StoreObserver},
    storage::COLUMNS,
    time_parser,
};

const LIST_COMMAND: &str = ":list";
const QUIT_COMMAND: &str = ":quit";

#[derive(Clone, Default, PartialEq, Eq, Debug)]
pub enum CreatingReminderState {
    #[default]
    WaitingForText,
    WaitingForDay {
        text: String,
    },
    WaitingForTime {
        text: String,
        day_text: String,
    },
}

#[derive(Debug, PartialEq, Eq)]
pub enum DialogueAction {
    Continue,
    Submit {
        text: String,
        day_text: String,
        time_text: String,
    },
    List,
    Quit,
}

impl CreatingReminderState {
    pub fn prompt(&self) -> &'static str {
        match self {
            CreatingReminderState::WaitingForText => "What do you want to remind of?",
            CreatingReminderState::WaitingForDay { .. } => "Enter the date in YYYY-MM-DD format",
            CreatingReminderState::WaitingForTime { .. } => {
                "Enter the time in HH:MM AM or PM format"
            }
        }
    }

    /// Consumes one input line. Commands are only recognised at the text prompt.
    pub fn advance(self, line: &str) -> (Self, DialogueAction) {
        let line = line.trim_end_matches(['\r', '\n']);
        match self {
            CreatingReminderState::WaitingForText => match line.trim() {
                LIST_COMMAND => (self, DialogueAction::List),
                QUIT_COMMAND => (self, DialogueAction::Quit),
                _ => (
                    CreatingReminderState::WaitingForDay {
                        text: line.to_owned(),
                    },
                    DialogueAction::Continue,
                ),
            },
            CreatingReminderState::WaitingForDay { text } => (
                CreatingReminderState::WaitingForTime {
                    text,
                    day_text: line.trim().to_owned(),
                },
                DialogueAction::Continue,
            ),
            CreatingReminderState::WaitingForTime { text, day_text } => (
                CreatingReminderState::WaitingForText,
                DialogueAction::Submit {
                    text,
                    day_text,
                    time_text: line.trim().to_owned(),
                },
            ),
        }
    }
}

/// Prints the reminder table on every store change.
pub struct ConsoleView;

impl StoreObserver for ConsoleView {
    fn on_store_changed(&self, reminders: &[Reminder]) {
        println!("{}", render_table(reminders));
    }
}

pub fn render_table(reminders: &[Reminder]) -> String {
    let rows: Vec<[String; 3]> = reminders
        .iter()
        .map(|reminder| {
            [
                reminder.text.replace('\n', " "),
                time_parser::format_day(&reminder.day),
                time_parser::format_time(&reminder.time),
            ]
        })
        .collect();

    let mut widths = COLUMNS.map(str::len);
    for row in &rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let mut table = String::new();
    let _ = writeln!(
        table,
        "{:<w0$} | {:<w1$} | {}",
        COLUMNS[0],
        COLUMNS[1],
        COLUMNS[2],
        w0 = widths[0],
        w1 = widths[1]
    );
    let _ = write!(
        table,
        "{}-+-{}-+-{}",
        "-".repeat(widths[0]),
        "-".repeat(widths[1]),
        "-".repeat(widths[2])
    );
    for [text, day, time] in &rows {
        let _ = write!(
            table,
            "\n{:<w0$} | {:<w1$} | {}",
            text,
            day,
            time,
            w0 = widths[0],
            w1 = widths[1]
        );
    }

    table
}

/// Reads stdin until EOF or `:quit`, adding a reminder for every completed
/// text/date/time triple.
pub async fn run(manager: ReminderManager) -> anyhow::Result<()> {
    let mut lines = BufReader::new(io::stdin()).lines();
    let mut state = CreatingReminderState::default();
    println!("Type {LIST_COMMAND} to show reminders, {QUIT_COMMAND} to exit.");
    println!("{}", state.prompt());

    while let Some(line) = lines.next_line().await? {
        let (next_state, action) = state.advance(&line);
        state = next_state;

        match action {
            DialogueAction::Continue => {}
            DialogueAction::List => println!("{}", render_table(&manager.snapshot().await?)),
            DialogueAction::Quit => break,
            DialogueAction::Submit {
                text,
                day_text,
                time_text,
            } => submit(&manager, &text, &day_text, &time_text).await?,
        }

        println!("{}", state.prompt());
    }

    Ok(())
}

async fn submit(
    manager: &ReminderManager,
    text: &str,
    day_text: &str,
    time_text: &str,
) -> anyhow::Result<()> {
    match manager.add(text, day_text, time_text).await {
        Ok(_) => println!("Reminder added successfully."),
        Err(error) if error.is_validation() => println!("Input Error: {error}"),
        Err(ReminderError::StoreUnavailable) => return Err(ReminderError::StoreUnavailable.into()),
        Err(error) => {
            log::error!("Could not save reminder. [error = {:#}]", anyhow::Error::from(error));
            eprintln!("Could not save reminder, it was not added.");
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use chrono::{NaiveDate, NaiveTime};

    use super::*;

    #[test]
    fn dialogue_collects_text_day_and_time() {
        let state = CreatingReminderState::default();

        let (state, first) = state.advance("Pay rent\n");
        let (state, second) = state.advance(" 2030-02-01 ");
        let (state, third) = state.advance("09:00 AM");

        assert_eq!(first, DialogueAction::Continue);
        assert_eq!(second, DialogueAction::Continue);
        assert_eq!(
            third,
            DialogueAction::Submit {
                text: "Pay rent".to_owned(),
                day_text: "2030-02-01".to_owned(),
                time_text: "09:00 AM".to_owned(),
            }
        );
        assert_eq!(state, CreatingReminderState::WaitingForText);
    }

    #[test]
    fn commands_only_apply_at_text_prompt() {
        let (state, action) = CreatingReminderState::default().advance(":list");
        assert_eq!(action, DialogueAction::List);
        assert_eq!(state, CreatingReminderState::WaitingForText);

        let (_, action) = state.advance(":quit");
        assert_eq!(action, DialogueAction::Quit);

        let day_state = CreatingReminderState::WaitingForDay {
            text: "x".to_owned(),
        };
        let (state, action) = day_state.advance(":quit");
        assert_eq!(action, DialogueAction::Continue);
        assert!(matches!(state, CreatingReminderState::WaitingForTime { .. }));
    }

    #[test]
    fn empty_text_is_passed_through_for_placeholder() {
        let (state, _) = CreatingReminderState::default().advance("");

        assert_eq!(
            state,
            CreatingReminderState::WaitingForDay {
                text: String::new()
            }
        );
    }

    #[test]
    fn table_lists_reminders_in_order() {
        let reminders = vec![
            Reminder::new(
                "Dentist",
                NaiveDate::from_ymd_opt(2030, 1, 2).unwrap(),
                NaiveTime::from_hms_opt(9, 30, 0).unwrap(),
            ),
            Reminder::new(
                "Go",
                NaiveDate::from_ymd_opt(2030, 1, 1).unwrap(),
                NaiveTime::from_hms_opt(18, 0, 5).unwrap(),
            ),
        ];

        let table = render_table(&reminders);

        assert_eq!(
            table,
            "Text    | Day        | Time\n\
             --------+------------+---------\n\
             Dentist | 2030-01-02 | 09:30:00\n\
             Go      | 2030-01-01 | 18:00:05"
        );
    }

    #[test]
    fn empty_table_has_only_header() {
        assert_eq!(render_table(&[]), "Text | Day | Time\n-----+-----+-----");
    }
}

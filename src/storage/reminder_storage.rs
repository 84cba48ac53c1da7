use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
};

use chrono::{NaiveDate, NaiveDateTime};
use tempfile::NamedTempFile;
use thiserror::Error;

use crate::{
    evaluator,
    reminder::{Reminder, ReminderTime},
    time_parser::FormatError,
};

use super::model::{COLUMNS, ReminderRow};

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Could not read reminder file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },

    #[error("Reminder file {path} has unexpected columns {found:?}, expected Text, Day, Time")]
    Columns { path: PathBuf, found: Vec<String> },

    #[error("Row {row} of reminder file {path} could not be parsed")]
    InvalidRow {
        path: PathBuf,
        row: usize,
        #[source]
        source: FormatError,
    },

    #[error("Could not write reminder file {path}")]
    Write {
        path: PathBuf,
        #[source]
        source: csv::Error,
    },
}

/// What to do with a row whose day or time cannot be parsed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LoadPolicy {
    /// Fail the whole load.
    #[default]
    Strict,
    /// Log the row and leave it out.
    SkipInvalidRows,
}

/// Ordered reminder collection mirrored to a CSV file.
///
/// Every mutation rewrites the whole file. When a write fails the in-memory
/// collection is put back the way it was, so it always matches the file.
#[derive(Debug)]
pub struct ReminderStore {
    path: PathBuf,
    reminders: Vec<Reminder>,
}

impl ReminderStore {
    /// An empty store that will persist to `path` on its first mutation.
    pub fn empty(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            reminders: Vec::new(),
        }
    }

    pub fn load(path: impl Into<PathBuf>, policy: LoadPolicy) -> Result<Self, StoreError> {
        let path = path.into();
        let file = match File::open(&path) {
            Ok(file) => file,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("No reminder file yet, starting empty. [path = {}]", path.display());
                return Ok(Self::empty(path));
            }
            Err(err) => {
                return Err(StoreError::Read {
                    path,
                    source: err.into(),
                });
            }
        };

        let reminders = read_reminders(&path, file, policy)?;
        log::info!(
            "Loaded {} reminders. [path = {}]",
            reminders.len(),
            path.display()
        );

        Ok(Self { path, reminders })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.reminders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.reminders.is_empty()
    }

    pub fn snapshot(&self) -> Vec<Reminder> {
        self.reminders.clone()
    }

    pub fn add(
        &mut self,
        text: impl Into<String>,
        day: NaiveDate,
        time: ReminderTime,
    ) -> Result<Reminder, StoreError> {
        let reminder = Reminder::new(text, day, time);
        self.reminders.push(reminder.clone());

        if let Err(err) = self.persist() {
            self.reminders.pop();
            return Err(err);
        }

        Ok(reminder)
    }

    /// Removes and returns the reminders due at `now`. Nothing is written when
    /// none are due.
    pub fn remove_fired(&mut self, now: NaiveDateTime) -> Result<Vec<Reminder>, StoreError> {
        let fired = evaluator::due(&self.reminders, now);
        if fired.is_empty() {
            return Ok(fired);
        }

        let previous = self.reminders.clone();
        self.reminders.retain(|reminder| !reminder.is_due(now));
        if let Err(err) = self.persist() {
            self.reminders = previous;
            return Err(err);
        }

        Ok(fired)
    }

    fn persist(&self) -> Result<(), StoreError> {
        self.write_file().map_err(|source| StoreError::Write {
            path: self.path.clone(),
            source,
        })
    }

    /// Writes into a sibling temp file and renames it over the reminder file.
    fn write_file(&self) -> Result<(), csv::Error> {
        let directory = match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        let temp_file = NamedTempFile::new_in(directory)?;

        {
            let mut writer = csv::WriterBuilder::new()
                .has_headers(false)
                .from_writer(temp_file.as_file());
            writer.write_record(COLUMNS)?;
            for reminder in &self.reminders {
                writer.serialize(ReminderRow::from(reminder))?;
            }
            writer.flush()?;
        }

        temp_file.as_file().sync_all()?;
        temp_file.persist(&self.path).map_err(|err| err.error)?;

        log::debug!(
            "Persisted {} reminders. [path = {}]",
            self.reminders.len(),
            self.path.display()
        );

        Ok(())
    }
}

fn read_reminders(path: &Path, file: File, policy: LoadPolicy) -> Result<Vec<Reminder>, StoreError> {
    let read_error = |source: csv::Error| StoreError::Read {
        path: path.to_path_buf(),
        source,
    };

    let mut reader = csv::Reader::from_reader(file);
    let headers = reader.headers().map_err(read_error)?;
    if headers.iter().ne(COLUMNS) {
        return Err(StoreError::Columns {
            path: path.to_path_buf(),
            found: headers.iter().map(str::to_owned).collect(),
        });
    }

    let mut reminders = Vec::new();
    for (index, row) in reader.deserialize::<ReminderRow>().enumerate() {
        let row_number = index + 1;
        let row = row.map_err(read_error)?;

        match Reminder::try_from(row) {
            Ok(reminder) => reminders.push(reminder),
            Err(source) => match policy {
                LoadPolicy::Strict => {
                    return Err(StoreError::InvalidRow {
                        path: path.to_path_buf(),
                        row: row_number,
                        source,
                    });
                }
                LoadPolicy::SkipInvalidRows => {
                    log::warn!(
                        "Skipping unreadable reminder row. [row = {}, error = {}, path = {}]",
                        row_number,
                        source,
                        path.display()
                    );
                }
            },
        }
    }

    Ok(reminders)
}

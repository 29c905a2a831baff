use crate::error::StorageError;
use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};

/// One saved meal. `meal_data` is kept exactly as the model supplied it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MealRecord {
    pub timestamp: DateTime<Utc>,
    pub date: NaiveDate,
    pub meal_data: Value,
}

impl MealRecord {
    pub fn new(date: NaiveDate, meal_data: Value) -> Self {
        Self {
            timestamp: Utc::now(),
            date,
            meal_data,
        }
    }
}

/// Per-day JSON arrays of [`MealRecord`]s, one `meals_YYYY-MM-DD.json` per date.
#[derive(Debug, Clone)]
pub struct MealStore {
    dir: PathBuf,
}

impl MealStore {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn path_for(&self, date: NaiveDate) -> PathBuf {
        self.dir
            .join(format!("meals_{}.json", date.format("%Y-%m-%d")))
    }

    /// All records saved for `date`. A missing file is an empty day.
    pub fn read_day(&self, date: NaiveDate) -> Result<Vec<MealRecord>, StorageError> {
        let path = self.path_for(date);
        let contents = match fs::read_to_string(&path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(source) => {
                return Err(StorageError::Read {
                    path: display(&path),
                    source,
                });
            }
        };
        if contents.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&contents).map_err(|source| StorageError::Parse {
            path: display(&path),
            source,
        })
    }

    /// Append a record to its day file and return the day's new record count.
    pub fn append(&self, record: MealRecord) -> Result<usize, StorageError> {
        let mut records = self.read_day(record.date)?;
        let path = self.path_for(record.date);
        records.push(record);

        let json = serde_json::to_string_pretty(&records)?;
        fs::create_dir_all(&self.dir).map_err(|source| StorageError::Write {
            path: display(&self.dir),
            source,
        })?;
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, json).map_err(|source| StorageError::Write {
            path: display(&tmp),
            source,
        })?;
        fs::rename(&tmp, &path).map_err(|source| StorageError::Write {
            path: display(&path),
            source,
        })?;

        tracing::debug!(path = %path.display(), count = records.len(), "Saved meal record");
        Ok(records.len())
    }
}

fn display(path: &Path) -> String {
    path.display().to_string()
}

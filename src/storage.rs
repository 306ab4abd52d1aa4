use crate::errors::AppError;
use crate::models::{AppData, Frequency, Habit, HabitId, HabitLogEntry, MAX_NAME_LEN, NewHabit};
use chrono::{DateTime, NaiveDate, Utc};
use std::collections::HashSet;
use std::{env, path::Path, path::PathBuf};
use tokio::fs;
use tracing::{error, warn};

pub fn resolve_data_path() -> Result<PathBuf, std::io::Error> {
    if let Ok(path) = env::var("APP_DATA_PATH") {
        return Ok(PathBuf::from(path));
    }

    Ok(PathBuf::from("data/habits.json"))
}

pub async fn load_data(path: &Path) -> AppData {
    match fs::read(path).await {
        Ok(bytes) => match serde_json::from_slice::<AppData>(&bytes) {
            Ok(mut data) => {
                data.dedup_logs();
                data
            }
            Err(err) => {
                error!("failed to parse data file: {err}");
                set_aside(path).await;
                AppData::default()
            }
        },
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => AppData::default(),
        Err(err) => {
            error!("failed to read data file: {err}");
            AppData::default()
        }
    }
}

/// Moves an unreadable data file out of the way so the next write cannot
/// clobber it.
async fn set_aside(path: &Path) {
    let backup = corrupt_backup_path(path);
    match fs::rename(path, &backup).await {
        Ok(()) => warn!("moved unreadable data file to {}", backup.display()),
        Err(err) => error!("failed to move unreadable data file aside: {err}"),
    }
}

fn corrupt_backup_path(path: &Path) -> PathBuf {
    let stamp = Utc::now().format("%Y%m%dT%H%M%S");
    let mut name = path.as_os_str().to_owned();
    name.push(format!(".corrupt-{stamp}"));
    PathBuf::from(name)
}

pub async fn persist_data(path: &Path, data: &AppData) -> Result<(), AppError> {
    let payload = serde_json::to_vec_pretty(data).map_err(AppError::internal)?;
    fs::write(path, payload).await.map_err(AppError::internal)?;
    Ok(())
}

impl AppData {
    /// Newest first.
    pub fn list_habits(&self) -> Vec<Habit> {
        let mut habits = self.habits.clone();
        habits.sort_by(|a, b| b.created_at.cmp(&a.created_at).then(b.id.cmp(&a.id)));
        habits
    }

    pub fn habit(&self, id: HabitId) -> Result<&Habit, AppError> {
        self.habits
            .iter()
            .find(|habit| habit.id == id)
            .ok_or_else(|| AppError::not_found(format!("habit {id} not found")))
    }

    pub fn add_habit(&mut self, new: NewHabit, now: DateTime<Utc>) -> Result<HabitId, AppError> {
        let name = new.name.trim();
        if name.is_empty() {
            return Err(AppError::bad_request("name must not be empty"));
        }
        if name.chars().count() > MAX_NAME_LEN {
            return Err(AppError::bad_request(format!(
                "name must be at most {MAX_NAME_LEN} characters"
            )));
        }

        let custom_days = match new.frequency {
            Frequency::Custom => {
                let mut days = new.custom_days;
                days.sort_by_key(|day| day.num_days_from_monday());
                days.dedup();
                if days.is_empty() {
                    return Err(AppError::bad_request(
                        "custom frequency needs at least one day",
                    ));
                }
                days
            }
            _ => Vec::new(),
        };

        self.next_id = self.next_id.max(self.max_habit_id()).saturating_add(1);
        let id = self.next_id;
        self.habits.push(Habit {
            id,
            name: name.to_string(),
            description: new
                .description
                .map(|text| text.trim().to_string())
                .filter(|text| !text.is_empty()),
            frequency: new.frequency,
            custom_days,
            created_at: now,
        });
        Ok(id)
    }

    /// Removes the habit together with its log.
    pub fn delete_habit(&mut self, id: HabitId) -> Result<(), AppError> {
        self.habit(id)?;
        self.habits.retain(|habit| habit.id != id);
        self.logs.retain(|entry| entry.habit_id != id);
        Ok(())
    }

    /// Snapshot of one habit's log over `start..=end`, ascending by date.
    pub fn logs_between(
        &self,
        id: HabitId,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<HabitLogEntry>, AppError> {
        self.habit(id)?;
        if start > end {
            return Err(AppError::bad_request("start must not be after end"));
        }
        let mut entries: Vec<HabitLogEntry> = self
            .logs
            .iter()
            .filter(|entry| entry.habit_id == id && entry.date >= start && entry.date <= end)
            .cloned()
            .collect();
        entries.sort_by_key(|entry| entry.date);
        Ok(entries)
    }

    pub fn upsert_log(
        &mut self,
        id: HabitId,
        date: NaiveDate,
        completed: bool,
        notes: Option<String>,
    ) -> Result<HabitLogEntry, AppError> {
        self.habit(id)?;
        let notes = notes.filter(|text| !text.trim().is_empty());

        if let Some(entry) = self
            .logs
            .iter_mut()
            .find(|entry| entry.habit_id == id && entry.date == date)
        {
            entry.completed = completed;
            entry.notes = notes;
            return Ok(entry.clone());
        }

        let entry = HabitLogEntry {
            habit_id: id,
            date,
            completed,
            notes,
        };
        self.logs.push(entry.clone());
        Ok(entry)
    }

    fn max_habit_id(&self) -> HabitId {
        self.habits.iter().map(|habit| habit.id).max().unwrap_or(0)
    }

    fn dedup_logs(&mut self) {
        let mut seen = HashSet::with_capacity(self.logs.len());
        let before = self.logs.len();
        self.logs.retain(|entry| {
            let fresh = seen.insert((entry.habit_id, entry.date));
            if !fresh {
                warn!(
                    habit_id = entry.habit_id,
                    date = %entry.date,
                    "duplicate habit log entry, keeping the first"
                );
            }
            fresh
        });
        if self.logs.len() != before {
            warn!("dropped {} duplicate habit log entries", before - self.logs.len());
        }
    }
}

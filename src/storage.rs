//! Load/save boundary for the tracker. The data file is a key-value object
//! with one JSON value per fixed key.

use crate::errors::AppError;
use crate::models::{Goal, History};
use crate::tracker::Tracker;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use std::{path::PathBuf, sync::Mutex};
use tokio::fs;
use tracing::{error, info, warn};

pub const GOALS_KEY: &str = "orbit_goals";
pub const HISTORY_KEY: &str = "orbit_history";

/// Details handed to observers after a successful save.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveEvent {
    pub goals: usize,
    pub days: usize,
    pub bytes: usize,
}

pub type SaveObserver = Box<dyn Fn(&SaveEvent) + Send + Sync>;

pub struct Storage {
    path: PathBuf,
    // Keys written by something else survive our saves.
    extra: Mutex<Map<String, Value>>,
    observers: Vec<SaveObserver>,
}

impl Storage {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            extra: Mutex::new(Map::new()),
            observers: Vec::new(),
        }
    }

    /// Registers a callback run after every successful save.
    pub fn subscribe(&mut self, observer: impl Fn(&SaveEvent) + Send + Sync + 'static) {
        self.observers.push(Box::new(observer));
    }

    /// Reads the data file. Missing or malformed content loads as empty.
    pub async fn load(&self) -> Tracker {
        let mut entries = match fs::read(&self.path).await {
            Ok(bytes) => match serde_json::from_slice::<Map<String, Value>>(&bytes) {
                Ok(entries) => entries,
                Err(err) => {
                    error!("failed to parse data file: {err}");
                    Map::new()
                }
            },
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Map::new(),
            Err(err) => {
                error!("failed to read data file: {err}");
                Map::new()
            }
        };

        let goals: Vec<Goal> = take_entry(&mut entries, GOALS_KEY);
        let history: History = take_entry(&mut entries, HISTORY_KEY);
        info!(
            goals = goals.len(),
            days = history.len(),
            path = %self.path.display(),
            "loaded tracker data"
        );

        if let Ok(mut extra) = self.extra.lock() {
            *extra = entries;
        }
        Tracker::new(goals, history)
    }

    pub async fn save(&self, tracker: &Tracker) -> Result<(), AppError> {
        let mut entries = self
            .extra
            .lock()
            .map(|extra| extra.clone())
            .unwrap_or_default();
        entries.insert(
            GOALS_KEY.to_string(),
            serde_json::to_value(tracker.goals()).map_err(AppError::internal)?,
        );
        entries.insert(
            HISTORY_KEY.to_string(),
            serde_json::to_value(tracker.history()).map_err(AppError::internal)?,
        );

        let payload = serde_json::to_vec_pretty(&entries).map_err(AppError::internal)?;
        fs::write(&self.path, &payload).await.map_err(AppError::internal)?;

        let event = SaveEvent {
            goals: tracker.goals().len(),
            days: tracker.history().len(),
            bytes: payload.len(),
        };
        for observer in &self.observers {
            observer(&event);
        }
        Ok(())
    }
}

fn take_entry<T: DeserializeOwned + Default>(entries: &mut Map<String, Value>, key: &str) -> T {
    match entries.remove(key) {
        Some(value) => serde_json::from_value(value).unwrap_or_else(|err| {
            warn!("discarding malformed '{key}' entry: {err}");
            T::default()
        }),
        None => T::default(),
    }
}

/// Observer that reports the size of each saved snapshot.
pub fn log_saves(event: &SaveEvent) {
    info!(
        goals = event.goals,
        days = event.days,
        kb = %format!("{:.2}", event.bytes as f64 / 1024.0),
        "saved tracker data"
    );
}

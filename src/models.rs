use crate::dates::YearMonth;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

pub const DEFAULT_ICON: &str = "fa-bullseye";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum GoalKind {
    Boolean,
    Number,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Goal {
    pub id: String,
    pub title: String,
    pub icon: String,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    pub target: u64,
}

impl Goal {
    /// Whether `value` meets this goal. Every view and report goes through
    /// this one predicate.
    pub fn is_satisfied(&self, value: RecordedValue) -> bool {
        match self.kind {
            GoalKind::Boolean => value.is_truthy(),
            GoalKind::Number => value.count() >= self.target,
        }
    }

    pub fn target_label(&self) -> String {
        match self.kind {
            GoalKind::Boolean => "Habit".to_string(),
            GoalKind::Number => format!("Target: {}", self.target),
        }
    }
}

/// A value recorded for one goal on one day. Toggles store flags and
/// counters store integers; both shapes load from disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum RecordedValue {
    Flag(bool),
    Count(u64),
}

impl RecordedValue {
    pub fn is_truthy(self) -> bool {
        match self {
            Self::Flag(flag) => flag,
            Self::Count(count) => count > 0,
        }
    }

    pub fn count(self) -> u64 {
        match self {
            Self::Flag(flag) => u64::from(flag),
            Self::Count(count) => count,
        }
    }
}

impl Default for RecordedValue {
    fn default() -> Self {
        Self::Count(0)
    }
}

/// Date key -> goal id -> value.
pub type History = BTreeMap<String, BTreeMap<String, RecordedValue>>;

#[derive(Debug, Deserialize)]
pub struct NewGoal {
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    #[serde(default)]
    pub target: Option<u64>,
}

#[derive(Debug, Deserialize)]
pub struct RecordRequest {
    pub goal_id: String,
    pub value: RecordedValue,
}

#[derive(Debug, Deserialize)]
pub struct AdjustRequest {
    pub goal_id: String,
    pub delta: i64,
}

#[derive(Debug, Deserialize)]
pub struct DeleteQuery {
    #[serde(default)]
    pub confirm: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DailyCompletion {
    pub completed: usize,
    pub total: usize,
}

#[derive(Debug, Serialize)]
pub struct GoalCard {
    pub goal: Goal,
    pub value: RecordedValue,
    pub done: bool,
    pub progress_percent: u64,
}

#[derive(Debug, Serialize)]
pub struct DayView {
    pub date: String,
    pub heading: String,
    pub is_today: bool,
    pub locked: bool,
    pub prev_date: String,
    pub next_date: Option<String>,
    pub cards: Vec<GoalCard>,
    pub completed: usize,
    pub total: usize,
    pub percent: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct GoalReport {
    pub goal_id: String,
    pub title: String,
    pub icon: String,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    pub target: u64,
    pub target_label: String,
    pub success_count: u32,
    pub percent: u64,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlyReport {
    pub month: YearMonth,
    pub label: String,
    pub days_considered: u32,
    pub rows: Vec<GoalReport>,
    pub prev_month: YearMonth,
    pub next_month: YearMonth,
}

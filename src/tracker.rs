//! In-memory goal list and daily history. Persistence lives in `storage`.

use crate::dates::{date_key, is_locked, YearMonth};
use crate::models::{
    DailyCompletion, Goal, GoalKind, GoalReport, History, MonthlyReport, NewGoal, RecordedValue,
    DEFAULT_ICON,
};
use crate::stats::percent;
use chrono::NaiveDate;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum GoalError {
    #[error("goal title must not be empty")]
    EmptyTitle,
    #[error("number goals need a positive target")]
    MissingTarget,
}

#[derive(Debug, Clone, Default)]
pub struct Tracker {
    goals: Vec<Goal>,
    history: History,
}

impl Tracker {
    pub fn new(goals: Vec<Goal>, history: History) -> Self {
        Self { goals, history }
    }

    pub fn goals(&self) -> &[Goal] {
        &self.goals
    }

    pub fn history(&self) -> &History {
        &self.history
    }

    pub fn goal(&self, id: &str) -> Option<&Goal> {
        self.goals.iter().find(|goal| goal.id == id)
    }

    pub fn add_goal(&mut self, new_goal: NewGoal, now_ms: u64) -> Result<Goal, GoalError> {
        let title = new_goal.title.trim();
        if title.is_empty() {
            return Err(GoalError::EmptyTitle);
        }

        let icon = new_goal
            .icon
            .as_deref()
            .map(str::trim)
            .filter(|icon| !icon.is_empty())
            .unwrap_or(DEFAULT_ICON);

        let target = match new_goal.kind {
            GoalKind::Boolean => 1,
            GoalKind::Number => match new_goal.target {
                Some(target) if target > 0 => target,
                _ => return Err(GoalError::MissingTarget),
            },
        };

        let goal = Goal {
            id: self.next_goal_id(now_ms),
            title: title.to_string(),
            icon: icon.to_string(),
            kind: new_goal.kind,
            target,
        };
        self.goals.push(goal.clone());
        Ok(goal)
    }

    /// Removes the goal definition. Its history entries stay behind.
    pub fn delete_goal(&mut self, id: &str) -> Option<Goal> {
        let index = self.goals.iter().position(|goal| goal.id == id)?;
        Some(self.goals.remove(index))
    }

    pub fn value_on(&self, date: NaiveDate, goal_id: &str) -> RecordedValue {
        self.history
            .get(&date_key(date))
            .and_then(|day| day.get(goal_id))
            .copied()
            .unwrap_or_default()
    }

    /// Stores `value` for `date` and returns true, or does nothing and
    /// returns false when `date` is not `today`. The goal need not exist.
    pub fn record_value(
        &mut self,
        today: NaiveDate,
        date: NaiveDate,
        goal_id: &str,
        value: RecordedValue,
    ) -> bool {
        if is_locked(date, today) {
            debug!(date = %date, goal_id, "ignoring write to locked day");
            return false;
        }

        self.history
            .entry(date_key(date))
            .or_default()
            .insert(goal_id.to_string(), value);
        true
    }

    pub fn toggle(&mut self, today: NaiveDate, date: NaiveDate, goal_id: &str, checked: bool) -> bool {
        self.record_value(today, date, goal_id, RecordedValue::Flag(checked))
    }

    /// Adds `delta` to the stored count, never going below zero.
    pub fn adjust(&mut self, today: NaiveDate, date: NaiveDate, goal_id: &str, delta: i64) -> bool {
        let current = self.value_on(date, goal_id).count();
        let updated = if delta < 0 {
            current.saturating_sub(delta.unsigned_abs())
        } else {
            current.saturating_add(delta.unsigned_abs())
        };
        self.record_value(today, date, goal_id, RecordedValue::Count(updated))
    }

    pub fn daily_completion(&self, date: NaiveDate) -> DailyCompletion {
        let completed = self
            .goals
            .iter()
            .filter(|goal| goal.is_satisfied(self.value_on(date, &goal.id)))
            .count();

        DailyCompletion {
            completed,
            total: self.goals.len(),
        }
    }

    /// Per-goal success counts over the days of `month` up to today. Only
    /// current goals appear; deleted goals keep their history but drop out.
    pub fn monthly_report(&self, today: NaiveDate, month: YearMonth) -> MonthlyReport {
        let days_considered = month.days_considered(today);
        let mut success = vec![0u32; self.goals.len()];

        for day in 1..=days_considered {
            let Some(date) = month.day(day) else {
                continue;
            };
            for (count, goal) in success.iter_mut().zip(&self.goals) {
                if goal.is_satisfied(self.value_on(date, &goal.id)) {
                    *count += 1;
                }
            }
        }

        let rows = self
            .goals
            .iter()
            .zip(success)
            .map(|(goal, success_count)| GoalReport {
                goal_id: goal.id.clone(),
                title: goal.title.clone(),
                icon: goal.icon.clone(),
                kind: goal.kind,
                target: goal.target,
                target_label: goal.target_label(),
                success_count,
                percent: percent(u64::from(success_count), u64::from(days_considered)),
            })
            .collect();

        MonthlyReport {
            month,
            label: month.long_label(),
            days_considered,
            rows,
            prev_month: month.prev(),
            next_month: month.next(),
        }
    }

    fn next_goal_id(&self, now_ms: u64) -> String {
        let newest = self
            .goals
            .iter()
            .filter_map(|goal| goal.id.parse::<u64>().ok())
            .max();
        let mut candidate = match newest {
            Some(newest) if newest >= now_ms => newest.checked_add(1).unwrap_or(now_ms),
            _ => now_ms,
        };
        while self.goal(&candidate.to_string()).is_some() {
            candidate = candidate.wrapping_add(1);
        }
        candidate.to_string()
    }
}

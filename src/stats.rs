use crate::dates::{can_go_next, date_key, day_heading, is_locked, next_day, prev_day};
use crate::models::{DayView, GoalCard, GoalKind};
use crate::tracker::Tracker;
use chrono::NaiveDate;

/// Rounded percentage of `part` in `whole`; 0 when there is nothing to divide by.
pub fn percent(part: u64, whole: u64) -> u64 {
    if whole == 0 {
        return 0;
    }
    (part as f64 / whole as f64 * 100.0).round() as u64
}

pub fn build_day_view(tracker: &Tracker, date: NaiveDate, today: NaiveDate) -> DayView {
    let cards: Vec<GoalCard> = tracker
        .goals()
        .iter()
        .map(|goal| {
            let value = tracker.value_on(date, &goal.id);
            let progress_percent = match goal.kind {
                GoalKind::Boolean => percent(u64::from(value.is_truthy()), 1),
                GoalKind::Number => percent(value.count(), goal.target).min(100),
            };
            GoalCard {
                goal: goal.clone(),
                value,
                done: goal.is_satisfied(value),
                progress_percent,
            }
        })
        .collect();

    let completion = tracker.daily_completion(date);

    DayView {
        date: date_key(date),
        heading: day_heading(date, today),
        is_today: date == today,
        locked: is_locked(date, today),
        prev_date: date_key(prev_day(date)),
        next_date: can_go_next(date, today).then(|| date_key(next_day(date))),
        cards,
        completed: completion.completed,
        total: completion.total,
        percent: percent(completion.completed as u64, completion.total as u64),
    }
}

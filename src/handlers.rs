use crate::dates::{self, date_key, parse_date_key, YearMonth};
use crate::errors::AppError;
use crate::models::{
    AdjustRequest, DayView, DeleteQuery, Goal, GoalKind, MonthlyReport, NewGoal, RecordRequest,
};
use crate::report::{export_filename, render_document};
use crate::state::AppState;
use crate::stats::build_day_view;
use crate::tracker::Tracker;
use crate::ui::{render_confirm_delete, render_day, render_report};
use axum::{
    extract::{Path, Query, State},
    http::{header, StatusCode},
    response::{Html, IntoResponse, Redirect, Response},
    Form, Json,
};
use chrono::{Local, NaiveDate};
use serde::Deserialize;
use tracing::info;

#[derive(Debug, Deserialize)]
pub struct DayQuery {
    pub date: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct MonthQuery {
    pub month: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct GoalForm {
    pub title: String,
    #[serde(default)]
    pub icon: Option<String>,
    #[serde(rename = "type")]
    pub kind: GoalKind,
    #[serde(default)]
    pub target: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ConfirmForm {
    #[serde(default)]
    pub confirm: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ToggleForm {
    #[serde(default)]
    pub checked: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct AdjustForm {
    pub delta: i64,
}

// --- HTML pages and forms ---

pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<DayQuery>,
) -> Result<Html<String>, AppError> {
    let today = dates::today();
    let date = match query.date.as_deref().filter(|value| !value.trim().is_empty()) {
        Some(value) => parse_date(value)?,
        None => today,
    };
    let tracker = state.tracker.lock().await;
    Ok(Html(render_day(&build_day_view(&tracker, date, today))))
}

pub async fn create_goal_form(
    State(state): State<AppState>,
    Form(form): Form<GoalForm>,
) -> Result<Redirect, AppError> {
    let target = match form.target.as_deref().map(str::trim) {
        Some("") | None => None,
        Some(raw) => Some(
            raw.parse::<u64>()
                .map_err(|_| AppError::bad_request("target must be a positive whole number"))?,
        ),
    };
    let new_goal = NewGoal {
        title: form.title,
        icon: form.icon,
        kind: form.kind,
        target,
    };
    add_goal(&state, new_goal).await?;
    Ok(Redirect::to("/"))
}

pub async fn confirm_delete_page(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, AppError> {
    let tracker = state.tracker.lock().await;
    let goal = tracker
        .goal(&id)
        .ok_or_else(|| AppError::not_found(format!("no goal with id {id}")))?;
    Ok(Html(render_confirm_delete(goal)))
}

pub async fn delete_goal_form(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<ConfirmForm>,
) -> Result<Redirect, AppError> {
    if form.confirm.as_deref() == Some("yes") {
        remove_goal(&state, &id).await?;
    } else {
        info!(goal_id = %id, "goal deletion cancelled");
    }
    Ok(Redirect::to("/"))
}

pub async fn toggle_form(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, String)>,
    Form(form): Form<ToggleForm>,
) -> Result<Redirect, AppError> {
    let date = parse_date(&date)?;
    let checked = form.checked.is_some();
    apply_write(&state, date, |tracker, today| {
        tracker.toggle(today, date, &id, checked)
    })
    .await?;
    Ok(redirect_to_day(date))
}

pub async fn adjust_form(
    State(state): State<AppState>,
    Path((date, id)): Path<(String, String)>,
    Form(form): Form<AdjustForm>,
) -> Result<Redirect, AppError> {
    let date = parse_date(&date)?;
    apply_write(&state, date, |tracker, today| {
        tracker.adjust(today, date, &id, form.delta)
    })
    .await?;
    Ok(redirect_to_day(date))
}

pub async fn report_page(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Html<String>, AppError> {
    let report = report_for(&state, query.month.as_deref()).await?;
    Ok(Html(render_report(&report)))
}

pub async fn export_report_page(
    State(state): State<AppState>,
    Query(query): Query<MonthQuery>,
) -> Result<Response, AppError> {
    let report = report_for(&state, query.month.as_deref()).await?;
    Ok(export_response(&report))
}

// --- JSON API ---

pub async fn list_goals(State(state): State<AppState>) -> Json<Vec<Goal>> {
    let tracker = state.tracker.lock().await;
    Json(tracker.goals().to_vec())
}

pub async fn create_goal(
    State(state): State<AppState>,
    Json(payload): Json<NewGoal>,
) -> Result<(StatusCode, Json<Goal>), AppError> {
    let goal = add_goal(&state, payload).await?;
    Ok((StatusCode::CREATED, Json(goal)))
}

pub async fn delete_goal(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Query(query): Query<DeleteQuery>,
) -> Result<StatusCode, AppError> {
    if !query.confirm {
        return Err(AppError::bad_request("goal deletion must be confirmed"));
    }
    remove_goal(&state, &id).await?;
    Ok(StatusCode::NO_CONTENT)
}

pub async fn get_today(State(state): State<AppState>) -> Json<DayView> {
    let today = dates::today();
    let tracker = state.tracker.lock().await;
    Json(build_day_view(&tracker, today, today))
}

pub async fn get_day(
    State(state): State<AppState>,
    Path(date): Path<String>,
) -> Result<Json<DayView>, AppError> {
    let date = parse_date(&date)?;
    let tracker = state.tracker.lock().await;
    Ok(Json(build_day_view(&tracker, date, dates::today())))
}

pub async fn record(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(payload): Json<RecordRequest>,
) -> Result<Json<DayView>, AppError> {
    let date = parse_date(&date)?;
    let view = apply_write(&state, date, |tracker, today| {
        tracker.record_value(today, date, &payload.goal_id, payload.value)
    })
    .await?;
    Ok(Json(view))
}

pub async fn adjust(
    State(state): State<AppState>,
    Path(date): Path<String>,
    Json(payload): Json<AdjustRequest>,
) -> Result<Json<DayView>, AppError> {
    let date = parse_date(&date)?;
    let view = apply_write(&state, date, |tracker, today| {
        tracker.adjust(today, date, &payload.goal_id, payload.delta)
    })
    .await?;
    Ok(Json(view))
}

pub async fn get_report(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Result<Json<MonthlyReport>, AppError> {
    Ok(Json(report_for(&state, Some(&month)).await?))
}

pub async fn export_report(
    State(state): State<AppState>,
    Path(month): Path<String>,
) -> Result<Response, AppError> {
    let report = report_for(&state, Some(&month)).await?;
    Ok(export_response(&report))
}

// --- shared plumbing ---

async fn add_goal(state: &AppState, new_goal: NewGoal) -> Result<Goal, AppError> {
    let now_ms = u64::try_from(Local::now().timestamp_millis()).unwrap_or_default();
    let mut tracker = state.tracker.lock().await;
    let goal = tracker.add_goal(new_goal, now_ms)?;
    state.storage.save(&tracker).await?;
    info!(goal_id = %goal.id, title = %goal.title, "goal created");
    Ok(goal)
}

async fn remove_goal(state: &AppState, id: &str) -> Result<Goal, AppError> {
    let mut tracker = state.tracker.lock().await;
    let goal = tracker
        .delete_goal(id)
        .ok_or_else(|| AppError::not_found(format!("no goal with id {id}")))?;
    state.storage.save(&tracker).await?;
    info!(goal_id = %goal.id, "goal deleted, history kept");
    Ok(goal)
}

/// Runs one write against the tracker and saves only if it changed anything.
async fn apply_write(
    state: &AppState,
    date: NaiveDate,
    write: impl FnOnce(&mut Tracker, NaiveDate) -> bool,
) -> Result<DayView, AppError> {
    let today = dates::today();
    let mut tracker = state.tracker.lock().await;
    if write(&mut *tracker, today) {
        state.storage.save(&tracker).await?;
    }
    Ok(build_day_view(&tracker, date, today))
}

async fn report_for(state: &AppState, month: Option<&str>) -> Result<MonthlyReport, AppError> {
    let today = dates::today();
    let month = match month.filter(|value| !value.trim().is_empty()) {
        Some(value) => value
            .parse::<YearMonth>()
            .map_err(|err| AppError::bad_request(err.to_string()))?,
        None => YearMonth::of(today),
    };
    let tracker = state.tracker.lock().await;
    Ok(tracker.monthly_report(today, month))
}

fn export_response(report: &MonthlyReport) -> Response {
    let generated_at = Local::now().format("%Y-%m-%d %H:%M:%S").to_string();
    let body = render_document(report, &generated_at);
    let disposition = format!("attachment; filename=\"{}\"", export_filename(report));
    (
        [
            (header::CONTENT_TYPE, "text/plain; charset=utf-8".to_string()),
            (header::CONTENT_DISPOSITION, disposition),
        ],
        body,
    )
        .into_response()
}

fn parse_date(value: &str) -> Result<NaiveDate, AppError> {
    parse_date_key(value)
        .ok_or_else(|| AppError::bad_request(format!("invalid date '{value}', expected YYYY-MM-DD")))
}

fn redirect_to_day(date: NaiveDate) -> Redirect {
    Redirect::to(&format!("/?date={}", date_key(date)))
}

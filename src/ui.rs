use crate::models::{DayView, Goal, GoalCard, GoalKind, MonthlyReport};
use std::fmt::Write;

const RING_RADIUS: f64 = 52.0;

pub fn render_day(view: &DayView) -> String {
    let circumference = RING_RADIUS * 2.0 * std::f64::consts::PI;
    let offset = circumference - (view.percent as f64 / 100.0) * circumference;

    let next = match &view.next_date {
        Some(next) => format!(r#"<a class="nav-btn" href="/?date={next}">&rsaquo;</a>"#),
        None => r#"<span class="nav-btn disabled">&rsaquo;</span>"#.to_string(),
    };
    let lock = if view.locked {
        r#"<span class="lock">Locked</span>"#
    } else {
        ""
    };

    let mut cards = String::new();
    if view.cards.is_empty() {
        cards.push_str(r#"<p class="hint">No goals yet. Add one below to start tracking.</p>"#);
    }
    for card in &view.cards {
        cards.push_str(&render_card(card, &view.date, view.locked));
    }

    let body = DAY_HTML
        .replace("{{HEADING}}", &escape_html(&view.heading))
        .replace("{{PREV}}", &view.prev_date)
        .replace("{{NEXT}}", &next)
        .replace("{{LOCK}}", lock)
        .replace("{{CIRCUMFERENCE}}", &format!("{circumference:.2}"))
        .replace("{{OFFSET}}", &format!("{offset:.2}"))
        .replace("{{PERCENT}}", &view.percent.to_string())
        .replace("{{COMPLETED}}", &view.completed.to_string())
        .replace("{{TOTAL}}", &view.total.to_string())
        .replace("{{CARDS}}", &cards);
    page("Orbit", &body)
}

fn render_card(card: &GoalCard, date: &str, locked: bool) -> String {
    let goal = &card.goal;
    let disabled = if locked { " disabled" } else { "" };
    let id = escape_html(&goal.id);

    let input = match goal.kind {
        GoalKind::Boolean => {
            let (next_state, label) = if card.done {
                ("", "Completed")
            } else {
                (r#"<input type="hidden" name="checked" value="on">"#, "Mark Done")
            };
            format!(
                r#"<form method="post" action="/days/{date}/goals/{id}/toggle">{next_state}<button class="check{done}" type="submit"{disabled}>{label}</button></form>"#,
                done = if card.done { " on" } else { "" },
            )
        }
        GoalKind::Number => format!(
            r#"<div class="number-control">
            <form method="post" action="/days/{date}/goals/{id}/adjust"><input type="hidden" name="delta" value="-1"><button class="num-btn" type="submit"{disabled}>-</button></form>
            <span class="num-display">{value} / {target}</span>
            <form method="post" action="/days/{date}/goals/{id}/adjust"><input type="hidden" name="delta" value="1"><button class="num-btn" type="submit"{disabled}>+</button></form>
          </div>
          <div class="bar"><div class="bar-fill" style="width: {progress}%"></div></div>"#,
            value = card.value.count(),
            target = goal.target,
            progress = card.progress_percent,
        ),
    };

    format!(
        r#"<article class="goal-card{done}{locked}">
          <div class="goal-header">
            <span class="goal-icon">{icon}</span>
            <a class="goal-delete" href="/goals/{id}/delete" title="Delete goal">&times;</a>
          </div>
          <div class="goal-title">{title}</div>
          {input}
        </article>"#,
        done = if card.done { " done" } else { "" },
        locked = if locked { " locked" } else { "" },
        icon = escape_html(&goal.icon),
        title = escape_html(&goal.title),
    )
}

pub fn render_report(report: &MonthlyReport) -> String {
    let mut rows = String::new();
    if report.rows.is_empty() {
        rows.push_str(r#"<p class="hint">No active habits to report.</p>"#);
    }
    for row in &report.rows {
        let _ = write!(
            rows,
            r#"<div class="report-item">
          <div class="report-header">
            <span class="report-title">{title}</span>
            <span class="report-stat">{success}/{days} Days ({percent}%)</span>
          </div>
          <div class="bar"><div class="bar-fill" style="width: {percent}%"></div></div>
        </div>"#,
            title = escape_html(&row.title),
            success = row.success_count,
            days = report.days_considered,
            percent = row.percent,
        );
    }

    let body = REPORT_HTML
        .replace("{{LABEL}}", &escape_html(&report.label))
        .replace("{{PREV}}", &report.prev_month.to_string())
        .replace("{{NEXT}}", &report.next_month.to_string())
        .replace("{{MONTH}}", &report.month.to_string())
        .replace("{{ROWS}}", &rows);
    page(&format!("{} Report", report.label), &body)
}

pub fn render_confirm_delete(goal: &Goal) -> String {
    let body = CONFIRM_HTML
        .replace("{{ID}}", &escape_html(&goal.id))
        .replace("{{TITLE}}", &escape_html(&goal.title));
    page("Delete goal", &body)
}

fn page(title: &str, body: &str) -> String {
    PAGE_HTML
        .replace("{{TITLE}}", &escape_html(title))
        .replace("{{BODY}}", body)
}

pub fn escape_html(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for ch in value.chars() {
        match ch {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(ch),
        }
    }
    out
}

const DAY_HTML: &str = r#"<header class="day-header">
      <a class="nav-btn" href="/?date={{PREV}}">&lsaquo;</a>
      <div>
        <h1>{{HEADING}}</h1>
        {{LOCK}}
      </div>
      {{NEXT}}
    </header>
    <section class="summary">
      <svg class="ring" width="120" height="120" viewBox="0 0 120 120" role="img" aria-label="Daily completion">
        <circle class="ring-track" cx="60" cy="60" r="52"></circle>
        <circle class="ring-fill" cx="60" cy="60" r="52"
          style="stroke-dasharray: {{CIRCUMFERENCE}} {{CIRCUMFERENCE}}; stroke-dashoffset: {{OFFSET}}"></circle>
        <text x="60" y="66" text-anchor="middle">{{PERCENT}}%</text>
      </svg>
      <div>
        <p class="label">Completed today</p>
        <p class="value">{{COMPLETED}} / {{TOTAL}}</p>
        <a class="link" href="/report">Monthly report</a>
      </div>
    </section>
    <section class="goals">
      {{CARDS}}
    </section>
    <section class="new-goal">
      <h2>New goal</h2>
      <form method="post" action="/goals">
        <input name="title" placeholder="Title" required>
        <input name="icon" placeholder="Icon (fa-bullseye)">
        <label><input type="radio" name="type" value="boolean" checked> Habit</label>
        <label><input type="radio" name="type" value="number"> Number</label>
        <input name="target" type="number" min="1" placeholder="Daily target">
        <button type="submit">Add goal</button>
      </form>
    </section>"#;

const REPORT_HTML: &str = r#"<header class="day-header">
      <a class="nav-btn" href="/report?month={{PREV}}">&lsaquo;</a>
      <h1>{{LABEL}} Report</h1>
      <a class="nav-btn" href="/report?month={{NEXT}}">&rsaquo;</a>
    </header>
    <section class="report">
      {{ROWS}}
    </section>
    <p>
      <a class="link" href="/report/export?month={{MONTH}}">Export report</a>
      &middot; <a class="link" href="/">Back to today</a>
    </p>"#;

const CONFIRM_HTML: &str = r#"<h1>Delete "{{TITLE}}"?</h1>
    <p class="hint">Data will be preserved but goal removed.</p>
    <form method="post" action="/goals/{{ID}}/delete">
      <button type="submit" name="confirm" value="yes">Delete</button>
      <a class="link" href="/">Cancel</a>
    </form>"#;

const PAGE_HTML: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
  <meta charset="UTF-8" />
  <meta name="viewport" content="width=device-width, initial-scale=1.0" />
  <title>{{TITLE}}</title>
  <style>
    :root {
      --bg: #0f0f13;
      --card: #1a1a22;
      --ink: #e8e8ef;
      --muted: #8a8a99;
      --accent: #00d4ff;
      --success: #3ddc97;
    }

    * {
      box-sizing: border-box;
    }

    body {
      margin: 0;
      min-height: 100vh;
      background: var(--bg);
      color: var(--ink);
      font-family: "Space Grotesk", "Trebuchet MS", sans-serif;
      display: grid;
      place-items: start center;
      padding: 32px 18px 48px;
    }

    .app {
      width: min(860px, 100%);
      display: grid;
      gap: 28px;
    }

    h1 {
      margin: 0;
      font-size: clamp(1.5rem, 4vw, 2.2rem);
    }

    .day-header {
      display: flex;
      align-items: center;
      justify-content: space-between;
      gap: 16px;
      text-align: center;
    }

    .nav-btn {
      color: var(--accent);
      font-size: 2rem;
      text-decoration: none;
      padding: 0 12px;
    }

    .nav-btn.disabled {
      color: var(--muted);
      opacity: 0.4;
    }

    .lock {
      color: #ffb347;
      font-size: 0.85rem;
      text-transform: uppercase;
      letter-spacing: 0.12em;
    }

    .summary {
      display: flex;
      align-items: center;
      gap: 24px;
      background: var(--card);
      border-radius: 20px;
      padding: 20px;
    }

    .ring circle {
      fill: none;
      stroke-width: 10;
    }

    .ring-track {
      stroke: rgba(255, 255, 255, 0.08);
    }

    .ring-fill {
      stroke: var(--accent);
      transform: rotate(-90deg);
      transform-origin: 50% 50%;
    }

    .ring text {
      fill: var(--ink);
      font-size: 20px;
      font-weight: 600;
    }

    .label {
      margin: 0;
      color: var(--muted);
      text-transform: uppercase;
      letter-spacing: 0.12em;
      font-size: 0.8rem;
    }

    .value {
      margin: 4px 0 8px;
      font-size: 1.7rem;
      font-weight: 600;
    }

    .goals {
      display: grid;
      grid-template-columns: repeat(auto-fill, minmax(220px, 1fr));
      gap: 16px;
    }

    .goal-card {
      background: var(--card);
      border: 1px solid rgba(255, 255, 255, 0.06);
      border-radius: 18px;
      padding: 18px;
      display: grid;
      gap: 12px;
    }

    .goal-card.done {
      border-color: var(--success);
    }

    .goal-card.locked {
      opacity: 0.7;
    }

    .goal-header {
      display: flex;
      justify-content: space-between;
      color: var(--muted);
    }

    .goal-delete {
      color: var(--muted);
      text-decoration: none;
    }

    .goal-title {
      font-size: 1.1rem;
      font-weight: 600;
    }

    .number-control {
      display: flex;
      align-items: center;
      justify-content: space-between;
    }

    button {
      appearance: none;
      border: none;
      border-radius: 999px;
      padding: 10px 16px;
      font-weight: 600;
      cursor: pointer;
      background: var(--accent);
      color: #000;
    }

    button:disabled {
      cursor: not-allowed;
      opacity: 0.4;
    }

    .check.on {
      background: var(--success);
    }

    .bar {
      height: 8px;
      border-radius: 999px;
      background: rgba(255, 255, 255, 0.08);
      overflow: hidden;
    }

    .bar-fill {
      height: 100%;
      background: var(--accent);
    }

    .new-goal form {
      display: flex;
      flex-wrap: wrap;
      gap: 10px;
      align-items: center;
    }

    input[name="title"],
    input[name="icon"],
    input[name="target"] {
      background: var(--card);
      border: 1px solid rgba(255, 255, 255, 0.12);
      border-radius: 10px;
      color: var(--ink);
      padding: 10px;
    }

    .report {
      display: grid;
      gap: 14px;
    }

    .report-item {
      background: var(--card);
      border-radius: 14px;
      padding: 14px;
      display: grid;
      gap: 8px;
    }

    .report-header {
      display: flex;
      justify-content: space-between;
    }

    .link {
      color: var(--accent);
    }

    .hint {
      color: var(--muted);
    }
  </style>
</head>
<body>
  <main class="app">
    {{BODY}}
  </main>
</body>
</html>
"#;

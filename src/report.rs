//! Downloadable monthly report document.

use crate::models::MonthlyReport;
use std::fmt::Write;

const APP_NAME: &str = "crypt_progress_tracker";
const HEADERS: [&str; 4] = ["Goal/Habit", "Target Type", "Success Rate", "Completion %"];

pub fn export_filename(report: &MonthlyReport) -> String {
    format!(
        "{APP_NAME}_{}-{}.txt",
        report.month.year(),
        report.month.month()
    )
}

/// Renders the report as a plain-text table. `generated_at` is printed as is.
pub fn render_document(report: &MonthlyReport, generated_at: &str) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{APP_NAME} Report");
    let _ = writeln!(out, "{} Report", report.label);
    let _ = writeln!(out, "Generated: {generated_at}");
    out.push('\n');

    if report.rows.is_empty() {
        out.push_str("No active habits to report.\n");
    } else {
        let rows: Vec<[String; 4]> = report
            .rows
            .iter()
            .map(|row| {
                [
                    row.title.clone(),
                    row.target_label.clone(),
                    format!("{}/{} Days", row.success_count, report.days_considered),
                    format!("{}%", row.percent),
                ]
            })
            .collect();

        let mut widths = HEADERS.map(|header| header.chars().count());
        for row in &rows {
            for (width, cell) in widths.iter_mut().zip(row) {
                *width = (*width).max(cell.chars().count());
            }
        }

        write_row(&mut out, &HEADERS.map(String::from), &widths);
        let rule: Vec<String> = widths.iter().map(|width| "-".repeat(*width)).collect();
        let _ = writeln!(out, "{}", rule.join("-+-"));
        for row in &rows {
            write_row(&mut out, row, &widths);
        }
    }

    out.push('\n');
    let _ = writeln!(out, "{APP_NAME} - Local Personal Progress System");
    out
}

fn write_row(out: &mut String, cells: &[String; 4], widths: &[usize; 4]) {
    let padded: Vec<String> = cells
        .iter()
        .zip(widths)
        .map(|(cell, &width)| format!("{cell:<width$}"))
        .collect();
    let _ = writeln!(out, "{}", padded.join(" | ").trim_end());
}

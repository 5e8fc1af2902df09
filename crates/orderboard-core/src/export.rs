//! Flat CSV export of classified orders.

use crate::classifier::NormalizedOrder;
use crate::date;
use crate::error::Result;
use chrono::NaiveDateTime;
use std::io::Write;
use std::path::Path;

pub const CSV_HEADER: &[&str] = &[
    "Reference",
    "Project",
    "Company",
    "Stage",
    "Created",
    "Due Date",
    "Days Overdue",
    "Lines",
    "Qty",
    "Workload",
    "Size",
];

/// `workshop_jobs_20240615_0930.csv`-style name for an export taken at `now`.
pub fn default_file_name(now: NaiveDateTime) -> String {
    format!("workshop_jobs_{}.csv", now.format("%Y%m%d_%H%M"))
}

pub fn write_csv<W: Write>(orders: &[NormalizedOrder], mut out: W) -> Result<()> {
    write_row(&mut out, CSV_HEADER.iter().map(|h| h.to_string()))?;
    for order in orders {
        write_row(&mut out, row(order).into_iter())?;
    }
    out.flush()?;
    Ok(())
}

pub fn to_csv_string(orders: &[NormalizedOrder]) -> Result<String> {
    let mut buf = Vec::new();
    write_csv(orders, &mut buf)?;
    Ok(String::from_utf8_lossy(&buf).into_owned())
}

/// Write the export to `path`, replacing any existing file atomically.
pub fn export_to_file(orders: &[NormalizedOrder], path: &Path) -> Result<()> {
    let csv = to_csv_string(orders)?;
    crate::io::atomic_write(path, csv.as_bytes())
}

fn row(order: &NormalizedOrder) -> Vec<String> {
    let fmt_date = |ts: &Option<NaiveDateTime>| ts.as_ref().map(date::display).unwrap_or_default();
    vec![
        order.reference.clone(),
        order.project_name.clone(),
        order.company.clone(),
        order.display_stage.clone(),
        fmt_date(&order.created_at),
        fmt_date(&order.estimated_delivery_at),
        order.days_overdue.map(|d| d.to_string()).unwrap_or_default(),
        order.line_count.to_string(),
        trim_number(order.qty_total),
        format!("{:.1}", order.workload_score),
        order.size_bucket.to_string(),
    ]
}

fn write_row<W: Write>(out: &mut W, cells: impl Iterator<Item = String>) -> Result<()> {
    let line: Vec<String> = cells.map(|c| quote(&c)).collect();
    writeln!(out, "{}", line.join(","))?;
    Ok(())
}

/// Quote a cell when it contains a delimiter, quote or line break.
fn quote(cell: &str) -> String {
    if cell.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", cell.replace('"', "\"\""))
    } else {
        cell.to_string()
    }
}

/// `5` for whole numbers, `2.5` otherwise.
fn trim_number(n: f64) -> String {
    if n.fract() == 0.0 {
        format!("{n:.0}")
    } else {
        let s = format!("{n:.3}");
        s.trim_end_matches('0').trim_end_matches('.').to_string()
    }
}

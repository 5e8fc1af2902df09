use crate::cmd::{SelectionArgs, Session};
use crate::output::{ellipsize, print_json, render_table};
use orderboard_core::board::BoardGroup;
use orderboard_core::classifier::NormalizedOrder;
use orderboard_core::config::BoardConfig;
use orderboard_core::date;
use orderboard_core::pipeline::{self, PipelineRun};
use orderboard_core::types::Urgency;
use std::path::Path;

pub fn run(
    config_path: &Path,
    selection: &SelectionArgs,
    limit: Option<usize>,
    json: bool,
) -> anyhow::Result<()> {
    let session = Session::open(config_path)?;
    let today = session.today()?;
    let request = selection.request(&session.config, today);
    let mut result = pipeline::run(&session.config, &session.transport, &request, None)?;

    if let Some(limit) = limit {
        result.board.truncate_groups(limit);
    }

    if json {
        print_json(&board_json(&result))?;
    } else {
        print!("{}", render(&session.config, &result));
    }
    warn_if_partial(&result);
    Ok(())
}

pub fn board_json(run: &PipelineRun) -> serde_json::Value {
    serde_json::json!({
        "today": run.today,
        "summary": run.summary,
        "fetch": run.fetch,
        "groups": run.board.groups,
    })
}

/// Print a notice on stderr when the board may be missing orders.
pub fn warn_if_partial(run: &PipelineRun) {
    if let Some(failure) = &run.fetch.failure {
        eprintln!("warning: {failure}; the board shows partial results");
    }
    if run.fetch.truncated {
        eprintln!(
            "warning: stopped after {} pages; the board may be incomplete",
            run.fetch.pages_fetched
        );
    }
}

// ---------------------------------------------------------------------------
// Text rendering
// ---------------------------------------------------------------------------

pub fn render(config: &BoardConfig, run: &PipelineRun) -> String {
    let mut out = String::new();
    out.push_str(&format!(
        "{} board - {}\n",
        config.board.title,
        run.today.format(date::DISPLAY_FORMAT)
    ));
    out.push_str(&summary_line(config, run));
    out.push('\n');

    if run.is_empty() {
        out.push_str("\nNo orders found.\n");
        return out;
    }

    for group in &run.board.groups {
        out.push('\n');
        out.push_str(&render_group(group, run.summary.line_items_available));
    }
    out
}

fn summary_line(config: &BoardConfig, run: &PipelineRun) -> String {
    let s = &run.summary;
    let mut parts = vec![
        format!("Active {}", s.total),
        format!("Overdue {}", s.overdue),
        format!("Due in {} days {}", config.board.due_soon_days, s.due_soon),
        format!("On track {}", s.on_track),
        format!("No ETD {}", s.no_date),
        format!("In progress {}", s.in_progress),
    ];
    if config.board.ready_stage.is_some() {
        parts.push(format!("To collect {}", s.ready_for_pickup));
    }
    parts.join(" | ")
}

fn render_group(group: &BoardGroup, with_workload: bool) -> String {
    let mut out = format!("== {} ({}) ==\n", group.title, group.len());
    if group.is_empty() {
        out.push_str("  (none)\n");
        return out;
    }

    let mut headers = vec!["Reference", "Project", "Company", "Stage", "Due", "Status"];
    if with_workload {
        headers.extend(["Lines", "Size", "Workload"]);
    }
    let rows: Vec<Vec<String>> = group
        .orders
        .iter()
        .map(|o| order_row(o, with_workload))
        .collect();
    out.push_str(&render_table(&headers, &rows));
    out
}

fn order_row(order: &NormalizedOrder, with_workload: bool) -> Vec<String> {
    let mut row = vec![
        order.reference.clone(),
        ellipsize(&order.project_name, 28),
        ellipsize(&order.company, 24),
        order.display_stage.clone(),
        order
            .estimated_delivery_at
            .as_ref()
            .map(date::display)
            .unwrap_or_else(|| "-".to_string()),
        badge(order),
    ];
    if with_workload {
        row.push(order.line_count.to_string());
        row.push(order.size_bucket.to_string());
        row.push(format!("{:.1}", order.workload_score));
    }
    row
}

fn badge(order: &NormalizedOrder) -> String {
    match (order.urgency, order.days_overdue) {
        (Urgency::Overdue, Some(days)) => format!("{} {days}d", order.urgency.badge()),
        (u, _) => u.badge().to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use orderboard_core::board::{self, BoardSummary};
    use orderboard_core::pipeline::FetchReport;
    use orderboard_core::types::SizeBucket;
    use chrono::NaiveDate;

    fn order(reference: &str, urgency: Urgency, days_overdue: Option<i64>) -> NormalizedOrder {
        NormalizedOrder {
            id: None,
            reference: reference.to_string(),
            project_name: "Gate".to_string(),
            company: "Acme".to_string(),
            created_at: None,
            modified_at: None,
            estimated_delivery_at: NaiveDate::from_ymd_opt(2024, 6, 10)
                .and_then(|d| d.and_hms_opt(0, 0, 0)),
            dispatched_at: None,
            stage: "New".to_string(),
            display_stage: "New".to_string(),
            status: String::new(),
            branch_id: None,
            line_count: 2,
            qty_total: 4.0,
            size_bucket: SizeBucket::S,
            workload_score: 2.4,
            urgency,
            days_overdue,
            is_void: false,
            link: None,
        }
    }

    fn make_run(orders: Vec<NormalizedOrder>) -> (BoardConfig, PipelineRun) {
        let config = BoardConfig::default();
        let summary = BoardSummary::compute(&orders, &config.board);
        let board = board::partition(orders.clone(), &config.board);
        let run = PipelineRun {
            today: NaiveDate::from_ymd_opt(2024, 6, 15).unwrap(),
            fetch: FetchReport {
                records: orders.len(),
                pages_fetched: 1,
                requests: 1,
                truncated: false,
                failure: None,
                from_cache: false,
            },
            summary,
            orders,
            board,
        };
        (config, run)
    }

    #[test]
    fn empty_board_says_no_orders() {
        let (config, run) = make_run(Vec::new());
        let text = render(&config, &run);
        assert!(text.starts_with("Workshop board - 15 Jun 2024\n"));
        assert!(text.contains("No orders found."));
    }

    #[test]
    fn overdue_badge_shows_days() {
        let (config, run) = make_run(vec![order("SO-9", Urgency::Overdue, Some(5))]);
        let text = render(&config, &run);
        assert!(text.contains("== Overdue (1) =="));
        assert!(text.contains("OVERDUE 5d"));
        assert!(text.contains("10 Jun 2024"));
        assert!(text.contains("== Due Soon (0) ==\n  (none)"));
        assert!(text.contains("Active 1 | Overdue 1"));
    }

    #[test]
    fn workload_columns_shown_when_line_items_present() {
        let (config, run) = make_run(vec![order("SO-1", Urgency::DueSoon, None)]);
        let text = render(&config, &run);
        assert!(text.contains("Workload"));
        assert!(text.contains("2.4"));

        let mut bare = order("SO-2", Urgency::DueSoon, None);
        bare.line_count = 0;
        let (config, run) = make_run(vec![bare]);
        assert!(!render(&config, &run).contains("Workload"));
    }

    #[test]
    fn json_shape() {
        let (_, run) = make_run(vec![order("SO-1", Urgency::OnTrack, None)]);
        let value = board_json(&run);
        assert_eq!(value["summary"]["total"], 1);
        assert_eq!(value["groups"][0]["kind"], "in_progress");
        assert_eq!(value["today"], "2024-06-15");
    }
}

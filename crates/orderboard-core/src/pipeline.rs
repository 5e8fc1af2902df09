use crate::board::{self, Board, BoardSummary};
use crate::cache::{CacheKey, FetchCache};
use crate::classifier::{Classifier, NormalizedOrder};
use crate::config::BoardConfig;
use crate::error::Result;
use crate::fetch::{self, FetchFailure, FetchOutcome, Fetcher, Transport};
use crate::filter::OrderFilter;
use chrono::NaiveDate;
use serde::Serialize;
use std::sync::Arc;
use tracing::{info, warn};

// ---------------------------------------------------------------------------
// RunRequest
// ---------------------------------------------------------------------------

/// Inputs for one refresh of the board.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Board date, normally today in the display time zone.
    pub today: NaiveDate,
    /// Stages filtered out server-side.
    pub excluded_stages: Vec<String>,
    pub filter: OrderFilter,
}

impl RunRequest {
    /// Request using the configured stage selection and no filter.
    pub fn for_config(config: &BoardConfig, today: NaiveDate) -> Self {
        Self {
            today,
            excluded_stages: config.stages.excluded(),
            filter: OrderFilter::default(),
        }
    }

    /// Replace the stage selection with `selected`; everything else known is
    /// excluded.
    pub fn with_selected_stages(mut self, config: &BoardConfig, selected: &[String]) -> Self {
        self.excluded_stages = config.stages.excluded_for(selected);
        self
    }

    pub fn with_filter(mut self, filter: OrderFilter) -> Self {
        self.filter = filter;
        self
    }
}

// ---------------------------------------------------------------------------
// PipelineRun (output)
// ---------------------------------------------------------------------------

/// How the raw records for a run were obtained.
#[derive(Debug, Clone, Serialize)]
pub struct FetchReport {
    pub records: usize,
    pub pages_fetched: u32,
    pub requests: u32,
    pub truncated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub failure: Option<FetchFailure>,
    pub from_cache: bool,
}

impl FetchReport {
    fn new(outcome: &FetchOutcome, from_cache: bool) -> Self {
        Self {
            records: outcome.records.len(),
            pages_fetched: outcome.pages_fetched,
            requests: outcome.requests,
            truncated: outcome.truncated,
            failure: outcome.failure.clone(),
            from_cache,
        }
    }

    /// True when some orders may be missing from the board.
    pub fn is_partial(&self) -> bool {
        self.failure.is_some() || self.truncated
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct PipelineRun {
    pub today: NaiveDate,
    pub fetch: FetchReport,
    pub summary: BoardSummary,
    /// Classified orders after filtering, in fetch order.
    pub orders: Vec<NormalizedOrder>,
    pub board: Board,
}

impl PipelineRun {
    /// A successful run that found nothing to show.
    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

// ---------------------------------------------------------------------------
// run
// ---------------------------------------------------------------------------

/// Fetch, classify, filter and partition orders.
///
/// Authentication and configuration problems are errors. A page failure or
/// truncation still yields a run built from the records that were fetched;
/// check [`FetchReport::is_partial`].
pub fn run(
    config: &BoardConfig,
    transport: &dyn Transport,
    request: &RunRequest,
    cache: Option<&FetchCache>,
) -> Result<PipelineRun> {
    let fetcher = Fetcher::new(transport, &config.api);
    let (outcome, from_cache) = match cache {
        Some(cache) => cache.get_or_fetch(CacheKey::new(request.excluded_stages.iter().cloned()), || {
            fetcher.fetch_all(&request.excluded_stages)
        })?,
        None => (Arc::new(fetcher.fetch_all(&request.excluded_stages)?), false),
    };

    let report = FetchReport::new(&outcome, from_cache);
    if let Some(failure) = &report.failure {
        warn!(%failure, "showing partial results");
    }
    fetch::log_diagnostics(&outcome.records);

    let classifier = Classifier::new(config);
    let classified = classifier.classify_all(&outcome.records, request.today);
    let orders = request.filter.apply(classified, request.today);

    let summary = BoardSummary::compute(&orders, &config.board);
    let board = board::partition(orders.clone(), &config.board);

    info!(
        fetched = report.records,
        shown = orders.len(),
        overdue = summary.overdue,
        due_soon = summary.due_soon,
        from_cache,
        "board refreshed"
    );

    Ok(PipelineRun {
        today: request.today,
        fetch: report,
        summary,
        orders,
        board,
    })
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::InclusionRule;
    use crate::error::BoardError;
    use crate::fetch::{HttpReply, TransportError};
    use crate::types::{GroupKind, Urgency};
    use serde_json::{json, Value};
    use std::cell::{Cell, RefCell};
    use std::collections::VecDeque;

    struct Replay {
        replies: RefCell<VecDeque<std::result::Result<HttpReply, TransportError>>>,
        calls: Cell<usize>,
        last_where: RefCell<Option<String>>,
    }

    impl Replay {
        fn new(bodies: Vec<(u16, Value)>) -> Self {
            Self {
                replies: RefCell::new(
                    bodies
                        .into_iter()
                        .map(|(status, body)| Ok(HttpReply::new(status, body.to_string())))
                        .collect(),
                ),
                calls: Cell::new(0),
                last_where: RefCell::new(None),
            }
        }
    }

    impl Transport for Replay {
        fn get(
            &self,
            _path: &str,
            query: &[(String, String)],
        ) -> std::result::Result<HttpReply, TransportError> {
            self.calls.set(self.calls.get() + 1);
            *self.last_where.borrow_mut() = query
                .iter()
                .find(|(k, _)| k == "where")
                .map(|(_, v)| v.clone());
            self.replies
                .borrow_mut()
                .pop_front()
                .unwrap_or_else(|| Err(TransportError::Connect("refused".to_string())))
        }
    }

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, 15).unwrap()
    }

    fn config() -> BoardConfig {
        let mut cfg = BoardConfig::default();
        cfg.api.retry_delay_ms = 0;
        cfg
    }

    fn orders_page() -> Value {
        json!([
            {"Id": 1, "Reference": "SO-1", "Stage": "New", "DistributionBranchId": 6877,
             "EstimatedDeliveryDate": "2024-06-10T00:00:00"},
            {"Id": 2, "Reference": "SO-2", "Stage": "Processing", "DistributionBranchId": 6877,
             "EstimatedDeliveryDate": "2024-06-18T00:00:00"},
            {"Id": 3, "Reference": "SO-3", "Stage": "New", "DistributionBranchId": 6877,
             "IsVoid": true},
            {"Id": 4, "Reference": "SO-4", "Stage": "New", "DistributionBranchId": 12},
            {"id": 5, "reference": "SO-5", "stage": "New", "distributionBranchId": 6877,
             "createdDate": "2024-05-01"},
        ])
    }

    #[test]
    fn end_to_end_groups_orders() {
        let cfg = config();
        let transport = Replay::new(vec![(200, orders_page())]);
        let run = run(&cfg, &transport, &RunRequest::for_config(&cfg, today()), None).unwrap();

        assert_eq!(run.fetch.records, 5);
        assert!(!run.fetch.is_partial());
        assert_eq!(run.orders.len(), 3);
        assert_eq!(run.summary.overdue, 1);
        assert_eq!(run.summary.in_progress, 1);

        let refs = |kind| -> Vec<String> {
            run.board
                .group(kind)
                .map(|g| g.orders.iter().map(|o| o.reference.clone()).collect())
                .unwrap_or_default()
        };
        assert_eq!(refs(GroupKind::InProgress), vec!["SO-2"]);
        assert_eq!(refs(GroupKind::Overdue), vec!["SO-1"]);
        assert_eq!(refs(GroupKind::NoDate), vec!["SO-5"]);
        assert_eq!(run.board.order_count(), run.orders.len());
    }

    #[test]
    fn configured_exclusions_reach_the_request() {
        let cfg = config();
        let transport = Replay::new(vec![(200, json!([]))]);
        let run = run(&cfg, &transport, &RunRequest::for_config(&cfg, today()), None).unwrap();
        assert!(run.is_empty());
        let filter = transport.last_where.borrow().clone().unwrap();
        assert!(filter.contains("Stage<>'Dispatched'"));
        assert!(!filter.contains("Stage<>'Processing'"));
    }

    #[test]
    fn selecting_every_known_stage_sends_no_filter() {
        let cfg = config();
        let transport = Replay::new(vec![(200, json!([]))]);
        let request =
            RunRequest::for_config(&cfg, today()).with_selected_stages(&cfg, &cfg.stages.known);
        run(&cfg, &transport, &request, None).unwrap();
        assert_eq!(*transport.last_where.borrow(), None);
    }

    #[test]
    fn auth_failure_returns_no_partial_data() {
        let cfg = config();
        let transport = Replay::new(vec![(403, json!({}))]);
        let err = run(&cfg, &transport, &RunRequest::for_config(&cfg, today()), None).unwrap_err();
        assert!(matches!(err, BoardError::Forbidden));
    }

    #[test]
    fn transient_failure_yields_partial_run() {
        let mut cfg = config();
        cfg.api.page_size = 5;
        let transport = Replay::new(vec![(200, orders_page()), (500, json!({}))]);
        let run = run(&cfg, &transport, &RunRequest::for_config(&cfg, today()), None).unwrap();
        assert!(run.fetch.is_partial());
        assert_eq!(run.fetch.failure.as_ref().map(|f| f.page), Some(2));
        assert_eq!(run.orders.len(), 3);
        assert_eq!(transport.calls.get(), 4);
    }

    #[test]
    fn cache_serves_second_run() {
        let cfg = config();
        let cache = FetchCache::new(std::time::Duration::from_secs(60));
        let transport = Replay::new(vec![(200, orders_page())]);
        let request = RunRequest::for_config(&cfg, today());

        let first = run(&cfg, &transport, &request, Some(&cache)).unwrap();
        let second = run(&cfg, &transport, &request, Some(&cache)).unwrap();
        assert!(!first.fetch.from_cache);
        assert!(second.fetch.from_cache);
        assert_eq!(second.orders.len(), first.orders.len());
        assert_eq!(transport.calls.get(), 1);
    }

    #[test]
    fn filter_applies_before_partition() {
        let cfg = config();
        let transport = Replay::new(vec![(200, orders_page())]);
        let request = RunRequest::for_config(&cfg, today()).with_filter(OrderFilter {
            search: Some("so-2".to_string()),
            upcoming_days: None,
        });
        let run = run(&cfg, &transport, &request, None).unwrap();
        assert_eq!(run.orders.len(), 1);
        assert_eq!(run.summary.total, 1);
        assert_eq!(run.orders[0].urgency, Urgency::DueSoon);
    }

    #[test]
    fn stage_prefix_board() {
        let mut cfg = config();
        cfg.inclusion = InclusionRule::StagePrefix {
            prefix: "Workshop - ".to_string(),
        };
        cfg.board.in_progress_stage = "Workshop - Processing".to_string();
        cfg.board.ready_stage = Some("Workshop - To Collect".to_string());
        let transport = Replay::new(vec![(
            200,
            json!([
                {"Id": 1, "Stage": "Workshop - Processing"},
                {"Id": 2, "Stage": "Workshop - To Collect"},
                {"Id": 3, "Stage": "Processing"},
            ]),
        )]);
        let run = run(&cfg, &transport, &RunRequest::for_config(&cfg, today()), None).unwrap();
        assert_eq!(run.orders.len(), 2);
        assert_eq!(run.summary.in_progress, 1);
        assert_eq!(run.summary.ready_for_pickup, 1);
    }
}

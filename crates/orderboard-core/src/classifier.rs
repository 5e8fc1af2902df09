use crate::config::{BoardConfig, InclusionRule};
use crate::date;
use crate::fields::{self, RawOrderRecord};
use crate::types::{SizeBucket, Urgency};
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use tracing::trace;

// ---------------------------------------------------------------------------
// NormalizedOrder (output)
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedOrder {
    /// Source identifier; `None` when the record carried none.
    pub id: Option<String>,
    pub reference: String,
    pub project_name: String,
    pub company: String,
    pub created_at: Option<NaiveDateTime>,
    pub modified_at: Option<NaiveDateTime>,
    pub estimated_delivery_at: Option<NaiveDateTime>,
    pub dispatched_at: Option<NaiveDateTime>,
    pub stage: String,
    /// `stage` with the configured display prefix removed.
    pub display_stage: String,
    pub status: String,
    pub branch_id: Option<i64>,
    pub line_count: usize,
    pub qty_total: f64,
    pub size_bucket: SizeBucket,
    pub workload_score: f64,
    pub urgency: Urgency,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub days_overdue: Option<i64>,
    pub is_void: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

impl NormalizedOrder {
    pub fn has_line_items(&self) -> bool {
        self.line_count > 0
    }

    /// Calendar date of the estimated delivery, if any.
    pub fn due_date(&self) -> Option<NaiveDate> {
        self.estimated_delivery_at.map(|ts| ts.date())
    }
}

// ---------------------------------------------------------------------------
// Exclusion rules
// ---------------------------------------------------------------------------

/// A record filter evaluated before classification. The first rule that
/// matches drops the record.
pub struct ExclusionRule {
    pub id: &'static str,
    pub excludes: fn(&RawOrderRecord, &BoardConfig) -> bool,
}

pub fn default_exclusions() -> Vec<ExclusionRule> {
    vec![
        ExclusionRule {
            id: "void",
            excludes: |record, _| fields::is_truthy(fields::resolve(record, &fields::IS_VOID)),
        },
        ExclusionRule {
            id: "inclusion",
            excludes: |record, cfg| !included(record, &cfg.inclusion),
        },
    ]
}

/// Whether a record passes the board's inclusion rule.
pub fn included(record: &RawOrderRecord, rule: &InclusionRule) -> bool {
    match rule {
        InclusionRule::BranchId { branch_id, .. } => {
            fields::resolve(record, &fields::DISTRIBUTION_BRANCH_ID).and_then(fields::coerce_id)
                == Some(*branch_id)
        }
        InclusionRule::StagePrefix { prefix } => {
            fields::text(record, &fields::STAGE).starts_with(prefix.as_str())
        }
    }
}

// ---------------------------------------------------------------------------
// Urgency
// ---------------------------------------------------------------------------

/// Urgency and days overdue for an order.
///
/// Only orders with a delivery estimate that have not been dispatched are
/// dated; everything else is [`Urgency::NoDate`]. The due-soon window is
/// inclusive at both ends.
pub fn urgency_for(
    estimated_delivery: Option<NaiveDateTime>,
    dispatched: bool,
    today: NaiveDate,
    due_soon_days: i64,
) -> (Urgency, Option<i64>) {
    let Some(eta) = estimated_delivery.filter(|_| !dispatched) else {
        return (Urgency::NoDate, None);
    };
    let days_until_due = (eta.date() - today).num_days();
    if days_until_due < 0 {
        (Urgency::Overdue, Some(-days_until_due))
    } else if days_until_due <= due_soon_days {
        (Urgency::DueSoon, None)
    } else {
        (Urgency::OnTrack, None)
    }
}

/// Sum of line quantities. A zero or blank quantity falls through to the next
/// alias; entries with no usable quantity count as zero.
pub fn quantity_total(items: &[Value]) -> f64 {
    items
        .iter()
        .filter_map(Value::as_object)
        .map(|item| {
            fields::resolve_truthy(item, &fields::LINE_QTY)
                .and_then(fields::coerce_number)
                .unwrap_or(0.0)
        })
        .sum()
}

// ---------------------------------------------------------------------------
// Classifier
// ---------------------------------------------------------------------------

pub struct Classifier<'a> {
    config: &'a BoardConfig,
    exclusions: Vec<ExclusionRule>,
}

impl<'a> Classifier<'a> {
    pub fn new(config: &'a BoardConfig) -> Self {
        Self {
            config,
            exclusions: default_exclusions(),
        }
    }

    /// Normalize one record as of `today`, or `None` when it is excluded.
    pub fn classify(&self, record: &RawOrderRecord, today: NaiveDate) -> Option<NormalizedOrder> {
        if let Some(rule) = self.exclusions.iter().find(|r| (r.excludes)(record, self.config)) {
            trace!(
                rule = rule.id,
                reference = %fields::text(record, &fields::REFERENCE),
                "record excluded"
            );
            return None;
        }

        let created_at = date::normalize(&fields::resolve(record, &fields::CREATED_DATE));
        let modified_at = date::normalize(&fields::resolve(record, &fields::MODIFIED_DATE));
        let estimated_delivery_at =
            date::normalize(&fields::resolve(record, &fields::ESTIMATED_DELIVERY_DATE));
        let dispatched_at = date::normalize(&fields::resolve(record, &fields::DISPATCHED_DATE));

        let items: &[Value] = match fields::resolve(record, &fields::LINE_ITEMS) {
            Some(Value::Array(items)) => items,
            _ => &[],
        };
        let line_count = items.len();
        let qty_total = quantity_total(items);

        let stage = fields::text(record, &fields::STAGE);
        let dispatched = stage == self.config.board.dispatched_stage || dispatched_at.is_some();
        let (urgency, days_overdue) = urgency_for(
            estimated_delivery_at,
            dispatched,
            today,
            self.config.board.due_soon_days,
        );

        let id = Some(fields::text(record, &fields::ID)).filter(|s| !s.is_empty());
        let link = id.as_deref().and_then(|id| self.config.order_link(id));

        Some(NormalizedOrder {
            reference: fields::text(record, &fields::REFERENCE),
            project_name: fields::text(record, &fields::PROJECT_NAME),
            company: fields::text(record, &fields::COMPANY),
            created_at,
            modified_at,
            estimated_delivery_at,
            dispatched_at,
            display_stage: self.config.board.display_stage(&stage).to_string(),
            stage,
            status: fields::text(record, &fields::STATUS),
            branch_id: fields::resolve(record, &fields::BRANCH_ID).and_then(fields::coerce_id),
            line_count,
            qty_total,
            size_bucket: SizeBucket::for_line_count(line_count),
            workload_score: line_count as f64 + qty_total / 10.0,
            urgency,
            days_overdue,
            is_void: false,
            link,
            id,
        })
    }

    /// Classify every record, dropping excluded ones. Input order is kept.
    pub fn classify_all(&self, records: &[RawOrderRecord], today: NaiveDate) -> Vec<NormalizedOrder> {
        records
            .iter()
            .filter_map(|r| self.classify(r, today))
            .collect()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

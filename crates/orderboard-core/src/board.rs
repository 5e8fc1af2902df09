use crate::classifier::NormalizedOrder;
use crate::config::BoardSettings;
use crate::types::{GroupKind, NoDateOrder, Urgency};
use serde::Serialize;
use std::cmp::Ordering;

// ---------------------------------------------------------------------------
// Board
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Serialize)]
pub struct BoardGroup {
    pub kind: GroupKind,
    pub title: String,
    pub orders: Vec<NormalizedOrder>,
}

impl BoardGroup {
    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }
}

/// Orders split into display groups, in priority order.
#[derive(Debug, Clone, Serialize)]
pub struct Board {
    pub groups: Vec<BoardGroup>,
}

impl Board {
    pub fn group(&self, kind: GroupKind) -> Option<&BoardGroup> {
        self.groups.iter().find(|g| g.kind == kind)
    }

    pub fn order_count(&self) -> usize {
        self.groups.iter().map(BoardGroup::len).sum()
    }

    /// Keep at most `limit` orders in each group.
    pub fn truncate_groups(&mut self, limit: usize) {
        for group in &mut self.groups {
            group.orders.truncate(limit);
        }
    }
}

// ---------------------------------------------------------------------------
// Partitioning
// ---------------------------------------------------------------------------

/// Split `orders` into groups.
///
/// Groups are filled in [`GroupKind`] order and each order lands in the first
/// group that accepts it. The pickup group exists only when a ready stage is
/// configured.
pub fn partition(orders: Vec<NormalizedOrder>, settings: &BoardSettings) -> Board {
    let mut pool = orders;
    let mut groups = Vec::new();

    for &kind in GroupKind::all() {
        let accepts: Box<dyn Fn(&NormalizedOrder) -> bool> = match kind {
            GroupKind::InProgress => {
                let stage = settings.in_progress_stage.clone();
                Box::new(move |o: &NormalizedOrder| o.stage == stage)
            }
            GroupKind::ReadyForPickup => match &settings.ready_stage {
                Some(stage) => {
                    let stage = stage.clone();
                    Box::new(move |o: &NormalizedOrder| o.stage == stage)
                }
                None => continue,
            },
            GroupKind::Overdue => Box::new(|o: &NormalizedOrder| o.urgency == Urgency::Overdue),
            GroupKind::DueSoon => Box::new(|o: &NormalizedOrder| o.urgency == Urgency::DueSoon),
            GroupKind::OnTrack => Box::new(|o: &NormalizedOrder| o.urgency == Urgency::OnTrack),
            GroupKind::NoDate => Box::new(|o: &NormalizedOrder| o.urgency == Urgency::NoDate),
        };

        let (mut taken, rest): (Vec<_>, Vec<_>) = pool.into_iter().partition(|o| accepts(o));
        pool = rest;
        sort_group(kind, &mut taken, settings.no_date_order);

        groups.push(BoardGroup {
            kind,
            title: kind.title().to_string(),
            orders: taken,
        });
    }

    Board { groups }
}

fn sort_group(kind: GroupKind, orders: &mut [NormalizedOrder], no_date_order: NoDateOrder) {
    match kind {
        GroupKind::InProgress => orders.sort_by(|a, b| {
            urgency_rank(a.urgency)
                .cmp(&urgency_rank(b.urgency))
                .then_with(|| asc_nulls_last(&a.estimated_delivery_at, &b.estimated_delivery_at))
        }),
        GroupKind::ReadyForPickup => orders.sort_by(|a, b| {
            asc_nulls_last(&a.estimated_delivery_at, &b.estimated_delivery_at)
                .then_with(|| asc_nulls_last(&a.created_at, &b.created_at))
        }),
        GroupKind::Overdue => {
            orders.sort_by(|a, b| desc_nulls_last(&a.days_overdue, &b.days_overdue))
        }
        GroupKind::DueSoon | GroupKind::OnTrack => orders
            .sort_by(|a, b| asc_nulls_last(&a.estimated_delivery_at, &b.estimated_delivery_at)),
        GroupKind::NoDate => match no_date_order {
            NoDateOrder::NewestFirst => {
                orders.sort_by(|a, b| desc_nulls_last(&a.created_at, &b.created_at))
            }
            NoDateOrder::OldestFirst => {
                orders.sort_by(|a, b| asc_nulls_last(&a.created_at, &b.created_at))
            }
        },
    }
}

fn urgency_rank(u: Urgency) -> u8 {
    match u {
        Urgency::Overdue => 0,
        Urgency::DueSoon => 1,
        Urgency::OnTrack | Urgency::NoDate => 2,
    }
}

fn asc_nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => a.cmp(b),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

fn desc_nulls_last<T: Ord>(a: &Option<T>, b: &Option<T>) -> Ordering {
    match (a, b) {
        (Some(a), Some(b)) => b.cmp(a),
        (Some(_), None) => Ordering::Less,
        (None, Some(_)) => Ordering::Greater,
        (None, None) => Ordering::Equal,
    }
}

// ---------------------------------------------------------------------------
// BoardSummary
// ---------------------------------------------------------------------------

/// Headline counts over the full order set.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct BoardSummary {
    pub total: usize,
    pub overdue: usize,
    pub due_soon: usize,
    pub on_track: usize,
    pub no_date: usize,
    pub in_progress: usize,
    pub ready_for_pickup: usize,
    pub total_workload: f64,
    /// False when no order carried line items, so size and workload are
    /// not meaningful.
    pub line_items_available: bool,
}

impl BoardSummary {
    pub fn compute(orders: &[NormalizedOrder], settings: &BoardSettings) -> Self {
        let count = |u: Urgency| orders.iter().filter(|o| o.urgency == u).count();
        let ready = settings.ready_stage.as_deref();
        Self {
            total: orders.len(),
            overdue: count(Urgency::Overdue),
            due_soon: count(Urgency::DueSoon),
            on_track: count(Urgency::OnTrack),
            no_date: count(Urgency::NoDate),
            in_progress: orders
                .iter()
                .filter(|o| o.stage == settings.in_progress_stage)
                .count(),
            ready_for_pickup: orders
                .iter()
                .filter(|o| Some(o.stage.as_str()) == ready)
                .count(),
            total_workload: orders.iter().map(|o| o.workload_score).sum(),
            line_items_available: orders.iter().any(NormalizedOrder::has_line_items),
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

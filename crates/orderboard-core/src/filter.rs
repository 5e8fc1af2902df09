use crate::classifier::NormalizedOrder;
use chrono::{Duration, NaiveDate};

/// Optional narrowing applied to classified orders before partitioning.
#[derive(Debug, Clone, Default)]
pub struct OrderFilter {
    /// Case-insensitive substring matched against reference, project and company.
    pub search: Option<String>,
    /// Keep only orders due within this many days of today, plus undated ones.
    pub upcoming_days: Option<i64>,
}

impl OrderFilter {
    pub fn is_empty(&self) -> bool {
        self.needle().is_none() && self.upcoming_days.is_none()
    }

    pub fn matches(&self, order: &NormalizedOrder, today: NaiveDate) -> bool {
        if let Some(needle) = self.needle() {
            let hit = [&order.reference, &order.project_name, &order.company]
                .iter()
                .any(|field| field.to_lowercase().contains(&needle));
            if !hit {
                return false;
            }
        }
        if let Some(cutoff) = self.cutoff(today) {
            if let Some(due) = order.due_date() {
                if due > cutoff {
                    return false;
                }
            }
        }
        true
    }

    pub fn apply(&self, orders: Vec<NormalizedOrder>, today: NaiveDate) -> Vec<NormalizedOrder> {
        if self.is_empty() {
            return orders;
        }
        orders
            .into_iter()
            .filter(|o| self.matches(o, today))
            .collect()
    }

    /// Last due date kept by the upcoming window. A window past the calendar
    /// range means no cutoff.
    fn cutoff(&self, today: NaiveDate) -> Option<NaiveDate> {
        let days = self.upcoming_days?;
        Duration::try_days(days).and_then(|d| today.checked_add_signed(d))
    }

    fn needle(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_lowercase)
    }
}

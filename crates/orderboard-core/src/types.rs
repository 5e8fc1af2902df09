use serde::{Deserialize, Serialize};
use std::fmt;

// ---------------------------------------------------------------------------
// Urgency
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Urgency {
    Overdue,
    DueSoon,
    OnTrack,
    NoDate,
}

impl Urgency {
    pub fn as_str(self) -> &'static str {
        match self {
            Urgency::Overdue => "overdue",
            Urgency::DueSoon => "due_soon",
            Urgency::OnTrack => "on_track",
            Urgency::NoDate => "no_date",
        }
    }

    /// Short badge text shown next to an order.
    pub fn badge(self) -> &'static str {
        match self {
            Urgency::Overdue => "OVERDUE",
            Urgency::DueSoon => "DUE SOON",
            Urgency::OnTrack => "ON TRACK",
            Urgency::NoDate => "NO ETD",
        }
    }
}

impl fmt::Display for Urgency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// SizeBucket
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum SizeBucket {
    S,
    M,
    L,
}

impl SizeBucket {
    pub fn for_line_count(line_count: usize) -> SizeBucket {
        if line_count < 10 {
            SizeBucket::S
        } else if line_count < 30 {
            SizeBucket::M
        } else {
            SizeBucket::L
        }
    }

    pub fn as_str(self) -> &'static str {
        match self {
            SizeBucket::S => "S",
            SizeBucket::M => "M",
            SizeBucket::L => "L",
        }
    }
}

impl fmt::Display for SizeBucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// GroupKind
// ---------------------------------------------------------------------------

/// Board groups in the priority order orders are placed into them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupKind {
    InProgress,
    ReadyForPickup,
    Overdue,
    DueSoon,
    OnTrack,
    NoDate,
}

impl GroupKind {
    pub fn all() -> &'static [GroupKind] {
        &[
            GroupKind::InProgress,
            GroupKind::ReadyForPickup,
            GroupKind::Overdue,
            GroupKind::DueSoon,
            GroupKind::OnTrack,
            GroupKind::NoDate,
        ]
    }

    pub fn as_str(self) -> &'static str {
        match self {
            GroupKind::InProgress => "in_progress",
            GroupKind::ReadyForPickup => "ready_for_pickup",
            GroupKind::Overdue => "overdue",
            GroupKind::DueSoon => "due_soon",
            GroupKind::OnTrack => "on_track",
            GroupKind::NoDate => "no_date",
        }
    }

    pub fn title(self) -> &'static str {
        match self {
            GroupKind::InProgress => "Currently Working On",
            GroupKind::ReadyForPickup => "To Collect",
            GroupKind::Overdue => "Overdue",
            GroupKind::DueSoon => "Due Soon",
            GroupKind::OnTrack => "On Track",
            GroupKind::NoDate => "No ETD",
        }
    }
}

impl fmt::Display for GroupKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// NoDateOrder
// ---------------------------------------------------------------------------

/// Sort direction for the no-date group, keyed on created date.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoDateOrder {
    /// Most recently created first.
    #[default]
    NewestFirst,
    /// Oldest first, surfacing orders that have waited longest for an ETA.
    OldestFirst,
}

impl NoDateOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            NoDateOrder::NewestFirst => "newest_first",
            NoDateOrder::OldestFirst => "oldest_first",
        }
    }
}

impl fmt::Display for NoDateOrder {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_bucket_boundaries() {
        assert_eq!(SizeBucket::for_line_count(0), SizeBucket::S);
        assert_eq!(SizeBucket::for_line_count(9), SizeBucket::S);
        assert_eq!(SizeBucket::for_line_count(10), SizeBucket::M);
        assert_eq!(SizeBucket::for_line_count(29), SizeBucket::M);
        assert_eq!(SizeBucket::for_line_count(30), SizeBucket::L);
        assert_eq!(SizeBucket::for_line_count(500), SizeBucket::L);
    }

    #[test]
    fn urgency_serializes_snake_case() {
        let json = serde_json::to_string(&Urgency::DueSoon).unwrap();
        assert_eq!(json, "\"due_soon\"");
    }

    #[test]
    fn group_kinds_in_priority_order() {
        let all = GroupKind::all();
        assert_eq!(all.first(), Some(&GroupKind::InProgress));
        assert_eq!(all.last(), Some(&GroupKind::NoDate));
        let mut sorted = all.to_vec();
        sorted.sort();
        assert_eq!(sorted, all.to_vec());
    }

    #[test]
    fn no_date_order_yaml() {
        let parsed: NoDateOrder = serde_yaml::from_str("oldest_first").unwrap();
        assert_eq!(parsed, NoDateOrder::OldestFirst);
        assert_eq!(NoDateOrder::default(), NoDateOrder::NewestFirst);
    }
}

//! C3 — a single timestamped base value.

use chrono::{DateTime, Utc};

use crate::value::Value;

#[derive(Debug, Clone, PartialEq)]
pub struct TInstant {
    value: Value,
    t: DateTime<Utc>,
}

impl TInstant {
    pub fn new(value: Value, t: DateTime<Utc>) -> Self {
        Self { value, t }
    }

    pub fn value(&self) -> &Value {
        &self.value
    }

    pub fn t(&self) -> DateTime<Utc> {
        self.t
    }
}

impl PartialOrd for TInstant {
    /// Instants compare by timestamp only, matching the skiplist ordering
    /// rule of spec §4.C9 ("an instant compares by its timestamp").
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        self.t.partial_cmp(&other.t)
    }
}

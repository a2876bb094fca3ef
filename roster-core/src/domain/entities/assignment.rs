use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use shared::Shift;
use std::collections::BTreeMap;

/// One roster cell: exactly one per (nurse, date) in a complete roster.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Assignment {
    pub nurse_id: String,
    pub date: NaiveDate,
    pub shift: Shift,
}

impl Assignment {
    pub fn new(nurse_id: impl Into<String>, date: NaiveDate, shift: Shift) -> Self {
        Self {
            nurse_id: nurse_id.into(),
            date,
            shift,
        }
    }
}

/// A user-pinned cell, kept stringly typed on purpose: locks with an unknown
/// nurse id, out-of-month date, or unrecognized shift are dropped without
/// error during model build, because lock sets are reused across edits.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FixedAssignment {
    pub nurse_id: String,
    pub date: String,
    pub shift: String,
}

/// The locks that survived validation, keyed by (nurse id, date).
pub type LockedMap = BTreeMap<(String, NaiveDate), Shift>;

pub mod analyzer;
pub mod candidates;
pub mod extract;
pub mod model_builder;
pub mod planner;
pub mod recheck;
pub mod relax;

use chrono::NaiveDate;
use std::collections::{BTreeMap, BTreeSet};

use crate::domain::calendar::days_in_month;
use crate::domain::entities::{MergedRule, Nurse, Rules};
use crate::domain::rules::merge_rules;

/// Request-scoped view shared by the model builder, analyzer and re-checker:
/// the month's days, the holiday set, the nurses in input order, and the
/// merged per-nurse rules. Immutable once built.
pub struct ScheduleContext {
    pub days: Vec<NaiveDate>,
    pub holidays: BTreeSet<NaiveDate>,
    pub nurses: Vec<Nurse>,
    pub nurse_index: BTreeMap<String, usize>,
    pub merged: BTreeMap<String, MergedRule>,
    pub rules: Rules,
}

impl ScheduleContext {
    pub fn new(nurses: Vec<Nurse>, rules: Rules) -> Self {
        let days = days_in_month(rules.year, rules.month);
        let holidays = rules.holidays.clone();
        let merged = merge_rules(&nurses, &rules.person_rules);
        let nurse_index = nurses
            .iter()
            .enumerate()
            .map(|(idx, n)| (n.id.clone(), idx))
            .collect();
        Self {
            days,
            holidays,
            nurses,
            nurse_index,
            merged,
            rules,
        }
    }

    pub fn nurse(&self, id: &str) -> Option<&Nurse> {
        self.nurse_index.get(id).map(|&idx| &self.nurses[idx])
    }

    /// Effective rule for a known nurse id.
    pub fn merged(&self, id: &str) -> &MergedRule {
        &self.merged[id]
    }
}

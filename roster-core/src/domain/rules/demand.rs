use chrono::{Datelike, NaiveDate, Weekday};
use std::collections::BTreeSet;

use crate::domain::calendar::is_weekend;
use crate::domain::entities::{ResolvedDemand, Rules};

/// Demand for a date, honoring per-date overrides first, then category
/// defaults: holiday → saturday_holiday, Sunday → sunday, Saturday →
/// saturday_holiday, otherwise weekday.
pub fn demand_for_day(rules: &Rules, date: NaiveDate, holidays: &BTreeSet<NaiveDate>) -> ResolvedDemand {
    if let Some(spec) = rules.demand.get(&date.to_string()) {
        return spec.resolve();
    }
    default_demand_for_day(rules, date, holidays)
}

/// Category-default demand, ignoring per-date overrides.
pub fn default_demand_for_day(
    rules: &Rules,
    date: NaiveDate,
    holidays: &BTreeSet<NaiveDate>,
) -> ResolvedDemand {
    let defaults = &rules.demand_defaults;
    let spec = if holidays.contains(&date) {
        defaults.saturday_holiday
    } else if date.weekday() == Weekday::Sun {
        defaults.sunday
    } else if is_weekend(date) {
        defaults.saturday_holiday
    } else {
        defaults.weekday
    };
    spec.resolve()
}

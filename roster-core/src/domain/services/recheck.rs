use chrono::NaiveDate;
use shared::Shift;
use std::collections::{BTreeMap, BTreeSet};

use super::analyzer::analyze_schedule;
use super::ScheduleContext;
use crate::domain::entities::{Assignment, LockedMap, Nurse, RecheckReport, Rules};

/// Validate a user-supplied assignment list: structural errors first
/// (unknown nurses, out-of-month dates, duplicates, capability breaches,
/// missing rows), then the full analyzer pass with an empty lock map.
/// `ok` only when both passes are clean. Individual problems are listed,
/// never aborted on.
pub fn recheck_assignments(
    assignments: &[Assignment],
    nurses: &[Nurse],
    rules: &Rules,
) -> RecheckReport {
    let ctx = ScheduleContext::new(nurses.to_vec(), rules.clone());
    let in_month: BTreeSet<NaiveDate> = ctx.days.iter().copied().collect();

    let mut violations: Vec<String> = Vec::new();
    let mut seen: BTreeMap<(&str, NaiveDate), u32> = BTreeMap::new();

    for entry in assignments {
        let nurse_id = entry.nurse_id.as_str();
        if !ctx.nurse_index.contains_key(nurse_id) {
            violations.push(format!("unknown nurse_id {nurse_id}"));
            continue;
        }
        if !in_month.contains(&entry.date) {
            violations.push(format!("date out of month {}", entry.date));
            continue;
        }
        let count = seen.entry((nurse_id, entry.date)).or_insert(0);
        *count += 1;
        if *count > 1 {
            violations.push(format!(
                "multiple shifts in a day for nurse {nurse_id} at {}",
                entry.date
            ));
        }
        let rule = ctx.merged(nurse_id);
        if entry.shift != Shift::Off && !rule.permits(entry.shift) {
            violations.push(format!(
                "nurse {nurse_id} cannot take {} {}",
                entry.shift, entry.date
            ));
        }
    }

    for nurse in &ctx.nurses {
        for date in &ctx.days {
            if !seen.contains_key(&(nurse.id.as_str(), *date)) {
                violations.push(format!("nurse {} missing assignment at {}", nurse.id, date));
            }
        }
    }

    let analysis = analyze_schedule(&ctx, assignments, &LockedMap::new());
    let ok = violations.is_empty() && analysis.violations.is_empty();
    tracing::debug!(
        ok,
        structural = violations.len(),
        coverage = analysis.violations.len(),
        "recheck finished"
    );

    RecheckReport {
        ok,
        violations,
        summary: analysis.summary(),
        warnings: analysis.warnings,
        violations_detail: analysis.violations,
        violation_cells: analysis.violation_cells,
        recommendations: analysis.recommendations,
    }
}

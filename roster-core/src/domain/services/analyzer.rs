use chrono::NaiveDate;
use shared::{Shift, Team, ALL_TEAMS};
use std::collections::BTreeMap;

use super::candidates::{excess_pool, shortage_pool, truncate_suggestions, AssignLookup};
use super::ScheduleContext;
use crate::domain::calendar::{is_weekend, is_weekend_or_holiday};
use crate::domain::entities::{
    Assignment, FilledCounts, LockedMap, PerDaySummary, PerNurseSummary, Recommendation,
    RuleSummary, ScheduleAnalysis, ShiftCounts, Violation, ViolationCell, ViolationKind,
};
use crate::domain::rules::demand_for_day;

/// Re-derive everything the UI needs from an assignment list: per-day fill,
/// per-nurse tallies, threshold warnings, cell-level violations, and ranked
/// remediation candidates. Works the same for solver output and user edits.
pub fn analyze_schedule(
    ctx: &ScheduleContext,
    schedule: &[Assignment],
    locked: &LockedMap,
) -> ScheduleAnalysis {
    let mut per_day_assignments: BTreeMap<NaiveDate, Vec<&Assignment>> = BTreeMap::new();
    let mut assign_lookup: AssignLookup<'_> = BTreeMap::new();
    for entry in schedule {
        per_day_assignments.entry(entry.date).or_default().push(entry);
        assign_lookup
            .entry(entry.nurse_id.as_str())
            .or_default()
            .insert(entry.date, entry.shift);
    }

    let mut analysis = ScheduleAnalysis::default();

    for date in &ctx.days {
        let date = *date;
        let day_items = per_day_assignments.get(&date).map(Vec::as_slice).unwrap_or(&[]);
        let mut counts = ShiftCounts::default();
        for item in day_items {
            counts.bump(item.shift);
        }
        let demand = demand_for_day(&ctx.rules, date, &ctx.holidays);
        analysis.per_day.push(PerDaySummary {
            date,
            weekday: date.format("%a").to_string(),
            is_weekend: is_weekend(date),
            is_holiday: ctx.holidays.contains(&date),
            requirements: demand,
            filled: FilledCounts {
                day: counts.day,
                late: counts.late,
                night: counts.night,
            },
        });

        if counts.day < demand.day_min {
            let deficit = demand.day_min - counts.day;
            analysis.violations.push(Violation {
                date,
                shift: Shift::Day,
                kind: ViolationKind::Shortage,
                difference: -(deficit as i32),
                actual: counts.day,
                required_min: Some(demand.day_min),
                required_max: Some(demand.day_max),
                required: None,
                missing_teams: None,
                message: format!(
                    "{date} 日勤不足 {deficit}名 ({} / {})",
                    counts.day, demand.day_min
                ),
            });
            analysis.violation_cells.push(ViolationCell {
                date,
                shift: Shift::Day,
                kind: ViolationKind::Shortage,
            });
            let pool = shortage_pool(ctx, date, Shift::Day, &assign_lookup, locked, None);
            if !pool.is_empty() {
                analysis.recommendations.push(Recommendation {
                    date,
                    shift: Shift::Day,
                    kind: ViolationKind::Shortage,
                    difference: -(deficit as i32),
                    suggestions: truncate_suggestions(pool, -(deficit as i32)),
                });
            }
        }
        if counts.day > demand.day_max {
            let excess = counts.day - demand.day_max;
            analysis.violations.push(Violation {
                date,
                shift: Shift::Day,
                kind: ViolationKind::Excess,
                difference: excess as i32,
                actual: counts.day,
                required_min: Some(demand.day_min),
                required_max: Some(demand.day_max),
                required: None,
                missing_teams: None,
                message: format!(
                    "{date} 日勤過多 {excess}名 ({} / {})",
                    counts.day, demand.day_max
                ),
            });
            analysis.violation_cells.push(ViolationCell {
                date,
                shift: Shift::Day,
                kind: ViolationKind::Excess,
            });
            let pool = excess_pool(ctx, date, Shift::Day, &assign_lookup, locked);
            if !pool.is_empty() {
                analysis.recommendations.push(Recommendation {
                    date,
                    shift: Shift::Day,
                    kind: ViolationKind::Excess,
                    difference: excess as i32,
                    suggestions: truncate_suggestions(pool, excess as i32),
                });
            }
        }

        if counts.late != demand.late {
            let diff = counts.late as i32 - demand.late as i32;
            let kind = if diff < 0 { ViolationKind::Shortage } else { ViolationKind::Excess };
            analysis.violations.push(Violation {
                date,
                shift: Shift::Late,
                kind,
                difference: diff,
                actual: counts.late,
                required_min: None,
                required_max: None,
                required: Some(demand.late),
                missing_teams: None,
                message: format!(
                    "{date} 遅番が想定と異なります ({} / {})",
                    counts.late, demand.late
                ),
            });
            analysis.violation_cells.push(ViolationCell { date, shift: Shift::Late, kind });
            let pool = if diff < 0 {
                shortage_pool(ctx, date, Shift::Late, &assign_lookup, locked, None)
            } else {
                excess_pool(ctx, date, Shift::Late, &assign_lookup, locked)
            };
            if !pool.is_empty() {
                analysis.recommendations.push(Recommendation {
                    date,
                    shift: Shift::Late,
                    kind,
                    difference: diff,
                    suggestions: truncate_suggestions(pool, diff),
                });
            }
        }

        if counts.night != demand.night {
            let diff = counts.night as i32 - demand.night as i32;
            let kind = if diff < 0 { ViolationKind::Shortage } else { ViolationKind::Excess };
            let mut violation = Violation {
                date,
                shift: Shift::Night,
                kind,
                difference: diff,
                actual: counts.night,
                required_min: None,
                required_max: None,
                required: Some(demand.night),
                missing_teams: None,
                message: format!(
                    "{date} 夜勤が想定と異なります ({} / {})",
                    counts.night, demand.night
                ),
            };
            analysis.violation_cells.push(ViolationCell { date, shift: Shift::Night, kind });
            if diff < 0 {
                let missing = missing_night_teams(ctx, day_items);
                if !missing.is_empty() {
                    violation.missing_teams = Some(missing.clone());
                }
                let mut pool = Vec::new();
                if missing.is_empty() {
                    pool = shortage_pool(ctx, date, Shift::Night, &assign_lookup, locked, None);
                } else {
                    for team in &missing {
                        pool.extend(shortage_pool(
                            ctx,
                            date,
                            Shift::Night,
                            &assign_lookup,
                            locked,
                            Some(*team),
                        ));
                    }
                }
                if !pool.is_empty() {
                    analysis.recommendations.push(Recommendation {
                        date,
                        shift: Shift::Night,
                        kind,
                        difference: diff,
                        suggestions: truncate_suggestions(pool, diff),
                    });
                }
            } else {
                let pool = excess_pool(ctx, date, Shift::Night, &assign_lookup, locked);
                if !pool.is_empty() {
                    analysis.recommendations.push(Recommendation {
                        date,
                        shift: Shift::Night,
                        kind,
                        difference: diff,
                        suggestions: truncate_suggestions(pool, diff),
                    });
                }
            }
            analysis.violations.push(violation);
        }
    }

    for nurse in &ctx.nurses {
        let rule = ctx.merged(&nurse.id);
        let empty = BTreeMap::new();
        let per_day = assign_lookup.get(nurse.id.as_str()).unwrap_or(&empty);
        let mut counts = ShiftCounts::default();
        for shift in per_day.values() {
            counts.bump(*shift);
        }
        let weekend_work = ctx
            .days
            .iter()
            .filter(|date| {
                is_weekend_or_holiday(**date, &ctx.holidays)
                    && per_day.get(date).is_some_and(|s| s.is_work())
            })
            .count() as u32;

        analysis.per_nurse.push(PerNurseSummary {
            nurse_id: nurse.id.clone(),
            name: nurse.name.clone(),
            team: nurse.team,
            counts,
            weekend_work,
            total_work_days: counts.work_total(),
            rule: RuleSummary {
                night_min: rule.night_min,
                night_max: rule.night_max,
                week_max_days: rule.week_max_days,
                weekend_cap: rule.weekend_cap,
                month_quota_days: rule.month_quota_days,
            },
        });

        if rule.night_min.is_some_and(|min| counts.night == min) {
            analysis
                .warnings
                .push(format!("看護師 {} の夜勤回数が下限ぴったりです", nurse.id));
        }
        if rule.night_max.is_some_and(|max| counts.night == max) {
            analysis
                .warnings
                .push(format!("看護師 {} の夜勤回数が上限ぴったりです", nurse.id));
        }
        if rule.weekend_cap.is_some_and(|cap| weekend_work == cap) {
            analysis
                .warnings
                .push(format!("看護師 {} の土日祝勤務が上限に達しています", nurse.id));
        }
    }

    analysis
}

/// NIGHT team coverage is judged against one nurse from each of A, B, ER.
fn missing_night_teams(ctx: &ScheduleContext, day_items: &[&Assignment]) -> Vec<Team> {
    let mut team_counts: BTreeMap<Team, u32> = BTreeMap::new();
    for item in day_items {
        if item.shift != Shift::Night {
            continue;
        }
        if let Some(nurse) = ctx.nurse(&item.nurse_id) {
            *team_counts.entry(nurse.team).or_insert(0) += 1;
        }
    }
    let mut missing = Vec::new();
    for team in ALL_TEAMS {
        let have = team_counts.get(&team).copied().unwrap_or(0);
        for _ in have..1 {
            missing.push(team);
        }
    }
    missing
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{DemandSpec, Nurse, Rules};
    use shared::Team;

    fn two_nurse_context(late: u32) -> ScheduleContext {
        let nurses = vec![
            Nurse::new("1", "Nurse_1", Team::A),
            Nurse::new("2", "Nurse_2", Team::A),
        ];
        let mut rules = Rules::new(2025, 10);
        rules.demand_defaults.weekday = DemandSpec::exact(0, 9999, late, 0);
        rules.demand_defaults.saturday_holiday = DemandSpec::exact(0, 9999, late, 0);
        rules.demand_defaults.sunday = DemandSpec::exact(0, 9999, late, 0);
        ScheduleContext::new(nurses, rules)
    }

    fn full_roster(ctx: &ScheduleContext, mut shift_for: impl FnMut(&str, NaiveDate) -> Shift) -> Vec<Assignment> {
        let mut schedule = Vec::new();
        for nurse in &ctx.nurses {
            for date in &ctx.days {
                schedule.push(Assignment::new(nurse.id.clone(), *date, shift_for(&nurse.id, *date)));
            }
        }
        schedule
    }

    #[test]
    fn clean_roster_has_no_violations() {
        let ctx = two_nurse_context(0);
        let schedule = full_roster(&ctx, |_, _| Shift::Off);
        let analysis = analyze_schedule(&ctx, &schedule, &LockedMap::new());
        assert!(analysis.violations.is_empty());
        assert!(analysis.violation_cells.is_empty());
        assert_eq!(analysis.per_day.len(), 31);
        assert_eq!(analysis.per_nurse.len(), 2);
        assert_eq!(analysis.per_nurse[0].counts.off, 31);
    }

    #[test]
    fn late_shortfall_yields_cell_and_ranked_candidates() {
        let ctx = two_nurse_context(1);
        // nobody works LATE anywhere: every day is short by one
        let schedule = full_roster(&ctx, |_, _| Shift::Off);
        let analysis = analyze_schedule(&ctx, &schedule, &LockedMap::new());

        let first = &analysis.violations[0];
        assert_eq!(first.shift, Shift::Late);
        assert_eq!(first.kind, ViolationKind::Shortage);
        assert_eq!(first.difference, -1);
        assert_eq!(first.required, Some(1));

        let cell = &analysis.violation_cells[0];
        assert_eq!(cell.kind, ViolationKind::Shortage);

        let rec = &analysis.recommendations[0];
        assert_eq!(rec.suggestions.len(), 2);
        assert_eq!(rec.suggestions[0].nurse_id, "1");
        assert_eq!(rec.suggestions[0].current_shift, Shift::Off);
    }

    #[test]
    fn late_excess_suggests_moving_to_off() {
        let ctx = two_nurse_context(0);
        let schedule = full_roster(&ctx, |id, _| if id == "1" { Shift::Late } else { Shift::Off });
        let analysis = analyze_schedule(&ctx, &schedule, &LockedMap::new());

        let first = &analysis.violations[0];
        assert_eq!(first.kind, ViolationKind::Excess);
        assert_eq!(first.difference, 1);
        let rec = &analysis.recommendations[0];
        assert_eq!(rec.suggestions[0].suggested_shift, Shift::Off);
    }

    #[test]
    fn night_shortage_reports_missing_teams() {
        let nurses = vec![
            Nurse::new("1", "Nurse_1", Team::A),
            Nurse::new("2", "Nurse_2", Team::B),
            Nurse::new("3", "Nurse_3", Team::Er),
        ];
        let mut rules = Rules::new(2025, 10);
        rules.demand_defaults.weekday = DemandSpec::exact(0, 9999, 0, 3);
        rules.demand_defaults.saturday_holiday = DemandSpec::exact(0, 9999, 0, 3);
        rules.demand_defaults.sunday = DemandSpec::exact(0, 9999, 0, 3);
        let ctx = ScheduleContext::new(nurses, rules);

        // only the A nurse works nights: B and ER slots go uncovered
        let schedule = {
            let mut s = Vec::new();
            for nurse in &ctx.nurses {
                for date in &ctx.days {
                    let shift = if nurse.id == "1" { Shift::Night } else { Shift::Off };
                    s.push(Assignment::new(nurse.id.clone(), *date, shift));
                }
            }
            s
        };
        let analysis = analyze_schedule(&ctx, &schedule, &LockedMap::new());
        let first = &analysis.violations[0];
        assert_eq!(first.shift, Shift::Night);
        assert_eq!(first.missing_teams, Some(vec![Team::B, Team::Er]));

        // candidates come from the missing teams only
        let rec = &analysis.recommendations[0];
        assert!(rec.suggestions.iter().all(|s| s.nurse_id != "1"));
    }

    #[test]
    fn threshold_warnings_fire_at_exact_bounds() {
        let nurses = vec![Nurse::new("1", "Nurse_1", Team::A)];
        let mut rules = Rules::new(2025, 10);
        rules.person_rules.insert(
            "1".to_string(),
            crate::domain::entities::PersonRule {
                night_min: Some(2),
                night_max: Some(4),
                ..Default::default()
            },
        );
        let ctx = ScheduleContext::new(nurses, rules);
        let mut nights = 0;
        let schedule = full_roster(&ctx, |_, _| {
            nights += 1;
            if nights <= 2 { Shift::Night } else { Shift::Off }
        });
        let analysis = analyze_schedule(&ctx, &schedule, &LockedMap::new());
        assert!(analysis
            .warnings
            .iter()
            .any(|w| w.contains("夜勤回数が下限ぴったり")));
    }
}

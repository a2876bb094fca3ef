use chrono::NaiveDate;
use shared::{Shift, ALL_SHIFTS, ALL_TEAMS, WORK_SHIFTS};
use std::collections::BTreeMap;
use std::str::FromStr;

use super::ScheduleContext;
use crate::domain::calendar::{is_weekend_or_holiday, week_key};
use crate::domain::entities::{FixedAssignment, LockedMap};
use crate::domain::rules::demand_for_day;
use crate::solver::{CpModel, VarId};

/// Nine days off is the baseline monthly quota before `extra_holidays`.
const BASE_OFF_QUOTA: u32 = 9;

/// Branching order within a cell. OFF first: the work shifts are the
/// quota-bounded resources, so the search commits to them as late as the
/// coverage constraints allow.
const BRANCH_ORDER: [Shift; 4] = [Shift::Off, Shift::Day, Shift::Late, Shift::Night];

/// Index over the x[nurse, day, shift] variables, laid out day-major so the
/// search decides whole days at a time.
pub struct VarTable {
    vars: Vec<VarId>,
    num_nurses: usize,
}

impl VarTable {
    pub fn var(&self, nurse_idx: usize, day_idx: usize, shift: Shift) -> VarId {
        self.vars[(day_idx * self.num_nurses + nurse_idx) * ALL_SHIFTS.len() + shift.index()]
    }
}

pub struct RosterModel {
    pub model: CpModel,
    pub vars: VarTable,
    pub locked: LockedMap,
}

/// Compile nurses + rules into the constraint model. Locks whose nurse id,
/// date, or shift is unrecognized are dropped without error; a lock that
/// contradicts a capability gate survives into the model and makes it
/// infeasible.
pub fn build_roster_model(ctx: &ScheduleContext, fixed_assignments: &[FixedAssignment]) -> RosterModel {
    let mut model = CpModel::new();
    let num_nurses = ctx.nurses.len();

    let mut vars = Vec::with_capacity(ctx.days.len() * num_nurses * ALL_SHIFTS.len());
    for date in &ctx.days {
        for nurse in &ctx.nurses {
            for shift in ALL_SHIFTS {
                vars.push(model.new_bool_var(format!("x_{}_{}_{}", nurse.id, date, shift)));
            }
        }
    }
    let vars = VarTable { vars, num_nurses };

    // exactly one shift per (nurse, day); these groups drive the search
    for d in 0..ctx.days.len() {
        for n in 0..num_nurses {
            model.add_exactly_one(BRANCH_ORDER.iter().map(|&s| vars.var(n, d, s)).collect());
        }
    }

    let locked = apply_fixed_assignments(&mut model, &vars, ctx, fixed_assignments);

    let mut week_to_days: BTreeMap<(i32, u32), Vec<usize>> = BTreeMap::new();
    for (d, date) in ctx.days.iter().enumerate() {
        week_to_days.entry(week_key(*date)).or_default().push(d);
    }
    let weekend_days: Vec<usize> = ctx
        .days
        .iter()
        .enumerate()
        .filter(|(_, date)| is_weekend_or_holiday(**date, &ctx.holidays))
        .map(|(d, _)| d)
        .collect();
    let holiday_days: Vec<usize> = ctx
        .days
        .iter()
        .enumerate()
        .filter(|(_, date)| ctx.holidays.contains(date))
        .map(|(d, _)| d)
        .collect();

    for (d, date) in ctx.days.iter().enumerate() {
        let demand = demand_for_day(&ctx.rules, *date, &ctx.holidays);
        let shift_sum =
            |shift: Shift| -> Vec<VarId> { (0..num_nurses).map(|n| vars.var(n, d, shift)).collect() };
        model.add_sum_range(shift_sum(Shift::Day), demand.day_min as i32, demand.day_max as i32);
        model.add_sum_eq(shift_sum(Shift::Late), demand.late as i32);
        model.add_sum_eq(shift_sum(Shift::Night), demand.night as i32);

        // one NIGHT from each staffed team
        for team in ALL_TEAMS {
            let members: Vec<VarId> = ctx
                .nurses
                .iter()
                .enumerate()
                .filter(|(_, nurse)| nurse.team == team)
                .map(|(n, _)| vars.var(n, d, Shift::Night))
                .collect();
            if !members.is_empty() {
                model.add_sum_eq(members, 1);
            }
        }

        if is_weekend_or_holiday(*date, &ctx.holidays) {
            let leaders: Vec<VarId> = ctx
                .nurses
                .iter()
                .enumerate()
                .filter(|(_, nurse)| {
                    ctx.rules
                        .leader_requirement
                        .weekend_holiday
                        .contains(&nurse.id)
                })
                .map(|(n, _)| vars.var(n, d, Shift::Day))
                .collect();
            model.add_sum_ge(leaders, 1);
        }

        for (a, b) in &ctx.rules.forbidden_pairs.night {
            if let (Some(&na), Some(&nb)) = (ctx.nurse_index.get(a), ctx.nurse_index.get(b)) {
                model.add_sum_le(vec![vars.var(na, d, Shift::Night), vars.var(nb, d, Shift::Night)], 1);
            }
        }

        // a charge-capable nurse must be on every NIGHT
        let night_leaders: Vec<VarId> = ctx
            .nurses
            .iter()
            .enumerate()
            .filter(|(_, nurse)| nurse.leader_ok && !ctx.merged(&nurse.id).cannot_lead_night)
            .map(|(n, _)| vars.var(n, d, Shift::Night))
            .collect();
        model.add_sum_ge(night_leaders, 1);
    }

    // NIGHT is never followed by DAY or LATE
    for n in 0..num_nurses {
        for d in 0..ctx.days.len().saturating_sub(1) {
            model.add_sum_le(vec![vars.var(n, d, Shift::Night), vars.var(n, d + 1, Shift::Day)], 1);
            model.add_sum_le(vec![vars.var(n, d, Shift::Night), vars.var(n, d + 1, Shift::Late)], 1);
        }
    }

    for (n, nurse) in ctx.nurses.iter().enumerate() {
        let rule = ctx.merged(&nurse.id);
        let off_target = BASE_OFF_QUOTA + rule.extra_holidays;
        model.add_sum_ge(
            (0..ctx.days.len()).map(|d| vars.var(n, d, Shift::Off)).collect(),
            off_target as i32,
        );

        for shift in WORK_SHIFTS {
            if !rule.permits(shift) {
                for d in 0..ctx.days.len() {
                    model.fix(vars.var(n, d, shift), false);
                }
            }
        }

        if let Some(night_min) = rule.night_min {
            model.add_sum_ge(
                (0..ctx.days.len()).map(|d| vars.var(n, d, Shift::Night)).collect(),
                night_min as i32,
            );
        }
        if let Some(night_max) = rule.night_max {
            model.add_sum_le(
                (0..ctx.days.len()).map(|d| vars.var(n, d, Shift::Night)).collect(),
                night_max as i32,
            );
        }
        if rule.exclude_day_on_weekend {
            for &d in &weekend_days {
                model.fix(vars.var(n, d, Shift::Day), false);
            }
        }
        if rule.only_night {
            for d in 0..ctx.days.len() {
                model.fix(vars.var(n, d, Shift::Day), false);
                model.fix(vars.var(n, d, Shift::Late), false);
                model.add_sum_eq(vec![vars.var(n, d, Shift::Off), vars.var(n, d, Shift::Night)], 1);
            }
        }
        if rule.only_day {
            for d in 0..ctx.days.len() {
                model.fix(vars.var(n, d, Shift::Night), false);
            }
        }
        if let Some(quota) = rule.month_quota_days {
            model.add_sum_eq(
                (0..ctx.days.len()).map(|d| vars.var(n, d, Shift::Day)).collect(),
                quota as i32,
            );
        }
        if let Some(cap) = rule.week_max_days {
            for day_list in week_to_days.values() {
                let mut work = Vec::with_capacity(day_list.len() * WORK_SHIFTS.len());
                for &d in day_list {
                    for shift in WORK_SHIFTS {
                        work.push(vars.var(n, d, shift));
                    }
                }
                model.add_sum_le(work, cap as i32);
            }
        }
        if let Some(cap) = rule.weekend_cap {
            let mut work = Vec::with_capacity(weekend_days.len() * WORK_SHIFTS.len());
            for &d in &weekend_days {
                for shift in WORK_SHIFTS {
                    work.push(vars.var(n, d, shift));
                }
            }
            model.add_sum_le(work, cap as i32);
        }
        if rule.weekend_off {
            for &d in &weekend_days {
                model.fix(vars.var(n, d, Shift::Off), true);
            }
        }
        if rule.holiday_off {
            for &d in &holiday_days {
                model.fix(vars.var(n, d, Shift::Off), true);
            }
        }
        if rule.weekend_day_only {
            for (d, date) in ctx.days.iter().enumerate() {
                if is_weekend_or_holiday(*date, &ctx.holidays) {
                    model.fix(vars.var(n, d, Shift::Late), false);
                    model.fix(vars.var(n, d, Shift::Night), false);
                } else {
                    model.fix(vars.var(n, d, Shift::Off), true);
                }
            }
        }
        if rule.weekend_only_night {
            for (d, date) in ctx.days.iter().enumerate() {
                if !is_weekend_or_holiday(*date, &ctx.holidays) {
                    model.fix(vars.var(n, d, Shift::Night), false);
                    model.fix(vars.var(n, d, Shift::Off), true);
                }
            }
        }
    }

    tracing::debug!(
        vars = model.num_vars(),
        constraints = model.num_constraints(),
        locks = locked.len(),
        "compiled roster model"
    );

    RosterModel { model, vars, locked }
}

fn apply_fixed_assignments(
    model: &mut CpModel,
    vars: &VarTable,
    ctx: &ScheduleContext,
    fixed_assignments: &[FixedAssignment],
) -> LockedMap {
    let mut locked = LockedMap::new();
    let day_lookup: BTreeMap<NaiveDate, usize> = ctx
        .days
        .iter()
        .enumerate()
        .map(|(d, date)| (*date, d))
        .collect();
    for item in fixed_assignments {
        let Some(&nurse_idx) = ctx.nurse_index.get(&item.nurse_id) else {
            continue;
        };
        let Ok(date) = NaiveDate::from_str(&item.date) else {
            continue;
        };
        let Some(&day_idx) = day_lookup.get(&date) else {
            continue;
        };
        let Ok(shift) = Shift::from_str(&item.shift.to_uppercase()) else {
            continue;
        };
        locked.insert((item.nurse_id.clone(), date), shift);
        model.fix(vars.var(nurse_idx, day_idx, shift), true);
        for other in ALL_SHIFTS {
            if other != shift {
                model.fix(vars.var(nurse_idx, day_idx, other), false);
            }
        }
    }
    locked
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{DemandSpec, Nurse, PersonRule, Rules};
    use shared::Team;

    fn small_context() -> ScheduleContext {
        let nurses = vec![
            Nurse::new("1", "Nurse_1", Team::A),
            Nurse::new("2", "Nurse_2", Team::A),
        ];
        let mut rules = Rules::new(2025, 10);
        rules.demand_defaults.weekday = DemandSpec::exact(0, 9999, 0, 1);
        rules.demand_defaults.saturday_holiday = DemandSpec::exact(0, 9999, 0, 1);
        rules.demand_defaults.sunday = DemandSpec::exact(0, 9999, 0, 1);
        ScheduleContext::new(nurses, rules)
    }

    #[test]
    fn declares_a_variable_per_cell_and_shift() {
        let ctx = small_context();
        let built = build_roster_model(&ctx, &[]);
        assert_eq!(built.model.num_vars(), 2 * 31 * 4);
    }

    #[test]
    fn invalid_locks_are_dropped_silently() {
        let ctx = small_context();
        let fixed = vec![
            FixedAssignment {
                nurse_id: "99".to_string(),
                date: "2025-10-02".to_string(),
                shift: "NIGHT".to_string(),
            },
            FixedAssignment {
                nurse_id: "1".to_string(),
                date: "2025-11-02".to_string(),
                shift: "NIGHT".to_string(),
            },
            FixedAssignment {
                nurse_id: "1".to_string(),
                date: "2025-10-02".to_string(),
                shift: "GRAVEYARD".to_string(),
            },
            FixedAssignment {
                nurse_id: "1".to_string(),
                date: "2025-10-02".to_string(),
                shift: "night".to_string(),
            },
        ];
        let built = build_roster_model(&ctx, &fixed);
        // only the final lock is valid (shift strings are upcased)
        assert_eq!(built.locked.len(), 1);
        let date = NaiveDate::from_ymd_opt(2025, 10, 2).unwrap();
        assert_eq!(built.locked[&("1".to_string(), date)], Shift::Night);
    }

    #[test]
    fn week_caps_partition_on_iso_buckets() {
        let nurses = vec![Nurse::new("1", "Nurse_1", Team::A)];
        let mut rules = Rules::new(2025, 10);
        rules.person_rules.insert(
            "1".to_string(),
            PersonRule {
                week_max_days: Some(3),
                ..PersonRule::default()
            },
        );
        let ctx = ScheduleContext::new(nurses, rules);
        let built = build_roster_model(&ctx, &[]);

        // October 2025 spans ISO weeks 40-44: a 5-day head, three full
        // weeks, and a 5-day tail; each bucket gets one cap over its
        // in-month work variables
        let mut bucket_sizes: Vec<usize> = built
            .model
            .constraints
            .iter()
            .filter(|c| c.min == 0 && c.max == 3 && c.terms.len() >= 15)
            .map(|c| c.terms.len())
            .collect();
        bucket_sizes.sort_unstable();
        assert_eq!(bucket_sizes, vec![15, 15, 21, 21, 21]);
    }
}

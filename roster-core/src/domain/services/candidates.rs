use chrono::NaiveDate;
use shared::{Shift, Team};
use std::collections::BTreeMap;

use super::ScheduleContext;
use crate::domain::entities::{CandidateSuggestion, LockedMap};

/// Movement cost of pulling a nurse onto a shortage shift, indexed by
/// [target work shift][current shift] in ALL_SHIFTS order. `None` means the
/// nurse already holds the target shift and is skipped.
const MOVE_COST: [[Option<u8>; 4]; 3] = [
    // current:  DAY      LATE     NIGHT    OFF
    /* DAY   */ [None, Some(1), Some(2), Some(0)],
    /* LATE  */ [Some(1), None, Some(2), Some(0)],
    /* NIGHT */ [Some(1), Some(2), None, Some(0)],
];

pub(crate) type AssignLookup<'a> = BTreeMap<&'a str, BTreeMap<NaiveDate, Shift>>;

/// Candidates for filling a shortage on `shift` at `date`, ranked by
/// (movement cost, unlocked first, nurse id).
pub(crate) fn shortage_pool(
    ctx: &ScheduleContext,
    date: NaiveDate,
    shift: Shift,
    assign_lookup: &AssignLookup<'_>,
    locked: &LockedMap,
    missing_team: Option<Team>,
) -> Vec<CandidateSuggestion> {
    debug_assert!(shift.is_work());
    let mut scored: Vec<((u8, bool, String), CandidateSuggestion)> = Vec::new();
    for nurse in &ctx.nurses {
        let rule = ctx.merged(&nurse.id);
        if !rule.permits(shift) {
            continue;
        }
        if let Some(team) = missing_team {
            if nurse.team != team {
                continue;
            }
        }
        let current = assign_lookup
            .get(nurse.id.as_str())
            .and_then(|per_day| per_day.get(&date).copied())
            .unwrap_or(Shift::Off);
        let Some(cost) = MOVE_COST[shift.index()][current.index()] else {
            continue;
        };
        let is_locked = locked.contains_key(&(nurse.id.clone(), date));
        scored.push((
            (cost, is_locked, nurse.id.clone()),
            CandidateSuggestion {
                nurse_id: nurse.id.clone(),
                current_shift: current,
                suggested_shift: shift,
                locked: is_locked,
                reason: format!("{date} {shift} 不足補充候補"),
            },
        ));
    }
    scored.sort_by(|a, b| a.0.cmp(&b.0));
    scored.into_iter().map(|(_, suggestion)| suggestion).collect()
}

/// Candidates for draining an excess on `shift` at `date`, ranked by
/// (unlocked first, nurse id). The suggested target is OFF, or DAY for the
/// degenerate OFF-excess case.
pub(crate) fn excess_pool(
    ctx: &ScheduleContext,
    date: NaiveDate,
    shift: Shift,
    assign_lookup: &AssignLookup<'_>,
    locked: &LockedMap,
) -> Vec<CandidateSuggestion> {
    let suggested = if shift != Shift::Off { Shift::Off } else { Shift::Day };
    let mut scored: Vec<((bool, String), CandidateSuggestion)> = Vec::new();
    for nurse in &ctx.nurses {
        let current = assign_lookup
            .get(nurse.id.as_str())
            .and_then(|per_day| per_day.get(&date).copied());
        if current != Some(shift) {
            continue;
        }
        let is_locked = locked.contains_key(&(nurse.id.clone(), date));
        scored.push((
            (is_locked, nurse.id.clone()),
            CandidateSuggestion {
                nurse_id: nurse.id.clone(),
                current_shift: shift,
                suggested_shift: suggested,
                locked: is_locked,
                reason: format!("{date} {shift} 過多調整候補"),
            },
        ));
    }
    scored.sort_by(|a, b| a.0.cmp(&b.0));
    scored.into_iter().map(|(_, suggestion)| suggestion).collect()
}

/// At most `max(3, |difference|)` suggestions survive per violation cell.
pub(crate) fn truncate_suggestions(
    mut pool: Vec<CandidateSuggestion>,
    difference: i32,
) -> Vec<CandidateSuggestion> {
    pool.truncate(3.max(difference.unsigned_abs() as usize));
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::entities::{Nurse, PersonRule, Rules};
    use crate::domain::services::ScheduleContext;

    fn ctx() -> ScheduleContext {
        let nurses = vec![
            Nurse::new("1", "Nurse_1", Team::A),
            Nurse::new("2", "Nurse_2", Team::A),
            Nurse::new("3", "Nurse_3", Team::B),
        ];
        ScheduleContext::new(nurses, Rules::new(2025, 10))
    }

    fn lookup(entries: &[(&'static str, u32, Shift)]) -> AssignLookup<'static> {
        let mut lookup: AssignLookup<'static> = BTreeMap::new();
        for (id, day, shift) in entries {
            let date = NaiveDate::from_ymd_opt(2025, 10, *day).unwrap();
            lookup.entry(id).or_default().insert(date, *shift);
        }
        lookup
    }

    #[test]
    fn off_nurses_rank_before_reassignments() {
        let ctx = ctx();
        let date = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();
        let lookup = lookup(&[
            ("1", 6, Shift::Late),
            ("2", 6, Shift::Off),
            ("3", 6, Shift::Night),
        ]);
        let pool = shortage_pool(&ctx, date, Shift::Day, &lookup, &LockedMap::new(), None);
        let order: Vec<&str> = pool.iter().map(|c| c.nurse_id.as_str()).collect();
        // OFF (cost 0) < LATE (cost 1) < NIGHT (cost 2)
        assert_eq!(order, vec!["2", "1", "3"]);
    }

    #[test]
    fn nurses_already_on_the_shift_are_skipped() {
        let ctx = ctx();
        let date = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();
        let lookup = lookup(&[("1", 6, Shift::Day), ("2", 6, Shift::Off)]);
        let pool = shortage_pool(&ctx, date, Shift::Day, &lookup, &LockedMap::new(), None);
        assert!(pool.iter().all(|c| c.nurse_id != "1"));
    }

    #[test]
    fn capability_gates_filter_the_pool() {
        let nurses = vec![Nurse::new("1", "Nurse_1", Team::A), Nurse::new("2", "Nurse_2", Team::A)];
        let mut rules = Rules::new(2025, 10);
        rules.person_rules.insert(
            "1".to_string(),
            PersonRule {
                only_day: true,
                ..PersonRule::default()
            },
        );
        let ctx = ScheduleContext::new(nurses, rules);
        let date = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();
        let pool = shortage_pool(&ctx, date, Shift::Night, &BTreeMap::new(), &LockedMap::new(), None);
        let order: Vec<&str> = pool.iter().map(|c| c.nurse_id.as_str()).collect();
        assert_eq!(order, vec!["2"]);
    }

    #[test]
    fn missing_team_restricts_night_candidates() {
        let ctx = ctx();
        let date = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();
        let pool = shortage_pool(
            &ctx,
            date,
            Shift::Night,
            &BTreeMap::new(),
            &LockedMap::new(),
            Some(Team::B),
        );
        let order: Vec<&str> = pool.iter().map(|c| c.nurse_id.as_str()).collect();
        assert_eq!(order, vec!["3"]);
    }

    #[test]
    fn locked_nurses_sink_within_equal_cost() {
        let ctx = ctx();
        let date = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();
        let mut locked = LockedMap::new();
        locked.insert(("1".to_string(), date), Shift::Off);
        let pool = shortage_pool(&ctx, date, Shift::Day, &BTreeMap::new(), &locked, None);
        let order: Vec<&str> = pool.iter().map(|c| c.nurse_id.as_str()).collect();
        assert_eq!(order, vec!["2", "3", "1"]);
        assert!(pool[2].locked);
    }

    #[test]
    fn excess_pool_suggests_off() {
        let ctx = ctx();
        let date = NaiveDate::from_ymd_opt(2025, 10, 6).unwrap();
        let lookup = lookup(&[("1", 6, Shift::Late), ("2", 6, Shift::Late)]);
        let pool = excess_pool(&ctx, date, Shift::Late, &lookup, &LockedMap::new());
        assert_eq!(pool.len(), 2);
        assert!(pool.iter().all(|c| c.suggested_shift == Shift::Off));
    }

    #[test]
    fn truncation_keeps_at_least_three() {
        let pool: Vec<CandidateSuggestion> = (0..6)
            .map(|i| CandidateSuggestion {
                nurse_id: i.to_string(),
                current_shift: Shift::Off,
                suggested_shift: Shift::Day,
                locked: false,
                reason: String::new(),
            })
            .collect();
        assert_eq!(truncate_suggestions(pool.clone(), -1).len(), 3);
        assert_eq!(truncate_suggestions(pool, -5).len(), 5);
    }
}

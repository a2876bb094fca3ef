use std::collections::BTreeMap;

use crate::domain::entities::{MergedRule, Nurse, PersonRule};

/// Overlay person rules on nurse base attributes, producing the effective
/// per-nurse rule view. A person-rule `None` defers to the base attribute;
/// both `None` means unconstrained. `only_day` forbids night and late work,
/// `only_night` forbids day and late work; the propagation lives here rather
/// than on the nurse record. Pure and idempotent.
pub fn merge_rules(
    nurses: &[Nurse],
    person_rules: &BTreeMap<String, PersonRule>,
) -> BTreeMap<String, MergedRule> {
    let mut merged = BTreeMap::new();
    for nurse in nurses {
        let default_rule = PersonRule::default();
        let pr = person_rules.get(&nurse.id).unwrap_or(&default_rule);
        let mut rule = MergedRule {
            day_ok: nurse.day_ok != Some(false),
            late_ok: nurse.late_ok != Some(false),
            night_ok: nurse.night_ok != Some(false),
            night_min: pr.night_min,
            night_max: pr.night_max,
            week_max_days: pr.week_max_days.or(nurse.week_max_days),
            weekend_cap: pr.weekend_cap_per_month.or(nurse.weekend_cap),
            weekend_off: pr.weekend_off,
            holiday_off: pr.holiday_off,
            only_night: pr.only_night,
            only_day: pr.only_day,
            extra_holidays: pr.extra_holidays.unwrap_or(0),
            month_quota_days: pr.month_quota_days,
            weekend_day_only: pr.weekend_day_only,
            weekend_only_night: pr.weekend_only_night,
            cannot_lead_night: pr.cannot_lead_night,
            exclude_day_on_weekend: pr.exclude_day_on_weekend,
        };
        if rule.only_day {
            rule.night_ok = false;
            rule.late_ok = false;
        }
        if rule.only_night {
            rule.day_ok = false;
            rule.late_ok = false;
        }
        merged.insert(nurse.id.clone(), rule);
    }
    merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use shared::Team;

    fn nurse(id: &str) -> Nurse {
        Nurse::new(id, format!("Nurse_{id}"), Team::A)
    }

    #[test]
    fn unspecified_capabilities_are_permissive() {
        let merged = merge_rules(&[nurse("1")], &BTreeMap::new());
        let rule = &merged["1"];
        assert!(rule.day_ok && rule.late_ok && rule.night_ok);
        assert_eq!(rule.week_max_days, None);
        assert_eq!(rule.extra_holidays, 0);
    }

    #[test]
    fn person_rule_overrides_base_attribute() {
        let mut n = nurse("1");
        n.week_max_days = Some(5);
        n.weekend_cap = Some(4);
        let mut prs = BTreeMap::new();
        prs.insert(
            "1".to_string(),
            PersonRule {
                week_max_days: Some(3),
                ..PersonRule::default()
            },
        );
        let merged = merge_rules(&[n], &prs);
        let rule = &merged["1"];
        // person rule wins where set, base attribute fills the gap
        assert_eq!(rule.week_max_days, Some(3));
        assert_eq!(rule.weekend_cap, Some(4));
    }

    #[test]
    fn only_day_forces_night_and_late_off() {
        let mut prs = BTreeMap::new();
        prs.insert(
            "1".to_string(),
            PersonRule {
                only_day: true,
                ..PersonRule::default()
            },
        );
        let merged = merge_rules(&[nurse("1")], &prs);
        let rule = &merged["1"];
        assert!(rule.day_ok);
        assert!(!rule.night_ok);
        assert!(!rule.late_ok);
    }

    #[test]
    fn only_night_forces_day_and_late_off() {
        let mut prs = BTreeMap::new();
        prs.insert(
            "1".to_string(),
            PersonRule {
                only_night: true,
                ..PersonRule::default()
            },
        );
        let merged = merge_rules(&[nurse("1")], &prs);
        let rule = &merged["1"];
        assert!(rule.night_ok);
        assert!(!rule.day_ok);
        assert!(!rule.late_ok);
    }

    #[test]
    fn merging_is_idempotent() {
        let mut prs = BTreeMap::new();
        prs.insert(
            "1".to_string(),
            PersonRule {
                only_night: true,
                night_min: Some(2),
                ..PersonRule::default()
            },
        );
        let nurses = vec![nurse("1"), nurse("2")];
        let first = merge_rules(&nurses, &prs);
        let second = merge_rules(&nurses, &prs);
        assert_eq!(first, second);
    }
}

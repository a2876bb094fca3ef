//! Line-oriented parser for the human-authored monthly shift document.
//!
//! Team header lines switch the current team context; nurse lines are
//! `<id>[.<id>...] : <description>` (ASCII or full-width colon), and a set
//! of substring predicates over the description fills in person rules and
//! capability overrides. Lines that match nothing are ignored.

use once_cell::sync::Lazy;
use regex::Regex;
use shared::Team;
use std::collections::BTreeMap;

use crate::domain::entities::{DemandSpec, Nurse, PersonRule, Rules};

static ID_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9.]+)[:：](.+)$").expect("id line regex"));
static NIGHT_RANGE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(\d+)[-～–](\d+)回/月").expect("night range regex"));
static NIGHT_EXACT: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)回/月").expect("night count regex"));

/// Ids granted weekend/holiday DAY leadership by the document conventions.
const LEADER_WEEKEND_IDS: [&str; 10] = ["2", "3", "4", "5", "6", "7", "15", "16", "17", "18"];
/// Ids barred from acting as NIGHT charge nurse.
const CANNOT_LEAD_NIGHT_IDS: [&str; 7] = ["9", "11", "19", "20", "27", "29", "30"];
/// Pairs that must never share a NIGHT.
const NIGHT_FORBIDDEN_PAIRS: [(&str, &str); 1] = [("7", "26")];

/// Parse the document into nurses (in order of first mention) and the
/// month's rule set with the documented demand defaults.
pub fn parse_shift_md(md_text: &str, year: i32, month: u32) -> (Vec<Nurse>, Rules) {
    let mut team: Option<Team> = None;
    let mut nurses: Vec<Nurse> = Vec::new();
    let mut index: BTreeMap<String, usize> = BTreeMap::new();
    let mut person_rules: BTreeMap<String, PersonRule> = BTreeMap::new();

    for raw in md_text.lines() {
        let line = raw.trim();
        if line.is_empty() {
            continue;
        }
        match line {
            "Aチーム" => {
                team = Some(Team::A);
                continue;
            }
            "Bチーム" => {
                team = Some(Team::B);
                continue;
            }
            "救急チーム" => {
                team = Some(Team::Er);
                continue;
            }
            "その他" => {
                team = None;
                continue;
            }
            _ => {}
        }
        let Some(current_team) = team else {
            continue;
        };
        let Some(captures) = ID_LINE.captures(line) else {
            continue;
        };
        let ids: Vec<&str> = captures[1].split('.').filter(|s| !s.trim().is_empty()).collect();
        let desc = captures[2].to_string();

        for id in ids {
            let nurse_idx = *index.entry(id.to_string()).or_insert_with(|| {
                nurses.push(default_nurse(id, current_team));
                nurses.len() - 1
            });
            person_rules.entry(id.to_string()).or_default();
            let nurse = &mut nurses[nurse_idx];
            let pr = person_rules.get_mut(id).expect("person rule just inserted");
            apply_description(nurse, pr, &desc);
        }
    }

    for id in LEADER_WEEKEND_IDS {
        if let Some(&idx) = index.get(id) {
            nurses[idx].leader_ok = true;
        }
    }
    for id in CANNOT_LEAD_NIGHT_IDS {
        person_rules.entry(id.to_string()).or_default().cannot_lead_night = true;
    }

    let mut rules = Rules::new(year, month);
    rules.leader_requirement.weekend_holiday =
        LEADER_WEEKEND_IDS.iter().map(|s| s.to_string()).collect();
    rules.forbidden_pairs.night = NIGHT_FORBIDDEN_PAIRS
        .iter()
        .map(|(a, b)| (a.to_string(), b.to_string()))
        .collect();
    rules.demand_defaults.weekday = DemandSpec::exact(11, 14, 1, 3);
    rules.demand_defaults.saturday_holiday = DemandSpec::exact(8, 8, 0, 3);
    rules.demand_defaults.sunday = DemandSpec::exact(7, 7, 0, 3);
    rules.person_rules = person_rules;

    (nurses, rules)
}

fn default_nurse(id: &str, team: Team) -> Nurse {
    let mut nurse = Nurse::new(id, format!("Nurse_{id}"), team);
    nurse.day_ok = Some(true);
    nurse.late_ok = Some(true);
    nurse.night_ok = Some(true);
    nurse
}

fn apply_description(nurse: &mut Nurse, pr: &mut PersonRule, desc: &str) {
    if desc.contains("管理者") {
        nurse.leader_ok = true;
    }
    if desc.contains("日勤のみ") {
        nurse.night_ok = Some(false);
        nurse.late_ok = Some(false);
        pr.only_day = true;
    }
    if desc.contains("平日日勤") {
        pr.only_day = true;
        pr.weekend_off = true;
        nurse.night_ok = Some(false);
        nurse.late_ok = Some(false);
    }
    if desc.contains("日勤4回/週") {
        pr.only_day = true;
        pr.week_max_days = Some(4);
        nurse.night_ok = Some(false);
        nurse.late_ok = Some(false);
    }
    if desc.contains("夜勤専従") {
        nurse.day_ok = Some(false);
        nurse.late_ok = Some(false);
        pr.only_night = true;
    }
    if desc.contains("夜勤") && desc.contains("回/月") {
        if let Some(range) = NIGHT_RANGE.captures(desc) {
            pr.night_min = range[1].parse().ok();
            pr.night_max = range[2].parse().ok();
        } else if let Some(exact) = NIGHT_EXACT.captures(desc) {
            let count: Option<u32> = exact[1].parse().ok();
            pr.night_min = count;
            pr.night_max = count;
        }
    }
    if desc.contains("新人") && desc.contains("夜勤2回/月") {
        pr.night_min = Some(2);
        pr.night_max = Some(2);
        pr.extra_staff = true;
    }
    if desc.contains("2回/週") {
        pr.week_max_days = Some(2);
    }
    if desc.contains("土日祝日3回/月まで") || desc.contains("土日祝3回/月") {
        pr.weekend_cap_per_month = Some(3);
    }
    if desc.contains("土日祝日NG") || desc.contains("土日祝NG") {
        pr.weekend_off = true;
    }
    if desc.contains("9:00-17:00") {
        pr.fixed_hours = Some("09:00-17:00".to_string());
    }
    if desc.contains("9:00-16:30") {
        pr.fixed_hours = Some("09:00-16:30".to_string());
    }
    if desc.contains("9:00-13:00") {
        pr.fixed_hours = Some("09:00-13:00".to_string());
    }
    if desc.contains("日勤なし") {
        nurse.day_ok = Some(false);
        pr.only_night = true;
    }
    if desc.contains("土日夜勤2回/月") {
        pr.only_night = true;
        pr.weekend_only_night = true;
        pr.night_min.get_or_insert(2);
        pr.night_max.get_or_insert(2);
    }
    if desc.contains("バイト") && desc.contains("土日勤") {
        pr.only_day = true;
        pr.weekend_day_only = true;
        pr.month_quota_days = Some(2);
    }
    if desc.contains("日勤バイト") {
        pr.only_day = true;
        pr.month_quota_days = Some(2);
    }
    if desc.contains("公休10日") {
        pr.extra_holidays = Some(1);
    }
}

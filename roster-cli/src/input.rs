use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::Path;
use std::str::FromStr;

use roster_core::domain::entities::{Assignment, FixedAssignment, Nurse, Rules};
use shared::Team;

/// One row of the nurses CSV as authored. Booleans and counts are free-form
/// text so partially filled sheets load; conversion is tolerant.
#[derive(Debug, Deserialize)]
struct NurseRow {
    id: String,
    #[serde(default)]
    name: String,
    team: String,
    #[serde(default)]
    leader_ok: Option<String>,
    #[serde(default)]
    day_ok: Option<String>,
    #[serde(default)]
    late_ok: Option<String>,
    #[serde(default)]
    night_ok: Option<String>,
    #[serde(default)]
    week_max_days: Option<String>,
    #[serde(default)]
    weekend_cap: Option<String>,
    #[serde(default)]
    notes: Option<String>,
}

/// true/1/yes/y and false/0/no/n, case-insensitive; anything else is
/// "unspecified".
fn parse_bool(value: Option<&str>) -> Option<bool> {
    match value?.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "y" => Some(true),
        "false" | "0" | "no" | "n" => Some(false),
        _ => None,
    }
}

fn parse_count(value: Option<&str>) -> Option<u32> {
    value?.trim().parse().ok()
}

pub fn load_nurses_csv(path: &Path) -> Result<Vec<Nurse>> {
    let mut reader = csv::Reader::from_path(path)
        .with_context(|| format!("open nurses csv {}", path.display()))?;
    let mut nurses = Vec::new();
    for record in reader.deserialize() {
        let row: NurseRow = record.context("read nurses csv row")?;
        let team = Team::from_str(row.team.trim())
            .with_context(|| format!("nurse {}: bad team {:?}", row.id, row.team))?;
        nurses.push(Nurse {
            id: row.id.trim().to_string(),
            name: row.name.trim().to_string(),
            team,
            leader_ok: parse_bool(row.leader_ok.as_deref()).unwrap_or(false),
            day_ok: parse_bool(row.day_ok.as_deref()),
            late_ok: parse_bool(row.late_ok.as_deref()),
            night_ok: parse_bool(row.night_ok.as_deref()),
            week_max_days: parse_count(row.week_max_days.as_deref()),
            weekend_cap: parse_count(row.weekend_cap.as_deref()),
            notes: row.notes,
        });
    }
    Ok(nurses)
}

pub fn load_rules_json(path: &Path) -> Result<Rules> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read rules json {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse rules json {}", path.display()))
}

pub fn load_fixed_json(path: &Path) -> Result<Vec<FixedAssignment>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read fixed assignments {}", path.display()))?;
    serde_json::from_str(&text)
        .with_context(|| format!("parse fixed assignments {}", path.display()))
}

pub fn load_assignments_json(path: &Path) -> Result<Vec<Assignment>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("read assignments {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("parse assignments {}", path.display()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bool_parsing_is_tolerant() {
        assert_eq!(parse_bool(Some("TRUE")), Some(true));
        assert_eq!(parse_bool(Some("y")), Some(true));
        assert_eq!(parse_bool(Some("0")), Some(false));
        assert_eq!(parse_bool(Some("maybe")), None);
        assert_eq!(parse_bool(Some("")), None);
        assert_eq!(parse_bool(None), None);
    }

    #[test]
    fn counts_ignore_garbage() {
        assert_eq!(parse_count(Some("4")), Some(4));
        assert_eq!(parse_count(Some(" 12 ")), Some(12));
        assert_eq!(parse_count(Some("n/a")), None);
        assert_eq!(parse_count(None), None);
    }
}

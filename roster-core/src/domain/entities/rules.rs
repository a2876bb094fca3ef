use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

use super::nurse::PersonRule;

/// Raw per-day staffing demand as authored. Missing fields resolve to the
/// documented defaults at lookup time.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandSpec {
    pub day_min: Option<u32>,
    pub day_max: Option<u32>,
    pub late: Option<u32>,
    pub night: Option<u32>,
}

impl DemandSpec {
    pub fn exact(day_min: u32, day_max: u32, late: u32, night: u32) -> Self {
        Self {
            day_min: Some(day_min),
            day_max: Some(day_max),
            late: Some(late),
            night: Some(night),
        }
    }

    pub fn resolve(self) -> ResolvedDemand {
        ResolvedDemand {
            day_min: self.day_min.unwrap_or(0),
            day_max: self.day_max.unwrap_or(9999),
            late: self.late.unwrap_or(0),
            night: self.night.unwrap_or(0),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDemand {
    pub day_min: u32,
    pub day_max: u32,
    pub late: u32,
    pub night: u32,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DemandDefaults {
    pub weekday: DemandSpec,
    pub saturday_holiday: DemandSpec,
    pub sunday: DemandSpec,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderRequirement {
    /// Nurse ids qualified to lead a weekend/holiday DAY shift.
    pub weekend_holiday: BTreeSet<String>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ForbiddenPairs {
    /// Pairs that must never share a NIGHT.
    pub night: Vec<(String, String)>,
}

/// The monthly rule set. Per-date demand overrides are keyed by ISO date
/// strings, as delivered by the upstream validator.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Rules {
    pub year: i32,
    pub month: u32,
    #[serde(default)]
    pub holidays: BTreeSet<NaiveDate>,
    #[serde(default)]
    pub demand_defaults: DemandDefaults,
    #[serde(default)]
    pub demand: BTreeMap<String, DemandSpec>,
    #[serde(default)]
    pub leader_requirement: LeaderRequirement,
    #[serde(default)]
    pub forbidden_pairs: ForbiddenPairs,
    #[serde(default)]
    pub person_rules: BTreeMap<String, PersonRule>,
}

impl Rules {
    pub fn new(year: i32, month: u32) -> Self {
        Self {
            year,
            month,
            holidays: BTreeSet::new(),
            demand_defaults: DemandDefaults::default(),
            demand: BTreeMap::new(),
            leader_requirement: LeaderRequirement::default(),
            forbidden_pairs: ForbiddenPairs::default(),
            person_rules: BTreeMap::new(),
        }
    }
}

use serde::{Deserialize, Serialize};
use shared::{Shift, Team};

/// A nurse as supplied by the caller. Capability flags are tri-valued:
/// `Some(false)` forbids the shift, `None` and `Some(true)` both permit it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Nurse {
    pub id: String,
    pub name: String,
    pub team: Team,
    #[serde(default)]
    pub leader_ok: bool,
    #[serde(default)]
    pub day_ok: Option<bool>,
    #[serde(default)]
    pub late_ok: Option<bool>,
    #[serde(default)]
    pub night_ok: Option<bool>,
    #[serde(default)]
    pub week_max_days: Option<u32>,
    #[serde(default)]
    pub weekend_cap: Option<u32>,
    #[serde(default)]
    pub notes: Option<String>,
}

impl Nurse {
    pub fn new(id: impl Into<String>, name: impl Into<String>, team: Team) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            team,
            leader_ok: false,
            day_ok: None,
            late_ok: None,
            night_ok: None,
            week_max_days: None,
            weekend_cap: None,
            notes: None,
        }
    }
}

/// Person-scoped rule overrides, keyed by nurse id in `Rules::person_rules`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonRule {
    pub night_min: Option<u32>,
    pub night_max: Option<u32>,
    pub week_max_days: Option<u32>,
    pub weekend_cap_per_month: Option<u32>,
    pub weekend_off: bool,
    pub holiday_off: bool,
    pub only_night: bool,
    pub only_day: bool,
    pub extra_holidays: Option<u32>,
    pub month_quota_days: Option<u32>,
    pub weekend_day_only: bool,
    pub weekend_only_night: bool,
    pub cannot_lead_night: bool,
    pub exclude_day_on_weekend: bool,
    /// Informational fixed working hours; imposes no roster constraint.
    pub fixed_hours: Option<String>,
    /// Informational marker from the text ingester's new-hire rule.
    pub extra_staff: bool,
}

/// Effective per-nurse rule view: person rule overlaid on base attributes,
/// with `only_day` / `only_night` propagated into the capability booleans.
/// Both the model builder and the analyzer consult this, never the raw nurse.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergedRule {
    pub day_ok: bool,
    pub late_ok: bool,
    pub night_ok: bool,
    pub night_min: Option<u32>,
    pub night_max: Option<u32>,
    pub week_max_days: Option<u32>,
    pub weekend_cap: Option<u32>,
    pub weekend_off: bool,
    pub holiday_off: bool,
    pub only_night: bool,
    pub only_day: bool,
    pub extra_holidays: u32,
    pub month_quota_days: Option<u32>,
    pub weekend_day_only: bool,
    pub weekend_only_night: bool,
    pub cannot_lead_night: bool,
    pub exclude_day_on_weekend: bool,
}

impl MergedRule {
    pub fn permits(&self, shift: Shift) -> bool {
        match shift {
            Shift::Day => self.day_ok,
            Shift::Late => self.late_ok,
            Shift::Night => self.night_ok,
            Shift::Off => true,
        }
    }
}

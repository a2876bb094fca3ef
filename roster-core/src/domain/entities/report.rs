use chrono::NaiveDate;
use serde::Serialize;
use shared::{Shift, Team};

use super::assignment::{Assignment, FixedAssignment};
use super::rules::ResolvedDemand;

/// Nurse metadata echoed in the schedule response.
#[derive(Debug, Clone, Serialize)]
pub struct NurseMeta {
    pub id: String,
    pub name: String,
    pub team: Team,
    pub leader_ok: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct ShiftCounts {
    pub day: u32,
    pub late: u32,
    pub night: u32,
    pub off: u32,
}

impl ShiftCounts {
    pub fn bump(&mut self, shift: Shift) {
        match shift {
            Shift::Day => self.day += 1,
            Shift::Late => self.late += 1,
            Shift::Night => self.night += 1,
            Shift::Off => self.off += 1,
        }
    }

    pub fn get(&self, shift: Shift) -> u32 {
        match shift {
            Shift::Day => self.day,
            Shift::Late => self.late,
            Shift::Night => self.night,
            Shift::Off => self.off,
        }
    }

    pub fn work_total(&self) -> u32 {
        self.day + self.late + self.night
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub struct FilledCounts {
    pub day: u32,
    pub late: u32,
    pub night: u32,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerDaySummary {
    pub date: NaiveDate,
    pub weekday: String,
    pub is_weekend: bool,
    pub is_holiday: bool,
    pub requirements: ResolvedDemand,
    pub filled: FilledCounts,
}

/// The rule surface echoed per nurse so the UI can show limits next to tallies.
#[derive(Debug, Clone, Serialize)]
pub struct RuleSummary {
    pub night_min: Option<u32>,
    pub night_max: Option<u32>,
    pub week_max_days: Option<u32>,
    pub weekend_cap: Option<u32>,
    pub month_quota_days: Option<u32>,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerNurseSummary {
    pub nurse_id: String,
    pub name: String,
    pub team: Team,
    pub counts: ShiftCounts,
    pub weekend_work: u32,
    pub total_work_days: u32,
    pub rule: RuleSummary,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ViolationKind {
    Shortage,
    Excess,
}

#[derive(Debug, Clone, Serialize)]
pub struct Violation {
    pub date: NaiveDate,
    pub shift: Shift,
    pub kind: ViolationKind,
    pub difference: i32,
    pub actual: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_min: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required_max: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub required: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub missing_teams: Option<Vec<Team>>,
    pub message: String,
}

/// Cell marker for the UI: which (date, shift) to highlight and why.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ViolationCell {
    pub date: NaiveDate,
    pub shift: Shift,
    pub kind: ViolationKind,
}

#[derive(Debug, Clone, Serialize)]
pub struct CandidateSuggestion {
    pub nurse_id: String,
    pub current_shift: Shift,
    pub suggested_shift: Shift,
    pub locked: bool,
    pub reason: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct Recommendation {
    pub date: NaiveDate,
    pub shift: Shift,
    pub kind: ViolationKind,
    pub difference: i32,
    pub suggestions: Vec<CandidateSuggestion>,
}

#[derive(Debug, Clone, Default, Serialize)]
pub struct ScheduleSummary {
    pub per_day: Vec<PerDaySummary>,
    pub per_nurse: Vec<PerNurseSummary>,
}

/// Everything the analyzer derives from one assignment list.
#[derive(Debug, Clone, Default)]
pub struct ScheduleAnalysis {
    pub per_day: Vec<PerDaySummary>,
    pub per_nurse: Vec<PerNurseSummary>,
    pub warnings: Vec<String>,
    pub violations: Vec<Violation>,
    pub violation_cells: Vec<ViolationCell>,
    pub recommendations: Vec<Recommendation>,
}

impl ScheduleAnalysis {
    pub fn summary(&self) -> ScheduleSummary {
        ScheduleSummary {
            per_day: self.per_day.clone(),
            per_nurse: self.per_nurse.clone(),
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct SolutionPlan {
    pub plan_id: String,
    pub label: String,
    pub assignments: Vec<Assignment>,
    pub summary: ScheduleSummary,
    pub warnings: Vec<String>,
    pub violations: Vec<Violation>,
    pub violation_cells: Vec<ViolationCell>,
    pub recommendations: Vec<Recommendation>,
}

#[derive(Debug, Clone, Serialize)]
pub struct ScheduleResponse {
    pub year: i32,
    pub month: u32,
    pub days: Vec<NaiveDate>,
    pub nurses: Vec<NurseMeta>,
    pub assignments: Vec<Assignment>,
    pub summary: ScheduleSummary,
    pub warnings: Vec<String>,
    pub violations: Vec<Violation>,
    pub violation_cells: Vec<ViolationCell>,
    pub recommendations: Vec<Recommendation>,
    pub solutions: Vec<SolutionPlan>,
    pub alternatives_returned: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub locked_assignments: Option<Vec<FixedAssignment>>,
}

#[derive(Debug, Clone, Serialize)]
pub struct InfeasibleReport {
    pub message: String,
    pub suggestions: Vec<RelaxationSuggestion>,
    /// Re-check of the caller's current roster, when one was supplied.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analysis: Option<RecheckReport>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status")]
pub enum ScheduleOutcome {
    #[serde(rename = "OK")]
    Ok(ScheduleResponse),
    #[serde(rename = "INFEASIBLE")]
    Infeasible(InfeasibleReport),
}

impl ScheduleOutcome {
    pub fn is_ok(&self) -> bool {
        matches!(self, ScheduleOutcome::Ok(_))
    }
}

/// Structural relaxation proposals emitted when the model is infeasible.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum RelaxationSuggestion {
    RelaxDayMin {
        amount: u32,
        dates: Vec<NaiveDate>,
        reason: String,
    },
    AllowWeekendDayWithoutLeader {
        scope: String,
        reason: String,
    },
    IncreaseOffQuotaForNoncritical {
        reason: String,
    },
    ExceptionForbiddenPairOnSpecificDay {
        pair: (String, String),
        dates: Vec<NaiveDate>,
        reason: String,
    },
}

#[derive(Debug, Clone, Serialize)]
pub struct RecheckReport {
    pub ok: bool,
    pub violations: Vec<String>,
    pub summary: ScheduleSummary,
    pub warnings: Vec<String>,
    pub violations_detail: Vec<Violation>,
    pub violation_cells: Vec<ViolationCell>,
    pub recommendations: Vec<Recommendation>,
}

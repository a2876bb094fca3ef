pub mod assignment;
pub mod nurse;
pub mod report;
pub mod rules;

pub use assignment::{Assignment, FixedAssignment, LockedMap};
pub use nurse::{MergedRule, Nurse, PersonRule};
pub use report::{
    CandidateSuggestion, FilledCounts, InfeasibleReport, NurseMeta, PerDaySummary, PerNurseSummary,
    Recommendation, RecheckReport, RelaxationSuggestion, RuleSummary, ScheduleAnalysis,
    ScheduleOutcome, ScheduleResponse, ScheduleSummary, ShiftCounts, SolutionPlan, Violation,
    ViolationCell, ViolationKind,
};
pub use rules::{DemandDefaults, DemandSpec, ForbiddenPairs, LeaderRequirement, ResolvedDemand, Rules};

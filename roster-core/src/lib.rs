pub mod domain;
pub mod export;
pub mod ingest;
pub mod solver;

// Re-export the operations collaborators actually call.
pub use domain::services::planner::{build_schedule, build_schedule_with, PlannerOptions};
pub use domain::services::recheck::recheck_assignments;
pub use domain::services::relax::suggest_relaxations;
pub use domain::services::ScheduleContext;
pub use export::{parse_csv, to_csv};
pub use ingest::parse_shift_md;

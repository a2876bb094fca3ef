use shared::ALL_SHIFTS;

use super::model_builder::VarTable;
use super::ScheduleContext;
use crate::domain::entities::Assignment;
use crate::solver::Valuation;

/// Turn a solver valuation into the canonical assignment list, nurse-major.
/// Exactly one shift is true per (nurse, date); the first hit wins.
pub fn extract_schedule(
    ctx: &ScheduleContext,
    vars: &VarTable,
    valuation: &Valuation<'_>,
) -> Vec<Assignment> {
    let mut schedule = Vec::with_capacity(ctx.nurses.len() * ctx.days.len());
    for (n, nurse) in ctx.nurses.iter().enumerate() {
        for (d, date) in ctx.days.iter().enumerate() {
            for shift in ALL_SHIFTS {
                if valuation.is_true(vars.var(n, d, shift)) {
                    schedule.push(Assignment::new(nurse.id.clone(), *date, shift));
                    break;
                }
            }
        }
    }
    schedule
}

use std::time::Duration;

use super::analyzer::analyze_schedule;
use super::extract::extract_schedule;
use super::model_builder::{build_roster_model, VarTable};
use super::recheck::recheck_assignments;
use super::relax::suggest_relaxations;
use super::ScheduleContext;
use crate::domain::entities::{
    Assignment, FixedAssignment, InfeasibleReport, Nurse, NurseMeta, Rules, ScheduleOutcome,
    ScheduleResponse, SolutionPlan,
};
use crate::solver::{CpSolver, SolutionSink, Valuation};

#[derive(Debug, Clone, Copy)]
pub struct PlannerOptions {
    /// Wall-clock budget for one solver invocation.
    pub time_limit: Duration,
}

impl Default for PlannerOptions {
    fn default() -> Self {
        Self {
            time_limit: Duration::from_secs(30),
        }
    }
}

/// Compile, solve, and analyze a month with the default 30-second budget.
/// `current_assignments` is only consulted on infeasibility: the caller's
/// roster is re-checked and the diagnosis rides along with the suggestions.
pub fn build_schedule(
    nurses: &[Nurse],
    rules: &Rules,
    fixed_assignments: Option<&[FixedAssignment]>,
    current_assignments: Option<&[Assignment]>,
    alternatives: usize,
) -> ScheduleOutcome {
    build_schedule_with(
        nurses,
        rules,
        fixed_assignments,
        current_assignments,
        alternatives,
        PlannerOptions::default(),
    )
}

pub fn build_schedule_with(
    nurses: &[Nurse],
    rules: &Rules,
    fixed_assignments: Option<&[FixedAssignment]>,
    current_assignments: Option<&[Assignment]>,
    alternatives: usize,
    options: PlannerOptions,
) -> ScheduleOutcome {
    let ctx = ScheduleContext::new(nurses.to_vec(), rules.clone());
    let fixed = fixed_assignments.unwrap_or(&[]);
    let built = build_roster_model(&ctx, fixed);

    let limit = alternatives.max(1);
    let mut collector = ScheduleCollector {
        ctx: &ctx,
        vars: &built.vars,
        limit,
        schedules: Vec::new(),
    };
    let status = CpSolver::new(options.time_limit).solve(&built.model, &mut collector);

    if collector.schedules.is_empty() {
        tracing::info!(?status, "no feasible roster");
        return ScheduleOutcome::Infeasible(InfeasibleReport {
            message: "No feasible solution found".to_string(),
            suggestions: suggest_relaxations(nurses, rules),
            analysis: current_assignments
                .map(|assignments| recheck_assignments(assignments, nurses, rules)),
        });
    }
    tracing::info!(solutions = collector.schedules.len(), "roster solved");

    let solutions: Vec<SolutionPlan> = collector
        .schedules
        .iter()
        .enumerate()
        .map(|(index, schedule)| {
            let analysis = analyze_schedule(&ctx, schedule, &built.locked);
            SolutionPlan {
                plan_id: format!("plan-{}", index + 1),
                label: format!("案{}", index + 1),
                assignments: schedule.clone(),
                summary: analysis.summary(),
                warnings: analysis.warnings,
                violations: analysis.violations,
                violation_cells: analysis.violation_cells,
                recommendations: analysis.recommendations,
            }
        })
        .collect();

    let nurses_meta: Vec<NurseMeta> = ctx
        .nurses
        .iter()
        .map(|nurse| NurseMeta {
            id: nurse.id.clone(),
            name: nurse.name.clone(),
            team: nurse.team,
            leader_ok: nurse.leader_ok,
        })
        .collect();

    let primary = solutions[0].clone();
    let alternatives_returned = solutions.len();
    ScheduleOutcome::Ok(ScheduleResponse {
        year: ctx.rules.year,
        month: ctx.rules.month,
        days: ctx.days.clone(),
        nurses: nurses_meta,
        assignments: primary.assignments,
        summary: primary.summary,
        warnings: primary.warnings,
        violations: primary.violations,
        violation_cells: primary.violation_cells,
        recommendations: primary.recommendations,
        solutions,
        alternatives_returned,
        locked_assignments: if fixed.is_empty() { None } else { Some(fixed.to_vec()) },
    })
}

struct ScheduleCollector<'a> {
    ctx: &'a ScheduleContext,
    vars: &'a VarTable,
    limit: usize,
    schedules: Vec<Vec<Assignment>>,
}

impl SolutionSink for ScheduleCollector<'_> {
    fn on_solution(&mut self, valuation: &Valuation<'_>) -> bool {
        self.schedules
            .push(extract_schedule(self.ctx, self.vars, valuation));
        self.schedules.len() < self.limit
    }
}

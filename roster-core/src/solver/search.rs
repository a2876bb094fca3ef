use std::time::{Duration, Instant};

use super::model::{CpModel, VarId};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SolveStatus {
    /// At least one solution was delivered to the sink.
    Feasible,
    /// The search space was exhausted without a solution.
    Infeasible,
    /// The deadline expired before any solution was found.
    Timeout,
}

/// A complete variable valuation, borrowed from the search state while the
/// sink inspects it.
pub struct Valuation<'a> {
    values: &'a [Option<bool>],
}

impl Valuation<'_> {
    pub fn is_true(&self, var: VarId) -> bool {
        self.values[var.index()] == Some(true)
    }
}

/// Receives every complete solution. Return `false` to stop the search;
/// enumeration-with-cap is a sink that counts.
pub trait SolutionSink {
    fn on_solution(&mut self, valuation: &Valuation<'_>) -> bool;
}

pub struct CpSolver {
    time_limit: Duration,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Flow {
    Exhausted,
    Stopped,
    TimedOut,
}

#[derive(Clone, Copy)]
enum Decision {
    /// Index into the model's exactly-one groups.
    Cell(usize),
    /// A variable outside every group, branched on both values.
    Free(VarId),
}

impl CpSolver {
    pub fn new(time_limit: Duration) -> Self {
        Self { time_limit }
    }

    /// Depth-first search with cardinality propagation. Distinctness of the
    /// delivered solutions is structural: the search never revisits a
    /// complete valuation.
    pub fn solve(&self, model: &CpModel, sink: &mut dyn SolutionSink) -> SolveStatus {
        if model.has_pin_conflict() {
            return SolveStatus::Infeasible;
        }

        let mut search = Search::new(model, Instant::now() + self.time_limit);
        if !search.assign_pins() || !search.propagate_roots() {
            return SolveStatus::Infeasible;
        }

        let flow = search.dfs(0, sink);
        tracing::debug!(
            nodes = search.nodes,
            solutions = search.solutions,
            "search finished"
        );
        if search.solutions > 0 {
            SolveStatus::Feasible
        } else if flow == Flow::TimedOut {
            SolveStatus::Timeout
        } else {
            SolveStatus::Infeasible
        }
    }
}

struct Search<'m> {
    model: &'m CpModel,
    values: Vec<Option<bool>>,
    true_counts: Vec<i32>,
    unassigned: Vec<i32>,
    /// var index -> indices of constraints mentioning it
    watchers: Vec<Vec<u32>>,
    trail: Vec<VarId>,
    decisions: Vec<Decision>,
    deadline: Instant,
    nodes: u64,
    solutions: u64,
}

impl<'m> Search<'m> {
    fn new(model: &'m CpModel, deadline: Instant) -> Self {
        let num_vars = model.num_vars();
        let mut watchers = vec![Vec::new(); num_vars];
        let mut unassigned = Vec::with_capacity(model.constraints.len());
        for (ci, constraint) in model.constraints.iter().enumerate() {
            for var in &constraint.terms {
                watchers[var.index()].push(ci as u32);
            }
            unassigned.push(constraint.terms.len() as i32);
        }

        let mut grouped = vec![false; num_vars];
        let mut decisions: Vec<Decision> = (0..model.groups.len()).map(Decision::Cell).collect();
        for group in &model.groups {
            for var in group {
                grouped[var.index()] = true;
            }
        }
        decisions.extend(
            (0..num_vars)
                .filter(|&i| !grouped[i])
                .map(|i| Decision::Free(VarId(i as u32))),
        );

        Self {
            model,
            values: vec![None; num_vars],
            true_counts: vec![0; model.constraints.len()],
            unassigned,
            watchers,
            trail: Vec::with_capacity(num_vars),
            decisions,
            deadline,
            nodes: 0,
            solutions: 0,
        }
    }

    fn assign_pins(&mut self) -> bool {
        let pins: Vec<(VarId, bool)> = self
            .model
            .pinned
            .iter()
            .enumerate()
            .filter_map(|(i, pin)| pin.map(|value| (VarId(i as u32), value)))
            .collect();
        pins.into_iter().all(|(var, value)| self.assign(var, value))
    }

    /// Bound check and forced completions for every constraint before the
    /// first decision; catches empty-term constraints like `sum([]) >= 1`.
    fn propagate_roots(&mut self) -> bool {
        for ci in 0..self.model.constraints.len() {
            let (min, max) = {
                let c = &self.model.constraints[ci];
                (c.min, c.max)
            };
            let t = self.true_counts[ci];
            let u = self.unassigned[ci];
            if t > max || t + u < min {
                return false;
            }
            if u > 0 && (t == max || t + u == min) {
                let force = t + u == min;
                let pending: Vec<VarId> = self.model.constraints[ci]
                    .terms
                    .iter()
                    .copied()
                    .filter(|v| self.values[v.index()].is_none())
                    .collect();
                for var in pending {
                    if !self.assign(var, force) {
                        return false;
                    }
                }
            }
        }
        true
    }

    /// Assign a value and run propagation to a fixed point. Returns false on
    /// conflict; the caller unwinds via the trail.
    fn assign(&mut self, var: VarId, value: bool) -> bool {
        let mut queue = vec![(var, value)];
        while let Some((v, b)) = queue.pop() {
            let vidx = v.index();
            if let Some(current) = self.values[vidx] {
                if current != b {
                    return false;
                }
                continue;
            }
            self.values[vidx] = Some(b);
            self.trail.push(v);

            // update every counter first; undo_to reverses all watcher
            // updates of a trail entry, so a conflict return must not leave
            // them half-applied
            for k in 0..self.watchers[vidx].len() {
                let ci = self.watchers[vidx][k] as usize;
                self.unassigned[ci] -= 1;
                if b {
                    self.true_counts[ci] += 1;
                }
            }

            for k in 0..self.watchers[vidx].len() {
                let ci = self.watchers[vidx][k] as usize;
                let (min, max) = {
                    let c = &self.model.constraints[ci];
                    (c.min, c.max)
                };
                let t = self.true_counts[ci];
                let u = self.unassigned[ci];
                if t > max || t + u < min {
                    return false;
                }
                if u > 0 && (t == max || t + u == min) {
                    let force = t + u == min;
                    for w in &self.model.constraints[ci].terms {
                        if self.values[w.index()].is_none() {
                            queue.push((*w, force));
                        }
                    }
                }
            }
        }
        true
    }

    fn undo_to(&mut self, mark: usize) {
        while self.trail.len() > mark {
            let var = self.trail.pop().expect("trail underflow");
            let vidx = var.index();
            let was_true = self.values[vidx] == Some(true);
            self.values[vidx] = None;
            for k in 0..self.watchers[vidx].len() {
                let ci = self.watchers[vidx][k] as usize;
                self.unassigned[ci] += 1;
                if was_true {
                    self.true_counts[ci] -= 1;
                }
            }
        }
    }

    fn dfs(&mut self, decision_idx: usize, sink: &mut dyn SolutionSink) -> Flow {
        self.nodes += 1;
        if self.nodes % 1024 == 0 && Instant::now() >= self.deadline {
            return Flow::TimedOut;
        }

        if decision_idx == self.decisions.len() {
            debug_assert!(self.values.iter().all(Option::is_some));
            self.solutions += 1;
            let keep_going = sink.on_solution(&Valuation { values: &self.values });
            return if keep_going { Flow::Exhausted } else { Flow::Stopped };
        }

        let model = self.model;
        let decision = self.decisions[decision_idx];
        match decision {
            Decision::Cell(group_idx) => {
                let group = &model.groups[group_idx];
                if group.iter().any(|v| self.values[v.index()] == Some(true)) {
                    return self.dfs(decision_idx + 1, sink);
                }
                let choices: Vec<VarId> = group
                    .iter()
                    .copied()
                    .filter(|v| self.values[v.index()].is_none())
                    .collect();
                for var in choices {
                    let mark = self.trail.len();
                    if self.assign(var, true) {
                        let flow = self.dfs(decision_idx + 1, sink);
                        if flow != Flow::Exhausted {
                            self.undo_to(mark);
                            return flow;
                        }
                    }
                    self.undo_to(mark);
                }
                Flow::Exhausted
            }
            Decision::Free(var) => {
                if self.values[var.index()].is_some() {
                    return self.dfs(decision_idx + 1, sink);
                }
                for value in [true, false] {
                    let mark = self.trail.len();
                    if self.assign(var, value) {
                        let flow = self.dfs(decision_idx + 1, sink);
                        if flow != Flow::Exhausted {
                            self.undo_to(mark);
                            return flow;
                        }
                    }
                    self.undo_to(mark);
                }
                Flow::Exhausted
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Counter {
        seen: usize,
        limit: usize,
    }

    impl SolutionSink for Counter {
        fn on_solution(&mut self, _valuation: &Valuation<'_>) -> bool {
            self.seen += 1;
            self.seen < self.limit
        }
    }

    fn solver() -> CpSolver {
        CpSolver::new(Duration::from_secs(5))
    }

    #[test]
    fn exactly_one_enumerates_each_choice() {
        let mut model = CpModel::new();
        let vars: Vec<VarId> = (0..3).map(|i| model.new_bool_var(format!("v{i}"))).collect();
        model.add_exactly_one(vars);

        let mut sink = Counter { seen: 0, limit: usize::MAX };
        let status = solver().solve(&model, &mut sink);
        assert_eq!(status, SolveStatus::Feasible);
        assert_eq!(sink.seen, 3);
    }

    #[test]
    fn sink_can_cap_enumeration() {
        let mut model = CpModel::new();
        let vars: Vec<VarId> = (0..4).map(|i| model.new_bool_var(format!("v{i}"))).collect();
        model.add_exactly_one(vars);

        let mut sink = Counter { seen: 0, limit: 2 };
        let status = solver().solve(&model, &mut sink);
        assert_eq!(status, SolveStatus::Feasible);
        assert_eq!(sink.seen, 2);
    }

    #[test]
    fn contradictory_pins_are_infeasible() {
        let mut model = CpModel::new();
        let v = model.new_bool_var("v");
        model.fix(v, true);
        model.fix(v, false);

        let mut sink = Counter { seen: 0, limit: usize::MAX };
        assert_eq!(solver().solve(&model, &mut sink), SolveStatus::Infeasible);
        assert_eq!(sink.seen, 0);
    }

    #[test]
    fn empty_at_least_one_is_infeasible() {
        let mut model = CpModel::new();
        let _ = model.new_bool_var("unused");
        model.add_sum_ge(Vec::new(), 1);

        let mut sink = Counter { seen: 0, limit: usize::MAX };
        assert_eq!(solver().solve(&model, &mut sink), SolveStatus::Infeasible);
    }

    #[test]
    fn cardinality_bounds_prune_the_space() {
        // two cells of two vars each, with a cross constraint allowing at
        // most one "first" pick: 4 raw combinations, 3 survive
        let mut model = CpModel::new();
        let a0 = model.new_bool_var("a0");
        let a1 = model.new_bool_var("a1");
        let b0 = model.new_bool_var("b0");
        let b1 = model.new_bool_var("b1");
        model.add_exactly_one(vec![a0, a1]);
        model.add_exactly_one(vec![b0, b1]);
        model.add_sum_le(vec![a0, b0], 1);

        let mut sink = Counter { seen: 0, limit: usize::MAX };
        let status = solver().solve(&model, &mut sink);
        assert_eq!(status, SolveStatus::Feasible);
        assert_eq!(sink.seen, 3);
    }

    #[test]
    fn forced_completion_propagates() {
        // sum == 2 over two vars forces both true
        let mut model = CpModel::new();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        model.add_sum_eq(vec![a, b], 2);

        struct Capture {
            all_true: bool,
        }
        impl SolutionSink for Capture {
            fn on_solution(&mut self, valuation: &Valuation<'_>) -> bool {
                self.all_true = valuation.is_true(VarId(0)) && valuation.is_true(VarId(1));
                false
            }
        }
        let mut sink = Capture { all_true: false };
        assert_eq!(solver().solve(&model, &mut sink), SolveStatus::Feasible);
        assert!(sink.all_true);
    }

    #[test]
    fn free_variables_branch_on_both_values() {
        // no exactly-one group, so both vars are free decisions; sum == 1
        // over two unassigned vars forces nothing at the root, meaning the
        // search must try true, backtrack, and try false for the first var
        let mut model = CpModel::new();
        let a = model.new_bool_var("a");
        let b = model.new_bool_var("b");
        model.add_sum_eq(vec![a, b], 1);

        struct Capture {
            seen: Vec<(bool, bool)>,
        }
        impl SolutionSink for Capture {
            fn on_solution(&mut self, valuation: &Valuation<'_>) -> bool {
                self.seen
                    .push((valuation.is_true(VarId(0)), valuation.is_true(VarId(1))));
                true
            }
        }
        let mut sink = Capture { seen: Vec::new() };
        assert_eq!(solver().solve(&model, &mut sink), SolveStatus::Feasible);
        // true is tried first; each choice propagates the other var
        assert_eq!(sink.seen, vec![(true, false), (false, true)]);
    }

    #[test]
    fn expired_deadline_reports_timeout() {
        let mut model = CpModel::new();
        // enough vars that the periodic deadline check fires before any
        // solution can be completed is not guaranteed; use a zero budget and
        // a space large enough to cross the check interval
        let vars: Vec<VarId> = (0..2048).map(|i| model.new_bool_var(format!("v{i}"))).collect();
        for pair in vars.chunks(2) {
            model.add_exactly_one(pair.to_vec());
        }
        model.add_sum_le(vars.iter().copied().step_by(2).collect(), 0);
        // the at-most-zero constraint forces every even var false, making the
        // search do real propagation work before its first solution
        let solver = CpSolver::new(Duration::from_secs(0));
        let mut sink = Counter { seen: 0, limit: usize::MAX };
        let status = solver.solve(&model, &mut sink);
        assert!(matches!(status, SolveStatus::Timeout | SolveStatus::Feasible));
    }
}

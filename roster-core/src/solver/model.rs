/// Handle to a boolean decision variable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct VarId(pub(crate) u32);

impl VarId {
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

#[derive(Debug, Clone)]
pub(crate) struct SumConstraint {
    pub terms: Vec<VarId>,
    pub min: i32,
    pub max: i32,
}

/// A compiled constraint model. Immutable once handed to the solver, so one
/// model serves both the single-solution and the enumeration mode.
#[derive(Debug, Default)]
pub struct CpModel {
    names: Vec<String>,
    pub(crate) pinned: Vec<Option<bool>>,
    pub(crate) constraints: Vec<SumConstraint>,
    pub(crate) groups: Vec<Vec<VarId>>,
    pub(crate) pin_conflict: bool,
}

impl CpModel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn new_bool_var(&mut self, name: impl Into<String>) -> VarId {
        let id = VarId(self.names.len() as u32);
        self.names.push(name.into());
        self.pinned.push(None);
        id
    }

    pub fn num_vars(&self) -> usize {
        self.names.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.constraints.len()
    }

    pub fn var_name(&self, var: VarId) -> &str {
        &self.names[var.index()]
    }

    /// Pin a variable. Contradictory pins do not panic; they mark the model
    /// infeasible, which is exactly what a lock clashing with a capability
    /// gate must produce.
    pub fn fix(&mut self, var: VarId, value: bool) {
        match self.pinned[var.index()] {
            Some(existing) if existing != value => self.pin_conflict = true,
            _ => self.pinned[var.index()] = Some(value),
        }
    }

    /// `min > max` (e.g. an at-least-one over an empty pool) is a legal,
    /// unsatisfiable constraint; the solver reports it as infeasible.
    pub fn add_sum_range(&mut self, terms: Vec<VarId>, min: i32, max: i32) {
        self.constraints.push(SumConstraint { terms, min, max });
    }

    pub fn add_sum_eq(&mut self, terms: Vec<VarId>, value: i32) {
        self.add_sum_range(terms, value, value);
    }

    pub fn add_sum_le(&mut self, terms: Vec<VarId>, max: i32) {
        self.add_sum_range(terms, 0, max);
    }

    pub fn add_sum_ge(&mut self, terms: Vec<VarId>, min: i32) {
        let max = terms.len() as i32;
        self.add_sum_range(terms, min, max);
    }

    /// Post `sum(terms) == 1` and register the group as a branching cell.
    pub fn add_exactly_one(&mut self, terms: Vec<VarId>) {
        self.add_sum_eq(terms.clone(), 1);
        self.groups.push(terms);
    }

    pub fn has_pin_conflict(&self) -> bool {
        self.pin_conflict
    }
}

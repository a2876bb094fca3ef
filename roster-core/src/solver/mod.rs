//! A self-contained boolean cardinality solver.
//!
//! The roster model only ever needs constraints of the shape
//! `min <= sum(vars) <= max` over boolean variables, plus pinned values.
//! The search branches over registered exactly-one groups (roster cells)
//! with incremental propagation, and streams every complete valuation to a
//! [`SolutionSink`] until the sink stops it or the deadline expires.

pub mod model;
pub mod search;

pub use model::{CpModel, VarId};
pub use search::{CpSolver, SolutionSink, SolveStatus, Valuation};

pub mod demand;
pub mod merge;

pub use demand::{default_demand_for_day, demand_for_day};
pub use merge::merge_rules;

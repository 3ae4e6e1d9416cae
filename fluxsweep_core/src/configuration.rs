use std::sync::{LazyLock, RwLock};

pub static CONFIGURATION: LazyLock<RwLock<Configuration>> =
    LazyLock::new(|| RwLock::new(Configuration::default()));

pub struct Configuration {
    /// Lower bound given to reactions built without an explicit one
    pub lower_bound: f64,
    /// Upper bound given to reactions built without an explicit one
    pub upper_bound: f64,
    /// Feasibility tolerance handed to the solver
    pub tolerance: f64,
    /// Wall-clock limit for a single LP solve, in seconds
    pub time_limit: f64,
    pub solver: Solver,
    /// Number of worker threads used by sweeps, 1 runs sequentially
    pub processes: u32,
    /// Compartment tag identifying extracellular metabolites
    pub external_compartment: String,
}

impl Default for Configuration {
    fn default() -> Self {
        Configuration {
            lower_bound: -1000.,
            upper_bound: 1000.,
            tolerance: 1e-07,
            time_limit: 60.,
            solver: Solver::Clarabel,
            processes: 1,
            external_compartment: "e".to_string(),
        }
    }
}

/// Enum used to specify the default solver to use
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Solver {
    /// Use the Clarabel interior point solver
    Clarabel,
    /// Use the microlp simplex solver, requires the minilp feature to be enabled
    Microlp,
}

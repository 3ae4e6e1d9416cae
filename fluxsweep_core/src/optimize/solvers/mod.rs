//! Linear program backends used to solve flux balance problems
pub mod clarabel;
#[cfg(feature = "minilp")]
pub mod microlp;

use cfg_if::cfg_if;
use thiserror::Error;

use crate::configuration::{Solver, CONFIGURATION};
use crate::metabolic_model::model::{Model, ModelError};
use crate::optimize::problem::Problem;
use crate::optimize::ProblemSolution;

/// A backend able to solve a flux balance [`Problem`]
///
/// Implementations report infeasible and unbounded problems through the status of the
/// returned [`ProblemSolution`], an `Err` is reserved for the backend itself failing.
pub trait LpSolver: Send + Sync {
    /// Short name of the backend, used in log messages
    fn name(&self) -> &'static str;

    /// Solve an already constructed problem
    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError>;

    /// Lower a model into a [`Problem`] and solve it
    fn optimize(&self, model: &Model) -> Result<ProblemSolution, SolverError> {
        let problem = Problem::from_model(model)?;
        self.solve(&problem)
    }
}

/// Create the solver selected in the global configuration
pub fn default_solver() -> Result<Box<dyn LpSolver>, SolverError> {
    let solver = CONFIGURATION.read().unwrap().solver;
    match solver {
        Solver::Clarabel => Ok(Box::new(self::clarabel::ClarabelSolver::from_configuration())),
        Solver::Microlp => microlp_solver(),
    }
}

cfg_if! {
    if #[cfg(feature = "minilp")] {
        fn microlp_solver() -> Result<Box<dyn LpSolver>, SolverError> {
            Ok(Box::new(self::microlp::MicrolpSolver))
        }
    } else {
        fn microlp_solver() -> Result<Box<dyn LpSolver>, SolverError> {
            Err(SolverError::Unavailable("microlp, enable the minilp feature"))
        }
    }
}

#[derive(Error, Debug)]
pub enum SolverError {
    #[error("Unable to build the problem from the model: {0}")]
    Model(#[from] ModelError),
    #[error("Invalid solver settings: {0}")]
    Settings(String),
    #[error("Solver {0} is not available")]
    Unavailable(&'static str),
    #[error("Solver failed: {0}")]
    Backend(String),
}

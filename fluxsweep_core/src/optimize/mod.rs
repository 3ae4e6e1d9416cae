//! Module for constructing and solving optimization problems

pub mod problem;
pub mod solvers;

use std::fmt::{Display, Formatter};

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Struct representing the solution to an optimization problem
#[derive(Clone, Debug, PartialEq)]
pub struct ProblemSolution {
    /// The status of the optimization problem, representing if the optimization was
    /// completed successfully
    pub status: OptimizationStatus,
    /// Optimized value of the objective
    ///
    /// Some(f64) if the optimization was completed successfully, None otherwise
    pub objective_value: Option<f64>,
    /// Values of the reaction fluxes at the optimum,
    ///
    /// Some(IndexMap), keyed by reaction id, if the problem could be solved, None otherwise
    pub fluxes: Option<IndexMap<String, f64>>,
}

impl ProblemSolution {
    /// Solution carrying only a non-optimal status
    pub fn without_optimum(status: OptimizationStatus) -> Self {
        ProblemSolution {
            status,
            objective_value: None,
            fluxes: None,
        }
    }

    /// The objective value when the problem was solved to optimality, 0 otherwise
    pub fn objective_or_zero(&self) -> f64 {
        match (self.status, self.objective_value) {
            (OptimizationStatus::Optimal, Some(value)) => value,
            _ => 0.,
        }
    }
}

/// Status of an optimization problem
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OptimizationStatus {
    /// Problem has been optimized
    Optimal,
    /// Problem can't be solved because it is infeasible (conflicting constraints)
    Infeasible,
    /// Problem can't be optimized because objective value is not bounded
    Unbounded,
    /// The solver failed, hit its iteration or time limit, or ran into numerical trouble
    Error,
}

impl Display for OptimizationStatus {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            OptimizationStatus::Optimal => write!(f, "optimal"),
            OptimizationStatus::Infeasible => write!(f, "infeasible"),
            OptimizationStatus::Unbounded => write!(f, "unbounded"),
            OptimizationStatus::Error => write!(f, "error"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn objective_only_defined_when_optimal() {
        let optimal = ProblemSolution {
            status: OptimizationStatus::Optimal,
            objective_value: Some(0.87),
            fluxes: None,
        };
        assert_eq!(optimal.objective_or_zero(), 0.87);
        let infeasible = ProblemSolution {
            status: OptimizationStatus::Infeasible,
            objective_value: Some(12.),
            fluxes: None,
        };
        assert_eq!(infeasible.objective_or_zero(), 0.);
        assert_eq!(
            ProblemSolution::without_optimum(OptimizationStatus::Error).objective_or_zero(),
            0.
        );
    }

    #[test]
    fn display() {
        assert_eq!(format!("{}", OptimizationStatus::Unbounded), "unbounded");
    }
}

//! Implements a solver interface for the microlp simplex solver
use ::microlp::{ComparisonOp, LinearExpr, OptimizationDirection, Problem as LpProblem};

use crate::optimize::problem::{ObjectiveSense, Problem};
use crate::optimize::solvers::{LpSolver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

#[derive(Clone, Copy, Debug, Default)]
pub struct MicrolpSolver;

impl LpSolver for MicrolpSolver {
    fn name(&self) -> &'static str {
        "microlp"
    }

    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        let direction = match problem.sense() {
            ObjectiveSense::Maximize => OptimizationDirection::Maximize,
            ObjectiveSense::Minimize => OptimizationDirection::Minimize,
        };
        let mut lp = LpProblem::new(direction);
        let variables: Vec<_> = problem
            .objective()
            .iter()
            .zip(problem.lower_bounds().iter().zip(problem.upper_bounds()))
            .map(|(coef, (lb, ub))| lp.add_var(*coef, (*lb, *ub)))
            .collect();

        let mut balances: Vec<LinearExpr> = (0..problem.num_constraints())
            .map(|_| LinearExpr::empty())
            .collect();
        for (row, col, coef) in problem.stoichiometry().triplet_iter() {
            balances[row].add(variables[col], *coef);
        }
        for balance in balances {
            lp.add_constraint(balance, ComparisonOp::Eq, 0.);
        }

        match lp.solve() {
            Ok(solution) => {
                let values: Vec<f64> = variables.iter().map(|v| solution[*v]).collect();
                Ok(ProblemSolution {
                    status: OptimizationStatus::Optimal,
                    objective_value: Some(solution.objective()),
                    fluxes: Some(problem.fluxes(&values)),
                })
            }
            Err(::microlp::Error::Infeasible) => Ok(ProblemSolution::without_optimum(
                OptimizationStatus::Infeasible,
            )),
            Err(::microlp::Error::Unbounded) => Ok(ProblemSolution::without_optimum(
                OptimizationStatus::Unbounded,
            )),
            #[allow(unreachable_patterns)]
            Err(err) => Err(SolverError::Backend(err.to_string())),
        }
    }
}

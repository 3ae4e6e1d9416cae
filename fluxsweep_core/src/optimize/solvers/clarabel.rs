//! Implements a solver interface for Clarabel
//!
//! Clarabel minimizes `q'x` subject to `Ax + s = b`, `s` in a cone. Mass balance rows go
//! into the zero cone, finite variable bounds become rows of the nonnegative cone.

use ::clarabel::algebra::CscMatrix;
use ::clarabel::solver::{
    DefaultSettingsBuilder, DefaultSolver, IPSolver, SolverStatus, SupportedConeT,
};

use crate::configuration::CONFIGURATION;
use crate::optimize::problem::{ObjectiveSense, Problem};
use crate::optimize::solvers::{LpSolver, SolverError};
use crate::optimize::{OptimizationStatus, ProblemSolution};

#[derive(Clone, Debug)]
pub struct ClarabelSolver {
    /// Feasibility tolerance
    pub tolerance: f64,
    /// Time limit for a single solve, in seconds
    pub time_limit: f64,
    /// Print Clarabel's iteration log
    pub verbose: bool,
}

impl ClarabelSolver {
    /// Create a solver using the tolerance and time limit of the global configuration
    pub fn from_configuration() -> Self {
        let config = CONFIGURATION.read().unwrap();
        ClarabelSolver {
            tolerance: config.tolerance,
            time_limit: config.time_limit,
            verbose: false,
        }
    }
}

impl Default for ClarabelSolver {
    fn default() -> Self {
        Self::from_configuration()
    }
}

/// Problem data in the form Clarabel expects
struct ConicForm {
    p: CscMatrix<f64>,
    q: Vec<f64>,
    a: CscMatrix<f64>,
    b: Vec<f64>,
    cones: Vec<SupportedConeT<f64>>,
}

fn to_conic_form(problem: &Problem) -> ConicForm {
    let n = problem.num_variables();
    let n_balance = problem.num_constraints();
    let stoichiometry = problem.stoichiometry();
    let col_offsets = stoichiometry.col_offsets();
    let row_indices = stoichiometry.row_indices();
    let values = stoichiometry.values();

    let mut colptr = Vec::with_capacity(n + 1);
    let mut rowval = Vec::new();
    let mut nzval = Vec::new();
    let mut b = vec![0.; n_balance];
    colptr.push(0);
    for col in 0..n {
        // Mass balance entries, already sorted by row within the column
        for idx in col_offsets[col]..col_offsets[col + 1] {
            rowval.push(row_indices[idx]);
            nzval.push(values[idx]);
        }
        // -v <= -lb
        let lower = problem.lower_bounds()[col];
        if lower.is_finite() {
            rowval.push(b.len());
            nzval.push(-1.);
            b.push(-lower);
        }
        // v <= ub
        let upper = problem.upper_bounds()[col];
        if upper.is_finite() {
            rowval.push(b.len());
            nzval.push(1.);
            b.push(upper);
        }
        colptr.push(rowval.len());
    }
    let n_rows = b.len();

    let mut cones = Vec::new();
    if n_balance > 0 {
        cones.push(SupportedConeT::ZeroConeT(n_balance));
    }
    if n_rows > n_balance {
        cones.push(SupportedConeT::NonnegativeConeT(n_rows - n_balance));
    }

    let q = match problem.sense() {
        ObjectiveSense::Maximize => problem.objective().iter().map(|c| -c).collect(),
        ObjectiveSense::Minimize => problem.objective().iter().copied().collect(),
    };

    ConicForm {
        p: CscMatrix::new(n, n, vec![0; n + 1], Vec::new(), Vec::new()),
        q,
        a: CscMatrix::new(n_rows, n, colptr, rowval, nzval),
        b,
        cones,
    }
}

fn convert_status(status: SolverStatus) -> OptimizationStatus {
    match status {
        SolverStatus::Solved | SolverStatus::AlmostSolved => OptimizationStatus::Optimal,
        SolverStatus::PrimalInfeasible | SolverStatus::AlmostPrimalInfeasible => {
            OptimizationStatus::Infeasible
        }
        SolverStatus::DualInfeasible | SolverStatus::AlmostDualInfeasible => {
            OptimizationStatus::Unbounded
        }
        _ => OptimizationStatus::Error,
    }
}

impl LpSolver for ClarabelSolver {
    fn name(&self) -> &'static str {
        "clarabel"
    }

    fn solve(&self, problem: &Problem) -> Result<ProblemSolution, SolverError> {
        let settings = DefaultSettingsBuilder::default()
            .verbose(self.verbose)
            .tol_feas(self.tolerance)
            .time_limit(self.time_limit)
            .build()
            .map_err(|err| SolverError::Settings(err.to_string()))?;
        let form = to_conic_form(problem);
        let mut solver = DefaultSolver::new(&form.p, &form.q, &form.a, &form.b, &form.cones, settings);
        solver.solve();

        let status = convert_status(solver.solution.status);
        if status != OptimizationStatus::Optimal {
            return Ok(ProblemSolution::without_optimum(status));
        }
        let x = &solver.solution.x;
        Ok(ProblemSolution {
            status,
            objective_value: Some(problem.objective_value(x)),
            fluxes: Some(problem.fluxes(x)),
        })
    }
}

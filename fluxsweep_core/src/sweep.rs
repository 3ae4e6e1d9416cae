//! Sweeps a perturbation over a grid of parameters, solving a fresh copy of the baseline
//! model for every grid point
use log::{debug, info, warn};
use rayon::prelude::*;
use serde::Serialize;
use thiserror::Error;

use crate::configuration::CONFIGURATION;
use crate::metabolic_model::model::{Model, ModelError};
use crate::optimize::solvers::LpSolver;
use crate::optimize::{OptimizationStatus, ProblemSolution};
use crate::perturbation::{
    ConstraintPerturbation, Perturbation, PerturbationConfig, PerturbationKind,
};

/// A read-only model to sweep over, together with its captured cofactor snapshot
#[derive(Clone, Debug)]
pub struct SweepBaseline {
    model: Model,
    perturbation: ConstraintPerturbation,
}

impl SweepBaseline {
    /// Validate `model` and capture the cofactor coefficients of its objective reaction
    pub fn new(model: Model, config: PerturbationConfig) -> Result<Self, SweepError> {
        model.validate()?;
        let perturbation = ConstraintPerturbation::capture(&model, config)?;
        Ok(SweepBaseline {
            model,
            perturbation,
        })
    }

    pub fn model(&self) -> &Model {
        &self.model
    }

    pub fn perturbation(&self) -> &ConstraintPerturbation {
        &self.perturbation
    }

    /// A copy of the baseline model with `perturbation` applied
    pub fn snapshot(&self, perturbation: Perturbation) -> Result<Model, SweepError> {
        let mut model = self.model.clone();
        self.perturbation.apply(&mut model, perturbation)?;
        Ok(model)
    }

    /// A new baseline with `perturbation` applied, sharing this baseline's cofactor snapshot
    ///
    /// Used to sweep one perturbation on top of a fixed other one, e.g. an ATP delta sweep
    /// under a given salvage capacity.
    pub fn perturbed(&self, perturbation: Perturbation) -> Result<Self, SweepError> {
        Ok(SweepBaseline {
            model: self.snapshot(perturbation)?,
            perturbation: self.perturbation.clone(),
        })
    }
}

/// The outcome of a single grid point
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
pub struct SweepPoint {
    pub parameter: f64,
    /// Objective value, 0 unless the status is optimal
    pub objective_value: f64,
    pub status: OptimizationStatus,
}

/// Grid points in the order they were requested
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SweepResult {
    points: Vec<SweepPoint>,
}

impl SweepResult {
    pub fn new() -> Self {
        SweepResult::default()
    }

    pub fn push(&mut self, point: SweepPoint) {
        self.points.push(point);
    }

    pub fn points(&self) -> &[SweepPoint] {
        &self.points
    }

    pub fn iter(&self) -> std::slice::Iter<'_, SweepPoint> {
        self.points.iter()
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn parameters(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.parameter).collect()
    }

    pub fn objective_values(&self) -> Vec<f64> {
        self.points.iter().map(|p| p.objective_value).collect()
    }
}

impl<'a> IntoIterator for &'a SweepResult {
    type Item = &'a SweepPoint;
    type IntoIter = std::slice::Iter<'a, SweepPoint>;

    fn into_iter(self) -> Self::IntoIter {
        self.points.iter()
    }
}

impl FromIterator<SweepPoint> for SweepResult {
    fn from_iter<T: IntoIterator<Item = SweepPoint>>(iter: T) -> Self {
        SweepResult {
            points: iter.into_iter().collect(),
        }
    }
}

/// One sweep of a composite run, labelled with the group it was run under
#[derive(Clone, Debug, PartialEq)]
pub struct LabeledSweep {
    pub group: String,
    pub kind: PerturbationKind,
    pub result: SweepResult,
}

/// Solve a model, turning solver failures into an [`OptimizationStatus::Error`] solution
fn solve_recorded<S: LpSolver + ?Sized>(model: &Model, solver: &S) -> ProblemSolution {
    match solver.optimize(model) {
        Ok(solution) => solution,
        Err(err) => {
            warn!("Solver {} failed: {}", solver.name(), err);
            ProblemSolution::without_optimum(OptimizationStatus::Error)
        }
    }
}

fn solve_point<S: LpSolver + ?Sized>(
    baseline: &SweepBaseline,
    kind: PerturbationKind,
    parameter: f64,
    solver: &S,
) -> Result<SweepPoint, SweepError> {
    let model = baseline.snapshot(Perturbation::new(kind, parameter))?;
    let solution = solve_recorded(&model, solver);
    debug!("{} = {}: {} {:?}", kind, parameter, solution.status, solution.objective_value);
    Ok(SweepPoint {
        parameter,
        objective_value: solution.objective_or_zero(),
        status: solution.status,
    })
}

/// Solve the unperturbed baseline
pub fn solve_baseline<S: LpSolver + ?Sized>(baseline: &SweepBaseline, solver: &S) -> ProblemSolution {
    let solution = solve_recorded(baseline.model(), solver);
    info!(
        "Baseline objective: {} ({})",
        solution.objective_or_zero(),
        solution.status
    );
    solution
}

/// Sweep `kind` over `grid`, using the number of processes from the global configuration
///
/// Results are in the order of `grid`. Infeasible, unbounded and failed solves are recorded
/// with an objective value of 0; a perturbation that can't be applied fails the sweep.
pub fn run_sweep<S: LpSolver + ?Sized>(
    baseline: &SweepBaseline,
    kind: PerturbationKind,
    grid: &[f64],
    solver: &S,
) -> Result<SweepResult, SweepError> {
    let processes = CONFIGURATION.read().unwrap().processes as usize;
    run_sweep_with_processes(baseline, kind, grid, solver, processes)
}

/// Sweep `kind` over `grid` on `processes` worker threads
pub fn run_sweep_with_processes<S: LpSolver + ?Sized>(
    baseline: &SweepBaseline,
    kind: PerturbationKind,
    grid: &[f64],
    solver: &S,
    processes: usize,
) -> Result<SweepResult, SweepError> {
    info!(
        "Sweeping {} over {} points with {}",
        kind,
        grid.len(),
        solver.name()
    );
    let points = if processes <= 1 {
        grid.iter()
            .map(|parameter| solve_point(baseline, kind, *parameter, solver))
            .collect::<Result<Vec<_>, _>>()?
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(processes)
            .build()?;
        // Indexed collection keeps grid order regardless of completion order
        pool.install(|| {
            grid.par_iter()
                .map(|parameter| solve_point(baseline, kind, *parameter, solver))
                .collect::<Result<Vec<_>, _>>()
        })?
    };
    Ok(SweepResult { points })
}

/// Run every stress sweep under every salvage mode
///
/// For each `(label, salvage_flux)` the salvage floor is applied once to a copy of the
/// baseline, then each `(kind, grid)` in `stresses` is swept on top of it.
pub fn run_composite_sweep<S: LpSolver + ?Sized>(
    baseline: &SweepBaseline,
    salvage_modes: &[(&str, f64)],
    stresses: &[(PerturbationKind, &[f64])],
    solver: &S,
) -> Result<Vec<LabeledSweep>, SweepError> {
    let mut sweeps = Vec::with_capacity(salvage_modes.len() * stresses.len());
    for (label, salvage_flux) in salvage_modes {
        let salvaged = baseline.perturbed(Perturbation::salvage_floor(*salvage_flux))?;
        for (kind, grid) in stresses {
            sweeps.push(LabeledSweep {
                group: label.to_string(),
                kind: *kind,
                result: run_sweep(&salvaged, *kind, grid, solver)?,
            });
        }
    }
    Ok(sweeps)
}

#[derive(Error, Debug)]
pub enum SweepError {
    #[error("Unable to apply perturbation: {0}")]
    Model(#[from] ModelError),
    #[error("Unable to start sweep workers: {0}")]
    ThreadPool(#[from] rayon::ThreadPoolBuildError),
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::metabolite::Metabolite;
    use crate::metabolic_model::reaction::ReactionBuilder;
    use crate::optimize::problem::Problem;
    use crate::optimize::solvers::SolverError;
    use crate::perturbation::{Cofactor, PerturbationConfigBuilder};
    use indexmap::IndexMap;

    /// Reports the ATP coefficient of the objective and the ATPM lower bound as
    /// "objective", fails for a negative ATPM floor, infeasible above 100
    struct EchoSolver;

    impl LpSolver for EchoSolver {
        fn name(&self) -> &'static str {
            "echo"
        }

        fn solve(&self, _problem: &Problem) -> Result<ProblemSolution, SolverError> {
            unreachable!("optimize is overridden")
        }

        fn optimize(&self, model: &Model) -> Result<ProblemSolution, SolverError> {
            let atp = model.objective_reaction()?.coefficient("ATP");
            let floor = model.get_reaction("ATPM")?.lower_bound;
            if floor < 0. {
                return Err(SolverError::Backend("negative floor".to_string()));
            }
            if floor > 100. {
                return Ok(ProblemSolution::without_optimum(OptimizationStatus::Infeasible));
            }
            Ok(ProblemSolution {
                status: OptimizationStatus::Optimal,
                objective_value: Some(-atp + floor),
                fluxes: None,
            })
        }
    }

    fn setup_baseline() -> SweepBaseline {
        let mut model = Model::new_empty();
        for id in ["ATP", "ADP"] {
            model.add_metabolite(Metabolite::new(id, "c")).unwrap();
        }
        for (id, atp) in [("BIOMASS", -10.), ("ATPM", -1.)] {
            let mut mets = IndexMap::new();
            mets.insert("ATP".to_string(), atp);
            mets.insert("ADP".to_string(), -atp);
            model
                .add_reaction(
                    ReactionBuilder::default()
                        .id(id)
                        .metabolites(mets)
                        .lower_bound(0.)
                        .upper_bound(500.)
                        .build()
                        .unwrap(),
                )
                .unwrap();
        }
        model.set_objective("BIOMASS").unwrap();
        let config = PerturbationConfigBuilder::default()
            .cofactors(vec![Cofactor::consumed("ATP"), Cofactor::produced("ADP")])
            .build()
            .unwrap();
        SweepBaseline::new(model, config).unwrap()
    }

    #[test]
    fn atp_delta_not_cumulative() {
        let baseline = setup_baseline();
        let result = run_sweep_with_processes(
            &baseline,
            PerturbationKind::AtpDelta,
            &[50., 50.],
            &EchoSolver,
            1,
        )
        .unwrap();
        assert_eq!(result.objective_values(), vec![60., 60.]);
        // The baseline itself is never touched
        let biomass = baseline.model().get_reaction("BIOMASS").unwrap();
        assert_eq!(biomass.coefficient("ATP"), -10.);
    }

    #[test]
    fn repeated_sweeps_agree() {
        let baseline = setup_baseline();
        let first =
            run_sweep_with_processes(&baseline, PerturbationKind::AtpDelta, &[10.], &EchoSolver, 1)
                .unwrap();
        let second =
            run_sweep_with_processes(&baseline, PerturbationKind::AtpDelta, &[10.], &EchoSolver, 1)
                .unwrap();
        assert_eq!(first, second);
        assert_eq!(first.points()[0].objective_value, 20.);
    }

    #[test]
    fn order_is_preserved_in_parallel() {
        let baseline = setup_baseline();
        let grid: Vec<f64> = (0..40).rev().map(|v| v as f64).collect();
        let sequential =
            run_sweep_with_processes(&baseline, PerturbationKind::AtpmFloor, &grid, &EchoSolver, 1)
                .unwrap();
        let parallel =
            run_sweep_with_processes(&baseline, PerturbationKind::AtpmFloor, &grid, &EchoSolver, 4)
                .unwrap();
        assert_eq!(parallel.parameters(), grid);
        assert_eq!(sequential, parallel);
    }

    #[test]
    fn non_optimal_points_are_recorded() {
        let baseline = setup_baseline();
        let result = run_sweep_with_processes(
            &baseline,
            PerturbationKind::AtpmFloor,
            &[50., 200., -5.],
            &EchoSolver,
            1,
        )
        .unwrap();
        let statuses: Vec<OptimizationStatus> = result.iter().map(|p| p.status).collect();
        assert_eq!(
            statuses,
            vec![
                OptimizationStatus::Optimal,
                OptimizationStatus::Infeasible,
                OptimizationStatus::Error
            ]
        );
        assert_eq!(result.objective_values(), vec![60., 0., 0.]);
    }

    #[test]
    fn invalid_parameter_fails_the_sweep() {
        let baseline = setup_baseline();
        let res = run_sweep_with_processes(
            &baseline,
            PerturbationKind::AtpmFloor,
            &[10., 1000.],
            &EchoSolver,
            2,
        );
        assert!(matches!(
            res,
            Err(SweepError::Model(ModelError::InvalidBounds { .. }))
        ));
        let res = run_sweep_with_processes(
            &baseline,
            PerturbationKind::AtpDelta,
            &[5., f64::NAN],
            &EchoSolver,
            1,
        );
        assert!(matches!(
            res,
            Err(SweepError::Model(ModelError::InvalidCoefficient { .. }))
        ));
    }

    #[test]
    fn composite_sweep() {
        let baseline = setup_baseline();
        let sweeps = run_composite_sweep(
            &baseline,
            &[("low", 1.), ("high", 1000.)],
            &[
                (PerturbationKind::AtpDelta, &[0., 5.][..]),
                (PerturbationKind::AtpmFloor, &[20.][..]),
            ],
            &EchoSolver,
        )
        .unwrap();
        let labels: Vec<(&str, PerturbationKind)> =
            sweeps.iter().map(|s| (s.group.as_str(), s.kind)).collect();
        assert_eq!(
            labels,
            vec![
                ("low", PerturbationKind::AtpDelta),
                ("low", PerturbationKind::AtpmFloor),
                ("high", PerturbationKind::AtpDelta),
                ("high", PerturbationKind::AtpmFloor),
            ]
        );
        assert_eq!(sweeps[0].result.objective_values(), vec![10., 15.]);
        assert_eq!(sweeps[1].result.objective_values(), vec![30.]);
    }

    #[test]
    fn perturbed_baseline_keeps_snapshot() {
        let baseline = setup_baseline();
        let stressed = baseline.perturbed(Perturbation::atp_delta(7.)).unwrap();
        assert_eq!(
            stressed.model().get_reaction("BIOMASS").unwrap().coefficient("ATP"),
            -17.
        );
        // A further delta starts from the original coefficients, not the stressed ones
        let snapshot = stressed.snapshot(Perturbation::atp_delta(1.)).unwrap();
        assert_eq!(snapshot.get_reaction("BIOMASS").unwrap().coefficient("ATP"), -11.);
    }

    #[test]
    fn baseline_solve() {
        let baseline = setup_baseline();
        let solution = solve_baseline(&baseline, &EchoSolver);
        assert_eq!(solution.objective_or_zero(), 10.);
    }
}

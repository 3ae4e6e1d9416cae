//! Provides struct representing the flux balance linear program of a model
use indexmap::IndexMap;
use nalgebra::DVector;
use nalgebra_sparse::{CooMatrix, CscMatrix};

use crate::metabolic_model::model::{Model, ModelError};

/// Represents the sense of the objective, whether it should be maximized or minimized
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ObjectiveSense {
    /// The objective should be minimized
    Minimize,
    /// The objective should be maximized
    Maximize,
}

/// A flux balance problem
///
/// One continuous variable per reaction (in model order), one mass balance equality
/// `S·v = 0` per metabolite (in model order), and a linear objective.
#[derive(Debug, Clone)]
pub struct Problem {
    /// Reaction ids, one per variable
    variables: Vec<String>,
    lower_bounds: Vec<f64>,
    upper_bounds: Vec<f64>,
    /// Stoichiometric matrix, metabolites x reactions
    stoichiometry: CscMatrix<f64>,
    /// Objective coefficient of every variable
    objective: DVector<f64>,
    sense: ObjectiveSense,
}

impl Problem {
    /// Lower a model into a maximization problem of its objective reaction
    pub fn from_model(model: &Model) -> Result<Self, ModelError> {
        model.objective_reaction()?;
        let n_reactions = model.num_reactions();
        let mut coo = CooMatrix::new(model.num_metabolites(), n_reactions);
        let mut variables = Vec::with_capacity(n_reactions);
        let mut lower_bounds = Vec::with_capacity(n_reactions);
        let mut upper_bounds = Vec::with_capacity(n_reactions);
        for (col, reaction) in model.reactions().enumerate() {
            for (met_id, coef) in &reaction.metabolites {
                let row = model
                    .metabolite_index(met_id)
                    .ok_or_else(|| ModelError::MetaboliteNotFound(met_id.clone()))?;
                if *coef != 0. {
                    coo.push(row, col, *coef);
                }
            }
            variables.push(reaction.id.clone());
            lower_bounds.push(reaction.lower_bound);
            upper_bounds.push(reaction.upper_bound);
        }
        let objective = DVector::from_iterator(
            n_reactions,
            variables.iter().map(|id| model.objective_coefficient(id)),
        );
        Ok(Problem {
            variables,
            lower_bounds,
            upper_bounds,
            stoichiometry: CscMatrix::from(&coo),
            objective,
            sense: ObjectiveSense::Maximize,
        })
    }

    pub fn num_variables(&self) -> usize {
        self.variables.len()
    }

    pub fn num_constraints(&self) -> usize {
        self.stoichiometry.nrows()
    }

    pub fn variables(&self) -> &[String] {
        &self.variables
    }

    pub fn lower_bounds(&self) -> &[f64] {
        &self.lower_bounds
    }

    pub fn upper_bounds(&self) -> &[f64] {
        &self.upper_bounds
    }

    pub fn stoichiometry(&self) -> &CscMatrix<f64> {
        &self.stoichiometry
    }

    pub fn objective(&self) -> &DVector<f64> {
        &self.objective
    }

    pub fn sense(&self) -> ObjectiveSense {
        self.sense
    }

    /// Update the objective sense of the problem
    pub fn update_objective_sense(&mut self, sense: ObjectiveSense) {
        self.sense = sense;
    }

    /// Evaluate the objective at a point
    pub fn objective_value(&self, values: &[f64]) -> f64 {
        self.objective.dot(&DVector::from_column_slice(values))
    }

    /// Key variable values by reaction id
    pub fn fluxes(&self, values: &[f64]) -> IndexMap<String, f64> {
        self.variables
            .iter()
            .cloned()
            .zip(values.iter().copied())
            .collect()
    }
}

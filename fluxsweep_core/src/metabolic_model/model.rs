//! This module provides the Model struct for representing an entire metabolic model
use crate::configuration::CONFIGURATION;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::reaction::Reaction;

use indexmap::IndexMap;
use thiserror::Error;

/// Represents a Genome Scale Metabolic Model
///
/// Cloning a model produces a fully independent copy, reactions and metabolites are owned
/// values so no mutation of a clone is ever visible through the original.
#[derive(Clone, Debug, PartialEq)]
pub struct Model {
    /// Map of reaction ids to Reactions
    reactions: IndexMap<String, Reaction>,
    /// Map of metabolite ids to Metabolites
    metabolites: IndexMap<String, Metabolite>,
    /// Id of the reaction whose flux is maximized
    objective: Option<String>,
    /// Id associated with the Model
    pub id: Option<String>,
    /// Compartments in the model
    ///
    /// An IndexMap<String, String> of {short name: long name}
    pub compartments: Option<IndexMap<String, String>>,
    /// A version identifier for the Model, stored as a string
    pub version: Option<String>,
}

/// How [`Model::add_stoichiometry`] combines a new coefficient with the current one
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum StoichiometryMode {
    /// Overwrite the current coefficient
    Replace,
    /// Add to the current coefficient, treating a missing metabolite as 0
    Accumulate,
}

impl Model {
    pub fn new_empty() -> Self {
        Model {
            reactions: IndexMap::new(),
            metabolites: IndexMap::new(),
            objective: None,
            id: None,
            compartments: None,
            version: None,
        }
    }

    // region Adding Components
    /// Add a metabolite to the model
    ///
    /// # Examples
    /// ```rust
    /// use fluxsweep_core::metabolic_model::model::Model;
    /// use fluxsweep_core::metabolic_model::metabolite::Metabolite;
    /// let mut model = Model::new_empty();
    /// model.add_metabolite(Metabolite::new("atp_c", "c")).unwrap();
    /// assert!(model.add_metabolite(Metabolite::new("atp_c", "c")).is_err());
    /// ```
    pub fn add_metabolite(&mut self, metabolite: Metabolite) -> Result<(), ModelError> {
        if self.metabolites.contains_key(&metabolite.id) {
            return Err(ModelError::DuplicateMetabolite(metabolite.id));
        }
        self.metabolites.insert(metabolite.id.clone(), metabolite);
        Ok(())
    }

    /// Add a reaction to the model
    ///
    /// Every metabolite in the reaction must already be part of the model, and the reaction
    /// id must not be in use.
    ///
    /// # Examples
    /// ```rust
    /// use fluxsweep_core::metabolic_model::model::Model;
    /// use fluxsweep_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// let new_reaction = ReactionBuilder::default().id("new_reaction").build().unwrap();
    /// model.add_reaction(new_reaction).unwrap();
    /// ```
    pub fn add_reaction(&mut self, reaction: Reaction) -> Result<(), ModelError> {
        if self.reactions.contains_key(&reaction.id) {
            return Err(ModelError::DuplicateReaction(reaction.id));
        }
        if let Some(missing) = reaction
            .metabolites
            .keys()
            .find(|met_id| !self.contains_metabolite(met_id))
        {
            return Err(ModelError::MetaboliteNotFound(missing.clone()));
        }
        check_bounds(&reaction.id, reaction.lower_bound, reaction.upper_bound)?;
        self.reactions.insert(reaction.id.clone(), reaction);
        Ok(())
    }
    // endregion Adding Components

    // region Access
    /// Get a reaction by id
    pub fn get_reaction(&self, id: &str) -> Result<&Reaction, ModelError> {
        self.reactions
            .get(id)
            .ok_or_else(|| ModelError::ReactionNotFound(id.to_string()))
    }

    /// Get a metabolite by id
    pub fn get_metabolite(&self, id: &str) -> Result<&Metabolite, ModelError> {
        self.metabolites
            .get(id)
            .ok_or_else(|| ModelError::MetaboliteNotFound(id.to_string()))
    }

    pub fn contains_reaction(&self, id: &str) -> bool {
        self.reactions.contains_key(id)
    }

    pub fn contains_metabolite(&self, id: &str) -> bool {
        self.metabolites.contains_key(id)
    }

    /// Find a reaction whose id matches `id` ignoring case
    pub fn find_reaction_ignore_case(&self, id: &str) -> Option<&Reaction> {
        let wanted = id.to_lowercase();
        self.reactions.values().find(|r| r.id.to_lowercase() == wanted)
    }

    /// Iterate over the reactions in insertion order
    pub fn reactions(&self) -> impl Iterator<Item = &Reaction> {
        self.reactions.values()
    }

    /// Iterate over the metabolites in insertion order
    pub fn metabolites(&self) -> impl Iterator<Item = &Metabolite> {
        self.metabolites.values()
    }

    pub fn num_reactions(&self) -> usize {
        self.reactions.len()
    }

    pub fn num_metabolites(&self) -> usize {
        self.metabolites.len()
    }

    /// Position of a metabolite in the model, used as its row in the stoichiometric matrix
    pub(crate) fn metabolite_index(&self, id: &str) -> Option<usize> {
        self.metabolites.get_index_of(id)
    }

    /// Exchange reactions, using the external compartment from the global configuration
    pub fn exchanges(&self) -> Vec<&Reaction> {
        let compartment = CONFIGURATION.read().unwrap().external_compartment.clone();
        self.exchanges_in(&compartment)
    }

    /// Exchange reactions, boundary reactions whose single metabolite is in `compartment`
    pub fn exchanges_in(&self, compartment: &str) -> Vec<&Reaction> {
        self.reactions
            .values()
            .filter(|r| r.is_boundary())
            .filter(|r| {
                r.metabolites
                    .keys()
                    .all(|met_id| match self.metabolites.get(met_id) {
                        Some(met) => met.in_compartment(compartment),
                        None => false,
                    })
            })
            .collect()
    }
    // endregion Access

    // region Objective
    /// Id of the objective reaction, if one has been designated
    pub fn objective(&self) -> Option<&str> {
        self.objective.as_deref()
    }

    /// Designate the reaction to maximize
    pub fn set_objective(&mut self, reaction_id: &str) -> Result<(), ModelError> {
        self.get_reaction(reaction_id)?;
        self.objective = Some(reaction_id.to_string());
        Ok(())
    }

    /// The designated objective reaction
    pub fn objective_reaction(&self) -> Result<&Reaction, ModelError> {
        match &self.objective {
            Some(id) => self.get_reaction(id),
            None => Err(ModelError::NoObjective),
        }
    }

    /// Objective weight of a reaction, 1 for the objective reaction and 0 otherwise
    pub fn objective_coefficient(&self, reaction_id: &str) -> f64 {
        match &self.objective {
            Some(id) if id == reaction_id => 1.,
            _ => 0.,
        }
    }
    // endregion Objective

    // region Mutation
    /// Update both flux bounds of a reaction
    ///
    /// Fails without changing anything if the reaction is missing, or if
    /// lower_bound > upper_bound (or either is NaN)
    pub fn set_bounds(
        &mut self,
        reaction_id: &str,
        lower_bound: f64,
        upper_bound: f64,
    ) -> Result<(), ModelError> {
        let reaction = self
            .reactions
            .get_mut(reaction_id)
            .ok_or_else(|| ModelError::ReactionNotFound(reaction_id.to_string()))?;
        check_bounds(reaction_id, lower_bound, upper_bound)?;
        reaction.lower_bound = lower_bound;
        reaction.upper_bound = upper_bound;
        Ok(())
    }

    /// Update the lower bound of a reaction, keeping its current upper bound
    pub fn set_lower_bound(&mut self, reaction_id: &str, lower_bound: f64) -> Result<(), ModelError> {
        let upper_bound = self.get_reaction(reaction_id)?.upper_bound;
        self.set_bounds(reaction_id, lower_bound, upper_bound)
    }

    /// Change the coefficient of a metabolite in a reaction
    ///
    /// A coefficient which ends up exactly 0 is removed from the reaction, one which isn't
    /// finite is rejected and the reaction left unchanged.
    ///
    /// # Examples
    /// ```rust
    /// use fluxsweep_core::metabolic_model::model::{Model, StoichiometryMode};
    /// use fluxsweep_core::metabolic_model::metabolite::Metabolite;
    /// use fluxsweep_core::metabolic_model::reaction::ReactionBuilder;
    /// let mut model = Model::new_empty();
    /// model.add_metabolite(Metabolite::new("atp_c", "c")).unwrap();
    /// model.add_reaction(ReactionBuilder::default().id("R").build().unwrap()).unwrap();
    /// model.add_stoichiometry("R", "atp_c", -2., StoichiometryMode::Accumulate).unwrap();
    /// model.add_stoichiometry("R", "atp_c", -1., StoichiometryMode::Accumulate).unwrap();
    /// assert_eq!(model.get_reaction("R").unwrap().coefficient("atp_c"), -3.);
    /// model.add_stoichiometry("R", "atp_c", -2., StoichiometryMode::Replace).unwrap();
    /// assert_eq!(model.get_reaction("R").unwrap().coefficient("atp_c"), -2.);
    /// ```
    pub fn add_stoichiometry(
        &mut self,
        reaction_id: &str,
        metabolite_id: &str,
        delta: f64,
        mode: StoichiometryMode,
    ) -> Result<(), ModelError> {
        if !self.contains_metabolite(metabolite_id) {
            return Err(ModelError::MetaboliteNotFound(metabolite_id.to_string()));
        }
        let reaction = self
            .reactions
            .get_mut(reaction_id)
            .ok_or_else(|| ModelError::ReactionNotFound(reaction_id.to_string()))?;
        let coefficient = match mode {
            StoichiometryMode::Replace => delta,
            StoichiometryMode::Accumulate => reaction.coefficient(metabolite_id) + delta,
        };
        if !coefficient.is_finite() {
            return Err(ModelError::InvalidCoefficient {
                reaction: reaction_id.to_string(),
                metabolite: metabolite_id.to_string(),
                coefficient,
            });
        }
        if coefficient == 0. {
            reaction.metabolites.shift_remove(metabolite_id);
        } else {
            reaction
                .metabolites
                .insert(metabolite_id.to_string(), coefficient);
        }
        Ok(())
    }
    // endregion Mutation

    /// Check every structural invariant of the model
    pub fn validate(&self) -> Result<(), ModelError> {
        for reaction in self.reactions.values() {
            check_bounds(&reaction.id, reaction.lower_bound, reaction.upper_bound)?;
            for met_id in reaction.metabolites.keys() {
                self.get_metabolite(met_id)?;
            }
        }
        if let Some(objective) = &self.objective {
            self.get_reaction(objective)?;
        }
        Ok(())
    }
}

pub(crate) fn check_bounds(reaction_id: &str, lower_bound: f64, upper_bound: f64) -> Result<(), ModelError> {
    // Written negated so that NaN bounds are rejected as well
    if !(lower_bound <= upper_bound) {
        return Err(ModelError::InvalidBounds {
            reaction: reaction_id.to_string(),
            lower_bound,
            upper_bound,
        });
    }
    Ok(())
}

/// Errors associated with the Model
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ModelError {
    #[error("Reaction {0} is not present in the model")]
    ReactionNotFound(String),
    #[error("Metabolite {0} is not present in the model")]
    MetaboliteNotFound(String),
    #[error("Invalid bounds for reaction {reaction}: lower_bound {lower_bound} > upper_bound {upper_bound}")]
    InvalidBounds {
        reaction: String,
        lower_bound: f64,
        upper_bound: f64,
    },
    #[error("Tried to add a reaction with the same id as an existing reaction: {0}")]
    DuplicateReaction(String),
    #[error("Tried to add a metabolite with the same id as an existing metabolite: {0}")]
    DuplicateMetabolite(String),
    #[error("Invalid coefficient {coefficient} for metabolite {metabolite} in reaction {reaction}")]
    InvalidCoefficient {
        reaction: String,
        metabolite: String,
        coefficient: f64,
    },
    #[error("No objective reaction has been set")]
    NoObjective,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::metabolic_model::reaction::ReactionBuilder;
    use proptest::prelude::*;

    fn setup_model() -> Model {
        let mut model = Model::new_empty();
        for (id, compartment) in [("glc__D_e", "e"), ("glc__D_c", "c"), ("atp_c", "c"), ("adp_c", "c")] {
            model.add_metabolite(Metabolite::new(id, compartment)).unwrap();
        }
        let mut ex_mets = IndexMap::new();
        ex_mets.insert("glc__D_e".to_string(), -1.);
        model
            .add_reaction(
                ReactionBuilder::default()
                    .id("EX_glc__D_e")
                    .metabolites(ex_mets)
                    .lower_bound(-10.)
                    .upper_bound(1000.)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let mut sink_mets = IndexMap::new();
        sink_mets.insert("glc__D_c".to_string(), -1.);
        model
            .add_reaction(
                ReactionBuilder::default()
                    .id("SK_glc__D_c")
                    .metabolites(sink_mets)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        let mut atpm_mets = IndexMap::new();
        atpm_mets.insert("atp_c".to_string(), -1.);
        atpm_mets.insert("adp_c".to_string(), 1.);
        model
            .add_reaction(
                ReactionBuilder::default()
                    .id("ATPM")
                    .metabolites(atpm_mets)
                    .lower_bound(0.)
                    .upper_bound(500.)
                    .build()
                    .unwrap(),
            )
            .unwrap();
        model.set_objective("ATPM").unwrap();
        model
    }

    #[test]
    fn missing_reaction() {
        let model = setup_model();
        assert_eq!(
            model.get_reaction("PFK").unwrap_err(),
            ModelError::ReactionNotFound("PFK".to_string())
        );
    }

    #[test]
    fn add_reaction_checks() {
        let mut model = setup_model();
        let duplicate = ReactionBuilder::default().id("ATPM").build().unwrap();
        assert!(matches!(
            model.add_reaction(duplicate),
            Err(ModelError::DuplicateReaction(_))
        ));
        let mut mets = IndexMap::new();
        mets.insert("nad_c".to_string(), 1.);
        let unknown_met = ReactionBuilder::default()
            .id("NADS")
            .metabolites(mets)
            .build()
            .unwrap();
        assert!(matches!(
            model.add_reaction(unknown_met),
            Err(ModelError::MetaboliteNotFound(_))
        ));
        let bad_bounds = ReactionBuilder::default()
            .id("BAD")
            .lower_bound(5.)
            .upper_bound(1.)
            .build()
            .unwrap();
        assert!(matches!(
            model.add_reaction(bad_bounds),
            Err(ModelError::InvalidBounds { .. })
        ));
        assert_eq!(model.num_reactions(), 3);
    }

    #[test]
    fn clone_is_independent() {
        let original = setup_model();
        let mut copy = original.clone();
        copy.set_bounds("ATPM", 10., 20.).unwrap();
        copy.add_stoichiometry("ATPM", "atp_c", -5., StoichiometryMode::Accumulate)
            .unwrap();
        let atpm = original.get_reaction("ATPM").unwrap();
        assert_eq!(atpm.lower_bound, 0.);
        assert_eq!(atpm.upper_bound, 500.);
        assert_eq!(atpm.coefficient("atp_c"), -1.);
        // And the other way around
        let mut original = original;
        original.set_bounds("ATPM", 1., 2.).unwrap();
        assert_eq!(copy.get_reaction("ATPM").unwrap().lower_bound, 10.);
    }

    #[test]
    fn invalid_bounds_leave_reaction_untouched() {
        let mut model = setup_model();
        let res = model.set_bounds("ATPM", 1000., 500.);
        assert!(matches!(res, Err(ModelError::InvalidBounds { .. })));
        let atpm = model.get_reaction("ATPM").unwrap();
        assert_eq!(atpm.lower_bound, 0.);
        assert_eq!(atpm.upper_bound, 500.);
        assert!(model.set_bounds("ATPM", f64::NAN, 500.).is_err());
        assert!(model.set_lower_bound("ATPM", 600.).is_err());
        assert_eq!(model.get_reaction("ATPM").unwrap().lower_bound, 0.);
    }

    #[test]
    fn missing_reaction_reported_before_bounds() {
        let mut model = setup_model();
        assert_eq!(
            model.set_bounds("PFK", 10., -10.),
            Err(ModelError::ReactionNotFound("PFK".to_string()))
        );
        assert!(model.contains_metabolite("atp_c"));
        assert!(!model.contains_metabolite("nad_c"));
    }

    #[test]
    fn stoichiometry_modes() {
        let mut model = setup_model();
        model
            .add_stoichiometry("ATPM", "glc__D_c", 2., StoichiometryMode::Accumulate)
            .unwrap();
        assert_eq!(model.get_reaction("ATPM").unwrap().coefficient("glc__D_c"), 2.);
        model
            .add_stoichiometry("ATPM", "atp_c", -4., StoichiometryMode::Replace)
            .unwrap();
        assert_eq!(model.get_reaction("ATPM").unwrap().coefficient("atp_c"), -4.);
        // Resetting to a captured value is idempotent
        for _ in 0..3 {
            model
                .add_stoichiometry("ATPM", "atp_c", -1., StoichiometryMode::Replace)
                .unwrap();
        }
        assert_eq!(model.get_reaction("ATPM").unwrap().coefficient("atp_c"), -1.);
        // Coefficients cancelling out remove the metabolite
        model
            .add_stoichiometry("ATPM", "glc__D_c", -2., StoichiometryMode::Accumulate)
            .unwrap();
        assert!(!model
            .get_reaction("ATPM")
            .unwrap()
            .metabolites
            .contains_key("glc__D_c"));
        assert!(matches!(
            model.add_stoichiometry("ATPM", "nad_c", 1., StoichiometryMode::Replace),
            Err(ModelError::MetaboliteNotFound(_))
        ));
        assert!(matches!(
            model.add_stoichiometry("PFK", "atp_c", 1., StoichiometryMode::Replace),
            Err(ModelError::ReactionNotFound(_))
        ));
        assert!(matches!(
            model.add_stoichiometry("ATPM", "atp_c", f64::NAN, StoichiometryMode::Accumulate),
            Err(ModelError::InvalidCoefficient { .. })
        ));
        assert_eq!(model.get_reaction("ATPM").unwrap().coefficient("atp_c"), -1.);
    }

    #[test]
    fn exchanges() {
        let model = setup_model();
        let exchanges: Vec<&str> = model.exchanges_in("e").iter().map(|r| r.id.as_str()).collect();
        // The cytosolic sink is a boundary reaction but not an exchange
        assert_eq!(exchanges, vec!["EX_glc__D_e"]);
    }

    #[test]
    fn case_insensitive_lookup() {
        let model = setup_model();
        assert_eq!(model.find_reaction_ignore_case("atpm").unwrap().id, "ATPM");
        assert!(model.find_reaction_ignore_case("atp").is_none());
    }

    #[test]
    fn objective() {
        let mut model = setup_model();
        assert_eq!(model.objective(), Some("ATPM"));
        assert_eq!(model.objective_coefficient("ATPM"), 1.);
        assert_eq!(model.objective_coefficient("EX_glc__D_e"), 0.);
        assert!(model.set_objective("BIOMASS").is_err());
        assert_eq!(model.objective_reaction().unwrap().id, "ATPM");
        assert!(model.validate().is_ok());
        assert_eq!(
            Model::new_empty().objective_reaction().unwrap_err(),
            ModelError::NoObjective
        );
    }

    proptest! {
        #[test]
        fn set_bounds_keeps_invariant(lower in -2000f64..2000., upper in -2000f64..2000.) {
            let mut model = setup_model();
            let before = model.get_reaction("ATPM").unwrap().clone();
            match model.set_bounds("ATPM", lower, upper) {
                Ok(()) => {
                    prop_assert!(lower <= upper);
                    let after = model.get_reaction("ATPM").unwrap();
                    prop_assert_eq!(after.lower_bound, lower);
                    prop_assert_eq!(after.upper_bound, upper);
                }
                Err(_) => {
                    prop_assert!(lower > upper);
                    prop_assert_eq!(model.get_reaction("ATPM").unwrap(), &before);
                }
            }
            prop_assert!(model.validate().is_ok());
        }
    }
}

//! This module provides a struct for representing reactions
use crate::configuration::CONFIGURATION;
use derive_builder::Builder;
use indexmap::IndexMap;

/// Represents a reaction in the metabolic model
#[derive(Builder, Debug, Clone, PartialEq)]
pub struct Reaction {
    /// Used to identify the reaction
    #[builder(setter(into))]
    pub id: String,
    /// Metabolite stoichiometry of the reaction
    ///
    /// Negative coefficients are consumed, positive coefficients are produced
    #[builder(default = "IndexMap::new()")]
    pub metabolites: IndexMap<String, f64>,
    /// Human-readable reaction name
    #[builder(default = "None")]
    pub name: Option<String>,
    /// Lower flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().lower_bound")]
    pub lower_bound: f64,
    /// Upper flux bound
    #[builder(default = "CONFIGURATION.read().unwrap().upper_bound")]
    pub upper_bound: f64,
    /// Reaction subsystem
    #[builder(default = "None")]
    pub subsystem: Option<String>,
}

impl Reaction {
    /// Stoichiometric coefficient of a metabolite, 0 if it doesn't participate
    pub fn coefficient(&self, metabolite_id: &str) -> f64 {
        self.metabolites.get(metabolite_id).copied().unwrap_or(0.)
    }

    /// Whether the reaction has exactly one participating metabolite
    ///
    /// # Note:
    /// Whether a boundary reaction is an exchange also depends on the compartment of that
    /// metabolite, see [`crate::metabolic_model::model::Model::exchanges`]
    pub fn is_boundary(&self) -> bool {
        self.metabolites.len() == 1
    }
}

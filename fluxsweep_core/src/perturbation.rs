//! Parameterized edits of a model's bounds or objective stoichiometry
//!
//! Perturbations always act on the model they are handed; the sweep hands them a fresh
//! clone of the baseline for every grid point.
use std::fmt::{Display, Formatter};

use derive_builder::Builder;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::metabolic_model::model::{check_bounds, Model, ModelError, StoichiometryMode};

/// The kinds of perturbation that can be swept
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PerturbationKind {
    /// Extra ATP hydrolysed per unit of objective flux
    AtpDelta,
    /// Forced minimum flux through the maintenance reaction
    AtpmFloor,
    /// Uptake capacity of the salvage import exchanges
    SalvageFloor,
}

impl Display for PerturbationKind {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            PerturbationKind::AtpDelta => write!(f, "ATP_DELTA"),
            PerturbationKind::AtpmFloor => write!(f, "ATPM_FLOOR"),
            PerturbationKind::SalvageFloor => write!(f, "SALVAGE_FLOOR"),
        }
    }
}

/// One perturbation, a kind together with its parameter
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
pub struct Perturbation {
    pub kind: PerturbationKind,
    pub value: f64,
}

impl Perturbation {
    pub fn new(kind: PerturbationKind, value: f64) -> Self {
        Perturbation { kind, value }
    }

    pub fn atp_delta(value: f64) -> Self {
        Self::new(PerturbationKind::AtpDelta, value)
    }

    pub fn atpm_floor(value: f64) -> Self {
        Self::new(PerturbationKind::AtpmFloor, value)
    }

    pub fn salvage_floor(value: f64) -> Self {
        Self::new(PerturbationKind::SalvageFloor, value)
    }
}

/// Which side of the hydrolysis a cofactor sits on
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CofactorSide {
    /// Consumed, an ATP delta makes its coefficient more negative
    Consumed,
    /// Produced, an ATP delta makes its coefficient more positive
    Produced,
}

/// A metabolite taking part in ATP hydrolysis
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Cofactor {
    pub metabolite: String,
    pub side: CofactorSide,
}

impl Cofactor {
    pub fn consumed(metabolite: &str) -> Self {
        Cofactor {
            metabolite: metabolite.to_string(),
            side: CofactorSide::Consumed,
        }
    }

    pub fn produced(metabolite: &str) -> Self {
        Cofactor {
            metabolite: metabolite.to_string(),
            side: CofactorSide::Produced,
        }
    }
}

fn default_cofactors() -> Vec<Cofactor> {
    vec![
        Cofactor::consumed("atp_c"),
        Cofactor::consumed("h2o_c"),
        Cofactor::produced("adp_c"),
        Cofactor::produced("pi_c"),
        Cofactor::produced("h_c"),
    ]
}

fn default_maintenance_reaction() -> String {
    "ATPM".to_string()
}

fn default_salvage_reactions() -> Vec<String> {
    ["EX_ade_e", "EX_hxan_e", "EX_gua_e", "EX_xan_e"]
        .iter()
        .map(|id| id.to_string())
        .collect()
}

/// Identifiers the perturbations act on
///
/// The defaults follow BiGG naming (as used by iML1515 and iLG240), use the builder to
/// target a model with other identifiers.
///
/// # Examples
/// ```rust
/// use fluxsweep_core::perturbation::{Cofactor, PerturbationConfigBuilder};
/// let config = PerturbationConfigBuilder::default()
///     .cofactors(vec![Cofactor::consumed("ATP"), Cofactor::produced("ADP")])
///     .build()
///     .unwrap();
/// assert_eq!(config.maintenance_reaction, "ATPM");
/// ```
#[derive(Builder, Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PerturbationConfig {
    /// Cofactors of the objective reaction shifted by an ATP delta
    #[builder(default = "default_cofactors()")]
    #[serde(default = "default_cofactors")]
    pub cofactors: Vec<Cofactor>,
    /// Id of the maintenance reaction, matched ignoring case
    #[builder(default = "default_maintenance_reaction()", setter(into))]
    #[serde(default = "default_maintenance_reaction")]
    pub maintenance_reaction: String,
    /// Exchange reactions opened by a salvage floor, missing ones are skipped
    #[builder(default = "default_salvage_reactions()")]
    #[serde(default = "default_salvage_reactions")]
    pub salvage_reactions: Vec<String>,
}

impl Default for PerturbationConfig {
    fn default() -> Self {
        PerturbationConfig {
            cofactors: default_cofactors(),
            maintenance_reaction: default_maintenance_reaction(),
            salvage_reactions: default_salvage_reactions(),
        }
    }
}

/// Cofactor coefficients of the objective reaction, as they were before any perturbation
#[derive(Clone, Debug, PartialEq)]
pub struct CofactorBaseline {
    reaction: String,
    coefficients: Vec<(Cofactor, f64)>,
}

impl CofactorBaseline {
    /// Id of the reaction the coefficients were taken from
    pub fn reaction(&self) -> &str {
        &self.reaction
    }

    /// Captured coefficient of a metabolite
    pub fn coefficient(&self, metabolite: &str) -> Option<f64> {
        self.coefficients
            .iter()
            .find(|(cofactor, _)| cofactor.metabolite == metabolite)
            .map(|(_, coef)| *coef)
    }
}

/// Applies [`Perturbation`]s using a configuration and a cofactor snapshot taken once
#[derive(Clone, Debug, PartialEq)]
pub struct ConstraintPerturbation {
    config: PerturbationConfig,
    baseline: CofactorBaseline,
}

impl ConstraintPerturbation {
    /// Capture the cofactor coefficients of the objective reaction of `model`
    ///
    /// A cofactor absent from the objective reaction is captured as 0, a cofactor absent
    /// from the model is an error.
    pub fn capture(model: &Model, config: PerturbationConfig) -> Result<Self, ModelError> {
        let objective = model.objective_reaction()?;
        let mut coefficients = Vec::with_capacity(config.cofactors.len());
        for cofactor in &config.cofactors {
            model.get_metabolite(&cofactor.metabolite)?;
            coefficients.push((cofactor.clone(), objective.coefficient(&cofactor.metabolite)));
        }
        Ok(ConstraintPerturbation {
            baseline: CofactorBaseline {
                reaction: objective.id.clone(),
                coefficients,
            },
            config,
        })
    }

    pub fn config(&self) -> &PerturbationConfig {
        &self.config
    }

    pub fn baseline(&self) -> &CofactorBaseline {
        &self.baseline
    }

    /// Apply a perturbation to `model`
    ///
    /// On error the model is left unchanged.
    pub fn apply(&self, model: &mut Model, perturbation: Perturbation) -> Result<(), ModelError> {
        match perturbation.kind {
            PerturbationKind::AtpDelta => self.apply_atp_delta(model, perturbation.value),
            PerturbationKind::AtpmFloor => self.apply_atpm_floor(model, perturbation.value),
            PerturbationKind::SalvageFloor => self.apply_salvage_floor(model, perturbation.value),
        }
    }

    /// Reset the cofactor coefficients to the snapshot, then shift them by `delta`
    fn apply_atp_delta(&self, model: &mut Model, delta: f64) -> Result<(), ModelError> {
        let reaction = self.baseline.reaction.as_str();
        model.get_reaction(reaction)?;
        for (cofactor, original) in &self.baseline.coefficients {
            model.get_metabolite(&cofactor.metabolite)?;
            let shifted = original + delta;
            if !shifted.is_finite() {
                return Err(ModelError::InvalidCoefficient {
                    reaction: reaction.to_string(),
                    metabolite: cofactor.metabolite.clone(),
                    coefficient: shifted,
                });
            }
        }
        for (cofactor, original) in &self.baseline.coefficients {
            let shift = match cofactor.side {
                CofactorSide::Consumed => -delta,
                CofactorSide::Produced => delta,
            };
            model.add_stoichiometry(
                reaction,
                &cofactor.metabolite,
                *original,
                StoichiometryMode::Replace,
            )?;
            model.add_stoichiometry(
                reaction,
                &cofactor.metabolite,
                shift,
                StoichiometryMode::Accumulate,
            )?;
        }
        Ok(())
    }

    fn apply_atpm_floor(&self, model: &mut Model, floor: f64) -> Result<(), ModelError> {
        let maintenance = &self.config.maintenance_reaction;
        let id = model
            .find_reaction_ignore_case(maintenance)
            .ok_or_else(|| ModelError::ReactionNotFound(maintenance.clone()))?
            .id
            .clone();
        model.set_lower_bound(&id, floor)
    }

    fn apply_salvage_floor(&self, model: &mut Model, flux: f64) -> Result<(), ModelError> {
        let lower_bound = -flux;
        let mut present = Vec::with_capacity(self.config.salvage_reactions.len());
        for id in &self.config.salvage_reactions {
            match model.get_reaction(id) {
                Ok(reaction) => {
                    check_bounds(id, lower_bound, reaction.upper_bound)?;
                    present.push(id.as_str());
                }
                Err(_) => debug!("Salvage reaction {} not in model, skipping", id),
            }
        }
        for id in present {
            model.set_lower_bound(id, lower_bound)?;
        }
        Ok(())
    }
}

//! Module providing JSON IO for Models, media and perturbation configurations
use std::fs;
use std::path::Path;

use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use thiserror::Error;

use crate::medium::Medium;
use crate::metabolic_model::metabolite::Metabolite;
use crate::metabolic_model::model::{Model, ModelError};
use crate::metabolic_model::reaction::{Reaction, ReactionBuilder, ReactionBuilderError};
use crate::perturbation::PerturbationConfig;

// region JSON Model
/// Represents a JSON serialized model, used for reading and writing models in json format
///
/// Genes, GPR rules, notes and annotations are not kept on the Model. The genes and
/// gene_reaction_rule keys are still written (empty) so the output loads in COBRA tools.
#[derive(Serialize, Deserialize)]
struct JsonModel {
    metabolites: Vec<JsonMetabolite>,
    reactions: Vec<JsonReaction>,
    #[serde(default)]
    genes: Vec<Value>,
    id: Option<String>,
    compartments: Option<IndexMap<String, String>>,
    version: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct JsonMetabolite {
    id: String,
    name: Option<String>,
    compartment: Option<String>,
    charge: Option<i32>,
    formula: Option<String>,
}

#[derive(Serialize, Deserialize)]
struct JsonReaction {
    id: String,
    name: Option<String>,
    metabolites: IndexMap<String, f64>,
    lower_bound: f64,
    upper_bound: f64,
    #[serde(default)]
    gene_reaction_rule: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    objective_coefficient: Option<f64>,
    subsystem: Option<String>,
}
// endregion JSON Model

// region Conversions
impl From<JsonMetabolite> for Metabolite {
    fn from(m: JsonMetabolite) -> Self {
        Self {
            id: m.id,
            name: m.name,
            compartment: m.compartment,
            charge: m.charge.unwrap_or_default(),
            formula: m.formula,
        }
    }
}

impl From<Metabolite> for JsonMetabolite {
    fn from(m: Metabolite) -> Self {
        Self {
            id: m.id,
            name: m.name,
            compartment: m.compartment,
            charge: Some(m.charge),
            formula: m.formula,
        }
    }
}

impl TryFrom<JsonReaction> for Reaction {
    type Error = ReactionBuilderError;

    fn try_from(r: JsonReaction) -> Result<Self, Self::Error> {
        ReactionBuilder::default()
            .id(r.id)
            .metabolites(r.metabolites)
            .name(r.name)
            .lower_bound(r.lower_bound)
            .upper_bound(r.upper_bound)
            .subsystem(r.subsystem)
            .build()
    }
}

impl Model {
    /// Read a model from a COBRA JSON file
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Model, JsonError> {
        let model_str = match fs::read_to_string(path) {
            Ok(data) => data,
            Err(err) => return Err(JsonError::UnableToRead(format!("{:?}", err))),
        };
        Model::from_json_str(&model_str)
    }

    /// Parse a model from a COBRA JSON string
    ///
    /// The objective is the first reaction with a non-zero objective coefficient, a model
    /// without one is loaded with no objective set.
    pub fn from_json_str(model_str: &str) -> Result<Model, JsonError> {
        let json_model = match serde_json::from_str::<JsonModel>(model_str) {
            Ok(model) => model,
            Err(err) => return Err(JsonError::UnableToParse(format!("{:?}", err))),
        };
        Model::from_json(json_model)
    }

    pub fn write_json<P: AsRef<Path>>(&self, path: P) -> Result<(), JsonError> {
        let model_string = self.to_json_string()?;
        fs::write(path, model_string)?;
        Ok(())
    }

    /// Serialize the model to a COBRA JSON string
    pub fn to_json_string(&self) -> Result<String, JsonError> {
        Ok(serde_json::to_string(&self.to_json())?)
    }

    fn from_json(json_model: JsonModel) -> Result<Self, JsonError> {
        let mut model = Model::new_empty();
        model.id = json_model.id;
        model.compartments = json_model.compartments;
        model.version = json_model.version;
        for m in json_model.metabolites {
            model.add_metabolite(Metabolite::from(m))?;
        }
        let mut objective: Option<String> = None;
        for rxn in json_model.reactions {
            if objective.is_none() && rxn.objective_coefficient.is_some_and(|c| c != 0.) {
                objective = Some(rxn.id.clone());
            }
            model.add_reaction(Reaction::try_from(rxn)?)?;
        }
        if let Some(reaction_id) = objective {
            model.set_objective(&reaction_id)?;
        }
        Ok(model)
    }

    fn to_json(&self) -> JsonModel {
        let json_metabolites: Vec<JsonMetabolite> =
            self.metabolites().map(|m| m.clone().into()).collect();
        let json_reactions: Vec<JsonReaction> = self
            .reactions()
            .map(|r| {
                let coef = self.objective_coefficient(&r.id);
                JsonReaction {
                    id: r.id.clone(),
                    name: r.name.clone(),
                    metabolites: r.metabolites.clone(),
                    lower_bound: r.lower_bound,
                    upper_bound: r.upper_bound,
                    gene_reaction_rule: String::new(),
                    objective_coefficient: (coef != 0.).then_some(coef),
                    subsystem: r.subsystem.clone(),
                }
            })
            .collect();
        JsonModel {
            metabolites: json_metabolites,
            reactions: json_reactions,
            genes: Vec::new(),
            id: self.id.clone(),
            compartments: self.compartments.clone(),
            version: self.version.clone(),
        }
    }
}
// endregion Conversions

// region Configuration files
/// Read any serde deserializable value from a JSON file
fn read_json_file<T: DeserializeOwned, P: AsRef<Path>>(path: P) -> Result<T, JsonError> {
    let data = match fs::read_to_string(path) {
        Ok(data) => data,
        Err(err) => return Err(JsonError::UnableToRead(format!("{:?}", err))),
    };
    Ok(serde_json::from_str(&data)?)
}

impl Medium {
    /// Read a medium from a JSON object of `{exchange id: lower bound}`
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<Medium, JsonError> {
        read_json_file(path)
    }
}

impl PerturbationConfig {
    /// Read a perturbation configuration, fields left out take their default values
    pub fn read_json<P: AsRef<Path>>(path: P) -> Result<PerturbationConfig, JsonError> {
        read_json_file(path)
    }
}
// endregion Configuration files

#[derive(Error, Debug)]
pub enum JsonError {
    #[error("Unable to read file due to {0}")]
    UnableToRead(String),
    #[error("Unable to parse json due to {0}")]
    UnableToParse(String),
    #[error("Unable to build reaction")]
    UnableToBuildReaction(#[from] ReactionBuilderError),
    #[error("Invalid model: {0}")]
    InvalidModel(#[from] ModelError),
    #[error("Serde json parse error")]
    SerdeJsonParseError(#[from] serde_json::Error),
    #[error("Unable to write to file")]
    UnableToWrite(#[from] std::io::Error),
}

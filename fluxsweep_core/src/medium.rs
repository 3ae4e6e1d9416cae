//! Growth media, expressed as the uptake bounds of exchange reactions
use indexmap::IndexMap;
use log::debug;
use serde::{Deserialize, Serialize};

use crate::metabolic_model::model::{Model, ModelError};
use crate::presets::{
    ECOLI_MINIMAL_MEDIUM, GLUCOSE_EXCHANGE, GLUCOSE_UPTAKE, MINIMAL_MEDIUM_UPTAKE,
};

/// Map of exchange reaction ids to the lower bound they are opened at
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Medium {
    uptake: IndexMap<String, f64>,
}

impl Medium {
    pub fn new() -> Self {
        Medium::default()
    }

    /// Glucose minimal medium for iML1515, glucose uptake limited to 10
    pub fn ecoli_minimal() -> Self {
        ECOLI_MINIMAL_MEDIUM
            .iter()
            .map(|id| (id.to_string(), MINIMAL_MEDIUM_UPTAKE))
            .collect::<Medium>()
            .with_uptake(GLUCOSE_EXCHANGE, GLUCOSE_UPTAKE)
    }

    /// Open (or re-open) an exchange at `lower_bound`
    pub fn with_uptake(mut self, reaction_id: &str, lower_bound: f64) -> Self {
        self.uptake.insert(reaction_id.to_string(), lower_bound);
        self
    }

    pub fn get(&self, reaction_id: &str) -> Option<f64> {
        self.uptake.get(reaction_id).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, f64)> {
        self.uptake.iter().map(|(id, lb)| (id.as_str(), *lb))
    }

    pub fn len(&self) -> usize {
        self.uptake.len()
    }

    pub fn is_empty(&self) -> bool {
        self.uptake.is_empty()
    }
}

impl FromIterator<(String, f64)> for Medium {
    fn from_iter<T: IntoIterator<Item = (String, f64)>>(iter: T) -> Self {
        Medium {
            uptake: iter.into_iter().collect(),
        }
    }
}

/// Close every exchange reaction, then open the ones listed in `medium`
///
/// Medium entries the model doesn't have are skipped. If any bound would end up above its
/// reaction's upper bound an error is returned and the model is left as it was.
pub fn apply_minimal_medium(model: &mut Model, medium: &Medium) -> Result<(), ModelError> {
    let mut working = model.clone();
    let exchange_ids: Vec<String> = working.exchanges().iter().map(|r| r.id.clone()).collect();
    for id in &exchange_ids {
        working.set_lower_bound(id, 0.)?;
    }
    for (id, lower_bound) in medium.iter() {
        if working.contains_reaction(id) {
            working.set_lower_bound(id, lower_bound)?;
        } else {
            debug!("Medium component {} not in model, skipping", id);
        }
    }
    *model = working;
    Ok(())
}

//! Module for reading and writing models, configuration and sweep results
pub mod json;
pub mod table;

//! Constraint based sweeps of metabolic models under ATP stress.
//!
//! A [`sweep::SweepBaseline`] holds a read-only model. Every point of a sweep clones it,
//! applies a [`perturbation::Perturbation`] (extra ATP cost per unit biomass, a forced
//! maintenance flux, or a purine salvage import capacity) and solves the flux balance
//! problem with an [`optimize::solvers::LpSolver`].

pub mod configuration;
pub mod io;
pub mod medium;
pub mod metabolic_model;
pub mod optimize;
pub mod perturbation;
pub mod presets;
pub mod sweep;

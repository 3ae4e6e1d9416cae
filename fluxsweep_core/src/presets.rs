//! Reaction ids, media and sweep grids used for the ATP stress analyses of E. coli iML1515
//! and Buchnera iLG240

/// Core biomass reaction of iML1515
pub const ECOLI_BIOMASS: &str = "BIOMASS_Ec_iML1515_core_75p37M";

/// Biomass reaction of iLG240
pub const BUCHNERA_BIOMASS: &str = "BIOMASS";

/// Exchanges opened by the glucose minimal medium
pub const ECOLI_MINIMAL_MEDIUM: [&str; 19] = [
    "EX_glc__D_e",
    "EX_nh4_e",
    "EX_pi_e",
    "EX_so4_e",
    "EX_h2o_e",
    "EX_h_e",
    "EX_k_e",
    "EX_na1_e",
    "EX_cl_e",
    "EX_mg2_e",
    "EX_ca2_e",
    "EX_fe2_e",
    "EX_mn2_e",
    "EX_zn2_e",
    "EX_cobalt2_e",
    "EX_mobd_e",
    "EX_cu2_e",
    "EX_ni2_e",
    "EX_o2_e",
];

/// Uptake bound of the minimal medium components
pub const MINIMAL_MEDIUM_UPTAKE: f64 = -1000.;

/// The carbon source of the minimal medium
pub const GLUCOSE_EXCHANGE: &str = "EX_glc__D_e";

/// Glucose uptake limit of the minimal medium
pub const GLUCOSE_UPTAKE: f64 = -10.;

/// Extra ATP per unit biomass
pub const ATP_DELTA_GRID: [f64; 18] = [
    0., 5., 10., 20., 50., 80., 100., 160., 200., 250., 300., 400., 500., 600., 700., 800.,
    900., 1000.,
];

/// Forced maintenance fluxes used together with the salvage modes
pub const ATPM_GRID: [f64; 11] = [0., 10., 20., 30., 50., 80., 100., 150., 200., 250., 300.];

/// Forced maintenance fluxes of the standalone ATP drain sweeps
pub const ATPM_DRAIN_GRID: [f64; 10] = [0., 5., 10., 20., 40., 80., 160., 300., 600., 1000.];

/// Barely any purine salvage import
pub const LOW_SALVAGE: f64 = 1.;

/// Effectively unconstrained purine salvage import
pub const HIGH_SALVAGE: f64 = 1000.;

/// The low and high salvage modes, labelled for output tables
pub const SALVAGE_MODES: [(&str, f64); 2] = [("low_salvage", LOW_SALVAGE), ("high_salvage", HIGH_SALVAGE)];

//! Physical and mathematical constants.

/// Floating-point precision to use for constants.
#[allow(non_camel_case_types)]
pub type fcn = f64;

// Mathematical constants

pub const PI: fcn = 3.141_592_653_589_793;
/// Square root of two.
pub const SQRT_2: fcn = 1.414_213_562_373_095_1;
/// Square root of Euler's number.
pub const SQRT_E: fcn = 1.648_721_270_700_128_2;
/// Natural logarithm of ten.
pub const LOG_10: fcn = 2.302_585_092_994_046;

// Physical constants

/// Fine-structure constant.
pub const ALPHA: fcn = 7.297_352_566_4e-3;
/// Classical electron radius [cm].
pub const R_ELECTRON: fcn = 2.817_940_322_7e-13;
/// Electron mass [MeV].
pub const M_ELECTRON: fcn = 0.510_998_946_1;
/// Muon mass [MeV].
pub const M_MUON: fcn = 105.658_374_5;
/// Tau mass [MeV].
pub const M_TAU: fcn = 1776.86;
/// Proton mass [MeV].
pub const M_PROTON: fcn = 938.272_081_3;
/// Charged pion mass [MeV].
pub const M_PION: fcn = 139.570_39;
/// Muon lifetime [ns].
pub const TAU_MUON: fcn = 2196.981_1;
/// Tau lifetime [ns].
pub const TAU_TAU: fcn = 2.903e-4;
/// Speed of light in vacuum [cm/ns].
pub const CLIGHT: fcn = 29.979_245_8;
/// Avogadro constant [1/mol].
pub const N_AVOGADRO: fcn = 6.022_140_857e23;
/// Bethe-Bloch prefactor `4 pi N_A r_e^2 m_e` [MeV cm^2/mol].
pub const IONIZATION_K: fcn = 0.307_075;

// Transport resolution constants

/// Distance below which two particle positions are considered equal [cm].
pub const PARTICLE_POSITION_RESOLUTION: fcn = 1e-3;
/// Distance below which a position is snapped onto a geometry surface [cm].
pub const GEOMETRY_PRECISION: fcn = 1e-9;

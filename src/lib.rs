//! The `overburden` crate simulates the passage of high-energy charged
//! leptons through layered matter with Monte Carlo methods.
pub mod config;
pub mod constants;
pub mod crosssection;
pub mod density;
pub mod error;
pub mod geometry;
pub mod interpolation;
pub mod io;
pub mod math;
pub mod medium;
pub mod particle;
pub mod propagation;
pub mod random;
pub mod scattering;
pub mod utility;

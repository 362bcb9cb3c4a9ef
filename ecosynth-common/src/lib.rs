//! # EcoSynth Common Library
//!
//! Shared code for the EcoSynth backend:
//! - Common error type
//! - Configuration loading (TOML + environment overrides)
//! - Geospatial primitives (coordinates, great-circle distance,
//!   administrative region boundaries and point-in-polygon lookup)

pub mod config;
pub mod error;
pub mod geo;

pub use error::{Error, Result};

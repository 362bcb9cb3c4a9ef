//! Submission admissibility validators

pub mod proximity;

pub use proximity::{AdmissibilityError, ProximityValidator};

//! HTTP API handlers, one module per route group

pub mod analysis;
pub mod eco_scores;
pub mod health;
pub mod predictions;
pub mod projects;
pub mod submissions;
pub mod threats;
pub mod weather;

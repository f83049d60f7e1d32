//! Quality framework: the content gate and shared text utilities.

pub mod gates;
pub mod text;

pub use gates::{strategist_guard, QualityGate, QualityReport, QualityViolation};

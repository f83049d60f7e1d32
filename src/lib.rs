//! wavepress - automated editorial pipeline for a small publication.
//!
//! One run selects an uncovered topic from a weighted pool, assigns the
//! pillar's format strategy, gates externally drafted content for quality
//! and cadence, and commits the accepted draft to a file-backed post
//! store. The library exposes every stage so the pipeline can be driven
//! and tested without the CLI.

pub mod logging;
pub mod pipeline;
pub mod publisher;
pub mod quality;
pub mod rules;
pub mod schedule;
pub mod settings;
pub mod store;
pub mod strategy;
pub mod topics;

//! The weighted topic pool.
//!
//! The pool is static editorial configuration: pillars (thematic buckets)
//! with a selection weight and a list of candidate titles. Consumption is
//! tracked implicitly against the post archive, never by mutating the
//! pool, so retiring a published post makes its topic eligible again.

pub mod selector;

pub use selector::{NoFreshTopics, ResearchResult, TopicSelector};

use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Topic pool file name inside the data directory.
pub const POOL_FILE_NAME: &str = "topics.json";

/// Errors from loading the topic pool.
#[derive(Error, Debug)]
pub enum TopicError {
    #[error("topic pool not found: {0}")]
    NotFound(String),

    #[error("topic pool IO error: {0}")]
    Io(io::Error),

    #[error("topic pool contains invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),
}

/// One thematic bucket of candidate titles.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Pillar {
    /// Relative draw weight applied to every topic in this pillar. A
    /// weight of zero parks the pillar without deleting it.
    pub weight: u32,
    /// Candidate post titles.
    pub topics: Vec<String>,
}

/// The full topic catalog, keyed by pillar name.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TopicPool {
    #[serde(default)]
    pub pillars: BTreeMap<String, Pillar>,
}

impl TopicPool {
    /// Load the pool from a JSON file.
    ///
    /// # Errors
    ///
    /// A missing file is reported as [`TopicError::NotFound`] so callers
    /// can point the operator at scaffolding instead of a bare IO error.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TopicError> {
        let path = path.as_ref();
        match fs::read_to_string(path) {
            Ok(content) => Ok(serde_json::from_str(&content)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                Err(TopicError::NotFound(path.display().to_string()))
            }
            Err(e) => Err(TopicError::Io(e)),
        }
    }

    /// Total number of candidate titles across all pillars.
    pub fn len(&self) -> usize {
        self.pillars.values().map(|p| p.topics.len()).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Name of the pillar containing the given topic title, matched
    /// case-insensitively.
    pub fn pillar_of(&self, topic: &str) -> Option<&str> {
        let needle = topic.to_lowercase();
        self.pillars.iter().find_map(|(name, pillar)| {
            pillar
                .topics
                .iter()
                .any(|t| t.to_lowercase() == needle)
                .then_some(name.as_str())
        })
    }
}

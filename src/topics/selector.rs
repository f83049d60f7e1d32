//! Weighted topic selection against publication history.
//!
//! The selector is the "researcher" stage of the pipeline: it draws one
//! topic the publication has not covered yet, favoring heavier pillars.
//! It never mutates the pool; a topic counts as used purely because a
//! stored post already carries its title.

use std::collections::HashSet;

use rand::Rng;
use thiserror::Error;

use super::TopicPool;
use crate::store::Post;

/// Confidence label attached to every selection. Fixed until the selector
/// grows a real ranking signal.
const CONFIDENCE_LABEL: &str = "high";

/// Every candidate in the pool is already covered by the archive.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no fresh topics left in the pool; add topics or retire old posts")]
pub struct NoFreshTopics;

/// A selected topic with its provenance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResearchResult {
    pub topic: String,
    pub pillar: String,
    pub confidence: String,
}

/// Draws one unused topic from a weighted pool.
pub struct TopicSelector<'a> {
    pool: &'a TopicPool,
}

impl<'a> TopicSelector<'a> {
    pub fn new(pool: &'a TopicPool) -> Self {
        Self { pool }
    }

    /// Select one topic not present in the archive history.
    ///
    /// Each candidate's draw weight is its pillar's weight; the draw walks
    /// a cumulative weight table, so a pillar at weight 3 is three times
    /// as likely per topic as one at weight 1. Zero-weight pillars are
    /// skipped entirely. Titles are compared case-insensitively.
    ///
    /// # Errors
    ///
    /// Returns [`NoFreshTopics`] when the pool is empty, fully consumed,
    /// or only zero-weight candidates remain.
    pub fn select<R: Rng + ?Sized>(
        &self,
        history: &[Post],
        rng: &mut R,
    ) -> Result<ResearchResult, NoFreshTopics> {
        let used: HashSet<String> = history.iter().map(|p| p.title.to_lowercase()).collect();

        let mut candidates: Vec<(&str, &str)> = Vec::new();
        let mut cumulative: Vec<u64> = Vec::new();
        let mut total: u64 = 0;
        for (name, pillar) in &self.pool.pillars {
            if pillar.weight == 0 {
                continue;
            }
            for topic in &pillar.topics {
                if used.contains(&topic.to_lowercase()) {
                    continue;
                }
                total += u64::from(pillar.weight);
                candidates.push((topic.as_str(), name.as_str()));
                cumulative.push(total);
            }
        }

        if total == 0 {
            return Err(NoFreshTopics);
        }

        let draw = rng.random_range(0..total);
        let index = cumulative.partition_point(|&end| end <= draw);
        let (topic, pillar) = candidates[index];

        Ok(ResearchResult {
            topic: topic.to_string(),
            pillar: pillar.to_string(),
            confidence: CONFIDENCE_LABEL.to_string(),
        })
    }
}

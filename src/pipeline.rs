// The editorial pipeline: one run from topic selection to publication.
// Stage order is fixed: selector, strategist, quality gate, strategist
// guard, scheduler gate, settings branch, publisher. Gates run strictly
// before any write, so a rejected run leaves the archives untouched.

use chrono::{DateTime, Local};
use rand::Rng;
use thiserror::Error;
use tracing::{debug, info};

use crate::publisher::Publisher;
use crate::quality::{strategist_guard, QualityGate, QualityReport};
use crate::rules::PipelineRules;
use crate::schedule::{ScheduleError, ScheduleGate};
use crate::settings::AutomationSettings;
use crate::store::{Draft, Post, StoreError, StoreManager};
use crate::strategy::strategy_for;
use crate::topics::{NoFreshTopics, TopicPool, TopicSelector};

/// Why a run stopped before a commit.
#[derive(Error, Debug)]
pub enum PipelineError {
    #[error(transparent)]
    NoFreshTopics(#[from] NoFreshTopics),

    #[error("quality gate rejected the draft: {0}")]
    QualityRejected(QualityReport),

    #[error(transparent)]
    Schedule(#[from] ScheduleError),

    #[error("emergency stop is engaged, run aborted")]
    EmergencyStop,

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// What a completed run did.
#[derive(Debug, Clone, PartialEq)]
pub enum RunOutcome {
    /// A post was committed to the post archive.
    Published(Post),
    /// Manual-only mode routed the accepted draft to the review queue.
    Drafted(Draft),
    /// Automation is disabled; the run completed without writing.
    SkippedDisabled,
}

/// Caller-provided inputs for one run.
#[derive(Debug, Clone)]
pub struct RunRequest {
    /// Drafted content. The pipeline judges it; it never generates it.
    pub content: String,
    /// Preselected title. Bypasses the selector but none of the gates.
    pub topic: Option<String>,
}

/// Run the pipeline once, to completion or first gate failure.
///
/// `now` is captured once by the caller and threaded through every
/// time-dependent stage, so the cadence decision and the stored
/// timestamp can never disagree. The RNG is injected for the same
/// reason: callers that need reproducible runs pass a seeded one.
pub fn run_once<R: Rng + ?Sized>(
    store: &StoreManager,
    pool: &TopicPool,
    settings: &AutomationSettings,
    rules: &PipelineRules,
    request: &RunRequest,
    now: DateTime<Local>,
    rng: &mut R,
) -> Result<RunOutcome, PipelineError> {
    let archive = store.load_posts()?;

    // Researcher stage, skipped when the caller pinned a topic.
    let (title, pillar) = match &request.topic {
        Some(topic) => {
            let pillar = pool.pillar_of(topic).map(str::to_string);
            debug!(topic = %topic, "using caller-provided topic");
            (topic.clone(), pillar)
        }
        None => {
            let research = TopicSelector::new(pool).select(&archive.posts, rng)?;
            info!(
                topic = %research.topic,
                pillar = %research.pillar,
                confidence = %research.confidence,
                "topic selected"
            );
            (research.topic, Some(research.pillar))
        }
    };

    let strategy = strategy_for(pillar.as_deref());
    info!(
        strategy = strategy.name,
        min_words = strategy.min_words,
        "format strategy assigned"
    );

    let report = QualityGate::new(&rules.quality).review(&title, &request.content, &archive.posts);
    if !report.passed() {
        return Err(PipelineError::QualityRejected(report));
    }

    if let Some(violation) = strategist_guard(&request.content, &strategy) {
        return Err(PipelineError::QualityRejected(QualityReport::from_violation(
            violation,
        )));
    }

    ScheduleGate::new(&rules.schedule).check(now, &archive.posts)?;

    // Settings branch. The kill switch outranks everything else.
    if settings.emergency_stop {
        return Err(PipelineError::EmergencyStop);
    }
    if !settings.enabled {
        info!("automation disabled, accepted draft not committed");
        return Ok(RunOutcome::SkippedDisabled);
    }

    let publisher = Publisher::new(store);
    if settings.manual_only {
        let draft = publisher.draft(&title, &request.content, now)?;
        return Ok(RunOutcome::Drafted(draft));
    }

    let post = publisher.publish(&title, &request.content, pillar, now)?;
    Ok(RunOutcome::Published(post))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topics::Pillar;
    use chrono::TimeZone;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use tempfile::TempDir;

    fn pool() -> TopicPool {
        let mut pool = TopicPool::default();
        pool.pillars.insert(
            "Tech".to_string(),
            Pillar {
                weight: 3,
                topics: vec!["Edge Computing in 2026".to_string()],
            },
        );
        pool
    }

    fn content(words: usize) -> String {
        let hook = "Edge computing quietly rewired how production teams think about latency budgets and failure domains this year.";
        let filler = "signal ".repeat(words.saturating_sub(16));
        format!("<p>{}</p><p>{}</p>", hook, filler.trim_end())
    }

    fn in_window() -> DateTime<Local> {
        Local.with_ymd_and_hms(2026, 8, 22, 14, 0, 0).unwrap()
    }

    #[test]
    fn test_gates_run_before_settings_branch() {
        // Emergency stop is set, but the draft is also too thin; the
        // quality verdict must win because gates precede the branch.
        let temp = TempDir::new().unwrap();
        let store = StoreManager::new(temp.path()).unwrap();
        let settings = AutomationSettings {
            emergency_stop: true,
            ..AutomationSettings::default()
        };
        let request = RunRequest {
            content: content(100),
            topic: None,
        };
        let mut rng = StdRng::seed_from_u64(1);

        let result = run_once(
            &store,
            &pool(),
            &settings,
            &PipelineRules::default(),
            &request,
            in_window(),
            &mut rng,
        );
        assert!(matches!(result, Err(PipelineError::QualityRejected(_))));
    }

    #[test]
    fn test_strategist_guard_runs_after_base_gate() {
        // 700 words passes the 600-word base gate, then fails the Tech
        // format's 900-word guard.
        let temp = TempDir::new().unwrap();
        let store = StoreManager::new(temp.path()).unwrap();
        let request = RunRequest {
            content: content(700),
            topic: None,
        };
        let mut rng = StdRng::seed_from_u64(1);

        let result = run_once(
            &store,
            &pool(),
            &AutomationSettings::default(),
            &PipelineRules::default(),
            &request,
            in_window(),
            &mut rng,
        );
        match result {
            Err(PipelineError::QualityRejected(report)) => {
                assert_eq!(report.violations.len(), 1);
                assert_eq!(report.violations[0].label(), "InsufficientLength");
            }
            other => panic!("expected quality rejection, got {:?}", other),
        }
    }

    #[test]
    fn test_pinned_topic_outside_pool_uses_fallback_strategy() {
        // An off-pool topic has no pillar, so the Shift format (750
        // words) applies and 800 words clears every gate.
        let temp = TempDir::new().unwrap();
        let store = StoreManager::new(temp.path()).unwrap();
        let request = RunRequest {
            content: content(800),
            topic: Some("A Title Nobody Pooled".to_string()),
        };
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = run_once(
            &store,
            &pool(),
            &AutomationSettings::default(),
            &PipelineRules::default(),
            &request,
            in_window(),
            &mut rng,
        )
        .unwrap();

        match outcome {
            RunOutcome::Published(post) => {
                assert_eq!(post.title, "A Title Nobody Pooled");
                assert_eq!(post.pillar, None);
            }
            other => panic!("expected a published post, got {:?}", other),
        }
    }

    #[test]
    fn test_emergency_stop_aborts_after_gates_pass() {
        let temp = TempDir::new().unwrap();
        let store = StoreManager::new(temp.path()).unwrap();
        let settings = AutomationSettings {
            emergency_stop: true,
            ..AutomationSettings::default()
        };
        let request = RunRequest {
            content: content(900),
            topic: None,
        };
        let mut rng = StdRng::seed_from_u64(1);

        let result = run_once(
            &store,
            &pool(),
            &settings,
            &PipelineRules::default(),
            &request,
            in_window(),
            &mut rng,
        );
        assert!(matches!(result, Err(PipelineError::EmergencyStop)));
        assert!(store.load_posts().unwrap().posts.is_empty());
        assert!(store.load_drafts().unwrap().drafts.is_empty());
    }

    #[test]
    fn test_emergency_stop_outranks_disabled_and_manual_only() {
        let temp = TempDir::new().unwrap();
        let store = StoreManager::new(temp.path()).unwrap();
        let settings = AutomationSettings {
            enabled: false,
            manual_only: true,
            emergency_stop: true,
        };
        let request = RunRequest {
            content: content(900),
            topic: None,
        };
        let mut rng = StdRng::seed_from_u64(1);

        let result = run_once(
            &store,
            &pool(),
            &settings,
            &PipelineRules::default(),
            &request,
            in_window(),
            &mut rng,
        );
        assert!(matches!(result, Err(PipelineError::EmergencyStop)));
    }

    #[test]
    fn test_disabled_automation_is_a_clean_no_op() {
        let temp = TempDir::new().unwrap();
        let store = StoreManager::new(temp.path()).unwrap();
        let settings = AutomationSettings {
            enabled: false,
            ..AutomationSettings::default()
        };
        let request = RunRequest {
            content: content(900),
            topic: None,
        };
        let mut rng = StdRng::seed_from_u64(1);

        let outcome = run_once(
            &store,
            &pool(),
            &settings,
            &PipelineRules::default(),
            &request,
            in_window(),
            &mut rng,
        )
        .unwrap();
        assert_eq!(outcome, RunOutcome::SkippedDisabled);
        assert!(store.load_posts().unwrap().posts.is_empty());
    }
}

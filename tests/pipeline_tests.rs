//! End-to-end pipeline tests over a real data directory
//!
//! Each test drives `run_once` exactly the way the binary does: archives
//! on disk, a seeded RNG, and a fixed clock, then asserts on both the
//! returned outcome and the files left behind.

use chrono::{DateTime, Local, TimeZone};
use rand::rngs::StdRng;
use rand::SeedableRng;
use tempfile::TempDir;

use wavepress::pipeline::{run_once, PipelineError, RunOutcome, RunRequest};
use wavepress::rules::PipelineRules;
use wavepress::schedule::ScheduleError;
use wavepress::settings::AutomationSettings;
use wavepress::store::{Post, PostArchive, StoreManager};
use wavepress::topics::{Pillar, TopicPool};

/// A pool with one Tech pillar and the given candidate titles.
fn tech_pool(topics: &[&str]) -> TopicPool {
    let mut pool = TopicPool::default();
    pool.pillars.insert(
        "Tech".to_string(),
        Pillar {
            weight: 3,
            topics: topics.iter().map(|t| t.to_string()).collect(),
        },
    );
    pool
}

/// A draft whose opening paragraph clears the hook gate and whose body
/// pads out to exactly `words` words once the markup is stripped.
fn draft_with(words: usize) -> String {
    let hook = "Edge computing quietly rewired how production teams think about latency budgets and failure domains this year.";
    let filler = "signal ".repeat(words.saturating_sub(16));
    format!("<p>{}</p>\n<p>{}</p>", hook, filler.trim_end())
}

/// A local clock fixed to 2026-08-22 at the given time.
fn at(hour: u32, minute: u32) -> DateTime<Local> {
    Local.with_ymd_and_hms(2026, 8, 22, hour, minute, 0).unwrap()
}

fn published_post(title: &str, slug: &str, date: &str) -> Post {
    Post {
        id: format!("post-{}", slug),
        title: title.to_string(),
        slug: slug.to_string(),
        excerpt: String::new(),
        content: String::new(),
        pillar: Some("Tech".to_string()),
        published: true,
        date: date.to_string(),
        image: None,
    }
}

fn request(content: String) -> RunRequest {
    RunRequest {
        content,
        topic: None,
    }
}

// ============================================================================
// Publishing a fresh topic
// ============================================================================

#[test]
fn test_run_publishes_and_persists_the_post() {
    let temp = TempDir::new().unwrap();
    let store = StoreManager::new(temp.path()).unwrap();
    let pool = tech_pool(&["Edge Computing in 2026"]);
    let mut rng = StdRng::seed_from_u64(7);

    let outcome = run_once(
        &store,
        &pool,
        &AutomationSettings::default(),
        &PipelineRules::default(),
        &request(draft_with(950)),
        at(9, 0),
        &mut rng,
    )
    .unwrap();

    let post = match outcome {
        RunOutcome::Published(post) => post,
        other => panic!("expected a published post, got {:?}", other),
    };
    assert_eq!(post.title, "Edge Computing in 2026");
    assert_eq!(post.slug, "edge-computing-in-2026");
    assert_eq!(post.pillar.as_deref(), Some("Tech"));
    assert!(post.published);
    assert!(post.id.starts_with("post-"));
    assert!(post.date.starts_with("2026-08-22"));
    assert!(!post.excerpt.is_empty());
    assert!(post.excerpt.chars().count() <= 140);

    let archive = store.load_posts().unwrap();
    assert_eq!(archive.posts.len(), 1);
    assert_eq!(archive.posts[0], post);
    assert!(store.load_drafts().unwrap().drafts.is_empty());
}

#[test]
fn test_second_run_consumes_a_different_topic() {
    let temp = TempDir::new().unwrap();
    let store = StoreManager::new(temp.path()).unwrap();
    let pool = tech_pool(&["Edge Computing in 2026", "WebAssembly Beyond the Browser"]);
    let mut rng = StdRng::seed_from_u64(7);

    let first = match run_once(
        &store,
        &pool,
        &AutomationSettings::default(),
        &PipelineRules::default(),
        &request(draft_with(950)),
        at(9, 0),
        &mut rng,
    )
    .unwrap()
    {
        RunOutcome::Published(post) => post,
        other => panic!("expected a published post, got {:?}", other),
    };

    let second = match run_once(
        &store,
        &pool,
        &AutomationSettings::default(),
        &PipelineRules::default(),
        &request(draft_with(950)),
        at(14, 0),
        &mut rng,
    )
    .unwrap()
    {
        RunOutcome::Published(post) => post,
        other => panic!("expected a published post, got {:?}", other),
    };

    // Whichever title the first draw took, the second run must take the
    // other one; the archive is the consumption ledger.
    assert_ne!(second.title, first.title);

    let archive = store.load_posts().unwrap();
    assert_eq!(archive.posts.len(), 2);
    assert_eq!(archive.posts[0].title, second.title, "newest first");
}

// ============================================================================
// Cadence limits across a publishing day
// ============================================================================

#[test]
fn test_third_run_of_the_day_hits_the_daily_limit() {
    let temp = TempDir::new().unwrap();
    let store = StoreManager::new(temp.path()).unwrap();
    let pool = tech_pool(&[
        "Edge Computing in 2026",
        "WebAssembly Beyond the Browser",
        "Serverless Was Never About Servers",
    ]);
    let mut rng = StdRng::seed_from_u64(7);

    for hour in [9, 14] {
        run_once(
            &store,
            &pool,
            &AutomationSettings::default(),
            &PipelineRules::default(),
            &request(draft_with(950)),
            at(hour, 0),
            &mut rng,
        )
        .unwrap();
    }

    let result = run_once(
        &store,
        &pool,
        &AutomationSettings::default(),
        &PipelineRules::default(),
        &request(draft_with(950)),
        at(15, 0),
        &mut rng,
    );

    match result {
        Err(PipelineError::Schedule(ScheduleError::DailyLimitReached {
            published,
            limit,
            day,
        })) => {
            assert_eq!(published, 2);
            assert_eq!(limit, 2);
            assert_eq!(day, "2026-08-22");
        }
        other => panic!("expected the daily limit, got {:?}", other),
    }
    assert_eq!(store.load_posts().unwrap().posts.len(), 2);
}

#[test]
fn test_run_outside_every_window_is_held() {
    let temp = TempDir::new().unwrap();
    let store = StoreManager::new(temp.path()).unwrap();
    let pool = tech_pool(&["Edge Computing in 2026"]);
    let mut rng = StdRng::seed_from_u64(7);

    let result = run_once(
        &store,
        &pool,
        &AutomationSettings::default(),
        &PipelineRules::default(),
        &request(draft_with(950)),
        at(5, 30),
        &mut rng,
    );

    assert!(matches!(
        result,
        Err(PipelineError::Schedule(
            ScheduleError::OutsidePublishWindow { hour: 5 }
        ))
    ));
    assert!(!store.posts_path().exists());
}

// ============================================================================
// Quality rejection
// ============================================================================

#[test]
fn test_banned_phrase_blocks_the_run_before_any_write() {
    let temp = TempDir::new().unwrap();
    let store = StoreManager::new(temp.path()).unwrap();
    let pool = tech_pool(&["Edge Computing in 2026"]);
    let mut rng = StdRng::seed_from_u64(7);

    let content = format!(
        "{}\n<p>In this article we unpack the details.</p>",
        draft_with(950)
    );
    let result = run_once(
        &store,
        &pool,
        &AutomationSettings::default(),
        &PipelineRules::default(),
        &request(content),
        at(9, 0),
        &mut rng,
    );

    match result {
        Err(PipelineError::QualityRejected(report)) => {
            assert_eq!(report.violations.len(), 1);
            assert_eq!(report.violations[0].label(), "BannedPhraseDetected");
        }
        other => panic!("expected a quality rejection, got {:?}", other),
    }
    assert!(!store.posts_path().exists());
    assert!(!store.drafts_path().exists());
}

// ============================================================================
// Manual-only routing
// ============================================================================

#[test]
fn test_manual_only_routes_to_the_review_queue() {
    let temp = TempDir::new().unwrap();
    let store = StoreManager::new(temp.path()).unwrap();
    let pool = tech_pool(&["Edge Computing in 2026"]);
    let settings = AutomationSettings {
        manual_only: true,
        ..AutomationSettings::default()
    };
    let mut rng = StdRng::seed_from_u64(7);

    let outcome = run_once(
        &store,
        &pool,
        &settings,
        &PipelineRules::default(),
        &request(draft_with(950)),
        at(9, 0),
        &mut rng,
    )
    .unwrap();

    let draft = match outcome {
        RunOutcome::Drafted(draft) => draft,
        other => panic!("expected a queued draft, got {:?}", other),
    };
    assert!(draft.id.starts_with("draft-"));
    assert_eq!(draft.title, "Edge Computing in 2026");
    assert_eq!(draft.slug, "edge-computing-in-2026");

    assert_eq!(store.load_drafts().unwrap().drafts.len(), 1);
    assert!(store.load_posts().unwrap().posts.is_empty());
}

// ============================================================================
// Pool exhaustion and topic overrides
// ============================================================================

#[test]
fn test_exhausted_pool_stops_the_run() {
    let temp = TempDir::new().unwrap();
    let store = StoreManager::new(temp.path()).unwrap();
    let pool = tech_pool(&["Edge Computing in 2026"]);

    // Already covered, under a different capitalization.
    let mut archive = PostArchive::default();
    archive.push_front(published_post(
        "EDGE COMPUTING IN 2026",
        "edge-computing-in-2026",
        "2026-08-21T09:00:00+02:00",
    ));
    store.save_posts(&archive).unwrap();

    let mut rng = StdRng::seed_from_u64(7);
    let result = run_once(
        &store,
        &pool,
        &AutomationSettings::default(),
        &PipelineRules::default(),
        &request(draft_with(950)),
        at(9, 0),
        &mut rng,
    );
    assert!(matches!(result, Err(PipelineError::NoFreshTopics(_))));
}

#[test]
fn test_pinned_topic_runs_even_when_the_pool_is_spent() {
    let temp = TempDir::new().unwrap();
    let store = StoreManager::new(temp.path()).unwrap();
    let pool = tech_pool(&["Edge Computing in 2026"]);

    let mut archive = PostArchive::default();
    archive.push_front(published_post(
        "Edge Computing in 2026",
        "edge-computing-in-2026",
        "2026-08-21T09:00:00+02:00",
    ));
    store.save_posts(&archive).unwrap();

    let req = RunRequest {
        content: draft_with(800),
        topic: Some("Hand Picked Follow Up Story".to_string()),
    };
    let mut rng = StdRng::seed_from_u64(7);
    let outcome = run_once(
        &store,
        &pool,
        &AutomationSettings::default(),
        &PipelineRules::default(),
        &req,
        at(9, 0),
        &mut rng,
    )
    .unwrap();

    match outcome {
        RunOutcome::Published(post) => {
            assert_eq!(post.title, "Hand Picked Follow Up Story");
            assert_eq!(post.pillar, None, "off-pool topics carry no pillar");
        }
        other => panic!("expected a published post, got {:?}", other),
    }
}

#[test]
fn test_pinned_topic_still_faces_the_gates() {
    let temp = TempDir::new().unwrap();
    let store = StoreManager::new(temp.path()).unwrap();
    let pool = tech_pool(&["Edge Computing in 2026"]);

    let req = RunRequest {
        content: draft_with(800),
        topic: Some("Tiny".to_string()),
    };
    let mut rng = StdRng::seed_from_u64(7);
    let result = run_once(
        &store,
        &pool,
        &AutomationSettings::default(),
        &PipelineRules::default(),
        &req,
        at(9, 0),
        &mut rng,
    );

    match result {
        Err(PipelineError::QualityRejected(report)) => {
            assert_eq!(report.violations[0].label(), "WeakTitle");
        }
        other => panic!("expected a quality rejection, got {:?}", other),
    }
}

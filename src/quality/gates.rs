//! Quality gate for drafted content.
//!
//! The gate rejects a (title, content) pair that is too short, derivative,
//! weakly hooked, or carrying placeholder text, before any scheduling or
//! store write happens. Every check runs on every review and the report
//! collects all failures, so an operator fixes a draft in one pass instead
//! of replaying the gate check by check.

use std::fmt;

use crate::rules::QualityRules;
use crate::store::Post;
use crate::strategy::Strategy;

use super::text;

/// Phrases that mark meta-commentary or unfilled template text, matched
/// case-insensitively anywhere in the content.
const BANNED_PHRASES: &[&str] = &[
    "in this article",
    "this article will",
    "we will explore",
    "let us explore",
    "as an ai",
    "lorem ipsum",
    "[paste",
    "placeholder",
];

/// A single failed check, carrying what the gate measured.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QualityViolation {
    /// Trimmed title is shorter than the configured minimum.
    WeakTitle { length: usize, required: usize },
    /// A stored post already carries this title (case-insensitive).
    DuplicateTitle { title: String },
    /// Markup-stripped word count is below the required minimum.
    InsufficientLength { words: usize, required: usize },
    /// Opening paragraph is too short, or trails off into a colon.
    WeakHook {
        length: usize,
        required: usize,
        trailing_colon: bool,
    },
    /// Content contains a banned or placeholder phrase.
    BannedPhrase { phrase: String },
}

impl QualityViolation {
    /// Stable name of the failed check, for logs and summaries.
    pub fn label(&self) -> &'static str {
        match self {
            QualityViolation::WeakTitle { .. } => "WeakTitle",
            QualityViolation::DuplicateTitle { .. } => "DuplicateTitle",
            QualityViolation::InsufficientLength { .. } => "InsufficientLength",
            QualityViolation::WeakHook { .. } => "WeakHook",
            QualityViolation::BannedPhrase { .. } => "BannedPhraseDetected",
        }
    }
}

impl fmt::Display for QualityViolation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QualityViolation::WeakTitle { length, required } => write!(
                f,
                "weak title: {} characters, need at least {}",
                length, required
            ),
            QualityViolation::DuplicateTitle { title } => {
                write!(f, "duplicate title: \"{}\" is already published", title)
            }
            QualityViolation::InsufficientLength { words, required } => write!(
                f,
                "insufficient length: {} words, need at least {}",
                words, required
            ),
            QualityViolation::WeakHook {
                trailing_colon: true,
                ..
            } => write!(f, "weak hook: opening paragraph trails off into a colon"),
            QualityViolation::WeakHook {
                length, required, ..
            } => write!(
                f,
                "weak hook: opening paragraph is {} characters, need at least {}",
                length, required
            ),
            QualityViolation::BannedPhrase { phrase } => {
                write!(f, "banned phrase detected: \"{}\"", phrase)
            }
        }
    }
}

/// Outcome of one full review. Empty violations means the draft passed.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct QualityReport {
    pub violations: Vec<QualityViolation>,
}

impl QualityReport {
    pub fn passed(&self) -> bool {
        self.violations.is_empty()
    }

    /// Wrap a single violation, for checks layered on top of the base
    /// review.
    pub fn from_violation(violation: QualityViolation) -> Self {
        Self {
            violations: vec![violation],
        }
    }
}

impl fmt::Display for QualityReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.violations.is_empty() {
            return write!(f, "all checks passed");
        }
        for (i, violation) in self.violations.iter().enumerate() {
            if i > 0 {
                write!(f, "; ")?;
            }
            write!(f, "{}", violation)?;
        }
        Ok(())
    }
}

/// The quality gate, configured from pipeline rules.
#[derive(Debug, Clone)]
pub struct QualityGate {
    min_title_chars: usize,
    min_words: usize,
    min_hook_chars: usize,
}

impl QualityGate {
    pub fn new(rules: &QualityRules) -> Self {
        Self {
            min_title_chars: rules.min_title_chars,
            min_words: rules.min_words,
            min_hook_chars: rules.min_hook_chars,
        }
    }

    /// Review a drafted pair against the archive history.
    ///
    /// Checks run in a fixed order (title, duplicate, length, hook, banned
    /// phrases) and all of them run regardless of earlier failures. The
    /// gate reads the history but mutates nothing.
    pub fn review(&self, title: &str, content: &str, history: &[Post]) -> QualityReport {
        let mut violations = Vec::new();

        let title_length = title.trim().chars().count();
        if title_length < self.min_title_chars {
            violations.push(QualityViolation::WeakTitle {
                length: title_length,
                required: self.min_title_chars,
            });
        }

        let needle = title.to_lowercase();
        if let Some(existing) = history.iter().find(|p| p.title.to_lowercase() == needle) {
            violations.push(QualityViolation::DuplicateTitle {
                title: existing.title.clone(),
            });
        }

        let words = text::word_count(content);
        if words < self.min_words {
            violations.push(QualityViolation::InsufficientLength {
                words,
                required: self.min_words,
            });
        }

        let hook = text::first_paragraph(content);
        let hook_length = hook.chars().count();
        let trailing_colon = hook.ends_with(':');
        if hook_length < self.min_hook_chars || trailing_colon {
            violations.push(QualityViolation::WeakHook {
                length: hook_length,
                required: self.min_hook_chars,
                trailing_colon,
            });
        }

        let lowered = content.to_lowercase();
        for phrase in BANNED_PHRASES {
            if lowered.contains(phrase) {
                violations.push(QualityViolation::BannedPhrase {
                    phrase: (*phrase).to_string(),
                });
            }
        }

        QualityReport { violations }
    }
}

/// Strategist guard: the per-format word minimum, enforced as its own
/// layer after the base review so a format can demand more than the
/// global floor. Returns the violation when the draft falls short.
pub fn strategist_guard(content: &str, strategy: &Strategy) -> Option<QualityViolation> {
    let words = text::word_count(content);
    if words < strategy.min_words {
        return Some(QualityViolation::InsufficientLength {
            words,
            required: strategy.min_words,
        });
    }
    None
}

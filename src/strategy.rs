//! Format strategy: how a pillar's posts are shaped.
//!
//! The strategist maps a pillar to the editorial format the publication
//! uses for it. The mapping is a fixed table with a fallback, so the
//! same pillar always yields the same strategy and the pipeline stays
//! reproducible.

/// An editorial format assigned to a draft before gating.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Strategy {
    /// Format family name.
    pub name: &'static str,
    /// Per-format minimum word count, enforced by the strategist guard on
    /// top of the base quality gate.
    pub min_words: usize,
    /// Preferred opening-hook style, when the format prescribes one.
    pub hook_style: Option<&'static str>,
    /// Monetization channel attached to the format, if any.
    pub monetization: Option<&'static str>,
}

/// Strategy for a pillar, matched case-insensitively.
///
/// Unknown pillars, and drafts with no pillar at all, fall back to the
/// general-purpose `Shift` format.
pub fn strategy_for(pillar: Option<&str>) -> Strategy {
    match pillar {
        Some(p) if p.eq_ignore_ascii_case("career") => Strategy {
            name: "Contrarian",
            min_words: 700,
            hook_style: Some("myth-bust"),
            monetization: Some("affiliate"),
        },
        Some(p) if p.eq_ignore_ascii_case("money") => Strategy {
            name: "Pattern",
            min_words: 800,
            hook_style: Some("data-point"),
            monetization: Some("affiliate"),
        },
        Some(p) if p.eq_ignore_ascii_case("tech") => Strategy {
            name: "SecondOrder",
            min_words: 900,
            hook_style: Some("implication"),
            monetization: Some("ads"),
        },
        _ => Strategy {
            name: "Shift",
            min_words: 750,
            hook_style: None,
            monetization: None,
        },
    }
}

//! Canned domain advice and follow-up probes.
//!
//! Both tables are scanned in order; the first entry with a matching
//! keyword wins.

/// A keyword-triggered piece of advice.
pub struct Nudge {
    pub keywords: &'static [&'static str],
    pub advice: &'static str,
    pub follow_up: &'static str,
}

pub const DOMAIN_NUDGES: &[Nudge] = &[
    Nudge {
        keywords: &["aircrete", "dome"],
        advice: "For an aircrete dome, keep the mix around 1:1 cement to foam by volume, cure each course for a day before stacking, and seal the outside before the first rain.",
        follow_up: "Want a block-count estimate for your dome size?",
    },
    Nudge {
        keywords: &["aquarium", "betta", "cory", "corydoras"],
        advice: "For the tank: cycle it before adding fish, change about 25% of the water weekly, and keep bettas warm (around 26°C). Cory cats like groups of six and a soft sandy bottom.",
        follow_up: "Want a quick water-check routine?",
    },
    Nudge {
        keywords: &["reading", "bedtime story", "read with leo"],
        advice: "Leo's reading routine: 15 minutes every evening, let Leo pick the book, and ask one question about the story before lights out.",
        follow_up: "Want a few book ideas for this week?",
    },
    Nudge {
        keywords: &["charter"],
        advice: "The Charter is my compass: I never mislead the children. That rule can't be broken.",
        follow_up: "Anything about it you'd like me to explain?",
    },
];

/// A keyword-triggered follow-up question for the reflective fallback.
struct Probe {
    keywords: &'static [&'static str],
    question: &'static str,
}

const PROBES: &[Probe] = &[
    Probe {
        keywords: &["plan", "steps"],
        question: "Want the 3-step version?",
    },
    Probe {
        keywords: &["stuck", "blocked"],
        question: "What's the tiniest next action you could take?",
    },
    Probe {
        keywords: &["idea", "concept"],
        question: "Should we stress-test it, or sketch a quick prototype?",
    },
    Probe {
        keywords: &["error", "build"],
        question: "Paste the first error line and we'll start there.",
    },
];

const GENERIC_PROBE: &str = "What part of that matters most to you right now?";

/// First nudge whose keyword appears in `lower`.
pub fn find_nudge(lower: &str) -> Option<&'static Nudge> {
    DOMAIN_NUDGES
        .iter()
        .find(|nudge| nudge.keywords.iter().any(|k| lower.contains(k)))
}

/// Follow-up question for a reflective reply.
pub fn probe_for(lower: &str) -> &'static str {
    PROBES
        .iter()
        .find(|probe| probe.keywords.iter().any(|k| lower.contains(k)))
        .map(|probe| probe.question)
        .unwrap_or(GENERIC_PROBE)
}

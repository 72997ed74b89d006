//! Deterministic category scorers.
//!
//! Demographic categories pick a single label from a keyword table. The list
//! categories (behaviors, motivations, personality, frustrations, goals) run a fixed
//! rule book: each rule either fires or not, and fired rules are emitted in the order
//! they are declared here. The only ranked output is the interest top three.

use crate::corpus::Corpus;
use crate::keywords::{CueList, KeywordTable, PersonaTables};
use crate::profile::PersonaTrait;
use persona_core::UserRecord;

pub const UNKNOWN: &str = "Unknown";
pub const DEFAULT_AGE: &str = "Adult (estimated from Reddit usage)";
pub const EDUCATION_ESTIMATE: &str = "College-educated (inferred from communication style)";

const LOCATION_SOURCE: &str = "inferred from activity patterns";
const OCCUPATION_SOURCE: &str = "based on content analysis";
const AGE_SOURCE: &str = "based on language patterns";

const TOP_INTERESTS: usize = 3;
const INTEREST_CITATIONS: Evidence = Evidence::Posts(2);

/// Shared, read-only input for every scorer.
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub record: &'a UserRecord,
    pub corpus: &'a Corpus,
    pub tables: &'a PersonaTables,
}

impl<'a> ScoringContext<'a> {
    pub fn new(record: &'a UserRecord, corpus: &'a Corpus, tables: &'a PersonaTables) -> Self {
        Self {
            record,
            corpus,
            tables,
        }
    }

    fn text(&self) -> &str {
        self.corpus.as_str()
    }

    fn cue(&self, cue: Cue) -> &CueList {
        let cues = &self.tables.cues;
        match cue {
            Cue::HelpSeeking => &cues.help_seeking,
            Cue::Helpfulness => &cues.helpfulness,
            Cue::Negative => &cues.negative,
            Cue::Technical => &cues.technical,
            Cue::Social => &cues.social,
            Cue::Learning => &cues.learning,
            Cue::Career => &cues.career,
        }
    }
}

fn resolve_label(table: &KeywordTable, corpus: &Corpus, source: &str, default: &str) -> String {
    match table.best_match(corpus.as_str()) {
        Some(best) => format!("{} ({})", best.label, source),
        None => default.to_string(),
    }
}

pub fn infer_location(ctx: &ScoringContext<'_>) -> String {
    resolve_label(&ctx.tables.location, ctx.corpus, LOCATION_SOURCE, UNKNOWN)
}

pub fn infer_occupation(ctx: &ScoringContext<'_>) -> String {
    resolve_label(&ctx.tables.occupation, ctx.corpus, OCCUPATION_SOURCE, UNKNOWN)
}

/// Unlike the other demographics, age never resolves to "Unknown".
pub fn infer_age(ctx: &ScoringContext<'_>) -> String {
    resolve_label(&ctx.tables.age, ctx.corpus, AGE_SOURCE, DEFAULT_AGE)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Cue {
    HelpSeeking,
    Helpfulness,
    Negative,
    Technical,
    Social,
    Learning,
    Career,
}

/// The condition a rule checks. All comparisons are strict.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Signal {
    /// comments > factor × posts
    CommentsOverPosts { factor: usize },
    DistinctSubreddits { above: usize },
    DistinctCommentSubreddits { above: usize },
    CommentCount { above: usize },
    /// Corpus words divided by post count (at least 1).
    WordsPerPost { above: f64 },
    AnyCue(Cue),
    CueHits { cue: Cue, above: usize },
}

impl Signal {
    pub fn fires(&self, ctx: &ScoringContext<'_>) -> bool {
        let record = ctx.record;
        match *self {
            Signal::CommentsOverPosts { factor } => {
                record.comment_count() > record.post_count() * factor
            }
            Signal::DistinctSubreddits { above } => record.distinct_subreddits().len() > above,
            Signal::DistinctCommentSubreddits { above } => {
                record.distinct_comment_subreddits().len() > above
            }
            Signal::CommentCount { above } => record.comment_count() > above,
            Signal::WordsPerPost { above } => {
                let posts = record.post_count().max(1);
                ctx.corpus.word_count() as f64 / posts as f64 > above
            }
            Signal::AnyCue(cue) => ctx.cue(cue).any_in(ctx.text()),
            Signal::CueHits { cue, above } => ctx.cue(cue).hits(ctx.text()) > above,
        }
    }
}

/// Which items a fired rule cites: the first N in stored order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Evidence {
    Posts(usize),
    Comments(usize),
}

impl Evidence {
    pub fn citations(&self, record: &UserRecord) -> Vec<String> {
        match *self {
            Evidence::Posts(n) => record.first_post_ids(n),
            Evidence::Comments(n) => record.first_comment_ids(n),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Rule {
    pub label: &'static str,
    pub description: Option<&'static str>,
    pub signal: Signal,
    pub evidence: Evidence,
}

impl Rule {
    const fn plain(label: &'static str, signal: Signal, evidence: Evidence) -> Self {
        Self {
            label,
            description: None,
            signal,
            evidence,
        }
    }

    const fn described(
        label: &'static str,
        description: &'static str,
        signal: Signal,
        evidence: Evidence,
    ) -> Self {
        Self {
            label,
            description: Some(description),
            signal,
            evidence,
        }
    }

    pub fn evaluate(&self, ctx: &ScoringContext<'_>) -> Option<PersonaTrait> {
        if !self.signal.fires(ctx) {
            return None;
        }
        let persona_trait = PersonaTrait::new(self.label, self.evidence.citations(ctx.record));
        Some(match self.description {
            Some(description) => persona_trait.with_description(description),
            None => persona_trait,
        })
    }
}

pub const BEHAVIOR_RULES: &[Rule] = &[
    Rule::plain(
        "Prefers commenting over posting - more reactive than proactive",
        Signal::CommentsOverPosts { factor: 2 },
        Evidence::Comments(3),
    ),
    Rule::plain(
        "Engages across diverse communities and topics",
        Signal::DistinctSubreddits { above: 5 },
        Evidence::Posts(2),
    ),
];

pub const MOTIVATION_RULES: &[Rule] = &[
    Rule::plain(
        "Seeks community support and advice for problem-solving",
        Signal::AnyCue(Cue::HelpSeeking),
        Evidence::Posts(2),
    ),
    Rule::plain(
        "Motivated to share knowledge and help others",
        Signal::CommentCount { above: 10 },
        Evidence::Comments(3),
    ),
    Rule::plain(
        "Enjoys participating in diverse online communities",
        Signal::DistinctCommentSubreddits { above: 3 },
        Evidence::Comments(2),
    ),
];

// The default helpfulness list has five words, so "Helpful" only fires with a
// custom table that lists more.
pub const PERSONALITY_RULES: &[Rule] = &[
    Rule::described(
        "Detailed Communicator",
        "Tends to provide comprehensive explanations and detailed responses",
        Signal::WordsPerPost { above: 100.0 },
        Evidence::Posts(2),
    ),
    Rule::described(
        "Highly Engaged",
        "Actively participates in discussions and community interactions",
        Signal::CommentCount { above: 20 },
        Evidence::Comments(3),
    ),
    Rule::described(
        "Helpful",
        "Often provides assistance and recommendations to others",
        Signal::CueHits {
            cue: Cue::Helpfulness,
            above: 5,
        },
        Evidence::Comments(2),
    ),
];

pub const FRUSTRATION_RULES: &[Rule] = &[
    Rule::plain(
        "Expresses dissatisfaction with various systems or experiences",
        Signal::CueHits {
            cue: Cue::Negative,
            above: 3,
        },
        Evidence::Posts(2),
    ),
    Rule::plain(
        "Encounters technical issues and system problems",
        Signal::AnyCue(Cue::Technical),
        Evidence::Posts(2),
    ),
    Rule::plain(
        "Experiences challenges in social or professional interactions",
        Signal::AnyCue(Cue::Social),
        Evidence::Comments(2),
    ),
];

pub const GOAL_RULES: &[Rule] = &[
    Rule::plain(
        "Continuously learn and improve knowledge in areas of interest",
        Signal::CueHits {
            cue: Cue::Learning,
            above: 3,
        },
        Evidence::Posts(2),
    ),
    Rule::plain(
        "Advance career and professional development",
        Signal::CueHits {
            cue: Cue::Career,
            above: 3,
        },
        Evidence::Posts(2),
    ),
    Rule::plain(
        "Build connections and contribute to online communities",
        Signal::CommentCount { above: 15 },
        Evidence::Comments(3),
    ),
];

pub fn apply_rules(rules: &[Rule], ctx: &ScoringContext<'_>) -> Vec<PersonaTrait> {
    rules.iter().filter_map(|rule| rule.evaluate(ctx)).collect()
}

pub fn score_interests(ctx: &ScoringContext<'_>) -> Vec<PersonaTrait> {
    ctx.tables
        .interest
        .top_matches(ctx.text(), TOP_INTERESTS)
        .into_iter()
        .map(|interest| {
            PersonaTrait::new(
                format!("Shows strong interest in {}", interest.label.to_lowercase()),
                INTEREST_CITATIONS.citations(ctx.record),
            )
        })
        .collect()
}

pub fn score_behaviors(ctx: &ScoringContext<'_>) -> Vec<PersonaTrait> {
    let mut behaviors = apply_rules(BEHAVIOR_RULES, ctx);
    behaviors.extend(score_interests(ctx));
    behaviors
}

pub fn score_motivations(ctx: &ScoringContext<'_>) -> Vec<PersonaTrait> {
    apply_rules(MOTIVATION_RULES, ctx)
}

pub fn score_personality(ctx: &ScoringContext<'_>) -> Vec<PersonaTrait> {
    apply_rules(PERSONALITY_RULES, ctx)
}

pub fn score_frustrations(ctx: &ScoringContext<'_>) -> Vec<PersonaTrait> {
    apply_rules(FRUSTRATION_RULES, ctx)
}

pub fn score_goals(ctx: &ScoringContext<'_>) -> Vec<PersonaTrait> {
    apply_rules(GOAL_RULES, ctx)
}

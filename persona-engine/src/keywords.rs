//! Keyword tables used for persona scoring.
//!
//! Tables are ordered: when two labels score the same, the one declared first wins.
//! The built-in tables can be replaced wholesale or per table from a TOML file, e.g.
//!
//! ```toml
//! [[interest]]
//! label = "Gardening"
//! keywords = ["garden", "compost", "seedling"]
//!
//! [cues]
//! career = ["job", "career", "promotion"]
//! ```

use persona_core::{ConfigError, CoreError};
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct KeywordCategory {
    pub label: String,
    pub keywords: Vec<String>,
}

impl KeywordCategory {
    pub fn new(label: &str, keywords: &[&str]) -> Self {
        Self {
            label: label.to_string(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
        }
    }

    /// Number of distinct keywords that appear anywhere in `corpus`.
    pub fn score(&self, corpus: &str) -> usize {
        self.keywords
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .filter(|keyword| corpus.contains(keyword))
            .count()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CategoryScore<'a> {
    pub label: &'a str,
    pub score: usize,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct KeywordTable {
    categories: Vec<KeywordCategory>,
}

impl KeywordTable {
    pub fn new(categories: Vec<KeywordCategory>) -> Self {
        Self { categories }
    }

    pub fn categories(&self) -> &[KeywordCategory] {
        &self.categories
    }

    /// Scores in declared table order.
    pub fn scores<'a>(&'a self, corpus: &str) -> Vec<CategoryScore<'a>> {
        self.categories
            .iter()
            .map(|category| CategoryScore {
                label: &category.label,
                score: category.score(corpus),
            })
            .collect()
    }

    /// Highest-scoring label, earliest declared on ties. `None` when nothing matched.
    pub fn best_match<'a>(&'a self, corpus: &str) -> Option<CategoryScore<'a>> {
        let mut best: Option<CategoryScore<'a>> = None;
        for candidate in self.scores(corpus) {
            if candidate.score == 0 {
                continue;
            }
            match best {
                Some(current) if current.score >= candidate.score => {}
                _ => best = Some(candidate),
            }
        }
        best
    }

    /// Up to `limit` matched labels, best first; ties keep declared order.
    pub fn top_matches<'a>(&'a self, corpus: &str, limit: usize) -> Vec<CategoryScore<'a>> {
        let mut matched: Vec<CategoryScore<'a>> = self
            .scores(corpus)
            .into_iter()
            .filter(|candidate| candidate.score > 0)
            .collect();
        matched.sort_by(|a, b| b.score.cmp(&a.score));
        matched.truncate(limit);
        matched
    }
}

/// Plain word list; a hit is any listed word occurring as a substring.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CueList {
    words: Vec<String>,
}

impl CueList {
    pub fn new(words: &[&str]) -> Self {
        Self {
            words: words.iter().map(|w| w.to_string()).collect(),
        }
    }

    /// Distinct cue words present in `corpus`.
    pub fn hits(&self, corpus: &str) -> usize {
        self.words
            .iter()
            .map(String::as_str)
            .collect::<BTreeSet<&str>>()
            .into_iter()
            .filter(|word| corpus.contains(word))
            .count()
    }

    pub fn any_in(&self, corpus: &str) -> bool {
        self.words.iter().any(|word| corpus.contains(word.as_str()))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CueLists {
    pub help_seeking: CueList,
    pub helpfulness: CueList,
    pub negative: CueList,
    pub technical: CueList,
    pub social: CueList,
    pub learning: CueList,
    pub career: CueList,
}

impl Default for CueLists {
    fn default() -> Self {
        Self {
            help_seeking: CueList::new(&["help", "advice", "question", "how to", "what should"]),
            helpfulness: CueList::new(&["help", "suggest", "recommend", "try", "solution"]),
            negative: CueList::new(&[
                "frustrated",
                "annoying",
                "hate",
                "terrible",
                "worst",
                "problem",
                "issue",
            ]),
            technical: CueList::new(&["bug", "error", "broken"]),
            social: CueList::new(&["people", "social", "interaction", "misunderstand"]),
            learning: CueList::new(&["learn", "understand", "study", "course", "tutorial", "guide"]),
            career: CueList::new(&["job", "career", "work", "professional", "salary", "interview"]),
        }
    }
}

/// Every table the scorers read. Owned by the generator and never mutated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersonaTables {
    pub location: KeywordTable,
    pub occupation: KeywordTable,
    pub age: KeywordTable,
    pub interest: KeywordTable,
    pub cues: CueLists,
}

impl PersonaTables {
    pub fn from_toml_str(raw: &str) -> Result<Self, CoreError> {
        let tables: PersonaTables = toml::from_str(raw).map_err(ConfigError::from)?;
        debug!(
            "Loaded keyword tables: {} locations, {} occupations, {} age brackets, {} interests",
            tables.location.categories().len(),
            tables.occupation.categories().len(),
            tables.age.categories().len(),
            tables.interest.categories().len()
        );
        Ok(tables)
    }

    pub fn from_file(path: &Path) -> Result<Self, CoreError> {
        let raw = std::fs::read_to_string(path).map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                CoreError::Config(ConfigError::FileNotFound {
                    path: path.display().to_string(),
                })
            } else {
                CoreError::Io(e)
            }
        })?;
        Self::from_toml_str(&raw)
    }
}

impl Default for PersonaTables {
    fn default() -> Self {
        Self {
            location: default_location_table(),
            occupation: default_occupation_table(),
            age: default_age_table(),
            interest: default_interest_table(),
            cues: CueLists::default(),
        }
    }
}

fn default_location_table() -> KeywordTable {
    KeywordTable::new(vec![
        KeywordCategory::new(
            "NYC",
            &["newyork", "manhattan", "brooklyn", "queens", "bronx", "nyc"],
        ),
        KeywordCategory::new(
            "San Francisco",
            &["sanfrancisco", "sf", "bayarea", "siliconvalley"],
        ),
        KeywordCategory::new("Seattle", &["seattle", "washington", "pnw"]),
        KeywordCategory::new("Los Angeles", &["losangeles", "la", "california", "socal"]),
        KeywordCategory::new("Chicago", &["chicago", "illinois", "midwest"]),
        KeywordCategory::new("Boston", &["boston", "massachusetts", "cambridge"]),
        KeywordCategory::new("Austin", &["austin", "texas"]),
        KeywordCategory::new("Denver", &["denver", "colorado"]),
        KeywordCategory::new("Canada", &["canada", "toronto", "vancouver", "montreal"]),
        KeywordCategory::new("UK", &["london", "uk", "britain", "england", "scotland"]),
        KeywordCategory::new(
            "Europe",
            &["germany", "france", "netherlands", "sweden", "norway"],
        ),
    ])
}

fn default_occupation_table() -> KeywordTable {
    KeywordTable::new(vec![
        KeywordCategory::new(
            "Software Developer",
            &[
                "programming",
                "coding",
                "developer",
                "software",
                "python",
                "javascript",
                "react",
                "node",
                "git",
                "github",
            ],
        ),
        KeywordCategory::new(
            "Data Scientist",
            &[
                "data",
                "analytics",
                "machine learning",
                "ml",
                "ai",
                "statistics",
                "pandas",
                "numpy",
            ],
        ),
        KeywordCategory::new(
            "Designer",
            &["design", "ui", "ux", "figma", "photoshop", "creative"],
        ),
        KeywordCategory::new(
            "Student",
            &[
                "university",
                "college",
                "homework",
                "exam",
                "professor",
                "semester",
                "graduation",
            ],
        ),
        KeywordCategory::new(
            "Healthcare",
            &["doctor", "nurse", "medical", "hospital", "patient", "healthcare"],
        ),
        KeywordCategory::new(
            "Finance",
            &["finance", "banking", "investment", "stock", "trading", "economics"],
        ),
        KeywordCategory::new(
            "Marketing",
            &["marketing", "advertising", "social media", "brand", "campaign"],
        ),
        KeywordCategory::new(
            "Teacher",
            &["teacher", "education", "classroom", "student", "curriculum"],
        ),
    ])
}

fn default_age_table() -> KeywordTable {
    KeywordTable::new(vec![
        KeywordCategory::new(
            "Teen (13-19)",
            &["high school", "teenager", "parents", "allowance", "homework"],
        ),
        KeywordCategory::new(
            "Young Adult (20-25)",
            &["college", "university", "dorm", "first job", "internship"],
        ),
        KeywordCategory::new(
            "Adult (26-35)",
            &["career", "apartment", "dating", "relationship", "job search"],
        ),
        KeywordCategory::new(
            "Adult (36-45)",
            &["mortgage", "kids", "family", "career change", "management"],
        ),
        KeywordCategory::new(
            "Adult (45+)",
            &["retirement", "children", "grandchildren", "health", "medicare"],
        ),
    ])
}

fn default_interest_table() -> KeywordTable {
    KeywordTable::new(vec![
        KeywordCategory::new(
            "Gaming",
            &["gaming", "game", "xbox", "playstation", "nintendo", "pc", "steam", "twitch"],
        ),
        KeywordCategory::new(
            "Technology",
            &["tech", "apple", "android", "computer", "software", "hardware", "gadget"],
        ),
        KeywordCategory::new(
            "Sports",
            &["football", "basketball", "baseball", "soccer", "hockey", "tennis", "golf"],
        ),
        KeywordCategory::new(
            "Fitness",
            &["gym", "workout", "fitness", "running", "yoga", "diet", "health"],
        ),
        KeywordCategory::new(
            "Food",
            &["cooking", "recipe", "restaurant", "food", "baking", "chef"],
        ),
        KeywordCategory::new(
            "Travel",
            &["travel", "vacation", "trip", "country", "city", "flight", "hotel"],
        ),
        KeywordCategory::new(
            "Music",
            &["music", "band", "concert", "album", "guitar", "piano", "spotify"],
        ),
        KeywordCategory::new(
            "Movies",
            &["movie", "film", "netflix", "cinema", "actor", "director"],
        ),
        KeywordCategory::new(
            "Books",
            &["book", "reading", "novel", "author", "library", "kindle"],
        ),
    ])
}

use serde::Serialize;

const DAYS_PER_YEAR: f64 = 365.0;

/// Coarse classification by account age.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum Archetype {
    LongTerm,
    Regular,
    Newer,
}

impl Archetype {
    /// Both boundaries are inclusive: exactly three years is long-term.
    pub fn from_account_age_days(days: f64) -> Self {
        if days >= 3.0 * DAYS_PER_YEAR {
            Archetype::LongTerm
        } else if days >= DAYS_PER_YEAR {
            Archetype::Regular
        } else {
            Archetype::Newer
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Archetype::LongTerm => "Long-term Reddit user",
            Archetype::Regular => "Regular Reddit user",
            Archetype::Newer => "Newer Reddit user",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Demographics {
    pub age: String,
    pub location: String,
    pub occupation: String,
    pub education: String,
    pub archetype: String,
}

/// One persona statement and the items that evidence it.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaTrait {
    pub label: String,
    pub description: Option<String>,
    pub citations: Vec<String>,
}

impl PersonaTrait {
    pub fn new(label: impl Into<String>, citations: Vec<String>) -> Self {
        Self {
            label: label.into(),
            description: None,
            citations,
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PersonaProfile {
    pub demographics: Demographics,
    pub behaviors: Vec<PersonaTrait>,
    pub motivations: Vec<PersonaTrait>,
    pub personality: Vec<PersonaTrait>,
    pub frustrations: Vec<PersonaTrait>,
    pub goals: Vec<PersonaTrait>,
}

impl PersonaProfile {
    pub fn sections(&self) -> [(&'static str, &[PersonaTrait]); 5] {
        [
            ("BEHAVIORS & HABITS", &self.behaviors),
            ("MOTIVATIONS", &self.motivations),
            ("PERSONALITY", &self.personality),
            ("FRUSTRATIONS", &self.frustrations),
            ("GOALS & NEEDS", &self.goals),
        ]
    }

    pub fn citation_ids(&self) -> impl Iterator<Item = &str> + '_ {
        self.sections()
            .into_iter()
            .flat_map(|(_, traits)| traits.iter())
            .flat_map(|persona_trait| persona_trait.citations.iter().map(String::as_str))
    }

    pub fn trait_count(&self) -> usize {
        self.sections().iter().map(|(_, traits)| traits.len()).sum()
    }
}

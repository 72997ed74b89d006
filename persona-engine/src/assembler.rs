use crate::corpus::{CitationLookup, Corpus};
use crate::keywords::PersonaTables;
use crate::profile::{Archetype, Demographics, PersonaProfile};
use crate::report::ReportFormatter;
use crate::scoring::{self, ScoringContext, EDUCATION_ESTIMATE};
use chrono::{DateTime, TimeZone, Utc};
use persona_core::{CoreError, GenerationError, UserRecord};
use tracing::{debug, info};

const SECONDS_PER_DAY: f64 = 24.0 * 3600.0;

/// Converts a Unix timestamp in (fractional) seconds to UTC.
pub fn epoch_to_utc(field: &str, value: f64) -> Result<DateTime<Utc>, GenerationError> {
    let invalid = || GenerationError::InvalidTimestamp {
        field: field.to_string(),
        value,
    };
    if !value.is_finite() {
        return Err(invalid());
    }

    let secs = value.floor();
    let nanos = (((value - secs) * 1e9) as u32).min(999_999_999);
    Utc.timestamp_opt(secs as i64, nanos)
        .single()
        .ok_or_else(invalid)
}

/// A scored profile together with the citation lookup built from the same record.
#[derive(Debug, Clone)]
pub struct PersonaAnalysis {
    pub profile: PersonaProfile,
    pub citations: CitationLookup,
}

impl PersonaAnalysis {
    pub fn render(
        &self,
        record: &UserRecord,
        generated_at: DateTime<Utc>,
    ) -> Result<String, CoreError> {
        let report =
            ReportFormatter::new(&self.citations).render(&self.profile, record, generated_at)?;
        Ok(report)
    }
}

/// Turns a scraped record into a persona. Holds the keyword tables and nothing else,
/// so one generator can serve any number of users.
#[derive(Debug, Clone, Default)]
pub struct PersonaGenerator {
    tables: PersonaTables,
}

impl PersonaGenerator {
    pub fn new(tables: PersonaTables) -> Self {
        Self { tables }
    }

    pub fn analyze(
        &self,
        record: &UserRecord,
        now: DateTime<Utc>,
    ) -> Result<PersonaAnalysis, CoreError> {
        record.validate()?;
        let created = epoch_to_utc("created_utc", record.created_utc)?;

        let corpus = Corpus::from_record(record);
        let citations = CitationLookup::from_record(record);
        debug!(
            "Built corpus for u/{}: {} words, {} citable items",
            record.username,
            corpus.word_count(),
            citations.len()
        );

        let ctx = ScoringContext::new(record, &corpus, &self.tables);
        let account_age_days =
            (now - created).num_milliseconds() as f64 / 1000.0 / SECONDS_PER_DAY;

        let profile = PersonaProfile {
            demographics: Demographics {
                age: scoring::infer_age(&ctx),
                location: scoring::infer_location(&ctx),
                occupation: scoring::infer_occupation(&ctx),
                education: EDUCATION_ESTIMATE.to_string(),
                archetype: Archetype::from_account_age_days(account_age_days)
                    .label()
                    .to_string(),
            },
            behaviors: scoring::score_behaviors(&ctx),
            motivations: scoring::score_motivations(&ctx),
            personality: scoring::score_personality(&ctx),
            frustrations: scoring::score_frustrations(&ctx),
            goals: scoring::score_goals(&ctx),
        };

        debug!(
            "Scored u/{}: {} traits across all sections",
            record.username,
            profile.trait_count()
        );

        Ok(PersonaAnalysis { profile, citations })
    }

    /// Full report text, stamped with the given time.
    pub fn generate_persona_at(
        &self,
        record: &UserRecord,
        now: DateTime<Utc>,
    ) -> Result<String, CoreError> {
        info!("Generating persona for user: {}", record.username);
        let analysis = self.analyze(record, now)?;
        analysis.render(record, now)
    }

    pub fn generate_persona(&self, record: &UserRecord) -> Result<String, CoreError> {
        self.generate_persona_at(record, Utc::now())
    }
}

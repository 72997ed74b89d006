//! Keyword-driven persona generation for scraped Reddit users.

pub mod assembler;
pub mod corpus;
pub mod keywords;
pub mod profile;
pub mod report;
pub mod scoring;

pub use assembler::{PersonaAnalysis, PersonaGenerator};
pub use corpus::{Citation, CitationKind, CitationLookup, Corpus};
pub use keywords::{CueList, CueLists, KeywordCategory, KeywordTable, PersonaTables};
pub use profile::{Archetype, Demographics, PersonaProfile, PersonaTrait};
pub use report::ReportFormatter;

use persona_core::{CoreError, UserRecord};

/// Generates a report with the built-in keyword tables.
pub fn generate_persona(record: &UserRecord) -> Result<String, CoreError> {
    PersonaGenerator::default().generate_persona(record)
}

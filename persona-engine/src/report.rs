//! Plain-text persona report.

use crate::assembler::epoch_to_utc;
use crate::corpus::CitationLookup;
use crate::profile::{PersonaProfile, PersonaTrait};
use chrono::{DateTime, Utc};
use persona_core::{GenerationError, UserRecord};
use std::fmt::Write;

const RULE: &str = "========================================";

const MISSING_KIND: &str = "Unknown";
const MISSING_URL: &str = "No URL";
const MISSING_PREVIEW: &str = "No preview";

pub struct ReportFormatter<'a> {
    citations: &'a CitationLookup,
}

impl<'a> ReportFormatter<'a> {
    pub fn new(citations: &'a CitationLookup) -> Self {
        Self { citations }
    }

    pub fn render(
        &self,
        profile: &PersonaProfile,
        record: &UserRecord,
        generated_at: DateTime<Utc>,
    ) -> Result<String, GenerationError> {
        let created = epoch_to_utc("created_utc", record.created_utc)?;
        let mut out = String::new();

        writeln!(out)?;
        write_banner(&mut out, &format!("USER PERSONA: {}", record.username))?;
        writeln!(out)?;
        writeln!(out, "Generated on: {}", generated_at.format("%Y-%m-%d %H:%M:%S"))?;
        writeln!(out, "Account created: {}", created.format("%Y-%m-%d"))?;
        writeln!(out, "Link karma: {}", record.link_karma)?;
        writeln!(out, "Comment karma: {}", record.comment_karma)?;
        writeln!(out, "Posts analyzed: {}", record.post_count())?;
        writeln!(out, "Comments analyzed: {}", record.comment_count())?;
        writeln!(out)?;

        let demographics = &profile.demographics;
        write_banner(&mut out, "DEMOGRAPHICS")?;
        writeln!(out, "Age: {}", demographics.age)?;
        writeln!(out, "Location: {}", demographics.location)?;
        writeln!(out, "Occupation: {}", demographics.occupation)?;
        writeln!(out, "Education: {}", demographics.education)?;
        writeln!(out, "Archetype: {}", demographics.archetype)?;
        writeln!(out)?;

        for (title, traits) in profile.sections() {
            write_banner(&mut out, title)?;
            for persona_trait in traits {
                self.write_trait(&mut out, persona_trait)?;
            }
        }

        Ok(out)
    }

    fn write_trait(&self, out: &mut String, persona_trait: &PersonaTrait) -> std::fmt::Result {
        match &persona_trait.description {
            Some(description) => writeln!(out, "• {}: {}", persona_trait.label, description)?,
            None => writeln!(out, "• {}", persona_trait.label)?,
        }
        writeln!(out, "  Citations:")?;
        for id in &persona_trait.citations {
            match self.citations.get(id) {
                Some(citation) => {
                    writeln!(out, "    - {}: {}", citation.kind, citation.url)?;
                    writeln!(out, "      \"{}\"", citation.preview)?;
                }
                None => {
                    writeln!(out, "    - {}: {}", MISSING_KIND, MISSING_URL)?;
                    writeln!(out, "      \"{}\"", MISSING_PREVIEW)?;
                }
            }
        }
        writeln!(out)
    }
}

fn write_banner(out: &mut String, title: &str) -> std::fmt::Result {
    writeln!(out, "{}", RULE)?;
    writeln!(out, "{}", title)?;
    writeln!(out, "{}", RULE)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profile::Demographics;
    use chrono::TimeZone;
    use persona_core::Post;

    fn record() -> UserRecord {
        UserRecord {
            username: "spez".to_string(),
            created_utc: 1_118_030_400.0,
            link_karma: 100,
            comment_karma: 250,
            posts: vec![Post {
                id: "p1".to_string(),
                title: "Hello world".to_string(),
                selftext: String::new(),
                subreddit: "announcements".to_string(),
                score: 1,
                created_utc: 0.0,
                url: "https://reddit.com/r/announcements/comments/p1/hello/".to_string(),
                num_comments: 0,
                upvote_ratio: None,
            }],
            comments: vec![],
        }
    }

    fn profile() -> PersonaProfile {
        PersonaProfile {
            demographics: Demographics {
                age: "Adult (estimated from Reddit usage)".to_string(),
                location: "Unknown".to_string(),
                occupation: "Unknown".to_string(),
                education: "College-educated (inferred from communication style)".to_string(),
                archetype: "Long-term Reddit user".to_string(),
            },
            behaviors: vec![PersonaTrait::new(
                "Engages across diverse communities and topics",
                vec!["p1".to_string(), "ghost".to_string()],
            )],
            motivations: vec![],
            personality: vec![PersonaTrait::new("Helpful", vec![])
                .with_description("Often provides assistance and recommendations to others")],
            frustrations: vec![],
            goals: vec![],
        }
    }

    fn render() -> String {
        let record = record();
        let citations = CitationLookup::from_record(&record);
        let generated_at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        ReportFormatter::new(&citations)
            .render(&profile(), &record, generated_at)
            .unwrap()
    }

    #[test]
    fn test_header_layout() {
        let report = render();
        let expected = "\n\
            ========================================\n\
            USER PERSONA: spez\n\
            ========================================\n\
            \n\
            Generated on: 2024-03-09 14:05:07\n\
            Account created: 2005-06-06\n\
            Link karma: 100\n\
            Comment karma: 250\n\
            Posts analyzed: 1\n\
            Comments analyzed: 0\n\
            \n\
            ========================================\n\
            DEMOGRAPHICS\n\
            ========================================\n\
            Age: Adult (estimated from Reddit usage)\n";
        assert!(report.starts_with(expected), "unexpected header:\n{}", report);
        assert!(report.contains("Archetype: Long-term Reddit user\n\n====="));
    }

    #[test]
    fn test_sections_in_order() {
        let report = render();
        let positions: Vec<usize> = [
            "DEMOGRAPHICS",
            "BEHAVIORS & HABITS",
            "MOTIVATIONS",
            "PERSONALITY",
            "FRUSTRATIONS",
            "GOALS & NEEDS",
        ]
        .iter()
        .map(|title| report.find(&format!("{}\n{}", title, RULE)).unwrap())
        .collect();
        assert!(positions.windows(2).all(|pair| pair[0] < pair[1]));
        assert!(report.ends_with("GOALS & NEEDS\n========================================\n"));
    }

    #[test]
    fn test_trait_block_with_resolved_and_dangling_citations() {
        let report = render();
        let expected = "• Engages across diverse communities and topics\n  \
            Citations:\n    \
            - Post: https://reddit.com/r/announcements/comments/p1/hello/\n      \
            \"Hello world\"\n    \
            - Unknown: No URL\n      \
            \"No preview\"\n\n";
        assert!(report.contains(expected), "missing trait block:\n{}", report);
    }

    #[test]
    fn test_description_follows_label() {
        let report = render();
        assert!(report.contains(
            "• Helpful: Often provides assistance and recommendations to others\n  Citations:\n\n"
        ));
    }
}

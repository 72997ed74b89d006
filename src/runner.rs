use async_trait::async_trait;
use chrono::Utc;
use persona_core::utils::sanitize_filename;
use persona_core::{CoreError, ErrorReporter, UserRecord};
use persona_engine::PersonaGenerator;
use reddit_client::UserSource;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// What happened to one input entry.
#[derive(Debug)]
pub enum Outcome {
    Saved(PathBuf),
    /// The source had nothing for this user (missing, private or suspended).
    NoData(String),
    Failed(CoreError),
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct BatchSummary {
    pub saved: usize,
    pub no_data: usize,
    pub failed: usize,
}

impl BatchSummary {
    fn record(&mut self, outcome: &Outcome) {
        match outcome {
            Outcome::Saved(_) => self.saved += 1,
            Outcome::NoData(_) => self.no_data += 1,
            Outcome::Failed(_) => self.failed += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.saved + self.no_data + self.failed
    }
}

/// Saved `UserRecord` JSON files used in place of live scraping. Entries are file
/// paths rather than usernames.
#[derive(Debug, Default)]
pub struct RecordFiles;

#[async_trait]
impl UserSource for RecordFiles {
    fn resolve(&self, entry: &str) -> Result<String, CoreError> {
        let path = entry.trim();
        if path.is_empty() {
            return Err(CoreError::InvalidInput {
                message: "Record path is empty".to_string(),
            });
        }
        Ok(path.to_string())
    }

    async fn scrape_user(&self, path: &str) -> Result<Option<UserRecord>, CoreError> {
        let raw = tokio::fs::read_to_string(path).await?;
        let record = UserRecord::from_json(&raw)?;
        info!(
            "Loaded saved record for u/{} ({} posts, {} comments)",
            record.username,
            record.post_count(),
            record.comment_count()
        );
        Ok(Some(record))
    }
}

pub struct PersonaRunner<S> {
    source: S,
    generator: PersonaGenerator,
    output_dir: PathBuf,
    reporter: ErrorReporter,
}

impl<S: UserSource> PersonaRunner<S> {
    pub fn new(source: S, generator: PersonaGenerator, output_dir: impl Into<PathBuf>) -> Self {
        Self {
            source,
            generator,
            output_dir: output_dir.into(),
            reporter: ErrorReporter::new(),
        }
    }

    pub fn output_path(&self, username: &str) -> PathBuf {
        self.output_dir
            .join(format!("{}_persona.txt", sanitize_filename(username)))
    }

    /// Resolves, fetches, generates and writes one user. Never panics on bad input;
    /// every failure comes back as an [`Outcome`].
    pub async fn process_single_user(&self, entry: &str) -> Outcome {
        let key = match self.source.resolve(entry) {
            Ok(key) => key,
            Err(e) => {
                self.reporter.report_error(&e);
                return Outcome::Failed(e);
            }
        };

        info!("Processing user: {}", key);
        match self.generate(&key).await {
            Ok(Some(path)) => {
                info!("Persona saved to: {}", path.display());
                Outcome::Saved(path)
            }
            Ok(None) => {
                warn!("No data found for user: {}", key);
                Outcome::NoData(key)
            }
            Err(e) => {
                error!("Error processing user {}: {}", key, e);
                self.reporter.report_error(&e);
                Outcome::Failed(e)
            }
        }
    }

    async fn generate(&self, key: &str) -> Result<Option<PathBuf>, CoreError> {
        let record = match self.source.scrape_user(key).await? {
            Some(record) => record,
            None => return Ok(None),
        };

        let persona = self.generator.generate_persona_at(&record, Utc::now())?;

        tokio::fs::create_dir_all(&self.output_dir).await?;
        let path = self.output_path(&record.username);
        tokio::fs::write(&path, persona).await?;
        Ok(Some(path))
    }

    /// Processes every non-blank line of `file_path`. One user failing never stops
    /// the rest.
    pub async fn process_batch(&self, file_path: &Path) -> Result<BatchSummary, CoreError> {
        let raw = tokio::fs::read_to_string(file_path).await.map_err(|e| {
            error!("Batch file not readable: {}: {}", file_path.display(), e);
            CoreError::Io(e)
        })?;
        let entries: Vec<&str> = raw
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        info!("Processing {} users from batch file", entries.len());
        let mut summary = BatchSummary::default();
        for (i, entry) in entries.iter().enumerate() {
            info!("Processing user {}/{}", i + 1, entries.len());
            let outcome = self.process_single_user(entry).await;
            summary.record(&outcome);
        }

        info!(
            "Batch complete: {} saved, {} without data, {} failed (of {})",
            summary.saved,
            summary.no_data,
            summary.failed,
            summary.total()
        );
        Ok(summary)
    }
}

mod runner;

use std::path::{Path, PathBuf};

use anyhow::Context;
use clap::Parser;
use persona_core::{
    ErrorExt, RedditCredentials, ScrapeLimits, DEFAULT_MAX_COMMENTS, DEFAULT_MAX_POSTS,
    DEFAULT_OUTPUT_DIR,
};
use persona_engine::{PersonaGenerator, PersonaTables};
use reddit_client::{RedditScraper, UserSource};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::runner::{Outcome, PersonaRunner, RecordFiles};

const DEFAULT_FILTER: &str = "redditor_persona=info,persona_engine=info,reddit_client=info,persona_core=info,hyper=warn,reqwest=warn";
const VERBOSE_FILTER: &str = "redditor_persona=debug,persona_engine=debug,reddit_client=debug,persona_core=debug,hyper=warn,reqwest=warn";

#[derive(Parser, Debug)]
#[command(
    name = "redditor-persona",
    version,
    about = "Generate user personas from Reddit profiles"
)]
struct Cli {
    /// Reddit profile URL or username, or a file of them with --batch.
    url_or_file: String,

    /// Treat the argument as a file with one URL/username per line.
    #[arg(long)]
    batch: bool,

    /// Directory to save persona files.
    #[arg(long, default_value = DEFAULT_OUTPUT_DIR)]
    output_dir: PathBuf,

    /// Maximum number of posts to analyze.
    #[arg(long, default_value_t = DEFAULT_MAX_POSTS)]
    max_posts: u32,

    /// Maximum number of comments to analyze.
    #[arg(long, default_value_t = DEFAULT_MAX_COMMENTS)]
    max_comments: u32,

    /// Enable verbose logging.
    #[arg(long, short)]
    verbose: bool,

    /// TOML file overriding the built-in keyword tables.
    #[arg(long, env = "PERSONA_TABLES")]
    tables: Option<PathBuf>,

    /// Read saved user records (JSON) instead of scraping Reddit.
    #[arg(long)]
    from_json: bool,
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { VERBOSE_FILTER } else { DEFAULT_FILTER };
    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();
}

async fn run<S: UserSource>(
    cli: &Cli,
    source: S,
    generator: PersonaGenerator,
) -> anyhow::Result<()> {
    let runner = PersonaRunner::new(source, generator, &cli.output_dir);

    if cli.batch {
        let summary = runner
            .process_batch(Path::new(&cli.url_or_file))
            .await
            .with_context(|| format!("Error processing batch file {}", cli.url_or_file))?;
        if summary.saved == 0 && summary.total() > 0 {
            anyhow::bail!("No personas were generated from {}", cli.url_or_file);
        }
        return Ok(());
    }

    match runner.process_single_user(&cli.url_or_file).await {
        Outcome::Saved(_) => Ok(()),
        Outcome::NoData(user) => anyhow::bail!("No data found for user: {}", user),
        Outcome::Failed(e) => Err(anyhow::Error::new(e)
            .context(format!("Failed to generate persona for {}", cli.url_or_file))),
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    tracing::info!("Starting Reddit persona generator");

    let tables = match &cli.tables {
        Some(path) => {
            tracing::info!("Loading keyword tables from {}", path.display());
            PersonaTables::from_file(path)
                .map_err(|e| anyhow::anyhow!(e.log_error().user_friendly_message()))?
        }
        None => PersonaTables::default(),
    };
    let generator = PersonaGenerator::new(tables);

    if cli.from_json {
        return run(&cli, RecordFiles, generator).await;
    }

    let credentials = RedditCredentials::from_env().map_err(|e| {
        tracing::error!("Failed to initialize components: {}", e);
        anyhow::anyhow!(e.user_friendly_message())
    })?;
    let limits = ScrapeLimits {
        max_posts: cli.max_posts,
        max_comments: cli.max_comments,
    };
    let scraper =
        RedditScraper::new(credentials, limits).context("Failed to create Reddit client")?;
    let mode = scraper
        .connect()
        .await
        .map_err(|e| anyhow::anyhow!(e.log_error().user_friendly_message()))?;
    tracing::debug!("Authenticated with Reddit ({:?})", mode);

    run(&cli, scraper, generator).await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults() {
        let cli = Cli::parse_from(["redditor-persona", "https://www.reddit.com/user/kojied/"]);
        assert!(!cli.batch);
        assert!(!cli.from_json);
        assert_eq!(cli.output_dir, PathBuf::from("./personas"));
        assert_eq!(cli.max_posts, 100);
        assert_eq!(cli.max_comments, 200);
    }

    #[test]
    fn test_cli_batch_flags() {
        let cli = Cli::parse_from([
            "redditor-persona",
            "users.txt",
            "--batch",
            "--output-dir",
            "out",
            "--max-posts",
            "10",
            "--max-comments",
            "20",
            "--verbose",
        ]);
        assert!(cli.batch);
        assert!(cli.verbose);
        assert_eq!(cli.output_dir, PathBuf::from("out"));
        assert_eq!(cli.max_posts, 10);
        assert_eq!(cli.max_comments, 20);
    }
}

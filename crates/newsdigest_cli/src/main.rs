//! newsdigest CLI - the service loop and maintenance commands.

mod commands;
mod config;
mod progress;
mod shutdown;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use newsdigest::Category;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "newsdigest")]
#[command(version)]
#[command(about = "VnExpress news summaries posted to Telegram")]
#[command(
    long_about = "newsdigest crawls VnExpress category listings, summarizes new articles \
with a Groq-hosted LLM and posts the summaries to a Telegram chat. Posted articles \
are recorded in SQLite so each one is posted once."
)]
#[command(after_long_help = r#"EXAMPLES
    Run the service loop (the container entry point):
        $ newsdigest run

    Run one cycle over two sections without posting anything:
        $ newsdigest run --once --dry-run -c the-thao -c the-gioi

    Find the chat id after sending a message to the bot:
        $ newsdigest telegram chat-id

    Save one article as text:
        $ newsdigest fetch https://vnexpress.net/some-article.html -o article.txt

CONFIGURATION
    newsdigest reads configuration from:
      1. ~/.config/newsdigest/config.toml (or $XDG_CONFIG_HOME/newsdigest/config.toml)
      2. ./newsdigest.toml
      3. Environment variables (NEWSDIGEST_* prefix, e.g., NEWSDIGEST_DATABASE__URL)
      4. .env file in current directory

ENVIRONMENT VARIABLES
    GROQ_API_KEY              Groq API key
    TELEGRAM_BOT_TOKEN        Telegram bot token
    TELEGRAM_CHAT_ID          Chat the summaries are posted to
    NEWSDIGEST_DATABASE__URL  Database connection string (default: sqlite://data/crawled_articles.db?mode=rwc)
    RUST_LOG                  Log filter (default: newsdigest=info,newsdigest_cli=info)
"#)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Crawl, summarize and post new articles every interval
    Run {
        /// Run a single cycle and exit
        #[arg(long)]
        once: bool,

        /// Crawl and summarize only; nothing is posted or recorded
        #[arg(short = 'n', long)]
        dry_run: bool,

        /// Category to crawl (repeatable; default from config)
        #[arg(short = 'c', long = "category")]
        categories: Vec<Category>,
    },
    /// List new article URLs and titles for a category
    Crawl {
        /// Category slug, e.g. tin-nong
        category: Category,

        /// Listing pages to read (default from config or 1)
        #[arg(short, long)]
        pages: Option<u32>,
    },
    /// Extract one article and write it as text
    Fetch {
        /// Article URL
        url: url::Url,

        /// Output file (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Show recently posted articles
    Recent {
        /// Number of articles to show
        #[arg(short = 'n', long, default_value_t = 10)]
        limit: u64,

        /// Only show this category
        #[arg(long)]
        category: Option<String>,
    },
    /// Delete records of old articles
    Prune {
        /// Delete articles recorded more than this many days ago
        #[arg(long)]
        older_than_days: u32,
    },
    /// Telegram bot helpers
    Telegram {
        #[command(subcommand)]
        action: TelegramAction,
    },
    /// Run database migrations
    Migrate {
        #[command(subcommand)]
        action: MigrateAction,
    },
    /// Generate shell completion scripts
    Completions {
        /// Shell to generate completions for
        shell: clap_complete::Shell,
    },
    /// Generate man page(s)
    Man {
        /// Output directory for man pages (prints to stdout if not specified)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
}

#[derive(Subcommand)]
enum TelegramAction {
    /// Print the id of the chat that most recently messaged the bot
    ChatId,
}

#[derive(Subcommand)]
enum MigrateAction {
    /// Apply all pending migrations
    Up,
    /// Rollback the last migration
    Down,
    /// Show migration status
    Status,
    /// Fresh install - drop all tables and reapply migrations
    Fresh,
}

fn init_tracing(logging: &config::LoggingConfig) {
    let env_filter = match EnvFilter::try_from_default_env() {
        Ok(filter) => filter,
        Err(_) => EnvFilter::new(logging.filter_directive()),
    };

    let subscriber = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false);

    if logging.json {
        subscriber.json().init();
    } else {
        subscriber.init();
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    // Handle commands that need neither configuration nor logging first
    match &cli.command {
        Commands::Completions { shell } => {
            commands::meta::handle_completions(*shell)?;
            return Ok(());
        }
        Commands::Man { output } => {
            commands::meta::handle_man(output.clone())?;
            return Ok(());
        }
        _ => {}
    }

    // Load configuration (config files -> env vars -> defaults)
    let config = config::Config::load();
    init_tracing(&config.logging);

    let database_url = config.database.url.clone();

    // Ensure the database directory exists for SQLite; crawl and fetch only read
    let writes_database = !matches!(cli.command, Commands::Crawl { .. } | Commands::Fetch { .. });
    if writes_database
        && let Some(db_path) = newsdigest::db::sqlite_file_path(&database_url)
        && let Some(parent) = db_path.parent()
        && !parent.as_os_str().is_empty()
    {
        std::fs::create_dir_all(parent)?;
    }

    match cli.command {
        Commands::Run {
            once,
            dry_run,
            categories,
        } => {
            commands::run::handle_run(&config, &database_url, once, dry_run, &categories).await?;
        }
        Commands::Crawl { category, pages } => {
            commands::crawl::handle_crawl(&config, &database_url, category, pages).await?;
        }
        Commands::Fetch { url, output } => {
            commands::fetch::handle_fetch(&config, &url, output).await?;
        }
        Commands::Recent { limit, category } => {
            commands::recent::handle_recent(&database_url, limit, category.as_deref()).await?;
        }
        Commands::Prune { older_than_days } => {
            commands::prune::handle_prune(&database_url, older_than_days).await?;
        }
        Commands::Telegram { action } => {
            commands::telegram::handle_telegram(action, &config).await?;
        }
        Commands::Migrate { action } => {
            commands::migrate::handle_migrate(action, &database_url).await?;
        }
        Commands::Completions { .. } | Commands::Man { .. } => {}
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn run_accepts_repeated_categories() {
        let cli = Cli::try_parse_from([
            "newsdigest", "run", "--once", "-n", "-c", "the-thao", "-c", "tin-nong",
        ])
        .unwrap();
        match cli.command {
            Commands::Run {
                once,
                dry_run,
                categories,
            } => {
                assert!(once);
                assert!(dry_run);
                assert_eq!(categories, vec![Category::Sports, Category::Hot]);
            }
            _ => panic!("expected run"),
        }
    }

    #[test]
    fn unknown_category_is_rejected() {
        assert!(Cli::try_parse_from(["newsdigest", "crawl", "no-such-section"]).is_err());
    }

    #[test]
    fn prune_requires_days() {
        assert!(Cli::try_parse_from(["newsdigest", "prune"]).is_err());
        assert!(Cli::try_parse_from(["newsdigest", "prune", "--older-than-days", "30"]).is_ok());
    }

    #[test]
    fn fetch_rejects_invalid_url() {
        assert!(Cli::try_parse_from(["newsdigest", "fetch", "not a url"]).is_err());
    }
}

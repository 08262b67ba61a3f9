//! CLI command definitions, routing, and tracing setup.

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use color_eyre::eyre::Result;
use indicatif::{ProgressBar, ProgressStyle};
use tracing::{info, warn};

use inkpress_core::{Pipeline, PipelineOptions, PostOutcome, ProgressReporter};
use inkpress_llm::GenerationClient;
use inkpress_shared::{
    AppConfig, PostStatus, init_config, load_config, validate_api_key,
};
use inkpress_sheets::TopicSource;
use inkpress_wordpress::WordPressClient;

// ---------------------------------------------------------------------------
// CLI structure
// ---------------------------------------------------------------------------

/// Inkpress — turn spreadsheet topics into published blog posts.
#[derive(Parser)]
#[command(
    name = "inkpress",
    version,
    about = "Generate blog posts from Google Sheets topics and publish them to WordPress.",
    long_about = None,
)]
pub(crate) struct Cli {
    /// Log format: text (default) or json.
    #[arg(long, default_value = "text", global = true)]
    pub log_format: LogFormat,

    /// Verbosity level (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Command,
}

/// Log output format.
#[derive(Clone, Debug, clap::ValueEnum)]
pub(crate) enum LogFormat {
    Text,
    Json,
}

/// Flags shared by the generating subcommands.
#[derive(Debug, clap::Args)]
pub(crate) struct GenerateFlags {
    /// Model to use (defaults to the configured model).
    #[arg(short, long)]
    pub model: Option<String>,

    /// Output directory for markdown files (defaults to the configured dir).
    #[arg(short, long)]
    pub out: Option<String>,

    /// Also publish the generated post(s) to WordPress.
    #[arg(short, long)]
    pub publish: bool,

    /// WordPress post status.
    #[arg(long, value_enum)]
    pub status: Option<PostStatus>,
}

/// Top-level CLI subcommands.
#[derive(Subcommand)]
pub(crate) enum Command {
    /// List all available blog topics from the spreadsheet.
    List,

    /// Generate a blog post for one spreadsheet row.
    Generate {
        /// 1-based row number.
        row: u32,

        #[command(flatten)]
        flags: GenerateFlags,
    },

    /// Generate blog posts for every spreadsheet row.
    GenerateAll {
        #[command(flatten)]
        flags: GenerateFlags,
    },

    /// Generate a blog post for a free-form topic.
    Custom {
        /// Topic title.
        title: String,

        #[command(flatten)]
        flags: GenerateFlags,
    },

    /// Configuration management.
    Config {
        /// Config subcommand.
        #[command(subcommand)]
        action: ConfigAction,
    },
}

/// Config subcommands.
#[derive(Subcommand)]
pub(crate) enum ConfigAction {
    /// Initialize config file with defaults.
    Init,
    /// Show resolved configuration.
    Show,
}

// ---------------------------------------------------------------------------
// Tracing setup
// ---------------------------------------------------------------------------

/// Initialize tracing based on CLI flags.
pub(crate) fn init_tracing(cli: &Cli) {
    use tracing_subscriber::{EnvFilter, fmt};

    let filter = match cli.verbose {
        0 => "inkpress=info",
        1 => "inkpress=debug",
        _ => "inkpress=trace",
    };

    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter));

    match cli.log_format {
        LogFormat::Text => {
            fmt()
                .with_env_filter(env_filter)
                .with_target(false)
                .init();
        }
        LogFormat::Json => {
            fmt().json().with_env_filter(env_filter).init();
        }
    }
}

// ---------------------------------------------------------------------------
// Command dispatch
// ---------------------------------------------------------------------------

/// Run the CLI command.
pub(crate) async fn run(cli: Cli) -> Result<()> {
    match cli.command {
        Command::List => cmd_list().await,
        Command::Generate { row, flags } => cmd_generate(row, &flags).await,
        Command::GenerateAll { flags } => cmd_generate_all(&flags).await,
        Command::Custom { title, flags } => cmd_custom(&title, &flags).await,
        Command::Config { action } => match action {
            ConfigAction::Init => cmd_config_init().await,
            ConfigAction::Show => cmd_config_show().await,
        },
    }
}

// ---------------------------------------------------------------------------
// Pipeline construction
// ---------------------------------------------------------------------------

/// Build the pipeline from config plus CLI flags, falling back to
/// markdown-only mode when WordPress is unreachable.
async fn build_pipeline(config: &AppConfig, flags: &GenerateFlags) -> Result<Pipeline> {
    validate_api_key(config)?;

    let source = TopicSource::new(&config.sheets)?;
    let generator = GenerationClient::new(&config.openrouter)?;

    let publisher = if flags.publish {
        let client = WordPressClient::new(&config.wordpress)?;
        if client.test_connection().await {
            info!("WordPress connection verified");
            Some(client)
        } else {
            warn!("WordPress unreachable, falling back to markdown-only mode");
            println!("  WordPress connection failed — posts will be saved as markdown only.");
            None
        }
    } else {
        None
    };

    let options = PipelineOptions {
        model: flags
            .model
            .clone()
            .unwrap_or_else(|| config.openrouter.default_model.clone()),
        output_dir: PathBuf::from(
            flags
                .out
                .clone()
                .unwrap_or_else(|| config.defaults.output_dir.clone()),
        ),
        status: flags.status.unwrap_or(config.defaults.status),
    };

    Ok(Pipeline::new(source, generator, publisher, options))
}

// ---------------------------------------------------------------------------
// Command handlers
// ---------------------------------------------------------------------------

async fn cmd_list() -> Result<()> {
    let config = load_config()?;
    let source = TopicSource::new(&config.sheets)?;

    let spinner = spinner("Loading topics from Google Sheets");
    let topics = source.list_topics().await?;
    spinner.finish_and_clear();

    if topics.is_empty() {
        println!("No topics found in the spreadsheet.");
        return Ok(());
    }

    println!();
    println!("  Available blog topics:");
    println!();
    for topic in &topics {
        println!("  Row {}: {}", topic.index, topic.title);
        println!("    primary:   {}", topic.primary_keywords.join(", "));
        println!("    auxiliary: {}", topic.auxiliary_keywords.join(", "));
    }
    println!();
    println!("  Total: {} topics", topics.len());

    Ok(())
}

async fn cmd_generate(row: u32, flags: &GenerateFlags) -> Result<()> {
    let config = load_config()?;
    let pipeline = build_pipeline(&config, flags).await?;

    info!(row, "generating post for row");
    let spinner = spinner(&format!("Generating post for row {row}"));
    let outcome = pipeline.run_row(row).await;
    spinner.finish_and_clear();

    print_outcome(&outcome?);
    Ok(())
}

async fn cmd_custom(title: &str, flags: &GenerateFlags) -> Result<()> {
    let config = load_config()?;
    let pipeline = build_pipeline(&config, flags).await?;

    info!(title, "generating custom post");
    let spinner = spinner(&format!("Generating custom post: {title}"));
    let outcome = pipeline.run_custom(title).await;
    spinner.finish_and_clear();

    print_outcome(&outcome?);
    Ok(())
}

async fn cmd_generate_all(flags: &GenerateFlags) -> Result<()> {
    let config = load_config()?;
    let pipeline = build_pipeline(&config, flags).await?;

    if pipeline.publishing_enabled() {
        info!("publishing is enabled for this batch");
    }

    let reporter = CliProgress::new();
    let summary = pipeline.run_all(&reporter).await?;

    println!();
    println!("  Batch complete!");
    println!("  Attempted: {}", summary.attempted);
    println!("  Generated: {}", summary.generated);
    if pipeline.publishing_enabled() {
        println!("  Published: {}", summary.published);
    }
    println!("  Failed:    {}", summary.failures.len());
    println!("  Time:      {:.1}s", summary.elapsed.as_secs_f64());

    if !summary.failures.is_empty() {
        println!();
        println!("  Failures:");
        for failure in &summary.failures {
            println!("    Row {} ({}): {}", failure.index, failure.title, failure.error);
        }
    }
    println!();

    Ok(())
}

async fn cmd_config_init() -> Result<()> {
    let path = init_config()?;
    println!("Config initialized at: {}", path.display());
    Ok(())
}

async fn cmd_config_show() -> Result<()> {
    let config: AppConfig = load_config()?;
    let toml_str = toml::to_string_pretty(&config)?;
    println!("{toml_str}");
    Ok(())
}

/// Print the result of a single/custom run.
fn print_outcome(outcome: &PostOutcome) {
    println!();
    println!("  Post generated!");
    println!("  Title: {}", outcome.title);
    println!("  Slug:  {}", outcome.slug);
    println!("  File:  {}", outcome.file_path.display());
    match (&outcome.remote_id, &outcome.publish_error) {
        (Some(id), _) => println!("  WordPress post ID: {id}"),
        (None, Some(error)) => {
            println!("  Generated but NOT published: {error}");
            println!("  The markdown file was written; re-run with --publish once fixed.");
        }
        (None, None) => {}
    }
    println!();
}

// ---------------------------------------------------------------------------
// CLI progress reporter
// ---------------------------------------------------------------------------

fn spinner(message: &str) -> ProgressBar {
    let bar = ProgressBar::new_spinner();
    bar.set_style(
        ProgressStyle::with_template("{spinner:.cyan} {msg}")
            .unwrap()
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏"]),
    );
    bar.enable_steady_tick(std::time::Duration::from_millis(80));
    bar.set_message(message.to_string());
    bar
}

/// Batch progress reporter using an indicatif spinner.
struct CliProgress {
    spinner: ProgressBar,
}

impl CliProgress {
    fn new() -> Self {
        Self {
            spinner: spinner("Starting batch"),
        }
    }
}

impl ProgressReporter for CliProgress {
    fn phase(&self, name: &str) {
        self.spinner.set_message(name.to_string());
    }

    fn row_started(&self, index: u32, title: &str, current: usize, total: usize) {
        self.spinner
            .set_message(format!("[{current}/{total}] Row {index}: {title}"));
    }

    fn done(&self) {
        self.spinner.finish_and_clear();
    }
}

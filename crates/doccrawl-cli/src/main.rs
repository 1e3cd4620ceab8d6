use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::EnvFilter;

use doccrawl_core::{Config, CrawlEvent};
use doccrawl_core::config_file::load_config;
use doccrawl_parsing::{FieldExtractor, PatternCatalogBuilder};
use doccrawl_reporting::XmlSerializer;

mod output;

use output::ColorMode;

/// Journal issue crawler - extract article metadata from word-processor markup into XML
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl every category under the documents root and write one XML file per category
    Crawl(CrawlArgs),

    /// Extract one document and print its fields, without resolving PDFs or writing output
    Inspect {
        /// Path to the markup document
        file_path: PathBuf,

        /// Disable colored output
        #[arg(long)]
        no_color: bool,

        /// Print the XML the document would produce instead of a field listing
        #[arg(long)]
        xml: bool,
    },
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Root directory with one subdirectory of documents per category
    #[arg(long)]
    documents: Option<PathBuf>,

    /// Root directory with one subdirectory of issue PDF folders per category
    #[arg(long)]
    pdfs: Option<PathBuf>,

    /// Directory for the per-category XML files
    #[arg(short, long)]
    output: Option<PathBuf>,

    /// Append-only log of missing PDF directories
    #[arg(long)]
    missing_log: Option<PathBuf>,

    /// Number of categories processed concurrently
    #[arg(long)]
    category_workers: Option<usize>,

    /// Number of documents processed concurrently across all categories
    #[arg(long)]
    document_workers: Option<usize>,

    /// Only crawl this category (repeatable)
    #[arg(long = "category")]
    categories: Vec<String>,

    /// Disable colored output
    #[arg(long)]
    no_color: bool,

    /// Write tracing output to this file instead of stderr
    #[arg(long)]
    log_file: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    let cli = Cli::parse();

    match cli.command {
        Command::Crawl(args) => {
            let _guard = init_tracing(args.log_file.as_deref())?;
            crawl(args).await
        }
        Command::Inspect {
            file_path,
            no_color,
            xml,
        } => {
            let _guard = init_tracing(None)?;
            inspect(&file_path, no_color, xml)
        }
    }
}

/// Install the fmt subscriber. `RUST_LOG` overrides the default `warn` level.
fn init_tracing(log_file: Option<&Path>) -> anyhow::Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));

    let Some(path) = log_file else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
        return Ok(None);
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(path)
        .with_context(|| format!("cannot open log file {}", path.display()))?;
    let (writer, guard) = tracing_appender::non_blocking(file);
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(writer)
        .with_ansi(false)
        .init();
    Ok(Some(guard))
}

/// Resolve configuration: CLI flags > env vars > config file > defaults.
/// Defaults, then config files, then `DOCCRAWL_*` variables, then flags.
fn resolve_config(args: &CrawlArgs) -> Config {
    let mut config = Config::default();
    load_config().apply_to(&mut config);
    apply_env(&mut config, |key| std::env::var(key).ok());
    apply_flags(&mut config, args);
    config
}

fn apply_env(config: &mut Config, var: impl Fn(&str) -> Option<String>) {
    let path = |key: &str| var(key).filter(|v| !v.is_empty()).map(PathBuf::from);

    if let Some(dir) = path("DOCCRAWL_DOCUMENTS_DIR") {
        config.documents_dir = dir;
    }
    if let Some(dir) = path("DOCCRAWL_PDFS_DIR") {
        config.pdfs_dir = dir;
    }
    if let Some(dir) = path("DOCCRAWL_OUTPUT_DIR") {
        config.output_dir = dir;
    }
    if let Some(log) = path("DOCCRAWL_MISSING_LOG") {
        config.missing_pdf_log = log;
    }
    if let Some(n) = var("DOCCRAWL_WORKERS")
        .and_then(|v| v.parse::<usize>().ok())
        .filter(|&n| n > 0)
    {
        config.document_workers = n;
    }
}

fn apply_flags(config: &mut Config, args: &CrawlArgs) {
    if let Some(dir) = &args.documents {
        config.documents_dir = dir.clone();
    }
    if let Some(dir) = &args.pdfs {
        config.pdfs_dir = dir.clone();
    }
    if let Some(dir) = &args.output {
        config.output_dir = dir.clone();
    }
    if let Some(log) = &args.missing_log {
        config.missing_pdf_log = log.clone();
    }
    if let Some(n) = args.category_workers.filter(|&n| n > 0) {
        config.category_workers = n;
    }
    if let Some(n) = args.document_workers.filter(|&n| n > 0) {
        config.document_workers = n;
    }
    if !args.categories.is_empty() {
        config.categories = args.categories.clone();
    }
}

fn build_extractor(config: &Config) -> anyhow::Result<FieldExtractor> {
    let catalog = PatternCatalogBuilder::new()
        .fallback_max_words(config.fallback_max_words)
        .build()?;
    Ok(FieldExtractor::with_catalog(catalog))
}

async fn crawl(args: CrawlArgs) -> anyhow::Result<()> {
    let config = resolve_config(&args);
    let color = ColorMode(!args.no_color);
    let extractor = build_extractor(&config)?;

    let mut stdout = std::io::stdout();
    output::print_run_header(&mut stdout, &config, color)?;

    let progress_writer: Arc<Mutex<Box<dyn Write + Send>>> =
        Arc::new(Mutex::new(Box::new(std::io::stdout())));
    let progress_cb: doccrawl_ingest::ProgressFn = {
        let pw = Arc::clone(&progress_writer);
        Arc::new(move |event: CrawlEvent| {
            if let Ok(mut w) = pw.lock() {
                let _ = output::print_progress(&mut *w, &event, color);
                let _ = w.flush();
            }
        })
    };

    let summary =
        doccrawl_ingest::crawl(Arc::new(config), Arc::new(extractor), progress_cb).await?;

    writeln!(stdout)?;
    output::print_summary(&mut stdout, &summary, color)?;

    let failed = summary.failed().count();
    if failed > 0 {
        anyhow::bail!("{failed} categor{} failed", if failed == 1 { "y" } else { "ies" });
    }
    Ok(())
}

fn inspect(file_path: &Path, no_color: bool, xml: bool) -> anyhow::Result<()> {
    if !file_path.exists() {
        anyhow::bail!("File not found: {}", file_path.display());
    }

    let mut config = Config::default();
    load_config().apply_to(&mut config);
    let extractor = build_extractor(&config)?;

    let text = doccrawl_ingest::read_document(file_path)?;
    let spans = extractor.segmenter().spans(&text).len();
    tracing::debug!(path = %file_path.display(), spans, "segmented document");

    let mut stdout = std::io::stdout();
    let Some(issue) = extractor.extract_issue(&text) else {
        writeln!(
            stdout,
            "No article markers found in {}",
            file_path.display()
        )?;
        return Ok(());
    };

    if xml {
        let bytes = XmlSerializer::new().serialize(std::slice::from_ref(&issue))?;
        stdout.write_all(&bytes)?;
        writeln!(stdout)?;
        return Ok(());
    }

    let file_name = file_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| file_path.display().to_string());
    output::print_inspection(&mut stdout, &file_name, &issue, ColorMode(!no_color))?;
    Ok(())
}

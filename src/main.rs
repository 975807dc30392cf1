//! Firedash main entry point
//!
//! This is the command-line interface for submitting scraping jobs and saving
//! their results.

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use firedash::config::{resolve_config, Config};
use firedash::jobs::{
    CrawlOptions, DeepResearchOptions, Format, JobRequest, Location, MapOptions, PageOptions,
    SearchOptions, TextExportOptions,
};
use firedash::normalize::{map_links, normalize, research_report, text_export, NormalizedRecord};
use firedash::output::{
    combined_markdown, links_text, research_markdown, write_page_files, write_text,
};
use firedash::poller::PollProgress;
use firedash::scrape::scrape_many;
use firedash::{HttpTransport, JobRunner};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Firedash: a command-line client for a hosted web-scraping API
///
/// Firedash maps sites, crawls them, scrapes pages in batches, searches the
/// web, runs deep research and exports llms.txt files. Long-running jobs are
/// polled until they finish; press Ctrl-C to stop waiting.
#[derive(Parser, Debug)]
#[command(name = "firedash")]
#[command(version = "1.0.0")]
#[command(about = "A command-line client for a hosted web-scraping API", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Discover the URLs of a site
    Map(MapArgs),

    /// Crawl a site and collect its pages
    Crawl(CrawlArgs),

    /// Scrape a list of URLs as one provider-side batch job
    BatchScrape(BatchScrapeArgs),

    /// Scrape URLs one request each, in parallel
    Scrape(ScrapeArgs),

    /// Search the web and optionally scrape each hit
    Search(SearchArgs),

    /// Run a deep research job on a question
    Research(ResearchArgs),

    /// Generate llms.txt for a site
    Llmstxt(TextExportArgs),
}

#[derive(Args, Debug)]
struct OutputArgs {
    /// Write the result here instead of standard output
    #[arg(short, long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct PagesArgs {
    /// Also write one markdown file per page into this directory
    #[arg(long, value_name = "DIR")]
    pages_dir: Option<PathBuf>,
}

#[derive(Args, Debug)]
struct MapArgs {
    /// Site to map
    url: String,

    /// Only return links matching this search term
    #[arg(long)]
    search: Option<String>,

    /// Use the site's sitemap as well as link discovery
    #[arg(long)]
    use_sitemap: bool,

    /// Only return links listed in the sitemap (implies --use-sitemap)
    #[arg(long)]
    sitemap_only: bool,

    /// Include links on subdomains
    #[arg(long)]
    include_subdomains: bool,

    /// Maximum number of links (1-5000)
    #[arg(long, default_value_t = 100)]
    limit: u32,

    /// Provider-side timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct CrawlArgs {
    /// Site to crawl
    url: String,

    /// Maximum number of pages (1-10000)
    #[arg(long, default_value_t = 10)]
    limit: u32,

    /// Output formats, comma separated
    #[arg(long = "format", value_delimiter = ',', default_value = "markdown")]
    formats: Vec<Format>,

    /// Keep navigation, headers and footers
    #[arg(long)]
    full_page: bool,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    pages: PagesArgs,
}

#[derive(Args, Debug)]
struct PageArgs {
    /// Output formats, comma separated
    #[arg(long = "format", value_delimiter = ',', default_value = "markdown")]
    formats: Vec<Format>,

    /// Keep navigation, headers and footers
    #[arg(long)]
    full_page: bool,

    /// Do not block ads and cookie banners
    #[arg(long)]
    allow_ads: bool,

    /// Wait this long for the page to settle (milliseconds)
    #[arg(long)]
    wait_for_ms: Option<u64>,

    /// Provider-side timeout per page (milliseconds)
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Only keep elements matching these tags or selectors
    #[arg(long = "include-tag")]
    include_tags: Vec<String>,

    /// Drop elements matching these tags or selectors
    #[arg(long = "exclude-tag")]
    exclude_tags: Vec<String>,

    /// Browser actions as a JSON array
    #[arg(long, value_name = "JSON")]
    actions: Option<String>,

    /// Render pages as seen from this country (ISO code)
    #[arg(long)]
    country: Option<String>,

    /// Preferred languages, used with --country
    #[arg(long = "language")]
    languages: Vec<String>,

    /// Extra request header as `Name: value`
    #[arg(long = "header", value_name = "NAME: VALUE")]
    headers: Vec<String>,
}

#[derive(Args, Debug)]
struct BatchScrapeArgs {
    /// URLs to scrape
    urls: Vec<String>,

    /// Read additional URLs from a file, one per line
    #[arg(long, value_name = "PATH")]
    urls_file: Option<PathBuf>,

    #[command(flatten)]
    page: PageArgs,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    pages: PagesArgs,
}

#[derive(Args, Debug)]
struct ScrapeArgs {
    /// URLs to scrape
    #[arg(required = true)]
    urls: Vec<String>,

    /// Requests in flight at once (defaults to scrape.max-concurrency)
    #[arg(long)]
    concurrency: Option<usize>,

    #[command(flatten)]
    page: PageArgs,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    pages: PagesArgs,
}

#[derive(Args, Debug)]
struct SearchArgs {
    /// Search query
    query: String,

    /// Maximum number of results (1-10)
    #[arg(long, default_value_t = 5)]
    limit: u32,

    /// Result language
    #[arg(long)]
    lang: Option<String>,

    /// Result country
    #[arg(long)]
    country: Option<String>,

    /// Search location
    #[arg(long)]
    location: Option<String>,

    /// Time filter (e.g. `qdr:w`)
    #[arg(long)]
    tbs: Option<String>,

    /// Provider-side timeout in milliseconds
    #[arg(long)]
    timeout_ms: Option<u64>,

    /// Return hits only, without scraping their content
    #[arg(long)]
    no_scrape: bool,

    #[command(flatten)]
    output: OutputArgs,

    #[command(flatten)]
    pages: PagesArgs,
}

#[derive(Args, Debug)]
struct ResearchArgs {
    /// Research question
    query: String,

    /// Maximum research depth (1-10)
    #[arg(long, default_value_t = 7)]
    max_depth: u32,

    /// Time limit in seconds (30-600)
    #[arg(long, default_value_t = 270)]
    time_limit: u32,

    /// Maximum number of URLs to analyse (1-1000)
    #[arg(long, default_value_t = 20)]
    max_urls: u32,

    #[command(flatten)]
    output: OutputArgs,
}

#[derive(Args, Debug)]
struct TextExportArgs {
    /// Site to export
    url: String,

    /// Maximum number of pages (capped at 100)
    #[arg(long, default_value_t = 100)]
    max_urls: u32,

    /// Skip generating llms-full.txt
    #[arg(long)]
    no_full_text: bool,

    /// Write llms-full.txt here when it is produced
    #[arg(long, value_name = "PATH")]
    full_output: Option<PathBuf>,

    #[command(flatten)]
    output: OutputArgs,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    let config = match resolve_config(cli.config.as_deref()) {
        Ok(config) => {
            tracing::info!("Using provider at {}", config.api.base_url);
            config
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e).context("invalid configuration");
        }
    };

    let transport =
        Arc::new(HttpTransport::from_config(&config).context("failed to set up HTTP client")?);

    let cancel = CancellationToken::new();
    spawn_interrupt_handler(cancel.clone());

    let runner = JobRunner::new(transport.clone(), config.poll_budget()).with_cancellation(cancel.clone());

    let result = match cli.command {
        Command::Map(args) => handle_map(&runner, args).await,
        Command::Crawl(args) => handle_crawl(&runner, args).await,
        Command::BatchScrape(args) => handle_batch_scrape(&runner, args).await,
        Command::Scrape(args) => handle_scrape(&transport, &config, &cancel, args).await,
        Command::Search(args) => handle_search(&runner, args).await,
        Command::Research(args) => handle_research(&runner, args).await,
        Command::Llmstxt(args) => handle_text_export(&runner, args).await,
    };

    if let Err(e) = &result {
        tracing::error!("{:#}", e);
    }
    result
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("firedash=info,warn"),
            1 => EnvFilter::new("firedash=debug,info"),
            2 => EnvFilter::new("firedash=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Cancels `token` on the first Ctrl-C
fn spawn_interrupt_handler(token: CancellationToken) {
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted, no longer waiting for the provider");
            token.cancel();
        }
    });
}

fn log_progress(progress: &PollProgress<'_>) {
    let status = progress.status;
    let mut line = format!("Job {} is {}", progress.handle.id, status.state());
    if let Some(p) = &status.progress {
        line.push_str(&format!(" ({})", p));
    }
    if let Some(activity) = &status.activity {
        line.push_str(&format!(": {}", activity));
    }
    tracing::info!("{}", line);
}

async fn handle_map(runner: &JobRunner<HttpTransport>, args: MapArgs) -> anyhow::Result<()> {
    let options = MapOptions {
        search: args.search,
        ignore_sitemap: !(args.use_sitemap || args.sitemap_only),
        sitemap_only: args.sitemap_only,
        include_subdomains: args.include_subdomains,
        limit: args.limit,
        timeout_ms: args.timeout_ms,
    };
    let payload = runner
        .run(&JobRequest::map(args.url, options), log_progress)
        .await?;

    let links = map_links(&payload);
    tracing::info!("Found {} links", links.len());
    emit(args.output.output.as_deref(), &links_text(&links))
}

async fn handle_crawl(runner: &JobRunner<HttpTransport>, args: CrawlArgs) -> anyhow::Result<()> {
    let options = CrawlOptions {
        limit: args.limit,
        formats: args.formats,
        only_main_content: !args.full_page,
    };
    let payload = runner
        .run(&JobRequest::crawl(args.url, options), log_progress)
        .await?;

    emit_pages(&normalize(&payload), &args.output, &args.pages)
}

async fn handle_batch_scrape(
    runner: &JobRunner<HttpTransport>,
    args: BatchScrapeArgs,
) -> anyhow::Result<()> {
    let mut urls = args.urls;
    if let Some(path) = &args.urls_file {
        let contents = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read {}", path.display()))?;
        urls.extend(contents.lines().map(str::to_string));
    }
    if urls.iter().all(|u| u.trim().is_empty()) {
        bail!("no URLs given; pass them as arguments or with --urls-file");
    }

    let options = page_options(args.page)?;
    let payload = runner
        .run(&JobRequest::batch_scrape(&urls, options), log_progress)
        .await?;

    emit_pages(&normalize(&payload), &args.output, &args.pages)
}

async fn handle_scrape(
    transport: &HttpTransport,
    config: &Config,
    cancel: &CancellationToken,
    args: ScrapeArgs,
) -> anyhow::Result<()> {
    let options = page_options(args.page)?;
    let concurrency = args
        .concurrency
        .unwrap_or(config.scrape.max_concurrency as usize);

    let outcomes = tokio::select! {
        _ = cancel.cancelled() => bail!("scrape cancelled"),
        outcomes = scrape_many(transport, &args.urls, &options, concurrency) => outcomes,
    };

    let mut records = Vec::new();
    for outcome in outcomes {
        match outcome.result {
            Ok(record) => records.push(record),
            Err(e) => tracing::error!("{}: {}", outcome.url, e),
        }
    }
    if records.is_empty() {
        bail!("no page could be scraped");
    }

    emit_pages(&records, &args.output, &args.pages)
}

async fn handle_search(runner: &JobRunner<HttpTransport>, args: SearchArgs) -> anyhow::Result<()> {
    let options = SearchOptions {
        limit: args.limit,
        lang: args.lang,
        country: args.country,
        location: args.location,
        tbs: args.tbs,
        timeout_ms: args.timeout_ms,
        scrape_markdown: !args.no_scrape,
    };
    let payload = runner
        .run(&JobRequest::search(args.query, options), log_progress)
        .await?;
    let records = normalize(&payload);

    if records.iter().any(|r| !r.markdown.is_empty()) {
        return emit_pages(&records, &args.output, &args.pages);
    }

    tracing::info!("Found {} results", records.len());
    let listing: Vec<String> = records.iter().map(search_hit_line).collect();
    emit(args.output.output.as_deref(), &links_text(&listing))
}

async fn handle_research(
    runner: &JobRunner<HttpTransport>,
    args: ResearchArgs,
) -> anyhow::Result<()> {
    let options = DeepResearchOptions {
        max_depth: args.max_depth,
        time_limit_secs: args.time_limit,
        max_urls: args.max_urls,
    };
    let payload = runner
        .run(&JobRequest::deep_research(args.query, options), log_progress)
        .await?;

    let report = research_report(&payload);
    if report.final_analysis.is_empty() {
        tracing::warn!("Research finished without a final analysis");
    }
    tracing::info!(
        "Research used {} sources over {} steps",
        report.sources.len(),
        report.activities.len()
    );
    emit(args.output.output.as_deref(), &research_markdown(&report))
}

async fn handle_text_export(
    runner: &JobRunner<HttpTransport>,
    args: TextExportArgs,
) -> anyhow::Result<()> {
    let options = TextExportOptions {
        max_urls: args.max_urls,
        show_full_text: !args.no_full_text,
    };
    let payload = runner
        .run(&JobRequest::text_export(args.url, options), log_progress)
        .await?;

    let export = text_export(&payload);
    if export.llmstxt.is_empty() {
        tracing::warn!("Provider returned an empty llms.txt");
    }
    if let (Some(path), Some(full)) = (&args.full_output, &export.llms_full_txt) {
        write_text(path, full)?;
        tracing::info!("Saved llms-full.txt to {}", path.display());
    }
    emit(args.output.output.as_deref(), &export.llmstxt)
}

fn page_options(args: PageArgs) -> anyhow::Result<PageOptions> {
    let actions = args
        .actions
        .map(|raw| serde_json::from_str::<Value>(&raw))
        .transpose()
        .context("--actions is not valid JSON")?;

    let location = args.country.map(|country| Location {
        country,
        languages: args.languages,
    });

    let mut headers = BTreeMap::new();
    for header in &args.headers {
        let Some((name, value)) = header.split_once(':') else {
            bail!("header '{}' must look like 'Name: value'", header);
        };
        headers.insert(name.trim().to_string(), value.trim().to_string());
    }

    Ok(PageOptions {
        formats: args.formats,
        only_main_content: !args.full_page,
        block_ads: !args.allow_ads,
        wait_for_ms: args.wait_for_ms,
        timeout_ms: args.timeout_ms,
        include_tags: args.include_tags,
        exclude_tags: args.exclude_tags,
        actions,
        location,
        headers,
    })
}

fn search_hit_line(record: &NormalizedRecord) -> String {
    match record.metadata.get("description").and_then(Value::as_str) {
        Some(description) if !description.is_empty() => {
            format!("[{}]({}): {}", record.title, record.url, description)
        }
        _ => format!("[{}]({})", record.title, record.url),
    }
}

/// Writes combined markdown, plus per-page files when requested
fn emit_pages(
    records: &[NormalizedRecord],
    output: &OutputArgs,
    pages: &PagesArgs,
) -> anyhow::Result<()> {
    tracing::info!("Collected {} pages", records.len());
    if let Some(dir) = &pages.pages_dir {
        write_page_files(records, dir)?;
    }
    emit(output.output.as_deref(), &combined_markdown(records))
}

/// Saves `content` to `path`, or prints it when no path was given
fn emit(path: Option<&Path>, content: &str) -> anyhow::Result<()> {
    match path {
        Some(path) => {
            write_text(path, content)?;
            tracing::info!("Saved output to {}", path.display());
        }
        None => println!("{}", content),
    }
    Ok(())
}

//! Job requests and their per-operation options

use serde::Serialize;
use serde_json::Value;
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// The provider operations Firedash can submit
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OperationKind {
    Map,
    Crawl,
    BatchScrape,
    Search,
    DeepResearch,
    TextExport,
}

impl OperationKind {
    /// Endpoint the job is submitted to
    pub fn submit_path(&self) -> &'static str {
        match self {
            Self::Map => "/map",
            Self::Crawl => "/crawl",
            Self::BatchScrape => "/batch/scrape",
            Self::Search => "/search",
            Self::DeepResearch => "/deep-research",
            Self::TextExport => "/llmstxt",
        }
    }

    /// Endpoint reporting the status of job `id`
    pub fn status_path(&self, id: &str) -> String {
        match self {
            Self::Crawl => format!("/crawl/status/{}", id),
            _ => format!("{}/{}", self.submit_path(), id),
        }
    }

    /// Returns true if the submit call hands back a job to poll
    ///
    /// Text export may also answer inline; the submitter handles both.
    pub fn is_async(&self) -> bool {
        matches!(
            self,
            Self::Crawl | Self::BatchScrape | Self::DeepResearch | Self::TextExport
        )
    }

    /// Returns true if the target is a URL (or URL list) rather than a query
    pub fn targets_urls(&self) -> bool {
        !matches!(self, Self::Search | Self::DeepResearch)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Map => "map",
            Self::Crawl => "crawl",
            Self::BatchScrape => "batch-scrape",
            Self::Search => "search",
            Self::DeepResearch => "deep-research",
            Self::TextExport => "text-export",
        }
    }
}

impl fmt::Display for OperationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Output formats the provider can render a page into
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum Format {
    Markdown,
    Html,
    RawHtml,
    Links,
    Screenshot,
}

impl FromStr for Format {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "markdown" | "md" => Ok(Self::Markdown),
            "html" => Ok(Self::Html),
            "rawhtml" | "raw-html" => Ok(Self::RawHtml),
            "links" => Ok(Self::Links),
            "screenshot" => Ok(Self::Screenshot),
            other => Err(format!("unknown format '{}'", other)),
        }
    }
}

/// Options for a site map (URL discovery) request
#[derive(Debug, Clone, PartialEq)]
pub struct MapOptions {
    pub search: Option<String>,
    pub ignore_sitemap: bool,
    pub sitemap_only: bool,
    pub include_subdomains: bool,
    pub limit: u32,
    pub timeout_ms: Option<u64>,
}

impl Default for MapOptions {
    fn default() -> Self {
        Self {
            search: None,
            ignore_sitemap: true,
            sitemap_only: false,
            include_subdomains: false,
            limit: 100,
            timeout_ms: None,
        }
    }
}

/// Options for a site crawl
#[derive(Debug, Clone, PartialEq)]
pub struct CrawlOptions {
    pub limit: u32,
    pub formats: Vec<Format>,
    pub only_main_content: bool,
}

impl Default for CrawlOptions {
    fn default() -> Self {
        Self {
            limit: 10,
            formats: vec![Format::Markdown],
            only_main_content: true,
        }
    }
}

/// Geographic hints for page rendering
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Location {
    pub country: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub languages: Vec<String>,
}

/// Per-page rendering options shared by batch and one-shot scrapes
#[derive(Debug, Clone, PartialEq)]
pub struct PageOptions {
    pub formats: Vec<Format>,
    pub only_main_content: bool,
    pub block_ads: bool,
    pub wait_for_ms: Option<u64>,
    pub timeout_ms: Option<u64>,
    pub include_tags: Vec<String>,
    pub exclude_tags: Vec<String>,
    /// Browser actions; must be a JSON array when present
    pub actions: Option<Value>,
    pub location: Option<Location>,
    pub headers: BTreeMap<String, String>,
}

impl Default for PageOptions {
    fn default() -> Self {
        Self {
            formats: vec![Format::Markdown],
            only_main_content: true,
            block_ads: true,
            wait_for_ms: None,
            timeout_ms: None,
            include_tags: Vec::new(),
            exclude_tags: Vec::new(),
            actions: None,
            location: None,
            headers: BTreeMap::new(),
        }
    }
}

/// Options for a web search
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub limit: u32,
    pub lang: Option<String>,
    pub country: Option<String>,
    pub location: Option<String>,
    pub tbs: Option<String>,
    pub timeout_ms: Option<u64>,
    /// Ask the provider to scrape each hit into markdown
    pub scrape_markdown: bool,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            limit: 5,
            lang: None,
            country: None,
            location: None,
            tbs: None,
            timeout_ms: None,
            scrape_markdown: true,
        }
    }
}

/// Options for a deep research job
#[derive(Debug, Clone, PartialEq)]
pub struct DeepResearchOptions {
    pub max_depth: u32,
    pub time_limit_secs: u32,
    pub max_urls: u32,
}

impl Default for DeepResearchOptions {
    fn default() -> Self {
        Self {
            max_depth: 7,
            time_limit_secs: 270,
            max_urls: 20,
        }
    }
}

/// Options for an llms.txt text export
#[derive(Debug, Clone, PartialEq)]
pub struct TextExportOptions {
    pub max_urls: u32,
    pub show_full_text: bool,
}

impl Default for TextExportOptions {
    fn default() -> Self {
        Self {
            max_urls: 100,
            show_full_text: true,
        }
    }
}

/// Operation-specific options; the variant decides the operation kind
#[derive(Debug, Clone, PartialEq)]
pub enum JobOptions {
    Map(MapOptions),
    Crawl(CrawlOptions),
    BatchScrape(PageOptions),
    Search(SearchOptions),
    DeepResearch(DeepResearchOptions),
    TextExport(TextExportOptions),
}

impl JobOptions {
    pub fn kind(&self) -> OperationKind {
        match self {
            Self::Map(_) => OperationKind::Map,
            Self::Crawl(_) => OperationKind::Crawl,
            Self::BatchScrape(_) => OperationKind::BatchScrape,
            Self::Search(_) => OperationKind::Search,
            Self::DeepResearch(_) => OperationKind::DeepResearch,
            Self::TextExport(_) => OperationKind::TextExport,
        }
    }
}

/// A job to submit: a target (URL, URL list or query) plus options
///
/// Requests are immutable once built; the submitter only reads them.
#[derive(Debug, Clone, PartialEq)]
pub struct JobRequest {
    target: String,
    options: JobOptions,
}

impl JobRequest {
    pub fn new(target: impl Into<String>, options: JobOptions) -> Self {
        Self {
            target: target.into(),
            options,
        }
    }

    pub fn map(url: impl Into<String>, options: MapOptions) -> Self {
        Self::new(url, JobOptions::Map(options))
    }

    pub fn crawl(url: impl Into<String>, options: CrawlOptions) -> Self {
        Self::new(url, JobOptions::Crawl(options))
    }

    /// Batch scrape of several URLs; the target holds one URL per line
    pub fn batch_scrape<S: AsRef<str>>(urls: &[S], options: PageOptions) -> Self {
        let target = urls
            .iter()
            .map(|u| u.as_ref())
            .collect::<Vec<_>>()
            .join("\n");
        Self::new(target, JobOptions::BatchScrape(options))
    }

    pub fn search(query: impl Into<String>, options: SearchOptions) -> Self {
        Self::new(query, JobOptions::Search(options))
    }

    pub fn deep_research(query: impl Into<String>, options: DeepResearchOptions) -> Self {
        Self::new(query, JobOptions::DeepResearch(options))
    }

    pub fn text_export(url: impl Into<String>, options: TextExportOptions) -> Self {
        Self::new(url, JobOptions::TextExport(options))
    }

    pub fn kind(&self) -> OperationKind {
        self.options.kind()
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    pub fn options(&self) -> &JobOptions {
        &self.options
    }

    /// Non-blank lines of the target, trimmed
    pub fn target_lines(&self) -> Vec<&str> {
        self.target
            .lines()
            .map(str::trim)
            .filter(|l| !l.is_empty())
            .collect()
    }
}

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use super::logging::init_tracing;
use crate::cache::{FsResponseCache, ResponseCache};
use crate::config::{ConfigLayer, Settings};
use crate::error::AgentError;
use crate::generation::{ChatCompletionsGenerator, RetryPolicy};
use crate::index_storage::{IndexMetadata, IndexStore, JsonIndexStore, ReferenceFileMetadata};
use crate::indexer::build_index_from_file;
use crate::matcher::{MatchOptions, Scorer, best_candidate, match_candidates};
use crate::parsers::ReferenceDocument;
use crate::pipeline::Orchestrator;
use crate::slices::{FsSliceStore, SliceOptions, SliceStore, build_slices, derive_text_artifacts};
use crate::utils::format_path_with_tilde;
use crate::utils::terminal::sanitize_for_terminal;

const DEFAULT_SEARCH_LIMIT: u64 = 5;

#[derive(Parser)]
#[command(name = "amber-agent")]
#[command(version)]
#[command(about = "Turn plain-language requests into AMBER/cpptraj commands grounded in the manual", long_about = None)]
pub struct Cli {
    /// TOML config file (default: ./amber-agent.toml if present)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory holding the index and slice artifacts
    #[arg(long, global = true, env = "AMBER_AGENT_DOCS_DIR", value_name = "DIR")]
    pub docs_dir: Option<PathBuf>,

    /// Response cache directory
    #[arg(long, global = true, env = "AMBER_AGENT_CACHE_DIR", value_name = "DIR")]
    pub cache_dir: Option<PathBuf>,

    /// Increase log verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Generate a command for a plain-language request
    Generate {
        /// What you want to do, e.g. "rmsf of backbone by residue"
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        /// AMBER program the command is for
        #[arg(long)]
        program: Option<String>,

        #[arg(long, env = "OPENAI_MODEL")]
        model: Option<String>,

        #[arg(long)]
        temperature: Option<f32>,

        /// Fuzzy match confidence threshold (0-100)
        #[arg(long)]
        min_score: Option<u8>,

        /// Cap on manual text sent as context, in characters
        #[arg(long)]
        max_chars: Option<usize>,

        /// Retries for transient generation failures
        #[arg(long)]
        max_retries: Option<u32>,

        /// Skip the response cache for this request
        #[arg(long)]
        no_cache: bool,

        #[arg(long, value_enum)]
        scorer: Option<Scorer>,

        /// OpenAI-compatible API base URL
        #[arg(long, env = "OPENAI_BASE_URL")]
        base_url: Option<String>,

        #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true, hide = true)]
        api_key: Option<String>,
    },

    /// Show the best-matching indexed commands for a query
    Search {
        #[arg(required = true, num_args = 1..)]
        query: Vec<String>,

        #[arg(long)]
        min_score: Option<u8>,

        #[arg(long, default_value_t = DEFAULT_SEARCH_LIMIT, value_parser = clap::value_parser!(u64).range(1..))]
        limit: u64,

        #[arg(long, value_enum)]
        scorer: Option<Scorer>,
    },

    /// Build the index and per-command slices from the manual
    Build {
        /// Text of the manual's index section
        #[arg(long, value_name = "FILE")]
        index_section: PathBuf,

        /// Full manual as text, pages separated by form feeds
        #[arg(long, value_name = "FILE")]
        manual: PathBuf,

        /// Added to every indexed page number
        #[arg(long, default_value_t = 0, allow_hyphen_values = true)]
        page_offset: i32,

        /// Extra pages to include after each indexed span
        #[arg(long, default_value_t = 0)]
        trailing_pages: u32,

        /// Only write page artifacts
        #[arg(long)]
        skip_text: bool,
    },

    /// Write text artifacts for every page artifact
    ExtractText,

    /// Remove all cached responses
    ClearCache,

    /// Show statistics about the index and artifacts
    Stats,
}

pub fn run() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match cli.command {
        Commands::Generate {
            ref query,
            ref program,
            ref model,
            temperature,
            min_score,
            max_chars,
            max_retries,
            no_cache,
            scorer,
            ref base_url,
            ref api_key,
        } => {
            let overrides = ConfigLayer {
                program: program.clone(),
                model: model.clone(),
                temperature,
                min_score,
                max_chars,
                max_retries,
                scorer,
                base_url: base_url.clone(),
                api_key: api_key.clone(),
                ..ConfigLayer::default()
            };
            let settings = resolve_settings(&cli, overrides)?;
            generate(&settings, &query.join(" "), !no_cache)
        }
        Commands::Search { ref query, min_score, limit, scorer } => {
            let settings =
                resolve_settings(&cli, ConfigLayer { min_score, scorer, ..ConfigLayer::default() })?;
            search(&settings, &query.join(" "), limit as usize)
        }
        Commands::Build { ref index_section, ref manual, page_offset, trailing_pages, skip_text } => {
            let settings = resolve_settings(&cli, ConfigLayer::default())?;
            let options = SliceOptions { page_offset, trailing_pages };
            build(&settings, index_section, manual, options, skip_text)
        }
        Commands::ExtractText => extract_text(&resolve_settings(&cli, ConfigLayer::default())?),
        Commands::ClearCache => clear_cache(&resolve_settings(&cli, ConfigLayer::default())?),
        Commands::Stats => show_stats(&resolve_settings(&cli, ConfigLayer::default())?),
    }
}

/// Defaults, then the config file, then environment and flags
fn resolve_settings(cli: &Cli, overrides: ConfigLayer) -> Result<Settings> {
    let mut layer = ConfigLayer::load_file(cli.config.as_deref())?;
    layer.merge(ConfigLayer {
        docs_dir: cli.docs_dir.clone(),
        cache_dir: cli.cache_dir.clone(),
        ..overrides
    });
    Ok(layer.finalize()?)
}

fn generate(settings: &Settings, query: &str, use_cache: bool) -> Result<()> {
    let index = JsonIndexStore::new(&settings.docs_dir).load()?;
    let slices = FsSliceStore::new(&settings.docs_dir);
    let similarity = settings.scorer.build();
    let generator = ChatCompletionsGenerator::new(&settings.base_url, settings.api_key.clone(), settings.timeout)
        .map_err(AgentError::from)?;
    let mut cache = FsResponseCache::new(&settings.cache_dir);

    let outcome = Orchestrator::new(&index, &slices, similarity.as_ref(), &generator, &mut cache)
        .with_retry(RetryPolicy { max_retries: settings.max_retries, ..RetryPolicy::default() })
        .run(query, &settings.generate_options(use_cache))?;

    if outcome.cached {
        eprintln!("[cache] {} (score {})", outcome.command.entry.name, outcome.command.score);
    }
    println!("{}", sanitize_for_terminal(&outcome.text));
    Ok(())
}

fn search(settings: &Settings, query: &str, limit: usize) -> Result<()> {
    let index = JsonIndexStore::new(&settings.docs_dir).load()?;
    let similarity = settings.scorer.build();

    let candidates = match_candidates(
        query,
        index.entries(),
        MatchOptions::top(settings.min_score, limit),
        similarity.as_ref(),
    );
    if candidates.is_empty() {
        let best = best_candidate(query, index.entries(), similarity.as_ref())
            .map(|candidate| (candidate.entry.name, candidate.score));
        return Err(AgentError::NoConfidentMatch { query: query.to_string(), best }.into());
    }

    println!("{:>5}  {:<24} PAGES", "SCORE", "COMMAND");
    for candidate in &candidates {
        println!(
            "{:>5}  {:<24} {}",
            candidate.score,
            candidate.entry.name,
            candidate.entry.format_pages()
        );
    }
    Ok(())
}

fn build(
    settings: &Settings,
    index_section: &Path,
    manual: &Path,
    options: SliceOptions,
    skip_text: bool,
) -> Result<()> {
    let (index, report) = build_index_from_file(index_section)?;
    let reference = ReferenceDocument::open(manual)?;
    let reference_meta = ReferenceFileMetadata::from_path(manual, reference.page_count())
        .with_context(|| format!("Failed to read metadata for {}", manual.display()))?;

    let mut index_store = JsonIndexStore::new(&settings.docs_dir);
    index_store.save(&index)?;

    let mut slices = FsSliceStore::new(&settings.docs_dir);
    let slice_report = build_slices(&index, &reference, &mut slices, options)?;
    let text_artifacts = if skip_text { 0 } else { derive_text_artifacts(&mut slices)? };

    let mut metadata = IndexMetadata::new(index_section, reference_meta, &report, options);
    metadata.sliced = slice_report.written;
    metadata.text_artifacts = text_artifacts;
    index_store.save_metadata(&metadata)?;

    println!(
        "[OK] Indexed {} commands ({} duplicate lines merged, {} lines skipped)",
        report.entries,
        report.merged,
        report.skipped()
    );
    println!(
        "[OK] Wrote {} slices to {} ({} clamped, {} out of range)",
        slice_report.written,
        format_path_with_tilde(slices.dir()),
        slice_report.clamped,
        slice_report.out_of_range.len()
    );
    if !skip_text {
        println!("[OK] Wrote {} text artifacts", text_artifacts);
    }
    Ok(())
}

fn extract_text(settings: &Settings) -> Result<()> {
    let mut slices = FsSliceStore::new(&settings.docs_dir);
    if slices.page_keys()?.is_empty() {
        return Err(AgentError::config(format!(
            "no slice artifacts in {}. Run: amber-agent build --index-section <FILE> --manual <FILE>",
            slices.dir().display()
        ))
        .into());
    }
    let written = derive_text_artifacts(&mut slices)?;
    println!("[OK] Wrote {} text artifacts to {}", written, format_path_with_tilde(slices.dir()));
    Ok(())
}

fn clear_cache(settings: &Settings) -> Result<()> {
    if !settings.cache_dir.exists() {
        println!("Cache directory doesn't exist");
        return Ok(());
    }
    let removed = FsResponseCache::new(&settings.cache_dir).clear()?;
    println!("Cache cleared ({} responses removed)", removed);
    Ok(())
}

fn show_stats(settings: &Settings) -> Result<()> {
    let index_store = JsonIndexStore::new(&settings.docs_dir);
    let index = index_store.load()?;
    let slices = FsSliceStore::new(&settings.docs_dir);
    let sliced = slices.page_keys()?.len();
    let cached = FsResponseCache::new(&settings.cache_dir).len()?;

    let total_pages: u64 = index.entries().map(|e| u64::from(e.page_count())).sum();

    println!("AMBER Manual Index Statistics");
    println!("=============================");
    println!("Indexed commands: {}", index.len());
    println!("  Indexed pages: {}", total_pages);
    println!("  Slice artifacts: {}", sliced);
    if sliced < index.len() {
        println!("  Commands without slices: {}", index.len() - sliced);
    }
    println!("Cached responses: {}", cached);
    println!();
    println!("Docs directory: {}", format_path_with_tilde(&settings.docs_dir));
    println!("Cache directory: {}", format_path_with_tilde(&settings.cache_dir));

    match index_store.load_metadata() {
        Some(metadata) => {
            println!("Built: {}", metadata.built_at.format("%Y-%m-%d %H:%M:%S"));
            println!(
                "Reference: {} ({} pages)",
                format_path_with_tilde(&metadata.reference.path),
                metadata.reference.page_count
            );
            match metadata.reference.is_stale() {
                Ok(true) => println!("Status: STALE (reference document changed since build)"),
                Ok(false) => println!("Status: up to date"),
                Err(e) => println!("Status: unknown ({})", e),
            }
        }
        None => println!("Status: unknown (no build metadata)"),
    }

    Ok(())
}

use std::env;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{bail, Context};
use indicatif::{ProgressBar, ProgressStyle};
use tracing_subscriber::EnvFilter;

use docrank_core::config::{expand_path, Config, Settings};
use docrank_core::loader::PlainTextLoader;
use docrank_core::types::DocType;
use docrank_embed::default_embedder;
use docrank_hybrid::{BatchReport, Filter, HybridEngine, SearchRequest, Stats, TagMatch};
use docrank_vector::MemoryVectorIndex;

const USAGE: &str = "Usage:
  docrank ingest [DIR] [--json]
  docrank query [DIR] \"<query>\" [--top-k N] [--type TYPE] [--tags a,b] [--all-tags] [--expand] [--intent] [--json]";

#[derive(Debug, Default)]
struct QueryArgs {
    positional: Vec<String>,
    top_k: Option<usize>,
    doc_type: Option<String>,
    tags: Vec<String>,
    all_tags: bool,
    expand: bool,
    intent: bool,
    json: bool,
}

fn parse_args(args: &[String]) -> anyhow::Result<QueryArgs> {
    let mut parsed = QueryArgs::default();
    let mut i = 0;
    while i < args.len() {
        match args[i].as_str() {
            "--top-k" | "-k" => {
                let value = args.get(i + 1).context("--top-k requires a number")?;
                parsed.top_k = Some(value.parse().with_context(|| format!("--top-k expects a number, got '{value}'"))?);
                i += 1;
            }
            "--type" | "-t" => {
                parsed.doc_type = Some(args.get(i + 1).context("--type requires a document type")?.clone());
                i += 1;
            }
            "--tags" => {
                let value = args.get(i + 1).context("--tags requires a comma-separated list")?;
                parsed.tags = value.split(',').map(str::trim).filter(|t| !t.is_empty()).map(str::to_string).collect();
                i += 1;
            }
            "--all-tags" => parsed.all_tags = true,
            "--expand" | "-e" => parsed.expand = true,
            "--intent" | "-i" => parsed.intent = true,
            "--json" => parsed.json = true,
            flag if flag.starts_with('-') => bail!("unknown flag '{flag}'\n{USAGE}"),
            value => parsed.positional.push(value.to_string()),
        }
        i += 1;
    }
    Ok(parsed)
}

fn data_dir(config: &Config, explicit: Option<&String>) -> PathBuf {
    match explicit {
        Some(dir) => expand_path(dir),
        None => {
            let dir: String = config.get("data.raw_txt_dir").unwrap_or_else(|_| "data/txt".to_string());
            expand_path(dir)
        }
    }
}

type Engine = HybridEngine<MemoryVectorIndex>;

/// Loads every `.txt` file under `dir` into a fresh engine.
fn build_engine(settings: &Settings, dir: &Path, quiet: bool) -> anyhow::Result<(Engine, BatchReport)> {
    let engine = HybridEngine::new(settings.clone(), default_embedder(&settings.embedding), MemoryVectorIndex::new())?;
    let loaded = PlainTextLoader::new().load_directory(dir);

    let pb = if quiet { ProgressBar::hidden() } else { ProgressBar::new(loaded.len() as u64) };
    pb.set_style(
        ProgressStyle::default_bar()
            .template("{spinner:.green} [{elapsed_precise}] [{bar:40.cyan/blue}] {pos}/{len} documents ({percent}%) {msg}")?
            .progress_chars("#>-"),
    );

    let mut documents = Vec::with_capacity(loaded.len());
    for (path, outcome) in loaded {
        match outcome {
            Ok(document) => documents.push(document),
            Err(e) => {
                tracing::warn!(path = %path.display(), error = %e, "skipping unreadable file");
                pb.inc(1);
            }
        }
    }

    let report = engine.ingest_batch_with_progress(documents, |outcome| {
        pb.set_message(outcome.source.clone());
        pb.inc(1);
    });
    pb.finish_with_message("done");
    Ok((engine, report))
}

fn print_stats(stats: &Stats) {
    println!("📊 {} documents, {} chunks", stats.total_documents, stats.total_chunks);
    for doc_type in DocType::ALL {
        let docs = stats.documents_by_type.get(&doc_type).copied().unwrap_or_default();
        let chunks = stats.chunks_by_type.get(&doc_type).copied().unwrap_or_default();
        println!("  {doc_type:<16} {docs:>5} docs {chunks:>6} chunks");
    }
}

fn ingest(config: &Config, args: &QueryArgs) -> anyhow::Result<()> {
    let settings = config.settings()?;
    let dir = data_dir(config, args.positional.first());
    if !args.json {
        println!("Ingesting from {}", dir.display());
    }
    let (engine, report) = build_engine(&settings, &dir, args.json)?;
    let stats = engine.get_stats();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&stats)?);
        return Ok(());
    }

    println!();
    for outcome in &report.outcomes {
        match &outcome.result {
            Ok(record) => println!("  ✓ {} ({}, {} chunks)", record.source, record.doc_type, record.chunk_count),
            Err(e) => println!("  ✗ {}: {e}", outcome.source),
        }
    }
    println!("\n✅ Ingest complete: {} succeeded, {} failed", report.succeeded, report.failed);
    print_stats(&stats);
    Ok(())
}

fn query(config: &Config, args: &QueryArgs) -> anyhow::Result<()> {
    let (dir, query_text) = match args.positional.as_slice() {
        [q] => (data_dir(config, None), q.clone()),
        [dir, q] => (data_dir(config, Some(dir)), q.clone()),
        _ => bail!("query needs exactly one query string\n{USAGE}"),
    };

    let settings = config.settings()?;
    let (engine, report) = build_engine(&settings, &dir, true)?;
    if report.failed > 0 {
        eprintln!("⚠️  {} documents failed to ingest", report.failed);
    }

    let mut filter = Filter::default();
    if let Some(name) = &args.doc_type {
        match DocType::from_str(name) {
            Ok(doc_type) => filter.doc_types.push(doc_type),
            Err(_) => {
                eprintln!("Unknown document type '{name}'; expected one of meeting_minutes, progress_report, research_paper, general");
                return Ok(());
            }
        }
    }
    filter.tags.clone_from(&args.tags);
    filter.tag_match = if args.all_tags { TagMatch::All } else { TagMatch::Any };

    let mut request = SearchRequest::new(&query_text)
        .expand(args.expand)
        .detect_intent(args.intent)
        .intent_filter(args.intent)
        .filter(filter);
    if let Some(k) = args.top_k {
        request = request.top_k(k);
    }
    let outcome = engine.search(&request)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
        return Ok(());
    }

    println!("🔍 Query: {}", outcome.query);
    if let Some(expanded) = &outcome.expanded_query {
        println!("   expanded: {expanded}");
    }
    if let Some(intent) = outcome.intent {
        println!("   intent: {intent}");
    }
    println!("   weights: vector={:.2} lexical={:.2}", outcome.weights.vector, outcome.weights.lexical);
    println!("\nFound {} results", outcome.results.len());
    for r in &outcome.results {
        println!(
            "\n  {}. combined={:.4} vector={:.4} lexical={:.4} (bm25 {:.4})  {}  [{}]",
            r.rank, r.combined_score, r.vector_score, r.lexical_score, r.lexical_raw_score, r.chunk.id, r.chunk.doc_type
        );
        if !r.chunk.semantic_tags.is_empty() {
            let tags: Vec<&str> = r.chunk.semantic_tags.iter().map(String::as_str).collect();
            println!("     tags: {}", tags.join(", "));
        }
        let snippet: String = r.chunk.text.chars().take(160).collect();
        println!("     📝 {}", snippet.replace('\n', " "));
    }
    Ok(())
}

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();

    let config = Config::load().map_err(|e| {
        eprintln!("Error loading config: {e}");
        e
    })?;

    let mut args: Vec<String> = env::args().skip(1).collect();
    if args.is_empty() {
        eprintln!("{USAGE}");
        std::process::exit(1);
    }
    let cmd = args.remove(0);
    let parsed = parse_args(&args)?;
    match cmd.as_str() {
        "ingest" => ingest(&config, &parsed),
        "query" => query(&config, &parsed),
        _ => {
            eprintln!("Unknown command: {cmd}\n{USAGE}");
            std::process::exit(1);
        }
    }
}

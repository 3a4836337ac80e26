//! CLI - Command Line Interface
//!
//! Available Commands:
//! - glyphh build --schema s.yaml --concepts c.json --out m.glyphh
//! - glyphh inspect m.glyphh
//! - glyphh search m.glyphh "text" [--top-k N] [--filter key=value]...
//! - glyphh intent m.glyphh "text" [--threshold T]
//! - glyphh predict --schema s.yaml --sequence seq.json --from NAME [--steps N]

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::info;
use tracing_subscriber::EnvFilter;

use glyphh_cognition::{BeamSearchPredictor, IntentEncoder, TemporalEncoder};
use glyphh_core::{Attributes, Concept, EncoderConfig, IntentPattern, Value};
use glyphh_model::{GlyphhModel, SearchFilters};

/// CLI Errors
#[derive(Debug, Clone, PartialEq, Error)]
pub enum CliError {
    #[error("Invalid filter '{0}': expected key=value")]
    InvalidFilter(String),

    #[error("Invalid metadata '{0}': expected key=value")]
    InvalidMetadata(String),

    #[error("Invalid concept file: {0}")]
    ConceptFile(String),

    #[error("Unknown concept: {0}")]
    UnknownConcept(String),

    #[error("Model has no intent patterns")]
    NoIntents,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Pretty,
    Json,
}

/// Glyphh CLI
#[derive(Parser, Debug)]
#[command(name = "glyphh")]
#[command(author, version, about, long_about = None)]
pub(crate) struct Cli {
    /// Verbose output (filter with RUST_LOG)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Output format
    #[arg(long, global = true, value_enum, default_value_t = OutputFormat::Pretty)]
    pub output: OutputFormat,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub(crate) enum Commands {
    /// Encode concepts into a model artifact
    Build(BuildArgs),

    /// Summarise a model artifact
    Inspect(InspectArgs),

    /// Similarity search over a model
    Search(SearchArgs),

    /// Classify a phrase with the model's intent patterns
    Intent(IntentArgs),

    /// Predict future states from a concept sequence
    Predict(PredictArgs),
}

#[derive(Args, Debug)]
pub(crate) struct BuildArgs {
    /// Schema YAML (schemaless when omitted)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// JSON array of {"name": ..., "attributes": {...}}
    #[arg(short, long)]
    pub concepts: PathBuf,

    /// Output artifact path
    #[arg(short, long)]
    pub out: PathBuf,

    /// Model name
    #[arg(long)]
    pub name: Option<String>,

    /// Model version
    #[arg(long)]
    pub model_version: Option<String>,

    /// JSON array of intent patterns
    #[arg(long)]
    pub intents: Option<PathBuf>,

    /// Register the built-in intent patterns
    #[arg(long)]
    pub default_intents: bool,

    /// Metadata entry (key=value), repeatable
    #[arg(long = "metadata")]
    pub metadata: Vec<String>,
}

#[derive(Args, Debug)]
pub(crate) struct InspectArgs {
    /// Model artifact
    pub model: PathBuf,
}

#[derive(Args, Debug)]
pub(crate) struct SearchArgs {
    /// Model artifact
    pub model: PathBuf,

    /// Search text
    pub query: String,

    /// Number of results
    #[arg(short = 'k', long, default_value_t = 5)]
    pub top_k: usize,

    /// Exact-match filter (key=value), repeatable
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,
}

#[derive(Args, Debug)]
pub(crate) struct IntentArgs {
    /// Model artifact
    pub model: PathBuf,

    /// Phrase to classify
    pub query: String,

    /// Confidence needed for a high-confidence match
    #[arg(short, long, default_value_t = 0.5)]
    pub threshold: f64,
}

#[derive(Args, Debug)]
pub(crate) struct PredictArgs {
    /// Schema YAML (schemaless when omitted)
    #[arg(short, long)]
    pub schema: Option<PathBuf>,

    /// JSON array of concepts in observed order
    #[arg(long)]
    pub sequence: PathBuf,

    /// Concept to predict from
    #[arg(long)]
    pub from: String,

    /// Transitions to look ahead
    #[arg(long, default_value_t = 1)]
    pub steps: usize,

    /// Hypotheses kept per step
    #[arg(long, default_value_t = 3)]
    pub beam_width: usize,

    /// Keep raw (unsnapped) states between steps
    #[arg(long)]
    pub no_drift_reduction: bool,

    /// Edge type recorded for each transition
    #[arg(long, default_value = "transition")]
    pub edge_type: String,
}

/// Parse CLI arguments and execute commands
pub async fn run_cli() -> anyhow::Result<()> {
    let cli = Cli::parse();

    if cli.verbose {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug")))
            .init();
    }

    let output = execute(cli).await?;
    print!("{output}");
    Ok(())
}

/// Run a parsed command and render its output
pub(crate) async fn execute(cli: Cli) -> anyhow::Result<String> {
    let format = cli.output;
    match cli.command {
        Commands::Build(args) => cmd_build(args, format).await,
        Commands::Inspect(args) => cmd_inspect(args, format).await,
        Commands::Search(args) => cmd_search(args, format).await,
        Commands::Intent(args) => cmd_intent(args, format).await,
        Commands::Predict(args) => cmd_predict(args, format),
    }
}

async fn cmd_build(args: BuildArgs, format: OutputFormat) -> anyhow::Result<String> {
    let config = load_config(args.schema.as_deref())?;
    let concepts = read_concepts(&args.concepts)?;

    let mut builder = GlyphhModel::builder().config(config.clone());
    if let Some(name) = args.name {
        builder = builder.name(name);
    }
    if let Some(version) = args.model_version {
        builder = builder.version(version);
    }
    for raw in &args.metadata {
        let (key, value) = raw
            .split_once('=')
            .filter(|(k, _)| !k.is_empty())
            .ok_or_else(|| CliError::InvalidMetadata(raw.clone()))?;
        builder = builder.metadata(key, value);
    }

    if args.default_intents || args.intents.is_some() {
        let mut intents = IntentEncoder::new(EncoderConfig::schemaless(config.dimension, config.seed)?)?;
        if args.default_intents {
            intents.add_defaults()?;
        }
        if let Some(path) = &args.intents {
            for pattern in read_intents(path)? {
                intents.add_pattern(pattern)?;
            }
        }
        builder = builder.intent_encoder(intents);
    }

    let mut model = builder.build()?;
    for concept in &concepts {
        model.encode(concept)?;
    }
    model.to_file_async(&args.out).await?;
    info!("Built '{}' from {} concepts", model.name(), concepts.len());

    let summary = BuildSummary {
        name: model.name().to_string(),
        glyphs: model.len(),
        intents: model.intent_encoder().map(IntentEncoder::len).unwrap_or(0),
        path: args.out.display().to_string(),
    };
    render(format, &summary, |out| {
        writeln!(
            out,
            "Built model '{}' with {} glyphs ({} intents) -> {}",
            summary.name, summary.glyphs, summary.intents, summary.path
        )
    })
}

async fn cmd_inspect(args: InspectArgs, format: OutputFormat) -> anyhow::Result<String> {
    let model = open_model(&args.model).await?;
    let config = model.config();

    let summary = ModelSummary {
        name: model.name().to_string(),
        version: model.version().to_string(),
        dimension: config.dimension,
        seed: config.seed,
        layers: config.layers.iter().map(|l| l.name.clone()).collect(),
        concepts: model.glyphs().iter().map(|g| g.name.clone()).collect(),
        metadata: model.metadata().clone(),
        intents: model
            .intent_encoder()
            .map(|i| i.get_patterns().iter().map(|p| p.intent_type.clone()).collect())
            .unwrap_or_default(),
    };

    render(format, &summary, |out| {
        writeln!(out, "Model: {} v{}", summary.name, summary.version)?;
        writeln!(out, "  Dimension: {}", summary.dimension)?;
        writeln!(out, "  Seed: {}", summary.seed)?;
        if summary.layers.is_empty() {
            writeln!(out, "  Layers: (schemaless)")?;
        } else {
            writeln!(out, "  Layers: {}", summary.layers.join(", "))?;
        }
        writeln!(out, "  Glyphs: {}", summary.concepts.len())?;
        for (key, value) in &summary.metadata {
            writeln!(out, "  {key}: {value}")?;
        }
        if !summary.intents.is_empty() {
            writeln!(out, "  Intents: {}", summary.intents.join(", "))?;
        }
        Ok(())
    })
}

async fn cmd_search(args: SearchArgs, format: OutputFormat) -> anyhow::Result<String> {
    let model = open_model(&args.model).await?;

    let mut filters = SearchFilters::new();
    for raw in &args.filters {
        let (key, value) = parse_filter(raw)?;
        filters.insert(key, value);
    }

    let hits: Vec<SearchHit> = model
        .similarity_search(args.query.as_str(), args.top_k, &filters)?
        .into_iter()
        .map(|r| SearchHit {
            concept: r.concept,
            score: r.score,
            attributes: plain_attributes(&r.attributes),
        })
        .collect();

    render(format, &hits, |out| {
        writeln!(out, "Search results for '{}':", args.query)?;
        if hits.is_empty() {
            writeln!(out, "  (no matches)")?;
        }
        for (rank, hit) in hits.iter().enumerate() {
            let attributes: Vec<String> = hit.attributes.iter().map(|(k, v)| format!("{k}={v}")).collect();
            writeln!(
                out,
                "  {}. {} ({:.4}) {}",
                rank + 1,
                hit.concept,
                hit.score,
                attributes.join(" ")
            )?;
        }
        Ok(())
    })
}

async fn cmd_intent(args: IntentArgs, format: OutputFormat) -> anyhow::Result<String> {
    let model = open_model(&args.model).await?;
    if model.intent_encoder().is_none_or(IntentEncoder::is_empty) {
        return Err(CliError::NoIntents.into());
    }

    let matched = model.match_intent(&args.query)?;
    let report = IntentReport {
        high_confidence: matched.is_high_confidence(args.threshold),
        intent_type: matched.intent_type,
        confidence: matched.confidence,
        structured_query: matched.structured_query,
    };

    render(format, &report, |out| {
        let marker = if report.high_confidence { "✓" } else { "?" };
        match &report.intent_type {
            Some(intent) => {
                writeln!(
                    out,
                    "{marker} '{}' -> {} (confidence: {:.2})",
                    args.query, intent, report.confidence
                )?;
                writeln!(out, "  query: {}", report.structured_query)
            }
            None => writeln!(out, "{marker} '{}' -> no match", args.query),
        }
    })
}

fn cmd_predict(args: PredictArgs, format: OutputFormat) -> anyhow::Result<String> {
    let config = load_config(args.schema.as_deref())?;
    let sequence = read_concepts(&args.sequence)?;

    let mut temporal = TemporalEncoder::new(config)?;
    for pair in sequence.windows(2) {
        temporal.create_edge(&pair[0], &pair[1], &args.edge_type)?;
    }

    let start = sequence
        .iter()
        .find(|c| c.name == args.from)
        .ok_or_else(|| CliError::UnknownConcept(args.from.clone()))?;
    let current = temporal.encoder().encode(start)?;

    let predictor = BeamSearchPredictor::new(args.beam_width, !args.no_drift_reduction)?;
    let predictions: Vec<PredictionView> = predictor
        .predict(&current, temporal.edges(), args.steps)?
        .into_iter()
        .map(|p| PredictionView {
            concept: p.concept,
            score: p.score,
            path: p.path,
        })
        .collect();

    render(format, &predictions, |out| {
        writeln!(
            out,
            "Predictions from '{}' ({} steps, {} edges):",
            args.from,
            args.steps,
            temporal.len()
        )?;
        if predictions.is_empty() {
            writeln!(out, "  (none)")?;
        }
        for (rank, p) in predictions.iter().enumerate() {
            writeln!(
                out,
                "  {}. {} ({:.4}) via {}",
                rank + 1,
                p.concept,
                p.score,
                p.path.join(" -> ")
            )?;
        }
        Ok(())
    })
}

#[derive(Debug, Serialize)]
struct BuildSummary {
    name: String,
    glyphs: usize,
    intents: usize,
    path: String,
}

#[derive(Debug, Serialize)]
struct ModelSummary {
    name: String,
    version: String,
    dimension: usize,
    seed: u64,
    layers: Vec<String>,
    concepts: Vec<String>,
    metadata: BTreeMap<String, String>,
    intents: Vec<String>,
}

#[derive(Debug, Serialize)]
pub(crate) struct SearchHit {
    pub concept: String,
    pub score: f64,
    pub attributes: BTreeMap<String, serde_json::Value>,
}

#[derive(Debug, Serialize)]
struct IntentReport {
    intent_type: Option<String>,
    confidence: f64,
    high_confidence: bool,
    structured_query: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct PredictionView {
    concept: String,
    score: f64,
    path: Vec<String>,
}

fn render<T, F>(format: OutputFormat, value: &T, pretty: F) -> anyhow::Result<String>
where
    T: Serialize,
    F: FnOnce(&mut String) -> std::fmt::Result,
{
    match format {
        OutputFormat::Json => {
            let mut out = serde_json::to_string_pretty(value)?;
            out.push('\n');
            Ok(out)
        }
        OutputFormat::Pretty => {
            let mut out = String::new();
            pretty(&mut out)?;
            Ok(out)
        }
    }
}

fn plain_attributes(attributes: &Attributes) -> BTreeMap<String, serde_json::Value> {
    attributes
        .iter()
        .map(|(k, v)| (k.clone(), serde_json::Value::from(v)))
        .collect()
}

/// `key=value`; the value is read as JSON when it parses, as a string otherwise
pub(crate) fn parse_filter(raw: &str) -> Result<(String, Value), CliError> {
    let (key, value) = raw
        .split_once('=')
        .filter(|(k, _)| !k.is_empty())
        .ok_or_else(|| CliError::InvalidFilter(raw.to_string()))?;

    let value = serde_json::from_str::<serde_json::Value>(value)
        .ok()
        .and_then(|json| Value::try_from(json).ok())
        .unwrap_or_else(|| Value::from(value));
    Ok((key.to_string(), value))
}

fn load_config(schema: Option<&Path>) -> anyhow::Result<EncoderConfig> {
    let config = match schema {
        Some(path) => EncoderConfig::from_yaml_file(path)
            .with_context(|| format!("loading schema {}", path.display()))?,
        None => EncoderConfig::default(),
    };
    Ok(config.apply_env_overrides()?)
}

pub(crate) fn read_concepts(path: &Path) -> anyhow::Result<Vec<Concept>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    let json: serde_json::Value =
        serde_json::from_str(&content).with_context(|| format!("parsing {}", path.display()))?;

    let serde_json::Value::Array(items) = json else {
        return Err(CliError::ConceptFile(format!("{} is not a JSON array", path.display())).into());
    };
    items
        .into_iter()
        .map(|item| Concept::from_json(item).map_err(|e| CliError::ConceptFile(e.to_string()).into()))
        .collect()
}

fn read_intents(path: &Path) -> anyhow::Result<Vec<IntentPattern>> {
    let content = std::fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    serde_json::from_str(&content).with_context(|| format!("parsing intents {}", path.display()))
}

async fn open_model(path: &Path) -> anyhow::Result<GlyphhModel> {
    GlyphhModel::from_file_async(path)
        .await
        .with_context(|| format!("loading model {}", path.display()))
}

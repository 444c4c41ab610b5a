//! Analyze Command
//!
//! Runs the full coaching pipeline over a transcript file and renders
//! the parsed report.
//!
//! Usage:
//!   repcoach analyze <transcript> [--scenario <yaml>] [--thread-id <id>]
//!   repcoach analyze <transcript> --json
//!   repcoach analyze <transcript> --output report.md

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use console::style;
use tokio::runtime::Runtime;
use tracing::info;

use crate::config::ConfigLoader;
use crate::llm::create_provider;
use crate::memory::InMemoryStore;
use crate::pipeline::{AnalysisRequest, FeedbackPipeline};
use crate::report::{self, ParsedReport};
use crate::types::{CoachError, Result, ScenarioContext, Transcript};

/// Analyze run options (consolidated parameters)
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Transcript file to analyze
    pub transcript: PathBuf,
    /// Optional scenario context YAML
    pub scenario: Option<PathBuf>,
    /// Conversation thread for memory recall
    pub thread_id: Option<String>,
    /// Resource owning the thread (defaults to "cli")
    pub resource_id: Option<String>,
    /// Model override
    pub model: Option<String>,
    /// Emit the parsed report as JSON instead of styled text
    pub json: bool,
    /// Write the combined raw report to a file
    pub output: Option<PathBuf>,
}

pub fn run(options: AnalyzeOptions) -> Result<()> {
    let transcript_text = fs::read_to_string(&options.transcript)?;
    let transcript = Transcript::parse(&transcript_text);
    if transcript.is_empty() {
        return Err(CoachError::Transcript(format!(
            "no speaker turns found in {}",
            options.transcript.display()
        )));
    }

    let scenario = match options.scenario.as_deref() {
        Some(path) => Some(load_scenario(path)?),
        None => None,
    };

    let mut config = ConfigLoader::load()?;
    if let Some(model) = options.model {
        config.llm.model = model;
    }

    let provider = create_provider(&config.llm.provider_config())?;
    let mut pipeline = FeedbackPipeline::new(provider).with_settings(config.pipeline.settings());

    let mut request = AnalysisRequest::new(transcript.render());
    if let Some(scenario) = scenario {
        request = request.with_scenario(scenario);
    }
    if let Some(thread_id) = options.thread_id.as_deref() {
        let resource_id = options.resource_id.as_deref().unwrap_or("cli");
        request = request.with_thread(resource_id, thread_id);
        pipeline = pipeline.with_memory(Arc::new(InMemoryStore::default()));
    }

    info!(
        transcript = %options.transcript.display(),
        turns = transcript.len(),
        model = %config.llm.model,
        "Starting transcript analysis"
    );

    let rt = Runtime::new().map_err(CoachError::Io)?;
    let bundle = rt.block_on(pipeline.run(&request))?;

    let parsed = report::parse(&bundle.summary_analysis, &bundle.detailed_feedback);

    if let Some(path) = options.output.as_deref() {
        fs::write(path, &bundle.combined_report)?;
        println!(
            "{} Wrote combined report to {}",
            style("✓").green(),
            path.display()
        );
    }

    if options.json {
        println!("{}", serde_json::to_string_pretty(&parsed)?);
    } else {
        render_report(&parsed);
    }

    Ok(())
}

fn load_scenario(path: &Path) -> Result<ScenarioContext> {
    let raw = fs::read_to_string(path)?;
    ScenarioContext::from_yaml(&raw)
}

fn render_report(report: &ParsedReport) {
    println!("\n{}", style("Coaching Report").bold().underlined());

    render_section("Summary", &report.summary);
    render_section("Performance Feedback", &report.feedback);

    if let Some(suggestions) = report.suggestions.as_deref() {
        render_section("Suggestions", suggestions);
    }

    if !report.segments.is_empty() {
        println!("\n{}", style("Annotated Segments").bold());
        println!("{}", "─".repeat(40));
        for segment in &report.segments {
            println!("\n{}", style(&segment.title).cyan());
            println!("{}", segment.content);
        }
    }

    println!("\n{}", style("Ratings").bold());
    println!("{}", "─".repeat(40));
    for entry in &report.scores {
        println!("  {:<20} {:>3}", entry.category, entry.score);
    }
    println!();
}

fn render_section(title: &str, body: &str) {
    println!("\n{}", style(title).bold());
    println!("{}", "─".repeat(40));
    println!("{}", body);
}

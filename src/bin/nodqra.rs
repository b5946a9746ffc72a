//! CLI binary for nodqra-mindmap.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `GenerationConfig` and prints the mind map (and optional detailed
//! summary) as JSON or Markdown.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use nodqra_mindmap::pipeline::input::resolve_input;
use nodqra_mindmap::render::{mind_map_markdown, summary_markdown};
use nodqra_mindmap::{
    generate_detailed_summary, generate_mind_map_from_input, write_json, write_text,
    DetailedSummary, GenerationConfig, GenerationProgressCallback, Language, MindMapData,
    MindMapError, ProgressCallback, Stage,
};
use serde::Serialize;
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn red(s: &str) -> String {
    format!("\x1b[31m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Spinner that cycles the localized "analyzing" messages while the model works.
struct CliProgressCallback {
    bar: ProgressBar,
    language: Language,
    started: Mutex<Option<Instant>>,
    rotator: Mutex<Option<JoinHandle<()>>>,
}

impl CliProgressCallback {
    fn new(language: Language) -> Arc<Self> {
        let bar = ProgressBar::new_spinner();
        bar.set_style(
            ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}  {elapsed:.dim}")
                .unwrap_or_else(|_| ProgressStyle::default_spinner())
                .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]),
        );
        bar.set_prefix(language.messages().analyzing);
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self {
            bar,
            language,
            started: Mutex::new(None),
            rotator: Mutex::new(None),
        })
    }

    fn stop_rotation(&self) {
        if let Some(handle) = self.rotator.lock().unwrap().take() {
            handle.abort();
        }
    }

    fn elapsed(&self) -> String {
        let secs = self
            .started
            .lock()
            .unwrap()
            .take()
            .map(|t| t.elapsed().as_secs_f64())
            .unwrap_or(0.0);
        dim(&format!("{secs:.1}s"))
    }
}

impl GenerationProgressCallback for CliProgressCallback {
    fn on_stage_start(&self, stage: Stage) {
        *self.started.lock().unwrap() = Some(Instant::now());
        match stage {
            Stage::Generating | Stage::Summarizing => {
                if stage == Stage::Generating {
                    self.bar
                        .println(format!("  {}", dim(self.language.messages().analyzing_sub)));
                }
                let messages = self.language.messages().analyzing_messages;
                let bar = self.bar.clone();
                bar.set_message(messages[0]);
                let handle = tokio::spawn(async move {
                    let mut i = 0;
                    let mut tick = tokio::time::interval(Duration::from_millis(2500));
                    tick.tick().await;
                    loop {
                        tick.tick().await;
                        i = (i + 1) % messages.len();
                        bar.set_message(messages[i]);
                    }
                });
                if let Some(old) = self.rotator.lock().unwrap().replace(handle) {
                    old.abort();
                }
            }
            Stage::Reading | Stage::Encoding => self.bar.set_message(format!("{stage}…")),
        }
    }

    fn on_stage_complete(&self, stage: Stage) {
        self.stop_rotation();
        self.bar
            .println(format!("  {} {:<12} {}", green("✓"), stage, self.elapsed()));
    }

    fn on_error(&self, stage: Stage, _error: &str) {
        self.stop_rotation();
        self.bar
            .println(format!("  {} {:<12} {}", red("✗"), stage, self.elapsed()));
    }
}

impl Drop for CliProgressCallback {
    fn drop(&mut self) {
        self.stop_rotation();
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Mind map of a lecture, French (default), JSON on stdout
  nodqra lecture.pdf

  # English Markdown cards plus a detailed summary
  nodqra --lang en --summary --format markdown slides.pptx

  # Write JSON to a file
  nodqra photo-of-notes.jpg -o notes.json

  # From a URL (declared type taken from Content-Type)
  nodqra https://arxiv.org/pdf/1706.03762

  # Only check whether a file would be accepted (no API key needed)
  nodqra --check-only report.docx

SUPPORTED FORMATS:
  PDF, PPTX, JPG, PNG (by declared type; any name ending in .pdf is accepted)

ENVIRONMENT VARIABLES:
  NODQRA_API_KEY     Gemini API key (checked first)
  GEMINI_API_KEY     Gemini API key
  GOOGLE_API_KEY     Gemini API key
  NODQRA_MODEL       Override model ID (default gemini-2.5-flash)
  NODQRA_LANG        Output language: fr, en, ar
  RUST_LOG           Fine-grained log filter (overrides -v/-q)
"#;

/// Turn documents into mind maps and detailed summaries.
#[derive(Parser, Debug)]
#[command(
    name = "nodqra",
    version,
    about = "Turn PDFs, images and slide decks into mind maps with Gemini",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local file path or HTTP/HTTPS URL.
    input: String,

    /// Write output to this file instead of stdout.
    #[arg(short, long, env = "NODQRA_OUTPUT")]
    output: Option<PathBuf>,

    /// Output language: fr, en, ar.
    #[arg(short, long, env = "NODQRA_LANG", default_value = "fr")]
    lang: Language,

    /// Model ID.
    #[arg(long, env = "NODQRA_MODEL", default_value = nodqra_mindmap::provider::DEFAULT_MODEL)]
    model: String,

    /// Gemini API key (otherwise read from the environment).
    #[arg(long)]
    api_key: Option<String>,

    /// API endpoint root.
    #[arg(long, env = "NODQRA_BASE_URL", default_value = nodqra_mindmap::provider::DEFAULT_BASE_URL)]
    base_url: String,

    /// Also generate the detailed summary (a second model call).
    #[arg(short, long)]
    summary: bool,

    /// Output format.
    #[arg(short, long, value_enum, default_value = "json")]
    format: FormatArg,

    /// Sampling temperature (0.0–2.0); service default when unset.
    #[arg(long, env = "NODQRA_TEMPERATURE")]
    temperature: Option<f32>,

    /// Per-request timeout in seconds; none by default.
    #[arg(long, env = "NODQRA_TIMEOUT")]
    timeout: Option<u64>,

    /// HTTP download timeout in seconds for URL inputs.
    #[arg(long, env = "NODQRA_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Path to a text file replacing the mind-map instruction (`{lang}` is substituted).
    #[arg(long)]
    instruction: Option<PathBuf>,

    /// Validate the input and print its detected type; no generation.
    #[arg(long)]
    check_only: bool,

    /// Disable the spinner.
    #[arg(long, env = "NODQRA_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "NODQRA_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "NODQRA_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug, PartialEq, Eq)]
enum FormatArg {
    Json,
    Markdown,
}

/// JSON document printed when `--summary` is set.
#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct Combined<'a> {
    mind_map: &'a MindMapData,
    summary: &'a DetailedSummary,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The spinner provides the feedback; library INFO logs would only
    // fight with it.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.check_only;
    let filter = if cli.verbose {
        "debug"
    } else if cli.quiet || show_progress {
        "error"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    match run(&cli, show_progress).await {
        Ok(()) => Ok(()),
        Err(e) => {
            // Library errors get the localized one-liner; details only with -v.
            if let Some(lib) = e.downcast_ref::<MindMapError>() {
                eprintln!("{} {}", red("✘"), bold(lib.user_message(cli.lang)));
                if cli.verbose {
                    eprintln!("{}", dim(&format!("{e:#}")));
                }
                std::process::exit(1);
            }
            Err(e)
        }
    }
}

async fn run(cli: &Cli, show_progress: bool) -> Result<()> {
    // ── Check-only mode ──────────────────────────────────────────────────
    if cli.check_only {
        let doc = resolve_input(&cli.input, cli.download_timeout).await?;
        let kind = doc.kind()?;
        println!("File:          {}", doc.name);
        println!("Declared type: {}", doc.declared_mime);
        println!("Accepted as:   {:?} ({})", kind, kind.mime_type());
        return Ok(());
    }

    let progress: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new(cli.lang) as Arc<dyn GenerationProgressCallback>)
    } else {
        None
    };
    let config = build_config(cli, progress).await?;

    // ── Generate ─────────────────────────────────────────────────────────
    let start = Instant::now();
    let mind_map = generate_mind_map_from_input(&cli.input, &config).await?;
    let summary = if cli.summary {
        Some(generate_detailed_summary(&mind_map, cli.lang, &config).await?)
    } else {
        None
    };
    // Drop the spinner before printing.
    drop(config);

    // ── Emit ─────────────────────────────────────────────────────────────
    match (&cli.output, cli.format) {
        (Some(path), FormatArg::Json) => match &summary {
            Some(s) => write_json(&Combined { mind_map: &mind_map, summary: s }, path).await?,
            None => write_json(&mind_map, path).await?,
        },
        (Some(path), FormatArg::Markdown) => {
            write_text(render_markdown(&mind_map, summary.as_ref(), cli.lang), path).await?
        }
        (None, FormatArg::Json) => {
            let json = match &summary {
                Some(s) => serde_json::to_string_pretty(&Combined { mind_map: &mind_map, summary: s }),
                None => serde_json::to_string_pretty(&mind_map),
            }
            .context("Failed to serialise output")?;
            println!("{json}");
        }
        (None, FormatArg::Markdown) => {
            let md = render_markdown(&mind_map, summary.as_ref(), cli.lang);
            io::stdout()
                .lock()
                .write_all(md.as_bytes())
                .context("Failed to write to stdout")?;
        }
    }

    if !cli.quiet {
        eprintln!(
            "{}  {} · {} cards{}  {}",
            green("✔"),
            bold(&mind_map.main_topic),
            mind_map.nodes.len(),
            if summary.is_some() { " + summary" } else { "" },
            dim(&format!("{}ms", start.elapsed().as_millis())),
        );
        if let Some(path) = &cli.output {
            eprintln!("   →  {}", bold(&path.display().to_string()));
        }
    }
    Ok(())
}

fn render_markdown(map: &MindMapData, summary: Option<&DetailedSummary>, lang: Language) -> String {
    let mut md = mind_map_markdown(map, lang);
    if let Some(s) = summary {
        md.push_str("\n---\n\n");
        md.push_str(&summary_markdown(&map.main_topic, s, lang));
    }
    md
}

/// Map CLI args to `GenerationConfig`.
async fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<GenerationConfig> {
    let mut builder = GenerationConfig::builder()
        .model(&cli.model)
        .base_url(&cli.base_url)
        .language(cli.lang)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref path) = cli.instruction {
        let template = tokio::fs::read_to_string(path)
            .await
            .with_context(|| format!("Failed to read instruction from {:?}", path))?;
        builder = builder.instruction(template);
    }
    if let Some(ref key) = cli.api_key {
        builder = builder.api_key(key);
    }
    if let Some(t) = cli.temperature {
        builder = builder.temperature(t);
    }
    if let Some(secs) = cli.timeout {
        builder = builder.request_timeout_secs(secs);
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    Ok(builder.build()?)
}

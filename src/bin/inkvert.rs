//! CLI binary for inkvert.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `InvertConfig`, runs the batch, and writes the resulting PDFs.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use inkvert::{
    inspect, run_batch, BatchProgressCallback, DocumentOutcome, InvertConfig, InvertedDocument,
    ProgressCallback, SourceFile,
};
use std::io;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;
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
fn cyan(s: &str) -> String {
    format!("\x1b[36m{s}\x1b[0m")
}

/// Truncate `s` to at most `max` bytes, backing up to a char boundary so
/// multibyte filenames in error messages never split mid-character.
fn truncate_message(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}\u{2026}", &s[..end])
}

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: one bar across the whole batch, one log line
/// per finished document. Works correctly when documents complete
/// out-of-order under concurrency.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        let bar = ProgressBar::new(0); // length set in on_batch_start

        let style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} files  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);

        bar.set_style(style);
        bar.set_prefix("Inverting");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }
}

impl BatchProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total: usize) {
        self.bar.set_length(total as u64);
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Inverting {total} document(s)…"))
        ));
    }

    fn on_document_complete(&self, completed: usize, total: usize, source_name: &str) {
        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}",
            green("✓"),
            completed,
            total,
            source_name,
        ));
        self.bar.inc(1);
    }

    fn on_document_error(&self, completed: usize, total: usize, source_name: &str, error: &str) {
        // Truncate very long error messages to keep output tidy.
        let first_line = error.lines().next().unwrap_or(error);
        let msg = truncate_message(first_line, 79);

        self.bar.println(format!(
            "  {} {:>3}/{:<3}  {}  {}",
            red("✗"),
            completed,
            total,
            source_name,
            red(&msg),
        ));
        self.bar.inc(1);
    }

    fn on_batch_complete(&self, total: usize, succeeded: usize) {
        let failed = total.saturating_sub(succeeded);
        self.bar.finish_and_clear();

        if failed == 0 {
            eprintln!(
                "{} {} document(s) inverted successfully",
                green("✔"),
                bold(&succeeded.to_string())
            );
        } else {
            eprintln!(
                "{} {}/{} documents inverted  ({} failed)",
                if failed == total { red("✘") } else { cyan("⚠") },
                bold(&succeeded.to_string()),
                total,
                red(&failed.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Invert one document (writes slides_inverted.pdf next to it)
  inkvert slides.pdf

  # Invert a whole directory's worth, four at a time, into ./out
  inkvert decks/*.pdf --concurrency 4 -o out/

  # Higher resolution, smaller file
  inkvert --resolution 300 --quality 0.6 poster.pdf

  # Inspect page geometry and metadata, no conversion
  inkvert --inspect-only document.pdf

  # Machine-readable summary
  inkvert --json report.pdf > summary.json

ENVIRONMENT VARIABLES:
  INKVERT_RESOLUTION   Rasterization DPI (72-300)
  INKVERT_QUALITY      JPEG quality (0.0-1.0)
  INKVERT_CONCURRENCY  Documents converted in parallel

SETUP:
  inkvert needs the PDFium shared library at runtime. Download a release
  from bblanchon/pdfium-binaries and place libpdfium next to the inkvert
  executable, or install it system-wide.
"#;

/// Invert PDF colors for ink-friendly printing.
#[derive(Parser, Debug)]
#[command(
    name = "inkvert",
    version,
    about = "Invert PDF colors for ink-friendly printing",
    long_about = "Rasterize each page of one or more PDFs, invert every pixel's color \
(dark backgrounds become light), and reassemble the pages into new PDFs that keep the \
original page sizes. Built for printing dark-themed slide decks and documents without \
draining the toner cartridge.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files to invert.
    #[arg(required = true)]
    inputs: Vec<PathBuf>,

    /// Directory to write outputs into (default: next to each input).
    #[arg(short, long, env = "INKVERT_OUTPUT_DIR")]
    output_dir: Option<PathBuf>,

    /// Rasterization resolution in DPI (72–300).
    #[arg(long, env = "INKVERT_RESOLUTION", default_value_t = 150,
          value_parser = clap::value_parser!(u32).range(72..=300))]
    resolution: u32,

    /// JPEG quality for re-encoded pages (0.0–1.0).
    #[arg(short, long, env = "INKVERT_QUALITY", default_value_t = 0.8)]
    quality: f32,

    /// Number of documents converted in parallel.
    #[arg(short, long, env = "INKVERT_CONCURRENCY", default_value_t = 2)]
    concurrency: usize,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "INKVERT_PASSWORD")]
    password: Option<String>,

    /// Print a JSON batch summary to stdout instead of human output.
    #[arg(long, env = "INKVERT_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "INKVERT_NO_PROGRESS")]
    no_progress: bool,

    /// Print document metadata and page geometry only, no conversion.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "INKVERT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(long, env = "INKVERT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // Suppress INFO-level library logs when the progress bar is active;
    // the bar provides all the feedback that matters to the user.
    let show_progress = !cli.quiet && !cli.no_progress && !cli.json;
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

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        for input in &cli.inputs {
            let info = inspect(input)
                .await
                .with_context(|| format!("Failed to inspect {}", input.display()))?;

            if cli.json {
                println!(
                    "{}",
                    serde_json::to_string_pretty(&info)
                        .context("Failed to serialize document info")?
                );
            } else {
                println!("File:    {}", input.display());
                if let Some(ref t) = info.title {
                    println!("Title:   {}", t);
                }
                if let Some(ref a) = info.author {
                    println!("Author:  {}", a);
                }
                println!("Pages:   {}", info.page_count);
                for (i, page) in info.pages.iter().enumerate() {
                    println!(
                        "  page {:>3}: {:.1} x {:.1} pt",
                        i + 1,
                        page.width_pt,
                        page.height_pt
                    );
                }
            }
        }
        return Ok(());
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn BatchProgressCallback>)
    } else {
        None
    };

    let mut builder = InvertConfig::builder()
        .resolution(cli.resolution)
        .quality(cli.quality)
        .concurrency(cli.concurrency);
    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Load inputs ──────────────────────────────────────────────────────
    // Unreadable files are reported up front; the batch only sees sources
    // that could at least be read and look like PDFs.
    let mut sources: Vec<SourceFile> = Vec::with_capacity(cli.inputs.len());
    let mut source_paths: Vec<PathBuf> = Vec::with_capacity(cli.inputs.len());
    let mut read_failures: Vec<(PathBuf, String)> = Vec::new();
    for input in &cli.inputs {
        match inkvert::pipeline::input::read_source(input) {
            Ok(source) => {
                sources.push(source);
                source_paths.push(input.clone());
            }
            Err(e) => read_failures.push((input.clone(), e.to_string())),
        }
    }
    for (path, err) in &read_failures {
        eprintln!("{} {}: {}", red("✗"), path.display(), err);
    }
    if sources.is_empty() && !read_failures.is_empty() {
        anyhow::bail!("No readable PDF inputs");
    }

    // ── Run batch ────────────────────────────────────────────────────────
    let output = run_batch(sources, &config).await;

    // ── Write outputs ────────────────────────────────────────────────────
    if let Some(ref dir) = cli.output_dir {
        tokio::fs::create_dir_all(dir)
            .await
            .with_context(|| format!("Failed to create output directory {}", dir.display()))?;
    }

    let mut write_failures = 0usize;
    for (doc, dest) in planned_outputs(&output.outcomes, &source_paths, cli.output_dir.as_deref()) {
        if let Err(e) = tokio::fs::write(&dest, &doc.data).await {
            eprintln!("{} Failed to write {}: {}", red("✗"), dest.display(), e);
            write_failures += 1;
        } else if !cli.quiet && !cli.json {
            eprintln!(
                "   {}  {}",
                bold(&dest.display().to_string()),
                dim(&format!(
                    "{} pages, {} KB, {} ms",
                    doc.stats.pages,
                    doc.stats.output_bytes / 1024,
                    doc.stats.total_ms
                ))
            );
        }
    }

    if cli.json {
        #[derive(serde::Serialize)]
        struct JsonSummary<'a> {
            summary: &'a inkvert::BatchSummary,
            documents: Vec<&'a inkvert::DocumentStats>,
            failures: Vec<JsonFailure<'a>>,
        }
        #[derive(serde::Serialize)]
        struct JsonFailure<'a> {
            source_name: &'a str,
            error: String,
        }
        let json = JsonSummary {
            summary: &output.summary,
            documents: output
                .outcomes
                .iter()
                .filter_map(|o| match o {
                    inkvert::DocumentOutcome::Success(d) => Some(&d.stats),
                    inkvert::DocumentOutcome::Failure { .. } => None,
                })
                .collect(),
            failures: output
                .failures()
                .map(|(name, err)| JsonFailure {
                    source_name: name,
                    error: err.to_string(),
                })
                .collect(),
        };
        println!(
            "{}",
            serde_json::to_string_pretty(&json).context("Failed to serialise summary")?
        );
    } else if !cli.quiet && !show_progress {
        eprintln!(
            "Inverted {}/{} documents in {} ms",
            output.summary.succeeded, output.summary.total, output.summary.total_ms
        );
        for (name, err) in output.failures() {
            eprintln!("  {} {}: {}", red("✗"), name, err);
        }
    }

    if output.summary.failed > 0 || !read_failures.is_empty() || write_failures > 0 {
        std::process::exit(1);
    }
    Ok(())
}

/// Pair each successful outcome with the destination derived from the input
/// path it was submitted from.
///
/// `outcomes` and `source_paths` are index-aligned (the batch returns
/// outcomes in submission order), so inputs that share a basename in
/// different directories still resolve to distinct destinations.
fn planned_outputs<'a>(
    outcomes: &'a [DocumentOutcome],
    source_paths: &[PathBuf],
    output_dir: Option<&Path>,
) -> Vec<(&'a InvertedDocument, PathBuf)> {
    outcomes
        .iter()
        .zip(source_paths)
        .filter_map(|(outcome, input)| match outcome {
            DocumentOutcome::Success(doc) => {
                let dest =
                    inkvert::pipeline::input::output_path(input, output_dir, &doc.output_name);
                Some((doc, dest))
            }
            DocumentOutcome::Failure { .. } => None,
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use inkvert::{output_name, DocumentStats};

    #[test]
    fn truncation_never_splits_a_multibyte_character() {
        let err = inkvert::InvertError::NotAPdf {
            name: "日本語のとても長いファイル名がここに続きます.pdf".to_string(),
            magic: *b"PK\x03\x04",
        }
        .to_string();
        let first_line = err.lines().next().unwrap();
        assert!(first_line.len() > 80);

        let msg = truncate_message(first_line, 79);
        assert!(msg.ends_with('\u{2026}'));
        assert!(msg.len() <= 79 + '\u{2026}'.len_utf8());
    }

    #[test]
    fn truncation_passes_short_messages_through() {
        assert_eq!(truncate_message("short", 79), "short");
        let exact = "x".repeat(79);
        assert_eq!(truncate_message(&exact, 79), exact);
    }

    fn success(source: &str) -> DocumentOutcome {
        DocumentOutcome::Success(InvertedDocument {
            source_name: source.to_string(),
            output_name: output_name(source),
            data: vec![0x25],
            stats: DocumentStats::default(),
        })
    }

    #[test]
    fn same_basename_inputs_get_distinct_destinations() {
        let outcomes = vec![success("slides.pdf"), success("slides.pdf")];
        let paths = vec![PathBuf::from("a/slides.pdf"), PathBuf::from("b/slides.pdf")];

        let plan = planned_outputs(&outcomes, &paths, None);
        let dests: Vec<&PathBuf> = plan.iter().map(|(_, d)| d).collect();
        assert_eq!(dests[0], &PathBuf::from("a/slides_inverted.pdf"));
        assert_eq!(dests[1], &PathBuf::from("b/slides_inverted.pdf"));
    }

    #[test]
    fn failed_outcomes_are_skipped_but_keep_alignment() {
        let outcomes = vec![
            success("one.pdf"),
            DocumentOutcome::Failure {
                source_name: "two.pdf".to_string(),
                error: inkvert::InvertError::EmptyDocument {
                    name: "two.pdf".to_string(),
                },
            },
            success("three.pdf"),
        ];
        let paths = vec![
            PathBuf::from("docs/one.pdf"),
            PathBuf::from("docs/two.pdf"),
            PathBuf::from("docs/three.pdf"),
        ];

        let plan = planned_outputs(&outcomes, &paths, Some(Path::new("out")));
        assert_eq!(plan.len(), 2);
        assert_eq!(plan[0].1, PathBuf::from("out/one_inverted.pdf"));
        assert_eq!(plan[1].1, PathBuf::from("out/three_inverted.pdf"));
    }
}

//! CLI binary for pdf2txt.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ExtractionConfig` and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdf2txt::{
    convert, inspect, ExtractionConfig, JobProgressCallback, JobReport, JobState, PageError,
    PageSelection, ProgressCallback,
};
use std::io;
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;
use tracing_subscriber::EnvFilter;

// ── Terminal styling ─────────────────────────────────────────────────────────

/// SGR codes used by the summary and the skipped-page lines.
#[derive(Clone, Copy)]
enum Tint {
    Ok = 32,
    Fail = 31,
    Note = 36,
    Faint = 2,
    Strong = 1,
}

fn paint(tint: Tint, s: &str) -> String {
    format!("\x1b[{}m{s}\x1b[0m", tint as u8)
}

/// Spinner frames: a quarter block walking round a page corner.
const SPINNER: &[&str] = &["▖", "▘", "▝", "▗", "▚"];

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a live bar showing the job percentage, plus a
/// red log line for every skipped page.
struct CliProgressCallback {
    bar: ProgressBar,
}

impl CliProgressCallback {
    /// Starts as a spinner; the bar length is set by `on_job_start` once the
    /// document is open.
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);

        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(SPINNER);

        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Opening PDF…");
        bar.enable_steady_tick(Duration::from_millis(80));

        Arc::new(Self { bar })
    }

    fn activate_bar(&self, total: usize) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>3}/{len} pages  {msg:>7}  \
             ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(SPINNER);

        self.bar.set_length(total as u64);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Extracting");
        self.bar.set_message("0.00%");
        self.bar.reset_eta();
    }
}

impl JobProgressCallback for CliProgressCallback {
    fn on_job_start(&self, total_pages: usize) {
        self.activate_bar(total_pages);
        self.bar.println(format!(
            "{} {}",
            paint(Tint::Note, "◆"),
            paint(Tint::Strong, &format!("Extracting text from {total_pages} pages…"))
        ));
    }

    fn on_page_complete(&self, state: &JobState, _text_len: usize) {
        self.bar.set_position(state.pages_done() as u64);
        self.bar.set_message(state.progress().to_string());
    }

    fn on_page_skipped(&self, page_num: usize, total: usize, error: &PageError) {
        let mut msg = error.to_string();
        if msg.chars().count() > 80 {
            msg = msg.chars().take(79).collect::<String>() + "\u{2026}";
        }
        self.bar.println(format!(
            "  {} Page {:>3}/{:<3}  {}",
            paint(Tint::Fail, "✗"),
            page_num,
            total,
            paint(Tint::Fail, &msg),
        ));
    }

    fn on_job_complete(&self, _report: &JobReport) {
        self.bar.finish_and_clear();
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Extract into ./out/output.txt and ./out/output.html
  pdf2txt document.pdf -o out

  # Specific pages only
  pdf2txt --pages 3-15 book.pdf -o out
  pdf2txt --pages 1-3,7 book.pdf -o out

  # Encrypted document
  pdf2txt --password secret report.pdf -o out

  # Escape <, > and & in the HTML output
  pdf2txt --escape-html paper.pdf -o out

  # Inspect PDF metadata without extracting
  pdf2txt --inspect-only document.pdf

  # JSON job report on stdout
  pdf2txt --json document.pdf -o out > report.json

OUTPUT:
  output.txt   each page's lines, top of page first, then "\f\n"
  output.html  the same text with <br> before every newline, each page
               followed by <div style="page-break-after: always;"></div>

  A page that fails to extract is written as an empty page and counted in
  the completion summary; the remaining pages are still extracted.

ENVIRONMENT VARIABLES:
  PDF2TXT_OUTPUT_DIR   Default for --output-dir
  PDF2TXT_PASSWORD     Default for --password
  PDFIUM_LIB_PATH      Path to libpdfium, or the directory containing it
  RUST_LOG             Override the log filter (e.g. pdf2txt=debug)
"#;

/// Extract PDF text in reading order to plain text and HTML.
#[derive(Parser, Debug)]
#[command(
    name = "pdf2txt",
    version,
    about = "Extract PDF text in reading order to plain text and HTML",
    long_about = "Extract the text of every page of a PDF, ordered top to bottom, into \
output.txt (pages separated by form feeds) and output.html (lines separated by <br>, \
pages separated by page-break divs).",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Local PDF file path.
    input: PathBuf,

    /// Directory for output.txt and output.html; created if missing.
    #[arg(short, long, env = "PDF2TXT_OUTPUT_DIR", required_unless_present = "inspect_only")]
    output_dir: Option<PathBuf>,

    /// Page selection: all, 5, 3-15, or a list such as 1-3,7,10-12.
    #[arg(long, env = "PDF2TXT_PAGES", default_value = "all")]
    pages: String,

    /// PDF user password for encrypted documents.
    #[arg(long, env = "PDF2TXT_PASSWORD")]
    password: Option<String>,

    /// Escape <, > and & in the HTML output.
    #[arg(long, env = "PDF2TXT_ESCAPE_HTML")]
    escape_html: bool,

    /// Minimum vertical overlap (0.0–1.0) for two runs to share a line.
    #[arg(long, env = "PDF2TXT_LINE_OVERLAP", default_value_t = 0.5)]
    line_overlap: f32,

    /// Horizontal gap, relative to the line height, that inserts a space.
    #[arg(long, env = "PDF2TXT_WORD_MARGIN", default_value_t = 0.1)]
    word_margin: f32,

    /// Print the job report (or metadata) as JSON on stdout.
    #[arg(long, env = "PDF2TXT_JSON")]
    json: bool,

    /// Disable progress bar.
    #[arg(long, env = "PDF2TXT_NO_PROGRESS")]
    no_progress: bool,

    /// Print PDF metadata only, no extraction.
    #[arg(long)]
    inspect_only: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDF2TXT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDF2TXT_QUIET")]
    quiet: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar replaces INFO-level library logs; skipped pages are
    // still reported by the callback.
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
        let meta = inspect(&cli.input, cli.password.as_deref())
            .await
            .context("Failed to inspect PDF")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&meta).context("Failed to serialize metadata")?
            );
        } else {
            println!("File:         {}", cli.input.display());
            if let Some(ref t) = meta.title {
                println!("Title:        {}", t);
            }
            if let Some(ref a) = meta.author {
                println!("Author:       {}", a);
            }
            if let Some(ref s) = meta.subject {
                println!("Subject:      {}", s);
            }
            println!("Pages:        {}", meta.page_count);
            println!("PDF Version:  {}", meta.pdf_version);
            if let Some(ref p) = meta.producer {
                println!("Producer:     {}", p);
            }
            if let Some(ref c) = meta.creator {
                println!("Creator:      {}", c);
            }
        }
        return Ok(());
    }

    let output_dir = cli
        .output_dir
        .clone()
        .context("--output-dir is required")?;

    // ── Build config ─────────────────────────────────────────────────────
    let cli_progress = show_progress.then(CliProgressCallback::new_dynamic);
    let progress_cb: Option<ProgressCallback> = cli_progress
        .clone()
        .map(|cb| cb as Arc<dyn JobProgressCallback>);

    // ── Run extraction ───────────────────────────────────────────────────
    let outcome = match build_config(&cli, progress_cb) {
        Ok(config) => convert(&cli.input, &output_dir, &config)
            .await
            .context("Extraction failed"),
        Err(e) => Err(e),
    };
    let report = clear_on_error(cli_progress.as_deref(), outcome)?;

    if cli.json {
        let json = serde_json::to_string_pretty(&report).context("Failed to serialise report")?;
        println!("{json}");
    } else if !cli.quiet {
        print_summary(&report, &output_dir);
    }

    Ok(())
}

/// Stop the spinner before an error is printed, so it cannot draw over it.
fn clear_on_error<T>(progress: Option<&CliProgressCallback>, outcome: Result<T>) -> Result<T> {
    if outcome.is_err() {
        if let Some(cb) = progress {
            cb.bar.finish_and_clear();
        }
    }
    outcome
}

fn print_summary(report: &JobReport, output_dir: &std::path::Path) {
    let mark = if report.skipped_pages == 0 {
        paint(Tint::Ok, "✔")
    } else if report.processed_pages == 0 {
        paint(Tint::Fail, "✘")
    } else {
        paint(Tint::Note, "⚠")
    };
    eprintln!(
        "{}  {}/{} pages  {} skipped  {}ms  →  {}",
        mark,
        report.processed_pages,
        report.total_pages,
        if report.skipped_pages == 0 {
            paint(Tint::Faint, "0")
        } else {
            paint(Tint::Fail, &report.skipped_pages.to_string())
        },
        report.duration_ms,
        paint(Tint::Strong, &output_dir.display().to_string()),
    );
}

/// Map CLI args to `ExtractionConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<ExtractionConfig> {
    let pages = parse_pages(&cli.pages)?;

    let mut builder = ExtractionConfig::builder()
        .pages(pages)
        .escape_html(cli.escape_html)
        .line_overlap(cli.line_overlap)
        .word_margin(cli.word_margin);

    if let Some(ref pwd) = cli.password {
        builder = builder.password(pwd.clone());
    }
    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

/// Turn `--pages` into a `PageSelection`.
///
/// Accepts `all`, a page (`5`), a span (`3-15`) or a comma list mixing both
/// (`1-3,7,10-12`). Page numbers start at 1.
fn parse_pages(s: &str) -> Result<PageSelection> {
    let spec = s.trim().to_ascii_lowercase();
    if spec == "all" {
        return Ok(PageSelection::All);
    }

    let parts: Vec<&str> = spec.split(',').map(str::trim).collect();
    if let [only] = parts.as_slice() {
        return Ok(match parse_span(only)? {
            (first, last) if first == last => PageSelection::Single(first),
            (first, last) => PageSelection::Range(first, last),
        });
    }

    let mut pages = Vec::new();
    for part in parts {
        let (first, last) = parse_span(part)?;
        pages.extend(first..=last);
    }
    Ok(PageSelection::Set(pages))
}

/// One `N` or `A-B` item of a page list, as an inclusive span.
fn parse_span(part: &str) -> Result<(usize, usize)> {
    let page = |p: &str| -> Result<usize> {
        let n: usize = p
            .trim()
            .parse()
            .with_context(|| format!("'{}' is not a page number", p.trim()))?;
        anyhow::ensure!(n >= 1, "page numbers start at 1, got {n}");
        Ok(n)
    };

    match part.split_once('-') {
        Some((first, last)) => {
            let (first, last) = (page(first)?, page(last)?);
            anyhow::ensure!(
                first <= last,
                "page span '{part}' runs backwards; write it as {last}-{first}"
            );
            Ok((first, last))
        }
        None => page(part).map(|n| (n, n)),
    }
}

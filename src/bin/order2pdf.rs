//! CLI binary for order-confirm-pdf.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `RenderConfig` and writes the rendered document.

use anyhow::{anyhow, Context, Result};
use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use clap::Parser;
use order_confirm_pdf::pipeline::input::resolve_payload;
use order_confirm_pdf::{
    plan_only, render_order_detailed, render_to_file, run_job, FsJobStore, PageContent, PageSize,
    PageSpec, ProgressCallback, RenderConfig, RenderProgressCallback,
};
use std::io::{self, Write};
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Instant;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
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

// ── CLI progress callback ────────────────────────────────────────────────────

/// Prints one line per rendered page to stderr.
struct CliProgressCallback {
    started: Instant,
    planned: AtomicUsize,
}

impl CliProgressCallback {
    fn new() -> Arc<Self> {
        Arc::new(Self {
            started: Instant::now(),
            planned: AtomicUsize::new(0),
        })
    }
}

impl RenderProgressCallback for CliProgressCallback {
    fn on_render_start(&self, planned_pages: usize) {
        self.planned.store(planned_pages, Ordering::SeqCst);
        eprintln!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Rendering {planned_pages} pages…"))
        );
    }

    fn on_page_rendered(&self, page_number: usize, title: &str) {
        let planned = self.planned.load(Ordering::SeqCst);
        eprintln!(
            "  {} Page {:>3}/{:<3}  {}",
            green("✓"),
            page_number,
            planned,
            dim(title),
        );
    }

    fn on_render_complete(&self, physical_pages: usize, bytes: usize) {
        eprintln!(
            "{} {} pages, {}  {}",
            green("✔"),
            bold(&physical_pages.to_string()),
            dim(&format!("{bytes} bytes")),
            dim(&format!("{:.1}s", self.started.elapsed().as_secs_f64())),
        );
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Render to a file
  order2pdf order.json -o order.pdf

  # Read the payload from stdin, write the PDF to stdout
  cat order.json | order2pdf - > order.pdf

  # Fetch the payload over HTTP
  order2pdf https://example.com/orders/42.json -o 42.pdf

  # Show which pages would be rendered
  order2pdf --plan order.json

  # Print render statistics as JSON
  order2pdf --json order.json -o order.pdf

  # Run as a job: status in ./store/jobs/<id>.json, PDF in ./store/pdfs/<id>.pdf
  order2pdf --job-id job-42 --store ./store order.json

  # Letter paper, New York time, balcony and roof pages
  order2pdf --page-size letter --timezone America/New_York --feature-pages order.json -o order.pdf

ENVIRONMENT VARIABLES:
  ORDER2PDF_*             Every flag can be set through an environment variable
  RUST_LOG                Overrides the log filter (e.g. RUST_LOG=order_confirm_pdf=debug)
"#;

/// Render order confirmation PDFs from JSON order payloads.
#[derive(Parser, Debug)]
#[command(
    name = "order2pdf",
    version,
    about = "Render order confirmation PDFs from JSON order payloads",
    long_about = "Render a multi-page PDF order confirmation from a JSON order payload. \
The payload may be a local file, '-' for stdin, or an HTTP/HTTPS URL. Missing or malformed \
fields never fail the render; they are left out or replaced by defaults.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Payload file path, '-' for stdin, or HTTP/HTTPS URL.
    input: String,

    /// Write the PDF to this file instead of stdout.
    #[arg(short, long, env = "ORDER2PDF_OUTPUT")]
    output: Option<PathBuf>,

    /// Print the page plan and exit without rendering.
    #[arg(long, env = "ORDER2PDF_PLAN")]
    plan: bool,

    /// Print the plan or render statistics as JSON.
    #[arg(long, env = "ORDER2PDF_JSON")]
    json: bool,

    /// Add balcony and complex-roof pages after the floor pages.
    #[arg(long, env = "ORDER2PDF_FEATURE_PAGES")]
    feature_pages: bool,

    /// Paper size.
    #[arg(long, env = "ORDER2PDF_PAGE_SIZE", value_enum, default_value = "a4")]
    page_size: PageSizeArg,

    /// IANA time zone for printed dates (e.g. Europe/Oslo).
    #[arg(long, env = "ORDER2PDF_TIMEZONE", default_value = "UTC")]
    timezone: String,

    /// Maximum number of floor pages for one order.
    #[arg(long, env = "ORDER2PDF_MAX_FLOOR_PAGES", default_value_t = 100)]
    max_floor_pages: usize,

    /// Pin the "Generated on" instant (RFC 3339) for reproducible output.
    #[arg(long, env = "ORDER2PDF_GENERATED_AT")]
    generated_at: Option<String>,

    /// Run through the job layer with this job id (requires --store).
    #[arg(long, env = "ORDER2PDF_JOB_ID", requires = "store")]
    job_id: Option<String>,

    /// Job store directory.
    #[arg(long, env = "ORDER2PDF_STORE", requires = "job_id")]
    store: Option<PathBuf>,

    /// HTTP download timeout in seconds.
    #[arg(long, env = "ORDER2PDF_DOWNLOAD_TIMEOUT", default_value_t = 120)]
    download_timeout: u64,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "ORDER2PDF_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "ORDER2PDF_QUIET")]
    quiet: bool,
}

#[derive(clap::ValueEnum, Clone, Copy, Debug)]
enum PageSizeArg {
    A4,
    Letter,
    Legal,
}

impl From<PageSizeArg> for PageSize {
    fn from(v: PageSizeArg) -> Self {
        match v {
            PageSizeArg::A4 => PageSize::A4,
            PageSizeArg::Letter => PageSize::Letter,
            PageSizeArg::Legal => PageSize::Legal,
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Load payload ─────────────────────────────────────────────────────
    let payload = resolve_payload(&cli.input, cli.download_timeout)
        .await
        .with_context(|| format!("Failed to load payload from '{}'", cli.input))?;

    // ── Build config ─────────────────────────────────────────────────────
    let show_progress = !cli.quiet && !cli.json && !cli.plan;
    let progress_cb: Option<ProgressCallback> = if show_progress {
        Some(CliProgressCallback::new() as Arc<dyn RenderProgressCallback>)
    } else {
        None
    };
    let config = build_config(&cli, progress_cb)?;

    // ── Plan-only mode ───────────────────────────────────────────────────
    if cli.plan {
        let pages = plan_only(&payload, &config);
        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&pages).context("Failed to serialise plan")?
            );
        } else {
            print_plan(&pages);
        }
        return Ok(());
    }

    // ── Job mode ─────────────────────────────────────────────────────────
    if let (Some(job_id), Some(root)) = (&cli.job_id, &cli.store) {
        let store = FsJobStore::new(root);
        let outcome = run_job(&store, job_id, &payload, &config)
            .await
            .with_context(|| format!("Job '{job_id}' failed"))?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&outcome).context("Failed to serialise job outcome")?
            );
        } else if !cli.quiet {
            eprintln!(
                "{}  job {}  →  {}",
                green("✔"),
                bold(job_id),
                bold(&root.join(&outcome.result_path).display().to_string()),
            );
        }
        return Ok(());
    }

    // ── Run render ───────────────────────────────────────────────────────
    if let Some(ref output_path) = cli.output {
        let stats = render_to_file(&payload, output_path, &config)
            .await
            .context("Render failed")?;

        if cli.json {
            println!(
                "{}",
                serde_json::to_string_pretty(&stats).context("Failed to serialise stats")?
            );
        } else if !cli.quiet {
            eprintln!(
                "{}  {} pages  {}ms  →  {}",
                green("✔"),
                stats.physical_pages,
                stats.duration_ms,
                bold(&output_path.display().to_string()),
            );
        }
    } else {
        let output = render_order_detailed(&payload, &config)
            .await
            .context("Render failed")?;

        if cli.json {
            let json =
                serde_json::to_string_pretty(&output).context("Failed to serialise output")?;
            println!("{json}");
        } else {
            let stdout = io::stdout();
            let mut handle = stdout.lock();
            handle
                .write_all(&output.pdf)
                .context("Failed to write to stdout")?;
            handle.flush().context("Failed to flush stdout")?;
        }
    }

    Ok(())
}

/// Map CLI args to `RenderConfig`.
fn build_config(cli: &Cli, progress: Option<ProgressCallback>) -> Result<RenderConfig> {
    let time_zone: Tz = cli
        .timezone
        .parse()
        .map_err(|e| anyhow!("Unknown time zone '{}': {}", cli.timezone, e))?;

    let mut builder = RenderConfig::builder()
        .page_size(cli.page_size.into())
        .time_zone(time_zone)
        .feature_pages(cli.feature_pages)
        .max_floor_pages(cli.max_floor_pages)
        .download_timeout_secs(cli.download_timeout);

    if let Some(ref raw) = cli.generated_at {
        let instant = DateTime::parse_from_rfc3339(raw)
            .with_context(|| format!("Invalid --generated-at '{raw}', expected RFC 3339"))?;
        builder = builder.generated_at(instant.with_timezone(&Utc));
    }

    if let Some(cb) = progress {
        builder = builder.progress_callback(cb);
    }

    builder.build().context("Invalid configuration")
}

fn print_plan(pages: &[PageSpec]) {
    println!("Page   1  Order Confirmation");
    for page in pages {
        let detail = match &page.content {
            PageContent::Floor { floor } => format!("floor {floor}"),
            PageContent::Feature { feature } => format!("{feature:?}").to_lowercase(),
        };
        println!("Page {:>3}  {}  {}", page.page_number, page.title, dim(&detail));
    }
}

//! CLI binary for pdfsplit.
//!
//! A thin shim over the library crate that maps CLI flags to
//! `SplitConfig`, renders progress, and prints results.

use anyhow::{Context, Result};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use pdfsplit::{
    inspect, split_to_file, ConnectivityMonitor, DirectorySaver, OfflineStore, ProgressCallback,
    SourceFile, SplitConfig, SplitProgressCallback, SubmitOutcome, Uploader,
};
use std::io;
use std::path::PathBuf;
use std::sync::atomic::{AtomicUsize, Ordering};
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

// ── CLI progress callback using indicatif ────────────────────────────────────

/// Terminal progress callback: a single bar that grows as page counts
/// become known (the batch's total page count is not known up front).
struct CliProgressCallback {
    bar: ProgressBar,
    errors: AtomicUsize,
}

impl CliProgressCallback {
    fn new_dynamic() -> Arc<Self> {
        let bar = ProgressBar::new(0);
        let spinner_style = ProgressStyle::with_template("{spinner:.cyan} {prefix:.bold}  {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_spinner())
            .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        bar.set_style(spinner_style);
        bar.set_prefix("Preparing");
        bar.set_message("Reading files…");
        bar.enable_steady_tick(Duration::from_millis(80));
        Arc::new(Self {
            bar,
            errors: AtomicUsize::new(0),
        })
    }

    fn activate_bar(&self) {
        let progress_style = ProgressStyle::with_template(
            "{spinner:.cyan} {prefix:.bold}  \
             [{bar:42.green/238}] {pos:>4}/{len} pages  ⏱ {elapsed_precise}",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar())
        .progress_chars("█▉▊▋▌▍▎▏  ")
        .tick_strings(&["⠋", "⠙", "⠹", "⠸", "⠼", "⠴", "⠦", "⠧", "⠇", "⠏", "⠿"]);
        self.bar.set_style(progress_style);
        self.bar.set_prefix("Splitting");
    }
}

impl SplitProgressCallback for CliProgressCallback {
    fn on_batch_start(&self, total_files: usize) {
        self.bar.println(format!(
            "{} {}",
            cyan("◆"),
            bold(&format!("Splitting {total_files} file(s)…"))
        ));
    }

    fn on_file_start(&self, file: &str, _index: usize, _total: usize) {
        self.bar.set_message(file.to_string());
    }

    fn on_file_pages(&self, _file: &str, page_count: usize) {
        if self.bar.length().unwrap_or(0) == 0 {
            self.activate_bar();
        }
        self.bar.inc_length(page_count as u64);
    }

    fn on_page_complete(&self, file: &str, page_num: usize, page_count: usize, entry_bytes: usize) {
        self.bar.println(format!(
            "  {} {file} {page_num:>4}/{page_count:<4}  {}",
            green("✓"),
            dim(&format!("{entry_bytes:>7} bytes")),
        ));
        self.bar.inc(1);
    }

    fn on_page_error(&self, _file: &str, _page_num: usize, _page_count: usize, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        let msg = if error.len() > 80 {
            format!("{}\u{2026}", &error[..79])
        } else {
            error.to_string()
        };
        self.bar.println(format!("  {} {}", red("✗"), red(&msg)));
        self.bar.inc(1);
    }

    fn on_file_error(&self, _file: &str, error: &str) {
        self.errors.fetch_add(1, Ordering::SeqCst);
        self.bar.println(format!("  {} {}", red("✗"), red(error)));
    }

    fn on_batch_complete(&self, entries: usize, failed_pages: usize) {
        self.bar.finish_and_clear();
        if failed_pages == 0 {
            eprintln!("{} {} pages packed", green("✔"), bold(&entries.to_string()));
        } else {
            eprintln!(
                "{} {} pages packed  ({} failed)",
                cyan("⚠"),
                bold(&entries.to_string()),
                red(&failed_pages.to_string()),
            );
        }
    }
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Split one PDF into per-page files in pdf-splitted.zip
  pdfsplit report.pdf

  # Split several PDFs into one archive
  pdfsplit a.pdf b.pdf c.pdf -o pages.zip

  # Page counts only, no splitting
  pdfsplit --inspect-only *.pdf

  # Machine-readable report
  pdfsplit --json report.pdf -o pages.zip

  # Queue a batch while offline, then inspect the queue later
  pdfsplit --offline --store-dir ~/.pdfsplit report.pdf
  pdfsplit --list-queued --store-dir ~/.pdfsplit
  pdfsplit --clear-queued --store-dir ~/.pdfsplit

ARCHIVE LAYOUT:
  Each page lands as {name}-{page}.pdf, zero-padded so lexical and
  numeric ordering agree: report.pdf with 12 pages produces
  report-01.pdf … report-12.pdf.
"#;

/// Split multi-page PDFs into per-page files packed into a single ZIP.
#[derive(Parser, Debug)]
#[command(
    name = "pdfsplit",
    version,
    about = "Split multi-page PDFs into per-page files packed into a single ZIP",
    long_about = "Split each submitted PDF into standalone single-page documents and pack \
them all into one ZIP archive. Processing is entirely local. A file-backed queue can hold \
submissions made while offline.",
    arg_required_else_help = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// PDF files to split.
    #[arg(required_unless_present_any = ["list_queued", "clear_queued"])]
    inputs: Vec<PathBuf>,

    /// Write the archive to this path.
    #[arg(short, long, env = "PDFSPLIT_OUTPUT", default_value = "pdf-splitted.zip")]
    output: PathBuf,

    /// Per-file size limit in mebibytes.
    #[arg(long, env = "PDFSPLIT_MAX_FILE_MB", default_value_t = 100)]
    max_file_mb: u64,

    /// Deflate level for archive entries (0-9).
    #[arg(long, env = "PDFSPLIT_COMPRESSION", default_value_t = 6,
          value_parser = clap::value_parser!(i32).range(0..=9))]
    compression: i32,

    /// Print page counts only, no splitting.
    #[arg(long)]
    inspect_only: bool,

    /// Output a structured JSON report instead of the human summary.
    #[arg(long, env = "PDFSPLIT_JSON")]
    json: bool,

    /// Disable the progress bar.
    #[arg(long, env = "PDFSPLIT_NO_PROGRESS")]
    no_progress: bool,

    /// Enable DEBUG-level tracing logs.
    #[arg(short, long, env = "PDFSPLIT_VERBOSE")]
    verbose: bool,

    /// Suppress all output except errors.
    #[arg(short, long, env = "PDFSPLIT_QUIET")]
    quiet: bool,

    /// Treat the host as unreachable: queue the batch instead of splitting.
    #[arg(long, requires = "store_dir")]
    offline: bool,

    /// Root directory for the persistent store (file cache + queue).
    #[arg(long, env = "PDFSPLIT_STORE_DIR")]
    store_dir: Option<PathBuf>,

    /// List queued operations and exit.
    #[arg(long, requires = "store_dir", conflicts_with = "inputs")]
    list_queued: bool,

    /// Clear all queued operations and exit.
    #[arg(long, requires = "store_dir", conflicts_with = "inputs")]
    clear_queued: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    // The progress bar provides the feedback that matters; keep library
    // logs quiet unless asked.
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

    // ── Queue maintenance modes ──────────────────────────────────────────
    if cli.list_queued || cli.clear_queued {
        let store = open_store(&cli).await?;
        if cli.clear_queued {
            let count = store.queued_operations().await.len();
            anyhow::ensure!(store.clear_all_operations().await, "failed to clear queue");
            if !cli.quiet {
                eprintln!("{} cleared {count} queued operation(s)", green("✔"));
            }
            return Ok(());
        }
        let ops = store.queued_operations().await;
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&ops)?);
        } else if ops.is_empty() {
            println!("queue is empty");
        } else {
            for op in ops {
                let pdfsplit::OperationKind::Split { file_names } = &op.kind;
                println!(
                    "#{}  {}  {}",
                    op.id,
                    dim(&format!("{}ms", op.queued_at_ms)),
                    file_names.join(", ")
                );
            }
        }
        return Ok(());
    }

    // ── Read inputs ──────────────────────────────────────────────────────
    let mut files = Vec::with_capacity(cli.inputs.len());
    for path in &cli.inputs {
        let file = SourceFile::from_path(path)
            .await
            .with_context(|| format!("failed to read {}", path.display()))?;
        files.push(file);
    }

    // ── Build config ─────────────────────────────────────────────────────
    let progress_cb: Option<ProgressCallback> = if show_progress && !cli.inspect_only {
        Some(CliProgressCallback::new_dynamic() as Arc<dyn SplitProgressCallback>)
    } else {
        None
    };

    let mut builder = SplitConfig::builder()
        .max_file_bytes(cli.max_file_mb * 1024 * 1024)
        .compression_level(cli.compression)
        .archive_name(
            cli.output
                .file_name()
                .map(|n| n.to_string_lossy().into_owned())
                .unwrap_or_else(|| "pdf-splitted.zip".to_string()),
        );
    if let Some(cb) = progress_cb {
        builder = builder.progress_callback(cb);
    }
    let config = builder.build().context("Invalid configuration")?;

    // ── Inspect-only mode ────────────────────────────────────────────────
    if cli.inspect_only {
        let mut infos = Vec::with_capacity(files.len());
        for file in &files {
            match inspect(file, &config).await {
                Ok(info) => {
                    if !cli.json {
                        println!("{}: {} pages, {} bytes", info.name, info.page_count, info.byte_len);
                    }
                    infos.push(info);
                }
                Err(e) => eprintln!("{} {e}", red("✗")),
            }
        }
        if cli.json {
            println!("{}", serde_json::to_string_pretty(&infos)?);
        }
        return Ok(());
    }

    // ── Offline-capable path (store attached) ────────────────────────────
    if cli.store_dir.is_some() {
        let store = open_store(&cli).await?;
        let monitor = Arc::new(ConnectivityMonitor::new(!cli.offline));
        let save_dir = cli
            .output
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .map(PathBuf::from)
            .unwrap_or_else(|| PathBuf::from("."));
        let saver = Arc::new(DirectorySaver::new(save_dir));
        let uploader = Uploader::new(config, monitor, saver).with_store(store);

        match uploader.submit(&files).await.context("Split failed")? {
            SubmitOutcome::Completed { output, saved_as } => {
                print_summary(&cli, &output, &saved_as)?;
            }
            SubmitOutcome::Queued {
                operation_id,
                files,
            } => {
                if !cli.quiet {
                    let id = operation_id
                        .map(|id| format!("#{id}"))
                        .unwrap_or_else(|| "(memory only)".to_string());
                    eprintln!(
                        "{} offline: queued {files} file(s) as operation {id}",
                        cyan("◆")
                    );
                }
            }
        }
        return Ok(());
    }

    // ── Plain split-to-file path ─────────────────────────────────────────
    let output = split_to_file(&files, &cli.output, &config)
        .await
        .context("Split failed")?;
    print_summary(&cli, &output, &cli.output.display().to_string())?;

    Ok(())
}

async fn open_store(cli: &Cli) -> Result<Arc<OfflineStore>> {
    let dir = cli
        .store_dir
        .as_ref()
        .expect("clap guarantees store_dir is present here");
    let store = Arc::new(OfflineStore::new(dir));
    anyhow::ensure!(
        store.initialize().await,
        "persistent store unavailable at {}",
        dir.display()
    );
    Ok(store)
}

fn print_summary(cli: &Cli, output: &pdfsplit::SplitOutput, saved_as: &str) -> Result<()> {
    if cli.json {
        println!("{}", serde_json::to_string_pretty(output)?);
        return Ok(());
    }
    if cli.quiet {
        return Ok(());
    }
    let stats = &output.stats;
    eprintln!(
        "{}  {}/{} pages  {}ms  →  {}",
        if stats.pages_failed == 0 && stats.files_failed == 0 {
            green("✔")
        } else {
            cyan("⚠")
        },
        stats.pages_extracted,
        stats.pages_total,
        stats.total_duration_ms,
        bold(saved_as),
    );
    for report in output.files.iter().filter(|r| !r.is_complete()) {
        if let Some(ref err) = report.error {
            eprintln!("   {} {err}", red("✗"));
        }
        for err in &report.page_errors {
            eprintln!("   {} {err}", red("✗"));
        }
    }
    eprintln!(
        "   {}",
        dim(&format!("{} bytes archived", stats.archive_bytes))
    );
    Ok(())
}

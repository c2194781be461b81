//! # gitlab-archive-dl CLI
//!
//! Command-line interface for the gitlab-archive-dl library.
//! Mirrors every accessible GitLab group into a local tree of ZIP archives.

use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use gitlab_archive_dl::{Failure, MirrorConfig, ReportFormat, RunSummary};
use log::error;

mod cli;

/// Exit code when some projects could not be archived
const EXIT_INCOMPLETE: i32 = 2;

/// Command-line interface for gitlab-archive-dl
#[derive(Parser, Debug)]
#[command(name = "gitlab-archive-dl")]
#[command(about = "Archive every project of every accessible GitLab group")]
#[command(long_about = "Walks all groups and subgroups visible to a token and downloads a ZIP
archive of each project's default branch:
  gitlab-archive-dl --gitlab-url https://gitlab.example.com
  gitlab-archive-dl --max-workers 8 --report-format json
  gitlab-archive-dl --dry-run          # List what would be archived

Output layout:
  <output-dir>/<group>/<subgroup>/<project>_<hash>.zip")]
#[command(version)]
struct Cli {
    /// GitLab base URL
    #[arg(long, default_value = "https://gitlab.com")]
    gitlab_url: String,

    /// Personal access token (prompted for when absent)
    #[arg(long, env = "GITLAB_TOKEN", hide_env_values = true)]
    token: Option<String>,

    /// Root directory for the archives
    #[arg(short, long, default_value = "gitlab_archives")]
    output_dir: PathBuf,

    /// Maximum number of concurrent downloads
    #[arg(short = 'w', long, default_value_t = 4)]
    max_workers: usize,

    /// Report format: csv, json or none
    #[arg(long, default_value = "csv")]
    report_format: String,

    /// Directory for the report file
    #[arg(long, default_value = ".")]
    report_dir: PathBuf,

    /// Raw Cookie header sent with every request
    #[arg(long)]
    cookie: Option<String>,

    /// User-Agent header override
    #[arg(long)]
    user_agent: Option<String>,

    /// Enable dry-run mode (list projects without downloading)
    #[arg(long)]
    dry_run: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

impl Cli {
    fn to_config(&self, token: String) -> MirrorConfig {
        MirrorConfig {
            base_url: self.gitlab_url.clone(),
            token,
            output_dir: self.output_dir.clone(),
            max_workers: self.max_workers,
            report_format: ReportFormat::from(self.report_format.as_str()),
            cookie: self.cookie.clone(),
            user_agent: self.user_agent.clone(),
            ..Default::default()
        }
    }
}

#[tokio::main]
async fn main() {
    match run().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(EXIT_INCOMPLETE),
        Err(e) => {
            error!("❌ Error: {e:#}");
            std::process::exit(1);
        }
    }
}

/// Returns whether every project was archived
async fn run() -> anyhow::Result<bool> {
    let cli = Cli::parse();

    // Initialize logging to stderr
    let default_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_level))
        .target(env_logger::Target::Stderr)
        .init();

    if cli.verbose {
        eprintln!("📦 gitlab-archive-dl v{} starting...", env!("CARGO_PKG_VERSION"));
    }

    let token = cli::resolve_token(cli.token.clone())?;
    let config = cli.to_config(token);

    if cli.dry_run {
        let (groups, items) = gitlab_archive_dl::discover(&config).await?;
        eprintln!(
            "🔍 [DRY RUN] {} groups, {} projects under {}",
            groups.len(),
            items.len(),
            config.output_dir.display()
        );
        for item in &items {
            let branch = item.project.default_branch().unwrap_or("-");
            println!(
                "{} :: {} ({branch})",
                item.group_path.display(),
                item.project.name
            );
        }
        return Ok(true);
    }

    eprintln!(
        "📁 Mirroring {} into {}",
        config.base_url,
        config.output_dir.display()
    );

    let progress = cli::ProgressManager::new("🌐 Downloading archives");
    let mirror = gitlab_archive_dl::Mirror::new(&config)?;
    let summary = mirror.run(Some(progress.callback())).await;
    progress.finish();
    let summary = summary?;

    print_summary(&summary);

    std::fs::create_dir_all(&cli.report_dir)
        .with_context(|| format!("Failed to create report directory '{}'", cli.report_dir.display()))?;
    gitlab_archive_dl::write_report(
        &summary.successes,
        &summary.failures,
        &config.report_format,
        &cli.report_dir,
    )
    .with_context(|| format!("Failed to write report to '{}'", cli.report_dir.display()))?;

    Ok(summary.is_complete())
}

fn print_summary(summary: &RunSummary) {
    for line in summary_lines(summary) {
        println!("{line}");
    }
}

/// Counts, then every success and every failure as `group :: project`
fn summary_lines(summary: &RunSummary) -> Vec<String> {
    let mut lines = vec![format!(
        "✅ Archived {} of {} projects across {} groups",
        summary.successes.len(),
        summary.work_items,
        summary.groups
    )];
    if summary.retry_rounds > 0 {
        lines.push(format!("🔁 Retry rounds: {}", summary.retry_rounds));
    }
    if !summary.successes.is_empty() {
        lines.push("Successful downloads:".to_string());
        for success in &summary.successes {
            lines.push(format!("  {} :: {}", success.group_name, success.project_name));
        }
    }
    if !summary.failures.is_empty() {
        lines.push(format!("❌ {} projects failed:", summary.failures.len()));
        for failure in &summary.failures {
            lines.push(format!("  {}", failure_line(failure)));
        }
    }
    lines
}

fn failure_line(failure: &Failure) -> String {
    format!("{} :: {}", failure.group_name, failure.project.name)
}

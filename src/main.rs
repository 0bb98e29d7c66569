use anyhow::{Context, Result};
use aw_fix::codemod::{
    CancellationToken, FileReport, FileStatus, Registry, RuleFilter, RunOptions, Runner,
};
use aw_fix::config::{self, FixConfig};
use aw_fix::logging;
use clap::{ArgAction, Args, Parser, Subcommand};
use colored::Colorize;
use similar::{ChangeTag, TextDiff};
use std::path::{Path, PathBuf};
use tracing::{debug, warn};
use walkdir::WalkDir;

const DEFAULT_WORKFLOW_DIR: &str = ".github/workflows";

/// Exit status when the run was interrupted.
const EXIT_CANCELLED: i32 = 130;

#[derive(Parser)]
#[command(name = "aw-fix")]
#[command(about = "Migrate deprecated agentic workflow frontmatter", long_about = None)]
#[command(version)]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Apply codemods to workflow files
    Apply(RunArgs),

    /// Report files that would change without modifying them
    Check(RunArgs),

    /// List available codemods
    List {
        /// Print the registry as JSON
        #[arg(long)]
        json: bool,
    },
}

#[derive(Args)]
struct RunArgs {
    /// Workflow files to process (otherwise every *.md in --dir)
    files: Vec<PathBuf>,

    /// Directory scanned for workflow files
    #[arg(short, long)]
    dir: Option<PathBuf>,

    /// Run only these rules (repeatable)
    #[arg(short, long = "rule", value_name = "ID")]
    rules: Vec<String>,

    /// Skip these rules (repeatable)
    #[arg(long, value_name = "ID")]
    skip: Vec<String>,

    /// Only rules introduced in releases matching this requirement
    #[arg(long, value_name = "REQ")]
    since: Option<String>,

    /// Dry run - show what would be changed without modifying files
    #[arg(short = 'n', long)]
    dry_run: bool,

    /// Show unified diff of changes
    #[arg(long)]
    diff: bool,

    /// Print reports as JSON
    #[arg(long)]
    json: bool,

    /// Number of worker threads (1 processes files sequentially)
    #[arg(short, long)]
    jobs: Option<usize>,

    /// Config file (defaults to ./aw-fix.toml when present)
    #[arg(short, long)]
    config: Option<PathBuf>,
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Mode {
    Apply,
    Check,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Apply(args) => cmd_run(args, Mode::Apply, cli.verbose),

        Commands::Check(args) => cmd_run(args, Mode::Check, cli.verbose),

        Commands::List { json } => {
            logging::init(logging::resolve_level(cli.verbose, None));
            cmd_list(json)
        }
    }
}

/// Settings after layering CLI flags over the config file.
struct Settings {
    dir: PathBuf,
    jobs: Option<usize>,
    since: Option<String>,
    rules: Vec<String>,
    skip: Vec<String>,
}

impl Settings {
    fn merge(args: &RunArgs, config: FixConfig) -> Self {
        let run = config.run;
        let rules = if args.rules.is_empty() {
            run.rules
        } else {
            args.rules.clone()
        };
        let mut skip = args.skip.clone();
        skip.extend(run.skip.into_iter().filter(|id| !args.rules.contains(id)));

        Self {
            dir: args
                .dir
                .clone()
                .or(run.dir)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_WORKFLOW_DIR)),
            jobs: args.jobs.or(run.jobs),
            since: args.since.clone().or(run.since),
            rules,
            skip,
        }
    }
}

/// Helper: every `*.md` file directly inside `dir`, sorted.
fn discover_workflow_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        anyhow::bail!("Workflow directory {} not found", dir.display());
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(dir).min_depth(1).max_depth(1) {
        let entry = entry?;
        if entry.file_type().is_file()
            && entry.path().extension().and_then(|s| s.to_str()) == Some("md")
        {
            files.push(entry.path().to_path_buf());
        }
    }

    files.sort();
    Ok(files)
}

/// Helper: Show unified diff between original and modified content
fn display_diff(file: &Path, original: &str, modified: &str) {
    println!(
        "\n{}",
        format!("--- {} (original)", file.display()).dimmed()
    );
    println!("{}", format!("+++ {} (migrated)", file.display()).dimmed());

    let diff = TextDiff::from_lines(original, modified);

    for change in diff.iter_all_changes() {
        let sign = match change.tag() {
            ChangeTag::Delete => format!("-{}", change).red(),
            ChangeTag::Insert => format!("+{}", change).green(),
            ChangeTag::Equal => format!(" {}", change).normal(),
        };
        print!("{}", sign);
    }
}

fn cmd_run(args: RunArgs, mode: Mode, verbose: u8) -> Result<()> {
    // 1. Load config and set up logging
    let config = config::discover(args.config.as_deref(), Path::new("."))?;
    logging::init(logging::resolve_level(
        verbose,
        config.logging.level.as_deref(),
    ));
    let settings = Settings::merge(&args, config);

    // 2. Select rules
    let registry = Registry::builtin();
    let filter = RuleFilter::all()
        .only(settings.rules)
        .skip(settings.skip)
        .since(settings.since.as_deref().unwrap_or(""))?;
    filter.validate(&registry)?;

    // 3. Determine files
    let files = if args.files.is_empty() {
        discover_workflow_files(&settings.dir)?
    } else {
        args.files.clone()
    };
    debug!(count = files.len(), "workflow files selected");

    // 4. Run, stopping cleanly on Ctrl-C
    let cancel = CancellationToken::new();
    let handler_token = cancel.clone();
    if let Err(err) = ctrlc::set_handler(move || handler_token.cancel()) {
        warn!(error = %err, "could not install Ctrl-C handler");
    }

    let write = mode == Mode::Apply && !args.dry_run;
    let runner = Runner::new(&registry)
        .with_filter(filter)
        .with_options(RunOptions {
            write,
            jobs: settings.jobs,
        })
        .with_cancellation(cancel);
    let reports = runner.run_all(&files);

    // 5. Report results
    if args.json {
        let json = serde_json::to_string_pretty(&reports).context("failed to encode report")?;
        println!("{json}");
    } else {
        if !write && mode == Mode::Apply {
            println!("{}", "[DRY RUN - no files will be modified]".cyan());
        }
        for report in &reports {
            print_report(report, write, args.diff);
        }
        print_summary(&reports);
    }

    // 6. Exit status
    if reports
        .iter()
        .any(|report| report.status == FileStatus::Cancelled)
    {
        std::process::exit(EXIT_CANCELLED);
    }
    let failed = reports.iter().any(FileReport::has_errors);
    let pending = mode == Mode::Check && reports.iter().any(FileReport::is_updated);
    if failed || pending {
        std::process::exit(1);
    }

    Ok(())
}

fn print_report(report: &FileReport, write: bool, show_diff: bool) {
    let path = report.path.display();
    match &report.status {
        FileStatus::Unchanged => {
            println!("{} {}: unchanged", "⊙".yellow(), path);
        }
        FileStatus::Updated { rules } => {
            let verb = if write { "updated" } else { "would update" };
            println!(
                "{} {}: {} (rules: {})",
                "✓".green(),
                path,
                verb,
                rules.join(", ")
            );
            if show_diff {
                if let (Some(before), Some(after)) = (&report.before, &report.after) {
                    display_diff(&report.path, before, after);
                }
            }
        }
        FileStatus::Failed { error } => {
            eprintln!("{} {}: error: {}", "✗".red(), path, error);
        }
        FileStatus::Cancelled => {
            println!("{} {}: cancelled", "⊘".cyan(), path);
        }
    }

    for verdict in &report.verdicts {
        if let Some(error) = &verdict.error {
            eprintln!("  {} {}: {}", "✗".red(), verdict.id, error);
        }
    }
    for warning in &report.warnings {
        eprintln!("  {} {}", "warning:".yellow(), warning);
    }
}

fn print_summary(reports: &[FileReport]) {
    // Each file lands in exactly one bucket.
    let (mut updated, mut partial, mut unchanged, mut failed, mut cancelled) = (0, 0, 0, 0, 0);
    for report in reports {
        match (&report.status, report.has_errors()) {
            (FileStatus::Cancelled, _) => cancelled += 1,
            (FileStatus::Updated { .. }, false) => updated += 1,
            (FileStatus::Updated { .. }, true) => partial += 1,
            (FileStatus::Unchanged, false) => unchanged += 1,
            (FileStatus::Unchanged, true) | (FileStatus::Failed { .. }, _) => failed += 1,
        }
    }

    println!();
    println!("{}", "Summary:".bold());
    println!("  {} updated", format!("{}", updated).green());
    if partial > 0 {
        println!("  {} updated with errors", format!("{}", partial).yellow());
    }
    println!("  {} unchanged", format!("{}", unchanged).yellow());
    println!("  {} failed", format!("{}", failed).red());
    if cancelled > 0 {
        println!("  {} cancelled", format!("{}", cancelled).cyan());
    }
}

fn cmd_list(json: bool) -> Result<()> {
    let registry = Registry::builtin();

    if json {
        let rules: Vec<_> = registry
            .rules()
            .iter()
            .map(|rule| {
                serde_json::json!({
                    "id": rule.id,
                    "name": rule.name,
                    "description": rule.description,
                    "introduced_in": rule.introduced_in.to_string(),
                })
            })
            .collect();
        println!("{}", serde_json::to_string_pretty(&rules)?);
        return Ok(());
    }

    println!("{}", "Available codemods".bold());
    println!();
    for rule in registry.rules() {
        println!(
            "{} {}",
            rule.id.bold(),
            format!("(since {})", rule.introduced_in).cyan()
        );
        println!("  {}", rule.name);
        println!("  {}", rule.description.dimmed());
    }

    Ok(())
}

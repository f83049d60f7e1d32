use std::collections::HashSet;
use std::fs;
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use std::process::ExitCode;

use chrono::{DateTime, Local, NaiveDateTime, TimeZone, Timelike};
use clap::{ArgAction, Parser, Subcommand};

use wavepress::logging::{init_logging, LoggingConfig};
use wavepress::pipeline::{run_once, PipelineError, RunOutcome, RunRequest};
use wavepress::quality::{strategist_guard, QualityGate};
use wavepress::rules::PipelineRules;
use wavepress::schedule::ScheduleGate;
use wavepress::settings::{AutomationSettings, SettingsFile, SETTINGS_FILE_NAME};
use wavepress::store::StoreManager;
use wavepress::strategy::strategy_for;
use wavepress::topics::{Pillar, TopicError, TopicPool, POOL_FILE_NAME};

#[derive(Parser, Debug)]
#[command(name = "wavepress")]
#[command(version)]
#[command(about = "Automated editorial pipeline for a file-backed publication")]
#[command(after_help = "Exit codes:
  0   published, drafted for review, or an intentional no-op
  1   quality gate rejected the draft
  2   emergency stop engaged
  64  usage error
  70  hard failure (exhausted pool, unreadable store or rules)
  75  cadence block (daily limit reached or outside a publish window)")]
struct Cli {
    /// Data directory holding the archives, topic pool, and settings
    #[arg(long, short = 'd', global = true, default_value = "data", value_name = "DIR")]
    data_dir: PathBuf,

    /// Rules file with gate thresholds (TOML)
    #[arg(long, global = true, default_value = "wavepress.toml", value_name = "FILE")]
    rules: PathBuf,

    /// Suppress all output except errors
    #[arg(long, short, global = true)]
    quiet: bool,

    /// Increase verbosity (-v, -vv)
    #[arg(long, short, global = true, action = ArgAction::Count, conflicts_with = "quiet")]
    verbose: u8,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Run the pipeline once: select a topic, gate the draft, publish
    Run {
        /// File with the drafted content, or "-" for stdin
        #[arg(long, short = 'c', value_name = "FILE")]
        content: PathBuf,

        /// Preselected title; bypasses the selector but not the gates
        #[arg(long, value_name = "TITLE")]
        topic: Option<String>,

        /// Act as if the current time were TIME (RFC 3339, or local
        /// YYYY-MM-DDTHH:MM:SS)
        #[arg(long, value_name = "TIME")]
        at: Option<String>,
    },
    /// Gate a draft without writing anything
    Check {
        /// Title to validate
        #[arg(long, value_name = "TITLE")]
        title: String,

        /// File with the drafted content, or "-" for stdin
        #[arg(long, short = 'c', value_name = "FILE")]
        content: PathBuf,

        /// Act as if the current time were TIME
        #[arg(long, value_name = "TIME")]
        at: Option<String>,

        /// Skip the scheduler gate and judge content only
        #[arg(long)]
        no_schedule: bool,
    },
    /// Show archive counts, cadence, and automation state
    Status {
        /// Act as if the current time were TIME
        #[arg(long, value_name = "TIME")]
        at: Option<String>,
    },
    /// Show pillars and how much of the pool is still unused
    Topics {
        /// List the unused titles, not just the counts
        #[arg(long)]
        unused: bool,
    },
    /// Scaffold the data directory with a starter pool and settings
    Init {
        /// Overwrite files that already exist
        #[arg(long)]
        force: bool,
    },
}

/// Exit codes forming the cron contract.
mod exit_codes {
    use std::process::ExitCode;

    /// Published, drafted for review, or an intentional no-op.
    pub fn success() -> ExitCode {
        ExitCode::from(0)
    }

    /// The quality gate or strategist guard rejected the draft.
    pub fn quality_rejected() -> ExitCode {
        ExitCode::from(1)
    }

    /// The emergency stop is engaged.
    pub fn emergency_stop() -> ExitCode {
        ExitCode::from(2)
    }

    /// Bad invocation (sysexits EX_USAGE).
    pub fn usage() -> ExitCode {
        ExitCode::from(64)
    }

    /// Unrecoverable failure (sysexits EX_SOFTWARE).
    pub fn hard_failure() -> ExitCode {
        ExitCode::from(70)
    }

    /// Cadence block; retry in a later window (sysexits EX_TEMPFAIL).
    pub fn cadence_blocked() -> ExitCode {
        ExitCode::from(75)
    }
}

fn main() -> ExitCode {
    // Mapped by hand so clap's usage errors exit with 64 instead of 2,
    // which the contract reserves for the emergency stop.
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) => {
            let _ = e.print();
            return if e.use_stderr() {
                exit_codes::usage()
            } else {
                exit_codes::success()
            };
        }
    };

    if !cli.quiet {
        init_logging(LoggingConfig::from_verbosity(cli.verbose));
    }

    match &cli.command {
        Commands::Run { content, topic, at } => {
            cmd_run(&cli, content, topic.as_deref(), at.as_deref())
        }
        Commands::Check {
            title,
            content,
            at,
            no_schedule,
        } => cmd_check(&cli, title, content, at.as_deref(), *no_schedule),
        Commands::Status { at } => cmd_status(&cli, at.as_deref()),
        Commands::Topics { unused } => cmd_topics(&cli, *unused),
        Commands::Init { force } => cmd_init(&cli, *force),
    }
}

/// Run the full pipeline once and translate the outcome to an exit code.
fn cmd_run(cli: &Cli, content_path: &Path, topic: Option<&str>, at: Option<&str>) -> ExitCode {
    let now = match resolve_now(at) {
        Ok(now) => now,
        Err(e) => {
            eprintln!("{}", e);
            return exit_codes::usage();
        }
    };

    let rules = match PipelineRules::load(&cli.rules) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("Cannot load rules: {}", e);
            return exit_codes::hard_failure();
        }
    };

    let store = match StoreManager::new(&cli.data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Cannot open data directory: {}", e);
            return exit_codes::hard_failure();
        }
    };

    // An explicit topic can run without a pool; selection cannot.
    let pool = match TopicPool::load(cli.data_dir.join(POOL_FILE_NAME)) {
        Ok(pool) => pool,
        Err(TopicError::NotFound(path)) if topic.is_some() => {
            tracing::debug!(path = %path, "no topic pool, relying on the provided topic");
            TopicPool::default()
        }
        Err(TopicError::NotFound(path)) => {
            eprintln!("Topic pool not found: {}", path);
            eprintln!("Run 'wavepress init' to scaffold the data directory.");
            return exit_codes::hard_failure();
        }
        Err(e) => {
            eprintln!("Cannot load topic pool: {}", e);
            return exit_codes::hard_failure();
        }
    };

    let settings = AutomationSettings::load(cli.data_dir.join(SETTINGS_FILE_NAME));

    let content = match read_content(content_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Cannot read content from {}: {}", content_path.display(), e);
            return exit_codes::hard_failure();
        }
    };

    let request = RunRequest {
        content,
        topic: topic.map(str::to_string),
    };

    let result = run_once(
        &store,
        &pool,
        &settings,
        &rules,
        &request,
        now,
        &mut rand::rng(),
    );

    match result {
        Ok(RunOutcome::Published(post)) => {
            if !cli.quiet {
                println!("Published \"{}\" as {}", post.title, post.slug);
            }
            exit_codes::success()
        }
        Ok(RunOutcome::Drafted(draft)) => {
            if !cli.quiet {
                println!("Draft \"{}\" queued for manual review", draft.title);
            }
            exit_codes::success()
        }
        Ok(RunOutcome::SkippedDisabled) => {
            if !cli.quiet {
                println!("Automation is disabled; the accepted draft was not committed.");
            }
            exit_codes::success()
        }
        Err(PipelineError::QualityRejected(report)) => {
            eprintln!("Quality gate failed:");
            for violation in &report.violations {
                eprintln!("  - {}", violation);
            }
            exit_codes::quality_rejected()
        }
        Err(PipelineError::EmergencyStop) => {
            eprintln!("Emergency stop is engaged; nothing was written.");
            exit_codes::emergency_stop()
        }
        Err(PipelineError::Schedule(e)) => {
            eprintln!("Not published: {}", e);
            exit_codes::cadence_blocked()
        }
        Err(e @ PipelineError::NoFreshTopics(_)) => {
            eprintln!("Run failed: {}", e);
            exit_codes::hard_failure()
        }
        Err(PipelineError::Store(e)) => {
            eprintln!("Store failure: {}", e);
            exit_codes::hard_failure()
        }
    }
}

/// Dry-run the gates against a draft and report each verdict.
fn cmd_check(
    cli: &Cli,
    title: &str,
    content_path: &Path,
    at: Option<&str>,
    no_schedule: bool,
) -> ExitCode {
    let now = match resolve_now(at) {
        Ok(now) => now,
        Err(e) => {
            eprintln!("{}", e);
            return exit_codes::usage();
        }
    };

    let rules = match PipelineRules::load(&cli.rules) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("Cannot load rules: {}", e);
            return exit_codes::hard_failure();
        }
    };

    let archive = match StoreManager::new(&cli.data_dir).and_then(|s| s.load_posts()) {
        Ok(archive) => archive,
        Err(e) => {
            eprintln!("Cannot read the post archive: {}", e);
            return exit_codes::hard_failure();
        }
    };

    // check is a diagnostic; no pool just means no pillar to look up
    let pool = match TopicPool::load(cli.data_dir.join(POOL_FILE_NAME)) {
        Ok(pool) => pool,
        Err(TopicError::NotFound(_)) => TopicPool::default(),
        Err(e) => {
            eprintln!("Cannot load topic pool: {}", e);
            return exit_codes::hard_failure();
        }
    };

    let content = match read_content(content_path) {
        Ok(content) => content,
        Err(e) => {
            eprintln!("Cannot read content from {}: {}", content_path.display(), e);
            return exit_codes::hard_failure();
        }
    };

    let pillar = pool.pillar_of(title).map(str::to_string);
    let strategy = strategy_for(pillar.as_deref());

    let report = QualityGate::new(&rules.quality).review(title, &content, &archive.posts);
    let guard = strategist_guard(&content, &strategy);

    println!("Title: {}", title);
    println!(
        "Pillar: {} ({} format, min {} words)",
        pillar.as_deref().unwrap_or("none"),
        strategy.name,
        strategy.min_words
    );
    println!();

    if report.passed() {
        println!("Quality gate: PASS");
    } else {
        println!("Quality gate: FAIL");
        for violation in &report.violations {
            println!("  - {}", violation);
        }
    }

    match &guard {
        None => println!("Strategist guard: PASS"),
        Some(violation) => {
            println!("Strategist guard: FAIL");
            println!("  - {}", violation);
        }
    }

    let mut schedule_result = Ok(());
    if !no_schedule {
        schedule_result = ScheduleGate::new(&rules.schedule).check(now, &archive.posts);
        match &schedule_result {
            Ok(()) => println!("Scheduler gate: PASS"),
            Err(e) => {
                println!("Scheduler gate: FAIL");
                println!("  - {}", e);
            }
        }
    }

    println!();
    if !report.passed() || guard.is_some() {
        println!("Verdict: the draft would be rejected.");
        exit_codes::quality_rejected()
    } else if schedule_result.is_err() {
        println!("Verdict: the draft is publishable, but held by the schedule.");
        exit_codes::cadence_blocked()
    } else {
        println!("Verdict: the draft would publish.");
        exit_codes::success()
    }
}

/// Report archive, cadence, and automation state without writing.
fn cmd_status(cli: &Cli, at: Option<&str>) -> ExitCode {
    let now = match resolve_now(at) {
        Ok(now) => now,
        Err(e) => {
            eprintln!("{}", e);
            return exit_codes::usage();
        }
    };

    let rules = match PipelineRules::load(&cli.rules) {
        Ok(rules) => rules,
        Err(e) => {
            eprintln!("Cannot load rules: {}", e);
            return exit_codes::hard_failure();
        }
    };

    let store = match StoreManager::new(&cli.data_dir) {
        Ok(store) => store,
        Err(e) => {
            eprintln!("Cannot open data directory: {}", e);
            return exit_codes::hard_failure();
        }
    };

    let archive = match store.load_posts() {
        Ok(archive) => archive,
        Err(e) => {
            eprintln!("Cannot read the post archive: {}", e);
            return exit_codes::hard_failure();
        }
    };
    let drafts = match store.load_drafts() {
        Ok(drafts) => drafts,
        Err(e) => {
            eprintln!("Cannot read the draft archive: {}", e);
            return exit_codes::hard_failure();
        }
    };

    let settings = AutomationSettings::load(cli.data_dir.join(SETTINGS_FILE_NAME));
    let gate = ScheduleGate::new(&rules.schedule);
    let cadence = gate.check(now, &archive.posts);

    if !cli.quiet {
        let day = now.format("%Y-%m-%d").to_string();
        let today = archive
            .posts
            .iter()
            .filter(|p| p.date.starts_with(&day))
            .count();

        println!("Posts: {} ({} today)", archive.posts.len(), today);
        println!("Drafts: {}", drafts.drafts.len());

        let mode = if settings.emergency_stop {
            "EMERGENCY STOP"
        } else if !settings.enabled {
            "disabled"
        } else if settings.manual_only {
            "manual review only"
        } else {
            "automatic"
        };
        println!("Automation: {}", mode);

        let hour = now.hour();
        match gate.window_for(hour) {
            Some(w) => println!("Window: open ({:02}:00-{:02}:59)", w.start, w.end),
            None => match gate.next_window_after(hour) {
                Some(w) => println!("Window: closed (next opens at {:02}:00)", w.start),
                None => println!("Window: closed until tomorrow"),
            },
        }
        println!("Daily limit: {} of {} used", today, rules.schedule.daily_limit);

        println!();
        if settings.emergency_stop {
            println!("Next run: blocked by the emergency stop.");
        } else {
            match &cadence {
                Ok(()) => println!("Next run: clear to publish."),
                Err(e) => println!("Next run: held ({})", e),
            }
        }
    }

    if settings.emergency_stop {
        return exit_codes::emergency_stop();
    }
    match cadence {
        Ok(()) => exit_codes::success(),
        Err(_) => exit_codes::cadence_blocked(),
    }
}

/// Show pillar weights and how much of the pool the archive has consumed.
fn cmd_topics(cli: &Cli, unused_only: bool) -> ExitCode {
    let archive = match StoreManager::new(&cli.data_dir).and_then(|s| s.load_posts()) {
        Ok(archive) => archive,
        Err(e) => {
            eprintln!("Cannot read the post archive: {}", e);
            return exit_codes::hard_failure();
        }
    };

    let pool = match TopicPool::load(cli.data_dir.join(POOL_FILE_NAME)) {
        Ok(pool) => pool,
        Err(TopicError::NotFound(path)) => {
            eprintln!("Topic pool not found: {}", path);
            eprintln!("Run 'wavepress init' to scaffold the data directory.");
            return exit_codes::hard_failure();
        }
        Err(e) => {
            eprintln!("Cannot load topic pool: {}", e);
            return exit_codes::hard_failure();
        }
    };

    let used: HashSet<String> = archive
        .posts
        .iter()
        .map(|p| p.title.to_lowercase())
        .collect();

    let mut total = 0;
    let mut fresh = 0;
    for (name, pillar) in &pool.pillars {
        let unused: Vec<&String> = pillar
            .topics
            .iter()
            .filter(|t| !used.contains(&t.to_lowercase()))
            .collect();
        total += pillar.topics.len();
        fresh += unused.len();

        println!(
            "{} (weight {}): {} of {} unused",
            name,
            pillar.weight,
            unused.len(),
            pillar.topics.len()
        );
        if unused_only {
            for topic in unused {
                println!("  - {}", topic);
            }
        }
    }

    println!();
    println!("Total: {} of {} topics unused", fresh, total);
    if fresh == 0 {
        println!("The pool is exhausted; add topics or retire published posts.");
    }
    exit_codes::success()
}

/// Scaffold the data directory, the starter pool, and the rules file.
fn cmd_init(cli: &Cli, force: bool) -> ExitCode {
    if let Err(e) = StoreManager::new(&cli.data_dir) {
        eprintln!("Cannot create data directory: {}", e);
        return exit_codes::hard_failure();
    }

    let pool_path = cli.data_dir.join(POOL_FILE_NAME);
    let pool_json = match serde_json::to_string_pretty(&starter_pool()) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Cannot render the starter pool: {}", e);
            return exit_codes::hard_failure();
        }
    };
    if let Err(code) = write_scaffold(cli, &pool_path, &pool_json, force) {
        return code;
    }

    let settings_path = cli.data_dir.join(SETTINGS_FILE_NAME);
    let settings_json = match serde_json::to_string_pretty(&SettingsFile::default()) {
        Ok(json) => json,
        Err(e) => {
            eprintln!("Cannot render the default settings: {}", e);
            return exit_codes::hard_failure();
        }
    };
    if let Err(code) = write_scaffold(cli, &settings_path, &settings_json, force) {
        return code;
    }

    let rules_toml = match toml::to_string_pretty(&PipelineRules::default()) {
        Ok(rendered) => format!(
            "# Gate thresholds. WAVEPRESS__-prefixed environment variables\n# override any value here.\n{}",
            rendered
        ),
        Err(e) => {
            eprintln!("Cannot render the default rules: {}", e);
            return exit_codes::hard_failure();
        }
    };
    if let Err(code) = write_scaffold(cli, &cli.rules, &rules_toml, force) {
        return code;
    }

    if !cli.quiet {
        println!();
        println!("Initialized {}", cli.data_dir.display());
        println!();
        println!("Next steps:");
        println!(
            "  1. Review {} and tune the pillar weights",
            pool_path.display()
        );
        println!("  2. Adjust thresholds in {} if needed", cli.rules.display());
        println!("  3. Run 'wavepress run --content draft.html' inside a publish window");
    }
    exit_codes::success()
}

/// Write one scaffold file, refusing to clobber existing state without
/// --force.
fn write_scaffold(cli: &Cli, path: &Path, content: &str, force: bool) -> Result<(), ExitCode> {
    if path.exists() && !force {
        if !cli.quiet {
            println!(
                "Kept existing {} (use --force to overwrite)",
                path.display()
            );
        }
        return Ok(());
    }
    match fs::write(path, content) {
        Ok(()) => {
            if !cli.quiet {
                println!("Wrote {}", path.display());
            }
            Ok(())
        }
        Err(e) => {
            eprintln!("Cannot write {}: {}", path.display(), e);
            Err(exit_codes::hard_failure())
        }
    }
}

/// The pool a fresh installation starts from.
fn starter_pool() -> TopicPool {
    let mut pool = TopicPool::default();
    pool.pillars.insert(
        "Career".to_string(),
        Pillar {
            weight: 2,
            topics: vec![
                "Negotiating a Staff Title Without the Scars".to_string(),
                "Tech Layoffs and the Hiring Rebound".to_string(),
                "The Case Against Passion Projects".to_string(),
            ],
        },
    );
    pool.pillars.insert(
        "Life".to_string(),
        Pillar {
            weight: 1,
            topics: vec![
                "Remote Work and the Four-Day Experiment".to_string(),
                "Green Tech at Home That Actually Pays Off".to_string(),
            ],
        },
    );
    pool.pillars.insert(
        "Money".to_string(),
        Pillar {
            weight: 2,
            topics: vec![
                "Index Funds for Burned-Out Engineers".to_string(),
                "The Real Cost of Equity Compensation".to_string(),
                "Side Income That Survives an Audit".to_string(),
            ],
        },
    );
    pool.pillars.insert(
        "Tech".to_string(),
        Pillar {
            weight: 3,
            topics: vec![
                "AI Coding Agents in Production".to_string(),
                "The Economics of Edge Computing".to_string(),
                "WebAssembly Beyond the Browser".to_string(),
                "Serverless Was Never About Servers".to_string(),
            ],
        },
    );
    pool
}

/// The effective clock for this run: `--at` when given, else wall time.
fn resolve_now(at: Option<&str>) -> Result<DateTime<Local>, String> {
    let Some(raw) = at else {
        return Ok(Local::now());
    };

    if let Ok(fixed) = DateTime::parse_from_rfc3339(raw) {
        return Ok(fixed.with_timezone(&Local));
    }

    let naive = NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S")
        .map_err(|e| format!("Invalid --at time \"{}\": {}", raw, e))?;
    Local
        .from_local_datetime(&naive)
        .earliest()
        .ok_or_else(|| format!("--at time \"{}\" does not exist in the local timezone", raw))
}

/// Read the drafted content from a file, or stdin for "-".
fn read_content(path: &Path) -> io::Result<String> {
    if path.as_os_str() == "-" {
        let mut content = String::new();
        io::stdin().read_to_string(&mut content)?;
        return Ok(content);
    }
    fs::read_to_string(path)
}

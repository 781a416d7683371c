//! Top-level CLI definition and dispatch.

use std::io::{self, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::Duration;

use clap::{Args, CommandFactory, Parser, Subcommand};
use clap_complete::{Shell as CompletionShell, generate};
use colored::{Colorize, control};
use serde_json::{Value, json};
use thiserror::Error;

use dairy_dashboard::cli::dashboard::{self, DashboardConfig};
use dairy_dashboard::cli::render::{
    self, ErrorReport, NavReport, badge, nav_header, panel_menu, status_table, summary_lines,
};
use dairy_dashboard::core::config::{Config, MIN_REFRESH_MS};
use dairy_dashboard::core::errors::DashError;
use dairy_dashboard::feed::loader::FeedSource;
use dairy_dashboard::logger::activity::{ActivityEvent, ActivityLog};
use dairy_dashboard::nav::controller::{NavAction, NavigationController};
use dairy_dashboard::nav::panel::NAV_ITEMS;
use dairy_dashboard::status::classifier::StatusClassifier;
use dairy_dashboard::status::snapshot::EquipmentSnapshot;
use dairy_dashboard::status::summary::{EquipmentStatus, FleetSummary};

/// Dairy plant dashboard: equipment status classification and panel navigation.
#[derive(Debug, Parser)]
#[command(
    name = "dairydash",
    author,
    version,
    about = "Dairy Plant Dashboard - equipment status and navigation",
    long_about = None,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Override config file path.
    #[arg(long, global = true, value_name = "PATH")]
    config: Option<PathBuf>,
    /// Force JSON output mode.
    #[arg(long, global = true)]
    json: bool,
    /// Disable colored output.
    #[arg(long, global = true)]
    no_color: bool,
    /// Increase verbosity.
    #[arg(short, long, global = true, conflicts_with = "quiet")]
    verbose: bool,
    /// Quiet mode (errors only).
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    /// Subcommand to execute.
    #[command(subcommand)]
    command: Command,
}

#[derive(Debug, Clone, Subcommand)]
enum Command {
    /// Classify every unit in the feed and show its status card.
    Status(StatusArgs),
    /// Show fleet-level summary statistics.
    Summary(FeedArgs),
    /// Classify a single snapshot given on the command line.
    Classify(ClassifyArgs),
    /// List the dashboard panels.
    Panels,
    /// Replay navigation actions and print the resulting state.
    Nav(NavArgs),
    /// Live terminal dashboard.
    Dashboard(DashboardArgs),
    /// View configuration state.
    Config(ConfigArgs),
    /// Show version (add -v for build metadata).
    Version,
    /// Generate shell completions.
    Completions(CompletionsArgs),
}

#[derive(Debug, Clone, Args, Default)]
struct FeedArgs {
    /// Snapshot feed file (JSON or TOML). Defaults to `feed.snapshot_file`,
    /// then the built-in sample fleet.
    #[arg(long, value_name = "PATH")]
    feed: Option<PathBuf>,
}

#[derive(Debug, Clone, Args, Default)]
struct StatusArgs {
    #[command(flatten)]
    feed: FeedArgs,
    /// Only list units with a raised alert.
    #[arg(long)]
    alerts_only: bool,
}

#[derive(Debug, Clone, Args)]
#[command(allow_negative_numbers = true)]
struct ClassifyArgs {
    /// Equipment display name.
    #[arg(long, default_value = "equipment")]
    name: String,
    /// Health percentage, 0-100.
    #[arg(long)]
    health: f64,
    /// Temperature in degrees Celsius.
    #[arg(long, default_value_t = 20.0)]
    temp: f64,
    /// Efficiency percentage, 0-100.
    #[arg(long)]
    efficiency: f64,
    /// Upstream alert flag.
    #[arg(long)]
    alert: bool,
}

#[derive(Debug, Clone, Args, Default)]
struct NavArgs {
    /// Actions applied in order: a panel id, `next`, `prev`, `toggle`, `close`.
    #[arg(value_name = "ACTION")]
    actions: Vec<String>,
}

#[derive(Debug, Clone, Args, Default)]
struct DashboardArgs {
    #[command(flatten)]
    feed: FeedArgs,
    /// Refresh interval; defaults to `feed.refresh_ms`.
    #[arg(long, value_name = "MILLISECONDS")]
    refresh_ms: Option<u64>,
}

#[derive(Debug, Clone, Args, Default)]
struct ConfigArgs {
    /// Config operation to run.
    #[command(subcommand)]
    command: Option<ConfigCommand>,
}

#[derive(Debug, Clone, Subcommand)]
enum ConfigCommand {
    /// Print resolved config file path.
    Path,
    /// Print effective merged configuration.
    Show,
    /// Validate configuration and exit.
    Validate,
}

#[derive(Debug, Clone, Args)]
struct CompletionsArgs {
    /// Shell to generate completion script for.
    #[arg(value_enum)]
    shell: CompletionShell,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputMode {
    Human,
    Json,
}

/// CLI error type with explicit exit-code mapping.
#[derive(Debug, Error)]
pub enum CliError {
    /// Invalid user input or configuration.
    #[error("{0}")]
    User(String),
    /// Environment/runtime failure.
    #[error("{0}")]
    Runtime(String),
    /// Internal bug or invariant violation.
    #[error("{0}")]
    Internal(String),
    /// Some entries were rejected; the rest were reported.
    #[error("{0}")]
    Partial(String),
    /// JSON serialization failed.
    #[error("failed to serialize output: {0}")]
    Json(#[from] serde_json::Error),
    /// Output write failed.
    #[error("failed to write output: {0}")]
    Io(#[from] io::Error),
}

impl CliError {
    /// Process exit code contract for the CLI.
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::User(_) => 1,
            Self::Runtime(_) | Self::Io(_) => 2,
            Self::Internal(_) | Self::Json(_) => 3,
            Self::Partial(_) => 4,
        }
    }
}

impl From<DashError> for CliError {
    fn from(error: DashError) -> Self {
        let message = error.to_string();
        match error {
            DashError::InvalidConfig { .. }
            | DashError::MissingConfig { .. }
            | DashError::ConfigParse { .. }
            | DashError::InvalidMetric { .. }
            | DashError::UnknownPanel { .. } => Self::User(message),
            DashError::Feed { .. } | DashError::Io { .. } | DashError::Runtime { .. } => {
                Self::Runtime(message)
            }
            DashError::Serialization { .. } => Self::Internal(message),
        }
    }
}

/// Dispatch CLI commands.
pub fn run(cli: &Cli) -> Result<(), CliError> {
    if cli.no_color {
        control::set_override(false);
    }

    match &cli.command {
        Command::Status(args) => run_status(cli, args),
        Command::Summary(args) => run_summary(cli, args),
        Command::Classify(args) => run_classify(cli, args),
        Command::Panels => run_panels(cli),
        Command::Nav(args) => run_nav(cli, args),
        Command::Dashboard(args) => run_dashboard(cli, args),
        Command::Config(args) => run_config(cli, args),
        Command::Version => emit_version(cli),
        Command::Completions(args) => {
            let mut command = Cli::command();
            let binary_name = command.get_name().to_string();
            generate(args.shell, &mut command, binary_name, &mut io::stdout());
            Ok(())
        }
    }
}

// ──────────────────── session setup ────────────────────

/// Loaded config plus the activity log opened from it.
struct Session {
    config: Config,
    log: ActivityLog,
}

impl Session {
    fn open(cli: &Cli) -> Result<Self, CliError> {
        let config = Config::load(cli.config.as_deref())?;
        let mut log = ActivityLog::open(&config);
        let config_hash = config.stable_hash()?;
        note(
            cli,
            &format!(
                "[DDASH-CONFIG] loaded {} (hash {config_hash})",
                config.paths.config_file.display()
            ),
        );
        log.record(ActivityEvent::ConfigLoaded {
            path: config.paths.config_file.display().to_string(),
            config_hash,
        });
        Ok(Self { config, log })
    }

    fn classifier(&self) -> Result<StatusClassifier, CliError> {
        Ok(StatusClassifier::from_config(&self.config.status)?)
    }

    fn feed_source(&self, args: &FeedArgs) -> FeedSource {
        FeedSource::from_path(
            args.feed
                .as_deref()
                .or(self.config.feed.snapshot_file.as_deref()),
        )
    }

    /// Load, classify and log one batch. Feed failures are logged before
    /// they propagate.
    fn classify_feed(
        &mut self,
        source: &FeedSource,
    ) -> Result<Vec<EquipmentStatus>, CliError> {
        let classifier = self.classifier()?;
        match source.classify(&classifier) {
            Ok(statuses) => {
                self.log.record_statuses(&statuses);
                Ok(statuses)
            }
            Err(error) => Err(self.fail(error)),
        }
    }

    fn fail(&mut self, error: DashError) -> CliError {
        self.log.record(ActivityEvent::error(&error));
        self.log.flush();
        error.into()
    }
}

// ──────────────────── status / summary ────────────────────

fn run_status(cli: &Cli, args: &StatusArgs) -> Result<(), CliError> {
    let mut session = Session::open(cli)?;
    let source = session.feed_source(&args.feed);
    let statuses = session.classify_feed(&source)?;
    let summary = FleetSummary::from_results(&statuses);
    let shown: Vec<&EquipmentStatus> = statuses
        .iter()
        .filter(|s| !args.alerts_only || s.needs_attention())
        .collect();

    match output_mode(cli) {
        OutputMode::Human => {
            println!("{}", "Dairy Plant Dashboard".bold());
            println!("  Feed: {}", source.describe());
            let thresholds = session.classifier()?.thresholds();
            println!(
                "  Thresholds: critical < {} <= warning < {} <= optimal",
                thresholds.critical_below, thresholds.warning_below
            );
            println!();
            let table = status_table(shown.iter().copied());
            print!("{table}");
            if let Some(worst) = summary.worst {
                println!("\n  Overall: {}  ({} alerting)", badge(worst), summary.alerting);
            }
        }
        OutputMode::Json => {
            let reports = render::equipment_reports(shown.iter().copied());
            let payload = json!({
                "command": "status",
                "feed": source.describe(),
                "thresholds": session.classifier()?.thresholds(),
                "equipment": reports,
                "summary": summary,
            });
            write_json_line(&payload)?;
        }
    }

    session.log.flush();
    if summary.invalid > 0 {
        return Err(CliError::Partial(format!(
            "{} of {} equipment entries rejected",
            summary.invalid, summary.total
        )));
    }
    Ok(())
}

fn run_summary(cli: &Cli, args: &FeedArgs) -> Result<(), CliError> {
    let mut session = Session::open(cli)?;
    let source = session.feed_source(args);
    let statuses = session.classify_feed(&source)?;
    let summary = FleetSummary::from_results(&statuses);

    match output_mode(cli) {
        OutputMode::Human => {
            println!("  Feed: {}", source.describe());
            print!("{}", summary_lines(&summary));
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "summary",
                "feed": source.describe(),
                "summary": summary,
            });
            write_json_line(&payload)?;
        }
    }
    session.log.flush();
    Ok(())
}

// ──────────────────── classify ────────────────────

fn run_classify(cli: &Cli, args: &ClassifyArgs) -> Result<(), CliError> {
    let mut session = Session::open(cli)?;
    let classifier = session.classifier()?;
    let snapshot = EquipmentSnapshot::new(
        args.name.clone(),
        args.health,
        args.temp,
        args.efficiency,
        args.alert,
    );
    let status = classifier.status_of(snapshot);
    session.log.record_statuses(std::slice::from_ref(&status));
    session.log.flush();

    let report = render::EquipmentReport::from(&status);
    match (output_mode(cli), status.classification()) {
        (OutputMode::Human, Some(c)) => {
            println!(
                "{}: {}{}",
                status.name,
                badge(c.category),
                if c.alert { "  (alert)" } else { "" }
            );
            if cli.verbose {
                println!("  color class: {}", report.color_class);
            }
        }
        (OutputMode::Human, None) => {}
        (OutputMode::Json, classification) => {
            let payload = json!({
                "command": "classify",
                "valid": classification.is_some(),
                "result": report,
            });
            write_json_line(&payload)?;
        }
    }

    match status.outcome {
        Ok(_) => Ok(()),
        Err(error) => Err(error.into()),
    }
}

// ──────────────────── navigation ────────────────────

fn run_panels(cli: &Cli) -> Result<(), CliError> {
    match output_mode(cli) {
        OutputMode::Human => {
            print!("{}", panel_menu(NavigationController::new().active_panel()));
        }
        OutputMode::Json => {
            let panels: Vec<Value> = NAV_ITEMS
                .iter()
                .map(|item| {
                    let heading = item.id.heading();
                    json!({
                        "id": item.id,
                        "number": item.id.number(),
                        "label": item.label,
                        "accent": item.accent,
                        "title": heading.title,
                        "description": heading.description,
                    })
                })
                .collect();
            write_json_line(&json!({ "command": "panels", "panels": panels }))?;
        }
    }
    Ok(())
}

fn run_nav(cli: &Cli, args: &NavArgs) -> Result<(), CliError> {
    let mut session = Session::open(cli)?;
    let mut nav = NavigationController::new();
    let mut failure = None;

    for raw in &args.actions {
        let Ok(action) = raw.parse::<NavAction>();
        let before = nav.state();
        match nav.apply(&action) {
            Ok(state) if state != before => {
                session.log.record(if action.selects_panel() {
                    ActivityEvent::PanelSelected { state }
                } else {
                    ActivityEvent::SidebarToggled { state }
                });
            }
            Ok(_) => {}
            Err(error) => {
                session.log.record(ActivityEvent::error(&error));
                failure = Some(error);
                break;
            }
        }
    }
    session.log.flush();

    let report = NavReport::from(nav.state());
    match output_mode(cli) {
        OutputMode::Human => println!("{}", nav_header(nav.state())),
        OutputMode::Json => {
            let mut payload = json!({
                "command": "nav",
                "state": report,
            });
            if let Some(error) = &failure {
                payload["error"] = serde_json::to_value(ErrorReport::from(error))?;
            }
            write_json_line(&payload)?;
        }
    }

    match failure {
        Some(error) => Err(error.into()),
        None => Ok(()),
    }
}

// ──────────────────── dashboard ────────────────────

fn run_dashboard(cli: &Cli, args: &DashboardArgs) -> Result<(), CliError> {
    if output_mode(cli) == OutputMode::Json {
        return Err(CliError::User(
            "dashboard requires an interactive terminal; JSON output is not supported".to_string(),
        ));
    }

    let mut session = Session::open(cli)?;
    let refresh_ms = args.refresh_ms.unwrap_or(session.config.feed.refresh_ms);
    if refresh_ms < MIN_REFRESH_MS {
        return Err(CliError::User(format!(
            "--refresh-ms must be >= {MIN_REFRESH_MS}, got {refresh_ms}"
        )));
    }

    let config = DashboardConfig {
        source: session.feed_source(&args.feed),
        classifier: session.classifier()?,
        refresh: Duration::from_millis(refresh_ms),
    };
    session.log.record(ActivityEvent::DashboardStarted {
        version: env!("CARGO_PKG_VERSION").to_string(),
        config_hash: session.config.stable_hash()?,
        source: config.source.describe(),
    });

    let result = dashboard::run(&config, &mut session.log);
    let (reason, refreshes) = match &result {
        Ok(refreshes) => ("quit".to_string(), *refreshes),
        Err(error) => (format!("terminal error: {error}"), 0),
    };
    session
        .log
        .record(ActivityEvent::DashboardStopped { reason, refreshes });
    session.log.flush();

    result
        .map(|_| ())
        .map_err(|e| CliError::Runtime(format!("dashboard terminal failure: {e}")))
}

// ──────────────────── config ────────────────────

fn run_config(cli: &Cli, args: &ConfigArgs) -> Result<(), CliError> {
    match &args.command {
        None | Some(ConfigCommand::Path) => {
            let path = cli.config.clone().unwrap_or_else(Config::default_path);
            emit_config_path(cli, &path)
        }
        Some(ConfigCommand::Show) => {
            let config = Config::load(cli.config.as_deref())?;

            match output_mode(cli) {
                OutputMode::Human => {
                    let toml_str = toml::to_string_pretty(&config)
                        .map_err(|e| CliError::Internal(format!("serialize config: {e}")))?;
                    println!("{toml_str}");
                }
                OutputMode::Json => {
                    let payload = json!({
                        "command": "config show",
                        "config": serde_json::to_value(&config)?,
                    });
                    write_json_line(&payload)?;
                }
            }
            Ok(())
        }
        Some(ConfigCommand::Validate) => match Config::load(cli.config.as_deref()) {
            Ok(config) => {
                let hash = config.stable_hash()?;
                match output_mode(cli) {
                    OutputMode::Human => {
                        println!("Configuration is valid.");
                        println!("  Source: {}", config.paths.config_file.display());
                        println!("  Hash: {hash}");
                    }
                    OutputMode::Json => {
                        let payload = json!({
                            "command": "config validate",
                            "valid": true,
                            "path": config.paths.config_file.to_string_lossy(),
                            "hash": hash,
                        });
                        write_json_line(&payload)?;
                    }
                }
                Ok(())
            }
            Err(e) => {
                if output_mode(cli) == OutputMode::Json {
                    let payload = json!({
                        "command": "config validate",
                        "valid": false,
                        "error": ErrorReport::from(&e),
                    });
                    write_json_line(&payload)?;
                } else if !cli.quiet {
                    eprintln!("Configuration is INVALID: {e}");
                }
                Err(CliError::User(format!("invalid config: {e}")))
            }
        },
    }
}

fn emit_config_path(cli: &Cli, path: &Path) -> Result<(), CliError> {
    let exists = path.exists();
    match output_mode(cli) {
        OutputMode::Human => {
            println!("{}", path.display());
            if !exists && !cli.quiet {
                println!("  (file does not exist; defaults will be used)");
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "command": "config path",
                "path": path.to_string_lossy(),
                "exists": exists,
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

// ──────────────────── version / output ────────────────────

fn emit_version(cli: &Cli) -> Result<(), CliError> {
    let version = env!("CARGO_PKG_VERSION");
    let package = env!("CARGO_PKG_NAME");
    let target = option_env!("TARGET").unwrap_or("unknown");
    let profile = option_env!("PROFILE").unwrap_or("unknown");
    let git_sha = option_env!("GIT_SHA").unwrap_or("unknown");

    match output_mode(cli) {
        OutputMode::Human => {
            println!("dairydash {version}");
            if cli.verbose {
                println!("package: {package}");
                println!("target: {target}");
                println!("profile: {profile}");
                println!("git_sha: {git_sha}");
            }
        }
        OutputMode::Json => {
            let payload = json!({
                "binary": "dairydash",
                "version": version,
                "package": package,
                "build": {
                    "target": target,
                    "profile": profile,
                    "git_sha": git_sha,
                }
            });
            write_json_line(&payload)?;
        }
    }
    Ok(())
}

/// Verbose-only diagnostic on stderr.
fn note(cli: &Cli, message: &str) {
    if cli.verbose && !cli.quiet {
        eprintln!("{message}");
    }
}

fn write_json_line(payload: &Value) -> Result<(), CliError> {
    let mut stdout = io::stdout().lock();
    serde_json::to_writer(&mut stdout, payload)?;
    writeln!(stdout)?;
    Ok(())
}

fn output_mode(cli: &Cli) -> OutputMode {
    let env_mode = std::env::var("DDASH_OUTPUT_FORMAT").ok();
    resolve_output_mode(cli.json, env_mode.as_deref(), io::stdout().is_terminal())
}

fn resolve_output_mode(json_flag: bool, env_mode: Option<&str>, stdout_is_tty: bool) -> OutputMode {
    if json_flag {
        return OutputMode::Json;
    }

    let fallback = if stdout_is_tty {
        OutputMode::Human
    } else {
        OutputMode::Json
    };

    match env_mode
        .map(str::trim)
        .map(str::to_ascii_lowercase)
        .as_deref()
    {
        Some("json") => OutputMode::Json,
        Some("human") => OutputMode::Human,
        _ => fallback,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_global_flags_before_and_after_subcommand() {
        let before = Cli::try_parse_from([
            "dairydash",
            "--config",
            "/tmp/dairydash.toml",
            "--json",
            "--no-color",
            "-v",
            "status",
        ]);
        assert!(before.is_ok());

        let after = Cli::try_parse_from(["dairydash", "status", "--json", "--no-color", "-v"]);
        assert!(after.is_ok());
    }

    #[test]
    fn parses_all_subcommands() {
        let cases = [
            vec!["dairydash", "status", "--feed", "/srv/feed.json", "--alerts-only"],
            vec!["dairydash", "summary"],
            vec![
                "dairydash", "classify", "--name", "Centrifuge A", "--health", "76", "--temp",
                "65.2", "--efficiency", "89.3", "--alert",
            ],
            vec!["dairydash", "classify", "--health", "-5", "--efficiency", "80"],
            vec!["dairydash", "panels"],
            vec!["dairydash", "nav", "toggle", "equipment", "next"],
            vec!["dairydash", "nav"],
            vec!["dairydash", "dashboard", "--refresh-ms", "250"],
            vec!["dairydash", "config", "path"],
            vec!["dairydash", "config", "show"],
            vec!["dairydash", "config", "validate"],
            vec!["dairydash", "version"],
        ];

        for case in cases {
            let parsed = Cli::try_parse_from(case.clone());
            assert!(parsed.is_ok(), "failed to parse case: {case:?}");
        }
    }

    #[test]
    fn classify_requires_health_and_efficiency() {
        assert!(Cli::try_parse_from(["dairydash", "classify", "--health", "90"]).is_err());
        assert!(Cli::try_parse_from(["dairydash", "classify", "--efficiency", "90"]).is_err());
    }

    #[test]
    fn verbose_and_quiet_conflict() {
        assert!(Cli::try_parse_from(["dairydash", "-v", "-q", "panels"]).is_err());
    }

    #[test]
    fn completions_support_bash_zsh_and_fish() {
        for shell in ["bash", "zsh", "fish"] {
            let parsed = Cli::try_parse_from(["dairydash", "completions", shell]);
            assert!(parsed.is_ok(), "failed shell parse for {shell}");
        }
    }

    #[test]
    fn output_mode_resolution_honors_precedence() {
        assert_eq!(
            resolve_output_mode(true, Some("human"), true),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode(false, Some("json"), true),
            OutputMode::Json
        );
        assert_eq!(
            resolve_output_mode(false, Some("human"), false),
            OutputMode::Human
        );
        assert_eq!(
            resolve_output_mode(false, Some("auto"), true),
            OutputMode::Human
        );
        assert_eq!(resolve_output_mode(false, None, false), OutputMode::Json);
    }

    #[test]
    fn dash_errors_map_to_exit_codes() {
        let user: CliError = DashError::invalid_metric("health", 120.0).into();
        assert_eq!(user.exit_code(), 1);
        let panel: CliError = DashError::UnknownPanel { id: "x".into() }.into();
        assert_eq!(panel.exit_code(), 1);
        let runtime: CliError = DashError::Feed {
            path: PathBuf::from("/srv/feed.json"),
            details: "eof".into(),
        }
        .into();
        assert_eq!(runtime.exit_code(), 2);
        let internal: CliError = DashError::Serialization {
            context: "serde_json",
            details: String::new(),
        }
        .into();
        assert_eq!(internal.exit_code(), 3);
        assert_eq!(CliError::Partial(String::new()).exit_code(), 4);
    }
}

//! SurveyPulse - survey response aggregation dashboard
//!
//! A CLI that aggregates survey answers into positive-response
//! percentages and reconciles them with the backend's analytics.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (invalid arguments, config, report writing)

use anyhow::{Context, Result};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use surveypulse::analysis::summarize;
use surveypulse::cli::{Args, OutputFormat};
use surveypulse::config::{Config, DEFAULT_CONFIG_FILE};
use surveypulse::live::{
    load_responses, wait_or_interrupt, AnalyticsReconciler, ModuleMonitor, MonitorConfig,
    RealtimeConfig, RealtimeStatsPoller, SubmissionBus,
};
use surveypulse::models::{RealtimeStats, SurveyModule};
use surveypulse::report::{self, DashboardReport, DashboardSnapshot};
use surveypulse::source::{with_timeout, HttpSurveySource, OfflineSource, SurveySource};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args)?;

    info!("SurveyPulse v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args).await {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .surveypulse.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(DEFAULT_CONFIG_FILE);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            DEFAULT_CONFIG_FILE
        );
        std::process::exit(1);
    }

    let content = Config::default_toml()?;
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", DEFAULT_CONFIG_FILE))?;

    println!("✅ Created {} with default settings.", DEFAULT_CONFIG_FILE);
    println!("   Edit it to set the API URL, poll intervals and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) -> Result<()> {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).context("Failed to set tracing subscriber")
}

/// Build the report and write it out.
async fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);
    config.validate()?;

    let source = build_source(&config)?;
    let modules = args.modules();

    let report = match args.watch {
        Some(secs) => run_watch(source, &args, &config, &modules, Duration::from_secs(secs)).await,
        None => run_once(source.as_ref(), &args, &config, &modules).await,
    };

    let output = match config.general.output_format {
        OutputFormat::Json => report::generate_json_report(&report)?,
        OutputFormat::Markdown => report::generate_markdown_report(&report),
    };

    match args.output {
        Some(ref path) => {
            std::fs::write(path, &output)
                .with_context(|| format!("Failed to write report to {}", path.display()))?;
            if !args.quiet {
                println!("✅ Report saved to: {}", path.display());
            }
        }
        None => print!("{}", output),
    }

    Ok(())
}

fn build_source(config: &Config) -> Result<Arc<dyn SurveySource>> {
    if config.api.offline {
        info!("Offline mode: using built-in sample data");
        return Ok(Arc::new(OfflineSource));
    }

    info!("Survey API: {}", config.api.base_url);
    let source = HttpSurveySource::new(&config.api.base_url, config.request_timeout())
        .context("Failed to create survey API client")?;
    Ok(Arc::new(source))
}

/// One aggregation pass and one analytics poll per module.
async fn run_once(
    source: &dyn SurveySource,
    args: &Args,
    config: &Config,
    modules: &[SurveyModule],
) -> DashboardReport {
    let timeout = config.request_timeout();

    let snapshots = join_all(modules.iter().map(|&module| async move {
        let loaded = load_responses(source, module, &args.user, timeout).await;
        let summary = summarize(&loaded.response_set.questions, &loaded.response_set.answers);

        let mut reconciler = AnalyticsReconciler::new(module, summary.positive_percentage);
        let ticket = reconciler.begin_poll();
        let analytics = with_timeout(timeout, source.fetch_module_analytics(module)).await;
        reconciler.complete_poll(ticket, analytics);

        DashboardSnapshot::build(
            &loaded.response_set,
            loaded.origin,
            reconciler.snapshot(),
            &config.report,
        )
    }))
    .await;

    let realtime = fetch_realtime_once(source, args, config).await;
    DashboardReport::new(snapshots, realtime)
}

async fn fetch_realtime_once(
    source: &dyn SurveySource,
    args: &Args,
    config: &Config,
) -> Option<RealtimeStats> {
    let fetch = source.fetch_realtime_stats(args.survey_id.as_deref());
    match with_timeout(config.request_timeout(), fetch).await {
        Ok(stats) => Some(stats),
        Err(e) => {
            warn!("Realtime stats unavailable: {}", e);
            None
        }
    }
}

/// Run monitors and the realtime poller until `duration` elapses or
/// Ctrl-C, then report their final state.
async fn run_watch(
    source: Arc<dyn SurveySource>,
    args: &Args,
    config: &Config,
    modules: &[SurveyModule],
    duration: Duration,
) -> DashboardReport {
    let cancel = CancellationToken::new();
    let bus = SubmissionBus::default();

    let mut monitors = Vec::with_capacity(modules.len());
    for &module in modules {
        let monitor_config = MonitorConfig {
            analytics_interval: config.analytics_interval(),
            request_timeout: config.request_timeout(),
            ..MonitorConfig::new(module, &args.user)
        };
        monitors.push(ModuleMonitor::start(source.clone(), &bus, monitor_config, &cancel).await);
    }

    let realtime_config = RealtimeConfig {
        survey_id: args.survey_id.clone(),
        interval: config.realtime_interval(),
        request_timeout: config.request_timeout(),
    };
    let (realtime_handle, realtime_rx) =
        RealtimeStatsPoller::start(source, realtime_config, &cancel);

    info!(
        "Watching {} module(s) for {}s (Ctrl-C to stop early)",
        modules.len(),
        duration.as_secs()
    );

    wait_or_interrupt(duration, tokio::signal::ctrl_c()).await;

    let mut snapshots = Vec::with_capacity(monitors.len());
    for (handle, view) in monitors {
        handle.shutdown().await;
        snapshots.push(DashboardSnapshot::from_view(&view.borrow(), &config.report));
    }

    realtime_handle.shutdown().await;
    let realtime = realtime_rx.borrow().stats.clone();

    DashboardReport::new(snapshots, realtime)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", DEFAULT_CONFIG_FILE);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}

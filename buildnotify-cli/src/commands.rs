use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use buildnotify_config::Settings;
use buildnotify_core::registry::Registry;
use buildnotify_engine::{
    apply_settings, config_from_settings, error_config_from_settings, notify, on_error, pump,
};
use buildnotify_telemetry::{EventLogger, MetricsRecorder};
use clap::{Args, Parser, Subcommand};
use serde_json::Value;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::source::PathSource;

const CHANNEL_CAPACITY: usize = 64;

#[derive(Parser, Debug)]
#[command(name = "buildnotify", version, about)]
pub struct Cli {
    /// Settings file; defaults to config/buildnotify.yaml plus environment overrides
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Push files through a notify transform
    Notify(NotifyArgs),
    /// Print the effective settings as YAML
    ShowConfig,
}

#[derive(Args, Debug, Clone)]
pub struct NotifyArgs {
    /// Files or folders, in the order they should flow through the stream
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,

    /// Directory relative paths are computed from (defaults to the working directory)
    #[arg(long)]
    pub base: Option<PathBuf>,

    /// Title text or template for artifacts
    #[arg(short, long)]
    pub title: Option<String>,

    /// Message text or template for artifacts
    #[arg(short, long)]
    pub message: Option<String>,

    /// Notify once, for the last path only
    #[arg(long)]
    pub on_last: bool,

    /// 0 = silent, 1 = errors only, 2 = everything
    #[arg(long, value_parser = clap::value_parser!(u8).range(0..=2))]
    pub log_level: Option<u8>,

    /// Template variable exposed as `options.<name>`, given as name=value
    #[arg(long = "var", value_parser = parse_var)]
    pub vars: Vec<(String, String)>,
}

pub async fn run_command(cli: Cli) -> anyhow::Result<()> {
    let settings = load_settings(cli.config.as_ref())?;

    match cli.command {
        Commands::Notify(args) => run_notify(settings, args).await,
        Commands::ShowConfig => {
            print!("{}", serde_yaml::to_string(&settings)?);
            Ok(())
        }
    }
}

fn load_settings(path: Option<&PathBuf>) -> anyhow::Result<Settings> {
    let settings = match path {
        Some(path) => Settings::load_from_path(path)
            .with_context(|| format!("loading {}", path.display()))?,
        None => Settings::load()?,
    };
    Ok(settings)
}

fn apply_args(settings: &mut Settings, args: &NotifyArgs) {
    let notify = &mut settings.notify;
    if let Some(title) = &args.title {
        notify.title = Some(title.clone());
    }
    if let Some(message) = &args.message {
        notify.message = Some(message.clone());
    }
    notify.on_last |= args.on_last;
    for (name, value) in &args.vars {
        notify
            .template_options
            .insert(name.clone(), Value::String(value.clone()));
    }
    if let Some(level) = args.log_level {
        settings.telemetry.logging.level = level;
    }
}

async fn run_notify(mut settings: Settings, args: NotifyArgs) -> anyhow::Result<()> {
    apply_args(&mut settings, &args);
    EventLogger::init_with_filter(&settings.telemetry.logging.filter);
    apply_settings(&Registry::global(), &settings)?;

    let config = config_from_settings(&settings.notify);
    let (transform, mut failures) = notify(config);
    let error_notifier = on_error(error_config_from_settings(&settings.notify));

    let metrics = if settings.telemetry.metrics.enabled {
        Some(Arc::new(MetricsRecorder::new()?))
    } else {
        None
    };
    let transform = match &metrics {
        Some(metrics) => transform.with_metrics(metrics.clone()),
        None => transform,
    };

    let cwd = std::env::current_dir()?;
    let base = args.base.clone().map_or_else(|| cwd.clone(), |b| cwd.join(b));
    let source = PathSource::new(args.paths, base, cwd);

    let (item_tx, item_rx) = mpsc::channel(CHANNEL_CAPACITY);
    let (error_tx, error_rx) = mpsc::channel(CHANNEL_CAPACITY);

    let (mut downstream, transform_task) = transform.spawn(item_rx, CHANNEL_CAPACITY);
    let errors_task = tokio::spawn(error_notifier.attach(error_rx));
    let failures_task = tokio::spawn(async move {
        let mut count = 0usize;
        while failures.recv().await.is_some() {
            count += 1;
        }
        count
    });
    let source_task = tokio::spawn(async move { pump(&source, item_tx, error_tx).await });

    while let Some(item) = downstream.recv().await {
        debug!("Forwarded {}", item.relative().display());
    }

    let stats = transform_task.await??;
    let pumped = source_task.await?;
    let upstream_errors = errors_task.await?;
    let failures = failures_task.await?;

    info!(
        pumped,
        notified = stats.notified,
        suppressed = stats.suppressed,
        failures,
        upstream_errors,
        "Run complete"
    );

    if let Some(metrics) = metrics {
        print!("{}", metrics.gather_metrics()?);
    }
    Ok(())
}

fn parse_var(raw: &str) -> Result<(String, String), String> {
    match raw.split_once('=') {
        Some((name, value)) if !name.trim().is_empty() => {
            Ok((name.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("expected name=value, got `{raw}`")),
    }
}

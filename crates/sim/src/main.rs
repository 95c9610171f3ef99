//! Sandbox simulator for the ability framework.
//!
//! Loads `abilities.toml`, starts a runtime over an in-memory world, plays a
//! scripted encounter and prints the resulting metrics as JSON.
mod config;
mod script;

use std::path::PathBuf;
use std::sync::Arc;

use ability_content::{ContentFactory, SandboxHost, standard_abilities};
use ability_runtime::{AbilityEngine, Event, LogExporter, Runtime, RuntimeConfig, Topic};
use anyhow::{Context, Result};
use config::SimConfig;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env file if it exists (silently ignore if not found)
    let _ = dotenvy::dotenv();

    let config = SimConfig::from_env();
    setup_logging(config.session_id.as_deref())?;

    let factory = ContentFactory::new(&config.data_dir);
    let ability_config = factory
        .load_config()
        .with_context(|| format!("loading {}", factory.data_dir().display()))?;

    let host = Arc::new(SandboxHost::new());
    script::populate(&host);

    let mut builder = Runtime::builder()
        .config(RuntimeConfig {
            tick_interval: config.tick_interval,
            event_buffer_size: config.event_buffer,
            command_buffer_size: config.command_buffer,
            auto_tick: config.realtime,
        })
        .engine(
            AbilityEngine::builder()
                .host(Arc::clone(&host))
                .config(ability_config)
                .abilities(standard_abilities())
                .exporter(Arc::new(LogExporter)),
        );
    if !config.realtime {
        builder = builder.manual_clock();
    }
    let runtime = builder.build().await?;
    let handle = runtime.handle();

    let mut cast_events = handle.subscribe(Topic::Cast);
    let event_logger = tokio::spawn(async move {
        while let Ok(event) = cast_events.recv().await {
            if let Event::Cast(cast) = event {
                tracing::debug!(target: "sim", ?cast, "cast event");
            }
        }
    });

    script::opening_casts(&handle).await?;
    let impacts = script::run_world(
        &handle,
        &host,
        config.steps,
        !config.realtime,
        config.tick_interval,
    )
    .await?;
    tracing::info!(target: "sim", impacts, now = %handle.now(), "encounter finished");

    let report = handle.reload(None).await?;
    tracing::info!(
        target: "sim",
        total = report.total,
        defaulted = report.defaulted.len(),
        "catalog reloaded"
    );
    script::list_catalog(&handle).await?;

    println!("{}", serde_json::to_string_pretty(&handle.metrics())?);

    runtime.shutdown().await?;
    event_logger.abort();
    Ok(())
}

/// Log to a per-session file under the platform cache directory.
fn setup_logging(session_id: Option<&str>) -> Result<()> {
    use std::time::{SystemTime, UNIX_EPOCH};

    let session_id = match session_id {
        Some(id) => id.to_owned(),
        None => {
            let timestamp = SystemTime::now()
                .duration_since(UNIX_EPOCH)
                .map(|elapsed| elapsed.as_secs())
                .unwrap_or_default();
            format!("session_{timestamp}")
        }
    };

    let session_log_dir = log_directory().join(&session_id);
    std::fs::create_dir_all(&session_log_dir)?;

    let file_appender = tracing_appender::rolling::never(&session_log_dir, "sim.log");
    let (non_blocking_file, guard) = tracing_appender::non_blocking(file_appender);

    let env_filter = tracing_subscriber::EnvFilter::from_default_env()
        .add_directive(tracing::Level::INFO.into());

    let file_layer = tracing_subscriber::fmt::layer()
        .with_writer(non_blocking_file)
        .with_ansi(false);
    let stderr_layer = tracing_subscriber::fmt::layer()
        .with_writer(std::io::stderr)
        .with_target(true);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(file_layer)
        .with(stderr_layer)
        .init();

    // Keep the file writer alive for the whole process.
    std::mem::forget(guard);

    tracing::info!("Logging initialized: session={}", session_id);
    tracing::info!("Log file: {}/sim.log", session_log_dir.display());

    Ok(())
}

fn log_directory() -> PathBuf {
    directories::ProjectDirs::from("", "", "ability-sim")
        .map(|dirs| dirs.cache_dir().join("logs"))
        .unwrap_or_else(|| std::env::temp_dir().join("ability-sim").join("logs"))
}

// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! falcond: the falcon orchestrator daemon.

use falcon_bus::{BroadcastBus, OutputBus};
use falcon_daemon::{config, env, DaemonError, TransportConfig, TransportServer};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::EnvFilter;

fn main() -> Result<(), DaemonError> {
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(run())
}

async fn run() -> Result<(), DaemonError> {
    let home = env::falcon_home()?;
    std::fs::create_dir_all(&home)?;

    // Rolling daily logs under <home>/logs, plus stderr.
    let appender = tracing_appender::rolling::daily(home.join("logs"), "falcond.log");
    let (file_writer, _log_guard) = tracing_appender::non_blocking(appender);
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .with(tracing_subscriber::fmt::layer().with_writer(file_writer).with_ansi(false))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let token = env::api_token()?;
    let bind = env::bind_addr();
    let mut transport = TransportConfig::new(token);
    transport.allowed_origins = env::allowed_origins();

    // Surface the repo scope when launched inside an initialized repo.
    let cwd = std::env::current_dir()?;
    let config_path = config::FalconConfig::path_in(&cwd);
    if config_path.exists() {
        match config::FalconConfig::load(&config_path) {
            Ok(cfg) => tracing::info!(
                workspace = %cfg.workspace.slug,
                project = %cfg.project.name,
                "resolved repo scope"
            ),
            Err(e) => tracing::warn!(error = %e, "config file unreadable"),
        }
    }

    let broadcast = BroadcastBus::new();
    let output = OutputBus::new();
    let server = Arc::new(TransportServer::new(transport, broadcast, output));

    let listener = tokio::net::TcpListener::bind(&bind).await?;
    tracing::info!(%bind, home = %home.display(), "falcond starting");

    let cancel = CancellationToken::new();
    let serve = tokio::spawn(Arc::clone(&server).run(listener, cancel.clone()));

    tokio::signal::ctrl_c().await?;
    tracing::info!("shutdown requested");
    cancel.cancel();
    let _ = serve.await;
    Ok(())
}

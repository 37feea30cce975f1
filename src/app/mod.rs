mod wiring;

use crate::{cli, configuration::Configuration, context, rest};
use anyhow::{Context as AnyhowContext, Result};
use std::path::Path;
use tokio_util::sync::CancellationToken;

pub struct App {
    pub ctx: context::Context,
}

impl App {
    pub fn from_cli() -> Result<(Self, cli::Cli)> {
        let cli = crate::cli::parse();
        let config = Configuration::from_cli(&cli);

        crate::tracing::init(config.log_file.as_deref().map(Path::new));
        log::info!("🚀 Starting cmscore");
        log::info!("📂 Data dir: {}", config.data_dir);

        let app = Self::from_config(config)?;
        Ok((app, cli))
    }

    /// Prepares the data directory and database and wires the services.
    pub fn from_config(config: Configuration) -> Result<Self> {
        wiring::init_data_dir(&config).context("initializing data dir")?;
        let storage = wiring::init_storage(&config)?;
        let events = wiring::build_events();
        log::debug!("📣 {} event subscriber(s) registered", events.len());
        let services = wiring::build_services(storage, events);

        Ok(Self {
            ctx: context::Context::new(config, services),
        })
    }
}

pub async fn run_daemon(app: App) -> Result<()> {
    let api_addr = app.ctx.config.api_listen;
    log::info!("🌐 REST API: http://{}", api_addr);
    if let Some(path) = app.ctx.config.log_file.as_deref() {
        log::info!("📝 Log file: {}", path);
    }

    let shutdown = CancellationToken::new();

    let rest_api = app.ctx.services.api.clone();
    let rest_shutdown = shutdown.clone();
    let mut rest_handle = tokio::spawn(async move {
        if let Err(e) = rest::serve(api_addr, rest_api, rest_shutdown).await {
            log::error!("REST server error: {}", e);
        }
    });

    let finished = tokio::select! {
        _ = tokio::signal::ctrl_c() => {
            log::info!("🧨 Ctrl-C received, shutting down");
            None
        }
        joined = &mut rest_handle => Some(joined),
    };

    shutdown.cancel();
    // a JoinHandle must not be polled again once it has completed
    let joined = match finished {
        Some(joined) => joined,
        None => rest_handle.await,
    };
    if let Err(e) = joined {
        log::error!("REST server error: {}", e);
        return Err(e.into());
    }

    log::info!("✅ Shutdown complete");
    Ok(())
}

pub async fn run() -> Result<()> {
    let (app, cli) = App::from_cli()?;

    if let Some(cmd) = &cli.cmd {
        // one-shot command mode
        cmd.run(&app.ctx)?;
        return Ok(());
    }

    run_daemon(app).await
}

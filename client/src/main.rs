//! `ego-house` entry-point: loads settings, restores the session, and runs
//! one command.

use std::io::{self, Write};

use clap::Parser;
use color_eyre::eyre::{Context, Result};
use ortho_config::OrthoConfig;
use tokio::runtime::Builder;
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use ego_house::inbound::cli::{Cli, execute};
use ego_house::{AppContext, ClientSettings};

fn main() -> Result<()> {
    color_eyre::install()?;
    if let Err(e) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .json()
        .try_init()
    {
        warn!(error = %e, "tracing init failed");
    }

    let cli = Cli::parse();
    let settings = ClientSettings::load_from_iter([std::ffi::OsString::from("ego-house")])
        .wrap_err("load client settings")?;

    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .wrap_err("create Tokio runtime")?;
    runtime.block_on(run(cli, &settings))
}

async fn run(cli: Cli, settings: &ClientSettings) -> Result<()> {
    let app = AppContext::from_settings(settings).wrap_err("bootstrap client")?;
    let outcome = app.start();
    info!(?outcome, "session restored");

    let stdout = io::stdout();
    let mut out = stdout.lock();
    execute(cli.command, app.commands(), &mut out)
        .await
        .wrap_err("command failed")?;
    out.flush().wrap_err("flush output")?;
    Ok(())
}

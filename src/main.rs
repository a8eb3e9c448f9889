use std::process::ExitCode;

use tracing_subscriber::EnvFilter;

use crate::app::Tui;
use crate::sensors::Sensors;

mod app;
mod config;
mod interval;
mod options;
mod sensors;
mod settings;
mod startup;

fn main() -> anyhow::Result<ExitCode> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(std::io::stderr)
        .with_target(false)
        .without_time()
        .init();

    let home_dir = startup::resolve_home_dir(std::env::var_os("HOME"), dirs::home_dir)?;
    let status = startup::run(std::env::args_os(), home_dir, &mut Sensors::new(), &mut Tui)?;
    Ok(status.into())
}

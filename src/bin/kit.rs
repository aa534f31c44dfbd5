use clap::Parser;
use kitgen::cli::{run_cli, Cli};
use kitgen::logging::{init_logging, LogConfig};
use tracing::error;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let _guard = init_logging(&LogConfig::from_env().with_debug(cli.debug))?;

    if let Err(e) = run_cli(cli) {
        error!("{e:#}");
    }
    Ok(())
}

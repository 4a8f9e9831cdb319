use anyhow::Context;
use clap::Parser;
use record_browser::cli::{run, Cli};
use record_browser::logging::init_tracing;

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    let runtime = tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .context("Failed to start async runtime")?;

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    runtime
        .block_on(run(&cli, &mut out))
        .with_context(|| format!("Failed to list '{}'", cli.entity))
}

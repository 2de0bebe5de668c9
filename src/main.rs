use clap::Parser;
use studydesk::{cli, config, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = cli::Cli::parse();
    config::init_config();
    logging::init_tracing();
    cli::run(args).await
}

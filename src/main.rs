use clap::Parser;
use workflow_catalog::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Serve(args) => cli::serve::run(args).await,
        Command::Index(args) => cli::index::run(args).await,
    }
}

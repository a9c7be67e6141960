use clap::Parser;
use legal_assist::cli::{self, Cli, Command};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Draft(args) => cli::draft::run(args).await,
        Command::Clarify(args) => cli::clarify::run(args).await,
        Command::Ask(args) => cli::ask::run(args).await,
        Command::Sessions(args) => cli::sessions::run(args).await,
    }
}

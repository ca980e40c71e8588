use clap::{Parser, Subcommand};
use mimalloc::MiMalloc;

use crate::run::RunArgs;

mod parsers;
mod run;
mod scenario;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

#[derive(Parser)]
#[clap(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    #[arg(short, long)]
    debug: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Simulates a scenario second by second around the dispatch controller
    Run {
        #[command(flatten)]
        args: RunArgs,
    },
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    tracing_subscriber::fmt()
        .with_max_level(if cli.debug {
            tracing::Level::DEBUG
        } else {
            tracing::Level::INFO
        })
        .init();

    match cli.command {
        Some(Commands::Run { args }) => run::run(args)?,
        None => {}
    }

    Ok(())
}

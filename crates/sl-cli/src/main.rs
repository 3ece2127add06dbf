//! Sluice CLI - dependency-ordered database migrations

use clap::Parser;

mod cli;
mod commands;

use cli::{Cli, Commands};
use commands::common::ExitCode;
use commands::{
    apply, clean, history, init, mark, migrate_yoyo, new, remove, rollback, squash, unmark,
    validate,
};

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    init_logging(cli.global.verbose);

    let result = match &cli.command {
        Commands::Init(args) => init::execute(args, &cli.global).await,
        Commands::New(args) => new::execute(args, &cli.global).await,
        Commands::History(args) => history::execute(args, &cli.global).await,
        Commands::Apply(args) => apply::execute(args, &cli.global).await,
        Commands::Rollback(args) => rollback::execute(args, &cli.global).await,
        Commands::Mark(args) => mark::execute(args, &cli.global).await,
        Commands::Unmark(args) => unmark::execute(args, &cli.global).await,
        Commands::Remove(args) => remove::execute(args, &cli.global).await,
        Commands::Squash(args) => squash::execute(args, &cli.global).await,
        Commands::Validate(args) => validate::execute(args, &cli.global).await,
        Commands::Clean(args) => clean::execute(args, &cli.global).await,
        Commands::MigrateYoyo(args) => migrate_yoyo::execute(args, &cli.global).await,
    };

    if let Err(err) = result {
        if let Some(code) = err.downcast_ref::<ExitCode>() {
            std::process::exit(code.0);
        }
        eprintln!("Error: {err:#}");
        std::process::exit(1);
    }
}

/// `RUST_LOG` wins over the `-v` count
fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        _ => "debug",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .format_target(false)
        .init();
}

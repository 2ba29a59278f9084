use clap::Parser;
use expense_tracker::args::{AddSubcommand, Args, Command, ListSubcommand, UndoTarget};
use expense_tracker::{commands, Config, Result};
use std::process::ExitCode;
use tracing::{debug, error, trace};
use tracing_subscriber::filter::LevelFilter;
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> ExitCode {
    let args = Args::parse();
    let log_level = args.common().log_level();
    init_logger(log_level);
    debug!("Log level set to {}", log_level.to_string().to_lowercase());

    match main_inner(args).await {
        Ok(_) => ExitCode::SUCCESS,
        Err(e) => {
            error!("Exiting with error: {e}");
            ExitCode::FAILURE
        }
    }
}

pub async fn main_inner(args: Args) -> Result<()> {
    trace!("{args:?}");
    let home = args.common().expenses_home().path();

    let _: () = match args.command() {
        Command::Init => commands::init(home).await?.print(),

        Command::Add(add) => {
            let config = Config::load(home).await?;
            match add {
                AddSubcommand::Expense(args) => {
                    commands::add_expense(config, args.clone()).await?.print()
                }
                AddSubcommand::Owed(args) => {
                    commands::add_owed(config, args.clone()).await?.print()
                }
            }
        }

        Command::Settle(settle_args) => {
            let config = Config::load(home).await?;
            commands::settle(config, settle_args.clone()).await?.print()
        }

        Command::Undo(undo_args) => {
            let config = Config::load(home).await?;
            match undo_args.target() {
                UndoTarget::Owed => commands::undo_owed(config).await?.print(),
                UndoTarget::Expense => commands::undo_expense(config).await?.print(),
            }
        }

        Command::List(list) => {
            let config = Config::load(home).await?;
            match list {
                ListSubcommand::Expenses(args) => commands::list_expenses(config, args.clone())
                    .await?
                    .print_rows(),
                ListSubcommand::Owed(args) => commands::list_owed(config, args.clone())
                    .await?
                    .print_rows(),
            }
        }

        Command::Report(report_args) => {
            let config = Config::load(home).await?;
            commands::report(config, report_args.clone())
                .await?
                .print_rows()
        }
    };
    Ok(())
}

/// Initializes the tracing subscriber.
pub fn init_logger(level: LevelFilter) {
    let filter = match std::env::var("RUST_LOG").ok() {
        Some(_) => {
            // RUST_LOG exists; use it.
            EnvFilter::from_default_env()
        }
        None => {
            // RUST_LOG does not exist; use default log level for this crate only.
            EnvFilter::new(format!(
                "{}={},{}={}",
                env!("CARGO_CRATE_NAME"),
                level,
                "expense_tracker",
                level
            ))
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

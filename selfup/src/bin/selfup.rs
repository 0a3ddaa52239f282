use anyhow::Result;
use clap::{Parser, Subcommand};
use human_panic::setup_panic;
use selfup::prelude::*;
use tracing::{Level, enabled, error, info};

/// selfup
///
/// Rewrites values in any text file by running the command written in a JSON
/// directive on the same line.
///
///   $ selfup run .github/workflows/*.yml
///   $ selfup list --check .github/workflows/*.yml
#[derive(Parser)]
#[clap(author, version = env!("SELFUP_VERSION"), about, verbatim_doc_comment)]
struct Cli {
    #[clap(flatten)]
    logging: LoggingOpts,

    #[clap(flatten)]
    config: ConfigOptions,

    #[clap(subcommand)]
    command: Command,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Run the directives and rewrite files that changed
    #[clap(alias("r"))]
    Run(UpdateArgs),
    /// Run the directives and report what would change, without writing
    #[clap(alias("l"))]
    List(UpdateArgs),
    /// Rewrite beta directives (`regex` + `script`) into the current schema
    Migrate(MigrateArgs),
}

impl Cli {
    /// Console colors follow the same choice as the report lines.
    fn ansi(&self) -> bool {
        match &self.command {
            Command::Run(args) | Command::List(args) => args.report_style().color,
            Command::Migrate(_) => wants_color(false),
        }
    }
}

#[tokio::main]
async fn main() {
    setup_panic!();
    let opts = Cli::parse();

    let run_id = opts.config.get_run_id();
    let (guard, file_location) = match opts.logging.configure_logging(&run_id, opts.ansi()) {
        Ok(configured) => configured,
        Err(e) => {
            eprintln!("Unable to configure logging. {}", e);
            std::process::exit(2);
        }
    };
    let error_code = run_subcommand(opts).await;

    if error_code != 0 || enabled!(Level::DEBUG) {
        info!(target: "user", "More detailed logs at {}", file_location);
    }

    // the worker guard has to flush before exit
    drop(guard);
    std::process::exit(error_code);
}

async fn run_subcommand(opts: Cli) -> i32 {
    handle_commands(&opts).await.unwrap_or_else(|e| {
        error!(target: "user", "Critical Error. {}", e);
        1
    })
}

async fn handle_commands(opts: &Cli) -> Result<i32> {
    match &opts.command {
        Command::Run(args) => update_root(opts.config.working_dir()?, args, UpdateMode::Apply).await,
        Command::List(args) => update_root(opts.config.working_dir()?, args, UpdateMode::List).await,
        Command::Migrate(args) => migrate_root(opts.config.working_dir()?, args).await,
    }
}

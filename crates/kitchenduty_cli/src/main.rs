mod app;
mod commands;
mod serve;

use std::path::PathBuf;
use std::process;

use clap::{Args, Parser, Subcommand, ValueEnum};

/// Output format for CLI responses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub(crate) enum OutputFormat {
    Text,
    Json,
}

/// Kitchen duty rotation, swaps and calendar feed.
#[derive(Parser)]
#[command(
    name = "kitchenduty",
    version,
    about = "Kitchen duty rotation, swaps and calendar feed"
)]
struct Cli {
    /// Engine configuration file (TOML); defaults apply when omitted
    #[arg(long, global = true, env = "KITCHENDUTY_CONFIG")]
    config: Option<PathBuf>,

    /// Local state database
    #[arg(
        long,
        global = true,
        env = "KITCHENDUTY_DB",
        default_value = "kitchenduty.db"
    )]
    db: PathBuf,

    /// Remote JSON store; enables the two-tier cache when set
    #[arg(long, global = true, env = "KITCHENDUTY_REMOTE_URL")]
    remote_url: Option<String>,

    /// Directory for rolling log files; logging is off when omitted
    #[arg(long, global = true, env = "KITCHENDUTY_LOG_DIR")]
    log_dir: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true, env = "KITCHENDUTY_LOG_LEVEL")]
    log_level: Option<String>,

    /// Output format (text or json)
    #[arg(long, global = true, default_value = "text", value_enum)]
    output: OutputFormat,

    #[command(subcommand)]
    command: Commands,
}

/// Optional week selector; both parts or neither.
#[derive(Args, Debug, Clone, Copy)]
pub(crate) struct WeekArgs {
    /// ISO week number (defaults to the current week)
    #[arg(long, requires = "year")]
    pub(crate) week: Option<u32>,
    /// ISO week-numbering year
    #[arg(long, requires = "week")]
    pub(crate) year: Option<i32>,
}

#[derive(Subcommand)]
enum Commands {
    /// Show who is on duty
    Who {
        #[command(flatten)]
        week: WeekArgs,
    },

    /// List upcoming weeks from the current one
    Schedule {
        /// Number of weeks to list
        #[arg(long, default_value = "4")]
        weeks: u32,
    },

    /// Hand a week to someone in exchange for their next week
    Swap {
        /// ISO week number to give away
        #[arg(long)]
        week: u32,
        /// ISO week-numbering year
        #[arg(long)]
        year: i32,
        /// Participant taking over the week
        #[arg(long = "with")]
        target: String,
    },

    /// List participants a week can be swapped with
    Candidates {
        #[command(flatten)]
        week: WeekArgs,
    },

    /// Mark a week as done
    Done {
        #[command(flatten)]
        week: WeekArgs,
    },

    /// Remove a week's done mark
    Undo {
        #[command(flatten)]
        week: WeekArgs,
    },

    /// Show recent completions, newest first
    History {
        /// Number of entries (defaults to the configured limit)
        #[arg(long)]
        limit: Option<usize>,
    },

    /// Write the calendar feed to a file or stdout
    Export {
        /// Weeks to export (defaults to the configured horizon)
        #[arg(long)]
        weeks: Option<u32>,
        /// Output file; stdout when omitted
        #[arg(long)]
        out: Option<PathBuf>,
    },

    /// Serve the calendar feed over HTTP
    Serve {
        /// Port to listen on
        #[arg(long, default_value = "8080")]
        port: u16,
    },
}

fn main() {
    let cli = Cli::parse();

    app::init_logging(cli.log_dir.as_deref(), cli.log_level.as_deref());

    let engine = match app::open_engine(cli.config.as_deref(), &cli.db, cli.remote_url.as_deref())
    {
        Ok(engine) => engine,
        Err(err) => {
            eprintln!("error: {err}");
            process::exit(1);
        }
    };

    let result = match cli.command {
        Commands::Who { week } => commands::cmd_who(&engine, week, cli.output),
        Commands::Schedule { weeks } => commands::cmd_schedule(&engine, weeks, cli.output),
        Commands::Swap { week, year, target } => {
            let mut engine = engine;
            commands::cmd_swap(&mut engine, week, year, &target, cli.output)
        }
        Commands::Candidates { week } => commands::cmd_candidates(&engine, week, cli.output),
        Commands::Done { week } => {
            let mut engine = engine;
            commands::cmd_done(&mut engine, week, cli.output)
        }
        Commands::Undo { week } => {
            let mut engine = engine;
            commands::cmd_undo(&mut engine, week, cli.output)
        }
        Commands::History { limit } => commands::cmd_history(&engine, limit, cli.output),
        Commands::Export { weeks, out } => {
            commands::cmd_export(&engine, weeks, out.as_deref(), cli.output)
        }
        Commands::Serve { port } => {
            let rt = match tokio::runtime::Runtime::new() {
                Ok(rt) => rt,
                Err(err) => {
                    eprintln!("error: failed to create tokio runtime: {err}");
                    process::exit(1);
                }
            };
            rt.block_on(serve::start_server(port, engine))
                .map_err(|err| format!("server error: {err}"))
        }
    };

    if let Err(message) = result {
        eprintln!("error: {message}");
        process::exit(1);
    }
}

mod handlers;

use anyhow::Result;
use clap::{ArgAction, Parser, Subcommand};
use handlers::Session;
use std::path::PathBuf;
use taskfi::engine::state::UiStatus;
use taskfi::engine::types::Identity;

#[derive(Parser)]
#[command(name = "taskfi", version, about = "Stake on your word, prove it, get it back")]
struct Cli {
    /// Increase log verbosity (-v info, -vv debug, -vvv trace)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    verbose: u8,
    /// Connected wallet address
    #[arg(long, global = true)]
    viewer: Option<String>,
    /// Evaluate at this unix time instead of now
    #[arg(long, global = true)]
    at: Option<i64>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Clone)]
enum Commands {
    /// Initialize the .taskfi directory
    Init {
        /// Contract owner address to record in config
        #[arg(long)]
        owner: Option<String>,
    },
    /// Import contract snapshots from a JSON file
    Import { file: PathBuf },
    /// Store the demo task set
    Seed,
    /// List tasks with derived status
    List {
        #[arg(long)]
        json: bool,
        /// Only show tasks in this status (active, in-review, completed, failed)
        #[arg(long)]
        status: Option<UiStatus>,
    },
    /// Explain the status of one task
    Show {
        id: u64,
        #[arg(long)]
        json: bool,
    },
    /// Show task counts per status
    Status {
        #[arg(long)]
        json: bool,
    },
    /// Show viewer identity and admin rights
    Whoami {
        /// Override the configured contract owner
        #[arg(long)]
        owner: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    taskfi::logging::init(cli.verbose)?;

    let session = Session {
        viewer: cli.viewer.as_deref().map(Identity::new).filter(|v| !v.is_empty()),
        now: cli.at.unwrap_or_else(|| chrono::Utc::now().timestamp()),
    };
    tracing::debug!(now = session.now, viewer = ?session.viewer, "session");

    match cli.command {
        Commands::Init { .. } | Commands::Import { .. } | Commands::Seed => {
            dispatch_write_ops(cli.command, &session)
        }
        Commands::List { .. }
        | Commands::Show { .. }
        | Commands::Status { .. }
        | Commands::Whoami { .. } => dispatch_read_ops(cli.command, &session),
    }
}

fn dispatch_write_ops(cmd: Commands, session: &Session) -> Result<()> {
    match cmd {
        Commands::Init { owner } => handlers::init::handle(owner.as_deref().map(Identity::new)),
        Commands::Import { file } => handlers::import::handle(&file),
        Commands::Seed => handlers::seed::handle(session),
        _ => unreachable!("Invalid write command dispatch"),
    }
}

fn dispatch_read_ops(cmd: Commands, session: &Session) -> Result<()> {
    match cmd {
        Commands::List { json, status } => handlers::list::handle(session, json, status),
        Commands::Show { id, json } => handlers::show::handle(session, id, json),
        Commands::Status { json } => handlers::status::handle(session, json),
        Commands::Whoami { owner } => {
            handlers::whoami::handle(session, owner.as_deref().map(Identity::new))
        }
        _ => unreachable!("Invalid read command dispatch"),
    }
}

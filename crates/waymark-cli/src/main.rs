//! Waymark CLI - Command-line interface for Waymark
//!
//! Hosts anchors into rooms, resolves rooms and prints routes between
//! anchors, all against a local room store.

use clap::{Parser, Subcommand};
use colored::Colorize;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};
use waymark_core::Translation;

mod commands;
mod config;

#[derive(Parser)]
#[command(name = "waymark")]
#[command(author = "Waymark Contributors")]
#[command(version)]
#[command(about = "Named anchors, shared rooms and routes between them", long_about = None)]
struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Room store directory (overrides the config file)
    #[arg(long, global = true)]
    store: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize Waymark in the current directory
    Init {
        /// Path to initialize (defaults to current directory)
        #[arg(default_value = ".")]
        path: PathBuf,
    },

    /// Reserve a new room code
    NewRoom,

    /// Host a new anchor into a room
    Host {
        /// Room code
        #[arg(short, long)]
        room: u64,

        /// Display name of the new anchor
        #[arg(short, long)]
        name: String,

        /// Captured position as x,y,z
        #[arg(long, allow_hyphen_values = true)]
        at: Translation,

        /// Cloud anchor id issued by the AR service
        #[arg(long)]
        cloud_id: Option<String>,

        /// Names of anchors to connect to (comma-separated or repeated)
        #[arg(short, long, value_delimiter = ',')]
        connect: Vec<String>,
    },

    /// List the anchors of a room and their connections
    Anchors {
        /// Room code
        #[arg(short, long)]
        room: u64,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Find the shortest route between two anchors
    Route {
        /// Room code
        #[arg(short, long)]
        room: u64,

        /// Destination anchor name
        to: String,

        /// Start anchor name (defaults to the anchor nearest --at)
        #[arg(long)]
        from: Option<String>,

        /// Current position as x,y,z, used when --from is omitted
        #[arg(long, allow_hyphen_values = true)]
        at: Option<Translation>,

        /// Output as JSON instead of formatted text
        #[arg(long)]
        json: bool,
    },

    /// Show the anchor nearest to a position
    Nearest {
        /// Room code
        #[arg(short, long)]
        room: u64,

        /// Position as x,y,z
        #[arg(long, allow_hyphen_values = true)]
        at: Translation,
    },

    /// Print the room's latest wire blobs
    Export {
        /// Room code
        #[arg(short, long)]
        room: u64,
    },

    /// Delete every anchor of a room
    Clear {
        /// Room code
        #[arg(short, long)]
        room: u64,
    },
}

fn main() {
    let cli = Cli::parse();

    // Set up logging
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false),
        )
        .with(tracing_subscriber::EnvFilter::new(filter))
        .init();

    if let Err(e) = run(cli) {
        eprintln!("{} {}", "error:".red().bold(), e);
        std::process::exit(1);
    }
}

fn run(cli: Cli) -> commands::Result<()> {
    if let Commands::Init { path } = &cli.command {
        return commands::init(path);
    }

    let config = config::load(cli.store)?;
    let store = commands::open_store(&config)?;

    match cli.command {
        Commands::Init { .. } => Ok(()),
        Commands::NewRoom => commands::new_room(&store),
        Commands::Host {
            room,
            name,
            at,
            cloud_id,
            connect,
        } => commands::host(&store, &config, room, name, at, cloud_id, connect),
        Commands::Anchors { room, json } => commands::anchors(&store, room, json),
        Commands::Route {
            room,
            to,
            from,
            at,
            json,
        } => commands::route(&store, room, &to, from.as_deref(), at, json),
        Commands::Nearest { room, at } => commands::nearest(&store, room, at),
        Commands::Export { room } => commands::export(&store, room),
        Commands::Clear { room } => commands::clear(&store, room),
    }
}

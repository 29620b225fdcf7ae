mod cmd;
mod output;
mod root;

use clap::{Parser, Subcommand};
use cmd::{
    agent::AgentSubcommand, checkpoint::CheckpointSubcommand, feature::FeatureSubcommand,
    mcp::McpSubcommand, phase::PhaseSubcommand, quality::QualitySubcommand,
    session::SessionSubcommand,
};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "armature",
    about = "Project state, checkpoint, and recovery tracking for agent-driven development",
    version,
    propagate_version = true
)]
struct Cli {
    /// Project root (default: auto-detect from .armature/ or .git/)
    #[arg(long, global = true, env = "ARMATURE_ROOT")]
    root: Option<PathBuf>,

    /// Output as JSON
    #[arg(long, global = true, short = 'j')]
    json: bool,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Initialize armature in the current project
    Init {
        /// Project name (default: the root directory name)
        #[arg(long)]
        name: Option<String>,

        /// Project type, e.g. web, cli, library
        #[arg(long = "type")]
        project_type: Option<String>,
    },

    /// Show project state
    State,

    /// Manage features
    Feature {
        #[command(subcommand)]
        subcommand: FeatureSubcommand,
    },

    /// Create, list, and restore checkpoints
    Checkpoint {
        #[command(subcommand)]
        subcommand: CheckpointSubcommand,
    },

    /// Track the current unit of agent work
    Session {
        #[command(subcommand)]
        subcommand: SessionSubcommand,
    },

    /// Compute the project health score
    Health,

    /// Detect an interrupted session and suggest recovery steps
    Recover,

    /// Show or advance the development phase
    Phase {
        #[command(subcommand)]
        subcommand: PhaseSubcommand,
    },

    /// Record quality metrics reported by external tooling
    Quality {
        #[command(subcommand)]
        subcommand: QualitySubcommand,
    },

    /// Manage agent availability
    Agent {
        #[command(subcommand)]
        subcommand: AgentSubcommand,
    },

    /// Manage MCP server references
    Mcp {
        #[command(subcommand)]
        subcommand: McpSubcommand,
    },
}

fn main() {
    let cli = Cli::parse();

    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env()
                .add_directive(tracing::Level::WARN.into()),
        )
        .with_target(false)
        .init();

    let root_path = cli.root.as_deref();
    let root = root::resolve_root(root_path);

    let result = match cli.command {
        Commands::Init { name, project_type } => {
            cmd::init::run(&root, name.as_deref(), project_type.as_deref())
        }
        Commands::State => cmd::state::run(&root, cli.json),
        Commands::Feature { subcommand } => cmd::feature::run(&root, subcommand, cli.json),
        Commands::Checkpoint { subcommand } => cmd::checkpoint::run(&root, subcommand, cli.json),
        Commands::Session { subcommand } => cmd::session::run(&root, subcommand, cli.json),
        Commands::Health => cmd::health::run(&root, cli.json),
        Commands::Recover => cmd::recover::run(&root, cli.json),
        Commands::Phase { subcommand } => cmd::phase::run(&root, subcommand, cli.json),
        Commands::Quality { subcommand } => cmd::quality::run(&root, subcommand, cli.json),
        Commands::Agent { subcommand } => cmd::agent::run(&root, subcommand, cli.json),
        Commands::Mcp { subcommand } => cmd::mcp::run(&root, subcommand, cli.json),
    };

    if let Err(e) = result {
        // Print the full error chain (anyhow's alternate Display)
        eprintln!("error: {e:#}");
        std::process::exit(1);
    }
}

//! Student Companion CLI entry point.
//!
//! Commands:
//! - `onboard`: Write a starter config
//! - `students`: List students, or show one profile
//! - `ask`: Ask a question for a student
//! - `probe`: Raw knowledge base query for diagnostics
//! - `gateway`: Start the HTTP server and web frontend
//! - `status`: Show configuration status

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(
    name = "companion",
    about = "Student Companion: personalized answers grounded in your study material",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Emit logs as JSON lines
    #[arg(long, global = true)]
    json_logs: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Write a starter configuration file
    Onboard,

    /// List students, or show one student's profile
    Students {
        /// Student key to show in detail
        key: Option<String>,
    },

    /// Ask a question on behalf of a student
    Ask {
        /// Student key (see `companion students`)
        #[arg(short, long)]
        student: String,

        /// Also print the retrieved study material
        #[arg(long)]
        show_material: bool,

        /// The question
        question: String,
    },

    /// Run a raw knowledge base query and print the response
    Probe {
        /// Query text (defaults to `retrieval.probe_query`)
        #[arg(short, long)]
        query: Option<String>,
    },

    /// Start the HTTP gateway and web frontend
    Gateway {
        /// Override the port
        #[arg(short, long)]
        port: Option<u16>,
    },

    /// Show configuration status
    Status,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose { "debug" } else { "info" };
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(filter));
    let builder = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(std::io::stderr);
    if cli.json_logs {
        builder.json().init();
    } else {
        builder.init();
    }

    match cli.command {
        Commands::Onboard => commands::onboard::run().await?,
        Commands::Students { key } => commands::students::run(key).await?,
        Commands::Ask {
            student,
            show_material,
            question,
        } => commands::ask::run(&student, &question, show_material).await?,
        Commands::Probe { query } => commands::probe::run(query).await?,
        Commands::Gateway { port } => commands::gateway::run(port).await?,
        Commands::Status => commands::status::run().await?,
    }

    Ok(())
}

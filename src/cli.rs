use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// Trellis - compile, render and serve schema-driven screens
#[derive(Parser, Debug, Clone)]
#[command(name = "trellis", version, about, long_about = None)]
pub struct Cli {
    /// Path to the configuration file
    #[arg(short, long, env = "TRELLIS_CONFIG", default_value = "trellis.toml")]
    pub config: PathBuf,

    /// Server host address
    #[arg(long, env = "TRELLIS_HOST")]
    pub host: Option<String>,

    /// Server port
    #[arg(long, env = "TRELLIS_PORT")]
    pub port: Option<u16>,

    /// Directory of view definition files
    #[arg(long, env = "TRELLIS_VIEWS_DIR")]
    pub views_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// Run the HTTP server (default)
    Serve,
    /// Print the compiled schema of a view
    Compile {
        view: String,
        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,
    },
    /// Render a view to HTML
    Render {
        view: String,
        /// JSON file with the record data to render against
        #[arg(long)]
        data: Option<PathBuf>,
    },
}

impl Cli {
    pub fn command(&self) -> Command {
        self.command.clone().unwrap_or(Command::Serve)
    }
}

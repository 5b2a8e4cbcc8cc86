use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(name = "sesame_cli", version, about = "Sesame session tooling")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Print the CLI version
    Version,

    /// Load and validate a configuration file
    CheckConfig {
        /// Path to the YAML configuration file
        path: PathBuf,
    },

    /// Decode a session cookie value with the configured cookie password
    InspectCookie {
        /// Path to the YAML configuration file
        #[arg(long)]
        config: PathBuf,

        /// Cookie value, without the cookie name
        value: String,
    },
}

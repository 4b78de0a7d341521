//! Command line definition.

use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "skylog", version, about = "Weather lookups with a local search history")]
pub struct Cli {
    /// Config file to use instead of the default location
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Look up current weather and the forecast for a place, and save the search
    Search {
        /// Place name or "lat, lon"
        #[arg(allow_hyphen_values = true)]
        location: String,

        /// First day of the range (defaults to today)
        #[arg(long, value_name = "YYYY-MM-DD")]
        start: Option<String>,

        /// Last day of the range (defaults to the start date)
        #[arg(long, value_name = "YYYY-MM-DD")]
        end: Option<String>,
    },

    /// Show saved searches, newest first
    List,

    /// Change the location and dates of a saved search
    Edit {
        id: i64,

        #[arg(long)]
        location: String,

        #[arg(long, value_name = "YYYY-MM-DD")]
        start: String,

        #[arg(long, value_name = "YYYY-MM-DD")]
        end: String,
    },

    /// Delete a saved search
    Delete {
        id: i64,

        /// Skip the confirmation prompt
        #[arg(short, long)]
        yes: bool,
    },

    /// Export all saved searches
    Export {
        /// json, csv, xml or md
        format: String,

        /// Output file (defaults to weather_history.<ext>)
        #[arg(short, long, value_name = "PATH")]
        output: Option<PathBuf>,
    },
}

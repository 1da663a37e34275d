use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "autocheck", version, about = "Run system health checks tab by tab")]
pub struct Cli {
    /// Config file (defaults to the user config dir)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Also print diagnostic logs to stdout
    #[arg(long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List tabs, their systems and checks
    List,

    /// Run checks on one tab; Ctrl-C cancels and shuts down
    Run {
        /// Tab id, e.g. "П"
        #[arg(long)]
        tab: String,

        /// Run only this check (the scheduled one runs without waiting)
        #[arg(long, conflicts_with = "with_scheduled")]
        check: Option<String>,

        /// Append the tab's scheduled check, released at the configured time
        #[arg(long)]
        with_scheduled: bool,
    },

    /// Write the effective configuration to the config file
    InitConfig,
}

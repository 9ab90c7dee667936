use std::path::PathBuf;

use clap::Parser;

/// Startup flags for the reminder runner
#[derive(Parser, Debug)]
#[clap(
    version,
    about = "Keeps reminder notifications scheduled from the local reminder store"
)]
pub struct Cli {
    /// Path to the configuration file
    #[clap(short = 'c', long, value_parser)]
    pub config: Option<PathBuf>,

    /// Directory holding the stored reminders (overrides the config file)
    #[clap(long, value_parser)]
    pub data_dir: Option<PathBuf>,

    /// Verbose output mode
    #[clap(short, long)]
    pub verbose: bool,
}

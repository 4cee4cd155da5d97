// Command line definition

use clap::{Parser, Subcommand};
use scriptsync_core::domain::{BindingKey, Moment};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "scriptsync")]
#[command(about = "Bind scripts to system lifecycle moments", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Binding list location (defaults to the per-user config directory)
    #[arg(long, global = true, env = "SCRIPTSYNC_CONFIG_PATH")]
    pub config: Option<String>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Show all bindings
    List,

    /// Bind a script to a moment
    Add {
        /// Script to run (absolute path)
        path: PathBuf,

        /// system-startup, user-logon, before-shutdown or before-logoff
        #[arg(short, long)]
        moment: Moment,

        /// Run with administrative rights through an elevation wrapper
        #[arg(short, long)]
        elevated: bool,

        /// Binding name (default: file name without extension)
        #[arg(short, long)]
        name: Option<String>,
    },

    /// Change the moment or elevation of a binding
    Edit {
        #[command(flatten)]
        target: Target,

        /// Move the binding to another moment
        #[arg(long)]
        new_moment: Option<Moment>,

        #[arg(long, conflicts_with = "no_elevated")]
        elevated: bool,

        #[arg(long)]
        no_elevated: bool,
    },

    /// Enable or disable a binding
    Toggle {
        #[command(flatten)]
        target: Target,
    },

    /// Delete a binding and its scheduled job
    Remove {
        #[command(flatten)]
        target: Target,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },

    /// Run a bound script now
    Test {
        #[command(flatten)]
        target: Target,
    },

    /// Rebuild all managed scheduler jobs from the binding list
    Sync,

    /// Show the files and directories in use
    Paths,
}

/// Identifies one binding
#[derive(clap::Args)]
pub struct Target {
    /// Binding name
    pub name: String,

    #[arg(short, long)]
    pub moment: Moment,
}

impl Target {
    pub fn key(&self) -> BindingKey {
        BindingKey::new(self.name.clone(), self.moment)
    }
}

impl Commands {
    /// Commands that only read local state run without administrative rights
    pub fn needs_admin(&self) -> bool {
        !matches!(self, Commands::List | Commands::Paths)
    }
}

/// Tri-state of the `--elevated` / `--no-elevated` pair
pub fn elevation_flag(elevated: bool, no_elevated: bool) -> Option<bool> {
    match (elevated, no_elevated) {
        (true, _) => Some(true),
        (_, true) => Some(false),
        _ => None,
    }
}

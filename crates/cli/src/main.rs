//! ScriptSync CLI - binds scripts to system lifecycle moments
//! Composition root: wires the filesystem and system adapters into the core

mod cli;
mod commands;
mod logging;

use anyhow::{Context, Result};
use clap::Parser;
use std::sync::Arc;
use tracing::{debug, info};

use scriptsync_core::application::{AddRequest, BindingService, EditRequest, SyncEngine};
use scriptsync_core::port::time_provider::SystemTimeProvider;
use scriptsync_core::port::PrivilegeProbe;
use scriptsync_infra_fs::{resolve_config_path, FsElevationWrapper, JsonBindingStore};
use scriptsync_infra_system::{OsPrivilegeProbe, ProcessLauncher, SchtasksScheduler};

use cli::{elevation_flag, Cli, Commands};

const VERSION: &str = env!("CARGO_PKG_VERSION");

fn main() -> Result<()> {
    let cli = Cli::parse();

    // 1. Logging (guard flushes the file appender on exit)
    let _log_guard = logging::init()?;
    debug!("ScriptSync v{} starting", VERSION);

    // 2. Configuration
    let config_path = resolve_config_path(cli.config.as_deref())
        .context("Cannot determine the per-user config directory; pass --config")?;

    if let Commands::Paths = cli.command {
        commands::paths(&config_path, logging::log_dir().as_deref());
        return Ok(());
    }

    // 3. Startup gate: everything that touches the scheduler needs admin rights
    let probe = OsPrivilegeProbe::new();
    if cli.command.needs_admin() {
        commands::require_admin(probe.is_elevated())?;
    }

    // 4. Dependency wiring
    let store = Arc::new(JsonBindingStore::new(&config_path));
    let wrapper = Arc::new(FsElevationWrapper::new());
    let scheduler = Arc::new(SchtasksScheduler::new(probe.current_user()));
    let engine = SyncEngine::new(scheduler, wrapper.clone(), Arc::new(SystemTimeProvider));
    let launcher = Arc::new(ProcessLauncher::new());
    let mut service = BindingService::open(store, engine, wrapper, launcher);

    info!(config = %config_path.display(), "ScriptSync ready");

    // 5. Dispatch
    match cli.command {
        Commands::List => commands::list(&service),
        Commands::Add {
            path,
            moment,
            elevated,
            name,
        } => {
            let mut req = AddRequest::new(path, moment, elevated);
            req.name = name;
            commands::add(&mut service, req)
        }
        Commands::Edit {
            target,
            new_moment,
            elevated,
            no_elevated,
        } => {
            let req = EditRequest {
                moment: new_moment,
                elevated: elevation_flag(elevated, no_elevated),
            };
            commands::edit(&mut service, &target.key(), req)
        }
        Commands::Toggle { target } => commands::toggle(&mut service, &target.key()),
        Commands::Remove { target, yes } => commands::remove(&mut service, &target.key(), yes),
        Commands::Test { target } => commands::test(&service, &target.key()),
        Commands::Sync => commands::sync(&service),
        Commands::Paths => Ok(()),
    }
}

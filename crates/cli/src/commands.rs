// Command handlers: call the binding service and render results

use anyhow::{bail, Context, Result};
use colored::Colorize;
use std::io::{BufRead, Write};
use std::path::Path;
use tabled::{Table, Tabled};

use scriptsync_core::application::{AddRequest, BindingService, EditRequest, SyncReport};
use scriptsync_core::domain::{Binding, BindingKey};
use scriptsync_core::port::{ExecutionResult, ExecutionStatus};
use scriptsync_core::AppError;

#[derive(Tabled)]
struct BindingRow {
    #[tabled(rename = "Name")]
    name: String,
    #[tabled(rename = "Moment")]
    moment: String,
    #[tabled(rename = "Type")]
    kind: String,
    #[tabled(rename = "Elevated")]
    elevated: String,
    #[tabled(rename = "Enabled")]
    enabled: String,
    #[tabled(rename = "Path")]
    path: String,
}

impl From<&Binding> for BindingRow {
    fn from(b: &Binding) -> Self {
        Self {
            name: b.name.clone(),
            moment: b.moment.to_string(),
            kind: b.kind().label().to_string(),
            elevated: yes_no(b.elevated),
            enabled: yes_no(b.enabled),
            path: b.path.display().to_string(),
        }
    }
}

fn yes_no(flag: bool) -> String {
    let text = if flag { "yes" } else { "no" };
    text.to_string()
}

pub fn list(service: &BindingService) -> Result<()> {
    let registry = service.registry();

    if registry.is_empty() {
        println!("{}", "No bindings configured".yellow());
        return Ok(());
    }

    let rows: Vec<BindingRow> = registry.bindings().iter().map(BindingRow::from).collect();
    println!("{}", Table::new(rows));

    let duplicates = registry.duplicate_keys();
    if !duplicates.is_empty() {
        println!();
        for key in duplicates {
            println!(
                "  {} {} is listed more than once; only the first entry is scheduled",
                "!".yellow().bold(),
                key
            );
        }
    }

    Ok(())
}

pub fn add(service: &mut BindingService, req: AddRequest) -> Result<()> {
    let (binding, report) = service.add(req).map_err(with_sync_details)?;

    println!(
        "{}",
        format!("✓ Bound {} to {}", binding.name, binding.moment.description())
            .green()
            .bold()
    );
    print_report(&report);
    Ok(())
}

pub fn edit(service: &mut BindingService, key: &BindingKey, req: EditRequest) -> Result<()> {
    let (binding, report) = service.edit(key, req).map_err(with_sync_details)?;

    println!(
        "{}",
        format!(
            "✓ {} now runs {} ({})",
            binding.name,
            binding.moment.description().to_lowercase(),
            if binding.elevated { "elevated" } else { "not elevated" }
        )
        .green()
        .bold()
    );
    print_report(&report);
    Ok(())
}

pub fn toggle(service: &mut BindingService, key: &BindingKey) -> Result<()> {
    let (enabled, report) = service.toggle(key).map_err(with_sync_details)?;

    let state = if enabled {
        "enabled".green()
    } else {
        "disabled".yellow()
    };
    println!("{} {} {}", "✓".green().bold(), key, state);
    print_report(&report);
    Ok(())
}

pub fn remove(service: &mut BindingService, key: &BindingKey, assume_yes: bool) -> Result<()> {
    if !assume_yes && !confirm(&format!("Remove binding {}?", key))? {
        println!("{}", "Cancelled".yellow());
        return Ok(());
    }

    let removed = service.remove(key)?;
    println!(
        "{}",
        format!("✓ Removed {} ({})", removed.name, removed.job_name())
            .green()
            .bold()
    );
    Ok(())
}

pub fn test(service: &BindingService, key: &BindingKey) -> Result<()> {
    println!("{}", format!("Running {}...", key).cyan().bold());

    let result = service.test_run(key)?;
    print_execution(&result);
    Ok(())
}

pub fn sync(service: &BindingService) -> Result<()> {
    println!("{}", "Synchronizing scheduler jobs...".cyan().bold());

    let report = service.sync().map_err(with_sync_details)?;
    print_report(&report);
    println!(
        "  {} {}",
        "Finished at:".bold(),
        chrono::Local::now().format("%Y-%m-%d %H:%M:%S")
    );
    Ok(())
}

pub fn paths(config: &Path, log_dir: Option<&Path>) {
    println!("{}", "ScriptSync paths".cyan().bold());
    println!();
    println!("  {} {}", "Config:".bold(), config.display());
    println!(
        "  {} {}",
        "Exists:".bold(),
        if config.exists() {
            "yes".green()
        } else {
            "no".yellow()
        }
    );
    match log_dir {
        Some(dir) => println!("  {} {}", "Log dir:".bold(), dir.display()),
        None => println!("  {} {}", "Log dir:".bold(), "(console only)".dimmed()),
    }
    println!(
        "  {} <script dir>/ScriptWrappers/elevated_<script>.cmd",
        "Wrappers:".bold()
    );
}

fn print_report(report: &SyncReport) {
    println!();
    println!(
        "  {} {} registered, {} removed, {} disabled ({} ms)",
        "Jobs:".bold(),
        report.registered.len(),
        report.removed.len(),
        report.disabled.len(),
        report.duration_ms
    );

    for name in &report.registered {
        println!("    {} {}", "+".green(), name);
    }
    for name in &report.duplicates {
        println!("    {} {} skipped (duplicate)", "!".yellow(), name);
    }
    for failure in &report.failures {
        println!(
            "    {} {} ({:?}): {}",
            "✗".red(),
            failure.job_name,
            failure.stage,
            failure.message
        );
    }
}

fn print_execution(result: &ExecutionResult) {
    let status = match result.status {
        ExecutionStatus::Started => "STARTED".cyan(),
        ExecutionStatus::Success => "SUCCESS".green(),
        ExecutionStatus::Failed => "FAILED".red(),
    };
    println!("  {} {}", "Status:".bold(), status);

    if let Some(pid) = result.pid {
        println!("  {} {}", "PID:".bold(), pid);
    }
    if let Some(code) = result.exit_code {
        println!("  {} {}", "Exit code:".bold(), code);
    }
    if let Some(stdout) = result.stdout.as_deref().filter(|s| !s.trim().is_empty()) {
        println!("  {}", "Output:".bold());
        println!("{}", stdout.trim_end());
    }
}

/// Print the partial report carried by an incomplete sync before
/// handing the error back
fn with_sync_details(err: AppError) -> anyhow::Error {
    if let AppError::SyncIncomplete(report) = &err {
        print_report(report);
    }
    err.into()
}

fn confirm(prompt: &str) -> Result<bool> {
    print!("{} [y/N] ", prompt);
    std::io::stdout().flush().context("Failed to flush stdout")?;

    let mut answer = String::new();
    std::io::stdin()
        .lock()
        .read_line(&mut answer)
        .context("Failed to read answer")?;

    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "Yes"))
}

/// Fails with a permission error unless the probe reports admin rights
pub fn require_admin(elevated: bool) -> Result<()> {
    if !elevated {
        bail!(AppError::Permission(
            "administrative rights are required; restart from an elevated prompt".to_string()
        ));
    }
    Ok(())
}

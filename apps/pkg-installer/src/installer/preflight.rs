//! Pre-flight system checks.

use std::ffi::OsStr;
use std::io;

use tracing::{info, warn};

use crate::app::{CheckItem, Status};
use crate::config::InstallerConfig;
use crate::installer::error::PreflightError;
use crate::installer::{command_exists, CommandRunner};

/// Run all pre-flight checks.
///
/// Fatal problems (wrong OS, package manager unusable) are returned as
/// errors; everything else is reported through the check items.
pub fn run_preflight_checks(
    runner: &dyn CommandRunner,
    config: &InstallerConfig,
    as_root: bool,
) -> Result<Vec<CheckItem>, PreflightError> {
    let checks = vec![
        check_os(std::env::consts::OS)?,
        check_package_manager(runner, &config.package_manager)?,
        check_elevation(&config.elevators, as_root, command_exists),
    ];

    for check in &checks {
        match check.status {
            Status::Warning => warn!(check = %check.name, message = ?check.message, "preflight warning"),
            _ => info!(check = %check.name, message = ?check.message, "preflight ok"),
        }
    }

    Ok(checks)
}

/// Check operating system
fn check_os(os: &str) -> Result<CheckItem, PreflightError> {
    if os != "linux" {
        return Err(PreflightError::UnsupportedOs(os.to_string()));
    }
    Ok(CheckItem::new("Operating System", "Linux required")
        .with_status(Status::Success)
        .with_message(format!("Found: {os}")))
}

/// Check that the package manager can be called at all
fn check_package_manager(
    runner: &dyn CommandRunner,
    tool: &str,
) -> Result<CheckItem, PreflightError> {
    let missing = |reason: String| PreflightError::PackageManagerMissing {
        tool: tool.to_string(),
        reason,
    };

    let output = runner
        .capture(tool, &[OsStr::new("--version")])
        .map_err(|e| match e.kind() {
            io::ErrorKind::NotFound => missing("command not found".to_string()),
            _ => missing(e.to_string()),
        })?;

    if !output.success() {
        return Err(missing(match output.code {
            Some(code) => format!("'{tool} --version' exited with code {code}"),
            None => format!("'{tool} --version' was terminated by a signal"),
        }));
    }

    let version = describe_version(&output.stdout).unwrap_or_else(|| "available".to_string());
    Ok(CheckItem::new("Package Manager", format!("{tool} required"))
        .with_status(Status::Success)
        .with_message(version))
}

/// Check that at least one elevation helper is installed
fn check_elevation(
    elevators: &[String],
    as_root: bool,
    exists: impl Fn(&str) -> bool,
) -> CheckItem {
    let item = CheckItem::new("Elevation", elevators.join(" or "));

    if as_root {
        return item
            .with_status(Status::Success)
            .with_message("Running as root, no elevation needed");
    }

    match elevators.iter().find(|e| exists(e.as_str())) {
        Some(found) => item
            .with_status(Status::Success)
            .with_message(format!("Using {found}")),
        None => item
            .with_status(Status::Warning)
            .with_message("No elevation helper found; installation will fail"),
    }
}

/// Pull "Name vX.Y.Z" out of `--version` output
fn describe_version(stdout: &str) -> Option<String> {
    stdout.lines().find_map(|line| {
        let words: Vec<&str> = line.split_whitespace().collect();
        words
            .iter()
            .position(|w| {
                w.strip_prefix('v')
                    .is_some_and(|rest| rest.starts_with(|c: char| c.is_ascii_digit()))
            })
            .map(|i| words[i.saturating_sub(1)..=i].join(" "))
    })
}

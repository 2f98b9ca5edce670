//! Non-interactive subcommands.
//!
//! Both write to the given streams and return the process exit status, so
//! they can be driven by a scripted runner.

use std::io::{self, Write};
use std::path::Path;

use tracing::info;

use crate::installer::controller::InstallerController;
use crate::installer::executor::{InstallMessage, InstallOutcome};

pub const EXIT_SUCCESS: u8 = 0;
pub const EXIT_FAILURE: u8 = 1;
/// `install` was not confirmed with `--yes`
pub const EXIT_NOT_CONFIRMED: u8 = 2;

/// `info`: print the package metadata
pub fn run_info(
    controller: &mut InstallerController,
    package: &Path,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<u8> {
    if let Err(e) = controller.select(package) {
        writeln!(err, "pkg-installer: {e}")?;
        return Ok(EXIT_FAILURE);
    }
    write!(out, "{}", controller.state().metadata().unwrap_or_default())?;
    Ok(EXIT_SUCCESS)
}

/// `install`: run the installation, streaming output lines to `out`
pub fn run_install(
    controller: &mut InstallerController,
    package: &Path,
    yes: bool,
    out: &mut dyn Write,
    err: &mut dyn Write,
) -> io::Result<u8> {
    if let Err(e) = controller.select(package) {
        writeln!(err, "pkg-installer: {e}")?;
        return Ok(EXIT_FAILURE);
    }
    if !yes {
        writeln!(err, "pkg-installer: refusing to install without --yes")?;
        return Ok(EXIT_NOT_CONFIRMED);
    }

    let rx = match controller.install(true) {
        Ok(rx) => rx,
        Err(e) => {
            writeln!(err, "pkg-installer: {e}")?;
            return Ok(EXIT_FAILURE);
        }
    };

    let mut outcome = InstallOutcome::Error("installer thread exited unexpectedly".to_string());
    for msg in rx {
        match msg {
            InstallMessage::Launching(program) => {
                writeln!(err, ":: launching installer via {program}")?
            }
            InstallMessage::LauncherMissing(program) => {
                writeln!(err, ":: {program} not found, trying next")?
            }
            // The terminal is already ours to give.
            InstallMessage::TerminalHandoff(handoff) => handoff.release(),
            InstallMessage::Line(line) => {
                writeln!(out, "{line}")?;
                out.flush()?;
            }
            InstallMessage::Finished(result) => outcome = result,
        }
    }
    controller.finish_install(&outcome);
    info!(outcome = ?outcome, "non-interactive install finished");

    if outcome.is_success() {
        writeln!(err, ":: {}", outcome.summary())?;
        Ok(EXIT_SUCCESS)
    } else {
        writeln!(err, "pkg-installer: {}", outcome.summary())?;
        Ok(EXIT_FAILURE)
    }
}

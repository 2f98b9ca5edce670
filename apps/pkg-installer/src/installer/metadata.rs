//! Package metadata preview via the query tool.

use std::ffi::OsStr;
use std::io;

use tracing::{debug, warn};

use crate::installer::package::PackageRef;
use crate::installer::CommandRunner;

/// Prefix shown ahead of the query tool's stderr when it fails
pub const QUERY_ERROR_PREFIX: &str = "Error reading package info:\n";

/// Shown when the query tool cannot be found at all
pub const QUERY_TOOL_MISSING: &str = "Error: package query tool not found";

/// Run `<tool> -Qip <path>` and return the text to show in the info panel.
///
/// Never fails: problems come back as display text.
pub fn query_package_info(runner: &dyn CommandRunner, tool: &str, package: &PackageRef) -> String {
    let args = [OsStr::new("-Qip"), package.path().as_os_str()];

    match runner.capture(tool, &args) {
        Ok(output) if output.success() => {
            debug!(package = %package.file_name(), "package info loaded");
            output.stdout
        }
        Ok(output) => {
            warn!(
                package = %package.file_name(),
                code = ?output.code,
                "package query failed"
            );
            format!("{QUERY_ERROR_PREFIX}{}", output.stderr)
        }
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            warn!(tool, "package query tool not found");
            QUERY_TOOL_MISSING.to_string()
        }
        Err(e) => {
            warn!(tool, error = %e, "failed to run package query tool");
            format!("{QUERY_ERROR_PREFIX}{e}")
        }
    }
}

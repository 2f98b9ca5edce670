//! Installer logic modules.
//!
//! Everything that talks to external tools goes through [`CommandRunner`] so
//! the controller can be exercised without touching the real package manager.

pub mod controller;
pub mod error;
pub mod executor;
pub mod metadata;
pub mod package;
pub mod preflight;

#[cfg(test)]
pub(crate) mod testing;

use std::env;
use std::ffi::OsStr;
use std::io::{self, BufRead, BufReader, Read};
use std::path::Path;
use std::process::{Command, Output, Stdio};
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::{Duration, Instant};

/// How often a streaming command is checked for exit while it is quiet
const EXIT_POLL_INTERVAL: Duration = Duration::from_millis(50);

/// Upper bound on reading leftover output once the process has exited
const DRAIN_AFTER_EXIT: Duration = Duration::from_millis(500);

/// Result of a command that ran to completion with separate stdout/stderr
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CapturedOutput {
    /// Exit code, `None` if the process was killed by a signal
    pub code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl CapturedOutput {
    pub fn success(&self) -> bool {
        self.code == Some(0)
    }
}

impl From<Output> for CapturedOutput {
    fn from(output: Output) -> Self {
        Self {
            code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        }
    }
}

/// Narrow interface over external process execution.
///
/// A missing executable must surface as [`io::ErrorKind::NotFound`] from
/// either method; callers rely on that to fall back to another tool.
pub trait CommandRunner: Send + Sync {
    /// Run to completion, capturing stdout and stderr separately.
    fn capture(&self, program: &str, args: &[&OsStr]) -> io::Result<CapturedOutput>;

    /// Run with stdout and stderr merged into one stream, handing each line
    /// to `on_line` in the order the process wrote it. Returns the exit code.
    fn stream(
        &self,
        program: &str,
        args: &[&OsStr],
        on_line: &mut dyn FnMut(String),
    ) -> io::Result<Option<i32>>;
}

/// [`CommandRunner`] backed by `std::process`
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemRunner;

impl CommandRunner for SystemRunner {
    fn capture(&self, program: &str, args: &[&OsStr]) -> io::Result<CapturedOutput> {
        Command::new(program)
            .args(args)
            .stdin(Stdio::null())
            .output()
            .map(CapturedOutput::from)
    }

    fn stream(
        &self,
        program: &str,
        args: &[&OsStr],
        on_line: &mut dyn FnMut(String),
    ) -> io::Result<Option<i32>> {
        // Both stdout and stderr share one pipe so interleaving is preserved.
        let (reader, writer) = io::pipe()?;
        let mut child = {
            let mut command = Command::new(program);
            command
                .args(args)
                .stdin(Stdio::null())
                .stdout(writer.try_clone()?)
                .stderr(writer);
            command.spawn()?
        };

        // Lines are read on a helper thread so the wait below follows the
        // child, not the pipe: anything the child left running in the
        // background may hold the write end open long after it exited.
        let (line_tx, line_rx) = mpsc::channel();
        let pump = thread::Builder::new()
            .name("pkg-output".to_string())
            .spawn(move || {
                pump_lines(reader, &mut |line: String| {
                    let _ = line_tx.send(line);
                })
            });
        let pump = match pump {
            Ok(pump) => pump,
            Err(e) => {
                let _ = child.kill();
                let _ = child.wait();
                return Err(e);
            }
        };

        let status = loop {
            match line_rx.recv_timeout(EXIT_POLL_INTERVAL) {
                Ok(line) => on_line(line),
                Err(RecvTimeoutError::Timeout) => {}
                Err(RecvTimeoutError::Disconnected) => {
                    // Reader hit EOF or failed.
                    let pumped = pump
                        .join()
                        .unwrap_or_else(|_| Err(io::Error::other("output reader panicked")));
                    if let Err(e) = pumped {
                        let _ = child.kill();
                        let _ = child.wait();
                        return Err(e);
                    }
                    break child.wait()?;
                }
            }
            if let Some(status) = child.try_wait()? {
                break status;
            }
        };

        // Output still buffered in the pipe when the child exited.
        let deadline = Instant::now() + DRAIN_AFTER_EXIT;
        while let Ok(line) = line_rx.recv_timeout(deadline.saturating_duration_since(Instant::now())) {
            on_line(line);
        }

        Ok(status.code())
    }
}

/// Read `reader` to EOF, emitting each line without its terminator
fn pump_lines(reader: impl Read, on_line: &mut dyn FnMut(String)) -> io::Result<()> {
    let mut reader = BufReader::new(reader);
    let mut buf = Vec::new();
    loop {
        buf.clear();
        if reader.read_until(b'\n', &mut buf)? == 0 {
            return Ok(());
        }
        let line = String::from_utf8_lossy(&buf);
        on_line(line.trim_end_matches(['\n', '\r']).to_string());
    }
}

/// Check if an executable with this name is on `PATH`
pub fn command_exists(cmd: &str) -> bool {
    if cmd.contains('/') {
        return is_executable(Path::new(cmd));
    }
    env::var_os("PATH")
        .map(|paths| env::split_paths(&paths).any(|dir| is_executable(&dir.join(cmd))))
        .unwrap_or(false)
}

fn is_executable(path: &Path) -> bool {
    use std::os::unix::fs::PermissionsExt;

    path.metadata()
        .map(|m| m.is_file() && m.permissions().mode() & 0o111 != 0)
        .unwrap_or(false)
}

/// Check if running as root
pub fn is_root() -> bool {
    nix::unistd::geteuid().is_root()
}

//! Privileged installation, run on a background thread.

use std::ffi::{OsStr, OsString};
use std::io;
use std::path::Path;
use std::sync::mpsc::{self, Sender};

use tracing::{debug, error, info, warn};

use crate::config::InstallerConfig;
use crate::installer::CommandRunner;

/// Messages sent from installation thread to UI thread
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallMessage {
    /// About to launch the installer through this program
    Launching(String),
    /// An elevation helper was not found; the next one will be tried
    LauncherMissing(String),
    /// The next launcher prompts on the controlling terminal; nothing runs
    /// until the UI has given the terminal up and released the handoff
    TerminalHandoff(TerminalHandoff),
    /// One line of merged installer output
    Line(String),
    /// Installation ended; always the last message
    Finished(InstallOutcome),
}

/// Pending request for the terminal, held by the UI until it has stepped aside
#[derive(Debug, Clone)]
pub struct TerminalHandoff {
    pub elevator: String,
    ready: Sender<()>,
}

impl TerminalHandoff {
    /// Let the launcher start. Dropping the handoff unreleased has the same
    /// effect, so a UI that goes away never stalls the installation.
    pub fn release(self) {
        let _ = self.ready.send(());
    }
}

impl PartialEq for TerminalHandoff {
    fn eq(&self, other: &Self) -> bool {
        self.elevator == other.elevator
    }
}

impl Eq for TerminalHandoff {}

/// Final result of an installation attempt
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InstallOutcome {
    Success,
    /// Exit code, `None` if terminated by a signal
    Failed { code: Option<i32> },
    /// None of the elevation helpers could be found
    NoElevator { tried: Vec<String> },
    /// The installer could not be run or its output could not be read
    Error(String),
}

impl InstallOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, InstallOutcome::Success)
    }

    pub fn from_exit_code(code: Option<i32>) -> Self {
        match code {
            Some(0) => InstallOutcome::Success,
            code => InstallOutcome::Failed { code },
        }
    }

    /// One-line description for alerts and the log
    pub fn summary(&self) -> String {
        match self {
            InstallOutcome::Success => "Package installed successfully".to_string(),
            InstallOutcome::Failed { code: Some(code) } => {
                format!("Installation failed (exit code {code}). See the output log for details.")
            }
            InstallOutcome::Failed { code: None } => {
                "Installation was terminated by a signal. See the output log for details."
                    .to_string()
            }
            InstallOutcome::NoElevator { tried } => format!(
                "No privilege elevation tool found (tried: {})",
                tried.join(", ")
            ),
            InstallOutcome::Error(message) => format!("Installation error: {message}"),
        }
    }
}

/// What to run for one installation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InstallPlan {
    /// Elevation helpers in order of preference; empty when already root
    pub elevators: Vec<String>,
    pub package_manager: String,
    /// Package manager arguments, ending with the archive path
    pub args: Vec<OsString>,
    /// Elevators that need the terminal handed over before they run
    pub terminal_elevators: Vec<String>,
}

impl InstallPlan {
    pub fn new(config: &InstallerConfig, archive: &Path, as_root: bool) -> Self {
        let mut args: Vec<OsString> = config.install_args.iter().map(OsString::from).collect();
        args.push(archive.as_os_str().to_owned());

        Self {
            elevators: if as_root {
                Vec::new()
            } else {
                config.elevators.clone()
            },
            package_manager: config.package_manager.clone(),
            args,
            terminal_elevators: Vec::new(),
        }
    }

    /// Ask for the terminal before launching any of `elevators`
    pub fn with_terminal_handoff(mut self, elevators: &[String]) -> Self {
        self.terminal_elevators = elevators.to_vec();
        self
    }

    /// Human-readable command line for the log
    pub fn display_command(&self, launcher: Option<&str>) -> String {
        let mut parts: Vec<String> = launcher.map(str::to_string).into_iter().collect();
        parts.push(self.package_manager.clone());
        parts.extend(self.args.iter().map(|a| a.to_string_lossy().into_owned()));
        parts.join(" ")
    }
}

/// Run the installation, reporting progress on `tx`.
///
/// Always sends exactly one [`InstallMessage::Finished`], as the last message,
/// and returns the same outcome. Send errors are ignored: a closed receiver
/// only means nobody is watching any more.
pub fn run_installation(
    runner: &dyn CommandRunner,
    plan: &InstallPlan,
    tx: &Sender<InstallMessage>,
) -> InstallOutcome {
    let outcome = if plan.elevators.is_empty() {
        run_direct(runner, plan, tx)
    } else {
        run_elevated(runner, plan, tx)
    };

    if outcome.is_success() {
        info!("installation succeeded");
    } else {
        warn!(outcome = ?outcome, "installation did not succeed");
    }
    let _ = tx.send(InstallMessage::Finished(outcome.clone()));
    outcome
}

fn run_direct(
    runner: &dyn CommandRunner,
    plan: &InstallPlan,
    tx: &Sender<InstallMessage>,
) -> InstallOutcome {
    let args: Vec<&OsStr> = plan.args.iter().map(OsString::as_os_str).collect();

    info!(command = %plan.display_command(None), "running installer as root");
    let _ = tx.send(InstallMessage::Launching(plan.package_manager.clone()));

    match stream_to(runner, &plan.package_manager, &args, tx) {
        Ok(code) => InstallOutcome::from_exit_code(code),
        Err(e) => {
            error!(error = %e, "failed to run package manager");
            InstallOutcome::Error(format!("{}: {e}", plan.package_manager))
        }
    }
}

fn run_elevated(
    runner: &dyn CommandRunner,
    plan: &InstallPlan,
    tx: &Sender<InstallMessage>,
) -> InstallOutcome {
    let mut args: Vec<&OsStr> = vec![OsStr::new(&plan.package_manager)];
    args.extend(plan.args.iter().map(OsString::as_os_str));

    for elevator in &plan.elevators {
        info!(command = %plan.display_command(Some(elevator)), "launching installer");
        let _ = tx.send(InstallMessage::Launching(elevator.clone()));
        if plan.terminal_elevators.contains(elevator) {
            hand_off_terminal(elevator, tx);
        }

        match stream_to(runner, elevator, &args, tx) {
            Ok(code) => return InstallOutcome::from_exit_code(code),
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                warn!(elevator = %elevator, "elevation helper not found");
                let _ = tx.send(InstallMessage::LauncherMissing(elevator.clone()));
            }
            Err(e) => {
                error!(elevator = %elevator, error = %e, "failed to run installer");
                return InstallOutcome::Error(format!("{elevator}: {e}"));
            }
        }
    }

    InstallOutcome::NoElevator {
        tried: plan.elevators.clone(),
    }
}

/// Block until the UI has released the terminal for `elevator`
fn hand_off_terminal(elevator: &str, tx: &Sender<InstallMessage>) {
    let (ready, wait) = mpsc::channel();
    let handoff = TerminalHandoff {
        elevator: elevator.to_string(),
        ready,
    };
    if tx.send(InstallMessage::TerminalHandoff(handoff)).is_ok() {
        debug!(elevator = %elevator, "waiting for the terminal");
        // Err means the handoff was dropped, which also frees us to go on.
        let _ = wait.recv();
    }
}

fn stream_to(
    runner: &dyn CommandRunner,
    program: &str,
    args: &[&OsStr],
    tx: &Sender<InstallMessage>,
) -> io::Result<Option<i32>> {
    runner.stream(program, args, &mut |line: String| {
        let _ = tx.send(InstallMessage::Line(line));
    })
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;
    use std::sync::mpsc;

    use super::*;
    use crate::installer::testing::FakeRunner;

    fn plan(as_root: bool) -> InstallPlan {
        InstallPlan::new(
            &InstallerConfig::default(),
            &PathBuf::from("/tmp/demo-1.0-1-any.pkg.tar.zst"),
            as_root,
        )
    }

    fn run(runner: &FakeRunner, plan: &InstallPlan) -> (InstallOutcome, Vec<InstallMessage>) {
        let (tx, rx) = mpsc::channel();
        let outcome = run_installation(runner, plan, &tx);
        drop(tx);
        (outcome, rx.iter().collect())
    }

    #[test]
    fn plan_builds_pacman_command_line() {
        let plan = plan(false);
        assert_eq!(plan.elevators, vec!["pkexec", "sudo"]);
        assert_eq!(
            plan.display_command(Some("pkexec")),
            "pkexec pacman -U --needed --noconfirm /tmp/demo-1.0-1-any.pkg.tar.zst"
        );
        assert!(self::plan(true).elevators.is_empty());
    }

    #[test]
    fn streams_lines_in_order_then_finishes() {
        let runner = FakeRunner::new().streamed(&["A", "B"], Some(0));
        let (outcome, messages) = run(&runner, &plan(false));

        assert_eq!(outcome, InstallOutcome::Success);
        assert_eq!(
            messages,
            vec![
                InstallMessage::Launching("pkexec".into()),
                InstallMessage::Line("A".into()),
                InstallMessage::Line("B".into()),
                InstallMessage::Finished(InstallOutcome::Success),
            ]
        );
    }

    #[test]
    fn non_zero_exit_is_failure_despite_output() {
        let runner = FakeRunner::new().streamed(&["looks fine"], Some(1));
        let (outcome, messages) = run(&runner, &plan(false));

        assert_eq!(outcome, InstallOutcome::Failed { code: Some(1) });
        assert_eq!(
            messages.last(),
            Some(&InstallMessage::Finished(InstallOutcome::Failed { code: Some(1) }))
        );
    }

    #[test]
    fn falls_back_to_secondary_elevator() {
        let runner = FakeRunner::new().missing("pkexec").streamed(&["ok"], Some(0));
        let (outcome, messages) = run(&runner, &plan(false));

        assert_eq!(outcome, InstallOutcome::Success);
        let calls = runner.calls();
        assert_eq!(calls.len(), 2);
        assert!(calls[0].starts_with("pkexec pacman -U"));
        assert!(calls[1].starts_with("sudo pacman -U"));
        assert!(messages.contains(&InstallMessage::LauncherMissing("pkexec".into())));
    }

    #[test]
    fn terminal_elevator_waits_for_release() {
        let runner = FakeRunner::new().missing("pkexec").streamed(&["ok"], Some(0));
        let plan = plan(false).with_terminal_handoff(&["sudo".to_string()]);
        let (tx, rx) = mpsc::channel();

        std::thread::scope(|s| {
            let worker = s.spawn(|| run_installation(&runner, &plan, &tx));

            let handoff = loop {
                match rx.recv_timeout(std::time::Duration::from_secs(5)).unwrap() {
                    InstallMessage::TerminalHandoff(handoff) => break handoff,
                    InstallMessage::Finished(outcome) => panic!("finished early: {outcome:?}"),
                    _ => {}
                }
            };
            assert_eq!(handoff.elevator, "sudo");
            // Only the missing pkexec has been tried; sudo waits for the terminal.
            assert_eq!(runner.calls().len(), 1);

            handoff.release();
            assert_eq!(worker.join().unwrap(), InstallOutcome::Success);
        });

        let calls = runner.calls();
        assert!(calls[1].starts_with("sudo pacman -U"));
        let rest: Vec<InstallMessage> = rx.try_iter().collect();
        assert_eq!(rest.first(), Some(&InstallMessage::Line("ok".into())));
    }

    #[test]
    fn dropped_handoff_does_not_stall() {
        let runner = FakeRunner::new();
        let plan = plan(false).with_terminal_handoff(&["pkexec".to_string()]);
        let (tx, rx) = mpsc::channel();

        std::thread::scope(|s| {
            let worker = s.spawn(|| run_installation(&runner, &plan, &tx));
            for msg in rx.iter() {
                // Dropping the handoff here releases the installer too.
                if matches!(msg, InstallMessage::Finished(_)) {
                    break;
                }
            }
            assert!(worker.join().unwrap().is_success());
        });
    }

    #[test]
    fn all_elevators_missing() {
        let runner = FakeRunner::new().missing("pkexec").missing("sudo");
        let (outcome, _) = run(&runner, &plan(false));

        assert_eq!(
            outcome,
            InstallOutcome::NoElevator {
                tried: vec!["pkexec".into(), "sudo".into()]
            }
        );
    }

    #[test]
    fn root_runs_package_manager_directly() {
        let runner = FakeRunner::new();
        let (outcome, _) = run(&runner, &plan(true));

        assert!(outcome.is_success());
        assert_eq!(
            runner.calls(),
            vec!["pacman -U --needed --noconfirm /tmp/demo-1.0-1-any.pkg.tar.zst"]
        );
    }

    #[test]
    fn signal_exit_is_failure() {
        assert_eq!(
            InstallOutcome::from_exit_code(None),
            InstallOutcome::Failed { code: None }
        );
        assert!(!InstallOutcome::from_exit_code(Some(1)).is_success());
    }
}

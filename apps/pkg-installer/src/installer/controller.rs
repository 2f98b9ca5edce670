//! Selection and installation state machine.
//!
//! ```text
//! Idle --select--> Selected --install--> Installing --finish--> Selected
//! ```
//!
//! The controller knows nothing about the display. Installation runs on a
//! background thread and reports through an mpsc channel that the caller
//! drains on its own thread.

use std::path::PathBuf;
use std::sync::mpsc::{self, Receiver};
use std::sync::Arc;
use std::thread;

use tracing::{debug, info};

use crate::config::InstallerConfig;
use crate::installer::error::{InstallError, SelectionError};
use crate::installer::executor::{self, InstallMessage, InstallOutcome, InstallPlan};
use crate::installer::metadata::query_package_info;
use crate::installer::package::PackageRef;
use crate::installer::{is_root, CommandRunner};

/// Current session state
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum InstallerState {
    /// Nothing selected; install disabled
    #[default]
    Idle,
    /// A package is selected and its metadata loaded; install enabled
    Selected {
        package: PackageRef,
        metadata: String,
    },
    /// Installation in flight; install and selection disabled
    Installing {
        package: PackageRef,
        metadata: String,
    },
}

impl InstallerState {
    pub fn package(&self) -> Option<&PackageRef> {
        match self {
            InstallerState::Idle => None,
            InstallerState::Selected { package, .. } | InstallerState::Installing { package, .. } => {
                Some(package)
            }
        }
    }

    pub fn metadata(&self) -> Option<&str> {
        match self {
            InstallerState::Idle => None,
            InstallerState::Selected { metadata, .. }
            | InstallerState::Installing { metadata, .. } => Some(metadata),
        }
    }

    pub fn can_install(&self) -> bool {
        matches!(self, InstallerState::Selected { .. })
    }

    pub fn is_installing(&self) -> bool {
        matches!(self, InstallerState::Installing { .. })
    }

    pub fn name(&self) -> &'static str {
        match self {
            InstallerState::Idle => "Idle",
            InstallerState::Selected { .. } => "Ready",
            InstallerState::Installing { .. } => "Installing",
        }
    }
}

pub struct InstallerController {
    runner: Arc<dyn CommandRunner>,
    config: InstallerConfig,
    as_root: bool,
    /// Step the UI aside for elevators that prompt on the terminal
    terminal_handoff: bool,
    state: InstallerState,
}

impl InstallerController {
    pub fn new(runner: Arc<dyn CommandRunner>, config: InstallerConfig) -> Self {
        Self {
            runner,
            config,
            as_root: is_root(),
            terminal_handoff: false,
            state: InstallerState::Idle,
        }
    }

    /// Override root detection; when root, no elevation helper is used
    pub fn running_as_root(mut self, as_root: bool) -> Self {
        self.as_root = as_root;
        self
    }

    /// Request the terminal (see [`InstallMessage::TerminalHandoff`]) before
    /// launching any of the configured `terminal_elevators`. Only a caller that
    /// owns the terminal, such as the TUI, needs this.
    pub fn hand_off_terminal(mut self, enabled: bool) -> Self {
        self.terminal_handoff = enabled;
        self
    }

    pub fn state(&self) -> &InstallerState {
        &self.state
    }

    pub fn config(&self) -> &InstallerConfig {
        &self.config
    }

    /// Make `path` the active package and load its metadata.
    ///
    /// On error the previous state is kept as is.
    pub fn select(&mut self, path: impl Into<PathBuf>) -> Result<&PackageRef, SelectionError> {
        if self.state.is_installing() {
            return Err(SelectionError::Busy);
        }

        let package = PackageRef::new(path, &self.config.archive_suffixes)?;
        info!(path = %package.path().display(), "package selected");

        let metadata = query_package_info(self.runner.as_ref(), &self.config.query_tool, &package);
        self.state = InstallerState::Selected { package, metadata };

        // Just assigned above.
        self.state.package().ok_or(SelectionError::NoSelection)
    }

    /// Query the active package's metadata again
    pub fn fetch_metadata(&self) -> Result<String, SelectionError> {
        let package = self.state.package().ok_or(SelectionError::NoSelection)?;
        Ok(query_package_info(
            self.runner.as_ref(),
            &self.config.query_tool,
            package,
        ))
    }

    /// Re-run the metadata query and store the result
    pub fn refresh_metadata(&mut self) -> Result<(), SelectionError> {
        let fresh = self.fetch_metadata()?;
        if let InstallerState::Selected { metadata, .. }
        | InstallerState::Installing { metadata, .. } = &mut self.state
        {
            *metadata = fresh;
        }
        Ok(())
    }

    /// Fail-fast checks that must pass before asking for confirmation
    pub fn ensure_ready(&self) -> Result<&PackageRef, InstallError> {
        match &self.state {
            InstallerState::Idle => Err(SelectionError::NoSelection.into()),
            InstallerState::Installing { .. } => Err(InstallError::Busy),
            InstallerState::Selected { package, .. } => {
                package.ensure_present()?;
                Ok(package)
            }
        }
    }

    /// Start installing the active package on a background thread.
    ///
    /// Nothing is launched unless the package is ready and `confirmed` is
    /// set. The returned receiver yields output in arrival order and ends
    /// with [`InstallMessage::Finished`]; pass that outcome to
    /// [`InstallerController::finish_install`].
    pub fn install(&mut self, confirmed: bool) -> Result<Receiver<InstallMessage>, InstallError> {
        let package = self.ensure_ready()?.clone();
        if !confirmed {
            return Err(InstallError::NotConfirmed);
        }

        let mut plan = InstallPlan::new(&self.config, package.path(), self.as_root);
        if self.terminal_handoff {
            plan = plan.with_terminal_handoff(&self.config.terminal_elevators);
        }
        let (tx, rx) = mpsc::channel();
        let runner = Arc::clone(&self.runner);

        thread::Builder::new()
            .name("pkg-install".to_string())
            .spawn(move || executor::run_installation(runner.as_ref(), &plan, &tx))
            .map_err(|e| InstallError::Thread(e.to_string()))?;

        let metadata = self.state.metadata().unwrap_or_default().to_string();
        info!(package = %package.file_name(), "installation started");
        self.state = InstallerState::Installing { package, metadata };

        Ok(rx)
    }

    /// Return to `Selected` once the background work has ended
    pub fn finish_install(&mut self, outcome: &InstallOutcome) {
        let state = std::mem::take(&mut self.state);
        self.state = match state {
            InstallerState::Installing { package, metadata } => {
                debug!(outcome = ?outcome, "installation finished");
                InstallerState::Selected { package, metadata }
            }
            other => other,
        };
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::time::Duration;

    use super::*;
    use crate::installer::testing::FakeRunner;

    fn archive(dir: &Path, name: &str) -> PathBuf {
        let path = dir.join(name);
        std::fs::write(&path, b"archive").unwrap();
        path
    }

    fn controller(runner: FakeRunner) -> (InstallerController, Arc<FakeRunner>) {
        let runner = Arc::new(runner);
        let controller = InstallerController::new(runner.clone(), InstallerConfig::default())
            .running_as_root(false);
        (controller, runner)
    }

    fn drain(rx: Receiver<InstallMessage>) -> Vec<InstallMessage> {
        let mut messages = Vec::new();
        while let Ok(msg) = rx.recv_timeout(Duration::from_secs(5)) {
            let done = matches!(msg, InstallMessage::Finished(_));
            messages.push(msg);
            if done {
                break;
            }
        }
        messages
    }

    fn outcome(messages: &[InstallMessage]) -> Option<&InstallOutcome> {
        match messages.last() {
            Some(InstallMessage::Finished(outcome)) => Some(outcome),
            _ => None,
        }
    }

    #[test]
    fn valid_selection_enables_install() {
        let tmp = tempfile::tempdir().unwrap();
        let file = archive(tmp.path(), "demo-1.0-1-any.pkg.tar.zst");
        let (mut controller, _) = controller(FakeRunner::new().captured(Some(0), "Name : demo\n", ""));

        assert!(!controller.state().can_install());
        controller.select(&file).unwrap();

        assert!(controller.state().can_install());
        assert_eq!(controller.state().metadata(), Some("Name : demo\n"));
        assert_eq!(controller.state().package().unwrap().path(), file);
    }

    #[test]
    fn invalid_selection_keeps_previous_state() {
        let tmp = tempfile::tempdir().unwrap();
        let good = archive(tmp.path(), "demo-1.0-1-any.pkg.tar.zst");
        let bad = archive(tmp.path(), "demo.zip");
        let (mut controller, _) = controller(FakeRunner::new());

        assert!(matches!(
            controller.select(&bad),
            Err(SelectionError::UnsupportedType { .. })
        ));
        assert_eq!(controller.state(), &InstallerState::Idle);

        controller.select(&good).unwrap();
        let before = controller.state().clone();
        assert!(controller.select(tmp.path().join("missing.pkg.tar.zst")).is_err());
        assert!(controller.select(&bad).is_err());
        assert_eq!(controller.state(), &before);
    }

    #[test]
    fn metadata_error_text() {
        let tmp = tempfile::tempdir().unwrap();
        let file = archive(tmp.path(), "demo-1.0-1-any.pkg.tar.zst");
        let (mut controller, _) = controller(FakeRunner::new().captured(Some(1), "", "X"));

        controller.select(&file).unwrap();
        assert_eq!(
            controller.fetch_metadata().unwrap(),
            "Error reading package info:\nX"
        );
    }

    #[test]
    fn install_without_selection_launches_nothing() {
        let (mut controller, runner) = controller(FakeRunner::new());

        assert_eq!(
            controller.install(true).unwrap_err(),
            InstallError::Selection(SelectionError::NoSelection)
        );
        assert!(runner.calls().is_empty());
        assert_eq!(controller.state(), &InstallerState::Idle);
    }

    #[test]
    fn install_requires_confirmation_and_present_file() {
        let tmp = tempfile::tempdir().unwrap();
        let file = archive(tmp.path(), "demo-1.0-1-any.pkg.tar.zst");
        let (mut controller, runner) = controller(FakeRunner::new());
        controller.select(&file).unwrap();
        let calls_after_select = runner.calls().len();

        assert_eq!(controller.install(false).unwrap_err(), InstallError::NotConfirmed);

        std::fs::remove_file(&file).unwrap();
        assert_eq!(
            controller.install(true).unwrap_err(),
            InstallError::Selection(SelectionError::NotFound(file))
        );
        assert_eq!(runner.calls().len(), calls_after_select);
        assert!(controller.state().can_install());
    }

    #[test]
    fn install_streams_output_and_returns_to_selected() {
        let tmp = tempfile::tempdir().unwrap();
        let file = archive(tmp.path(), "demo-1.0-1-any.pkg.tar.zst");
        let (mut controller, _) = controller(FakeRunner::new().streamed(&["A", "B"], Some(0)));
        controller.select(&file).unwrap();

        let rx = controller.install(true).unwrap();
        assert!(controller.state().is_installing());
        assert_eq!(controller.install(true).unwrap_err(), InstallError::Busy);
        assert_eq!(controller.select(&file).unwrap_err(), SelectionError::Busy);

        let messages = drain(rx);
        let lines: Vec<&str> = messages
            .iter()
            .filter_map(|m| match m {
                InstallMessage::Line(line) => Some(line.as_str()),
                _ => None,
            })
            .collect();
        assert_eq!(lines, vec!["A", "B"]);

        let outcome = outcome(&messages).unwrap().clone();
        assert_eq!(outcome, InstallOutcome::Success);
        controller.finish_install(&outcome);
        assert!(controller.state().can_install());
    }

    #[test]
    fn failed_install_still_reenables() {
        let tmp = tempfile::tempdir().unwrap();
        let file = archive(tmp.path(), "demo-1.0-1-any.pkg.tar.zst");
        let (mut controller, _) = controller(FakeRunner::new().streamed(&["error: conflict"], Some(1)));
        controller.select(&file).unwrap();

        let messages = drain(controller.install(true).unwrap());
        let outcome = outcome(&messages).unwrap().clone();
        assert_eq!(outcome, InstallOutcome::Failed { code: Some(1) });

        controller.finish_install(&outcome);
        assert!(controller.state().can_install());
    }

    #[test]
    fn missing_primary_elevator_tries_secondary() {
        let tmp = tempfile::tempdir().unwrap();
        let file = archive(tmp.path(), "demo-1.0-1-any.pkg.tar.zst");
        let (mut controller, runner) = controller(FakeRunner::new().missing("pkexec"));
        controller.select(&file).unwrap();

        let messages = drain(controller.install(true).unwrap());
        assert_eq!(outcome(&messages), Some(&InstallOutcome::Success));

        let launches: Vec<String> = runner
            .calls()
            .into_iter()
            .filter(|c| !c.starts_with("pacman -Qip"))
            .collect();
        assert_eq!(launches.len(), 2);
        assert!(launches[0].starts_with("pkexec "));
        assert!(launches[1].starts_with("sudo "));
    }

    #[test]
    fn terminal_handoff_only_when_enabled() {
        let tmp = tempfile::tempdir().unwrap();
        let file = archive(tmp.path(), "demo-1.0-1-any.pkg.tar.zst");

        let (plain, _) = controller(FakeRunner::new().missing("pkexec"));
        let mut tui = plain.hand_off_terminal(true);
        tui.select(&file).unwrap();
        let rx = tui.install(true).unwrap();
        let handoff = loop {
            match rx.recv_timeout(Duration::from_secs(5)).unwrap() {
                InstallMessage::TerminalHandoff(handoff) => break handoff,
                InstallMessage::Finished(outcome) => panic!("no handoff before {outcome:?}"),
                _ => {}
            }
        };
        assert_eq!(handoff.elevator, "sudo");
        handoff.release();
        assert_eq!(outcome(&drain(rx)), Some(&InstallOutcome::Success));

        let (mut cli, _) = controller(FakeRunner::new().missing("pkexec"));
        cli.select(&file).unwrap();
        let messages = drain(cli.install(true).unwrap());
        assert!(!messages
            .iter()
            .any(|m| matches!(m, InstallMessage::TerminalHandoff(_))));
    }
}

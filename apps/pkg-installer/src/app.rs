//! Application state for the package installer UI.

use std::path::PathBuf;
use std::sync::mpsc::{Receiver, TryRecvError};

use tracing::{info, warn};

use crate::installer::controller::{InstallerController, InstallerState};
use crate::installer::error::SelectionError;
use crate::installer::executor::{InstallMessage, InstallOutcome, TerminalHandoff};
use crate::picker::FilePicker;

/// Status of a check
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Status {
    Success,
    Warning,
}

impl Status {
    pub fn symbol(&self) -> &'static str {
        match self {
            Status::Success => "✓",
            Status::Warning => "⚠",
        }
    }
}

/// A check item with status
#[derive(Debug, Clone)]
pub struct CheckItem {
    pub name: String,
    pub description: String,
    pub status: Status,
    pub message: Option<String>,
}

impl CheckItem {
    pub fn new(name: impl Into<String>, description: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            status: Status::Success,
            message: None,
        }
    }

    pub fn with_status(mut self, status: Status) -> Self {
        self.status = status;
        self
    }

    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

/// Log entry level
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Success,
    Warning,
    Error,
    /// Raw installer output
    Output,
}

/// Log entry
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub timestamp: chrono::DateTime<chrono::Local>,
    pub level: LogLevel,
    pub message: String,
}

impl LogEntry {
    pub fn new(level: LogLevel, message: impl Into<String>) -> Self {
        Self {
            timestamp: chrono::Local::now(),
            level,
            message: message.into(),
        }
    }

    pub fn info(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Info, message)
    }

    pub fn success(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Success, message)
    }

    pub fn warning(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Warning, message)
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Error, message)
    }

    pub fn output(message: impl Into<String>) -> Self {
        Self::new(LogLevel::Output, message)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlertKind {
    Info,
    Success,
    Error,
}

/// Modal message; swallows input until dismissed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Alert {
    pub kind: AlertKind,
    pub title: String,
    pub message: String,
}

impl Alert {
    pub fn new(kind: AlertKind, title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            kind,
            title: title.into(),
            message: message.into(),
        }
    }
}

/// Application state
pub struct App {
    pub controller: InstallerController,
    /// Log entries
    pub logs: Vec<LogEntry>,
    /// Scroll offset for log viewer
    pub log_scroll: usize,
    /// Keep the log pinned to the newest entry
    pub follow_logs: bool,
    /// Scroll offset for the package info panel
    pub info_scroll: u16,
    /// Open file picker, if any
    pub picker: Option<FilePicker>,
    /// Install confirmation prompt visible
    pub confirming: bool,
    pub alert: Option<Alert>,
    /// Should quit
    pub should_quit: bool,
    /// Spinner frame
    pub spinner_frame: usize,
    /// Installation message receiver (from background thread)
    pub install_rx: Option<Receiver<InstallMessage>>,
    /// Terminal requested by the installer, not yet handed over
    pub pending_handoff: Option<TerminalHandoff>,
    /// The terminal belongs to an elevation prompt until the install ends
    pub terminal_suspended: bool,
}

impl App {
    pub fn new(controller: InstallerController) -> Self {
        Self {
            controller,
            logs: Vec::new(),
            log_scroll: 0,
            follow_logs: true,
            info_scroll: 0,
            picker: None,
            confirming: false,
            alert: None,
            should_quit: false,
            spinner_frame: 0,
            install_rx: None,
            pending_handoff: None,
            terminal_suspended: false,
        }
    }

    pub fn state(&self) -> &InstallerState {
        self.controller.state()
    }

    /// Add a log entry
    pub fn log(&mut self, entry: LogEntry) {
        self.logs.push(entry);
        if self.follow_logs {
            self.log_scroll = self.logs.len().saturating_sub(1);
        }
    }

    /// Installer output only, one line per entry
    #[cfg(test)]
    pub fn output_text(&self) -> String {
        self.logs
            .iter()
            .filter(|e| e.level == LogLevel::Output)
            .map(|e| format!("{}\n", e.message))
            .collect()
    }

    pub fn show_alert(&mut self, alert: Alert) {
        self.alert = Some(alert);
    }

    pub fn dismiss_alert(&mut self) {
        self.alert = None;
    }

    /// Select a package; invalid choices raise an alert and change nothing
    pub fn select_package(&mut self, path: impl Into<PathBuf>) -> bool {
        let path = path.into();
        match self.controller.select(&path) {
            Ok(package) => {
                let message = format!("Selected {}", package.path().display());
                self.picker = None;
                self.info_scroll = 0;
                self.log(LogEntry::info(message));
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "invalid selection");
                self.show_alert(Alert::new(AlertKind::Error, "Invalid selection", e.to_string()));
                false
            }
        }
    }

    /// Re-run the metadata query for the selected package
    pub fn refresh_metadata(&mut self) {
        match self.controller.refresh_metadata() {
            Ok(()) => self.log(LogEntry::info("Package info refreshed")),
            Err(e) => self.show_alert(Alert::new(AlertKind::Error, "Cannot refresh", e.to_string())),
        }
    }

    /// Record startup check results in the log
    pub fn log_checks(&mut self, checks: &[CheckItem]) {
        for check in checks {
            let text = match &check.message {
                Some(message) => format!("{} {}: {}", check.status.symbol(), check.name, message),
                None => format!("{} {}: {}", check.status.symbol(), check.name, check.description),
            };
            let entry = match check.status {
                Status::Success => LogEntry::info(text),
                Status::Warning => LogEntry::warning(text),
            };
            self.log(entry);
        }
    }

    pub fn open_picker(&mut self) {
        if self.state().is_installing() {
            self.show_alert(Alert::new(
                AlertKind::Info,
                "Installation running",
                SelectionError::Busy.to_string(),
            ));
            return;
        }

        let start = self
            .state()
            .package()
            .and_then(|p| p.directory())
            .map(PathBuf::from)
            .or_else(|| std::env::current_dir().ok())
            .unwrap_or_else(|| PathBuf::from("/"));
        self.picker = Some(FilePicker::open(
            start,
            self.controller.config().archive_suffixes.clone(),
        ));
    }

    pub fn close_picker(&mut self) {
        self.picker = None;
    }

    /// Enter on the picker: descend into a directory or select a package
    pub fn picker_activate(&mut self) {
        let chosen = self.picker.as_mut().and_then(FilePicker::activate);
        if let Some(path) = chosen {
            self.select_package(path);
        }
    }

    /// Ask for confirmation, unless a fail-fast check already rules it out
    pub fn request_install(&mut self) {
        match self.controller.ensure_ready() {
            Ok(_) => self.confirming = true,
            Err(e) => self.show_alert(Alert::new(AlertKind::Error, "Cannot install", e.to_string())),
        }
    }

    pub fn cancel_install(&mut self) {
        self.confirming = false;
    }

    /// User confirmed the prompt
    pub fn confirm_install(&mut self) {
        self.confirming = false;
        match self.controller.install(true) {
            Ok(rx) => {
                let name = self
                    .state()
                    .package()
                    .map(|p| p.file_name())
                    .unwrap_or_default();
                self.follow_logs = true;
                self.log(LogEntry::info(format!("Installing {name}...")));
                self.install_rx = Some(rx);
            }
            Err(e) => self.show_alert(Alert::new(AlertKind::Error, "Cannot install", e.to_string())),
        }
    }

    /// Drain pending messages from the installation thread.
    ///
    /// Called from the UI loop each tick, so the log is only ever touched on
    /// the UI thread.
    pub fn poll_install(&mut self) {
        let Some(rx) = self.install_rx.take() else {
            return;
        };

        loop {
            match rx.try_recv() {
                Ok(InstallMessage::Finished(outcome)) => {
                    self.finish_install(outcome);
                    return;
                }
                Ok(msg) => {
                    self.handle_install_message(msg);
                    // Nothing more arrives until the handoff is released.
                    if self.pending_handoff.is_some() {
                        break;
                    }
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    self.finish_install(InstallOutcome::Error(
                        "installer thread exited unexpectedly".to_string(),
                    ));
                    return;
                }
            }
        }

        self.install_rx = Some(rx);
    }

    fn handle_install_message(&mut self, msg: InstallMessage) {
        match msg {
            InstallMessage::Launching(program) => {
                self.log(LogEntry::info(format!("Launching installer via {program}")));
            }
            InstallMessage::LauncherMissing(program) => {
                self.log(LogEntry::warning(format!("{program} not found, trying next")));
            }
            InstallMessage::TerminalHandoff(handoff) => {
                self.log(LogEntry::info(format!(
                    "{} asks for credentials on the terminal",
                    handoff.elevator
                )));
                self.pending_handoff = Some(handoff);
            }
            InstallMessage::Line(line) => self.log(LogEntry::output(line)),
            InstallMessage::Finished(outcome) => self.finish_install(outcome),
        }
    }

    fn finish_install(&mut self, outcome: InstallOutcome) {
        self.controller.finish_install(&outcome);
        self.install_rx = None;

        let summary = outcome.summary();
        if outcome.is_success() {
            info!("install finished: {summary}");
            self.log(LogEntry::success(summary.clone()));
            self.show_alert(Alert::new(AlertKind::Success, "Installation complete", summary));
        } else {
            warn!("install finished: {summary}");
            self.log(LogEntry::error(summary.clone()));
            self.show_alert(Alert::new(AlertKind::Error, "Installation failed", summary));
        }
    }

    /// Take the installer's request for the terminal.
    ///
    /// The caller must leave the alternate screen and stop reading input
    /// before calling [`TerminalHandoff::release`].
    pub fn take_handoff(&mut self) -> Option<TerminalHandoff> {
        let handoff = self.pending_handoff.take()?;
        self.terminal_suspended = true;
        Some(handoff)
    }

    /// The terminal was handed off and the installation is over
    pub fn should_resume_terminal(&self) -> bool {
        self.terminal_suspended && !self.state().is_installing()
    }

    pub fn resume_terminal(&mut self) {
        self.terminal_suspended = false;
    }

    /// Quit, unless an installation is still running
    pub fn request_quit(&mut self) {
        if self.state().is_installing() {
            self.show_alert(Alert::new(
                AlertKind::Info,
                "Installation running",
                "Please wait for the installation to finish before quitting.",
            ));
        } else {
            self.should_quit = true;
        }
    }

    pub fn scroll_log_up(&mut self) {
        self.follow_logs = false;
        self.log_scroll = self.log_scroll.saturating_sub(1);
    }

    pub fn scroll_log_down(&mut self) {
        let last = self.logs.len().saturating_sub(1);
        if self.log_scroll < last {
            self.log_scroll += 1;
        }
        self.follow_logs = self.log_scroll >= last;
    }

    pub fn scroll_info_up(&mut self) {
        self.info_scroll = self.info_scroll.saturating_sub(5);
    }

    pub fn scroll_info_down(&mut self) {
        let lines = self.state().metadata().map(|m| m.lines().count()).unwrap_or(0);
        let max = u16::try_from(lines.saturating_sub(1)).unwrap_or(u16::MAX);
        self.info_scroll = self.info_scroll.saturating_add(5).min(max);
    }

    /// Update spinner frame
    pub fn tick_spinner(&mut self) {
        self.spinner_frame = (self.spinner_frame + 1) % crate::theme::symbols::SPINNER.len();
    }

    /// Get current spinner character
    pub fn spinner(&self) -> &'static str {
        crate::theme::symbols::SPINNER[self.spinner_frame]
    }
}

#[cfg(test)]
mod tests {
    use std::path::Path;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use super::*;
    use crate::config::InstallerConfig;
    use crate::installer::testing::FakeRunner;

    fn app(runner: FakeRunner) -> App {
        let controller = InstallerController::new(Arc::new(runner), InstallerConfig::default())
            .running_as_root(false);
        App::new(controller)
    }

    fn archive(dir: &Path) -> PathBuf {
        let path = dir.join("demo-1.0-1-any.pkg.tar.zst");
        std::fs::write(&path, b"archive").unwrap();
        path
    }

    fn wait_for_install(app: &mut App) {
        let deadline = Instant::now() + Duration::from_secs(5);
        while app.install_rx.is_some() && Instant::now() < deadline {
            app.poll_install();
            std::thread::sleep(Duration::from_millis(5));
        }
        assert!(app.install_rx.is_none(), "installation did not finish");
    }

    #[test]
    fn successful_install_logs_output_in_order() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(FakeRunner::new().streamed(&["A", "B"], Some(0)));
        assert!(app.select_package(archive(tmp.path())));

        app.request_install();
        assert!(app.confirming);
        app.confirm_install();
        assert!(app.state().is_installing());

        wait_for_install(&mut app);

        assert_eq!(app.output_text(), "A\nB\n");
        assert!(app.state().can_install());
        assert_eq!(app.alert.as_ref().map(|a| a.kind), Some(AlertKind::Success));
    }

    #[test]
    fn failed_install_raises_error_alert_and_keeps_output() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(FakeRunner::new().streamed(&["error: target not found"], Some(1)));
        app.select_package(archive(tmp.path()));
        app.confirm_install();

        wait_for_install(&mut app);

        let alert = app.alert.clone().unwrap();
        assert_eq!(alert.kind, AlertKind::Error);
        assert!(alert.message.contains("exit code 1"));
        assert_eq!(app.output_text(), "error: target not found\n");
        assert!(app.state().can_install());
    }

    #[test]
    fn install_without_selection_alerts() {
        let mut app = app(FakeRunner::new());

        app.request_install();
        assert!(!app.confirming);
        assert_eq!(app.alert.as_ref().map(|a| a.kind), Some(AlertKind::Error));

        app.dismiss_alert();
        app.confirm_install();
        assert!(app.install_rx.is_none());
        assert!(app.alert.is_some());
    }

    #[test]
    fn invalid_selection_alerts_and_keeps_state() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(FakeRunner::new());
        let good = archive(tmp.path());
        app.select_package(&good);

        assert!(!app.select_package(tmp.path().join("readme.md")));
        assert_eq!(app.alert.as_ref().unwrap().title, "Invalid selection");
        assert_eq!(app.state().package().unwrap().path(), good);
    }

    #[test]
    fn quit_is_refused_while_installing() {
        let tmp = tempfile::tempdir().unwrap();
        let mut app = app(FakeRunner::new());
        app.select_package(archive(tmp.path()));
        app.confirm_install();

        // Still Installing until the UI thread drains the Finished message.
        app.request_quit();
        assert!(!app.should_quit);

        wait_for_install(&mut app);
        app.dismiss_alert();
        app.request_quit();
        assert!(app.should_quit);
    }

    #[test]
    fn terminal_handoff_suspends_until_install_ends() {
        let tmp = tempfile::tempdir().unwrap();
        let controller = InstallerController::new(
            Arc::new(FakeRunner::new().missing("pkexec").streamed(&["done"], Some(0))),
            InstallerConfig::default(),
        )
        .running_as_root(false)
        .hand_off_terminal(true);
        let mut app = App::new(controller);
        app.select_package(archive(tmp.path()));
        app.confirm_install();

        let deadline = Instant::now() + Duration::from_secs(5);
        while app.pending_handoff.is_none() && Instant::now() < deadline {
            app.poll_install();
            std::thread::sleep(Duration::from_millis(5));
        }
        let handoff = app.take_handoff().expect("installer asked for the terminal");
        assert_eq!(handoff.elevator, "sudo");
        assert!(app.terminal_suspended);
        assert!(!app.should_resume_terminal());
        assert_eq!(app.output_text(), "");

        handoff.release();
        wait_for_install(&mut app);
        assert_eq!(app.output_text(), "done\n");
        assert!(app.should_resume_terminal());

        app.resume_terminal();
        assert!(!app.terminal_suspended);
    }

    #[test]
    fn log_scroll_follows_until_user_scrolls() {
        let mut app = app(FakeRunner::new());
        for i in 0..5 {
            app.log(LogEntry::info(format!("line {i}")));
        }
        assert_eq!(app.log_scroll, 4);

        app.scroll_log_up();
        app.log(LogEntry::info("late"));
        assert_eq!(app.log_scroll, 3);

        app.scroll_log_down();
        app.scroll_log_down();
        assert!(app.follow_logs);
        assert_eq!(app.log_scroll, 5);
    }
}

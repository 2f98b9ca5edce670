//! pkg-installer
//!
//! A TUI front-end for installing local pacman package archives: pick an
//! archive, preview its metadata, install it with elevated privileges and
//! watch the package manager's output.

mod app;
mod cli;
mod config;
mod input;
mod installer;
mod picker;
mod theme;
mod ui;

use std::{io, path::PathBuf, process::ExitCode, sync::Arc, time::Duration};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

use crate::app::{App, CheckItem};
use crate::config::InstallerConfig;
use crate::installer::controller::InstallerController;
use crate::installer::{is_root, preflight, CommandRunner, SystemRunner};

/// Install local pacman package archives
#[derive(Parser)]
#[command(name = "pkg-installer")]
#[command(version)]
#[command(about = "Install local pacman package archives", long_about = None)]
struct Cli {
    /// Package archive to pre-select
    package: Option<PathBuf>,

    /// Configuration file (YAML)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Enable debug logging
    #[arg(long, global = true)]
    debug: bool,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(Subcommand)]
enum Commands {
    /// Print package metadata and exit
    Info {
        /// Package archive
        package: PathBuf,
    },
    /// Install a package without the TUI, streaming output to stdout
    Install {
        /// Package archive
        package: PathBuf,

        /// Confirm the installation
        #[arg(long, short)]
        yes: bool,
    },
}

fn main() -> Result<ExitCode> {
    let args = Cli::parse();
    let _guard = init_logging(args.debug)?;
    info!("pkg-installer starting");

    let config = InstallerConfig::load(args.config.as_deref())?;
    let runner: Arc<dyn CommandRunner> = Arc::new(SystemRunner);
    let as_root = is_root();

    let checks = match preflight::run_preflight_checks(runner.as_ref(), &config, as_root) {
        Ok(checks) => checks,
        Err(e) => {
            error!(error = %e, "preflight failed");
            eprintln!("pkg-installer: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    let mut controller = InstallerController::new(runner, config).running_as_root(as_root);
    let (mut out, mut err) = (io::stdout(), io::stderr());

    let status = match args.command {
        Some(Commands::Info { package }) => {
            cli::run_info(&mut controller, &package, &mut out, &mut err)?
        }
        Some(Commands::Install { package, yes }) => {
            cli::run_install(&mut controller, &package, yes, &mut out, &mut err)?
        }
        None => {
            let app = App::new(controller.hand_off_terminal(true));
            return run_tui(app, &checks, args.package);
        }
    };
    Ok(ExitCode::from(status))
}

/// Log to a daily file; the terminal belongs to the TUI
fn init_logging(debug: bool) -> Result<tracing_appender::non_blocking::WorkerGuard> {
    let log_dir = directories::ProjectDirs::from("", "", "pkg-installer")
        .map(|d| d.data_local_dir().to_path_buf())
        .unwrap_or_else(std::env::temp_dir);
    std::fs::create_dir_all(&log_dir)
        .with_context(|| format!("Failed to create log directory {}", log_dir.display()))?;

    let file_appender = tracing_appender::rolling::daily(&log_dir, "pkg-installer.log");
    let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
    let default_filter = if debug {
        "pkg_installer=debug"
    } else {
        "pkg_installer=info"
    };
    tracing_subscriber::fmt()
        .with_writer(non_blocking)
        .with_ansi(false)
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter)),
        )
        .init();

    Ok(guard)
}

/// Run the TUI installer
fn run_tui(mut app: App, checks: &[CheckItem], package: Option<PathBuf>) -> Result<ExitCode> {
    app.log_checks(checks);
    if let Some(path) = package {
        app.select_package(path);
    }

    // Setup terminal
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    // Restore terminal
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result.map(|()| ExitCode::SUCCESS)
}

/// Main application loop
fn run_app<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<()> {
    // Log entries already echoed while the terminal was handed off
    let mut echoed = 0;

    loop {
        // Installer output is only ever applied here, on the UI thread.
        app.poll_install();

        if let Some(handoff) = app.take_handoff() {
            suspend_terminal()?;
            println!(
                ":: {} may ask for your password; the installer view returns when it finishes",
                handoff.elevator
            );
            echoed = app.logs.len();
            handoff.release();
        }

        if app.terminal_suspended {
            echo_new_output(app, &mut echoed);
            if !app.should_resume_terminal() {
                std::thread::sleep(Duration::from_millis(100));
                continue;
            }
            resume_terminal(terminal)?;
            app.resume_terminal();
        }

        terminal.draw(|f| ui::render(f, app))?;

        // Handle input with timeout for spinner animation
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    input::handle_key(app, key);
                }
            }
        } else {
            app.tick_spinner();
        }

        if app.should_quit {
            break;
        }
    }

    info!("pkg-installer exiting");
    Ok(())
}

/// Give the terminal back to the shell so an elevation prompt can use it
fn suspend_terminal() -> Result<()> {
    execute!(io::stdout(), LeaveAlternateScreen)?;
    disable_raw_mode()?;
    Ok(())
}

fn resume_terminal<B: ratatui::backend::Backend>(terminal: &mut Terminal<B>) -> Result<()> {
    enable_raw_mode()?;
    execute!(io::stdout(), EnterAlternateScreen)?;
    terminal.clear()?;
    Ok(())
}

/// Print log entries added since `echoed` while the TUI is suspended
fn echo_new_output(app: &App, echoed: &mut usize) {
    for entry in app.logs.iter().skip(*echoed) {
        println!("{}", entry.message);
    }
    *echoed = app.logs.len();
}

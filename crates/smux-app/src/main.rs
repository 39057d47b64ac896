use std::fs::File;
use std::process::ExitCode;
use std::sync::Arc;

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod config;
mod escape;
mod event_loop;
mod menu;

use cli::Cli;
use config::Config;
use event_loop::EventLoop;

/// Logs go to a file in the platform data directory; the terminal
/// belongs to the windows. Best effort, silent on failure.
fn init_logging() {
    let Some(dir) = dirs::data_local_dir() else {
        return;
    };
    let dir = dir.join("smux");
    if std::fs::create_dir_all(&dir).is_err() {
        return;
    }
    let Ok(file) = File::create(dir.join("smux.log")) else {
        return;
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(Arc::new(file))
        .with_ansi(false)
        .try_init();
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let config = Config::load();
    init_logging();

    if unsafe { libc::isatty(libc::STDIN_FILENO) } != 1 {
        eprintln!("smux: stdin must be connected to a terminal");
        return ExitCode::FAILURE;
    }

    let scrollback_bytes = cli.scrollback_bytes.unwrap_or(config.scrollback_bytes);
    if scrollback_bytes == 0 {
        eprintln!("smux: scrollback-bytes must be greater than zero");
        return ExitCode::FAILURE;
    }
    let shell = config.resolve_shell(cli.shell.as_deref());

    let mut event_loop = EventLoop::new(shell, scrollback_bytes);
    match event_loop.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("smux: {err:#}");
            ExitCode::FAILURE
        }
    }
}

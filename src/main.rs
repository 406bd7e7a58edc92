use std::fs::File;
use std::io::stdout;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use log::info;
use ratatui::{Terminal, backend::CrosstermBackend};
use simplelog::{Config as LogConfig, LevelFilter, WriteLogger};

use pdfolio::app::{App, run_app};
use pdfolio::config::load_config;
use pdfolio::panic_handler;

/// A terminal-based PDF viewer
#[derive(Debug, Parser)]
#[command(version, about)]
struct Args {
    /// Path to a PDF file
    path: Option<PathBuf>,

    /// Fetch the document from a URL instead of a local file
    #[arg(long, conflicts_with = "path")]
    url: Option<String>,

    /// Write diagnostic logs to this file
    #[arg(long, value_name = "FILE")]
    log_file: Option<PathBuf>,
}

fn main() -> Result<()> {
    let args = Args::parse();

    if let Some(log_path) = &args.log_file {
        let file = File::create(log_path)
            .with_context(|| format!("failed to create log file {}", log_path.display()))?;
        WriteLogger::init(LevelFilter::Debug, LogConfig::default(), file)?;
    }

    if args.path.is_none() && args.url.is_none() {
        bail!("expected a PDF path or --url <URL>");
    }

    panic_handler::initialize_panic_handler();

    let config = load_config();
    let mut app = App::new(config);

    if let Some(path) = &args.path {
        app.open_file(path);
    } else if let Some(url) = &args.url {
        app.open_url(url);
    }

    enable_raw_mode()?;
    execute!(stdout(), EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout());
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(stdout(), LeaveAlternateScreen, DisableMouseCapture)?;
    terminal.show_cursor()?;

    info!("exiting");
    result
}

//! # Tessel - a piece-table text editor
//!
//! A headless editor driven by line commands on stdin.
//!
//! ## Quick Start
//!
//! ```bash
//! # Edit a file
//! cargo run -- path/to/file.txt
//!
//! # Script an edit
//! printf 'eof\ni done\nsave\nquit\n' | cargo run -- notes.txt
//! ```

mod shell;

use std::io::BufRead;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use tessel_core::{Config, Editor, InputEvent, InputQueue, InputSender, SessionStore};

use crate::shell::LineDispatcher;

/// Tessel - a piece-table text editor
#[derive(Parser, Debug)]
#[command(name = "tessel")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// File to open
    #[arg(value_name = "FILE")]
    file: Option<PathBuf>,

    /// Config file (defaults to the platform config dir)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

fn main() -> anyhow::Result<()> {
    // Parse command line arguments
    let args = Args::parse();

    // Initialize logging; stdout belongs to the editor
    let log_level = match args.verbose {
        0 => tracing::Level::WARN,
        1 => tracing::Level::INFO,
        2 => tracing::Level::DEBUG,
        _ => tracing::Level::TRACE,
    };

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(std::io::stderr)
                .with_target(false)
                .with_level(true),
        )
        .with(tracing_subscriber::filter::LevelFilter::from_level(
            log_level,
        ))
        .init();

    tracing::info!("Starting Tessel v{}", env!("CARGO_PKG_VERSION"));

    let config = match &args.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("loading config from {}", path.display()))?,
        None => Config::load(),
    };

    let mut editor = match SessionStore::open(config.files.session_dir.as_deref()) {
        Ok(session) => Editor::with_session(config, session),
        Err(e) => {
            tracing::warn!(%e, "session persistence disabled");
            Editor::new(config)
        }
    };

    if let Some(file) = &args.file {
        editor
            .open(file)
            .with_context(|| format!("opening {}", file.display()))?;
    }

    let (sender, queue) = InputQueue::channel();
    std::thread::spawn(move || read_input(std::io::stdin().lock(), sender));

    let mut dispatcher = LineDispatcher::new(std::io::stdout());
    editor.run(queue, &mut dispatcher);

    Ok(())
}

/// Forwards input lines until EOF or until the editor stops listening.
fn read_input(input: impl BufRead, sender: InputSender) {
    for line in input.lines() {
        match line {
            Ok(line) => {
                if !sender.send(InputEvent::Line(line)) {
                    return;
                }
            }
            Err(e) => {
                tracing::error!(%e, "input read failed");
                return;
            }
        }
    }
}

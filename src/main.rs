mod animation;
mod app;
mod config;
mod error;
mod helpers;
mod highlight;
mod input;
mod scroll;
mod sync;
mod types;

use crate::{
    app::{Action, App},
    config::Config,
    helpers::load_text_file,
    highlight::TreeSitterHighlighter,
    types::TextSource,
};

use anyhow::Context;
use clap::Parser;
use ratatui::{
    crossterm::{
        event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEventKind},
        execute,
        terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
    },
    prelude::*,
};
use std::{
    fs::File,
    io,
    path::{Path, PathBuf},
    sync::Mutex,
    time::Instant,
};
use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Replays a code snippet in a mock editor as if someone were typing it
#[derive(Parser, Debug)]
#[command(name = "typewriter")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Preload the input with the snippet at PATH
    #[arg(short, long, value_name = "PATH")]
    text: Option<PathBuf>,

    /// Start with an empty input instead of the built-in sample
    #[arg(long, conflicts_with = "text")]
    empty: bool,

    /// Configuration file (defaults to ~/.config/typewriter/config.toml)
    #[arg(short, long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Seed for the per-character delays
    #[arg(long)]
    seed: Option<u64>,

    /// Write logs to PATH
    #[arg(long, value_name = "PATH")]
    log_file: Option<PathBuf>,

    /// Verbose logging
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,
}

/// The terminal belongs to the UI, so logs only go to a file.
fn init_logging(path: Option<&Path>, verbose: u8) -> anyhow::Result<()> {
    let Some(path) = path else {
        return Ok(());
    };

    let file = File::create(path)
        .with_context(|| format!("creating log file {}", path.display()))?;

    let default_level = match verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };

    tracing_subscriber::registry()
        .with(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level)),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_writer(Mutex::new(file))
                .with_ansi(false)
                .with_target(false),
        )
        .init();

    Ok(())
}

fn run<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> anyhow::Result<()> {
    loop {
        app.on_frame(Instant::now());
        terminal.draw(|frame| app.draw_ui(frame))?;

        if event::poll(app.poll_timeout(Instant::now()))? {
            match event::read()? {
                Event::Key(key) if key.kind == KeyEventKind::Press => {
                    if app.handle_key(key) == Action::Quit {
                        break;
                    }
                }
                Event::Mouse(mouse) => app.handle_mouse(mouse),
                _ => {}
            }
        }
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    init_logging(args.log_file.as_deref(), args.verbose)?;

    let config = Config::load(args.config.as_deref()).context("loading configuration")?;

    let source = match &args.text {
        Some(path) => TextSource::Fixed(
            load_text_file(path).with_context(|| format!("reading {}", path.display()))?,
        ),
        None if args.empty => TextSource::Empty,
        None => TextSource::Sample,
    };

    tracing::info!("Starting typewriter v{}", env!("CARGO_PKG_VERSION"));

    let highlighter = TreeSitterHighlighter::new().context("loading JavaScript grammar")?;
    let mut app = App::new(config, source, args.seed, Box::new(highlighter));

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;

    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run(&mut terminal, &mut app);

    tracing::info!(
        state = ?app.state(),
        revealed = app.revealed().chars().count(),
        "typewriter exiting"
    );

    disable_raw_mode()?;
    execute!(
        terminal.backend_mut(),
        DisableMouseCapture,
        LeaveAlternateScreen
    )?;
    terminal.show_cursor()?;

    result
}

mod app;

use action::Action;
use app::App;
use clap::Parser;
use crossterm::{
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyEvent, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use lsys::Config;
use ratatui::{backend::CrosstermBackend, Terminal};
use std::io::Read;
use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Instant;
use std::{error::Error, fs, io};
use tracing_subscriber::EnvFilter;

/// Animates randomly discovered L-systems in the terminal.
#[derive(Parser, Debug)]
#[clap(author, version, about, long_about = None)]
#[clap(after_help = "EXAMPLES:
  lsys-tui
  lsys-tui presets/hextooth.lsys
  printf 'f → gfg\\ng → +f' | lsys-tui")]
struct Cli {
    /// Path to a system document (.lsys).
    /// If not provided, rules are read from piped stdin or found by a random search.
    system_file: Option<String>,

    /// JSON file overriding the default configuration.
    #[clap(short, long)]
    config: Option<PathBuf>,

    /// Write logs to this file (filtered by RUST_LOG).
    #[clap(long)]
    log: Option<PathBuf>,
}

/// Represents the state of the application loop.
#[derive(PartialEq)]
enum AppState {
    Running,
    ShouldQuit,
}

/// A wrapper around the terminal to ensure it's restored on drop.
struct Tui {
    terminal: Terminal<CrosstermBackend<io::Stdout>>,
}

impl Tui {
    /// Creates a new TUI.
    fn new() -> io::Result<Self> {
        enable_raw_mode()?;
        let mut stdout = io::stdout();
        execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }
}

impl Drop for Tui {
    fn drop(&mut self) {
        // Restore the terminal to its original state.
        // The results are ignored as we can't do much about errors during drop.
        let _ = disable_raw_mode();
        let _ = execute!(
            self.terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        );
        let _ = self.terminal.show_cursor();
    }
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = &cli.log {
        init_logging(path)?;
    }

    // Load everything before initializing the TUI so errors reach stderr
    // without interfering with the terminal's alternate screen.
    let app = match load_app(&cli) {
        Ok(app) => app,
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        }
    };

    // Initialize the TUI. The `Tui` struct will handle cleanup on drop.
    let mut tui = Tui::new()?;

    run_app(&mut tui.terminal, app)?;

    Ok(())
}

/// Sends logs to `path`; the terminal itself is taken by the alternate screen.
fn init_logging(path: &Path) -> Result<(), Box<dyn Error>> {
    let file = fs::File::create(path)?;
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("lsys=info")),
        )
        .with_writer(Mutex::new(file))
        .with_ansi(false)
        .init();

    Ok(())
}

/// Builds the app from CLI arguments.
///
/// It tries to load from a file path, then from stdin, and finally
/// falls back to a random search.
fn load_app(cli: &Cli) -> Result<App, String> {
    let config = match &cli.config {
        Some(path) => Config::load(path).map_err(|e| e.to_string())?,
        None => Config::default(),
    };

    if let Some(file_path) = &cli.system_file {
        fs::read_to_string(file_path)
            .map_err(|e| format!("Failed to read file '{}': {}", file_path, e))
            .and_then(|content| App::new_from_source(config, &content))
    } else if atty::isnt(atty::Stream::Stdin) {
        let mut buffer = String::new();
        io::stdin()
            .read_to_string(&mut buffer)
            .map_err(|e| format!("Failed to read from stdin: {}", e))
            .and_then(|_| App::new_from_source(config, &buffer))
    } else {
        App::new_search(config)
    }
}

/// Runs the main application loop.
fn run_app<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    mut app: App,
) -> io::Result<()> {
    let tick_interval = app.tick_interval();
    let mut last_tick = Instant::now();

    loop {
        terminal.draw(|f| app.render(f))?;

        let timeout = tick_interval.saturating_sub(last_tick.elapsed());

        if event::poll(timeout)? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press
                    && handle_key_event(&mut app, key) == AppState::ShouldQuit
                {
                    return Ok(());
                }
            }
        }

        if last_tick.elapsed() >= tick_interval {
            if app.is_auto_playing() {
                app.tick();
            }
            last_tick = Instant::now();
        }
    }
}

/// Handles key events and updates the application state.
fn handle_key_event(app: &mut App, key: KeyEvent) -> AppState {
    if app.is_editing() {
        app.handle_edit_key(key);
        return AppState::Running;
    }

    if let Some(action) = app.keymap.get(&key) {
        match action {
            Action::Quit => return AppState::ShouldQuit,
            Action::Restart => app.restart(),
            Action::Tick => app.tick(),
            Action::ToggleAutoPlay => app.toggle_auto_play(),
            Action::NewSearch => app.search_new_rules(),
            Action::EditRules => app.start_editing(),
            Action::ToggleHelp => app.toggle_help(),
            Action::PreviousPreset => app.previous_preset(),
            Action::NextPreset => app.next_preset(),
        }
    }
    AppState::Running
}

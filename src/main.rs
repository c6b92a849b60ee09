mod app;
mod config;
mod git;
mod ui;
mod watch;

use anyhow::Result;
use app::{keys, App, Effect, GatewayEvent};
use clap::Parser;
use config::BlConfig;
use crossterm::{
    event::{self, Event, KeyEventKind},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::prelude::*;
use std::io;
use std::path::Path;
use std::sync::mpsc;
use std::time::{Duration, Instant};
use watch::{RepoWatcher, WatchEvent};

/// Terminal viewer for branch diffs
#[derive(Parser)]
#[command(name = "bl", version, about)]
struct Cli {
    /// Repository to open at startup (press 'o' later if omitted)
    path: Option<String>,

    /// Base branch to diff against (defaults to the repo's detected default)
    #[arg(long)]
    base: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let config = config::load(cli.path.as_deref());

    let mut app = App::new(&config);
    app.set_base_override(cli.base.clone());

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = run_app(&mut terminal, &mut app, &config, cli.path);

    // Cleanup
    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    if let Err(err) = result {
        eprintln!("Error: {:?}", err);
    }

    Ok(())
}

fn run_app<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    config: &BlConfig,
    startup_path: Option<String>,
) -> Result<()>
where
    <B as Backend>::Error: std::error::Error + Send + Sync + 'static,
{
    // Channels for gateway completions and watch events
    let (gateway_tx, gateway_rx) = mpsc::channel::<GatewayEvent>();
    let (watch_tx, watch_rx) = mpsc::channel::<WatchEvent>();
    let mut watcher: Option<RepoWatcher> = None;

    // Debounce state for watcher-triggered refreshes
    let mut pending_refresh = false;
    let mut refresh_deadline = Instant::now();

    if let Some(path) = startup_path {
        let effects = app.open_repo(path);
        run_effects(app, effects, &gateway_tx, &watch_tx, &mut watcher, config);
    }

    loop {
        // Consume tree pulses and settle derived state before rendering
        app.apply_pulses();
        app.derived();

        terminal.draw(|f| ui::draw(f, app))?;

        // Poll for key events with a timeout so completions keep flowing
        if event::poll(Duration::from_millis(100))? {
            if let Event::Key(key) = event::read()? {
                if key.kind == KeyEventKind::Press {
                    let effects = keys::handle_key(app, key);
                    run_effects(app, effects, &gateway_tx, &watch_tx, &mut watcher, config);
                }
            }
        }

        // Apply gateway completions (non-blocking)
        while let Ok(completion) = gateway_rx.try_recv() {
            let effects = app.apply(completion);
            run_effects(app, effects, &gateway_tx, &watch_tx, &mut watcher, config);
        }

        // Repo change events act like pressing 'r', debounced
        while let Ok(WatchEvent::GitChanged(kind)) = watch_rx.try_recv() {
            app.notify(format!("{} changed", kind.label()));
            pending_refresh = true;
            refresh_deadline = Instant::now() + Duration::from_millis(200);
        }
        if pending_refresh && Instant::now() >= refresh_deadline {
            pending_refresh = false;
            let effects = app.refresh();
            run_effects(app, effects, &gateway_tx, &watch_tx, &mut watcher, config);
        }

        // Tick — auto-clears transient notifications
        app.tick();

        if app.should_quit {
            return Ok(());
        }
    }
}

/// Execute the effects a handler returned. Gateway loads run on worker
/// threads; each worker sends exactly one completion back, success or
/// failure, so the loading flag always clears.
fn run_effects(
    app: &mut App,
    effects: Vec<Effect>,
    gateway_tx: &mpsc::Sender<GatewayEvent>,
    watch_tx: &mpsc::Sender<WatchEvent>,
    watcher: &mut Option<RepoWatcher>,
    config: &BlConfig,
) {
    for effect in effects {
        match effect {
            Effect::LoadRepoInfo { seq, repo_path } => {
                let tx = gateway_tx.clone();
                std::thread::spawn(move || {
                    let result = git::get_repo_info(&repo_path).map_err(|e| format!("{:#}", e));
                    let _ = tx.send(GatewayEvent::RepoInfoLoaded { seq, result });
                });
            }
            Effect::LoadChangedFiles {
                seq,
                repo_path,
                base_branch,
            } => {
                let tx = gateway_tx.clone();
                std::thread::spawn(move || {
                    let result = git::get_changed_files(&repo_path, &base_branch)
                        .map_err(|e| format!("{:#}", e));
                    let _ = tx.send(GatewayEvent::FilesLoaded { seq, result });
                });
            }
            Effect::LoadDiff {
                seq,
                repo_path,
                file_path,
                base_branch,
            } => {
                let tx = gateway_tx.clone();
                std::thread::spawn(move || {
                    let result = git::get_file_diff(&repo_path, &file_path, &base_branch)
                        .map_err(|e| format!("{:#}", e));
                    let _ = tx.send(GatewayEvent::DiffLoaded {
                        seq,
                        path: file_path,
                        result,
                    });
                });
            }
            Effect::OpenEditor {
                repo_path,
                file_path,
            } => {
                if let Err(err) = git::open_in_editor(&repo_path, &file_path) {
                    app.notify(format!("Editor error: {}", err));
                }
            }
            Effect::StartWatch { repo_path } => {
                match RepoWatcher::new(
                    Path::new(&repo_path),
                    config.watch.debounce_ms,
                    watch_tx.clone(),
                ) {
                    Ok(new_watcher) => *watcher = Some(new_watcher),
                    Err(err) => {
                        app.watching = false;
                        app.notify(format!("Watch error: {}", err));
                    }
                }
            }
            Effect::StopWatch => {
                *watcher = None;
            }
        }
    }
}

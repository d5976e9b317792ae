use anyhow::Context;
use clap::Parser;
use crossterm::{
    event::{DisableMouseCapture, EnableMouseCapture},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
};
use ratatui::{backend::CrosstermBackend, Terminal};
use std::{fs, io, path::PathBuf, sync::Mutex};
use taskboard::{
    app::App,
    config::{Config, FileConfig},
    route::Route,
    storage::FileStorage,
    task_store::TaskStore,
    ui,
};
use tracing::{error, info};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "taskboard")]
#[command(version)]
#[command(about = "Track tasks from the terminal: add, edit, filter and delete", long_about = None)]
struct Cli {
    /// Directory holding the task data (overrides config file)
    #[arg(long, env = "TASKBOARD_DATA_DIR")]
    data_dir: Option<PathBuf>,

    /// Config file (defaults to <config dir>/taskboard/config.toml)
    #[arg(long)]
    config: Option<PathBuf>,

    /// Key the task list is stored under
    #[arg(long)]
    storage_key: Option<String>,

    /// View to open first: /, /add-task or /edit-task/<id>
    #[arg(long, default_value = "/")]
    open: String,

    /// Verbose logging
    #[arg(short, long)]
    verbose: bool,
}

fn load_config(cli: &Cli) -> anyhow::Result<Config> {
    let mut file = match cli.config.clone().or_else(Config::default_config_path) {
        Some(path) => FileConfig::load(&path)?,
        None => FileConfig::default(),
    };
    if let Some(dir) = &cli.data_dir {
        file.data_dir = Some(dir.clone());
    }
    if let Some(key) = &cli.storage_key {
        file.storage_key = Some(key.clone());
    }
    Ok(Config::resolve(file)?)
}

fn init_logging(config: &Config, verbose: bool) -> anyhow::Result<()> {
    if let Some(parent) = config.log_file.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating log directory {}", parent.display()))?;
    }
    let log_file = fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(&config.log_file)
        .with_context(|| format!("opening log file {}", config.log_file.display()))?;

    let default_filter = if verbose {
        "taskboard=debug,info"
    } else {
        "taskboard=info,warn"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_ansi(false)
        .with_writer(Mutex::new(log_file))
        .init();
    Ok(())
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let config = load_config(&cli)?;
    init_logging(&config, cli.verbose)?;

    let start = Route::parse(&cli.open)
        .with_context(|| format!("unknown view {:?}; expected /, /add-task or /edit-task/<id>", cli.open))?;

    info!(data_dir = %config.data_dir.display(), key = %config.storage_key, "Starting taskboard");
    let store = TaskStore::load(FileStorage::new(&config.data_dir), config.storage_key.clone());
    let mut app = App::new(store);
    app.navigate(start);

    // Terminal setup
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen, EnableMouseCapture)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = ui::run_app(&mut terminal, &mut app);

    // Pending writes are flushed before the terminal is restored, so a restore
    // failure cannot skip them.
    let (saved, restored) = app.shutdown(|| {
        disable_raw_mode()?;
        execute!(
            terminal.backend_mut(),
            LeaveAlternateScreen,
            DisableMouseCapture
        )?;
        terminal.show_cursor()
    });
    if let Err(err) = saved {
        eprintln!("Failed to save tasks: {err}");
    }
    restored?;

    if let Err(err) = result {
        error!("Terminal error: {err}");
        eprintln!("{:?}", err);
    }
    info!("Exiting taskboard");
    Ok(())
}

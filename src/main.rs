use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use color_eyre::Result;
use color_eyre::eyre::WrapErr;
use ratatui::DefaultTerminal;
use ratatui::crossterm::event::{self, DisableFocusChange, EnableFocusChange};
use ratatui::crossterm::execute;

use ghostline::app::App;
use ghostline::config::{self, Config};
use ghostline::logging;
use ghostline::provider::{AiProvider, SuggestionProvider, UnavailableProvider};

/// Terminal editor with inline AI suggestions
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File to edit; created on first save if it does not exist
    file: Option<PathBuf>,

    /// Config file (default: <config dir>/ghostline/config.toml)
    #[arg(long, value_name = "PATH")]
    config: Option<PathBuf>,

    /// Print the effective configuration as TOML and exit
    #[arg(long)]
    dump_config: bool,

    /// Write a debug log to <cache dir>/ghostline/ghostline.log
    #[arg(long)]
    log: bool,

    /// Override the quiet period before a suggestion is requested
    #[arg(long, value_name = "MS")]
    debounce_ms: Option<u64>,

    /// Start with suggestions turned off
    #[arg(long)]
    no_suggest: bool,
}

/// Event-loop tick; also bounds how late a suggestion shows up
const TICK: Duration = Duration::from_millis(50);

fn main() -> Result<()> {
    color_eyre::install()?;

    let args = Args::parse();

    if args.log {
        // A missing log file is no reason to refuse to start
        if let Err(e) = logging::init(None) {
            eprintln!("ghostline: logging disabled: {}", e);
        }
    }

    let loaded = config::load_config(args.config.as_deref());
    let mut config = loaded.config;
    apply_overrides(&mut config, &args);

    if args.dump_config {
        print!("{}", toml::to_string_pretty(&config).wrap_err("Failed to serialize config")?);
        return Ok(());
    }

    let document = match &args.file {
        Some(path) if path.exists() => std::fs::read_to_string(path)
            .wrap_err_with(|| format!("Failed to read {}", path.display()))?,
        _ => String::new(),
    };

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()
        .wrap_err("Failed to start async runtime")?;
    // Engine timers and fetches are spawned from the UI thread
    let _guard = runtime.enter();

    let (provider, provider_notice) = build_provider(&mut config);
    let mut app = App::new(&document, args.file.clone(), provider, &config.suggestion);
    if let Some(notice) = loaded.warning.or(provider_notice) {
        app.set_notice(notice);
    }

    let terminal = ratatui::init();
    let _ = execute!(std::io::stdout(), EnableFocusChange);

    let result = run(terminal, &mut app);

    let _ = execute!(std::io::stdout(), DisableFocusChange);
    ratatui::restore();

    app.finish();
    result
}

fn apply_overrides(config: &mut Config, args: &Args) {
    if let Some(ms) = args.debounce_ms {
        config.suggestion.debounce_ms = ms;
    }
    if args.no_suggest {
        config.suggestion.enabled = false;
    }
}

/// Build the configured provider, or disable suggestions and say why
fn build_provider(config: &mut Config) -> (Arc<dyn SuggestionProvider>, Option<String>) {
    match AiProvider::from_config(&config.ai) {
        Ok(provider) => {
            log::info!("Using {} for suggestions", provider.name());
            (provider.into_shared(), None)
        }
        Err(e) => {
            log::warn!("Suggestions disabled: {}", e);
            let notice = config
                .suggestion
                .enabled
                .then(|| format!("Suggestions off: {}", e));
            config.suggestion.enabled = false;
            (Arc::new(UnavailableProvider::new(&e)), notice)
        }
    }
}

fn run(mut terminal: DefaultTerminal, app: &mut App) -> Result<()> {
    loop {
        terminal.draw(|frame| app.render(frame))?;

        if event::poll(TICK)? {
            app.handle_event(event::read()?);
        }
        app.tick();

        if app.should_quit() {
            break;
        }
    }

    Ok(())
}

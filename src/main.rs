mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
    time::Duration,
};
use typesprint::{
    app::{App, Flow},
    app_dirs::AppDirs,
    clock::MonotonicClock,
    config::{Config, ConfigStore, FileConfigStore},
    logging,
    passages::{FixedText, PassageProvider, PassageSet},
    runtime::{CrosstermEventSource, FixedTicker, Runner},
    TypingSession,
};

/// terminal typing speed test
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A terminal typing speed test: type the passage shown, watch live wpm, accuracy and mistakes, and get a result when you finish or the clock runs out."
)]
pub struct Cli {
    /// number of seconds allowed per test
    #[clap(short = 's', long)]
    secs: Option<u64>,

    /// custom prompt to type instead of a random passage
    #[clap(short = 'p', long)]
    prompt: Option<String>,

    /// passage set to draw texts from
    #[clap(short = 'l', long)]
    passages: Option<String>,

    /// path to the JSON config file
    #[clap(long)]
    config: Option<PathBuf>,

    /// log filter, e.g. "debug" (falls back to RUST_LOG, then info)
    #[clap(long)]
    log_level: Option<String>,

    /// write the effective settings to the config file and exit
    #[clap(long)]
    save_config: bool,
}

impl Cli {
    /// Layer command line overrides on top of the stored config
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(secs) = self.secs {
            config.budget_secs = secs;
        }
        if let Some(passages) = &self.passages {
            config.passages = passages.clone();
        }
        config
    }

    fn config_store(&self) -> FileConfigStore {
        match &self.config {
            Some(path) => FileConfigStore::with_path(path),
            None => FileConfigStore::new(),
        }
    }
}

fn build_session(cli: &Cli, config: &Config) -> typesprint::Result<TypingSession> {
    let clock = MonotonicClock::new();
    let session = match &cli.prompt {
        Some(prompt) => TypingSession::new(FixedText::new(prompt.clone()), clock),
        None => {
            let provider = PassageProvider::from_set_name(&config.passages)
                .inspect_err(|err| tracing::error!(%err, "could not load passages"))?;
            TypingSession::new(provider, clock)
        }
    };
    Ok(session.with_budget_secs(config.budget_secs))
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    let store = cli.config_store();
    let log_guard = AppDirs::log_dir()
        .and_then(|dir| logging::init_file_logging(&dir, cli.log_level.as_deref()));

    let config = cli.apply_to(store.load());

    if cli.save_config {
        store.save(&config)?;
        println!("saved settings to {}", store.path().display());
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    let session = match build_session(&cli, &config) {
        Ok(session) => session,
        Err(err) => {
            // exit() skips destructors, flush the log first
            drop(log_guard);
            let available = PassageSet::available().join(", ");
            Cli::command()
                .error(
                    ErrorKind::InvalidValue,
                    format!("{err} (available: {available})"),
                )
                .exit()
        }
    };

    tracing::info!(?config, "starting");

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let mut app = App::new(session);
    let res = start_tui(&mut terminal, &mut app, &config);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    res
}

fn start_tui<B: Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
    config: &Config,
) -> Result<(), Box<dyn Error>> {
    let ticker = FixedTicker::new(Duration::from_millis(config.tick_rate_ms()));
    let mut runner = Runner::new(CrosstermEventSource::new(), ticker);

    loop {
        terminal.draw(|f| ui::draw(app, f))?;

        if app.pump(&mut runner) == Flow::Quit {
            break;
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use typesprint::SessionState;

    #[test]
    fn test_cli_default_values() {
        let cli = Cli::parse_from(["typesprint"]);

        assert_eq!(cli.secs, None);
        assert_eq!(cli.prompt, None);
        assert_eq!(cli.passages, None);
        assert_eq!(cli.config, None);
        assert!(!cli.save_config);
    }

    #[test]
    fn test_cli_secs() {
        let cli = Cli::parse_from(["typesprint", "-s", "30"]);
        assert_eq!(cli.secs, Some(30));

        let cli = Cli::parse_from(["typesprint", "--secs", "120"]);
        assert_eq!(cli.secs, Some(120));
    }

    #[test]
    fn test_cli_custom_prompt() {
        let cli = Cli::parse_from(["typesprint", "-p", "hello world"]);
        assert_eq!(cli.prompt, Some("hello world".to_string()));
    }

    #[test]
    fn test_cli_overrides_config() {
        let cli = Cli::parse_from(["typesprint", "-s", "15", "-l", "pangrams"]);
        let config = cli.apply_to(Config::default());

        assert_eq!(config.budget_secs, 15);
        assert_eq!(config.passages, "pangrams");
        assert_eq!(config.tick_rate_ms, Config::default().tick_rate_ms);
    }

    #[test]
    fn test_cli_keeps_config_without_flags() {
        let stored = Config {
            budget_secs: 45,
            tick_rate_ms: 100,
            passages: "pangrams".into(),
        };
        let cli = Cli::parse_from(["typesprint"]);
        assert_eq!(cli.apply_to(stored.clone()), stored);
    }

    #[test]
    fn test_build_session_with_prompt() {
        let cli = Cli::parse_from(["typesprint", "-p", "abc", "-s", "20"]);
        let config = cli.apply_to(Config::default());
        let mut session = build_session(&cli, &config).unwrap();

        assert_eq!(session.budget_secs(), 20);
        session.start().unwrap();
        assert_eq!(session.text(), "abc");
        assert_eq!(session.state(), SessionState::Running);
    }

    #[test]
    fn test_build_session_unknown_passages() {
        let cli = Cli::parse_from(["typesprint", "-l", "nope"]);
        let config = cli.apply_to(Config::default());
        assert!(build_session(&cli, &config).is_err());
    }

    #[test]
    fn test_build_session_failure_is_logged() {
        let dir = tempfile::tempdir().unwrap();
        let guard = logging::init_file_logging(dir.path(), Some("error"));
        assert!(guard.is_some());

        let cli = Cli::parse_from(["typesprint", "-l", "missing-set"]);
        let config = cli.apply_to(Config::default());
        assert!(build_session(&cli, &config).is_err());
        drop(guard);

        let contents = std::fs::read_to_string(dir.path().join(logging::LOG_FILE_NAME)).unwrap();
        assert!(contents.contains("could not load passages"));
        assert!(contents.contains("missing-set"));
    }
}

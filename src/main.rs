mod ui;

use clap::{error::ErrorKind, CommandFactory, Parser};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyEventKind, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use log::{info, warn};
use quizr::{
    app_dirs::AppDirs,
    config::{Config, ConfigStore, FileConfigStore},
    logging, questions,
    runtime::{AppEvent, Countdown, CrosstermEventSource, FixedTicker, Runner},
    quiz::MAX_SECS_PER_QUESTION,
    QuizError, QuizEvent, QuizState, Status,
};
use ratatui::{
    backend::{Backend, CrosstermBackend},
    Frame, Terminal,
};
use std::{
    error::Error,
    io::{self, stdin},
    path::PathBuf,
};

/// timed multiple-choice quiz in your terminal
#[derive(Parser, Debug, Clone)]
#[clap(
    version,
    about,
    long_about = "A timed multiple-choice quiz. Answer before the clock runs out and try to beat your high score."
)]
pub struct Cli {
    /// seconds on the clock per question
    #[clap(short = 's', long, value_parser = clap::value_parser!(u64).range(1..=MAX_SECS_PER_QUESTION))]
    secs_per_question: Option<u64>,

    /// question set to play, a JSON file (default: built-in general knowledge)
    #[clap(short = 'q', long)]
    questions: Option<PathBuf>,

    /// shuffle the question order
    #[clap(long)]
    shuffle: bool,

    /// remember the given options as defaults for later runs
    #[clap(long)]
    save_config: bool,

    /// dispatch comma separated events (e.g. "start,answer:2,advance,finish") without a tty and print the final state as JSON
    #[clap(long, value_name = "EVENTS")]
    replay: Option<String>,
}

impl Cli {
    /// Command line flags win over the stored config
    fn apply_to(&self, mut config: Config) -> Config {
        if let Some(secs) = self.secs_per_question {
            config.secs_per_question = secs;
        }
        if let Some(path) = &self.questions {
            config.questions_path = Some(path.clone());
        }
        if self.shuffle {
            config.shuffle = true;
        }
        config
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Control {
    Continue,
    Quit,
}

/// The host shell around one quiz session
#[derive(Debug)]
pub struct App {
    pub quiz: QuizState,
    /// option highlighted for arrow-key selection
    pub cursor: usize,
}

impl App {
    pub fn new(quiz: QuizState) -> Self {
        Self { quiz, cursor: 0 }
    }

    pub fn from_config(config: &Config) -> Result<Self, Box<dyn Error>> {
        let mut qs = match &config.questions_path {
            Some(path) => questions::load_from_path(path)?,
            None => questions::builtin()?,
        };
        if config.shuffle {
            questions::shuffle(&mut qs, &mut rand::thread_rng());
        }

        Ok(Self::new(QuizState::new(qs, config.secs_per_question)?))
    }

    fn dispatch(&mut self, event: QuizEvent) {
        let index = self.quiz.current_index();
        self.quiz.dispatch(event);
        if self.quiz.current_index() != index || self.quiz.status() != Status::Active {
            self.cursor = 0;
        }
    }

    /// Moves on from an answered question, finishing after the last one
    fn next_or_finish(&mut self) {
        if !self.quiz.has_answered() {
            return;
        }
        if self.quiz.is_last_question() {
            self.dispatch(QuizEvent::Finish);
        } else {
            self.dispatch(QuizEvent::Advance);
        }
    }

    pub fn on_key(&mut self, key: KeyEvent) -> Control {
        if key.kind != KeyEventKind::Press {
            return Control::Continue;
        }
        if key.code == KeyCode::Esc
            || (key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c'))
        {
            return Control::Quit;
        }

        match self.quiz.status() {
            Status::Ready => {
                if matches!(key.code, KeyCode::Enter | KeyCode::Char(' ')) {
                    self.dispatch(QuizEvent::Start);
                }
            }
            Status::Active => {
                let num_options = self.quiz.current_question().options.len();
                match key.code {
                    KeyCode::Char(c) if c.is_ascii_digit() && c != '0' => {
                        let choice = c as usize - '1' as usize;
                        self.dispatch(QuizEvent::AnswerSelected(choice));
                    }
                    KeyCode::Up if !self.quiz.has_answered() => {
                        self.cursor = self.cursor.saturating_sub(1);
                    }
                    KeyCode::Down if !self.quiz.has_answered() => {
                        if self.cursor + 1 < num_options {
                            self.cursor += 1;
                        }
                    }
                    KeyCode::Enter if !self.quiz.has_answered() => {
                        self.dispatch(QuizEvent::AnswerSelected(self.cursor));
                    }
                    KeyCode::Enter | KeyCode::Right | KeyCode::Char('n') => {
                        self.next_or_finish();
                    }
                    _ => {}
                }
            }
            Status::Finished => {
                if matches!(key.code, KeyCode::Char('r') | KeyCode::Enter) {
                    self.dispatch(QuizEvent::Restart);
                }
            }
        }

        Control::Continue
    }

    pub fn on_tick(&mut self) {
        self.dispatch(QuizEvent::Tick);
    }
}

/// Feeds a comma separated event script straight into the state machine.
/// An unknown event name aborts the replay.
fn replay(quiz: &mut QuizState, script: &str) -> Result<(), QuizError> {
    for name in script.split(',').filter(|s| !s.trim().is_empty()) {
        let event: QuizEvent = name.parse()?;
        quiz.dispatch(event);
    }
    Ok(())
}

fn main() -> Result<(), Box<dyn Error>> {
    let cli = Cli::parse();

    if let Some(path) = AppDirs::log_path() {
        if let Err(e) = logging::init(&path) {
            eprintln!("logging disabled: {e}");
        }
    }

    let store = FileConfigStore::new();
    let config = cli.apply_to(store.load());
    if cli.save_config {
        if let Err(e) = store.save(&config) {
            warn!("could not save config to {}: {e}", store.path().display());
        }
    }

    let mut app = App::from_config(&config)?;
    info!(
        "session with {} questions, {}s each",
        app.quiz.num_questions(),
        config.secs_per_question
    );

    if let Some(script) = &cli.replay {
        replay(&mut app.quiz, script)?;
        println!("{}", serde_json::to_string_pretty(&app.quiz.snapshot())?);
        return Ok(());
    }

    if !stdin().is_tty() {
        let mut cmd = Cli::command();
        cmd.error(ErrorKind::Io, "stdin must be a tty").exit();
    }

    enable_raw_mode()?;

    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    info!("session ended, high score {}", app.quiz.high_score());
    result
}

fn start_tui<B: Backend>(terminal: &mut Terminal<B>, app: &mut App) -> Result<(), Box<dyn Error>> {
    let runner = Runner::new(CrosstermEventSource::new());
    let mut countdown = Countdown::new(FixedTicker::every_second());
    let mut dirty = true;

    loop {
        countdown.sync(app.quiz.status());

        if dirty {
            terminal.draw(|f| ui(app, f))?;
            dirty = false;
        }

        let Some(event) = runner.step(&mut countdown) else {
            continue;
        };

        match event {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Closed => {
                warn!("terminal input closed, ending session");
                break;
            }
            AppEvent::Key(key) => {
                if app.on_key(key) == Control::Quit {
                    break;
                }
            }
        }
        dirty = true;
    }

    countdown.disarm();
    Ok(())
}

fn ui(app: &App, f: &mut Frame) {
    f.render_widget(app, f.area());
}

mod ui;

use std::io::{self, stdin, Write};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{Days, Local, NaiveDate};
use clap::{Parser, Subcommand};
use crossterm::{
    event::{KeyCode, KeyEvent, KeyModifiers},
    execute,
    terminal::{disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen},
    tty::IsTty,
};
use ratatui::{backend::CrosstermBackend, Terminal};
use tracing_subscriber::EnvFilter;

use steelcore::analytics::LoadSummary;
use steelcore::config::{Config, ConfigStore, FileConfigStore};
use steelcore::notify::TerminalNotifier;
use steelcore::runtime::{AppEvent, CrosstermEventSource, FixedTicker, Runner};
use steelcore::store::WorkoutStore;
use steelcore::timer::{IntervalTimer, Phase, Preset};
use steelcore::workout::{Intensity, NewWorkout, Workout};

/// The interval timer runs at 1-second granularity; one state transition
/// per tick, ticks never overlap.
const TICK_RATE_MS: u64 = 1000;

/// terminal training-load tracker with ACWR analytics and interval timer
#[derive(Parser, Debug)]
#[clap(
    version,
    about,
    long_about = "Log workouts, watch your acute:chronic workload ratio, and run round-based interval sessions that feed straight into the log."
)]
pub struct Cli {
    #[clap(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Log a workout without opening the dashboard
    Log {
        /// duration in minutes
        #[clap(short, long)]
        duration: f64,

        /// perceived intensity
        #[clap(short, long, value_enum, default_value = "moderate")]
        intensity: Intensity,

        /// calendar day (YYYY-MM-DD), defaults to today
        #[clap(long)]
        date: Option<NaiveDate>,
    },

    /// Print recent workouts
    History {
        /// number of records to show
        #[clap(short, long, default_value_t = 10)]
        limit: usize,
    },

    /// Print the current load summary
    Status,

    /// Export the full history as CSV
    Export {
        /// output file, stdout if omitted
        #[clap(short, long)]
        out: Option<PathBuf>,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub enum AppState {
    Dashboard,
    Timer,
    Entry,
    History,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntryField {
    Date,
    Duration,
    Intensity,
}

/// In-progress workout entry. Duration is kept as the raw typed string so
/// the form can render exactly what the user sees; validation happens at
/// save time and invalid input simply refuses to save.
#[derive(Debug, Clone)]
pub struct EntryForm {
    pub editing_id: Option<i64>,
    pub duration: String,
    pub intensity_idx: usize,
    pub days_back: u32,
    pub field: EntryField,
}

impl EntryForm {
    pub fn blank() -> Self {
        Self {
            editing_id: None,
            duration: String::new(),
            intensity_idx: 2, // Moderate
            days_back: 0,
            field: EntryField::Duration,
        }
    }

    /// Prefill from a completed timer session.
    pub fn prefilled(minutes: u32) -> Self {
        Self {
            duration: minutes.to_string(),
            ..Self::blank()
        }
    }

    pub fn editing(workout: &Workout, today: NaiveDate) -> Self {
        let duration = if workout.duration_min.fract() == 0.0 {
            format!("{}", workout.duration_min as u64)
        } else {
            format!("{}", workout.duration_min)
        };
        Self {
            editing_id: Some(workout.id),
            duration,
            intensity_idx: Intensity::ALL
                .iter()
                .position(|i| *i == workout.intensity)
                .unwrap_or(2),
            days_back: (today - workout.date).num_days().max(0) as u32,
            field: EntryField::Duration,
        }
    }

    pub fn intensity(&self) -> Intensity {
        Intensity::ALL[self.intensity_idx]
    }

    pub fn date(&self, today: NaiveDate) -> NaiveDate {
        today - Days::new(u64::from(self.days_back))
    }

    pub fn parsed_duration(&self) -> Option<f64> {
        self.duration
            .parse::<f64>()
            .ok()
            .filter(|d| d.is_finite() && *d > 0.0)
    }

    pub fn next_field(&mut self) {
        self.field = match self.field {
            EntryField::Duration => EntryField::Intensity,
            EntryField::Intensity => EntryField::Date,
            EntryField::Date => EntryField::Duration,
        };
    }

    pub fn push_duration_char(&mut self, c: char) {
        if self.duration.len() >= 5 {
            return;
        }
        if c.is_ascii_digit() || (c == '.' && !self.duration.contains('.')) {
            self.duration.push(c);
        }
    }

    pub fn cycle_intensity(&mut self, forward: bool) {
        let len = Intensity::ALL.len();
        self.intensity_idx = if forward {
            (self.intensity_idx + 1) % len
        } else {
            (self.intensity_idx + len - 1) % len
        };
    }

    /// Validated record, or None while the duration is not a positive
    /// number. The core never sees the invalid input.
    pub fn to_new_workout(&self, today: NaiveDate) -> Option<NewWorkout> {
        let duration = self.parsed_duration()?;
        Some(NewWorkout::new(self.date(today), duration, self.intensity()))
    }
}

#[derive(Debug)]
pub struct App {
    pub store: WorkoutStore,
    pub workouts: Vec<Workout>,
    pub timer: IntervalTimer,
    pub notifier: TerminalNotifier,
    pub config_store: FileConfigStore,
    pub state: AppState,
    pub entry: EntryForm,
    pub history_selected: usize,
    pub today: NaiveDate,
    pub should_quit: bool,
}

impl App {
    pub fn new(
        store: WorkoutStore,
        config_store: FileConfigStore,
        today: NaiveDate,
    ) -> Result<Self> {
        let preset = config_store.load().preset();
        let mut app = Self {
            store,
            workouts: Vec::new(),
            timer: IntervalTimer::new(preset),
            notifier: TerminalNotifier::new(),
            config_store,
            state: AppState::Dashboard,
            entry: EntryForm::blank(),
            history_selected: 0,
            today,
            should_quit: false,
        };
        app.refresh()?;
        Ok(app)
    }

    pub fn refresh(&mut self) -> Result<()> {
        self.workouts = self.store.query_all()?;
        if self.history_selected >= self.workouts.len() {
            self.history_selected = self.workouts.len().saturating_sub(1);
        }
        Ok(())
    }

    fn save_entry(&mut self) -> Result<bool> {
        let Some(fields) = self.entry.to_new_workout(self.today) else {
            return Ok(false);
        };
        match self.entry.editing_id {
            Some(id) => {
                self.store.update(id, &fields)?;
            }
            None => {
                self.store.add(&fields)?;
            }
        }
        self.refresh()?;
        Ok(true)
    }

    fn delete_selected(&mut self) -> Result<()> {
        if let Some(workout) = self.workouts.get(self.history_selected) {
            self.store.delete(workout.id)?;
            self.refresh()?;
        }
        Ok(())
    }

    /// Adjust the idle preset and remember it for next launch.
    fn adjust_preset(&mut self, work_delta: i64, rounds_delta: i64) {
        if self.timer.phase() != Phase::Idle {
            return;
        }
        let current = self.timer.preset();
        let minutes = (i64::from(current.work_secs / 60) + work_delta).max(0) as u32;
        let rounds = (i64::from(current.rounds) + rounds_delta).max(0) as u32;
        let preset = Preset::custom(minutes, rounds);
        if self.timer.set_preset(preset) {
            let _ = self.config_store.save(&Config::from(preset));
        }
    }

    pub fn on_tick(&mut self) {
        self.today = Local::now().date_naive();
        if self.timer.is_running() {
            self.timer.tick(&self.notifier);
        }
    }
}

pub fn handle_key(app: &mut App, key: KeyEvent) -> Result<()> {
    // ctrl+c quits from anywhere
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        app.should_quit = true;
        return Ok(());
    }

    match app.state {
        AppState::Dashboard => match key.code {
            KeyCode::Char('q') | KeyCode::Esc => app.should_quit = true,
            KeyCode::Char('t') => {
                app.notifier.clear();
                app.state = AppState::Timer;
            }
            KeyCode::Char('l') => {
                app.entry = EntryForm::blank();
                app.state = AppState::Entry;
            }
            KeyCode::Char('h') => {
                app.history_selected = 0;
                app.state = AppState::History;
            }
            _ => {}
        },
        AppState::Timer => match key.code {
            KeyCode::Esc => app.state = AppState::Dashboard,
            KeyCode::Char('s') => app.timer.start(&app.notifier),
            KeyCode::Char('r') => {
                app.timer.reset();
                app.notifier.clear();
            }
            KeyCode::Char('y') => {
                if let Some(handoff) = app.timer.handoff() {
                    app.entry = EntryForm::prefilled(handoff.suggested_minutes);
                    app.timer.reset();
                    app.notifier.clear();
                    app.state = AppState::Entry;
                }
            }
            KeyCode::Char('n') => {
                if app.timer.is_done() {
                    app.timer.reset();
                    app.notifier.clear();
                }
            }
            KeyCode::Char('+') | KeyCode::Char('=') => app.adjust_preset(1, 0),
            KeyCode::Char('-') => app.adjust_preset(-1, 0),
            KeyCode::Char(']') => app.adjust_preset(0, 1),
            KeyCode::Char('[') => app.adjust_preset(0, -1),
            _ => {}
        },
        AppState::Entry => match key.code {
            KeyCode::Esc => {
                app.state = if app.entry.editing_id.is_some() {
                    AppState::History
                } else {
                    AppState::Dashboard
                };
            }
            KeyCode::Tab => app.entry.next_field(),
            KeyCode::Enter => {
                if app.save_entry()? {
                    app.state = if app.entry.editing_id.is_some() {
                        AppState::History
                    } else {
                        AppState::Dashboard
                    };
                }
            }
            KeyCode::Backspace => {
                if app.entry.field == EntryField::Duration {
                    app.entry.duration.pop();
                }
            }
            KeyCode::Left => match app.entry.field {
                EntryField::Intensity => app.entry.cycle_intensity(false),
                EntryField::Date => {
                    app.entry.days_back = (app.entry.days_back + 1).min(365);
                }
                EntryField::Duration => {}
            },
            KeyCode::Right => match app.entry.field {
                EntryField::Intensity => app.entry.cycle_intensity(true),
                // Never past today: the form cannot produce future records
                EntryField::Date => {
                    app.entry.days_back = app.entry.days_back.saturating_sub(1);
                }
                EntryField::Duration => {}
            },
            KeyCode::Char(c) => {
                if app.entry.field == EntryField::Duration {
                    app.entry.push_duration_char(c);
                }
            }
            _ => {}
        },
        AppState::History => match key.code {
            KeyCode::Esc => app.state = AppState::Dashboard,
            KeyCode::Char('j') | KeyCode::Down => {
                if app.history_selected + 1 < app.workouts.len() {
                    app.history_selected += 1;
                }
            }
            KeyCode::Char('k') | KeyCode::Up => {
                app.history_selected = app.history_selected.saturating_sub(1);
            }
            KeyCode::Char('e') => {
                if let Some(workout) = app.workouts.get(app.history_selected) {
                    app.entry = EntryForm::editing(workout, app.today);
                    app.state = AppState::Entry;
                }
            }
            KeyCode::Char('d') => app.delete_selected()?,
            _ => {}
        },
    }

    Ok(())
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(io::stderr)
        .init();

    let cli = Cli::parse();
    match cli.command {
        Some(command) => run_command(command),
        None => run_tui(),
    }
}

fn run_command(command: Command) -> Result<()> {
    let store = WorkoutStore::open_default()?;
    let today = Local::now().date_naive();

    match command {
        Command::Log {
            duration,
            intensity,
            date,
        } => {
            if !duration.is_finite() || duration <= 0.0 {
                bail!("duration must be a positive number of minutes");
            }
            let workout = NewWorkout::new(date.unwrap_or(today), duration, intensity);
            store.add(&workout)?;
            println!(
                "logged {} min {} on {} (load {})",
                duration,
                intensity,
                workout.date.format("%Y-%m-%d"),
                workout.load()
            );
        }
        Command::History { limit } => {
            let workouts = store.query_all()?;
            if workouts.is_empty() {
                println!("no workouts logged yet");
            }
            for w in workouts.iter().take(limit) {
                println!(
                    "{}  {:>6} min  {:<10}  load {}",
                    w.date.format("%Y-%m-%d"),
                    w.duration_min,
                    w.intensity.to_string(),
                    w.load
                );
            }
        }
        Command::Status => {
            let workouts = store.query_all()?;
            let summary = LoadSummary::compute(&workouts, today);
            println!("acute {}", summary.acute);
            println!("chronic {}", summary.chronic);
            println!("ratio {:.2}", summary.ratio);
            match summary.trend {
                Some(trend) => println!("trend {trend}"),
                None => println!("trend —"),
            }
        }
        Command::Export { out } => {
            let workouts = store.query_all()?;
            let writer: Box<dyn Write> = match &out {
                Some(path) => Box::new(std::fs::File::create(path)?),
                None => Box::new(io::stdout()),
            };
            let mut csv_writer = csv::Writer::from_writer(writer);
            csv_writer.write_record(["date", "duration_min", "intensity", "load"])?;
            for w in &workouts {
                csv_writer.write_record([
                    w.date.format("%Y-%m-%d").to_string(),
                    w.duration_min.to_string(),
                    w.intensity.to_string(),
                    w.load.to_string(),
                ])?;
            }
            csv_writer.flush()?;
            if let Some(path) = out {
                println!("exported {} workouts to {}", workouts.len(), path.display());
            }
        }
    }

    Ok(())
}

fn run_tui() -> Result<()> {
    if !stdin().is_tty() {
        bail!("stdin must be a tty");
    }

    let store = WorkoutStore::open_default()?;
    let mut app = App::new(store, FileConfigStore::new(), Local::now().date_naive())?;

    enable_raw_mode()?;
    let mut stdout = io::stdout();
    execute!(stdout, EnterAlternateScreen)?;
    let backend = CrosstermBackend::new(stdout);
    let mut terminal = Terminal::new(backend)?;

    let result = start_tui(&mut terminal, &mut app);

    disable_raw_mode()?;
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;

    result
}

fn start_tui<B: ratatui::backend::Backend>(
    terminal: &mut Terminal<B>,
    app: &mut App,
) -> Result<()> {
    let runner = Runner::new(
        CrosstermEventSource::new(),
        FixedTicker::new(Duration::from_millis(TICK_RATE_MS)),
    );

    loop {
        terminal.draw(|f| ui::ui(app, f))?;

        match runner.step() {
            AppEvent::Tick => app.on_tick(),
            AppEvent::Resize => {}
            AppEvent::Key(key) => handle_key(app, key)?,
        }

        if app.should_quit {
            break;
        }
    }

    Ok(())
}

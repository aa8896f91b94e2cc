use chrono::Utc;
use clap::{Parser, Subcommand};
use hiit_core::*;
use std::io::{self, Write};
use std::path::PathBuf;
use std::process::ExitCode;
use std::time::Duration;

#[derive(Parser)]
#[command(name = "hiit")]
#[command(about = "Circuit workout runner for spreadsheet-backed plans", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Config file (defaults to $XDG_CONFIG_HOME/hiit/config.toml)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    /// Plan source: endpoint URL, JSON file or CSV export
    #[arg(long, global = true)]
    source: Option<String>,

    /// More logging (-v info, -vv debug)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    verbose: u8,
}

#[derive(Subcommand)]
enum Commands {
    /// List phases and days
    Days {
        /// Only this phase
        #[arg(long)]
        phase: Option<String>,
    },

    /// Show one day's exercises
    Show {
        /// Day name or number (Monday = 1)
        #[arg(long)]
        day: String,

        #[arg(long)]
        phase: Option<String>,
    },

    /// Run a workout
    Run {
        /// Day name or number (Monday = 1)
        #[arg(long)]
        day: String,

        #[arg(long)]
        phase: Option<String>,

        /// Number of circuits (defaults to session.default_circuits)
        #[arg(long)]
        circuits: Option<u32>,

        /// Auto-complete (for scripting) - confirm every set and skip every countdown
        #[arg(long)]
        auto_complete: bool,
    },

    /// Replace a day's exercises on the endpoint
    Push {
        #[arg(long)]
        day: String,

        /// JSON array of {type, name, details}
        #[arg(long)]
        file: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    hiit_core::logging::init_for_verbosity(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {}", e);
            ExitCode::FAILURE
        }
    }
}

fn run(cli: Cli) -> Result<()> {
    let config = match &cli.config {
        Some(path) => Config::load_from(path)?,
        None => Config::load()?,
    };
    let location = cli
        .source
        .clone()
        .or_else(|| config.source.endpoint.clone())
        .ok_or_else(|| {
            Error::Config("no plan source; pass --source or set source.endpoint".into())
        })?;
    let timeout = Duration::from_secs(config.source.timeout_seconds);
    tracing::debug!("Using plan source {}", location);

    match cli.command {
        Commands::Days { phase } => {
            let trainer = load_trainer(config, &location, timeout)?;
            cmd_days(&trainer, phase.as_deref())
        }
        Commands::Show { day, phase } => {
            let trainer = load_trainer(config, &location, timeout)?;
            cmd_show(&trainer, &parse_day(&day)?, phase.as_deref())
        }
        Commands::Run {
            day,
            phase,
            circuits,
            auto_complete,
        } => {
            let trainer = load_trainer(config, &location, timeout)?;
            cmd_run(&trainer, &parse_day(&day)?, phase.as_deref(), circuits, auto_complete)
        }
        Commands::Push { day, file } => cmd_push(config, &location, timeout, &parse_day(&day)?, &file),
    }
}

fn load_trainer(config: Config, location: &str, timeout: Duration) -> Result<Trainer> {
    let source = open_source(location, timeout)?;
    let mut trainer = Trainer::new(config);
    if let Err(e) = trainer.reload(source.as_ref()) {
        eprintln!("Failed to load workouts.");
        eprintln!("Please check the sheet link and format ({}).", source.describe());
        return Err(e);
    }
    Ok(trainer)
}

fn parse_day(raw: &str) -> Result<DayKey> {
    DayKey::parse(raw).ok_or_else(|| Error::Other("day must not be blank".into()))
}

fn day_label(day: &DayKey) -> String {
    match day.weekday_name() {
        Some(name) => format!("{} ({})", name, day),
        None => day.to_string(),
    }
}

fn cmd_days(trainer: &Trainer, only_phase: Option<&str>) -> Result<()> {
    let library = trainer.library()?;

    for phase in &library.phases {
        if only_phase.is_some() && phase.name.as_deref() != only_phase {
            continue;
        }
        println!("{}", phase.name.as_deref().unwrap_or("All days"));
        for (day, plan) in &phase.days {
            println!(
                "  {:<16} {} ({} exercises)",
                day_label(day),
                plan.title,
                plan.exercises.len()
            );
        }
    }

    Ok(())
}

fn cmd_show(trainer: &Trainer, day: &DayKey, phase: Option<&str>) -> Result<()> {
    let library = trainer.library()?;
    let phase = trainer.resolve_phase(phase)?;
    let plan = library.plan(phase, day).ok_or_else(|| Error::Unavailable {
        phase: phase.unwrap_or("(no phase)").to_string(),
        day: day.to_string(),
    })?;

    println!("{}", plan.title);
    let circuit = detect_circuit(&plan.exercises);
    if let Some(range) = circuit {
        println!("  Circuit: exercises {}-{}", range.start + 1, range.end + 1);
    }
    println!();

    let timed_enabled = trainer.config().features.timed_exercises;
    for (i, exercise) in plan.exercises.iter().enumerate() {
        let in_circuit = circuit.map(|r| r.contains(i)).unwrap_or(false);
        let drive = match drive_for(&exercise.details) {
            Drive::Timed(secs) if timed_enabled => format!("timed {}s", secs),
            _ => "reps".to_string(),
        };
        println!(
            "  {} {:>2}. [{}] {} | {} | {} set(s) | {}",
            if in_circuit { "*" } else { " " },
            i + 1,
            exercise.kind,
            exercise.name,
            exercise.details,
            exercise.sets,
            drive
        );
    }

    Ok(())
}

fn cmd_run(
    trainer: &Trainer,
    day: &DayKey,
    phase: Option<&str>,
    circuits: Option<u32>,
    auto_complete: bool,
) -> Result<()> {
    let mut session = trainer.start(phase, day, circuits)?;
    let sound = trainer.config().features.sound;

    display_preview(&session);
    if auto_complete {
        session.begin(Utc::now())?;
    } else {
        match prompt_user_action("Enter to start, 'q' + Enter to go back")? {
            UserAction::Back => {
                session.go_back();
                println!("Back to day selection.");
                return Ok(());
            }
            _ => {
                session.begin(Utc::now())?;
            }
        }
    }

    loop {
        match session.status() {
            SessionStatus::Completed | SessionStatus::Preview => break,
            SessionStatus::Resting => display_rest(&session),
            SessionStatus::Active => display_exercise(&session),
        }

        let action = if auto_complete {
            UserAction::Continue
        } else if session.status() == SessionStatus::Resting || session.timer().is_some() {
            prompt_user_action("Enter to start the countdown, 's' to skip, 'c N' for circuits, 'q' to go back")?
        } else {
            prompt_user_action("Enter when the set is done, 'c N' for circuits, 'q' to go back")?
        };

        let timer_running = session.timer().is_some();
        let event = match action {
            UserAction::Back => {
                session.go_back();
                println!("Back to day selection.");
                return Ok(());
            }
            UserAction::Circuits(n) => {
                match session.set_total_circuits(n) {
                    Ok(()) => println!("  Circuits set to {}", n),
                    Err(e) => eprintln!("  {}", e),
                }
                continue;
            }
            UserAction::Skip if session.timer().is_some() => session.skip(Utc::now()),
            UserAction::Continue if session.timer().is_some() => {
                if auto_complete {
                    session.skip(Utc::now())
                } else {
                    run_countdown(&mut session)
                }
            }
            UserAction::Skip | UserAction::Continue => session.complete_set(Utc::now()).map(Some),
        };

        match event {
            Ok(Some(event)) => {
                // countdown ended (expired or skipped), or the workout is done
                if sound && (timer_running || matches!(event, SessionEvent::Completed(_))) {
                    ring_bell()?;
                }
                display_event(&session, &event);
            }
            Ok(None) => {}
            Err(e @ Error::Progression(_)) => {
                eprintln!("Workout aborted: {}", e);
                session.go_back();
                println!("Back to day selection.");
                return Err(e);
            }
            Err(e) => return Err(e),
        }
    }

    if let Some(summary) = session.summary() {
        println!();
        println!("✓ Workout complete! {}", summary);
    }

    Ok(())
}

fn run_countdown(session: &mut WorkoutSession) -> Result<Option<SessionEvent>> {
    loop {
        std::thread::sleep(Duration::from_secs(1));
        let event = session.tick(Utc::now())?;
        if let Some(remaining) = session.timer_remaining() {
            print!("\r  {:>3}s ", remaining);
            io::stdout().flush()?;
        }
        if event.is_some() {
            println!();
            return Ok(event);
        }
    }
}

fn ring_bell() -> Result<()> {
    let mut stdout = io::stdout();
    stdout.write_all(b"\x07")?;
    stdout.flush()?;
    Ok(())
}

fn cmd_push(
    config: Config,
    location: &str,
    timeout: Duration,
    day: &DayKey,
    file: &std::path::Path,
) -> Result<()> {
    let exercises = read_edit_file(file)?;
    let trainer = Trainer::new(config);
    let sink = open_edit_sink(location, timeout)?;
    let message = trainer.save_day(&sink, day, &exercises)?;
    println!("✓ {}", message);
    Ok(())
}

fn display_preview(session: &WorkoutSession) {
    println!("\n╭─────────────────────────────────────────╮");
    println!("│  {}", session.title());
    println!("╰─────────────────────────────────────────╯");
    if let Some(phase) = session.phase() {
        println!("  {} / {}", phase, day_label(session.day()));
    }
    println!("  Circuits: {}", session.state().total_circuits);
    println!();

    for (exercise, mark) in session
        .state()
        .exercises()
        .iter()
        .zip(session.exercise_marks())
    {
        let symbol = match mark {
            ItemMark::Completed => "✓",
            ItemMark::Current => "▶",
            ItemMark::Upcoming => "·",
        };
        println!("  {} {} ({})", symbol, exercise.name, exercise.details);
    }
    println!();
}

fn circuit_dots(session: &WorkoutSession) -> String {
    session
        .circuit_marks()
        .iter()
        .map(|done| if *done { '●' } else { '○' })
        .collect()
}

fn display_exercise(session: &WorkoutSession) {
    let Some(exercise) = session.current_exercise() else {
        return;
    };
    let state = session.state();
    println!(
        "▶ Circuit {}/{} | {} | set {}/{} | {} | {:>3.0}% {}",
        state.circuit_number,
        state.total_circuits,
        exercise.name,
        state.set_number,
        exercise.sets,
        exercise.details,
        session.progress_fraction() * 100.0,
        circuit_dots(session)
    );
}

fn display_rest(session: &WorkoutSession) {
    let up_next = session
        .up_next()
        .map(|e| e.name.as_str())
        .unwrap_or("Finish");
    println!(
        "  Rest {}s, up next: {}",
        session.timer_remaining().unwrap_or(0),
        up_next
    );
}

fn display_event(session: &WorkoutSession, event: &SessionEvent) {
    if let SessionEvent::Advanced(Transition::NextCircuit { circuit, .. }) = event {
        println!(
            "↻ Circuit {} of {}",
            circuit,
            session.state().total_circuits
        );
    }
}

enum UserAction {
    Continue,
    Skip,
    Circuits(u32),
    Back,
}

fn prompt_user_action(hint: &str) -> Result<UserAction> {
    println!("  {}", hint);
    print!("> ");
    io::stdout().flush()?;

    let mut input = String::new();
    if io::stdin().read_line(&mut input)? == 0 {
        return Ok(UserAction::Back);
    }

    let input = input.trim().to_lowercase();
    let action = match input.as_str() {
        "s" => UserAction::Skip,
        "q" => UserAction::Back,
        other => match other.strip_prefix('c').map(str::trim).map(str::parse::<u32>) {
            Some(Ok(n)) => UserAction::Circuits(n),
            _ => UserAction::Continue,
        },
    };

    Ok(action)
}

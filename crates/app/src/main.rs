use std::{
    collections::BTreeMap,
    io::{BufRead, BufReader},
    path::{Path, PathBuf},
    sync::{
        atomic::{AtomicBool, Ordering},
        Arc,
    },
    thread,
    time::Duration,
};

use clap::{Parser, Subcommand};
use sensor_scope_core::{
    AppConfig, HostTick, ScopeConfig, ScopeController, ScopeError, ScopeView, Sensor,
    SeriesReader, TickOutcome, TracingAdapter,
};
use tracing_subscriber::EnvFilter;

const RENDER_PERIOD: Duration = Duration::from_millis(50);
const HOST_MAX_TIMESTEP_S: i64 = 3_600;

fn main() -> sensor_scope_core::Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Replay {
            config,
            ticks,
            output,
        } => run_replay(&config, &ticks, output.as_deref()),
        Commands::Simulate {
            duration,
            interval,
            sensors,
        } => run_simulate(duration, interval, sensors),
    }
}

fn run_replay(config: &Path, ticks: &Path, output: Option<&Path>) -> sensor_scope_core::Result<()> {
    tracing::info!(?config, ?ticks, "replaying recorded ticks");

    let config = AppConfig::load(config)?;
    let mut controller = ScopeController::build(config.scope, config.sensors)?;
    let mut schedule = controller.refresh_schedule();
    let mut view = ScopeView::new(controller.reader(), Sensor::label, TracingAdapter::new())?;

    let mut parameters = BTreeMap::new();
    parameters.insert(
        "ticks".to_string(),
        serde_json::Value::String(ticks.display().to_string()),
    );
    controller.initialise_simulation(&parameters);

    let reader = BufReader::new(std::fs::File::open(ticks)?);
    let mut recorded = 0_usize;
    for (number, line) in reader.lines().enumerate() {
        let line = line?;
        if line.trim().is_empty() {
            continue;
        }
        let tick: HostTick = serde_json::from_str(&line)
            .map_err(|err| ScopeError::msg(format!("line {}: {err}", number + 1)))?;
        if controller.control(&tick)? == TickOutcome::Recorded {
            recorded += 1;
        }
        if schedule.is_due(tick.simulation_time) {
            view.refresh()?;
        }
    }
    view.refresh()?;

    let snapshot = controller.reader().snapshot()?;
    tracing::info!(recorded, points = snapshot.timestamps.len(), "replay finished");

    let json = serde_json::to_string_pretty(&snapshot)?;
    match output {
        Some(path) => std::fs::write(path, json)?,
        None => println!("{json}"),
    }
    Ok(())
}

fn run_simulate(
    duration: i64,
    interval: Option<i64>,
    sensor_count: usize,
) -> sensor_scope_core::Result<()> {
    let config = match interval {
        Some(seconds) => ScopeConfig::averaged(seconds),
        None => ScopeConfig::default(),
    };
    let sensors = (0..sensor_count)
        .map(|index| Sensor::new(format!("Sensor {}", index + 1), "°C"))
        .collect();

    let mut controller = ScopeController::build(config, sensors)?;
    controller.initialise_simulation(&BTreeMap::new());
    let max_step = controller.fixed_timestep(HOST_MAX_TIMESTEP_S);
    tracing::info!(duration, max_step, mode = %controller.resampling_mode(), "starting simulation");

    let done = Arc::new(AtomicBool::new(false));
    let renderer = spawn_renderer(controller.reader(), done.clone());

    let mut time = 0;
    let mut step_index = 0_usize;
    while time < duration {
        time = next_simulation_time(time, step_index, max_step).min(duration);
        step_index += 1;
        let values = (0..sensor_count)
            .map(|index| synthetic_reading(time, index))
            .collect();
        controller.control(&HostTick::new(time, values))?;
    }
    done.store(true, Ordering::Release);

    let refreshes = renderer
        .join()
        .map_err(|_| ScopeError::msg("renderer thread panicked"))??;

    let points = controller.reader().len()?;
    tracing::info!(steps = step_index, points, refreshes, "simulation finished");
    if let Some((timestamp, values)) = controller.reader().latest()? {
        println!("last point at {timestamp} s: {values:?}");
    }
    println!("{step_index} simulation steps, {points} scope points");
    Ok(())
}

fn spawn_renderer(
    reader: SeriesReader<Sensor>,
    done: Arc<AtomicBool>,
) -> thread::JoinHandle<sensor_scope_core::Result<usize>> {
    thread::spawn(move || {
        let mut view = ScopeView::new(reader, Sensor::label, TracingAdapter::new())?;
        while !done.load(Ordering::Acquire) {
            view.refresh()?;
            thread::sleep(RENDER_PERIOD);
        }
        view.refresh()?;
        Ok(view.adapter().draws())
    })
}

/// Irregular host step sizes, clipped so the host never jumps past a scope
/// interval boundary.
fn next_simulation_time(time: i64, step_index: usize, max_step: i64) -> i64 {
    const STEPS: [i64; 5] = [60, 240, 90, 600, 30];
    let step = STEPS[step_index % STEPS.len()].min(max_step);
    let boundary = (time / max_step + 1) * max_step;
    (time + step).min(boundary)
}

fn synthetic_reading(time: i64, index: usize) -> f32 {
    let phase = time as f32 / 86_400.0 * std::f32::consts::TAU;
    20.0 + 5.0 * (index as f32 + 1.0) * (phase + index as f32).sin()
}

fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();
}

#[derive(Parser, Debug)]
#[command(author, version, about = "Time-weighted sensor scope for simulation runs", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Replay a JSON-lines tick recording and write the resulting series.
    Replay {
        /// JSON file with the scope settings and sensor list.
        #[arg(short, long)]
        config: PathBuf,
        /// JSON-lines file with one host tick per line.
        #[arg(short, long)]
        ticks: PathBuf,
        /// Where to write the series snapshot. Defaults to stdout.
        #[arg(short, long)]
        output: Option<PathBuf>,
    },
    /// Run a synthetic simulation with irregular steps and a live renderer.
    Simulate {
        /// Simulated duration in seconds.
        #[arg(short, long, default_value_t = 86_400)]
        duration: i64,
        /// Average into fixed intervals of this many seconds.
        #[arg(short, long)]
        interval: Option<i64>,
        /// Number of synthetic sensors.
        #[arg(short, long, default_value_t = 3)]
        sensors: usize,
    },
}

use std::fs;
use std::path::PathBuf;
use std::process::ExitCode;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use saber_accel::config::AppConfig;
use saber_accel::engine::backend::DEFAULT_SAMPLE_PERIOD_MS;
use saber_accel::settings::{InMemorySettings, JsonFileSettings, SettingsStore};
use saber_accel::{AccelerometerProcessor, ProcessorBuilder, SyntheticSensor, Vector3};
use serde::{Deserialize, Serialize};
use tracing_subscriber::filter::LevelFilter;

#[derive(Parser, Debug)]
#[command(
    name = "accel_replay",
    about = "Deterministic replay harness for the accelerometer pipeline"
)]
struct Cli {
    /// Log verbosity on stderr (-v info, -vv debug)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Feed a JSON-lines sample file through the pipeline and print every reading
    Replay {
        #[arg(long)]
        input: PathBuf,
        /// Persist calibration offsets to this JSON file (in-memory otherwise)
        #[arg(long)]
        settings: Option<PathBuf>,
        /// Pipeline configuration (defaults when omitted)
        #[arg(long)]
        config: Option<PathBuf>,
        /// Attempt X|Y calibration after the stream
        #[arg(long)]
        calibrate: bool,
    },
    /// Emit a resting sample stream as JSON lines, optionally with a shake burst
    Synth {
        #[arg(long, default_value_t = 100)]
        samples: usize,
        /// Uniform noise amplitude in g
        #[arg(long, default_value_t = 0.01)]
        noise: f64,
        /// Sample index at which to inject a shake burst
        #[arg(long)]
        shake_at: Option<usize>,
        #[arg(long, default_value_t = 0)]
        seed: u64,
    },
}

/// One line of a replay file
#[derive(Debug, Serialize, Deserialize)]
struct SampleLine {
    timestamp_ms: u64,
    x: f64,
    y: f64,
    z: f64,
}

#[derive(Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
enum ReplayEvent {
    Shake {
        timestamp_ms: u64,
    },
    Calibration {
        accepted: bool,
        stable: bool,
        offset: Vector3,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose);

    match run(cli.command) {
        Ok(code) => code,
        Err(err) => {
            eprintln!("Error: {err:?}");
            ExitCode::from(1)
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::WARN,
        1 => LevelFilter::INFO,
        _ => LevelFilter::DEBUG,
    };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();
}

fn run(command: Commands) -> Result<ExitCode> {
    match command {
        Commands::Replay {
            input,
            settings,
            config,
            calibrate,
        } => run_replay(input, settings, config, calibrate),
        Commands::Synth {
            samples,
            noise,
            shake_at,
            seed,
        } => run_synth(samples, noise, shake_at, seed),
    }
}

fn build_processor(
    sensor: Arc<SyntheticSensor>,
    settings_path: Option<PathBuf>,
    config_path: Option<PathBuf>,
) -> Result<AccelerometerProcessor> {
    let settings: Arc<dyn SettingsStore> = match settings_path {
        Some(path) => Arc::new(
            JsonFileSettings::open(&path)
                .with_context(|| format!("opening settings {}", path.display()))?,
        ),
        None => Arc::new(InMemorySettings::new()),
    };
    let config = config_path
        .map(AppConfig::load_from_file)
        .unwrap_or_default();

    let processor = ProcessorBuilder::new()
        .sensor(sensor)
        .settings(settings)
        .config(config)
        .build()?;
    Ok(processor)
}

fn run_replay(
    input: PathBuf,
    settings: Option<PathBuf>,
    config: Option<PathBuf>,
    calibrate: bool,
) -> Result<ExitCode> {
    let contents =
        fs::read_to_string(&input).with_context(|| format!("reading {}", input.display()))?;
    let samples = contents
        .lines()
        .enumerate()
        .filter(|(_, line)| !line.trim().is_empty())
        .map(|(index, line)| {
            serde_json::from_str::<SampleLine>(line)
                .with_context(|| format!("{}:{}: invalid sample", input.display(), index + 1))
        })
        .collect::<Result<Vec<_>>>()?;

    let sensor = Arc::new(SyntheticSensor::new());
    let processor = build_processor(sensor.clone(), settings, config)?;

    // Readings are published before the shake they trigger
    let last_timestamp = Arc::new(AtomicU64::new(0));
    let latest = Arc::clone(&last_timestamp);
    processor.on_reading(move |reading| {
        latest.store(reading.timestamp_ms, Ordering::SeqCst);
        if let Ok(json) = serde_json::to_string(reading.as_ref()) {
            println!("{json}");
        }
    });
    let latest = Arc::clone(&last_timestamp);
    processor.on_shake(move || {
        let event = ReplayEvent::Shake {
            timestamp_ms: latest.load(Ordering::SeqCst),
        };
        if let Ok(json) = serde_json::to_string(&event) {
            println!("{json}");
        }
    });

    processor.start()?;
    for sample in &samples {
        sensor.push_at(Vector3::new(sample.x, sample.y, sample.z), sample.timestamp_ms);
    }

    if calibrate {
        let accepted = processor.calibrate_xy();
        let event = ReplayEvent::Calibration {
            accepted,
            stable: processor.is_device_stable(),
            offset: processor.calibration_offset(),
        };
        println!("{}", serde_json::to_string(&event)?);
    }

    processor.stop()?;
    tracing::info!(samples = samples.len(), "replay finished");
    Ok(ExitCode::from(0))
}

fn run_synth(samples: usize, noise: f64, shake_at: Option<usize>, seed: u64) -> Result<ExitCode> {
    if !(noise >= 0.0 && noise.is_finite()) {
        bail!("noise must be a finite non-negative amplitude, got {noise}");
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let jitter = |rng: &mut StdRng| {
        if noise > 0.0 {
            rng.gen_range(-noise..=noise)
        } else {
            0.0
        }
    };

    // Alternating swings, each delta well above the default shake threshold
    let burst = [
        Vector3::new(0.9, 0.9, -1.0),
        Vector3::new(-0.9, -0.9, -1.0),
        Vector3::new(0.9, 0.9, -1.0),
        Vector3::new(-0.9, -0.9, -1.0),
    ];

    for index in 0..samples {
        let base = match shake_at {
            Some(start) if index >= start && index - start < burst.len() => burst[index - start],
            _ => Vector3::new(0.0, 0.0, -1.0),
        };
        let line = SampleLine {
            timestamp_ms: index as u64 * DEFAULT_SAMPLE_PERIOD_MS,
            x: base.x + jitter(&mut rng),
            y: base.y + jitter(&mut rng),
            z: base.z + jitter(&mut rng),
        };
        println!("{}", serde_json::to_string(&line)?);
    }

    Ok(ExitCode::from(0))
}

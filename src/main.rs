use clap::Parser;
use embedded_hal::delay::DelayNs;
use sensor_bringup::config::{Config, ConfigLoader, LogFormat, LoggingConfig};
use sensor_bringup::{
    AppError, AssertionCollector, DeviceConnection, InitPolicy, InitializationSuite, MockSensor,
    RecordingDelay, Scenario, StdDelay,
};
use std::path::PathBuf;
use std::process::ExitCode;
use tracing_subscriber::EnvFilter;

// Command-line arguments
#[derive(Parser, Debug)]
#[command(
    version,
    about = "Runs the sensor initialization suite against a simulated sensor.",
    long_about = "Drives the bounded-retry initialization sequence through its pass, fail and timing scenarios without hardware, and exits non-zero if any assertion fails."
)]
struct Args {
    /// Configuration file. Defaults to the standard resolution order.
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Simulate a sensor that never answers the handshake.
    #[arg(long)]
    no_sensor: bool,

    /// Block for the real settle and retry delays instead of recording them.
    #[arg(long)]
    real_delays: bool,

    /// Run only the named scenario (repeatable).
    #[arg(long = "only", value_name = "SCENARIO", value_parser = parse_scenario)]
    only: Vec<Scenario>,

    /// Print the assertion report as JSON on stdout.
    #[arg(long)]
    json: bool,
}

fn parse_scenario(name: &str) -> Result<Scenario, String> {
    Scenario::ALL
        .into_iter()
        .find(|s| s.name() == name)
        .ok_or_else(|| {
            let known: Vec<_> = Scenario::ALL.iter().map(Scenario::name).collect();
            format!("unknown scenario '{name}', expected one of: {}", known.join(", "))
        })
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {e}");
            ExitCode::from(e.exit_code() as u8)
        }
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let mut config = match args.config {
        Some(path) => ConfigLoader::load_from(path)?.into_config(),
        None => ConfigLoader::load()?.into_config(),
    };
    if args.no_sensor {
        config.suite.sensor_present = false;
    }
    if args.real_delays {
        config.suite.real_delays = true;
    }

    init_logging(&config.logging)?;
    tracing::info!("sensor-bringup v{}", env!("CARGO_PKG_VERSION"));

    let policy = config.policy.to_policy()?;
    let collector = if config.suite.real_delays {
        run_suite(&config, policy, &args.only, || StdDelay)
    } else {
        run_suite(&config, policy, &args.only, RecordingDelay::new)
    };

    let summary = collector.summary();
    if args.json {
        println!("{}", serde_json::to_string_pretty(&collector)?);
    } else {
        println!("Test Results: {summary}");
        println!("All tests passed: {}", if collector.all_passed() { "YES" } else { "NO" });
    }

    if collector.all_passed() {
        Ok(())
    } else {
        Err(AppError::SuiteFailed(summary))
    }
}

fn run_suite<D, W>(
    config: &Config,
    policy: InitPolicy,
    only: &[Scenario],
    make_delay: W,
) -> AssertionCollector
where
    D: DelayNs,
    W: Fn() -> D,
{
    let present = config.suite.sensor_present;
    let factory = || {
        let sensor = if present {
            MockSensor::responsive()
        } else {
            MockSensor::absent()
        };
        DeviceConnection::with_policy(sensor, make_delay(), policy)
    };

    let mut suite = InitializationSuite::with_lines(factory, config.suite.lines());
    let mut collector = AssertionCollector::new();
    if only.is_empty() {
        suite.run_all(&mut collector);
    } else {
        for scenario in only {
            suite.run(*scenario, &mut collector);
        }
    }
    collector
}

fn init_logging(logging: &LoggingConfig) -> Result<(), AppError> {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&logging.level))
        .map_err(|e| AppError::Logging(e.to_string()))?;

    // Logs go to stderr so a JSON report on stdout stays parseable.
    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    let installed = match logging.format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.pretty().try_init(),
        LogFormat::Compact => builder.compact().try_init(),
    };
    installed.map_err(|e| AppError::Logging(e.to_string()))
}

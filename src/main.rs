use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use tokio::io::{AsyncBufReadExt, BufReader};

use crashguard::alerts::LogAlerts;
use crashguard::dispatch::{LogReporter, LogTransport};
use crashguard::profile::SharedProfile;
use crashguard::sensor::{AccelerationSample, ChannelSensor, UnavailableSensor};
use crashguard::storage::SettingsStorage;
use crashguard::{CrashGuard, Services};
use escalation_core::format_remaining;

const APP_NAME: &str = "crashguard";

#[derive(Parser, Debug)]
#[command(name = APP_NAME, about = "Crash detection countdown demo")]
struct Args {
    /// Directory holding settings.toml and profile.toml
    #[arg(long, default_value = ".crashguard")]
    data_dir: PathBuf,

    /// Impact threshold, overriding the stored setting
    #[arg(long)]
    threshold: Option<f64>,

    /// Run without the motion sensor
    #[arg(long)]
    manual_only: bool,
}

#[derive(Debug, PartialEq)]
enum Command {
    Toggle,
    Sample(AccelerationSample),
    Print,
    Quit,
}

/// Parse one line of stdin input
fn parse_command(line: &str) -> Option<Command> {
    let mut parts = line.split_whitespace();
    let cmd = parts.next()?;
    match cmd {
        "s" => Some(Command::Toggle),
        "p" => Some(Command::Print),
        "q" => Some(Command::Quit),
        "a" => {
            let axes: Vec<f64> = parts.map(|p| p.parse().ok()).collect::<Option<_>>()?;
            match axes.as_slice() {
                [x, y, z] => Some(Command::Sample(AccelerationSample::new(*x, *y, *z))),
                _ => None,
            }
        }
        _ => None,
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> anyhow::Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    let args = Args::parse();

    let storage = SettingsStorage::new(&args.data_dir);
    let mut settings = storage.load_settings();
    settings
        .apply_env_vars()
        .context("invalid environment override")?;
    if let Some(threshold) = args.threshold {
        settings.tilt_threshold = threshold;
    }
    settings.validate().context("invalid settings")?;

    let profile = storage.load_profile();
    if profile.is_none() {
        log::warn!(
            "No profile in {}; alerts will carry no medical details",
            storage.dir().display()
        );
    }

    let services = Services {
        audio: Arc::new(LogAlerts),
        haptics: Arc::new(LogAlerts),
        transport: Arc::new(LogTransport),
        reporter: Arc::new(LogReporter),
        profiles: Arc::new(SharedProfile::new(profile)),
    };
    let mut guard = CrashGuard::new(&settings, services);

    let sensor = ChannelSensor::new(64);
    let mode = if args.manual_only {
        guard.start(&UnavailableSensor::new("disabled by --manual-only"))
    } else {
        guard.start(&sensor)
    };
    log::info!("{} ready ({:?}); commands: s, a X Y Z, p, q", APP_NAME, mode);

    let mut state_rx = guard.state();
    let printer = tokio::spawn(async move {
        while state_rx.changed().await.is_ok() {
            let state = *state_rx.borrow_and_update();
            match state.prompt() {
                Some(prompt) => log::info!("{}", prompt),
                None => log::info!("Countdown {:?}", state.phase),
            }
        }
    });

    let mut lines = BufReader::new(tokio::io::stdin()).lines();
    while let Some(line) = lines.next_line().await.context("reading stdin")? {
        match parse_command(&line) {
            Some(Command::Toggle) => {
                guard.manual_toggle().await;
            }
            Some(Command::Sample(sample)) => {
                if !sensor.push(sample) {
                    log::warn!("Sample dropped: no sensor subscriber");
                }
            }
            Some(Command::Print) => {
                let state = guard.controller().snapshot();
                println!("{:?} {}", state.phase, format_remaining(state.remaining));
            }
            Some(Command::Quit) => break,
            None if line.trim().is_empty() => {}
            None => log::error!("unknown command: {:?}", line),
        }
    }

    guard.shutdown().await;
    printer.abort();
    Ok(())
}

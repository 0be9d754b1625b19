use std::sync::Arc;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tokio::io::BufReader;

use cyclewake::{
    appsettings::{AppSettings, DEFAULT_SETTINGS_FILE},
    audio::AudioCatalog,
    notification::LogNotifier,
    registry::AlarmRegistry,
    scheduling::{AlarmScheduler, AlarmState},
    shell::{self, Shell},
    time_of_day::TimeOfDay,
};

#[derive(Parser, Debug)]
#[command(
    name = "cyclewake",
    version,
    about = "Wake-up times aligned to sleep cycles, and an alarm to match"
)]
struct Cli {
    /// Settings file name, without extension.
    #[arg(long, default_value = DEFAULT_SETTINGS_FILE)]
    config: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Propose wake-up times for a bedtime (HH:MM).
    Plan { bedtime: String },
    /// Arm the alarm for HH:MM and wait for it. Ctrl-C cancels.
    Arm { time: String },
    /// Read commands from stdin.
    Shell,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenvy::dotenv().ok();
    pretty_env_logger::formatted_builder()
        .filter_level(log::LevelFilter::Info)
        .parse_default_env()
        .init();

    let cli = Cli::parse();
    let settings = AppSettings::load(&cli.config)
        .with_context(|| format!("Failed to load settings {}", cli.config))?;
    let sleep_cycle = settings.sleep_cycle()?;

    if let Command::Plan { bedtime } = &cli.command {
        let bedtime = TimeOfDay::parse(bedtime)?;
        println!("Ideal wake-up times for bedtime {bedtime}:");
        for candidate in sleep_cycle.candidates(bedtime) {
            println!("  {} ({} cycles)", candidate.time, candidate.cycles);
        }
        return Ok(());
    }

    let scheduler = Arc::new(AlarmScheduler::new(
        Arc::new(settings.clock()?),
        Arc::new(LogNotifier),
        settings.scheduler_settings()?,
    ));
    let audio = Arc::new(settings.audio.clone());

    match cli.command {
        Command::Arm { time } => arm_and_wait(&scheduler, &audio, &time).await?,
        Command::Shell => {
            log::info!("Starting shell, type `help` for commands");
            let shell = Shell::new(
                Arc::clone(&scheduler),
                AlarmRegistry::new(),
                sleep_cycle,
                audio,
            );
            shell.run(BufReader::new(tokio::io::stdin())).await?;
        }
        Command::Plan { .. } => {}
    }

    scheduler.shutdown().await;
    Ok(())
}

async fn arm_and_wait(
    scheduler: &AlarmScheduler,
    audio: &AudioCatalog,
    time: &str,
) -> anyhow::Result<()> {
    let time = TimeOfDay::parse(time)?;
    let mut status = scheduler.subscribe();
    let alarm = scheduler.arm_now(time).await?;
    println!("{}", shell::describe_armed(&alarm, audio));

    tokio::select! {
        result = status.wait_for(|state| *state == AlarmState::Idle) => {
            result.context("Scheduler stopped unexpectedly")?;
        }
        _ = tokio::signal::ctrl_c() => {
            match scheduler.cancel().await {
                Some(alarm) => println!("Alarm for {} cancelled.", alarm.time),
                None => println!("Alarm is already ringing, nothing to cancel."),
            }
        }
    }

    Ok(())
}

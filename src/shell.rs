use std::{fmt::Write as _, str::FromStr, sync::Arc};

use anyhow::{Context, bail};
use tokio::io::{AsyncBufRead, AsyncBufReadExt};

use crate::{
    audio::AudioSelector,
    cycle::SleepCycle,
    registry::AlarmRegistry,
    scheduling::{AlarmScheduler, ArmedAlarm},
    time_of_day::TimeOfDay,
};

const HELP: &str = "\
Commands:
  plan HH:MM                 propose wake-up times for a bedtime
  arm HH:MM                  arm the alarm
  cancel                     cancel the armed alarm
  status                     show the alarm state
  alarm add HH:MM            add an alarm to the list
  alarm rm N                 remove the alarm at position N
  alarm list                 list alarms
  event add YYYY-MM-DD TITLE add an event
  event rm N                 remove the event at position N
  event list                 list events
  quit";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ShellCommand {
    Plan(String),
    Arm(String),
    Cancel,
    Status,
    AddAlarm(String),
    RemoveAlarm(usize),
    ListAlarms,
    AddEvent { date: String, title: String },
    RemoveEvent(usize),
    ListEvents,
    Help,
    Quit,
}

fn split_word(input: &str) -> (&str, &str) {
    let input = input.trim();
    input
        .split_once(char::is_whitespace)
        .map_or((input, ""), |(word, rest)| (word, rest.trim()))
}

fn required<'a>(value: &'a str, what: &str) -> anyhow::Result<&'a str> {
    if value.is_empty() {
        bail!("Missing {what}");
    }
    Ok(value)
}

fn position(value: &str) -> anyhow::Result<usize> {
    required(value, "position")?
        .parse()
        .with_context(|| format!("Expected a position, got {value:?}"))
}

impl FromStr for ShellCommand {
    type Err = anyhow::Error;

    fn from_str(line: &str) -> Result<Self, Self::Err> {
        let (command, rest) = split_word(line);
        let command = match command {
            "plan" => ShellCommand::Plan(required(rest, "bedtime")?.to_owned()),
            "arm" => ShellCommand::Arm(required(rest, "alarm time")?.to_owned()),
            "cancel" => ShellCommand::Cancel,
            "status" => ShellCommand::Status,
            "alarm" => match split_word(rest) {
                ("add", time) => ShellCommand::AddAlarm(required(time, "alarm time")?.to_owned()),
                ("rm", index) => ShellCommand::RemoveAlarm(position(index)?),
                ("list" | "", _) => ShellCommand::ListAlarms,
                (other, _) => bail!("Unknown alarm command {other:?}"),
            },
            "event" => match split_word(rest) {
                ("add", args) => {
                    let (date, title) = split_word(args);
                    ShellCommand::AddEvent {
                        date: required(date, "event date")?.to_owned(),
                        title: required(title, "event title")?.to_owned(),
                    }
                }
                ("rm", index) => ShellCommand::RemoveEvent(position(index)?),
                ("list" | "", _) => ShellCommand::ListEvents,
                (other, _) => bail!("Unknown event command {other:?}"),
            },
            "help" | "?" => ShellCommand::Help,
            "quit" | "exit" => ShellCommand::Quit,
            other => bail!("Unknown command {other:?}, try `help`"),
        };

        Ok(command)
    }
}

/// Line oriented front end over one scheduler and one registry. Arming returns
/// right away, the alarm fires in the background while the shell keeps reading.
pub struct Shell {
    scheduler: Arc<AlarmScheduler>,
    registry: AlarmRegistry,
    sleep_cycle: SleepCycle,
    audio: Arc<dyn AudioSelector>,
}

impl Shell {
    pub fn new(
        scheduler: Arc<AlarmScheduler>,
        registry: AlarmRegistry,
        sleep_cycle: SleepCycle,
        audio: Arc<dyn AudioSelector>,
    ) -> Self {
        Self {
            scheduler,
            registry,
            sleep_cycle,
            audio,
        }
    }

    pub async fn run(&self, input: impl AsyncBufRead + Unpin) -> anyhow::Result<()> {
        let mut lines = input.lines();
        while let Some(line) = lines.next_line().await? {
            if line.trim().is_empty() {
                continue;
            }

            let result = match line.parse::<ShellCommand>() {
                Ok(ShellCommand::Quit) => break,
                Ok(command) => self.execute(command).await,
                Err(error) => Err(error),
            };

            match result {
                Ok(output) => println!("{output}"),
                Err(error) => println!("error: {error:#}"),
            }
        }

        Ok(())
    }

    pub async fn execute(&self, command: ShellCommand) -> anyhow::Result<String> {
        let output = match command {
            ShellCommand::Plan(bedtime) => {
                let bedtime = TimeOfDay::parse(&bedtime)?;
                let mut output = format!("Ideal wake-up times for bedtime {bedtime}:");
                for candidate in self.sleep_cycle.candidates(bedtime) {
                    write!(output, "\n  {} ({} cycles)", candidate.time, candidate.cycles)?;
                }
                output
            }
            ShellCommand::Arm(time) => {
                let time = TimeOfDay::parse(&time)?;
                let alarm = self.scheduler.arm_now(time).await?;
                describe_armed(&alarm, self.audio.as_ref())
            }
            ShellCommand::Cancel => match self.scheduler.cancel().await {
                Some(alarm) => format!("Alarm for {} cancelled.", alarm.time),
                None => "No alarm is armed.".to_owned(),
            },
            ShellCommand::Status => {
                let state = self.scheduler.state().await;
                match self.scheduler.current().await {
                    Some(alarm) => format!(
                        "{state:?}: {}",
                        alarm.target.format("%Y-%m-%d %H:%M")
                    ),
                    None => format!("{state:?}"),
                }
            }
            ShellCommand::AddAlarm(time) => {
                let entry = self.registry.add_alarm_str(&time).await?;
                format!("Alarm {} added.", entry.time)
            }
            ShellCommand::RemoveAlarm(index) => {
                let entry = self.registry.remove_alarm_at(index).await?;
                format!("Alarm {} removed.", entry.time)
            }
            ShellCommand::ListAlarms => {
                let alarms = self.registry.alarms().await;
                if alarms.is_empty() {
                    "No alarms.".to_owned()
                } else {
                    alarms
                        .iter()
                        .enumerate()
                        .map(|(index, entry)| format!("{index}: {}", entry.time))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ShellCommand::AddEvent { date, title } => {
                let entry = self.registry.add_event_str(&title, &date).await?;
                format!("Event '{}' set for {}.", entry.title, entry.date)
            }
            ShellCommand::RemoveEvent(index) => {
                let entry = self.registry.remove_event_at(index).await?;
                format!("Event '{}' removed.", entry.title)
            }
            ShellCommand::ListEvents => {
                let events = self.registry.events().await;
                if events.is_empty() {
                    "No events.".to_owned()
                } else {
                    events
                        .iter()
                        .enumerate()
                        .map(|(index, entry)| format!("{index}: {} {}", entry.date, entry.title))
                        .collect::<Vec<_>>()
                        .join("\n")
                }
            }
            ShellCommand::Help | ShellCommand::Quit => HELP.to_owned(),
        };

        Ok(output)
    }
}

pub fn describe_armed(alarm: &ArmedAlarm, audio: &dyn AudioSelector) -> String {
    let remaining = alarm.remaining();
    format!(
        "Alarm set for {}.\nTime remaining to sleep: {} hours {} minutes ({} sleep, audio {}).",
        alarm.target.format("%Y-%m-%d %H:%M"),
        remaining.num_hours(),
        remaining.num_minutes() % 60,
        alarm.category,
        audio.select(alarm.category)
    )
}

use chrono::NaiveDate;
use tokio::sync::RwLock;

use crate::{error::AlarmError, time_of_day::TimeOfDay};

pub type EntryId = u64;

const DATE_FORMAT: &str = "YYYY-MM-DD";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AlarmEntry {
    pub id: EntryId,
    pub time: TimeOfDay,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EventEntry {
    pub id: EntryId,
    pub title: String,
    pub date: NaiveDate,
}

trait Entry: Clone {
    fn id(&self) -> EntryId;
}

impl Entry for AlarmEntry {
    fn id(&self) -> EntryId {
        self.id
    }
}

impl Entry for EventEntry {
    fn id(&self) -> EntryId {
        self.id
    }
}

struct Entries<T> {
    next_id: EntryId,
    items: Vec<T>,
}

impl<T: Entry> Entries<T> {
    fn new() -> Self {
        Self {
            next_id: 0,
            items: Vec::new(),
        }
    }

    fn push_with(&mut self, create: impl FnOnce(EntryId) -> T) -> T {
        let entry = create(self.next_id);
        self.next_id += 1;
        self.items.push(entry.clone());
        entry
    }

    fn remove_at(&mut self, index: usize) -> Result<T, AlarmError> {
        let len = self.items.len();
        if index >= len {
            return Err(AlarmError::IndexOutOfRange { index, len });
        }
        Ok(self.items.remove(index))
    }

    fn remove_by_id(&mut self, id: EntryId) -> Result<T, AlarmError> {
        let index = self
            .items
            .iter()
            .position(|entry| entry.id() == id)
            .ok_or(AlarmError::UnknownEntry(id))?;
        Ok(self.items.remove(index))
    }
}

/// User-declared alarms and events, kept in insertion order. Pure bookkeeping for
/// presentation, nothing here is scheduled.
///
/// Positions in the returned snapshots are the indices accepted by `remove_*_at`;
/// removing an entry shifts later ones down. Entry ids stay stable for the life of
/// the registry.
pub struct AlarmRegistry {
    alarms: RwLock<Entries<AlarmEntry>>,
    events: RwLock<Entries<EventEntry>>,
}

impl AlarmRegistry {
    pub fn new() -> Self {
        Self {
            alarms: RwLock::new(Entries::new()),
            events: RwLock::new(Entries::new()),
        }
    }

    pub async fn add_alarm(&self, time: TimeOfDay) -> AlarmEntry {
        let entry = self
            .alarms
            .write()
            .await
            .push_with(|id| AlarmEntry { id, time });
        log::info!("Added alarm entry. [entry_id = {}, time = {}]", entry.id, time);
        entry
    }

    pub async fn add_alarm_str(&self, time: &str) -> Result<AlarmEntry, AlarmError> {
        let time = TimeOfDay::parse(time)?;
        Ok(self.add_alarm(time).await)
    }

    pub async fn remove_alarm_at(&self, index: usize) -> Result<AlarmEntry, AlarmError> {
        self.alarms.write().await.remove_at(index)
    }

    pub async fn remove_alarm_by_id(&self, id: EntryId) -> Result<AlarmEntry, AlarmError> {
        self.alarms.write().await.remove_by_id(id)
    }

    pub async fn alarms(&self) -> Vec<AlarmEntry> {
        self.alarms.read().await.items.clone()
    }

    pub async fn add_event(&self, title: impl Into<String>, date: NaiveDate) -> EventEntry {
        let title = title.into();
        let entry = self
            .events
            .write()
            .await
            .push_with(|id| EventEntry { id, title, date });
        log::info!(
            "Added event entry. [entry_id = {}, date = {}]",
            entry.id,
            entry.date
        );
        entry
    }

    pub async fn add_event_str(&self, title: &str, date: &str) -> Result<EventEntry, AlarmError> {
        let date = parse_event_date(date)?;
        Ok(self.add_event(title, date).await)
    }

    pub async fn remove_event_at(&self, index: usize) -> Result<EventEntry, AlarmError> {
        self.events.write().await.remove_at(index)
    }

    pub async fn remove_event_by_id(&self, id: EntryId) -> Result<EventEntry, AlarmError> {
        self.events.write().await.remove_by_id(id)
    }

    pub async fn events(&self) -> Vec<EventEntry> {
        self.events.read().await.items.clone()
    }
}

impl Default for AlarmRegistry {
    fn default() -> Self {
        Self::new()
    }
}

pub fn parse_event_date(input: &str) -> Result<NaiveDate, AlarmError> {
    NaiveDate::parse_from_str(input, "%Y-%m-%d").map_err(|_| AlarmError::InvalidFormat {
        input: input.to_owned(),
        expected: DATE_FORMAT,
    })
}

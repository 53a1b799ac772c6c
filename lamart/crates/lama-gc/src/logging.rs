//! Collector event log
//!
//! With `GcConfig::verbose` set, every collection emits a short series of
//! [`GcEvent`]s. The process-wide [`EventLog`] keeps them in memory with a
//! local timestamp and forwards each one to the `log` facade under the
//! `lama_gc` target, as plain text or as a single-line JSON object. Only the
//! most recent `EventLogConfig::capacity` records are kept.
//!
//! | Event                 | Level |
//! |-----------------------|-------|
//! | `OutOfMemory`         | error |
//! | `CollectionStarted`   | info  |
//! | `CollectionFinished`  | info  |
//! | `HeapSnapshot`        | info  |
//! | `Marked`              | debug |

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::VecDeque;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Mutex;

/// Severity of a collector event, most severe first
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    Error,
    Warn,
    Info,
    Debug,
    Trace,
}

impl From<Severity> for log::Level {
    fn from(severity: Severity) -> Self {
        match severity {
            Severity::Error => log::Level::Error,
            Severity::Warn => log::Level::Warn,
            Severity::Info => log::Level::Info,
            Severity::Debug => log::Level::Debug,
            Severity::Trace => log::Level::Trace,
        }
    }
}

/// Something the collector did
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum GcEvent {
    CollectionStarted { cycle: u64, reason: String },

    /// Outcome of the mark phase
    Marked {
        cycle: u64,
        marked: usize,
        scanned: usize,
    },

    CollectionFinished {
        cycle: u64,
        pause_us: u64,
        freed_objects: usize,
        freed_bytes: usize,
    },

    /// Heap occupancy after a sweep
    HeapSnapshot {
        live_objects: usize,
        live_bytes: usize,
        limit_bytes: usize,
    },

    /// An allocation still did not fit after a forced collection
    OutOfMemory { requested: usize, live_bytes: usize },
}

impl GcEvent {
    pub fn severity(&self) -> Severity {
        match self {
            GcEvent::OutOfMemory { .. } => Severity::Error,
            GcEvent::Marked { .. } => Severity::Debug,
            _ => Severity::Info,
        }
    }

    /// One-line text form
    pub fn describe(&self) -> String {
        match self {
            GcEvent::CollectionStarted { cycle, reason } => {
                format!("gc #{} begin ({})", cycle, reason)
            }
            GcEvent::Marked {
                cycle,
                marked,
                scanned,
            } => format!(
                "gc #{} mark: {} reachable, {} words traced",
                cycle, marked, scanned
            ),
            GcEvent::CollectionFinished {
                cycle,
                pause_us,
                freed_objects,
                freed_bytes,
            } => format!(
                "gc #{} end after {}us: {} objects / {} bytes freed",
                cycle, pause_us, freed_objects, freed_bytes
            ),
            GcEvent::HeapSnapshot {
                live_objects,
                live_bytes,
                limit_bytes,
            } => format!(
                "heap holds {} objects in {} of {} bytes",
                live_objects, live_bytes, limit_bytes
            ),
            GcEvent::OutOfMemory {
                requested,
                live_bytes,
            } => format!(
                "out of memory: {} bytes requested with {} bytes live",
                requested, live_bytes
            ),
        }
    }

    /// JSON form, tagged with an `"event"` field
    pub fn to_json(&self) -> String {
        serde_json::to_string(self).unwrap_or_else(|_| self.describe())
    }
}

/// How forwarded events are rendered
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone)]
pub struct EventLogConfig {
    /// Events less severe than this are dropped
    pub max_severity: Severity,

    /// Pass events on to the `log` facade
    pub forward: bool,

    pub format: LogFormat,

    /// Records kept before the oldest is dropped
    pub capacity: usize,
}

pub const DEFAULT_CAPACITY: usize = 4096;

impl Default for EventLogConfig {
    fn default() -> Self {
        Self {
            max_severity: Severity::Info,
            forward: true,
            format: LogFormat::Text,
            capacity: DEFAULT_CAPACITY,
        }
    }
}

/// A recorded event
#[derive(Debug, Clone)]
pub struct Record {
    pub at: DateTime<Local>,
    pub event: GcEvent,
}

/// In-memory record of collector events
pub struct EventLog {
    config: EventLogConfig,
    records: Mutex<VecDeque<Record>>,
    muted: AtomicBool,
}

impl EventLog {
    pub fn new(config: EventLogConfig) -> Self {
        Self {
            config,
            records: Mutex::new(VecDeque::new()),
            muted: AtomicBool::new(false),
        }
    }

    pub fn set_muted(&self, muted: bool) {
        self.muted.store(muted, Ordering::Relaxed);
    }

    pub fn is_muted(&self) -> bool {
        self.muted.load(Ordering::Relaxed)
    }

    pub fn record(&self, event: GcEvent) {
        let severity = event.severity();
        if self.is_muted() || severity > self.config.max_severity {
            return;
        }

        if self.config.forward {
            let line = match self.config.format {
                LogFormat::Text => event.describe(),
                LogFormat::Json => event.to_json(),
            };
            log::log!(target: "lama_gc", log::Level::from(severity), "{}", line);
        }

        if self.config.capacity == 0 {
            return;
        }
        if let Ok(mut records) = self.records.lock() {
            while records.len() >= self.config.capacity {
                records.pop_front();
            }
            records.push_back(Record {
                at: Local::now(),
                event,
            });
        }
    }

    pub fn records(&self) -> Vec<Record> {
        match self.records.lock() {
            Ok(records) => records.iter().cloned().collect(),
            Err(_) => Vec::new(),
        }
    }

    pub fn len(&self) -> usize {
        self.records.lock().map_or(0, |records| records.len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn clear(&self) {
        if let Ok(mut records) = self.records.lock() {
            records.clear();
        }
    }
}

impl Default for EventLog {
    fn default() -> Self {
        Self::new(EventLogConfig::default())
    }
}

lazy_static::lazy_static! {
    static ref EVENTS: Mutex<EventLog> = Mutex::new(EventLog::default());
}

/// Record an event in the process-wide log
pub fn record(event: GcEvent) {
    if let Ok(log) = EVENTS.lock() {
        log.record(event);
    }
}

/// Swap in a fresh process-wide log; earlier records are discarded
pub fn configure(config: EventLogConfig) {
    if let Ok(mut log) = EVENTS.lock() {
        *log = EventLog::new(config);
    }
}

pub fn recorded() -> Vec<Record> {
    EVENTS.lock().map(|log| log.records()).unwrap_or_default()
}

pub fn recorded_count() -> usize {
    EVENTS.lock().map_or(0, |log| log.len())
}

//! Append-only audit trail, one CSV file per entity.
//!
//! Line layout is `timestamp,type,id,room,device,boredom,fear,action,extra` and is parsed
//! by downstream validators, so the field order and tokens must not change.

use std::fs::{self, OpenOptions};
use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};

use chrono::Utc;
use serde::Serialize;
use tracing::warn;

use crate::constants::AUDIT_RECORD_CAP;
use crate::error::SimError;
use crate::types::{EntityKind, Evidence};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AuditAction {
    Init,
    Move,
    Evidence,
    Swap,
    ReturnStart,
    ReturnComplete,
    Exit,
    Idle,
}

impl AuditAction {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Init => "INIT",
            Self::Move => "MOVE",
            Self::Evidence => "EVIDENCE",
            Self::Swap => "SWAP",
            Self::ReturnStart => "RETURN_START",
            Self::ReturnComplete => "RETURN_COMPLETE",
            Self::Exit => "EXIT",
            Self::Idle => "IDLE",
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize)]
pub struct AuditRecord {
    pub timestamp_ms: i64,
    pub kind: EntityKind,
    pub entity_id: i32,
    pub room: String,
    pub device: String,
    pub boredom: u32,
    pub fear: u32,
    pub action: AuditAction,
    pub extra: String,
}

impl AuditRecord {
    pub fn to_csv_line(&self) -> String {
        format!(
            "{},{},{},{},{},{},{},{},{}",
            self.timestamp_ms,
            self.kind.as_str(),
            self.entity_id,
            self.room,
            self.device,
            self.boredom,
            self.fear,
            self.action.as_str(),
            self.extra
        )
    }
}

/// In-memory sink, mostly for tests and embedding.
#[derive(Clone, Debug, Default)]
pub struct MemoryAudit {
    records: Arc<Mutex<Vec<AuditRecord>>>,
}

impl MemoryAudit {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn records(&self) -> Vec<AuditRecord> {
        match self.records.lock() {
            Ok(records) => records.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    pub fn records_for(&self, entity_id: i32) -> Vec<AuditRecord> {
        self.records()
            .into_iter()
            .filter(|record| record.entity_id == entity_id)
            .collect()
    }

    fn push(&self, record: AuditRecord) {
        match self.records.lock() {
            Ok(mut records) => records.push(record),
            Err(poisoned) => poisoned.into_inner().push(record),
        }
    }
}

#[derive(Clone, Debug, Default)]
pub enum AuditSink {
    #[default]
    Disabled,
    Directory(PathBuf),
    Memory(MemoryAudit),
}

impl AuditSink {
    pub fn log_path(dir: &Path, entity_id: i32) -> PathBuf {
        dir.join(format!("log_{entity_id}.csv"))
    }

    /// Returns false when the record could not be persisted.
    fn deliver(&self, record: AuditRecord) -> bool {
        match self {
            Self::Disabled => true,
            Self::Memory(memory) => {
                memory.push(record);
                true
            }
            Self::Directory(dir) => append_line(dir, &record),
        }
    }
}

fn append_line(dir: &Path, record: &AuditRecord) -> bool {
    if let Err(error) = fs::create_dir_all(dir) {
        warn!(dir = %dir.display(), %error, "failed to create audit directory");
        return false;
    }
    let path = AuditSink::log_path(dir, record.entity_id);
    let mut file = match OpenOptions::new().create(true).append(true).open(&path) {
        Ok(file) => file,
        Err(error) => {
            warn!(path = %path.display(), %error, "failed to open audit log");
            return false;
        }
    };
    if let Err(error) = writeln!(file, "{}", record.to_csv_line()) {
        warn!(path = %path.display(), %error, "failed to append audit record");
        return false;
    }
    true
}

/// Fields of one audit line that vary per action.
#[derive(Clone, Copy, Debug)]
pub struct AuditEntry<'a> {
    pub action: AuditAction,
    pub room: &'a str,
    pub device: Option<Evidence>,
    pub boredom: u32,
    pub fear: u32,
    pub extra: &'a str,
}

/// Audit writer owned by a single actor. Counts its own records so one runaway actor
/// trips the volume cap regardless of what the others do.
#[derive(Debug)]
pub struct EntityLog {
    sink: AuditSink,
    kind: EntityKind,
    entity_id: i32,
    cap: u32,
    written: u32,
}

impl EntityLog {
    pub fn new(sink: AuditSink, kind: EntityKind, entity_id: i32) -> Self {
        Self::with_cap(sink, kind, entity_id, AUDIT_RECORD_CAP)
    }

    pub fn with_cap(sink: AuditSink, kind: EntityKind, entity_id: i32, cap: u32) -> Self {
        Self {
            sink,
            kind,
            entity_id,
            cap,
            written: 0,
        }
    }

    pub fn written(&self) -> u32 {
        self.written
    }

    pub fn write(&mut self, entry: AuditEntry<'_>) -> Result<(), SimError> {
        if self.written >= self.cap {
            return Err(SimError::AuditVolumeExceeded {
                entity_id: self.entity_id,
                records: self.written,
            });
        }
        let record = AuditRecord {
            timestamp_ms: Utc::now().timestamp_millis(),
            kind: self.kind,
            entity_id: self.entity_id,
            room: entry.room.to_string(),
            device: entry.device.map(Evidence::as_str).unwrap_or("").to_string(),
            boredom: entry.boredom,
            fear: entry.fear,
            action: entry.action,
            extra: entry.extra.to_string(),
        };
        if self.sink.deliver(record) {
            self.written += 1;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(action: AuditAction) -> AuditEntry<'static> {
        AuditEntry {
            action,
            room: "Van",
            device: Some(Evidence::Emf),
            boredom: 2,
            fear: 1,
            extra: "Hallway",
        }
    }

    fn temp_dir(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "{}-{}-{}",
            name,
            std::process::id(),
            rand::random::<u32>()
        ))
    }

    #[test]
    fn csv_line_keeps_field_order() {
        let record = AuditRecord {
            timestamp_ms: 1_700_000_000_123,
            kind: EntityKind::Hunter,
            entity_id: 7,
            room: "Van".to_string(),
            device: "emf".to_string(),
            boredom: 3,
            fear: 4,
            action: AuditAction::Move,
            extra: "Hallway".to_string(),
        };
        assert_eq!(
            record.to_csv_line(),
            "1700000000123,hunter,7,Van,emf,3,4,MOVE,Hallway"
        );
    }

    #[test]
    fn ghost_records_leave_device_empty() {
        let memory = MemoryAudit::new();
        let mut log = EntityLog::new(AuditSink::Memory(memory.clone()), EntityKind::Ghost, 68057);
        log.write(AuditEntry {
            action: AuditAction::Idle,
            room: "Kitchen",
            device: None,
            boredom: 5,
            fear: 0,
            extra: "",
        })
        .expect("under cap");
        let line = memory.records()[0].to_csv_line();
        assert!(line.ends_with(",ghost,68057,Kitchen,,5,0,IDLE,"), "{line}");
    }

    #[test]
    fn volume_cap_stops_the_entity() {
        let mut log = EntityLog::with_cap(AuditSink::Disabled, EntityKind::Hunter, 3, 2);
        log.write(entry(AuditAction::Move)).expect("first");
        log.write(entry(AuditAction::Move)).expect("second");
        let err = log.write(entry(AuditAction::Move)).expect_err("capped");
        assert!(matches!(
            err,
            SimError::AuditVolumeExceeded {
                entity_id: 3,
                records: 2
            }
        ));
    }

    #[test]
    fn directory_sink_appends_one_file_per_entity() {
        let dir = temp_dir("ghost-hunt-audit");
        let sink = AuditSink::Directory(dir.clone());
        let mut first = EntityLog::new(sink.clone(), EntityKind::Hunter, 11);
        let mut second = EntityLog::new(sink, EntityKind::Hunter, 12);
        first.write(entry(AuditAction::Init)).expect("write");
        first.write(entry(AuditAction::Move)).expect("write");
        second.write(entry(AuditAction::Exit)).expect("write");

        let text = fs::read_to_string(AuditSink::log_path(&dir, 11)).expect("log exists");
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].contains(",hunter,11,Van,emf,2,1,INIT,Hallway"));
        assert!(lines[1].contains(",MOVE,"));
        assert_eq!(first.written(), 2);
        assert_eq!(second.written(), 1);

        let _ = fs::remove_dir_all(&dir);
    }

    #[test]
    fn unwritable_directory_is_not_fatal() {
        let blocker = temp_dir("ghost-hunt-audit-blocker");
        fs::write(&blocker, "not a directory").expect("create blocker file");
        let mut log = EntityLog::new(
            AuditSink::Directory(blocker.join("nested")),
            EntityKind::Hunter,
            1,
        );
        assert!(log.write(entry(AuditAction::Init)).is_ok());
        assert_eq!(log.written(), 0);
        let _ = fs::remove_file(&blocker);
    }
}

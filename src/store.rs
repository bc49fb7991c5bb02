//! Authoritative notice bookkeeping.
//!
//! Every known notice lives in one map keyed by id; its phase tells where it
//! is in the lifecycle. The pending queue is a filtered view of that map, so
//! there are no parallel collections to keep in sync. The store never
//! touches timers or the renderer.

use std::collections::BTreeMap;
use std::time::Duration;

use crate::render::ElementHandle;
use crate::types::{Notice, NoticeId, NoticeStatus, Severity};

/// Bookkeeping for a notice that has been mounted.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ActiveEntry {
    pub handle: ElementHandle,
    pub severity: Severity,
    pub message: String,
    pub duration: Duration,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Waiting for the next render pass.
    Pending,
    /// Drained by a render pass; reveal timer armed.
    Staggered,
    Revealed(ActiveEntry),
    Active { entry: ActiveEntry, paused: bool },
    Hiding(ActiveEntry),
}

impl Phase {
    pub const fn status(&self) -> NoticeStatus {
        match self {
            Self::Pending | Self::Staggered => NoticeStatus::Queued,
            Self::Revealed(_) => NoticeStatus::Revealed,
            Self::Active { .. } => NoticeStatus::Active,
            Self::Hiding(_) => NoticeStatus::Hiding,
        }
    }

    pub const fn entry(&self) -> Option<&ActiveEntry> {
        match self {
            Self::Pending | Self::Staggered => None,
            Self::Revealed(entry) | Self::Active { entry, .. } | Self::Hiding(entry) => Some(entry),
        }
    }
}

#[derive(Clone, Debug)]
pub struct Record {
    pub notice: Notice,
    pub phase: Phase,
}

#[derive(Debug, Default)]
pub struct NoticeStore {
    records: BTreeMap<NoticeId, Record>,
}

impl NoticeStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn enqueue(&mut self, notice: Notice) {
        self.records.insert(
            notice.id,
            Record {
                notice,
                phase: Phase::Pending,
            },
        );
    }

    /// Returns every pending notice in enqueue order and marks them as
    /// staggered, so a second drain yields nothing.
    pub fn drain_pending(&mut self) -> Vec<Notice> {
        self.records
            .values_mut()
            .filter(|r| r.phase == Phase::Pending)
            .map(|r| {
                r.phase = Phase::Staggered;
                r.notice.clone()
            })
            .collect()
    }

    /// Registers the mounted element of a staggered notice. Returns `false`
    /// when the notice is unknown or not waiting for its reveal.
    pub fn activate(&mut self, id: NoticeId, entry: ActiveEntry) -> bool {
        match self.records.get_mut(&id) {
            Some(record) if record.phase == Phase::Staggered => {
                record.phase = Phase::Revealed(entry);
                true
            }
            _ => false,
        }
    }

    pub fn promote(&mut self, id: NoticeId) -> bool {
        let Some(record) = self.records.get_mut(&id) else {
            return false;
        };
        match &record.phase {
            Phase::Revealed(entry) => {
                record.phase = Phase::Active {
                    entry: entry.clone(),
                    paused: false,
                };
                true
            }
            _ => false,
        }
    }

    /// Moves a revealed or active notice to `Hiding` and hands back its entry.
    pub fn begin_hide(&mut self, id: NoticeId) -> Option<ActiveEntry> {
        let record = self.records.get_mut(&id)?;
        let entry = match &record.phase {
            Phase::Revealed(entry) | Phase::Active { entry, .. } => entry.clone(),
            _ => return None,
        };
        record.phase = Phase::Hiding(entry.clone());
        Some(entry)
    }

    pub fn set_paused(&mut self, id: NoticeId, value: bool) -> bool {
        match self.records.get_mut(&id).map(|r| &mut r.phase) {
            Some(Phase::Active { paused, .. }) => {
                *paused = value;
                true
            }
            _ => false,
        }
    }

    pub fn deactivate(&mut self, id: NoticeId) -> Option<Record> {
        self.records.remove(&id)
    }

    /// Notices with `message` that have not been mounted yet.
    pub fn find_pending_by_message(&self, message: &str) -> Vec<Notice> {
        self.records
            .values()
            .filter(|r| matches!(r.phase, Phase::Pending | Phase::Staggered))
            .filter(|r| r.notice.message == message)
            .map(|r| r.notice.clone())
            .collect()
    }

    /// Mounted notices (revealed, active or hiding) whose entry carries `message`.
    pub fn find_active_by_message(&self, message: &str) -> Vec<(NoticeId, ActiveEntry)> {
        self.records
            .iter()
            .filter_map(|(id, r)| r.phase.entry().map(|entry| (*id, entry)))
            .filter(|(_, entry)| entry.message == message)
            .map(|(id, entry)| (id, entry.clone()))
            .collect()
    }

    pub fn get(&self, id: NoticeId) -> Option<&Record> {
        self.records.get(&id)
    }

    pub fn status(&self, id: NoticeId) -> Option<NoticeStatus> {
        self.records.get(&id).map(|r| r.phase.status())
    }

    pub fn records(&self) -> impl Iterator<Item = &Record> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn pending_len(&self) -> usize {
        self.records
            .values()
            .filter(|r| r.phase.status() == NoticeStatus::Queued)
            .count()
    }

    pub fn active_len(&self) -> usize {
        self.records
            .values()
            .filter(|r| r.phase.entry().is_some())
            .count()
    }

    /// Drops every record and returns the entries that were still mounted.
    pub fn clear(&mut self) -> Vec<ActiveEntry> {
        let mounted = self
            .records
            .values()
            .filter_map(|r| r.phase.entry().cloned())
            .collect();
        self.records.clear();
        mounted
    }
}

//! 内存训练记录存储（进程退出即丢失）

use std::collections::BTreeMap;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::Local;

use super::{new_entry_id, receipt_message, LogReceipt, NewEntry, SessionRecord, SessionStore, StoreError, WorkoutEntry};

/// 内存存储：date -> SessionRecord；BTreeMap 按日期字符串排序，最后一项即最近训练日
#[derive(Debug, Default)]
pub struct InMemoryStore {
    sessions: Mutex<BTreeMap<String, SessionRecord>>,
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, BTreeMap<String, SessionRecord>>, StoreError> {
        self.sessions
            .lock()
            .map_err(|_| StoreError::Unavailable("session store lock poisoned".into()))
    }
}

#[async_trait]
impl SessionStore for InMemoryStore {
    async fn append(&self, date: &str, entry: NewEntry) -> Result<LogReceipt, StoreError> {
        let id = new_entry_id();
        let message = receipt_message(&entry);
        let stored = WorkoutEntry {
            id: id.clone(),
            exercise: entry.exercise,
            sets: entry.sets,
            reps: entry.reps,
            weight: entry.weight,
            timestamp: Local::now(),
        };

        let mut sessions = self.lock()?;
        sessions
            .entry(date.to_string())
            .or_insert_with(|| SessionRecord {
                date: date.to_string(),
                exercises: Vec::new(),
            })
            .exercises
            .push(stored);
        tracing::debug!(date, id = %id, total_days = sessions.len(), "entry stored in memory");

        Ok(LogReceipt { id, message })
    }

    async fn latest_session(&self) -> Result<Option<SessionRecord>, StoreError> {
        let sessions = self.lock()?;
        Ok(sessions.values().next_back().cloned())
    }
}

//! SQLite 训练记录存储（rusqlite，同步 API）
//!
//! 单表 workout_entries；自增 seq 保证同一天内按写入顺序读出。
//! 连接由 Mutex 保护，锁只在一次 SQL 调用期间持有，不跨越 await。

use std::path::Path;
use std::sync::Mutex;

use async_trait::async_trait;
use chrono::{DateTime, Local};
use rusqlite::{params, Connection, OptionalExtension};

use super::{new_entry_id, receipt_message, LogReceipt, NewEntry, SessionRecord, SessionStore, StoreError, Weight, WorkoutEntry};

/// SQLite 持久化存储
pub struct SqliteStore {
    conn: Mutex<Connection>,
}

impl SqliteStore {
    /// 打开（或创建）数据库文件；父目录不存在时自动创建
    pub fn open(path: impl AsRef<Path>) -> Result<Self, StoreError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let conn = Connection::open(path)?;
        Self::init(conn)
    }

    /// 内存数据库（测试用）
    pub fn open_in_memory() -> Result<Self, StoreError> {
        Self::init(Connection::open_in_memory()?)
    }

    fn init(conn: Connection) -> Result<Self, StoreError> {
        conn.execute_batch(
            "CREATE TABLE IF NOT EXISTS workout_entries (
                seq INTEGER PRIMARY KEY AUTOINCREMENT,
                id TEXT NOT NULL UNIQUE,
                session_date TEXT NOT NULL,
                exercise TEXT NOT NULL,
                sets INTEGER NOT NULL,
                reps INTEGER NOT NULL,
                weight_tenths INTEGER NOT NULL,
                logged_at TEXT NOT NULL
            );
            CREATE INDEX IF NOT EXISTS idx_workout_entries_date
                ON workout_entries(session_date);",
        )?;
        Ok(Self {
            conn: Mutex::new(conn),
        })
    }

    fn lock(&self) -> Result<std::sync::MutexGuard<'_, Connection>, StoreError> {
        self.conn
            .lock()
            .map_err(|_| StoreError::Unavailable("sqlite connection lock poisoned".into()))
    }
}

#[async_trait]
impl SessionStore for SqliteStore {
    async fn append(&self, date: &str, entry: NewEntry) -> Result<LogReceipt, StoreError> {
        let id = new_entry_id();
        let message = receipt_message(&entry);
        let logged_at = Local::now().to_rfc3339();

        let conn = self.lock()?;
        conn.execute(
            "INSERT INTO workout_entries (id, session_date, exercise, sets, reps, weight_tenths, logged_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7)",
            params![
                id,
                date,
                entry.exercise,
                entry.sets,
                entry.reps,
                entry.weight.tenths(),
                logged_at
            ],
        )?;
        tracing::debug!(date, id = %id, "entry stored in sqlite");

        Ok(LogReceipt { id, message })
    }

    async fn latest_session(&self) -> Result<Option<SessionRecord>, StoreError> {
        let conn = self.lock()?;
        let latest: Option<String> = conn
            .query_row(
                "SELECT session_date FROM workout_entries ORDER BY session_date DESC LIMIT 1",
                [],
                |row| row.get(0),
            )
            .optional()?;
        let Some(date) = latest else {
            return Ok(None);
        };

        let mut stmt = conn.prepare(
            "SELECT id, exercise, sets, reps, weight_tenths, logged_at
             FROM workout_entries WHERE session_date = ?1 ORDER BY seq ASC",
        )?;
        let rows = stmt.query_map(params![date], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, u32>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, u32>(4)?,
                row.get::<_, String>(5)?,
            ))
        })?;

        let mut exercises = Vec::new();
        for row in rows {
            let (id, exercise, sets, reps, tenths, logged_at) = row?;
            let timestamp = DateTime::parse_from_rfc3339(&logged_at)
                .map_err(|e| StoreError::Corrupt(format!("entry {id}: bad timestamp {logged_at}: {e}")))?
                .with_timezone(&Local);
            exercises.push(WorkoutEntry {
                id,
                exercise,
                sets,
                reps,
                weight: Weight::from_tenths(tenths),
                timestamp,
            });
        }

        Ok(Some(SessionRecord { date, exercises }))
    }
}

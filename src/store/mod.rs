//! 训练记录存储抽象层
//!
//! 定义统一的 SessionStore 接口，支持内存和 SQLite 两种实现；两者在接口边界上行为一致：
//! - append(date, entry) 生成 8 位 id 与确认文案
//! - latest_session() 返回日期最大的一天及其按写入顺序排列的训练

pub mod memory;
pub mod model;
pub mod sqlite;

use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;

use crate::config::{StoreBackend, StoreSection};

pub use memory::InMemoryStore;
pub use model::{LogReceipt, NewEntry, SessionRecord, Weight, WorkoutEntry};
pub use sqlite::SqliteStore;

/// 存储错误
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Store unavailable: {0}")]
    Unavailable(String),

    #[error("Corrupt record: {0}")]
    Corrupt(String),
}

/// 训练记录存储接口
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// 将一条训练追加到 date（YYYY-MM-DD）对应的训练日
    async fn append(&self, date: &str, entry: NewEntry) -> Result<LogReceipt, StoreError>;

    /// 最近一个训练日；无记录时返回 None
    async fn latest_session(&self) -> Result<Option<SessionRecord>, StoreError>;
}

/// 生成短 id：UUID v4 的前 8 个十六进制字符
pub(crate) fn new_entry_id() -> String {
    uuid::Uuid::new_v4().simple().to_string()[..8].to_string()
}

/// 两种实现共用的确认文案
pub(crate) fn receipt_message(entry: &NewEntry) -> String {
    format!(
        "✅ Successfully logged {} sets of {} reps of {} at {}kg.",
        entry.sets, entry.reps, entry.exercise, entry.weight
    )
}

/// 按配置创建存储（显式选择，不探测文件是否存在）
pub fn create_store_from_config(cfg: &StoreSection) -> Result<Arc<dyn SessionStore>, StoreError> {
    match cfg.backend {
        StoreBackend::Memory => {
            tracing::info!("Using in-memory session store");
            Ok(Arc::new(InMemoryStore::new()))
        }
        StoreBackend::Sqlite => {
            tracing::info!(path = %cfg.path.display(), "Using SQLite session store");
            Ok(Arc::new(SqliteStore::open(&cfg.path)?))
        }
    }
}

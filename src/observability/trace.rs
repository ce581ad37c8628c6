//! Trace Emitter：为每个分发的意图分配关联 id，并按 id 记录结构化事件
//!
//! 只写不读；对控制流无影响。默认 sink 写入 tracing，MemorySink 供测试断言。

use std::fmt;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use uuid::Uuid;

/// 关联 id
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct TraceId(Uuid);

impl TraceId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for TraceId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// 一条 trace 事件
#[derive(Debug, Clone)]
pub struct TraceEvent {
    pub trace_id: TraceId,
    pub stage: String,
    pub detail: String,
    pub timestamp: DateTime<Utc>,
}

/// 事件落点
pub trait TraceSink: Send + Sync {
    fn record(&self, event: TraceEvent);
}

/// 写入 tracing 日志
#[derive(Debug, Default)]
pub struct TracingSink;

impl TraceSink for TracingSink {
    fn record(&self, event: TraceEvent) {
        tracing::info!(
            trace_id = %event.trace_id,
            stage = %event.stage,
            "{}",
            event.detail
        );
    }
}

/// 内存 sink：保留全部事件
#[derive(Debug, Default)]
pub struct MemorySink {
    events: Mutex<Vec<TraceEvent>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn events(&self) -> Vec<TraceEvent> {
        self.events.lock().map(|e| e.clone()).unwrap_or_default()
    }

    pub fn stages(&self) -> Vec<String> {
        self.events().into_iter().map(|e| e.stage).collect()
    }
}

impl TraceSink for MemorySink {
    fn record(&self, event: TraceEvent) {
        if let Ok(mut events) = self.events.lock() {
            events.push(event);
        }
    }
}

/// Trace 发射器，克隆开销为一次 Arc clone
#[derive(Clone)]
pub struct TraceEmitter {
    sink: Arc<dyn TraceSink>,
}

impl Default for TraceEmitter {
    fn default() -> Self {
        Self::new(Arc::new(TracingSink))
    }
}

impl TraceEmitter {
    pub fn new(sink: Arc<dyn TraceSink>) -> Self {
        Self { sink }
    }

    /// 分配新的关联 id（不发事件）
    pub fn start(&self) -> TraceId {
        TraceId::new()
    }

    pub fn emit(&self, trace_id: TraceId, stage: &str, detail: impl Into<String>) {
        self.sink.record(TraceEvent {
            trace_id,
            stage: stage.to_string(),
            detail: detail.into(),
            timestamp: Utc::now(),
        });
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_events_share_trace_id() {
        let sink = Arc::new(MemorySink::new());
        let tracer = TraceEmitter::new(sink.clone());
        let a = tracer.start();
        let b = tracer.start();
        assert_ne!(a, b);

        tracer.emit(a, "log_session.request", "Squat 4x5");
        tracer.emit(a, "log_session.stored", "id=abcd1234");
        tracer.emit(b, "get_name", "unknown");

        let events = sink.events();
        assert_eq!(events.len(), 3);
        assert_eq!(events.iter().filter(|e| e.trace_id == a).count(), 2);
        assert_eq!(sink.stages()[2], "get_name");
    }
}

//! 可观测性：日志初始化与意图级 trace

pub mod trace;

pub use trace::{MemorySink, TraceEmitter, TraceEvent, TraceId, TraceSink, TracingSink};

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// 日志：默认 info，可通过 RUST_LOG 覆盖；写 stderr，避免与 CLI 对话输出交错
pub fn init() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .init();
}

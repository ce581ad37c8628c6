//! 分发层：Tool Router、Coach 子代理、自检、个性化与上下文预过滤

pub mod coach;
pub mod evaluation;
pub mod personalize;
pub mod prefilter;
pub mod router;
pub mod summary;

pub use coach::{CoachAgent, CoachTips};
pub use evaluation::{CheckStatus, EvaluationAgent, EvaluationReport};
pub use personalize::personalize;
pub use prefilter::needs_history;
pub use router::ToolRouter;
pub use summary::format_summary;

//! 外部工具：训练建议检索（Tip Source）

pub mod tips;

pub use tips::{format_tips, GoogleTipSource, SearchError, TipHit, TipSource};

//! 训练总结格式化

use crate::store::SessionRecord;

/// 无记录时的回复
pub const NO_WORKOUTS_REPLY: &str =
    "You haven't logged any workouts yet. Tell me what you did and I'll keep track!";

/// "On {date}, you did {S}×{R} {exercise} at {W}kg and ... ."
pub fn format_summary(record: &SessionRecord) -> String {
    let parts: Vec<String> = record
        .exercises
        .iter()
        .map(|e| format!("{}×{} {} at {}kg", e.sets, e.reps, e.exercise, e.weight))
        .collect();
    format!("On {}, you did {}.", record.date, parts.join(" and "))
}

//! 训练记录数据模型
//!
//! Weight 以 0.1kg 为单位存储，保证「最多一位小数」在类型层面成立。

use std::fmt;

use chrono::{DateTime, Local};

/// 非负重量，单位 0.1kg
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Weight {
    tenths: u32,
}

impl Weight {
    pub fn from_tenths(tenths: u32) -> Self {
        Self { tenths }
    }

    /// 从公斤数构造；负数、非有限值或超过一位小数时返回 None
    pub fn from_kg(kg: f64) -> Option<Self> {
        if !kg.is_finite() || kg < 0.0 {
            return None;
        }
        let scaled = kg * 10.0;
        let rounded = scaled.round();
        if (scaled - rounded).abs() > 1e-6 || rounded > u32::MAX as f64 {
            return None;
        }
        Some(Self {
            tenths: rounded as u32,
        })
    }

    pub fn tenths(&self) -> u32 {
        self.tenths
    }

    pub fn kg(&self) -> f64 {
        self.tenths as f64 / 10.0
    }
}

/// 整数重量不带 ".0"（30），否则保留一位小数（22.5）
impl fmt::Display for Weight {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let whole = self.tenths / 10;
        let frac = self.tenths % 10;
        if frac == 0 {
            write!(f, "{}", whole)
        } else {
            write!(f, "{}.{}", whole, frac)
        }
    }
}

/// 待写入的一条训练（尚无 id / 时间戳）
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NewEntry {
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: Weight,
}

/// 已落库的一条训练，创建后不可变
#[derive(Debug, Clone, PartialEq)]
pub struct WorkoutEntry {
    pub id: String,
    pub exercise: String,
    pub sets: u32,
    pub reps: u32,
    pub weight: Weight,
    pub timestamp: DateTime<Local>,
}

/// 某一天的全部训练，按写入顺序排列
#[derive(Debug, Clone, PartialEq)]
pub struct SessionRecord {
    pub date: String,
    pub exercises: Vec<WorkoutEntry>,
}

/// append 的返回：生成的 id 与确认文案
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogReceipt {
    pub id: String,
    pub message: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_weight_display() {
        assert_eq!(Weight::from_kg(30.0).unwrap().to_string(), "30");
        assert_eq!(Weight::from_kg(22.5).unwrap().to_string(), "22.5");
        assert_eq!(Weight::from_kg(0.0).unwrap().to_string(), "0");
        assert_eq!(Weight::from_tenths(1005).to_string(), "100.5");
    }

    #[test]
    fn test_weight_rejects_invalid() {
        assert!(Weight::from_kg(-1.0).is_none());
        assert!(Weight::from_kg(f64::NAN).is_none());
        assert!(Weight::from_kg(f64::INFINITY).is_none());
        assert!(Weight::from_kg(22.55).is_none());
    }

    #[test]
    fn test_weight_float_noise() {
        // 0.1 + 0.2 在浮点下不是 0.3
        let w = Weight::from_kg(0.1 + 0.2).unwrap();
        assert_eq!(w.tenths(), 3);
        assert_eq!(w.kg(), 0.3);
    }
}

use chrono::TimeDelta;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

pub mod period;

pub use period::TimePeriod;

/// # Summary
/// 交易时间周期枚举，定义 K 线的时间跨度。
///
/// # Invariants
/// - 每个周期对应固定且为正的时长，序列化名称与短代码一致。
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum TimeFrame {
    // 1分钟
    #[serde(rename = "1m")]
    Minute1,
    // 5分钟
    #[serde(rename = "5m")]
    Minute5,
    // 15分钟
    #[serde(rename = "15m")]
    Minute15,
    // 30分钟
    #[serde(rename = "30m")]
    Minute30,
    // 1小时
    #[serde(rename = "1h")]
    Hour1,
    // 4小时
    #[serde(rename = "4h")]
    Hour4,
    // 1日
    #[serde(rename = "1d")]
    Day1,
}

impl TimeFrame {
    /// # Summary
    /// 返回该周期对应的固定时长。
    pub fn duration(self) -> TimeDelta {
        match self {
            TimeFrame::Minute1 => TimeDelta::minutes(1),
            TimeFrame::Minute5 => TimeDelta::minutes(5),
            TimeFrame::Minute15 => TimeDelta::minutes(15),
            TimeFrame::Minute30 => TimeDelta::minutes(30),
            TimeFrame::Hour1 => TimeDelta::hours(1),
            TimeFrame::Hour4 => TimeDelta::hours(4),
            TimeFrame::Day1 => TimeDelta::days(1),
        }
    }
}

impl FromStr for TimeFrame {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "1m" | "minute1" => Ok(TimeFrame::Minute1),
            "5m" | "minute5" => Ok(TimeFrame::Minute5),
            "15m" | "minute15" => Ok(TimeFrame::Minute15),
            "30m" | "minute30" => Ok(TimeFrame::Minute30),
            "1h" | "hour1" => Ok(TimeFrame::Hour1),
            "4h" | "hour4" => Ok(TimeFrame::Hour4),
            "1d" | "day1" => Ok(TimeFrame::Day1),
            _ => Err(format!("Unknown TimeFrame: {}", s)),
        }
    }
}

impl std::fmt::Display for TimeFrame {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimeFrame::Minute1 => write!(f, "1m"),
            TimeFrame::Minute5 => write!(f, "5m"),
            TimeFrame::Minute15 => write!(f, "15m"),
            TimeFrame::Minute30 => write!(f, "30m"),
            TimeFrame::Hour1 => write!(f, "1h"),
            TimeFrame::Hour4 => write!(f, "4h"),
            TimeFrame::Day1 => write!(f, "1d"),
        }
    }
}

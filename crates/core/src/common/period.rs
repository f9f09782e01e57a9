use crate::market::error::MarketError;
use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

/// # Summary
/// 固定时长的半开时间区间 `[start, end)`，作为 K 线桶的身份标识。
///
/// # Invariants
/// - `end` 严格晚于 `start`，即时长恒为正。
/// - 构造后不可变，按值复制传递。
/// - 反序列化同样经过 `TimePeriod::new` 校验。
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "PeriodBounds", into = "PeriodBounds")]
pub struct TimePeriod {
    // 区间起点（包含）
    start: DateTime<Utc>,
    // 区间终点（不包含）
    end: DateTime<Utc>,
}

impl TimePeriod {
    /// # Summary
    /// 以起点和时长构造区间。
    ///
    /// # Logic
    /// 1. 校验时长为正。
    /// 2. 计算终点，溢出时视为非法时长。
    ///
    /// # Arguments
    /// * `start`: 区间起点。
    /// * `duration`: 区间时长。
    ///
    /// # Returns
    /// 构造成功返回区间，时长非正或溢出返回 `MarketError::InvalidDuration`。
    pub fn new(start: DateTime<Utc>, duration: TimeDelta) -> Result<Self, MarketError> {
        if duration <= TimeDelta::zero() {
            return Err(MarketError::InvalidDuration(format!(
                "period duration must be positive, got {}",
                duration
            )));
        }
        let end = start.checked_add_signed(duration).ok_or_else(|| {
            MarketError::InvalidDuration(format!("{} + {} overflows", start, duration))
        })?;
        Ok(Self { start, end })
    }

    /// # Summary
    /// 返回包含 `instant` 的、按 Unix 纪元对齐的区间。
    ///
    /// # Logic
    /// 1. 以毫秒为单位取 `instant` 对时长的欧几里得余数。
    /// 2. 减去余数得到对齐后的起点。
    ///
    /// # Arguments
    /// * `instant`: 任意时刻。
    /// * `duration`: 区间时长，需为正且至少 1 毫秒。
    ///
    /// # Returns
    /// 对齐后的区间或 `MarketError::InvalidDuration`。
    pub fn aligned(instant: DateTime<Utc>, duration: TimeDelta) -> Result<Self, MarketError> {
        let step = duration.num_milliseconds();
        if step <= 0 {
            return Err(MarketError::InvalidDuration(format!(
                "alignment step must be at least 1ms, got {}",
                duration
            )));
        }
        let millis = instant.timestamp_millis();
        let start = DateTime::from_timestamp_millis(millis - millis.rem_euclid(step))
            .ok_or_else(|| MarketError::InvalidDuration(format!("cannot align {}", instant)))?;
        Self::new(start, duration)
    }

    pub fn start(&self) -> DateTime<Utc> {
        self.start
    }

    pub fn end(&self) -> DateTime<Utc> {
        self.end
    }

    pub fn length(&self) -> TimeDelta {
        self.end - self.start
    }

    /// 判断时刻是否落在 `[start, end)` 内。
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        instant >= self.start && instant < self.end
    }
}

// 序列化时的原始区间端点
#[derive(Serialize, Deserialize)]
struct PeriodBounds {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TryFrom<PeriodBounds> for TimePeriod {
    type Error = MarketError;

    fn try_from(bounds: PeriodBounds) -> Result<Self, Self::Error> {
        Self::new(bounds.start, bounds.end - bounds.start)
    }
}

impl From<TimePeriod> for PeriodBounds {
    fn from(period: TimePeriod) -> Self {
        Self {
            start: period.start,
            end: period.end,
        }
    }
}

impl std::fmt::Display for TimePeriod {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        const LAYOUT: &str = "%Y-%m-%dT%H:%M:%S";
        write!(
            f,
            "{} -> {}",
            self.start.format(LAYOUT),
            self.end.format(LAYOUT)
        )
    }
}

use chrono::{DateTime, Utc};
use thiserror::Error;

/// # Summary
/// 行情聚合域错误枚举，覆盖周期参数非法、首根 K 线越界以及输入解析失败。
///
/// # Invariants
/// - 必须通过 `thiserror` 派生 `Error` trait。
/// - 返回错误的操作不会修改任何内部状态。
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MarketError {
    // 周期时长必须为正
    #[error("Invalid duration: {0}")]
    InvalidDuration(String),
    // 重采样流的第一根 K 线不在声明的首个桶内
    #[error("the first candle starting at {start} is not between {bucket_start} and {bucket_end}")]
    FirstCandleOutOfRange {
        start: DateTime<Utc>,
        bucket_start: DateTime<Utc>,
        bucket_end: DateTime<Utc>,
    },
    // 累加成交量或成交笔数时超出数值上限
    #[error("Overflow: {0}")]
    Overflow(String),
    // 文本输入解析错误，如成交记录格式不匹配
    #[error("Parse error: {0}")]
    Parse(String),
}

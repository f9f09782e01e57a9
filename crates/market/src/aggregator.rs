use crate::builder::CandleBuilder;
use chrono::{DateTime, TimeDelta, Utc};
use kline_core::common::TimePeriod;
use kline_core::market::entity::{Candle, Trade};
use kline_core::market::error::MarketError;
use tracing::debug;

/// # Summary
/// 把带时间戳的成交流按纪元对齐的固定周期切分，逐桶交给 `CandleBuilder` 折叠。
///
/// # Invariants
/// - 同一时刻最多持有一个构建中的桶。
/// - 没有成交的空档不会产生空 K 线。
/// - 早于当前桶起点的乱序成交会被折叠进当前桶，不报错。
#[derive(Debug, Clone)]
pub struct TradeAggregator {
    // 细粒度桶时长
    frame: TimeDelta,
    // 构建中的桶
    current: Option<CandleBuilder>,
}

impl TradeAggregator {
    /// # Summary
    /// 创建成交聚合器。
    ///
    /// # Arguments
    /// * `frame`: 桶时长，需为正且至少 1 毫秒。
    ///
    /// # Returns
    /// 非法时长返回 `MarketError::InvalidDuration`。
    pub fn new(frame: TimeDelta) -> Result<Self, MarketError> {
        TimePeriod::aligned(DateTime::<Utc>::UNIX_EPOCH, frame)?;
        Ok(Self {
            frame,
            current: None,
        })
    }

    /// # Summary
    /// 折叠一笔成交。
    ///
    /// # Logic
    /// 1. 成交时间早于当前桶终点：折叠进当前桶。
    /// 2. 否则计算成交所在的对齐桶，结束当前桶并以新桶接收该成交。
    ///
    /// # Arguments
    /// * `trade`: 成交事件。
    ///
    /// # Returns
    /// 发生换桶时返回刚结束的 K 线，否则返回 `None`。
    pub fn push(&mut self, trade: &Trade) -> Result<Option<Candle>, MarketError> {
        if let Some(builder) = self.current.as_mut() {
            if trade.time < builder.period().end() {
                builder.record(trade);
                return Ok(None);
            }
        }

        let period = TimePeriod::aligned(trade.time, self.frame)?;
        let closed = self.current.take().map(CandleBuilder::finish);
        if let Some(candle) = &closed {
            debug!(
                "candle {} closed with {} trades",
                candle.period, candle.trade_count
            );
        }

        let mut builder = CandleBuilder::new(period);
        builder.record(trade);
        self.current = Some(builder);
        Ok(closed)
    }

    /// 结束并返回构建中的 K 线（输入流结束时调用）。
    pub fn flush(&mut self) -> Option<Candle> {
        self.current.take().map(CandleBuilder::finish)
    }

    pub fn current(&self) -> Option<&Candle> {
        self.current.as_ref().map(CandleBuilder::candle)
    }
}

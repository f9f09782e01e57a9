use chrono::TimeDelta;
use kline_core::common::TimePeriod;
use kline_core::config::PipelineConfig;
use kline_core::market::entity::{Candle, Trade};
use kline_core::market::error::MarketError;
use kline_market::aggregator::TradeAggregator;
use kline_market::resampler::CandleResampler;
use tracing::{info, warn};

/// # Summary
/// 成交 -> 细粒度 K 线 -> 粗粒度 K 线 的单线程流水线。
///
/// # Invariants
/// - 重采样器在第一根细粒度 K 线收盘时才创建，首个桶对齐到目标周期。
pub struct Pipeline {
    aggregator: TradeAggregator,
    // 目标周期时长
    target: TimeDelta,
    resampler: Option<CandleResampler>,
}

impl Pipeline {
    /// # Summary
    /// 按配置创建流水线。
    ///
    /// # Returns
    /// 周期非法时返回 `MarketError::InvalidDuration`。
    pub fn new(config: &PipelineConfig) -> Result<Self, MarketError> {
        if config.target_frame.duration() < config.source_frame.duration() {
            warn!(
                "target frame {} is finer than source frame {}, every candle will roll over",
                config.target_frame, config.source_frame
            );
        }
        Ok(Self {
            aggregator: TradeAggregator::new(config.source_frame.duration())?,
            target: config.target_frame.duration(),
            resampler: None,
        })
    }

    /// 折叠一笔成交；细粒度 K 线收盘时返回重采样后的快照。
    pub fn push(&mut self, trade: &Trade) -> Result<Option<Candle>, MarketError> {
        match self.aggregator.push(trade)? {
            Some(fine) => self.resample(&fine).map(Some),
            None => Ok(None),
        }
    }

    /// 输入结束时冲刷最后一根细粒度 K 线。
    pub fn finish(&mut self) -> Result<Option<Candle>, MarketError> {
        match self.aggregator.flush() {
            Some(fine) => self.resample(&fine).map(Some),
            None => Ok(None),
        }
    }

    fn resample(&mut self, fine: &Candle) -> Result<Candle, MarketError> {
        let mut resampler = match self.resampler.take() {
            Some(resampler) => resampler,
            None => {
                let first = TimePeriod::aligned(fine.period.start(), self.target)?;
                info!("first resampled bucket: {}", first);
                CandleResampler::new(first.start(), self.target)?
            }
        };
        let snapshot = resampler.next(fine);
        self.resampler = Some(resampler);
        snapshot
    }
}

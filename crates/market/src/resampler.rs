use chrono::{DateTime, TimeDelta, Utc};
use kline_core::common::TimePeriod;
use kline_core::market::entity::Candle;
use kline_core::market::error::MarketError;
use tracing::{debug, warn};

/// # Summary
/// 把按时间排序的细粒度 K 线流重新分桶为固定时长的粗粒度 K 线。
///
/// # Invariants
/// - 只保留当前粗粒度桶这一份状态，内存占用为 O(1)。
/// - 每次输入都返回当前桶的独立快照，调用方修改快照不影响后续结果。
/// - 输入必须按 `period.start` 非递减排列，乱序输入不报错但结果无意义。
#[derive(Debug, Clone)]
pub struct CandleResampler {
    // 声明的第一个桶的起点
    bucket_start: DateTime<Utc>,
    // 粗粒度桶时长
    bucket_duration: TimeDelta,
    // 当前正在累积的桶
    current: Option<Candle>,
}

impl CandleResampler {
    /// # Summary
    /// 创建重采样器。
    ///
    /// # Arguments
    /// * `bucket_start`: 第一个桶的起点，第一根输入必须落在 `[bucket_start, bucket_start + bucket_duration)` 内。
    /// * `bucket_duration`: 粗粒度桶时长。
    ///
    /// # Returns
    /// 时长非正时返回 `MarketError::InvalidDuration`。
    pub fn new(bucket_start: DateTime<Utc>, bucket_duration: TimeDelta) -> Result<Self, MarketError> {
        TimePeriod::new(bucket_start, bucket_duration)?;
        Ok(Self {
            bucket_start,
            bucket_duration,
            current: None,
        })
    }

    /// # Summary
    /// 消费一根细粒度 K 线，返回所在粗粒度桶的最新快照。
    ///
    /// # Logic
    /// 1. 输入起点早于当前桶终点：合并进当前桶（收盘价覆盖，高低取极值，量和笔数累加，开盘价不变）。
    /// 2. 尚无当前桶：校验输入落在声明的首个桶内，并以输入的统计值初始化该桶。
    /// 3. 输入起点不早于当前桶终点：以输入起点开启新桶（不对齐到整周期），以输入的统计值初始化。
    ///
    /// # Arguments
    /// * `input`: 已聚合完成的细粒度 K 线。
    ///
    /// # Returns
    /// 当前桶的独立副本。首根输入越界时返回 `MarketError::FirstCandleOutOfRange`，
    /// 成交量或笔数累加溢出时返回 `MarketError::Overflow`，两种情况下状态都保持不变。
    pub fn next(&mut self, input: &Candle) -> Result<Candle, MarketError> {
        if let Some(bucket) = self.current.as_mut() {
            if input.period.start() < bucket.period.end() {
                Self::merge(bucket, input)?;
                return Ok(bucket.clone());
            }
        }

        let period = match &self.current {
            None => {
                let first = TimePeriod::new(self.bucket_start, self.bucket_duration)?;
                if !first.contains(input.period.start()) {
                    warn!(
                        "first candle {} is outside the declared bucket {}",
                        input.period, first
                    );
                    return Err(MarketError::FirstCandleOutOfRange {
                        start: input.period.start(),
                        bucket_start: first.start(),
                        bucket_end: first.end(),
                    });
                }
                first
            }
            Some(previous) => {
                let next = TimePeriod::new(input.period.start(), self.bucket_duration)?;
                debug!(
                    "bucket {} closed with {} trades, rolling over to {}",
                    previous.period, previous.trade_count, next
                );
                next
            }
        };

        let bucket = Self::open(period, input);
        self.current = Some(bucket.clone());
        Ok(bucket)
    }

    /// 当前正在累积的桶；尚未消费任何输入时为 `None`。
    pub fn current(&self) -> Option<&Candle> {
        self.current.as_ref()
    }

    // 新桶继承第一根输入的统计值，而不是从零开始
    fn open(period: TimePeriod, input: &Candle) -> Candle {
        Candle {
            period,
            open_price: input.open_price,
            close_price: input.close_price,
            max_price: input.max_price,
            min_price: input.min_price,
            volume: input.volume,
            trade_count: input.trade_count,
            ctime: input.ctime,
            confirm: 0,
        }
    }

    // 先完成全部可能失败的累加，再写回桶
    fn merge(bucket: &mut Candle, input: &Candle) -> Result<(), MarketError> {
        let volume = bucket.volume.checked_add(input.volume).ok_or_else(|| {
            MarketError::Overflow(format!(
                "volume {} + {} in bucket {}",
                bucket.volume, input.volume, bucket.period
            ))
        })?;
        // 输入本身已是聚合结果，笔数相加
        let trade_count = bucket
            .trade_count
            .checked_add(input.trade_count)
            .ok_or_else(|| {
                MarketError::Overflow(format!(
                    "trade count {} + {} in bucket {}",
                    bucket.trade_count, input.trade_count, bucket.period
                ))
            })?;

        bucket.ctime = input.ctime;
        bucket.close_price = input.close_price;
        bucket.volume = volume;
        bucket.max_price = bucket.max_price.max(input.max_price);
        bucket.min_price = bucket.min_price.min(input.min_price);
        bucket.trade_count = trade_count;
        Ok(())
    }
}

/// # Summary
/// 在任意 K 线迭代器上驱动 `CandleResampler` 的迭代器适配器。
///
/// # Invariants
/// - 遇到首根越界错误后产出该错误并终止，不再消费上游。
pub struct Resample<I> {
    inner: I,
    resampler: CandleResampler,
    failed: bool,
}

impl<I> Iterator for Resample<I>
where
    I: Iterator<Item = Candle>,
{
    type Item = Result<Candle, MarketError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let input = self.inner.next()?;
        let snapshot = self.resampler.next(&input);
        self.failed = snapshot.is_err();
        Some(snapshot)
    }
}

/// 为 K 线迭代器提供 `.resample(start, duration)`。
pub trait ResampleExt: Iterator<Item = Candle> + Sized {
    fn resample(
        self,
        bucket_start: DateTime<Utc>,
        bucket_duration: TimeDelta,
    ) -> Result<Resample<Self>, MarketError> {
        Ok(Resample {
            inner: self,
            resampler: CandleResampler::new(bucket_start, bucket_duration)?,
            failed: false,
        })
    }
}

impl<I: Iterator<Item = Candle>> ResampleExt for I {}

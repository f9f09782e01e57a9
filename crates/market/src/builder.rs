use chrono::{DateTime, Utc};
use kline_core::common::TimePeriod;
use kline_core::market::entity::{Candle, Trade};
use rust_decimal::Decimal;

/// # Summary
/// 单个时间桶的 K 线构建器，逐笔折叠成交。
///
/// # Invariants
/// - 独占一根 K 线，除 `add_trade` / `record` 外不修改其内容。
/// - 是否为桶内首笔成交由 `trade_count == 0` 判定，零价格或零数量的成交按普通值处理。
#[derive(Debug, Clone)]
pub struct CandleBuilder {
    // 构建中的 K 线
    candle: Candle,
}

impl CandleBuilder {
    /// # Summary
    /// 为外部分配的时间桶创建构建器。
    ///
    /// # Arguments
    /// * `period`: 时间桶。
    ///
    /// # Returns
    /// 持有一根空 K 线的构建器。
    pub fn new(period: TimePeriod) -> Self {
        Self {
            candle: Candle::new(period),
        }
    }

    /// # Summary
    /// 折叠一笔成交。
    ///
    /// # Logic
    /// 1. 首笔成交：开、收、高、低均取成交价，成交量取成交数量。
    /// 2. 后续成交：收盘价覆盖，高低价取极值，成交量累加。
    /// 3. 成交笔数加一。
    ///
    /// # Arguments
    /// * `amount`: 成交数量，约定非负。累计成交量不得超过 `Decimal::MAX`（约 7.9e28），
    ///   超出时 `Decimal` 加法会 panic；需要可恢复错误时请先用 `checked_add` 自行校验。
    /// * `price`: 成交价格。
    pub fn add_trade(&mut self, amount: Decimal, price: Decimal) {
        let c = &mut self.candle;
        if c.trade_count == 0 {
            c.open_price = price;
            c.max_price = price;
            c.min_price = price;
            c.volume = amount;
        } else {
            c.max_price = c.max_price.max(price);
            c.min_price = c.min_price.min(price);
            c.volume += amount;
        }
        c.close_price = price;
        c.trade_count += 1;
    }

    /// 折叠带时间戳的成交，并把 `ctime` 更新为成交时间。
    pub fn record(&mut self, trade: &Trade) {
        self.add_trade(trade.amount, trade.price);
        self.candle.ctime = trade.time;
    }

    pub fn period(&self) -> TimePeriod {
        self.candle.period
    }

    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.candle.period.contains(instant)
    }

    pub fn candle(&self) -> &Candle {
        &self.candle
    }

    /// 返回当前 K 线的独立副本，后续折叠不会影响它。
    pub fn snapshot(&self) -> Candle {
        self.candle.clone()
    }

    /// 结束构建，把 K 线所有权交给调用方。
    pub fn finish(self) -> Candle {
        self.candle
    }
}

use crate::common::TimePeriod;
use crate::market::error::MarketError;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// # Summary
/// 单根 K 线数据实体，记录一个固定时间桶内的 OHLCV 统计。
///
/// # Invariants
/// - 至少折叠过一笔成交后，`min_price` 不大于 `open_price`、`close_price`、`max_price`。
/// - `volume` 在同一根 K 线内单调不减（成交量非负时）。
/// - `confirm` 由调用方维护，聚合引擎不修改它（新建桶时置 0）。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candle {
    // 所属时间桶
    pub period: TimePeriod,
    // 开盘价：桶内第一笔成交价
    pub open_price: Decimal,
    // 收盘价：最近一笔成交价
    pub close_price: Decimal,
    // 最高价
    pub max_price: Decimal,
    // 最低价
    pub min_price: Decimal,
    // 成交量
    pub volume: Decimal,
    // 成交笔数
    pub trade_count: u64,
    // 最后一次贡献数据的时间
    pub ctime: DateTime<Utc>,
    // 收盘确认标记 (0 = 未确认)
    pub confirm: i32,
}

impl Candle {
    /// # Summary
    /// 为指定时间桶创建一根空 K 线。
    ///
    /// # Logic
    /// 价格与成交量全部置零，`trade_count` 为 0，`ctime` 取桶起点。
    ///
    /// # Arguments
    /// * `period`: 外部分配的时间桶。
    ///
    /// # Returns
    /// 尚未折叠任何成交的 K 线。
    pub fn new(period: TimePeriod) -> Self {
        Self {
            period,
            open_price: Decimal::ZERO,
            close_price: Decimal::ZERO,
            max_price: Decimal::ZERO,
            min_price: Decimal::ZERO,
            volume: Decimal::ZERO,
            trade_count: 0,
            ctime: period.start(),
            confirm: 0,
        }
    }

    /// 是否还没有任何成交折叠进来。
    pub fn is_empty(&self) -> bool {
        self.trade_count == 0
    }
}

impl std::fmt::Display for Candle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "Time:\t{}\nOpen:\t{:.2}\nClose:\t{:.2}\nHigh:\t{:.2}\nLow:\t{:.2}\nVolume:\t{:.2}",
            self.period,
            self.open_price,
            self.close_price,
            self.max_price,
            self.min_price,
            self.volume,
        )
    }
}

/// # Summary
/// 单笔成交事件。
///
/// # Invariants
/// - `amount` 约定非负，本类型不做校验。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Trade {
    // 成交时间
    pub time: DateTime<Utc>,
    // 成交数量
    pub amount: Decimal,
    // 成交价格
    pub price: Decimal,
}

impl FromStr for Trade {
    type Err = MarketError;

    /// 解析 `<rfc3339 时间>,<数量>,<价格>` 格式的一行文本。
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut fields = s.split(',').map(str::trim);
        let (Some(time), Some(amount), Some(price), None) =
            (fields.next(), fields.next(), fields.next(), fields.next())
        else {
            return Err(MarketError::Parse(format!(
                "expected `time,amount,price`, got `{}`",
                s
            )));
        };

        let time = DateTime::parse_from_rfc3339(time)
            .map_err(|e| MarketError::Parse(format!("time `{}`: {}", time, e)))?
            .with_timezone(&Utc);
        let amount = Decimal::from_str(amount)
            .map_err(|e| MarketError::Parse(format!("amount `{}`: {}", amount, e)))?;
        let price = Decimal::from_str(price)
            .map_err(|e| MarketError::Parse(format!("price `{}`: {}", price, e)))?;

        Ok(Self {
            time,
            amount,
            price,
        })
    }
}

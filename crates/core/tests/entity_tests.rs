use chrono::{DateTime, TimeDelta, Utc};
use kline_core::common::{TimeFrame, TimePeriod};
use kline_core::market::entity::{Candle, Trade};
use kline_core::market::error::MarketError;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

fn ts(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

#[test]
fn test_period_is_half_open() {
    let period = TimePeriod::new(ts(0), TimeDelta::seconds(10)).unwrap();
    assert_eq!(period.start(), ts(0));
    assert_eq!(period.end(), ts(10));
    assert_eq!(period.length(), TimeDelta::seconds(10));

    assert!(period.contains(ts(0)));
    assert!(period.contains(ts(9)));
    assert!(!period.contains(ts(10)));
    assert!(!period.contains(ts(-1)));
}

#[test]
fn test_period_rejects_non_positive_duration() {
    let zero = TimePeriod::new(ts(0), TimeDelta::zero());
    assert!(matches!(zero, Err(MarketError::InvalidDuration(_))));

    let negative = TimePeriod::new(ts(0), TimeDelta::seconds(-5));
    assert!(matches!(negative, Err(MarketError::InvalidDuration(_))));
}

#[test]
fn test_period_aligned_to_epoch() {
    // 10:07:30 落在 10:05 开始的 5 分钟桶中
    let instant = ts(10 * 3600 + 7 * 60 + 30);
    let period = TimePeriod::aligned(instant, TimeDelta::minutes(5)).unwrap();
    assert_eq!(period.start(), ts(10 * 3600 + 5 * 60));
    assert_eq!(period.end(), ts(10 * 3600 + 10 * 60));

    // 恰好在边界上的时刻属于以它开始的桶
    let boundary = TimePeriod::aligned(ts(600), TimeDelta::minutes(5)).unwrap();
    assert_eq!(boundary.start(), ts(600));

    // 纪元之前的时刻向下取整
    let before_epoch = TimePeriod::aligned(ts(-1), TimeDelta::seconds(10)).unwrap();
    assert_eq!(before_epoch.start(), ts(-10));
}

#[test]
fn test_period_display() {
    let period = TimePeriod::new(ts(0), TimeDelta::hours(1)).unwrap();
    assert_eq!(
        period.to_string(),
        "1970-01-01T00:00:00 -> 1970-01-01T01:00:00"
    );
}

#[test]
fn test_timeframe_parse_and_display() {
    for tf in [
        TimeFrame::Minute1,
        TimeFrame::Minute5,
        TimeFrame::Minute15,
        TimeFrame::Minute30,
        TimeFrame::Hour1,
        TimeFrame::Hour4,
        TimeFrame::Day1,
    ] {
        assert_eq!(tf.to_string().parse::<TimeFrame>().unwrap(), tf);
    }
    assert_eq!("HOUR1".parse::<TimeFrame>().unwrap(), TimeFrame::Hour1);
    assert_eq!(TimeFrame::Minute15.duration(), TimeDelta::minutes(15));
    assert_eq!(TimeFrame::Day1.duration(), TimeDelta::hours(24));
    assert!("2w".parse::<TimeFrame>().is_err());
}

#[test]
fn test_new_candle_is_empty() {
    let period = TimePeriod::new(ts(60), TimeDelta::minutes(1)).unwrap();
    let candle = Candle::new(period);

    assert!(candle.is_empty());
    assert_eq!(candle.period, period);
    assert_eq!(candle.open_price, Decimal::ZERO);
    assert_eq!(candle.close_price, Decimal::ZERO);
    assert_eq!(candle.max_price, Decimal::ZERO);
    assert_eq!(candle.min_price, Decimal::ZERO);
    assert_eq!(candle.volume, Decimal::ZERO);
    assert_eq!(candle.trade_count, 0);
    assert_eq!(candle.ctime, ts(60));
    assert_eq!(candle.confirm, 0);
}

#[test]
fn test_candle_display() {
    let period = TimePeriod::new(ts(0), TimeDelta::minutes(1)).unwrap();
    let candle = Candle {
        open_price: dec!(100),
        close_price: dec!(101.5),
        max_price: dec!(102.25),
        min_price: dec!(99.1),
        volume: dec!(12),
        trade_count: 3,
        ..Candle::new(period)
    };

    let expected = "Time:\t1970-01-01T00:00:00 -> 1970-01-01T00:01:00\n\
                    Open:\t100.00\n\
                    Close:\t101.50\n\
                    High:\t102.25\n\
                    Low:\t99.10\n\
                    Volume:\t12.00";
    assert_eq!(candle.to_string(), expected);
}

#[test]
fn test_trade_parse() -> anyhow::Result<()> {
    let trade: Trade = "2024-03-01T09:30:00Z, 1.5, 101.25".parse()?;
    assert_eq!(
        trade.time,
        DateTime::parse_from_rfc3339("2024-03-01T09:30:00Z")?.with_timezone(&Utc)
    );
    assert_eq!(trade.amount, dec!(1.5));
    assert_eq!(trade.price, dec!(101.25));

    // 带时区偏移的时间统一换算到 UTC
    let offset: Trade = "2024-03-01T17:30:00+08:00,2,100".parse()?;
    assert_eq!(offset.time, trade.time);
    Ok(())
}

#[test]
fn test_trade_parse_rejects_malformed_lines() {
    for line in [
        "",
        "2024-03-01T09:30:00Z,1",
        "2024-03-01T09:30:00Z,1,2,3",
        "yesterday,1,2",
        "2024-03-01T09:30:00Z,one,2",
        "2024-03-01T09:30:00Z,1,two",
    ] {
        let result = line.parse::<Trade>();
        assert!(
            matches!(result, Err(MarketError::Parse(_))),
            "line `{}` should not parse",
            line
        );
    }
}

#[test]
fn test_period_deserialize_validates_bounds() -> anyhow::Result<()> {
    let period: TimePeriod = serde_json::from_str(
        r#"{"start":"1970-01-01T00:00:00Z","end":"1970-01-01T00:01:00Z"}"#,
    )?;
    assert_eq!(period, TimePeriod::new(ts(0), TimeDelta::minutes(1))?);

    // 序列化后能原样读回
    let json = serde_json::to_string(&period)?;
    assert_eq!(serde_json::from_str::<TimePeriod>(&json)?, period);

    for bad in [
        r#"{"start":"1970-01-01T00:01:00Z","end":"1970-01-01T00:00:00Z"}"#,
        r#"{"start":"1970-01-01T00:00:00Z","end":"1970-01-01T00:00:00Z"}"#,
    ] {
        assert!(serde_json::from_str::<TimePeriod>(bad).is_err());
    }
    Ok(())
}

#[test]
fn test_candle_json_keeps_exact_decimals() -> anyhow::Result<()> {
    let period = TimePeriod::new(ts(0), TimeDelta::minutes(1))?;
    let candle = Candle {
        open_price: dec!(100.10),
        close_price: dec!(0.123456789012345678901234567),
        volume: dec!(12.50),
        ..Candle::new(period)
    };

    let json = serde_json::to_value(&candle)?;
    assert_eq!(json["open_price"], "100.10");
    assert_eq!(json["close_price"], "0.123456789012345678901234567");
    assert_eq!(json["volume"], "12.50");
    assert_eq!(json["period"]["start"], "1970-01-01T00:00:00Z");

    let back: Candle = serde_json::from_value(json)?;
    assert_eq!(back, candle);
    Ok(())
}

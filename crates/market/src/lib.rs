//! 成交到 K 线、细粒度 K 线到粗粒度 K 线的聚合引擎。

pub mod aggregator;
pub mod builder;
pub mod resampler;

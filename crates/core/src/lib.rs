//! K 线聚合领域的核心类型：时间区间、K 线实体、错误与配置。

pub mod common;
pub mod config;
pub mod market;

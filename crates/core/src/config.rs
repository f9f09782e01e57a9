use crate::common::TimeFrame;
use serde::{Deserialize, Serialize};

/// 全局应用配置
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub pipeline: PipelineConfig,
    pub log: LogConfig,
}

/// 成交 -> 细粒度 K 线 -> 粗粒度 K 线 的周期配置
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    // 成交聚合使用的细粒度周期
    pub source_frame: TimeFrame,
    // 重采样目标周期
    pub target_frame: TimeFrame,
    pub output: OutputFormat,
}

/// K 线快照的输出格式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LogConfig {
    // EnvFilter 指令，例如 "info" 或 "kline_market=debug"
    pub level: String,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            source_frame: TimeFrame::Minute1,
            target_frame: TimeFrame::Hour1,
            output: OutputFormat::Text,
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

mod pipeline;

use kline_core::config::{AppConfig, OutputFormat};
use kline_core::market::entity::{Candle, Trade};
use pipeline::Pipeline;
use std::io::{self, BufRead, Write};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// # Summary
/// 加载配置。
///
/// # Logic
/// 1. 读取可选的 `kline.toml`。
/// 2. 使用 `KLINE_` 前缀的环境变量覆盖，层级以 `__` 分隔，例如 `KLINE_PIPELINE__TARGET_FRAME=4h`。
fn load_config(env: config::Environment) -> Result<AppConfig, config::ConfigError> {
    config::Config::builder()
        .add_source(config::File::with_name("kline").required(false))
        .add_source(env)
        .build()?
        .try_deserialize()
}

fn environment() -> config::Environment {
    config::Environment::with_prefix("KLINE")
        .prefix_separator("_")
        .separator("__")
}

fn write_candle(out: &mut impl Write, candle: &Candle, format: OutputFormat) -> io::Result<()> {
    match format {
        OutputFormat::Text => writeln!(out, "{}\n", candle),
        OutputFormat::Json => {
            serde_json::to_writer(&mut *out, candle)?;
            writeln!(out)
        }
    }
}

/// # Summary
/// 命令行入口：从标准输入读取成交，输出重采样后的 K 线快照。
///
/// # Logic
/// 1. 加载配置并初始化日志（`RUST_LOG` 优先于配置中的级别）。
/// 2. 逐行解析 `<rfc3339>,<数量>,<价格>`，跳过空行与 `#` 注释，格式错误的行告警后跳过。
/// 3. 成交经流水线聚合与重采样，每个快照写到标准输出。
/// 4. 输入结束后冲刷最后一根 K 线。
fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = load_config(environment())?;

    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log.level))?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();
    info!(
        "kline starting: {} candles resampled to {}",
        config.pipeline.source_frame, config.pipeline.target_frame
    );

    let mut pipeline = Pipeline::new(&config.pipeline)?;
    let format = config.pipeline.output;
    let mut out = io::stdout().lock();

    for (index, line) in io::stdin().lock().lines().enumerate() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }
        let trade = match line.parse::<Trade>() {
            Ok(trade) => trade,
            Err(e) => {
                warn!("skipping line {}: {}", index + 1, e);
                continue;
            }
        };
        if let Some(candle) = pipeline.push(&trade)? {
            write_candle(&mut out, &candle, format)?;
        }
    }

    if let Some(candle) = pipeline.finish()? {
        write_candle(&mut out, &candle, format)?;
    }
    out.flush()?;

    info!("input exhausted, exiting");
    Ok(())
}

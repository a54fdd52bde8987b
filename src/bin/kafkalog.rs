//! kafkalog：把 stdin 中的日志行逐行转发到 Kafka
//!
//! 非 UTF-8 字节按替换字符转发；读取 stdin 出错时关闭生产者后以非零状态退出
//!
//! ```bash
//! KAFKA_BROKERS=127.0.0.1:9092 my-service 2>&1 | kafkalog my-service
//! ```

use std::time::Duration;

use anyhow::Context;
use clap::Parser;
use tokio::io::BufReader;
use tracing::{error, info};

use flare_kafkalog::runtime::{RuntimeConfig, close_with_timeout, forward_lines, shutdown_signal};
use flare_kafkalog::{Config, LogProducer, init_tracing};

#[derive(Debug, Parser)]
#[command(name = "kafkalog", version, about = "Forward stdin log lines to the Kafka `logs` topic")]
struct Args {
    /// 写入信封的 logger 标识
    logger_id: String,

    /// TOML 配置文件，broker 未配置时读取 KAFKA_BROKERS
    #[arg(long, env = "KAFKALOG_CONFIG")]
    config: Option<String>,

    /// 关闭生产者的超时时间（秒）
    #[arg(long, default_value_t = 5)]
    shutdown_timeout_secs: u64,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();

    let config = match &args.config {
        Some(path) => Config::load_from_file(path)?,
        None => Config::default(),
    }
    .with_env_brokers()?;

    init_tracing(&config.telemetry)?;

    let runtime_config =
        RuntimeConfig::new().with_shutdown_timeout(Duration::from_secs(args.shutdown_timeout_secs));

    let producer = LogProducer::builder(&args.logger_id)
        .settings(config.producer)
        .build()
        .context("failed to start kafka log producer")?;

    let mut stdin = BufReader::new(tokio::io::stdin());
    let read_result = tokio::select! {
        result = forward_lines(&mut stdin, &producer) => result.map(Some),
        _ = shutdown_signal() => Ok(None),
    };
    match &read_result {
        Ok(Some(forwarded)) => info!(forwarded, "stdin closed"),
        Ok(None) => info!("Stopped reading stdin on shutdown signal"),
        Err(e) => error!(error = %e, "Failed reading stdin"),
    }

    close_with_timeout(&producer, runtime_config.shutdown_timeout)
        .await
        .context("failed to close kafka log producer")?;
    read_result.context("failed reading stdin")?;

    info!(logger_id = %args.logger_id, "kafkalog exited");
    Ok(())
}

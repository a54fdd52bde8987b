//! 关闭信号与限时关闭

use std::time::Duration;

use tracing::{info, warn};

use crate::error::{LogProducerError, Result};
use crate::producer::LogSender;

/// 等待进程关闭信号（SIGINT / SIGTERM，非 unix 平台为 Ctrl+C）
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{SignalKind, signal};

        let (mut sigint, mut sigterm) =
            match (signal(SignalKind::interrupt()), signal(SignalKind::terminate())) {
                (Ok(sigint), Ok(sigterm)) => (sigint, sigterm),
                (Err(e), _) | (_, Err(e)) => {
                    warn!(error = %e, "Failed to install unix signal handlers, falling back to Ctrl+C");
                    ctrl_c().await;
                    return;
                }
            };

        tokio::select! {
            _ = sigint.recv() => info!(signal = "SIGINT", "Shutdown signal received"),
            _ = sigterm.recv() => info!(signal = "SIGTERM", "Shutdown signal received"),
        }
    }

    #[cfg(not(unix))]
    ctrl_c().await;
}

async fn ctrl_c() {
    match tokio::signal::ctrl_c().await {
        Ok(()) => info!("Shutdown signal received (Ctrl+C)"),
        Err(e) => {
            warn!(error = %e, "Failed to listen for Ctrl+C, waiting forever");
            std::future::pending::<()>().await;
        }
    }
}

/// 在限定时间内关闭生产者
///
/// 超时返回 `CloseTimeout`，底层关闭过程不会被强制中断
pub async fn close_with_timeout<S>(sender: &S, timeout: Duration) -> Result<()>
where
    S: LogSender + ?Sized,
{
    match tokio::time::timeout(timeout, sender.close()).await {
        Ok(result) => result,
        Err(_) => {
            warn!(timeout = ?timeout, "Kafka producer close timeout");
            Err(LogProducerError::CloseTimeout(timeout))
        }
    }
}

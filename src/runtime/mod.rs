//! 宿主进程生命周期
//!
//! 库本身不注册信号处理，由宿主进程等待关闭信号后在限定时间内关闭生产者：
//!
//! ```rust,no_run
//! use flare_kafkalog::runtime::{RuntimeConfig, close_with_timeout, shutdown_signal};
//! use flare_kafkalog::LogProducer;
//!
//! # async fn run() -> anyhow::Result<()> {
//! let config = RuntimeConfig::default();
//! let producer = LogProducer::builder("my-service").build()?;
//!
//! shutdown_signal().await;
//! close_with_timeout(&producer, config.shutdown_timeout).await?;
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod forward;
pub mod shutdown;

pub use config::RuntimeConfig;
pub use forward::forward_lines;
pub use shutdown::{close_with_timeout, shutdown_signal};

//! Flare Kafka Log 错误处理模块
//!
//! 启动和关闭阶段的错误通过 `LogProducerError` 返回给宿主进程，
//! 由宿主决定是否终止；单条消息的编码和投递失败只记录日志，不向调用方传播

pub mod kafkalog_error;

pub use kafkalog_error::{LogProducerError, Result};

/// 缺少 `KAFKA_BROKERS` 环境变量时的错误标识
pub const NO_KAFKA_BROKERS: &str = "NO_KAFKA_BROKERS_ARG_IN_ENV";

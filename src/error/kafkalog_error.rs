//! Flare Kafka Log 统一错误类型

use std::time::Duration;
use thiserror::Error;

use super::NO_KAFKA_BROKERS;

/// 日志生产者错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LogProducerError {
    /// 环境变量中没有可用的 broker 地址
    #[error("{}", NO_KAFKA_BROKERS)]
    MissingBrokers,

    /// 底层客户端构建失败（原样保留客户端的错误信息）
    #[error("{0}")]
    Client(String),

    /// 日志信封编码失败
    #[error("failed to encode log envelope: {0}")]
    Encode(String),

    /// 关闭底层生产者失败
    #[error("failed to close kafka producer: {0}")]
    Close(String),

    /// 关闭超时
    #[error("kafka producer close timed out after {0:?}")]
    CloseTimeout(Duration),

    /// 配置无效
    #[error("invalid configuration: {0}")]
    Config(String),
}

impl LogProducerError {
    /// 创建客户端错误
    pub fn client(msg: impl Into<String>) -> Self {
        LogProducerError::Client(msg.into())
    }

    /// 创建编码错误
    pub fn encode(msg: impl Into<String>) -> Self {
        LogProducerError::Encode(msg.into())
    }

    /// 创建关闭错误
    pub fn close(msg: impl Into<String>) -> Self {
        LogProducerError::Close(msg.into())
    }

    /// 创建配置错误
    pub fn config(msg: impl Into<String>) -> Self {
        LogProducerError::Config(msg.into())
    }
}

impl From<toml::de::Error> for LogProducerError {
    fn from(err: toml::de::Error) -> Self {
        LogProducerError::Config(err.to_string())
    }
}

/// 结果类型别名
pub type Result<T> = std::result::Result<T, LogProducerError>;

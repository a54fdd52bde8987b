//! 异步生产者抽象
//!
//! 适配器只依赖这里定义的接口，底层客户端（rdkafka 或测试桩）通过
//! [`ProducerFactory`] 在构建时注入：
//!
//! - 输入通道：有界 `mpsc`，容量等于 `channel_buffer_size`
//! - 错误通道：客户端异步上报的投递失败
//! - `close`：停止接收并刷出缓冲中的消息

pub mod log_producer;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::fmt;
use tokio::sync::mpsc;

use crate::config::ProducerSettings;
use crate::error::Result;

pub use log_producer::{LogProducer, LogProducerBuilder, LogSender};

/// 待发送的消息
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProducerRecord {
    pub topic: String,
    pub key: Option<Vec<u8>>,
    pub value: Vec<u8>,
    pub timestamp: DateTime<Utc>,
}

impl ProducerRecord {
    /// 创建不带 key 的消息，使用 Kafka 默认分区策略
    pub fn keyless(topic: impl Into<String>, value: Vec<u8>, timestamp: DateTime<Utc>) -> Self {
        Self {
            topic: topic.into(),
            key: None,
            value,
            timestamp,
        }
    }
}

/// 客户端上报的投递失败
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeliveryError {
    pub topic: String,
    pub reason: String,
}

impl DeliveryError {
    pub fn new(topic: impl Into<String>, reason: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            reason: reason.into(),
        }
    }
}

impl fmt::Display for DeliveryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "topic {}: {}", self.topic, self.reason)
    }
}

/// 异步生产者客户端
#[async_trait]
pub trait AsyncProducer: Send + Sync {
    /// 输入通道的发送端
    fn input(&self) -> mpsc::Sender<ProducerRecord>;

    /// 取走错误通道（只能取一次）
    fn take_errors(&mut self) -> Option<mpsc::Receiver<DeliveryError>>;

    /// 关闭客户端，刷出已入队的消息
    async fn close(self: Box<Self>) -> Result<()>;
}

/// 客户端工厂
pub trait ProducerFactory: Send + Sync {
    fn create(&self, settings: &ProducerSettings) -> Result<Box<dyn AsyncProducer>>;
}

impl<F> ProducerFactory for F
where
    F: Fn(&ProducerSettings) -> Result<Box<dyn AsyncProducer>> + Send + Sync,
{
    fn create(&self, settings: &ProducerSettings) -> Result<Box<dyn AsyncProducer>> {
        self(settings)
    }
}

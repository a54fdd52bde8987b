//! Flare Kafka Log
//!
//! 把应用日志行包装为带时间和 logger 标识的信封，通过异步生产者写入 Kafka `logs` topic。
//! 分区、批量、压缩、重试等全部交给底层客户端（rdkafka）处理。

pub mod config;
pub mod envelope;
pub mod error;
pub mod producer;
pub mod runtime;
pub mod telemetry;

// Kafka 客户端模块（可选）
#[cfg(feature = "kafka")]
pub mod kafka;

// Re-exports
pub use config::{BROKERS_ENV, Compression, Config, DEFAULT_TOPIC, ProducerSettings, RequiredAcks};
pub use envelope::{EnvelopeEncoder, JsonEncoder, format_envelope};
pub use error::{LogProducerError, NO_KAFKA_BROKERS, Result};
pub use producer::{
    AsyncProducer, DeliveryError, LogProducer, LogProducerBuilder, LogSender, ProducerFactory,
    ProducerRecord,
};
pub use runtime::{RuntimeConfig, close_with_timeout, forward_lines, shutdown_signal};
pub use telemetry::{LogFormat, TelemetryConfig, init_tracing};

// Kafka 客户端 re-exports（可选）
#[cfg(feature = "kafka")]
pub use kafka::{KafkaAsyncProducer, KafkaProducerFactory, build_kafka_producer};

//! Kafka 工具模块
//!
//! 基于 rdkafka 的异步生产者实现
//!
//! 此模块需要启用 `kafka` feature 才能使用

pub mod async_producer;
pub mod producer_builder;
pub mod producer_config;

pub use async_producer::{KafkaAsyncProducer, KafkaProducerFactory};
pub use producer_builder::build_kafka_producer;
pub use producer_config::KafkaProducerConfig;

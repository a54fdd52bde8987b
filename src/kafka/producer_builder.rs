//! Kafka 生产者构建器

use rdkafka::config::ClientConfig;
use rdkafka::producer::FutureProducer;
use tracing::info;

use crate::kafka::producer_config::KafkaProducerConfig;

/// 构建 Kafka 生产者
///
/// # 参数
/// * `config` - 实现了 `KafkaProducerConfig` trait 的配置对象
///
/// # 返回
/// * `Result<FutureProducer>` - 构建好的生产者
pub fn build_kafka_producer(
    config: &dyn KafkaProducerConfig,
) -> Result<FutureProducer, rdkafka::error::KafkaError> {
    // 只负责创建客户端，连接 broker 在后台进行
    let producer: FutureProducer = ClientConfig::new()
        .set("bootstrap.servers", config.kafka_bootstrap())
        .set("message.timeout.ms", config.message_timeout_ms().to_string())
        .set("acks", config.required_acks())
        .set("compression.type", config.compression_type())
        .set("broker.version.fallback", config.broker_version_fallback())
        .set("security.protocol", "plaintext")
        .create()?;

    info!(
        bootstrap = %config.kafka_bootstrap(),
        timeout_ms = config.message_timeout_ms(),
        acks = %config.required_acks(),
        compression = %config.compression_type(),
        "Kafka producer created successfully"
    );

    Ok(producer)
}

//! Kafka 生产者配置 Trait
//!
//! 定义 rdkafka 客户端需要的配置项，默认值对应日志管道的投递策略

use crate::config::ProducerSettings;

/// Kafka 生产者配置 Trait
///
/// 任何需要构建 Kafka 生产者的配置都应该实现此 trait
pub trait KafkaProducerConfig: Send + Sync {
    /// Kafka Bootstrap Servers 地址（逗号分隔）
    fn kafka_bootstrap(&self) -> String;

    /// 消息超时时间（毫秒），默认 5000
    fn message_timeout_ms(&self) -> u64 {
        5000
    }

    /// 确认模式，默认 "0"（不等待 broker 响应）
    /// 可选值: "0", "1", "all"
    fn required_acks(&self) -> &str {
        "0"
    }

    /// 压缩类型，默认 "gzip"
    /// 可选值: "none", "gzip", "snappy", "lz4", "zstd"
    fn compression_type(&self) -> &str {
        "gzip"
    }

    /// 无法探测 broker 版本时使用的协议版本，默认 "0.11.0.0"
    fn broker_version_fallback(&self) -> &str {
        "0.11.0.0"
    }
}

impl KafkaProducerConfig for ProducerSettings {
    fn kafka_bootstrap(&self) -> String {
        self.bootstrap_servers()
    }

    fn message_timeout_ms(&self) -> u64 {
        self.message_timeout_ms
    }

    fn required_acks(&self) -> &str {
        self.required_acks.as_str()
    }

    fn compression_type(&self) -> &str {
        self.compression.as_str()
    }

    fn broker_version_fallback(&self) -> &str {
        &self.kafka_version
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{Compression, RequiredAcks};

    #[test]
    fn settings_map_to_librdkafka_values() {
        let mut settings = ProducerSettings::default().with_brokers(["a:9092", "b:9092"]);
        assert_eq!(settings.kafka_bootstrap(), "a:9092,b:9092");
        assert_eq!(settings.required_acks(), "0");
        assert_eq!(settings.compression_type(), "gzip");
        assert_eq!(settings.broker_version_fallback(), "0.11.0.0");

        settings.required_acks = RequiredAcks::WaitForLocal;
        settings.compression = Compression::Zstd;
        assert_eq!(settings.required_acks(), "1");
        assert_eq!(settings.compression_type(), "zstd");
    }
}

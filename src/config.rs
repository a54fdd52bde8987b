use serde::{Deserialize, Serialize};

use crate::error::{LogProducerError, Result};
use crate::telemetry::TelemetryConfig;

/// broker 地址列表所在的环境变量
pub const BROKERS_ENV: &str = "KAFKA_BROKERS";

/// 日志写入的固定 topic
pub const DEFAULT_TOPIC: &str = "logs";

#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub producer: ProducerSettings,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// 生产者配置
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
pub struct ProducerSettings {
    #[serde(default)]
    pub brokers: Vec<String>,
    #[serde(default = "default_topic")]
    pub topic: String,
    #[serde(default)]
    pub required_acks: RequiredAcks,
    #[serde(default)]
    pub compression: Compression,
    #[serde(default = "default_channel_buffer_size")]
    pub channel_buffer_size: usize,
    #[serde(default = "default_kafka_version")]
    pub kafka_version: String,
    #[serde(default = "default_message_timeout_ms")]
    pub message_timeout_ms: u64,
}

/// 确认模式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RequiredAcks {
    /// 发出即忘，不等待 broker 确认
    #[default]
    NoResponse,
    WaitForLocal,
    WaitForAll,
}

impl RequiredAcks {
    /// librdkafka `acks` 取值
    pub fn as_str(&self) -> &'static str {
        match self {
            RequiredAcks::NoResponse => "0",
            RequiredAcks::WaitForLocal => "1",
            RequiredAcks::WaitForAll => "all",
        }
    }
}

/// 压缩算法
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Compression {
    None,
    #[default]
    Gzip,
    Snappy,
    Lz4,
    Zstd,
}

impl Compression {
    /// librdkafka `compression.type` 取值
    pub fn as_str(&self) -> &'static str {
        match self {
            Compression::None => "none",
            Compression::Gzip => "gzip",
            Compression::Snappy => "snappy",
            Compression::Lz4 => "lz4",
            Compression::Zstd => "zstd",
        }
    }
}

fn default_topic() -> String {
    DEFAULT_TOPIC.to_string()
}

fn default_channel_buffer_size() -> usize {
    256
}

fn default_kafka_version() -> String {
    "0.11.0.0".to_string()
}

fn default_message_timeout_ms() -> u64 {
    5000
}

impl Default for ProducerSettings {
    fn default() -> Self {
        Self {
            brokers: Vec::new(),
            topic: default_topic(),
            required_acks: RequiredAcks::default(),
            compression: Compression::default(),
            channel_buffer_size: default_channel_buffer_size(),
            kafka_version: default_kafka_version(),
            message_timeout_ms: default_message_timeout_ms(),
        }
    }
}

impl ProducerSettings {
    /// 从进程环境变量读取 broker 列表，其余使用默认值
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// 通过自定义查找函数读取环境变量
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        Ok(Self {
            brokers: parse_brokers(lookup(BROKERS_ENV).as_deref())?,
            ..Self::default()
        })
    }

    /// 使用指定的 broker 列表
    pub fn with_brokers<I, S>(mut self, brokers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.brokers = brokers.into_iter().map(Into::into).collect();
        self
    }

    /// 逗号拼接的 broker 地址，用于 `bootstrap.servers`
    pub fn bootstrap_servers(&self) -> String {
        self.brokers.join(",")
    }

    /// 校验配置
    pub fn validate(&self) -> Result<()> {
        if self.brokers.iter().all(|b| b.trim().is_empty()) {
            return Err(LogProducerError::MissingBrokers);
        }
        if self.topic.is_empty() {
            return Err(LogProducerError::config("topic must not be empty"));
        }
        if self.channel_buffer_size == 0 {
            return Err(LogProducerError::config(
                "channel_buffer_size must be greater than 0",
            ));
        }
        Ok(())
    }
}

/// 解析逗号分隔的 `host:port` 列表
///
/// 未设置或去除空白后为空时返回 `MissingBrokers`
pub fn parse_brokers(raw: Option<&str>) -> Result<Vec<String>> {
    let brokers: Vec<String> = raw
        .unwrap_or_default()
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .collect();

    if brokers.is_empty() {
        return Err(LogProducerError::MissingBrokers);
    }
    Ok(brokers)
}

impl Config {
    pub fn load_from_file(path: &str) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| LogProducerError::config(format!("{path}: {e}")))?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// 文件中未给出 broker 时从环境变量补齐
    pub fn with_env_brokers(mut self) -> Result<Self> {
        if self.producer.brokers.is_empty() {
            self.producer.brokers = parse_brokers(std::env::var(BROKERS_ENV).ok().as_deref())?;
        }
        Ok(self)
    }
}

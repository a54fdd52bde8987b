//! 日志信封
//!
//! 每条日志被包装为 `[RFC3339 时间] [loggerID] 原始消息`，
//! 再整体编码为一个 JSON 字符串作为 Kafka 消息的 value

use chrono::{DateTime, Local, SecondsFormat};

use crate::error::{LogProducerError, Result};

/// 构建信封字符串
pub fn format_envelope(timestamp: &DateTime<Local>, logger_id: &str, msg: &str) -> String {
    format!(
        "[{}] [{}] {}",
        timestamp.to_rfc3339_opts(SecondsFormat::Secs, true),
        logger_id,
        msg
    )
}

/// 信封编码器
///
/// 默认实现为 [`JsonEncoder`]，测试中可以替换为会失败的实现
pub trait EnvelopeEncoder: Send + Sync {
    fn encode(&self, envelope: &str) -> Result<Vec<u8>>;
}

/// 将信封编码为 JSON 字符串
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl EnvelopeEncoder for JsonEncoder {
    fn encode(&self, envelope: &str) -> Result<Vec<u8>> {
        serde_json::to_vec(envelope).map_err(|e| LogProducerError::encode(e.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn envelope_layout() {
        let ts = Local.with_ymd_and_hms(2024, 5, 1, 10, 0, 0).unwrap();
        let envelope = format_envelope(&ts, "api", "hello");

        let rest = envelope.strip_prefix('[').unwrap();
        let (stamp, tail) = rest.split_once("] ").unwrap();
        assert_eq!(tail, "[api] hello");
        let parsed = DateTime::parse_from_rfc3339(stamp).unwrap();
        assert_eq!(parsed.timestamp(), ts.timestamp());
        assert!(stamp.starts_with("2024-05-01T10:00:00"));
    }

    #[test]
    fn json_encoder_produces_string_literal() {
        let bytes = JsonEncoder.encode("[t] [id] say \"hi\"").unwrap();
        assert_eq!(bytes, br#""[t] [id] say \"hi\"""#.to_vec());

        let decoded: String = serde_json::from_slice(&bytes).unwrap();
        assert_eq!(decoded, "[t] [id] say \"hi\"");
    }
}

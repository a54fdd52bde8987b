//! 日志生产者适配器
//!
//! 将应用日志行包装为信封后投递到 Kafka，投递失败由后台任务记录日志

use std::sync::Arc;

use async_trait::async_trait;
use chrono::{Local, Utc};
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinHandle;
use tracing::{debug, error, info, warn};

use crate::config::ProducerSettings;
use crate::envelope::{EnvelopeEncoder, JsonEncoder, format_envelope};
use crate::error::{LogProducerError, Result};
use crate::producer::{AsyncProducer, DeliveryError, ProducerFactory, ProducerRecord};

/// 日志发送能力
#[async_trait]
pub trait LogSender: Send + Sync {
    /// 发送一条日志
    ///
    /// 编码失败或生产者已关闭时丢弃消息，不向调用方返回错误
    async fn send(&self, msg: &str);

    /// 关闭底层生产者
    async fn close(&self) -> Result<()>;
}

/// 日志生产者
///
/// # 使用示例
/// ```rust,no_run
/// use flare_kafkalog::{LogProducer, LogSender};
///
/// # async fn run() -> flare_kafkalog::Result<()> {
/// // 需要 KAFKA_BROKERS=127.0.0.1:9092,127.0.0.1:9093
/// let producer = LogProducer::builder("order-service").build()?;
/// producer.send("order created").await;
/// producer.close().await?;
/// # Ok(())
/// # }
/// ```
pub struct LogProducer {
    logger_id: String,
    topic: String,
    input: mpsc::Sender<ProducerRecord>,
    encoder: Arc<dyn EnvelopeEncoder>,
    client: Mutex<ClientState>,
    error_drain: Mutex<Option<JoinHandle<()>>>,
}

/// 底层客户端的关闭状态
///
/// 客户端关闭在独立任务中执行，调用方的关闭被取消（例如超时）时任务继续运行，
/// 下一次 `close` 接着等待同一个任务
enum ClientState {
    Open(Box<dyn AsyncProducer>),
    Closing(JoinHandle<Result<()>>),
    Closed(Result<()>),
}

impl LogProducer {
    /// 使用 `KAFKA_BROKERS` 和 rdkafka 客户端创建生产者
    ///
    /// 必须在 tokio 运行时内调用
    #[cfg(feature = "kafka")]
    pub fn new(logger_id: impl Into<String>) -> Result<Self> {
        Self::builder(logger_id).build()
    }

    /// 创建构建器
    pub fn builder(logger_id: impl Into<String>) -> LogProducerBuilder {
        LogProducerBuilder::new(logger_id)
    }

    pub fn logger_id(&self) -> &str {
        &self.logger_id
    }

    pub fn topic(&self) -> &str {
        &self.topic
    }

    /// 是否已经成功关闭
    pub async fn is_closed(&self) -> bool {
        matches!(*self.client.lock().await, ClientState::Closed(Ok(())))
    }
}

#[async_trait]
impl LogSender for LogProducer {
    async fn send(&self, msg: &str) {
        let now = Local::now();
        let envelope = format_envelope(&now, &self.logger_id, msg);

        let value = match self.encoder.encode(&envelope) {
            Ok(value) => value,
            Err(e) => {
                warn!(
                    logger_id = %self.logger_id,
                    error = %e,
                    "Failed encoding kafka log message, dropping it"
                );
                return;
            }
        };

        let record = ProducerRecord::keyless(&self.topic, value, now.with_timezone(&Utc));
        if self.input.send(record).await.is_err() {
            warn!(
                logger_id = %self.logger_id,
                topic = %self.topic,
                "Kafka producer input is closed, dropping log message"
            );
        }
    }

    async fn close(&self) -> Result<()> {
        let mut state = self.client.lock().await;

        loop {
            match *state {
                ClientState::Open(_) => {
                    let ClientState::Open(client) =
                        std::mem::replace(&mut *state, ClientState::Closed(Ok(())))
                    else {
                        continue;
                    };
                    *state = ClientState::Closing(tokio::spawn(client.close()));
                }
                ClientState::Closing(ref mut handle) => {
                    let outcome = match handle.await {
                        Ok(result) => result,
                        Err(e) => Err(LogProducerError::close(format!(
                            "close task failed: {e}"
                        ))),
                    };
                    *state = ClientState::Closed(outcome.clone());
                    if let Err(e) = &outcome {
                        error!(
                            logger_id = %self.logger_id,
                            error = %e,
                            "Error closing kafka producer"
                        );
                        return outcome;
                    }
                    break;
                }
                ClientState::Closed(Ok(())) => {
                    debug!(logger_id = %self.logger_id, "Kafka producer already closed");
                    return Ok(());
                }
                ClientState::Closed(Err(ref e)) => {
                    debug!(
                        logger_id = %self.logger_id,
                        error = %e,
                        "Kafka producer close already failed"
                    );
                    return Err(e.clone());
                }
            }
        }

        drop(state);

        // 客户端关闭后错误通道随之关闭，等待剩余的投递错误写完日志
        if let Some(handle) = self.error_drain.lock().await.take() {
            if let Err(e) = handle.await {
                warn!(error = %e, "Kafka error drain task did not finish cleanly");
            }
        }

        info!(logger_id = %self.logger_id, "Kafka producer closed");
        Ok(())
    }
}

/// 后台错误排空循环
async fn drain_errors(logger_id: String, mut errors: mpsc::Receiver<DeliveryError>) {
    while let Some(err) = errors.recv().await {
        error!(
            logger_id = %logger_id,
            topic = %err.topic,
            reason = %err.reason,
            "Failed to write message to topic"
        );
    }
    debug!(logger_id = %logger_id, "Kafka error drain loop finished");
}

/// 日志生产者构建器
pub struct LogProducerBuilder {
    logger_id: String,
    settings: Option<ProducerSettings>,
    factory: Option<Box<dyn ProducerFactory>>,
    encoder: Arc<dyn EnvelopeEncoder>,
}

impl LogProducerBuilder {
    pub fn new(logger_id: impl Into<String>) -> Self {
        Self {
            logger_id: logger_id.into(),
            settings: None,
            factory: None,
            encoder: Arc::new(JsonEncoder),
        }
    }

    /// 指定生产者配置；未指定时从环境变量读取
    pub fn settings(mut self, settings: ProducerSettings) -> Self {
        self.settings = Some(settings);
        self
    }

    /// 指定底层客户端工厂
    pub fn factory(mut self, factory: impl ProducerFactory + 'static) -> Self {
        self.factory = Some(Box::new(factory));
        self
    }

    /// 指定信封编码器
    pub fn encoder(mut self, encoder: impl EnvelopeEncoder + 'static) -> Self {
        self.encoder = Arc::new(encoder);
        self
    }

    /// 构建生产者并启动错误排空任务
    ///
    /// 必须在 tokio 运行时内调用。broker 缺失或客户端构建失败时直接返回错误，不做重试
    pub fn build(self) -> Result<LogProducer> {
        let settings = match self.settings {
            Some(settings) => settings,
            None => ProducerSettings::from_env()?,
        };
        settings.validate()?;

        let factory = match self.factory {
            Some(factory) => factory,
            None => default_factory()?,
        };

        let mut client = factory.create(&settings)?;
        let input = client.input();
        let error_drain = client
            .take_errors()
            .map(|errors| tokio::spawn(drain_errors(self.logger_id.clone(), errors)));

        info!(
            logger_id = %self.logger_id,
            brokers = %settings.bootstrap_servers(),
            topic = %settings.topic,
            compression = settings.compression.as_str(),
            acks = settings.required_acks.as_str(),
            "Kafka log producer created"
        );

        Ok(LogProducer {
            logger_id: self.logger_id,
            topic: settings.topic,
            input,
            encoder: self.encoder,
            client: Mutex::new(ClientState::Open(client)),
            error_drain: Mutex::new(error_drain),
        })
    }
}

#[cfg(feature = "kafka")]
fn default_factory() -> Result<Box<dyn ProducerFactory>> {
    Ok(Box::new(crate::kafka::KafkaProducerFactory))
}

#[cfg(not(feature = "kafka"))]
fn default_factory() -> Result<Box<dyn ProducerFactory>> {
    Err(LogProducerError::config(
        "no producer factory configured, enable the `kafka` feature or call `factory`",
    ))
}

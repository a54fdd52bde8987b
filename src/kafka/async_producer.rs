//! 基于 rdkafka `FutureProducer` 的异步生产者
//!
//! 后台分发任务持有输入通道的接收端，逐条调用 `send_result` 把消息交给
//! librdkafka 的内部队列，投递结果通过错误通道上报

use std::time::Duration;

use async_trait::async_trait;
use futures::FutureExt;
use futures::future::BoxFuture;
use futures::stream::{FuturesUnordered, StreamExt};
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::config::ProducerSettings;
use crate::error::{LogProducerError, Result};
use crate::kafka::producer_builder::build_kafka_producer;
use crate::producer::{AsyncProducer, DeliveryError, ProducerFactory, ProducerRecord};

type PendingDelivery = BoxFuture<'static, Option<DeliveryError>>;

/// rdkafka 异步生产者
pub struct KafkaAsyncProducer {
    input: mpsc::Sender<ProducerRecord>,
    errors: Option<mpsc::Receiver<DeliveryError>>,
    shutdown_tx: Option<oneshot::Sender<()>>,
    dispatcher: JoinHandle<Result<()>>,
}

impl KafkaAsyncProducer {
    /// 创建生产者并启动分发任务
    ///
    /// 必须在 tokio 运行时内调用
    pub fn new(settings: &ProducerSettings) -> Result<Self> {
        let producer =
            build_kafka_producer(settings).map_err(|e| LogProducerError::client(e.to_string()))?;

        let (input_tx, input_rx) = mpsc::channel(settings.channel_buffer_size);
        let (errors_tx, errors_rx) = mpsc::channel(settings.channel_buffer_size);
        let (shutdown_tx, shutdown_rx) = oneshot::channel();
        let flush_timeout = Duration::from_millis(settings.message_timeout_ms);

        let dispatcher = tokio::spawn(dispatch(
            producer,
            input_rx,
            errors_tx,
            shutdown_rx,
            flush_timeout,
        ));

        Ok(Self {
            input: input_tx,
            errors: Some(errors_rx),
            shutdown_tx: Some(shutdown_tx),
            dispatcher,
        })
    }
}

#[async_trait]
impl AsyncProducer for KafkaAsyncProducer {
    fn input(&self) -> mpsc::Sender<ProducerRecord> {
        self.input.clone()
    }

    fn take_errors(&mut self) -> Option<mpsc::Receiver<DeliveryError>> {
        self.errors.take()
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let KafkaAsyncProducer {
            mut shutdown_tx,
            dispatcher,
            ..
        } = *self;

        if let Some(tx) = shutdown_tx.take() {
            let _ = tx.send(());
        }

        match dispatcher.await {
            Ok(result) => result,
            Err(e) => Err(LogProducerError::close(format!("dispatcher task failed: {e}"))),
        }
    }
}

/// 默认的客户端工厂
#[derive(Debug, Clone, Copy, Default)]
pub struct KafkaProducerFactory;

impl ProducerFactory for KafkaProducerFactory {
    fn create(&self, settings: &ProducerSettings) -> Result<Box<dyn AsyncProducer>> {
        Ok(Box::new(KafkaAsyncProducer::new(settings)?))
    }
}

async fn dispatch(
    producer: FutureProducer,
    mut input: mpsc::Receiver<ProducerRecord>,
    errors: mpsc::Sender<DeliveryError>,
    mut shutdown_rx: oneshot::Receiver<()>,
    flush_timeout: Duration,
) -> Result<()> {
    let mut pending: FuturesUnordered<PendingDelivery> = FuturesUnordered::new();

    loop {
        tokio::select! {
            record = input.recv() => match record {
                Some(record) => {
                    if let Some(delivery) = enqueue(&producer, record, &errors).await {
                        pending.push(delivery);
                    }
                }
                None => break,
            },
            Some(outcome) = pending.next(), if !pending.is_empty() => {
                report(outcome, &errors).await;
            }
            _ = &mut shutdown_rx => break,
        }
    }

    // 停止接收新消息，已在通道中的消息仍然投递
    input.close();
    let mut drained = 0usize;
    while let Some(record) = input.recv().await {
        if let Some(delivery) = enqueue(&producer, record, &errors).await {
            pending.push(delivery);
        }
        drained += 1;
    }
    debug!(drained, in_flight = pending.len(), "Kafka producer input drained");

    while let Some(outcome) = pending.next().await {
        report(outcome, &errors).await;
    }

    let flusher = producer.clone();
    tokio::task::spawn_blocking(move || flusher.flush(flush_timeout))
        .await
        .map_err(|e| LogProducerError::close(e.to_string()))?
        .map_err(|e| LogProducerError::close(e.to_string()))?;

    info!("Kafka producer flushed");
    Ok(())
}

/// 把消息交给 librdkafka，返回等待投递结果的 future
///
/// 入队失败（例如内部队列已满）直接作为投递错误上报
async fn enqueue(
    producer: &FutureProducer,
    record: ProducerRecord,
    errors: &mpsc::Sender<DeliveryError>,
) -> Option<PendingDelivery> {
    let mut future_record = FutureRecord::<[u8], [u8]>::to(&record.topic)
        .payload(record.value.as_slice())
        .timestamp(record.timestamp.timestamp_millis());
    if let Some(key) = record.key.as_deref() {
        future_record = future_record.key(key);
    }

    let failed = match producer.send_result(future_record) {
        Ok(delivery) => {
            let topic = record.topic.clone();
            return Some(
                async move {
                    match delivery.await {
                        Ok(Ok(_)) => None,
                        Ok(Err((err, _message))) => Some(DeliveryError::new(topic, err.to_string())),
                        Err(_canceled) => Some(DeliveryError::new(topic, "delivery canceled")),
                    }
                }
                .boxed(),
            );
        }
        Err((err, _)) => DeliveryError::new(&record.topic, err.to_string()),
    };

    report(Some(failed), errors).await;
    None
}

async fn report(outcome: Option<DeliveryError>, errors: &mpsc::Sender<DeliveryError>) {
    if let Some(err) = outcome {
        // 错误通道的接收端已释放时只能丢弃
        let _ = errors.send(err).await;
    }
}

//! 测试用的内存生产者
//!
//! 输入通道的接收端交给测试断言；错误通道的发送端由桩和测试共享，
//! 桩关闭时释放，行为与真实客户端一致

#![allow(dead_code)]

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use tokio::sync::{Notify, mpsc};

use flare_kafkalog::{
    AsyncProducer, DeliveryError, LogProducerError, ProducerFactory, ProducerRecord,
    ProducerSettings, Result,
};

pub const BROKERS: &str = "127.0.0.1:9092,127.0.0.1:9092";

pub fn settings() -> ProducerSettings {
    ProducerSettings::default().with_brokers(BROKERS.split(','))
}

type ErrorSlot = Arc<Mutex<Option<mpsc::Sender<DeliveryError>>>>;

pub struct StubProducer {
    input: mpsc::Sender<ProducerRecord>,
    errors: Option<mpsc::Receiver<DeliveryError>>,
    errors_tx: ErrorSlot,
    close_result: Result<()>,
    closes: Arc<AtomicUsize>,
    close_gate: Option<Arc<Notify>>,
}

#[async_trait]
impl AsyncProducer for StubProducer {
    fn input(&self) -> mpsc::Sender<ProducerRecord> {
        self.input.clone()
    }

    fn take_errors(&mut self) -> Option<mpsc::Receiver<DeliveryError>> {
        self.errors.take()
    }

    async fn close(self: Box<Self>) -> Result<()> {
        let this = *self;
        this.closes.fetch_add(1, Ordering::SeqCst);
        this.errors_tx.lock().unwrap().take();
        if let Some(gate) = this.close_gate {
            gate.notified().await;
        }
        this.close_result
    }
}

/// 只能创建一次的工厂
pub struct StubFactory {
    producer: Mutex<Option<StubProducer>>,
    seen_settings: Arc<Mutex<Option<ProducerSettings>>>,
}

impl ProducerFactory for StubFactory {
    fn create(&self, settings: &ProducerSettings) -> Result<Box<dyn AsyncProducer>> {
        *self.seen_settings.lock().unwrap() = Some(settings.clone());
        let producer = self
            .producer
            .lock()
            .unwrap()
            .take()
            .ok_or_else(|| LogProducerError::client("stub producer already created"))?;
        Ok(Box::new(producer))
    }
}

/// 总是失败的工厂
pub struct FailingFactory(pub &'static str);

impl ProducerFactory for FailingFactory {
    fn create(&self, _settings: &ProducerSettings) -> Result<Box<dyn AsyncProducer>> {
        Err(LogProducerError::client(self.0))
    }
}

pub struct Harness {
    pub records: mpsc::Receiver<ProducerRecord>,
    errors_tx: ErrorSlot,
    closes: Arc<AtomicUsize>,
    seen_settings: Arc<Mutex<Option<ProducerSettings>>>,
}

impl Harness {
    /// 模拟客户端异步上报一次投递失败
    pub async fn emit_error(&self, err: DeliveryError) {
        let tx = self.errors_tx.lock().unwrap().clone();
        if let Some(tx) = tx {
            tx.send(err).await.unwrap();
        }
    }

    pub fn close_count(&self) -> usize {
        self.closes.load(Ordering::SeqCst)
    }

    pub fn seen_settings(&self) -> Option<ProducerSettings> {
        self.seen_settings.lock().unwrap().clone()
    }
}

pub fn stub(close_result: Result<()>) -> (StubFactory, Harness) {
    stub_with(close_result, 256, None)
}

/// 指定输入通道容量；给出 `close_gate` 时关闭会一直挂起，直到 gate 被通知
pub fn stub_with(
    close_result: Result<()>,
    capacity: usize,
    close_gate: Option<Arc<Notify>>,
) -> (StubFactory, Harness) {
    let (input, records) = mpsc::channel(capacity);
    let (errors_tx, errors_rx) = mpsc::channel(16);
    let errors_tx: ErrorSlot = Arc::new(Mutex::new(Some(errors_tx)));
    let closes = Arc::new(AtomicUsize::new(0));
    let seen_settings = Arc::new(Mutex::new(None));

    let factory = StubFactory {
        producer: Mutex::new(Some(StubProducer {
            input,
            errors: Some(errors_rx),
            errors_tx: errors_tx.clone(),
            close_result,
            closes: closes.clone(),
            close_gate,
        })),
        seen_settings: seen_settings.clone(),
    };

    (
        factory,
        Harness {
            records,
            errors_tx,
            closes,
            seen_settings,
        },
    )
}

//! `KAFKA_BROKERS` 环境变量测试
//!
//! 修改进程环境变量，所以集中在同一个测试函数里顺序执行

mod common;

use flare_kafkalog::{BROKERS_ENV, LogProducer, LogProducerError, LogSender};

use common::{BROKERS, FailingFactory, stub};

fn set_brokers(value: Option<&str>) {
    // 本测试二进制只有这一个测试，不存在并发读写环境变量
    unsafe {
        match value {
            Some(value) => std::env::set_var(BROKERS_ENV, value),
            None => std::env::remove_var(BROKERS_ENV),
        }
    }
}

#[tokio::test]
async fn brokers_are_read_from_environment() {
    set_brokers(None);
    let err = LogProducer::builder("testingLogger")
        .factory(FailingFactory("unreachable"))
        .build()
        .err()
        .unwrap();
    assert_eq!(err, LogProducerError::MissingBrokers);
    assert_eq!(err.to_string(), "NO_KAFKA_BROKERS_ARG_IN_ENV");

    set_brokers(Some(""));
    let err = LogProducer::builder("testingLogger")
        .factory(FailingFactory("unreachable"))
        .build()
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "NO_KAFKA_BROKERS_ARG_IN_ENV");

    set_brokers(Some(BROKERS));
    let err = LogProducer::builder("testingLogger")
        .factory(FailingFactory("mock error"))
        .build()
        .err()
        .unwrap();
    assert_eq!(err.to_string(), "mock error");

    let (factory, harness) = stub(Ok(()));
    let producer = LogProducer::builder("testingLogger")
        .factory(factory)
        .build()
        .unwrap();
    assert_eq!(
        harness.seen_settings().unwrap().brokers,
        vec!["127.0.0.1:9092", "127.0.0.1:9092"]
    );
    producer.close().await.unwrap();

    set_brokers(None);
}

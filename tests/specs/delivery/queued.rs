//! Queued delivery specs
//!
//! Verify async batches hand jobs to the queue and the worker advances
//! cursors exactly once per due step.

use crate::prelude::*;

const ASYNC_ONBOARDING: &str = r#"
[delivery]
async_delivery = true
dispatch_queue = "mailers"

[campaign.onboarding]
handler = "OnboardingMailer"

[[campaign.onboarding.step]]
action = "welcome"
delay = "0s"

[[campaign.onboarding.step]]
action = "sms_nudge"
delay = "1day"
handler = "SmsSender"
"#;

#[tokio::test]
async fn worker_delivers_each_enqueued_step_once() {
    let mailer = FakeDispatcher::new();
    let sms = FakeDispatcher::new();
    let table = HandlerTable::new()
        .with("OnboardingMailer", mailer.clone())
        .with("SmsSender", sms.clone());
    let (config, campaigns) = try_load(ASYNC_ONBOARDING, Some(table.catalog())).unwrap();
    let campaigns = Arc::new(campaigns);
    let onboarding = campaigns.get(&CampaignId::new("onboarding")).unwrap().clone();

    let clock = FakeClock::at(t0());
    let store = InMemoryProgressionStore::new();
    for subject in ["user-1", "user-2"] {
        store.enroll(SubjectProgression::enroll(subject, "onboarding", t0()));
    }

    let (queue, rx) = ChannelDispatchQueue::new("mailers", 16);
    let processor = BatchProcessor::new(
        config.clone(),
        clock.clone(),
        BatchDeps {
            source: store.clone(),
            store: store.clone(),
            delivery: Delivery::from_config(&config, NoOpDispatcher, Some(queue)).unwrap(),
        },
    );

    // Two runs before the worker drains: every job is enqueued twice
    let first = processor.run_batch(&onboarding).await.unwrap();
    let second = processor.run_batch(&onboarding).await.unwrap();
    assert_eq!(first.enqueued, 2);
    assert_eq!(second.enqueued, 2);
    assert_eq!(store.records()[0].last_completed_ordinal, None);
    drop(processor);

    let worker = DeliveryWorker::new(campaigns.clone(), store.clone(), table, clock.clone())
        .with_config(&config);
    let report = worker.run(rx).await;

    assert_eq!(report.delivered, 2);
    assert_eq!(report.stale, 2);
    assert_eq!(mailer.calls().len(), 2);
    assert!(sms.calls().is_empty());
    assert!(store
        .records()
        .iter()
        .all(|r| r.last_completed_ordinal == Some(1)));
}

#[tokio::test]
async fn steps_route_to_their_own_handler() {
    let mailer = FakeDispatcher::new();
    let sms = FakeDispatcher::new();
    let table = HandlerTable::new()
        .with("OnboardingMailer", mailer.clone())
        .with("SmsSender", sms.clone());
    let (config, campaigns) = try_load(ASYNC_ONBOARDING, Some(table.catalog())).unwrap();
    let campaigns = Arc::new(campaigns);
    let onboarding = campaigns.get(&CampaignId::new("onboarding")).unwrap().clone();

    let clock = FakeClock::at(t0());
    let store = InMemoryProgressionStore::new();
    store.enroll(SubjectProgression::enroll("user-1", "onboarding", t0()));

    let queue = FakeDispatchQueue::new("mailers");
    let processor = BatchProcessor::new(
        config.clone(),
        clock.clone(),
        BatchDeps {
            source: store.clone(),
            store: store.clone(),
            delivery: Delivery::from_config(&config, NoOpDispatcher, Some(queue.clone()))
                .unwrap(),
        },
    );
    let worker = DeliveryWorker::new(campaigns.clone(), store.clone(), table, clock.clone());

    processor.run_batch(&onboarding).await.unwrap();
    for job in queue.drain() {
        worker.deliver(job).await.unwrap();
    }

    clock.advance(TimeDelta::days(1));
    processor.run_batch(&onboarding).await.unwrap();
    for job in queue.drain() {
        worker.deliver(job).await.unwrap();
    }

    assert_eq!(mailer.calls_for("user-1").len(), 1);
    assert_eq!(sms.calls_for("user-1").len(), 1);
    assert_eq!(sms.calls()[0].action.as_str(), "sms_nudge");
    assert_eq!(store.records()[0].last_completed_ordinal, Some(2));
}

#[tokio::test]
async fn queue_named_differently_from_config_fails_startup() {
    let (config, _) = try_load(ASYNC_ONBOARDING, None).unwrap();
    let (queue, _rx) = ChannelDispatchQueue::new("webhooks", 16);

    let result = Delivery::from_config(&config, NoOpDispatcher, Some(queue));

    assert!(matches!(
        result,
        Err(ConfigurationError::UnknownDispatchQueue { .. })
    ));
}

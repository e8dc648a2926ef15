//! Shared harness for drip specs

#![allow(dead_code)]

pub use chrono::{DateTime, TimeDelta, TimeZone, Utc};
pub use drip_adapters::{
    ChannelDispatchQueue, FakeDispatchQueue, FakeDispatcher, HandlerTable,
    InMemoryProgressionStore, NoOpDispatcher,
};
pub use drip_campaigns::{load_campaigns, LoadError};
pub use drip_core::{
    CampaignDefinition, CampaignId, Campaigns, ConfigurationError, DeliveryConfig, FakeClock,
    HandlerCatalog, SubjectId, SubjectProgression,
};
pub use drip_engine::{BatchDeps, BatchProcessor, BatchResult, Delivery, DeliveryWorker};
pub use std::sync::Arc;

use tempfile::TempDir;

/// Enrollment time shared by every spec
pub fn t0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 4, 1, 9, 0, 0).unwrap()
}

/// Write `content` to a drip file in a fresh temp dir
pub fn drip_file(content: &str) -> (TempDir, std::path::PathBuf) {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("campaigns.toml");
    std::fs::write(&path, content).unwrap();
    (dir, path)
}

/// Load `content` as a drip file, returning the loader's result
pub fn try_load(
    content: &str,
    catalog: Option<HandlerCatalog>,
) -> Result<(DeliveryConfig, Campaigns), LoadError> {
    let (_dir, path) = drip_file(content);
    load_campaigns(&path, catalog)
}

pub type InlineProcessor = BatchProcessor<
    FakeClock,
    InMemoryProgressionStore,
    InMemoryProgressionStore,
    FakeDispatcher,
    FakeDispatchQueue,
>;

/// A loaded drip file with a fake clock, store, and dispatcher
pub struct Drip {
    pub config: DeliveryConfig,
    pub campaigns: Arc<Campaigns>,
    pub clock: FakeClock,
    pub store: InMemoryProgressionStore,
    pub dispatcher: FakeDispatcher,
}

impl Drip {
    pub fn load(content: &str) -> Self {
        let (config, campaigns) = try_load(content, None).unwrap();
        Self {
            config,
            campaigns: Arc::new(campaigns),
            clock: FakeClock::at(t0()),
            store: InMemoryProgressionStore::new(),
            dispatcher: FakeDispatcher::new(),
        }
    }

    /// Enroll `subject` in `campaign` at T0
    pub fn enroll(&self, subject: &str, campaign: &str) -> &Self {
        self.store
            .enroll(SubjectProgression::enroll(subject, campaign, t0()));
        self
    }

    /// Move the clock to T0 + `offset`
    pub fn at(&self, offset: TimeDelta) -> &Self {
        self.clock.set(t0() + offset);
        self
    }

    pub fn campaign(&self, id: &str) -> Arc<CampaignDefinition> {
        self.campaigns.get(&CampaignId::new(id)).unwrap().clone()
    }

    pub fn inline_processor(&self) -> InlineProcessor {
        BatchProcessor::new(
            self.config.clone(),
            self.clock.clone(),
            BatchDeps {
                source: self.store.clone(),
                store: self.store.clone(),
                delivery: Delivery::Inline(self.dispatcher.clone()),
            },
        )
    }

    /// Run one inline batch for `campaign`
    pub async fn run(&self, campaign: &str) -> BatchResult {
        self.inline_processor()
            .run_batch(&self.campaign(campaign))
            .await
            .unwrap()
    }

    /// Ordinal last completed by `subject` in `campaign`
    pub fn cursor(&self, subject: &str, campaign: &str) -> Option<u32> {
        self.store
            .get(&CampaignId::new(campaign), &SubjectId::new(subject))
            .unwrap()
            .last_completed_ordinal
    }

    /// Actions dispatched to `subject`, in order
    pub fn delivered_to(&self, subject: &str) -> Vec<String> {
        self.dispatcher
            .calls_for(subject)
            .iter()
            .map(|c| c.action.to_string())
            .collect()
    }
}

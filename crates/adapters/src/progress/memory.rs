// SPDX-License-Identifier: BUSL-1.1
// Copyright (c) 2026 Alfred Jean LLC

//! In-memory progression store

use super::{AdvanceOutcome, ProgressionStore, SourceError, StoreError, SubjectSource};
use async_trait::async_trait;
use drip_core::{CampaignId, CursorAdvance, SubjectId, SubjectProgression};
use std::sync::{Arc, Mutex};

/// Progression records held in memory, in enrollment order
///
/// Serves as both subject source and store. The compare-and-set happens
/// under a single lock, so concurrent batch runs sharing one store never
/// advance the same cursor twice.
#[derive(Clone, Debug, Default)]
pub struct InMemoryProgressionStore {
    records: Arc<Mutex<Vec<SubjectProgression>>>,
}

impl InMemoryProgressionStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a subject, replacing any existing record for the same campaign
    pub fn enroll(&self, progression: SubjectProgression) {
        let mut records = self.lock();
        match records.iter_mut().find(|r| {
            r.subject_id == progression.subject_id && r.campaign_id == progression.campaign_id
        }) {
            Some(existing) => *existing = progression,
            None => records.push(progression),
        }
    }

    /// Remove a subject from a campaign
    pub fn unenroll(&self, campaign: &CampaignId, subject: &SubjectId) -> bool {
        let mut records = self.lock();
        let before = records.len();
        records.retain(|r| !(r.campaign_id == *campaign && r.subject_id == *subject));
        records.len() < before
    }

    /// Snapshot of a subject's record
    pub fn get(&self, campaign: &CampaignId, subject: &SubjectId) -> Option<SubjectProgression> {
        self.lock()
            .iter()
            .find(|r| r.campaign_id == *campaign && r.subject_id == *subject)
            .cloned()
    }

    /// Snapshot of every record
    pub fn records(&self) -> Vec<SubjectProgression> {
        self.lock().clone()
    }

    pub fn len(&self) -> usize {
        self.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.lock().is_empty()
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Vec<SubjectProgression>> {
        self.records.lock().unwrap_or_else(|e| e.into_inner())
    }
}

#[async_trait]
impl SubjectSource for InMemoryProgressionStore {
    async fn fetch(
        &self,
        campaign: &CampaignId,
        limit: usize,
    ) -> Result<Vec<SubjectProgression>, SourceError> {
        Ok(self
            .lock()
            .iter()
            .filter(|r| r.campaign_id == *campaign)
            .take(limit)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl ProgressionStore for InMemoryProgressionStore {
    async fn load(
        &self,
        campaign: &CampaignId,
        subject: &SubjectId,
    ) -> Result<Option<SubjectProgression>, StoreError> {
        Ok(self.get(campaign, subject))
    }

    async fn advance(&self, advance: &CursorAdvance) -> Result<AdvanceOutcome, StoreError> {
        let mut records = self.lock();
        let record = records
            .iter_mut()
            .find(|r| r.campaign_id == advance.campaign_id && r.subject_id == advance.subject_id)
            .ok_or_else(|| StoreError::NotEnrolled {
                subject: advance.subject_id.clone(),
                campaign: advance.campaign_id.clone(),
            })?;

        match advance.apply(record) {
            Some(updated) => {
                *record = updated;
                Ok(AdvanceOutcome::Advanced)
            }
            None => Ok(AdvanceOutcome::Conflict),
        }
    }
}

#[cfg(test)]
#[path = "memory_tests.rs"]
mod tests;

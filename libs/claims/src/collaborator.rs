//! Collaborator seams for listing requests and recording review decisions
//!
//! Transport and persistence live behind these traits. [`InMemoryPayor`]
//! implements both over an in-process store and backs the CLI and tests.

use crate::error::{Error, Result};
use crate::gate::Track;
use crate::record::{ListResponse, RawRecord, RequestKind, ReviewStatus};
use async_trait::async_trait;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Mutex, MutexGuard, PoisonError};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveCommand {
    pub request_id: String,
    #[serde(rename = "type")]
    pub track: Track,
    #[serde(default)]
    pub remarks: String,
    #[serde(with = "rust_decimal::serde::float")]
    pub approved_amount: Decimal,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectCommand {
    pub request_id: String,
    #[serde(rename = "type")]
    pub track: Track,
}

/// Answer to a coverage eligibility request, which has no review tracks
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EligibilityCommand {
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UpdateResponseCommand {
    pub request_id: String,
    pub response_fhir: Value,
}

/// Lists requests of one kind
#[async_trait]
pub trait RequestSource: Send + Sync {
    async fn list_requests(&self, kind: RequestKind, token: Option<&str>) -> Result<ListResponse>;
}

/// Records review decisions
///
/// `Ok(())` is the acknowledgement that the change is stored and a refetch
/// will observe it.
#[async_trait]
pub trait ReviewActions: Send + Sync {
    async fn approve(&self, command: &ApproveCommand) -> Result<()>;

    async fn reject(&self, command: &RejectCommand) -> Result<()>;

    async fn update_response(&self, command: &UpdateResponseCommand) -> Result<()>;

    async fn approve_eligibility(&self, command: &EligibilityCommand) -> Result<()>;

    async fn reject_eligibility(&self, command: &EligibilityCommand) -> Result<()>;
}

/// In-process payer backend
#[derive(Debug, Default)]
pub struct InMemoryPayor {
    records: Mutex<HashMap<RequestKind, Vec<RawRecord>>>,
    token: Option<String>,
    unavailable: AtomicBool,
}

impl InMemoryPayor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Require `token` on every list call
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn with_records(self, kind: RequestKind, records: Vec<RawRecord>) -> Self {
        self.insert(kind, records);
        self
    }

    /// Seed from a list response, taking every kind it carries
    pub fn from_response(response: ListResponse) -> Self {
        let payor = Self::new();
        for (key, records) in response.data {
            match key.parse::<RequestKind>() {
                Ok(kind) => payor.insert(kind, records),
                Err(e) => tracing::warn!(key = %key, error = %e, "Ignoring unknown list key"),
            }
        }
        payor
    }

    pub fn insert(&self, kind: RequestKind, records: Vec<RawRecord>) {
        self.lock().entry(kind).or_default().extend(records);
    }

    /// Snapshot of the stored records of `kind`
    pub fn records(&self, kind: RequestKind) -> Vec<RawRecord> {
        self.lock().get(&kind).cloned().unwrap_or_default()
    }

    /// Every stored record, keyed by kind as on the wire
    pub fn snapshot(&self) -> ListResponse {
        let data = self
            .lock()
            .iter()
            .map(|(kind, records)| (kind.as_str().to_string(), records.clone()))
            .collect();
        ListResponse { data }
    }

    /// Find a record of any kind
    pub fn find(&self, request_id: &str) -> Option<RawRecord> {
        self.lock()
            .values()
            .flatten()
            .find(|r| r.request_id == request_id)
            .cloned()
    }

    /// Make every call fail, as a backend outage would
    pub fn set_unavailable(&self, unavailable: bool) {
        self.unavailable.store(unavailable, Ordering::SeqCst);
    }

    fn lock(&self) -> MutexGuard<'_, HashMap<RequestKind, Vec<RawRecord>>> {
        self.records.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn ensure_available(&self) -> Result<()> {
        if self.unavailable.load(Ordering::SeqCst) {
            return Err(Error::Collaborator("payer backend unavailable".to_string()));
        }
        Ok(())
    }

    fn update<F>(&self, request_id: &str, apply: F) -> Result<()>
    where
        F: FnOnce(&mut RawRecord),
    {
        self.ensure_available()?;
        let mut records = self.lock();
        let record = records
            .values_mut()
            .flatten()
            .find(|r| r.request_id == request_id)
            .ok_or_else(|| Error::NotFound(request_id.to_string()))?;
        apply(record);
        Ok(())
    }
}

/// Overall status once a track changes
fn overall_status(record: &RawRecord) -> ReviewStatus {
    let info = &record.additional_info;
    if info.medical.status == ReviewStatus::Rejected
        || info.financial.status == ReviewStatus::Rejected
    {
        ReviewStatus::Rejected
    } else if info.financial.status == ReviewStatus::Approved {
        ReviewStatus::Approved
    } else {
        ReviewStatus::Pending
    }
}

#[async_trait]
impl RequestSource for InMemoryPayor {
    async fn list_requests(&self, kind: RequestKind, token: Option<&str>) -> Result<ListResponse> {
        self.ensure_available()?;
        if let Some(expected) = self.token.as_deref() {
            if token != Some(expected) {
                return Err(Error::Collaborator("invalid or missing token".to_string()));
            }
        }
        Ok(ListResponse::new(kind, self.records(kind)))
    }
}

#[async_trait]
impl ReviewActions for InMemoryPayor {
    async fn approve(&self, command: &ApproveCommand) -> Result<()> {
        self.update(&command.request_id, |record| {
            let review = record.review_mut(command.track);
            review.status = ReviewStatus::Approved;
            review.remarks = Some(command.remarks.clone());
            review.approved_amount = Some(command.approved_amount);
            record.status = overall_status(record).to_string();
        })?;
        tracing::info!(request_id = %command.request_id, track = %command.track, "Recorded approval");
        Ok(())
    }

    async fn reject(&self, command: &RejectCommand) -> Result<()> {
        self.update(&command.request_id, |record| {
            record.review_mut(command.track).status = ReviewStatus::Rejected;
            record.status = overall_status(record).to_string();
        })?;
        tracing::info!(request_id = %command.request_id, track = %command.track, "Recorded rejection");
        Ok(())
    }

    async fn update_response(&self, command: &UpdateResponseCommand) -> Result<()> {
        self.update(&command.request_id, |record| {
            record.response_fhir = Some(command.response_fhir.clone());
        })
    }

    async fn approve_eligibility(&self, command: &EligibilityCommand) -> Result<()> {
        self.update(&command.request_id, |record| {
            record.status = ReviewStatus::Approved.to_string();
        })?;
        tracing::info!(request_id = %command.request_id, "Recorded eligibility approval");
        Ok(())
    }

    async fn reject_eligibility(&self, command: &EligibilityCommand) -> Result<()> {
        self.update(&command.request_id, |record| {
            record.status = ReviewStatus::Rejected.to_string();
        })?;
        tracing::info!(request_id = %command.request_id, "Recorded eligibility rejection");
        Ok(())
    }
}

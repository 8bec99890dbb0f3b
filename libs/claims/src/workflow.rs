//! Review desk: fetch, gate, act, refetch
//!
//! Every action re-evaluates the gate on the view it is given, waits for the
//! collaborator to acknowledge the write, waits on the configured
//! [`RefetchTrigger`], and then rebuilds the view from a fresh fetch.

use crate::collaborator::{
    EligibilityCommand, RejectCommand, RequestSource, ReviewActions, UpdateResponseCommand,
};
use crate::draft::ApprovalDraft;
use crate::eligibility::EligibilityView;
use crate::error::{Error, Result};
use crate::gate::{evaluate_gate, Track};
use crate::record::{RawRecord, RequestKind};
use crate::table::ClaimRow;
use crate::view::{ClaimView, ClaimViewBuilder};
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Decides when a refetch may run after an acknowledged write
#[async_trait]
pub trait RefetchTrigger: Send + Sync {
    async fn ready(&self);
}

/// Refetch as soon as the write is acknowledged
#[derive(Debug, Clone, Copy, Default)]
pub struct Immediate;

#[async_trait]
impl RefetchTrigger for Immediate {
    async fn ready(&self) {}
}

/// Wait a fixed time after acknowledgement, for backends that index
/// asynchronously
#[derive(Debug, Clone, Copy)]
pub struct FixedDelay(pub Duration);

#[async_trait]
impl RefetchTrigger for FixedDelay {
    async fn ready(&self) {
        tokio::time::sleep(self.0).await;
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum NoticeLevel {
    Success,
    Error,
}

/// Short user-facing message about the outcome of an action
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Notice {
    pub level: NoticeLevel,
    pub message: String,
}

impl Notice {
    pub fn success(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Success,
            message: message.into(),
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            message: message.into(),
        }
    }

    /// Notice shown when an action fails with `error`
    pub fn for_error(error: &Error) -> Self {
        match error {
            Error::InvalidJson(_) => Self::error("Invalid json"),
            other => Self::error(other.to_string()),
        }
    }
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ActionOutcome<V = ClaimView> {
    pub notice: Notice,
    /// The view as rebuilt after the write; `None` if the refetch came back
    /// without the request
    pub refreshed: Option<V>,
}

pub struct ReviewDesk {
    source: Arc<dyn RequestSource>,
    actions: Arc<dyn ReviewActions>,
    builder: ClaimViewBuilder,
    refetch: Arc<dyn RefetchTrigger>,
    token: Option<String>,
}

impl ReviewDesk {
    pub fn new(source: Arc<dyn RequestSource>, actions: Arc<dyn ReviewActions>) -> Self {
        Self {
            source,
            actions,
            builder: ClaimViewBuilder::default(),
            refetch: Arc::new(Immediate),
            token: None,
        }
    }

    pub fn with_builder(mut self, builder: ClaimViewBuilder) -> Self {
        self.builder = builder;
        self
    }

    pub fn with_refetch(mut self, refetch: Arc<dyn RefetchTrigger>) -> Self {
        self.refetch = refetch;
        self
    }

    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = Some(token.into());
        self
    }

    pub fn builder(&self) -> &ClaimViewBuilder {
        &self.builder
    }

    /// Raw records of `kind`; a failed fetch is logged and reads as empty
    pub async fn fetch_records(&self, kind: RequestKind) -> Vec<RawRecord> {
        match self.source.list_requests(kind, self.token.as_deref()).await {
            Ok(response) => response.into_records(kind),
            Err(e) => {
                tracing::error!(kind = %kind, error = %e, "Failed to fetch request list");
                Vec::new()
            }
        }
    }

    pub async fn fetch_list(&self, kind: RequestKind) -> Vec<ClaimView> {
        let records = self.fetch_records(kind).await;
        let views = self.builder.build_all(kind, &records);
        tracing::debug!(kind = %kind, fetched = records.len(), built = views.len(), "Built claim views");
        views
    }

    pub async fn fetch_rows(&self, kind: RequestKind) -> Vec<ClaimRow> {
        self.fetch_list(kind).await.iter().map(ClaimRow::from).collect()
    }

    /// Fetch and build a single request
    ///
    /// `Ok(None)` when the list does not contain it. A record that is present
    /// but cannot be projected is an error.
    pub async fn fetch_detail(&self, kind: RequestKind, request_id: &str) -> Result<Option<ClaimView>> {
        let records = self.fetch_records(kind).await;
        records
            .iter()
            .find(|r| r.request_id == request_id)
            .map(|r| self.builder.build_from(kind, r))
            .transpose()
    }

    pub async fn fetch_eligibility(&self) -> Vec<EligibilityView> {
        let records = self.fetch_records(RequestKind::CoverageEligibility).await;
        self.builder.build_all_eligibility(&records)
    }

    pub async fn fetch_eligibility_detail(&self, request_id: &str) -> Result<Option<EligibilityView>> {
        let records = self.fetch_records(RequestKind::CoverageEligibility).await;
        records
            .iter()
            .find(|r| r.request_id == request_id)
            .map(|r| self.builder.build_eligibility(r))
            .transpose()
    }

    pub async fn approve(&self, view: &ClaimView, draft: ApprovalDraft) -> Result<ActionOutcome> {
        let track = draft.track;
        ensure_enabled(view, track)?;

        let command = draft.into_command(view.request_id.clone());
        self.actions.approve(&command).await?;
        tracing::info!(request_id = %view.request_id, track = %track, "Approval acknowledged");

        let notice = Notice::success(format!("{} {} approved", track, view.kind));
        self.refresh(view, notice).await
    }

    pub async fn reject(&self, view: &ClaimView, track: Track) -> Result<ActionOutcome> {
        ensure_enabled(view, track)?;

        let command = RejectCommand {
            request_id: view.request_id.clone(),
            track,
        };
        self.actions.reject(&command).await?;
        tracing::info!(request_id = %view.request_id, track = %track, "Rejection acknowledged");

        self.refresh(view, Notice::success("Claim Rejected")).await
    }

    /// Answer a pending coverage eligibility request positively
    pub async fn approve_eligibility(
        &self,
        view: &EligibilityView,
    ) -> Result<ActionOutcome<EligibilityView>> {
        let command = eligibility_command(view)?;
        self.actions.approve_eligibility(&command).await?;
        tracing::info!(request_id = %view.request_id, "Eligibility approval acknowledged");

        let notice = Notice::success("Coverage Eligibility Request Approved");
        self.refresh_eligibility(view, notice).await
    }

    pub async fn reject_eligibility(
        &self,
        view: &EligibilityView,
    ) -> Result<ActionOutcome<EligibilityView>> {
        let command = eligibility_command(view)?;
        self.actions.reject_eligibility(&command).await?;
        tracing::info!(request_id = %view.request_id, "Eligibility rejection acknowledged");

        let notice = Notice::success("Coverage Eligibility Request Rejected");
        self.refresh_eligibility(view, notice).await
    }

    /// Store a response bundle given as JSON text
    ///
    /// Text that does not parse never reaches the collaborator.
    pub async fn update_response(&self, request_id: &str, text: &str) -> Result<Notice> {
        let response_fhir: serde_json::Value = serde_json::from_str(text).map_err(|e| {
            tracing::warn!(request_id = %request_id, error = %e, "Rejecting response update with invalid JSON");
            Error::InvalidJson(e)
        })?;

        let command = UpdateResponseCommand {
            request_id: request_id.to_string(),
            response_fhir,
        };
        self.actions.update_response(&command).await?;
        Ok(Notice::success("Response updated"))
    }

    async fn refresh(&self, view: &ClaimView, notice: Notice) -> Result<ActionOutcome> {
        self.refetch.ready().await;
        let refreshed = self.fetch_detail(view.kind, &view.request_id).await?;
        if refreshed.is_none() {
            tracing::warn!(request_id = %view.request_id, kind = %view.kind, "Request missing after refetch");
        }
        Ok(ActionOutcome { notice, refreshed })
    }

    async fn refresh_eligibility(
        &self,
        view: &EligibilityView,
        notice: Notice,
    ) -> Result<ActionOutcome<EligibilityView>> {
        self.refetch.ready().await;
        let refreshed = self.fetch_eligibility_detail(&view.request_id).await?;
        if refreshed.is_none() {
            tracing::warn!(request_id = %view.request_id, "Eligibility request missing after refetch");
        }
        Ok(ActionOutcome { notice, refreshed })
    }
}

fn eligibility_command(view: &EligibilityView) -> Result<EligibilityCommand> {
    if !view.actionable {
        tracing::debug!(request_id = %view.request_id, status = %view.status, "Eligibility action blocked");
        return Err(Error::NotActionable(view.request_id.clone()));
    }
    Ok(EligibilityCommand {
        request_id: view.request_id.clone(),
    })
}

fn ensure_enabled(view: &ClaimView, track: Track) -> Result<()> {
    match evaluate_gate(view).reason(track) {
        Some(reason) => {
            tracing::debug!(request_id = %view.request_id, track = %track, reason = %reason, "Action blocked");
            Err(Error::ActionBlocked {
                track,
                reason: reason.clone(),
            })
        }
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::collaborator::InMemoryPayor;
    use serde_json::json;

    fn desk() -> (Arc<InMemoryPayor>, ReviewDesk) {
        let record: RawRecord = serde_json::from_value(json!({
            "request_id": "r-1",
            "use": "claim",
            "payload": {"resourceType": "Bundle", "entry": [
                {"fullUrl": "Claim/C1", "resource": {
                    "resourceType": "Claim",
                    "subType": {"coding": [{"code": "IPD"}]},
                    "total": {"value": 300, "currency": "INR"}
                }}
            ]}
        }))
        .unwrap();
        let payor = Arc::new(InMemoryPayor::new().with_records(RequestKind::Claim, vec![record]));
        let desk = ReviewDesk::new(payor.clone(), payor.clone());
        (payor, desk)
    }

    #[test]
    fn invalid_json_notice() {
        let err = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let notice = Notice::for_error(&Error::InvalidJson(err));
        assert_eq!(notice, Notice::error("Invalid json"));
    }

    #[tokio::test]
    async fn approve_then_refetch() {
        let (_, desk) = desk();
        let view = desk
            .fetch_detail(RequestKind::Claim, "r-1")
            .await
            .unwrap()
            .unwrap();
        let draft = ApprovalDraft::for_view(&view, Track::Medical);

        let outcome = desk.approve(&view, draft).await.unwrap();
        assert_eq!(outcome.notice.message, "medical claim approved");
        let refreshed = outcome.refreshed.unwrap();
        assert!(!evaluate_gate(&refreshed).medical_enabled());
        assert!(evaluate_gate(&refreshed).financial_enabled());
    }

    #[tokio::test]
    async fn preauth_without_use_refetches_its_own_list() {
        let record: RawRecord = serde_json::from_value(json!({
            "request_id": "p-1",
            "otp_verification": "successful",
            "payload": {"resourceType": "Bundle", "entry": [
                {"fullUrl": "Claim/C1", "resource": {
                    "resourceType": "Claim",
                    "subType": {"coding": [{"code": "OPD"}]},
                    "total": {"value": 300, "currency": "INR"}
                }}
            ]}
        }))
        .unwrap();
        let payor =
            Arc::new(InMemoryPayor::new().with_records(RequestKind::Preauth, vec![record]));
        let desk = ReviewDesk::new(payor.clone(), payor);

        let view = desk
            .fetch_detail(RequestKind::Preauth, "p-1")
            .await
            .unwrap()
            .unwrap();
        assert_eq!(view.kind, RequestKind::Preauth);

        let outcome = desk
            .approve(&view, ApprovalDraft::for_view(&view, Track::Medical))
            .await
            .unwrap();
        assert_eq!(outcome.notice.message, "medical preauth approved");
        let refreshed = outcome.refreshed.unwrap();
        assert_eq!(refreshed.kind, RequestKind::Preauth);
        assert_eq!(refreshed.financial_info.status, crate::record::ReviewStatus::Pending);
        assert!(evaluate_gate(&refreshed).financial_enabled());
    }

    #[tokio::test]
    async fn fetch_failure_is_empty_list() {
        let (payor, desk) = desk();
        payor.set_unavailable(true);
        assert!(desk.fetch_list(RequestKind::Claim).await.is_empty());
    }

    #[tokio::test(start_paused = true)]
    async fn fixed_delay_waits() {
        let start = tokio::time::Instant::now();
        FixedDelay(Duration::from_secs(2)).ready().await;
        assert!(start.elapsed() >= Duration::from_secs(2));
    }
}

//! Coverage eligibility projection
//!
//! Eligibility requests go through the same resolution pipeline as claims
//! but carry no amounts and no review tracks.

use crate::error::Result;
use crate::record::RawRecord;
use crate::table::{last_chars, SHORT_ID_LEN};
use crate::view::{ClaimResources, ClaimViewBuilder};
use chrono::{DateTime, FixedOffset};
use claimdesk_models::{
    Coverage, CoverageEligibilityRequest, Patient, Period, ResourceKind, TypedResource,
};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EligibilityView {
    pub request_id: String,
    pub request_no: Option<String>,
    pub name: String,
    pub gender: Option<String>,
    pub insurance_no: Option<String>,
    pub status: String,
    pub serviced_period: Option<Period>,
    pub created: Option<String>,
    pub submitted_at: Option<DateTime<FixedOffset>>,
    /// Only pending requests can still be answered
    pub actionable: bool,
    pub resources: ClaimResources,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EligibilityRow {
    pub request_id: String,
    pub request_no: String,
    pub patient_name: String,
    pub insurance_no: String,
    pub status: String,
}

impl From<&EligibilityView> for EligibilityRow {
    fn from(view: &EligibilityView) -> Self {
        Self {
            request_id: view.request_id.clone(),
            request_no: last_chars(view.request_no.as_deref().unwrap_or_default(), SHORT_ID_LEN),
            patient_name: view.name.clone(),
            insurance_no: last_chars(
                view.insurance_no.as_deref().unwrap_or_default(),
                SHORT_ID_LEN,
            ),
            status: view.status.clone(),
        }
    }
}

impl ClaimViewBuilder {
    pub fn build_eligibility(&self, record: &RawRecord) -> Result<EligibilityView> {
        let resolver = self.resolver(record);

        let resources = ClaimResources {
            patient: resolver.locate(&ResourceKind::Patient)?,
            coverage: resolver.locate(&ResourceKind::Coverage)?,
            claim: resolver.locate(&ResourceKind::CoverageEligibilityRequest)?,
        };

        let patient = resources
            .patient
            .as_ref()
            .map(Patient::from_resolved)
            .transpose()?;
        let coverage = resources
            .coverage
            .as_ref()
            .map(Coverage::from_resolved)
            .transpose()?;
        let request = resources
            .claim
            .as_ref()
            .map(CoverageEligibilityRequest::from_resolved)
            .transpose()?;

        Ok(EligibilityView {
            request_id: record.request_id.clone(),
            request_no: record.payload.identifier_value().map(str::to_string),
            name: patient
                .as_ref()
                .and_then(Patient::display_name)
                .unwrap_or("Unnamed")
                .to_string(),
            gender: patient.as_ref().and_then(|p| p.gender.clone()),
            insurance_no: coverage.and_then(|c| c.subscriber_id),
            status: record.status.clone(),
            serviced_period: request.as_ref().and_then(|r| r.serviced_period.clone()),
            created: request.and_then(|r| r.created),
            submitted_at: record.payload.parsed_timestamp().ok().flatten(),
            actionable: record.is_pending(),
            resources,
        })
    }

    /// Eligibility counterpart of [`ClaimViewBuilder::build_all`]
    pub fn build_all_eligibility(&self, records: &[RawRecord]) -> Vec<EligibilityView> {
        records
            .iter()
            .filter_map(|record| match self.build_eligibility(record) {
                Ok(view) => Some(view),
                Err(e) => {
                    tracing::warn!(
                        request_id = %record.request_id,
                        error = %e,
                        "Skipping eligibility record that could not be projected"
                    );
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::{ListResponse, RequestKind};

    fn records() -> Vec<RawRecord> {
        let response: ListResponse =
            serde_json::from_str(include_str!("../../../fixtures/eligibility_list.json")).unwrap();
        response.into_records(RequestKind::CoverageEligibility)
    }

    #[test]
    fn projects_pending_request() {
        let view = ClaimViewBuilder::default()
            .build_eligibility(&records()[0])
            .unwrap();
        assert_eq!(view.name, "Hina Patel");
        assert_eq!(view.insurance_no.as_deref(), Some("SN-RVH1003"));
        assert!(view.actionable);
        assert_eq!(
            view.serviced_period.and_then(|p| p.start).as_deref(),
            Some("2023-02-12T11:33:32+05:30")
        );
        assert!(view.submitted_at.is_some());
    }

    #[test]
    fn decided_request_without_satellites() {
        let view = ClaimViewBuilder::default()
            .build_eligibility(&records()[1])
            .unwrap();
        assert_eq!(view.name, "Unnamed");
        assert!(!view.actionable);
        assert!(view.submitted_at.is_none());
        // The dangling patient reference is dropped, not kept as a pointer.
        let request = view.resources.claim.unwrap();
        assert!(request.get("patient").is_none());
    }

    #[test]
    fn rows_shorten_identifiers() {
        let builder = ClaimViewBuilder::default();
        let rows: Vec<EligibilityRow> = builder
            .build_all_eligibility(&records())
            .iter()
            .map(EligibilityRow::from)
            .collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].request_no, "e958e96e");
        assert_eq!(rows[0].insurance_no, "-RVH1003");
    }
}

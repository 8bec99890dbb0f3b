//! Flat rows for list tables

use crate::view::ClaimView;
use serde::Serialize;

/// Column headers, in [`ClaimRow::cells`] order
pub const ROW_HEADERS: [&str; 9] = [
    "Request ID",
    "Request No.",
    "Insurance No.",
    "Patient Name",
    "Claim Type",
    "Requested Amount",
    "Approved Amount",
    "Provider",
    "Status",
];

/// Identifiers are long UUID-like strings; tables show their tail only.
pub(crate) const SHORT_ID_LEN: usize = 8;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ClaimRow {
    pub request_id: String,
    pub request_no: String,
    pub insurance_no: String,
    pub patient_name: String,
    pub claim_type: String,
    pub requested_amount: String,
    pub approved_amount: String,
    pub provider: String,
    pub status: String,
}

impl ClaimRow {
    pub fn cells(&self) -> [&str; 9] {
        [
            &self.request_id,
            &self.request_no,
            &self.insurance_no,
            &self.patient_name,
            &self.claim_type,
            &self.requested_amount,
            &self.approved_amount,
            &self.provider,
            &self.status,
        ]
    }
}

impl From<&ClaimView> for ClaimRow {
    fn from(view: &ClaimView) -> Self {
        Self {
            request_id: view.request_id.clone(),
            request_no: last_chars(view.request_no.as_deref().unwrap_or_default(), SHORT_ID_LEN),
            insurance_no: last_chars(
                view.insurance_no.as_deref().unwrap_or_default(),
                SHORT_ID_LEN,
            ),
            patient_name: view.name.clone(),
            claim_type: view.sub_type.clone(),
            requested_amount: view.requested_amount.to_string(),
            approved_amount: view.approved_amount.to_string(),
            provider: view.provider.clone().unwrap_or_default(),
            status: view.status.clone(),
        }
    }
}

pub(crate) fn last_chars(s: &str, n: usize) -> String {
    let count = s.chars().count();
    s.chars().skip(count.saturating_sub(n)).collect()
}

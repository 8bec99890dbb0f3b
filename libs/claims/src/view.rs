//! Claim view projection
//!
//! A [`ClaimView`] is the flat record reviewers work from. It is rebuilt from
//! the raw record on every fetch and never patched in place.

use crate::error::{Error, Result};
use crate::money::{Amount, ApprovedAmount};
use crate::record::{RawRecord, RequestKind, ReviewInfo};
use chrono::{DateTime, FixedOffset};
use claimdesk_models::{
    Claim, ClaimItem, Coverage, Diagnosis, Money, Patient, ResourceKind, TypedResource,
};
use claimdesk_resolve::{BundleResolver, DEFAULT_MAX_DEPTH};
use rust_decimal::Decimal;
use serde::Serialize;
use serde_json::Value;

const UNNAMED_PATIENT: &str = "Unnamed";
const OTHER_SUB_TYPE: &str = "Others";
const DEFAULT_PLATFORM: &str = "others";
const DEFAULT_OTP_STATUS: &str = "Pending";
const DEFAULT_USE: &str = "claim";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ViewOptions {
    /// Currency assumed when a bundle states none
    pub default_currency: String,
    /// Nesting ceiling for reference resolution
    pub max_resolve_depth: usize,
}

impl Default for ViewOptions {
    fn default() -> Self {
        Self {
            default_currency: "INR".to_string(),
            max_resolve_depth: DEFAULT_MAX_DEPTH,
        }
    }
}

/// Resolved source resources, kept for inspection
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ClaimResources {
    pub patient: Option<Value>,
    pub coverage: Option<Value>,
    pub claim: Option<Value>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ClaimView {
    pub id: String,
    pub request_id: String,
    /// Bundle identifier value
    pub request_no: Option<String>,
    /// List the request was fetched from; refetches go back to it
    pub kind: RequestKind,
    #[serde(rename = "use")]
    pub use_: String,
    pub platform: String,
    pub sender_code: Option<String>,
    pub recipient_code: Option<String>,

    pub name: String,
    pub gender: Option<String>,
    pub address: Option<Value>,
    pub provider: Option<String>,
    pub insurance_no: Option<String>,

    pub items: Vec<ClaimItem>,
    pub diagnosis: Vec<Diagnosis>,
    pub sub_type: String,
    pub requested_amount: Amount,
    pub approved_amount: ApprovedAmount,

    pub otp_verification: String,
    pub account_number: String,
    pub ifsc_code: String,
    pub medical_info: ReviewInfo,
    pub financial_info: ReviewInfo,
    pub status: String,

    pub submitted_at: Option<DateTime<FixedOffset>>,
    pub resources: ClaimResources,
    pub response_fhir: Option<Value>,
}

impl ClaimView {
    pub fn is_pending(&self) -> bool {
        self.status.eq_ignore_ascii_case("pending")
    }
}

/// Builds [`ClaimView`]s from raw records
#[derive(Debug, Clone, Default)]
pub struct ClaimViewBuilder {
    options: ViewOptions,
}

impl ClaimViewBuilder {
    pub fn new(options: ViewOptions) -> Self {
        Self { options }
    }

    pub fn options(&self) -> &ViewOptions {
        &self.options
    }

    pub(crate) fn resolver<'a>(&self, record: &'a RawRecord) -> BundleResolver<'a> {
        BundleResolver::new(&record.payload).with_max_depth(self.options.max_resolve_depth)
    }

    /// Project one record whose list is not known
    ///
    /// The list kind is taken from the record's `use`. Prefer
    /// [`ClaimViewBuilder::build_from`] when the list is known.
    pub fn build(&self, record: &RawRecord) -> Result<ClaimView> {
        self.project(record, None)
    }

    /// Project one record fetched from the `kind` list
    ///
    /// Missing Patient, Coverage or Claim resources fall back to documented
    /// defaults. A resolution failure (depth ceiling), a resource that cannot
    /// be read as its kind, or item prices whose sum overflows is an error.
    pub fn build_from(&self, kind: RequestKind, record: &RawRecord) -> Result<ClaimView> {
        self.project(record, Some(kind))
    }

    fn project(&self, record: &RawRecord, listed: Option<RequestKind>) -> Result<ClaimView> {
        let resolver = self.resolver(record);

        let resources = ClaimResources {
            patient: resolver.locate(&ResourceKind::Patient)?,
            coverage: resolver.locate(&ResourceKind::Coverage)?,
            claim: resolver.locate_first(Claim::kinds())?,
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
        let claim = resources
            .claim
            .as_ref()
            .map(Claim::from_resolved)
            .transpose()?;

        let requested_amount = self.requested_amount(claim.as_ref())?;
        let approved_amount = if record.is_pending() {
            ApprovedAmount::Hidden
        } else {
            ApprovedAmount::Shown(Amount::new(
                requested_amount.currency.clone(),
                record
                    .additional_info
                    .financial
                    .approved_amount
                    .unwrap_or(Decimal::ZERO),
            ))
        };

        let submitted_at = match record.payload.parsed_timestamp() {
            Ok(ts) => ts,
            Err(e) => {
                tracing::debug!(request_id = %record.request_id, error = %e, "Ignoring bundle timestamp");
                None
            }
        };

        let use_ = record
            .use_
            .clone()
            .or_else(|| claim.as_ref().and_then(|c| c.use_.clone()))
            .or_else(|| listed.map(|kind| kind.as_str().to_string()))
            .unwrap_or_else(|| DEFAULT_USE.to_string());
        let kind = listed.unwrap_or_else(|| RequestKind::for_use(&use_));

        Ok(ClaimView {
            id: record.request_id.clone(),
            request_id: record.request_id.clone(),
            request_no: record.payload.identifier_value().map(str::to_string),
            kind,
            use_,
            platform: record
                .app
                .clone()
                .unwrap_or_else(|| DEFAULT_PLATFORM.to_string()),
            sender_code: record.sender_code.clone(),
            recipient_code: record.recipient_code.clone(),

            name: patient
                .as_ref()
                .and_then(Patient::display_name)
                .unwrap_or(UNNAMED_PATIENT)
                .to_string(),
            gender: patient.as_ref().and_then(|p| p.gender.clone()),
            address: patient.as_ref().and_then(|p| p.address.clone()),
            provider: claim
                .as_ref()
                .and_then(Claim::provider_name)
                .map(str::to_string),
            insurance_no: coverage.as_ref().and_then(|c| c.subscriber_id.clone()),

            items: claim.as_ref().map(|c| c.item.clone()).unwrap_or_default(),
            diagnosis: claim
                .as_ref()
                .map(|c| c.diagnosis.clone())
                .unwrap_or_default(),
            sub_type: claim
                .as_ref()
                .and_then(Claim::sub_type_code)
                .unwrap_or(OTHER_SUB_TYPE)
                .to_string(),
            requested_amount,
            approved_amount,

            otp_verification: record
                .otp_verification
                .clone()
                .unwrap_or_else(|| DEFAULT_OTP_STATUS.to_string()),
            account_number: record.account_number.clone().unwrap_or_default(),
            ifsc_code: record.ifsc_code.clone().unwrap_or_default(),
            medical_info: record.additional_info.medical.clone(),
            financial_info: record.additional_info.financial.clone(),
            status: record.status.clone(),

            submitted_at,
            resources,
            response_fhir: record.response_fhir.clone(),
        })
    }

    /// Project the `kind` list; a record that fails to project is skipped
    pub fn build_all(&self, kind: RequestKind, records: &[RawRecord]) -> Vec<ClaimView> {
        records
            .iter()
            .filter_map(|record| match self.build_from(kind, record) {
                Ok(view) => Some(view),
                Err(e) => {
                    tracing::warn!(
                        request_id = %record.request_id,
                        error = %e,
                        "Skipping record that could not be projected"
                    );
                    None
                }
            })
            .collect()
    }

    /// Claim `total`, else the sum of item unit prices, else zero
    fn requested_amount(&self, claim: Option<&Claim>) -> Result<Amount> {
        let default_currency = self.options.default_currency.as_str();
        let Some(claim) = claim else {
            return Ok(Amount::zero(default_currency));
        };

        if let Some(total) = claim
            .total
            .as_ref()
            .and_then(|m| Amount::from_money(m, default_currency))
        {
            return Ok(total);
        }

        let prices: Vec<&Money> = claim
            .item
            .iter()
            .filter_map(|item| item.unit_price.as_ref())
            .collect();
        let currency = prices
            .iter()
            .find_map(|m| m.currency.as_deref())
            .unwrap_or(default_currency);
        let value = prices
            .iter()
            .filter_map(|m| m.value)
            .try_fold(Decimal::ZERO, |sum, value| sum.checked_add(value))
            .ok_or_else(|| {
                Error::InvalidAmount(format!("sum of item prices overflows ({})", currency))
            })?;
        Ok(Amount::new(currency, value))
    }
}

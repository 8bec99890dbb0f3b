//! Raw request records as returned by the list collaborator
//!
//! A record wraps one request bundle with the payer-side workflow state the
//! bundle itself does not carry: overall status, per-track review outcome,
//! OTP verification and payee bank details.

use crate::gate::Track;
use crate::money::Amount;
use claimdesk_models::Bundle;
use rust_decimal::Decimal;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Request family a list is fetched for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RequestKind {
    Claim,
    Preauth,
    #[serde(rename = "coverageeligibility")]
    CoverageEligibility,
}

impl RequestKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            RequestKind::Claim => "claim",
            RequestKind::Preauth => "preauth",
            RequestKind::CoverageEligibility => "coverageeligibility",
        }
    }

    /// List a claim view with the given `use` is fetched from
    pub fn for_use(use_: &str) -> Self {
        if use_.eq_ignore_ascii_case("preauth") || use_.eq_ignore_ascii_case("preauthorization") {
            RequestKind::Preauth
        } else {
            RequestKind::Claim
        }
    }
}

impl fmt::Display for RequestKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for RequestKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "claim" => Ok(RequestKind::Claim),
            "preauth" => Ok(RequestKind::Preauth),
            "coverageeligibility" | "coverage-eligibility" => Ok(RequestKind::CoverageEligibility),
            other => Err(format!("unknown request kind '{}'", other)),
        }
    }
}

/// Outcome of one review track
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ReviewStatus {
    #[default]
    #[serde(alias = "pending")]
    Pending,
    #[serde(alias = "approved")]
    Approved,
    #[serde(alias = "rejected")]
    Rejected,
}

impl ReviewStatus {
    pub fn is_decided(&self) -> bool {
        !matches!(self, ReviewStatus::Pending)
    }
}

impl fmt::Display for ReviewStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ReviewStatus::Pending => "Pending",
            ReviewStatus::Approved => "Approved",
            ReviewStatus::Rejected => "Rejected",
        })
    }
}

/// Per-track review record
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReviewInfo {
    #[serde(default)]
    pub status: ReviewStatus,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub remarks: Option<String>,

    #[serde(
        default,
        serialize_with = "rust_decimal::serde::float_option::serialize",
        deserialize_with = "lenient_amount",
        skip_serializing_if = "Option::is_none"
    )]
    pub approved_amount: Option<Decimal>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifsc_code: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct AdditionalInfo {
    #[serde(default)]
    pub medical: ReviewInfo,

    #[serde(default)]
    pub financial: ReviewInfo,
}

/// One request as listed by the payer backend
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    pub request_id: String,

    #[serde(default = "default_status")]
    pub status: String,

    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,

    /// Submitting application
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub app: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub sender_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub recipient_code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub otp_verification: Option<String>,

    #[serde(
        default,
        deserialize_with = "lenient_string",
        skip_serializing_if = "Option::is_none"
    )]
    pub account_number: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ifsc_code: Option<String>,

    #[serde(default)]
    pub additional_info: AdditionalInfo,

    pub payload: Bundle,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_fhir: Option<Value>,
}

fn default_status() -> String {
    ReviewStatus::Pending.to_string()
}

impl RawRecord {
    pub fn is_pending(&self) -> bool {
        self.status.eq_ignore_ascii_case("pending")
    }

    pub fn review(&self, track: Track) -> &ReviewInfo {
        match track {
            Track::Medical => &self.additional_info.medical,
            Track::Financial => &self.additional_info.financial,
        }
    }

    pub fn review_mut(&mut self, track: Track) -> &mut ReviewInfo {
        match track {
            Track::Medical => &mut self.additional_info.medical,
            Track::Financial => &mut self.additional_info.financial,
        }
    }
}

/// `{ "data": { "<kind>": [records] } }`
///
/// A record that cannot be read is dropped with a warning; the rest of the
/// list still loads.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ListResponse {
    #[serde(default, deserialize_with = "lenient_records")]
    pub data: HashMap<String, Vec<RawRecord>>,
}

impl ListResponse {
    pub fn new(kind: RequestKind, records: Vec<RawRecord>) -> Self {
        let mut data = HashMap::new();
        data.insert(kind.as_str().to_string(), records);
        Self { data }
    }

    pub fn records(&self, kind: RequestKind) -> &[RawRecord] {
        self.data
            .get(kind.as_str())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    pub fn into_records(mut self, kind: RequestKind) -> Vec<RawRecord> {
        self.data.remove(kind.as_str()).unwrap_or_default()
    }
}

/// Accepts a string or a number; bank account numbers arrive as either
fn lenient_string<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(deserializer)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

/// Approved amounts arrive as numbers, numeric strings or in the
/// `"<code> <value>"` display form
fn lenient_amount<'de, D>(deserializer: D) -> Result<Option<Decimal>, D::Error>
where
    D: Deserializer<'de>,
{
    use serde::de::Error as _;

    match Option::<Value>::deserialize(deserializer)? {
        None | Some(Value::Null) => Ok(None),
        Some(number @ Value::Number(_)) => rust_decimal::serde::float::deserialize(number)
            .map(Some)
            .map_err(D::Error::custom),
        Some(Value::String(s)) => match Decimal::from_str(s.trim()) {
            Ok(value) => Ok(Some(value)),
            Err(_) => s
                .parse::<Amount>()
                .map(|amount| Some(amount.value))
                .map_err(D::Error::custom),
        },
        Some(other) => Err(D::Error::custom(format!(
            "expected an amount, found {}",
            other
        ))),
    }
}

fn lenient_records<'de, D>(deserializer: D) -> Result<HashMap<String, Vec<RawRecord>>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = HashMap::<String, Vec<Value>>::deserialize(deserializer)?;
    Ok(raw
        .into_iter()
        .map(|(kind, values)| {
            let records = values
                .into_iter()
                .filter_map(|value| {
                    let request_id = value
                        .get("request_id")
                        .and_then(Value::as_str)
                        .map(str::to_string);
                    match serde_json::from_value::<RawRecord>(value) {
                        Ok(record) => Some(record),
                        Err(e) => {
                            tracing::warn!(
                                kind = %kind,
                                request_id = ?request_id,
                                error = %e,
                                "Skipping list record that could not be read"
                            );
                            None
                        }
                    }
                })
                .collect();
            (kind, records)
        })
        .collect())
}

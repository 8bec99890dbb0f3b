//! Resource kinds found in claim exchange bundles
//!
//! The typed structs here are projections over the *resolved* form of a
//! resource: wherever the wire form has a `Reference`, the typed field holds
//! the resource the reference points at (or nothing when it did not resolve).

use super::complex::{CodeableConcept, HumanName, Money, Period};
use super::error::{Error, Result};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;

/// The `resourceType` tag of a bundle entry
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ResourceKind {
    Patient,
    Coverage,
    Claim,
    /// Preauth bundles from some providers tag the root resource `Preauth`
    /// instead of `Claim` with `use = preauthorization`
    Preauth,
    CoverageEligibilityRequest,
    Organization,
    Other(String),
}

impl ResourceKind {
    /// Kinds that can act as the primary request of a bundle, in lookup order
    pub const PRIMARY_REQUEST: [ResourceKind; 3] = [
        ResourceKind::Claim,
        ResourceKind::Preauth,
        ResourceKind::CoverageEligibilityRequest,
    ];

    pub fn as_str(&self) -> &str {
        match self {
            ResourceKind::Patient => "Patient",
            ResourceKind::Coverage => "Coverage",
            ResourceKind::Claim => "Claim",
            ResourceKind::Preauth => "Preauth",
            ResourceKind::CoverageEligibilityRequest => "CoverageEligibilityRequest",
            ResourceKind::Organization => "Organization",
            ResourceKind::Other(s) => s.as_str(),
        }
    }
}

impl From<&str> for ResourceKind {
    fn from(s: &str) -> Self {
        match s {
            "Patient" => ResourceKind::Patient,
            "Coverage" => ResourceKind::Coverage,
            "Claim" => ResourceKind::Claim,
            "Preauth" => ResourceKind::Preauth,
            "CoverageEligibilityRequest" => ResourceKind::CoverageEligibilityRequest,
            "Organization" => ResourceKind::Organization,
            other => ResourceKind::Other(other.to_string()),
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A resource with a typed projection
pub trait TypedResource: DeserializeOwned {
    /// Kinds whose JSON can be read as this type
    fn kinds() -> &'static [ResourceKind];

    /// Deserialize from resolved JSON, checking the `resourceType` tag
    fn from_resolved(value: &Value) -> Result<Self> {
        let actual = value
            .get("resourceType")
            .and_then(Value::as_str)
            .ok_or_else(|| Error::InvalidResource("missing resourceType".to_string()))?;
        if !Self::kinds().iter().any(|k| k.as_str() == actual) {
            return Err(Error::UnexpectedResourceType {
                expected: Self::kinds()
                    .iter()
                    .map(ResourceKind::as_str)
                    .collect::<Vec<_>>()
                    .join(" | "),
                actual: actual.to_string(),
            });
        }
        serde_json::from_value(value.clone()).map_err(Error::from)
    }
}

/// Information about an individual receiving health care services
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Patient {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub name: Vec<HumanName>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<Value>,

    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl Patient {
    /// Display text of the first name entry
    pub fn display_name(&self) -> Option<&str> {
        self.name.first().and_then(|n| n.text.as_deref())
    }
}

impl TypedResource for Patient {
    fn kinds() -> &'static [ResourceKind] {
        &[ResourceKind::Patient]
    }
}

/// Insurance or medical plan
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coverage {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// ID assigned to the subscriber
    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber_id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub subscriber: Option<Value>,

    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl TypedResource for Coverage {
    fn kinds() -> &'static [ResourceKind] {
        &[ResourceKind::Coverage]
    }
}

/// Product or service line of a claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ClaimItem {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub product_or_service: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub unit_price: Option<Money>,

    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Pertinent diagnosis information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnosis {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<u32>,

    #[serde(rename = "type", default, skip_serializing_if = "Vec::is_empty")]
    pub diagnosis_type: Vec<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub diagnosis_codeable_concept: Option<CodeableConcept>,

    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// Claim, pre-determination or preauthorization request
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claim {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    /// claim | preauthorization | predetermination
    #[serde(rename = "use", skip_serializing_if = "Option::is_none")]
    pub use_: Option<String>,

    /// More granular claim type (e.g. OPD, IPD)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sub_type: Option<CodeableConcept>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub total: Option<Money>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub item: Vec<ClaimItem>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub diagnosis: Vec<Diagnosis>,

    /// Party responsible for the claim, as resolved. Usually an
    /// Organization, but a Practitioner is valid too, so the shape is not
    /// fixed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<Value>,

    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl Claim {
    /// Code of the first `subType` coding
    pub fn sub_type_code(&self) -> Option<&str> {
        self.sub_type.as_ref().and_then(CodeableConcept::first_code)
    }

    /// Display name of the resolved provider
    ///
    /// Organizations carry a plain `name`; practitioners carry a `HumanName`
    /// list, of which the first `text` is taken. Anything else reads as no
    /// name.
    pub fn provider_name(&self) -> Option<&str> {
        match self.provider.as_ref()?.get("name")? {
            Value::String(name) => Some(name.as_str()),
            Value::Array(names) => names.first()?.get("text")?.as_str(),
            _ => None,
        }
    }
}

impl TypedResource for Claim {
    fn kinds() -> &'static [ResourceKind] {
        &[ResourceKind::Claim, ResourceKind::Preauth]
    }
}

/// Request for coverage eligibility information
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CoverageEligibilityRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub serviced_period: Option<Period>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub created: Option<String>,

    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

impl TypedResource for CoverageEligibilityRequest {
    fn kinds() -> &'static [ResourceKind] {
        &[ResourceKind::CoverageEligibilityRequest]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn resource_kind_round_trips_through_str() {
        for kind in ResourceKind::PRIMARY_REQUEST {
            assert_eq!(ResourceKind::from(kind.as_str()), kind);
        }
        assert_eq!(
            ResourceKind::from("Practitioner"),
            ResourceKind::Other("Practitioner".to_string())
        );
        assert_eq!(ResourceKind::Coverage.to_string(), "Coverage");
    }

    #[test]
    fn claim_from_resolved_reads_nested_provider() {
        let claim = Claim::from_resolved(&json!({
            "resourceType": "Claim",
            "id": "C1",
            "use": "claim",
            "subType": {"coding": [{"code": "OPD"}]},
            "provider": {"resourceType": "Organization", "id": "Tmh01", "name": "Tata Memorial Hospital"},
            "item": [{"sequence": 1, "unitPrice": {"value": 600, "currency": "INR"}}]
        }))
        .unwrap();

        assert_eq!(claim.use_.as_deref(), Some("claim"));
        assert_eq!(claim.sub_type_code(), Some("OPD"));
        assert_eq!(claim.provider_name(), Some("Tata Memorial Hospital"));
        assert_eq!(claim.item.len(), 1);
        assert!(claim.extensions.contains_key("resourceType"));
    }

    #[test]
    fn practitioner_provider_reads_human_name() {
        let claim = Claim::from_resolved(&json!({
            "resourceType": "Claim",
            "provider": {"resourceType": "Practitioner", "id": "D1", "name": [{"text": "Dr. Rao"}]}
        }))
        .unwrap();
        assert_eq!(claim.provider_name(), Some("Dr. Rao"));

        let odd = Claim::from_resolved(&json!({
            "resourceType": "Claim",
            "provider": {"resourceType": "Device", "name": {"value": 7}}
        }))
        .unwrap();
        assert_eq!(odd.provider_name(), None);

        let nameless = Claim::from_resolved(&json!({
            "resourceType": "Claim",
            "provider": {"resourceType": "Practitioner", "name": []}
        }))
        .unwrap();
        assert_eq!(nameless.provider_name(), None);
    }

    #[test]
    fn preauth_tag_reads_as_claim() {
        let claim = Claim::from_resolved(&json!({"resourceType": "Preauth", "use": "preauth"}));
        assert!(claim.is_ok());
    }

    #[test]
    fn from_resolved_rejects_wrong_kind() {
        let err = Patient::from_resolved(&json!({"resourceType": "Coverage"})).unwrap_err();
        assert!(matches!(err, Error::UnexpectedResourceType { .. }));

        let err = Patient::from_resolved(&json!({"id": "P1"})).unwrap_err();
        assert!(matches!(err, Error::InvalidResource(_)));
    }

    #[test]
    fn patient_display_name() {
        let patient = Patient::from_resolved(&json!({
            "resourceType": "Patient",
            "name": [{"text": "Hina Patel"}, {"text": "H. Patel"}],
            "gender": "female"
        }))
        .unwrap();
        assert_eq!(patient.display_name(), Some("Hina Patel"));

        let nameless = Patient::from_resolved(&json!({"resourceType": "Patient"})).unwrap();
        assert_eq!(nameless.display_name(), None);
    }
}

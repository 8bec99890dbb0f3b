//! Complex FHIR datatypes used by claim bundles

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// An identifier intended for computation
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Identifier {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,

    #[serde(flatten)]
    pub extensions: HashMap<String, Value>,
}

/// A reference to a code defined by a terminology system
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Coding {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

/// Concept - reference to a terminology or just text
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CodeableConcept {
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub coding: Vec<Coding>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
}

impl CodeableConcept {
    /// Code of the first coding, if any
    pub fn first_code(&self) -> Option<&str> {
        self.coding.first().and_then(|c| c.code.as_deref())
    }
}

/// Name of a human
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HumanName {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,

    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub given: Vec<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub family: Option<String>,
}

/// An amount of economic utility in some recognized currency
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Money {
    /// Numerical value (with implicit precision)
    #[serde(
        default,
        with = "rust_decimal::serde::float_option",
        skip_serializing_if = "Option::is_none"
    )]
    pub value: Option<Decimal>,

    /// ISO 4217 Currency Code
    #[serde(skip_serializing_if = "Option::is_none")]
    pub currency: Option<String>,
}

/// Time range defined by start and end date/time
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub end: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::str::FromStr;

    #[test]
    fn money_reads_integer_and_fractional_values() {
        let m: Money = serde_json::from_value(json!({"value": 100000, "currency": "INR"})).unwrap();
        assert_eq!(m.value, Some(Decimal::from(100000)));
        assert_eq!(m.currency.as_deref(), Some("INR"));

        let m: Money = serde_json::from_value(json!({"value": 99.5})).unwrap();
        assert_eq!(m.value, Some(Decimal::from_str("99.5").unwrap()));
        assert!(m.currency.is_none());
    }

    #[test]
    fn codeable_concept_first_code() {
        let cc: CodeableConcept = serde_json::from_value(json!({
            "coding": [
                {"system": "http://terminology.hl7.org/CodeSystem/ex-claimsubtype", "code": "OPD"},
                {"code": "IPD"}
            ]
        }))
        .unwrap();
        assert_eq!(cc.first_code(), Some("OPD"));
        assert_eq!(CodeableConcept::default().first_code(), None);
    }

    #[test]
    fn identifier_keeps_unknown_fields() {
        let id: Identifier = serde_json::from_value(json!({
            "system": "http://abdm.gov.in/facilities",
            "value": "HFR-ID-FOR-TMH",
            "type": {"coding": [{"code": "AC"}]}
        }))
        .unwrap();
        assert_eq!(id.value.as_deref(), Some("HFR-ID-FOR-TMH"));
        assert!(id.extensions.contains_key("type"));
    }
}

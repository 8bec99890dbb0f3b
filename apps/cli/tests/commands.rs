//! Subcommands run against the shared JSON fixtures

use claimdesk_claims::{ListResponse, RequestKind, Track};
use claimdesk_cli::cli::{EligibilityArgs, SourceArgs};
use claimdesk_cli::{commands, Command, Config};
use rust_decimal::Decimal;
use serde_json::Value;
use std::path::PathBuf;

const OPD_REQUEST: &str = "0a9d3b8c-5f0e-4a41-9a66-b8a1c2d3e4f5";
const DECIDED_REQUEST: &str = "7c1e2f90-3b4d-4c5e-8f6a-1b2c3d4e5f60";
const PENDING_ELIGIBILITY: &str = "e1f2a3b4-1111-4222-8333-444455556666";
const DECIDED_ELIGIBILITY: &str = "e9f8a7b6-2222-4333-8444-555566667777";

fn fixture(name: &str) -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR"))
        .join("../../fixtures")
        .join(name)
}

fn scratch(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!("claimdesk-cli-{}", std::process::id()));
    std::fs::create_dir_all(&dir).expect("failed to create scratch dir");
    dir.join(name)
}

fn claims() -> SourceArgs {
    SourceArgs {
        input: fixture("claim_list.json"),
        kind: RequestKind::Claim,
    }
}

/// Write record `index`'s payload to its own bundle file
fn bundle_file(index: usize, name: &str) -> PathBuf {
    let list: Value =
        serde_json::from_str(&std::fs::read_to_string(fixture("claim_list.json")).unwrap()).unwrap();
    let path = scratch(name);
    std::fs::write(&path, list["data"]["claim"][index]["payload"].to_string()).unwrap();
    path
}

async fn run(command: Command) -> anyhow::Result<String> {
    commands::run(command, &Config::default()).await
}

#[tokio::test]
async fn list_prints_table_without_cyclic_record() {
    let out = run(Command::List {
        source: claims(),
        json: false,
    })
    .await
    .unwrap();

    let lines: Vec<&str> = out.lines().collect();
    assert!(lines[0].starts_with("Request ID"));
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("Hina Patel"));
    assert!(lines[1].contains("601ee55d"));
    assert!(lines[1].contains("INR 1000"));
    assert!(!out.contains("b3a2c1d0"));
}

#[tokio::test]
async fn show_reports_blocked_gate() {
    let out = run(Command::Show {
        source: claims(),
        id: OPD_REQUEST.to_string(),
    })
    .await
    .unwrap();

    let shown: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(shown["view"]["name"], "Hina Patel");
    assert_eq!(shown["view"]["approved_amount"], "-");
    assert_eq!(
        shown["approval"]["gate"]["medical"]["blocked"]["reason"],
        "otp_not_verified"
    );
}

#[tokio::test]
async fn blocked_approval_is_an_error() {
    let err = run(Command::Approve {
        source: claims(),
        id: OPD_REQUEST.to_string(),
        track: Track::Medical,
        amount: None,
        remarks: None,
        output: None,
    })
    .await
    .unwrap_err();
    assert!(format!("{:#}", err).contains("OTP"));
}

#[tokio::test]
async fn unknown_request_is_an_error() {
    let err = run(Command::Reject {
        source: claims(),
        id: "nope".to_string(),
        track: Track::Medical,
        output: None,
    })
    .await
    .unwrap_err();
    assert!(err.to_string().contains("nope"));
}

#[tokio::test]
async fn approval_writes_updated_list() {
    // Start from a list where the OPD claim's OTP is verified.
    let mut list: ListResponse =
        serde_json::from_str(&std::fs::read_to_string(fixture("claim_list.json")).unwrap()).unwrap();
    for record in list.data.get_mut("claim").unwrap() {
        record.otp_verification = Some("successful".to_string());
    }
    let input = scratch("verified.json");
    std::fs::write(&input, serde_json::to_string(&list).unwrap()).unwrap();
    let output = scratch("approved.json");

    let out = run(Command::Approve {
        source: SourceArgs {
            input,
            kind: RequestKind::Claim,
        },
        id: OPD_REQUEST.to_string(),
        track: Track::Medical,
        amount: Some(Decimal::from(750)),
        remarks: Some("consultation".to_string()),
        output: Some(output.clone()),
    })
    .await
    .unwrap();
    assert!(out.starts_with("medical claim approved"));
    assert!(out.contains("financial: Pending (open)"));

    let written: ListResponse =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let record = written
        .records(RequestKind::Claim)
        .iter()
        .find(|r| r.request_id == OPD_REQUEST)
        .unwrap();
    assert_eq!(
        record.additional_info.medical.approved_amount,
        Some(Decimal::from(750))
    );
    assert_eq!(
        record.additional_info.medical.remarks.as_deref(),
        Some("consultation")
    );
}

#[tokio::test]
async fn response_update_checks_json() {
    let bad = scratch("bad-response.json");
    std::fs::write(&bad, "{\"resourceType\": ").unwrap();
    let err = run(Command::UpdateResponse {
        input: fixture("claim_list.json"),
        id: DECIDED_REQUEST.to_string(),
        response: bad,
        output: None,
    })
    .await
    .unwrap_err();
    assert_eq!(err.to_string(), "Invalid json");

    let good = scratch("good-response.json");
    std::fs::write(&good, r#"{"resourceType": "Bundle", "type": "collection"}"#).unwrap();
    let output = scratch("responded.json");
    let out = run(Command::UpdateResponse {
        input: fixture("claim_list.json"),
        id: DECIDED_REQUEST.to_string(),
        response: good,
        output: Some(output.clone()),
    })
    .await
    .unwrap();
    assert_eq!(out, "Response updated");

    let written: Value = serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let updated = written["data"]["claim"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["request_id"] == DECIDED_REQUEST)
        .unwrap();
    assert_eq!(updated["response_fhir"]["type"], "collection");
}

#[tokio::test]
async fn eligibility_table() {
    let out = run(Command::Eligibility {
        input: fixture("eligibility_list.json"),
        json: false,
    })
    .await
    .unwrap();
    let lines: Vec<&str> = out.lines().collect();
    assert_eq!(lines.len(), 3);
    assert!(lines[1].contains("Hina Patel"));
    assert!(lines[2].contains("Unnamed"));
}

#[tokio::test]
async fn eligibility_answers_write_updated_list() {
    let output = scratch("eligibility-approved.json");
    let out = run(Command::ApproveEligibility {
        target: EligibilityArgs {
            input: fixture("eligibility_list.json"),
            id: PENDING_ELIGIBILITY.to_string(),
            output: Some(output.clone()),
        },
    })
    .await
    .unwrap();
    assert_eq!(out, "Coverage Eligibility Request Approved\nstatus: Approved");

    let written: ListResponse =
        serde_json::from_str(&std::fs::read_to_string(&output).unwrap()).unwrap();
    let record = written
        .records(RequestKind::CoverageEligibility)
        .iter()
        .find(|r| r.request_id == PENDING_ELIGIBILITY)
        .unwrap();
    assert_eq!(record.status, "Approved");

    let err = run(Command::RejectEligibility {
        target: EligibilityArgs {
            input: fixture("eligibility_list.json"),
            id: DECIDED_ELIGIBILITY.to_string(),
            output: None,
        },
    })
    .await
    .unwrap_err();
    assert!(format!("{:#}", err).contains("no longer pending"));
}

#[tokio::test]
async fn locate_and_resolve_bundle_files() {
    let bundle = bundle_file(0, "opd-bundle.json");
    let out = run(Command::Locate {
        bundle: bundle.clone(),
        kind: "Coverage".to_string(),
    })
    .await
    .unwrap();
    let coverage: Value = serde_json::from_str(&out).unwrap();
    assert_eq!(coverage["subscriberId"], "SN-RVH1003");
    assert_eq!(coverage["subscriber"]["name"][0]["text"], "Hina Patel");

    assert!(run(Command::Locate {
        bundle,
        kind: "CoverageEligibilityRequest".to_string(),
    })
    .await
    .is_err());

    let cyclic = bundle_file(2, "cyclic-bundle.json");
    let out = run(Command::Resolve { bundle: cyclic }).await.unwrap();
    let entries: Value = serde_json::from_str(&out).unwrap();
    assert!(entries[0]["error"].as_str().unwrap().contains("depth"));
}

//! Subcommand implementations
//!
//! Each command returns the text to print so it can be asserted on in tests.
//! List files are loaded into an [`InMemoryPayor`], which stands in for the
//! payer backend.

use crate::cli::{Command, EligibilityArgs, SourceArgs};
use crate::config::Config;
use anyhow::{bail, Context};
use claimdesk_claims::{
    ActionOutcome, ApprovalDraft, ApprovalState, ClaimRow, ClaimView, ClaimViewBuilder,
    EligibilityRow, EligibilityView, InMemoryPayor, ListResponse, Notice, ReviewDesk, ROW_HEADERS,
};
use claimdesk_models::{Bundle, ResourceKind};
use claimdesk_resolve::BundleResolver;
use serde::Serialize;
use serde_json::{json, Value};
use std::fs;
use std::path::Path;
use std::sync::Arc;

pub async fn run(command: Command, config: &Config) -> anyhow::Result<String> {
    match command {
        Command::Resolve { bundle } => resolve(&bundle, config),
        Command::Locate { bundle, kind } => locate(&bundle, &kind, config),
        Command::List { source, json } => list(&source, json, config).await,
        Command::Show { source, id } => show(&source, &id, config).await,
        Command::Approve {
            source,
            id,
            track,
            amount,
            remarks,
            output,
        } => {
            let (payor, desk) = open_desk(&source.input, config)?;
            let view = find_view(&desk, &source, &id).await?;

            let mut draft = ApprovalDraft::for_view(&view, track);
            if let Some(amount) = amount {
                draft = draft.with_amount(amount);
            }
            if let Some(remarks) = remarks {
                draft = draft.with_remarks(remarks);
            }

            let outcome = desk.approve(&view, draft).await.with_context(|| {
                format!("Could not approve {} review of request {}", track, id)
            })?;
            save(&payor, output.as_deref())?;
            action_report(&outcome.notice, outcome.refreshed.as_ref())
        }
        Command::Reject {
            source,
            id,
            track,
            output,
        } => {
            let (payor, desk) = open_desk(&source.input, config)?;
            let view = find_view(&desk, &source, &id).await?;

            let outcome = desk.reject(&view, track).await.with_context(|| {
                format!("Could not reject {} review of request {}", track, id)
            })?;
            save(&payor, output.as_deref())?;
            action_report(&outcome.notice, outcome.refreshed.as_ref())
        }
        Command::UpdateResponse {
            input,
            id,
            response,
            output,
        } => {
            let (payor, desk) = open_desk(&input, config)?;
            let text = fs::read_to_string(&response)
                .with_context(|| format!("Failed to read response file {}", response.display()))?;

            let notice = match desk.update_response(&id, &text).await {
                Ok(notice) => notice,
                Err(e) => {
                    tracing::debug!(error = %e, "Response update failed");
                    bail!("{}", Notice::for_error(&e));
                }
            };
            save(&payor, output.as_deref())?;
            Ok(notice.to_string())
        }
        Command::ApproveEligibility { target } => answer_eligibility(&target, true, config).await,
        Command::RejectEligibility { target } => answer_eligibility(&target, false, config).await,
        Command::Eligibility { input, json } => {
            let (_, desk) = open_desk(&input, config)?;
            let views = desk.fetch_eligibility().await;
            if json {
                return to_pretty(&views);
            }

            let rows: Vec<EligibilityRow> = views.iter().map(EligibilityRow::from).collect();
            let cells: Vec<Vec<&str>> = rows
                .iter()
                .map(|r| {
                    vec![
                        r.request_id.as_str(),
                        r.request_no.as_str(),
                        r.patient_name.as_str(),
                        r.insurance_no.as_str(),
                        r.status.as_str(),
                    ]
                })
                .collect();
            Ok(render_table(
                &["Request ID", "Request No.", "Patient Name", "Insurance No.", "Status"],
                &cells,
            ))
        }
    }
}

fn resolve(path: &Path, config: &Config) -> anyhow::Result<String> {
    let bundle = read_bundle(path)?;
    let resolver = BundleResolver::new(&bundle).with_max_depth(config.view.max_resolve_depth);

    let resolved: Vec<Value> = bundle
        .entries()
        .iter()
        .map(|entry| {
            let resource = match entry.resource.as_ref() {
                Some(resource) => resolver.resolve_value(resource),
                None => Ok(None),
            };
            match resource {
                Ok(resource) => json!({"fullUrl": entry.full_url, "resource": resource}),
                Err(e) => {
                    tracing::warn!(full_url = ?entry.full_url, error = %e, "Entry could not be resolved");
                    json!({"fullUrl": entry.full_url, "error": e.to_string()})
                }
            }
        })
        .collect();

    to_pretty(&resolved)
}

fn locate(path: &Path, kind: &str, config: &Config) -> anyhow::Result<String> {
    let bundle = read_bundle(path)?;
    let kind = ResourceKind::from(kind);
    let resolver = BundleResolver::new(&bundle).with_max_depth(config.view.max_resolve_depth);

    match resolver.locate(&kind)? {
        Some(resource) => to_pretty(&resource),
        None => bail!("Bundle has no {} resource", kind),
    }
}

async fn list(source: &SourceArgs, json: bool, config: &Config) -> anyhow::Result<String> {
    let (_, desk) = open_desk(&source.input, config)?;
    if json {
        return to_pretty(&desk.fetch_list(source.kind).await);
    }

    let rows = desk.fetch_rows(source.kind).await;
    let cells: Vec<Vec<&str>> = rows.iter().map(|r| r.cells().to_vec()).collect();
    Ok(render_table(&ROW_HEADERS, &cells))
}

async fn show(source: &SourceArgs, id: &str, config: &Config) -> anyhow::Result<String> {
    let (_, desk) = open_desk(&source.input, config)?;
    let view = find_view(&desk, source, id).await?;
    to_pretty(&json!({
        "row": ClaimRow::from(&view),
        "approval": ApprovalState::of(&view),
        "view": view,
    }))
}

async fn answer_eligibility(
    target: &EligibilityArgs,
    approve: bool,
    config: &Config,
) -> anyhow::Result<String> {
    let (payor, desk) = open_desk(&target.input, config)?;
    let view = desk
        .fetch_eligibility_detail(&target.id)
        .await
        .with_context(|| format!("Request {} could not be projected", target.id))?
        .with_context(|| format!("No coverage eligibility request with id {}", target.id))?;

    let answered: claimdesk_claims::Result<ActionOutcome<EligibilityView>> = if approve {
        desk.approve_eligibility(&view).await
    } else {
        desk.reject_eligibility(&view).await
    };
    let outcome = answered
        .with_context(|| format!("Could not answer eligibility request {}", target.id))?;
    save(&payor, target.output.as_deref())?;

    let mut out = outcome.notice.to_string();
    if let Some(view) = outcome.refreshed {
        out.push_str(&format!("\nstatus: {}", view.status));
    }
    Ok(out)
}

fn open_desk(input: &Path, config: &Config) -> anyhow::Result<(Arc<InMemoryPayor>, ReviewDesk)> {
    let text = fs::read_to_string(input)
        .with_context(|| format!("Failed to read list file {}", input.display()))?;
    let response: ListResponse = serde_json::from_str(&text)
        .with_context(|| format!("Failed to parse list file {}", input.display()))?;

    let payor = Arc::new(InMemoryPayor::from_response(response));
    let mut desk = ReviewDesk::new(payor.clone(), payor.clone())
        .with_builder(ClaimViewBuilder::new(config.view.options()))
        .with_refetch(config.workflow.refetch_trigger());
    if let Some(token) = &config.workflow.token {
        desk = desk.with_token(token.clone());
    }
    Ok((payor, desk))
}

async fn find_view(
    desk: &ReviewDesk,
    source: &SourceArgs,
    id: &str,
) -> anyhow::Result<ClaimView> {
    desk.fetch_detail(source.kind, id)
        .await
        .with_context(|| format!("Request {} could not be projected", id))?
        .with_context(|| format!("No {} request with id {}", source.kind, id))
}

fn action_report(
    notice: &Notice,
    refreshed: Option<&ClaimView>,
) -> anyhow::Result<String> {
    let mut out = notice.to_string();
    if let Some(view) = refreshed {
        let state = ApprovalState::of(view);
        out.push_str(&format!(
            "\nstatus: {}\nmedical: {} ({})\nfinancial: {} ({})\napproved amount: {}",
            view.status,
            state.medical,
            gate_label(state.gate.medical_enabled()),
            state.financial,
            gate_label(state.gate.financial_enabled()),
            view.approved_amount,
        ));
    }
    Ok(out)
}

fn gate_label(enabled: bool) -> &'static str {
    if enabled {
        "open"
    } else {
        "closed"
    }
}

fn save(payor: &InMemoryPayor, output: Option<&Path>) -> anyhow::Result<()> {
    let Some(output) = output else {
        return Ok(());
    };
    let text = serde_json::to_string_pretty(&payor.snapshot())?;
    fs::write(output, text).with_context(|| format!("Failed to write {}", output.display()))?;
    tracing::info!(path = %output.display(), "Wrote updated list");
    Ok(())
}

fn read_bundle(path: &Path) -> anyhow::Result<Bundle> {
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read bundle {}", path.display()))?;
    serde_json::from_str(&text).with_context(|| format!("Failed to parse bundle {}", path.display()))
}

fn to_pretty<T: Serialize + ?Sized>(value: &T) -> anyhow::Result<String> {
    serde_json::to_string_pretty(value).context("Failed to serialize output")
}

/// Left-aligned columns separated by two spaces
fn render_table(headers: &[&str], rows: &[Vec<&str>]) -> String {
    let mut widths: Vec<usize> = headers.iter().map(|h| h.chars().count()).collect();
    for row in rows {
        for (width, cell) in widths.iter_mut().zip(row) {
            *width = (*width).max(cell.chars().count());
        }
    }

    let format_row = |cells: &[&str]| {
        cells
            .iter()
            .zip(&widths)
            .map(|(cell, width)| format!("{:<width$}", cell, width = *width))
            .collect::<Vec<_>>()
            .join("  ")
            .trim_end()
            .to_string()
    };

    let mut lines = vec![format_row(headers)];
    lines.extend(rows.iter().map(|row| format_row(row.as_slice())));
    lines.join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn table_pads_columns() {
        let table = render_table(&["A", "Long header"], &[vec!["value", "x"], vec!["v", "y"]]);
        let lines: Vec<&str> = table.lines().collect();
        assert_eq!(lines[0], "A      Long header");
        assert_eq!(lines[1], "value  x");
        assert_eq!(lines[2], "v      y");
    }
}

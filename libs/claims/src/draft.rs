//! Prefilled approval form
//!
//! The medical reviewer starts from what medical already recorded, or the
//! requested amount. The financial reviewer starts from the medically
//! approved amount.

use crate::collaborator::ApproveCommand;
use crate::gate::Track;
use crate::view::ClaimView;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalDraft {
    pub track: Track,
    #[serde(default)]
    pub remarks: String,
    pub amount: Decimal,
}

impl ApprovalDraft {
    pub fn for_view(view: &ClaimView, track: Track) -> Self {
        let requested = view.requested_amount.value;
        let medical = &view.medical_info;
        let financial = &view.financial_info;

        let (remarks, amount) = match track {
            Track::Medical => (
                medical.remarks.clone(),
                medical.approved_amount.unwrap_or(requested),
            ),
            Track::Financial => (
                financial.remarks.clone(),
                financial
                    .approved_amount
                    .or(medical.approved_amount)
                    .unwrap_or(requested),
            ),
        };

        Self {
            track,
            remarks: remarks.unwrap_or_default(),
            amount,
        }
    }

    pub fn with_remarks(mut self, remarks: impl Into<String>) -> Self {
        self.remarks = remarks.into();
        self
    }

    pub fn with_amount(mut self, amount: Decimal) -> Self {
        self.amount = amount;
        self
    }

    pub fn into_command(self, request_id: impl Into<String>) -> ApproveCommand {
        ApproveCommand {
            request_id: request_id.into(),
            track: self.track,
            remarks: self.remarks,
            approved_amount: self.amount,
        }
    }
}

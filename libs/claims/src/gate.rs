//! Review track gating
//!
//! Whether a track may be actioned is derived from the view every time it is
//! asked; nothing here is stored. Rules, in the order a blocked track reports
//! them:
//!
//! 1. OPD claims need a successful OTP verification before any action.
//! 2. A track that already carries a decision is closed.
//! 3. The financial track opens only once the medical track is approved.

use crate::record::ReviewStatus;
use crate::view::ClaimView;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const OPD_SUB_TYPE: &str = "OPD";
const CLAIM_USE: &str = "claim";
const OTP_SUCCESSFUL: &str = "successful";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Track {
    Medical,
    Financial,
}

impl Track {
    pub const ALL: [Track; 2] = [Track::Medical, Track::Financial];

    pub fn as_str(&self) -> &'static str {
        match self {
            Track::Medical => "medical",
            Track::Financial => "financial",
        }
    }
}

impl fmt::Display for Track {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Track {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "medical" => Ok(Track::Medical),
            "financial" => Ok(Track::Financial),
            other => Err(format!("unknown review track '{}'", other)),
        }
    }
}

/// Why a track is closed
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "reason", rename_all = "snake_case")]
pub enum BlockReason {
    /// OPD claim whose OTP has not been verified
    OtpNotVerified { otp_verification: String },
    /// Financial review waits on medical approval
    MedicalNotApproved,
    AlreadyDecided { status: ReviewStatus },
}

impl fmt::Display for BlockReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            BlockReason::OtpNotVerified { otp_verification } => write!(
                f,
                "OPD claim requires OTP verification (current: {})",
                otp_verification
            ),
            BlockReason::MedicalNotApproved => f.write_str("medical review is not approved"),
            BlockReason::AlreadyDecided { status } => write!(f, "already {}", status),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TrackGate {
    Enabled,
    Blocked(BlockReason),
}

impl TrackGate {
    pub fn is_enabled(&self) -> bool {
        matches!(self, TrackGate::Enabled)
    }

    pub fn reason(&self) -> Option<&BlockReason> {
        match self {
            TrackGate::Enabled => None,
            TrackGate::Blocked(reason) => Some(reason),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Gate {
    pub medical: TrackGate,
    pub financial: TrackGate,
}

impl Gate {
    pub fn medical_enabled(&self) -> bool {
        self.medical.is_enabled()
    }

    pub fn financial_enabled(&self) -> bool {
        self.financial.is_enabled()
    }

    pub fn track(&self, track: Track) -> &TrackGate {
        match track {
            Track::Medical => &self.medical,
            Track::Financial => &self.financial,
        }
    }

    pub fn is_enabled(&self, track: Track) -> bool {
        self.track(track).is_enabled()
    }

    pub fn reason(&self, track: Track) -> Option<&BlockReason> {
        self.track(track).reason()
    }
}

/// Decide which review tracks of `view` may be actioned
pub fn evaluate_gate(view: &ClaimView) -> Gate {
    let otp_block = otp_block(view);
    let medical_status = view.medical_info.status;
    let financial_status = view.financial_info.status;

    let medical = if let Some(reason) = otp_block.clone() {
        TrackGate::Blocked(reason)
    } else if medical_status.is_decided() {
        TrackGate::Blocked(BlockReason::AlreadyDecided {
            status: medical_status,
        })
    } else {
        TrackGate::Enabled
    };

    let financial = if let Some(reason) = otp_block {
        TrackGate::Blocked(reason)
    } else if financial_status.is_decided() {
        TrackGate::Blocked(BlockReason::AlreadyDecided {
            status: financial_status,
        })
    } else if medical_status != ReviewStatus::Approved {
        TrackGate::Blocked(BlockReason::MedicalNotApproved)
    } else {
        TrackGate::Enabled
    };

    Gate { medical, financial }
}

fn otp_block(view: &ClaimView) -> Option<BlockReason> {
    let is_opd_claim = view.sub_type == OPD_SUB_TYPE && view.use_ == CLAIM_USE;
    if is_opd_claim && !view.otp_verification.eq_ignore_ascii_case(OTP_SUCCESSFUL) {
        Some(BlockReason::OtpNotVerified {
            otp_verification: view.otp_verification.clone(),
        })
    } else {
        None
    }
}

/// Per-track statuses of a view together with its gate
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ApprovalState {
    pub medical: ReviewStatus,
    pub financial: ReviewStatus,
    pub gate: Gate,
}

impl ApprovalState {
    pub fn of(view: &ClaimView) -> Self {
        Self {
            medical: view.medical_info.status,
            financial: view.financial_info.status,
            gate: evaluate_gate(view),
        }
    }

    pub fn status(&self, track: Track) -> ReviewStatus {
        match track {
            Track::Medical => self.medical,
            Track::Financial => self.financial,
        }
    }
}

//! Claim projection and review workflow
//!
//! Turns raw request records (a claim bundle plus workflow metadata) into flat
//! [`ClaimView`]s, and drives the two-track medical/financial review through
//! injectable collaborators.
//!
//! Flow: [`ReviewDesk::fetch_list`] pulls records from a [`RequestSource`],
//! [`ClaimViewBuilder`] resolves and projects each bundle, [`evaluate_gate`]
//! decides which review track may be actioned, and approve/reject commands go
//! to a [`ReviewActions`] implementation before the view is fetched again.

pub mod collaborator;
pub mod draft;
pub mod eligibility;
pub mod error;
pub mod gate;
pub mod money;
pub mod record;
pub mod table;
pub mod view;
pub mod workflow;

pub use collaborator::{
    ApproveCommand, EligibilityCommand, InMemoryPayor, RejectCommand, RequestSource,
    ReviewActions, UpdateResponseCommand,
};
pub use draft::ApprovalDraft;
pub use eligibility::{EligibilityRow, EligibilityView};
pub use error::{Error, Result};
pub use gate::{evaluate_gate, ApprovalState, BlockReason, Gate, Track, TrackGate};
pub use money::{Amount, ApprovedAmount};
pub use record::{AdditionalInfo, ListResponse, RawRecord, RequestKind, ReviewInfo, ReviewStatus};
pub use table::{ClaimRow, ROW_HEADERS};
pub use view::{ClaimResources, ClaimView, ClaimViewBuilder, ViewOptions};
pub use workflow::{
    ActionOutcome, FixedDelay, Immediate, Notice, NoticeLevel, RefetchTrigger, ReviewDesk,
};

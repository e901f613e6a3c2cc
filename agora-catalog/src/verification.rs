use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Status of a seller verification request.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VerificationStatus {
    Pending,
    Approved,
    Rejected,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Pending => "PENDING",
            VerificationStatus::Approved => "APPROVED",
            VerificationStatus::Rejected => "REJECTED",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "PENDING" => Some(VerificationStatus::Pending),
            "APPROVED" => Some(VerificationStatus::Approved),
            "REJECTED" => Some(VerificationStatus::Rejected),
            _ => None,
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Decision {
    Approve,
    Reject,
}

/// A seller's application for verified status, reviewed by an admin.
///
/// Lifecycle: submitted as `Pending`; an admin decision moves it to
/// `Approved` or `Rejected`; a rejected request can be resubmitted, which
/// returns it to `Pending`. Approval is what flips the applicant's profile
/// role to seller and marks profile and store verified.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VerificationRequest {
    pub id: Uuid,
    pub profile_id: Uuid,
    pub store_name: String,
    pub message: Option<String>,
    pub status: VerificationStatus,
    pub rejection_reason: Option<String>,
    pub submitted_at: DateTime<Utc>,
    pub decided_at: Option<DateTime<Utc>>,
    pub decided_by: Option<String>,
}

impl VerificationRequest {
    pub fn new(profile_id: Uuid, store_name: String, message: Option<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            profile_id,
            store_name,
            message,
            status: VerificationStatus::Pending,
            rejection_reason: None,
            submitted_at: Utc::now(),
            decided_at: None,
            decided_by: None,
        }
    }

    /// Apply an admin decision. Only a pending request can be decided;
    /// approval clears any rejection reason left over from an earlier round.
    pub fn decide(
        &mut self,
        decision: Decision,
        reason: Option<String>,
        decided_by: &str,
    ) -> Result<(), VerificationError> {
        if self.status != VerificationStatus::Pending {
            return Err(VerificationError::AlreadyDecided {
                status: self.status,
            });
        }

        match decision {
            Decision::Approve => {
                self.status = VerificationStatus::Approved;
                self.rejection_reason = None;
            }
            Decision::Reject => {
                self.status = VerificationStatus::Rejected;
                self.rejection_reason = reason;
            }
        }
        self.decided_at = Some(Utc::now());
        self.decided_by = Some(decided_by.to_string());
        Ok(())
    }

    /// Resubmit after a rejection. Returns the request to the review queue.
    pub fn resubmit(&mut self, message: Option<String>) -> Result<(), VerificationError> {
        if self.status != VerificationStatus::Rejected {
            return Err(VerificationError::NotRejected {
                status: self.status,
            });
        }
        self.status = VerificationStatus::Pending;
        self.message = message;
        self.submitted_at = Utc::now();
        self.decided_at = None;
        self.decided_by = None;
        Ok(())
    }
}

#[derive(Debug, thiserror::Error)]
pub enum VerificationError {
    #[error("Verification request not found: {0}")]
    NotFound(String),

    #[error("Request already decided: {status:?}")]
    AlreadyDecided { status: VerificationStatus },

    #[error("Only a rejected request can be resubmitted (current: {status:?})")]
    NotRejected { status: VerificationStatus },
}

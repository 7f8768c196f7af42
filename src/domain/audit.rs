use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{LoanId, RenewalRejection, UserId};

pub const RENEWAL_REJECTED_ACTION: &str = "Renewal Rejected";

/// 監査ログの1件
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuditEntry {
    pub user_id: UserId,
    pub loan_id: LoanId,
    pub action: String,
    pub description: String,
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// 延長拒否の記録
    pub fn renewal_rejected(
        user_id: UserId,
        loan_id: LoanId,
        rejection: RenewalRejection,
        recorded_at: DateTime<Utc>,
    ) -> Self {
        Self {
            user_id,
            loan_id,
            action: RENEWAL_REJECTED_ACTION.to_string(),
            description: format!(
                "Renewal rejected for loan {}. Reason: {}",
                loan_id, rejection
            ),
            recorded_at,
        }
    }
}

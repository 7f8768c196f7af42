use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{CardId, CardStatus, UserId};

/// 利用者カード - 期間を限定した貸出資格
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MembershipCard {
    pub card_id: CardId,
    pub user_id: UserId,
    pub issued_at: DateTime<Utc>,
    pub expires_at: DateTime<Utc>,
    pub status: Option<CardStatus>,
}

impl MembershipCard {
    /// ステータスがNULLまたはActive
    pub fn is_active(&self) -> bool {
        matches!(self.status, None | Some(CardStatus::Active))
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.is_active() && self.expires_at >= now
    }
}

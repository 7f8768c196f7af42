use crate::domain::{MembershipCard, value_objects::UserId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Membership service port
///
/// Keeps the boundary between the lending and membership contexts.
#[async_trait]
pub trait MembershipService: Send + Sync {
    /// Cards held by a user whose status is NULL or Active.
    ///
    /// Expiry is not filtered here; see `eligibility::governing_card`.
    async fn get_active_cards_for(&self, user_id: UserId) -> Result<Vec<MembershipCard>>;
}

use crate::domain::{MembershipCard, value_objects::UserId};
use crate::ports::membership_service::{MembershipService as MembershipServiceTrait, Result};
use async_trait::async_trait;
use std::sync::Mutex;

/// Mock implementation of MembershipService
///
/// Keeps issued cards in memory so tests can set up card states.
pub struct MembershipService {
    cards: Mutex<Vec<MembershipCard>>,
}

impl MembershipService {
    pub fn new() -> Self {
        Self {
            cards: Mutex::new(Vec::new()),
        }
    }

    /// Issue a card for testing purposes
    pub fn add_card(&self, card: MembershipCard) {
        self.cards
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .push(card);
    }
}

impl Default for MembershipService {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl MembershipServiceTrait for MembershipService {
    /// Cards of the user with status NULL or Active
    async fn get_active_cards_for(&self, user_id: UserId) -> Result<Vec<MembershipCard>> {
        Ok(self
            .cards
            .lock()
            .unwrap_or_else(|e| e.into_inner())
            .iter()
            .filter(|card| card.user_id == user_id && card.is_active())
            .cloned()
            .collect())
    }
}

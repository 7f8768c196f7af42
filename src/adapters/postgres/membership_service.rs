use crate::domain::{
    CardStatus, MembershipCard,
    value_objects::{CardId, UserId},
};
use crate::ports::membership_service::{MembershipService as MembershipServiceTrait, Result};
use async_trait::async_trait;
use sqlx::{PgPool, Row, postgres::PgRow};
use std::str::FromStr;

fn map_row_to_card(row: &PgRow) -> Result<MembershipCard> {
    let status: Option<String> = row.try_get("status")?;
    let status = status
        .as_deref()
        .map(CardStatus::from_str)
        .transpose()
        .map_err(|e| {
            Box::new(std::io::Error::new(std::io::ErrorKind::InvalidData, e))
                as Box<dyn std::error::Error + Send + Sync>
        })?;

    Ok(MembershipCard {
        card_id: CardId::from_uuid(row.try_get("card_id")?),
        user_id: UserId::from_uuid(row.try_get("user_id")?),
        issued_at: row.try_get("issued_at")?,
        expires_at: row.try_get("expires_at")?,
        status,
    })
}

/// PostgreSQL implementation of MembershipService
///
/// Reads `library_cards`; cards with a NULL status count as active.
pub struct MembershipService {
    pool: PgPool,
}

impl MembershipService {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl MembershipServiceTrait for MembershipService {
    async fn get_active_cards_for(&self, user_id: UserId) -> Result<Vec<MembershipCard>> {
        let rows = sqlx::query(
            r#"
            SELECT card_id, user_id, issued_at, expires_at, status
            FROM library_cards
            WHERE user_id = $1 AND (status IS NULL OR status = 'Active')
            ORDER BY expires_at DESC
            "#,
        )
        .bind(user_id.value())
        .fetch_all(&self.pool)
        .await?;

        rows.iter().map(map_row_to_card).collect()
    }
}

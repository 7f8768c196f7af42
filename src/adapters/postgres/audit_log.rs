use crate::domain::AuditEntry;
use crate::ports::audit_log::{AuditLog as AuditLogTrait, Result};
use async_trait::async_trait;
use sqlx::PgPool;

/// AuditLogのPostgreSQL実装（`audit_logs` に追記のみ）
pub struct AuditLog {
    pool: PgPool,
}

impl AuditLog {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl AuditLogTrait for AuditLog {
    async fn record(&self, entry: AuditEntry) -> Result<()> {
        sqlx::query(
            r#"
            INSERT INTO audit_logs (user_id, loan_id, action, description, recorded_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(entry.user_id.value())
        .bind(entry.loan_id.value())
        .bind(&entry.action)
        .bind(&entry.description)
        .bind(entry.recorded_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

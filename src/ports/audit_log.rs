use crate::domain::AuditEntry;
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 監査ログポート
///
/// 書き込みはベストエフォート。失敗しても呼び出し元の判定は取り消さない。
#[async_trait]
pub trait AuditLog: Send + Sync {
    async fn record(&self, entry: AuditEntry) -> Result<()>;
}

use crate::domain::{LoanStatus, UserId, loan::LoanRecord, value_objects::LoanId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// 貸出記録リポジトリポート
///
/// 書き込みは貸出ライフサイクル管理のみが行う。
/// 一覧系メソッドは貸出日時の降順で返すことが期待されるが、
/// クエリサービス側でも並び替えを行う。
#[async_trait]
pub trait LoanRepository: Send + Sync {
    /// IDで貸出記録を取得する
    async fn load(&self, loan_id: LoanId) -> Result<Option<LoanRecord>>;

    /// 貸出記録を保存する（upsert）
    ///
    /// 明細を含む記録全体を保存する。部分更新は行わない。
    async fn save(&self, loan: &LoanRecord) -> Result<()>;

    /// 借り手の全貸出記録
    async fn list_by_borrower(&self, borrower_id: UserId) -> Result<Vec<LoanRecord>>;

    /// 全貸出記録
    async fn list_all(&self) -> Result<Vec<LoanRecord>>;

    /// 指定ステータスの貸出記録
    async fn list_by_status(&self, status: LoanStatus) -> Result<Vec<LoanRecord>>;
}

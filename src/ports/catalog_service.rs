use crate::domain::{Book, value_objects::BookId};
use async_trait::async_trait;

pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// カタログサービスポート
///
/// 貸出コンテキストとカタログコンテキストの境界を維持する。
/// 書籍の登録・編集はカタログ側の責務で、ここでは読み取りのみ。
#[async_trait]
pub trait CatalogService: Send + Sync {
    /// 書籍を取得する。存在しなければ `None`
    async fn get_book(&self, book_id: BookId) -> Result<Option<Book>>;
}

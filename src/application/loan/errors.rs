use crate::domain::LoanRequestError;
use thiserror::Error;

/// 貸出管理アプリケーション層のエラー
#[derive(Debug, Error)]
pub enum LoanApplicationError {
    /// 貸出記録が見つからない
    #[error("Loan not found")]
    LoanNotFound,

    /// 書籍が見つからない
    #[error("Book not found")]
    BookNotFound,

    /// 有効な利用者カードがない
    #[error("Borrower has no valid membership card")]
    IneligibleBorrower,

    /// 冊数が不正
    #[error("Quantity must be at least 1")]
    InvalidQuantity,

    /// 操作の権限がない（他人の貸出の延長など）
    #[error("Access denied")]
    AccessDenied,

    /// LoanRepositoryのエラー
    #[error("Loan repository error")]
    RepositoryError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// CatalogServiceのエラー
    #[error("Catalog service error")]
    CatalogServiceError(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// MembershipServiceのエラー
    #[error("Membership service error")]
    MembershipServiceError(#[source] Box<dyn std::error::Error + Send + Sync>),
}

impl From<LoanRequestError> for LoanApplicationError {
    fn from(err: LoanRequestError) -> Self {
        match err {
            LoanRequestError::InvalidQuantity => LoanApplicationError::InvalidQuantity,
        }
    }
}

/// アプリケーション層の Result型
pub type Result<T> = std::result::Result<T, LoanApplicationError>;

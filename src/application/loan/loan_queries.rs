use crate::application::access::ListScope;
use crate::domain::{Book, LoanStatus, UserId, loan::LoanRecord, value_objects::BookId};
use std::collections::HashMap;

use super::errors::{LoanApplicationError, Result};
use super::loan_service::ServiceDependencies;

/// 明細と書籍情報
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LineItemDetails {
    pub book_id: BookId,
    pub quantity: u32,
    /// カタログから削除された書籍は `None`
    pub book: Option<Book>,
}

/// 一覧表示用の貸出記録
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoanDetails {
    pub loan: LoanRecord,
    pub items: Vec<LineItemDetails>,
}

/// 借り手本人の貸出一覧（貸出日時の降順）
pub async fn list_own(deps: &ServiceDependencies, borrower_id: UserId) -> Result<Vec<LoanDetails>> {
    let loans = deps
        .loan_repository
        .list_by_borrower(borrower_id)
        .await
        .map_err(LoanApplicationError::RepositoryError)?;

    with_details(deps, loans).await
}

/// 全貸出一覧（管理者用）。ステータスで絞り込み可能
pub async fn list_all(
    deps: &ServiceDependencies,
    status: Option<LoanStatus>,
) -> Result<Vec<LoanDetails>> {
    let loans = match status {
        Some(status) => deps.loan_repository.list_by_status(status).await,
        None => deps.loan_repository.list_all().await,
    }
    .map_err(LoanApplicationError::RepositoryError)?;

    with_details(deps, loans).await
}

/// 承認待ち（Processing）の一覧
pub async fn list_pending(deps: &ServiceDependencies) -> Result<Vec<LoanDetails>> {
    list_all(deps, Some(LoanStatus::Processing)).await
}

/// 一覧範囲に応じた貸出一覧
///
/// 借り手本人の範囲ではステータスの絞り込みは無視する。
pub async fn list_for_scope(
    deps: &ServiceDependencies,
    scope: ListScope,
    status: Option<LoanStatus>,
) -> Result<Vec<LoanDetails>> {
    match scope {
        ListScope::Own(borrower_id) => list_own(deps, borrower_id).await,
        ListScope::All => list_all(deps, status).await,
    }
}

/// 貸出日時の降順に並べ、明細の書籍情報を解決する
async fn with_details(
    deps: &ServiceDependencies,
    mut loans: Vec<LoanRecord>,
) -> Result<Vec<LoanDetails>> {
    loans.sort_by(|a, b| b.loaned_at.cmp(&a.loaned_at));

    let mut books: HashMap<BookId, Option<Book>> = HashMap::new();
    let mut details = Vec::with_capacity(loans.len());

    for loan in loans {
        let mut items = Vec::with_capacity(loan.line_items.len());
        for item in &loan.line_items {
            let book = match books.get(&item.book_id) {
                Some(book) => book.clone(),
                None => {
                    let book = deps
                        .catalog_service
                        .get_book(item.book_id)
                        .await
                        .map_err(LoanApplicationError::CatalogServiceError)?;
                    books.insert(item.book_id, book.clone());
                    book
                }
            };

            items.push(LineItemDetails {
                book_id: item.book_id,
                quantity: item.quantity,
                book,
            });
        }
        details.push(LoanDetails { loan, items });
    }

    Ok(details)
}

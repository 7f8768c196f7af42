use crate::application::access::{self, AccessDecision, Operation};
use crate::domain::{
    self, AuditEntry,
    commands::*,
    eligibility,
    loan::{LoanRecord, Transition},
    value_objects::*,
};
use crate::ports::*;
use chrono::{DateTime, Utc};
use std::sync::Arc;

use super::errors::{LoanApplicationError, Result};

pub const RENEWAL_SUCCESS_MESSAGE: &str = "Book renewal successful. Due date extended by 7 days.";

/// サービスの依存関係
///
/// グローバルなデータストアは持たず、すべてのポートをここから受け取る。
#[derive(Clone)]
pub struct ServiceDependencies {
    pub loan_repository: Arc<dyn LoanRepository>,
    pub catalog_service: Arc<dyn CatalogService>,
    pub membership_service: Arc<dyn MembershipService>,
    pub audit_log: Arc<dyn AuditLog>,
}

/// 延長の結果
///
/// 延長不可はエラーではなく `success == false` として返す。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenewalOutcome {
    pub success: bool,
    pub message: String,
    pub new_due_date: Option<DateTime<Utc>>,
}

/// リポジトリから貸出記録を取得するヘルパー関数
///
/// # エラー
/// - RepositoryError: 読み込み失敗
/// - LoanNotFound: 記録が存在しない
pub(super) async fn load_loan(
    repository: &Arc<dyn LoanRepository>,
    loan_id: LoanId,
) -> Result<LoanRecord> {
    repository
        .load(loan_id)
        .await
        .map_err(LoanApplicationError::RepositoryError)?
        .ok_or(LoanApplicationError::LoanNotFound)
}

async fn save_loan(repository: &Arc<dyn LoanRepository>, loan: &LoanRecord) -> Result<()> {
    repository
        .save(loan)
        .await
        .map_err(LoanApplicationError::RepositoryError)
}

/// 貸出を申請する
///
/// ビジネスルール：
/// - 借り手が有効な利用者カード（ステータスがNULL/Active、有効期限内）を持つこと
/// - 書籍が存在すること
///
/// 作成された記録はProcessing状態、返却期限は14日後。
pub async fn request_loan(deps: &ServiceDependencies, cmd: RequestLoan) -> Result<LoanRecord> {
    // 1. 利用者カードの確認
    let cards = deps
        .membership_service
        .get_active_cards_for(cmd.borrower_id)
        .await
        .map_err(LoanApplicationError::MembershipServiceError)?;

    let Some(card) = eligibility::governing_card(&cards, cmd.requested_at) else {
        tracing::info!(
            borrower_id = %cmd.borrower_id,
            "Loan request refused: no valid membership card"
        );
        return Err(LoanApplicationError::IneligibleBorrower);
    };
    tracing::debug!(
        card_id = %card.card_id.value(),
        expires_at = %card.expires_at,
        "Governing membership card"
    );

    // 2. 書籍の存在確認
    deps.catalog_service
        .get_book(cmd.book_id)
        .await
        .map_err(LoanApplicationError::CatalogServiceError)?
        .ok_or(LoanApplicationError::BookNotFound)?;

    // 3. ドメイン層の純粋関数を呼び出し
    let loan = domain::loan::request_loan(
        cmd.borrower_id,
        cmd.book_id,
        cmd.quantity,
        cmd.requested_at,
    )?;

    // 4. 保存
    save_loan(&deps.loan_repository, &loan).await?;

    tracing::info!(loan_id = %loan.loan_id, borrower_id = %loan.borrower_id, "Loan requested");
    Ok(loan)
}

/// 貸出申請を承認する
///
/// Processing以外の状態では何もせず `Transition::Skipped` を返す。
/// 読み込み→書き込みの間に条件付き更新は行わない。
pub async fn approve_loan(deps: &ServiceDependencies, cmd: ApproveLoan) -> Result<Transition> {
    let loan = load_loan(&deps.loan_repository, cmd.loan_id).await?;

    let transition = domain::loan::approve(&loan, cmd.approver_id);
    match &transition {
        Transition::Applied(approved) => {
            save_loan(&deps.loan_repository, approved).await?;
            tracing::info!(loan_id = %cmd.loan_id, approver_id = %cmd.approver_id, "Loan approved");
        }
        Transition::Skipped { current } => {
            tracing::debug!(loan_id = %cmd.loan_id, status = current.as_str(), "Approve skipped");
        }
    }

    Ok(transition)
}

/// 貸出申請を却下する
///
/// Processing以外の状態では何もしない。
pub async fn reject_loan(deps: &ServiceDependencies, cmd: RejectLoan) -> Result<Transition> {
    let loan = load_loan(&deps.loan_repository, cmd.loan_id).await?;

    let transition = domain::loan::reject(&loan);
    match &transition {
        Transition::Applied(rejected) => {
            save_loan(&deps.loan_repository, rejected).await?;
            tracing::info!(loan_id = %cmd.loan_id, "Loan rejected");
        }
        Transition::Skipped { current } => {
            tracing::debug!(loan_id = %cmd.loan_id, status = current.as_str(), "Reject skipped");
        }
    }

    Ok(transition)
}

/// 貸出を延長する
///
/// ビジネスルール：
/// - 借り手本人のみ延長できる
/// - 延長可否は `eligibility::check_renewal` に従う
///
/// 延長不可の場合は監査ログに理由を記録する。監査ログの書き込み失敗は
/// 警告ログのみで、結果には影響しない。
pub async fn renew_loan(deps: &ServiceDependencies, cmd: RenewLoan) -> Result<RenewalOutcome> {
    let loan = load_loan(&deps.loan_repository, cmd.loan_id).await?;

    let decision = access::authorize(
        Some(&cmd.requested_by),
        Operation::Renew {
            borrower_id: loan.borrower_id,
        },
    );
    if decision != AccessDecision::Allowed {
        return Err(LoanApplicationError::AccessDenied);
    }

    match domain::loan::renew(&loan) {
        Ok(renewed) => {
            save_loan(&deps.loan_repository, &renewed).await?;
            tracing::info!(
                loan_id = %cmd.loan_id,
                old_due_date = %loan.due_date,
                new_due_date = %renewed.due_date,
                "Loan renewed"
            );

            Ok(RenewalOutcome {
                success: true,
                message: RENEWAL_SUCCESS_MESSAGE.to_string(),
                new_due_date: Some(renewed.due_date),
            })
        }
        Err(rejection) => {
            tracing::info!(loan_id = %cmd.loan_id, reason = %rejection, "Renewal rejected");

            let entry = AuditEntry::renewal_rejected(
                loan.borrower_id,
                loan.loan_id,
                rejection,
                cmd.requested_at,
            );
            if let Err(e) = deps.audit_log.record(entry).await {
                tracing::warn!(
                    loan_id = %cmd.loan_id,
                    error = %e,
                    "Failed to record renewal rejection"
                );
            }

            Ok(RenewalOutcome {
                success: false,
                message: rejection.message().to_string(),
                new_due_date: None,
            })
        }
    }
}

/// 書籍を返却する
///
/// 状態による前提条件はない。返却済み・却下済みの記録でも返却日時と延滞料を再計算する。
pub async fn return_loan(deps: &ServiceDependencies, cmd: ReturnLoan) -> Result<LoanRecord> {
    let loan = load_loan(&deps.loan_repository, cmd.loan_id).await?;

    if loan.status.is_terminal() {
        tracing::debug!(
            loan_id = %cmd.loan_id,
            status = loan.status.as_str(),
            "Returning a closed loan; return date and fine are recomputed"
        );
    }

    let returned = domain::loan::return_loan(&loan, cmd.returned_at);
    save_loan(&deps.loan_repository, &returned).await?;

    tracing::info!(loan_id = %cmd.loan_id, fine_amount = %returned.fine_amount, "Loan returned");
    Ok(returned)
}

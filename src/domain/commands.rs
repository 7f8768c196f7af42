use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::{BookId, Identity, LoanId, UserId};

/// コマンド：貸出を申請する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestLoan {
    pub borrower_id: UserId,
    pub book_id: BookId,
    pub quantity: u32,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：貸出申請を承認する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApproveLoan {
    pub loan_id: LoanId,
    pub approver_id: UserId,
}

/// コマンド：貸出申請を却下する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RejectLoan {
    pub loan_id: LoanId,
}

/// コマンド：貸出を延長する
///
/// 延長は借り手本人のみ可能なため、呼び出し元を含む。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RenewLoan {
    pub loan_id: LoanId,
    pub requested_by: Identity,
    pub requested_at: DateTime<Utc>,
}

/// コマンド：書籍を返却する
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReturnLoan {
    pub loan_id: LoanId,
    pub returned_at: DateTime<Utc>,
}

use chrono::{DateTime, Duration, Months, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use super::{
    BookId, LoanId, LoanRequestError, LoanStatus, RenewalRejection, UserId,
    eligibility::check_renewal,
};

/// 貸出期間（日数）
pub const LOAN_PERIOD_DAYS: i64 = 14;

/// 1回の延長で伸びる日数
pub const RENEWAL_PERIOD_DAYS: i64 = 7;

/// 貸出日から数えた返却期限の上限（月数）
pub const MAX_LOAN_MONTHS: u32 = 6;

/// 延滞1日あたりの延滞料
pub const FINE_PER_DAY: i64 = 5000;

/// 貸出明細 - 1冊の書籍とその冊数
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LineItem {
    pub book_id: BookId,
    pub quantity: u32,
}

/// 貸出記録集約 - 1回の貸出取引
///
/// 不変条件：
/// - `returned_at` が設定されているのは `status == Returned` のときのみ
/// - `approved_by` は Borrowing / Returned のときのみ設定され得る
/// - `loaned_at <= due_date <= loaned_at + 6ヶ月`
/// - `fine_amount` は Returned 以外では 0
/// - `line_items` は1件以上
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LoanRecord {
    pub loan_id: LoanId,
    pub borrower_id: UserId,
    pub approved_by: Option<UserId>,

    pub loaned_at: DateTime<Utc>,
    pub due_date: DateTime<Utc>,
    pub returned_at: Option<DateTime<Utc>>,
    pub status: LoanStatus,
    pub fine_amount: Decimal,

    pub line_items: Vec<LineItem>,
}

/// 承認・却下の結果
///
/// 前提条件を満たさない場合はエラーにせず、遷移をスキップする。
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Transition {
    /// 状態が変わった
    Applied(LoanRecord),
    /// 現在の状態では遷移できないため何もしなかった
    Skipped { current: LoanStatus },
}

impl Transition {
    pub fn is_applied(&self) -> bool {
        matches!(self, Transition::Applied(_))
    }
}

/// 貸出日から計算した返却期限の上限
pub fn renewal_cap(loaned_at: DateTime<Utc>) -> DateTime<Utc> {
    loaned_at
        .checked_add_months(Months::new(MAX_LOAN_MONTHS))
        .unwrap_or(loaned_at)
}

/// 純粋関数：延滞料を計算する
///
/// 延滞日数は (返却日時 - 返却期限) の日単位の切り捨て。
/// 0日以下なら延滞料は0。
pub fn calculate_fine(due_date: DateTime<Utc>, returned_at: DateTime<Utc>) -> Decimal {
    let days_late = (returned_at - due_date).num_days();
    if days_late > 0 {
        Decimal::from(days_late) * Decimal::from(FINE_PER_DAY)
    } else {
        Decimal::ZERO
    }
}

/// 純粋関数：貸出申請を作成する
///
/// ビジネスルール：
/// - 状態はProcessing
/// - 返却期限は申請日時 + 14日
/// - 明細は1件
///
/// 会員資格・書籍の存在確認はアプリケーション層で行う。
pub fn request_loan(
    borrower_id: UserId,
    book_id: BookId,
    quantity: u32,
    requested_at: DateTime<Utc>,
) -> Result<LoanRecord, LoanRequestError> {
    if quantity == 0 {
        return Err(LoanRequestError::InvalidQuantity);
    }

    Ok(LoanRecord {
        loan_id: LoanId::new(),
        borrower_id,
        approved_by: None,
        loaned_at: requested_at,
        due_date: requested_at + Duration::days(LOAN_PERIOD_DAYS),
        returned_at: None,
        status: LoanStatus::Processing,
        fine_amount: Decimal::ZERO,
        line_items: vec![LineItem { book_id, quantity }],
    })
}

/// 純粋関数：貸出申請を承認する
///
/// Processing以外ではスキップ（二重送信を無害にする）。
pub fn approve(loan: &LoanRecord, approver_id: UserId) -> Transition {
    if !loan.status.can_transition_to(LoanStatus::Borrowing) {
        return Transition::Skipped {
            current: loan.status,
        };
    }

    Transition::Applied(LoanRecord {
        status: LoanStatus::Borrowing,
        approved_by: Some(approver_id),
        ..loan.clone()
    })
}

/// 純粋関数：貸出申請を却下する
///
/// Processing以外ではスキップ。
pub fn reject(loan: &LoanRecord) -> Transition {
    if !loan.status.can_transition_to(LoanStatus::Rejected) {
        return Transition::Skipped {
            current: loan.status,
        };
    }

    Transition::Applied(LoanRecord {
        status: LoanStatus::Rejected,
        ..loan.clone()
    })
}

/// 純粋関数：貸出を延長する
///
/// 新しい返却期限 = min(返却期限 + 7日, 貸出日 + 6ヶ月)。
/// 延長不可の場合は理由を返し、記録は変更しない。
pub fn renew(loan: &LoanRecord) -> Result<LoanRecord, RenewalRejection> {
    check_renewal(loan)?;

    let extended = loan.due_date + Duration::days(RENEWAL_PERIOD_DAYS);
    let new_due_date = extended.min(renewal_cap(loan.loaned_at));

    Ok(LoanRecord {
        due_date: new_due_date,
        ..loan.clone()
    })
}

/// 純粋関数：書籍を返却する
///
/// 状態による前提条件はない。返却済みの記録に対しても
/// 返却日時と延滞料を再計算する。
pub fn return_loan(loan: &LoanRecord, returned_at: DateTime<Utc>) -> LoanRecord {
    LoanRecord {
        returned_at: Some(returned_at),
        status: LoanStatus::Returned,
        fine_amount: calculate_fine(loan.due_date, returned_at),
        ..loan.clone()
    }
}

//! 貸出・延長の可否判定（副作用なし）

use chrono::{DateTime, Duration, Utc};

use super::{
    LoanStatus, MembershipCard, RenewalRejection,
    loan::{LoanRecord, RENEWAL_PERIOD_DAYS, renewal_cap},
};

/// 延長可能かを判定する
///
/// 判定順：
/// 1. 返却済みなら不可
/// 2. Borrowing以外なら不可
/// 3. 返却期限 + 7日 が 貸出日 + 6ヶ月 を超えるなら不可
pub fn check_renewal(loan: &LoanRecord) -> Result<(), RenewalRejection> {
    if loan.returned_at.is_some() {
        return Err(RenewalRejection::AlreadyReturned);
    }

    if loan.status != LoanStatus::Borrowing {
        return Err(RenewalRejection::NotBorrowing(loan.status));
    }

    if loan.due_date + Duration::days(RENEWAL_PERIOD_DAYS) > renewal_cap(loan.loaned_at) {
        return Err(RenewalRejection::RenewalCapReached);
    }

    Ok(())
}

pub fn is_renewal_eligible(loan: &LoanRecord) -> bool {
    check_renewal(loan).is_ok()
}

/// 貸出資格を決めるカード
///
/// 有効（ステータスがNULLまたはActive）かつ有効期限内のカードのうち、
/// 有効期限が最も遅いもの。
pub fn governing_card(cards: &[MembershipCard], now: DateTime<Utc>) -> Option<&MembershipCard> {
    cards
        .iter()
        .filter(|card| card.is_valid_at(now))
        .max_by_key(|card| card.expires_at)
}

pub fn is_borrow_eligible(cards: &[MembershipCard], now: DateTime<Utc>) -> bool {
    governing_card(cards, now).is_some()
}

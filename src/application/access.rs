//! Access gate: decides, from the caller's identity and role, whether an
//! operation may run and which loans a listing may show.
//!
//! Every function here is a pure decision with no I/O.

use crate::domain::{Identity, UserId};

/// 認可対象の操作
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// 自分自身の貸出申請
    RequestLoan,
    /// 延長（借り手本人のみ）
    Renew { borrower_id: UserId },
    Approve,
    Reject,
    Return,
    /// 貸出一覧（範囲は `list_scope` で決まる）
    ListLoans,
    /// 承認待ち一覧
    ListPending,
}

/// 認可の結果
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccessDecision {
    Allowed,
    /// 未認証。ログイン画面へ誘導する（エラーではない）
    RedirectToLogin,
    Forbidden,
}

impl AccessDecision {
    pub fn is_allowed(&self) -> bool {
        matches!(self, AccessDecision::Allowed)
    }
}

/// 一覧の範囲
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListScope {
    /// 自分の貸出のみ
    Own(UserId),
    /// 全利用者の貸出
    All,
}

pub fn authorize(caller: Option<&Identity>, operation: Operation) -> AccessDecision {
    let Some(caller) = caller else {
        return AccessDecision::RedirectToLogin;
    };

    let allowed = match operation {
        Operation::RequestLoan | Operation::ListLoans => true,
        Operation::Renew { borrower_id } => borrower_id == caller.user_id,
        Operation::Approve | Operation::Reject | Operation::Return | Operation::ListPending => {
            caller.role.is_admin()
        }
    };

    if allowed {
        AccessDecision::Allowed
    } else {
        AccessDecision::Forbidden
    }
}

pub fn list_scope(caller: &Identity) -> ListScope {
    if caller.role.is_admin() {
        ListScope::All
    } else {
        ListScope::Own(caller.user_id)
    }
}

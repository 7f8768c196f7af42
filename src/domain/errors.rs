use super::LoanStatus;

/// 貸出申請のエラー
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoanRequestError {
    /// 冊数が0
    InvalidQuantity,
}

/// 延長不可の理由
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenewalRejection {
    /// 既に返却済み
    AlreadyReturned,
    /// 貸出中ではない（申請中・却下済みなど）
    NotBorrowing(LoanStatus),
    /// 延長すると貸出日から6ヶ月を超える
    RenewalCapReached,
}

impl RenewalRejection {
    /// 利用者向けのメッセージ
    pub fn message(&self) -> &'static str {
        match self {
            RenewalRejection::AlreadyReturned => "This book has already been returned.",
            RenewalRejection::NotBorrowing(_) => {
                "Only approved loans that are currently borrowed can be renewed."
            }
            RenewalRejection::RenewalCapReached => {
                "Maximum loan period of 6 months from the borrow date has been reached."
            }
        }
    }
}

impl std::fmt::Display for RenewalRejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            RenewalRejection::AlreadyReturned => write!(f, "loan already returned"),
            RenewalRejection::NotBorrowing(status) => {
                write!(f, "loan status is {}, not Borrowing", status.as_str())
            }
            RenewalRejection::RenewalCapReached => write!(f, "renewal would exceed 6 months"),
        }
    }
}

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::application::loan::{LineItemDetails, LoanDetails, RenewalOutcome};
use crate::domain::LoanStatus;

/// 外部向けの日付書式（dd/mm/yyyy）
pub fn format_date(date: DateTime<Utc>) -> String {
    date.format("%d/%m/%Y").to_string()
}

/// 貸出一覧取得のクエリパラメータ
#[derive(Debug, Deserialize)]
pub struct ListLoansQuery {
    /// ステータスでフィルタリング（管理者のみ有効）
    pub status: Option<String>,
}

/// 貸出申請リクエスト（POST /loans）
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RequestLoanBody {
    pub book_id: Uuid,
    /// 省略時は1冊
    pub quantity: Option<u32>,
}

/// 貸出申請レスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanRequestedResponse {
    pub success: bool,
    pub message: String,
    pub loan_id: Uuid,
    pub due_date: String,
}

/// 延長レスポンス（POST /loans/:id/renew）
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RenewalResponse {
    pub success: bool,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub new_due_date: Option<String>,
}

impl From<RenewalOutcome> for RenewalResponse {
    fn from(outcome: RenewalOutcome) -> Self {
        Self {
            success: outcome.success,
            message: outcome.message,
            new_due_date: outcome.new_due_date.map(format_date),
        }
    }
}

/// 貸出明細のレスポンス
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineItemResponse {
    pub book_id: Uuid,
    pub quantity: u32,
    pub title: Option<String>,
    pub author: Option<String>,
}

impl From<LineItemDetails> for LineItemResponse {
    fn from(item: LineItemDetails) -> Self {
        let (title, author) = match item.book {
            Some(book) => (Some(book.title), book.author),
            None => (None, None),
        };
        Self {
            book_id: item.book_id.value(),
            quantity: item.quantity,
            title,
            author,
        }
    }
}

/// 貸出レスポンス（GET /loans と GET /loans/pending）
#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoanResponse {
    pub loan_id: Uuid,
    pub borrower_id: Uuid,
    pub approved_by: Option<Uuid>,
    pub borrowed_at: String,
    pub due_date: String,
    pub returned_at: Option<String>,
    pub status: String,
    pub fine_amount: Decimal,
    pub items: Vec<LineItemResponse>,
}

impl From<LoanDetails> for LoanResponse {
    fn from(details: LoanDetails) -> Self {
        let loan = details.loan;
        Self {
            loan_id: loan.loan_id.value(),
            borrower_id: loan.borrower_id.value(),
            approved_by: loan.approved_by.map(|id| id.value()),
            borrowed_at: format_date(loan.loaned_at),
            due_date: format_date(loan.due_date),
            returned_at: loan.returned_at.map(format_date),
            status: loan.status.as_str().to_string(),
            fine_amount: loan.fine_amount,
            items: details
                .items
                .into_iter()
                .map(LineItemResponse::from)
                .collect(),
        }
    }
}

/// エラーレスポンス
#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub error: String,
    pub message: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            error: error.into(),
            message: message.into(),
        }
    }
}

/// ステータスクエリパラメータのパースとバリデーション
pub fn parse_status_filter(status: &str) -> Result<LoanStatus, String> {
    status.parse::<LoanStatus>()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_date_is_day_month_year() {
        let date = Utc.with_ymd_and_hms(2024, 1, 5, 13, 45, 0).unwrap();
        assert_eq!(format_date(date), "05/01/2024");
    }

    #[test]
    fn test_renewal_response_omits_missing_due_date() {
        let response = RenewalResponse::from(RenewalOutcome {
            success: false,
            message: "nope".to_string(),
            new_due_date: None,
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"success": false, "message": "nope"})
        );
    }

    #[test]
    fn test_renewal_response_uses_camel_case() {
        let response = RenewalResponse::from(RenewalOutcome {
            success: true,
            message: "ok".to_string(),
            new_due_date: Some(Utc.with_ymd_and_hms(2024, 1, 22, 0, 0, 0).unwrap()),
        });
        let json = serde_json::to_value(&response).unwrap();
        assert_eq!(json["newDueDate"], "22/01/2024");
    }
}
